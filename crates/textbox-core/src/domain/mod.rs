//! Domain entities for TextBoxGPT.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! The innermost layer of the application.  Domain code has **no** imports
//! from OS APIs, HTTP clients, or the file system, so it can be compiled and
//! tested on any platform without external setup.  The agent's application
//! and infrastructure layers depend on it; it never depends on them.

/// The decrypted runtime configuration (endpoint, credential, model).
///
/// See [`config::Configuration`] for the main type.
pub mod config;

/// Rules for turning clipboard text into a prompt.
pub mod prompt;

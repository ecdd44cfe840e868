//! Storage infrastructure: loading the provisioned credentials.
//!
//! The `config` sub-module reads the two artefacts produced by
//! `textbox-provision` (the raw key file and the encrypted blob) from the
//! directory containing the agent executable and decrypts them into a
//! [`textbox_core::Configuration`].  Nothing is ever written back.

pub mod config;

//! Keystroke driver implementations.
//!
//! The correct implementation is selected at compile time via `#[cfg(target_os = ...)]`.
//! Only Windows has a native driver; every other platform gets
//! [`UnsupportedDriver`], whose `init` fails so startup stops with a clear
//! message instead of silently typing nothing.

pub mod recording;

#[cfg(target_os = "windows")]
pub mod windows;

use std::sync::Arc;

pub use crate::application::inject_text::{DriverError, KeystrokeDriver};

/// Driver for platforms without native keystroke injection.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedDriver;

impl KeystrokeDriver for UnsupportedDriver {
    fn init(&self) -> Result<(), DriverError> {
        Err(DriverError::Unsupported)
    }

    fn key_down(&self, _vk: u16) -> Result<(), DriverError> {
        Err(DriverError::Unsupported)
    }

    fn key_up(&self, _vk: u16) -> Result<(), DriverError> {
        Err(DriverError::Unsupported)
    }

    fn input_char(&self, _ch: char) -> Result<(), DriverError> {
        Err(DriverError::Unsupported)
    }
}

/// Returns the native driver for the current platform (uninitialised).
pub fn platform_driver() -> Arc<dyn KeystrokeDriver> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(windows::SendInputDriver::new())
    }

    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(UnsupportedDriver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_driver_refuses_to_init() {
        assert_eq!(UnsupportedDriver.init(), Err(DriverError::Unsupported));
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_platform_driver_is_unsupported_off_windows() {
        assert_eq!(platform_driver().init(), Err(DriverError::Unsupported));
    }
}

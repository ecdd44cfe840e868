//! Loads the encrypted runtime configuration.
//!
//! Both files are resolved relative to the directory of the running
//! executable, not the working directory, so the agent finds its credentials
//! no matter where it is launched from:
//!
//! ```text
//! <exe dir>/gpt.key          32 raw key bytes
//! <exe dir>/gpt_config.bin   nonce ‖ ciphertext ‖ tag
//! ```
//!
//! Every failure is fatal at startup; the agent never runs on a partial
//! configuration.

use std::io;
use std::path::{Path, PathBuf};

use textbox_core::{decrypt, ConfigError, Configuration, StoreError, SymmetricKey};
use thiserror::Error;
use tracing::{debug, info};

/// File holding the raw symmetric key.
pub const KEY_FILE_NAME: &str = "gpt.key";
/// File holding the encrypted configuration blob.
pub const BLOB_FILE_NAME: &str = "gpt_config.bin";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// The location of the running executable could not be determined.
    #[error("could not determine the executable directory: {0}")]
    NoExecutableDir(#[source] io::Error),

    #[error("key file not found at {path}; run textbox-provision first")]
    KeyFileMissing { path: PathBuf },

    #[error("encrypted configuration not found at {path}; run textbox-provision first")]
    BlobFileMissing { path: PathBuf },

    /// A file system I/O error other than "not found".
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The key file does not hold exactly 32 bytes.
    #[error("key file {path} is invalid: {source}")]
    InvalidKey {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    /// Authentication failed: wrong key or corrupted blob.
    #[error("failed to decrypt configuration: {0}")]
    Decryption(#[source] StoreError),

    /// The blob decrypted but does not hold a configuration object.
    #[error("decrypted configuration is malformed: {0}")]
    Malformed(String),

    #[error("configuration field `{0}` is missing or empty")]
    MissingField(&'static str),
}

impl From<StoreError> for ConfigLoadError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::MalformedConfig(reason) => Self::Malformed(reason),
            StoreError::Config(ConfigError::MissingField(field)) => Self::MissingField(field),
            StoreError::Config(ConfigError::Parse(reason)) => Self::Malformed(reason),
            other => Self::Decryption(other),
        }
    }
}

/// Directory containing the running executable.
///
/// # Errors
///
/// Returns [`ConfigLoadError::NoExecutableDir`] if `current_exe` fails or the
/// path has no parent.
pub fn executable_dir() -> Result<PathBuf, ConfigLoadError> {
    let exe = std::env::current_exe().map_err(ConfigLoadError::NoExecutableDir)?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        ConfigLoadError::NoExecutableDir(io::Error::new(
            io::ErrorKind::NotFound,
            "executable path has no parent directory",
        ))
    })
}

/// Loads the configuration from the executable's directory.
///
/// # Errors
///
/// See [`load_from`].
pub fn load() -> Result<Configuration, ConfigLoadError> {
    load_from(&executable_dir()?)
}

/// Loads the configuration from `dir`.
///
/// # Errors
///
/// - [`ConfigLoadError::KeyFileMissing`] / [`ConfigLoadError::BlobFileMissing`]
///   when either file is absent.
/// - [`ConfigLoadError::Io`] for any other read failure.
/// - [`ConfigLoadError::InvalidKey`] when the key is not 32 bytes.
/// - [`ConfigLoadError::Decryption`], [`ConfigLoadError::Malformed`] or
///   [`ConfigLoadError::MissingField`] when the blob does not yield a
///   complete configuration.
pub fn load_from(dir: &Path) -> Result<Configuration, ConfigLoadError> {
    let key_path = dir.join(KEY_FILE_NAME);
    let blob_path = dir.join(BLOB_FILE_NAME);
    debug!(key = %key_path.display(), blob = %blob_path.display(), "loading configuration");

    let key_bytes = read_required(&key_path, |path| ConfigLoadError::KeyFileMissing { path })?;
    let blob = read_required(&blob_path, |path| ConfigLoadError::BlobFileMissing { path })?;

    let key = SymmetricKey::from_bytes(&key_bytes).map_err(|source| ConfigLoadError::InvalidKey {
        path: key_path,
        source,
    })?;
    let config = decrypt(&blob, &key)?;

    info!(
        stage = "system",
        api_url = config.api_url(),
        model = config.model_name(),
        "configuration loaded"
    );
    Ok(config)
}

fn read_required(
    path: &Path,
    missing: impl FnOnce(PathBuf) -> ConfigLoadError,
) -> Result<Vec<u8>, ConfigLoadError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(missing(path.to_path_buf())),
        Err(source) => Err(ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Provisioning: turns a plaintext `api.json` into the agent's two artefacts.
//!
//! ```text
//! api.json ──parse/validate──► Configuration ──encrypt──► gpt_config.bin
//!                                                 ▲
//!                                 generate_key ───┴──────► gpt.key
//! ```
//!
//! Every run generates a fresh key.  Both files must be copied together next
//! to the agent executable; a blob from one run cannot be opened with the key
//! from another.

use std::io;
use std::path::{Path, PathBuf};

use textbox_core::{encrypt, generate_key, ConfigError, Configuration, StoreError};
use thiserror::Error;
use tracing::info;

/// Output file for the raw key.
pub const KEY_FILE_NAME: &str = "gpt.key";
/// Output file for the encrypted configuration.
pub const BLOB_FILE_NAME: &str = "gpt_config.bin";

/// Shape of the expected input, printed when provisioning fails.
pub const EXAMPLE_INPUT: &str = r#"{
    "api_key": "your-api-key-here",
    "api_url": "your-api-url-here",
    "model_name": "your-model-name"
}"#;

/// Error type for a provisioning run.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("{path} not found")]
    InputMissing { path: PathBuf },

    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input is not a JSON object with string fields.
    #[error("{path} is not a valid configuration document: {reason}")]
    InvalidJson { path: PathBuf, reason: String },

    /// `api_key` or `api_url` is absent or empty.
    #[error("configuration must contain a non-empty `{0}`")]
    MissingField(&'static str),

    #[error("failed to encrypt configuration: {0}")]
    Encryption(#[from] StoreError),
}

/// Paths written by a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedArtifacts {
    pub key_path: PathBuf,
    pub blob_path: PathBuf,
    /// Model that was sealed, after applying the default.
    pub model_name: String,
}

/// Reads `input`, seals it under a new key and writes both artefacts into
/// `out_dir` (created if absent), overwriting earlier ones.
///
/// # Errors
///
/// Returns [`ProvisioningError`] if the input is missing, is not valid JSON,
/// lacks `api_key` / `api_url`, or if any file cannot be written.  Nothing is
/// written unless the input validates.
pub fn provision(input: &Path, out_dir: &Path) -> Result<ProvisionedArtifacts, ProvisioningError> {
    let raw = match std::fs::read(input) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ProvisioningError::InputMissing {
                path: input.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(ProvisioningError::Io {
                path: input.to_path_buf(),
                source,
            })
        }
    };

    let config = Configuration::from_json_slice(&raw).map_err(|e| match e {
        ConfigError::Parse(reason) => ProvisioningError::InvalidJson {
            path: input.to_path_buf(),
            reason,
        },
        ConfigError::MissingField(field) => ProvisioningError::MissingField(field),
    })?;

    let key = generate_key();
    let blob = encrypt(&config, &key)?;

    std::fs::create_dir_all(out_dir).map_err(|source| ProvisioningError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;
    let key_path = out_dir.join(KEY_FILE_NAME);
    let blob_path = out_dir.join(BLOB_FILE_NAME);
    write_file(&key_path, key.as_bytes())?;
    write_file(&blob_path, &blob)?;

    info!(
        key = %key_path.display(),
        blob = %blob_path.display(),
        model = config.model_name(),
        "configuration sealed"
    );

    Ok(ProvisionedArtifacts {
        key_path,
        blob_path,
        model_name: config.model_name().to_string(),
    })
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), ProvisioningError> {
    std::fs::write(path, contents).map_err(|source| ProvisioningError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Integration tests for loading provisioned credentials.
//!
//! Provisioning is simulated with `textbox_core` directly: a plaintext
//! document is parsed, sealed, and both artefacts are written to a temp
//! directory that stands in for the executable's directory.

use std::path::Path;

use textbox_agent::infrastructure::completion::OpenAiClient;
use textbox_agent::infrastructure::storage::config::{
    load_from, ConfigLoadError, BLOB_FILE_NAME, KEY_FILE_NAME,
};
use textbox_core::{encrypt, generate_key, Configuration};

fn provision_from_json(dir: &Path, json: &str) {
    let config = Configuration::from_json_slice(json.as_bytes()).expect("valid provisioning input");
    let key = generate_key();
    std::fs::write(dir.join(KEY_FILE_NAME), key.as_bytes()).unwrap();
    std::fs::write(dir.join(BLOB_FILE_NAME), encrypt(&config, &key).unwrap()).unwrap();
}

#[test]
fn test_provisioned_document_without_model_loads_with_default_model() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    provision_from_json(dir.path(), r#"{"api_key":"k1","api_url":"http://x"}"#);

    // Act
    let config = load_from(dir.path()).expect("load must succeed");

    // Assert
    assert_eq!(config.api_key(), "k1");
    assert_eq!(config.api_url(), "http://x");
    assert_eq!(config.model_name(), "gpt-4o");
}

#[test]
fn test_loaded_configuration_builds_a_completion_client() {
    let dir = tempfile::tempdir().unwrap();
    provision_from_json(
        dir.path(),
        r#"{"api_key":"k1","api_url":"https://api.openai.com/v1/","model_name":"gpt-4o-mini"}"#,
    );

    let config = load_from(dir.path()).unwrap();
    let client = OpenAiClient::from_config(&config).unwrap();

    assert_eq!(client.endpoint(), "https://api.openai.com/v1/chat/completions");
    assert_eq!(config.model_name(), "gpt-4o-mini");
}

#[test]
fn test_reprovisioning_only_the_blob_breaks_loading() {
    // Arrange – a second provisioning run overwrites the blob with a new key,
    // but only the blob is copied next to the agent
    let dir = tempfile::tempdir().unwrap();
    provision_from_json(dir.path(), r#"{"api_key":"k1","api_url":"http://x"}"#);
    let old_key = std::fs::read(dir.path().join(KEY_FILE_NAME)).unwrap();
    provision_from_json(dir.path(), r#"{"api_key":"k2","api_url":"http://y"}"#);
    std::fs::write(dir.path().join(KEY_FILE_NAME), old_key).unwrap();

    // Act
    let result = load_from(dir.path());

    // Assert
    assert!(matches!(result, Err(ConfigLoadError::Decryption(_))));
}

#[test]
fn test_empty_directory_reports_missing_key_first() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_from(dir.path()),
        Err(ConfigLoadError::KeyFileMissing { .. })
    ));
}

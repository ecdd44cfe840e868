//! Integration tests for the encrypted store through the public crate API.
//!
//! These mirror how the provisioning tool and the agent use the store: the
//! key travels as raw bytes through a file, the blob through another.

use textbox_core::{decrypt, encrypt, generate_key, Configuration, StoreError, SymmetricKey};

#[test]
fn test_provisioning_input_round_trips_with_default_model() {
    // Arrange
    let input = br#"{"api_key":"k1","api_url":"http://x"}"#;
    let cfg = Configuration::from_json_slice(input).expect("valid provisioning input");
    let key = generate_key();

    // Act – key goes through its raw byte form, as it would via gpt.key
    let blob = encrypt(&cfg, &key).expect("encrypt");
    let reloaded_key = SymmetricKey::from_bytes(key.as_bytes()).expect("32-byte key");
    let loaded = decrypt(&blob, &reloaded_key).expect("decrypt");

    // Assert
    let expected =
        Configuration::from_json_slice(br#"{"api_key":"k1","api_url":"http://x","model_name":"gpt-4o"}"#)
            .unwrap();
    assert_eq!(loaded, expected);
    assert_eq!(loaded.model_name(), "gpt-4o");
}

#[test]
fn test_round_trip_preserves_unicode_fields() {
    let cfg = Configuration::new("ключ-🔑", "https://例子.com/v1", Some("模型".into())).unwrap();
    let key = generate_key();
    let blob = encrypt(&cfg, &key).unwrap();
    assert_eq!(decrypt(&blob, &key).unwrap(), cfg);
}

#[test]
fn test_regenerated_key_invalidates_previous_blob() {
    // Arrange – provision once, then "re-provision" only the key
    let cfg = Configuration::new("k", "u", None).unwrap();
    let old_key = generate_key();
    let blob = encrypt(&cfg, &old_key).unwrap();
    let new_key = generate_key();

    // Act
    let result = decrypt(&blob, &new_key);

    // Assert
    assert_eq!(result, Err(StoreError::Decryption));
}

#[test]
fn test_appending_bytes_to_blob_fails_authentication() {
    let key = generate_key();
    let mut blob = encrypt(&Configuration::new("k", "u", None).unwrap(), &key).unwrap();
    blob.push(0);
    assert_eq!(decrypt(&blob, &key), Err(StoreError::Decryption));
}

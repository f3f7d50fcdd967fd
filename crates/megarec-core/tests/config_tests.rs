//! Engine Configuration Tests
//!
//! This test suite verifies that TOML configuration is parsed and applied to the store.
//!
//! ## Scenarios Covered
//!
//! 1. The preserve policy changes reference lookup
//! 2. The default configuration dasherizes
//! 3. Log profile parsing
//! 4. Invalid TOML maps to `InvalidConfig`

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{convention_schema, doc};
use megarec_core::errors::{MegarecError, RecError, RecErrorKind};
use megarec_core::logging_facility::Profile;
use megarec_core::naming::TypeNameNormalization;
use megarec_core::{EngineConfig, GlobalIdentityCache, MemoryStore};
use serde_json::json;

#[test]
fn test_preserve_policy_changes_reference_lookup() {
    let config = EngineConfig::from_toml_str(r#"type_names = "preserve""#).unwrap();
    let store = MemoryStore::with_config(&config, GlobalIdentityCache::new());
    let schema = convention_schema(&["source", "exact"]);
    store.push_record("book-excerpt", "3", doc(json!({})));
    let exact = store.push_record("BookExcerpt", "4", doc(json!({})));
    let note = store.push_record(
        "note",
        "1",
        doc(json!({
            "source": {"type": "BookExcerpt", "id": "3"},
            "exact": {"type": "BookExcerpt", "id": "4"},
        })),
    );

    let source = note.get_attr("source", &store, &schema).unwrap();
    assert!(source.is_unresolved_reference());

    let resolved = note.get_attr("exact", &store, &schema).unwrap();
    assert_eq!(resolved.as_record(), Some(&exact));
}

#[test]
fn test_default_config_dasherizes() {
    let config = EngineConfig::default();
    let store = MemoryStore::with_config(&config, GlobalIdentityCache::new());

    let record = store.push_record("BookExcerpt", "1", doc(json!({})));
    assert_eq!(record.model_name(), Some("book-excerpt"));
}

#[test]
fn test_profile_parses_from_toml() {
    let config = EngineConfig::from_toml_str(r#"log_profile = "test""#).unwrap();
    assert_eq!(config.log_profile, Profile::Test);
    assert_eq!(config.type_names, TypeNameNormalization::Dasherize);
}

#[test]
fn test_invalid_toml_maps_to_invalid_config() {
    let err = EngineConfig::from_toml_str("type_names = [").unwrap_err();
    assert!(matches!(err, MegarecError::InvalidConfig { .. }));

    let rec_err: RecError = err.into();
    assert_eq!(rec_err.kind(), RecErrorKind::InvalidConfig);
    assert_eq!(rec_err.code(), "ERR_INVALID_CONFIG");
}

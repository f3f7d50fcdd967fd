//! Engine configuration
//!
//! Configuration is plain data: a logging profile and the model-name
//! normalization policy used by the in-memory store. It can be built in code
//! or parsed from TOML.
//!
//! ```
//! use megarec_core::config::EngineConfig;
//! use megarec_core::naming::TypeNameNormalization;
//!
//! let config = EngineConfig::from_toml_str(r#"type_names = "preserve""#).unwrap();
//! assert_eq!(config.type_names, TypeNameNormalization::Preserve);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{MegarecError, Result};
use crate::logging_facility::{self, Profile};
use crate::naming::TypeNameNormalization;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Logging profile applied by [`EngineConfig::init_logging`]
    pub log_profile: Profile,
    /// Normalization applied to model names before identity lookups
    pub type_names: TypeNameNormalization,
}

impl EngineConfig {
    /// Parse a configuration from TOML text
    ///
    /// Missing keys take their defaults; unknown keys are rejected.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the text is not valid TOML or does not
    /// match the configuration shape.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| MegarecError::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// Initialize the logging facility with this configuration's profile
    pub fn init_logging(&self) {
        logging_facility::init(self.log_profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.log_profile, Profile::Development);
        assert_eq!(config.type_names, TypeNameNormalization::Dasherize);
    }

    #[test]
    fn test_full_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            log_profile = "production"
            type_names = "preserve"
            "#,
        )
        .unwrap();
        assert_eq!(config.log_profile, Profile::Production);
        assert_eq!(config.type_names, TypeNameNormalization::Preserve);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = EngineConfig::from_toml_str("cache_size = 10").unwrap_err();
        assert!(matches!(err, MegarecError::InvalidConfig { .. }));
    }

    #[test]
    fn test_bad_variant_rejected() {
        let err = EngineConfig::from_toml_str(r#"type_names = "shout""#).unwrap_err();
        assert!(matches!(err, MegarecError::InvalidConfig { .. }));
    }
}

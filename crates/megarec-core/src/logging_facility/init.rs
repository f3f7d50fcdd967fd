//! Subscriber setup for the engine's log events
//!
//! Resolution events are emitted by `get_attr` through the `log_op_*` macros.
//! An embedding application picks a [`Profile`], usually from
//! `EngineConfig::log_profile`, and installs the matching subscriber once.

use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Where resolution events go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Human-readable lines, resolver internals included
    #[default]
    Development,
    /// One JSON object per event, operation boundaries only
    Production,
    /// Nothing is printed; tests install a capture layer instead
    Test,
}

impl Profile {
    /// Filter used when `RUST_LOG` is unset, or `None` when nothing prints
    pub fn default_directive(&self) -> Option<&'static str> {
        match self {
            Profile::Development => Some("megarec_core=debug"),
            Profile::Production => Some("megarec_core=info"),
            Profile::Test => None,
        }
    }

    pub fn emits_json(&self) -> bool {
        matches!(self, Profile::Production)
    }

    /// `RUST_LOG` if it parses, otherwise the profile's default directive
    pub fn env_filter(&self) -> Option<EnvFilter> {
        let directive = self.default_directive()?;
        Some(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)))
    }
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`.
///
/// Only the first call in a process has an effect.
///
/// ```
/// use megarec_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let Some(filter) = profile.env_filter() else {
            tracing_subscriber::registry().init();
            return;
        };
        let builder = tracing_subscriber::fmt().with_env_filter(filter);
        if profile.emits_json() {
            builder.json().init();
        } else {
            builder.init();
        }
    });
}

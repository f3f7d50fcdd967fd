//! Model-name normalization
//!
//! Type names reach the engine from schemas in whatever casing the data
//! source uses. Every identity-cache access goes through one normalization
//! so that `BookExcerpt`, `book_excerpt` and `book-excerpt` address the same
//! records.

use serde::{Deserialize, Serialize};

/// Normalization policy applied to model names before identity lookups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeNameNormalization {
    /// `BookExcerpt` -> `book-excerpt`
    #[default]
    Dasherize,
    /// Use model names exactly as reported
    Preserve,
}

impl TypeNameNormalization {
    pub fn apply(&self, model_name: &str) -> String {
        match self {
            TypeNameNormalization::Dasherize => dasherize(model_name),
            TypeNameNormalization::Preserve => model_name.to_string(),
        }
    }
}

/// Dasherize a model name.
///
/// An ASCII lowercase letter or digit followed by an ASCII uppercase letter
/// is split with a separator. ASCII letters are lowercased and spaces and
/// underscores become dashes. Dots and non-ASCII characters pass through.
pub fn dasherize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;

    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            if let Some(p) = prev {
                if p.is_ascii_lowercase() || p.is_ascii_digit() {
                    out.push('-');
                }
            }
            out.push(ch.to_ascii_lowercase());
        } else if ch == '_' || ch == ' ' {
            out.push('-');
        } else {
            out.push(ch);
        }
        prev = Some(ch);
    }

    out
}

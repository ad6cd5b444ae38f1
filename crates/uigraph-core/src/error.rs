//! Error types with actionable suggestions.
//!
//! Value operations in this crate are total. Errors only come from breaking
//! the publish-once id discipline, from bad configuration values, and from
//! malformed snapshot input.

use serde::{Deserialize, Serialize};

/// Errors reported by the model layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelError {
    /// A node id was already published with a different value.
    #[error("node '{prefix}{current}' already has an id, refusing to reassign it to {requested}")]
    IdAlreadyAssigned {
        prefix: String,
        current: u32,
        requested: u32,
    },

    /// A configuration value could not be parsed.
    #[error("invalid value '{value}' for {key}")]
    InvalidConfig { key: String, value: String },

    /// Snapshot input was structurally invalid.
    #[error("invalid snapshot: {message}")]
    InvalidSnapshot { message: String },
}

impl ModelError {
    pub fn id_already_assigned(prefix: &str, current: u32, requested: u32) -> Self {
        Self::IdAlreadyAssigned {
            prefix: prefix.to_string(),
            current,
            requested,
        }
    }

    pub fn invalid_config(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn invalid_snapshot(message: impl Into<String>) -> Self {
        Self::InvalidSnapshot {
            message: message.into(),
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::IdAlreadyAssigned { .. } => "ID_ALREADY_ASSIGNED",
            Self::InvalidConfig { .. } => "INVALID_CONFIG",
            Self::InvalidSnapshot { .. } => "INVALID_SNAPSHOT",
        }
    }

    /// How to fix the problem.
    #[must_use]
    pub fn suggestion(&self) -> String {
        match self {
            Self::IdAlreadyAssigned { .. } => {
                "Ids are assigned once by the graph; look the node up instead of re-admitting it"
                    .to_string()
            }
            Self::InvalidConfig { key, .. } => {
                format!("Set {} to a valid value or unset it to use the default", key)
            }
            Self::InvalidSnapshot { .. } => {
                "Check that the snapshot has an activity and a widgets array".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_has_a_suggestion() {
        let errors = [
            ModelError::id_already_assigned("g0s", 1, 2),
            ModelError::invalid_config("UIGRAPH_WITH_TEXT", "maybe"),
            ModelError::invalid_snapshot("missing widgets"),
        ];
        for err in &errors {
            assert!(!err.suggestion().is_empty(), "{} has no suggestion", err.code());
        }
    }

    #[test]
    fn id_already_assigned_message() {
        let err = ModelError::id_already_assigned("g0a", 3, 9);
        let text = err.to_string();
        assert!(text.contains("g0a3"));
        assert!(text.contains('9'));
        assert_eq!(err.code(), "ID_ALREADY_ASSIGNED");
    }

    #[test]
    fn invalid_config_suggestion_names_key() {
        let err = ModelError::invalid_config("UIGRAPH_TEXT_MAX_WIDTH", "wide");
        assert!(err.suggestion().contains("UIGRAPH_TEXT_MAX_WIDTH"));
        assert!(err.to_string().contains("wide"));
    }

    #[test]
    fn json_uses_code_tag() {
        let err = ModelError::invalid_snapshot("bad");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"code\":\"INVALID_SNAPSHOT\""));
        let back: ModelError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }
}

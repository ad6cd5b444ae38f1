//! State-abstraction configuration.
//!
//! These switches decide which widget properties feed a state's identity.
//! Coarser identities merge more screens into one state; finer ones split
//! them.
//!
//! Values come from defaults, then environment variables, then explicit
//! overrides (CLI flags):
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `UIGRAPH_WIDGET_ORDER` | `widget_order` | `false` |
//! | `UIGRAPH_WITH_TEXT` | `with_text` | `false` |
//! | `UIGRAPH_TEXT_MAX_WIDTH` | `text_max_width` | `6` |
//! | `UIGRAPH_WITH_INDEX` | `with_index` | `false` |
//! | `UIGRAPH_SCROLL_BOTTOM_UP_N` | `scroll_bottom_up_n` | `false` |
//!
//! Empty variables are ignored.

use std::env;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ModelError;

pub const ENV_WIDGET_ORDER: &str = "UIGRAPH_WIDGET_ORDER";
pub const ENV_WITH_TEXT: &str = "UIGRAPH_WITH_TEXT";
pub const ENV_TEXT_MAX_WIDTH: &str = "UIGRAPH_TEXT_MAX_WIDTH";
pub const ENV_WITH_INDEX: &str = "UIGRAPH_WITH_INDEX";
pub const ENV_SCROLL_BOTTOM_UP_N: &str = "UIGRAPH_SCROLL_BOTTOM_UP_N";

/// Which widget properties participate in state identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    /// Combine widget hashes in document order instead of as a multiset.
    pub widget_order: bool,
    /// Fold normalized widget text into the widget hash.
    pub with_text: bool,
    /// Texts wider than this many terminal columns stay out of the hash.
    pub text_max_width: usize,
    /// Fold the sibling index into the widget hash.
    pub with_index: bool,
    /// Offer `SCROLL_BOTTOM_UP_N` on list widgets.
    pub scroll_bottom_up_n: bool,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            widget_order: false,
            with_text: false,
            text_max_width: 6,
            with_index: false,
            scroll_bottom_up_n: false,
        }
    }
}

impl HashConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ModelError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ModelError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get(ENV_WIDGET_ORDER) {
            config.widget_order = parse_bool(ENV_WIDGET_ORDER, &value)?;
        }
        if let Some(value) = get(ENV_WITH_TEXT) {
            config.with_text = parse_bool(ENV_WITH_TEXT, &value)?;
        }
        if let Some(value) = get(ENV_TEXT_MAX_WIDTH) {
            config.text_max_width = value
                .trim()
                .parse()
                .map_err(|_| invalid_value(ENV_TEXT_MAX_WIDTH, &value))?;
        }
        if let Some(value) = get(ENV_WITH_INDEX) {
            config.with_index = parse_bool(ENV_WITH_INDEX, &value)?;
        }
        if let Some(value) = get(ENV_SCROLL_BOTTOM_UP_N) {
            config.scroll_bottom_up_n = parse_bool(ENV_SCROLL_BOTTOM_UP_N, &value)?;
        }
        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ModelError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid_value(key, value)),
    }
}

fn invalid_value(key: &str, value: &str) -> ModelError {
    warn!("Invalid configuration value {}={:?}", key, value);
    ModelError::invalid_config(key, value)
}

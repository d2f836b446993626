//! Designer configuration.
//!
//! Values that earlier revisions kept as module-level constants (pixels per
//! foot, storage name and version) are injected here so several stages or
//! test fixtures can differ.

use crate::geometry::{DEFAULT_PX_PER_FOOT, Scale};
use crate::store::StoreConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Configuration for a `StageDesigner` session.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesignerConfig {
    /// Feet → pixel factor. Default: **25** (early saves used 20).
    pub px_per_foot: f32,

    /// Quantize the final drag position to `snap_size`. Default: **false**.
    pub grid_snap: bool,

    /// Snap interval in pixels. Default: one foot.
    pub snap_size: f32,

    /// Offset applied to a duplicated item, in pixels. Default: **(20, 20)**.
    pub duplicate_offset: (f32, f32),

    /// Where newly added items land, in stage pixels. Default: **(50, 50)**.
    pub default_item_origin: (f32, f32),

    /// Size of newly added items, in pixels. Default: **120 × 90**.
    pub default_item_size: (f32, f32),

    /// Maximum scene undo depth; the oldest snapshot is dropped beyond it.
    pub history_depth: usize,

    /// Autosave interval in milliseconds. Default: five minutes.
    pub autosave_interval_ms: u64,

    pub store: StoreConfig,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            px_per_foot: DEFAULT_PX_PER_FOOT,
            grid_snap: false,
            snap_size: DEFAULT_PX_PER_FOOT,
            duplicate_offset: (20.0, 20.0),
            default_item_origin: (50.0, 50.0),
            default_item_size: (120.0, 90.0),
            history_depth: 200,
            autosave_interval_ms: 5 * 60 * 1000,
            store: StoreConfig::default(),
        }
    }
}

impl DesignerConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.px_per_foot > 0.0) {
            return Err(ConfigError::Invalid {
                field: "pxPerFoot",
                reason: format!("must be positive, got {}", self.px_per_foot),
            });
        }
        if self.snap_size < 0.0 {
            return Err(ConfigError::Invalid {
                field: "snapSize",
                reason: format!("must not be negative, got {}", self.snap_size),
            });
        }
        if self.history_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "historyDepth",
                reason: "must keep at least one snapshot".to_string(),
            });
        }
        Ok(())
    }

    pub fn scale(&self) -> Scale {
        Scale::new(self.px_per_foot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let config = DesignerConfig::from_json(r#"{"pxPerFoot":20,"gridSnap":true}"#).unwrap();
        assert_eq!(config.px_per_foot, 20.0);
        assert!(config.grid_snap);
        assert_eq!(config.history_depth, 200);
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            DesignerConfig::from_json(r#"{"pxPerFoot":0}"#),
            Err(ConfigError::Invalid { field: "pxPerFoot", .. })
        ));
        assert!(matches!(
            DesignerConfig::from_json(r#"{"historyDepth":0}"#),
            Err(ConfigError::Invalid { field: "historyDepth", .. })
        ));
        assert!(matches!(
            DesignerConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }
}

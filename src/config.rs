//! Tunable layout constants.

use serde::Deserialize;

/// localStorage key under which the browser host keeps the board.
pub const STORAGE_KEY: &str = "myStart";

/// Layout configuration shared by every engine component.
///
/// All fields fall back to their defaults when deserialized from a
/// partial JSON object, so hosts only override what they care about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Minimum clearance between two blocks on at least one axis.
    pub min_gap: i64,
    /// Distance under which an edge aligns to another block's edge.
    pub snap_tolerance: i64,
    /// Gap difference under which a block is centred between neighbours.
    pub spacing_tolerance: i64,
    /// Resize floor.
    pub min_width: i64,
    /// Width given to freshly created or width-less categories.
    pub default_width: i64,
    /// Grid height of a category without links.
    pub fallback_tile_height: i64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_gap: 20,
            snap_tolerance: 10,
            spacing_tolerance: 5,
            min_width: 80,
            default_width: 260,
            fallback_tile_height: 100,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be at least {min}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        value: i64,
    },
}

impl LayoutConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Gaps and tolerances may be zero; widths and the empty grid may not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = [
            ("min_gap", self.min_gap, 0),
            ("snap_tolerance", self.snap_tolerance, 0),
            ("spacing_tolerance", self.spacing_tolerance, 0),
            ("min_width", self.min_width, 1),
            ("default_width", self.default_width, 1),
            ("fallback_tile_height", self.fallback_tile_height, 1),
        ];
        for (field, value, min) in bounds {
            if value < min {
                return Err(ConfigError::OutOfRange { field, min, value });
            }
        }
        Ok(())
    }
}

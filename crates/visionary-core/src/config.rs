//! Canvas behaviour configuration.

use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::snap::{DEFAULT_EDGE_MARGIN, DEFAULT_SNAP_UNIT};
use serde::{Deserialize, Serialize};

/// Tunables for dragging and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    /// Grid increment for dragged positions. Zero disables snapping.
    pub snap_unit: f64,
    /// Minimum distance kept between an element's origin and the far edges.
    pub edge_margin: f64,
    /// Number of history entries retained.
    pub history_capacity: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            snap_unit: DEFAULT_SNAP_UNIT,
            edge_margin: DEFAULT_EDGE_MARGIN,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: CanvasConfig = serde_json::from_str(r#"{"snapUnit": 4}"#).unwrap();
        assert_eq!(config.snap_unit, 4.0);
        assert_eq!(config.edge_margin, 40.0);
        assert_eq!(config.history_capacity, 20);
    }
}

//! Runtime configuration.

use serde::{Deserialize, Serialize};

use crate::error::GraphResult;

/// Settings for a [`System`](crate::system::System).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Maximum nesting depth of graphs owned by graph components. The root
    /// graph has depth 0.
    pub max_graph_depth: usize,

    /// Log a warning whenever the sorter has to break a dependency cycle.
    pub warn_on_cycles: bool,

    /// Treat references that fail to resolve while loading a document as
    /// errors. When false they resolve to nothing and loading continues.
    pub strict_references: bool,
}

impl SystemConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> GraphResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            max_graph_depth: 16,
            warn_on_cycles: true,
            strict_references: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = SystemConfig::from_json(r#"{ "max_graph_depth": 4 }"#).unwrap();
        assert_eq!(config.max_graph_depth, 4);
        assert!(config.warn_on_cycles);
        assert!(!config.strict_references);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(SystemConfig::from_json("{ max_graph_depth: }").is_err());
    }
}

//! Graph configuration.
//!
//! ```
//! use kvgraph_engine::GraphConfig;
//!
//! let config = GraphConfig::default().namespace("social");
//! assert_eq!(config.namespace_str(), "social");
//!
//! let config = GraphConfig::from_toml_str("namespace = \"people\"").unwrap();
//! assert_eq!(config.namespace_str(), "people");
//! ```

use serde::{Deserialize, Serialize};

use kvgraph_core::{GraphError, Result};

use crate::graph::keys::{validate_namespace, DEFAULT_NAMESPACE};

/// Options for opening a [`crate::Graph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    /// Prefix for every key the graph writes. Graphs with different
    /// namespaces can share one store.
    pub namespace: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl GraphConfig {
    /// Set the namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// The configured namespace.
    pub fn namespace_str(&self) -> &str {
        &self.namespace
    }

    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| GraphError::invalid_input(format!("Invalid graph config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the options without opening anything.
    pub fn validate(&self) -> Result<()> {
        validate_namespace(&self.namespace)
    }
}

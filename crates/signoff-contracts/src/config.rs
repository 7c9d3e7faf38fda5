//! Engine configuration.
//!
//! Passed explicitly into the engine at construction; there is no
//! process-wide configuration state.
//!
//! Example in TOML:
//! ```toml
//! principal_kind = "user"
//! excluded_subject_types = ["archived_invoice"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{SignoffError, SignoffResult},
    ids::PrincipalRef,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Kind tag of the concrete principal that calls the engine
    /// (e.g. `"user"`, `"employee"`).
    #[serde(default = "default_principal_kind")]
    pub principal_kind: String,

    /// Subject types barred from ever being approved.
    #[serde(default)]
    pub excluded_subject_types: Vec<String>,
}

fn default_principal_kind() -> String {
    "user".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            principal_kind: default_principal_kind(),
            excluded_subject_types: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> SignoffResult<Self> {
        toml::from_str(s).map_err(|e| SignoffError::Configuration {
            reason: format!("failed to parse engine config TOML: {}", e),
        })
    }

    pub fn from_file(path: &Path) -> SignoffResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| SignoffError::Configuration {
            reason: format!("failed to read engine config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn is_excluded(&self, subject_type: &str) -> bool {
        self.excluded_subject_types.iter().any(|t| t == subject_type)
    }

    /// Build the principal reference for a bare principal id.
    pub fn principal(&self, id: impl Into<String>) -> PrincipalRef {
        PrincipalRef::new(self.principal_kind.clone(), id)
    }
}

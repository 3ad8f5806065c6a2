//! Method registry: read-only catalog of selectable method identifiers.
//!
//! The registry is loaded once and injected into the controller; nothing in
//! the crate keeps a global copy.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::draft::model::MethodId;

/// Errors that can occur while loading a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read method registry {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid method registry: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Display metadata for one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    /// Human-readable name shown next to the identifier.
    pub fullname: String,
}

/// Mapping from method identifier to its display metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodRegistry {
    methods: BTreeMap<MethodId, MethodInfo>,
}

impl MethodRegistry {
    /// Build a registry from `(id, fullname)` pairs.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let methods = entries
            .into_iter()
            .map(|(id, fullname)| {
                (
                    MethodId::new(id),
                    MethodInfo {
                        fullname: fullname.into(),
                    },
                )
            })
            .collect();
        Self { methods }
    }

    /// Parse the `{ "<id>": { "fullname": "..." } }` catalog format.
    ///
    /// Keys other than `fullname` are ignored.
    pub fn from_json_str(raw: &str) -> Result<Self, RegistryError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Load a registry file from disk.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let raw = fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let registry = Self::from_json_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            methods = registry.len(),
            "Method registry loaded"
        );
        Ok(registry)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.methods.contains_key(id)
    }

    pub fn display_name(&self, id: &str) -> Option<&str> {
        self.methods.get(id).map(|info| info.fullname.as_str())
    }

    /// Entries in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&MethodId, &MethodInfo)> {
        self.methods.iter()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_catalog_and_ignores_extra_keys() {
        let registry = MethodRegistry::from_json_str(
            r#"{
                "logreg": {"fullname": "Logistic Regression", "class": "sklearn.linear_model.LogisticRegression"},
                "dt": {"fullname": "Decision Tree"}
            }"#,
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("logreg"));
        assert_eq!(registry.display_name("dt"), Some("Decision Tree"));
        assert!(!registry.contains("svm"));

        let ids: Vec<&str> = registry.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["dt", "logreg"]);
    }

    #[test]
    fn missing_fullname_is_a_parse_error() {
        let err = MethodRegistry::from_json_str(r#"{"dt": {}}"#).unwrap_err();
        assert!(matches!(err, RegistryError::Parse(_)));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"knn": {{"fullname": "K Nearest Neighbors"}}}}"#).unwrap();

        let registry = MethodRegistry::load(file.path()).unwrap();
        assert_eq!(registry.display_name("knn"), Some("K Nearest Neighbors"));

        let missing = MethodRegistry::load(Path::new("/definitely/not/here.json"));
        assert!(matches!(missing, Err(RegistryError::Read { .. })));
    }
}

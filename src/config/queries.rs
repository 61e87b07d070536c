//! Persisted-query table
//!
//! Maps each JSON operation name to the hash the upstream endpoint knows it
//! by and to the literal query text used when that hash is rejected. The
//! table is read-only once loaded.

use crate::ConfigError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;

const EMBEDDED_QUERIES: &str = include_str!("persisted_queries.toml");

/// One persisted query: operation name, hash and decoded literal text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedQuery {
    pub operation: String,
    pub sha256: String,
    pub query: String,
}

#[derive(Debug, Deserialize)]
struct QueryFile {
    #[serde(default)]
    query: Vec<QueryRow>,
}

#[derive(Debug, Deserialize)]
struct QueryRow {
    operation: String,
    sha256: String,
    /// Base64-encoded literal query text
    query: String,
}

/// Lookup table of persisted queries keyed by operation name
#[derive(Debug, Clone, Default)]
pub struct QueryTable {
    queries: HashMap<String, PersistedQuery>,
}

impl QueryTable {
    /// Loads the table compiled into the crate
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml(EMBEDDED_QUERIES)
    }

    /// Loads a refreshed table from disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses and decodes a table from TOML text
    ///
    /// Every row must carry a 64 character hex hash and base64 text that
    /// decodes to UTF-8. A hash that is not the SHA-256 of the decoded text
    /// is accepted with a warning, since upstream may hash a normalised form.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: QueryFile = toml::from_str(content)?;
        let mut queries = HashMap::with_capacity(file.query.len());

        for row in file.query {
            let query = decode_row(&row)?;
            queries.insert(query.operation.clone(), query);
        }

        Ok(Self { queries })
    }

    /// Returns the persisted query for an operation name
    pub fn get(&self, operation: &str) -> Option<&PersistedQuery> {
        self.queries.get(operation)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Adds or replaces a query. Used to build tables in code.
    pub fn insert(&mut self, operation: &str, sha256: &str, query: &str) {
        self.queries.insert(
            operation.to_string(),
            PersistedQuery {
                operation: operation.to_string(),
                sha256: sha256.to_string(),
                query: query.to_string(),
            },
        );
    }
}

fn decode_row(row: &QueryRow) -> Result<PersistedQuery, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidQuery {
        operation: row.operation.clone(),
        reason,
    };

    if row.sha256.len() != 64 || !row.sha256.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid(format!("'{}' is not a SHA-256 hex digest", row.sha256)));
    }

    let bytes = STANDARD
        .decode(row.query.trim())
        .map_err(|e| invalid(format!("query is not valid base64: {}", e)))?;
    let query =
        String::from_utf8(bytes).map_err(|e| invalid(format!("query is not UTF-8: {}", e)))?;

    let digest = hex::encode(Sha256::digest(query.as_bytes()));
    if !digest.eq_ignore_ascii_case(&row.sha256) {
        tracing::warn!(
            operation = %row.operation,
            "Persisted query hash does not match its literal text"
        );
    }

    Ok(PersistedQuery {
        operation: row.operation.clone(),
        sha256: row.sha256.to_lowercase(),
        query,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Operation;

    #[test]
    fn test_embedded_table_covers_every_operation() {
        let table = QueryTable::embedded().unwrap();
        for operation in Operation::all() {
            let query = table
                .get(operation.name())
                .unwrap_or_else(|| panic!("missing {}", operation.name()));
            assert!(query.query.starts_with("query "));
            assert!(query.query.contains(operation.name()));
        }
    }

    #[test]
    fn test_hash_differing_from_text_is_accepted() {
        let toml = format!(
            "[[query]]\noperation = \"Op\"\nsha256 = \"{}\"\nquery = \"{}\"\n",
            "F".repeat(64),
            STANDARD.encode("query Op { x }")
        );
        let table = QueryTable::from_toml(&toml).unwrap();
        let query = table.get("Op").unwrap();
        assert_eq!(query.sha256, "f".repeat(64));
        assert_eq!(query.query, "query Op { x }");
    }

    #[test]
    fn test_decodes_base64_text() {
        let toml = format!(
            "[[query]]\noperation = \"Op\"\nsha256 = \"{}\"\nquery = \"{}\"\n",
            "a".repeat(64),
            STANDARD.encode("query Op { x }")
        );
        let table = QueryTable::from_toml(&toml).unwrap();
        assert_eq!(table.get("Op").unwrap().query, "query Op { x }");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_rejects_bad_hash() {
        let toml = "[[query]]\noperation = \"Op\"\nsha256 = \"abc\"\nquery = \"eA==\"\n";
        let result = QueryTable::from_toml(toml);
        assert!(matches!(result, Err(ConfigError::InvalidQuery { .. })));
    }

    #[test]
    fn test_rejects_bad_base64() {
        let toml = format!(
            "[[query]]\noperation = \"Op\"\nsha256 = \"{}\"\nquery = \"!!!\"\n",
            "0".repeat(64)
        );
        let result = QueryTable::from_toml(&toml);
        assert!(matches!(result, Err(ConfigError::InvalidQuery { .. })));
    }

    #[test]
    fn test_empty_table() {
        let table = QueryTable::from_toml("").unwrap();
        assert!(table.is_empty());
        assert!(table.get("TitleNewsPagination").is_none());
    }
}

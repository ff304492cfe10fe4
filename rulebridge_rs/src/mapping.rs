//! Externally curated command-mapping table.
//!
//! An ordered list of source-prefix to target-command entries, versioned and
//! hot-swappable: operators extend or correct mappings in a TOML file without
//! recompiling the generator. Entry order is significant and preserved
//! exactly as configured, so a more specific prefix can be listed before a
//! more general one.
//!
//! Reloading replaces the whole table via [`TableHandle::swap`]; in-flight
//! translations keep the snapshot they started with.

use std::path::Path;
use std::sync::{Arc, OnceLock, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// One row of the table: first entry whose `source_prefix` is a prefix of the
/// command name wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub source_prefix: String,
    pub target_command: String,
    /// Where this mapping came from (vendor kit, operator override, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<String>,
}

/// Immutable snapshot of the mapping configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingTable {
    pub version: String,
    entries: Vec<MappingEntry>,
}

/// Errors from loading an external table. [`MappingTable::load`] recovers
/// from all of these by falling back to the built-in table.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("failed to read mapping table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse mapping table {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("mapping table {path}: entry {index} has an empty source_prefix")]
    EmptyPrefix { path: String, index: usize },
    #[error("mapping table {path}: duplicate source_prefix `{prefix}`")]
    DuplicatePrefix { path: String, prefix: String },
}

/// On-disk shape of the table file.
///
/// `[[mapping]]` is an array of tables, so the configured order survives the
/// round trip. A missing `version` is allowed for hand-edited files.
#[derive(Debug, Deserialize)]
struct RawTable {
    #[serde(default)]
    version: Option<String>,
    #[serde(default, rename = "mapping")]
    mappings: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    source_prefix: String,
    target: String,
    #[serde(default)]
    provenance: Option<String>,
}

impl MappingTable {
    pub fn new(version: impl Into<String>, entries: Vec<MappingEntry>) -> Self {
        Self {
            version: version.into(),
            entries,
        }
    }

    /// Minimal built-in table used whenever no external table is supplied or
    /// the external resource is unavailable.
    pub fn builtin() -> &'static MappingTable {
        static TABLE: OnceLock<MappingTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            MappingTable::new(
                format!("builtin-{}", env!("CARGO_PKG_VERSION")),
                vec![
                    MappingEntry {
                        source_prefix: "HTTP::header".to_string(),
                        target_command: "set_header".to_string(),
                        provenance: Some("builtin".to_string()),
                    },
                    MappingEntry {
                        source_prefix: "HTTP::uri".to_string(),
                        target_command: "rewrite_uri".to_string(),
                        provenance: Some("builtin".to_string()),
                    },
                ],
            )
        })
    }

    /// Resolve a command name to the first entry whose prefix matches.
    pub fn resolve(&self, command: &str) -> Option<&MappingEntry> {
        self.entries
            .iter()
            .find(|entry| command.starts_with(entry.source_prefix.as_str()))
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load an external table, falling back to the built-in table when the
    /// file is missing, unreadable, or malformed. The translation still
    /// completes either way, just with correspondingly lower coverage.
    pub fn load(path: &Path) -> MappingTable {
        match Self::load_from_path(path) {
            Ok(table) => table,
            Err(err) => {
                warn!("{err}; using built-in table");
                Self::builtin().clone()
            }
        }
    }

    /// Strict variant of [`MappingTable::load`]: surfaces the exact failure
    /// instead of falling back.
    pub fn load_from_path(path: &Path) -> Result<MappingTable, MappingError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| MappingError::Io {
            path: display.clone(),
            source,
        })?;
        let raw: RawTable = toml::from_str(&content).map_err(|source| MappingError::Parse {
            path: display.clone(),
            source,
        })?;

        let mut entries = Vec::with_capacity(raw.mappings.len());
        for (index, entry) in raw.mappings.into_iter().enumerate() {
            if entry.source_prefix.is_empty() {
                return Err(MappingError::EmptyPrefix {
                    path: display,
                    index,
                });
            }
            if entries
                .iter()
                .any(|e: &MappingEntry| e.source_prefix == entry.source_prefix)
            {
                return Err(MappingError::DuplicatePrefix {
                    path: display,
                    prefix: entry.source_prefix,
                });
            }
            entries.push(MappingEntry {
                source_prefix: entry.source_prefix,
                target_command: entry.target,
                provenance: entry.provenance,
            });
        }

        let version = raw
            .version
            .unwrap_or_else(|| format!("unversioned:{display}"));
        Ok(MappingTable::new(version, entries))
    }
}

/// Process-wide handle to the active table.
///
/// Reads hand out `Arc` snapshots; [`TableHandle::swap`] replaces the whole
/// table atomically, never editing entries in place, so concurrent
/// translations always see a consistent snapshot.
#[derive(Debug)]
pub struct TableHandle {
    inner: RwLock<Arc<MappingTable>>,
}

impl TableHandle {
    pub fn new(table: MappingTable) -> Self {
        Self {
            inner: RwLock::new(Arc::new(table)),
        }
    }

    pub fn builtin() -> Self {
        Self::new(MappingTable::builtin().clone())
    }

    /// Snapshot of the table as of now. Later swaps do not affect it.
    pub fn snapshot(&self) -> Arc<MappingTable> {
        self.inner
            .read()
            .expect("mapping table lock poisoned")
            .clone()
    }

    /// Replace the active table. In-flight snapshots are untouched.
    pub fn swap(&self, table: MappingTable) {
        let mut guard = self.inner.write().expect("mapping table lock poisoned");
        *guard = Arc::new(table);
    }

    /// Reload from an external file and swap it in. On failure the active
    /// table stays as-is.
    pub fn reload(&self, path: &Path) -> Result<(), MappingError> {
        let table = MappingTable::load_from_path(path)?;
        self.swap(table);
        Ok(())
    }
}

impl Default for TableHandle {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_table(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create table file");
        write!(file, "{content}").expect("write table file");
        path
    }

    #[test]
    fn test_builtin_table_resolves_default_mappings() {
        let table = MappingTable::builtin();
        assert_eq!(
            table.resolve("HTTP::header").unwrap().target_command,
            "set_header"
        );
        assert_eq!(
            table.resolve("HTTP::uri").unwrap().target_command,
            "rewrite_uri"
        );
        assert!(table.resolve("table").is_none());
    }

    #[test]
    fn test_first_matching_prefix_wins() {
        let table = MappingTable::new(
            "test",
            vec![
                MappingEntry {
                    source_prefix: "HTTP::header insert".to_string(),
                    target_command: "add_header".to_string(),
                    provenance: None,
                },
                MappingEntry {
                    source_prefix: "HTTP::header".to_string(),
                    target_command: "set_header".to_string(),
                    provenance: None,
                },
            ],
        );
        // More specific entry listed first takes precedence.
        assert_eq!(
            table.resolve("HTTP::header insert").unwrap().target_command,
            "add_header"
        );
        assert_eq!(
            table.resolve("HTTP::header").unwrap().target_command,
            "set_header"
        );
    }

    #[test]
    fn test_order_is_significant_not_longest_match() {
        let table = MappingTable::new(
            "test",
            vec![
                MappingEntry {
                    source_prefix: "HTTP::".to_string(),
                    target_command: "generic_http".to_string(),
                    provenance: None,
                },
                MappingEntry {
                    source_prefix: "HTTP::header".to_string(),
                    target_command: "set_header".to_string(),
                    provenance: None,
                },
            ],
        );
        // The general entry shadows the specific one when listed first.
        assert_eq!(
            table.resolve("HTTP::header").unwrap().target_command,
            "generic_http"
        );
    }

    #[test]
    fn test_load_from_path_preserves_configured_order() {
        let dir = TempDir::new().unwrap();
        let path = write_table(
            &dir,
            "mappings.toml",
            r#"
version = "2026.03"

[[mapping]]
source_prefix = "HTTP::header"
target = "http_header_rewrite"
provenance = "acme-kit"

[[mapping]]
source_prefix = "HTTP::uri"
target = "uri_rewrite"
"#,
        );
        let table = MappingTable::load_from_path(&path).unwrap();
        assert_eq!(table.version, "2026.03");
        assert_eq!(table.len(), 2);
        assert_eq!(table.entries()[0].source_prefix, "HTTP::header");
        assert_eq!(table.entries()[0].provenance.as_deref(), Some("acme-kit"));
        assert_eq!(table.entries()[1].target_command, "uri_rewrite");
    }

    #[test]
    fn test_load_from_path_rejects_duplicates() {
        let dir = TempDir::new().unwrap();
        let path = write_table(
            &dir,
            "dup.toml",
            r#"
[[mapping]]
source_prefix = "set"
target = "assign"

[[mapping]]
source_prefix = "set"
target = "assign_again"
"#,
        );
        let err = MappingTable::load_from_path(&path).unwrap_err();
        assert!(matches!(err, MappingError::DuplicatePrefix { .. }));
    }

    #[test]
    fn test_load_falls_back_on_missing_file() {
        let dir = TempDir::new().unwrap();
        let table = MappingTable::load(&dir.path().join("nope.toml"));
        assert_eq!(table, *MappingTable::builtin());
    }

    #[test]
    fn test_load_falls_back_on_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = write_table(&dir, "broken.toml", "this is not { toml");
        let table = MappingTable::load(&path);
        assert_eq!(table, *MappingTable::builtin());
    }

    #[test]
    fn test_handle_swap_leaves_old_snapshots_untouched() {
        let handle = TableHandle::builtin();
        let before = handle.snapshot();
        handle.swap(MappingTable::new("v2", Vec::new()));
        let after = handle.snapshot();
        assert_eq!(before.version, MappingTable::builtin().version);
        assert_eq!(after.version, "v2");
        assert!(after.is_empty());
    }

    #[test]
    fn test_handle_reload_keeps_table_on_error() {
        let dir = TempDir::new().unwrap();
        let handle = TableHandle::builtin();
        let err = handle.reload(&dir.path().join("missing.toml"));
        assert!(err.is_err());
        assert_eq!(handle.snapshot().version, MappingTable::builtin().version);
    }
}

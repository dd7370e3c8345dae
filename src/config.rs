//! # Configuration URI resolution
//!
//! Both stores the tool talks to (the exposure catalog and the APDB) are
//! located by a configuration URI on the command line. This build links a
//! single backend, the JSON [`SnapshotStore`](crate::snapshot::SnapshotStore);
//! URIs naming any other backend type are a fatal configuration error, never
//! silently ignored.

use camino::Utf8PathBuf;

use crate::admin_errors::AdminError;
use crate::snapshot::SnapshotStore;

/// Resolved store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// JSON snapshot file.
    Snapshot(Utf8PathBuf),
}

impl StoreConfig {
    /// Resolve a configuration URI.
    ///
    /// Accepted forms: `snapshot:<path>` and bare paths ending in `.json`.
    /// A URI with any other scheme names a backend this build does not
    /// support; a bare path without a recognizable extension is malformed.
    pub fn from_uri(uri: &str) -> Result<Self, AdminError> {
        if uri.is_empty() {
            return Err(AdminError::InvalidConfigUri(uri.to_string()));
        }
        if let Some(path) = uri.strip_prefix("snapshot:") {
            if path.is_empty() {
                return Err(AdminError::InvalidConfigUri(uri.to_string()));
            }
            return Ok(StoreConfig::Snapshot(Utf8PathBuf::from(path)));
        }
        if let Some((scheme, _)) = uri.split_once(':') {
            return Err(AdminError::UnsupportedApdbConfig(scheme.to_string()));
        }
        if uri.ends_with(".json") {
            return Ok(StoreConfig::Snapshot(Utf8PathBuf::from(uri)));
        }
        Err(AdminError::InvalidConfigUri(uri.to_string()))
    }

    /// Open the store this configuration points at.
    pub fn open(&self) -> Result<SnapshotStore, AdminError> {
        match self {
            StoreConfig::Snapshot(path) => SnapshotStore::load(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_uris_resolve() {
        assert_eq!(
            StoreConfig::from_uri("snapshot:/data/visit.json").unwrap(),
            StoreConfig::Snapshot(Utf8PathBuf::from("/data/visit.json"))
        );
        assert_eq!(
            StoreConfig::from_uri("visit.json").unwrap(),
            StoreConfig::Snapshot(Utf8PathBuf::from("visit.json"))
        );
    }

    #[test]
    fn foreign_backends_are_unsupported() {
        assert!(matches!(
            StoreConfig::from_uri("cassandra://cluster/apdb"),
            Err(AdminError::UnsupportedApdbConfig(scheme)) if scheme == "cassandra"
        ));
        assert!(matches!(
            StoreConfig::from_uri("sql:postgresql://host/db"),
            Err(AdminError::UnsupportedApdbConfig(scheme)) if scheme == "sql"
        ));
    }

    #[test]
    fn malformed_uris_are_invalid() {
        assert!(matches!(
            StoreConfig::from_uri(""),
            Err(AdminError::InvalidConfigUri(_))
        ));
        assert!(matches!(
            StoreConfig::from_uri("snapshot:"),
            Err(AdminError::InvalidConfigUri(_))
        ));
        assert!(matches!(
            StoreConfig::from_uri("not-a-config"),
            Err(AdminError::InvalidConfigUri(_))
        ));
    }
}

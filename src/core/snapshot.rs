//! Configuration snapshots returned by configd.

use crate::core::Fingerprint;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A single access to a configuration, as recorded by configd.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRecord {
    /// Source identity of the reader
    pub source: String,
    /// Instance identity of the reader
    pub instance: String,
    /// When the access happened
    pub timestamp: DateTime<Utc>,
    /// Timestamp of the same reader's previous access, if any
    #[serde(default)]
    pub previous: Option<DateTime<Utc>>,
}

/// The result of one fetch of a configuration resource.
///
/// The `data` document is opaque to the client; decode it into your own type
/// with [`ConfigSnapshot::decode`].
///
/// # Examples
///
/// ```rust
/// use configd_client::core::ConfigSnapshot;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Database {
///     host: String,
///     port: u16,
/// }
///
/// let snapshot: ConfigSnapshot = serde_json::from_str(r#"{
///     "schema_id": "db-schema",
///     "id": "dev",
///     "name": "Development",
///     "data": {"host": "localhost", "port": 5432},
///     "valid": true,
///     "checksum": "abc123",
///     "accesses": [],
///     "created_at": "2024-01-01T00:00:00Z",
///     "updated_at": "2024-01-02T00:00:00Z",
///     "version": 4
/// }"#).unwrap();
///
/// let db: Database = snapshot.decode().unwrap();
/// assert_eq!(db.port, 5432);
/// assert_eq!(snapshot.fingerprint().version(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// Schema the configuration belongs to
    pub schema_id: String,
    /// Configuration identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Raw configuration document
    #[serde(default)]
    pub data: JsonValue,
    /// Whether configd considers the data valid against its schema
    #[serde(default)]
    pub valid: bool,
    /// Content checksum computed by configd
    pub checksum: String,
    /// Readers that accessed this configuration
    #[serde(rename = "accesses", default)]
    pub access_log: Vec<AccessRecord>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
    /// Version assigned by configd, increasing on every update
    pub version: i64,
}

impl ConfigSnapshot {
    /// The change fingerprint of this snapshot.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new(self.checksum.clone(), self.version)
    }

    /// Decode the configuration document into a caller-defined type.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Decode`](crate::error::ClientError::Decode) if the
    /// document does not match the shape of `T`.
    pub fn decode<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        Ok(T::deserialize(&self.data)?)
    }

    /// The most recent access record, if configd reported any.
    pub fn last_access(&self) -> Option<&AccessRecord> {
        self.access_log.iter().max_by_key(|access| access.timestamp)
    }
}

//! Change detection for polled snapshots.

use crate::core::ConfigSnapshot;
use std::fmt;

/// Identity of a snapshot's content: its checksum and version.
///
/// Two snapshots with equal fingerprints are treated as the same
/// configuration, even when metadata such as the access log differs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    checksum: String,
    version: i64,
}

impl Fingerprint {
    /// Create a fingerprint from a checksum and version.
    pub fn new(checksum: impl Into<String>, version: i64) -> Self {
        Self {
            checksum: checksum.into(),
            version,
        }
    }

    /// The content checksum.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// The configd version number.
    pub fn version(&self) -> i64 {
        self.version
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{} ({})", self.version, self.checksum)
    }
}

/// State owned by a running poll loop.
///
/// Remembers the fingerprint of the last snapshot that was delivered to the
/// handler. Once updated it is never rolled back.
#[derive(Debug, Default)]
pub struct PollState {
    last: Option<Fingerprint>,
}

impl PollState {
    /// Create an empty state; the first observed snapshot always counts as a change.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a snapshot and report whether it differs from the last one seen.
    ///
    /// Returns `true` (and remembers the new fingerprint) when no snapshot has
    /// been observed yet or when the checksum or version changed.
    pub fn observe(&mut self, snapshot: &ConfigSnapshot) -> bool {
        let unchanged = self.last.as_ref().is_some_and(|last| {
            last.version == snapshot.version && last.checksum == snapshot.checksum
        });

        if unchanged {
            return false;
        }

        self.last = Some(snapshot.fingerprint());
        true
    }

    /// The last fingerprint delivered to the handler.
    pub fn last(&self) -> Option<&Fingerprint> {
        self.last.as_ref()
    }
}

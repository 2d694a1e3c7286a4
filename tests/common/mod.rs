//! Shared helpers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use configd_client::core::AccessRecord;
use configd_client::prelude::*;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Build a snapshot with the given fingerprint.
pub fn snapshot(checksum: &str, version: i64) -> ConfigSnapshot {
    ConfigSnapshot {
        schema_id: "custom-schema".to_string(),
        id: "dev".to_string(),
        name: "Development".to_string(),
        data: serde_json::json!({ "env": "dev", "version": version }),
        valid: true,
        checksum: checksum.to_string(),
        access_log: Vec::new(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        version,
    }
}

/// Like [`snapshot`], with one access record per reader instance.
pub fn snapshot_read_by(checksum: &str, version: i64, instances: &[&str]) -> ConfigSnapshot {
    let mut snapshot = snapshot(checksum, version);
    snapshot.access_log = instances
        .iter()
        .map(|instance| AccessRecord {
            source: "tests".to_string(),
            instance: instance.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap(),
            previous: None,
        })
        .collect();
    snapshot
}

/// A fetcher that replays a fixed script of results.
///
/// Once the script is exhausted it keeps returning `fallback` if set,
/// otherwise a decode error.
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<Result<ConfigSnapshot>>>,
    fallback: Option<ConfigSnapshot>,
    delay: Duration,
    calls: AtomicUsize,
    requested: Mutex<Vec<(String, String)>>,
}

impl ScriptedFetcher {
    pub fn new(script: Vec<Result<ConfigSnapshot>>) -> Arc<Self> {
        Self::build(script, None, Duration::ZERO)
    }

    pub fn repeating(snapshot: ConfigSnapshot) -> Arc<Self> {
        Self::build(Vec::new(), Some(snapshot), Duration::ZERO)
    }

    pub fn slow(script: Vec<Result<ConfigSnapshot>>, delay: Duration) -> Arc<Self> {
        Self::build(script, None, delay)
    }

    fn build(
        script: Vec<Result<ConfigSnapshot>>,
        fallback: Option<ConfigSnapshot>,
        delay: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            delay,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<(String, String)> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl ConfigFetcher for ScriptedFetcher {
    async fn fetch(&self, schema_id: &str, config_id: &str) -> Result<ConfigSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested
            .lock()
            .push((schema_id.to_string(), config_id.to_string()));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let next = self.script.lock().pop_front();
        match next {
            Some(result) => result,
            None => self.fallback.clone().ok_or_else(|| ClientError::Decode {
                message: "script exhausted".to_string(),
            }),
        }
    }

    fn name(&self) -> String {
        "scripted".to_string()
    }
}

/// Client wired to the given fetcher.
pub fn client(fetcher: Arc<ScriptedFetcher>) -> ConfigdClient {
    ConfigdClient::builder()
        .with_url("http://configd.test")
        .with_source("tests")
        .with_instance("tests-1")
        .with_shared_fetcher(fetcher)
        .build()
        .unwrap()
}

/// Records every snapshot passed to the handler it creates.
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Arc<Mutex<Vec<ConfigSnapshot>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler(
        &self,
    ) -> impl FnMut(&ConfigSnapshot) -> std::result::Result<(), String> + Send + 'static {
        let seen = Arc::clone(&self.seen);
        move |snapshot: &ConfigSnapshot| {
            seen.lock().push(snapshot.clone());
            Ok(())
        }
    }

    pub fn versions(&self) -> Vec<i64> {
        self.seen.lock().iter().map(|s| s.version).collect()
    }

    pub fn checksums(&self) -> Vec<String> {
        self.seen.lock().iter().map(|s| s.checksum.clone()).collect()
    }

    pub fn count(&self) -> usize {
        self.seen.lock().len()
    }
}

/// Install a test subscriber once; ignores repeated calls.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

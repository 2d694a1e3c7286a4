//! Client settings and their loader.

use crate::error::Result;
use config::{Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default per-request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_SECS * 1000
}

/// Construction settings for a [`ConfigdClient`](crate::core::ConfigdClient).
///
/// Missing identity fields deserialize as empty strings so that client
/// construction reports the precise validation error.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Base URL of the configd service
    #[serde(default)]
    pub url: String,
    /// Source identity
    #[serde(default)]
    pub source: String,
    /// Instance identity
    #[serde(default)]
    pub instance: String,
    /// Optional configuration password
    #[serde(default)]
    pub password: Option<String>,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ClientSettings {
    /// Create settings with the required identity fields.
    pub fn new(
        url: impl Into<String>,
        source: impl Into<String>,
        instance: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
            instance: instance.into(),
            password: None,
            request_timeout_ms: default_timeout_ms(),
        }
    }

    /// Set the configuration password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the per-request timeout, kept to millisecond precision.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// The per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("url", &self.url)
            .field("source", &self.source)
            .field("instance", &self.instance)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

/// Loads [`ClientSettings`] from files and environment variables.
///
/// Files are merged in the order they are added (later files override
/// earlier ones); environment variables override all files. Formats are
/// detected from the file extension: YAML, TOML or JSON.
///
/// # Examples
///
/// ```rust,no_run
/// use configd_client::core::SettingsLoader;
///
/// # fn example() -> configd_client::error::Result<()> {
/// // CONFIGD__URL=http://configd:8080 -> url = "http://configd:8080"
/// let settings = SettingsLoader::new()
///     .with_file("config/configd.yaml")
///     .with_env_overrides("CONFIGD", "__")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SettingsLoader {
    files: Vec<PathBuf>,
    env_prefix: Option<String>,
    env_separator: Option<String>,
}

impl SettingsLoader {
    /// Create a loader with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required settings file.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Read overrides from environment variables with the given prefix.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Prefix for environment variables (e.g., "CONFIGD")
    /// * `separator` - Separator for nested keys (e.g., "__")
    pub fn with_env_overrides(mut self, prefix: &str, separator: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self.env_separator = Some(separator.to_string());
        self
    }

    /// Load and merge all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Settings`](crate::error::ClientError::Settings) if:
    /// - A file is missing or cannot be parsed
    /// - The merged values do not deserialize into [`ClientSettings`]
    pub fn load(&self) -> Result<ClientSettings> {
        let mut builder = config::Config::builder();

        for path in &self.files {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        if let (Some(prefix), Some(separator)) = (&self.env_prefix, &self.env_separator) {
            // Values stay strings; numeric fields are parsed on deserialize.
            builder = builder.add_source(Environment::with_prefix(prefix).separator(separator));
        }

        let settings = builder.build()?.try_deserialize::<ClientSettings>()?;
        tracing::debug!(?settings, "client settings loaded");
        Ok(settings)
    }
}

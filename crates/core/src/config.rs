//! Engine configuration.
//!
//! Loaded from an optional JSON file, then overridden field by field from
//! `CODENAV_*` environment variables. Invalid override values are logged and
//! ignored.

use codenav_api::LocationKind;
use codenav_api::MonikerKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ENV_PREFIX: &str = "CODENAV_";

/// Moniker kinds searched in other uploads, per result type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteMonikerKinds {
    pub definitions: Vec<MonikerKind>,
    pub references: Vec<MonikerKind>,
    pub implementations: Vec<MonikerKind>,
}

impl Default for RemoteMonikerKinds {
    fn default() -> Self {
        Self {
            definitions: vec![MonikerKind::Import],
            references: vec![MonikerKind::Import, MonikerKind::Export],
            implementations: vec![MonikerKind::Export, MonikerKind::Implementation],
        }
    }
}

impl RemoteMonikerKinds {
    pub fn for_kind(&self, kind: LocationKind) -> &[MonikerKind] {
        match kind {
            LocationKind::Definitions => &self.definitions,
            LocationKind::References => &self.references,
            LocationKind::Implementations => &self.implementations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeNavConfig {
    /// SQLite database holding uploads and documents (CODENAV_DATABASE_PATH)
    pub database_path: PathBuf,
    /// Read pool size (CODENAV_POOL_SIZE)
    pub pool_size: u32,
    /// Read pool minimum idle connections (CODENAV_POOL_MIN_IDLE)
    pub pool_min_idle: u32,
    /// SQLite busy timeout (CODENAV_BUSY_TIMEOUT_SECS)
    pub busy_timeout_secs: u64,
    /// Cap on distinct monikers searched per request (CODENAV_MONIKER_LIMIT)
    pub moniker_limit: usize,
    /// Definition locations inspected by the hover slow path (CODENAV_DEFINITIONS_LIMIT)
    pub definitions_limit: usize,
    /// Candidate uploads fetched per remote batch (CODENAV_UPLOAD_BATCH_SIZE)
    pub upload_batch_size: usize,
    /// Byte budget of the line-range cache, 0 disables it (CODENAV_LINE_CACHE_BUDGET_BYTES)
    pub line_cache_budget_bytes: usize,
    /// Directory for rolling log files (CODENAV_LOG_DIR)
    pub log_dir: PathBuf,
    /// Tracing filter directive, overridden by RUST_LOG (CODENAV_LOG)
    pub log_filter: String,
    /// Rotated log files kept per component (CODENAV_LOG_MAX_FILES)
    pub log_max_files: usize,
    pub remote_moniker_kinds: RemoteMonikerKinds,
}

impl Default for CodeNavConfig {
    fn default() -> Self {
        let base = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".codenav");
        Self {
            database_path: base.join("codenav.db"),
            pool_size: 8,
            pool_min_idle: 1,
            busy_timeout_secs: 30,
            moniker_limit: 10,
            definitions_limit: 100,
            upload_batch_size: 100,
            line_cache_budget_bytes: 16 * 1024 * 1024,
            log_dir: base.join("logs"),
            log_filter: "info".to_string(),
            log_max_files: 7,
            remote_moniker_kinds: RemoteMonikerKinds::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl CodeNavConfig {
    /// Reads `path` if given, then applies process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies overrides read through `lookup`, which receives the full
    /// variable name (e.g. `CODENAV_POOL_SIZE`).
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(val) = var("DATABASE_PATH") {
            self.database_path = PathBuf::from(val);
        }
        if let Some(val) = var("LOG_DIR") {
            self.log_dir = PathBuf::from(val);
        }
        if let Some(val) = var("LOG") {
            self.log_filter = val;
        }
        override_parsed(&mut self.log_max_files, "LOG_MAX_FILES", var("LOG_MAX_FILES"));
        override_parsed(&mut self.pool_size, "POOL_SIZE", var("POOL_SIZE"));
        override_parsed(&mut self.pool_min_idle, "POOL_MIN_IDLE", var("POOL_MIN_IDLE"));
        override_parsed(
            &mut self.busy_timeout_secs,
            "BUSY_TIMEOUT_SECS",
            var("BUSY_TIMEOUT_SECS"),
        );
        override_parsed(&mut self.moniker_limit, "MONIKER_LIMIT", var("MONIKER_LIMIT"));
        override_parsed(
            &mut self.definitions_limit,
            "DEFINITIONS_LIMIT",
            var("DEFINITIONS_LIMIT"),
        );
        override_parsed(
            &mut self.upload_batch_size,
            "UPLOAD_BATCH_SIZE",
            var("UPLOAD_BATCH_SIZE"),
        );
        override_parsed(
            &mut self.line_cache_budget_bytes,
            "LINE_CACHE_BUDGET_BYTES",
            var("LINE_CACHE_BUDGET_BYTES"),
        );

        if self.upload_batch_size == 0 {
            tracing::warn!("upload_batch_size must be positive, using 1");
            self.upload_batch_size = 1;
        }
        if self.pool_min_idle > self.pool_size {
            self.pool_min_idle = self.pool_size;
        }

        self
    }
}

fn override_parsed<T>(field: &mut T, name: &str, value: Option<String>)
where
    T: FromStr + std::fmt::Display,
{
    let Some(value) = value else {
        return;
    };
    match value.parse() {
        Ok(parsed) => *field = parsed,
        Err(_) => tracing::warn!(
            "Invalid {}{} value: {}, keeping {}",
            ENV_PREFIX,
            name,
            value,
            field
        ),
    }
}

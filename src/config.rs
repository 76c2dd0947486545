//! Tree-building configuration
//!
//! Loaded in layers: built-in defaults, then
//! `~/.config/chunktree/config.json` if it exists, then `CHUNKTREE_*`
//! environment variables. The CLI applies its own flags last.

use crate::digest::DigestKind;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_CHUNK_SIZE: usize = 2048;
pub const DEFAULT_WORKERS: usize = 3;
pub const DEFAULT_QUEUE_DEPTH: usize = 100;

/// How a tree is constructed from a chunk source
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// One leaf at a time on the calling thread
    Incremental,
    /// Parallel leaf hashing followed by bottom-up reduction
    #[default]
    Bulk,
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::Incremental => f.write_str("incremental"),
            BuildMode::Bulk => f.write_str("bulk"),
        }
    }
}

impl FromStr for BuildMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "incremental" => Ok(BuildMode::Incremental),
            "bulk" => Ok(BuildMode::Bulk),
            other => Err(Error::Config(format!("Unknown build mode: {}", other))),
        }
    }
}

/// Settings shared by every tree-building entry point
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Bytes per leaf chunk
    pub chunk_size: usize,
    /// Hash worker threads for bulk builds
    pub workers: usize,
    /// Bounded queue length between the reader and the workers
    pub queue_depth: usize,
    /// Digest used for leaves and internal nodes
    pub digest: DigestKind,
    /// Construction algorithm
    pub mode: BuildMode,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: DEFAULT_WORKERS,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            digest: DigestKind::default(),
            mode: BuildMode::default(),
        }
    }
}

impl TreeConfig {
    /// Default config file location (~/.config/chunktree/config.json)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("chunktree").join("config.json"))
    }

    /// Load defaults, the config file if present, then the environment
    pub fn load() -> Result<Self> {
        let config = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => TreeConfig::default(),
        };
        let config = config.with_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file; missing fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Apply `CHUNKTREE_*` overrides fetched through `lookup`
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(v) = lookup("CHUNKTREE_CHUNK_SIZE") {
            self.chunk_size = parse_var("CHUNKTREE_CHUNK_SIZE", &v)?;
        }
        if let Some(v) = lookup("CHUNKTREE_WORKERS") {
            self.workers = parse_var("CHUNKTREE_WORKERS", &v)?;
        }
        if let Some(v) = lookup("CHUNKTREE_QUEUE_DEPTH") {
            self.queue_depth = parse_var("CHUNKTREE_QUEUE_DEPTH", &v)?;
        }
        if let Some(v) = lookup("CHUNKTREE_DIGEST") {
            self.digest = v.parse()?;
        }
        if let Some(v) = lookup("CHUNKTREE_MODE") {
            self.mode = v.parse()?;
        }
        Ok(self)
    }

    /// Reject settings no builder can run with
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be greater than zero".into()));
        }
        if self.workers == 0 {
            return Err(Error::Config("workers must be greater than zero".into()));
        }
        if self.queue_depth == 0 {
            return Err(Error::Config("queue_depth must be greater than zero".into()));
        }
        Ok(())
    }
}

fn parse_var(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid {}={}: {}", key, value, e)))
}

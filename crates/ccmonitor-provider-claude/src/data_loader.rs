//! Discovery and parallel parsing of Claude Code usage logs
//!
//! Claude Code appends one JSONL line per API response under
//! `<config>/projects/<project>/<session>.jsonl`. The loader finds those
//! files, parses them on the rayon pool and hands back the usage events.
//!
//! # Locations
//!
//! When `CLAUDE_CONFIG_DIR` (comma separated, `projects` appended to each
//! entry) or `CLAUDE_DATA_PATH` (used as-is) is set, only those directories
//! are searched. Otherwise the loader looks at:
//! - `~/.claude/projects`
//! - `~/.config/claude/projects`
//!
//! # Examples
//!
//! ```no_run
//! use ccmonitor_core::provider::UsageSource;
//! use ccmonitor_provider_claude::DataLoader;
//!
//! # async fn example() -> ccmonitor_core::Result<()> {
//! let loader = DataLoader::new().await?;
//! let events = loader.load_events().await?;
//! println!("{} usage events", events.len());
//! # Ok(())
//! # }
//! ```

use crate::entry::RawJsonlEntry;
use async_trait::async_trait;
use ccmonitor_core::error::{CcmonitorError, Result};
use ccmonitor_core::provider::UsageSource;
use ccmonitor_core::types::UsageEvent;
use futures::StreamExt;
use futures::stream::Stream;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

/// Usage source backed by Claude Code project logs
#[derive(Debug, Clone)]
pub struct DataLoader {
    claude_paths: Vec<PathBuf>,
    rediscover: bool,
}

impl DataLoader {
    /// Discover the Claude data directories
    ///
    /// Finding no directory is not an error here. Discovery is retried on
    /// every load until a directory shows up, and until then
    /// [`UsageSource::load_events`] reports
    /// [`CcmonitorError::NoClaudeDirectory`].
    pub async fn new() -> Result<Self> {
        let paths = Self::discover_claude_paths().await?;
        if paths.is_empty() {
            info!("No Claude data directory yet, will keep looking");
        } else {
            debug!("Discovered {} Claude data directories", paths.len());
        }

        Ok(Self {
            claude_paths: paths,
            rediscover: true,
        })
    }

    /// Loader over explicit directories, skipping discovery
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            claude_paths: paths,
            rediscover: false,
        }
    }

    /// Directories searched for JSONL files
    pub fn paths(&self) -> &[PathBuf] {
        &self.claude_paths
    }

    fn env_paths() -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = std::env::var("CLAUDE_CONFIG_DIR")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| PathBuf::from(s).join("projects"))
                    .collect()
            })
            .unwrap_or_default();

        if let Ok(custom) = std::env::var("CLAUDE_DATA_PATH") {
            let custom = custom.trim();
            if !custom.is_empty() {
                paths.push(PathBuf::from(custom));
            }
        }
        paths
    }

    fn default_paths() -> Vec<PathBuf> {
        dirs::home_dir()
            .map(|home| {
                vec![
                    home.join(".claude").join("projects"),
                    home.join(".config").join("claude").join("projects"),
                ]
            })
            .unwrap_or_default()
    }

    async fn discover_claude_paths() -> Result<Vec<PathBuf>> {
        let overrides = Self::env_paths();
        let candidates = if overrides.is_empty() {
            Self::default_paths()
        } else {
            debug!("Using Claude data paths from the environment");
            overrides
        };

        let mut paths = Vec::new();
        for candidate in candidates {
            let is_dir = tokio::fs::metadata(&candidate)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if is_dir && !paths.contains(&candidate) {
                paths.push(candidate);
            } else if !is_dir {
                trace!("Skipping missing data path {}", candidate.display());
            }
        }
        Ok(paths)
    }

    /// Directories to search on this load
    async fn search_paths(&self) -> Result<Vec<PathBuf>> {
        let paths = if self.claude_paths.is_empty() && self.rediscover {
            Self::discover_claude_paths().await?
        } else {
            self.claude_paths.clone()
        };

        if paths.is_empty() {
            return Err(CcmonitorError::NoClaudeDirectory);
        }
        Ok(paths)
    }

    /// Find every `.jsonl` file under the data directories
    ///
    /// # Errors
    ///
    /// Returns [`CcmonitorError::NoClaudeDirectory`] when there is no
    /// directory to search.
    pub async fn find_jsonl_files(&self) -> Result<Vec<PathBuf>> {
        let mut jsonl_files = Vec::new();

        for base in self.search_paths().await? {
            let files = tokio::task::spawn_blocking(move || {
                walkdir::WalkDir::new(base)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .map(|e| e.into_path())
                    .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("jsonl"))
                    .collect::<Vec<_>>()
            })
            .await
            .map_err(|e| CcmonitorError::Io(std::io::Error::other(e.to_string())))?;

            jsonl_files.extend(files);
        }

        debug!("Found {} JSONL files", jsonl_files.len());
        Ok(jsonl_files)
    }

    fn unavailable(&self) -> CcmonitorError {
        let searched: Vec<String> = self
            .claude_paths
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        let searched = if searched.is_empty() {
            "the Claude data directories".to_string()
        } else {
            searched.join(", ")
        };
        CcmonitorError::DataUnavailable(format!("no JSONL usage files found in {searched}"))
    }
}

/// Parse `files` on the rayon pool, deduplicating across all of them
fn parse_files(files: Vec<PathBuf>) -> impl Stream<Item = Result<UsageEvent>> {
    async_stream::stream! {
        let num_files = files.len();
        if num_files == 0 {
            return;
        }

        let (tx, mut rx) = mpsc::channel::<Result<Vec<UsageEvent>>>(num_files);
        let seen = Arc::new(Mutex::new(HashSet::new()));
        let seen_clone = seen.clone();

        tokio::task::spawn_blocking(move || {
            files.par_iter().for_each(|path| {
                let result = parse_file(path, &seen_clone);
                let _ = tx.blocking_send(result);
            });
        });

        while let Some(result) = rx.recv().await {
            match result {
                Ok(events) => {
                    for event in events {
                        yield Ok(event);
                    }
                }
                Err(e) => yield Err(e),
            }
        }

        let unique = seen.lock().unwrap_or_else(PoisonError::into_inner).len();
        if unique > 0 {
            debug!("Processed {} unique keyed entries", unique);
        }
    }
}

/// Parse one JSONL file, skipping lines that are not usage records
fn parse_file(path: &Path, seen: &Mutex<HashSet<String>>) -> Result<Vec<UsageEvent>> {
    let content = std::fs::read_to_string(path)?;
    let mut events = Vec::new();
    let mut duplicates = 0usize;

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let raw = match serde_json::from_str::<RawJsonlEntry>(line) {
            Ok(raw) => raw,
            Err(e) => {
                trace!("Skipping non-usage line in {}: {}", path.display(), e);
                continue;
            }
        };

        // Only lines that become events claim their key
        let key = raw.dedup_key();
        let Some(event) = raw.into_event() else {
            continue;
        };

        if let Some(key) = key {
            let mut seen = seen.lock().unwrap_or_else(PoisonError::into_inner);
            if !seen.insert(key) {
                duplicates += 1;
                continue;
            }
        }
        events.push(event);
    }

    if duplicates > 0 {
        debug!("Skipped {} duplicate entries in {}", duplicates, path.display());
    }
    Ok(events)
}

#[async_trait]
impl UsageSource for DataLoader {
    async fn load_events(&self) -> Result<Vec<UsageEvent>> {
        let files = self.find_jsonl_files().await?;
        if files.is_empty() {
            return Err(self.unavailable());
        }

        let stream = parse_files(files);
        tokio::pin!(stream);

        let mut events = Vec::new();
        while let Some(result) = stream.next().await {
            match result {
                Ok(event) => events.push(event),
                Err(e) => warn!("Skipping unreadable usage file: {}", e),
            }
        }

        events.sort_by_key(UsageEvent::time);
        info!("Loaded {} usage events", events.len());
        Ok(events)
    }
}

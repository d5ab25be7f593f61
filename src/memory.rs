use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Append-only record of the mention IDs that already got a reply.
///
/// One ID per line. Nothing is ever removed, so a duplicate line can only
/// come from saving the same ID twice; `load_processed_tweets` collapses it.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    path: PathBuf,
}

impl MemoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MemoryStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lock file used by the cooldown gate, kept next to the cache file.
    pub fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    // Missing or unreadable file means nothing has been processed yet
    pub fn load_processed_tweets(&self) -> HashSet<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no processed-id cache yet");
                HashSet::new()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read processed-id cache");
                HashSet::new()
            }
        }
    }

    /// Appends one ID. Failures are logged, never returned.
    pub fn save_processed_tweet(&self, tweet_id: &str) {
        if let Err(e) = self.append(tweet_id) {
            warn!(
                path = %self.path.display(),
                tweet_id,
                error = %e,
                "failed to record processed tweet"
            );
        }
    }

    fn append(&self, tweet_id: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", tweet_id)?;
        Ok(())
    }
}

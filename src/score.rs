use std::fs;
use std::io;
use std::path::PathBuf;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Fixed key the best score is stored under, mirroring a browser
/// localStorage entry. Nothing else is ever persisted.
pub const BEST_SCORE_KEY: &str = "tile-slider.best-score";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ScoreFile {
    #[serde(rename = "tile-slider.best-score")]
    best_moves: Option<u32>,
}

/// Durable home of the single best-move-count scalar.
#[derive(Debug)]
pub struct ScoreStore {
    path: PathBuf,
}

impl ScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Best score on record, `None` when the file is missing or unreadable.
    /// A corrupt file is treated as absent rather than fatal.
    pub fn load(&self) -> Option<u32> {
        let data = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<ScoreFile>(&data) {
            Ok(file) => file.best_moves,
            Err(err) => {
                warn!("ignoring unreadable score file {}: {}", self.path.display(), err);
                None
            }
        }
    }

    /// Record a finished game. Returns `true` when `moves` sets (or first
    /// establishes) the record; an equal or worse result leaves the file
    /// untouched.
    pub fn record(&self, moves: u32) -> io::Result<bool> {
        match self.load() {
            Some(best) if best <= moves => Ok(false),
            _ => {
                let file = ScoreFile {
                    best_moves: Some(moves),
                };
                let data = serde_json::to_string(&file)?;
                fs::write(&self.path, data)?;
                debug!("recorded new best score: {} moves", moves);
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn scratch_store() -> ScoreStore {
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "tile-slider-score-{}-{}.json",
            std::process::id(),
            id
        ));
        let _ = fs::remove_file(&path);
        ScoreStore::new(path)
    }

    #[test]
    fn missing_file_means_no_record() {
        let store = scratch_store();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn first_result_sets_the_record() {
        let store = scratch_store();
        assert!(store.record(80).unwrap());
        assert_eq!(store.load(), Some(80));
    }

    #[test]
    fn only_strictly_better_results_replace_the_record() {
        let store = scratch_store();
        assert!(store.record(50).unwrap());
        assert!(!store.record(50).unwrap());
        assert!(!store.record(70).unwrap());
        assert_eq!(store.load(), Some(50));
        assert!(store.record(42).unwrap());
        assert_eq!(store.load(), Some(42));
    }

    #[test]
    fn file_uses_the_fixed_key() {
        let store = scratch_store();
        store.record(9).unwrap();
        let data = fs::read_to_string(&store.path).unwrap();
        assert!(data.contains(BEST_SCORE_KEY));
    }

    #[test]
    fn corrupt_file_reads_as_absent() {
        let store = scratch_store();
        fs::write(&store.path, "not json").unwrap();
        assert_eq!(store.load(), None);
        assert!(store.record(5).unwrap());
        assert_eq!(store.load(), Some(5));
    }
}

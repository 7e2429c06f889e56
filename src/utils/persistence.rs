//! Storage locations and best-score persistence.
//!
//! The session only sees the [`ScoreStore`] port. The terminal binary plugs in
//! a [`FileScoreStore`]; tests and `--no-save` use a [`MemoryScoreStore`].

use crate::constants::{CONFIG_FILE_NAME, HIGH_SCORE_KEY, LOG_FILE_NAME};
use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Persistence port for the single best-score value.
pub trait ScoreStore {
    /// Stored best score, or 0 when absent or unreadable.
    fn load_best_score(&self) -> u32;

    /// Replace the stored best score.
    fn save_best_score(&mut self, score: u32) -> io::Result<()>;
}

impl<T: ScoreStore + ?Sized> ScoreStore for Box<T> {
    fn load_best_score(&self) -> u32 {
        (**self).load_best_score()
    }

    fn save_best_score(&mut self, score: u32) -> io::Result<()> {
        (**self).save_best_score(score)
    }
}

/// Parse a stored best score. Anything that is not a non-negative decimal
/// integer (after trimming whitespace) reads as 0.
pub fn parse_best_score(text: &str) -> u32 {
    text.trim().parse().unwrap_or(0)
}

fn project_dirs() -> io::Result<ProjectDirs> {
    ProjectDirs::from("", "", "flappy").ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "Could not determine home directory",
        )
    })
}

/// Get the data directory, creating it if needed.
pub fn data_dir() -> io::Result<PathBuf> {
    let dirs = project_dirs()?;
    let dir = dirs.data_dir();
    fs::create_dir_all(dir)?;
    Ok(dir.to_path_buf())
}

/// Default location of the JSON configuration file. The file itself is optional.
pub fn default_config_path() -> io::Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join(CONFIG_FILE_NAME))
}

/// Location of the log file written by the terminal binary.
pub fn log_path() -> io::Result<PathBuf> {
    Ok(data_dir()?.join(LOG_FILE_NAME))
}

/// Best score kept as decimal text in a single file.
#[derive(Debug, Clone)]
pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    /// Store in the platform data directory.
    pub fn new() -> io::Result<Self> {
        Ok(Self::at(data_dir()?.join(HIGH_SCORE_KEY)))
    }

    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for FileScoreStore {
    fn load_best_score(&self) -> u32 {
        match fs::read_to_string(&self.path) {
            Ok(text) => parse_best_score(&text),
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(path = %self.path.display(), error = %e, "best score unreadable");
                }
                0
            }
        }
    }

    fn save_best_score(&mut self, score: u32) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, score.to_string())
    }
}

/// Use `opened` if the file store is available, otherwise keep the best score
/// in memory for this run. Storage trouble never stops the game.
pub fn store_or_memory(opened: io::Result<FileScoreStore>) -> Box<dyn ScoreStore> {
    match opened {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "best score storage unavailable, not saving this run");
            Box::new(MemoryScoreStore::new())
        }
    }
}

/// Clear the stored best score. A failed write is logged, not returned.
pub fn reset_best_score(store: &mut dyn ScoreStore) {
    match store.save_best_score(0) {
        Ok(()) => tracing::info!("best score reset"),
        Err(e) => tracing::warn!(error = %e, "could not reset best score"),
    }
}

/// In-memory store that counts writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    best: u32,
    writes: usize,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a previously stored best score.
    pub fn with_best(best: u32) -> Self {
        Self { best, writes: 0 }
    }

    /// Number of times the best score has been written.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn stored(&self) -> u32 {
        self.best
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load_best_score(&self) -> u32 {
        self.best
    }

    fn save_best_score(&mut self, score: u32) -> io::Result<()> {
        self.best = score;
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("flappy_test_{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_parse_best_score() {
        assert_eq!(parse_best_score("42"), 42);
        assert_eq!(parse_best_score("  17\n"), 17);
        assert_eq!(parse_best_score(""), 0);
        assert_eq!(parse_best_score("abc"), 0);
        assert_eq!(parse_best_score("-5"), 0);
        assert_eq!(parse_best_score("3.5"), 0);
        assert_eq!(parse_best_score("99999999999999999999"), 0);
    }

    #[test]
    fn test_file_store_missing_file_is_zero() {
        let store = FileScoreStore::at(temp_path("missing_best"));
        assert_eq!(store.load_best_score(), 0);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let path = temp_path("roundtrip_best");
        let mut store = FileScoreStore::at(&path);
        store.save_best_score(23).expect("save should succeed");
        assert_eq!(fs::read_to_string(&path).unwrap(), "23");
        assert_eq!(FileScoreStore::at(&path).load_best_score(), 23);

        // Cleanup
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_file_store_corrupt_file_is_zero() {
        let path = temp_path("corrupt_best");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not a number").unwrap();
        assert_eq!(FileScoreStore::at(&path).load_best_score(), 0);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unavailable_storage_falls_back_to_memory() {
        let opened = Err(io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied"));
        let mut store = store_or_memory(opened);
        assert_eq!(store.load_best_score(), 0);
        assert!(store.save_best_score(8).is_ok());
        assert_eq!(store.load_best_score(), 8);
    }

    #[test]
    fn test_available_storage_is_used() {
        let path = temp_path("fallback_best");
        let mut store = store_or_memory(Ok(FileScoreStore::at(&path)));
        store.save_best_score(6).unwrap();
        assert_eq!(FileScoreStore::at(&path).load_best_score(), 6);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unwritable_store_is_not_fatal() {
        // A regular file where the parent directory should be
        let blocker = temp_path("blocker_file");
        fs::create_dir_all(blocker.parent().unwrap()).unwrap();
        fs::write(&blocker, "x").unwrap();
        let mut store = FileScoreStore::at(blocker.join("best"));

        assert_eq!(store.load_best_score(), 0);
        assert!(store.save_best_score(3).is_err());
        reset_best_score(&mut store);
        assert_eq!(store.load_best_score(), 0);
        fs::remove_file(&blocker).ok();
    }

    #[test]
    fn test_reset_best_score() {
        let mut store = MemoryScoreStore::with_best(12);
        reset_best_score(&mut store);
        assert_eq!(store.stored(), 0);
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_memory_store_counts_writes() {
        let mut store = MemoryScoreStore::with_best(5);
        assert_eq!(store.load_best_score(), 5);
        store.save_best_score(9).unwrap();
        assert_eq!(store.load_best_score(), 9);
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_boxed_store_delegates() {
        let mut store: Box<dyn ScoreStore> = Box::new(MemoryScoreStore::with_best(3));
        assert_eq!(store.load_best_score(), 3);
        store.save_best_score(4).unwrap();
        assert_eq!(store.load_best_score(), 4);
    }

    #[test]
    fn test_default_config_path_format() {
        if let Ok(path) = default_config_path() {
            assert!(path.to_string_lossy().ends_with("config.json"));
        }
    }
}

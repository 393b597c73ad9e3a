use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{ReelError, ReelResult};
use crate::model::movie::Movie;

// ---------------------------------------------------------------------------
// MovieGateway trait: whole-collection persistence boundary
// ---------------------------------------------------------------------------

/// Trait for persistence backends. The catalog is always loaded and saved as
/// one snapshot; there are no partial writes.
pub trait MovieGateway: Send + Sync {
    /// Load every persisted movie. Returns an empty list if nothing was saved yet.
    fn load_all(&self) -> ReelResult<Vec<Movie>>;

    /// Overwrite the persisted snapshot with `movies`.
    fn save_all(&self, movies: &[Movie]) -> ReelResult<()>;
}

// ---------------------------------------------------------------------------
// JSON file gateway
// ---------------------------------------------------------------------------

/// Stores the catalog as a pretty-printed JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileGateway {
    path: PathBuf,
}

impl JsonFileGateway {
    /// Open the gateway, creating the file (holding `[]`) and any missing
    /// parent directories if it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| {
                    ReelError::Persistence(format!(
                        "failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
            fs::write(&path, "[]").map_err(|e| {
                ReelError::Persistence(format!("failed to create {}: {}", path.display(), e))
            })?;
            tracing::info!(path = %path.display(), "Created empty catalog file");
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl MovieGateway for JsonFileGateway {
    fn load_all(&self) -> ReelResult<Vec<Movie>> {
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            ReelError::Persistence(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&raw).map_err(|e| {
            ReelError::Persistence(format!("failed to decode {}: {}", self.path.display(), e))
        })
    }

    fn save_all(&self, movies: &[Movie]) -> ReelResult<()> {
        let json = serde_json::to_string_pretty(movies)
            .map_err(|e| ReelError::Persistence(format!("failed to encode catalog: {}", e)))?;

        // Write beside the target, then rename over it.
        let tmp = self.temp_path();
        fs::write(&tmp, json).map_err(|e| {
            ReelError::Persistence(format!("failed to write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            ReelError::Persistence(format!(
                "failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %self.path.display(), count = movies.len(), "Catalog saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory gateway
// ---------------------------------------------------------------------------

/// Volatile gateway keeping the last saved snapshot in memory.
///
/// Clones share state, so a caller can hand one clone to a store and keep
/// another to inspect saves or force failures.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    inner: Arc<InMemoryInner>,
}

#[derive(Debug, Default)]
struct InMemoryInner {
    snapshot: Mutex<Vec<Movie>>,
    saves: AtomicUsize,
    failing: AtomicBool,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pre-existing snapshot, as if loaded from disk.
    pub fn with_movies(movies: Vec<Movie>) -> Self {
        let gateway = Self::new();
        *gateway.lock_snapshot() = movies;
        gateway
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn fail_saves(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.inner.saves.load(Ordering::SeqCst)
    }

    /// The last saved snapshot.
    pub fn snapshot(&self) -> Vec<Movie> {
        self.lock_snapshot().clone()
    }

    fn lock_snapshot(&self) -> std::sync::MutexGuard<'_, Vec<Movie>> {
        self.inner
            .snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MovieGateway for InMemoryGateway {
    fn load_all(&self) -> ReelResult<Vec<Movie>> {
        Ok(self.snapshot())
    }

    fn save_all(&self, movies: &[Movie]) -> ReelResult<()> {
        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(ReelError::Persistence(
                "in-memory gateway is set to fail".to_string(),
            ));
        }
        *self.lock_snapshot() = movies.to_vec();
        self.inner.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use anyhow::Result;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};

use crate::core::FileEntity;

const DEFAULT_MAX_MEMORY_ENTRIES: usize = 1000;
const CACHE_FORMAT_VERSION: u32 = 1;

/// A parsed file together with the modification time and size it was parsed at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedFileEntry {
    pub file: FileEntity,
    pub timestamp: u64,
    pub file_size: u64,
}

/// Thread-safe parse cache with a memory tier and a best-effort disk tier.
///
/// Entries are keyed by absolute path. A hit is only returned when the stored
/// entry was recorded under the same project-relative path, so moving a
/// project root never yields records with stale paths.
pub struct ParseCache {
    memory_cache: DashMap<PathBuf, CachedFileEntry>,
    cache_dir: Option<PathBuf>,
    max_memory_entries: usize,
}

impl ParseCache {
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self> {
        let resolved_dir = cache_dir.unwrap_or_else(|| std::env::temp_dir().join("depmap_cache"));
        let cache_dir = match fs::create_dir_all(&resolved_dir) {
            Ok(()) => Some(resolved_dir),
            Err(err) => {
                warn!(
                    "failed to initialize disk cache at {}: {err}",
                    resolved_dir.display()
                );
                None
            }
        };

        Ok(Self {
            memory_cache: DashMap::with_capacity(DEFAULT_MAX_MEMORY_ENTRIES),
            cache_dir,
            max_memory_entries: DEFAULT_MAX_MEMORY_ENTRIES,
        })
    }

    /// Build an in-memory-only cache without touching the filesystem
    pub fn in_memory_only() -> Self {
        Self {
            memory_cache: DashMap::with_capacity(DEFAULT_MAX_MEMORY_ENTRIES),
            cache_dir: None,
            max_memory_entries: DEFAULT_MAX_MEMORY_ENTRIES,
        }
    }

    /// Check if file needs reparsing based on modification time and size
    pub fn needs_update(&self, file_path: &Path) -> Result<bool> {
        let (current_timestamp, current_size) = file_stamp(file_path)?;

        if let Some(entry) = self.memory_cache.get(file_path) {
            return Ok(entry.timestamp != current_timestamp || entry.file_size != current_size);
        }

        if let Some(cache_path) = self.cache_path(file_path) {
            if cache_path.exists() {
                if let Ok(entry) = self.load_from_disk(&cache_path) {
                    return Ok(
                        entry.timestamp != current_timestamp || entry.file_size != current_size
                    );
                }
            }
        }

        Ok(true)
    }

    /// Cached record for `file_path`, if one exists under `relative_path`.
    pub fn get(&self, file_path: &Path, relative_path: &str) -> Option<FileEntity> {
        if let Some(entry) = self.memory_cache.get(file_path) {
            return (entry.file.path == relative_path).then(|| entry.file.clone());
        }

        let cache_path = self.cache_path(file_path)?;
        let entry = self.load_from_disk(&cache_path).ok()?;
        if entry.file.path != relative_path {
            debug!(
                "ignoring cache entry for {} recorded as {}",
                relative_path, entry.file.path
            );
            return None;
        }

        let file = entry.file.clone();
        if self.memory_cache.len() < self.max_memory_entries {
            self.memory_cache.insert(file_path.to_path_buf(), entry);
        }
        Some(file)
    }

    /// Store a parsed file in the cache
    pub fn store(&self, file_path: &Path, file: &FileEntity) -> Result<()> {
        let (timestamp, file_size) = file_stamp(file_path)?;

        let entry = CachedFileEntry {
            file: file.clone(),
            timestamp,
            file_size,
        };

        if self.memory_cache.len() >= self.max_memory_entries {
            if let Some(entry) = self.memory_cache.iter().next() {
                let key = entry.key().clone();
                drop(entry);
                self.memory_cache.remove(&key);
            }
        }
        self.memory_cache
            .insert(file_path.to_path_buf(), entry.clone());

        if let Some(cache_path) = self.cache_path(file_path) {
            self.store_to_disk(&cache_path, &entry)?;
        }

        Ok(())
    }

    /// Clear all caches
    pub fn clear(&self) -> Result<()> {
        self.memory_cache.clear();
        if let Some(cache_dir) = &self.cache_dir {
            if cache_dir.exists() {
                fs::remove_dir_all(cache_dir)?;
                fs::create_dir_all(cache_dir)?;
            }
        }
        Ok(())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            memory_entries: self.memory_cache.len(),
            disk_entries: self.disk_entry_count(),
        }
    }

    fn cache_path(&self, file_path: &Path) -> Option<PathBuf> {
        let cache_dir = self.cache_dir.as_ref()?;

        let mut hasher = DefaultHasher::new();
        file_path.hash(&mut hasher);
        let hash = hasher.finish();

        Some(cache_dir.join(format!(
            "cache_v{}_{:x}.bincode",
            CACHE_FORMAT_VERSION, hash
        )))
    }

    fn load_from_disk(&self, cache_path: &Path) -> Result<CachedFileEntry> {
        let data = fs::read(cache_path)?;
        let entry: CachedFileEntry = bincode::deserialize(&data)?;
        Ok(entry)
    }

    fn store_to_disk(&self, cache_path: &Path, entry: &CachedFileEntry) -> Result<()> {
        let data = bincode::serialize(entry)?;
        fs::write(cache_path, data)?;
        Ok(())
    }

    fn disk_entry_count(&self) -> usize {
        let Some(cache_dir) = &self.cache_dir else {
            return 0;
        };
        match fs::read_dir(cache_dir) {
            Ok(entries) => entries.filter_map(|e| e.ok()).count(),
            Err(_) => 0,
        }
    }
}

fn file_stamp(file_path: &Path) -> Result<(u64, u64)> {
    let metadata = fs::metadata(file_path)?;
    let timestamp = metadata
        .modified()?
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    Ok((timestamp, metadata.len()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub memory_entries: usize,
    pub disk_entries: usize,
}

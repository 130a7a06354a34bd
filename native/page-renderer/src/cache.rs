use crate::sanitize::SanitizedSource;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tracing::debug;

struct CacheEntry {
    source: String,
    sanitized: SanitizedSource,
}

/// In-memory memo of sanitized sources, keyed by the exact input text.
///
/// Sanitization is deterministic, so a hit is always safe to reuse. Entries
/// are evicted oldest-first once `capacity` is reached.
pub struct SanitizeCache {
    capacity: usize,
    inner: Mutex<CacheState>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    order: VecDeque<String>,
}

impl SanitizeCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(CacheState::default()),
        }
    }

    pub fn compute_hash(source: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn get(&self, source: &str) -> Option<SanitizedSource> {
        let hash = Self::compute_hash(source);
        let state = self.inner.lock().ok()?;
        let entry = state.entries.get(&hash)?;
        // A digest match alone is not enough; the texts must be identical.
        if entry.source == source {
            Some(entry.sanitized.clone())
        } else {
            None
        }
    }

    pub fn set(&self, source: &str, sanitized: SanitizedSource) {
        if self.capacity == 0 {
            return;
        }
        let hash = Self::compute_hash(source);
        let Ok(mut state) = self.inner.lock() else {
            return;
        };
        if !state.entries.contains_key(&hash) {
            while state.order.len() >= self.capacity {
                match state.order.pop_front() {
                    Some(oldest) => {
                        state.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
            state.order.push_back(hash.clone());
        }
        state.entries.insert(
            hash,
            CacheEntry {
                source: source.to_string(),
                sanitized,
            },
        );
    }

    /// Returns the cached value for `source`, computing and storing it on a miss.
    /// Failures are not cached.
    pub fn get_or_insert_with<E>(
        &self,
        source: &str,
        compute: impl FnOnce() -> Result<SanitizedSource, E>,
    ) -> Result<SanitizedSource, E> {
        if let Some(hit) = self.get(source) {
            debug!(entry = %hit.entry_name, "sanitize cache hit");
            return Ok(hit);
        }
        let sanitized = compute()?;
        self.set(source, sanitized.clone());
        Ok(sanitized)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

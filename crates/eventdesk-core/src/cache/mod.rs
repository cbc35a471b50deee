// ── Keyed local cache ──
//
// Durable per-user key/value storage for fetched pages and event details.
// Writes are synchronous and last-writer-wins; absence is normal and a
// corrupt value is indistinguishable from absence.

pub mod key;
mod memory;
mod session_dir;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

pub use key::{CacheKey, Resource};
pub use memory::MemoryCache;
pub use session_dir::SessionDirCache;

/// Raw string storage. Implementations must tolerate concurrent callers.
pub trait LocalCache: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;

    fn write(&self, key: &str, value: String);

    fn remove(&self, key: &str);

    /// Drop every entry.
    fn clear(&self);

    fn keys(&self) -> Vec<String>;

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.keys()
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect()
    }
}

/// Decode a cached JSON value. Corrupt entries are logged and treated as
/// a miss.
pub fn read_json<T: DeserializeOwned>(cache: &dyn LocalCache, key: &str) -> Option<T> {
    let raw = cache.read(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "discarding corrupt cache entry");
            None
        }
    }
}

pub fn write_json<T: Serialize + ?Sized>(cache: &dyn LocalCache, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => cache.write(key, json),
        Err(e) => warn!(key, error = %e, "value not serializable; cache entry left unchanged"),
    }
}

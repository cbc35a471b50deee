// ── Directory-backed session cache ──
//
// One JSON file per key. Survives between CLI invocations and is wiped
// wholesale on sign-out, which gives it browser-session semantics.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::LocalCache;

const EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct SessionDirCache {
    dir: PathBuf,
}

impl SessionDirCache {
    /// Open (creating if needed) a cache rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' => '_',
                other => other,
            })
            .collect();
        self.dir.join(format!("{file}.{EXTENSION}"))
    }

    fn entries(&self) -> Vec<PathBuf> {
        let Ok(read) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        read.filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == EXTENSION))
            .collect()
    }
}

impl LocalCache for SessionDirCache {
    fn read(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(key, error = %e, "cache read failed");
                None
            }
        }
    }

    fn write(&self, key: &str, value: String) {
        // Write-then-rename so a crash never leaves a torn entry behind.
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        let result = fs::write(&tmp, value).and_then(|()| fs::rename(&tmp, &path));
        if let Err(e) = result {
            warn!(key, error = %e, "cache write failed");
        }
    }

    fn remove(&self, key: &str) {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(key, error = %e, "cache remove failed"),
        }
    }

    fn clear(&self) {
        for path in self.entries() {
            if let Err(e) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "cache clear failed");
            }
        }
    }

    fn keys(&self) -> Vec<String> {
        self.entries()
            .iter()
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_owned))
            .collect()
    }
}

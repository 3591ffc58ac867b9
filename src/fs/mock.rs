// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { contents: Vec<u8>, modified: SystemTime },
    Dir(Vec<String>), // List of child names
}

/// Mutating operations observed by the mock, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsOp {
    Write(PathBuf),
    RemoveStarted(PathBuf),
    RemoveFinished(PathBuf),
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    /// Logical clock; every write advances it by one second.
    clock: u64,
    ops: Vec<FsOp>,
}

/// In-memory filesystem with a logical clock for modification times.
///
/// Cloning shares the underlying state, so a test can keep a handle while the
/// pipeline owns another.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
    remove_delay: Option<Duration>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut state = MockState::default();
        // Ensure root exists
        state
            .entries
            .insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            state: Arc::new(Mutex::new(state)),
            remove_delay: None,
        }
    }

    /// Make `remove_dir_all` block for `delay` between starting and finishing.
    pub fn with_remove_delay(mut self, delay: Duration) -> Self {
        self.remove_delay = Some(delay);
        self
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let mut state = self.lock();
        let modified = state.tick();
        insert_file(&mut state.entries, path.as_ref(), content.into(), modified);
    }

    /// Add a file with an explicit modification time (seconds on the logical clock).
    pub fn add_file_at(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>, secs: u64) {
        let mut state = self.lock();
        state.clock = state.clock.max(secs);
        insert_file(&mut state.entries, path.as_ref(), content.into(), logical_time(secs));
    }

    /// Snapshot of every mutating operation so far.
    pub fn ops(&self) -> Vec<FsOp> {
        self.lock().ops.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A poisoned lock only means another test thread panicked; the map is
        // still usable for assertions.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockState {
    fn tick(&mut self) -> SystemTime {
        self.clock += 1;
        logical_time(self.clock)
    }
}

fn logical_time(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(1_000_000 + secs)
}

fn normalize_parent(path: &Path) -> Option<&Path> {
    let parent = path.parent()?;
    if parent.as_os_str().is_empty() {
        Some(Path::new("."))
    } else {
        Some(parent)
    }
}

fn insert_file(
    entries: &mut HashMap<PathBuf, MockEntry>,
    path: &Path,
    contents: Vec<u8>,
    modified: SystemTime,
) {
    entries.insert(path.to_path_buf(), MockEntry::File { contents, modified });
    link_to_parent(entries, path);
}

fn link_to_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let Some(parent) = normalize_parent(path) else {
        return;
    };
    if parent == path {
        return;
    }
    if !entries.contains_key(parent) {
        entries.insert(parent.to_path_buf(), MockEntry::Dir(Vec::new()));
        link_to_parent(entries, parent);
    }
    if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::File { contents, .. }) => Ok(contents.clone()),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let mut state = self.lock();
        let modified = state.tick();
        insert_file(&mut state.entries, path, contents.to_vec(), modified);
        state.ops.push(FsOp::Write(path.to_path_buf()));
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.lock().entries.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::Dir(_)))
    }

    fn modified(&self, path: &Path) -> Option<SystemTime> {
        match self.lock().entries.get(path) {
            Some(MockEntry::File { modified, .. }) => Some(*modified),
            Some(MockEntry::Dir(_)) => Some(UNIX_EPOCH),
            None => None,
        }
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.lock().ops.push(FsOp::RemoveStarted(path.to_path_buf()));

        if let Some(delay) = self.remove_delay {
            std::thread::sleep(delay);
        }

        let mut state = self.lock();
        state.entries.retain(|p, _| !p.starts_with(path));
        if let Some(parent) = normalize_parent(path) {
            if let Some(MockEntry::Dir(children)) = state.entries.get_mut(parent) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    children.retain(|c| c != name);
                }
            }
        }
        state.ops.push(FsOp::RemoveFinished(path.to_path_buf()));
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}

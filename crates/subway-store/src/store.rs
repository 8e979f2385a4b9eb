//! Single-file network store.
//!
//! The whole network is one [`NetworkFile`] on disk. Reads load it into a
//! [`MemoryRepository`]; writes go through [`FileStore::transaction`], which
//! holds a [`StoreLock`] from load to save. The lock covers the whole file,
//! so at most one writer touches any line at a time.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::file::NetworkFile;
use crate::repository::MemoryRepository;
use crate::service::NetworkService;

/// A network persisted in a single `.sln` file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Create an empty network. Refuses to overwrite an existing file.
    pub fn init(&self) -> Result<()> {
        if self.path.exists() {
            return Err(StoreError::AlreadyExists {
                path: self.path.clone(),
            });
        }
        let dir = self.dir();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        self.save(&MemoryRepository::new())?;
        info!("initialized network store at {}", self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<MemoryRepository> {
        let bytes = fs::read(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        let file = NetworkFile::from_bytes(&bytes)?;
        debug!(
            "loaded {} ({} stations, {} lines, {} sections)",
            self.path.display(),
            file.snapshot.stations.len(),
            file.snapshot.lines.len(),
            file.snapshot.sections.len()
        );
        Ok(file.into_repository())
    }

    /// Write the network atomically: a temp file in the same directory is
    /// renamed over the target.
    pub fn save(&self, repo: &MemoryRepository) -> Result<()> {
        let bytes = NetworkFile::from_repository(repo).to_bytes()?;
        let dir = self.dir();

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(&dir, e))?;
        tmp.write_all(&bytes)
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;

        debug!("saved {} ({} bytes)", self.path.display(), bytes.len());
        Ok(())
    }

    /// Run a read-only request against the current network.
    pub fn read<T>(
        &self,
        f: impl FnOnce(&NetworkService<'_, MemoryRepository>) -> Result<T>,
    ) -> Result<T> {
        let mut repo = self.load()?;
        let service = NetworkService::new(&mut repo);
        f(&service)
    }

    /// Run a mutating request under the writer lock. The network is saved
    /// only if `f` succeeds.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&mut NetworkService<'_, MemoryRepository>) -> Result<T>,
    ) -> Result<T> {
        let _lock = StoreLock::acquire(&self.path)?;
        let mut repo = self.load()?;

        let value = {
            let mut service = NetworkService::new(&mut repo);
            f(&mut service)?
        };

        self.save(&repo)?;
        info!("committed transaction to {}", self.path.display());
        Ok(value)
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// Exclusive writer lock: a `<store>.lock` file next to the store.
///
/// Created with `create_new`, so a second writer fails fast with
/// [`StoreError::Locked`]. Removed when dropped.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    pub fn acquire(store: &Path) -> Result<Self> {
        let path = lock_path(store);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let holder = read_holder(&path);
                warn!("{} is held by {holder:?}", path.display());
                return Err(StoreError::Locked {
                    path: store.to_path_buf(),
                    lock: path,
                    holder,
                });
            }
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        writeln!(file, "{}", std::process::id()).map_err(|e| StoreError::io(&path, e))?;
        debug!("acquired {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("failed to remove {}: {e}", self.path.display());
        }
    }
}

/// Pid written by the lock holder. `None` if the file is gone or garbled.
fn read_holder(lock: &Path) -> Option<u32> {
    fs::read_to_string(lock).ok()?.trim().parse().ok()
}

fn lock_path(store: &Path) -> PathBuf {
    let mut name = store.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

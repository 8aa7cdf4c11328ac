//! Advisory file locks around a store session.
//!
//! The store writes the whole list on every mutation, so two processes
//! mutating the same database would silently drop each other's changes.
//! A mutating session holds an exclusive lock from load to close; read-only
//! sessions share a lock.

use crate::error::ErrorCode;
use fs2::FileExt;
use std::{
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

/// Default time to wait for another `chores` process.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Advisory lock errors.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("{}: lock timed out after {waited:?} at {}", ErrorCode::LockContention.code(), .path.display())]
    Timeout { path: PathBuf, waited: Duration },

    #[error("{}: {0}", ErrorCode::StorageUnavailable.code())]
    Io(#[from] io::Error),
}

impl LockError {
    /// Machine-readable code associated with this lock error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Timeout { .. } => ErrorCode::LockContention,
            Self::Io(_) => ErrorCode::StorageUnavailable,
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

/// Whether a session may mutate the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

/// RAII guard held for the lifetime of a store session.
#[derive(Debug)]
pub struct SessionLock {
    file: File,
    path: PathBuf,
    mode: LockMode,
}

impl SessionLock {
    /// Lock file path used for the database at `db_path`.
    #[must_use]
    pub fn path_for(db_path: &Path) -> PathBuf {
        let mut name = db_path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".lock");
        db_path.with_file_name(name)
    }

    /// Acquire a lock on `path`, polling until `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::Timeout`] if another holder keeps the lock, or
    /// [`LockError::Io`] if the lock file cannot be created.
    pub fn acquire(path: &Path, mode: LockMode, timeout: Duration) -> Result<Self, LockError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let start = Instant::now();
        loop {
            let file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .truncate(false)
                .open(path)?;

            let acquired = match mode {
                LockMode::Shared => FileExt::try_lock_shared(&file).is_ok(),
                LockMode::Exclusive => FileExt::try_lock_exclusive(&file).is_ok(),
            };

            if acquired {
                return Ok(Self {
                    file,
                    path: path.to_path_buf(),
                    mode,
                });
            }

            if start.elapsed() >= timeout {
                return Err(LockError::Timeout {
                    path: path.to_path_buf(),
                    waited: start.elapsed(),
                });
            }

            thread::sleep(Duration::from_millis(10));
        }
    }

    /// Explicitly release the lock. Release also happens on drop.
    pub fn release(self) {
        drop(self);
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn mode(&self) -> LockMode {
        self.mode
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::{LockError, LockMode, SessionLock};
    use crate::error::ErrorCode;
    use std::{
        path::{Path, PathBuf},
        sync::{Arc, Barrier},
        thread,
        time::Duration,
    };
    use tempfile::TempDir;

    fn lock_path(dir: &TempDir, name: &str) -> PathBuf {
        dir.path().join(name)
    }

    #[test]
    fn lock_path_sits_next_to_database() {
        let path = SessionLock::path_for(Path::new("/data/chores/chores.sqlite3"));
        assert_eq!(path, PathBuf::from("/data/chores/chores.sqlite3.lock"));
    }

    #[test]
    fn exclusive_lock_acquire_and_release() -> Result<(), LockError> {
        let dir = tempfile::tempdir()?;
        let path = lock_path(&dir, "basic.lock");
        let lock = SessionLock::acquire(&path, LockMode::Exclusive, Duration::from_millis(50))?;
        assert_eq!(lock.path(), path.as_path());
        assert_eq!(lock.mode(), LockMode::Exclusive);
        lock.release();
        Ok(())
    }

    #[test]
    fn exclusive_lock_times_out_when_held() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = lock_path(&dir, "timeout.lock");
        let _guard = SessionLock::acquire(&path, LockMode::Exclusive, Duration::from_millis(50))
            .expect("first lock");
        let err = SessionLock::acquire(&path, LockMode::Exclusive, Duration::from_millis(20))
            .expect_err("second lock must time out");

        assert!(matches!(err, LockError::Timeout { path: ref p, .. } if *p == path));
        assert_eq!(err.code(), ErrorCode::LockContention);
        assert!(err.hint().is_some());
        assert!(err.to_string().starts_with("E5002"));
    }

    #[test]
    fn shared_locks_are_compatible() -> Result<(), LockError> {
        let dir = tempfile::tempdir()?;
        let path = lock_path(&dir, "shared.lock");
        let first = SessionLock::acquire(&path, LockMode::Shared, Duration::from_millis(50))?;
        let second = SessionLock::acquire(&path, LockMode::Shared, Duration::from_millis(50))?;
        first.release();
        second.release();
        Ok(())
    }

    #[test]
    fn exclusive_blocks_shared() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = lock_path(&dir, "excl-blocks-shared.lock");
        let _write = SessionLock::acquire(&path, LockMode::Exclusive, Duration::from_millis(50))
            .expect("exclusive lock");

        let started = std::time::Instant::now();
        let read = SessionLock::acquire(&path, LockMode::Shared, Duration::from_millis(20));

        assert!(matches!(read, Err(LockError::Timeout { .. })));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn contention_resolves_after_holder_releases() -> Result<(), LockError> {
        let dir = tempfile::tempdir()?;
        let path = lock_path(&dir, "thread.lock");

        let held = Arc::new(Barrier::new(2));
        let done = Arc::new(Barrier::new(2));

        let held_thread = Arc::clone(&held);
        let done_thread = Arc::clone(&done);
        let path_in_thread = path.clone();
        let handle = thread::spawn(move || {
            let _holder = SessionLock::acquire(
                &path_in_thread,
                LockMode::Exclusive,
                Duration::from_millis(200),
            )
            .expect("holder lock");
            held_thread.wait();
            done_thread.wait();
        });

        held.wait();
        assert!(matches!(
            SessionLock::acquire(&path, LockMode::Exclusive, Duration::from_millis(20)),
            Err(LockError::Timeout { .. })
        ));
        done.wait();
        handle.join().expect("holder thread");

        let follow_up = SessionLock::acquire(&path, LockMode::Exclusive, Duration::from_millis(50))?;
        follow_up.release();
        Ok(())
    }
}

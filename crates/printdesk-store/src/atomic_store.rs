//! Lock-scoped transactions over the JSONL ledger.
//!
//! The lock file next to the ledger is the exclusive row lock for every
//! namespace: a transaction holds it from load through save, so a counter
//! update and the dependent job insert commit together or not at all.

use crate::{Ledger, LedgerError};
use chrono::Utc;
use std::error::Error as StdError;
use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_LOCK_POLL_MS: u64 = 20;

pub fn ledger_lock_path(ledger_path: &Path) -> PathBuf {
    let mut path: OsString = ledger_path.as_os_str().to_os_string();
    path.push(".lock");
    PathBuf::from(path)
}

/// How long a transaction waits for the ledger lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_LOCK_POLL_MS),
        }
    }
}

#[derive(Debug)]
pub enum AtomicStoreMutationError<E> {
    LockBusy { lock_path: String },
    LockIo { lock_path: String, message: String },
    Store(LedgerError),
    Mutation(E),
}

impl<E> AtomicStoreMutationError<E> {
    fn lock_busy(lock_path: &Path) -> Self {
        Self::LockBusy {
            lock_path: lock_path.display().to_string(),
        }
    }

    fn lock_io(lock_path: &Path, message: impl Into<String>) -> Self {
        Self::LockIo {
            lock_path: lock_path.display().to_string(),
            message: message.into(),
        }
    }
}

impl<E: Display> Display for AtomicStoreMutationError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LockBusy { lock_path } => write!(f, "ledger lock busy: {lock_path}"),
            Self::LockIo { lock_path, message } => {
                write!(f, "failed to acquire ledger lock {lock_path}: {message}")
            }
            Self::Store(err) => write!(f, "{err}"),
            Self::Mutation(err) => write!(f, "{err}"),
        }
    }
}

impl<E> StdError for AtomicStoreMutationError<E> where
    E: Display + std::fmt::Debug + StdError + 'static
{
}

/// Load the ledger without taking the lock.
///
/// A missing file reads as an empty ledger. Used by read-only queries,
/// which may observe a state that is stale by the time they return.
pub fn read_ledger_jsonl(path: impl AsRef<Path>) -> Result<Ledger, LedgerError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Ledger::default());
    }
    Ledger::load_jsonl(path)
}

/// Execute one lock-scoped ledger transaction.
///
/// The mutator returns `(value, changed)` where:
/// - `value` is returned to the caller
/// - `changed=true` persists the ledger to JSONL before lock release.
///
/// A mutator error leaves the file untouched.
pub fn mutate_ledger_jsonl<T, E, F>(
    path: impl AsRef<Path>,
    policy: &LockPolicy,
    mutator: F,
) -> Result<T, AtomicStoreMutationError<E>>
where
    F: FnOnce(&mut Ledger) -> Result<(T, bool), E>,
{
    let path = path.as_ref();
    let _guard = LedgerFileLockGuard::acquire(path, policy).map_err(|err| match err {
        AtomicStoreMutationError::LockBusy { lock_path } => {
            AtomicStoreMutationError::LockBusy { lock_path }
        }
        AtomicStoreMutationError::LockIo { lock_path, message } => {
            AtomicStoreMutationError::LockIo { lock_path, message }
        }
        AtomicStoreMutationError::Store(source) => AtomicStoreMutationError::Store(source),
        AtomicStoreMutationError::Mutation(unreachable) => match unreachable {},
    })?;

    let mut ledger = read_ledger_jsonl(path).map_err(AtomicStoreMutationError::Store)?;
    let (value, changed) = mutator(&mut ledger).map_err(AtomicStoreMutationError::Mutation)?;
    if changed {
        ledger
            .save_jsonl(path)
            .map_err(AtomicStoreMutationError::Store)?;
    }
    Ok(value)
}

struct LedgerFileLockGuard {
    lock_path: PathBuf,
    _file: File,
}

impl LedgerFileLockGuard {
    fn acquire(
        path: &Path,
        policy: &LockPolicy,
    ) -> Result<Self, AtomicStoreMutationError<std::convert::Infallible>> {
        let lock_path = ledger_lock_path(path);
        if let Some(parent) = lock_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| AtomicStoreMutationError::lock_io(&lock_path, e.to_string()))?;
        }

        let started = Instant::now();
        let mut contended = false;
        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&lock_path)
            {
                Ok(mut file) => {
                    let _ = writeln!(
                        file,
                        "pid={}\nutc={}",
                        std::process::id(),
                        Utc::now().to_rfc3339()
                    );
                    if contended {
                        tracing::debug!(
                            lock = %lock_path.display(),
                            waited_ms = started.elapsed().as_millis() as u64,
                            "acquired ledger lock after contention"
                        );
                    }
                    return Ok(Self {
                        lock_path,
                        _file: file,
                    });
                }
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                    if started.elapsed() >= policy.timeout {
                        tracing::warn!(
                            lock = %lock_path.display(),
                            timeout_ms = policy.timeout.as_millis() as u64,
                            "ledger lock still held; giving up"
                        );
                        return Err(AtomicStoreMutationError::lock_busy(&lock_path));
                    }
                    contended = true;
                    thread::sleep(policy.poll_interval);
                }
                Err(err) => {
                    return Err(AtomicStoreMutationError::lock_io(
                        &lock_path,
                        err.to_string(),
                    ));
                }
            }
        }
    }
}

impl Drop for LedgerFileLockGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

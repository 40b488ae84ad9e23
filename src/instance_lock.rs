//! Single-instance lock.
//!
//! The registry cache must only ever have one writer, so a second bridge
//! process on the same machine is refused at startup. The lock is a bound
//! Unix socket: unlike a pid file it cannot go stale, because the OS
//! releases the socket when the owning process dies.

use std::io;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstanceLockError {
    #[error("another flora-bridge instance is already running")]
    AlreadyRunning,

    #[error("failed to acquire instance lock: {0}")]
    Io(#[from] io::Error),
}

/// Held for the lifetime of the process; dropping it releases the lock.
pub struct InstanceLock {
    _listener: UnixListener,
    path: PathBuf,
}

impl InstanceLock {
    pub fn acquire() -> Result<Self, InstanceLockError> {
        let path = Self::socket_path();

        // A leftover socket from a SIGKILL'd process is unbound: if nobody
        // answers a connect, it is safe to remove and re-bind.
        if path.exists() {
            if UnixStream::connect(&path).is_ok() {
                return Err(InstanceLockError::AlreadyRunning);
            }
            let _ = std::fs::remove_file(&path);
        }

        match UnixListener::bind(&path) {
            Ok(listener) => Ok(Self {
                _listener: listener,
                path,
            }),
            // Lost the bind race against another starting instance.
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                Err(InstanceLockError::AlreadyRunning)
            }
            Err(e) => Err(InstanceLockError::Io(e)),
        }
    }

    pub fn socket_path() -> PathBuf {
        std::env::var("XDG_RUNTIME_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
            .join("flora-bridge.sock")
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_path_prefers_xdg_runtime_dir() {
        unsafe { std::env::set_var("XDG_RUNTIME_DIR", "/run/user/1000") };
        assert_eq!(
            InstanceLock::socket_path(),
            PathBuf::from("/run/user/1000/flora-bridge.sock")
        );
        unsafe { std::env::remove_var("XDG_RUNTIME_DIR") };
    }
}

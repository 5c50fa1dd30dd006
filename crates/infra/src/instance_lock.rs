//! Single-instance lock using a PID file
//!
//! Two daemons scanning the same database would send every reminder twice
//! until the ledger catches up, so `duebell run` and `duebell tick` hold this lock.

use std::fs;
use std::path::{Path, PathBuf};

use duebell_domain::{DuebellError, Result};

const PID_FILE_NAME: &str = "duebell.pid";

pub struct InstanceLock {
    pid_file: PathBuf,
}

impl InstanceLock {
    /// Write the current PID into `lock_dir/duebell.pid`.
    ///
    /// A PID file left by a process that is no longer alive is replaced.
    ///
    /// # Errors
    /// `DuebellError::Internal` if another live instance holds the lock or
    /// the file cannot be written.
    pub fn acquire<P: AsRef<Path>>(lock_dir: P) -> Result<Self> {
        let pid_file = lock_dir.as_ref().join(PID_FILE_NAME);

        if pid_file.exists() {
            let existing =
                fs::read_to_string(&pid_file).ok().and_then(|c| c.trim().parse::<u32>().ok());
            if let Some(pid) = existing {
                if pid == std::process::id() || is_process_running(pid) {
                    tracing::warn!(existing_pid = pid, "instance_lock.process_active");
                    return Err(DuebellError::Internal(format!(
                        "Another duebell instance is already running (PID: {pid})"
                    )));
                }
                tracing::warn!(stale_pid = pid, "instance_lock.stale_pid_file_detected");
            }
            if let Err(err) = fs::remove_file(&pid_file) {
                tracing::warn!(error = %err, path = %pid_file.display(), "instance_lock.remove_stale_pid_failed");
            }
        }

        let current_pid = std::process::id();
        fs::write(&pid_file, current_pid.to_string())
            .map_err(|e| DuebellError::Internal(format!("Failed to create PID file: {e}")))?;

        tracing::info!(pid = current_pid, path = %pid_file.display(), "instance_lock.acquired");

        Ok(Self { pid_file })
    }

    pub fn path(&self) -> &Path {
        &self.pid_file
    }
}

#[cfg(target_os = "linux")]
fn is_process_running(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

#[cfg(all(unix, not(target_os = "linux")))]
fn is_process_running(pid: u32) -> bool {
    // `kill -0` probes for the process without signalling it
    std::process::Command::new("kill")
        .arg("-0")
        .arg(pid.to_string())
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_process_running(pid: u32) -> bool {
    tracing::warn!(pid = pid, "instance_lock.process_check_unsupported");
    false
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.pid_file) {
            tracing::warn!(error = %e, path = %self.pid_file.display(), "instance_lock.remove_pid_failed");
        } else {
            tracing::info!(path = %self.pid_file.display(), "instance_lock.released");
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn second_acquire_fails_until_released() {
        let temp_dir = TempDir::new().unwrap();

        let first = InstanceLock::acquire(temp_dir.path()).expect("first lock");
        assert!(first.path().exists());
        assert!(InstanceLock::acquire(temp_dir.path()).is_err());

        drop(first);
        assert!(!temp_dir.path().join(PID_FILE_NAME).exists());
        let again = InstanceLock::acquire(temp_dir.path());
        assert!(again.is_ok());
    }

    #[test]
    fn stale_pid_file_is_replaced() {
        let temp_dir = TempDir::new().unwrap();
        // PIDs near u32::MAX are never allocated
        fs::write(temp_dir.path().join(PID_FILE_NAME), "4294967290").unwrap();

        let lock = InstanceLock::acquire(temp_dir.path()).expect("stale lock replaced");
        let content = fs::read_to_string(lock.path()).unwrap();
        assert_eq!(content, std::process::id().to_string());
    }

    #[test]
    fn garbage_pid_file_is_replaced() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(PID_FILE_NAME), "not-a-pid").unwrap();

        assert!(InstanceLock::acquire(temp_dir.path()).is_ok());
    }
}

use super::{Executor, ExecutorError, PhaseStatus};
use crate::invocation::PhaseRequest;
use std::{
    fs::File,
    process::{Command, Stdio},
};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// Executor spawning the real `bin/ycsb` launcher
#[derive(Debug, Default, Clone, Copy)]
pub struct YcsbExecutor;

impl Executor for YcsbExecutor {
    #[instrument(skip(self, log), fields(phase = %request.phase), level = "debug")]
    fn run(&mut self, request: &PhaseRequest<'_>, log: File) -> Result<PhaseStatus, ExecutorError> {
        // both streams share one handle so the log keeps YCSB's interleaving
        let stderr = log.try_clone().map_err(ExecutorError::LogHandle)?;

        let mut child = Command::new(request.binary)
            .args(request.args())
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(|source| ExecutorError::Spawn {
                command: request.command_line(),
                source,
            })?;

        debug!("Waiting on {}", child.id());

        let status = match request.timeout {
            None => child.wait().map_err(ExecutorError::Wait)?,
            Some(timeout) => match child.wait_timeout(timeout).map_err(ExecutorError::Wait)? {
                Some(status) => status,
                None => {
                    warn!("Phase exceeded {timeout:?}, killing {}", child.id());
                    child.kill().map_err(ExecutorError::Wait)?;
                    // reap the child so it does not linger as a zombie
                    child.wait().map_err(ExecutorError::Wait)?;

                    return Ok(PhaseStatus::timed_out());
                }
            },
        };

        debug!("Exit status: {status:?}");

        Ok(PhaseStatus::exited(status.code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        fs,
        os::unix::fs::PermissionsExt,
        path::{Path, PathBuf},
        time::Duration,
    };
    use ycsb_ingest::{Binding, Phase};

    fn script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("ycsb");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn request<'a>(binary: &'a Path, timeout: Option<Duration>) -> PhaseRequest<'a> {
        PhaseRequest {
            binary,
            phase: Phase::Run,
            binding: Binding::Rocksdb,
            workload: Path::new("/work/workloada"),
            threads: 2,
            properties: &[],
            timeout,
        }
    }

    #[test]
    fn combined_output_is_captured() {
        let dir = tempfile::tempdir().unwrap();
        let binary = script(dir.path(), "echo \"args: $*\"\necho oops >&2\nexit 3");
        let log_path = dir.path().join("out.log");

        let status = YcsbExecutor
            .run(&request(&binary, None), File::create(&log_path).unwrap())
            .unwrap();

        assert_eq!(status, PhaseStatus::exited(Some(3)));
        assert!(!status.success());

        let log = fs::read_to_string(&log_path).unwrap();
        assert!(log.contains("args: run rocksdb -s -P /work/workloada -p threadcount=2"));
        assert!(log.contains("oops"));
    }

    #[test]
    fn timeout_kills_child() {
        let dir = tempfile::tempdir().unwrap();
        let binary = script(dir.path(), "sleep 30");
        let log_path = dir.path().join("out.log");

        let status = YcsbExecutor
            .run(
                &request(&binary, Some(Duration::from_millis(200))),
                File::create(&log_path).unwrap(),
            )
            .unwrap();

        assert_eq!(status, PhaseStatus::timed_out());
    }

    #[test]
    fn spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("missing");

        assert!(matches!(
            YcsbExecutor.run(
                &request(&binary, None),
                File::create(dir.path().join("out.log")).unwrap()
            ),
            Err(ExecutorError::Spawn { .. })
        ));
    }
}

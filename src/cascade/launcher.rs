//! Process Launcher: the two child-process primitives the cascade uses.
//!
//! Both run the same command shape, `<runtime> agent <artifact>`. A
//! detached spawn is fire-and-forget, but the launcher retains a handle
//! for every submission so fire-and-forget never means unaccounted-for.
//! A supervised spawn blocks until the child exits and folds its status
//! into an [`ExecutionOutcome`].

use std::path::{Path, PathBuf};
use std::process::Stdio;

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::process::Command;

use ouro_core::{Error, ExecutionOutcome, Result};

use super::log;

/// `InProcess` substitutes in-process interpretation for supervised
/// children and record-only handles for detached ones. Used by tests and
/// the `--in-process` flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchMode {
    Subprocess,
    InProcess,
}

/// Retained record of a detached submission. The caller never joins the
/// child, but the handle stays inspectable.
#[derive(Clone, Debug)]
pub struct DetachedHandle {
    pub command: String,
    pub pid: Option<u32>,
    pub launched_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct Launcher {
    runtime: PathBuf,
    mode: LaunchMode,
    detached: Vec<DetachedHandle>,
}

impl Launcher {
    pub fn new(runtime: impl Into<PathBuf>, mode: LaunchMode) -> Self {
        Self {
            runtime: runtime.into(),
            mode,
            detached: Vec::new(),
        }
    }

    pub fn mode(&self) -> LaunchMode {
        self.mode
    }

    /// Handles of every detached submission so far, oldest first.
    pub fn detached(&self) -> &[DetachedHandle] {
        &self.detached
    }

    /// Start `<runtime> agent <artifact>` without waiting. Output goes to
    /// pipes nobody reads; the child outlives this process if it must.
    pub fn spawn_detached(&mut self, artifact: &Path) -> Result<DetachedHandle> {
        let command = format!("{} agent {}", self.runtime.display(), artifact.display());
        let pid = match self.mode {
            LaunchMode::InProcess => None,
            LaunchMode::Subprocess => {
                let child = Command::new(&self.runtime)
                    .arg("agent")
                    .arg(artifact)
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .spawn()
                    .map_err(|e| Error::spawn(format!("detached launch failed: {e}")))?;
                child.id()
            }
        };

        let handle = DetachedHandle {
            command,
            pid,
            launched_at: Utc::now(),
        };
        log::info(
            "detached_spawned",
            json!({ "command": handle.command, "pid": handle.pid }),
        );
        self.detached.push(handle.clone());
        Ok(handle)
    }

    /// Start `<runtime> agent <artifact>` and block until it exits. Launch
    /// failure and non-zero exit both fold into a failed outcome; the
    /// caller logs it and moves on, never retries.
    pub async fn spawn_supervised(&self, artifact: &Path) -> ExecutionOutcome {
        match Command::new(&self.runtime)
            .arg("agent")
            .arg(artifact)
            .status()
            .await
        {
            Ok(status) if status.success() => ExecutionOutcome::success(),
            Ok(status) => ExecutionOutcome::failure(format!("child exited with {status}")),
            Err(e) => ExecutionOutcome::failure(format!("launch failed: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_process_detached_records_without_launching() {
        let mut launcher = Launcher::new("/nonexistent/runtime", LaunchMode::InProcess);
        let handle = launcher
            .spawn_detached(Path::new("/store/orchestrator.agent"))
            .unwrap();
        assert!(handle.pid.is_none());
        assert!(handle.command.ends_with("agent /store/orchestrator.agent"));
        assert_eq!(launcher.detached().len(), 1);
    }

    #[tokio::test]
    async fn supervised_launch_failure_is_an_outcome_not_an_error() {
        let launcher = Launcher::new("/nonexistent/runtime", LaunchMode::Subprocess);
        let outcome = launcher
            .spawn_supervised(Path::new("/store/recovery-a.agent"))
            .await;
        assert!(!outcome.succeeded);
        assert!(outcome.error_detail.unwrap().contains("launch failed"));
    }
}

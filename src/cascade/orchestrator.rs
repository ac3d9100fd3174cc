//! Cascade Orchestrator: one invocation of the regeneration state machine.
//!
//! `START -> CLEANUP -> CAPTURED -> SUCCESSOR_WRITTEN -> { LOAD_OK ->
//! MARKED -> TERMINATED | LOAD_FAIL -> RECOVERY_A_DONE -> RECOVERY_B_DONE
//! -> TERMINATED }`. Both branches are terminal and mutually exclusive;
//! `TERMINATED` only means self-deletion was attempted, not that it
//! succeeded.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::json;

use ouro_core::{
    capture, ExecutionOutcome, Result, CLEANUP_SET, MARKER, ORCHESTRATOR, RECOVERY_A, RECOVERY_B,
    SUCCESSOR,
};

use super::builder;
use super::launcher::{LaunchMode, Launcher};
use super::log;
use super::namestore::{Namestore, RemoveStatus};

#[derive(Clone, Debug)]
pub struct CascadeConfig {
    /// Directory holding the artifact namespace.
    pub store_root: PathBuf,
    /// Executable spawned as `<runtime> agent <artifact>`.
    pub runtime: PathBuf,
    pub mode: LaunchMode,
    /// Recovery-A countdown: an observability delay, not a timing
    /// dependency. Tick length is configurable so tests stay fast.
    pub countdown_ticks: u32,
    pub countdown_tick: Duration,
}

impl CascadeConfig {
    pub fn new(store_root: impl Into<PathBuf>, runtime: impl Into<PathBuf>) -> Self {
        Self {
            store_root: store_root.into(),
            runtime: runtime.into(),
            mode: LaunchMode::Subprocess,
            countdown_ticks: 3,
            countdown_tick: Duration::from_secs(1),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadeState {
    Start,
    Cleanup,
    Captured,
    SuccessorWritten,
    LoadOk,
    LoadFail,
    Marked,
    RecoveryADone,
    RecoveryBDone,
    Terminated,
}

impl std::fmt::Display for CascadeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Cleanup => "cleanup",
            Self::Captured => "captured",
            Self::SuccessorWritten => "successor_written",
            Self::LoadOk => "load_ok",
            Self::LoadFail => "load_fail",
            Self::Marked => "marked",
            Self::RecoveryADone => "recovery_a_done",
            Self::RecoveryBDone => "recovery_b_done",
            Self::Terminated => "terminated",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadeBranch {
    Success,
    Failure,
}

/// What one run did, for callers and tests. Everything in here was already
/// logged as it happened.
#[derive(Debug)]
pub struct CascadeReport {
    pub branch: CascadeBranch,
    pub load: ExecutionOutcome,
    pub cleanup: Vec<(String, RemoveStatus)>,
    /// Supervised recovery runs in execution order (A before B).
    pub recoveries: Vec<(String, ExecutionOutcome)>,
    pub self_delete: RemoveStatus,
    pub detached_spawns: usize,
}

pub struct Cascade {
    pub(crate) store: Namestore,
    pub(crate) launcher: Launcher,
    pub(crate) config: CascadeConfig,
}

impl Cascade {
    pub fn new(config: CascadeConfig) -> Self {
        let store = Namestore::new(&config.store_root);
        let launcher = Launcher::new(&config.runtime, config.mode);
        Self {
            store,
            launcher,
            config,
        }
    }

    pub fn store(&self) -> &Namestore {
        &self.store
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    fn transition(&self, state: CascadeState) {
        log::info("state", json!({ "state": state.to_string() }));
    }

    /// Run the whole state machine once.
    pub async fn run(&mut self) -> Result<CascadeReport> {
        self.transition(CascadeState::Start);
        let cleanup = self.cleanup().await;
        let captured = self.capture().await?;
        self.write_successor(&captured).await?;
        let load = self.attempt(SUCCESSOR).await;
        self.finish(&captured, load, cleanup).await
    }

    /// Step 1: best-effort removal of the fixed leftover set. Missing
    /// artifacts and removal failures are logged, never fatal.
    pub async fn cleanup(&mut self) -> Vec<(String, RemoveStatus)> {
        self.transition(CascadeState::Cleanup);
        let mut results = Vec::with_capacity(CLEANUP_SET.len());
        for name in CLEANUP_SET {
            let status = self.store.remove(name).await;
            match &status {
                RemoveStatus::Removed => log::info("cleanup_removed", json!({ "artifact": name })),
                RemoveStatus::NotFound => {
                    log::info("cleanup_not_found", json!({ "artifact": name }))
                }
                RemoveStatus::Failed(cause) => {
                    log::error("cleanup_failed", json!({ "artifact": name, "cause": cause }))
                }
            }
            results.push((name.to_string(), status));
        }
        results
    }

    /// Step 2: capture this agent's own artifact as an ASCII-safe blob,
    /// seeding the orchestrator artifact if the store is empty.
    pub async fn capture(&mut self) -> Result<String> {
        if !self.store.exists(ORCHESTRATOR).await {
            self.store.ensure_root().await?;
            let seed = builder::render(&builder::orchestrator_seed())?;
            self.store.write(ORCHESTRATOR, seed.as_bytes()).await?;
            log::info("orchestrator_seeded", json!({ "artifact": ORCHESTRATOR }));
        }
        let raw = self.store.read(ORCHESTRATOR).await?;
        let captured = capture::clean_ascii(&raw);
        self.transition(CascadeState::Captured);
        log::info(
            "captured",
            json!({ "raw_bytes": raw.len(), "ascii_chars": captured.len() }),
        );
        Ok(captured)
    }

    /// Step 3: build and write the successor agent.
    pub async fn write_successor(&mut self, captured: &str) -> Result<()> {
        let def = builder::successor(captured);
        self.write_agent(SUCCESSOR, &def).await?;
        self.transition(CascadeState::SuccessorWritten);
        Ok(())
    }

    pub(crate) async fn write_agent(
        &mut self,
        name: &str,
        def: &ouro_core::AgentDefinition,
    ) -> Result<()> {
        let text = builder::render(def)?;
        self.store.write(name, text.as_bytes()).await?;
        log::info(
            "agent_written",
            json!({ "artifact": name, "role": def.role.to_string() }),
        );
        Ok(())
    }

    /// Steps 5a/5b: branch on the load outcome. Exactly one branch runs.
    pub async fn finish(
        &mut self,
        captured: &str,
        load: ExecutionOutcome,
        cleanup: Vec<(String, RemoveStatus)>,
    ) -> Result<CascadeReport> {
        let (branch, recoveries) = if load.succeeded {
            self.transition(CascadeState::LoadOk);
            self.success_path().await?;
            (CascadeBranch::Success, Vec::new())
        } else {
            self.transition(CascadeState::LoadFail);
            log::warn(
                "load_failed",
                json!({ "artifact": SUCCESSOR, "detail": load.error_detail }),
            );
            let recoveries = self.failure_path(captured).await?;
            (CascadeBranch::Failure, recoveries)
        };

        let self_delete = self.self_delete_orchestrator().await;
        self.transition(CascadeState::Terminated);

        Ok(CascadeReport {
            branch,
            load,
            cleanup,
            recoveries,
            self_delete,
            detached_spawns: self.launcher.detached().len(),
        })
    }

    async fn success_path(&mut self) -> Result<()> {
        let def = builder::marker();
        self.write_agent(MARKER, &def).await?;
        let outcome = self.attempt(MARKER).await;
        if !outcome.succeeded {
            log::warn(
                "marker_failed",
                json!({ "artifact": MARKER, "detail": outcome.error_detail }),
            );
        }
        self.transition(CascadeState::Marked);
        Ok(())
    }

    async fn failure_path(&mut self, captured: &str) -> Result<Vec<(String, ExecutionOutcome)>> {
        let mut recoveries = Vec::with_capacity(2);

        let def_a = builder::recovery_a(captured);
        self.write_agent(RECOVERY_A, &def_a).await?;
        let outcome_a = self.run_supervised(RECOVERY_A).await;
        recoveries.push((RECOVERY_A.to_string(), outcome_a));
        self.transition(CascadeState::RecoveryADone);

        let def_b = builder::recovery_b();
        self.write_agent(RECOVERY_B, &def_b).await?;
        let outcome_b = self.run_supervised(RECOVERY_B).await;
        recoveries.push((RECOVERY_B.to_string(), outcome_b));
        self.transition(CascadeState::RecoveryBDone);

        Ok(recoveries)
    }

    /// Supervised run of a written agent: a real blocking child process, or
    /// in-process interpretation under [`LaunchMode::InProcess`].
    pub async fn run_supervised(&mut self, name: &str) -> ExecutionOutcome {
        log::info("supervised_run", json!({ "artifact": name }));
        let outcome = match self.launcher.mode() {
            LaunchMode::Subprocess => {
                let path = self.store.path(name);
                self.launcher.spawn_supervised(&path).await
            }
            LaunchMode::InProcess => self.attempt(name).await,
        };
        if outcome.succeeded {
            log::info("supervised_exit", json!({ "artifact": name }));
        } else {
            log::warn(
                "supervised_failed",
                json!({ "artifact": name, "detail": outcome.error_detail }),
            );
        }
        outcome
    }

    /// Attempted exactly once, never retried; failure is logged and does
    /// not block termination.
    pub async fn self_delete_orchestrator(&mut self) -> RemoveStatus {
        let status = self.store.remove(ORCHESTRATOR).await;
        match &status {
            RemoveStatus::Removed => log::info("self_delete", json!({ "artifact": ORCHESTRATOR })),
            RemoveStatus::NotFound => {
                log::info("self_delete_not_found", json!({ "artifact": ORCHESTRATOR }))
            }
            RemoveStatus::Failed(cause) => log::error(
                "self_delete_failed",
                json!({ "artifact": ORCHESTRATOR, "cause": cause }),
            ),
        }
        status
    }
}

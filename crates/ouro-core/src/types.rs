//! Core types for the cascade: agent records, spawn directives, outcomes,
//! and the fixed artifact namespace shared by every agent.

use serde::{Deserialize, Serialize};

/// Bumped whenever the on-disk agent record shape changes. The interpreter
/// refuses records from a different format generation.
pub const AGENT_FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Artifact namespace
// ---------------------------------------------------------------------------

/// The one artifact name every regeneration cycle overwrites in place.
pub const ORCHESTRATOR: &str = "orchestrator.agent";
pub const SUCCESSOR: &str = "successor.agent";
pub const MARKER: &str = "marker.agent";
pub const RECOVERY_A: &str = "recovery-a.agent";
pub const RECOVERY_B: &str = "recovery-b.agent";
/// Written and removed by the external selector; Recovery-B only checks
/// its existence.
pub const SELECTOR: &str = "selector.agent";
/// Accumulation log the matrix work units append to and the trainer reads.
pub const DATA_LOG: &str = "samples.csv";
pub const PREDICTIONS: &str = "predictions.json";

/// Artifacts a previous run can strand; removed best-effort on every entry.
pub const CLEANUP_SET: [&str; 4] = [SUCCESSOR, MARKER, RECOVERY_A, RECOVERY_B];

/// Name of the trigger artifact bound to a selector choice.
pub fn trigger_name(choice: u8) -> String {
    format!("trigger-{choice}.flag")
}

// ---------------------------------------------------------------------------
// Agent records
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Orchestrator,
    Successor,
    Marker,
    RecoveryA,
    RecoveryB,
    Selector,
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Orchestrator => write!(f, "orchestrator"),
            Self::Successor => write!(f, "successor"),
            Self::Marker => write!(f, "marker"),
            Self::RecoveryA => write!(f, "recovery-a"),
            Self::RecoveryB => write!(f, "recovery-b"),
            Self::Selector => write!(f, "selector"),
        }
    }
}

/// Declared owner of each well-known artifact name. Ownership is advisory:
/// the store is never locked, so a racing writer is tolerated, but every
/// write in this codebase goes through the owning role.
pub fn owner(name: &str) -> Option<AgentRole> {
    match name {
        ORCHESTRATOR => Some(AgentRole::Orchestrator),
        SUCCESSOR => Some(AgentRole::Successor),
        MARKER => Some(AgentRole::Marker),
        RECOVERY_A => Some(AgentRole::RecoveryA),
        RECOVERY_B => Some(AgentRole::RecoveryB),
        SELECTOR => Some(AgentRole::Selector),
        _ => None,
    }
}

/// How an agent hands control onward once its own work is done.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpawnDirective {
    None,
    /// Fire-and-forget launch; the caller never observes the child's exit.
    Detached { artifact: String },
    /// Blocking launch; the caller waits for the child and sees its status.
    Supervised { artifact: String },
}

/// One versioned agent record. Written once by the builder, never mutated;
/// superseded by an overwrite of its artifact or removed by self-deletion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub version: u32,
    pub role: AgentRole,
    /// ASCII-safe capture of a prior agent's artifact, embeddable through
    /// any number of regeneration cycles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_source: Option<String>,
    pub self_delete: bool,
    pub spawn: SpawnDirective,
}

/// Result of one interpretation or supervised run. Drives branching and
/// logging only; nothing is retried off the back of it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub succeeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl ExecutionOutcome {
    pub fn success() -> Self {
        Self {
            succeeded: true,
            error_detail: None,
        }
    }

    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            error_detail: Some(detail.into()),
        }
    }
}

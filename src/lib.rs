//! Ouro - a self-regenerating file-agent cascade runtime.
//!
//! Agents are versioned data records on a shared filesystem namestore,
//! interpreted by a role switch in this one binary. The orchestrator
//! writes its own successor, decides a branch from a typed load attempt,
//! and recovers through two supervised agents when the attempt fails.

pub mod cascade;
pub mod selector;
pub mod watcher;

//! The cascade core: namestore, template builder, process launcher, agent
//! interpreter, and the orchestrator state machine.

pub mod builder;
pub mod interpret;
pub mod launcher;
pub mod log;
pub mod namestore;
pub mod orchestrator;

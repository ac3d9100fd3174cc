//! External collaborators of the cascade: trigger watchers, the artifact
//! reaper, the numeric work units, and the trainer. All of them consume
//! only file-existence and file-content contracts over the namestore.

pub mod datalog;
pub mod matrix;
pub mod poll;
pub mod reaper;
pub mod train;

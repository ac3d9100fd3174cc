//! Ouro Core - agent data model, capture codec, and error handling

pub mod capture;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

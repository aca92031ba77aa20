//! # mnemo-core
//!
//! Shared vocabulary for the mnemo workspace: the unified error type, record
//! identifiers, and the closed set of memory kinds.

pub mod error;
pub mod types;

pub use error::{MnemoError, Result};
pub use types::*;

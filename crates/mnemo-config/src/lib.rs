//! # mnemo-config
//!
//! Configuration for mnemo. Reads from `mnemo.toml`, environment variables,
//! and CLI overrides, in that precedence order.

pub mod loader;
pub mod schema;

pub use loader::{ConfigLoader, apply_overrides};
pub use schema::MnemoConfig;
pub use schema::{ConfigWarning, ContextConfig, LoggingConfig, MaintenanceConfig, MemoryConfig, RecallConfig, WarningSeverity};

//! # mnemo-cli
//!
//! Command-line interface for the mnemo memory store.
//!
//! ## Commands
//!
//! - `mnemo remember`: Store a memory
//! - `mnemo recall`: Ranked search
//! - `mnemo recent`: Most recently accessed memories
//! - `mnemo context`: Bounded digest for a task
//! - `mnemo prune`: Capacity-driven eviction
//! - `mnemo config`: Show/edit configuration
//! - `mnemo doctor`: Audit configuration and index consistency

pub mod commands;

pub use commands::Cli;

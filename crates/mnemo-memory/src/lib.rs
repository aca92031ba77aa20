//! # mnemo-memory
//!
//! Durable, queryable memory for an agent:
//!
//! - **Record store**: SQLite table of memories kept in lockstep with an FTS5 index.
//! - **Query sanitizer**: turns free-form text into a tolerant prefix/OR query.
//! - **Ranking**: re-orders BM25 output by recency and importance.
//! - **Context assembly**: a character-bounded digest for prompting.
//! - **Maintenance**: capacity-driven eviction of low-value memories.

pub mod context;
pub mod maintenance;
pub mod module;
pub mod query;
pub mod ranking;
pub mod record;
pub mod store;

pub use context::ContextOptions;
pub use module::MemoryModule;
pub use query::{MatchQuery, sanitize};
pub use record::{MemoryRecord, NewMemory, ScoreRow};
pub use store::MemoryStore;

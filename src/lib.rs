//! # twofold - Two-Way Folder Synchronization
//!
//! Scan two folder trees, review the resulting plan, then execute it.
//!
//! The plan is the central artifact: every difference between the trees
//! becomes one operation, operations are ordered so parents precede their
//! contents, and any operation can be forbidden before execution without
//! breaking the ones that depend on it.

// Module declarations
pub mod commands;
pub mod config;
pub mod diff;
pub mod engine;
pub mod executor;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use config::{Config, Direction, SyncOptions};
pub use diff::{ComparisonConfig, Plan, Preference, TimeField};
pub use engine::SyncEngine;
pub use types::{CancelToken, FileRecord, OpKind, Operation, SyncError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! CLI commands

pub mod sync;

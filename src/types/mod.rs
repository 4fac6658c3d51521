//! Core type definitions for twofold

mod cancel;
mod error;
mod operation;
mod record;

pub use cancel::CancelToken;
pub use error::SyncError;
pub use operation::{OpKind, Operation};
pub use record::{EntryKey, FileRecord};

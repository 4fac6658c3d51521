//! Terminal user interface helpers

mod progress;

pub use progress::ProgressReporter;

//! Diff engine - Comparison policy, tree walk and plan

mod compare;
mod engine;
mod order;
mod plan;

pub use compare::{compare_records, ComparisonConfig, Preference, TimeField};
pub use engine::{scan_trees, EnterFolderCallback};
pub use order::order_for_dependencies;
pub use plan::{Plan, PlanStats};

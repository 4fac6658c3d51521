//! Plan - the ordered operation sequence produced by a scan

use super::order::{cascade_forbid, order_for_dependencies};
use crate::types::{OpKind, Operation, SyncError};

/// Ordered sequence of operations plus aggregate statistics.
///
/// The plan is owned by the engine; presentation reads it through
/// [`Plan::operations`] and mutates forbid/ambiguity state through the
/// engine API only, so the cascade invariant cannot be bypassed on a
/// detached copy.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plan {
    ops: Vec<Operation>,
    stats: PlanStats,
}

/// Aggregate statistics about a plan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlanStats {
    /// Number of Copy operations
    pub copy_count: usize,

    /// Number of Replace operations
    pub replace_count: usize,

    /// Replace operations still flagged ambiguous
    pub ambiguous_count: usize,

    /// Number of Remove operations
    pub remove_count: usize,

    /// Number of CreateDir operations
    pub create_count: usize,

    /// Number of equal-entries anchors
    pub anchor_count: usize,

    /// Total bytes Copy and Replace would transfer
    pub total_bytes: u64,
}

impl Plan {
    /// Build a plan from operations in discovery order: applies structural
    /// placement once, then freezes the sequence as authoritative for both
    /// presentation and execution.
    pub fn from_discovery(ops: Vec<Operation>) -> Self {
        let ordered = order_for_dependencies(ops);
        let stats = PlanStats::tally(&ordered);
        Self {
            ops: ordered,
            stats,
        }
    }

    /// Read-only view of the ordered operations.
    pub fn operations(&self) -> &[Operation] {
        &self.ops
    }

    pub fn stats(&self) -> &PlanStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Operation> {
        self.ops.get(index)
    }

    /// Toggle the forbidden flag at `index`.
    ///
    /// Forbidding cascades forward to every operation that depends on the
    /// target, directly or transitively. Un-forbidding clears only the
    /// target: dependents stay forbidden until toggled individually.
    pub fn set_forbidden(&mut self, index: usize, forbidden: bool) -> Result<(), SyncError> {
        let op = self
            .ops
            .get(index)
            .ok_or(SyncError::IndexOutOfRange(index))?;
        if op.is_anchor() {
            return Err(SyncError::ForbidAnchor(index));
        }

        if forbidden {
            cascade_forbid(&mut self.ops, index);
        } else {
            self.ops[index].set_forbidden(false);
        }
        Ok(())
    }

    /// Clear the ambiguity flag of the Replace at `index`, unblocking its
    /// execution with winner-overwrites-loser semantics.
    pub fn resolve(&mut self, index: usize) -> Result<(), SyncError> {
        let op = self
            .ops
            .get_mut(index)
            .ok_or(SyncError::IndexOutOfRange(index))?;
        if op.is_ambiguous() {
            op.resolve_ambiguity();
            self.stats.ambiguous_count -= 1;
        }
        Ok(())
    }
}

impl PlanStats {
    fn tally(ops: &[Operation]) -> Self {
        let mut stats = Self::default();
        for op in ops {
            match op.kind() {
                OpKind::Copy { file, .. } => {
                    stats.copy_count += 1;
                    stats.total_bytes += file.size;
                }
                OpKind::Replace {
                    winner, ambiguous, ..
                } => {
                    stats.replace_count += 1;
                    if *ambiguous {
                        stats.ambiguous_count += 1;
                    }
                    stats.total_bytes += winner.size;
                }
                OpKind::Remove { .. } => stats.remove_count += 1,
                OpKind::CreateDir { .. } => stats.create_count += 1,
                OpKind::Anchor { .. } => stats.anchor_count += 1,
            }
        }
        stats
    }

    /// Operations that would actually change the filesystem.
    pub fn effective_count(&self) -> usize {
        self.copy_count + self.replace_count + self.remove_count + self.create_count
    }
}

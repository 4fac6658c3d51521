//! Structural placement and forbid cascade over a built plan

use crate::types::Operation;

/// Reorder discovered operations so that a parent-directory operation always
/// precedes operations on its contents.
///
/// Directory-related operations are partitioned out first, keeping their
/// relative order. Every remaining file operation is then inserted
/// immediately after the last already-placed operation it depends on, or at
/// the front if it depends on none. Inserting after the last dependency
/// keeps a deep file behind every create on its path, not just the
/// outermost one.
pub fn order_for_dependencies(ops: Vec<Operation>) -> Vec<Operation> {
    let (dir_ops, file_ops): (Vec<Operation>, Vec<Operation>) =
        ops.into_iter().partition(|op| op.involves_dir());

    let mut ordered = dir_ops;
    for op in file_ops {
        match ordered.iter().rposition(|placed| op.depends_on(placed)) {
            Some(pos) => ordered.insert(pos + 1, op),
            None => ordered.insert(0, op),
        }
    }
    ordered
}

/// Forbid the operation at `index` and cascade to everything after it that
/// depends on it, directly or transitively.
///
/// The scan is a contiguous forward pass: each operation found to depend on
/// the current root is forbidden and becomes the root for the entries after
/// it; the first operation that depends on no active root ends its root's
/// scan. An explicit stack bounds the depth on large plans. Callers must
/// have rejected anchors already; anchors never depend on anything, so the
/// cascade cannot reach one.
pub(crate) fn cascade_forbid(ops: &mut [Operation], index: usize) {
    ops[index].set_forbidden(true);

    let mut roots = vec![index];
    let mut cursor = index + 1;

    while cursor < ops.len() {
        let Some(&root) = roots.last() else {
            break;
        };

        if depends(ops, cursor, root) {
            ops[cursor].set_forbidden(true);
            roots.push(cursor);
            cursor += 1;
        } else {
            // Does not depend on the innermost root: close that root's scan
            // and re-test this position against the enclosing one.
            roots.pop();
        }
    }
}

fn depends(ops: &[Operation], dependent: usize, dependency: usize) -> bool {
    ops[dependent].depends_on(&ops[dependency])
}

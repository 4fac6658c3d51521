//! Operation - Planned unit of filesystem change

use super::FileRecord;
use std::path::{Path, PathBuf};

/// The five kinds of planned change.
///
/// A closed sum type: every consumer matches exhaustively, there is no
/// type-tag dispatch and nothing to downcast.
#[derive(Debug, Clone, PartialEq)]
pub enum OpKind {
    /// Copy `file` into `dest_dir`. Never used for directories.
    Copy { file: FileRecord, dest_dir: PathBuf },

    /// Overwrite `loser`'s path with `winner`'s content. While `ambiguous`
    /// is set the operation is blocked: executing it fails without touching
    /// any file, until a caller clears the ambiguity.
    Replace {
        winner: FileRecord,
        loser: FileRecord,
        ambiguous: bool,
    },

    /// Delete a file, or delete an already-emptied directory with a
    /// non-recursive call. The plan guarantees descendant removals run
    /// first.
    Remove { target: FileRecord },

    /// Create directory `target`, mirroring `source`.
    CreateDir { source: FileRecord, target: PathBuf },

    /// No filesystem effect: marks two equal entries, or a directory pair
    /// the scan descended into. Structural anchor only; cannot be
    /// forbidden.
    Anchor { left: FileRecord, right: FileRecord },
}

/// A planned operation: an [`OpKind`] plus the user-settable forbidden flag.
///
/// Operations are created only by the diff engine and owned by the plan;
/// after construction nothing mutates them except the forbidden flag and
/// Replace ambiguity resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    kind: OpKind,
    forbidden: bool,
}

impl Operation {
    pub fn copy(file: FileRecord, dest_dir: PathBuf) -> Self {
        Self::new(OpKind::Copy { file, dest_dir })
    }

    pub fn replace(winner: FileRecord, loser: FileRecord, ambiguous: bool) -> Self {
        Self::new(OpKind::Replace {
            winner,
            loser,
            ambiguous,
        })
    }

    pub fn remove(target: FileRecord) -> Self {
        Self::new(OpKind::Remove { target })
    }

    pub fn create_dir(source: FileRecord, target: PathBuf) -> Self {
        Self::new(OpKind::CreateDir { source, target })
    }

    pub fn anchor(left: FileRecord, right: FileRecord) -> Self {
        Self::new(OpKind::Anchor { left, right })
    }

    fn new(kind: OpKind) -> Self {
        Self {
            kind,
            forbidden: false,
        }
    }

    pub fn kind(&self) -> &OpKind {
        &self.kind
    }

    /// Short label for logs and the plan printer.
    pub fn name(&self) -> &'static str {
        match self.kind {
            OpKind::Copy { .. } => "copy",
            OpKind::Replace { .. } => "replace",
            OpKind::Remove { .. } => "remove",
            OpKind::CreateDir { .. } => "create",
            OpKind::Anchor { .. } => "equal",
        }
    }

    /// Primary record the operation was planned for.
    pub fn record(&self) -> &FileRecord {
        match &self.kind {
            OpKind::Copy { file, .. } => file,
            OpKind::Replace { winner, .. } => winner,
            OpKind::Remove { target } => target,
            OpKind::CreateDir { source, .. } => source,
            OpKind::Anchor { left, .. } => left,
        }
    }

    /// Whether the primary record is a directory. Drives the structural
    /// placement partition.
    pub fn involves_dir(&self) -> bool {
        self.record().is_dir
    }

    pub fn is_anchor(&self) -> bool {
        matches!(self.kind, OpKind::Anchor { .. })
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(
            self.kind,
            OpKind::Replace {
                ambiguous: true,
                ..
            }
        )
    }

    /// Clear the ambiguity of a Replace; afterwards execution proceeds with
    /// winner-overwrites-loser semantics. No-op for other kinds.
    pub(crate) fn resolve_ambiguity(&mut self) {
        if let OpKind::Replace { ambiguous, .. } = &mut self.kind {
            *ambiguous = false;
        }
    }

    pub fn forbidden(&self) -> bool {
        self.forbidden
    }

    pub(crate) fn set_forbidden(&mut self, forbidden: bool) {
        self.forbidden = forbidden;
    }

    /// Path a Copy will write to.
    pub fn copy_target(&self) -> Option<PathBuf> {
        match &self.kind {
            OpKind::Copy { file, dest_dir } => Some(dest_dir.join(file.file_name())),
            _ => None,
        }
    }

    /// Would executing this operation change the state observed at `path`?
    pub fn affects(&self, path: &Path) -> bool {
        match &self.kind {
            OpKind::Copy { file, dest_dir } => {
                path == file.path || path == dest_dir.join(file.file_name())
            }
            OpKind::Replace { winner, loser, .. } => path == winner.path || path == loser.path,
            OpKind::Remove { target } => path == target.path,
            OpKind::CreateDir { target, .. } => path == *target,
            OpKind::Anchor { left, right } => path == left.path || path == right.path,
        }
    }

    /// Concrete paths this operation's effect touches. Used to answer the
    /// inverse of [`Operation::affects`] for directory removals.
    fn touched(&self) -> Vec<PathBuf> {
        match &self.kind {
            OpKind::Copy { file, dest_dir } => {
                vec![file.path.clone(), dest_dir.join(file.file_name())]
            }
            OpKind::Replace { winner, loser, .. } => {
                vec![winner.path.clone(), loser.path.clone()]
            }
            OpKind::Remove { target } => vec![target.path.clone()],
            OpKind::CreateDir { target, .. } => vec![target.clone()],
            OpKind::Anchor { .. } => Vec::new(),
        }
    }

    /// Must `other` execute (and remain un-forbidden) before this operation
    /// is valid?
    ///
    /// The contract: true iff `other` affects a path that is an ancestor of,
    /// or identical to, a path this operation's effect touches. Two
    /// refinements keep the relation acyclic:
    /// - a Remove of a plain file depends on nothing above it;
    /// - a Remove of a directory depends on every operation touching a path
    ///   strictly inside it (children are removed before their parent).
    pub fn depends_on(&self, other: &Operation) -> bool {
        match &self.kind {
            OpKind::Copy { file, dest_dir } => {
                let written = dest_dir.join(file.file_name());
                ancestor_affected(other, &written) || ancestor_affected(other, &file.path)
            }
            OpKind::Replace { winner, loser, .. } => {
                ancestor_affected(other, &winner.path) || ancestor_affected(other, &loser.path)
            }
            OpKind::Remove { target } if target.is_dir => other
                .touched()
                .iter()
                .any(|p| p != &target.path && p.starts_with(&target.path)),
            OpKind::Remove { .. } => false,
            OpKind::CreateDir { target, .. } => target
                .parent()
                .map(|parent| ancestor_affected(other, parent))
                .unwrap_or(false),
            OpKind::Anchor { .. } => false,
        }
    }
}

/// Does `op` affect `path` or any of its ancestor directories?
fn ancestor_affected(op: &Operation, path: &Path) -> bool {
    path.ancestors().any(|candidate| op.affects(candidate))
}

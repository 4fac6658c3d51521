//! Record comparison policy - which version of a matched pair wins

use crate::types::FileRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Outcome of comparing two tree-matched records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    /// No enabled criterion distinguishes the records
    Equal,
    /// The first record wins on every distinguishing criterion
    Preferable,
    /// The second record wins on every distinguishing criterion
    NonPreferable,
    /// Conflicting signals (e.g. first is bigger but older)
    Undefined,
}

/// Which timestamp the time criterion reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeField {
    Created,
    #[default]
    Modified,
    Accessed,
}

/// Criteria driving the comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub compare_size: bool,
    pub compare_time: bool,
    pub time_field: TimeField,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            compare_size: true,
            compare_time: true,
            time_field: TimeField::Modified,
        }
    }
}

/// Compare two tree-matched records under the enabled criteria.
///
/// Each enabled criterion produces a per-criterion verdict by the
/// greater-is-preferable rule; Equal verdicts are discarded. If none remain
/// the records are Equal. Mixed Preferable/NonPreferable verdicts mean the
/// signals conflict and the result is Undefined.
///
/// Defined only for records that match by name and kind; calling it on
/// non-matching records is a usage error.
pub fn compare_records(a: &FileRecord, b: &FileRecord, config: &ComparisonConfig) -> Preference {
    debug_assert!(a.matches(b), "comparator requires tree-matched records");
    if !a.matches(b) {
        return Preference::Undefined;
    }

    let mut verdicts = Vec::with_capacity(2);

    if config.compare_size {
        verdicts.push(prefer_greater(a.size, b.size));
    }

    if config.compare_time {
        let verdict = match config.time_field {
            TimeField::Created => prefer_greater(a.created, b.created),
            TimeField::Modified => prefer_greater(a.modified, b.modified),
            TimeField::Accessed => prefer_greater(a.accessed, b.accessed),
        };
        verdicts.push(verdict);
    }

    combine(&verdicts)
}

/// Generic per-criterion rule: the greater value is preferable.
fn prefer_greater<T: Ord>(a: T, b: T) -> Preference {
    match a.cmp(&b) {
        Ordering::Greater => Preference::Preferable,
        Ordering::Equal => Preference::Equal,
        Ordering::Less => Preference::NonPreferable,
    }
}

fn combine(verdicts: &[Preference]) -> Preference {
    let distinguishing: Vec<Preference> = verdicts
        .iter()
        .copied()
        .filter(|v| *v != Preference::Equal)
        .collect();

    if distinguishing.is_empty() {
        return Preference::Equal;
    }

    let has_preferable = distinguishing.contains(&Preference::Preferable);
    let has_non_preferable = distinguishing.contains(&Preference::NonPreferable);

    if has_preferable {
        if has_non_preferable {
            Preference::Undefined
        } else {
            Preference::Preferable
        }
    } else {
        Preference::NonPreferable
    }
}

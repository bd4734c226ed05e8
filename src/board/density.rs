//! Dense-ordering checks and move target validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SequencerError};

use super::store::GroupKey;

/// How out-of-range move targets are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionPolicy {
    /// Reject with `InvalidPosition`.
    #[default]
    Strict,
    /// Clamp into the valid range.
    Clamp,
}

impl fmt::Display for PositionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionPolicy::Strict => write!(f, "strict"),
            PositionPolicy::Clamp => write!(f, "clamp"),
        }
    }
}

impl std::str::FromStr for PositionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(PositionPolicy::Strict),
            "clamp" => Ok(PositionPolicy::Clamp),
            _ => Err(format!(
                "Invalid position policy: '{}'. Valid values: strict, clamp",
                s
            )),
        }
    }
}

/// Resolve a requested target against the inclusive upper bound `max`.
///
/// `max` is `N - 1` for a reorder within a group of N items and `size(D)` for
/// an insertion into destination D.
pub fn validate_target(policy: PositionPolicy, requested: i64, max: i64) -> Result<i64> {
    if (0..=max).contains(&requested) {
        return Ok(requested);
    }
    match policy {
        PositionPolicy::Strict => Err(SequencerError::InvalidPosition { requested, max }),
        PositionPolicy::Clamp => Ok(requested.clamp(0, max.max(0))),
    }
}

/// A way a group's positions fail to be `0..N-1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DensityViolation {
    Negative { position: i64 },
    Duplicate { position: i64 },
    Gap { expected: i64, found: i64 },
}

impl fmt::Display for DensityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DensityViolation::Negative { position } => {
                write!(f, "negative position {}", position)
            }
            DensityViolation::Duplicate { position } => {
                write!(f, "position {} used more than once", position)
            }
            DensityViolation::Gap { expected, found } => {
                write!(f, "expected position {}, found {}", expected, found)
            }
        }
    }
}

/// Check that `positions` (in any order) are exactly `{0, .., N-1}`.
pub fn check_dense(positions: &[i64]) -> std::result::Result<(), DensityViolation> {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    for (expected, &found) in sorted.iter().enumerate() {
        let expected = expected as i64;
        if found < 0 {
            return Err(DensityViolation::Negative { position: found });
        }
        if found == expected {
            continue;
        }
        if expected > 0 && found == sorted[expected as usize - 1] {
            return Err(DensityViolation::Duplicate { position: found });
        }
        return Err(DensityViolation::Gap { expected, found });
    }
    Ok(())
}

/// A group that failed [`check_dense`], as reported by store integrity checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupViolation {
    pub scope: &'static str,
    pub group: GroupKey,
    pub violation: DensityViolation,
}

impl fmt::Display for GroupViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} group {}: {}", self.scope, self.group, self.violation)
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Floor labels and the signed axis they order on.
//!
//! A label is `1`..`999` above ground or `B1`..`B99` in the basement. Both
//! map onto a single signed axis with basements negative; zero never
//! occurs, so callers can use `axis > 0` as "above ground" without a
//! separate flag once a [`Floor`] has been constructed.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Upper bound (inclusive) on the floor number in either direction.
const MAX_FLOOR_NUMBER: i32 = 999;
/// Upper bound (inclusive) on the basement number.
const MAX_BASEMENT_NUMBER: i32 = 99;

/// A parsed, valid floor label, stored as a non-zero signed axis value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Floor {
    axis: i32,
}

/// Error returned when a floor label fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseFloorError;

impl fmt::Display for ParseFloorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid floor label")
    }
}

impl std::error::Error for ParseFloorError {}

impl Floor {
    /// Build a `Floor` directly from a non-zero axis value.
    ///
    /// Returns `None` for `axis == 0` or a magnitude outside the valid
    /// range for its side (999 above ground, 99 in the basement).
    pub fn from_axis(axis: i32) -> Option<Self> {
        if axis == 0 {
            return None;
        }
        let bound = if axis > 0 { MAX_FLOOR_NUMBER } else { MAX_BASEMENT_NUMBER };
        if axis.unsigned_abs() as i32 > bound {
            return None;
        }
        Some(Self { axis })
    }

    /// The signed axis position. Positive above ground, negative in the basement.
    pub fn axis(&self) -> i32 {
        self.axis
    }

    /// Whether this floor is in the basement.
    pub fn is_basement(&self) -> bool {
        self.axis < 0
    }

    /// `-1`, `0`, or `1` per [`Ord`], exposed directly since callers in the
    /// scheduler want the tri-state result, not just a boolean comparison.
    pub fn compare(&self, other: &Floor) -> i32 {
        match self.axis.cmp(&other.axis) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    /// True if `self` falls within `[lo, hi]` inclusive.
    pub fn in_range(&self, lo: Floor, hi: Floor) -> bool {
        self.axis >= lo.axis && self.axis <= hi.axis
    }

    /// The axis value one unit closer to `dst`, skipping zero, or `None` if
    /// that step would leave `[lo, hi]`.
    ///
    /// Since `lo` and `hi` are themselves valid (non-zero) floors and the
    /// step only ever moves one unit at a time from a valid floor, the
    /// result never lands on zero: moving from 1 towards a negative
    /// destination steps to -1, and vice versa.
    pub fn step_towards(&self, dst: Floor, lo: Floor, hi: Floor) -> Option<Floor> {
        if self.axis == dst.axis {
            return Some(*self);
        }
        let direction = if dst.axis > self.axis { 1 } else { -1 };
        let mut next = self.axis + direction;
        if next == 0 {
            next += direction;
        }
        let stepped = Floor::from_axis(next)?;
        if stepped.in_range(lo, hi) {
            Some(stepped)
        } else {
            None
        }
    }

    /// Step one unit up or down from this floor, skipping zero, for the
    /// manual-service `up`/`down` operations (which move by one floor
    /// directly rather than sweeping towards a destination).
    pub fn step_one(&self, up: bool) -> Option<Floor> {
        let mut next = self.axis + if up { 1 } else { -1 };
        if next == 0 {
            next += if up { 1 } else { -1 };
        }
        Floor::from_axis(next)
    }
}

impl fmt::Display for Floor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.axis < 0 {
            write!(f, "B{}", -self.axis)
        } else {
            write!(f, "{}", self.axis)
        }
    }
}

impl FromStr for Floor {
    type Err = ParseFloorError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        if label.is_empty() || label.len() > 4 {
            return Err(ParseFloorError);
        }

        let (digits, is_basement) = match label.strip_prefix('B') {
            Some(rest) => (rest, true),
            None => (label, false),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseFloorError);
        }
        // Reject leading zeros; "0" itself is never valid either.
        if digits.len() > 1 && digits.as_bytes()[0] == b'0' {
            return Err(ParseFloorError);
        }

        let number: i32 = digits.parse().map_err(|_| ParseFloorError)?;
        if number == 0 {
            return Err(ParseFloorError);
        }

        let axis = if is_basement { -number } else { number };
        Floor::from_axis(axis).ok_or(ParseFloorError)
    }
}

#[cfg(test)]
#[path = "floor_tests.rs"]
mod tests;

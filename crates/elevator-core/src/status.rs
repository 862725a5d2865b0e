// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The car's five-state door/motion label, as it appears on the wire and in
//! the shared-state region.

use std::fmt;
use std::str::FromStr;

/// One of the five door/motion states a car can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarStatus {
    Opening,
    Open,
    Closing,
    Closed,
    Between,
}

/// Error returned when a status token doesn't match one of the five literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCarStatusError {
    pub token: String,
}

impl fmt::Display for ParseCarStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid car status: {:?}", self.token)
    }
}

impl std::error::Error for ParseCarStatusError {}

impl CarStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opening => "Opening",
            Self::Open => "Open",
            Self::Closing => "Closing",
            Self::Closed => "Closed",
            Self::Between => "Between",
        }
    }

    /// Whether this status is one of the two mid-transition states where the
    /// dispatcher and the queue scheduler should treat the car as already
    /// advanced one floor toward its destination.
    pub fn is_transitional(&self) -> bool {
        matches!(self, Self::Closing | Self::Between)
    }
}

impl fmt::Display for CarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CarStatus {
    type Err = ParseCarStatusError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "Opening" => Ok(Self::Opening),
            "Open" => Ok(Self::Open),
            "Closing" => Ok(Self::Closing),
            "Closed" => Ok(Self::Closed),
            "Between" => Ok(Self::Between),
            _ => Err(ParseCarStatusError { token: token.to_owned() }),
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;

//! Catalogue index ranges.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fmt;
use std::str::FromStr;

/// Inclusive range of catalogue indices, either bound optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayRange {
    /// First index to process.
    pub start: Option<u64>,
    /// Last index to process.
    pub end: Option<u64>,
}

/// Errors parsing a [`ReplayRange`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeParseError {
    /// A bound is not a non-negative integer.
    #[error("Invalid range bound '{0}'")]
    InvalidBound(String),

    /// More than one `-` separator.
    #[error("Invalid range '{0}', expected A-B, A-, -B or A")]
    Malformed(String),

    /// Start greater than end.
    #[error("Range start {start} is greater than end {end}")]
    Reversed {
        /// Parsed start.
        start: u64,
        /// Parsed end.
        end: u64,
    },
}

impl ReplayRange {
    /// Range with both bounds.
    ///
    /// # Errors
    ///
    /// * If `start > end`
    pub const fn new(start: Option<u64>, end: Option<u64>) -> Result<Self, RangeParseError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(RangeParseError::Reversed { start, end });
            }
        }
        Ok(Self { start, end })
    }

    /// Open-ended range starting at `start`.
    #[must_use]
    pub const fn from_start(start: u64) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// Whether `index` lies before the start.
    #[must_use]
    pub fn is_before(&self, index: u64) -> bool {
        self.start.is_some_and(|start| index < start)
    }

    /// Whether `index` lies after the end.
    #[must_use]
    pub fn is_past(&self, index: u64) -> bool {
        self.end.is_some_and(|end| index > end)
    }

    /// Whether `index` is inside the range.
    #[must_use]
    pub fn contains(&self, index: u64) -> bool {
        !self.is_before(index) && !self.is_past(index)
    }
}

impl FromStr for ReplayRange {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut parts = s.split('-');
        let start = parse_bound(parts.next().unwrap_or_default())?;
        let end = match parts.next() {
            Some(end) => parse_bound(end)?,
            None => None,
        };
        if parts.next().is_some() {
            return Err(RangeParseError::Malformed(s.to_string()));
        }
        if start.is_none() && end.is_none() && !s.contains('-') {
            return Err(RangeParseError::Malformed(s.to_string()));
        }
        Self::new(start, end)
    }
}

fn parse_bound(bound: &str) -> Result<Option<u64>, RangeParseError> {
    let bound = bound.trim();
    if bound.is_empty() {
        return Ok(None);
    }
    bound
        .parse()
        .map(Some)
        .map_err(|_| RangeParseError::InvalidBound(bound.to_string()))
}

impl fmt::Display for ReplayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{start}")?;
        }
        f.write_str("-")?;
        if let Some(end) = self.end {
            write!(f, "{end}")?;
        }
        Ok(())
    }
}

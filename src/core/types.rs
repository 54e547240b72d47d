use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// One raw observation: epoch-millisecond timestamp and measured value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: i64,
    pub value: f64,
}

impl Sample {
    #[must_use]
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }

    #[must_use]
    pub fn datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Calendar year (UTC) of the sample.
    ///
    /// Timestamps outside chrono's representable range saturate to the
    /// extreme years so slicing predicates stay monotonic.
    #[must_use]
    pub fn year(self) -> i32 {
        match self.datetime() {
            Some(time) => time.year(),
            None if self.timestamp < 0 => i32::MIN,
            None => i32::MAX,
        }
    }
}

/// One averaged bucket: `x` is the timestamp of the bucket's first sample,
/// `y` the arithmetic mean of its values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatedPoint {
    pub x: f64,
    pub y: f64,
}

impl AggregatedPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Integer pixel position on the drawing surface (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: i32,
    pub y: i32,
}

impl CanvasPoint {
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Inclusive configuration bounds for selectable years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBounds {
    pub min: i32,
    pub max: i32,
}

impl Default for DateBounds {
    fn default() -> Self {
        Self {
            min: 1881,
            max: 2006,
        }
    }
}

impl DateBounds {
    pub fn new(min: i32, max: i32) -> ChartResult<Self> {
        if min > max {
            return Err(ChartError::InvalidData(format!(
                "date bounds must satisfy min <= max, got {min}..{max}"
            )));
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub fn full_range(self) -> DateRange {
        DateRange {
            start: self.min,
            end: self.max,
        }
    }

    /// Yields every selectable year, in order.
    pub fn years(self) -> impl Iterator<Item = i32> {
        self.min..=self.max
    }
}

/// Inclusive range of years selected for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: i32,
    pub end: i32,
}

impl DateRange {
    pub fn new(start: i32, end: i32) -> ChartResult<Self> {
        if start > end {
            return Err(ChartError::InvalidData(format!(
                "date range start {start} must be <= end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Builds a range that must also lie inside `bounds`.
    pub fn within(start: i32, end: i32, bounds: DateBounds) -> ChartResult<Self> {
        let range = Self::new(start, end)?;
        if range.start < bounds.min || range.end > bounds.max {
            return Err(ChartError::InvalidData(format!(
                "date range {start}..={end} exceeds bounds {}..={}",
                bounds.min, bounds.max
            )));
        }
        Ok(range)
    }

    /// Overlap of this range with `bounds`, or `None` when they are disjoint.
    #[must_use]
    pub fn intersect(self, bounds: DateBounds) -> Option<Self> {
        if self.end < bounds.min || self.start > bounds.max {
            return None;
        }
        Some(Self {
            start: self.start.max(bounds.min),
            end: self.end.min(bounds.max),
        })
    }

    #[must_use]
    pub fn contains_year(self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

#[cfg(test)]
mod tests {
    use super::{DateBounds, DateRange, Sample};

    #[test]
    fn sample_year_uses_utc_calendar() {
        // 1950-01-01T00:00:00Z
        let sample = Sample::new(-631_152_000_000, 1.0);
        assert_eq!(sample.year(), 1950);
        let just_before = Sample::new(-631_152_000_001, 1.0);
        assert_eq!(just_before.year(), 1949);
    }

    #[test]
    fn date_range_rejects_inverted_years() {
        assert!(DateRange::new(1950, 1900).is_err());
        assert!(DateRange::new(1900, 1900).is_ok());
    }

    #[test]
    fn date_range_within_checks_bounds() {
        let bounds = DateBounds::default();
        assert!(DateRange::within(1881, 2006, bounds).is_ok());
        assert!(DateRange::within(1880, 1990, bounds).is_err());
        assert!(DateRange::within(1900, 2007, bounds).is_err());
    }

    #[test]
    fn intersection_keeps_only_the_overlap() {
        let bounds = DateBounds::new(1900, 2000).expect("bounds");
        assert_eq!(
            DateRange { start: 1850, end: 1950 }.intersect(bounds),
            Some(DateRange { start: 1900, end: 1950 })
        );
        assert_eq!(
            DateRange { start: 2000, end: 2020 }.intersect(bounds),
            Some(DateRange { start: 2000, end: 2000 })
        );
        assert_eq!(DateRange { start: 2010, end: 2020 }.intersect(bounds), None);
        assert_eq!(DateRange { start: 1700, end: 1899 }.intersect(bounds), None);
        assert_eq!(bounds.years().count(), 101);
    }
}

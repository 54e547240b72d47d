use std::fmt;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::core::{DateRange, Sample};

/// Coarse time key used to index stored buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketGranularity {
    #[default]
    Year,
    Month,
}

impl fmt::Display for BucketGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year => f.write_str("year"),
            Self::Month => f.write_str("month"),
        }
    }
}

/// Bucket key for `sample`: `YYYY` or `YYYY-MM`.
///
/// Years are zero-padded to four digits so keys order lexicographically in
/// time order for every year in `0..=9999`.
#[must_use]
pub fn bucket_key(sample: Sample, granularity: BucketGranularity) -> String {
    let (year, month) = match sample.datetime() {
        Some(time) => (time.year(), time.month()),
        None => (sample.year(), 1),
    };
    match granularity {
        BucketGranularity::Year => year_key(year),
        BucketGranularity::Month => month_key(year, month),
    }
}

/// Inclusive `(first, last)` bucket keys covering every year of `range`.
#[must_use]
pub fn range_keys(range: DateRange, granularity: BucketGranularity) -> (String, String) {
    match granularity {
        BucketGranularity::Year => (year_key(range.start), year_key(range.end)),
        BucketGranularity::Month => (month_key(range.start, 1), month_key(range.end, 12)),
    }
}

fn year_key(year: i32) -> String {
    format!("{year:04}")
}

fn month_key(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

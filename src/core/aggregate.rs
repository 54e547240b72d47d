use tracing::trace;

use crate::core::interval_index::boundary_or_len;
use crate::core::{AggregatedPoint, DateRange, Sample, Series};
use crate::error::{ChartError, ChartResult};

/// Returns the samples whose year lies inside `range` (both ends inclusive).
///
/// Both boundaries are located by binary search, so the cost is logarithmic
/// in the series length and no samples are copied.
#[must_use]
pub fn slice_by_years(series: &Series, range: DateRange) -> &[Sample] {
    let samples = series.samples();
    let lower = boundary_or_len(samples, |sample| sample.year() >= range.start);
    let upper = boundary_or_len(samples, |sample| sample.year() > range.end);
    if lower >= upper {
        return &[];
    }
    &samples[lower..upper]
}

/// Splits `slice` into `groups` contiguous buckets of `len / groups` samples.
///
/// The final bucket absorbs the remainder, so it is larger than the others by
/// `len % groups` samples. `groups` is clamped to `slice.len()`.
#[must_use]
pub fn partition_buckets(slice: &[Sample], groups: usize) -> Vec<&[Sample]> {
    let groups = groups.min(slice.len());
    if groups == 0 {
        return Vec::new();
    }

    let bucket_len = slice.len() / groups;
    let mut buckets = Vec::with_capacity(groups);
    for group in 0..groups {
        let start = group * bucket_len;
        if group + 1 == groups {
            buckets.push(&slice[start..]);
        } else {
            buckets.push(&slice[start..start + bucket_len]);
        }
    }
    buckets
}

/// Mean of the bucket values, or `None` for an empty bucket.
#[must_use]
pub fn average(samples: &[Sample]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let sum: f64 = samples.iter().map(|sample| sample.value).sum();
    Some(sum / samples.len() as f64)
}

/// Slices `series` to `range` and downsamples it into at most `groups_count`
/// averaged points.
///
/// An empty selection yields an empty vector. `groups_count == 0` is rejected.
pub fn aggregate(
    series: &Series,
    range: DateRange,
    groups_count: usize,
) -> ChartResult<Vec<AggregatedPoint>> {
    if groups_count == 0 {
        return Err(ChartError::InvalidData(
            "groups count must be > 0".to_owned(),
        ));
    }

    let slice = slice_by_years(series, range);
    let buckets = partition_buckets(slice, groups_count);
    trace!(
        series_len = series.len(),
        slice_len = slice.len(),
        requested_groups = groups_count,
        groups = buckets.len(),
        "aggregate series window"
    );

    Ok(buckets
        .into_iter()
        .filter_map(|bucket| {
            let first = bucket.first()?;
            Some(AggregatedPoint::new(first.timestamp as f64, average(bucket)?))
        })
        .collect())
}

use approx::assert_relative_eq;
use climate_chart::ChartError;
use climate_chart::core::{
    DateRange, RawSample, Series, aggregate, format_year_month, partition_buckets, slice_by_years,
};

fn scenario_series() -> Series {
    Series::from_raw(&[
        RawSample::new("1900-01", 5.0),
        RawSample::new("1900-06", 10.0),
        RawSample::new("1950-01", 0.0),
    ])
    .expect("valid series")
}

#[test]
fn two_groups_average_the_1900_samples_and_keep_1950() {
    let series = scenario_series();
    let range = DateRange::new(1900, 1950).expect("range");

    let points = aggregate(&series, range, 2).expect("aggregate");

    assert_eq!(points.len(), 2);
    assert_relative_eq!(points[0].y, 7.5);
    assert_relative_eq!(points[1].y, 0.0);
    assert_eq!(format_year_month(points[0].x as i64), "1900-01");
    assert_eq!(format_year_month(points[1].x as i64), "1950-01");
}

#[test]
fn groups_are_clamped_to_slice_length() {
    let series = scenario_series();
    let range = DateRange::new(1900, 1950).expect("range");

    let points = aggregate(&series, range, 10).expect("aggregate");
    let values: Vec<f64> = points.iter().map(|point| point.y).collect();
    assert_eq!(values, vec![5.0, 10.0, 0.0]);
}

#[test]
fn range_without_samples_yields_no_points() {
    let series = scenario_series();
    let range = DateRange::new(1901, 1949).expect("range");

    assert!(slice_by_years(&series, range).is_empty());
    assert_eq!(aggregate(&series, range, 4).expect("aggregate"), Vec::new());
}

#[test]
fn zero_groups_is_rejected() {
    let series = scenario_series();
    let range = DateRange::new(1900, 1950).expect("range");
    assert!(matches!(
        aggregate(&series, range, 0),
        Err(ChartError::InvalidData(_))
    ));
}

#[test]
fn range_bounds_are_inclusive_years() {
    let series = scenario_series();
    let only_1900 = DateRange::new(1900, 1900).expect("range");
    let slice = slice_by_years(&series, only_1900);
    assert_eq!(slice.len(), 2);
}

#[test]
fn last_bucket_absorbs_remainder() {
    let series = Series::from_raw(
        &(1..=7)
            .map(|month| RawSample::new(format!("1990-{month:02}"), f64::from(month)))
            .collect::<Vec<_>>(),
    )
    .expect("series");

    let buckets = partition_buckets(series.samples(), 3);
    let sizes: Vec<usize> = buckets.iter().map(|bucket| bucket.len()).collect();
    assert_eq!(sizes, vec![2, 2, 3]);

    let range = DateRange::new(1990, 1990).expect("range");
    let points = aggregate(&series, range, 3).expect("aggregate");
    assert_relative_eq!(points[2].y, 6.0);
}

#[test]
fn series_rejects_unsorted_and_malformed_input() {
    let unsorted = Series::from_raw(&[RawSample::new("1950", 1.0), RawSample::new("1900", 2.0)]);
    assert!(matches!(unsorted, Err(ChartError::InvalidData(_))));

    let malformed = Series::from_json(r#"[{"t":"not a date","v":1}]"#);
    assert!(matches!(malformed, Err(ChartError::InvalidData(_))));
}

#[test]
fn series_json_accepts_mixed_date_shapes() {
    let series = Series::from_json(
        r#"[{"t":"1900","v":1},{"t":"1900-02","v":2},{"t":"1900-02-15","v":3},{"t":"1900-03-01T12:00:00Z","v":4}]"#,
    )
    .expect("series");
    assert_eq!(series.len(), 4);
}

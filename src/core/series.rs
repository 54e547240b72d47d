use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::core::Sample;
use crate::error::{ChartError, ChartResult};

/// Wire shape of one input observation: `{ "t": "1900-01", "v": 5.0 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub t: String,
    pub v: f64,
}

impl RawSample {
    #[must_use]
    pub fn new(t: impl Into<String>, v: f64) -> Self {
        Self { t: t.into(), v }
    }

    pub fn to_sample(&self) -> ChartResult<Sample> {
        Ok(Sample::new(parse_timestamp_millis(&self.t)?, self.v))
    }
}

/// Parses `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, naive `YYYY-MM-DDTHH:MM:SS[.f]`
/// or RFC 3339 strings into UTC epoch milliseconds.
pub fn parse_timestamp_millis(text: &str) -> ChartResult<i64> {
    let text = text.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Ok(time.timestamp_millis());
    }
    if let Ok(time) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(time.and_utc().timestamp_millis());
    }

    let date = match text.len() {
        4 => text
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)),
        7 => NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d").ok(),
        _ => NaiveDate::parse_from_str(text, "%Y-%m-%d").ok(),
    };

    date.and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|time| time.and_utc().timestamp_millis())
        .ok_or_else(|| ChartError::InvalidData(format!("unrecognized sample date `{text}`")))
}

/// Formats an epoch-millisecond timestamp as `YYYY-MM` (UTC).
#[must_use]
pub fn format_year_month(timestamp_millis: i64) -> String {
    match DateTime::from_timestamp_millis(timestamp_millis) {
        Some(time) => time.format("%Y-%m").to_string(),
        None => timestamp_millis.to_string(),
    }
}

/// Immutable, ascending-by-time sample sequence.
///
/// Construction validates ordering so binary searches and slicing over the
/// series are always sound. Equal timestamps are allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series {
    samples: Vec<Sample>,
}

impl Series {
    pub fn from_samples(samples: Vec<Sample>) -> ChartResult<Self> {
        for (idx, sample) in samples.iter().enumerate() {
            if !sample.value.is_finite() {
                return Err(ChartError::InvalidData(format!(
                    "sample {idx} has a non-finite value"
                )));
            }
        }
        if let Some(idx) = samples
            .windows(2)
            .position(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            return Err(ChartError::InvalidData(format!(
                "samples must be sorted ascending by time (violation at index {})",
                idx + 1
            )));
        }

        Ok(Self { samples })
    }

    pub fn from_raw(raw: &[RawSample]) -> ChartResult<Self> {
        let samples = raw
            .iter()
            .map(RawSample::to_sample)
            .collect::<ChartResult<Vec<_>>>()?;
        Self::from_samples(samples)
    }

    pub fn from_json(json: &str) -> ChartResult<Self> {
        let raw: Vec<RawSample> = serde_json::from_str(json)
            .map_err(|err| ChartError::InvalidData(format!("malformed series json: {err}")))?;
        Self::from_raw(&raw)
    }

    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::{RawSample, Series, format_year_month, parse_timestamp_millis};

    #[test]
    fn parses_supported_date_shapes() {
        let month = parse_timestamp_millis("1900-06").expect("month");
        let day = parse_timestamp_millis("1900-06-01").expect("day");
        let datetime = parse_timestamp_millis("1900-06-01T00:00:00Z").expect("rfc3339");
        let naive = parse_timestamp_millis("1900-06-01T00:00:00").expect("naive");
        assert_eq!(month, day);
        assert_eq!(day, datetime);
        assert_eq!(day, naive);
        assert_eq!(
            parse_timestamp_millis("1970").expect("year"),
            0,
            "year-only dates start on January 1st"
        );
        assert!(parse_timestamp_millis("June 1900").is_err());
    }

    #[test]
    fn rejects_descending_input() {
        let raw = vec![RawSample::new("1901-01", 1.0), RawSample::new("1900-01", 2.0)];
        let err = Series::from_raw(&raw).expect_err("unsorted input must fail");
        assert!(err.to_string().contains("sorted"));
    }

    #[test]
    fn rejects_non_finite_values() {
        let raw = vec![RawSample::new("1900-01", f64::NAN)];
        assert!(Series::from_raw(&raw).is_err());
    }

    #[test]
    fn parses_json_array() {
        let series = Series::from_json(r#"[{"t":"1900-01","v":5},{"t":"1900-06","v":10}]"#)
            .expect("valid json");
        assert_eq!(series.len(), 2);
        assert_eq!(format_year_month(series.samples()[1].timestamp), "1900-06");
    }
}

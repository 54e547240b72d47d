use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::{AggregatedPoint, DateRange};
use crate::error::{ChartError, ChartResult};

/// What the requester will do with the aggregated points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Purpose {
    /// Main chart at full resolution.
    Chart,
    /// Overview preview drawn behind the range slider.
    Slider,
}

impl Purpose {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chart => "CHART",
            Self::Slider => "SLIDER",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = ChartError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "CHART" => Ok(Self::Chart),
            "SLIDER" => Ok(Self::Slider),
            other => Err(ChartError::UnknownPurpose(other.to_owned())),
        }
    }
}

/// One aggregation request sent to the cache worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRequest {
    pub seq: u64,
    pub data_key: String,
    pub date_range: DateRange,
    pub groups_count: usize,
    pub purpose: Purpose,
}

/// Wire shape with the purpose tag still unparsed so unknown tags map to
/// [`ChartError::UnknownPurpose`] instead of a generic decode error.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    #[serde(default)]
    seq: u64,
    data_key: String,
    date_range: DateRange,
    groups_count: usize,
    purpose: String,
}

impl CacheRequest {
    #[must_use]
    pub fn new(
        data_key: impl Into<String>,
        date_range: DateRange,
        groups_count: usize,
        purpose: Purpose,
    ) -> Self {
        Self {
            seq: 0,
            data_key: data_key.into(),
            date_range,
            groups_count,
            purpose,
        }
    }

    pub fn from_json(json: &str) -> ChartResult<Self> {
        let wire: WireRequest = serde_json::from_str(json)
            .map_err(|err| ChartError::InvalidData(format!("malformed cache request: {err}")))?;
        Ok(Self {
            seq: wire.seq,
            data_key: wire.data_key,
            date_range: DateRange::new(wire.date_range.start, wire.date_range.end)?,
            groups_count: wire.groups_count,
            purpose: wire.purpose.parse()?,
        })
    }

    pub fn to_json(&self) -> ChartResult<String> {
        serde_json::to_string(self)
            .map_err(|err| ChartError::InvalidData(format!("encode cache request: {err}")))
    }
}

/// Worker reply to one [`CacheRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResponse {
    Data {
        seq: u64,
        purpose: Purpose,
        data: Vec<AggregatedPoint>,
    },
    Failed {
        seq: u64,
        purpose: Purpose,
        data_key: String,
        error: ChartError,
        /// `true` only for the first failure reported for `data_key`.
        first_occurrence: bool,
    },
}

impl CacheResponse {
    #[must_use]
    pub fn seq(&self) -> u64 {
        match self {
            Self::Data { seq, .. } | Self::Failed { seq, .. } => *seq,
        }
    }

    #[must_use]
    pub fn purpose(&self) -> Purpose {
        match self {
            Self::Data { purpose, .. } | Self::Failed { purpose, .. } => *purpose,
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn to_json(&self) -> ChartResult<String> {
        let value = match self {
            Self::Data { seq, purpose, data } => json!({
                "seq": seq,
                "purpose": purpose,
                "data": data,
            }),
            Self::Failed {
                seq,
                purpose,
                data_key,
                error,
                first_occurrence,
            } => json!({
                "seq": seq,
                "purpose": purpose,
                "dataKey": data_key,
                "error": error.to_string(),
                "firstOccurrence": first_occurrence,
            }),
        };
        serde_json::to_string(&value)
            .map_err(|err| ChartError::InvalidData(format!("encode cache response: {err}")))
    }
}

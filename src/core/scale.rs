use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Rescales `value` into `[0, 1]` relative to `[min, max]`.
///
/// A degenerate domain (`min == max`) normalizes to `0.5`.
#[must_use]
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span == 0.0 {
        return 0.5;
    }
    (value - min) / span
}

/// Inverse of [`normalize`] for a non-degenerate domain.
#[must_use]
pub fn denormalize(normalized: f64, min: f64, max: f64) -> f64 {
    normalized * (max - min) + min
}

/// Affine map from `[old_min, old_max]` onto `[new_min, new_max]`.
///
/// When the source domain collapses to a single value every input lands on
/// the midpoint of the target range instead of producing NaN.
#[must_use]
pub fn map_value(value: f64, old_min: f64, old_max: f64, new_min: f64, new_max: f64) -> f64 {
    denormalize(normalize(value, old_min, old_max), new_min, new_max)
}

/// Flips `value` about the midpoint of `[min, max]`.
///
/// Canvas y grows downward while data values grow upward.
#[must_use]
pub fn invert(value: f64, min: f64, max: f64) -> f64 {
    max - value + min
}

/// Linear mapping between a data domain and a pixel range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(
        domain_start: f64,
        domain_end: f64,
        range_start: f64,
        range_end: f64,
    ) -> ChartResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() {
            return Err(ChartError::InvalidData(
                "scale domain must be finite".to_owned(),
            ));
        }
        if !range_start.is_finite() || !range_end.is_finite() {
            return Err(ChartError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
            range_start,
            range_end,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    #[must_use]
    pub fn is_degenerate(self) -> bool {
        self.domain_start == self.domain_end
    }

    /// Domain value to range value.
    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        map_value(
            value,
            self.domain_start,
            self.domain_end,
            self.range_start,
            self.range_end,
        )
    }

    /// Range value back to domain value.
    #[must_use]
    pub fn unmap(self, pixel: f64) -> f64 {
        map_value(
            pixel,
            self.range_start,
            self.range_end,
            self.domain_start,
            self.domain_end,
        )
    }

    /// Domain value to range value, flipped about the range midpoint.
    #[must_use]
    pub fn map_inverted(self, value: f64) -> f64 {
        invert(self.map(value), self.range_start, self.range_end)
    }

    /// Inverse of [`LinearScale::map_inverted`].
    #[must_use]
    pub fn unmap_inverted(self, pixel: f64) -> f64 {
        self.unmap(invert(pixel, self.range_start, self.range_end))
    }
}

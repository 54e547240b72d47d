use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::{AggregatedPoint, CanvasPoint, LinearScale, Viewport};
use crate::error::{ChartError, ChartResult};

use super::ChartConfig;

/// Measured plot area inside the canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartGeometry {
    pub viewport: Viewport,
    pub plot_left: f64,
    pub plot_right: f64,
    pub plot_top: f64,
    pub plot_bottom: f64,
}

impl ChartGeometry {
    pub fn measure(config: &ChartConfig) -> ChartResult<Self> {
        let viewport = config.viewport;
        let gutter = config.gridlines.map_or(0.0, |gridlines| gridlines.gutter_px);
        let plot_left = config.padding_x + gutter;
        let plot_right = f64::from(viewport.width) - config.padding_x;
        let plot_top = config.margin_top;
        let plot_bottom = f64::from(viewport.height) - config.margin_bottom;

        if plot_right <= plot_left || plot_bottom <= plot_top {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        Ok(Self {
            viewport,
            plot_left,
            plot_right,
            plot_top,
            plot_bottom,
        })
    }

    #[must_use]
    pub fn plot_width(self) -> f64 {
        self.plot_right - self.plot_left
    }

    #[must_use]
    pub fn plot_height(self) -> f64 {
        self.plot_bottom - self.plot_top
    }
}

/// Data-domain bounding box of the points being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl ValueBounds {
    /// `x` bounds come from the first/last point (input is sorted by `x`);
    /// `y` bounds need a full scan.
    #[must_use]
    pub fn from_points(points: &[AggregatedPoint]) -> Option<Self> {
        let first = points.first()?;
        let last = points.last()?;
        let y_min = points.iter().map(|point| OrderedFloat(point.y)).min()?;
        let y_max = points.iter().map(|point| OrderedFloat(point.y)).max()?;
        Some(Self {
            x_min: first.x,
            x_max: last.x,
            y_min: y_min.0,
            y_max: y_max.0,
        })
    }
}

/// Scales from the data domain onto the plot area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotScales {
    pub x: LinearScale,
    pub y: LinearScale,
}

impl PlotScales {
    pub fn new(bounds: ValueBounds, geometry: ChartGeometry) -> ChartResult<Self> {
        Ok(Self {
            x: LinearScale::new(
                bounds.x_min,
                bounds.x_max,
                geometry.plot_left,
                geometry.plot_right,
            )?,
            y: LinearScale::new(
                bounds.y_min,
                bounds.y_max,
                geometry.plot_top,
                geometry.plot_bottom,
            )?,
        })
    }

    /// Maps one data point to integer canvas pixels with y inverted.
    #[must_use]
    pub fn to_canvas(self, point: AggregatedPoint) -> CanvasPoint {
        CanvasPoint::new(
            self.x.map(point.x).round() as i32,
            self.y.map_inverted(point.y).round() as i32,
        )
    }

    /// Data value shown at canvas row `pixel_y`.
    #[must_use]
    pub fn value_at(self, pixel_y: f64) -> f64 {
        self.y.unmap_inverted(pixel_y)
    }
}

/// Projects all points into canvas space.
#[must_use]
pub fn project_points(points: &[AggregatedPoint], scales: PlotScales) -> Vec<CanvasPoint> {
    #[cfg(feature = "parallel-projection")]
    {
        use rayon::prelude::*;
        points
            .par_iter()
            .map(|point| scales.to_canvas(*point))
            .collect()
    }

    #[cfg(not(feature = "parallel-projection"))]
    {
        points.iter().map(|point| scales.to_canvas(*point)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartGeometry, PlotScales, ValueBounds, project_points};
    use crate::api::{ChartConfig, GridlineConfig};
    use crate::core::{AggregatedPoint, CanvasPoint, Viewport};

    #[test]
    fn geometry_reserves_margins_and_gutter() {
        let config = ChartConfig::new(Viewport::new(600, 400))
            .with_margins(100.0, 20.0)
            .with_padding_x(10.0)
            .with_gridlines(GridlineConfig::new(3));
        let geometry = ChartGeometry::measure(&config).expect("geometry");
        assert_eq!(geometry.plot_left, 58.0);
        assert_eq!(geometry.plot_right, 590.0);
        assert_eq!(geometry.plot_top, 100.0);
        assert_eq!(geometry.plot_bottom, 380.0);
    }

    #[test]
    fn geometry_rejects_collapsed_plot() {
        let config = ChartConfig::new(Viewport::new(600, 100)).with_margins(80.0, 20.0);
        assert!(ChartGeometry::measure(&config).is_err());
    }

    #[test]
    fn bounds_use_first_last_x_and_scanned_y() {
        let points = [
            AggregatedPoint::new(0.0, 3.0),
            AggregatedPoint::new(5.0, -1.0),
            AggregatedPoint::new(9.0, 7.0),
        ];
        let bounds = ValueBounds::from_points(&points).expect("bounds");
        assert_eq!((bounds.x_min, bounds.x_max), (0.0, 9.0));
        assert_eq!((bounds.y_min, bounds.y_max), (-1.0, 7.0));
        assert!(ValueBounds::from_points(&[]).is_none());
    }

    #[test]
    fn projection_inverts_y_axis() {
        let config = ChartConfig::new(Viewport::new(120, 220))
            .with_margins(100.0, 20.0)
            .with_padding_x(10.0);
        let geometry = ChartGeometry::measure(&config).expect("geometry");
        let points = [AggregatedPoint::new(0.0, 0.0), AggregatedPoint::new(10.0, 10.0)];
        let bounds = ValueBounds::from_points(&points).expect("bounds");
        let scales = PlotScales::new(bounds, geometry).expect("scales");
        let canvas = project_points(&points, scales);
        assert_eq!(canvas, vec![CanvasPoint::new(10, 200), CanvasPoint::new(110, 100)]);
    }
}

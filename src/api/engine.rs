use std::sync::Arc;

use tracing::{debug, trace};

use crate::core::{AggregatedPoint, CanvasPoint, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{ChartPhase, HoverTarget, InteractionState};
use crate::render::{RenderFrame, Renderer};

use super::chart_geometry::{PlotScales, project_points};
use super::{ChartConfig, ChartGeometry, ValueBounds};

/// Formats data values for tooltips and gridline labels.
pub type ValueFormatter = Arc<dyn Fn(f64) -> String + Send + Sync>;

#[must_use]
pub fn default_value_formatter() -> ValueFormatter {
    Arc::new(|value| format!("{value:.1}"))
}

/// Chart surface facade consumed by host applications.
///
/// `ChartEngine` owns canvas geometry, the projected canvas points of the
/// last draw, hover state, and the renderer sink. Every visible change is a
/// full clear + redraw because the surface is append-only.
pub struct ChartEngine<R: Renderer> {
    pub(super) renderer: R,
    pub(super) config: ChartConfig,
    pub(super) geometry: ChartGeometry,
    pub(super) points: Vec<AggregatedPoint>,
    pub(super) canvas_points: Vec<CanvasPoint>,
    pub(super) scales: Option<PlotScales>,
    pub(super) base_frame: Option<RenderFrame>,
    pub(super) interaction: InteractionState,
    pub(super) formatter: ValueFormatter,
}

impl<R: Renderer> ChartEngine<R> {
    pub fn new(renderer: R, config: ChartConfig) -> ChartResult<Self> {
        let config = config.validate()?;
        let geometry = ChartGeometry::measure(&config)?;
        Ok(Self {
            renderer,
            config,
            geometry,
            points: Vec::new(),
            canvas_points: Vec::new(),
            scales: None,
            base_frame: None,
            interaction: InteractionState::default(),
            formatter: default_value_formatter(),
        })
    }

    pub fn set_value_formatter(&mut self, formatter: impl Fn(f64) -> String + Send + Sync + 'static) {
        self.formatter = Arc::new(formatter);
    }

    /// Projects `points` into canvas space and draws them on a cleared surface.
    ///
    /// `points` must be sorted ascending by `x`. An empty slice clears the
    /// surface and leaves nothing to hover.
    pub fn draw(&mut self, points: &[AggregatedPoint]) -> ChartResult<()> {
        validate_points(points)?;
        self.points = points.to_vec();
        self.project()?;
        debug!(
            points = self.points.len(),
            viewport_width = self.geometry.viewport.width,
            viewport_height = self.geometry.viewport.height,
            "draw chart"
        );
        self.redraw_base()?;
        self.interaction.on_rendered();
        Ok(())
    }

    /// Erases the surface.
    pub fn clear(&mut self) -> ChartResult<()> {
        self.renderer.clear(self.geometry.viewport)
    }

    /// Re-measures canvas geometry for a new surface size and redraws the
    /// current points when the chart was already drawn.
    pub fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        let config = self.config.with_viewport(viewport).validate()?;
        let geometry = ChartGeometry::measure(&config)?;
        self.config = config;
        self.geometry = geometry;
        trace!(width = viewport.width, height = viewport.height, "resize chart");

        if self.interaction.phase() == ChartPhase::Idle {
            return Ok(());
        }
        self.project()?;
        self.redraw_base()?;
        self.interaction.on_rendered();
        Ok(())
    }

    #[must_use]
    pub fn phase(&self) -> ChartPhase {
        self.interaction.phase()
    }

    #[must_use]
    pub fn hover_target(&self) -> Option<HoverTarget> {
        self.interaction.hover()
    }

    #[must_use]
    pub fn points(&self) -> &[AggregatedPoint] {
        &self.points
    }

    #[must_use]
    pub fn canvas_points(&self) -> &[CanvasPoint] {
        &self.canvas_points
    }

    #[must_use]
    pub fn value_bounds(&self) -> Option<ValueBounds> {
        ValueBounds::from_points(&self.points)
    }

    #[must_use]
    pub fn geometry(&self) -> ChartGeometry {
        self.geometry
    }

    #[must_use]
    pub fn config(&self) -> ChartConfig {
        self.config
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    fn project(&mut self) -> ChartResult<()> {
        self.scales = match ValueBounds::from_points(&self.points) {
            Some(bounds) => Some(PlotScales::new(bounds, self.geometry)?),
            None => None,
        };
        self.canvas_points = match self.scales {
            Some(scales) => project_points(&self.points, scales),
            None => Vec::new(),
        };
        self.base_frame = Some(self.build_base_frame()?);
        Ok(())
    }

    /// Clears and draws the cached base frame (series without highlight).
    pub(super) fn redraw_base(&mut self) -> ChartResult<()> {
        self.renderer.clear(self.geometry.viewport)?;
        if let Some(frame) = self.base_frame.as_ref() {
            self.renderer.render(frame)?;
        }
        Ok(())
    }
}

#[cfg(feature = "cairo-backend")]
impl<R: Renderer + crate::render::CairoContextRenderer> ChartEngine<R> {
    /// Repaints the current frame onto a host-provided cairo context, for
    /// toolkit draw callbacks.
    pub fn render_on_cairo_context(&mut self, context: &cairo::Context) -> ChartResult<()> {
        let frame = self.current_frame();
        self.renderer.render_on_cairo_context(context, &frame)
    }
}

fn validate_points(points: &[AggregatedPoint]) -> ChartResult<()> {
    if points
        .iter()
        .any(|point| !point.x.is_finite() || !point.y.is_finite())
    {
        return Err(ChartError::InvalidData(
            "chart points must be finite".to_owned(),
        ));
    }
    if points.windows(2).any(|pair| pair[1].x < pair[0].x) {
        return Err(ChartError::InvalidData(
            "chart points must be sorted ascending by x".to_owned(),
        ));
    }
    Ok(())
}

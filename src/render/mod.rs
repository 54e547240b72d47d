mod frame;
mod null_renderer;
mod primitives;

pub use frame::RenderFrame;
pub use null_renderer::NullRenderer;
pub use primitives::{
    CirclePrimitive, Color, LinePrimitive, LineStrokeStyle, PathVertex, PolygonPrimitive,
    PolylinePrimitive, RectPrimitive, TextHAlign, TextPrimitive,
};

use crate::core::Viewport;
use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Backends behave like a persistent immediate-mode surface: `render` draws
/// on top of whatever is already there, so callers clear before every
/// redraw. Frames are fully materialized so drawing code stays isolated
/// from chart domain and interaction logic.
pub trait Renderer {
    fn clear(&mut self, viewport: Viewport) -> ChartResult<()>;

    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoContextRenderer, CairoRenderStats, CairoRenderer};

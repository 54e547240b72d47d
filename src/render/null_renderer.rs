use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{RenderFrame, Renderer};

/// No-op renderer used by tests and headless chart usage.
///
/// It still validates frame content so tests can catch invalid geometry
/// before a real backend is introduced, and it counts frames drawn onto a
/// surface that was not cleared first (stale strokes on a real canvas).
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub clear_count: usize,
    pub render_count: usize,
    pub renders_without_clear: usize,
    pub last_line_count: usize,
    pub last_text_count: usize,
    pub last_frame: Option<RenderFrame>,
    cleared_since_render: bool,
}

impl Renderer for NullRenderer {
    fn clear(&mut self, viewport: Viewport) -> ChartResult<()> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.clear_count += 1;
        self.cleared_since_render = true;
        Ok(())
    }

    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        if !self.cleared_since_render {
            self.renders_without_clear += 1;
        }
        self.cleared_since_render = false;
        self.render_count += 1;
        self.last_line_count = frame.lines.len();
        self.last_text_count = frame.texts.len();
        self.last_frame = Some(frame.clone());
        Ok(())
    }
}

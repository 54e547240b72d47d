use tracing::trace;

use crate::core::{format_year_month, nearest_point_index};
use crate::error::ChartResult;
use crate::interaction::{ChartPhase, HoverTarget};
use crate::render::{
    CirclePrimitive, LinePrimitive, RectPrimitive, RenderFrame, Renderer, TextHAlign,
    TextPrimitive,
};

use super::ChartEngine;

/// Left edge of a tooltip centred on `center_x`, clamped so the box stays
/// inside `[0, surface_width]`. A box wider than the surface pins to `0`.
#[must_use]
pub fn tooltip_left(center_x: f64, box_width: f64, surface_width: f64) -> f64 {
    let max_left = (surface_width - box_width).max(0.0);
    (center_x - box_width / 2.0).clamp(0.0, max_left)
}

impl<R: Renderer> ChartEngine<R> {
    /// Highlights the point nearest to canvas column `pixel_x`.
    ///
    /// Redraws the base chart, then the guide line, tooltip, and marker on
    /// top. Returns `None` (and draws nothing) before the first draw or when
    /// there are no points.
    pub fn on_hover(&mut self, pixel_x: f64) -> ChartResult<Option<HoverTarget>> {
        if self.interaction.phase() == ChartPhase::Idle {
            return Ok(None);
        }
        let Some(index) = nearest_point_index(&self.canvas_points, pixel_x) else {
            self.interaction.on_pointer_move(pixel_x, None);
            return Ok(None);
        };

        let point = self.points[index];
        let target = HoverTarget {
            index,
            canvas_point: self.canvas_points[index],
            time: point.x,
            value: point.y,
        };
        trace!(pixel_x, index, "hover resolve");

        let mut frame = self
            .base_frame
            .clone()
            .unwrap_or_else(|| RenderFrame::new(self.geometry.viewport));
        self.append_highlight_primitives(&mut frame, target);
        frame.validate()?;

        self.renderer.clear(self.geometry.viewport)?;
        self.renderer.render(&frame)?;
        self.interaction.on_pointer_move(pixel_x, Some(target));
        Ok(Some(target))
    }

    /// Removes the highlight by redrawing the base chart only.
    pub fn on_hover_end(&mut self) -> ChartResult<()> {
        if self.interaction.phase() == ChartPhase::Idle {
            return Ok(());
        }
        self.redraw_base()?;
        self.interaction.on_pointer_leave();
        Ok(())
    }

    /// The frame currently on screen: the base chart plus the highlight
    /// overlay when a point is hovered.
    #[must_use]
    pub fn current_frame(&self) -> RenderFrame {
        let mut frame = self
            .base_frame
            .clone()
            .unwrap_or_else(|| RenderFrame::new(self.geometry.viewport));
        if let Some(target) = self.interaction.hover() {
            self.append_highlight_primitives(&mut frame, target);
        }
        frame
    }

    fn append_highlight_primitives(&self, frame: &mut RenderFrame, target: HoverTarget) {
        let style = self.config.style;
        let tooltip = self.config.tooltip;
        let surface_width = f64::from(self.geometry.viewport.width);
        let surface_height = f64::from(self.geometry.viewport.height);
        let x = f64::from(target.canvas_point.x);
        let y = f64::from(target.canvas_point.y);

        frame.lines.push(LinePrimitive::new(
            x,
            0.0,
            x,
            surface_height,
            style.guide_line_width,
            style.guide_line_color,
        ));

        let left = tooltip_left(x, tooltip.width, surface_width);
        frame.rects.push(
            RectPrimitive::new(
                left,
                tooltip.top,
                tooltip.width,
                tooltip.height,
                style.tooltip_fill_color,
            )
            .with_border(1.0, style.tooltip_border_color)
            .with_corner_radius(tooltip.corner_radius),
        );

        let text_x = left + tooltip.text_padding;
        let line_height = tooltip.height / 2.0;
        let value_text = (self.formatter)(target.value);
        if !value_text.is_empty() {
            frame.texts.push(TextPrimitive::new(
                value_text,
                text_x,
                tooltip.top + line_height - style.tooltip_font_px,
                style.tooltip_font_px,
                style.tooltip_text_color,
                TextHAlign::Left,
            ));
        }
        frame.texts.push(TextPrimitive::new(
            format_year_month(target.time as i64),
            text_x,
            tooltip.top + line_height,
            style.tooltip_font_px,
            style.tooltip_text_color,
            TextHAlign::Left,
        ));

        frame.circles.push(CirclePrimitive {
            center_x: x,
            center_y: y,
            radius: style.marker_radius,
            fill_color: style.marker_fill_color,
            border_color: style.marker_border_color,
            border_width: 1.0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::tooltip_left;

    #[test]
    fn tooltip_is_centred_when_it_fits() {
        assert_eq!(tooltip_left(300.0, 120.0, 600.0), 240.0);
    }

    #[test]
    fn tooltip_is_clamped_at_both_edges() {
        assert_eq!(tooltip_left(10.0, 120.0, 600.0), 0.0);
        assert_eq!(tooltip_left(590.0, 120.0, 600.0), 480.0);
        assert_eq!(tooltip_left(50.0, 800.0, 600.0), 0.0);
    }
}

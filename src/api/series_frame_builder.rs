use crate::error::ChartResult;
use crate::render::{
    CirclePrimitive, LinePrimitive, LineStrokeStyle, PathVertex, PolygonPrimitive,
    PolylinePrimitive, RenderFrame, Renderer, TextHAlign, TextPrimitive,
};

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    /// Builds the highlight-free frame: gridlines, optional area fill, and the
    /// series polyline.
    pub(super) fn build_base_frame(&self) -> ChartResult<RenderFrame> {
        let mut frame = RenderFrame::new(self.geometry.viewport);
        self.append_gridline_primitives(&mut frame);
        self.append_series_primitives(&mut frame);
        frame.validate()?;
        Ok(frame)
    }

    fn append_gridline_primitives(&self, frame: &mut RenderFrame) {
        let (Some(gridlines), Some(scales)) = (self.config.gridlines, self.scales) else {
            return;
        };

        let geometry = self.geometry;
        let step = geometry.plot_height() / (gridlines.count - 1) as f64;
        for idx in 0..gridlines.count {
            let y = geometry.plot_top + step * idx as f64;
            frame.lines.push(
                LinePrimitive::new(
                    geometry.plot_left,
                    y,
                    geometry.plot_right,
                    y,
                    1.0,
                    gridlines.color,
                )
                .with_stroke_style(LineStrokeStyle::Dashed),
            );

            let label = (self.formatter)(scales.value_at(y));
            if label.is_empty() {
                continue;
            }
            frame.texts.push(TextPrimitive::new(
                label,
                geometry.plot_left - 6.0,
                y - gridlines.label_font_px * 0.5,
                gridlines.label_font_px,
                self.config.style.tooltip_text_color,
                TextHAlign::Right,
            ));
        }
    }

    fn append_series_primitives(&self, frame: &mut RenderFrame) {
        let style = self.config.style;
        let vertices: Vec<PathVertex> = self
            .canvas_points
            .iter()
            .map(|point| PathVertex::new(f64::from(point.x), f64::from(point.y)))
            .collect();

        match vertices.len() {
            0 => {}
            1 => frame.circles.push(CirclePrimitive {
                center_x: vertices[0].x,
                center_y: vertices[0].y,
                radius: style.line_width,
                fill_color: style.line_color,
                border_color: style.line_color,
                border_width: 0.0,
            }),
            len => {
                if self.config.area_fill {
                    let baseline = self.geometry.plot_bottom;
                    let mut polygon = Vec::with_capacity(len + 2);
                    polygon.push(PathVertex::new(vertices[0].x, baseline));
                    polygon.extend(vertices.iter().copied());
                    polygon.push(PathVertex::new(vertices[len - 1].x, baseline));
                    frame
                        .polygons
                        .push(PolygonPrimitive::new(polygon, style.area_fill_color));
                }
                frame.polylines.push(PolylinePrimitive::new(
                    vertices,
                    style.line_width,
                    style.line_color,
                ));
            }
        }
    }
}

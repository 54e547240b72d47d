use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// Colors and stroke widths of the chart and its hover overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartStyle {
    pub line_color: Color,
    pub line_width: f64,
    pub area_fill_color: Color,
    pub guide_line_color: Color,
    pub guide_line_width: f64,
    pub tooltip_fill_color: Color,
    pub tooltip_border_color: Color,
    pub tooltip_text_color: Color,
    pub tooltip_font_px: f64,
    pub marker_fill_color: Color,
    pub marker_border_color: Color,
    pub marker_radius: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            line_color: Color::rgb(0.0, 0.0, 0.0),
            line_width: 1.5,
            area_fill_color: Color::rgba(0.25, 0.55, 0.85, 0.25),
            guide_line_color: Color::rgb(0.5, 0.5, 0.5),
            guide_line_width: 1.0,
            tooltip_fill_color: Color::rgb(1.0, 1.0, 1.0),
            tooltip_border_color: Color::rgb(0.5, 0.5, 0.5),
            tooltip_text_color: Color::rgb(0.0, 0.0, 0.0),
            tooltip_font_px: 12.0,
            marker_fill_color: Color::rgb(1.0, 1.0, 1.0),
            marker_border_color: Color::rgb(0.0, 0.0, 0.0),
            marker_radius: 5.0,
        }
    }
}

/// Size and placement of the hover tooltip inside the top margin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TooltipBoxConfig {
    pub width: f64,
    pub height: f64,
    pub top: f64,
    pub corner_radius: f64,
    pub text_padding: f64,
}

impl Default for TooltipBoxConfig {
    fn default() -> Self {
        Self {
            width: 120.0,
            height: 60.0,
            top: 30.0,
            corner_radius: 5.0,
            text_padding: 10.0,
        }
    }
}

/// Horizontal reference lines labelled with their data value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridlineConfig {
    pub count: usize,
    #[serde(default = "default_gutter_px")]
    pub gutter_px: f64,
    #[serde(default = "default_label_font_px")]
    pub label_font_px: f64,
    #[serde(default = "default_gridline_color")]
    pub color: Color,
}

fn default_gutter_px() -> f64 {
    48.0
}

fn default_label_font_px() -> f64 {
    11.0
}

fn default_gridline_color() -> Color {
    Color::rgb(0.85, 0.85, 0.85)
}

impl GridlineConfig {
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            count,
            gutter_px: default_gutter_px(),
            label_font_px: default_label_font_px(),
            color: default_gridline_color(),
        }
    }
}

/// Chart surface configuration.
///
/// Serializable so hosts can persist or ship chart setup as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub viewport: Viewport,
    /// Space above the plot reserved for the tooltip.
    #[serde(default = "default_margin_top")]
    pub margin_top: f64,
    /// Space below the plot reserved for axis labels.
    #[serde(default = "default_margin_bottom")]
    pub margin_bottom: f64,
    /// Left/right padding so the hover marker is never clipped.
    #[serde(default = "default_padding_x")]
    pub padding_x: f64,
    #[serde(default)]
    pub area_fill: bool,
    #[serde(default)]
    pub style: ChartStyle,
    #[serde(default)]
    pub tooltip: TooltipBoxConfig,
    #[serde(default)]
    pub gridlines: Option<GridlineConfig>,
}

fn default_margin_top() -> f64 {
    100.0
}

fn default_margin_bottom() -> f64 {
    20.0
}

fn default_padding_x() -> f64 {
    8.0
}

impl ChartConfig {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            margin_top: default_margin_top(),
            margin_bottom: default_margin_bottom(),
            padding_x: default_padding_x(),
            area_fill: false,
            style: ChartStyle::default(),
            tooltip: TooltipBoxConfig::default(),
            gridlines: None,
        }
    }

    #[must_use]
    pub fn with_margins(mut self, margin_top: f64, margin_bottom: f64) -> Self {
        self.margin_top = margin_top;
        self.margin_bottom = margin_bottom;
        self
    }

    #[must_use]
    pub fn with_padding_x(mut self, padding_x: f64) -> Self {
        self.padding_x = padding_x;
        self
    }

    #[must_use]
    pub fn with_area_fill(mut self, area_fill: bool) -> Self {
        self.area_fill = area_fill;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: ChartStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_tooltip(mut self, tooltip: TooltipBoxConfig) -> Self {
        self.tooltip = tooltip;
        self
    }

    #[must_use]
    pub fn with_gridlines(mut self, gridlines: GridlineConfig) -> Self {
        self.gridlines = Some(gridlines);
        self
    }

    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn from_json_str(json: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| ChartError::InvalidData(format!("malformed chart config: {err}")))?;
        config.validate()
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        for (name, value) in [
            ("margin_top", self.margin_top),
            ("margin_bottom", self.margin_bottom),
            ("padding_x", self.padding_x),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "`{name}` must be finite and >= 0"
                )));
            }
        }

        let tooltip = self.tooltip;
        if !(tooltip.width.is_finite() && tooltip.width > 0.0)
            || !(tooltip.height.is_finite() && tooltip.height > 0.0)
            || !tooltip.top.is_finite()
            || !(tooltip.corner_radius.is_finite() && tooltip.corner_radius >= 0.0)
            || !(tooltip.text_padding.is_finite() && tooltip.text_padding >= 0.0)
        {
            return Err(ChartError::InvalidData(
                "tooltip box must have finite size > 0 and non-negative padding".to_owned(),
            ));
        }

        let style = self.style;
        for color in [
            style.line_color,
            style.area_fill_color,
            style.guide_line_color,
            style.tooltip_fill_color,
            style.tooltip_border_color,
            style.tooltip_text_color,
            style.marker_fill_color,
            style.marker_border_color,
        ] {
            color.validate()?;
        }
        for (name, value) in [
            ("line_width", style.line_width),
            ("guide_line_width", style.guide_line_width),
            ("tooltip_font_px", style.tooltip_font_px),
            ("marker_radius", style.marker_radius),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "style `{name}` must be finite and > 0"
                )));
            }
        }

        if let Some(gridlines) = self.gridlines {
            if gridlines.count < 2 {
                return Err(ChartError::InvalidData(
                    "gridline count must be >= 2".to_owned(),
                ));
            }
            if !gridlines.gutter_px.is_finite() || gridlines.gutter_px < 0.0 {
                return Err(ChartError::InvalidData(
                    "gridline gutter must be finite and >= 0".to_owned(),
                ));
            }
            if !gridlines.label_font_px.is_finite() || gridlines.label_font_px <= 0.0 {
                return Err(ChartError::InvalidData(
                    "gridline label font size must be finite and > 0".to_owned(),
                ));
            }
            gridlines.color.validate()?;
        }

        Ok(self)
    }
}

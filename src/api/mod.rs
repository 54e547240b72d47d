mod chart_config;
mod chart_geometry;
mod engine;
mod hover_controller;
mod series_frame_builder;

pub use chart_config::{ChartConfig, ChartStyle, GridlineConfig, TooltipBoxConfig};
pub use chart_geometry::{ChartGeometry, PlotScales, ValueBounds, project_points};
pub use engine::{ChartEngine, ValueFormatter, default_value_formatter};
pub use hover_controller::tooltip_left;

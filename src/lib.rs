//! climate-chart: windowed aggregation, geometry, and caching core for
//! interactive climate time-series charts.
//!
//! The crate keeps a strict split: `core` is pure math over sorted series,
//! `render` turns primitives into pixels through a backend trait,
//! `interaction` holds slider, hover, and throttle state, `api` is the chart
//! facade, and `cache` serves aggregated windows from a bucketed store on a
//! background task.

pub mod api;
pub mod cache;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{ChartConfig, ChartEngine};
pub use error::{ChartError, ChartResult};

pub mod aggregate;
pub mod interval_index;
pub mod nearest;
pub mod scale;
pub mod series;
pub mod types;

pub use aggregate::{aggregate, average, partition_buckets, slice_by_years};
pub use interval_index::{boundary_or_len, find_boundary};
pub use nearest::{nearest_point, nearest_point_index};
pub use scale::{LinearScale, denormalize, invert, map_value, normalize};
pub use series::{RawSample, Series, format_year_month, parse_timestamp_millis};
pub use types::{AggregatedPoint, CanvasPoint, DateBounds, DateRange, Sample, Viewport};

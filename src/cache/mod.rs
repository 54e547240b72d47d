//! Read-through cache of raw series, bucketed by coarse time key, and the
//! background worker that answers aggregation requests from it.

mod bucket_key;
mod database;
mod messages;
mod source;
mod store;
mod worker;

pub use bucket_key::{BucketGranularity, bucket_key, range_keys};
pub use database::{BucketDatabase, KeyMetadata, SCHEMA_VERSION};
pub use messages::{CacheRequest, CacheResponse, Purpose};
#[cfg(feature = "http-source")]
pub use source::HttpSeriesSource;
pub use source::{FileSeriesSource, SeriesSource};
pub use store::{CacheConfig, CacheStore};
pub use worker::{CacheClient, CacheWorker, DEFAULT_CHANNEL_CAPACITY, handle_request};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::{debug, warn};

use crate::core::{DateBounds, DateRange, Sample, Series};
use crate::error::{ChartError, ChartResult};

use super::bucket_key::BucketGranularity;
use super::database::BucketDatabase;
use super::source::SeriesSource;

/// Cache store setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Location of the persisted image. `None` keeps everything in memory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub granularity: BucketGranularity,
    pub data_keys: Vec<String>,
    #[serde(default)]
    pub bounds: DateBounds,
}

impl CacheConfig {
    #[must_use]
    pub fn new<I, K>(data_keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            database_path: None,
            granularity: BucketGranularity::default(),
            data_keys: data_keys.into_iter().map(Into::into).collect(),
            bounds: DateBounds::default(),
        }
    }

    #[must_use]
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_granularity(mut self, granularity: BucketGranularity) -> Self {
        self.granularity = granularity;
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: DateBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn from_json_str(json: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| ChartError::InvalidData(format!("malformed cache config: {err}")))?;
        config.validate()
    }

    pub fn validate(self) -> ChartResult<Self> {
        if self.data_keys.is_empty() {
            return Err(ChartError::InvalidData(
                "cache config needs at least one data key".to_owned(),
            ));
        }
        for (idx, key) in self.data_keys.iter().enumerate() {
            if key.trim().is_empty() {
                return Err(ChartError::InvalidData(format!("data key {idx} is empty")));
            }
            if self.data_keys[..idx].contains(key) {
                return Err(ChartError::InvalidData(format!("duplicate data key `{key}`")));
            }
        }
        DateBounds::new(self.bounds.min, self.bounds.max)?;
        Ok(self)
    }

    #[must_use]
    pub fn knows(&self, data_key: &str) -> bool {
        self.data_keys.iter().any(|key| key == data_key)
    }
}

type PopulationCell = Arc<OnceCell<ChartResult<()>>>;

/// Read-through store in front of a [`SeriesSource`].
///
/// The first request for a data key fetches the full dataset once, splits it
/// into coarse time buckets, and persists them; every later request is a
/// bucket range query. Concurrent first requests share one population.
pub struct CacheStore<S: SeriesSource> {
    config: CacheConfig,
    source: S,
    database: OnceCell<ChartResult<RwLock<BucketDatabase>>>,
    populations: Mutex<HashMap<String, PopulationCell>>,
}

impl<S: SeriesSource> CacheStore<S> {
    pub fn new(config: CacheConfig, source: S) -> ChartResult<Self> {
        Ok(Self {
            config: config.validate()?,
            source,
            database: OnceCell::new(),
            populations: Mutex::new(HashMap::new()),
        })
    }

    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Samples of `data_key` whose bucket falls inside `range`, ascending.
    ///
    /// Only the part of `range` inside the configured bounds is queried; a
    /// range with no overlap yields no samples.
    pub async fn retrieve(&self, data_key: &str, range: DateRange) -> ChartResult<Vec<Sample>> {
        if !self.config.knows(data_key) {
            return Err(ChartError::UnknownDataKey(data_key.to_owned()));
        }
        let database = self.database().await?;
        self.ensure_populated(data_key, database).await?;

        let Some(range) = range.intersect(self.config.bounds) else {
            debug!(
                data_key,
                start = range.start,
                end = range.end,
                "cache query outside bounds"
            );
            return Ok(Vec::new());
        };
        let samples = database.read().await.query(data_key, range)?;
        debug!(
            data_key,
            start = range.start,
            end = range.end,
            samples = samples.len(),
            "cache query"
        );
        Ok(samples)
    }

    /// Like [`Self::retrieve`] but returns a validated [`Series`].
    pub async fn retrieve_series(&self, data_key: &str, range: DateRange) -> ChartResult<Series> {
        Series::from_samples(self.retrieve(data_key, range).await?)
    }

    /// Whether `data_key` is populated, opening the database if needed.
    pub async fn is_populated(&self, data_key: &str) -> ChartResult<bool> {
        self.database().await?.read().await.is_populated(data_key)
    }

    async fn database(&self) -> ChartResult<&RwLock<BucketDatabase>> {
        self.database
            .get_or_init(|| async {
                let database = match self.config.database_path.as_deref() {
                    Some(path) => {
                        BucketDatabase::open(path, self.config.granularity, &self.config.data_keys)
                            .await
                    }
                    None => Ok(BucketDatabase::in_memory(
                        self.config.granularity,
                        &self.config.data_keys,
                    )),
                };
                if let Err(err) = &database {
                    warn!(error = %err, "bucket database unavailable");
                }
                database.map(RwLock::new)
            })
            .await
            .as_ref()
            .map_err(Clone::clone)
    }

    async fn ensure_populated(
        &self,
        data_key: &str,
        database: &RwLock<BucketDatabase>,
    ) -> ChartResult<()> {
        let cell = {
            let mut populations = self.populations.lock().await;
            Arc::clone(populations.entry(data_key.to_owned()).or_default())
        };
        cell.get_or_init(|| self.populate(data_key, database))
            .await
            .clone()
    }

    async fn populate(&self, data_key: &str, database: &RwLock<BucketDatabase>) -> ChartResult<()> {
        if database.read().await.is_populated(data_key)? {
            return Ok(());
        }

        debug!(data_key, "population fetch start");
        let raw = self.source.fetch(data_key).await.inspect_err(|err| {
            warn!(data_key, error = %err, "population fetch failed");
        })?;
        let series = Series::from_raw(&raw).map_err(|err| ChartError::FetchFailed {
            key: data_key.to_owned(),
            reason: err.to_string(),
        })?;

        let mut database = database.write().await;
        let buckets = database.put_series(data_key, series.samples())?;
        database.flush().await?;
        debug!(
            data_key,
            samples = series.len(),
            buckets,
            "population fetch finished"
        );
        Ok(())
    }
}

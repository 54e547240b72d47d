use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::{DateRange, RawSample, Sample};
use crate::error::{ChartError, ChartResult};

use super::bucket_key::{BucketGranularity, bucket_key, range_keys};

/// Current on-disk image version. Bump whenever the bucket or record shape
/// changes and teach [`decode_image`] to migrate the previous one.
pub const SCHEMA_VERSION: u32 = 2;

/// Per data key bookkeeping kept in the metadata container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetadata {
    pub populated: bool,
    #[serde(default)]
    pub sample_count: usize,
    #[serde(default)]
    pub bucket_count: usize,
}

type Buckets = BTreeMap<String, Vec<Sample>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct DatabaseImage {
    version: u32,
    #[serde(default)]
    granularity: BucketGranularity,
    #[serde(default)]
    metadata: IndexMap<String, KeyMetadata>,
    #[serde(default)]
    containers: IndexMap<String, Buckets>,
}

/// Version 1 layout: month-keyed buckets of wire-shaped `{t, v}` records.
#[derive(Debug, Deserialize)]
struct ImageV1 {
    #[serde(default)]
    metadata: IndexMap<String, KeyMetadata>,
    #[serde(default)]
    containers: IndexMap<String, BTreeMap<String, Vec<RawSample>>>,
}

#[derive(Debug, Deserialize)]
struct VersionProbe {
    version: u32,
}

/// Bucketed sample storage: one container per data key plus a metadata
/// container, persisted as a single JSON image when backed by a file.
#[derive(Debug, Clone)]
pub struct BucketDatabase {
    path: Option<PathBuf>,
    image: DatabaseImage,
}

impl BucketDatabase {
    /// Creates an empty database that lives only for the process lifetime.
    #[must_use]
    pub fn in_memory(granularity: BucketGranularity, data_keys: &[String]) -> Self {
        let mut database = Self {
            path: None,
            image: DatabaseImage {
                version: SCHEMA_VERSION,
                granularity,
                ..DatabaseImage::default()
            },
        };
        database.ensure_containers(data_keys);
        database
    }

    /// Opens the image at `path`, creating an empty one on first use.
    ///
    /// Older images are migrated in memory and rewritten before returning.
    pub async fn open(
        path: impl Into<PathBuf>,
        granularity: BucketGranularity,
        data_keys: &[String],
    ) -> ChartResult<Self> {
        let path = path.into();
        let existing = match tokio::fs::read_to_string(&path).await {
            Ok(json) => Some(json),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => return Err(store_error(&path, &err)),
        };

        let (image, rewritten) = match existing {
            Some(json) => decode_image(&json, granularity)?,
            None => (
                DatabaseImage {
                    version: SCHEMA_VERSION,
                    granularity,
                    ..DatabaseImage::default()
                },
                true,
            ),
        };

        let mut database = Self {
            path: Some(path),
            image,
        };
        let added = database.ensure_containers(data_keys);
        if rewritten || added {
            database.flush().await?;
        }
        debug!(
            path = ?database.path,
            version = database.image.version,
            containers = database.image.containers.len(),
            "open bucket database"
        );
        Ok(database)
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.image.version
    }

    #[must_use]
    pub fn granularity(&self) -> BucketGranularity {
        self.image.granularity
    }

    pub fn data_keys(&self) -> impl Iterator<Item = &str> {
        self.image.containers.keys().map(String::as_str)
    }

    pub fn metadata(&self, data_key: &str) -> ChartResult<KeyMetadata> {
        self.container(data_key)?;
        Ok(self
            .image
            .metadata
            .get(data_key)
            .copied()
            .unwrap_or_default())
    }

    pub fn is_populated(&self, data_key: &str) -> ChartResult<bool> {
        Ok(self.metadata(data_key)?.populated)
    }

    /// Replaces the container of `data_key` with `samples` split into
    /// buckets and marks the key populated. Returns the bucket count.
    pub fn put_series(&mut self, data_key: &str, samples: &[Sample]) -> ChartResult<usize> {
        let granularity = self.image.granularity;
        let container = self
            .image
            .containers
            .get_mut(data_key)
            .ok_or_else(|| ChartError::UnknownDataKey(data_key.to_owned()))?;

        *container = bucketize(samples.iter().copied(), granularity);
        let bucket_count = container.len();
        self.image.metadata.insert(
            data_key.to_owned(),
            KeyMetadata {
                populated: true,
                sample_count: samples.len(),
                bucket_count,
            },
        );
        Ok(bucket_count)
    }

    /// All samples whose bucket key falls inside `range`, in key order.
    pub fn query(&self, data_key: &str, range: DateRange) -> ChartResult<Vec<Sample>> {
        let container = self.container(data_key)?;
        let (first, last) = range_keys(range, self.image.granularity);
        Ok(container
            .range(first..=last)
            .flat_map(|(_, bucket)| bucket.iter().copied())
            .collect())
    }

    /// Writes the image to disk through a temporary sibling file so readers
    /// never observe a half-written image. No-op for in-memory databases.
    pub async fn flush(&self) -> ChartResult<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        let json = serde_json::to_string(&self.image)
            .map_err(|err| ChartError::StoreUnavailable(format!("encode image: {err}")))?;

        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| store_error(parent, &err))?;
        }
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(|err| store_error(&tmp_path, &err))?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|err| store_error(path, &err))?;
        Ok(())
    }

    fn container(&self, data_key: &str) -> ChartResult<&Buckets> {
        self.image
            .containers
            .get(data_key)
            .ok_or_else(|| ChartError::UnknownDataKey(data_key.to_owned()))
    }

    fn ensure_containers(&mut self, data_keys: &[String]) -> bool {
        let mut added = false;
        for key in data_keys {
            if !self.image.containers.contains_key(key) {
                self.image.containers.insert(key.clone(), Buckets::new());
                self.image.metadata.insert(key.clone(), KeyMetadata::default());
                added = true;
            }
        }
        added
    }
}

/// Decodes a stored image into the current schema.
///
/// Returns the image and whether it differs from what is on disk (migrated
/// or re-bucketed) and therefore needs rewriting.
fn decode_image(json: &str, granularity: BucketGranularity) -> ChartResult<(DatabaseImage, bool)> {
    let probe: VersionProbe = serde_json::from_str(json)
        .map_err(|err| ChartError::StoreUnavailable(format!("unreadable image: {err}")))?;

    match probe.version {
        1 => {
            let v1: ImageV1 = serde_json::from_str(json)
                .map_err(|err| ChartError::StoreUnavailable(format!("unreadable image: {err}")))?;
            let image = migrate_v1(v1, granularity)?;
            info!(
                from = 1,
                to = SCHEMA_VERSION,
                containers = image.containers.len(),
                "migrated bucket database"
            );
            Ok((image, true))
        }
        SCHEMA_VERSION => {
            let image: DatabaseImage = serde_json::from_str(json)
                .map_err(|err| ChartError::StoreUnavailable(format!("unreadable image: {err}")))?;
            if image.granularity == granularity {
                return Ok((image, false));
            }
            warn!(
                stored = %image.granularity,
                configured = %granularity,
                "re-bucketing database for new granularity"
            );
            Ok((rebucket(image, granularity), true))
        }
        found => Err(ChartError::SchemaMismatch {
            found,
            supported: SCHEMA_VERSION,
        }),
    }
}

fn migrate_v1(v1: ImageV1, granularity: BucketGranularity) -> ChartResult<DatabaseImage> {
    let mut containers = IndexMap::with_capacity(v1.containers.len());
    for (key, buckets) in v1.containers {
        let samples = buckets
            .values()
            .flatten()
            .map(RawSample::to_sample)
            .collect::<ChartResult<Vec<_>>>()?;
        containers.insert(key, bucketize(samples, granularity));
    }

    let metadata = containers
        .iter()
        .map(|(key, buckets)| {
            let populated = v1.metadata.get(key).is_some_and(|meta| meta.populated);
            (key.clone(), metadata_for(buckets, populated))
        })
        .collect();

    Ok(DatabaseImage {
        version: SCHEMA_VERSION,
        granularity,
        metadata,
        containers,
    })
}

fn rebucket(image: DatabaseImage, granularity: BucketGranularity) -> DatabaseImage {
    let containers: IndexMap<String, Buckets> = image
        .containers
        .into_iter()
        .map(|(key, buckets)| {
            let samples = buckets.into_values().flatten();
            (key, bucketize(samples, granularity))
        })
        .collect();
    let metadata = containers
        .iter()
        .map(|(key, buckets)| {
            let populated = image.metadata.get(key).is_some_and(|meta| meta.populated);
            (key.clone(), metadata_for(buckets, populated))
        })
        .collect();

    DatabaseImage {
        version: SCHEMA_VERSION,
        granularity,
        metadata,
        containers,
    }
}

fn bucketize(samples: impl IntoIterator<Item = Sample>, granularity: BucketGranularity) -> Buckets {
    let mut buckets = Buckets::new();
    for sample in samples {
        buckets
            .entry(bucket_key(sample, granularity))
            .or_default()
            .push(sample);
    }
    buckets
}

fn metadata_for(buckets: &Buckets, populated: bool) -> KeyMetadata {
    KeyMetadata {
        populated,
        sample_count: buckets.values().map(Vec::len).sum(),
        bucket_count: buckets.len(),
    }
}

fn store_error(path: &Path, err: &std::io::Error) -> ChartError {
    ChartError::StoreUnavailable(format!("{}: {err}", path.display()))
}

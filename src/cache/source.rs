use std::future::Future;
use std::path::PathBuf;

use tracing::debug;

use crate::core::RawSample;
use crate::error::{ChartError, ChartResult};

/// Origin of the full raw dataset for a data key.
///
/// Called at most once per key and cache lifetime; the store persists what
/// it returns.
pub trait SeriesSource: Send + Sync + 'static {
    fn fetch(&self, data_key: &str) -> impl Future<Output = ChartResult<Vec<RawSample>>> + Send;
}

/// Reads `<root>/<data_key>.json` files holding `[{ "t": ..., "v": ... }]`.
#[derive(Debug, Clone)]
pub struct FileSeriesSource {
    root: PathBuf,
}

impl FileSeriesSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn path_for(&self, data_key: &str) -> PathBuf {
        self.root.join(format!("{data_key}.json"))
    }
}

impl SeriesSource for FileSeriesSource {
    async fn fetch(&self, data_key: &str) -> ChartResult<Vec<RawSample>> {
        let path = self.path_for(data_key);
        debug!(path = %path.display(), "read series file");
        let json = tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| fetch_failed(data_key, err))?;
        serde_json::from_str(&json).map_err(|err| fetch_failed(data_key, err))
    }
}

/// Fetches `<base_url>/<data_key>.json` over HTTP.
#[cfg(feature = "http-source")]
#[derive(Debug, Clone)]
pub struct HttpSeriesSource {
    client: reqwest::Client,
    base_url: String,
}

#[cfg(feature = "http-source")]
impl HttpSeriesSource {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }

    #[must_use]
    pub fn url_for(&self, data_key: &str) -> String {
        format!("{}/{data_key}.json", self.base_url)
    }
}

#[cfg(feature = "http-source")]
impl SeriesSource for HttpSeriesSource {
    async fn fetch(&self, data_key: &str) -> ChartResult<Vec<RawSample>> {
        let url = self.url_for(data_key);
        debug!(%url, "fetch series");
        self.client
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| fetch_failed(data_key, err))?
            .json::<Vec<RawSample>>()
            .await
            .map_err(|err| fetch_failed(data_key, err))
    }
}

fn fetch_failed(data_key: &str, err: impl std::fmt::Display) -> ChartError {
    ChartError::FetchFailed {
        key: data_key.to_owned(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{FileSeriesSource, SeriesSource};
    use crate::core::RawSample;
    use crate::error::ChartError;

    #[tokio::test]
    async fn file_source_reads_raw_samples() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("co2.json"),
            r#"[{"t":"1900-01","v":5},{"t":"1900-06","v":10}]"#,
        )
        .expect("write");

        let source = FileSeriesSource::new(dir.path());
        let raw = source.fetch("co2").await.expect("fetch");
        assert_eq!(raw, vec![RawSample::new("1900-01", 5.0), RawSample::new("1900-06", 10.0)]);
    }

    #[tokio::test]
    async fn missing_file_is_a_fetch_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = FileSeriesSource::new(dir.path());
        let err = source.fetch("rain").await.expect_err("missing");
        assert!(matches!(err, ChartError::FetchFailed { ref key, .. } if key == "rain"));
    }
}

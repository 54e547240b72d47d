use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use climate_chart::cache::{
    CacheConfig, CacheRequest, CacheResponse, CacheStore, CacheWorker, Purpose, SeriesSource,
};
use climate_chart::core::{DateRange, RawSample};
use climate_chart::{ChartError, ChartResult};

/// `temperature` answers after a short delay; every other key fails.
#[derive(Clone, Default)]
struct ScriptedSource {
    fetches: Arc<AtomicUsize>,
}

impl SeriesSource for ScriptedSource {
    async fn fetch(&self, data_key: &str) -> ChartResult<Vec<RawSample>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        if data_key != "temperature" {
            return Err(ChartError::FetchFailed {
                key: data_key.to_owned(),
                reason: "offline".to_owned(),
            });
        }
        Ok(vec![
            RawSample::new("1900-01", 5.0),
            RawSample::new("1900-06", 10.0),
            RawSample::new("1950-01", 0.0),
        ])
    }
}

fn store(source: ScriptedSource) -> CacheStore<ScriptedSource> {
    CacheStore::new(CacheConfig::new(["temperature", "co2"]), source).expect("store")
}

fn range(start: i32, end: i32) -> DateRange {
    DateRange::new(start, end).expect("range")
}

async fn next(client: &mut climate_chart::cache::CacheClient) -> CacheResponse {
    tokio::time::timeout(Duration::from_secs(5), client.next_response())
        .await
        .expect("response in time")
        .expect("worker alive")
}

#[tokio::test]
async fn worker_answers_with_aggregated_points() -> ChartResult<()> {
    let mut client = CacheWorker::spawn(store(ScriptedSource::default()));
    let seq = client
        .request("temperature", range(1900, 1950), 2, Purpose::Chart)
        .await?;

    match next(&mut client).await {
        CacheResponse::Data {
            seq: got,
            purpose,
            data,
        } => {
            assert_eq!(got, seq);
            assert_eq!(purpose, Purpose::Chart);
            let values: Vec<f64> = data.iter().map(|point| point.y).collect();
            assert_eq!(values, vec![7.5, 0.0]);
        }
        other => panic!("unexpected response {other:?}"),
    }
    client.shutdown().await
}

#[tokio::test]
async fn superseded_responses_are_discarded() -> ChartResult<()> {
    let mut client = CacheWorker::spawn(store(ScriptedSource::default()));
    let stale = client
        .request("temperature", range(1900, 1950), 1, Purpose::Chart)
        .await?;
    let latest = client
        .request("temperature", range(1900, 1900), 1, Purpose::Chart)
        .await?;
    assert!(latest > stale);
    assert_eq!(client.latest_seq(Purpose::Chart), Some(latest));

    let response = next(&mut client).await;
    assert_eq!(response.seq(), latest);
    match response {
        CacheResponse::Data { data, .. } => assert_eq!(data.len(), 1),
        other => panic!("unexpected response {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn purposes_are_tracked_independently() -> ChartResult<()> {
    let mut client = CacheWorker::spawn(store(ScriptedSource::default()));
    let slider = client
        .request("temperature", range(1900, 1950), 3, Purpose::Slider)
        .await?;
    let chart = client
        .request("temperature", range(1900, 1950), 2, Purpose::Chart)
        .await?;

    let mut seen = vec![next(&mut client).await.seq(), next(&mut client).await.seq()];
    seen.sort_unstable();
    assert_eq!(seen, vec![slider, chart]);
    assert_eq!(client.stale_discarded(), 0);
    Ok(())
}

#[tokio::test]
async fn failure_is_first_occurrence_once_per_key() -> ChartResult<()> {
    let source = ScriptedSource::default();
    let mut client = CacheWorker::spawn(store(source.clone()));

    client.request("co2", range(1900, 1950), 2, Purpose::Chart).await?;
    let first = next(&mut client).await;
    client.request("co2", range(1900, 1950), 2, Purpose::Chart).await?;
    let second = next(&mut client).await;

    match (first, second) {
        (
            CacheResponse::Failed {
                first_occurrence: true,
                error,
                ..
            },
            CacheResponse::Failed {
                first_occurrence: false,
                ..
            },
        ) => assert!(error.is_fatal()),
        other => panic!("unexpected responses {other:?}"),
    }
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn request_json_feeds_the_worker() -> ChartResult<()> {
    let mut client = CacheWorker::spawn(store(ScriptedSource::default()));
    let request = CacheRequest::from_json(
        r#"{"dataKey":"temperature","dateRange":{"start":1900,"end":1950},"groupsCount":2,"purpose":"SLIDER"}"#,
    )?;
    let seq = client.send(request).await?;

    let response = next(&mut client).await;
    assert_eq!(response.seq(), seq);
    let json: serde_json::Value =
        serde_json::from_str(&response.to_json()?).expect("response json");
    assert_eq!(json["purpose"], "SLIDER");
    assert_eq!(json["data"][0]["y"], 7.5);
    Ok(())
}

#[test]
fn unknown_purpose_never_reaches_the_worker() {
    let err = CacheRequest::from_json(
        r#"{"dataKey":"temperature","dateRange":{"start":1900,"end":1950},"groupsCount":2,"purpose":"MAP"}"#,
    )
    .expect_err("unknown purpose");
    assert_eq!(err, ChartError::UnknownPurpose("MAP".to_owned()));
}

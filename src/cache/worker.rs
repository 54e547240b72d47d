use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::core::{AggregatedPoint, DateRange, aggregate};
use crate::error::{ChartError, ChartResult};

use super::messages::{CacheRequest, CacheResponse, Purpose};
use super::source::SeriesSource;
use super::store::CacheStore;

/// Default depth of the request and response channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Retrieves and aggregates the samples one request asks for.
pub async fn handle_request<S: SeriesSource>(
    store: &CacheStore<S>,
    request: &CacheRequest,
) -> ChartResult<Vec<AggregatedPoint>> {
    let series = store
        .retrieve_series(&request.data_key, request.date_range)
        .await?;
    aggregate(&series, request.date_range, request.groups_count)
}

/// Background owner of a [`CacheStore`].
///
/// Requests arrive over a channel and each one is served on its own task, so
/// responses may come back out of order. Only owned messages cross the
/// channel boundary.
pub struct CacheWorker;

impl CacheWorker {
    /// Spawns the worker on the current tokio runtime and returns the client
    /// half. The worker stops once the client is dropped.
    pub fn spawn<S: SeriesSource>(store: CacheStore<S>) -> CacheClient {
        Self::spawn_with_capacity(store, DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn spawn_with_capacity<S: SeriesSource>(store: CacheStore<S>, capacity: usize) -> CacheClient {
        let capacity = capacity.max(1);
        let (request_tx, request_rx) = mpsc::channel(capacity);
        let (response_tx, response_rx) = mpsc::channel(capacity);
        let worker = tokio::spawn(run(Arc::new(store), request_rx, response_tx));
        CacheClient {
            requests: request_tx,
            responses: response_rx,
            next_seq: 1,
            latest: HashMap::new(),
            stale_discarded: 0,
            worker,
        }
    }
}

async fn run<S: SeriesSource>(
    store: Arc<CacheStore<S>>,
    mut requests: mpsc::Receiver<CacheRequest>,
    responses: mpsc::Sender<CacheResponse>,
) {
    let reported = Arc::new(Mutex::new(HashSet::<String>::new()));

    while let Some(request) = requests.recv().await {
        trace!(
            seq = request.seq,
            data_key = %request.data_key,
            purpose = %request.purpose,
            "dispatch cache request"
        );
        let store = Arc::clone(&store);
        let reported = Arc::clone(&reported);
        let responses = responses.clone();
        tokio::spawn(async move {
            let response = match handle_request(&store, &request).await {
                Ok(data) => CacheResponse::Data {
                    seq: request.seq,
                    purpose: request.purpose,
                    data,
                },
                Err(error) => {
                    let first_occurrence = reported.lock().await.insert(request.data_key.clone());
                    warn!(
                        seq = request.seq,
                        data_key = %request.data_key,
                        first_occurrence,
                        error = %error,
                        "cache request failed"
                    );
                    CacheResponse::Failed {
                        seq: request.seq,
                        purpose: request.purpose,
                        data_key: request.data_key,
                        error,
                        first_occurrence,
                    }
                }
            };
            if responses.send(response).await.is_err() {
                debug!("cache client dropped before response");
            }
        });
    }
    debug!("cache worker stopped");
}

/// Requesting half of a running [`CacheWorker`].
///
/// Stamps every request with an increasing sequence number and hides
/// responses that a newer request of the same purpose has superseded.
pub struct CacheClient {
    requests: mpsc::Sender<CacheRequest>,
    responses: mpsc::Receiver<CacheResponse>,
    next_seq: u64,
    latest: HashMap<Purpose, u64>,
    stale_discarded: u64,
    worker: JoinHandle<()>,
}

impl CacheClient {
    /// Queues an aggregation and returns its sequence number.
    pub async fn request(
        &mut self,
        data_key: impl Into<String>,
        date_range: DateRange,
        groups_count: usize,
        purpose: Purpose,
    ) -> ChartResult<u64> {
        self.send(CacheRequest::new(data_key, date_range, groups_count, purpose))
            .await
    }

    /// Queues `request`, overwriting its sequence number.
    pub async fn send(&mut self, mut request: CacheRequest) -> ChartResult<u64> {
        let seq = self.next_seq;
        self.next_seq += 1;
        request.seq = seq;
        self.latest.insert(request.purpose, seq);
        self.requests
            .send(request)
            .await
            .map_err(|_| ChartError::WorkerClosed)?;
        Ok(seq)
    }

    /// Waits for the next response that is still current for its purpose.
    pub async fn next_response(&mut self) -> ChartResult<CacheResponse> {
        loop {
            let response = self.responses.recv().await.ok_or(ChartError::WorkerClosed)?;
            if self.is_current(&response) {
                return Ok(response);
            }
            self.stale_discarded += 1;
            debug!(
                seq = response.seq(),
                purpose = %response.purpose(),
                "discard stale cache response"
            );
        }
    }

    /// `true` when no newer request with the same purpose has been issued.
    #[must_use]
    pub fn is_current(&self, response: &CacheResponse) -> bool {
        self.latest
            .get(&response.purpose())
            .is_none_or(|latest| response.seq() >= *latest)
    }

    #[must_use]
    pub fn latest_seq(&self, purpose: Purpose) -> Option<u64> {
        self.latest.get(&purpose).copied()
    }

    #[must_use]
    pub fn stale_discarded(&self) -> u64 {
        self.stale_discarded
    }

    /// Stops accepting requests and waits for the dispatch loop to exit.
    /// In-flight request tasks finish on their own.
    pub async fn shutdown(self) -> ChartResult<()> {
        drop(self.requests);
        self.worker.await.map_err(|_| ChartError::WorkerClosed)
    }
}

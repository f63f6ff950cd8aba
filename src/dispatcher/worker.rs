//! The analytics worker: its message protocol and the default executor.
//!
//! A job is a JSON message holding a snapshot of the transactions (dates as
//! RFC 3339 text) and the [AggregationParams]. The worker answers with a JSON
//! reply of the form `{"ok": true, "result": {...}}` or
//! `{"ok": false, "error": "..."}`.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
};

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::{
    Error,
    analytics::{AggregationParams, AnalyticsReport, aggregate_until},
    dispatcher::{DispatchError, Executor},
    transaction::{Transaction, TransactionRecord},
};

/// The name given to worker threads, visible in debuggers and panic messages.
pub const WORKER_THREAD_NAME: &str = "analytics-worker";

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WorkerRequest {
    pub(crate) transactions: Vec<TransactionRecord>,
    pub(crate) params: AggregationParams,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WorkerReply {
    pub(crate) ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) result: Option<AnalyticsReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

impl WorkerReply {
    fn success(report: AnalyticsReport) -> Self {
        Self {
            ok: true,
            result: Some(report),
            error: None,
        }
    }

    fn failure(error: &Error) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.to_string()),
        }
    }

    pub(crate) fn into_result(self) -> Result<AnalyticsReport, DispatchError> {
        match (self.ok, self.result) {
            (true, Some(report)) => Ok(report),
            _ => Err(DispatchError::Worker(
                self.error
                    .unwrap_or_else(|| "unknown worker error".to_owned()),
            )),
        }
    }
}

/// Snapshot `transactions` and serialize them with `params` into a job message.
///
/// The snapshot shares nothing with `transactions`.
pub(crate) fn encode_request(
    transactions: &[Transaction],
    params: &AggregationParams,
) -> Result<String, DispatchError> {
    let transactions = transactions
        .iter()
        .map(Transaction::to_record)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| DispatchError::Serialization(error.to_string()))?;

    let request = WorkerRequest {
        transactions,
        params: *params,
    };

    serde_json::to_string(&request).map_err(|error| DispatchError::Serialization(error.to_string()))
}

pub(crate) fn decode_reply(reply: &str) -> Result<AnalyticsReport, DispatchError> {
    serde_json::from_str::<WorkerReply>(reply)
        .map_err(|error| DispatchError::Serialization(error.to_string()))?
        .into_result()
}

/// Run one job message and produce the reply message.
///
/// This is the body of the worker. It never panics on bad input: a message
/// that is not a valid job produces an error reply.
pub fn handle_message(message: &str) -> String {
    // An empty reply is rejected by the dispatcher like any other garbage.
    reply_to(message, &AtomicBool::new(false)).unwrap_or_default()
}

/// The reply to `message`, or `None` if `cancelled` was set before the job
/// finished.
fn reply_to(message: &str, cancelled: &AtomicBool) -> Option<String> {
    let reply = match run_job(message, cancelled) {
        Ok(report) => WorkerReply::success(report),
        Err(Error::Cancelled) => return None,
        Err(error) => WorkerReply::failure(&error),
    };

    Some(serde_json::to_string(&reply).unwrap_or_default())
}

fn run_job(message: &str, cancelled: &AtomicBool) -> Result<AnalyticsReport, Error> {
    let request: WorkerRequest =
        serde_json::from_str(message).map_err(|error| Error::MalformedInput(error.to_string()))?;

    aggregate_until(&request.transactions, &request.params, cancelled)
}

/// Sets the flag when dropped.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Counts a worker thread as live for as long as it is held.
struct LiveWorker(Arc<AtomicUsize>);

impl LiveWorker {
    fn new(count: Arc<AtomicUsize>) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self(count)
    }
}

impl Drop for LiveWorker {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Runs each job on a fresh, dedicated OS thread.
///
/// The thread exits as soon as it has handed back its reply. If the
/// dispatcher stops waiting, e.g. on timeout, the job is cancelled: the
/// thread stops aggregating, sends nothing and exits.
#[derive(Debug, Clone, Default)]
pub struct ThreadExecutor {
    live_workers: Arc<AtomicUsize>,
}

impl ThreadExecutor {
    /// The number of worker threads started by this executor (or its clones)
    /// that have not exited yet.
    pub fn live_workers(&self) -> usize {
        self.live_workers.load(Ordering::SeqCst)
    }
}

impl Executor for ThreadExecutor {
    async fn execute(&self, message: String) -> Result<String, DispatchError> {
        let (sender, receiver) = oneshot::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        // Dropping this future before the reply arrives cancels the job.
        let _cancel_on_drop = CancelOnDrop(Arc::clone(&cancelled));
        let live_worker = LiveWorker::new(Arc::clone(&self.live_workers));

        thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_owned())
            .spawn(move || {
                let _live_worker = live_worker;

                match reply_to(&message, &cancelled) {
                    Some(reply) => {
                        if sender.send(reply).is_err() {
                            tracing::debug!(
                                "analytics worker finished after the dispatcher stopped waiting"
                            );
                        }
                    }
                    None => tracing::debug!("analytics worker cancelled"),
                }
            })
            .map_err(|error| DispatchError::Spawn(error.to_string()))?;

        // The sender is only dropped without sending if the thread panicked.
        receiver.await.map_err(|_| DispatchError::Crashed)
    }
}

//! Runs the analytics engine off the caller's task, with an inline fallback.
//!
//! [Dispatcher::analyze] sends a snapshot of the transactions to a worker and
//! waits for its reply up to the configured timeout. If the worker cannot be
//! started, crashes, replies with an error or takes too long, the same
//! aggregation is computed inline on the original transactions. Callers only
//! ever see errors from that inline computation.

mod worker;

use std::time::Duration;

use crate::{
    Error,
    analytics::{AggregationParams, AnalyticsReport, aggregate},
    config::AnalyticsConfig,
    transaction::Transaction,
};

pub use worker::{ThreadExecutor, WORKER_THREAD_NAME, handle_message};

use worker::{decode_reply, encode_request};

/// The ways handing a report off to the worker can fail.
///
/// None of these reach callers of [Dispatcher::analyze]; they trigger the
/// inline fallback instead.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum DispatchError {
    /// The job or the reply could not be (de)serialized.
    #[error("could not serialize the worker message: {0}")]
    Serialization(String),

    /// The worker could not be started.
    #[error("could not start the analytics worker: {0}")]
    Spawn(String),

    /// The worker stopped without replying, e.g. it panicked.
    #[error("the analytics worker stopped without replying")]
    Crashed,

    /// The worker did not reply in time.
    #[error("the analytics worker did not reply within {0:?}")]
    Timeout(Duration),

    /// The worker replied with an error.
    #[error("the analytics worker failed: {0}")]
    Worker(String),
}

/// Carries a job message to a worker and brings back the reply message.
///
/// Messages are JSON text, see [handle_message] for what a worker does with
/// them. The dispatcher enforces the timeout, so implementations may take as
/// long as they like.
pub trait Executor: Send + Sync {
    /// Run `message` on a worker and return its reply.
    fn execute(
        &self,
        message: String,
    ) -> impl Future<Output = Result<String, DispatchError>> + Send;
}

/// Computes [AnalyticsReport]s without blocking the caller's task.
///
/// Each call to [Dispatcher::analyze] uses its own worker, which is stopped
/// if it does not reply in time. The dispatcher can be shared between tasks.
#[derive(Debug, Clone)]
pub struct Dispatcher<E = ThreadExecutor> {
    config: AnalyticsConfig,
    executor: E,
}

impl Dispatcher {
    /// Create a dispatcher that runs each report on a dedicated thread.
    pub fn new(config: AnalyticsConfig) -> Self {
        Self::with_executor(config, ThreadExecutor::default())
    }
}

impl<E: Executor> Dispatcher<E> {
    /// Create a dispatcher with a custom worker strategy.
    pub fn with_executor(config: AnalyticsConfig, executor: E) -> Self {
        Self { config, executor }
    }

    /// Compute the report for `transactions` anchored at the current month.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid (see
    /// [AnalyticsConfig::aggregation_params]) or the inline computation
    /// fails (see [aggregate]). Worker failures are never returned.
    pub async fn analyze(&self, transactions: &[Transaction]) -> Result<AnalyticsReport, Error> {
        let params = self.config.aggregation_params()?;

        self.analyze_with(transactions, &params).await
    }

    /// Compute the report for `transactions` with explicit parameters.
    ///
    /// Tries the worker first and falls back to [Dispatcher::analyze_inline]
    /// on any [DispatchError].
    ///
    /// # Errors
    /// Returns the error of the inline computation, see [aggregate].
    pub async fn analyze_with(
        &self,
        transactions: &[Transaction],
        params: &AggregationParams,
    ) -> Result<AnalyticsReport, Error> {
        match self.analyze_deferred(transactions, params).await {
            Ok(report) => Ok(report),
            Err(error) => {
                tracing::warn!("{error}, computing the report inline instead");
                self.analyze_inline(transactions, params)
            }
        }
    }

    /// Compute the report on a worker, giving up after the configured timeout.
    ///
    /// # Errors
    /// Returns a [DispatchError] describing why the worker did not produce a
    /// report. Computation errors inside the worker come back as
    /// [DispatchError::Worker].
    pub async fn analyze_deferred(
        &self,
        transactions: &[Transaction],
        params: &AggregationParams,
    ) -> Result<AnalyticsReport, DispatchError> {
        let message = encode_request(transactions, params)?;
        tracing::debug!(
            "dispatching {} transactions to the analytics worker",
            transactions.len()
        );

        let timeout = self.config.timeout;
        let reply = tokio::time::timeout(timeout, self.executor.execute(message))
            .await
            .map_err(|_| DispatchError::Timeout(timeout))??;

        decode_reply(&reply)
    }

    /// Compute the report on the current thread.
    ///
    /// # Errors
    /// See [aggregate].
    pub fn analyze_inline(
        &self,
        transactions: &[Transaction],
        params: &AggregationParams,
    ) -> Result<AnalyticsReport, Error> {
        aggregate(transactions, params)
    }
}

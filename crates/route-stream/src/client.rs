use std::sync::Arc;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::cancel::CancelHandle;
use crate::config::ClientConfig;
use crate::decoder::DEFAULT_MAX_LINE_BYTES;
use crate::dispatcher::EventHandler;
use crate::errors::StreamError;
use crate::event::{ErrorEvent, ProgressEvent, ResultEvent};
use crate::model::StreamRequest;
use crate::subscription::{Subscription, SubscriptionOutcome};
use crate::transport::{HttpTransport, Transport};

/// Entry point for starting route-search jobs.
#[derive(Clone)]
pub struct RouteSearchClient {
    transport: Arc<dyn Transport>,
    max_line_bytes: usize,
}

impl RouteSearchClient {
    /// Creates a client that talks HTTP to the configured search service.
    pub fn new(config: ClientConfig) -> Result<Self, StreamError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self {
            transport: Arc::new(transport),
            max_line_bytes: config.max_line_bytes,
        })
    }

    /// Creates a client configured from `ROUTE_STREAM_*` environment variables.
    pub fn from_env() -> Result<Self, StreamError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Creates a client over a custom transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }

    /// Starts a job and returns immediately.
    ///
    /// The exchange runs on a spawned tokio task, so this must be called from
    /// within a runtime. Handlers are invoked on that task, strictly in
    /// arrival order, until a terminal event, a transport failure, or
    /// [`SearchHandle::cancel`].
    pub fn start<H>(&self, request: StreamRequest, handler: H) -> SearchHandle
    where
        H: EventHandler + 'static,
    {
        let id = uuid::Uuid::new_v4();
        let token = CancellationToken::new();
        let subscription = Subscription::new(
            id,
            request,
            self.transport.clone(),
            handler,
            token.clone(),
            self.max_line_bytes,
        );
        let task = tokio::spawn(subscription.run());
        SearchHandle {
            id,
            cancel: CancelHandle::new(token),
            task,
        }
    }

    /// Runs a job to its terminal event and returns the result.
    ///
    /// A producer error event or transport failure becomes
    /// `StreamError::Failed`. Dropping the returned future cancels the job.
    pub async fn collect(&self, request: StreamRequest) -> Result<ResultEvent, StreamError> {
        let (tx, rx) = oneshot::channel();
        let handle = self.start(request, Collector { tx: Some(tx) });
        let _guard = handle.cancel.drop_guard();
        match handle.wait().await? {
            SubscriptionOutcome::Cancelled => Err(StreamError::Cancelled),
            SubscriptionOutcome::Completed | SubscriptionOutcome::Failed { .. } => rx
                .await
                .map_err(|_| StreamError::protocol_msg("subscription ended without an outcome"))?,
        }
    }
}

/// Handle for one running job.
pub struct SearchHandle {
    id: uuid::Uuid,
    cancel: CancelHandle,
    task: tokio::task::JoinHandle<SubscriptionOutcome>,
}

impl SearchHandle {
    /// Identifier used in this job's log records.
    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    /// Cancels the job. Safe to call repeatedly and after the job finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns a cloneable cancel handle, e.g. for use inside a handler.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the read loop to end.
    pub async fn wait(self) -> Result<SubscriptionOutcome, StreamError> {
        self.task
            .await
            .map_err(|e| StreamError::protocol_msg(format!("subscription task failed: {e}")))
    }
}

struct Collector {
    tx: Option<oneshot::Sender<Result<ResultEvent, StreamError>>>,
}

impl Collector {
    fn send(&mut self, value: Result<ResultEvent, StreamError>) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(value);
        }
    }
}

impl EventHandler for Collector {
    fn on_progress(&mut self, event: ProgressEvent) {
        trace!(phase = %event.phase, iteration = event.iteration, "route search progress");
    }

    fn on_result(&mut self, event: ResultEvent) {
        self.send(Ok(event));
    }

    fn on_error(&mut self, event: ErrorEvent) {
        self.send(Err(StreamError::Failed(event.message)));
    }
}

use std::sync::Arc;

use futures::StreamExt as _;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::cancel::is_cancellation_failure;
use crate::decoder::FrameDecoder;
use crate::dispatcher::{Dispatch, Dispatcher, EventHandler};
use crate::errors::TransportError;
use crate::event::Event;
use crate::model::StreamRequest;
use crate::parser::parse_frame;
use crate::transport::Transport;

/// How a subscription ended.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SubscriptionOutcome {
    /// A result event was delivered to the result handler.
    Completed,
    /// An error was delivered to the error handler, either from the producer
    /// or from a transport failure.
    Failed { message: String },
    /// The caller cancelled; no terminal handler ran.
    Cancelled,
}

/// Live binding of one request to its transport, buffer and handlers.
pub(crate) struct Subscription<H> {
    id: uuid::Uuid,
    request: StreamRequest,
    transport: Arc<dyn Transport>,
    decoder: FrameDecoder,
    dispatcher: Dispatcher<H>,
    cancel: CancellationToken,
}

impl<H: EventHandler> Subscription<H> {
    pub(crate) fn new(
        id: uuid::Uuid,
        request: StreamRequest,
        transport: Arc<dyn Transport>,
        handler: H,
        cancel: CancellationToken,
        max_line_bytes: usize,
    ) -> Self {
        Self {
            id,
            request,
            transport,
            decoder: FrameDecoder::new(max_line_bytes),
            dispatcher: Dispatcher::new(handler, cancel.clone()),
            cancel,
        }
    }

    /// Runs the read loop until a terminal event, a transport failure, or
    /// cancellation.
    pub(crate) async fn run(mut self) -> SubscriptionOutcome {
        debug!(
            subscription_id = %self.id,
            start_id = self.request.start_id(),
            end_id = self.request.end_id(),
            desired_count = self.request.desired_count(),
            "route search subscription started"
        );

        let opened = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            opened = self.transport.open(&self.request, &self.cancel) => Some(opened),
        };
        let mut stream = match opened {
            None => return self.cancelled(),
            Some(Ok(stream)) => stream,
            Some(Err(err)) => return self.transport_failed(err),
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                next = stream.next() => Some(next),
            };
            let chunk = match next {
                None => return self.cancelled(),
                Some(Some(Ok(chunk))) => chunk,
                Some(Some(Err(err))) => return self.transport_failed(err),
                Some(None) => return self.ended(),
            };

            let decoded = self.decoder.push_chunk(&chunk);
            for frame in decoded.frames {
                let Some(event) = parse_frame(&frame) else {
                    continue;
                };
                if let Some(outcome) = self.dispatch(event) {
                    return outcome;
                }
            }
            if let Some(err) = decoded.error {
                return self.transport_failed(err);
            }
        }
    }

    fn dispatch(&mut self, event: Event) -> Option<SubscriptionOutcome> {
        let outcome = match &event {
            Event::Progress(_) => None,
            Event::Result(_) => Some(SubscriptionOutcome::Completed),
            Event::Error(err) => Some(SubscriptionOutcome::Failed {
                message: err.message.clone(),
            }),
        };
        trace!(subscription_id = %self.id, kind = event.kind(), "dispatching event");
        match self.dispatcher.dispatch(event) {
            Dispatch::Delivered => {
                if let Some(outcome) = &outcome {
                    debug!(
                        subscription_id = %self.id,
                        ?outcome,
                        "route search subscription finished"
                    );
                }
                outcome
            }
            // Only cancellation closes the dispatcher before a terminal event
            // has returned from this loop.
            Dispatch::Dropped => Some(self.cancelled()),
        }
    }

    fn ended(&mut self) -> SubscriptionOutcome {
        let dropped = std::mem::take(&mut self.decoder).finish();
        if dropped > 0 {
            debug!(subscription_id = %self.id, dropped, "discarding unterminated trailing line");
        }
        if is_cancellation_failure(&self.cancel) {
            return self.cancelled();
        }
        let message = "stream ended before a result was received".to_string();
        warn!(subscription_id = %self.id, "{message}");
        match self.dispatcher.fail(message.clone()) {
            Dispatch::Delivered => SubscriptionOutcome::Failed { message },
            Dispatch::Dropped => self.cancelled(),
        }
    }

    fn transport_failed(&mut self, err: TransportError) -> SubscriptionOutcome {
        if is_cancellation_failure(&self.cancel) {
            debug!(
                subscription_id = %self.id,
                error = %err,
                "transport failure after cancellation ignored"
            );
            return self.cancelled();
        }
        let message = err.to_string();
        warn!(
            subscription_id = %self.id,
            status = err.status_code(),
            error = %err,
            "route search transport failed"
        );
        match self.dispatcher.fail(message.clone()) {
            Dispatch::Delivered => SubscriptionOutcome::Failed { message },
            Dispatch::Dropped => self.cancelled(),
        }
    }

    fn cancelled(&mut self) -> SubscriptionOutcome {
        self.dispatcher.close();
        debug!(subscription_id = %self.id, "route search subscription cancelled");
        SubscriptionOutcome::Cancelled
    }
}

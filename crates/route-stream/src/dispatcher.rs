use tokio_util::sync::CancellationToken;

use crate::event::{ErrorEvent, Event, ProgressEvent, ResultEvent};

/// Consumer callbacks for one subscription.
///
/// Handlers run synchronously on the subscription's read loop and are never
/// invoked concurrently for the same subscription.
pub trait EventHandler: Send {
    fn on_progress(&mut self, event: ProgressEvent);
    fn on_result(&mut self, event: ResultEvent);
    fn on_error(&mut self, event: ErrorEvent);
}

type Callback<T> = Box<dyn FnMut(T) + Send>;

/// Closure-backed [`EventHandler`].
///
/// Unset callbacks ignore their events.
#[derive(Default)]
pub struct Handlers {
    progress: Option<Callback<ProgressEvent>>,
    result: Option<Callback<ResultEvent>>,
    error: Option<Callback<ErrorEvent>>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_progress(mut self, f: impl FnMut(ProgressEvent) + Send + 'static) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    pub fn on_result(mut self, f: impl FnMut(ResultEvent) + Send + 'static) -> Self {
        self.result = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnMut(ErrorEvent) + Send + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }
}

impl EventHandler for Handlers {
    fn on_progress(&mut self, event: ProgressEvent) {
        if let Some(f) = self.progress.as_mut() {
            f(event);
        }
    }

    fn on_result(&mut self, event: ResultEvent) {
        if let Some(f) = self.result.as_mut() {
            f(event);
        }
    }

    fn on_error(&mut self, event: ErrorEvent) {
        if let Some(f) = self.error.as_mut() {
            f(event);
        }
    }
}

/// Whether an event reached a handler.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dispatch {
    Delivered,
    /// Dropped because the dispatcher was already closed or cancelled.
    Dropped,
}

/// Order-preserving router from events to handler callbacks.
///
/// `Open` until a result or error is delivered, or until the shared token is
/// cancelled; after that every event is dropped.
pub struct Dispatcher<H> {
    handler: H,
    cancel: CancellationToken,
    closed: bool,
}

impl<H: EventHandler> Dispatcher<H> {
    pub fn new(handler: H, cancel: CancellationToken) -> Self {
        Self {
            handler,
            cancel,
            closed: false,
        }
    }

    pub fn is_closed(&mut self) -> bool {
        if !self.closed && self.cancel.is_cancelled() {
            self.closed = true;
        }
        self.closed
    }

    /// Routes one event to its handler.
    pub fn dispatch(&mut self, event: Event) -> Dispatch {
        if self.is_closed() {
            return Dispatch::Dropped;
        }
        match event {
            Event::Progress(progress) => self.handler.on_progress(progress),
            Event::Result(result) => {
                self.closed = true;
                self.handler.on_result(result);
            }
            Event::Error(error) => {
                self.closed = true;
                self.handler.on_error(error);
            }
        }
        Dispatch::Delivered
    }

    /// Reports a transport failure as a terminal error event.
    pub fn fail(&mut self, message: impl Into<String>) -> Dispatch {
        self.dispatch(Event::Error(ErrorEvent::new(message)))
    }

    /// Closes the dispatcher without invoking any handler.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

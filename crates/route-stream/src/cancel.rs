use tokio_util::sync::{CancellationToken, DropGuard};

/// Handle used to cancel one route-search subscription.
///
/// Cancelling aborts the in-flight exchange and silences the subscription:
/// no handler runs afterwards, not even for a terminal event that was
/// already buffered. Calling it again, or after the stream has ended, is a
/// no-op.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Guard that cancels the subscription when dropped.
    pub(crate) fn drop_guard(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }
}

/// Decides whether a transport failure should reach the error handler.
///
/// Failures observed while the token is cancelled are the abort itself and
/// are swallowed.
pub(crate) fn is_cancellation_failure(token: &CancellationToken) -> bool {
    token.is_cancelled()
}

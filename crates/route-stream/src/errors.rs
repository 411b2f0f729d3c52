/// Failures reported by a transport or by the frame decoder before the read
/// loop turns them into an `ErrorEvent` for the consumer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The search endpoint answered with a non-success status.
    #[error("route search request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    /// The request could not be sent or the connection was refused.
    #[error("route search request failed: {0}")]
    Request(String),
    /// Reading the response body failed mid-stream.
    #[error("route search stream read failed: {0}")]
    Read(String),
    /// The byte stream could not be decoded into text frames.
    #[error("route search stream is malformed: {0}")]
    Decode(String),
}

impl TransportError {
    /// Creates a request-level error.
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }

    /// Creates a body read error.
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read(message.into())
    }

    /// Creates a structural decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Returns the HTTP status code when the failure came from one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Top-level error type for the public client API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Invalid request supplied by the caller.
    #[error("validation error: {0}")]
    Validation(String),
    /// The job ended with an error event, either from the producer or from a
    /// transport failure.
    #[error("route search failed: {0}")]
    Failed(String),
    /// The job was cancelled before a terminal event was observed.
    #[error("cancelled")]
    Cancelled,
    /// Internal invariant violation (for example a read loop that panicked).
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl StreamError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn protocol_msg(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}

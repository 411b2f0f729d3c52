use std::pin::Pin;

use futures::StreamExt as _;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::ClientConfig;
use crate::errors::{StreamError, TransportError};
use crate::model::StreamRequest;

/// Chunked response body of one search exchange.
pub type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, TransportError>> + Send + 'static>>;

/// Opens one streaming exchange for a search request.
///
/// Implementations should stop producing chunks once `cancel` fires; the
/// read loop also drops the stream on cancellation, which aborts the
/// exchange.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn open(
        &self,
        request: &StreamRequest,
        cancel: &CancellationToken,
    ) -> Result<ByteStream, TransportError>;
}

/// Transport that POSTs the request to the search service with reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, StreamError> {
        config.validate()?;
        let mut builder = reqwest::Client::builder()
            .read_timeout(config.read_timeout)
            .connect_timeout(config.connect_timeout);
        if let Some(total) = config.total_timeout {
            builder = builder.timeout(total);
        }
        let client = builder
            .build()
            .map_err(|e| StreamError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: config.stream_url(),
        })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn open(
        &self,
        request: &StreamRequest,
        cancel: &CancellationToken,
    ) -> Result<ByteStream, TransportError> {
        debug!(
            url = %self.url,
            start_id = request.start_id(),
            end_id = request.end_id(),
            "opening route search stream"
        );
        // `.json()` sets `Content-Type: application/json`.
        let send = self.client.post(&self.url).json(&request.to_body()).send();
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TransportError::request("aborted")),
            response = send => response.map_err(|e| TransportError::request(describe(&e)))?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| TransportError::read(describe(&e))))
            .take_until(cancel.clone().cancelled_owned());
        Ok(Box::pin(stream))
    }
}

/// Formats a reqwest error with its source chain, which is where the
/// underlying cause (a timeout, a reset connection) is reported.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    if err.is_timeout() && !message.contains("timed out") {
        message.push_str(" (timed out)");
    }
    message
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_invalid_config() {
        let err = HttpTransport::new(&ClientConfig::new("  ")).err().expect("invalid");
        assert!(matches!(err, StreamError::Config(msg) if msg.contains("base_url")));
    }

    #[tokio::test]
    async fn open_is_aborted_by_a_cancelled_token() {
        let transport =
            HttpTransport::new(&ClientConfig::new("http://127.0.0.1:9")).expect("transport");
        let request = StreamRequest::new("a", "b").expect("request");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = transport.open(&request, &cancel).await.err().expect("aborted");
        assert_eq!(err, TransportError::request("aborted"));
    }
}

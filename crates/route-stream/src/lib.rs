//! Client for streamed route-search jobs.
//!
//! A job asks the search service for a smooth path between two tracks. The
//! service answers with a long-lived event stream: progress updates while
//! the search runs, then exactly one result or error. This crate decodes
//! that stream incrementally, routes each event to the caller's handlers in
//! arrival order, and lets the caller cancel at any point.
//!
//! ```no_run
//! use route_stream::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), StreamError> {
//! let client = RouteSearchClient::new(ClientConfig::new("http://localhost:8000"))?;
//! let handlers = Handlers::new()
//!     .on_progress(|p| println!("{}: {:?}", p.phase, p.iteration))
//!     .on_result(|r| println!("{} items", r.items.len()))
//!     .on_error(|e| eprintln!("search failed: {}", e.message));
//!
//! let handle = client.start(StreamRequest::with_count("start-id", "end-id", 15)?, handlers);
//! // handle.cancel() stops the job and silences every handler.
//! let outcome = handle.wait().await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

/// Cancellation handle shared with the read loop.
pub mod cancel;
/// Job initiator and job handle.
pub mod client;
/// HTTP client configuration.
pub mod config;
/// Byte stream to text frame decoding.
pub mod decoder;
/// Event routing to consumer handlers.
pub mod dispatcher;
/// Public error types.
pub mod errors;
/// Typed stream events.
pub mod event;
/// Search request model.
pub mod model;
/// Logging initialisation.
pub mod observability;
/// Frame classification into events.
pub mod parser;
/// Common imports for typical usage.
pub mod prelude;
mod subscription;
/// Transport seam and the reqwest implementation.
pub mod transport;

pub use cancel::CancelHandle;
pub use client::{RouteSearchClient, SearchHandle};
pub use config::ClientConfig;
pub use decoder::{Decoded, FrameDecoder};
pub use dispatcher::{Dispatch, Dispatcher, EventHandler, Handlers};
pub use errors::{StreamError, TransportError};
pub use event::{ErrorEvent, Event, ItemRole, Phase, ProgressEvent, ResultEvent, ResultItem};
pub use model::StreamRequest;
pub use parser::parse_frame;
pub use subscription::SubscriptionOutcome;
pub use transport::{ByteStream, HttpTransport, Transport};

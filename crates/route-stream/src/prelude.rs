//! Common imports for typical client usage.
pub use crate::{
    CancelHandle, ClientConfig, ErrorEvent, Event, EventHandler, Handlers, ItemRole, Phase,
    ProgressEvent, ResultEvent, ResultItem, RouteSearchClient, SearchHandle, StreamError,
    StreamRequest, SubscriptionOutcome,
};

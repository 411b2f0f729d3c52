//! Typed events carried by the route-search stream.
//!
//! Canonical field names are accepted alongside the names the search service
//! actually emits (`tracks`, `track_id`, `artist`, `error`, ...).

use std::fmt;

/// One classified unit of protocol information.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Progress(ProgressEvent),
    Result(ResultEvent),
    Error(ErrorEvent),
}

impl Event {
    /// Returns true for events that end a subscription.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Result(_) | Self::Error(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Progress(_) => "progress",
            Self::Result(_) => "result",
            Self::Error(_) => "error",
        }
    }
}

/// Search phase reported by a progress event.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Init,
    Neighborhood,
    Search,
    Resolving,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Init => "init",
            Self::Neighborhood => "neighborhood",
            Self::Search => "search",
            Self::Resolving => "resolving",
        })
    }
}

/// Non-terminal progress update.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct ProgressEvent {
    pub phase: Phase,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub iteration: Option<u64>,
    #[serde(default)]
    pub visited: Option<u64>,
    #[serde(default)]
    pub queue_size: Option<u64>,
    #[serde(default)]
    pub best_h: Option<f64>,
    #[serde(default, alias = "current_track")]
    pub current_item: Option<String>,
    #[serde(default)]
    pub neighborhood_1hop: Option<u64>,
    #[serde(default)]
    pub neighborhood_2hop: Option<u64>,
    /// Human-readable start endpoint, sent with the `init` phase.
    #[serde(default, alias = "start_track")]
    pub start_item: Option<String>,
    /// Human-readable end endpoint, sent with the `init` phase.
    #[serde(default, alias = "end_track")]
    pub end_item: Option<String>,
}

/// Terminal outcome of a search.
///
/// `success == false` is a normal, if unsuccessful, outcome and is delivered
/// through the result handler.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct ResultEvent {
    #[serde(default, alias = "tracks")]
    pub items: Vec<ResultItem>,
    #[serde(default)]
    pub path_length: u64,
    #[serde(default)]
    pub sampled_length: u64,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl ResultEvent {
    /// Orders items by producer position and renumbers them from 0 so
    /// positions are contiguous.
    pub(crate) fn normalize_positions(&mut self) {
        self.items.sort_by_key(|item| item.position);
        for (idx, item) in self.items.iter_mut().enumerate() {
            item.position = idx as u64;
        }
    }
}

/// Terminal failure reported by the producer (or synthesized from a
/// transport failure).
///
/// Accepts the message under `message` or `error`; `message` wins when a
/// payload carries both.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "RawErrorEvent")]
pub struct ErrorEvent {
    pub message: String,
}

#[derive(serde::Deserialize)]
struct RawErrorEvent {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl TryFrom<RawErrorEvent> for ErrorEvent {
    type Error = String;

    fn try_from(raw: RawErrorEvent) -> Result<Self, Self::Error> {
        raw.message
            .or(raw.error)
            .map(Self::new)
            .ok_or_else(|| "error event has no message".to_string())
    }
}

impl ErrorEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One item on the resolved route.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct ResultItem {
    #[serde(alias = "track_id")]
    pub id: String,
    #[serde(default, alias = "track")]
    pub title: Option<String>,
    #[serde(default, alias = "artist")]
    pub creator: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default, alias = "image_url")]
    pub artwork_url: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default, alias = "spotify_url")]
    pub external_url: Option<String>,
    pub position: u64,
    pub role: ItemRole,
}

/// Where an item sits on the route.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ItemRole {
    Start,
    /// Intermediate item, with the similarity to its predecessor when the
    /// producer reports one (`"bridge (85% similar)"`).
    Bridge { similarity: Option<f64> },
    End,
}

impl ItemRole {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw {
            "start" => return Some(Self::Start),
            "end" => return Some(Self::End),
            _ => {}
        }
        let rest = raw.strip_prefix("bridge")?;
        let similarity = rest
            .trim()
            .strip_prefix('(')
            .and_then(|s| s.split_once('%'))
            .and_then(|(pct, _)| pct.trim().parse::<f64>().ok())
            .map(|pct| pct / 100.0);
        Some(Self::Bridge { similarity })
    }
}

impl<'de> serde::Deserialize<'de> for ItemRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown item role: {raw}")))
    }
}

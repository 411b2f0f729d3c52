use crate::errors::StreamError;

/// Number of items the producer samples the route down to when the caller
/// does not ask for a specific count.
pub const DEFAULT_DESIRED_COUNT: u32 = 20;

/// One route-search job: find a path between two tracks.
///
/// Fields are private so a request can only be built through [`StreamRequest::new`]
/// and stays immutable once submitted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StreamRequest {
    start_id: String,
    end_id: String,
    desired_count: u32,
}

impl StreamRequest {
    /// Creates a request with the default desired count.
    pub fn new(
        start_id: impl Into<String>,
        end_id: impl Into<String>,
    ) -> Result<Self, StreamError> {
        Self::with_count(start_id, end_id, DEFAULT_DESIRED_COUNT)
    }

    /// Creates a request asking the producer for `desired_count` items.
    pub fn with_count(
        start_id: impl Into<String>,
        end_id: impl Into<String>,
        desired_count: u32,
    ) -> Result<Self, StreamError> {
        let start_id = start_id.into().trim().to_string();
        let end_id = end_id.into().trim().to_string();
        if start_id.is_empty() {
            return Err(StreamError::validation("start id must not be empty"));
        }
        if end_id.is_empty() {
            return Err(StreamError::validation("end id must not be empty"));
        }
        if desired_count == 0 {
            return Err(StreamError::validation(
                "desired count must be greater than 0",
            ));
        }
        Ok(Self {
            start_id,
            end_id,
            desired_count,
        })
    }

    pub fn start_id(&self) -> &str {
        &self.start_id
    }

    pub fn end_id(&self) -> &str {
        &self.end_id
    }

    pub fn desired_count(&self) -> u32 {
        self.desired_count
    }

    /// Serializes the request into the search endpoint's JSON body.
    pub(crate) fn to_body(&self) -> RequestBody<'_> {
        RequestBody {
            start_track_id: &self.start_id,
            end_track_id: &self.end_id,
            track_count: Some(self.desired_count),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub(crate) struct RequestBody<'a> {
    pub start_track_id: &'a str,
    pub end_track_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_default_count_and_trims_ids() {
        let req = StreamRequest::new(" a ", "b").expect("valid");
        assert_eq!(req.start_id(), "a");
        assert_eq!(req.end_id(), "b");
        assert_eq!(req.desired_count(), DEFAULT_DESIRED_COUNT);
    }

    #[test]
    fn rejects_blank_ids_and_zero_count() {
        assert!(matches!(
            StreamRequest::new("  ", "b"),
            Err(StreamError::Validation(msg)) if msg.contains("start id")
        ));
        assert!(matches!(
            StreamRequest::new("a", ""),
            Err(StreamError::Validation(msg)) if msg.contains("end id")
        ));
        assert!(matches!(
            StreamRequest::with_count("a", "b", 0),
            Err(StreamError::Validation(msg)) if msg.contains("desired count")
        ));
    }

    #[test]
    fn body_uses_wire_field_names() {
        let req = StreamRequest::with_count("start", "end", 15).expect("valid");
        let body = serde_json::to_value(req.to_body()).expect("serialize");
        assert_eq!(
            body,
            serde_json::json!({
                "start_track_id": "start",
                "end_track_id": "end",
                "track_count": 15,
            })
        );
    }
}

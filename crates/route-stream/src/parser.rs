use tracing::trace;

use crate::event::Event;

/// Prefix that marks a frame as carrying an event payload.
pub const DATA_PREFIX: &str = "data: ";

/// Classifies one text frame.
///
/// Returns `None` for anything that is not a well-formed event: lines without
/// the `data: ` prefix (including blank keep-alives), payloads that are not
/// JSON, and unknown `type` values. None of these end the stream.
pub fn parse_frame(frame: &str) -> Option<Event> {
    let payload = frame.strip_prefix(DATA_PREFIX)?;
    match serde_json::from_str::<Event>(payload) {
        Ok(Event::Result(mut result)) => {
            result.normalize_positions();
            Some(Event::Result(result))
        }
        Ok(event) => Some(event),
        Err(err) => {
            trace!(error = %err, len = payload.len(), "discarding unparseable frame");
            None
        }
    }
}

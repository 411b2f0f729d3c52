use crate::errors::TransportError;

/// Longest line the decoder buffers before treating the stream as malformed.
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Lines completed by one chunk, plus the failure that stopped decoding.
#[derive(Debug, Default)]
pub struct Decoded {
    pub frames: Vec<String>,
    /// Set once the stream can no longer be decoded. Later chunks must not
    /// be pushed.
    pub error: Option<TransportError>,
}

impl Decoded {
    pub fn into_result(self) -> Result<Vec<String>, TransportError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.frames),
        }
    }
}

/// Splits a chunked byte stream into newline-delimited text frames.
///
/// Bytes are buffered until a `\n` arrives, so a multi-byte character split
/// across two chunks is only decoded once the whole line is present. A
/// trailing `\r` is stripped from each line.
#[derive(Debug)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    max_line_bytes: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_BYTES)
    }
}

impl FrameDecoder {
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_line_bytes,
        }
    }

    /// Appends a chunk and returns every line it completed, in order.
    ///
    /// Decoding stops at the first structural failure. Lines completed before
    /// it are still returned, so how the bytes were chunked never changes
    /// which frames precede the error.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Decoded {
        let scan_from = self.buf.len();
        self.buf.extend_from_slice(chunk);

        let mut decoded = Decoded::default();
        let mut line_start = 0;
        for idx in line_breaks(&self.buf[scan_from..]).map(|i| i + scan_from) {
            let line = &self.buf[line_start..idx];
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            match std::str::from_utf8(line) {
                Ok(text) => decoded.frames.push(text.to_string()),
                Err(e) => {
                    decoded.error = Some(TransportError::decode(format!(
                        "line is not valid UTF-8: {e}"
                    )));
                    break;
                }
            }
            line_start = idx + 1;
        }
        self.buf.drain(..line_start);

        if decoded.error.is_none() && self.buf.len() > self.max_line_bytes {
            decoded.error = Some(TransportError::decode(format!(
                "line exceeds {} bytes without a line break",
                self.max_line_bytes
            )));
        }
        decoded
    }

    /// Number of buffered bytes that do not yet form a complete line.
    pub fn residual_len(&self) -> usize {
        self.buf.len()
    }

    /// Ends the stream, discarding any unterminated trailing segment.
    ///
    /// Returns how many bytes were dropped.
    pub fn finish(self) -> usize {
        self.buf.len()
    }
}

fn line_breaks(haystack: &[u8]) -> impl Iterator<Item = usize> + '_ {
    haystack
        .iter()
        .enumerate()
        .filter_map(|(i, b)| (*b == b'\n').then_some(i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_lines_wait_for_their_terminator() {
        let mut decoder = FrameDecoder::default();
        let frames = decoder
            .push_chunk(b"data: {\"type\":\"progress\",\"ph")
            .into_result()
            .expect("decode");
        assert!(frames.is_empty());
        let frames = decoder
            .push_chunk(b"ase\":\"init\"}\n\ndata: x")
            .into_result()
            .expect("decode");
        assert_eq!(
            frames,
            vec![
                "data: {\"type\":\"progress\",\"phase\":\"init\"}".to_string(),
                String::new(),
            ]
        );
        assert_eq!(decoder.residual_len(), "data: x".len());
    }

    #[test]
    fn multibyte_character_split_across_chunks() {
        let text = "data: Björk → Sigur Rós\n";
        let bytes = text.as_bytes();
        let arrow = text.find('→').expect("arrow");
        let mut decoder = FrameDecoder::default();
        let first = decoder.push_chunk(&bytes[..arrow + 1]);
        assert!(first.frames.is_empty() && first.error.is_none());
        let frames = decoder
            .push_chunk(&bytes[arrow + 1..])
            .into_result()
            .expect("second");
        assert_eq!(frames, vec!["data: Björk → Sigur Rós".to_string()]);
    }

    #[test]
    fn crlf_lines_match_lf_lines() {
        let mut decoder = FrameDecoder::default();
        let frames = decoder
            .push_chunk(b"a\r\nb\r\n\r\n")
            .into_result()
            .expect("decode");
        assert_eq!(frames, vec!["a".to_string(), "b".to_string(), String::new()]);
    }

    #[test]
    fn invalid_utf8_line_is_a_decode_error() {
        let mut decoder = FrameDecoder::default();
        let err = decoder
            .push_chunk(b"data: \xff\xfe\n")
            .into_result()
            .expect_err("invalid");
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[test]
    fn lines_before_invalid_utf8_are_kept() {
        let mut decoder = FrameDecoder::default();
        let decoded = decoder.push_chunk(b"one\ntwo\ndata: \xff\nthree\n");
        assert_eq!(decoded.frames, vec!["one".to_string(), "two".to_string()]);
        assert!(
            matches!(decoded.error, Some(TransportError::Decode(msg)) if msg.contains("UTF-8"))
        );
    }

    #[test]
    fn lines_before_oversized_residual_are_kept() {
        let mut decoder = FrameDecoder::new(8);
        let decoded = decoder.push_chunk(b"12345\n123456789");
        assert_eq!(decoded.frames, vec!["12345".to_string()]);
        assert!(
            matches!(decoded.error, Some(TransportError::Decode(msg)) if msg.contains("8 bytes"))
        );
    }

    #[test]
    fn oversized_residual_is_a_decode_error() {
        let mut decoder = FrameDecoder::new(8);
        assert!(decoder.push_chunk(b"12345\n").error.is_none());
        let err = decoder
            .push_chunk(b"123456789")
            .into_result()
            .expect_err("too long");
        assert!(matches!(err, TransportError::Decode(msg) if msg.contains("8 bytes")));
    }

    #[test]
    fn finish_drops_unterminated_residual() {
        let mut decoder = FrameDecoder::default();
        let frames = decoder
            .push_chunk(b"data: {\"type\":\"error\",\"message\":\"late\"}")
            .into_result()
            .expect("decode");
        assert!(frames.is_empty());
        assert_eq!(decoder.finish(), 39);
    }
}

//! Incremental UTF-8 decoding for the provider byte stream.
//!
//! Network chunks split at arbitrary byte offsets, including in the middle of
//! a multi-byte character. The decoder holds the incomplete trailing sequence
//! across calls and prepends it to the next chunk, so a split never produces
//! a replacement character. Genuinely invalid bytes decode to U+FFFD instead
//! of aborting the stream.

/// Stateful streaming UTF-8 decoder. One instance per in-flight request.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    /// Incomplete trailing multi-byte sequence carried to the next chunk.
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes one chunk, returning all text that is complete so far.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    return out;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // valid_up_to guarantees this slice is well-formed
                    out.push_str(&String::from_utf8_lossy(valid));

                    match e.error_len() {
                        // Invalid sequence: substitute and continue past it.
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        // Incomplete trailing sequence: keep for the next chunk.
                        None => {
                            self.pending = after.to_vec();
                            return out;
                        }
                    }
                }
            }
        }
    }

    /// Flushes any unterminated trailing bytes at end of stream.
    /// A dangling partial sequence at EOF is invalid and becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "第一步：分析面试表现优点，继续努力！emoji: 🎉 end";

    fn decode_in_chunks(text: &str, split_every: usize) -> String {
        let bytes = text.as_bytes();
        let mut decoder = Utf8StreamDecoder::new();
        let mut out = String::new();
        for chunk in bytes.chunks(split_every) {
            out.push_str(&decoder.decode(chunk));
        }
        out.push_str(&decoder.finish());
        out
    }

    #[test]
    fn test_split_at_every_offset_matches_whole_decode() {
        for split in 1..=SAMPLE.len() {
            assert_eq!(decode_in_chunks(SAMPLE, split), SAMPLE, "split={split}");
        }
    }

    #[test]
    fn test_mid_character_split_emits_nothing_early() {
        // "第" is three bytes; feed the first two alone.
        let bytes = "第".as_bytes();
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.decode(&bytes[..2]), "");
        assert_eq!(decoder.decode(&bytes[2..]), "第");
    }

    #[test]
    fn test_invalid_byte_becomes_replacement_character() {
        let mut decoder = Utf8StreamDecoder::new();
        let out = decoder.decode(&[b'a', 0xFF, b'b']);
        assert_eq!(out, "a\u{FFFD}b");
    }

    #[test]
    fn test_dangling_partial_sequence_at_eof() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.decode(&"第".as_bytes()[..1]), "");
        assert_eq!(decoder.finish(), "\u{FFFD}");
    }

    #[test]
    fn test_invalid_continuation_inside_valid_text() {
        // 0xE4 starts a 3-byte sequence but is followed by ASCII.
        let mut decoder = Utf8StreamDecoder::new();
        let out = decoder.decode(&[0xE4, b'x', b'y']);
        assert_eq!(out, "\u{FFFD}xy");
    }
}

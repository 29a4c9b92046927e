//! SSE record splitting and provider envelope unwrapping.
//!
//! The upstream provider speaks `data: <json>\n\n` records terminated by the
//! literal `[DONE]` sentinel. A record may straddle chunk boundaries, so the
//! splitter carries the unterminated tail across calls. Payloads that fail to
//! parse as JSON (keep-alive pings, provider metadata) are skipped, never
//! fatal.

use serde::Deserialize;
use tracing::debug;

/// Terminal marker: no further deltas will arrive on this stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Splits decoded text into complete `data:` payloads, buffering any line not
/// yet terminated by a newline.
#[derive(Debug, Default)]
pub struct SseLineSplitter {
    carry: String,
}

impl SseLineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one decoded text fragment, returning every payload whose line is
    /// now complete. Lines without a `data:` prefix are ignored.
    pub fn push(&mut self, fragment: &str) -> Vec<String> {
        self.carry.push_str(fragment);

        let mut payloads = Vec::new();
        while let Some(newline) = self.carry.find('\n') {
            let line: String = self.carry.drain(..=newline).collect();
            if let Some(payload) = extract_data_payload(&line) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Drains a final unterminated line once the transport has closed.
    pub fn finish(&mut self) -> Option<String> {
        let tail = std::mem::take(&mut self.carry);
        extract_data_payload(&tail)
    }
}

fn extract_data_payload(line: &str) -> Option<String> {
    let trimmed = line.trim();
    trimmed.strip_prefix("data: ").map(|p| p.to_string())
}

/// Outcome of unwrapping one non-sentinel SSE payload.
///
/// Matched exhaustively by the relay: a parse failure skips the record, a
/// missing delta counts as consumed with zero content.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderRecord {
    /// The envelope carried an incremental content fragment.
    Delta(String),
    /// Valid envelope, but no `choices[0].delta.content` present.
    NoContent,
    /// Not valid JSON (keep-alive or provider metadata); skipped.
    Unparsed,
}

#[derive(Debug, Deserialize)]
struct ProviderEnvelope {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Option<Delta>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

/// Parses one payload as a provider envelope and extracts the content delta.
pub fn unwrap_payload(payload: &str) -> ProviderRecord {
    let envelope: ProviderEnvelope = match serde_json::from_str(payload) {
        Ok(e) => e,
        Err(e) => {
            debug!("Skipping non-JSON SSE payload: {e}");
            return ProviderRecord::Unparsed;
        }
    };

    match envelope
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta)
        .and_then(|d| d.content)
    {
        Some(content) => ProviderRecord::Delta(content),
        None => ProviderRecord::NoContent,
    }
}

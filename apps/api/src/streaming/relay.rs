//! The streaming analysis pipeline.
//!
//! Consumes the provider's chunked SSE response, re-emits each content delta
//! immediately as a tagged event, and accumulates the full text. Once the
//! stream completes (sentinel seen or transport closed) the accumulated text
//! is run through the parser chain and the final analysis is emitted.
//!
//! A transport error mid-stream discards the accumulated text and emits a
//! single Error event: no partial analysis is ever synthesized from an
//! aborted stream. Dropping the receiver cancels the pipeline and releases
//! the upstream connection.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::analysis::parse_streaming_result;
use crate::models::interview::InterviewAnalysis;
use crate::streaming::decoder::Utf8StreamDecoder;
use crate::streaming::sse::{unwrap_payload, ProviderRecord, SseLineSplitter, DONE_SENTINEL};

/// Tagged events produced by one analysis pipeline, in stream order:
/// zero or more Chunks, then exactly one Complete or Error.
#[derive(Debug)]
pub enum AnalysisEvent {
    /// One extracted provider delta, forwarded as soon as it arrives.
    Chunk(String),
    /// Stream finished; accumulated text parsed into the final analysis.
    Complete(Box<InterviewAnalysis>),
    /// Unrecoverable transport failure; no analysis is available.
    Error(String),
}

/// Spawns the pipeline over a live provider response and returns the event
/// channel. The caller owns cancellation: dropping the receiver stops the
/// pipeline on its next send.
pub fn spawn_pipeline(response: reqwest::Response) -> mpsc::Receiver<AnalysisEvent> {
    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(async move {
        pump(response.bytes_stream(), tx).await;
    });
    rx
}

/// Drives the decode → split → unwrap → (re-emit / accumulate) loop.
/// Generic over the byte source so tests can feed synthetic chunk splits.
pub async fn pump<S, E>(stream: S, tx: mpsc::Sender<AnalysisEvent>)
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    let mut stream = stream;
    let mut decoder = Utf8StreamDecoder::new();
    let mut splitter = SseLineSplitter::new();
    let mut accumulated = String::new();

    let mut sentinel_seen = false;
    while !sentinel_seen {
        // Poll the receiver's side alongside the read: a dropped receiver
        // must release the upstream connection immediately, even while the
        // provider is idle.
        let item = tokio::select! {
            item = stream.next() => item,
            _ = tx.closed() => {
                debug!("Receiver dropped; cancelling pipeline");
                return;
            }
        };
        match item {
            None => break,
            Some(Err(e)) => {
                warn!("Provider stream failed mid-flight: {e}");
                let _ = tx
                    .send(AnalysisEvent::Error(format!("流式读取失败: {e}")))
                    .await;
                return;
            }
            Some(Ok(bytes)) => {
                let text = decoder.decode(&bytes);
                for payload in splitter.push(&text) {
                    if payload == DONE_SENTINEL {
                        sentinel_seen = true;
                        break;
                    }
                    if !consume_payload(&payload, &mut accumulated, &tx).await {
                        debug!("Receiver dropped; cancelling pipeline");
                        return;
                    }
                }
            }
        }
    }

    // Transport closed without the sentinel: flush the carried tail so a
    // final unterminated record is not lost.
    if !sentinel_seen {
        let mut tail = splitter.push(&decoder.finish());
        tail.extend(splitter.finish());
        for payload in tail {
            if payload == DONE_SENTINEL {
                break;
            }
            if !consume_payload(&payload, &mut accumulated, &tx).await {
                return;
            }
        }
    }

    info!(
        "Provider stream complete, accumulated {} chars",
        accumulated.chars().count()
    );

    let analysis = parse_streaming_result(&accumulated);
    let _ = tx.send(AnalysisEvent::Complete(Box::new(analysis))).await;
}

/// Unwraps one payload, accumulating and re-emitting its delta.
/// Returns false once the receiver is gone.
async fn consume_payload(
    payload: &str,
    accumulated: &mut String,
    tx: &mpsc::Sender<AnalysisEvent>,
) -> bool {
    match unwrap_payload(payload) {
        ProviderRecord::Delta(content) => {
            accumulated.push_str(&content);
            if content.is_empty() {
                return true; // empty deltas are valid no-ops
            }
            tx.send(AnalysisEvent::Chunk(content)).await.is_ok()
        }
        ProviderRecord::NoContent | ProviderRecord::Unparsed => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use std::convert::Infallible;

    fn sse_chunks(records: &[&str]) -> Vec<Result<Bytes, Infallible>> {
        records
            .iter()
            .map(|r| Ok(Bytes::from(format!("data: {r}\n\n"))))
            .collect()
    }

    async fn collect_events(chunks: Vec<Result<Bytes, Infallible>>) -> Vec<AnalysisEvent> {
        let (tx, mut rx) = mpsc::channel(64);
        pump(stream::iter(chunks), tx).await;
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_two_deltas_then_done_emits_two_chunks_then_complete() {
        let chunks = sse_chunks(&[
            r#"{"choices":[{"delta":{"content":"第一步"}}]}"#,
            r#"{"choices":[{"delta":{"content":"第二步"}}]}"#,
            DONE_SENTINEL,
        ]);
        let events = collect_events(chunks).await;

        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], AnalysisEvent::Chunk(c) if c == "第一步"));
        assert!(matches!(&events[1], AnalysisEvent::Chunk(c) if c == "第二步"));
        assert!(matches!(&events[2], AnalysisEvent::Complete(_)));
    }

    #[tokio::test]
    async fn test_one_chunk_per_envelope_in_order() {
        let chunks = sse_chunks(&[
            r#"{"choices":[{"delta":{"content":"a"}}]}"#,
            r#"{"choices":[{"delta":{}}]}"#,
            r#"{"choices":[{"delta":{"content":""}}]}"#,
            r#"{"choices":[{"delta":{"content":"b"}}]}"#,
            DONE_SENTINEL,
        ]);
        let events = collect_events(chunks).await;

        let texts: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                AnalysisEvent::Chunk(c) => Some(c.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_record_split_across_byte_chunks() {
        // One logical record delivered in three byte chunks, split inside a
        // multi-byte character of the delta text.
        let record = "data: {\"choices\":[{\"delta\":{\"content\":\"你好\"}}]}\n\n";
        let bytes = record.as_bytes();
        let chunks: Vec<Result<Bytes, Infallible>> = vec![
            Ok(Bytes::copy_from_slice(&bytes[..41])),
            Ok(Bytes::copy_from_slice(&bytes[41..43])),
            Ok(Bytes::copy_from_slice(&bytes[43..])),
            Ok(Bytes::from("data: [DONE]\n\n")),
        ];
        let events = collect_events(chunks).await;

        assert!(matches!(&events[0], AnalysisEvent::Chunk(c) if c == "你好"));
        assert!(matches!(events.last(), Some(AnalysisEvent::Complete(_))));
    }

    #[tokio::test]
    async fn test_non_json_payloads_are_skipped() {
        let chunks = sse_chunks(&[
            "keep-alive",
            r#"{"choices":[{"delta":{"content":"ok"}}]}"#,
            DONE_SENTINEL,
        ]);
        let events = collect_events(chunks).await;
        assert!(matches!(&events[0], AnalysisEvent::Chunk(c) if c == "ok"));
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn test_transport_error_emits_error_and_no_complete() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from(
                "data: {\"choices\":[{\"delta\":{\"content\":\"部分\"}}]}\n\n",
            )),
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )),
        ];
        let (tx, mut rx) = mpsc::channel(64);
        pump(stream::iter(chunks), tx).await;

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert!(matches!(&events[0], AnalysisEvent::Chunk(_)));
        assert!(matches!(&events[1], AnalysisEvent::Error(_)));
        assert!(!events.iter().any(|e| matches!(e, AnalysisEvent::Complete(_))));
    }

    #[tokio::test]
    async fn test_dropped_receiver_cancels_idle_pipeline() {
        // The source never ends: one delta, then it stays pending, like a
        // provider that has gone quiet mid-stream. Hanging up must unpark
        // the pipeline and let it return rather than hold the connection.
        let source = stream::iter(sse_chunks(&[
            r#"{"choices":[{"delta":{"content":"第一步"}}]}"#,
        ]))
        .chain(stream::pending());

        let (tx, mut rx) = mpsc::channel(64);
        let task = tokio::spawn(pump(source, tx));

        let first = rx.recv().await.expect("first chunk");
        assert!(matches!(first, AnalysisEvent::Chunk(c) if c == "第一步"));
        drop(rx);

        tokio::time::timeout(std::time::Duration::from_secs(1), task)
            .await
            .expect("pipeline task did not stop after receiver was dropped")
            .unwrap();
    }

    #[tokio::test]
    async fn test_transport_close_without_sentinel_still_completes() {
        let chunks: Vec<Result<Bytes, Infallible>> = vec![Ok(Bytes::from(
            "data: {\"choices\":[{\"delta\":{\"content\":\"未完\"}}]}\n\n",
        ))];
        let events = collect_events(chunks).await;
        assert!(matches!(&events[0], AnalysisEvent::Chunk(c) if c == "未完"));
        assert!(matches!(&events[1], AnalysisEvent::Complete(_)));
    }
}

// Streaming ingestion pipeline: provider bytes → decoded text → SSE records
// → content deltas, re-emitted chunk-by-chunk and accumulated for parsing.

pub mod decoder;
pub mod relay;
pub mod sse;

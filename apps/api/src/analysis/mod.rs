// AI analysis of interview records.
// Implements: strategy-chain parsing of model output, result enhancement,
// and the streaming + one-shot analyze endpoints.
// All LLM calls go through llm_client — no direct provider calls here.

pub mod enhancer;
pub mod handlers;
pub mod parser;

pub use parser::parse_streaming_result;

// Extraction: raw text -> generation backend -> normalized record.
// All LLM calls go through llm_client; no direct Gemini calls here.

pub mod handlers;
pub mod pipeline;
pub mod prompts;

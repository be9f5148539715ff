// Resume core: schema, response normalization, template heuristic, store and export.
// Nothing in here performs I/O; the backend call lives in llm_client and extraction.

pub mod docx_export;
pub mod export;
pub mod normalize;
pub mod schema;
pub mod store;
pub mod template;

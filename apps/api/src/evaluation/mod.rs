// Resume evaluation: extract → prompt → generate → parse → aggregate.
// All model calls go through llm_client::TextGenerator.

pub mod extractor;
pub mod handlers;
pub mod page;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod submission;
pub mod table;

//! Foreman agent runtime - configuration lookup, generation, validation.
//!
//! This crate turns a named agent (prompt template + target model +
//! temperature, resolved from a configuration store) into one reusable
//! operation: render the prompt, call the generation service, validate the
//! output against the expected schema, rescue structured data from free
//! text when strict decoding was not honored.
//!
//! # Architecture
//!
//! 1. **Store** (`store`) - resolves agent and model records, fresh per
//!    invocation, no caching.
//! 2. **Client** (`llm`, `gemini`) - one boundary call to the generation
//!    service, optionally with a constrained-decoding response schema.
//! 3. **Validation** (`validate`) - schema descriptors that check direct
//!    structured output first and fall back to fence extraction + JSON
//!    parse; all failures carry the offending raw text.
//! 4. **Runner** (`runner`) - composes the three into `run(agent, input,
//!    schema)`.
//! 5. **Engine** (`engine`) - the fixed agent identities: task classifier,
//!    project manager (decision over full history, clamped by the inferred
//!    conversation phase), architect, engineer.
//!
//! Everything is injected through `Arc<dyn ConfigStore>` and
//! `Arc<dyn GenerationClient>` handles so tests substitute fakes freely.

pub mod engine;
pub mod gemini;
pub mod llm;
pub mod prompts;
pub mod runner;
pub mod store;
pub mod validate;

pub use engine::AgentEngine;
pub use gemini::GeminiClient;
pub use llm::{GenerationClient, GenerationError, GenerationRequest, GenerationResult};
pub use runner::{AgentInput, AgentRunner};
pub use store::{AgentRecord, ConfigStore, FileStore, InMemoryStore, ModelRecord};
pub use validate::{AgentOutput, OutputSchema};

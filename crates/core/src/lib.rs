//! Foreman core - typed contracts for the multi-agent orchestration engine
//!
//! This crate holds everything the rest of the system must be able to trust:
//!
//! - **Schemas** (`schema`) - the structured values agents produce
//!   (`Classification`, `Decision`, `Plan`, `CodeFile`) with their
//!   structural invariants.
//! - **History** (`history`) - the full conversation supplied per call,
//!   with message content as an explicit tagged union rather than a loose
//!   JSON value.
//! - **Phase** (`phase`) - the conversation state machine inferred from
//!   history content, so routing constraints are enforced in code instead
//!   of relying entirely on prompt instructions.
//! - **Extraction** (`extract`) - the repair path that recovers a JSON
//!   payload from free-form model text.
//! - **Errors** (`errors`) - the failure taxonomy shared across crates.
//! - **Config** (`config`) - application configuration with TOML file and
//!   environment overrides.
//!
//! # Safety principle
//!
//! The language model is a probabilistic boundary. Nothing it emits is used
//! until it has passed through schema validation, and no routing decision
//! it makes can outrun the phase the conversation has actually reached.

pub mod config;
pub mod errors;
pub mod extract;
pub mod history;
pub mod phase;
pub mod schema;

pub use errors::{AgentError, ConfigKind};
pub use extract::extract_structured;
pub use history::{History, Message, MessageContent, Role};
pub use phase::ConversationPhase;
pub use schema::{Classification, CodeFile, Decision, DecisionAction, Plan};

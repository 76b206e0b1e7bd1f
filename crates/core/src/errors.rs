use std::fmt;

use thiserror::Error;

/// Which configuration collection a lookup failed against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigKind {
    Agent,
    Model,
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agent => formatter.write_str("agent"),
            Self::Model => formatter.write_str("model"),
        }
    }
}

/// Failure taxonomy for a single agent invocation.
///
/// No variant is retried or recovered internally; every failure aborts the
/// current invocation and is surfaced to the caller. `InvalidOutput` carries
/// the offending raw model text so operators can diagnose schema drift
/// without re-running the request.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AgentError {
    #[error("{kind} configuration `{id}` was not found")]
    ConfigNotFound { kind: ConfigKind, id: String },

    #[error("unsupported model provider `{provider}` (only `google` is supported)")]
    UnsupportedProvider { provider: String },

    #[error("configuration store unavailable: {detail}")]
    StoreUnavailable { detail: String },

    #[error("generation failed for agent `{agent_id}`: {reason}")]
    GenerationFailed { agent_id: String, reason: String },

    #[error("output did not match the expected `{expected}` shape: {detail}")]
    InvalidOutput {
        expected: &'static str,
        detail: String,
        raw: String,
    },
}

impl AgentError {
    pub fn invalid_output(
        expected: &'static str,
        detail: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Self::InvalidOutput { expected, detail: detail.into(), raw: raw.into() }
    }

    /// Whether the failure points at deployment configuration rather than a
    /// per-call model problem.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::UnsupportedProvider { .. }
                | Self::StoreUnavailable { .. }
        )
    }
}

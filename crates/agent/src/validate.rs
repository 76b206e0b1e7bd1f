//! Output validation: strict first, fence-extraction fallback second.
//!
//! Constrained decoding is not always honored by the model for every schema
//! shape, so the free-text path (extract a json fence, parse, validate) is
//! a required fallback, not an optimization. Every failure carries the
//! offending raw text for diagnostics.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use foreman_core::errors::AgentError;
use foreman_core::extract::extract_structured;
use foreman_core::schema::{Classification, CodeFile, Decision, Plan};

/// Expected-shape descriptor, one variant per output kind. Used both to
/// request constrained decoding and to validate the result afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputSchema {
    Classification,
    Decision,
    Plan,
    CodeFile,
}

/// A validated, fully typed agent output.
#[derive(Clone, Debug, PartialEq)]
pub enum AgentOutput {
    Classification(Classification),
    Decision(Decision),
    Plan(Plan),
    CodeFile(CodeFile),
}

impl OutputSchema {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Classification => "Classification",
            Self::Decision => "Decision",
            Self::Plan => "Plan",
            Self::CodeFile => "CodeFile",
        }
    }

    /// JSON schema sent as the constrained-decoding hint.
    pub fn response_schema(&self) -> Value {
        match self {
            Self::Classification => json!({
                "type": "string",
                "enum": Classification::WIRE_VALUES,
            }),
            Self::Decision => json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": ["reply_to_user", "call_architect", "call_engineer"],
                    },
                    "text": {"type": "string"},
                    "task": {"type": "string"},
                },
                "required": ["action", "text"],
            }),
            Self::Plan => json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string"},
                    "steps": {
                        "type": "array",
                        "items": {"type": "string"},
                        "minItems": 1,
                        "maxItems": Plan::MAX_STEPS,
                    },
                },
                "required": ["title", "steps"],
            }),
            Self::CodeFile => json!({
                "type": "object",
                "properties": {
                    "filename": {"type": "string"},
                    "code": {"type": "string"},
                },
                "required": ["filename", "code"],
            }),
        }
    }

    /// Validate a generation result against this schema.
    ///
    /// Policy, in order: direct structured value if the service honored
    /// constrained decoding; otherwise fence extraction + JSON parse over
    /// the raw text. The classification case is a plain enum: trim and
    /// check exact membership, no JSON step.
    pub fn validate(
        &self,
        structured: Option<&Value>,
        raw_text: &str,
    ) -> Result<AgentOutput, AgentError> {
        match self {
            Self::Classification => self.validate_classification(structured, raw_text),
            Self::Decision => {
                let decision: Decision = self.decode(structured, raw_text)?;
                decision
                    .check_invariants()
                    .map_err(|detail| AgentError::invalid_output(self.name(), detail, raw_text))?;
                Ok(AgentOutput::Decision(decision))
            }
            Self::Plan => {
                let plan: Plan = self.decode(structured, raw_text)?;
                plan.check_invariants()
                    .map_err(|detail| AgentError::invalid_output(self.name(), detail, raw_text))?;
                Ok(AgentOutput::Plan(plan))
            }
            Self::CodeFile => {
                let file: CodeFile = self.decode(structured, raw_text)?;
                file.check_invariants()
                    .map_err(|detail| AgentError::invalid_output(self.name(), detail, raw_text))?;
                Ok(AgentOutput::CodeFile(file))
            }
        }
    }

    fn validate_classification(
        &self,
        structured: Option<&Value>,
        raw_text: &str,
    ) -> Result<AgentOutput, AgentError> {
        let candidate = match structured {
            Some(Value::String(value)) => value.as_str(),
            _ => raw_text,
        };
        let trimmed = candidate.trim();
        Classification::parse(trimmed)
            .map(AgentOutput::Classification)
            .ok_or_else(|| {
                AgentError::invalid_output(
                    self.name(),
                    format!("`{trimmed}` is not one of {:?}", Classification::WIRE_VALUES),
                    raw_text,
                )
            })
    }

    fn decode<T: DeserializeOwned>(
        &self,
        structured: Option<&Value>,
        raw_text: &str,
    ) -> Result<T, AgentError> {
        if let Some(value) = structured {
            return serde_json::from_value(value.clone())
                .map_err(|error| AgentError::invalid_output(self.name(), error.to_string(), raw_text));
        }

        let candidate = extract_structured(raw_text);
        let value: Value = serde_json::from_str(candidate).map_err(|error| {
            AgentError::invalid_output(
                self.name(),
                format!("raw text is not valid JSON: {error}"),
                raw_text,
            )
        })?;
        serde_json::from_value(value)
            .map_err(|error| AgentError::invalid_output(self.name(), error.to_string(), raw_text))
    }
}

impl AgentOutput {
    pub fn into_classification(self) -> Option<Classification> {
        match self {
            Self::Classification(classification) => Some(classification),
            _ => None,
        }
    }

    pub fn into_decision(self) -> Option<Decision> {
        match self {
            Self::Decision(decision) => Some(decision),
            _ => None,
        }
    }

    pub fn into_plan(self) -> Option<Plan> {
        match self {
            Self::Plan(plan) => Some(plan),
            _ => None,
        }
    }

    pub fn into_code_file(self) -> Option<CodeFile> {
        match self {
            Self::CodeFile(file) => Some(file),
            _ => None,
        }
    }
}

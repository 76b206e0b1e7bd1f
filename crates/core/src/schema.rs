//! Structured output contracts for every agent kind.
//!
//! Each type carries its own structural invariants beyond what serde can
//! check, exposed via `check_invariants`. Validation of raw model output
//! against these types lives in the agent crate; the types themselves stay
//! transport- and model-agnostic.

use serde::{Deserialize, Serialize};

/// Classification of a single user message, exact wire values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    TaskRequest,
    Chitchat,
    Clarification,
}

impl Classification {
    pub const WIRE_VALUES: [&'static str; 3] = ["task_request", "chitchat", "clarification"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskRequest => "task_request",
            Self::Chitchat => "chitchat",
            Self::Clarification => "clarification",
        }
    }

    /// Case-sensitive exact membership check. Callers trim first; no other
    /// normalization is applied.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "task_request" => Some(Self::TaskRequest),
            "chitchat" => Some(Self::Chitchat),
            "clarification" => Some(Self::Clarification),
            _ => None,
        }
    }
}

/// The next action the project manager has chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    ReplyToUser,
    CallArchitect,
    CallEngineer,
}

/// Routing decision emitted by the project manager over full history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub action: DecisionAction,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
}

impl Decision {
    pub fn reply_to_user(text: impl Into<String>) -> Self {
        Self { action: DecisionAction::ReplyToUser, text: text.into(), task: None }
    }

    /// Delegation actions must carry the task they delegate.
    pub fn check_invariants(&self) -> Result<(), String> {
        match self.action {
            DecisionAction::ReplyToUser => Ok(()),
            DecisionAction::CallArchitect | DecisionAction::CallEngineer => {
                match self.task.as_deref() {
                    Some(task) if !task.trim().is_empty() => Ok(()),
                    _ => Err("delegation decision is missing a non-empty `task`".to_owned()),
                }
            }
        }
    }
}

/// Ordered plan produced by the architect for a confirmed task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub title: String,
    pub steps: Vec<String>,
}

impl Plan {
    pub const MAX_STEPS: usize = 5;

    pub fn check_invariants(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("plan `title` must be non-empty".to_owned());
        }
        if self.steps.is_empty() || self.steps.len() > Self::MAX_STEPS {
            return Err(format!(
                "plan must contain between 1 and {} steps, got {}",
                Self::MAX_STEPS,
                self.steps.len()
            ));
        }
        if self.steps.iter().any(|step| step.trim().is_empty()) {
            return Err("plan steps must all be non-empty".to_owned());
        }
        Ok(())
    }
}

/// A complete source file produced by the engineer.
///
/// Completeness (no truncation) is a prompt-level contract; the core only
/// enforces the structurally checkable parts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFile {
    pub filename: String,
    pub code: String,
}

impl CodeFile {
    pub fn check_invariants(&self) -> Result<(), String> {
        let filename = self.filename.trim();
        if filename.is_empty() {
            return Err("code file `filename` must be non-empty".to_owned());
        }
        if !filename.contains('.') || filename.ends_with('.') {
            return Err(format!("code file `filename` must have an extension: `{filename}`"));
        }
        if self.code.trim().is_empty() {
            return Err("code file `code` must be non-empty".to_owned());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Classification, CodeFile, Decision, DecisionAction, Plan};

    #[test]
    fn classification_wire_values_are_exact_and_case_sensitive() {
        assert_eq!(Classification::parse("task_request"), Some(Classification::TaskRequest));
        assert_eq!(Classification::parse("chitchat"), Some(Classification::Chitchat));
        assert_eq!(Classification::parse("clarification"), Some(Classification::Clarification));
        assert_eq!(Classification::parse("Chitchat"), None);
        assert_eq!(Classification::parse("chitchat "), None);
        assert_eq!(Classification::parse("greeting"), None);
    }

    #[test]
    fn classification_serde_round_trip_uses_wire_values() {
        let json = serde_json::to_string(&Classification::TaskRequest).unwrap();
        assert_eq!(json, "\"task_request\"");
        let parsed: Classification = serde_json::from_str("\"clarification\"").unwrap();
        assert_eq!(parsed, Classification::Clarification);
    }

    #[test]
    fn reply_decision_needs_no_task() {
        let decision = Decision::reply_to_user("What should the app do?");
        assert!(decision.check_invariants().is_ok());
    }

    #[test]
    fn delegation_without_task_violates_invariant() {
        let decision = Decision {
            action: DecisionAction::CallArchitect,
            text: "On it.".to_owned(),
            task: None,
        };
        assert!(decision.check_invariants().is_err());

        let blank_task = Decision {
            action: DecisionAction::CallEngineer,
            text: "On it.".to_owned(),
            task: Some("   ".to_owned()),
        };
        assert!(blank_task.check_invariants().is_err());
    }

    #[test]
    fn unknown_action_fails_deserialization() {
        let raw = "{\"action\": \"call_designer\", \"text\": \"hi\"}";
        assert!(serde_json::from_str::<Decision>(raw).is_err());
    }

    #[test]
    fn plan_step_bounds_are_enforced() {
        let plan = Plan { title: "To-do API".to_owned(), steps: vec!["Define routes".to_owned()] };
        assert!(plan.check_invariants().is_ok());

        let empty = Plan { title: "To-do API".to_owned(), steps: Vec::new() };
        assert!(empty.check_invariants().is_err());

        let oversized = Plan {
            title: "To-do API".to_owned(),
            steps: (0..6).map(|index| format!("step {index}")).collect(),
        };
        assert!(oversized.check_invariants().is_err());

        let blank_step = Plan {
            title: "To-do API".to_owned(),
            steps: vec!["Define routes".to_owned(), "  ".to_owned()],
        };
        assert!(blank_step.check_invariants().is_err());
    }

    #[test]
    fn code_file_requires_extension_and_contents() {
        let file = CodeFile { filename: "main.rs".to_owned(), code: "fn main() {}".to_owned() };
        assert!(file.check_invariants().is_ok());

        let no_extension =
            CodeFile { filename: "Makefile".to_owned(), code: "all:".to_owned() };
        assert!(no_extension.check_invariants().is_err());

        let trailing_dot = CodeFile { filename: "main.".to_owned(), code: "x".to_owned() };
        assert!(trailing_dot.check_invariants().is_err());

        let empty_code = CodeFile { filename: "main.rs".to_owned(), code: "\n".to_owned() };
        assert!(empty_code.check_invariants().is_err());
    }
}

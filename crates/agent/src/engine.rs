//! The fixed agent identities and the decision engine.
//!
//! The decision engine is a specialization of the runner bound to the
//! project manager: input is the full history, output is a routing
//! decision. It is a single-step state machine - classify the history,
//! emit one `Decision` - with the caller responsible for applying side
//! effects and re-invoking on the next turn; the engine never loops
//! internally.

use std::sync::Arc;

use tracing::info;

use foreman_core::errors::AgentError;
use foreman_core::history::History;
use foreman_core::phase::ConversationPhase;
use foreman_core::schema::{Classification, CodeFile, Decision, DecisionAction, Plan};

use crate::llm::GenerationClient;
use crate::runner::{AgentInput, AgentRunner};
use crate::store::ConfigStore;
use crate::validate::{AgentOutput, OutputSchema};

pub const TASK_CLASSIFIER_ID: &str = "task-classifier";
pub const PROJECT_MANAGER_ID: &str = "project-manager";
pub const ARCHITECT_ID: &str = "architect";
pub const ENGINEER_ID: &str = "engineer";

/// What the engine says when history is empty and there is nothing to
/// classify yet.
const OPENING_REPLY: &str = "Hi! Tell me what you'd like to build and we'll take it from there.";

/// Reply used when a delegation decision outruns the conversation phase.
const HOLD_ON_REPLY: &str =
    "Before I hand this off, could you confirm the goal and give me the go-ahead?";

pub struct AgentEngine {
    runner: AgentRunner,
}

impl AgentEngine {
    pub fn new(store: Arc<dyn ConfigStore>, client: Arc<dyn GenerationClient>) -> Self {
        Self { runner: AgentRunner::new(store, client) }
    }

    /// Classify a single user message into the fixed intent categories.
    pub async fn classify(&self, message: &str) -> Result<Classification, AgentError> {
        let output = self
            .runner
            .run(TASK_CLASSIFIER_ID, AgentInput::Task(message), OutputSchema::Classification)
            .await?;
        expect(output.into_classification(), TASK_CLASSIFIER_ID)
    }

    /// Inspect the conversation and pick the next action.
    ///
    /// Delegation is gated twice: the prompt contract instructs the model
    /// to ask rather than guess, and the inferred phase clamps whatever
    /// comes back - `call_architect` needs an authorized goal,
    /// `call_engineer` needs an approved plan. Empty history never reaches
    /// the model at all.
    pub async fn decide(&self, history: &History) -> Result<Decision, AgentError> {
        if history.is_empty() {
            return Ok(Decision::reply_to_user(OPENING_REPLY));
        }

        let phase = ConversationPhase::infer(history);
        let output = self
            .runner
            .run(
                PROJECT_MANAGER_ID,
                AgentInput::Conversation { history, phase },
                OutputSchema::Decision,
            )
            .await?;
        let decision = expect(output.into_decision(), PROJECT_MANAGER_ID)?;

        Ok(clamp_decision(decision, phase))
    }

    /// Produce a plan (at most five steps) for a confirmed task.
    pub async fn plan(&self, task: &str) -> Result<Plan, AgentError> {
        let output =
            self.runner.run(ARCHITECT_ID, AgentInput::Task(task), OutputSchema::Plan).await?;
        expect(output.into_plan(), ARCHITECT_ID)
    }

    /// Produce one complete source file for a build task.
    pub async fn generate_code(&self, task: &str) -> Result<CodeFile, AgentError> {
        let output =
            self.runner.run(ENGINEER_ID, AgentInput::Task(task), OutputSchema::CodeFile).await?;
        expect(output.into_code_file(), ENGINEER_ID)
    }
}

fn expect<T>(output: Option<T>, agent_id: &str) -> Result<T, AgentError> {
    output.ok_or_else(|| AgentError::GenerationFailed {
        agent_id: agent_id.to_owned(),
        reason: "validated output had an unexpected kind".to_owned(),
    })
}

/// Enforce workflow ordering in code: a delegation the phase does not yet
/// support is downgraded to a reply (ask rather than guess).
fn clamp_decision(decision: Decision, phase: ConversationPhase) -> Decision {
    let allowed = match decision.action {
        DecisionAction::ReplyToUser => true,
        DecisionAction::CallArchitect => phase == ConversationPhase::Authorized,
        DecisionAction::CallEngineer => phase == ConversationPhase::Executing,
    };
    if allowed {
        return decision;
    }

    info!(
        event_name = "engine.decision.clamped",
        action = ?decision.action,
        phase = phase.as_str(),
        "delegation outran conversation phase; downgrading to reply"
    );

    let text = if decision.text.trim().is_empty() {
        HOLD_ON_REPLY.to_owned()
    } else {
        decision.text
    };
    Decision::reply_to_user(text)
}

#[cfg(test)]
mod tests {
    use foreman_core::phase::ConversationPhase;
    use foreman_core::schema::{Decision, DecisionAction};

    use super::clamp_decision;

    fn delegation(action: DecisionAction) -> Decision {
        Decision { action, text: "Handing off.".to_owned(), task: Some("build it".to_owned()) }
    }

    #[test]
    fn reply_is_never_clamped() {
        let decision = Decision::reply_to_user("What should it do?");
        let clamped = clamp_decision(decision.clone(), ConversationPhase::Clarifying);
        assert_eq!(clamped, decision);
    }

    #[test]
    fn architect_call_requires_authorized_phase() {
        let clamped =
            clamp_decision(delegation(DecisionAction::CallArchitect), ConversationPhase::Confirmed);
        assert_eq!(clamped.action, DecisionAction::ReplyToUser);
        assert_eq!(clamped.text, "Handing off.");
        assert!(clamped.task.is_none());

        let allowed =
            clamp_decision(delegation(DecisionAction::CallArchitect), ConversationPhase::Authorized);
        assert_eq!(allowed.action, DecisionAction::CallArchitect);
    }

    #[test]
    fn architect_call_after_plan_approval_is_downgraded() {
        let clamped =
            clamp_decision(delegation(DecisionAction::CallArchitect), ConversationPhase::Executing);
        assert_eq!(clamped.action, DecisionAction::ReplyToUser);
    }

    #[test]
    fn engineer_call_requires_an_approved_plan() {
        let clamped =
            clamp_decision(delegation(DecisionAction::CallEngineer), ConversationPhase::Planned);
        assert_eq!(clamped.action, DecisionAction::ReplyToUser);

        let allowed =
            clamp_decision(delegation(DecisionAction::CallEngineer), ConversationPhase::Executing);
        assert_eq!(allowed.action, DecisionAction::CallEngineer);
    }

    #[test]
    fn blank_text_gets_a_canned_clarification() {
        let decision = Decision {
            action: DecisionAction::CallArchitect,
            text: "  ".to_owned(),
            task: Some("x".to_owned()),
        };
        let clamped = clamp_decision(decision, ConversationPhase::Clarifying);
        assert_eq!(clamped.action, DecisionAction::ReplyToUser);
        assert!(clamped.text.contains("confirm the goal"));
    }
}

//! Conversation phase - an explicit state machine over implicit state.
//!
//! The project manager's workflow has five stages that the original design
//! only ever inferred through prompting. Making them an enumerated value
//! computed by a pure function gives the decision engine a language-level
//! guard to condition on: a delegation decision that outruns the phase the
//! conversation has actually reached is downgraded to a reply.
//!
//! Inference is heuristic by necessity (the signals live in free text), but
//! it is deterministic: the same history always yields the same phase.

use serde::{Deserialize, Serialize};

use crate::history::{History, MessageContent, Role};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    /// No confirmed goal yet; keep asking.
    Clarifying,
    /// Goal agreed, permission to plan not yet requested or granted.
    Confirmed,
    /// User granted permission to plan.
    Authorized,
    /// A plan has been presented and is awaiting approval.
    Planned,
    /// Plan approved; steps are being delegated to the engineer.
    Executing,
}

impl ConversationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clarifying => "clarifying",
            Self::Confirmed => "confirmed",
            Self::Authorized => "authorized",
            Self::Planned => "planned",
            Self::Executing => "executing",
        }
    }

    /// Scan the history chronologically and compute the reached phase.
    ///
    /// Later messages override earlier intent: a rejection after a plan
    /// drops back to `Authorized` so re-planning is possible.
    pub fn infer(history: &History) -> Self {
        let mut phase = Self::Clarifying;
        let mut plan_on_table = false;

        for message in history.messages() {
            match (&message.role, &message.content) {
                (Role::Assistant, MessageContent::Plan { .. }) => {
                    plan_on_table = true;
                    phase = phase.max(Self::Planned);
                }
                (Role::User, MessageContent::Text { text }) => {
                    let normalized = normalize(text);
                    if plan_on_table {
                        if signals_rejection(&normalized) {
                            plan_on_table = false;
                            phase = Self::Authorized;
                        } else if signals_approval(&normalized) {
                            phase = Self::Executing;
                        }
                    } else {
                        if phase == Self::Clarifying && signals_confirmation(&normalized) {
                            phase = Self::Confirmed;
                        }
                        if phase >= Self::Confirmed && signals_permission(&normalized) {
                            phase = phase.max(Self::Authorized);
                        }
                    }
                }
                _ => {}
            }
        }

        phase
    }
}

fn normalize(text: &str) -> String {
    text.to_ascii_lowercase()
}

fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split(|character: char| !character.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
}

fn has_token(normalized: &str, wanted: &[&str]) -> bool {
    tokens(normalized).any(|token| wanted.contains(&token))
}

fn has_phrase(normalized: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| normalized.contains(phrase))
}

fn signals_confirmation(normalized: &str) -> bool {
    has_token(normalized, &["yes", "yeah", "yep", "correct", "exactly", "confirmed"])
        || has_phrase(normalized, &["that's right", "thats right", "sounds right", "sounds good"])
}

fn signals_permission(normalized: &str) -> bool {
    has_phrase(
        normalized,
        &[
            "go ahead",
            "permission",
            "you may",
            "please plan",
            "make a plan",
            "create a plan",
            "create the plan",
            "plan it",
            "proceed",
        ],
    )
}

fn signals_approval(normalized: &str) -> bool {
    has_token(normalized, &["approved", "approve", "lgtm", "yes", "perfect"])
        || has_phrase(
            normalized,
            &["go ahead", "looks good", "ship it", "do it", "proceed", "start building"],
        )
}

fn signals_rejection(normalized: &str) -> bool {
    has_token(normalized, &["no", "reject", "rejected", "wrong"])
        || has_phrase(
            normalized,
            &["start over", "instead", "change the plan", "redo", "rework", "not what"],
        )
}

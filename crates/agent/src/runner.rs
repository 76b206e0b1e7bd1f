//! The generic agent runner: load config, render prompt, generate,
//! validate. One linear sequence per invocation, no internal retries, no
//! cross-request state.

use std::sync::Arc;

use tracing::{debug, warn};

use foreman_core::errors::AgentError;
use foreman_core::history::History;
use foreman_core::phase::ConversationPhase;

use crate::llm::{GenerationClient, GenerationRequest};
use crate::store::ConfigStore;
use crate::validate::{AgentOutput, OutputSchema};

const TASK_PLACEHOLDER: &str = "{task}";

/// What an agent is invoked with: a single task string, or the full
/// conversation plus its inferred phase.
#[derive(Clone, Copy, Debug)]
pub enum AgentInput<'a> {
    Task(&'a str),
    Conversation { history: &'a History, phase: ConversationPhase },
}

/// Composes the configuration store and the generation client into one
/// reusable operation parameterized by agent identity, input, and output
/// schema. Idempotent given identical input and a deterministic model
/// response.
#[derive(Clone)]
pub struct AgentRunner {
    store: Arc<dyn ConfigStore>,
    client: Arc<dyn GenerationClient>,
}

impl AgentRunner {
    pub fn new(store: Arc<dyn ConfigStore>, client: Arc<dyn GenerationClient>) -> Self {
        Self { store, client }
    }

    pub fn store(&self) -> &Arc<dyn ConfigStore> {
        &self.store
    }

    pub async fn run(
        &self,
        agent_id: &str,
        input: AgentInput<'_>,
        schema: OutputSchema,
    ) -> Result<AgentOutput, AgentError> {
        let agent = self.store.load_agent(agent_id).await?;
        let model = self.store.load_model(&agent.model_id).await?;

        let prompt = render_prompt(&agent.prompt, &input);
        debug!(
            event_name = "agent.run.start",
            agent_id,
            model_id = %agent.model_id,
            schema = schema.name(),
            prompt_chars = prompt.len(),
            "running agent"
        );

        let request = GenerationRequest::constrained(
            prompt,
            agent.model_id.clone(),
            model.temperature,
            schema.response_schema(),
        );

        let result = self.client.generate(request).await.map_err(|error| {
            AgentError::GenerationFailed { agent_id: agent_id.to_owned(), reason: error.to_string() }
        })?;

        if result.raw_text.trim().is_empty() && result.structured.is_none() {
            return Err(AgentError::GenerationFailed {
                agent_id: agent_id.to_owned(),
                reason: "model returned no usable output".to_owned(),
            });
        }

        let output = schema.validate(result.structured.as_ref(), &result.raw_text);
        if let Err(error) = &output {
            warn!(
                event_name = "agent.run.invalid_output",
                agent_id,
                schema = schema.name(),
                error = %error,
                "agent output failed validation"
            );
        }
        output
    }
}

/// Substitute the input into the template. Only the first `{task}`
/// occurrence is replaced; a template without the placeholder gets the task
/// appended. Conversation input is appended as labelled context together
/// with the inferred phase.
fn render_prompt(template: &str, input: &AgentInput<'_>) -> String {
    match input {
        AgentInput::Task(task) => {
            if template.contains(TASK_PLACEHOLDER) {
                template.replacen(TASK_PLACEHOLDER, task, 1)
            } else {
                format!("{template}\n\nTASK:\n{task}")
            }
        }
        AgentInput::Conversation { history, phase } => format!(
            "{template}\n\nCURRENT WORKFLOW PHASE: {}\n\nCONVERSATION SO FAR:\n{}",
            phase.as_str(),
            history.transcript()
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use foreman_core::errors::AgentError;
    use foreman_core::history::{History, Message};
    use foreman_core::phase::ConversationPhase;

    use crate::llm::{GenerationClient, GenerationError, GenerationRequest, GenerationResult};
    use crate::store::InMemoryStore;
    use crate::validate::OutputSchema;

    use super::{render_prompt, AgentInput, AgentRunner};

    struct ScriptedClient {
        responses: Mutex<Vec<GenerationResult>>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<GenerationResult>) -> Self {
            Self { responses: Mutex::new(responses), requests: Mutex::new(Vec::new()) }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GenerationClient for ScriptedClient {
        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> Result<GenerationResult, GenerationError> {
            self.requests.lock().unwrap().push(request);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(GenerationError::EmptyResponse);
            }
            Ok(responses.remove(0))
        }
    }

    fn runner_with(client: Arc<ScriptedClient>) -> AgentRunner {
        AgentRunner::new(Arc::new(InMemoryStore::defaults()), client)
    }

    #[test]
    fn task_placeholder_is_replaced_once() {
        let rendered =
            render_prompt("Build {task} and then {task}", &AgentInput::Task("an API"));
        assert_eq!(rendered, "Build an API and then {task}");
    }

    #[test]
    fn template_without_placeholder_gets_task_appended() {
        let rendered = render_prompt("Do the thing.", &AgentInput::Task("an API"));
        assert!(rendered.ends_with("TASK:\nan API"));
    }

    #[test]
    fn conversation_input_appends_phase_and_transcript() {
        let history = History::new(vec![Message::user("hello")]);
        let rendered = render_prompt(
            "Decide.",
            &AgentInput::Conversation { history: &history, phase: ConversationPhase::Clarifying },
        );
        assert!(rendered.contains("CURRENT WORKFLOW PHASE: clarifying"));
        assert!(rendered.contains("user: hello"));
    }

    #[tokio::test]
    async fn run_loads_config_generates_and_validates() {
        let client = Arc::new(ScriptedClient::new(vec![GenerationResult::structured(json!({
            "title": "To-do API",
            "steps": ["Define routes"]
        }))]));
        let runner = runner_with(client.clone());

        let output = runner
            .run("architect", AgentInput::Task("a to-do list API"), OutputSchema::Plan)
            .await
            .unwrap();

        assert_eq!(output.into_plan().unwrap().title, "To-do API");
        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gemini-2.5-flash");
        assert!(requests[0].prompt.contains("a to-do list API"));
        assert!(requests[0].response_schema.is_some());
    }

    #[tokio::test]
    async fn unknown_agent_aborts_before_any_generation_call() {
        let client = Arc::new(ScriptedClient::new(Vec::new()));
        let runner = runner_with(client.clone());

        let error = runner
            .run("designer", AgentInput::Task("x"), OutputSchema::Plan)
            .await
            .unwrap_err();

        assert!(matches!(error, AgentError::ConfigNotFound { .. }));
        assert_eq!(client.request_count(), 0);
    }

    #[tokio::test]
    async fn transport_failure_names_the_agent() {
        let client = Arc::new(ScriptedClient::new(Vec::new()));
        let runner = runner_with(client);

        let error = runner
            .run("architect", AgentInput::Task("x"), OutputSchema::Plan)
            .await
            .unwrap_err();

        match error {
            AgentError::GenerationFailed { agent_id, .. } => assert_eq!(agent_id, "architect"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_output_is_a_generation_failure_not_validation() {
        let client = Arc::new(ScriptedClient::new(vec![GenerationResult::text("   ")]));
        let runner = runner_with(client);

        let error = runner
            .run("architect", AgentInput::Task("x"), OutputSchema::Plan)
            .await
            .unwrap_err();

        assert!(matches!(error, AgentError::GenerationFailed { .. }));
    }

    #[tokio::test]
    async fn malformed_output_is_invalid_output_with_raw_text() {
        let client = Arc::new(ScriptedClient::new(vec![GenerationResult::text("not json")]));
        let runner = runner_with(client);

        let error = runner
            .run("architect", AgentInput::Task("x"), OutputSchema::Plan)
            .await
            .unwrap_err();

        match error {
            AgentError::InvalidOutput { raw, .. } => assert_eq!(raw, "not json"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

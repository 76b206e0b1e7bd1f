//! Agent and model configuration lookups.
//!
//! Records are externally owned and read-only from the engine's point of
//! view. They are fetched fresh on every invocation - no caching - so a
//! config change takes effect on the next call. A missing record is a
//! deployment error, not a transient fault: no retry, abort the request.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use foreman_core::errors::{AgentError, ConfigKind};

use crate::prompts;

pub const GOOGLE_PROVIDER: &str = "google";

/// One agent's behavior bundle: prompt template plus target model.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentRecord {
    pub id: String,
    pub prompt: String,
    pub model_id: String,
}

/// Provider and sampling parameters for one model id. The id itself is the
/// provider-side model name.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelRecord {
    pub provider: String,
    pub temperature: f32,
}

impl ModelRecord {
    /// Only the Google provider is wired up; anything else is a terminal
    /// configuration error.
    fn validated(self) -> Result<Self, AgentError> {
        if self.provider != GOOGLE_PROVIDER {
            return Err(AgentError::UnsupportedProvider { provider: self.provider });
        }
        Ok(self)
    }
}

/// Injectable handle on the configuration store.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load_agent(&self, agent_id: &str) -> Result<AgentRecord, AgentError>;
    async fn load_model(&self, model_id: &str) -> Result<ModelRecord, AgentError>;
}

/// In-memory store, used for the built-in defaults and as the test fake.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    agents: BTreeMap<String, AgentRecord>,
    models: BTreeMap<String, ModelRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four fixed agents with their built-in prompt contracts, wired to
    /// two Gemini models: a deterministic one for classification and
    /// routing, a warmer one for planning and code.
    pub fn defaults() -> Self {
        let mut store = Self::new();
        store.insert_model(
            "gemini-2.0-flash",
            ModelRecord { provider: GOOGLE_PROVIDER.to_owned(), temperature: 0.0 },
        );
        store.insert_model(
            "gemini-2.5-flash",
            ModelRecord { provider: GOOGLE_PROVIDER.to_owned(), temperature: 0.6 },
        );
        store.insert_agent("task-classifier", prompts::TASK_CLASSIFIER, "gemini-2.0-flash");
        store.insert_agent("project-manager", prompts::PROJECT_MANAGER, "gemini-2.0-flash");
        store.insert_agent("architect", prompts::ARCHITECT, "gemini-2.5-flash");
        store.insert_agent("engineer", prompts::ENGINEER, "gemini-2.5-flash");
        store
    }

    pub fn insert_agent(&mut self, id: &str, prompt: &str, model_id: &str) {
        self.agents.insert(
            id.to_owned(),
            AgentRecord { id: id.to_owned(), prompt: prompt.to_owned(), model_id: model_id.to_owned() },
        );
    }

    pub fn insert_model(&mut self, id: &str, record: ModelRecord) {
        self.models.insert(id.to_owned(), record);
    }
}

#[async_trait]
impl ConfigStore for InMemoryStore {
    async fn load_agent(&self, agent_id: &str) -> Result<AgentRecord, AgentError> {
        self.agents.get(agent_id).cloned().ok_or_else(|| AgentError::ConfigNotFound {
            kind: ConfigKind::Agent,
            id: agent_id.to_owned(),
        })
    }

    async fn load_model(&self, model_id: &str) -> Result<ModelRecord, AgentError> {
        self.models
            .get(model_id)
            .cloned()
            .ok_or_else(|| AgentError::ConfigNotFound {
                kind: ConfigKind::Model,
                id: model_id.to_owned(),
            })?
            .validated()
    }
}

/// TOML-file-backed store. The file is re-read on every lookup, trading
/// latency for always-fresh behavior.
///
/// Document shape:
///
/// ```toml
/// [agents.architect]
/// prompt = "..."
/// model_id = "gemini-2.5-flash"
///
/// [models."gemini-2.5-flash"]
/// provider = "google"
/// temperature = 0.6
/// ```
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn read_document(&self) -> Result<StoreDocument, AgentError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|error| {
            AgentError::StoreUnavailable {
                detail: format!("could not read `{}`: {error}", self.path.display()),
            }
        })?;
        toml::from_str(&contents).map_err(|error| AgentError::StoreUnavailable {
            detail: format!("could not parse `{}`: {error}", self.path.display()),
        })
    }
}

#[async_trait]
impl ConfigStore for FileStore {
    async fn load_agent(&self, agent_id: &str) -> Result<AgentRecord, AgentError> {
        let document = self.read_document().await?;
        let entry = document.agents.get(agent_id).ok_or_else(|| AgentError::ConfigNotFound {
            kind: ConfigKind::Agent,
            id: agent_id.to_owned(),
        })?;
        Ok(AgentRecord {
            id: agent_id.to_owned(),
            prompt: entry.prompt.clone(),
            model_id: entry.model_id.clone(),
        })
    }

    async fn load_model(&self, model_id: &str) -> Result<ModelRecord, AgentError> {
        let document = self.read_document().await?;
        let entry = document.models.get(model_id).ok_or_else(|| AgentError::ConfigNotFound {
            kind: ConfigKind::Model,
            id: model_id.to_owned(),
        })?;
        ModelRecord { provider: entry.provider.clone(), temperature: entry.temperature }
            .validated()
    }
}

#[derive(Debug, Default, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    agents: BTreeMap<String, AgentEntry>,
    #[serde(default)]
    models: BTreeMap<String, ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct AgentEntry {
    prompt: String,
    model_id: String,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    provider: String,
    #[serde(default)]
    temperature: f32,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use foreman_core::errors::{AgentError, ConfigKind};

    use super::{ConfigStore, FileStore, InMemoryStore, ModelRecord};

    #[tokio::test]
    async fn defaults_resolve_all_four_agents() {
        let store = InMemoryStore::defaults();
        for agent_id in ["task-classifier", "project-manager", "architect", "engineer"] {
            let agent = store.load_agent(agent_id).await.unwrap();
            assert_eq!(agent.id, agent_id);
            let model = store.load_model(&agent.model_id).await.unwrap();
            assert_eq!(model.provider, "google");
            assert!((0.0..=1.0).contains(&model.temperature));
        }
    }

    #[tokio::test]
    async fn missing_agent_is_config_not_found() {
        let store = InMemoryStore::defaults();
        let error = store.load_agent("designer").await.unwrap_err();
        assert_eq!(
            error,
            AgentError::ConfigNotFound { kind: ConfigKind::Agent, id: "designer".to_owned() }
        );
    }

    #[tokio::test]
    async fn non_google_provider_is_rejected() {
        let mut store = InMemoryStore::new();
        store.insert_model(
            "gpt-4o",
            ModelRecord { provider: "openai".to_owned(), temperature: 0.2 },
        );

        let error = store.load_model("gpt-4o").await.unwrap_err();
        assert_eq!(error, AgentError::UnsupportedProvider { provider: "openai".to_owned() });
    }

    #[tokio::test]
    async fn file_store_round_trips_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [agents.architect]
            prompt = "Plan {{task}}"
            model_id = "gemini-2.5-flash"

            [models.gemini-2-5-flash-alias]
            provider = "google"
            temperature = 0.6
            "#
        )
        .unwrap();

        let store = FileStore::new(file.path().to_path_buf());
        let agent = store.load_agent("architect").await.unwrap();
        assert_eq!(agent.model_id, "gemini-2.5-flash");

        let model = store.load_model("gemini-2-5-flash-alias").await.unwrap();
        assert_eq!(model.temperature, 0.6);

        let error = store.load_model("gemini-2.5-flash").await.unwrap_err();
        assert!(matches!(error, AgentError::ConfigNotFound { .. }));
    }

    #[tokio::test]
    async fn file_store_sees_edits_between_calls() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[models.m]\nprovider = \"google\"\ntemperature = 0.1\n").unwrap();

        let store = FileStore::new(file.path().to_path_buf());
        assert_eq!(store.load_model("m").await.unwrap().temperature, 0.1);

        let mut replacement = std::fs::File::create(file.path()).unwrap();
        write!(replacement, "[models.m]\nprovider = \"google\"\ntemperature = 0.9\n").unwrap();

        assert_eq!(store.load_model("m").await.unwrap().temperature, 0.9);
    }

    #[tokio::test]
    async fn unreadable_store_file_is_unavailable_not_missing() {
        let store = FileStore::new("/nonexistent/foreman-agents.toml".into());
        let error = store.load_agent("architect").await.unwrap_err();
        assert!(matches!(error, AgentError::StoreUnavailable { .. }));
    }
}

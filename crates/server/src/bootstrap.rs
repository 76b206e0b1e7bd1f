use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use foreman_agent::engine::AgentEngine;
use foreman_agent::gemini::GeminiClient;
use foreman_agent::store::{ConfigStore, FileStore, InMemoryStore};
use foreman_core::config::{AppConfig, ConfigError, LoadOptions};

pub struct Application {
    pub config: AppConfig,
    pub engine: Arc<AgentEngine>,
    pub store: Arc<dyn ConfigStore>,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no generation api key configured (set `llm.api_key` or GEMINI_API_KEY)")]
    MissingApiKey,
    #[error("could not build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let api_key = config.llm.api_key.clone().ok_or(BootstrapError::MissingApiKey)?;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.llm.timeout_secs))
        .build()
        .map_err(BootstrapError::HttpClient)?;
    let base_url = config
        .llm
        .base_url
        .clone()
        .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_owned());
    let client = Arc::new(GeminiClient::with_http(http, api_key, base_url));

    let store: Arc<dyn ConfigStore> = match &config.store.path {
        Some(path) => {
            info!(
                event_name = "system.bootstrap.store",
                store = %path.display(),
                "using file-backed agent store"
            );
            Arc::new(FileStore::new(path.clone()))
        }
        None => {
            info!(event_name = "system.bootstrap.store", "using built-in agent defaults");
            Arc::new(InMemoryStore::defaults())
        }
    };

    let engine = Arc::new(AgentEngine::new(store.clone(), client));
    info!(event_name = "system.bootstrap.ready", "application bootstrap complete");

    Ok(Application { config, engine, store })
}

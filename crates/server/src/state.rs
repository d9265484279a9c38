//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The `AppState` holds the configuration, the
//! SQLite provider, and the instantiated AI provider clients, making them
//! accessible to all request handlers.

use crate::config::{AppConfig, ProviderConfig, TaskConfig, COURSE_OUTLINE_TASK, TUTOR_CHAT_TASK};
use crate::errors::AppError;
use edumate::{
    providers::{
        ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
        db::sqlite::SqliteProvider,
    },
    types::ArtifactKind,
    CoursePipeline, PromptTemplates, TaskPrompt,
};
use anyhow::anyhow;
use std::{collections::HashMap, sync::Arc};
use tracing::info;

/// A fully resolved task configuration with non-optional fields.
#[derive(Clone, Debug)]
pub struct ResolvedTask {
    pub provider: String,
    pub system_prompt: String,
    pub user_prompt: String,
}

impl ResolvedTask {
    fn prompt(&self) -> TaskPrompt {
        TaskPrompt::new(self.system_prompt.clone(), self.user_prompt.clone())
    }
}

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// A map of fully resolved tasks, ready for use by handlers.
    pub tasks: Arc<HashMap<String, ResolvedTask>>,
    /// The prompt templates assembled from the resolved tasks.
    pub templates: Arc<PromptTemplates>,
    /// The course database.
    pub sqlite_provider: Arc<SqliteProvider>,
    /// A map of instantiated AI providers, keyed by their name from the config.
    pub ai_providers: Arc<HashMap<String, Box<dyn AiProvider>>>,
}

impl AppState {
    /// Builds a pipeline wired to the provider configured for `task_name`.
    pub fn pipeline_for(&self, task_name: &str) -> Result<CoursePipeline, AppError> {
        let task = self
            .tasks
            .get(task_name)
            .ok_or_else(|| anyhow!("Task '{task_name}' is not configured"))?;
        let ai_provider = self.ai_providers.get(&task.provider).ok_or_else(|| {
            anyhow!(
                "Provider '{}' for task '{task_name}' not found",
                task.provider
            )
        })?;

        Ok(CoursePipeline::builder()
            .ai_provider(ai_provider.clone())
            .store(Box::new(self.sqlite_provider.as_ref().clone()))
            .templates(self.templates.as_ref().clone())
            .artifact_policy(self.config.artifact_policy)
            .build()?)
    }

    /// The provider key a task is routed to, for debug output.
    pub fn provider_of(&self, task_name: &str) -> Option<&str> {
        self.tasks.get(task_name).map(|t| t.provider.as_str())
    }
}

/// Instantiates the client for one entry of the `providers` map.
fn build_provider(name: &str, cfg: &ProviderConfig) -> anyhow::Result<Box<dyn AiProvider>> {
    match cfg.provider.as_str() {
        "gemini" => {
            let api_key = cfg
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| anyhow!("api_key is required for gemini provider '{name}'"))?;
            let api_url = cfg
                .api_url
                .clone()
                .unwrap_or_else(|| GeminiProvider::default_api_url(&cfg.model_name));
            Ok(Box::new(GeminiProvider::new(api_url, api_key)?))
        }
        "local" => {
            let api_url = cfg.api_url.clone().filter(|u| !u.is_empty()).ok_or_else(|| {
                anyhow!("api_url is required for local provider '{name}'. Set LOCAL_AI_API_URL in your .env file.")
            })?;
            Ok(Box::new(LocalAiProvider::new(
                api_url,
                cfg.api_key.clone(),
                Some(cfg.model_name.clone()),
            )?))
        }
        other => Err(anyhow!(
            "Unsupported AI provider type '{other}' for provider '{name}'"
        )),
    }
}

/// Layered defaults give every built-in task all three fields; a task
/// defined only in YAML may still lack one.
fn resolve_task(name: &str, cfg: &TaskConfig) -> anyhow::Result<ResolvedTask> {
    let required = |field: &Option<String>, key: &str| {
        field
            .clone()
            .ok_or_else(|| anyhow!("Task '{name}' is missing required '{key}' field"))
    };
    Ok(ResolvedTask {
        provider: required(&cfg.provider, "provider")?,
        system_prompt: required(&cfg.system_prompt, "system_prompt")?,
        user_prompt: required(&cfg.user_prompt, "user_prompt")?,
    })
}

/// Builds the shared application state from the configuration.
///
/// - One AI client per entry in `providers`.
/// - The generation and tutor tasks, resolved into prompt templates.
/// - The SQLite database, with its schema applied.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let ai_providers = config
        .providers
        .iter()
        .map(|(name, cfg)| Ok((name.clone(), build_provider(name, cfg)?)))
        .collect::<anyhow::Result<HashMap<_, _>>>()?;

    let resolved_tasks = config
        .tasks
        .iter()
        .map(|(name, cfg)| Ok((name.clone(), resolve_task(name, cfg)?)))
        .collect::<anyhow::Result<HashMap<_, _>>>()?;

    let template_for = |task_name: &str| {
        resolved_tasks
            .get(task_name)
            .map(ResolvedTask::prompt)
            .ok_or_else(|| anyhow!("Required task '{task_name}' is not configured"))
    };
    let templates = PromptTemplates {
        outline: template_for(COURSE_OUTLINE_TASK)?,
        lesson: template_for(ArtifactKind::Content.task_name())?,
        quiz: template_for(ArtifactKind::Quiz.task_name())?,
        flashcards: template_for(ArtifactKind::Flashcards.task_name())?,
        tutor: template_for(TUTOR_CHAT_TASK)?,
    };

    let sqlite_provider = SqliteProvider::new(&config.db_url).await?;
    sqlite_provider.initialize_schema().await?;
    info!(db_path = %config.db_url, "Initialized course storage (SQLite).");

    Ok(AppState {
        config: Arc::new(config),
        tasks: Arc::new(resolved_tasks),
        templates: Arc::new(templates),
        sqlite_provider: Arc::new(sqlite_provider),
        ai_providers: Arc::new(ai_providers),
    })
}

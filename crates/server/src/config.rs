//! # Application Configuration
//!
//! This module defines the configuration structure for the `edumate-server` and
//! provides the logic for loading it from a `config.yml` file and environment
//! variables.

use config::{
    Config as ConfigBuilder, Environment, File, FileFormat, Value as ConfigValue,
    ValueKind as ConfigValueKind,
};
use edumate::{prompts::tasks::*, types::ArtifactKind, ArtifactPolicy};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// The task that generates course outlines.
pub const COURSE_OUTLINE_TASK: &str = "course_outline";

/// The provider every default task points at.
pub const DEFAULT_PROVIDER_KEY: &str = "gemini_default";

/// The task that answers learner questions.
pub const TUTOR_CHAT_TASK: &str = "tutor_chat";

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The path to the SQLite database file. Loaded from `DB_URL` env var.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// Whether new artifacts are appended or replace a lesson's earlier ones.
    /// Loaded from `ARTIFACT_POLICY` env var.
    #[serde(default)]
    pub artifact_policy: ArtifactPolicy,
    /// A map of named, reusable AI provider configurations.
    pub providers: HashMap<String, ProviderConfig>,
    /// A map of tasks, each specifying a provider and prompts.
    pub tasks: HashMap<String, TaskConfig>,
}

/// Provides a default value for the `port` field if not set in the environment.
fn default_port() -> u16 {
    9090
}
/// Provides a default value for the `db_url` field if not set in the environment.
fn default_db_url() -> String {
    "db/edumate.db".to_string()
}

/// A reusable configuration for a specific AI provider instance.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// The type of provider ("gemini" or "local").
    pub provider: String,
    /// The API URL. Optional for Gemini, where it is derived from the model name.
    pub api_url: Option<String>,
    /// The API key, which can be null for local providers.
    pub api_key: Option<String>,
    pub model_name: String,
}

/// Defines the prompts and provider for a specific application task.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TaskConfig {
    /// The key of the provider to use from the `providers` map.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub user_prompt: Option<String>,
}

/// Constructs a `config::Value` map of the default, hardcoded tasks from the library.
/// This serves as the base layer of configuration.
fn build_default_tasks() -> HashMap<String, ConfigValue> {
    let tasks = [
        (
            COURSE_OUTLINE_TASK,
            COURSE_OUTLINE_SYSTEM_PROMPT,
            COURSE_OUTLINE_USER_PROMPT,
        ),
        (
            ArtifactKind::Content.task_name(),
            LESSON_CONTENT_SYSTEM_PROMPT,
            LESSON_CONTENT_USER_PROMPT,
        ),
        (
            ArtifactKind::Quiz.task_name(),
            QUIZ_SYSTEM_PROMPT,
            QUIZ_USER_PROMPT,
        ),
        (
            ArtifactKind::Flashcards.task_name(),
            FLASHCARD_SYSTEM_PROMPT,
            FLASHCARD_USER_PROMPT,
        ),
        (
            TUTOR_CHAT_TASK,
            TUTOR_CHAT_SYSTEM_PROMPT,
            TUTOR_CHAT_USER_PROMPT,
        ),
    ];

    tasks
        .into_iter()
        .map(|(name, sys, user)| {
            let mut table = HashMap::new();
            table.insert(
                "provider".to_string(),
                ConfigValue::from(DEFAULT_PROVIDER_KEY),
            );
            table.insert("system_prompt".to_string(), ConfigValue::from(sys));
            table.insert("user_prompt".to_string(), ConfigValue::from(user));
            (
                name.to_string(),
                ConfigValue::new(None, ConfigValueKind::Table(table)),
            )
        })
        .collect()
}

/// Reads a YAML file with `${VAR}` placeholders expanded from the environment.
/// Unset variables expand to an empty string. A missing file is `Ok(None)`.
fn read_and_substitute(path: &Path) -> Result<Option<String>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        ConfigError::General(format!(
            "Failed to read config file '{}': {e}",
            path.display()
        ))
    })?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(format!("Invalid placeholder pattern: {e}")))?;
    Ok(Some(
        re.replace_all(&content, |caps: &regex::Captures| {
            env::var(&caps["var"]).unwrap_or_default()
        })
        .into_owned(),
    ))
}

/// Picks the main YAML file: the explicit override, else `config.yml` in the
/// crate directory, else the `config.{AI_PROVIDER}.yml` template.
fn main_config_path(config_path_override: Option<&str>) -> PathBuf {
    if let Some(path) = config_path_override {
        return PathBuf::from(path);
    }
    let base_path = Path::new(env!("CARGO_MANIFEST_DIR"));
    let user_config_path = base_path.join("config.yml");
    if user_config_path.exists() {
        info!(path = %user_config_path.display(), "Loading user-defined configuration.");
        return user_config_path;
    }
    let provider = env::var("AI_PROVIDER").unwrap_or_else(|_| "local".to_string());
    let template_path = base_path.join(format!("config.{provider}.yml"));
    info!(
        path = %template_path.display(),
        ai_provider = %provider,
        "No config.yml found, using provider template."
    );
    template_path
}

impl AppConfig {
    /// Every task must route to a provider declared under `providers`.
    fn validate(&self) -> Result<(), ConfigError> {
        for (task_name, task) in &self.tasks {
            if let Some(provider) = &task.provider {
                if !self.providers.contains_key(provider) {
                    return Err(ConfigError::General(format!(
                        "task '{task_name}' uses provider '{provider}', which is not defined under 'providers'"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Loads the application configuration from a file and environment variables.
///
/// Layers, lowest precedence first: the built-in task prompts, the main YAML
/// file, an optional `prompt.yml` beside it, then the environment.
///
/// - Top-level keys like `port`, `db_url` and `artifact_policy` are overridden
///   by `PORT`, `DB_URL` and `ARTIFACT_POLICY`.
/// - Nested keys are overridden by `EDUMATE_...` variables
///   (e.g., `EDUMATE_PROVIDERS__GEMINI_DEFAULT__MODEL_NAME`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let main_path = main_config_path(config_path_override);
    let main_content = read_and_substitute(&main_path)?.ok_or_else(|| {
        ConfigError::NotFound(format!(
            "Main config file not found at '{}'. Create 'config.yml' or set AI_PROVIDER to 'local' or 'gemini'.",
            main_path.display()
        ))
    })?;

    let mut builder = ConfigBuilder::builder()
        .set_default("tasks", build_default_tasks())?
        .add_source(File::from_str(&main_content, FileFormat::Yaml));

    let prompt_path = main_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("prompt.yml");
    if let Some(prompt_content) = read_and_substitute(&prompt_path)? {
        info!(path = %prompt_path.display(), "Loading prompt overrides.");
        builder = builder.add_source(File::from_str(&prompt_content, FileFormat::Yaml));
    }

    let settings = builder
        .add_source(Environment::default())
        .add_source(
            Environment::with_prefix("EDUMATE")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

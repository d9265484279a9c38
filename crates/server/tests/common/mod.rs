//! # Common Test Utilities
//!
//! `TestApp` spawns the real router on a random port against a temporary
//! database. By default the `gemini_default` provider is a local,
//! OpenAI-compatible provider pointed at an `httpmock::MockServer`;
//! `spawn_with_mock_ai` swaps it for an in-process `MockAiProvider`.

// Allow unused code because this is a test utility module, and not all
// functions might be used by every test file that includes it.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use edumate::providers::ai::AiProvider;
use edumate_server::{
    config, router,
    state::{build_app_state, AppState},
};
use edumate_test_utils::{MockAiProvider, TestSetup};
use httpmock::{Method, Mock, MockServer};
use reqwest::Client;
use serde_json::{json, Value};
use std::{collections::HashMap, fs::File, io::Write, net::SocketAddr, sync::Arc};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

pub const REFERENCE_OUTLINE: &str = "Course Title: Intro to X\n\nModule 1: Basics\n- Lesson: What is X\n- Lesson: History of X\n\nModule 2: Advanced\n- Lesson: Deep Dive";

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub app_state: AppState,
    _db: TestSetup,
    _config_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

/// Everything a server needs before it is spawned.
struct Prepared {
    app_state: AppState,
    mock_server: MockServer,
    db: TestSetup,
    config_dir: TempDir,
}

async fn prepare(policy: &str) -> Result<Prepared> {
    let mock_server = MockServer::start();
    let db = TestSetup::new()?;

    let config_dir = tempdir()?;
    let config_path = config_dir.path().join("config.yml");
    let config_content = format!(
        r#"
port: 0
db_url: "{}"
artifact_policy: "{}"
providers:
  gemini_default:
    provider: "local"
    api_url: "{}"
    api_key: null
    model_name: "mock-chat-model"
"#,
        db.db_url(),
        policy,
        mock_server.url(CHAT_COMPLETIONS_PATH)
    );
    let mut file = File::create(&config_path)?;
    file.write_all(config_content.as_bytes())?;

    let config = config::get_config(Some(config_path.to_str().unwrap()))?;
    let app_state = build_app_state(config).await?;

    Ok(Prepared {
        app_state,
        mock_server,
        db,
        config_dir,
    })
}

impl TestApp {
    /// Spawns the application server with the default `append` policy.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_policy("append").await
    }

    /// Spawns the application server with the given `artifact_policy`.
    pub async fn spawn_with_policy(policy: &str) -> Result<Self> {
        Self::spawn_prepared(prepare(policy).await?).await
    }

    /// Spawns the server with `gemini_default` replaced by an in-process mock.
    pub async fn spawn_with_mock_ai(mock_ai: MockAiProvider) -> Result<Self> {
        let mut prepared = prepare("append").await?;
        let mut providers: HashMap<String, Box<dyn AiProvider>> = HashMap::new();
        providers.insert("gemini_default".to_string(), Box::new(mock_ai));
        prepared.app_state.ai_providers = Arc::new(providers);
        Self::spawn_prepared(prepared).await
    }

    async fn spawn_prepared(prepared: Prepared) -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let Prepared {
            app_state,
            mock_server,
            db,
            config_dir,
        } = prepared;
        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            app_state: app_state_for_harness,
            _db: db,
            _config_dir: config_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Mocks every chat completion to answer with `content`.
    pub fn mock_completion(&self, content: &str) -> Mock<'_> {
        let content = content.to_string();
        self.mock_server.mock(|when, then| {
            when.method(Method::POST).path(CHAT_COMPLETIONS_PATH);
            then.status(200).json_body(json!({
                "choices": [{"message": {"role": "assistant", "content": content}}]
            }));
        })
    }

    pub async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Generates the reference outline through the API and returns its course id.
    pub async fn seed_reference_course(&self) -> String {
        let mut mock = self.mock_completion(REFERENCE_OUTLINE);
        let response = self
            .post(
                "/course/generate-outline",
                json!({"topic": "X", "num_modules": 2}),
            )
            .await;
        assert!(
            response.status().is_success(),
            "seeding failed: {}",
            response.status()
        );
        let body: Value = response.json().await.unwrap();
        mock.delete();
        body["result"]["course_id"].as_str().unwrap().to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

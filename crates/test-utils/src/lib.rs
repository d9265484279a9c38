use anyhow::Result;
use async_trait::async_trait;
use edumate::errors::EdumateError;
use edumate::providers::ai::AiProvider;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

// --- Test Setup ---

/// A temporary database file path, removed when dropped.
///
/// The server under test opens the file itself through `db_url`, so this
/// type only owns the path; opening it a second time here would give two
/// independent database handles on one file.
pub struct TestSetup {
    pub db_path: PathBuf,
    _db_file: NamedTempFile,
}

impl TestSetup {
    pub fn new() -> Result<Self> {
        let db_file = tempfile::Builder::new()
            .prefix("edumate-test-")
            .suffix(".db")
            .tempfile()?;
        Ok(Self {
            db_path: db_file.path().to_path_buf(),
            _db_file: db_file,
        })
    }

    pub fn db_url(&self) -> String {
        self.db_path.to_string_lossy().into_owned()
    }
}

// --- Mock AI Provider ---

/// Answers each call with the response whose key occurs in the system prompt.
///
/// Keys are matched in insertion order, so a more specific key should be
/// added before a more general one.
#[derive(Clone, Debug, Default)]
pub struct MockAiProvider {
    responses: Arc<Mutex<Vec<(String, String)>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-programs a response for a specific prompt.
    /// The key should be a unique substring of the system prompt.
    pub fn add_response(&self, key: &str, response: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.push((key.to_string(), response.to_string()));
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, EdumateError> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        let responses = self.responses.lock().unwrap();
        responses
            .iter()
            .find(|(key, _)| system_prompt.contains(key.as_str()))
            .map(|(_, response)| response.clone())
            .ok_or_else(|| {
                EdumateError::AiApi(format!(
                    "MockAiProvider: No response programmed for system prompt. Got: '{system_prompt}'"
                ))
            })
    }
}

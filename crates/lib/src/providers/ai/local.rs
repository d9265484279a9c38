use crate::{
    errors::EdumateError,
    providers::ai::{ensure_success, AiProvider, GENERATION_TEMPERATURE},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

// --- OpenAI-compatible chat completion shapes ---

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    // Some servers send `null` content for refusals.
    #[serde(default)]
    content: Option<String>,
}

/// Any server that speaks the OpenAI chat completions protocol
/// (Ollama, LM Studio, vLLM, OpenAI itself).
#[derive(Clone, Debug)]
pub struct LocalAiProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
    model: Option<String>,
}

impl LocalAiProvider {
    /// Empty `api_key` or `model` values count as unset, since unset `${VAR}`
    /// placeholders in config files arrive as empty strings.
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        model: Option<String>,
    ) -> Result<Self, EdumateError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(EdumateError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.filter(|m| !m.is_empty()),
        })
    }
}

#[async_trait]
impl AiProvider for LocalAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, EdumateError> {
        let body = ChatCompletionRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            model: self.model.as_deref(),
            temperature: GENERATION_TEMPERATURE,
            stream: false,
        };

        let mut request = self.client.post(&self.api_url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        debug!(api_url = %self.api_url, model = ?self.model, "--> Sending request to local AI provider");
        let response = request.send().await.map_err(EdumateError::AiRequest)?;

        let parsed: ChatCompletionResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(EdumateError::AiDeserialization)?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

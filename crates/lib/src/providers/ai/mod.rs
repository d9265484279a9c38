pub mod gemini;
pub mod local;

use crate::errors::EdumateError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use reqwest::Response;
use std::fmt::Debug;

/// Sampling temperature sent by both HTTP providers.
pub const GENERATION_TEMPERATURE: f32 = 0.7;

/// A trait for interacting with an AI provider.
///
/// This is the single text-completion seam of the crate: one call, one
/// response, no streaming. Implementations do not retry; transport and API
/// failures are returned to the caller as `EdumateError`.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    ///
    /// The result is the model's raw text, which may be empty.
    async fn generate(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, EdumateError>;
}

dyn_clone::clone_trait_object!(AiProvider);

/// Turns a non-2xx response into `EdumateError::AiApi` carrying the status and body.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, EdumateError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(EdumateError::AiApi(format!("{status}: {body}")))
}

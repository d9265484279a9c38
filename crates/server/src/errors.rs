use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use edumate::{EdumateError, GenerationError};
use serde_json::json;
use tracing::{error, info};

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Outcomes of a generation request that did not produce an artifact.
    Generation(GenerationError),
    /// Service errors from the `edumate` library.
    Edumate(EdumateError),
    /// The request was well-formed JSON but semantically invalid.
    BadRequest(String),
    /// A requested resource does not exist.
    NotFound(String),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Service(inner) => AppError::Edumate(inner),
            other => AppError::Generation(other),
        }
    }
}

impl From<EdumateError> for AppError {
    fn from(err: EdumateError) -> Self {
        AppError::Edumate(err)
    }
}

/// Conversion from `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl AppError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            AppError::Generation(err) => {
                info!("Generation did not complete: {err}");
                let status = match err {
                    GenerationError::NotFound(_) => StatusCode::NOT_FOUND,
                    GenerationError::EmptyGeneration(_)
                    | GenerationError::EmptyOutline
                    | GenerationError::EmptyReply => StatusCode::UNPROCESSABLE_ENTITY,
                    GenerationError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
            AppError::Edumate(err) => {
                // Log the original error for debugging purposes
                error!("EdumateError: {:?}", err);
                match err {
                    EdumateError::MissingAiProvider(_) | EdumateError::MissingStore => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Server is not configured correctly.".to_string(),
                    ),
                    EdumateError::AiRequest(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Request to AI provider failed: {e}"),
                    ),
                    EdumateError::AiDeserialization(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Failed to deserialize AI provider response: {e}"),
                    ),
                    EdumateError::AiApi(e) => {
                        (StatusCode::BAD_GATEWAY, format!("AI provider error: {e}"))
                    }
                    EdumateError::ReqwestClientBuild(_) | EdumateError::Regex(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An internal server error occurred.".to_string(),
                    ),
                    EdumateError::StorageConnection(_)
                    | EdumateError::StorageOperationFailed(_)
                    | EdumateError::Database(_)
                    | EdumateError::JsonSerialization(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "A storage error occurred.".to_string(),
                    ),
                }
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = self.status_and_message();

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}

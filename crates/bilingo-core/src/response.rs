//! Interpretation of translation API responses.
//!
//! The API answers `POST /api/process` with a JSON body on success and,
//! on failure, with a status code plus an optional `{"error": ...}`
//! body. Every failure is shown to the user as [`GENERIC_FAILURE`]; the
//! typed [`ApiError`] exists for logging.

use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::types::UploadResult;

/// The only failure message the upload form ever shows.
pub const GENERIC_FAILURE: &str = "Error: Could not process request";

/// Shown by the status banner when `/api/hello` cannot be reached.
pub const HELLO_FAILURE: &str = "Error: Could not fetch message";

/// Errors that can occur when talking to the translation API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (network, CORS, DOM error).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("server returned HTTP {0}")]
    Status(u16),

    /// The server answered 2xx but the body was not what we expect.
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

/// Success body of `POST /api/process`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub message: String,
    pub translated_file_path: String,
}

/// Error body the API sends alongside 4xx/5xx statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of `GET /api/hello`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloResponse {
    pub message: String,
}

impl HelloResponse {
    /// Parse a hello body, requiring a 2xx status.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] for non-2xx statuses and
    /// [`ApiError::InvalidBody`] when the JSON lacks `message`.
    pub fn parse(status: u16, body: &str) -> Result<Self, ApiError> {
        if !is_success(status) {
            return Err(ApiError::Status(status));
        }
        serde_json::from_str(body).map_err(|e| ApiError::InvalidBody(e.to_string()))
    }
}

/// Whether `status` is in the 2xx range.
#[must_use]
pub const fn is_success(status: u16) -> bool {
    status >= 200 && status < 300
}

/// Turn a `/api/process` response into an [`UploadResult`].
///
/// The server-side upload folder prefix is stripped from the returned
/// path so it can be handed to the viewer route directly.
///
/// # Errors
///
/// Returns [`ApiError::Status`] for non-2xx statuses regardless of the
/// body, and [`ApiError::InvalidBody`] when a 2xx body does not decode.
pub fn interpret_response(
    status: u16,
    body: &str,
    config: &ApiConfig,
) -> Result<UploadResult, ApiError> {
    if !is_success(status) {
        return Err(ApiError::Status(status));
    }
    let parsed: ProcessResponse =
        serde_json::from_str(body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
    Ok(UploadResult {
        message: parsed.message,
        translated_path: config.strip_upload_prefix(&parsed.translated_file_path),
    })
}

/// Extract the server's `error` field from a failure body, if present.
#[must_use]
pub fn server_error_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|e| e.error)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn success_strips_upload_prefix() {
        let body = r#"{"message":"Successfully processed file","translated_file_path":"temp_uploads/book.epub"}"#;
        let result = interpret_response(200, body, &ApiConfig::default()).unwrap();
        assert_eq!(result.message, "Successfully processed file");
        assert_eq!(result.translated_path, "book.epub");
    }

    #[test]
    fn non_success_status_ignores_body() {
        let body = r#"{"message":"ok","translated_file_path":"temp_uploads/book.epub"}"#;
        assert_eq!(
            interpret_response(500, body, &ApiConfig::default()),
            Err(ApiError::Status(500))
        );
        assert_eq!(
            interpret_response(400, "<html>", &ApiConfig::default()),
            Err(ApiError::Status(400))
        );
    }

    #[test]
    fn malformed_success_body_is_an_error() {
        let result = interpret_response(200, r#"{"message":"ok"}"#, &ApiConfig::default());
        assert!(matches!(result, Err(ApiError::InvalidBody(_))));
    }

    #[test]
    fn error_detail_is_extracted_for_logging() {
        assert_eq!(
            server_error_detail(r#"{"error":"Unsupported model: foo"}"#).as_deref(),
            Some("Unsupported model: foo")
        );
        assert_eq!(server_error_detail("Internal Server Error"), None);
    }

    #[test]
    fn hello_parses_message() {
        let hello = HelloResponse::parse(200, r#"{"message":"Hello from Flask!"}"#).unwrap();
        assert_eq!(hello.message, "Hello from Flask!");
        assert_eq!(HelloResponse::parse(503, ""), Err(ApiError::Status(503)));
    }

    #[test]
    fn success_range() {
        assert!(is_success(200));
        assert!(is_success(204));
        assert!(!is_success(199));
        assert!(!is_success(300));
        assert!(!is_success(404));
    }
}

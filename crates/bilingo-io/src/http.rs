//! Translation API calls over the browser `fetch` API.
//!
//! Each call issues exactly one request and resolves to a typed result;
//! nothing here retries, times out, or cancels. Interpretation of the
//! response bodies lives in `bilingo-core` so it can be tested natively.
//!
//! All functions in this module require a browser environment
//! (`wasm32-unknown-unknown` target).

use bilingo_core::response::{is_success, server_error_detail};
use bilingo_core::{
    ApiConfig, ApiError, HelloResponse, UploadRequest, UploadResult, interpret_response,
};
use dioxus::logger::tracing::{debug, warn};
use url::Url;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{FormData, Request, RequestInit, RequestMode, Response};

use crate::download;

/// Errors raised by the browser while building or sending a request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for FetchError {
    fn from(value: JsValue) -> Self {
        let message = value
            .dyn_ref::<js_sys::Error>()
            .map(|e| String::from(e.message()))
            .or_else(|| value.as_string())
            .unwrap_or_else(|| format!("{value:?}"));
        Self::JsError(message)
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        Self::Transport(err.to_string())
    }
}

/// `POST` the upload request as multipart form data.
///
/// A non-2xx answer is logged with the server's `error` field when the
/// body carries one; the caller only ever sees the typed [`ApiError`].
///
/// # Errors
///
/// Returns [`ApiError::Transport`] if the request could not be sent,
/// [`ApiError::Status`] for non-2xx responses, and
/// [`ApiError::InvalidBody`] for a 2xx body that does not decode.
#[allow(clippy::future_not_send)] // WASM is single-threaded; JsFuture is !Send
pub async fn submit_upload(
    config: &ApiConfig,
    request: &UploadRequest,
) -> Result<UploadResult, ApiError> {
    let form = build_form(request)?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_mode(RequestMode::Cors);
    init.set_body(&form);

    let response = send(config.process_url(), &init).await?;
    let status = response.status();
    let body = text_of(&response).await?;

    if !is_success(status) {
        match server_error_detail(&body) {
            Some(detail) => warn!(status, %detail, "translation request rejected"),
            None => warn!(status, "translation request failed"),
        }
    }
    interpret_response(status, &body, config)
}

/// `GET /api/hello`.
///
/// # Errors
///
/// Returns [`ApiError::Transport`] on network failure, otherwise the
/// errors of [`HelloResponse::parse`].
#[allow(clippy::future_not_send)]
pub async fn fetch_hello(config: &ApiConfig) -> Result<HelloResponse, ApiError> {
    let init = RequestInit::new();
    init.set_method("GET");
    init.set_mode(RequestMode::Cors);

    let response = send(config.hello_url(), &init).await?;
    let status = response.status();
    let body = text_of(&response).await?;
    HelloResponse::parse(status, &body)
}

/// Download the raw bytes at `url` (the translated book).
///
/// # Errors
///
/// Returns [`ApiError::Transport`] on network failure and
/// [`ApiError::Status`] for non-2xx responses.
#[allow(clippy::future_not_send)]
pub async fn fetch_bytes(url: &Url) -> Result<Vec<u8>, ApiError> {
    let init = RequestInit::new();
    init.set_method("GET");
    init.set_mode(RequestMode::Cors);

    let response = send(url, &init).await?;
    let status = response.status();
    if !is_success(status) {
        return Err(ApiError::Status(status));
    }

    let buffer = JsFuture::from(response.array_buffer().map_err(FetchError::from)?)
        .await
        .map_err(FetchError::from)?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Assemble the multipart body: the file blob first, then the text
/// fields from [`UploadRequest::form_fields`].
fn build_form(request: &UploadRequest) -> Result<FormData, FetchError> {
    let form = FormData::new()?;

    let blob = download::blob_of(&request.file.bytes, "application/octet-stream")?;
    form.append_with_blob_and_filename(UploadRequest::FILE_FIELD, &blob, &request.file.name)?;

    for (name, value) in request.form_fields() {
        form.append_with_str(name, &value)?;
    }
    Ok(form)
}

/// Issue the request and wait for the response headers.
#[allow(clippy::future_not_send)]
async fn send(url: &Url, init: &RequestInit) -> Result<Response, FetchError> {
    let window = web_sys::window().ok_or_else(|| FetchError::JsError("no global window".into()))?;
    let request = Request::new_with_str_and_init(url.as_str(), init)?;

    debug!(url = %url, "fetch");
    let value = JsFuture::from(window.fetch_with_request(&request)).await?;
    let response = value
        .dyn_into::<Response>()
        .map_err(|v| FetchError::JsError(format!("fetch did not return a Response: {v:?}")))?;
    Ok(response)
}

#[allow(clippy::future_not_send)]
async fn text_of(response: &Response) -> Result<String, FetchError> {
    let text = JsFuture::from(response.text()?).await?;
    text.as_string()
        .ok_or_else(|| FetchError::JsError("response body is not text".into()))
}

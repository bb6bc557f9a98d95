//! bilingo-core: Pure state and wire-format logic (sans-IO).
//!
//! Holds everything the bilingo front-end decides without touching the
//! browser: the upload form state machine, multipart field encoding,
//! interpretation of translation API responses, endpoint configuration,
//! EPUB decoding, and reader navigation.
//!
//! This crate has **no browser dependencies** -- it operates on in-memory
//! values and returns structured data. All `fetch`/DOM interaction lives
//! in `bilingo-io`.

pub mod book;
pub mod config;
pub mod form;
pub mod reader;
pub mod response;
mod sanitize;
pub mod types;

pub use book::{Book, BookError, Chapter, TocEntry};
pub use config::{ApiConfig, ConfigError};
pub use form::{FormAction, FormState, PendingSubmit, SubmitPhase, SubmitTicket};
pub use reader::{ReaderLocation, ReaderState, ViewerError};
pub use response::{ApiError, GENERIC_FAILURE, HELLO_FAILURE, HelloResponse, interpret_response};
pub use types::{
    BilingualMode, ModelChoice, SelectedFile, TargetLanguage, UploadRequest, UploadResult,
};

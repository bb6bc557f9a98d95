//! Upload form state machine.
//!
//! [`FormState`] owns every field of the upload form plus the submission
//! phase. It changes only through [`FormState::apply`], one
//! [`FormAction`] per user action or network resolution:
//!
//! ```rust
//! # use bilingo_core::{FormAction, FormState, SelectedFile, TargetLanguage};
//! let mut form = FormState::default();
//! form.apply(FormAction::SetFile(SelectedFile::new("book.epub", vec![0u8; 8])));
//! form.apply(FormAction::SetLanguage(TargetLanguage::Japanese));
//!
//! let pending = form.apply(FormAction::Submit).expect("a file is selected");
//! assert!(form.is_submitting());
//! assert_eq!(pending.request.language, TargetLanguage::Japanese);
//!
//! // A second submit while the first is in flight is ignored.
//! assert!(form.apply(FormAction::Submit).is_none());
//! ```
//!
//! Phases run `Idle -> Submitting -> {Succeeded, Failed}`, and a new
//! submit from either terminal phase goes back to `Submitting`. The
//! in-flight guard is the [`SubmitTicket`]: only the `Resolved` action
//! carrying the current ticket can leave `Submitting`, and every exit
//! path of the network call produces exactly one such action.

use crate::response::{ApiError, GENERIC_FAILURE};
use crate::types::{
    BilingualMode, ModelChoice, SelectedFile, TargetLanguage, UploadRequest, UploadResult,
};

/// Shown when the user submits before choosing a file.
pub const NO_FILE_MESSAGE: &str = "Please select a file to translate";

/// Provider prefilled in the form.
pub const DEFAULT_PROVIDER: &str = "openai";

/// Identifies one submission so late or duplicate resolutions can be
/// told apart from the one the form is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmitTicket(u64);

/// Where the form is in its submit cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// A request is in flight; further submits are ignored.
    Submitting(SubmitTicket),
    /// The last submission succeeded.
    Succeeded(UploadResult),
    /// The last submission failed. The error is kept for logging only.
    Failed(ApiError),
}

/// One user action or network resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    SetFile(SelectedFile),
    SetProvider(String),
    SetModel(ModelChoice),
    SetLanguage(TargetLanguage),
    SetBilingual(BilingualMode),
    SetApiKey(String),
    SetTextOnly(bool),
    /// Start a submission from the current field values.
    Submit,
    /// The network call for `ticket` finished.
    Resolved(SubmitTicket, Result<UploadResult, ApiError>),
}

/// A submission the caller must now send.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmit {
    pub ticket: SubmitTicket,
    pub request: UploadRequest,
}

/// Fields and submit phase of the upload form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    file: Option<SelectedFile>,
    provider: String,
    model: ModelChoice,
    language: TargetLanguage,
    bilingual: BilingualMode,
    api_key: String,
    text_only: bool,
    phase: SubmitPhase,
    message: Option<String>,
    next_ticket: u64,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            file: None,
            provider: DEFAULT_PROVIDER.to_owned(),
            model: ModelChoice::default(),
            language: TargetLanguage::default(),
            bilingual: BilingualMode::default(),
            api_key: String::new(),
            text_only: false,
            phase: SubmitPhase::Idle,
            message: None,
            next_ticket: 0,
        }
    }
}

impl FormState {
    /// Apply one action.
    ///
    /// Returns the request to send when the action starts a submission,
    /// `None` otherwise. Every action has a defined result in every
    /// phase; actions that do not apply are ignored.
    pub fn apply(&mut self, action: FormAction) -> Option<PendingSubmit> {
        match action {
            FormAction::SetFile(file) => self.file = Some(file),
            FormAction::SetProvider(provider) => self.provider = provider,
            FormAction::SetModel(model) => self.model = model,
            FormAction::SetLanguage(language) => self.language = language,
            FormAction::SetBilingual(bilingual) => self.bilingual = bilingual,
            FormAction::SetApiKey(key) => self.api_key = key,
            FormAction::SetTextOnly(text_only) => self.text_only = text_only,
            FormAction::Submit => return self.begin_submit(),
            FormAction::Resolved(ticket, outcome) => self.resolve(ticket, outcome),
        }
        None
    }

    fn begin_submit(&mut self) -> Option<PendingSubmit> {
        if self.is_submitting() {
            return None;
        }
        let Some(file) = self.file.clone() else {
            self.message = Some(NO_FILE_MESSAGE.to_owned());
            return None;
        };

        let ticket = SubmitTicket(self.next_ticket);
        self.next_ticket += 1;
        self.phase = SubmitPhase::Submitting(ticket);
        self.message = None;

        Some(PendingSubmit {
            ticket,
            request: UploadRequest {
                file,
                provider: self.provider.clone(),
                model: self.model,
                language: self.language,
                bilingual: self.bilingual,
                api_key: self.api_key.clone(),
                text_only: self.text_only,
            },
        })
    }

    fn resolve(&mut self, ticket: SubmitTicket, outcome: Result<UploadResult, ApiError>) {
        if self.phase != SubmitPhase::Submitting(ticket) {
            return;
        }
        match outcome {
            Ok(result) => {
                self.message = Some(result.message.clone());
                self.phase = SubmitPhase::Succeeded(result);
            }
            Err(err) => {
                self.message = Some(GENERIC_FAILURE.to_owned());
                self.phase = SubmitPhase::Failed(err);
            }
        }
    }

    #[must_use]
    pub const fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    #[must_use]
    pub const fn model(&self) -> ModelChoice {
        self.model
    }

    #[must_use]
    pub const fn language(&self) -> TargetLanguage {
        self.language
    }

    #[must_use]
    pub const fn bilingual(&self) -> BilingualMode {
        self.bilingual
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub const fn text_only(&self) -> bool {
        self.text_only
    }

    #[must_use]
    pub const fn phase(&self) -> &SubmitPhase {
        &self.phase
    }

    /// Status line under the form: the API message, the generic failure,
    /// or the missing-file prompt.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self.phase, SubmitPhase::Submitting(_))
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.phase, SubmitPhase::Succeeded(_))
    }

    /// Path to open in the viewer. Only `Some` after a successful
    /// submission, which is what gates the "view" control.
    #[must_use]
    pub fn view_target(&self) -> Option<&str> {
        match &self.phase {
            SubmitPhase::Succeeded(result) => Some(&result.translated_path),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::response::interpret_response;

    fn with_file() -> FormState {
        let mut form = FormState::default();
        form.apply(FormAction::SetFile(SelectedFile::new(
            "book.epub",
            b"PK\x03\x04".to_vec(),
        )));
        form
    }

    fn ok_body(path: &str) -> String {
        format!(r#"{{"message":"Successfully processed file","translated_file_path":"{path}"}}"#)
    }

    #[test]
    fn defaults_match_form() {
        let form = FormState::default();
        assert_eq!(form.provider(), "openai");
        assert_eq!(form.model(), ModelChoice::Gpt4o);
        assert_eq!(form.language(), TargetLanguage::English);
        assert_eq!(form.bilingual(), BilingualMode::No);
        assert!(!form.text_only());
        assert_eq!(form.phase(), &SubmitPhase::Idle);
        assert_eq!(form.message(), None);
    }

    #[test]
    fn successful_submission_exposes_stripped_path() {
        let mut form = with_file();
        let pending = form.apply(FormAction::Submit).unwrap();
        let outcome = interpret_response(
            200,
            &ok_body("temp_uploads/book.epub"),
            &ApiConfig::default(),
        );
        form.apply(FormAction::Resolved(pending.ticket, outcome));

        assert!(form.is_success());
        assert_eq!(form.view_target(), Some("book.epub"));
        assert_eq!(form.message(), Some("Successfully processed file"));
    }

    #[test]
    fn non_success_status_keeps_view_hidden() {
        let mut form = with_file();
        let pending = form.apply(FormAction::Submit).unwrap();
        let outcome = interpret_response(500, r#"{"error":"boom"}"#, &ApiConfig::default());
        form.apply(FormAction::Resolved(pending.ticket, outcome));

        assert!(!form.is_success());
        assert_eq!(form.view_target(), None);
        assert_eq!(form.message(), Some(GENERIC_FAILURE));
    }

    #[test]
    fn transport_error_shows_generic_message() {
        let mut form = with_file();
        let pending = form.apply(FormAction::Submit).unwrap();
        form.apply(FormAction::Resolved(
            pending.ticket,
            Err(ApiError::Transport("TypeError: Failed to fetch".into())),
        ));

        assert_eq!(form.message(), Some(GENERIC_FAILURE));
        assert!(matches!(form.phase(), SubmitPhase::Failed(ApiError::Transport(_))));
        assert!(!form.is_submitting());
    }

    #[test]
    fn view_target_absent_until_first_success() {
        let mut form = with_file();
        assert_eq!(form.view_target(), None);

        let first = form.apply(FormAction::Submit).unwrap();
        assert_eq!(form.view_target(), None);
        form.apply(FormAction::Resolved(first.ticket, Err(ApiError::Status(400))));
        assert_eq!(form.view_target(), None);

        let second = form.apply(FormAction::Submit).unwrap();
        form.apply(FormAction::Resolved(
            second.ticket,
            Ok(UploadResult {
                message: "done".into(),
                translated_path: "book_bilingual.epub".into(),
            }),
        ));
        assert_eq!(form.view_target(), Some("book_bilingual.epub"));
    }

    #[test]
    fn changing_language_leaves_other_fields_alone() {
        let mut form = with_file();
        form.apply(FormAction::SetApiKey("sk-1".into()));
        form.apply(FormAction::SetProvider("groq".into()));
        form.apply(FormAction::SetModel(ModelChoice::Gpt4oMini));
        form.apply(FormAction::SetTextOnly(true));
        let before = form.clone();

        form.apply(FormAction::SetLanguage(TargetLanguage::Vietnamese));

        assert_eq!(form.language(), TargetLanguage::Vietnamese);
        assert_eq!(form.api_key(), before.api_key());
        assert_eq!(form.provider(), before.provider());
        assert_eq!(form.model(), before.model());
        assert_eq!(form.text_only(), before.text_only());
        assert_eq!(form.bilingual(), before.bilingual());
        assert_eq!(form.file(), before.file());
        assert_eq!(form.phase(), before.phase());
    }

    #[test]
    fn resubmit_after_failure_uses_current_values() {
        let mut form = with_file();
        form.apply(FormAction::SetApiKey("wrong".into()));
        let first = form.apply(FormAction::Submit).unwrap();
        form.apply(FormAction::Resolved(first.ticket, Err(ApiError::Status(401))));

        form.apply(FormAction::SetApiKey("right".into()));
        form.apply(FormAction::SetLanguage(TargetLanguage::Chinese));
        let second = form
            .apply(FormAction::Submit)
            .expect("resubmission after failure must be possible");

        assert_eq!(second.request.api_key, "right");
        assert_eq!(second.request.language, TargetLanguage::Chinese);
        assert_ne!(first.ticket, second.ticket);
        assert!(form.is_submitting());
        assert_eq!(form.message(), None);
    }

    #[test]
    fn submit_while_in_flight_is_ignored() {
        let mut form = with_file();
        let first = form.apply(FormAction::Submit).unwrap();
        assert!(form.apply(FormAction::Submit).is_none());
        assert_eq!(form.phase(), &SubmitPhase::Submitting(first.ticket));
    }

    #[test]
    fn stale_resolution_is_ignored() {
        let mut form = with_file();
        let first = form.apply(FormAction::Submit).unwrap();
        form.apply(FormAction::Resolved(first.ticket, Err(ApiError::Status(500))));
        let second = form.apply(FormAction::Submit).unwrap();

        // A duplicate resolution for the first ticket arrives late.
        form.apply(FormAction::Resolved(
            first.ticket,
            Ok(UploadResult {
                message: "late".into(),
                translated_path: "late.epub".into(),
            }),
        ));
        assert_eq!(form.phase(), &SubmitPhase::Submitting(second.ticket));
        assert_eq!(form.view_target(), None);
    }

    #[test]
    fn resolution_without_submit_is_ignored() {
        let mut form = with_file();
        form.apply(FormAction::Resolved(SubmitTicket(7), Err(ApiError::Status(500))));
        assert_eq!(form.phase(), &SubmitPhase::Idle);
        assert_eq!(form.message(), None);
    }

    #[test]
    fn submit_without_file_prompts() {
        let mut form = FormState::default();
        assert!(form.apply(FormAction::Submit).is_none());
        assert_eq!(form.phase(), &SubmitPhase::Idle);
        assert_eq!(form.message(), Some(NO_FILE_MESSAGE));
    }

    #[test]
    fn field_edits_keep_result_visible() {
        let mut form = with_file();
        let pending = form.apply(FormAction::Submit).unwrap();
        form.apply(FormAction::Resolved(
            pending.ticket,
            Ok(UploadResult {
                message: "done".into(),
                translated_path: "book.epub".into(),
            }),
        ));
        form.apply(FormAction::SetBilingual(BilingualMode::Yes));
        assert_eq!(form.view_target(), Some("book.epub"));
        assert_eq!(form.message(), Some("done"));
    }
}

//! Shared types for the bilingo upload form.

use std::fmt;
use std::rc::Rc;

/// Translation model offered in the model list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelChoice {
    /// `gpt-4o`
    #[default]
    Gpt4o,
    /// `gpt-4o-mini`
    Gpt4oMini,
}

impl ModelChoice {
    /// All models in display order, for rendering `<option>` lists.
    pub const ALL: [Self; 2] = [Self::Gpt4o, Self::Gpt4oMini];

    /// Identifier sent in the `selectedModel` field and shown to the user.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Gpt4o => "gpt-4o",
            Self::Gpt4oMini => "gpt-4o-mini",
        }
    }

    /// Parse the value of a `<select>` option back into a model.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.id() == id)
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Target language for the translated book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetLanguage {
    #[default]
    English,
    Chinese,
    Japanese,
    Vietnamese,
}

impl TargetLanguage {
    /// All languages in display order.
    pub const ALL: [Self; 4] = [
        Self::English,
        Self::Chinese,
        Self::Japanese,
        Self::Vietnamese,
    ];

    /// Language code sent in the `language` field.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Chinese => "zh",
            Self::Japanese => "ja",
            Self::Vietnamese => "vi",
        }
    }

    /// Human-readable label for the selector.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Chinese => "Chinese",
            Self::Japanese => "Japanese",
            Self::Vietnamese => "Vietnamese",
        }
    }

    /// Parse a language code back into a language.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.code() == code)
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether the output keeps the source text next to the translation.
///
/// The API expects the inverse flag: `single_translate = "True"` means
/// the output contains the translation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BilingualMode {
    /// Translated text only.
    #[default]
    No,
    /// Source and translated text together.
    Yes,
}

impl BilingualMode {
    pub const ALL: [Self; 2] = [Self::No, Self::Yes];

    /// Value of the `single_translate` form field.
    #[must_use]
    pub const fn single_translate_flag(self) -> &'static str {
        match self {
            Self::No => "True",
            Self::Yes => "False",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::No => "No",
            Self::Yes => "Yes",
        }
    }

    /// Parse a `single_translate` flag (as used for `<option>` values).
    #[must_use]
    pub fn from_flag(flag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.single_translate_flag() == flag)
    }
}

/// A file picked by the user, held in memory until submission.
///
/// The bytes are reference counted so building a fresh
/// [`UploadRequest`] on every submission does not copy the book.
#[derive(Clone)]
pub struct SelectedFile {
    /// Original filename, forwarded as the multipart filename.
    pub name: String,
    /// Raw file contents.
    pub bytes: Rc<[u8]>,
}

impl SelectedFile {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: impl Into<Rc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Size of the file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl PartialEq for SelectedFile {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Rc::ptr_eq(&self.bytes, &other.bytes)
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// One submission to `POST /api/process`.
///
/// Built from the form's current field values each time the user
/// submits; never reused across submissions.
#[derive(Clone, PartialEq)]
pub struct UploadRequest {
    pub file: SelectedFile,
    /// Translation provider (`model` field), e.g. `openai`.
    pub provider: String,
    pub model: ModelChoice,
    pub language: TargetLanguage,
    pub bilingual: BilingualMode,
    /// Sent in the clear in the request body.
    pub api_key: String,
    /// Skip translating images embedded in the book.
    pub text_only: bool,
}

impl UploadRequest {
    /// Multipart field name carrying the file blob.
    pub const FILE_FIELD: &'static str = "file";

    /// The text parts of the multipart body, in submission order.
    ///
    /// The file part is appended separately under [`Self::FILE_FIELD`]
    /// because it needs a Blob rather than a string.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("model", self.provider.clone()),
            ("selectedModel", self.model.id().to_owned()),
            ("apiKey", self.api_key.clone()),
            ("language", self.language.code().to_owned()),
            (
                "single_translate",
                self.bilingual.single_translate_flag().to_owned(),
            ),
            ("textOnly", self.text_only.to_string()),
        ]
    }
}

// The API key stays out of logs.
impl fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadRequest")
            .field("file", &self.file)
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("language", &self.language)
            .field("bilingual", &self.bilingual)
            .field("api_key", &"<redacted>")
            .field("text_only", &self.text_only)
            .finish()
    }
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// Status message returned by the API.
    pub message: String,
    /// Path of the translated book relative to the server upload folder.
    pub translated_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> UploadRequest {
        UploadRequest {
            file: SelectedFile::new("book.epub", vec![1u8, 2, 3]),
            provider: "openai".into(),
            model: ModelChoice::Gpt4oMini,
            language: TargetLanguage::Japanese,
            bilingual: BilingualMode::Yes,
            api_key: "sk-test".into(),
            text_only: true,
        }
    }

    #[test]
    fn form_fields_use_api_names_and_encodings() {
        let fields = request().form_fields();
        assert_eq!(
            fields,
            vec![
                ("model", "openai".to_owned()),
                ("selectedModel", "gpt-4o-mini".to_owned()),
                ("apiKey", "sk-test".to_owned()),
                ("language", "ja".to_owned()),
                ("single_translate", "False".to_owned()),
                ("textOnly", "true".to_owned()),
            ]
        );
    }

    #[test]
    fn bilingual_flag_is_inverted() {
        assert_eq!(BilingualMode::No.single_translate_flag(), "True");
        assert_eq!(BilingualMode::Yes.single_translate_flag(), "False");
        assert_eq!(BilingualMode::from_flag("True"), Some(BilingualMode::No));
        assert_eq!(BilingualMode::from_flag("yes"), None);
    }

    #[test]
    fn language_codes_parse_back() {
        for lang in TargetLanguage::ALL {
            assert_eq!(TargetLanguage::from_code(lang.code()), Some(lang));
        }
        assert_eq!(TargetLanguage::from_code("fr"), None);
    }

    #[test]
    fn model_ids_parse_back() {
        for model in ModelChoice::ALL {
            assert_eq!(ModelChoice::from_id(model.id()), Some(model));
        }
        assert_eq!(ModelChoice::default().id(), "gpt-4o");
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let rendered = format!("{:?}", request());
        assert!(!rendered.contains("sk-test"), "{rendered}");
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn selected_file_equality_is_by_identity() {
        let a = SelectedFile::new("a.epub", vec![0u8; 4]);
        let b = SelectedFile::new("a.epub", vec![0u8; 4]);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.len(), 4);
    }
}

//! Dioxus UI components for bilingo.
//!
//! Provides the file picker with drag overlay, the translation upload
//! form, the API status banner, and the EPUB reader widget.

mod api_status;
mod epub_viewer;
mod file_picker;
mod upload_form;

pub use api_status::ApiStatus;
pub use epub_viewer::EpubViewer;
pub use file_picker::FilePicker;
pub use upload_form::UploadForm;

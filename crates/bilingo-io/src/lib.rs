//! bilingo-io: Browser I/O and Dioxus component library.
//!
//! Talks to the translation API with `fetch`, saves files through Blob
//! downloads, and provides the upload form, API status banner, and
//! EPUB reader components used by the bilingo web application.

pub mod components;
pub mod download;
pub mod http;

pub use components::{ApiStatus, EpubViewer, FilePicker, UploadForm};

//! Reader state for the translated-book viewer.
//!
//! The viewer is either waiting for the book, showing it at some
//! [`ReaderLocation`], or showing why it could not load. Navigation is
//! clamped to the spine: moving past either end leaves the location
//! unchanged and reports that nothing happened.

use std::fmt;
use std::rc::Rc;

use crate::book::{Book, BookError};
use crate::response::ApiError;

/// Position inside the book, reported after every navigation.
///
/// Callers should treat it as an opaque token; it is only meaningful
/// for the book it came from and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReaderLocation {
    /// Spine index of the chapter on screen.
    pub chapter: usize,
    /// Manifest id of that chapter.
    pub spine_id: String,
}

impl ReaderLocation {
    /// Location of the first chapter.
    #[must_use]
    pub fn start(spine_id: impl Into<String>) -> Self {
        Self {
            chapter: 0,
            spine_id: spine_id.into(),
        }
    }
}

impl fmt::Display for ReaderLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.spine_id, self.chapter)
    }
}

/// Why the viewer could not show a book.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewerError {
    /// The API has no book at the requested path.
    #[error("translated book not found")]
    NotFound,

    /// The book could not be fetched.
    #[error("could not fetch the translated book: {0}")]
    Fetch(#[from] ApiError),

    /// The bytes arrived but are not a readable EPUB.
    #[error("could not open the translated book: {0}")]
    Decode(#[from] BookError),
}

impl ViewerError {
    /// Map a failed fetch, singling out `404`.
    #[must_use]
    pub fn from_fetch(err: ApiError) -> Self {
        match err {
            ApiError::Status(404) => Self::NotFound,
            other => Self::Fetch(other),
        }
    }

    /// Headline shown in place of the reader.
    #[must_use]
    pub const fn headline(&self) -> &'static str {
        match self {
            Self::NotFound => "Translated book not found",
            Self::Fetch(_) | Self::Decode(_) => "Could not load the translated book",
        }
    }
}

/// Lifecycle of the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReaderState {
    #[default]
    Loading,
    Ready {
        book: Rc<Book>,
        location: ReaderLocation,
    },
    Failed(ViewerError),
}

impl ReaderState {
    /// Show `book` from its first chapter.
    pub fn loaded(&mut self, book: Book) {
        let first_id = book.chapter(0).map(|c| c.id.clone());
        *self = match first_id {
            Some(id) => Self::Ready {
                location: ReaderLocation::start(id),
                book: Rc::new(book),
            },
            None => Self::Failed(ViewerError::Decode(BookError::NoChapters)),
        };
    }

    pub fn failed(&mut self, err: ViewerError) {
        *self = Self::Failed(err);
    }

    #[must_use]
    pub const fn location(&self) -> Option<&ReaderLocation> {
        match self {
            Self::Ready { location, .. } => Some(location),
            _ => None,
        }
    }

    #[must_use]
    pub fn book(&self) -> Option<Rc<Book>> {
        match self {
            Self::Ready { book, .. } => Some(Rc::clone(book)),
            _ => None,
        }
    }

    /// Move to chapter `index`.
    ///
    /// Returns the new location, or `None` when there is no book, the
    /// index is out of range, or it is already the current chapter.
    pub fn goto(&mut self, index: usize) -> Option<&ReaderLocation> {
        let Self::Ready { book, location } = self else {
            return None;
        };
        if index == location.chapter {
            return None;
        }
        let chapter = book.chapter(index)?;
        *location = ReaderLocation {
            chapter: index,
            spine_id: chapter.id.clone(),
        };
        Some(&*location)
    }

    pub fn next(&mut self) -> Option<&ReaderLocation> {
        let current = self.location()?.chapter;
        self.goto(current + 1)
    }

    pub fn prev(&mut self) -> Option<&ReaderLocation> {
        let current = self.location()?.chapter;
        self.goto(current.checked_sub(1)?)
    }

    /// `(current, total)` with a one-based current chapter, for the
    /// position indicator.
    #[must_use]
    pub fn progress(&self) -> Option<(usize, usize)> {
        match self {
            Self::Ready { book, location } => Some((location.chapter + 1, book.chapter_count())),
            _ => None,
        }
    }
}

//! In-page EPUB reader widget.
//!
//! Fetches the book once on mount, decodes it with
//! [`bilingo_core::Book`], and shows one chapter at a time with
//! previous/next buttons and a table-of-contents jump list. Every
//! navigation is reported through `on_location_change`.
//!
//! The widget loads its `url` only when mounted; give it a `key`
//! derived from the url so a different book remounts it.

use std::rc::Rc;

use bilingo_core::{Book, ReaderLocation, ReaderState, ViewerError};
use dioxus::logger::tracing::{info, warn};
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdChevronLeft, LdChevronRight, LdDownload};

use crate::download;
use crate::http;

/// Props for the [`EpubViewer`] component.
#[derive(Props, Clone, PartialEq)]
pub struct EpubViewerProps {
    /// Absolute URL of the EPUB document.
    url: String,
    /// Filename offered when the user downloads the book.
    download_name: String,
    /// Called after every navigation, including the initial one.
    on_location_change: EventHandler<ReaderLocation>,
}

/// Reader widget for a remote EPUB.
#[component]
pub fn EpubViewer(props: EpubViewerProps) -> Element {
    let mut reader = use_signal(ReaderState::default);
    let mut raw = use_signal(|| Option::<Rc<[u8]>>::None);
    let mut download_error = use_signal(|| Option::<String>::None);
    let on_location_change = props.on_location_change;

    let url = props.url.clone();
    use_hook(move || {
        spawn(async move {
            let bytes: Rc<[u8]> = match load(&url).await {
                Ok(bytes) => Rc::from(bytes),
                Err(e) => {
                    warn!(%url, "viewer load failed: {e}");
                    reader.write().failed(e);
                    return;
                }
            };
            raw.set(Some(Rc::clone(&bytes)));

            // Yield so the "Opening book" state paints before the
            // synchronous decode blocks the thread.
            gloo_timers::future::TimeoutFuture::new(0).await;

            match Book::from_bytes(bytes) {
                Ok(book) => {
                    info!(
                        %url,
                        chapters = book.chapter_count(),
                        title = book.title.as_deref().unwrap_or("<untitled>"),
                        "book opened"
                    );
                    reader.write().loaded(book);
                    let location = reader.peek().location().cloned();
                    if let Some(location) = location {
                        on_location_change.call(location);
                    }
                }
                Err(e) => {
                    warn!(%url, "book decode failed: {e}");
                    reader.write().failed(ViewerError::Decode(e));
                }
            }
        });
    });

    // Apply a navigation and report the new location, if it moved.
    let navigate = move |step: Navigation| {
        let moved = {
            let mut state = reader.write();
            match step {
                Navigation::Prev => state.prev().cloned(),
                Navigation::Next => state.next().cloned(),
                Navigation::Goto(index) => state.goto(index).cloned(),
            }
        };
        if let Some(location) = moved {
            on_location_change.call(location);
        }
    };

    let on_download = {
        let name = props.download_name.clone();
        move |_: MouseEvent| {
            let Some(bytes) = raw() else {
                return;
            };
            match download::trigger_download(&bytes, &name, download::EPUB_MIME) {
                Ok(()) => download_error.set(None),
                Err(e) => download_error.set(Some(format!("Download failed: {e}"))),
            }
        }
    };

    let ready = reader.read().book().zip(reader.read().progress());
    if let Some((book, progress)) = ready {
        return render_book(&book, progress, navigate, on_download, download_error());
    }

    match &*reader.read() {
        ReaderState::Failed(err) => {
            let headline = err.headline();
            let detail = err.to_string();
            rsx! {
                div { class: "viewer viewer--centered",
                    div { class: "error-box",
                        p { class: "text-error", "{headline}" }
                        p { class: "text-secondary small", "{detail}" }
                    }
                }
            }
        }
        ReaderState::Loading | ReaderState::Ready { .. } => {
            let label = if raw.read().is_some() {
                "Opening book…"
            } else {
                "Loading translated book…"
            };
            rsx! {
                div { class: "viewer viewer--centered",
                    p { class: "text-secondary pulse", "{label}" }
                }
            }
        }
    }
}

/// Fetch the document bytes, mapping a `404` to [`ViewerError::NotFound`].
#[allow(clippy::future_not_send)]
async fn load(url: &str) -> Result<Vec<u8>, ViewerError> {
    let parsed = url::Url::parse(url).map_err(|e| {
        ViewerError::Fetch(bilingo_core::ApiError::Transport(format!("bad url: {e}")))
    })?;
    http::fetch_bytes(&parsed)
        .await
        .map_err(ViewerError::from_fetch)
}

#[derive(Clone, Copy)]
enum Navigation {
    Prev,
    Next,
    Goto(usize),
}

/// Takes the one-based chapter on screen and the chapter count.
fn render_book(
    book: &Book,
    (position, total): (usize, usize),
    mut navigate: impl FnMut(Navigation) + Copy + 'static,
    on_download: impl FnMut(MouseEvent) + 'static,
    download_error: Option<String>,
) -> Element {
    let current = position.saturating_sub(1);
    let title = book.title.clone().unwrap_or_else(|| "Translated EPUB".to_owned());
    let author = book.author.clone();
    let html = book
        .chapter(current)
        .map(|c| c.html.clone())
        .unwrap_or_default();
    let at_start = position <= 1;
    let at_end = position >= total;
    let toc: Vec<(usize, String)> = book
        .toc
        .iter()
        .filter_map(|entry| {
            let chapter = entry.chapter?;
            let indent = "\u{a0}\u{a0}".repeat(entry.depth);
            Some((chapter, format!("{indent}{}", entry.label)))
        })
        .collect();

    rsx! {
        div { class: "viewer",
            div { class: "viewer-bar",
                div { class: "viewer-title",
                    h2 { "{title}" }
                    if let Some(ref author) = author {
                        p { class: "text-secondary small", "{author}" }
                    }
                }

                if !toc.is_empty() {
                    select {
                        aria_label: "Table of contents",
                        value: "{current}",
                        onchange: move |e| {
                            if let Ok(index) = e.value().parse::<usize>() {
                                navigate(Navigation::Goto(index));
                            }
                        },
                        for (index, label) in toc {
                            option { value: "{index}", selected: index == current, "{label}" }
                        }
                    }
                }

                button {
                    class: "btn",
                    title: "Download EPUB",
                    onclick: on_download,
                    Icon { width: 16, height: 16, icon: LdDownload }
                    " Download EPUB"
                }
            }

            if let Some(ref err) = download_error {
                p { class: "text-error small", "{err}" }
            }

            article {
                class: "chapter",
                dangerous_inner_html: "{html}",
            }

            div { class: "viewer-nav",
                button {
                    class: "btn",
                    disabled: at_start,
                    aria_label: "Previous chapter",
                    onclick: move |_| navigate(Navigation::Prev),
                    Icon { width: 16, height: 16, icon: LdChevronLeft }
                }
                span { class: "text-secondary small", "Chapter {position} of {total}" }
                button {
                    class: "btn",
                    disabled: at_end,
                    aria_label: "Next chapter",
                    onclick: move |_| navigate(Navigation::Next),
                    Icon { width: 16, height: 16, icon: LdChevronRight }
                }
            }
        }
    }
}

use bilingo_core::{ApiConfig, ReaderLocation};
use bilingo_io::{ApiStatus, EpubViewer, UploadForm, download};
use dioxus::logger::tracing::{Level, info, warn};
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdArrowLeft;

#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[layout(Shell)]
    #[route("/")]
    Home {},
    #[route("/view-epub/:file")]
    ViewEpub { file: String },
    #[end_layout]
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

fn main() {
    // Fails only if a subscriber is already installed, which is fine.
    let _ = dioxus::logger::init(Level::INFO);
    dioxus::launch(app);
}

/// API endpoints, overridable at build time with `BILINGO_API_BASE` and
/// `BILINGO_UPLOAD_PREFIX`.
fn api_config() -> ApiConfig {
    let config = match option_env!("BILINGO_API_BASE").map(ApiConfig::from_base) {
        None => ApiConfig::default(),
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            warn!("ignoring BILINGO_API_BASE: {e}");
            ApiConfig::default()
        }
    };
    match option_env!("BILINGO_UPLOAD_PREFIX") {
        Some(prefix) => config.with_upload_prefix(prefix),
        None => config,
    }
}

/// Root application component.
///
/// Provides the [`ApiConfig`] to every page and mounts the router.
fn app() -> Element {
    let config = use_context_provider(api_config);
    use_hook(|| info!(base = %config.base(), "bilingo started"));

    rsx! {
        document::Title { "Bilingo" }
        style { dangerous_inner_html: include_str!("../assets/main.css") }
        Router::<Route> {}
    }
}

/// Page chrome shared by the upload and viewer pages.
#[component]
fn Shell() -> Element {
    rsx! {
        div { class: "page",
            header { class: "page-header",
                Link { to: Route::Home {}, class: "brand", h1 { "Bilingo" } }
                p { class: "text-secondary small", "Bilingual EPUB translation" }
                ApiStatus {}
            }
            main { class: "page-body", Outlet::<Route> {} }
        }
    }
}

/// Upload page. A successful translation offers a link to the viewer.
#[component]
fn Home() -> Element {
    let navigator = use_navigator();

    rsx! {
        section { class: "card",
            h2 { "Translate a book" }
            UploadForm {
                on_view: move |file: String| {
                    info!(%file, "opening viewer");
                    navigator.push(Route::ViewEpub { file });
                },
            }
        }
    }
}

/// Viewer page for one translated book.
#[component]
fn ViewEpub(file: String) -> Element {
    let config: ApiConfig = use_context();
    let mut location = use_signal(|| Option::<ReaderLocation>::None);

    let download_name = download::file_name_of(&file).to_owned();
    let position = match &*location.read() {
        Some(loc) => format!("{download_name} · {loc}"),
        None => download_name.clone(),
    };

    let viewer = match config.view_epub_url(&file) {
        Ok(url) => {
            let url = url.to_string();
            rsx! {
                EpubViewer {
                    key: "{url}",
                    url: url.clone(),
                    download_name: download_name.clone(),
                    on_location_change: move |loc: ReaderLocation| location.set(Some(loc)),
                }
            }
        }
        Err(e) => {
            warn!(%file, "refusing to open book: {e}");
            rsx! {
                div { class: "viewer viewer--centered",
                    div { class: "error-box",
                        p { class: "text-error", "Could not load the translated book" }
                        p { class: "text-secondary small", "{e}" }
                    }
                }
            }
        }
    };

    rsx! {
        section { class: "card card--wide",
            div { class: "viewer-head",
                Link { to: Route::Home {}, class: "btn",
                    Icon { width: 16, height: 16, icon: LdArrowLeft }
                    " Translate another"
                }
                span { class: "text-secondary small", "{position}" }
            }
            {viewer}
        }
    }
}

#[component]
fn NotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    rsx! {
        div { class: "page",
            section { class: "card",
                h2 { "Page not found" }
                p { class: "text-secondary", "Nothing lives at /{path}." }
                Link { to: Route::Home {}, class: "btn btn--primary", "Back to upload" }
            }
        }
    }
}

//! Banner showing whether the translation API answers.

use bilingo_core::{ApiConfig, HELLO_FAILURE};
use dioxus::logger::tracing::warn;
use dioxus::prelude::*;

/// Fetches `/api/hello` once and shows its greeting.
///
/// Purely informational: the form stays usable whatever the banner
/// says.
#[component]
pub fn ApiStatus() -> Element {
    let config: ApiConfig = use_context();

    let hello = use_resource(move || {
        let config = config.clone();
        async move {
            let outcome = crate::http::fetch_hello(&config).await;
            if let Err(ref e) = outcome {
                warn!(base = %config.base(), "API status check failed: {e}");
            }
            outcome
        }
    });

    let (class, text) = match &*hello.read() {
        None => ("api-status text-secondary", "Checking API…".to_owned()),
        Some(Ok(reply)) => ("api-status text-success", reply.message.clone()),
        Some(Err(_)) => ("api-status text-error", HELLO_FAILURE.to_owned()),
    };

    rsx! {
        p { class: "{class}", "{text}" }
    }
}

//! Translation upload form.

use bilingo_core::{
    ApiConfig, BilingualMode, FormAction, FormState, ModelChoice, SubmitPhase, TargetLanguage,
};
use dioxus::logger::tracing::{info, warn};
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdBookOpen;

use crate::components::FilePicker;
use crate::http;

/// Props for the [`UploadForm`] component.
#[derive(Props, Clone, PartialEq)]
pub struct UploadFormProps {
    /// Called with the translated book path when the user asks to view
    /// it. Only reachable after a successful submission.
    on_view: EventHandler<String>,
}

/// The upload form: book, provider, model, language, bilingual and
/// text-only options, API key, and the submit button.
///
/// All field changes and the submission go through
/// [`FormState::apply`]. The one network call is spawned from the
/// submit handler and always ends in a `Resolved` action, which is what
/// releases the in-flight guard.
#[component]
pub fn UploadForm(props: UploadFormProps) -> Element {
    let config: ApiConfig = use_context();
    let mut form = use_signal(FormState::default);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let Some(pending) = form.write().apply(FormAction::Submit) else {
            return;
        };

        let config = config.clone();
        spawn(async move {
            let request = &pending.request;
            info!(
                file = %request.file.name,
                bytes = request.file.len(),
                provider = %request.provider,
                model = %request.model,
                language = request.language.code(),
                "submitting translation request"
            );

            let outcome = http::submit_upload(&config, request).await;
            match &outcome {
                Ok(result) => info!(path = %result.translated_path, "translation finished"),
                Err(e) => warn!("translation request failed: {e}"),
            }
            form.write().apply(FormAction::Resolved(pending.ticket, outcome));
        });
    };

    let state = form.read();
    let selected = state.file().map(|f| f.name.clone());
    let provider = state.provider().to_owned();
    let model = state.model();
    let language = state.language();
    let bilingual = state.bilingual();
    let api_key = state.api_key().to_owned();
    let text_only = state.text_only();
    let submitting = state.is_submitting();
    let message = state.message().map(str::to_owned);
    let failed = matches!(state.phase(), SubmitPhase::Failed(_));
    let view_target = state.view_target().map(str::to_owned);
    drop(state);

    let message_class = if failed { "status text-error" } else { "status" };

    rsx! {
        form { class: "upload-form", onsubmit: on_submit,
            div { class: "field",
                label { r#for: "file", "Select File" }
                FilePicker {
                    selected,
                    disabled: submitting,
                    on_select: move |file| {
                        form.write().apply(FormAction::SetFile(file));
                    },
                }
            }

            div { class: "field",
                label { r#for: "model", "Model" }
                input {
                    r#type: "text",
                    id: "model",
                    value: "{provider}",
                    oninput: move |e| {
                        form.write().apply(FormAction::SetProvider(e.value()));
                    },
                }
            }

            div { class: "field",
                label { r#for: "modelList", "Model List" }
                select {
                    id: "modelList",
                    value: "{model.id()}",
                    onchange: move |e| {
                        match ModelChoice::from_id(&e.value()) {
                            Some(m) => {
                                form.write().apply(FormAction::SetModel(m));
                            }
                            None => warn!("unknown model option {:?}", e.value()),
                        }
                    },
                    for m in ModelChoice::ALL {
                        option { value: m.id(), selected: m == model, "{m}" }
                    }
                }
            }

            div { class: "field",
                label { r#for: "language", "Target Language" }
                select {
                    id: "language",
                    value: language.code(),
                    onchange: move |e| {
                        match TargetLanguage::from_code(&e.value()) {
                            Some(l) => {
                                form.write().apply(FormAction::SetLanguage(l));
                            }
                            None => warn!("unknown language option {:?}", e.value()),
                        }
                    },
                    for l in TargetLanguage::ALL {
                        option { value: l.code(), selected: l == language, "{l}" }
                    }
                }
            }

            div { class: "field",
                label { r#for: "single_translate", "Bilingual" }
                select {
                    id: "single_translate",
                    value: bilingual.single_translate_flag(),
                    onchange: move |e| {
                        match BilingualMode::from_flag(&e.value()) {
                            Some(b) => {
                                form.write().apply(FormAction::SetBilingual(b));
                            }
                            None => warn!("unknown bilingual option {:?}", e.value()),
                        }
                    },
                    for b in BilingualMode::ALL {
                        option {
                            value: b.single_translate_flag(),
                            selected: b == bilingual,
                            "{b.label()}"
                        }
                    }
                }
            }

            div { class: "field",
                label { r#for: "apiKey", "API Key" }
                input {
                    r#type: "text",
                    id: "apiKey",
                    autocomplete: "off",
                    value: "{api_key}",
                    oninput: move |e| {
                        form.write().apply(FormAction::SetApiKey(e.value()));
                    },
                }
            }

            div { class: "field",
                label { r#for: "textOnly", "Translate Text Only" }
                select {
                    id: "textOnly",
                    value: "{text_only}",
                    onchange: move |e| {
                        form.write().apply(FormAction::SetTextOnly(e.value() == "true"));
                    },
                    option { value: "false", selected: !text_only, "No" }
                    option { value: "true", selected: text_only, "Yes" }
                }
            }

            button {
                r#type: "submit",
                class: if submitting { "btn btn--disabled" } else { "btn btn--primary" },
                disabled: submitting,
                if submitting { "Translating…" } else { "Start" }
            }
        }

        if submitting {
            p { class: "status text-secondary pulse", "Translating… this can take a while." }
        }

        if let Some(ref text) = message {
            p { class: "{message_class}", "{text}" }
        }

        if let Some(path) = view_target {
            button {
                class: "btn btn--primary",
                onclick: move |_| props.on_view.call(path.clone()),
                Icon { width: 16, height: 16, icon: LdBookOpen }
                " View Translated EPUB"
            }
        }
    }
}

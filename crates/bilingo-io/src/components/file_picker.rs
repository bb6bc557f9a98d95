//! Book picker with drag-and-drop and file chooser.

use bilingo_core::SelectedFile;
use dioxus::html::{FileData, HasFileData};
use dioxus::logger::tracing::warn;
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdUpload;

/// Props for the [`FilePicker`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FilePickerProps {
    /// Name of the file currently held by the form, if any.
    selected: Option<String>,
    /// Called with the file name and bytes once a file has been read.
    on_select: EventHandler<SelectedFile>,
    /// Blocks new selections while a submission is in flight.
    #[props(default)]
    disabled: bool,
}

/// A drop zone with a "Choose File" button.
///
/// Any file type is accepted; the translation API decides what it can
/// read. Only the first file of a multi-file drop is used.
#[component]
pub fn FilePicker(props: FilePickerProps) -> Element {
    let mut dragging = use_signal(|| false);
    let mut error = use_signal(|| Option::<String>::None);
    let disabled = props.disabled;

    // Shared by the chooser and drop paths.
    let read_first = move |files: Vec<FileData>| async move {
        if disabled {
            return;
        }
        let Some(file) = files.first() else {
            return;
        };
        let name = file.name();
        match file.read_bytes().await {
            Ok(bytes) => {
                error.set(None);
                props.on_select.call(SelectedFile::new(name, bytes.to_vec()));
            }
            Err(e) => {
                warn!(%name, "failed to read picked file: {e}");
                error.set(Some(format!("Failed to read file: {e}")));
            }
        }
    };

    let handle_files = move |evt: FormEvent| async move {
        read_first(evt.files()).await;
    };

    let handle_drop = move |evt: DragEvent| async move {
        evt.prevent_default();
        dragging.set(false);
        read_first(evt.files()).await;
    };

    let zone_class = if dragging() {
        "drop-zone drop-zone--active"
    } else {
        "drop-zone"
    };

    rsx! {
        div {
            class: "{zone_class}",
            ondragover: move |evt| {
                evt.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |_| {
                dragging.set(false);
            },
            ondrop: handle_drop,

            if let Some(ref name) = props.selected {
                p { class: "text-success", "Selected: {name}" }
            }

            if let Some(ref err) = error() {
                p { class: "text-error", "{err}" }
            }

            p { class: "text-secondary", "Drop a book here or " }

            label {
                r#for: "file",
                class: if disabled { "btn btn--disabled" } else { "btn btn--primary" },
                input {
                    r#type: "file",
                    id: "file",
                    class: "hidden",
                    disabled,
                    onchange: handle_files,
                }
                Icon { width: 16, height: 16, icon: LdUpload }
                " Choose File"
            }
        }
    }
}

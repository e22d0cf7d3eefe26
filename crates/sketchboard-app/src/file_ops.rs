//! Platform file picking for image import.
//!
//! Natively the picker blocks and returns the file. On the web a hidden
//! `<input type=file>` is clicked and the chosen file arrives a few frames
//! later through [`take_picked_image`].

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
mod native {
    use sketchboard_core::ImportedFile;

    /// Extensions offered by the image picker.
    const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

    /// Show the native picker. `None` when dismissed or unreadable.
    pub fn pick_image() -> Option<ImportedFile> {
        let path = rfd::FileDialog::new()
            .set_title("Import Image")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()?;

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        match std::fs::read(&path) {
            Ok(bytes) => {
                log::info!("Picked {:?} ({} bytes)", path, bytes.len());
                Some(ImportedFile::from_name(name, bytes))
            }
            Err(e) => {
                log::error!("Failed to read {:?}: {}", path, e);
                None
            }
        }
    }
}

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub use native::pick_image;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use sketchboard_core::ImportedFile;
    use std::cell::RefCell;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;

    thread_local! {
        static PICKED_IMAGE: RefCell<Option<ImportedFile>> = const { RefCell::new(None) };
    }

    /// Take the file chosen since the last call, if any.
    pub fn take_picked_image() -> Option<ImportedFile> {
        PICKED_IMAGE.with(|slot| slot.borrow_mut().take())
    }

    fn set_picked_image(file: ImportedFile) {
        PICKED_IMAGE.with(|slot| *slot.borrow_mut() = Some(file));
    }

    fn read_file(file: web_sys::File) {
        let Ok(reader) = web_sys::FileReader::new() else {
            log::error!("Failed to create FileReader");
            return;
        };

        let name = file.name();
        let media_type = file.type_();
        let reader_clone = reader.clone();
        let onload = Closure::once(Box::new(move |_event: web_sys::Event| {
            let Ok(result) = reader_clone.result() else {
                log::error!("Failed to read '{name}'");
                return;
            };
            let bytes = js_sys::Uint8Array::new(&result).to_vec();
            let file = if media_type.is_empty() {
                ImportedFile::from_name(name, bytes)
            } else {
                ImportedFile::new(name, media_type, bytes)
            };
            log::info!("Picked '{}' ({} bytes)", file.name, file.bytes.len());
            set_picked_image(file);
        }) as Box<dyn FnOnce(_)>);

        reader.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();

        if let Err(e) = reader.read_as_array_buffer(&file) {
            log::error!("Failed to start reading file: {e:?}");
        }
    }

    /// Open the browser file picker restricted to images.
    pub fn request_image() {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document to attach the file picker to");
            return;
        };
        let Some(input) = document
            .create_element("input")
            .ok()
            .and_then(|e| e.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            log::error!("Failed to create file input");
            return;
        };

        input.set_type("file");
        input.set_accept("image/*");
        input.style().set_property("display", "none").ok();

        let input_clone = input.clone();
        let onchange = Closure::once(Box::new(move |_event: web_sys::Event| {
            if let Some(file) = input_clone.files().and_then(|files| files.get(0)) {
                read_file(file);
            }
            // Reset so picking the same file again fires a change event
            input_clone.set_value("");
            input_clone.remove();
        }) as Box<dyn FnOnce(_)>);

        input.set_onchange(Some(onchange.as_ref().unchecked_ref()));
        onchange.forget();

        let Some(body) = document.body() else {
            log::error!("No document body for the file picker");
            return;
        };
        body.append_child(&input).ok();
        input.click();
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::{request_image, take_picked_image};

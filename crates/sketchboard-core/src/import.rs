//! Image import contract between the header and the canvas.
//!
//! The header hands a picked file to [`import_image`] together with whatever
//! [`ImageImportHandler`] the shell registered. Only files whose media type
//! starts with `image/` ever reach the handler.

use std::path::Path;
use thiserror::Error;

/// Media type prefix accepted by the importer.
pub const IMAGE_MEDIA_PREFIX: &str = "image/";

/// A file chosen in the platform picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedFile {
    pub name: String,
    /// Declared media type, e.g. `image/png`. Empty when unknown.
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl ImportedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Build a file whose media type is guessed from the name's extension.
    pub fn from_name(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let media_type = media_type_for_name(&name).unwrap_or_default().to_string();
        Self {
            name,
            media_type,
            bytes,
        }
    }

    /// Whether the declared media type is an image type.
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with(IMAGE_MEDIA_PREFIX)
    }
}

/// Guess a media type from a file name's extension.
pub fn media_type_for_name(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        "json" => Some("application/json"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}

/// Errors raised by an import handler.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file '{0}' is empty")]
    Empty(String),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Receives validated image files.
pub trait ImageImportHandler {
    fn import_image(&mut self, file: ImportedFile) -> Result<(), ImportError>;
}

/// What happened to a picked file.
#[derive(Debug)]
pub enum ImportOutcome {
    /// The handler accepted the image.
    Imported,
    /// The file's media type does not start with `image/`; nothing happened.
    NotAnImage,
    /// The picker was dismissed; nothing happened.
    NoFile,
    /// No handler is registered.
    HandlerMissing,
    /// The handler rejected the file.
    Failed(ImportError),
}

impl ImportOutcome {
    /// Message for the status line, if the user should be told.
    pub fn status_message(&self) -> Option<String> {
        match self {
            ImportOutcome::Imported | ImportOutcome::NotAnImage | ImportOutcome::NoFile => None,
            ImportOutcome::HandlerMissing => Some("Image import is not available".to_string()),
            ImportOutcome::Failed(err) => Some(format!("Import failed: {err}")),
        }
    }
}

/// Route a picked file to the import handler.
pub fn import_image(file: Option<ImportedFile>, handler: Option<&mut dyn ImageImportHandler>) -> ImportOutcome {
    let Some(file) = file else {
        return ImportOutcome::NoFile;
    };

    if !file.is_image() {
        log::debug!("Ignoring '{}' with media type '{}'", file.name, file.media_type);
        return ImportOutcome::NotAnImage;
    }

    let Some(handler) = handler else {
        log::error!("No image import handler registered, dropping '{}'", file.name);
        return ImportOutcome::HandlerMissing;
    };

    let name = file.name.clone();
    match handler.import_image(file) {
        Ok(()) => {
            log::info!("Imported image '{name}'");
            ImportOutcome::Imported
        }
        Err(err) => {
            log::error!("Failed to import '{name}': {err}");
            ImportOutcome::Failed(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        received: Vec<String>,
        reject: bool,
    }

    impl ImageImportHandler for Recorder {
        fn import_image(&mut self, file: ImportedFile) -> Result<(), ImportError> {
            if self.reject {
                return Err(ImportError::Empty(file.name));
            }
            self.received.push(file.name);
            Ok(())
        }
    }

    #[test]
    fn test_image_reaches_handler() {
        let mut handler = Recorder::default();
        let file = ImportedFile::new("cat.png", "image/png", vec![1, 2, 3]);
        let outcome = import_image(Some(file), Some(&mut handler));
        assert!(matches!(outcome, ImportOutcome::Imported));
        assert_eq!(handler.received, vec!["cat.png"]);
    }

    #[test]
    fn test_non_image_never_reaches_handler() {
        let mut handler = Recorder::default();
        for media_type in ["text/plain", "application/json", "", "video/mp4"] {
            let file = ImportedFile::new("notes", media_type, vec![1]);
            let outcome = import_image(Some(file), Some(&mut handler));
            assert!(matches!(outcome, ImportOutcome::NotAnImage));
        }
        assert!(handler.received.is_empty());
    }

    #[test]
    fn test_no_file_is_noop() {
        let mut handler = Recorder::default();
        assert!(matches!(import_image(None, Some(&mut handler)), ImportOutcome::NoFile));
        assert!(handler.received.is_empty());
    }

    #[test]
    fn test_missing_handler_is_reported() {
        let file = ImportedFile::new("cat.png", "image/png", vec![1]);
        let outcome = import_image(Some(file), None);
        assert!(matches!(outcome, ImportOutcome::HandlerMissing));
        assert!(outcome.status_message().is_some());
    }

    #[test]
    fn test_handler_failure_is_reported() {
        let mut handler = Recorder {
            reject: true,
            ..Default::default()
        };
        let file = ImportedFile::new("cat.png", "image/png", vec![]);
        let outcome = import_image(Some(file), Some(&mut handler));
        assert!(matches!(outcome, ImportOutcome::Failed(ImportError::Empty(_))));
    }

    #[test]
    fn test_media_type_from_extension() {
        assert_eq!(ImportedFile::from_name("a/b/Photo.JPG", vec![]).media_type, "image/jpeg");
        assert_eq!(ImportedFile::from_name("notes.txt", vec![]).media_type, "text/plain");
        assert_eq!(ImportedFile::from_name("archive", vec![]).media_type, "");
        assert!(!ImportedFile::from_name("archive", vec![]).is_image());
    }
}

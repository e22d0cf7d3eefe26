//! Sketchboard Core Library
//!
//! Platform-agnostic state and services for the Sketchboard editor: the page
//! shell state coordinator, tool and sketch-session transitions, session
//! lookup, image import and the sketch-generation API client.

pub mod auth;
pub mod camera;
pub mod canvas;
pub mod editor;
pub mod generation;
pub mod http;
pub mod import;
pub mod sketch;
pub mod style;
pub mod task;
pub mod tools;
pub mod zoom;

pub use auth::{AuthGate, HttpSessionProvider, MemorySessionProvider, SessionError, SessionProvider, User};
pub use camera::Camera;
pub use canvas::{CanvasEvent, CanvasImage, CanvasSurface, PointerContext, TextNote};
pub use editor::EditorState;
pub use generation::{ApiVariant, GenerationEndpoint, GenerationError, GenerationResult, SketchClient};
pub use http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};
pub use import::{ImageImportHandler, ImportError, ImportOutcome, ImportedFile, import_image};
pub use sketch::SketchSession;
pub use style::{BrushSize, BrushStyle, HexColor};
pub use task::PendingTask;
pub use tools::{Mode, ToolKind};
pub use zoom::ZoomLevel;

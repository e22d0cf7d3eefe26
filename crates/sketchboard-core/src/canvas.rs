//! Canvas surface: imported images, strokes, text notes and the sketch
//! bounding box.
//!
//! Pointer input arrives in screen coordinates and is mapped through the
//! [`Camera`]. Gestures that the page shell cares about come back as
//! [`CanvasEvent`]s.

use crate::camera::Camera;
use crate::import::{ImageImportHandler, ImportError, ImportedFile};
use crate::style::{BrushStyle, HexColor};
use crate::tools::ToolKind;
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Point, Rect, Size, Vec2};
use std::io::Cursor;
use uuid::Uuid;

/// Largest display edge for a freshly imported image, in world units.
pub const MAX_IMPORT_EDGE: f64 = 800.0;
/// Bounding boxes smaller than this on either side are discarded.
pub const MIN_BOUNDING_BOX_EDGE: f64 = 4.0;
/// Offset between consecutive imports so they do not stack exactly.
const IMPORT_CASCADE: f64 = 24.0;

/// An image placed on the canvas.
#[derive(Debug, Clone)]
pub struct CanvasImage {
    pub id: Uuid,
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
    pub source_width: u32,
    pub source_height: u32,
    /// Display rectangle in world coordinates.
    pub rect: Rect,
}

impl CanvasImage {
    /// Image bytes as standard base64.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// A freehand stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub points: Vec<Point>,
    pub color: HexColor,
    pub width: f64,
}

/// A committed text note.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNote {
    pub id: Uuid,
    pub position: Point,
    pub text: String,
    pub color: HexColor,
}

/// Shell state the canvas needs to interpret a gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerContext {
    pub tool: ToolKind,
    /// A drag draws the sketch bounding box regardless of tool.
    pub awaiting_bounding_box: bool,
    pub brush: BrushStyle,
    pub text_color: HexColor,
}

/// Gestures reported back to the page shell.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// A sketch bounding box was drawn.
    BoundingBoxCreated(Rect),
    /// The text tool was clicked; the shell should ask for the text.
    TextRequested(Point),
    /// A text note was committed.
    TextAdded(Uuid),
}

#[derive(Debug, Clone)]
enum Drag {
    BoundingBox { start: Point, current: Point },
    Stroke,
    MoveImage { id: Uuid, last: Point },
    Pan { last: Point },
}

/// The editable canvas.
#[derive(Debug, Default)]
pub struct CanvasSurface {
    pub camera: Camera,
    pub viewport_size: Size,
    images: Vec<CanvasImage>,
    strokes: Vec<Stroke>,
    notes: Vec<TextNote>,
    bounding_box: Option<Rect>,
    pending_text: Option<Point>,
    drag: Option<Drag>,
}

impl CanvasSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Images back to front.
    pub fn images(&self) -> &[CanvasImage] {
        &self.images
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn notes(&self) -> &[TextNote] {
        &self.notes
    }

    pub fn bounding_box(&self) -> Option<Rect> {
        self.bounding_box
    }

    /// The rectangle being dragged out, if a bounding-box drag is active.
    pub fn bounding_box_preview(&self) -> Option<Rect> {
        match &self.drag {
            Some(Drag::BoundingBox { start, current }) => Some(Rect::from_points(*start, *current)),
            _ => None,
        }
    }

    pub fn clear_bounding_box(&mut self) {
        if matches!(self.drag, Some(Drag::BoundingBox { .. })) {
            self.drag = None;
        }
        self.bounding_box = None;
    }

    /// World position awaiting text, if the text tool was clicked.
    pub fn pending_text(&self) -> Option<Point> {
        self.pending_text
    }

    /// Images whose rectangles overlap the bounding box, back to front.
    pub fn images_in_bounding_box(&self) -> Vec<&CanvasImage> {
        let Some(bbox) = self.bounding_box else {
            return Vec::new();
        };
        self.images
            .iter()
            .filter(|image| {
                let overlap = image.rect.intersect(bbox);
                overlap.width() > 0.0 && overlap.height() > 0.0
            })
            .collect()
    }

    /// Base64 payloads for a generation call: the first image in the
    /// bounding box is the sketch, the second (if any) the material.
    pub fn sketch_payload(&self) -> Option<(String, Option<String>)> {
        let images = self.images_in_bounding_box();
        let sketch = images.first()?.to_base64();
        let material = images.get(1).map(|image| image.to_base64());
        Some((sketch, material))
    }

    /// Place an image centered in the current viewport.
    pub fn add_image(&mut self, file: ImportedFile, width: u32, height: u32) -> Uuid {
        let scale = (MAX_IMPORT_EDGE / f64::from(width.max(height).max(1))).min(1.0);
        let size = Size::new(f64::from(width) * scale, f64::from(height) * scale);

        let viewport_center = Point::new(self.viewport_size.width / 2.0, self.viewport_size.height / 2.0);
        let cascade = IMPORT_CASCADE * self.images.len() as f64;
        let center = self.camera.screen_to_world(viewport_center) + Vec2::new(cascade, cascade);
        let origin = center - Vec2::new(size.width / 2.0, size.height / 2.0);

        let id = Uuid::new_v4();
        self.images.push(CanvasImage {
            id,
            name: file.name,
            media_type: file.media_type,
            bytes: file.bytes,
            source_width: width,
            source_height: height,
            rect: Rect::from_origin_size(origin, size),
        });
        id
    }

    /// Commit the pending text note.
    pub fn commit_text(&mut self, text: &str, color: HexColor) -> Option<CanvasEvent> {
        let position = self.pending_text.take()?;
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let id = Uuid::new_v4();
        self.notes.push(TextNote {
            id,
            position,
            text: text.to_string(),
            color,
        });
        Some(CanvasEvent::TextAdded(id))
    }

    pub fn cancel_text(&mut self) {
        self.pending_text = None;
    }

    fn image_at(&self, world: Point) -> Option<Uuid> {
        self.images
            .iter()
            .rev()
            .find(|image| image.rect.contains(world))
            .map(|image| image.id)
    }

    pub fn pointer_pressed(&mut self, screen: Point, ctx: &PointerContext) -> Option<CanvasEvent> {
        let world = self.camera.screen_to_world(screen);

        if ctx.awaiting_bounding_box {
            self.drag = Some(Drag::BoundingBox {
                start: world,
                current: world,
            });
            return None;
        }

        match ctx.tool {
            ToolKind::Select => {
                self.drag = self.image_at(world).map(|id| Drag::MoveImage { id, last: world });
                None
            }
            ToolKind::Pan => {
                self.drag = Some(Drag::Pan { last: screen });
                None
            }
            ToolKind::Draw => {
                self.strokes.push(Stroke {
                    points: vec![world],
                    color: ctx.brush.color,
                    width: f64::from(ctx.brush.size.get()),
                });
                self.drag = Some(Drag::Stroke);
                None
            }
            ToolKind::Text => {
                self.pending_text = Some(world);
                Some(CanvasEvent::TextRequested(world))
            }
        }
    }

    pub fn pointer_moved(&mut self, screen: Point) {
        let world = self.camera.screen_to_world(screen);
        match &mut self.drag {
            Some(Drag::BoundingBox { current, .. }) => *current = world,
            Some(Drag::Stroke) => {
                if let Some(stroke) = self.strokes.last_mut() {
                    stroke.points.push(world);
                }
            }
            Some(Drag::MoveImage { id, last }) => {
                let delta = world - *last;
                *last = world;
                let id = *id;
                if let Some(image) = self.images.iter_mut().find(|image| image.id == id) {
                    image.rect = image.rect + delta;
                }
            }
            Some(Drag::Pan { last }) => {
                let delta = screen - *last;
                *last = screen;
                self.camera.pan(delta);
            }
            None => {}
        }
    }

    pub fn pointer_released(&mut self, screen: Point) -> Option<CanvasEvent> {
        self.pointer_moved(screen);
        match self.drag.take()? {
            Drag::BoundingBox { start, current } => {
                let rect = Rect::from_points(start, current);
                if rect.width() < MIN_BOUNDING_BOX_EDGE || rect.height() < MIN_BOUNDING_BOX_EDGE {
                    log::debug!("Discarding bounding box {rect:?}, too small");
                    return None;
                }
                self.bounding_box = Some(rect);
                Some(CanvasEvent::BoundingBoxCreated(rect))
            }
            _ => None,
        }
    }
}

impl ImageImportHandler for CanvasSurface {
    fn import_image(&mut self, file: ImportedFile) -> Result<(), ImportError> {
        if file.bytes.is_empty() {
            return Err(ImportError::Empty(file.name));
        }
        let (width, height) = image::ImageReader::new(Cursor::new(&file.bytes))
            .with_guessed_format()
            .map_err(image::ImageError::IoError)?
            .into_dimensions()?;
        log::debug!("Placing '{}' ({width}x{height})", file.name);
        self.add_image(file, width, height);
        Ok(())
    }
}

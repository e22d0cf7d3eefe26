//! Vello-based renderer implementation.

use crate::renderer::{GridStyle, RenderContext, Renderer, RendererError};
use kurbo::{Affine, BezPath, Cap, Join, Point, Rect, Shape as KurboShape, Stroke};
use peniko::{Color, Fill};
use sketchboard_core::HexColor;
use sketchboard_core::canvas::{CanvasImage, Stroke as InkStroke};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use vello::Scene;

/// World-space spacing of the background grid.
const GRID_SIZE: f64 = 20.0;

/// Vello-based renderer for the canvas background, images, strokes and the
/// sketch bounding box.
pub struct VelloRenderer {
    scene: Scene,
    /// Camera zoom of the current frame (for zoom-independent outlines).
    zoom: f64,
    accent: Color,
    /// Decoded images keyed by canvas image id. `None` marks bytes that
    /// failed to decode so they are not retried every frame.
    image_cache: HashMap<Uuid, Option<peniko::ImageData>>,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn to_color(color: HexColor) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, 255)
}

fn decode_image(image: &CanvasImage) -> Result<peniko::ImageData, RendererError> {
    let decoded = ::image::load_from_memory(&image.bytes)
        .map_err(|source| RendererError::ImageDecode { id: image.id, source })?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(peniko::ImageData {
        data: peniko::Blob::new(Arc::new(rgba.into_vec())),
        format: peniko::ImageFormat::Rgba8,
        width,
        height,
        alpha_type: peniko::ImageAlphaType::Alpha,
    })
}

impl VelloRenderer {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            zoom: 1.0,
            accent: Color::from_rgba8(59, 130, 246, 255),
            image_cache: HashMap::new(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the built scene, leaving an empty one.
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    /// Number of images with a cached decode attempt.
    pub fn cached_images(&self) -> usize {
        self.image_cache.len()
    }

    fn render_image(&mut self, image: &CanvasImage, transform: Affine) {
        let cached = self
            .image_cache
            .entry(image.id)
            .or_insert_with(|| {
                decode_image(image)
                    .inspect_err(|e| log::warn!("{e}"))
                    .ok()
            })
            .clone();

        let Some(image_data) = cached else {
            self.render_image_placeholder(image.rect, transform);
            return;
        };

        let bounds = image.rect;
        let scale_x = bounds.width() / f64::from(image_data.width);
        let scale_y = bounds.height() / f64::from(image_data.height);
        let image_transform = transform
            * Affine::translate((bounds.x0, bounds.y0))
            * Affine::scale_non_uniform(scale_x, scale_y);

        self.scene.draw_image(&peniko::ImageBrush::from(image_data), image_transform);
    }

    /// Gray box with an X for images that could not be decoded.
    fn render_image_placeholder(&mut self, bounds: Rect, transform: Affine) {
        let rect_path = bounds.to_path(0.1);
        self.scene
            .fill(Fill::NonZero, transform, Color::from_rgba8(70, 70, 70, 255), None, &rect_path);

        let stroke = Stroke::new(2.0 / self.zoom);
        let mut x_path = BezPath::new();
        x_path.move_to(Point::new(bounds.x0, bounds.y0));
        x_path.line_to(Point::new(bounds.x1, bounds.y1));
        x_path.move_to(Point::new(bounds.x1, bounds.y0));
        x_path.line_to(Point::new(bounds.x0, bounds.y1));
        self.scene
            .stroke(&stroke, transform, Color::from_rgba8(120, 120, 120, 255), None, &x_path);
    }

    fn render_stroke(&mut self, ink: &InkStroke, transform: Affine) {
        let Some((first, rest)) = ink.points.split_first() else {
            return;
        };
        let color = to_color(ink.color);

        // A single click leaves a dot
        if rest.is_empty() {
            let dot = kurbo::Circle::new(*first, ink.width / 2.0);
            self.scene.fill(Fill::NonZero, transform, color, None, &dot);
            return;
        }

        let mut path = BezPath::new();
        path.move_to(*first);
        for point in rest {
            path.line_to(*point);
        }
        let stroke = Stroke::new(ink.width)
            .with_caps(Cap::Round)
            .with_join(Join::Round);
        self.scene.stroke(&stroke, transform, color, None, &path);
    }

    /// Sketch bounding box. The in-progress drag is dashed.
    fn render_bounding_box(&mut self, rect: Rect, transform: Affine, preview: bool) {
        let path = rect.to_path(0.1);
        self.scene
            .fill(Fill::NonZero, transform, self.accent.with_alpha(0.08), None, &path);

        let width = 1.5 / self.zoom;
        let stroke = if preview {
            let dash = 6.0 / self.zoom;
            Stroke::new(width).with_dashes(0.0, [dash, dash])
        } else {
            Stroke::new(width)
        };
        self.scene.stroke(&stroke, transform, self.accent, None, &path);
    }

    /// Calculate grid bounds from viewport and transform.
    fn grid_bounds(&self, viewport: Rect, transform: Affine) -> (f64, f64, f64, f64) {
        let inv = transform.inverse();
        let world_tl = inv * Point::new(viewport.x0, viewport.y0);
        let world_br = inv * Point::new(viewport.x1, viewport.y1);

        let start_x = (world_tl.x / GRID_SIZE).floor() * GRID_SIZE;
        let start_y = (world_tl.y / GRID_SIZE).floor() * GRID_SIZE;
        let end_x = (world_br.x / GRID_SIZE).ceil() * GRID_SIZE;
        let end_y = (world_br.y / GRID_SIZE).ceil() * GRID_SIZE;

        (start_x, start_y, end_x, end_y)
    }

    fn render_grid_lines(&mut self, viewport: Rect, transform: Affine) {
        let grid_color = Color::from_rgba8(255, 255, 255, 14);
        let stroke = Stroke::new(0.5 / self.zoom);
        let (start_x, start_y, end_x, end_y) = self.grid_bounds(viewport, transform);

        let mut path = BezPath::new();
        let mut x = start_x;
        while x <= end_x {
            path.move_to(Point::new(x, start_y));
            path.line_to(Point::new(x, end_y));
            x += GRID_SIZE;
        }
        let mut y = start_y;
        while y <= end_y {
            path.move_to(Point::new(start_x, y));
            path.line_to(Point::new(end_x, y));
            y += GRID_SIZE;
        }
        self.scene.stroke(&stroke, transform, grid_color, None, &path);
    }

    /// Dots at intersections, batched into one path.
    fn render_grid_dots(&mut self, viewport: Rect, transform: Affine) {
        let grid_color = Color::from_rgba8(255, 255, 255, 28);
        let dot_size = 1.0 / self.zoom;
        let (start_x, start_y, end_x, end_y) = self.grid_bounds(viewport, transform);

        let mut path = BezPath::new();
        let mut x = start_x;
        while x <= end_x {
            let mut y = start_y;
            while y <= end_y {
                path.move_to(Point::new(x - dot_size, y - dot_size));
                path.line_to(Point::new(x + dot_size, y - dot_size));
                path.line_to(Point::new(x + dot_size, y + dot_size));
                path.line_to(Point::new(x - dot_size, y + dot_size));
                path.close_path();
                y += GRID_SIZE;
            }
            x += GRID_SIZE;
        }
        self.scene.fill(Fill::NonZero, transform, grid_color, None, &path);
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.scene.reset();
        self.accent = ctx.accent_color;
        self.zoom = ctx.canvas.camera.zoom;

        let camera_transform = ctx.canvas.camera.transform();
        let viewport = Rect::new(0.0, 0.0, ctx.viewport_size.width, ctx.viewport_size.height);

        match ctx.grid_style {
            GridStyle::None => {}
            GridStyle::Lines => self.render_grid_lines(viewport, camera_transform),
            GridStyle::Dots => self.render_grid_dots(viewport, camera_transform),
        }

        // Drop decodes of images no longer on the canvas
        self.image_cache
            .retain(|id, _| ctx.canvas.images().iter().any(|image| image.id == *id));

        for image in ctx.canvas.images() {
            self.render_image(image, camera_transform);
        }

        for ink in ctx.canvas.strokes() {
            self.render_stroke(ink, camera_transform);
        }

        if let Some(rect) = ctx.canvas.bounding_box() {
            self.render_bounding_box(rect, camera_transform, false);
        }
        if let Some(rect) = ctx.canvas.bounding_box_preview() {
            self.render_bounding_box(rect, camera_transform, true);
        }
    }
}

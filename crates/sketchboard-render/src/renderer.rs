//! Renderer trait abstraction.

use peniko::Color;
use sketchboard_core::CanvasSurface;
use kurbo::Size;
use thiserror::Error;
use uuid::Uuid;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("failed to decode image {id}: {source}")]
    ImageDecode {
        id: Uuid,
        #[source]
        source: image::ImageError,
    },
}

/// Grid display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridStyle {
    /// Plain background.
    None,
    /// Full grid lines.
    Lines,
    /// Dots at intersections.
    #[default]
    Dots,
}

impl std::str::FromStr for GridStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(GridStyle::None),
            "lines" => Ok(GridStyle::Lines),
            "dots" => Ok(GridStyle::Dots),
            other => Err(format!("unknown grid style '{other}'")),
        }
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    pub canvas: &'a CanvasSurface,
    /// Viewport size in logical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    pub background_color: Color,
    pub grid_style: GridStyle,
    /// Color of the sketch bounding box.
    pub accent_color: Color,
}

impl<'a> RenderContext<'a> {
    pub fn new(canvas: &'a CanvasSurface, viewport_size: Size) -> Self {
        Self {
            canvas,
            viewport_size,
            scale_factor: 1.0,
            background_color: Color::from_rgba8(33, 33, 33, 255),
            grid_style: GridStyle::default(),
            accent_color: Color::from_rgba8(59, 130, 246, 255),
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_grid(mut self, style: GridStyle) -> Self {
        self.grid_style = style;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Build the scene for a frame. Called once per frame.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_from_str() {
        assert_eq!("Lines".parse::<GridStyle>(), Ok(GridStyle::Lines));
        assert!("hex".parse::<GridStyle>().is_err());
    }
}

//! Color swatches and the brush palette.

use egui::{Color32, CornerRadius, CursorIcon, Rect, Sense, Stroke, StrokeKind, Ui, Vec2, vec2};

use crate::{sizing, theme};

/// Brush and text colors offered by the sub-bars, in display order.
pub const PALETTE: &[(&str, Color32)] = &[
    ("Red", Color32::from_rgb(0xFF, 0x00, 0x00)),
    ("Orange", Color32::from_rgb(0xF9, 0x73, 0x16)),
    ("Yellow", Color32::from_rgb(0xFA, 0xCC, 0x15)),
    ("Green", Color32::from_rgb(0x22, 0xC5, 0x5E)),
    ("Blue", Color32::from_rgb(0x3B, 0x82, 0xF6)),
    ("Purple", Color32::from_rgb(0xA8, 0x55, 0xF7)),
    ("White", Color32::from_rgb(0xFF, 0xFF, 0xFF)),
    ("Black", Color32::from_rgb(0x00, 0x00, 0x00)),
];

/// A clickable color swatch.
pub struct ColorSwatch<'a> {
    color: Color32,
    tooltip: &'a str,
    selected: bool,
    size: Vec2,
    circular: bool,
}

impl<'a> ColorSwatch<'a> {
    pub fn new(color: Color32, tooltip: &'a str) -> Self {
        Self {
            color,
            tooltip,
            selected: false,
            size: vec2(sizing::SMALL, sizing::SMALL),
            circular: true,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Draw as a rounded square instead of a circle.
    pub fn square(mut self) -> Self {
        self.circular = false;
        self
    }

    /// Show the swatch and return (clicked, rect).
    pub fn show(self, ui: &mut Ui) -> (bool, Rect) {
        let (rect, response) = ui.allocate_exact_size(self.size, Sense::click());

        if ui.is_rect_visible(rect) {
            let center = rect.center();
            let radius = rect.width().min(rect.height()) / 2.0;

            if self.circular {
                ui.painter().circle_filled(center, radius, self.color);
                ui.painter()
                    .circle_stroke(center, radius, Stroke::new(1.0, theme::BORDER));
                if self.selected {
                    ui.painter()
                        .circle_stroke(center, radius + 2.5, Stroke::new(1.5, theme::ACCENT));
                }
            } else {
                let corner = CornerRadius::same(sizing::CORNER_RADIUS);
                ui.painter().rect_filled(rect, corner, self.color);
                if self.selected {
                    ui.painter()
                        .rect_stroke(rect, corner, Stroke::new(2.0, theme::ACCENT), StrokeKind::Outside);
                }
            }
        }

        let clicked = response.clicked();
        response.on_hover_text(self.tooltip).on_hover_cursor(CursorIcon::PointingHand);
        (clicked, rect)
    }
}

/// Check if two colors match, ignoring alpha.
pub fn colors_match(a: Color32, b: Color32) -> bool {
    a.r() == b.r() && a.g() == b.g() && a.b() == b.b()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_match_ignores_alpha() {
        let opaque = Color32::from_rgb(10, 20, 30);
        let faded = Color32::from_rgba_premultiplied(10, 20, 30, 128);
        assert!(colors_match(opaque, opaque));
        assert!(!colors_match(opaque, Color32::from_rgb(10, 20, 31)));
        assert!(colors_match(opaque, faded));
    }

    #[test]
    fn test_palette_starts_with_default_red() {
        assert_eq!(PALETTE[0].1, Color32::from_rgb(0xFF, 0, 0));
        assert!(PALETTE.iter().all(|(_, c)| c.a() == 255));
    }
}

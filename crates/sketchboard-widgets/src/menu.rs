//! Panel frames for the header, floating panels and toolbars.

use egui::{Color32, CornerRadius, Frame, Margin, Stroke};

use crate::{sizing, theme};

fn shadow(blur: u8, alpha: u8) -> egui::epaint::Shadow {
    egui::epaint::Shadow {
        spread: 0,
        blur,
        offset: [5, 4],
        color: Color32::from_black_alpha(alpha),
    }
}

/// The header bar frame.
pub fn header_frame() -> Frame {
    Frame::new()
        .fill(theme::PANEL_BG)
        .corner_radius(CornerRadius::same(sizing::PANEL_RADIUS))
        .stroke(Stroke::new(1.0, theme::BORDER))
        .shadow(shadow(30, 64))
        .inner_margin(Margin::symmetric(12, 7))
}

/// A floating panel (sub-bars, mode panel, overlays).
pub fn panel_frame() -> Frame {
    Frame::new()
        .fill(theme::PANEL_BG)
        .corner_radius(CornerRadius::same(sizing::PANEL_RADIUS))
        .stroke(Stroke::new(1.0, theme::BORDER))
        .shadow(shadow(16, 48))
        .inner_margin(Margin::same(10))
}

/// A compact toolbar (sidebar, zoom bar, user bar).
pub fn toolbar_frame() -> Frame {
    Frame::new()
        .fill(theme::PANEL_BG)
        .corner_radius(CornerRadius::same(sizing::PANEL_RADIUS))
        .stroke(Stroke::new(1.0, theme::BORDER))
        .shadow(shadow(12, 40))
        .inner_margin(Margin::symmetric(6, 6))
}

//! Layout helpers: separators and section labels.

use egui::{Pos2, Stroke, Ui};

use crate::theme;

/// Draw a horizontal separator line.
pub fn separator(ui: &mut Ui) {
    let rect = ui.available_rect_before_wrap();
    let y = rect.top() + 4.0;
    ui.painter().line_segment(
        [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
        Stroke::new(1.0, theme::SEPARATOR),
    );
    ui.add_space(8.0);
}

/// Draw a vertical separator line, 21px tall like the header dividers.
pub fn vertical_separator(ui: &mut Ui) {
    ui.add_space(4.0);
    let rect = ui.available_rect_before_wrap();
    let height = 21.0;
    let x = rect.left() + 1.0;
    let top = rect.center().y - height / 2.0;
    ui.painter().line_segment(
        [Pos2::new(x, top), Pos2::new(x, top + height)],
        Stroke::new(1.0, theme::SEPARATOR),
    );
    ui.add_space(6.0);
}

/// Draw a section label (small, muted text).
pub fn section_label(ui: &mut Ui, text: &str) {
    ui.label(egui::RichText::new(text).size(10.0).color(theme::TEXT_MUTED));
}

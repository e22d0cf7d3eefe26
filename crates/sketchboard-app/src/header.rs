//! The header bar: logo, board title and the Import/Export/Undo/Redo buttons.

use egui::{Align2, Context, ImageSource, Vec2, include_image};
use sketchboard_widgets::{ButtonInteraction, StatefulIconButton, header_frame, theme, vertical_separator};

/// Title shown next to the logo.
pub const BOARD_TITLE: &str = "Board 1";

/// Header buttons, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    Import,
    Export,
    Undo,
    Redo,
}

impl HeaderAction {
    pub const ALL: [HeaderAction; 4] = [
        HeaderAction::Import,
        HeaderAction::Export,
        HeaderAction::Undo,
        HeaderAction::Redo,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HeaderAction::Import => "Import",
            HeaderAction::Export => "Export",
            HeaderAction::Undo => "Undo",
            HeaderAction::Redo => "Redo",
        }
    }

    fn index(self) -> usize {
        match self {
            HeaderAction::Import => 0,
            HeaderAction::Export => 1,
            HeaderAction::Undo => 2,
            HeaderAction::Redo => 3,
        }
    }

    /// Default, hover and pressed artwork.
    fn icons(self) -> [ImageSource<'static>; 3] {
        match self {
            HeaderAction::Import => [
                include_image!("../assets/import.svg"),
                include_image!("../assets/import-hover.svg"),
                include_image!("../assets/import-clicked.svg"),
            ],
            HeaderAction::Export => [
                include_image!("../assets/export.svg"),
                include_image!("../assets/export-hover.svg"),
                include_image!("../assets/export-clicked.svg"),
            ],
            HeaderAction::Undo => [
                include_image!("../assets/undo.svg"),
                include_image!("../assets/undo-hover.svg"),
                include_image!("../assets/undo-clicked.svg"),
            ],
            HeaderAction::Redo => [
                include_image!("../assets/redo.svg"),
                include_image!("../assets/redo-hover.svg"),
                include_image!("../assets/redo-clicked.svg"),
            ],
        }
    }
}

/// Per-button interaction state, kept across frames.
#[derive(Debug, Clone, Default)]
pub struct HeaderState {
    buttons: [ButtonInteraction; 4],
}

impl HeaderState {
    pub fn button(&self, action: HeaderAction) -> &ButtonInteraction {
        &self.buttons[action.index()]
    }

    pub fn button_mut(&mut self, action: HeaderAction) -> &mut ButtonInteraction {
        &mut self.buttons[action.index()]
    }

    /// The header is not shown: drop hover flags and pending flashes.
    pub fn unmount(&mut self) {
        for button in &mut self.buttons {
            button.cancel();
            button.set_hovered(false);
        }
    }
}

/// Render the header and return the activated action, if any.
pub fn render_header(ctx: &Context, state: &mut HeaderState) -> Option<HeaderAction> {
    let mut activated = None;

    egui::Area::new(egui::Id::new("header"))
        .anchor(Align2::LEFT_TOP, Vec2::new(12.0, 12.0))
        .show(ctx, |ui| {
            header_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing = Vec2::new(6.0, 0.0);

                    ui.add(
                        egui::Image::new(include_image!("../assets/logo.svg"))
                            .fit_to_exact_size(Vec2::new(24.0, 24.0)),
                    );
                    vertical_separator(ui);
                    ui.label(egui::RichText::new(BOARD_TITLE).size(14.0).color(theme::TEXT));
                    vertical_separator(ui);

                    for action in HeaderAction::ALL {
                        let [default_icon, hover_icon, pressed_icon] = action.icons();
                        StatefulIconButton::new(default_icon, hover_icon, pressed_icon, action.label()).show(
                            ui,
                            state.button_mut(action),
                            || activated = Some(action),
                        );
                    }
                });
            });
        });

    if let Some(action) = activated {
        log::debug!("Header action: {}", action.label());
    }
    activated
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchboard_widgets::ButtonState;

    #[test]
    fn test_buttons_are_independent() {
        let mut state = HeaderState::default();
        state.button_mut(HeaderAction::Undo).activate_with(1.0, || {});
        state.button_mut(HeaderAction::Redo).set_hovered(true);

        assert_eq!(state.button(HeaderAction::Undo).state(1.05), ButtonState::Pressed);
        assert_eq!(state.button(HeaderAction::Redo).state(1.05), ButtonState::Hovered);
        assert_eq!(state.button(HeaderAction::Import).state(1.05), ButtonState::Idle);
    }

    #[test]
    fn test_unmount_clears_pending_flash() {
        let mut state = HeaderState::default();
        state.button_mut(HeaderAction::Import).set_hovered(true);
        state.button_mut(HeaderAction::Import).activate_with(0.0, || {});
        state.unmount();
        assert_eq!(state.button(HeaderAction::Import).state(0.01), ButtonState::Idle);
    }

    #[test]
    fn test_labels_in_order() {
        let labels: Vec<_> = HeaderAction::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(labels, ["Import", "Export", "Undo", "Redo"]);
    }
}

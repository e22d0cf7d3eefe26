//! egui widgets for the Sketchboard editor.
//!
//! - **Buttons**: three-state icon buttons, tool buttons, text buttons
//! - **Interaction**: the hover/pressed state machine behind stateful buttons
//! - **Colors**: swatches and the brush palette
//! - **Menu**: header, panel and toolbar frames
//! - **Layout**: separators and section labels

pub mod buttons;
pub mod colors;
pub mod interaction;
pub mod layout;
pub mod menu;

pub use buttons::{IconButton, IconButtonStyle, StatefulIconButton, TextButton};
pub use colors::{ColorSwatch, PALETTE, colors_match};
pub use interaction::{ButtonInteraction, ButtonState, PRESSED_FLASH_SECS};
pub use layout::{section_label, separator, vertical_separator};
pub use menu::{header_frame, panel_frame, toolbar_frame};

/// Standard sizing constants used across widgets.
pub mod sizing {
    /// Small button size (color swatches)
    pub const SMALL: f32 = 20.0;
    /// Header button size
    pub const HEADER_BUTTON: f32 = 30.0;
    /// Sidebar tool button size
    pub const TOOL: f32 = 40.0;
    pub const CORNER_RADIUS: u8 = 6;
    /// Panel corner radius
    pub const PANEL_RADIUS: u8 = 12;
}

/// Dark theme colors.
pub mod theme {
    use egui::Color32;

    /// Canvas background
    pub const CANVAS_BG: Color32 = Color32::from_rgb(33, 33, 33);
    /// Header and panel background
    pub const PANEL_BG: Color32 = Color32::from_rgb(26, 26, 26);
    /// Panel border (white at 10%)
    pub const BORDER: Color32 = Color32::from_rgba_premultiplied(26, 26, 26, 26);
    /// Thin separators inside panels
    pub const SEPARATOR: Color32 = Color32::from_rgb(43, 43, 43);
    pub const TEXT: Color32 = Color32::WHITE;
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(150, 150, 150);
    /// Selection/active color
    pub const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);
    pub const HOVER_BG: Color32 = Color32::from_rgb(45, 45, 45);
    pub const ERROR: Color32 = Color32::from_rgb(248, 113, 113);
}

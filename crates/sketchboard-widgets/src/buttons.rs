//! Button components: stateful icon buttons, tool buttons, text buttons.

use std::time::Duration;

use egui::{
    Align2, Color32, CornerRadius, CursorIcon, Image, ImageSource, Rect, Response, Sense, Ui, Vec2,
    WidgetInfo, WidgetType, vec2,
};

use crate::interaction::{ButtonInteraction, ButtonState};
use crate::{sizing, theme};

/// An icon button with separate default, hover and pressed artwork.
///
/// The caller owns the [`ButtonInteraction`] so the hover flag and pressed
/// deadline survive between frames.
pub struct StatefulIconButton<'a> {
    default_icon: ImageSource<'a>,
    hover_icon: ImageSource<'a>,
    pressed_icon: ImageSource<'a>,
    label: &'a str,
    size: Vec2,
}

impl<'a> StatefulIconButton<'a> {
    pub fn new(
        default_icon: ImageSource<'a>,
        hover_icon: ImageSource<'a>,
        pressed_icon: ImageSource<'a>,
        label: &'a str,
    ) -> Self {
        Self {
            default_icon,
            hover_icon,
            pressed_icon,
            label,
            size: vec2(sizing::HEADER_BUTTON, sizing::HEADER_BUTTON),
        }
    }

    pub fn size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    /// Show the button. `on_click` runs at most once per frame, before the
    /// pressed flash starts.
    pub fn show(self, ui: &mut Ui, interaction: &mut ButtonInteraction, on_click: impl FnOnce()) -> Response {
        let (rect, response) = ui.allocate_exact_size(self.size, Sense::click());
        let now = ui.input(|i| i.time);

        interaction.set_hovered(response.hovered());
        if response.clicked() {
            interaction.activate_with(now, on_click);
        }

        // Wake up again when the flash ends
        if let Some(remaining) = interaction.remaining(now) {
            ui.ctx().request_repaint_after(Duration::from_secs_f64(remaining));
        }

        if ui.is_rect_visible(rect) {
            let icon = match interaction.state(now) {
                ButtonState::Pressed => self.pressed_icon,
                ButtonState::Hovered => self.hover_icon,
                ButtonState::Idle => self.default_icon,
            };
            Image::new(icon).fit_to_exact_size(self.size).paint_at(ui, rect);
        }

        let label = self.label;
        response.widget_info(|| WidgetInfo::labeled(WidgetType::Button, true, label));
        response.on_hover_text(label).on_hover_cursor(CursorIcon::PointingHand)
    }
}

/// Style configuration for icon buttons.
#[derive(Clone)]
pub struct IconButtonStyle {
    pub size: Vec2,
    /// Icon size (should be smaller than button size)
    pub icon_size: Vec2,
    pub corner_radius: u8,
    pub bg_color: Color32,
    pub hover_color: Color32,
    pub selected_color: Color32,
    pub icon_tint: Color32,
    pub selected_icon_tint: Color32,
}

impl Default for IconButtonStyle {
    fn default() -> Self {
        Self::tool()
    }
}

impl IconButtonStyle {
    /// Sidebar tool button (solid accent when selected)
    pub fn tool() -> Self {
        Self {
            size: vec2(sizing::TOOL, sizing::TOOL),
            icon_size: vec2(20.0, 20.0),
            corner_radius: sizing::CORNER_RADIUS,
            bg_color: Color32::TRANSPARENT,
            hover_color: theme::HOVER_BG,
            selected_color: theme::ACCENT,
            icon_tint: Color32::from_gray(200),
            selected_icon_tint: Color32::WHITE,
        }
    }

    /// Compact button for the zoom bar
    pub fn small() -> Self {
        Self {
            size: vec2(24.0, 24.0),
            icon_size: vec2(14.0, 14.0),
            ..Self::tool()
        }
    }
}

/// A single-icon button with a selected state.
pub struct IconButton<'a> {
    icon: ImageSource<'a>,
    tooltip: &'a str,
    shortcut: Option<&'a str>,
    selected: bool,
    style: IconButtonStyle,
}

impl<'a> IconButton<'a> {
    pub fn new(icon: ImageSource<'a>, tooltip: &'a str) -> Self {
        Self {
            icon,
            tooltip,
            shortcut: None,
            selected: false,
            style: IconButtonStyle::default(),
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn style(mut self, style: IconButtonStyle) -> Self {
        self.style = style;
        self
    }

    pub fn small(mut self) -> Self {
        self.style = IconButtonStyle::small();
        self
    }

    /// Set keyboard shortcut (shown in hover tooltip).
    pub fn shortcut(mut self, shortcut: &'a str) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    /// Show the button and return true if clicked.
    pub fn show(self, ui: &mut Ui) -> bool {
        let (rect, response) = ui.allocate_exact_size(self.style.size, Sense::click());

        if ui.is_rect_visible(rect) {
            let bg_color = if self.selected {
                self.style.selected_color
            } else if response.hovered() {
                self.style.hover_color
            } else {
                self.style.bg_color
            };
            ui.painter()
                .rect_filled(rect, CornerRadius::same(self.style.corner_radius), bg_color);

            let tint = if self.selected {
                self.style.selected_icon_tint
            } else {
                self.style.icon_tint
            };
            let icon_rect = Rect::from_center_size(rect.center(), self.style.icon_size);
            Image::new(self.icon)
                .fit_to_exact_size(self.style.icon_size)
                .tint(tint)
                .paint_at(ui, icon_rect);
        }

        let clicked = response.clicked();
        let (tooltip, selected) = (self.tooltip, self.selected);
        response.widget_info(|| WidgetInfo::selected(WidgetType::Button, true, selected, tooltip));
        let response = match self.shortcut {
            Some(shortcut) => response.on_hover_ui(|ui| {
                ui.horizontal(|ui| {
                    ui.label(tooltip);
                    ui.label(
                        egui::RichText::new(format!("({shortcut})"))
                            .color(theme::TEXT_MUTED)
                            .small(),
                    );
                });
            }),
            None => response.on_hover_text(tooltip),
        };
        response.on_hover_cursor(CursorIcon::PointingHand);
        clicked
    }
}

/// A text button drawn on the dark panels.
pub struct TextButton<'a> {
    label: &'a str,
    primary: bool,
    enabled: bool,
    min_width: f32,
}

impl<'a> TextButton<'a> {
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            primary: false,
            enabled: true,
            min_width: 0.0,
        }
    }

    /// Fill with the accent color.
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn min_width(mut self, width: f32) -> Self {
        self.min_width = width;
        self
    }

    /// Show the button and return true if clicked while enabled.
    pub fn show(self, ui: &mut Ui) -> bool {
        let font_id = egui::FontId::proportional(13.0);
        let galley = ui
            .painter()
            .layout_no_wrap(self.label.to_string(), font_id.clone(), Color32::PLACEHOLDER);
        let width = (galley.size().x + 24.0).max(self.min_width);
        let sense = if self.enabled { Sense::click() } else { Sense::hover() };
        let (rect, response) = ui.allocate_exact_size(vec2(width, 28.0), sense);

        if ui.is_rect_visible(rect) {
            let bg_color = match (self.enabled, self.primary, response.hovered()) {
                (false, _, _) => theme::HOVER_BG.gamma_multiply(0.6),
                (true, true, _) => theme::ACCENT,
                (true, false, true) => theme::HOVER_BG,
                (true, false, false) => theme::SEPARATOR,
            };
            let text_color = if self.enabled { theme::TEXT } else { theme::TEXT_MUTED };

            ui.painter()
                .rect_filled(rect, CornerRadius::same(sizing::CORNER_RADIUS), bg_color);
            ui.painter()
                .text(rect.center(), Align2::CENTER_CENTER, self.label, font_id, text_color);
        }

        let clicked = self.enabled && response.clicked();
        if self.enabled {
            response.on_hover_cursor(CursorIcon::PointingHand);
        }
        clicked
    }
}

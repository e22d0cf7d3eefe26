//! UI panels around the canvas, drawn with egui.
//!
//! Panels read [`EditorState`] and report what the user did as a
//! [`UiAction`]; the app applies the action to the editor and canvas.

use egui::{
    Align2, Color32, Context, FontId, ImageSource, Key, LayerId, Pos2, Sense, Vec2,
    include_image,
};
use sketchboard_core::{BrushSize, CanvasSurface, EditorState, HexColor, Mode, ToolKind, User};
use sketchboard_widgets::{
    ColorSwatch, IconButton, PALETTE, TextButton, colors_match, panel_frame, section_label, separator,
    theme, toolbar_frame, vertical_separator,
};

use crate::header::{HeaderAction, HeaderState, render_header};
use crate::shortcuts::ShortcutRegistry;

/// Progress of the current generation request, shown in the generation panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenerationStatus {
    #[default]
    Idle,
    Running,
    Failed(String),
    Succeeded(String),
}

/// UI state kept across frames.
#[derive(Debug, Default)]
pub struct UiState {
    pub header: HeaderState,
    /// Prompt typed in the sketch bar.
    pub prompt: String,
    // Auth overlay form
    pub email: String,
    pub password: String,
    pub auth_error: Option<String>,
    /// A sign-in or sign-out call is in flight.
    pub auth_busy: bool,
    /// One-line message at the bottom of the screen.
    pub status: Option<String>,
    pub generation: GenerationStatus,
    /// Text typed into the text-note popup.
    pub text_entry: String,
    /// The keyboard shortcut list is showing.
    pub shortcuts_open: bool,
}

impl UiState {
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }
}

/// Actions that can be triggered by the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    SelectTool(ToolKind),
    ActivateSketchMode,
    CloseSketchBar,
    /// Open the image picker.
    Import,
    Export,
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    SetBrushColor(HexColor),
    SetBrushSize(BrushSize),
    SetTextColor(HexColor),
    /// Send the bounding-box images with this prompt.
    Generate { prompt: String },
    SignIn { email: String, password: String },
    SignOut,
    CommitText(String),
    CancelText,
    ToggleShortcuts,
}

impl From<HeaderAction> for UiAction {
    fn from(action: HeaderAction) -> Self {
        match action {
            HeaderAction::Import => UiAction::Import,
            HeaderAction::Export => UiAction::Export,
            HeaderAction::Undo => UiAction::Undo,
            HeaderAction::Redo => UiAction::Redo,
        }
    }
}

fn to_color32(color: HexColor) -> Color32 {
    Color32::from_rgb(color.r, color.g, color.b)
}

fn from_color32(color: Color32) -> HexColor {
    HexColor::rgb(color.r(), color.g(), color.b())
}

fn tool_icon(tool: ToolKind) -> ImageSource<'static> {
    match tool {
        ToolKind::Select => include_image!("../assets/select.svg"),
        ToolKind::Pan => include_image!("../assets/pan.svg"),
        ToolKind::Draw => include_image!("../assets/draw.svg"),
        ToolKind::Text => include_image!("../assets/text.svg"),
    }
}

/// Render all UI and return any triggered action.
///
/// While the auth gate is closed only the overlay is built; the header's
/// interaction state is reset so no flash survives the unmount.
pub fn render_ui(
    ctx: &Context,
    ui_state: &mut UiState,
    editor: &EditorState,
    canvas: &CanvasSurface,
) -> Option<UiAction> {
    egui_extras::install_image_loaders(ctx);

    if editor.is_gated() {
        ui_state.header.unmount();
        return render_auth_overlay(ctx, ui_state);
    }

    render_text_notes(ctx, canvas);

    let header_action = render_header(ctx, &mut ui_state.header).map(UiAction::from);
    let sidebar_action = render_sidebar(ctx, editor);
    let sub_bar_action = if editor.shows_brush_sub_bar() {
        render_brush_sub_bar(ctx, editor)
    } else if editor.shows_text_sub_bar() {
        render_text_sub_bar(ctx, editor)
    } else {
        None
    };
    let mode_action = render_mode_panel(ctx, editor);
    let sketch_action = if editor.is_sketch_bar_open() {
        render_sketch_sub_bar(ctx, ui_state, editor, canvas)
    } else {
        None
    };
    render_generation_panel(ctx, ui_state);
    let zoom_action = render_zoom_bar(ctx, editor);
    let user_action = editor
        .auth()
        .user()
        .filter(|_| editor.shows_user_bar())
        .and_then(|user| render_user_bar(ctx, ui_state, user));
    let text_action = canvas.pending_text().and_then(|world| {
        let screen = canvas.camera.world_to_screen(world);
        render_text_entry(ctx, ui_state, screen)
    });
    render_status_line(ctx, ui_state);
    let help_action = if ui_state.shortcuts_open {
        render_shortcuts_panel(ctx)
    } else {
        None
    };

    header_action
        .or(sidebar_action)
        .or(sub_bar_action)
        .or(mode_action)
        .or(sketch_action)
        .or(zoom_action)
        .or(user_action)
        .or(text_action)
        .or(help_action)
}

/// Convert a physical-pixel canvas position to egui points.
fn to_ui_pos(ctx: &Context, screen: kurbo::Point) -> Pos2 {
    let ppp = ctx.pixels_per_point();
    Pos2::new(screen.x as f32 / ppp, screen.y as f32 / ppp)
}

/// Text notes are drawn by egui underneath the panels.
fn render_text_notes(ctx: &Context, canvas: &CanvasSurface) {
    let painter = ctx.layer_painter(LayerId::background());
    let size = (16.0 * canvas.camera.zoom) as f32;
    for note in canvas.notes() {
        let pos = to_ui_pos(ctx, canvas.camera.world_to_screen(note.position));
        painter.text(
            pos,
            Align2::LEFT_TOP,
            &note.text,
            FontId::proportional(size),
            to_color32(note.color),
        );
    }
}

/// Render the tool sidebar.
fn render_sidebar(ctx: &Context, editor: &EditorState) -> Option<UiAction> {
    let mut action = None;

    egui::Area::new(egui::Id::new("sidebar"))
        .anchor(Align2::LEFT_CENTER, Vec2::new(12.0, 0.0))
        .show(ctx, |ui| {
            toolbar_frame().show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.spacing_mut().item_spacing = Vec2::new(0.0, 2.0);

                    for tool in ToolKind::ALL {
                        if IconButton::new(tool_icon(tool), tool.label())
                            .shortcut(ShortcutRegistry::tool_hint(tool))
                            .selected(editor.selected_tool() == Some(tool))
                            .show(ui)
                        {
                            action = Some(UiAction::SelectTool(tool));
                        }
                    }
                });
            });
        });

    action
}

fn palette_row(ui: &mut egui::Ui, current: HexColor) -> Option<HexColor> {
    let mut picked = None;
    let current = to_color32(current);
    for (name, color) in PALETTE {
        let (clicked, _) = ColorSwatch::new(*color, name)
            .selected(colors_match(current, *color))
            .show(ui);
        if clicked {
            picked = Some(from_color32(*color));
        }
    }
    picked
}

/// Brush color and size, shown while the draw tool is selected.
fn render_brush_sub_bar(ctx: &Context, editor: &EditorState) -> Option<UiAction> {
    let mut action = None;
    let brush = editor.brush();

    egui::Area::new(egui::Id::new("brush_sub_bar"))
        .anchor(Align2::CENTER_TOP, Vec2::new(0.0, 12.0))
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    section_label(ui, "Brush");
                    if let Some(color) = palette_row(ui, brush.color) {
                        action = Some(UiAction::SetBrushColor(color));
                    }
                    vertical_separator(ui);

                    let mut size = brush.size.get();
                    let slider = egui::Slider::new(&mut size, BrushSize::MIN..=BrushSize::MAX).suffix(" px");
                    if ui.add(slider).changed() {
                        action = Some(UiAction::SetBrushSize(BrushSize::new(size)));
                    }
                });
            });
        });

    action
}

/// Text color, shown while the text tool is selected.
fn render_text_sub_bar(ctx: &Context, editor: &EditorState) -> Option<UiAction> {
    let mut action = None;

    egui::Area::new(egui::Id::new("text_sub_bar"))
        .anchor(Align2::CENTER_TOP, Vec2::new(0.0, 12.0))
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    section_label(ui, "Text");
                    if let Some(color) = palette_row(ui, editor.text_color()) {
                        action = Some(UiAction::SetTextColor(color));
                    }
                });
            });
        });

    action
}

/// The sketch-mode button and the active mode label.
fn render_mode_panel(ctx: &Context, editor: &EditorState) -> Option<UiAction> {
    let mut action = None;

    egui::Area::new(egui::Id::new("mode_panel"))
        .anchor(Align2::RIGHT_TOP, Vec2::new(-12.0, 72.0))
        .show(ctx, |ui| {
            toolbar_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    if IconButton::new(include_image!("../assets/sketch.svg"), "Sketch to image")
                        .shortcut("S")
                        .selected(editor.mode() == Some(Mode::Sketch))
                        .show(ui)
                    {
                        action = Some(UiAction::ActivateSketchMode);
                    }

                    let label = editor.mode_label();
                    if !label.is_empty() {
                        ui.label(egui::RichText::new(label).size(12.0).color(theme::TEXT_MUTED));
                    }
                });
            });
        });

    action
}

/// The sketch bar: asks for a bounding box, then for a prompt.
fn render_sketch_sub_bar(
    ctx: &Context,
    ui_state: &mut UiState,
    editor: &EditorState,
    canvas: &CanvasSurface,
) -> Option<UiAction> {
    let mut action = None;
    let running = ui_state.generation == GenerationStatus::Running;

    egui::Area::new(egui::Id::new("sketch_sub_bar"))
        .anchor(Align2::CENTER_BOTTOM, Vec2::new(0.0, -24.0))
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    if editor.is_bounding_box_created() {
                        let has_sketch = !canvas.images_in_bounding_box().is_empty();

                        let response = ui.add(
                            egui::TextEdit::singleline(&mut ui_state.prompt)
                                .hint_text("Describe the image to generate")
                                .desired_width(280.0),
                        );
                        let submitted =
                            response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

                        let generate = TextButton::new("Generate")
                            .primary()
                            .enabled(has_sketch && !running)
                            .show(ui);
                        if (generate || (submitted && has_sketch && !running)) && action.is_none() {
                            action = Some(UiAction::Generate {
                                prompt: ui_state.prompt.trim().to_string(),
                            });
                        }
                        if !has_sketch {
                            section_label(ui, "No image inside the box");
                        }
                    } else {
                        ui.label(
                            egui::RichText::new("Drag on the canvas to draw a bounding box")
                                .size(13.0)
                                .color(theme::TEXT),
                        );
                    }

                    vertical_separator(ui);
                    if IconButton::new(include_image!("../assets/close.svg"), "Close")
                        .shortcut("Esc")
                        .small()
                        .show(ui)
                    {
                        action = Some(UiAction::CloseSketchBar);
                    }
                });
            });
        });

    action
}

/// Progress and result of the last generation call.
fn render_generation_panel(ctx: &Context, ui_state: &mut UiState) {
    if ui_state.generation == GenerationStatus::Idle {
        return;
    }

    let mut dismiss = false;
    egui::Area::new(egui::Id::new("generation_panel"))
        .anchor(Align2::RIGHT_BOTTOM, Vec2::new(-12.0, -12.0))
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.set_max_width(320.0);
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        section_label(ui, "Generation");
                        if !matches!(ui_state.generation, GenerationStatus::Running)
                            && IconButton::new(include_image!("../assets/close.svg"), "Dismiss")
                                .small()
                                .show(ui)
                        {
                            dismiss = true;
                        }
                    });
                    match &ui_state.generation {
                        GenerationStatus::Idle => {}
                        GenerationStatus::Running => {
                            ui.horizontal(|ui| {
                                ui.spinner();
                                ui.label(egui::RichText::new("Generating...").color(theme::TEXT));
                            });
                        }
                        GenerationStatus::Failed(message) => {
                            ui.label(egui::RichText::new(message).color(theme::ERROR));
                        }
                        GenerationStatus::Succeeded(summary) => {
                            ui.label(egui::RichText::new(summary).color(theme::TEXT));
                        }
                    }
                });
            });
        });

    if dismiss {
        ui_state.generation = GenerationStatus::Idle;
    }
}

/// Zoom out, current percentage, zoom in.
fn render_zoom_bar(ctx: &Context, editor: &EditorState) -> Option<UiAction> {
    let mut action = None;

    egui::Area::new(egui::Id::new("zoom_bar"))
        .anchor(Align2::LEFT_BOTTOM, Vec2::new(12.0, -12.0))
        .show(ctx, |ui| {
            toolbar_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing = Vec2::new(4.0, 0.0);
                    if IconButton::new(include_image!("../assets/zoom-out.svg"), "Zoom out")
                        .shortcut("Ctrl+-")
                        .small()
                        .show(ui)
                    {
                        action = Some(UiAction::ZoomOut);
                    }
                    ui.add_sized(
                        Vec2::new(44.0, 24.0),
                        egui::Label::new(
                            egui::RichText::new(editor.zoom().to_string())
                                .size(12.0)
                                .color(theme::TEXT),
                        ),
                    );
                    if IconButton::new(include_image!("../assets/zoom-in.svg"), "Zoom in")
                        .shortcut("Ctrl+=")
                        .small()
                        .show(ui)
                    {
                        action = Some(UiAction::ZoomIn);
                    }
                    vertical_separator(ui);
                    if TextButton::new("?").show(ui) {
                        action = Some(UiAction::ToggleShortcuts);
                    }
                });
            });
        });

    action
}

/// Signed-in user and the logout button.
fn render_user_bar(ctx: &Context, ui_state: &UiState, user: &User) -> Option<UiAction> {
    let mut action = None;

    egui::Area::new(egui::Id::new("user_bar"))
        .anchor(Align2::RIGHT_TOP, Vec2::new(-12.0, 12.0))
        .show(ctx, |ui| {
            toolbar_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(user.display_name())
                            .size(13.0)
                            .color(theme::TEXT),
                    );
                    if TextButton::new("Log out").enabled(!ui_state.auth_busy).show(ui) {
                        action = Some(UiAction::SignOut);
                    }
                });
            });
        });

    action
}

/// Full-screen sign-in overlay. Nothing else is built while it is up.
fn render_auth_overlay(ctx: &Context, ui_state: &mut UiState) -> Option<UiAction> {
    let mut action = None;

    #[allow(deprecated)]
    let screen_rect = ctx.input(|i| i.content_rect());
    egui::Area::new(egui::Id::new("auth_backdrop"))
        .fixed_pos(Pos2::ZERO)
        .order(egui::Order::Middle)
        .interactable(true)
        .show(ctx, |ui| {
            let (rect, _) = ui.allocate_exact_size(screen_rect.size(), Sense::click_and_drag());
            ui.painter().rect_filled(rect, 0.0, Color32::from_black_alpha(160));
        });

    egui::Area::new(egui::Id::new("auth_overlay"))
        .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
        .order(egui::Order::Foreground)
        .interactable(true)
        .show(ctx, |ui| {
            panel_frame().inner_margin(egui::Margin::same(24)).show(ui, |ui| {
                ui.set_width(300.0);
                ui.vertical(|ui| {
                    ui.spacing_mut().item_spacing = Vec2::new(0.0, 10.0);
                    ui.label(egui::RichText::new("Sign in").size(18.0).strong().color(theme::TEXT));

                    section_label(ui, "Email");
                    ui.add(
                        egui::TextEdit::singleline(&mut ui_state.email)
                            .hint_text("you@example.com")
                            .desired_width(f32::INFINITY),
                    );
                    section_label(ui, "Password");
                    let password = ui.add(
                        egui::TextEdit::singleline(&mut ui_state.password)
                            .password(true)
                            .desired_width(f32::INFINITY),
                    );
                    let submitted = password.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

                    if let Some(error) = &ui_state.auth_error {
                        ui.label(egui::RichText::new(error).size(12.0).color(theme::ERROR));
                    }

                    let ready = !ui_state.auth_busy && !ui_state.email.trim().is_empty();
                    let clicked = ui
                        .horizontal(|ui| {
                            let clicked = TextButton::new("Sign in")
                                .primary()
                                .enabled(ready)
                                .min_width(96.0)
                                .show(ui);
                            if ui_state.auth_busy {
                                ui.spinner();
                            }
                            clicked
                        })
                        .inner;

                    if clicked || (submitted && ready) {
                        action = Some(UiAction::SignIn {
                            email: ui_state.email.trim().to_string(),
                            password: ui_state.password.clone(),
                        });
                    }
                });
            });
        });

    action
}

/// Popup asking for the text of a new note at `screen`.
fn render_text_entry(ctx: &Context, ui_state: &mut UiState, screen: kurbo::Point) -> Option<UiAction> {
    let mut action = None;

    egui::Area::new(egui::Id::new("text_entry"))
        .fixed_pos(to_ui_pos(ctx, screen))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut ui_state.text_entry)
                            .hint_text("Type text")
                            .desired_width(200.0),
                    );
                    if !response.has_focus() && !response.lost_focus() {
                        response.request_focus();
                    }

                    let (enter, escape) = ui.input(|i| (i.key_pressed(Key::Enter), i.key_pressed(Key::Escape)));
                    if TextButton::new("Add").primary().show(ui) || (response.lost_focus() && enter) {
                        action = Some(UiAction::CommitText(ui_state.text_entry.clone()));
                    } else if TextButton::new("Cancel").show(ui) || escape {
                        action = Some(UiAction::CancelText);
                    }
                });
            });
        });

    action
}

/// One-line status message, dismissed by clicking it.
/// Every keyboard shortcut, with a close button.
fn render_shortcuts_panel(ctx: &Context) -> Option<UiAction> {
    let mut action = None;

    egui::Area::new(egui::Id::new("shortcuts_panel"))
        .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.set_width(320.0);
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("Keyboard Shortcuts").size(14.0).strong().color(theme::TEXT));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if IconButton::new(include_image!("../assets/close.svg"), "Close")
                            .small()
                            .show(ui)
                        {
                            action = Some(UiAction::ToggleShortcuts);
                        }
                    });
                });
                separator(ui);

                for shortcut in ShortcutRegistry::all() {
                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new(shortcut.format())
                                .size(12.0)
                                .family(egui::FontFamily::Monospace)
                                .color(theme::TEXT_MUTED),
                        );
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.label(egui::RichText::new(shortcut.description).size(12.0).color(theme::TEXT));
                        });
                    });
                }
            });
        });

    action
}

fn render_status_line(ctx: &Context, ui_state: &mut UiState) {
    let Some(message) = ui_state.status.as_deref() else {
        return;
    };

    let mut dismiss = false;
    egui::Area::new(egui::Id::new("status_line"))
        .anchor(Align2::CENTER_BOTTOM, Vec2::new(0.0, -84.0))
        .show(ctx, |ui| {
            toolbar_frame().show(ui, |ui| {
                let response = ui
                    .add(
                        egui::Label::new(egui::RichText::new(message).size(12.0).color(theme::TEXT))
                            .sense(Sense::click()),
                    )
                    .on_hover_text("Click to dismiss");
                dismiss = response.clicked();
            });
        });

    if dismiss {
        ui_state.status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchboard_core::AuthGate;

    fn run_frame(ui_state: &mut UiState, editor: &EditorState, canvas: &CanvasSurface) -> Option<UiAction> {
        let ctx = Context::default();
        let mut action = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            action = render_ui(ctx, ui_state, editor, canvas);
        });
        action
    }

    #[test]
    fn test_color_conversion() {
        let color = HexColor::rgb(0x12, 0x34, 0x56);
        assert_eq!(from_color32(to_color32(color)), color);
    }

    #[test]
    fn test_header_actions_map() {
        assert_eq!(UiAction::from(HeaderAction::Import), UiAction::Import);
        assert_eq!(UiAction::from(HeaderAction::Redo), UiAction::Redo);
    }

    #[test]
    fn test_gated_frame_unmounts_header() {
        let mut ui_state = UiState::default();
        ui_state.header.button_mut(HeaderAction::Export).set_hovered(true);
        ui_state.header.button_mut(HeaderAction::Export).activate_with(0.0, || {});

        let mut editor = EditorState::new();
        editor.apply_user_lookup(None);
        assert!(matches!(editor.auth(), AuthGate::SignedOut));

        let action = run_frame(&mut ui_state, &editor, &CanvasSurface::new());
        assert_eq!(action, None);
        let export = ui_state.header.button(HeaderAction::Export);
        assert!(!export.is_hovered());
        assert_eq!(export.remaining(0.0), None);
    }

    #[test]
    fn test_shortcuts_panel_frame_has_no_action() {
        let mut ui_state = UiState {
            shortcuts_open: true,
            ..UiState::default()
        };
        let editor = EditorState::new();
        assert_eq!(run_frame(&mut ui_state, &editor, &CanvasSurface::new()), None);
        assert!(ui_state.shortcuts_open);
    }

    #[test]
    fn test_idle_frame_has_no_action() {
        let mut ui_state = UiState::default();
        let editor = EditorState::new();
        assert_eq!(run_frame(&mut ui_state, &editor, &CanvasSurface::new()), None);
    }
}

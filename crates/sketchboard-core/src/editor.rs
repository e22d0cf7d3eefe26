//! Page shell state: tool selection, sketch session, styling, zoom and the
//! auth gate, plus the visibility rules derived from them.

use crate::auth::{AuthGate, User};
use crate::canvas::{CanvasEvent, PointerContext};
use crate::sketch::SketchSession;
use crate::style::{BrushSize, BrushStyle, HexColor};
use crate::tools::{Mode, ToolKind};
use crate::zoom::ZoomLevel;

/// Cross-cutting UI state owned by the page shell.
///
/// Every transition runs on the UI thread; panels read the derived flags
/// and call back into the transition methods.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    tool: Option<ToolKind>,
    mode: Option<Mode>,
    sketch: SketchSession,
    brush: BrushStyle,
    text_color: HexColor,
    zoom: ZoomLevel,
    auth: AuthGate,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            tool: Some(ToolKind::Select),
            mode: None,
            sketch: SketchSession::Inactive,
            brush: BrushStyle::default(),
            text_color: HexColor::RED,
            zoom: ZoomLevel::default(),
            auth: AuthGate::Pending,
        }
    }
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Tools and sketch session ---

    /// Select a tool from the sidebar.
    ///
    /// While the sketch bar waits for a bounding box, picking a tool cancels
    /// the sketch session and leaves the mode label empty.
    pub fn select_tool(&mut self, tool: ToolKind) {
        if self.sketch.is_awaiting_bounding_box() {
            self.sketch = SketchSession::Inactive;
            self.tool = Some(tool);
            self.mode = None;
            log::debug!("Sketch session cancelled by tool '{}'", tool.id());
            return;
        }
        self.tool = Some(tool);
        self.mode = Some(Mode::Tool(tool));
        log::debug!("Tool selected: {}", tool.id());
    }

    /// Open the sketch bar and wait for a bounding box. No tool is selected
    /// while the box is drawn.
    pub fn activate_sketch_mode(&mut self) {
        self.sketch = SketchSession::AwaitingBoundingBox;
        self.tool = None;
        self.mode = Some(Mode::Sketch);
        log::debug!("Sketch mode activated");
    }

    /// The canvas finished drawing the bounding box.
    pub fn bounding_box_created(&mut self) {
        if !self.sketch.is_bar_open() {
            log::warn!("Bounding box reported while the sketch bar is closed");
            return;
        }
        self.sketch = SketchSession::BoundingBoxReady;
        self.tool = Some(ToolKind::Select);
    }

    /// Close the sketch bar. Safe to call in any state.
    pub fn close_sketch_bar(&mut self) {
        self.sketch = SketchSession::Inactive;
        self.tool = Some(ToolKind::Select);
    }

    /// Text was inserted on the canvas.
    pub fn text_added(&mut self) {
        self.tool = Some(ToolKind::Select);
        self.mode = Some(Mode::Tool(ToolKind::Select));
    }

    /// Route a canvas gesture to the matching transition.
    pub fn handle_canvas_event(&mut self, event: &CanvasEvent) {
        match event {
            CanvasEvent::BoundingBoxCreated(_) => self.bounding_box_created(),
            CanvasEvent::TextAdded(_) => self.text_added(),
            CanvasEvent::TextRequested(_) => {}
        }
    }

    /// The selected tool, `None` while a bounding box is being drawn.
    pub fn selected_tool(&self) -> Option<ToolKind> {
        self.tool
    }

    /// Tool the canvas should act with.
    pub fn canvas_tool(&self) -> ToolKind {
        self.tool.unwrap_or(ToolKind::Select)
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    /// Mode label for the mode panel; empty when no mode is set.
    pub fn mode_label(&self) -> &'static str {
        self.mode.map_or("", Mode::label)
    }

    pub fn sketch_session(&self) -> SketchSession {
        self.sketch
    }

    pub fn is_sketch_bar_open(&self) -> bool {
        self.sketch.is_bar_open()
    }

    pub fn is_bounding_box_created(&self) -> bool {
        self.sketch.has_bounding_box()
    }

    /// What the canvas needs to interpret pointer input.
    pub fn pointer_context(&self) -> PointerContext {
        PointerContext {
            tool: self.canvas_tool(),
            awaiting_bounding_box: self.sketch.is_awaiting_bounding_box(),
            brush: self.brush,
            text_color: self.text_color,
        }
    }

    // --- Styling ---

    pub fn brush(&self) -> BrushStyle {
        self.brush
    }

    pub fn set_brush_color(&mut self, color: HexColor) {
        self.brush.color = color;
    }

    pub fn set_brush_size(&mut self, size: BrushSize) {
        self.brush.size = size;
    }

    pub fn text_color(&self) -> HexColor {
        self.text_color
    }

    pub fn set_text_color(&mut self, color: HexColor) {
        self.text_color = color;
    }

    // --- Zoom ---

    pub fn zoom(&self) -> ZoomLevel {
        self.zoom
    }

    pub fn zoom_in(&mut self) {
        self.zoom = self.zoom.zoomed_in();
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.zoomed_out();
    }

    // --- Auth ---

    pub fn auth(&self) -> &AuthGate {
        &self.auth
    }

    /// Result of the startup user lookup.
    pub fn apply_user_lookup(&mut self, user: Option<User>) {
        self.auth = match user {
            Some(user) => AuthGate::SignedIn(user),
            None => AuthGate::SignedOut,
        };
    }

    pub fn auth_succeeded(&mut self, user: User) {
        log::info!("Signed in as {}", user.display_name());
        self.auth = AuthGate::SignedIn(user);
    }

    pub fn logged_out(&mut self) {
        log::info!("Signed out");
        self.auth = AuthGate::SignedOut;
    }

    /// Whether the auth overlay is the only interactive surface.
    pub fn is_gated(&self) -> bool {
        self.auth.is_gated()
    }

    // --- Derived visibility ---

    pub fn shows_brush_sub_bar(&self) -> bool {
        self.tool == Some(ToolKind::Draw)
    }

    pub fn shows_text_sub_bar(&self) -> bool {
        self.tool == Some(ToolKind::Text)
    }

    pub fn shows_user_bar(&self) -> bool {
        self.auth.user().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            email: Some("a@b.c".to_string()),
        }
    }

    #[test]
    fn test_initial_state() {
        let state = EditorState::new();
        assert_eq!(state.selected_tool(), Some(ToolKind::Select));
        assert_eq!(state.mode_label(), "");
        assert_eq!(state.zoom().percent(), 100);
        assert_eq!(state.brush(), BrushStyle::default());
        assert!(!state.is_sketch_bar_open());
        assert!(!state.is_gated());
        assert!(!state.shows_user_bar());
    }

    #[test]
    fn test_select_tool_sets_mode() {
        let mut state = EditorState::new();
        state.select_tool(ToolKind::Draw);
        assert_eq!(state.selected_tool(), Some(ToolKind::Draw));
        assert_eq!(state.mode(), Some(Mode::Tool(ToolKind::Draw)));
        assert!(state.shows_brush_sub_bar());
        assert!(!state.shows_text_sub_bar());
    }

    #[test]
    fn test_tool_before_bounding_box_cancels_sketch() {
        let mut state = EditorState::new();
        state.activate_sketch_mode();
        assert!(state.is_sketch_bar_open());
        assert_eq!(state.selected_tool(), None);
        assert_eq!(state.canvas_tool(), ToolKind::Select);
        assert!(state.pointer_context().awaiting_bounding_box);

        state.select_tool(ToolKind::Text);
        assert!(!state.is_sketch_bar_open());
        assert!(!state.is_bounding_box_created());
        assert_eq!(state.selected_tool(), Some(ToolKind::Text));
        assert_eq!(state.mode_label(), "");
    }

    #[test]
    fn test_bounding_box_then_close() {
        let mut state = EditorState::new();
        state.activate_sketch_mode();
        state.handle_canvas_event(&CanvasEvent::BoundingBoxCreated(Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert!(state.is_bounding_box_created());
        assert!(state.is_sketch_bar_open());
        assert_eq!(state.selected_tool(), Some(ToolKind::Select));
        assert!(!state.pointer_context().awaiting_bounding_box);

        state.close_sketch_bar();
        assert!(!state.is_bounding_box_created());
        assert!(!state.is_sketch_bar_open());
        assert_eq!(state.selected_tool(), Some(ToolKind::Select));
    }

    #[test]
    fn test_tool_after_bounding_box_keeps_sketch_bar() {
        let mut state = EditorState::new();
        state.activate_sketch_mode();
        state.bounding_box_created();
        state.select_tool(ToolKind::Pan);
        assert!(state.is_sketch_bar_open());
        assert!(state.is_bounding_box_created());
        assert_eq!(state.mode(), Some(Mode::Tool(ToolKind::Pan)));
    }

    #[test]
    fn test_close_sketch_bar_is_idempotent() {
        let mut state = EditorState::new();
        state.activate_sketch_mode();
        state.close_sketch_bar();
        let once = state.clone();
        state.close_sketch_bar();
        assert_eq!(state, once);
    }

    #[test]
    fn test_bounding_box_ignored_when_bar_closed() {
        let mut state = EditorState::new();
        state.bounding_box_created();
        assert!(!state.is_bounding_box_created());
    }

    #[test]
    fn test_reactivating_sketch_clears_bounding_box() {
        let mut state = EditorState::new();
        state.activate_sketch_mode();
        state.bounding_box_created();
        state.activate_sketch_mode();
        assert!(!state.is_bounding_box_created());
        assert_eq!(state.sketch_session(), SketchSession::AwaitingBoundingBox);
    }

    #[test]
    fn test_text_added_switches_to_select() {
        let mut state = EditorState::new();
        state.select_tool(ToolKind::Text);
        assert!(state.shows_text_sub_bar());
        state.text_added();
        assert_eq!(state.selected_tool(), Some(ToolKind::Select));
        assert_eq!(state.mode_label(), "select");
        assert!(!state.shows_text_sub_bar());
    }

    #[test]
    fn test_zoom_clamped() {
        let mut state = EditorState::new();
        for _ in 0..50 {
            state.zoom_in();
        }
        assert_eq!(state.zoom().percent(), 500);
        for _ in 0..50 {
            state.zoom_out();
        }
        assert_eq!(state.zoom().percent(), 10);
    }

    #[test]
    fn test_auth_gate_transitions() {
        let mut state = EditorState::new();
        state.apply_user_lookup(None);
        assert!(state.is_gated());
        assert!(!state.shows_user_bar());

        state.auth_succeeded(user());
        assert!(!state.is_gated());
        assert!(state.shows_user_bar());

        state.logged_out();
        assert!(state.is_gated());

        state.apply_user_lookup(Some(user()));
        assert_eq!(state.auth().user(), Some(&user()));
    }

    #[test]
    fn test_styling_setters() {
        let mut state = EditorState::new();
        let blue: HexColor = "#0000FF".parse().unwrap();
        state.set_brush_color(blue);
        state.set_brush_size(BrushSize::new(12));
        state.set_text_color(blue);
        assert_eq!(state.pointer_context().brush.size.get(), 12);
        assert_eq!(state.pointer_context().brush.color, blue);
        assert_eq!(state.text_color(), blue);
    }
}

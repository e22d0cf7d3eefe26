//! Keyboard shortcut registry and key mapping.

use sketchboard_core::{EditorState, ToolKind};
use winit::keyboard::{Key, ModifiersState, NamedKey};

use crate::ui::UiAction;

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, shift: bool, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+O").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("V", false, false, "Select tool"),
            Shortcut::new("H", false, false, "Pan tool"),
            Shortcut::new("P", false, false, "Draw tool"),
            Shortcut::new("T", false, false, "Text tool"),
            Shortcut::new("S", false, false, "Sketch mode"),
            Shortcut::new("Escape", false, false, "Close the sketch bar"),
            Shortcut::new("F1", false, false, "Show keyboard shortcuts"),
            Shortcut::new("O", true, false, "Import image"),
            Shortcut::new("E", true, false, "Export"),
            Shortcut::new("Z", true, false, "Undo"),
            Shortcut::new("Z", true, true, "Redo"),
            Shortcut::new("Y", true, false, "Redo"),
            Shortcut::new("=", true, false, "Zoom in"),
            Shortcut::new("-", true, false, "Zoom out"),
        ]
    }

    /// Tooltip hint for a tool button.
    pub fn tool_hint(tool: ToolKind) -> &'static str {
        match tool {
            ToolKind::Select => "V",
            ToolKind::Pan => "H",
            ToolKind::Draw => "P",
            ToolKind::Text => "T",
        }
    }
}

/// Map a pressed key to an action. Ctrl and Cmd are interchangeable.
/// Escape only maps to an action while the sketch bar is open.
pub fn action_for_key(key: &Key, modifiers: ModifiersState, editor: &EditorState) -> Option<UiAction> {
    let ctrl = modifiers.control_key() || modifiers.super_key();
    let shift = modifiers.shift_key();

    match key {
        Key::Named(NamedKey::Escape) if editor.is_sketch_bar_open() => Some(UiAction::CloseSketchBar),
        Key::Named(NamedKey::F1) => Some(UiAction::ToggleShortcuts),
        Key::Character(c) => {
            let c = c.to_lowercase();
            if ctrl {
                match c.as_str() {
                    "o" => Some(UiAction::Import),
                    "e" => Some(UiAction::Export),
                    "z" if shift => Some(UiAction::Redo),
                    "z" => Some(UiAction::Undo),
                    "y" => Some(UiAction::Redo),
                    "=" | "+" => Some(UiAction::ZoomIn),
                    "-" => Some(UiAction::ZoomOut),
                    _ => None,
                }
            } else {
                match c.as_str() {
                    "v" => Some(UiAction::SelectTool(ToolKind::Select)),
                    "h" => Some(UiAction::SelectTool(ToolKind::Pan)),
                    "p" => Some(UiAction::SelectTool(ToolKind::Draw)),
                    "t" => Some(UiAction::SelectTool(ToolKind::Text)),
                    "s" => Some(UiAction::ActivateSketchMode),
                    _ => None,
                }
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_key(c: &str) -> Key {
        Key::Character(c.into())
    }

    fn press(key: &Key, modifiers: ModifiersState) -> Option<UiAction> {
        action_for_key(key, modifiers, &EditorState::new())
    }

    #[test]
    fn test_tool_keys() {
        let none = ModifiersState::empty();
        assert_eq!(
            press(&char_key("v"), none),
            Some(UiAction::SelectTool(ToolKind::Select))
        );
        assert_eq!(press(&char_key("P"), none), Some(UiAction::SelectTool(ToolKind::Draw)));
        assert_eq!(press(&char_key("s"), none), Some(UiAction::ActivateSketchMode));
        assert_eq!(press(&char_key("q"), none), None);
    }

    #[test]
    fn test_ctrl_shortcuts() {
        let ctrl = ModifiersState::CONTROL;
        let ctrl_shift = ModifiersState::CONTROL | ModifiersState::SHIFT;
        assert_eq!(press(&char_key("o"), ctrl), Some(UiAction::Import));
        assert_eq!(press(&char_key("z"), ctrl), Some(UiAction::Undo));
        assert_eq!(press(&char_key("Z"), ctrl_shift), Some(UiAction::Redo));
        assert_eq!(press(&char_key("y"), ctrl), Some(UiAction::Redo));
        assert_eq!(press(&char_key("="), ctrl), Some(UiAction::ZoomIn));
        assert_eq!(press(&char_key("-"), ModifiersState::SUPER), Some(UiAction::ZoomOut));
        // Ctrl+V is not a tool switch
        assert_eq!(press(&char_key("v"), ctrl), None);
    }

    #[test]
    fn test_escape_closes_sketch_bar() {
        let escape = Key::Named(NamedKey::Escape);
        let mut editor = EditorState::new();
        editor.activate_sketch_mode();
        assert_eq!(
            action_for_key(&escape, ModifiersState::empty(), &editor),
            Some(UiAction::CloseSketchBar)
        );
    }

    #[test]
    fn test_escape_ignored_without_sketch_bar() {
        let escape = Key::Named(NamedKey::Escape);
        let mut editor = EditorState::new();
        editor.select_tool(ToolKind::Draw);
        assert_eq!(action_for_key(&escape, ModifiersState::empty(), &editor), None);
        assert_eq!(editor.selected_tool(), Some(ToolKind::Draw));
    }

    #[test]
    fn test_f1_toggles_shortcut_help() {
        assert_eq!(
            press(&Key::Named(NamedKey::F1), ModifiersState::empty()),
            Some(UiAction::ToggleShortcuts)
        );
    }

    #[test]
    fn test_registry_formats() {
        let redo = ShortcutRegistry::all()
            .into_iter()
            .find(|s| s.ctrl && s.shift)
            .unwrap();
        assert_eq!(redo.format(), "Ctrl+Shift+Z");
    }
}

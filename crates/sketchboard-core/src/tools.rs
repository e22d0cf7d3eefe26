//! Tool and mode identifiers for the editor.

/// Available canvas tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Draw,
    Text,
}

impl ToolKind {
    /// All tools in sidebar order.
    pub const ALL: [ToolKind; 4] = [ToolKind::Select, ToolKind::Pan, ToolKind::Draw, ToolKind::Text];

    /// Stable identifier used in logs and mode labels.
    pub fn id(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Pan => "pan",
            ToolKind::Draw => "draw",
            ToolKind::Text => "text",
        }
    }

    /// Human-readable name for tooltips.
    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Pan => "Pan",
            ToolKind::Draw => "Draw",
            ToolKind::Text => "Text",
        }
    }
}

/// The semantic label attached to the active tool for downstream panels.
///
/// Differs from the raw tool while a sketch session is being set up: the
/// tool may be `None` or replaced without the mode following it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Tool(ToolKind),
    Sketch,
}

impl Mode {
    /// Label shown by the mode panel.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Tool(tool) => tool.id(),
            Mode::Sketch => "sketch",
        }
    }
}

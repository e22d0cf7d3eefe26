//! Sketch session lifecycle.

/// Lifecycle of the sketch sub-bar and its bounding box.
///
/// Replaces the pair of `sketch_bar_open` / `bounding_box_created` flags;
/// a bounding box can only exist while the bar is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SketchSession {
    /// Sketch bar closed.
    #[default]
    Inactive,
    /// Bar open, the user is drawing the bounding box.
    AwaitingBoundingBox,
    /// Bar open and a bounding box exists on the canvas.
    BoundingBoxReady,
}

impl SketchSession {
    /// Whether the sketch sub-bar is shown.
    pub fn is_bar_open(self) -> bool {
        !matches!(self, SketchSession::Inactive)
    }

    /// Whether the bounding box has been created.
    pub fn has_bounding_box(self) -> bool {
        matches!(self, SketchSession::BoundingBoxReady)
    }

    /// Whether the canvas should treat a drag as drawing the bounding box.
    pub fn is_awaiting_bounding_box(self) -> bool {
        matches!(self, SketchSession::AwaitingBoundingBox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_per_state() {
        assert!(!SketchSession::Inactive.is_bar_open());
        assert!(!SketchSession::Inactive.has_bounding_box());

        assert!(SketchSession::AwaitingBoundingBox.is_bar_open());
        assert!(!SketchSession::AwaitingBoundingBox.has_bounding_box());

        assert!(SketchSession::BoundingBoxReady.is_bar_open());
        assert!(SketchSession::BoundingBoxReady.has_bounding_box());
    }

    #[test]
    fn test_bounding_box_implies_bar_open() {
        for session in [
            SketchSession::Inactive,
            SketchSession::AwaitingBoundingBox,
            SketchSession::BoundingBoxReady,
        ] {
            if session.has_bounding_box() {
                assert!(session.is_bar_open());
            }
        }
    }
}

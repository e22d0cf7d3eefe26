//! Interaction state for stateful icon buttons.
//!
//! The pressed flash is a deadline stored in the button's own state rather
//! than a detached timer: once the owner drops or cancels it, nothing can
//! touch the button again. Time is passed in by the caller (egui's
//! `input.time`, in seconds).

/// How long the pressed visual stays up after an activation, in seconds.
pub const PRESSED_FLASH_SECS: f64 = 0.15;

/// Visual state of a stateful button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Idle,
    Hovered,
    Pressed,
}

/// Hover flag plus the pressed deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ButtonInteraction {
    hovered: bool,
    pressed_until: Option<f64>,
}

impl ButtonInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer entered (`true`) or left (`false`) the button.
    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Run `on_activate` once, then show the pressed visual until
    /// `now + PRESSED_FLASH_SECS`. A second activation replaces the deadline.
    pub fn activate_with(&mut self, now: f64, on_activate: impl FnOnce()) {
        on_activate();
        self.pressed_until = Some(now + PRESSED_FLASH_SECS);
    }

    /// Drop any pending pressed deadline.
    pub fn cancel(&mut self) {
        self.pressed_until = None;
    }

    /// Current visual state. Pressed wins over hovered.
    pub fn state(&self, now: f64) -> ButtonState {
        if self.remaining(now).is_some() {
            ButtonState::Pressed
        } else if self.hovered {
            ButtonState::Hovered
        } else {
            ButtonState::Idle
        }
    }

    /// Seconds until the pressed visual ends, if it is showing.
    pub fn remaining(&self, now: f64) -> Option<f64> {
        self.pressed_until
            .map(|until| until - now)
            .filter(|remaining| *remaining > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hover_transitions() {
        let mut button = ButtonInteraction::new();
        assert_eq!(button.state(0.0), ButtonState::Idle);
        button.set_hovered(true);
        assert_eq!(button.state(0.0), ButtonState::Hovered);
        button.set_hovered(false);
        assert_eq!(button.state(0.0), ButtonState::Idle);
    }

    #[test]
    fn test_activation_flashes_then_reverts() {
        let mut button = ButtonInteraction::new();
        button.set_hovered(true);
        button.activate_with(1.0, || {});

        assert_eq!(button.state(1.0), ButtonState::Pressed);
        assert_eq!(button.state(1.1), ButtonState::Pressed);
        assert_eq!(button.state(1.2), ButtonState::Hovered);

        button.set_hovered(false);
        assert_eq!(button.state(1.2), ButtonState::Idle);
    }

    #[test]
    fn test_pressed_wins_over_hover_and_leave() {
        let mut button = ButtonInteraction::new();
        button.activate_with(0.0, || {});
        button.set_hovered(false);
        assert_eq!(button.state(0.05), ButtonState::Pressed);
        button.set_hovered(true);
        assert_eq!(button.state(0.05), ButtonState::Pressed);
    }

    #[test]
    fn test_callback_fires_once_per_activation_before_deadline() {
        let mut button = ButtonInteraction::new();
        let mut calls = 0;
        for i in 0..3 {
            let pressed_before = button.state(f64::from(i)) == ButtonState::Pressed;
            button.activate_with(f64::from(i), || calls += 1);
            assert!(!pressed_before);
        }
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_reactivation_extends_deadline() {
        let mut button = ButtonInteraction::new();
        button.activate_with(0.0, || {});
        button.activate_with(0.1, || {});
        assert_eq!(button.state(0.2), ButtonState::Pressed);
        assert_eq!(button.state(0.3), ButtonState::Idle);
    }

    #[test]
    fn test_cancel_clears_pressed() {
        let mut button = ButtonInteraction::new();
        button.activate_with(0.0, || {});
        button.cancel();
        assert_eq!(button.state(0.01), ButtonState::Idle);
        assert_eq!(button.remaining(0.01), None);
    }

    #[test]
    fn test_precedence_over_event_sequences() {
        // Every hover/activate combination at a few instants
        for hovered in [false, true] {
            for activated_at in [None, Some(0.0), Some(0.2)] {
                let mut button = ButtonInteraction::new();
                button.set_hovered(hovered);
                if let Some(t) = activated_at {
                    button.activate_with(t, || {});
                }
                for now in [0.0, 0.1, 0.25, 0.5] {
                    if activated_at.is_some_and(|t| now < t) {
                        continue;
                    }
                    let pressed = activated_at.is_some_and(|t| now >= t && now < t + PRESSED_FLASH_SECS);
                    let expected = if pressed {
                        ButtonState::Pressed
                    } else if hovered {
                        ButtonState::Hovered
                    } else {
                        ButtonState::Idle
                    };
                    assert_eq!(button.state(now), expected, "hovered={hovered} at={activated_at:?} now={now}");
                }
            }
        }
    }
}

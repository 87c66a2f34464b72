//! Terminal rendering of SDUI screens.
//!
//! The host keeps a [`UiState`] next to its session: which button has
//! focus and the animation tick. Drawing is a pure function of the session
//! view and that state.

mod screen;
mod theme;

pub use screen::{render_screen, view_lines, SPINNER_FRAMES};
pub use theme::{component_style, parse_color, COLOR_BORDER, COLOR_DIM, COLOR_FOCUS};

use crate::engine::RenderedButton;
use crate::session::SessionView;

/// Focus and animation state of the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiState {
    /// Index into the view's buttons, depth-first
    pub focus: usize,
    pub tick: usize,
}

impl UiState {
    pub fn focus_next(&mut self, buttons: usize) {
        if buttons > 0 {
            self.focus = (self.focus + 1) % buttons;
        }
    }

    pub fn focus_prev(&mut self, buttons: usize) {
        if buttons > 0 {
            self.focus = (self.focus + buttons - 1) % buttons;
        }
    }

    /// Keep focus in range after the view changed.
    pub fn clamp(&mut self, buttons: usize) {
        if self.focus >= buttons {
            self.focus = 0;
        }
    }

    pub fn advance(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// The focused button of `view`.
    pub fn focused<'a>(&self, view: &'a SessionView) -> Option<&'a RenderedButton> {
        view.buttons().into_iter().nth(self.focus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_wraps() {
        let mut ui = UiState::default();
        ui.focus_prev(3);
        assert_eq!(ui.focus, 2);
        ui.focus_next(3);
        assert_eq!(ui.focus, 0);
        ui.focus_next(0);
        assert_eq!(ui.focus, 0);

        ui.focus = 5;
        ui.clamp(2);
        assert_eq!(ui.focus, 0);
    }
}

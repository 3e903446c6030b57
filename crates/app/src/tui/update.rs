use crossterm::event::{KeyCode, KeyModifiers};
use lopper_core::app::Command;

use super::model::TuiModel;
use super::view::{CHROME_HEIGHT, SPINNER_FRAMES};

/// Messages that can be sent from the TUI to the aggregator
#[derive(Debug, Clone, PartialEq)]
pub enum TuiMessage {
    /// Send a command to the aggregator
    Command(Command),

    /// No action needed
    None,
}

/// The Update function - handles user input and updates the model
pub struct TuiUpdate;

impl TuiUpdate {
    /// Handle a key press and update the model accordingly
    pub fn handle_key(model: &mut TuiModel, key: KeyCode, modifiers: KeyModifiers) -> TuiMessage {
        match key {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Self::quit(model),
            KeyCode::Char('q') | KeyCode::Esc => Self::quit(model),

            KeyCode::Up | KeyCode::Char('k') => {
                model.scroll_up();
                TuiMessage::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                model.scroll_down();
                TuiMessage::None
            }

            _ => TuiMessage::None,
        }
    }

    /// Handle terminal resize
    pub fn handle_resize(model: &mut TuiModel, width: u16, height: u16) -> TuiMessage {
        model.ui_state.terminal_width = width;
        model.ui_state.terminal_height = height;
        model.ui_state.viewport_height = height.saturating_sub(CHROME_HEIGHT) as usize;
        model.clamp_scroll();
        TuiMessage::None
    }

    /// Advance the spinner
    pub fn handle_tick(model: &mut TuiModel) -> TuiMessage {
        model.ui_state.spinner_frame = (model.ui_state.spinner_frame + 1) % SPINNER_FRAMES.len();
        TuiMessage::None
    }

    fn quit(model: &mut TuiModel) -> TuiMessage {
        model.should_quit = true;
        TuiMessage::Command(Command::Quit)
    }
}

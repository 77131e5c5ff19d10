//! Display collaborator contract and a console implementation

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::state::Action;

/// Fields that can be redrawn in place while a stage is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    RemainingSeconds,
    CurrentBpm,
}

/// A line of text on a full-screen layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: String,
    /// Font size hint as a percentage of screen height
    pub font_percent: u8,
    pub id: Option<FieldId>,
}

impl Field {
    pub fn new(label: impl Into<String>, font_percent: u8) -> Self {
        Self {
            label: label.into(),
            font_percent,
            id: None,
        }
    }

    pub fn with_id(label: impl Into<String>, font_percent: u8, id: FieldId) -> Self {
        Self {
            label: label.into(),
            font_percent,
            id: Some(id),
        }
    }
}

/// An on-screen button and the action it triggers when pressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: Action,
}

impl Button {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Screen owned by the host. Presses on rendered buttons come back to the
/// event loop as `WorkoutEvent::Button`.
pub trait DisplayAdapter {
    /// Replace the whole screen
    fn render_screen(&mut self, fields: &[Field], buttons: &[Button]);

    /// Redraw a single field of the current screen
    fn update_field(&mut self, id: FieldId, value: &str);
}

/// Display that writes screens to the log and remembers the current buttons
/// so console input can press them.
#[derive(Debug, Clone, Default)]
pub struct ConsoleDisplay {
    buttons: Arc<Mutex<Vec<Button>>>,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Action of the button at `index` on the current screen, if any
    pub fn press(&self, index: usize) -> Option<Action> {
        match self.buttons.lock() {
            Ok(buttons) => buttons.get(index).map(|b| b.action),
            Err(e) => {
                warn!("Failed to lock display buttons: {}", e);
                None
            }
        }
    }
}

impl DisplayAdapter for ConsoleDisplay {
    fn render_screen(&mut self, fields: &[Field], buttons: &[Button]) {
        let text: Vec<String> = fields.iter().map(|f| f.label.replace('\n', " ")).collect();
        let labels: Vec<&str> = buttons.iter().map(|b| b.label.as_str()).collect();
        info!(target: "hr_workout::screen", "[{}] buttons={:?}", text.join(" | "), labels);

        if let Ok(mut current) = self.buttons.lock() {
            *current = buttons.to_vec();
        }
    }

    fn update_field(&mut self, id: FieldId, value: &str) {
        info!(target: "hr_workout::screen", "{:?} = {}", id, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_display_tracks_rendered_buttons() {
        let mut display = ConsoleDisplay::new();
        assert_eq!(display.press(0), None);

        display.render_screen(
            &[Field::new("Paused", 20)],
            &[Button::new("RESUME", Action::Resume)],
        );
        assert_eq!(display.press(0), Some(Action::Resume));
        assert_eq!(display.press(1), None);

        // Clones share the same screen
        let handle = display.clone();
        display.render_screen(&[Field::new("Start\nStage", 20)], &[Button::new("START", Action::Start)]);
        assert_eq!(handle.press(0), Some(Action::Start));
    }
}

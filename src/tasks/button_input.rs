//! Console stand-in for the device buttons

use tokio::{
    io::{stdin, AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::{debug, info, warn};

use crate::{
    services::ConsoleDisplay,
    state::WorkoutEvent,
};

/// Read button presses from stdin.
///
/// An empty line presses the first button on screen, `N` presses button N.
pub async fn button_input_task(display: ConsoleDisplay, events: mpsc::UnboundedSender<WorkoutEvent>) {
    info!("Starting button input task (Enter presses the on-screen button)");

    let mut lines = BufReader::new(stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Input closed, no more button presses");
                break;
            }
            Err(e) => {
                warn!("Failed to read button input: {}", e);
                break;
            }
        };

        let Some(index) = parse_button(&line) else {
            warn!("Unrecognised button input '{}'", line.trim());
            continue;
        };

        match display.press(index) {
            Some(action) => {
                debug!("Button {} pressed: {:?}", index + 1, action);
                if events.send(WorkoutEvent::Button(action)).is_err() {
                    break;
                }
            }
            None => warn!("No button {} on the current screen", index + 1),
        }
    }
}

/// Zero-based button index for a line of input
fn parse_button(line: &str) -> Option<usize> {
    match line.trim() {
        "" => Some(0),
        other => other.parse::<usize>().ok().filter(|n| *n > 0).map(|n| n - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_button_numbers() {
        assert_eq!(parse_button(""), Some(0));
        assert_eq!(parse_button("  \n"), Some(0));
        assert_eq!(parse_button("2"), Some(1));
        assert_eq!(parse_button("0"), None);
        assert_eq!(parse_button("pause"), None);
    }
}

use std::time::Duration;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crate::shared::InputEvent;

// poll for input from the terminal and resolve key presses into input
// events for the middle layer to handle
pub fn poll_input(timeout: Duration) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code));
    }
    Ok(vec![])
}

fn handle_key(code: KeyCode) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => vec![InputEvent::Quit],

        KeyCode::Up | KeyCode::Char('k') => vec![InputEvent::SelectPrev],
        KeyCode::Down | KeyCode::Char('j') => vec![InputEvent::SelectNext],

        KeyCode::Enter | KeyCode::Char(' ') => vec![InputEvent::PlayMusic],
        KeyCode::Char('s') => vec![InputEvent::PlaySfx],

        // transpose; "=" is the unshifted "+"
        KeyCode::Char('-') => vec![InputEvent::RootDown],
        KeyCode::Char('=' | '+') => vec![InputEvent::RootUp],

        KeyCode::Char('m') => vec![InputEvent::CycleMode],
        KeyCode::Char('x') => vec![InputEvent::StopAll],

        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keymap() {
        assert_eq!(handle_key(KeyCode::Esc), vec![InputEvent::Quit]);
        assert_eq!(handle_key(KeyCode::Char('j')), vec![InputEvent::SelectNext]);
        assert_eq!(handle_key(KeyCode::Up), vec![InputEvent::SelectPrev]);
        assert_eq!(handle_key(KeyCode::Enter), vec![InputEvent::PlayMusic]);
        assert_eq!(handle_key(KeyCode::Char('s')), vec![InputEvent::PlaySfx]);
        assert_eq!(handle_key(KeyCode::Char('+')), vec![InputEvent::RootUp]);
        assert_eq!(handle_key(KeyCode::Char('m')), vec![InputEvent::CycleMode]);
        assert!(handle_key(KeyCode::Char('z')).is_empty());
    }
}

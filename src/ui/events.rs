use std::str::FromStr;
use std::time::Instant;

use crate::executor::Dispatcher;
use crate::state::AppState;

/// One line of input on the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Type(String),
    Up,
    Down,
    PageUp,
    PageDown,
    Enter,
    Tick,
    Quit,
}

impl FromStr for Event {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(text) = line.strip_prefix("type ") {
            return Ok(Event::Type(text.to_string()));
        }
        match line.trim() {
            "type" => Ok(Event::Type(String::new())),
            "up" => Ok(Event::Up),
            "down" => Ok(Event::Down),
            "pgup" => Ok(Event::PageUp),
            "pgdn" => Ok(Event::PageDown),
            "enter" => Ok(Event::Enter),
            "tick" => Ok(Event::Tick),
            "quit" | "esc" => Ok(Event::Quit),
            other => Err(format!("unknown event {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub fn apply(
    state: &mut AppState,
    event: Event,
    dispatcher: &mut dyn Dispatcher,
    now: Instant,
) -> Flow {
    match event {
        Event::Type(text) => state.update_query(&text, now),
        Event::Up => state.move_selection(-1),
        Event::Down => state.move_selection(1),
        Event::PageUp => state.page(-1),
        Event::PageDown => state.page(1),
        Event::Tick => {
            state.tick(now);
        }
        Event::Enter => {
            if state.activate(dispatcher).should_exit() {
                return Flow::Exit;
            }
        }
        Event::Quit => return Flow::Exit,
    }
    Flow::Continue
}

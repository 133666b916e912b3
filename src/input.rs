use crate::physics::Controls;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};

/// Without release events a tap counts as held this long; it bridges the
/// gap before the terminal's auto-repeat kicks in.
const FIRST_PRESS_HOLD: Duration = Duration::from_millis(550);
/// Hold extension per auto-repeat press.
const REPEAT_HOLD: Duration = Duration::from_millis(120);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    ToggleMute,
    Reset,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    fn index(self) -> usize {
        self as usize
    }

    fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }

    fn from_key(code: KeyCode) -> Option<Dir> {
        match code {
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Dir::Up),
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Dir::Down),
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Dir::Left),
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Dir::Right),
            _ => None,
        }
    }
}

/// Turns key events into held directions and one-shot commands.
pub struct Keyboard {
    /// Press and release events are both reported.
    exact: bool,
    down: [bool; 4],
    held_until: [Option<Instant>; 4],
}

impl Keyboard {
    pub fn new(exact: bool) -> Self {
        Self {
            exact,
            down: [false; 4],
            held_until: [None; 4],
        }
    }

    pub fn handle(&mut self, ev: &KeyEvent, now: Instant) -> Option<Command> {
        if let Some(dir) = Dir::from_key(ev.code) {
            self.direction(dir, ev.kind, now);
            return None;
        }
        if ev.kind != KeyEventKind::Press {
            return None;
        }
        map_key_to_command(ev)
    }

    fn direction(&mut self, dir: Dir, kind: KeyEventKind, now: Instant) {
        let i = dir.index();
        if self.exact {
            self.down[i] = kind != KeyEventKind::Release;
            return;
        }
        if kind == KeyEventKind::Release {
            self.held_until[i] = None;
            return;
        }
        let repeating = kind == KeyEventKind::Repeat || self.is_latched(dir, now);
        let hold = if repeating { REPEAT_HOLD } else { FIRST_PRESS_HOLD };
        self.held_until[i] = Some(now + hold);
        self.held_until[dir.opposite().index()] = None;
    }

    fn is_latched(&self, dir: Dir, now: Instant) -> bool {
        self.held_until[dir.index()].is_some_and(|t| now < t)
    }

    fn is_held(&self, dir: Dir, now: Instant) -> bool {
        if self.exact {
            self.down[dir.index()]
        } else {
            self.is_latched(dir, now)
        }
    }

    pub fn controls(&self, now: Instant) -> Controls {
        Controls {
            up: self.is_held(Dir::Up, now),
            down: self.is_held(Dir::Down, now),
            left: self.is_held(Dir::Left, now),
            right: self.is_held(Dir::Right, now),
        }
    }

    /// Drop every held key, e.g. when the terminal loses focus.
    pub fn release_all(&mut self) {
        self.down = [false; 4];
        self.held_until = [None; 4];
    }
}

pub fn map_key_to_command(ev: &KeyEvent) -> Option<Command> {
    if matches!(ev.code, KeyCode::Char('c') | KeyCode::Char('C'))
        && ev.modifiers.contains(KeyModifiers::CONTROL)
    {
        return Some(Command::Quit);
    }
    match ev.code {
        KeyCode::Enter | KeyCode::Char('c') | KeyCode::Char('C') => Some(Command::Start),
        KeyCode::Char('m') | KeyCode::Char('M') => Some(Command::ToggleMute),
        KeyCode::Esc => Some(Command::Reset),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
        _ => None,
    }
}

pub enum InputEvent {
    Key(KeyEvent),
    FocusLost,
}

pub fn collect_input_nonblocking(max_wait: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // first poll may wait out the frame; the rest only drain the queue
    let mut timeout = max_wait;
    while event::poll(timeout)? {
        timeout = Duration::ZERO;
        match event::read()? {
            Event::Key(k) => out.push(InputEvent::Key(k)),
            Event::FocusLost => out.push(InputEvent::FocusLost),
            _ => {}
        }
        if out.len() >= 64 {
            break;
        }
    }
    Ok(out)
}

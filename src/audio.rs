//! Fire-and-forget sound cues.

use std::io::{self, Write};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sound {
    Engine,
    Honk,
    Beep,
}

pub trait AudioSink {
    /// `detune` is a pitch shift in cents; engine hum passes one keyed to
    /// speed, the race-start beep a fixed high one.
    fn play(&mut self, sound: Sound, detune: Option<f32>);
    fn toggle_mute(&mut self);
    fn is_muted(&self) -> bool;
}

/// Discards everything.
#[derive(Default)]
pub struct Silent {
    muted: bool,
}

impl AudioSink for Silent {
    fn play(&mut self, _sound: Sound, _detune: Option<f32>) {}

    fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}

const HONK_GAP: Duration = Duration::from_millis(250);

/// Rings the terminal bell for honks and beeps. A terminal has no way to
/// hum, so engine cues are dropped.
pub struct TerminalBell {
    muted: bool,
    last_honk: Option<Instant>,
}

impl TerminalBell {
    pub fn new(muted: bool) -> Self {
        Self {
            muted,
            last_honk: None,
        }
    }

    fn ring(&self) {
        let mut out = io::stdout();
        if let Err(e) = out.write_all(b"\x07").and_then(|_| out.flush()) {
            log::warn!("bell failed: {e}");
        }
    }
}

impl AudioSink for TerminalBell {
    fn play(&mut self, sound: Sound, _detune: Option<f32>) {
        if self.muted {
            return;
        }
        match sound {
            Sound::Engine => {}
            Sound::Beep => self.ring(),
            Sound::Honk => {
                let now = Instant::now();
                if self.last_honk.map_or(true, |t| now - t >= HONK_GAP) {
                    self.last_honk = Some(now);
                    self.ring();
                }
            }
        }
    }

    fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        log::info!("audio {}", if self.muted { "muted" } else { "unmuted" });
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}

//! The simulation world and its per-frame update.
//!
//! [`World`] owns every piece of mutable race state. The host calls
//! [`World::update`] once per gated frame and then hands the world to the
//! painter; nothing else writes to it in between.

use rand::{rngs::StdRng, SeedableRng};

use crate::audio::{AudioSink, Sound};
use crate::config::Tuning;
use crate::hud::{self, Highscores, Hud};
use crate::map::Map;
use crate::physics::{Controls, PlayerState};
use crate::track::{SegmentRing, Window};
use crate::traffic::Traffic;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    Idle,
    /// `shown` is the number on screen; `remaining` the seconds it stays.
    Countdown { shown: u8, remaining: f32 },
    Racing,
    /// Rolling to a stop after the flag; falls back to idle at rest.
    Finished,
}

/// What happened during one update, for the host and for tests.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub window: Window,
    /// The single ring slot whose profile was rewritten.
    pub recycled: usize,
    pub crossed_section: bool,
    pub collisions: usize,
    pub finished_lap: Option<u64>,
}

pub struct World {
    tuning: Tuning,
    map: Map,
    ring: SegmentRing,
    traffic: Traffic,
    player: PlayerState,
    phase: Phase,
    hud: Hud,
    highscores: Highscores,
    cloud_offset: f32,
    window: Window,
    rng: StdRng,
}

impl World {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let map = Map::generate(&tuning.map, tuning.finish_span(), &mut rng);
        let ring = SegmentRing::new(
            tuning.segment_count,
            tuning.segment_length,
            tuning.near_offset,
        );
        let traffic = Traffic::grid(ring.len());
        log::info!(
            "world ready: seed {seed}, {} sections, {} segments",
            map.len(),
            ring.len()
        );

        let mut world = Self {
            tuning,
            map,
            ring,
            traffic,
            player: PlayerState::default(),
            phase: Phase::Idle,
            hud: Hud::default(),
            highscores: Highscores::default(),
            cloud_offset: 0.0,
            window: Window::default(),
            rng,
        };
        world.reset();
        world
    }

    pub fn with_highscores(mut self, highscores: Highscores) -> Self {
        self.highscores = highscores;
        self
    }

    pub fn with_traffic(mut self, traffic: Traffic) -> Self {
        self.traffic = traffic;
        self
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn ring(&self) -> &SegmentRing {
        &self.ring
    }

    pub fn traffic(&self) -> &Traffic {
        &self.traffic
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    /// Direct access for scripted scenarios and replays.
    pub fn player_mut(&mut self) -> &mut PlayerState {
        &mut self.player
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_racing(&self) -> bool {
        self.phase == Phase::Racing
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn highscores(&self) -> &Highscores {
        &self.highscores
    }

    pub fn cloud_offset(&self) -> f32 {
        self.cloud_offset
    }

    pub fn window(&self) -> Window {
        self.window
    }

    /// Seconds on the clock at the start of a race.
    pub fn countdown_budget(&self) -> f32 {
        self.map.finish().start / self.tuning.countdown_divisor + self.tuning.countdown_bonus
    }

    /// Back to the home screen. The map, the ring slots and the cars are
    /// kept; only player, timers and the road profile are reinitialized.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.player = PlayerState::new(self.countdown_budget());
        self.cloud_offset = 0.0;
        self.ring.clear_profile();
        self.window = self.ring.window(0.0);
        self.hud = Hud::default();
    }

    /// Begin the countdown. Ignored while a countdown or race is running.
    pub fn start_race(&mut self, audio: &mut dyn AudioSink) -> bool {
        match self.phase {
            Phase::Idle | Phase::Finished => {
                self.phase = Phase::Countdown {
                    shown: 3,
                    remaining: self.tuning.countdown_beat,
                };
                self.hud.set_banner("3", false);
                audio.play(Sound::Beep, None);
                log::info!("countdown started");
                true
            }
            Phase::Countdown { .. } | Phase::Racing => false,
        }
    }

    fn tick_countdown(&mut self, step: f32, audio: &mut dyn AudioSink) {
        let Phase::Countdown { shown, remaining } = self.phase else {
            return;
        };
        let remaining = remaining - step;
        if remaining > 0.0 {
            self.phase = Phase::Countdown { shown, remaining };
            return;
        }
        if shown > 2 {
            self.phase = Phase::Countdown {
                shown: shown - 1,
                remaining: self.tuning.countdown_beat,
            };
            self.hud.set_banner((shown - 1).to_string(), false);
            audio.play(Sound::Beep, None);
        } else {
            self.reset();
            self.phase = Phase::Racing;
            self.hud.clear_banner();
            audio.play(Sound::Beep, Some(self.tuning.start_pitch));
            log::info!("race on, {:.0}s on the clock", self.player.countdown);
        }
    }

    /// Advance the simulation by `step` seconds.
    pub fn update(&mut self, step: f32, controls: Controls, audio: &mut dyn AudioSink) -> FrameReport {
        self.tick_countdown(step, audio);
        let racing = self.is_racing();

        self.player.ring_position = self
            .ring
            .wrap_position(self.player.ring_position + self.player.speed);
        let window = self.ring.window(self.player.ring_position);
        self.window = window;

        let curve = self.ring.get(window.start).curve;
        self.player
            .integrate(&self.tuning, controls, racing, curve, step);

        let crossed_section = self.ring.recycle(
            window.end,
            &self.map,
            &mut self.player.cursor,
            self.player.traveled,
            self.player.speed * step,
        );

        let mut finished_lap = None;
        if !racing {
            self.player.coast_to_stop(&self.tuning, step);
            if self.phase == Phase::Finished && self.player.speed <= 0.0 {
                self.phase = Phase::Idle;
            }
        } else if self.player.countdown <= 0.0 || self.ring.get(window.start).special.is_some() {
            let millis = hud::lap_millis(self.player.lap_time);
            self.hud.lap = hud::format_lap_millis(millis);
            self.highscores.record(millis);
            self.hud.set_banner(hud::RETRY_BANNER, true);
            self.phase = Phase::Finished;
            finished_lap = Some(millis);
            log::info!(
                "race finished: lap {} score {:.0}{}",
                self.hud.lap,
                self.player.traveled,
                if self.player.countdown <= 0.0 { " (time up)" } else { "" }
            );
        } else {
            self.hud.time = hud::pad(self.player.countdown, 3);
            self.hud.score = hud::pad(self.player.traveled, 8);
            self.hud.speed = format!("{}", self.player.speed as u32);
            self.hud.lap = hud::format_lap(self.player.lap_time);
        }

        if self.player.speed > 0.0 {
            audio.play(
                Sound::Engine,
                Some(self.player.speed * self.tuning.engine_pitch),
            );
        }

        self.cloud_offset -= self.ring.get(window.start).curve
            * step
            * self.player.speed
            * self.tuning.cloud_parallax;

        let collisions = self.traffic.advance(
            &self.tuning,
            window,
            self.ring.len(),
            &mut self.player,
            step,
            &mut self.rng,
        );
        if collisions > 0 {
            log::debug!("contact at lateral {:.2}", self.player.lateral);
            if self.is_racing() {
                for _ in 0..collisions {
                    audio.play(Sound::Honk, None);
                }
            }
        }

        FrameReport {
            window,
            recycled: window.end,
            crossed_section,
            collisions,
            finished_lap,
        }
    }
}

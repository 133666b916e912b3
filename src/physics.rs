//! Player motion: lateral steering, longitudinal speed, timers.

use crate::config::Tuning;
use crate::sprites::HeroPose;
use crate::track::SectionCursor;

/// Held-key state for the continuous controls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Controls {
    /// Right wins over left, as in the steering rule.
    pub fn pose(&self) -> HeroPose {
        if self.right {
            HeroPose::Right
        } else if self.left {
            HeroPose::Left
        } else {
            HeroPose::Center
        }
    }
}

pub fn accelerate(v: f32, accel: f32, dt: f32) -> f32 {
    v + accel * dt
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerState {
    /// Road half-widths from the center line; ±1 is the paved edge.
    pub lateral: f32,
    pub speed: f32,
    /// Score distance; only grows.
    pub traveled: f32,
    /// Camera position along the ring, wrapped every full turn.
    pub ring_position: f32,
    pub cursor: SectionCursor,
    pub countdown: f32,
    pub lap_time: f32,
}

impl PlayerState {
    pub fn new(countdown: f32) -> Self {
        Self {
            countdown,
            ..Self::default()
        }
    }

    pub fn is_off_road(&self, t: &Tuning) -> bool {
        self.lateral.abs() > t.off_road_limit
    }

    /// Timers, curve drift, steering and speed for one frame. `curve` is
    /// the curvature under the camera.
    pub fn integrate(&mut self, t: &Tuning, controls: Controls, racing: bool, curve: f32, step: f32) {
        self.traveled += self.speed * step;
        self.countdown -= step;
        if racing {
            self.lap_time += step;
        }

        self.lateral -= curve / t.curve_drift * step * self.speed;

        if controls.right {
            self.lateral += t.steer_rate * step * self.speed;
        } else if controls.left {
            self.lateral -= t.steer_rate * step * self.speed;
        }
        self.lateral = self.lateral.clamp(-t.lateral_limit, t.lateral_limit);

        self.speed = if racing && controls.up {
            accelerate(self.speed, t.accel, step)
        } else if controls.down {
            accelerate(self.speed, t.braking, step)
        } else {
            accelerate(self.speed, t.decel, step)
        };

        if self.is_off_road(t) && self.speed >= t.off_road_speed {
            self.speed = accelerate(self.speed, t.off_road_decel, step);
        }
        self.speed = self.speed.clamp(0.0, t.max_speed);
    }

    /// Extra braking applied whenever no race is running.
    pub fn coast_to_stop(&mut self, t: &Tuning, step: f32) {
        self.speed = accelerate(self.speed, t.braking, step).clamp(0.0, t.max_speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: f32 = 0.04;

    fn full_throttle() -> Controls {
        Controls {
            up: true,
            ..Controls::default()
        }
    }

    #[test]
    fn standing_still_stays_still() {
        let t = Tuning::default();
        let mut p = PlayerState::new(100.0);
        p.integrate(&t, Controls::default(), true, 0.0, STEP);
        assert_eq!(p.speed, 0.0);
        assert_eq!(p.traveled, 0.0);
        assert!((p.countdown - (100.0 - STEP)).abs() < 1e-6);
    }

    #[test]
    fn throttle_needs_a_running_race() {
        let t = Tuning::default();
        let mut p = PlayerState::new(100.0);
        p.integrate(&t, full_throttle(), false, 0.0, STEP);
        assert_eq!(p.speed, 0.0);
        p.integrate(&t, full_throttle(), true, 0.0, STEP);
        assert!((p.speed - t.accel * STEP).abs() < 1e-5);
    }

    #[test]
    fn speed_tops_out() {
        let t = Tuning::default();
        let mut p = PlayerState::new(100.0);
        for _ in 0..1000 {
            p.integrate(&t, full_throttle(), true, 0.0, STEP);
        }
        assert_eq!(p.speed, t.max_speed);
    }

    #[test]
    fn steering_scales_with_speed() {
        let t = Tuning::default();
        let mut p = PlayerState {
            speed: 100.0,
            ..PlayerState::new(100.0)
        };
        let right = Controls {
            right: true,
            up: true,
            ..Controls::default()
        };
        p.integrate(&t, right, true, 0.0, STEP);
        assert!((p.lateral - t.steer_rate * STEP * 100.0).abs() < 1e-6);
    }

    #[test]
    fn right_beats_left() {
        let t = Tuning::default();
        let mut p = PlayerState {
            speed: 100.0,
            ..PlayerState::new(100.0)
        };
        let both = Controls {
            left: true,
            right: true,
            ..Controls::default()
        };
        p.integrate(&t, both, true, 0.0, STEP);
        assert!(p.lateral > 0.0);
        assert_eq!(both.pose(), HeroPose::Right);
    }

    #[test]
    fn curves_push_outward() {
        let t = Tuning::default();
        let mut p = PlayerState {
            speed: 100.0,
            ..PlayerState::new(100.0)
        };
        p.integrate(&t, Controls::default(), true, 20.0, STEP);
        assert!((p.lateral + 20.0 / 5000.0 * STEP * 100.0).abs() < 1e-6);
    }

    #[test]
    fn lateral_is_clamped() {
        let t = Tuning::default();
        let mut p = PlayerState {
            speed: 200.0,
            lateral: 2.99,
            ..PlayerState::new(100.0)
        };
        let right = Controls {
            right: true,
            up: true,
            ..Controls::default()
        };
        for _ in 0..50 {
            p.integrate(&t, right, true, -30.0, STEP);
            assert!(p.lateral <= t.lateral_limit);
        }
        assert_eq!(p.lateral, t.lateral_limit);
    }

    #[test]
    fn sand_slows_fast_cars_only() {
        let t = Tuning::default();
        let mut fast = PlayerState {
            speed: 100.0,
            lateral: 2.0,
            ..PlayerState::new(100.0)
        };
        fast.integrate(&t, full_throttle(), true, 0.0, STEP);
        let expected = 100.0 + (t.accel + t.off_road_decel) * STEP;
        assert!((fast.speed - expected).abs() < 1e-4);

        let mut slow = PlayerState {
            speed: 30.0,
            lateral: 2.0,
            ..PlayerState::new(100.0)
        };
        slow.integrate(&t, full_throttle(), true, 0.0, STEP);
        assert!((slow.speed - (30.0 + t.accel * STEP)).abs() < 1e-4);
    }

    #[test]
    fn coasting_never_goes_negative() {
        let t = Tuning::default();
        let mut p = PlayerState {
            speed: 1.0,
            ..PlayerState::new(100.0)
        };
        p.coast_to_stop(&t, 1.0);
        assert_eq!(p.speed, 0.0);
    }
}

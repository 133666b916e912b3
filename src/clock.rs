//! Fixed-cadence frame gate.
//!
//! The host calls [`FrameClock::poll`] as often as it likes; a frame is let
//! through once more than one target interval has passed. The remainder is
//! carried over so the cadence does not drift with the host's rate.

use std::time::{Duration, Instant};

pub struct FrameClock {
    target: Duration,
    then: Instant,
}

impl FrameClock {
    pub fn new(fps: u32, now: Instant) -> Self {
        let fps = fps.clamp(1, 240);
        Self {
            target: Duration::from_nanos(1_000_000_000 / fps as u64),
            then: now,
        }
    }

    pub fn target(&self) -> Duration {
        self.target
    }

    /// Elapsed seconds to simulate, or `None` when it is too early.
    pub fn poll(&mut self, now: Instant) -> Option<f32> {
        let delta = now.saturating_duration_since(self.then);
        if delta <= self.target {
            return None;
        }
        let carry = delta.as_nanos() % self.target.as_nanos();
        self.then = now - Duration::from_nanos(carry as u64);
        Some(delta.as_secs_f32())
    }

    /// Time left until the next frame is due.
    pub fn until_due(&self, now: Instant) -> Duration {
        (self.then + self.target).saturating_duration_since(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn gates_to_target_and_carries_remainder() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(25, t0);
        assert_eq!(clock.target(), ms(40));

        assert_eq!(clock.poll(t0 + ms(30)), None);
        assert_eq!(clock.poll(t0 + ms(40)), None);

        let step = clock.poll(t0 + ms(50)).expect("frame due");
        assert!((step - 0.05).abs() < 1e-6);

        // Reference moved to 40 ms, not 50, so 75 ms is already due.
        assert_eq!(clock.poll(t0 + ms(75)), None);
        let step = clock.poll(t0 + ms(85)).expect("frame due");
        assert!((step - 0.045).abs() < 1e-6);
    }

    #[test]
    fn long_stall_yields_one_big_step() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(25, t0);
        let step = clock.poll(t0 + ms(1000)).expect("frame due");
        assert!((step - 1.0).abs() < 1e-6);
        assert_eq!(clock.poll(t0 + ms(1010)), None);
    }

    #[test]
    fn reports_time_until_due() {
        let t0 = Instant::now();
        let clock = FrameClock::new(25, t0);
        assert_eq!(clock.until_due(t0 + ms(10)), ms(30));
        assert_eq!(clock.until_due(t0 + ms(90)), Duration::ZERO);
    }
}

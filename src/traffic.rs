//! Enemy cars: movement around the ring, respawn, and contact with the
//! player.

use rand::Rng;

use crate::config::Tuning;
use crate::physics::PlayerState;
use crate::sprites::SpriteId;
use crate::track::Window;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lane {
    A,
    B,
    C,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::A, Lane::B, Lane::C];

    /// Lateral offset in road half-widths.
    pub fn offset(self) -> f32 {
        match self {
            Lane::A => -0.7,
            Lane::B => 0.0,
            Lane::C => 0.7,
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Lane {
        Lane::ALL[rng.gen_range(0..Lane::ALL.len())]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Car {
    /// Ring slot, fractional, in `[0, N)`.
    pub position: f32,
    pub sprite: SpriteId,
    pub lane: Lane,
}

impl Car {
    pub fn slot(&self) -> usize {
        self.position as usize
    }
}

/// Squared-distance contact test between two lateral extents.
pub fn collides(x1: f32, w1: f32, x2: f32, w2: f32) -> bool {
    (x1 - x2).powi(2) <= (w1 + w2).powi(2)
}

pub struct Traffic {
    cars: Vec<Car>,
}

impl Traffic {
    /// The starting grid, staggered around a ring of `ring_len` slots.
    pub fn grid(ring_len: usize) -> Self {
        let layout = [
            (0, Lane::C),
            (10, Lane::B),
            (20, Lane::C),
            (35, Lane::C),
            (50, Lane::A),
            (60, Lane::B),
            (70, Lane::A),
        ];
        let cars = layout
            .iter()
            .map(|&(pos, lane)| Car {
                position: (pos % ring_len) as f32,
                sprite: SpriteId::Car,
                lane,
            })
            .collect();
        Self { cars }
    }

    pub fn from_cars(cars: Vec<Car>) -> Self {
        Self { cars }
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn on_slot(&self, slot: usize) -> impl Iterator<Item = &Car> {
        self.cars.iter().filter(move |c| c.slot() == slot)
    }

    /// Move every car, respawn those that reached the back of the window,
    /// and cap the player's speed for each one sharing its slot within
    /// reach. Returns the number of contacts.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        t: &Tuning,
        window: Window,
        ring_len: usize,
        player: &mut PlayerState,
        step: f32,
        rng: &mut R,
    ) -> usize {
        let n = ring_len as f32;
        let mut hits = 0;
        for car in &mut self.cars {
            car.position = (car.position + t.enemy_speed * step) % n;

            if car.slot() == window.end {
                car.position = if player.speed < t.respawn_slow_speed {
                    window.start as f32
                } else {
                    ((window.end + ring_len - 2) % ring_len) as f32
                };
                car.lane = Lane::random(rng);
            }

            if car.slot() == window.start
                && collides(
                    player.lateral,
                    t.player_half_width,
                    car.lane.offset(),
                    t.car_half_width,
                )
            {
                player.speed = player.speed.min(t.hit_speed);
                hits += 1;
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn player(lateral: f32, speed: f32) -> PlayerState {
        PlayerState {
            lateral,
            speed,
            ..PlayerState::default()
        }
    }

    fn window(start: usize) -> Window {
        Window {
            start,
            end: (start + 69) % 70,
        }
    }

    #[test]
    fn grid_wraps_into_the_ring() {
        let traffic = Traffic::grid(70);
        let slots: Vec<usize> = traffic.cars().iter().map(Car::slot).collect();
        assert_eq!(slots, vec![0, 10, 20, 35, 50, 60, 0]);
    }

    #[test]
    fn equal_lateral_always_collides() {
        for lane in Lane::ALL {
            assert!(collides(lane.offset(), 0.2, lane.offset(), 0.2));
        }
    }

    #[test]
    fn separation_beyond_half_widths_never_collides() {
        assert!(!collides(0.0, 0.2, 0.41, 0.2));
        assert!(!collides(-0.7, 0.2, 0.0, 0.2));
        assert!(collides(0.0, 0.2, 0.39, 0.2));
    }

    #[test]
    fn cars_roll_forward_and_wrap() {
        let t = Tuning::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut traffic = Traffic::from_cars(vec![Car {
            position: 68.9,
            sprite: SpriteId::Car,
            lane: Lane::A,
        }]);
        // Window far away so neither respawn nor contact fires.
        traffic.advance(&t, window(30), 70, &mut player(3.0, 0.0), 0.5, &mut rng);
        let pos = traffic.cars()[0].position;
        assert!((pos - 2.9).abs() < 1e-3, "pos {pos}");
    }

    #[test]
    fn slow_player_sees_respawn_at_start() {
        let t = Tuning::default();
        let mut rng = StdRng::seed_from_u64(1);
        let w = window(10);
        let mut traffic = Traffic::from_cars(vec![Car {
            position: w.end as f32 + 0.1,
            sprite: SpriteId::Car,
            lane: Lane::A,
        }]);
        traffic.advance(&t, w, 70, &mut player(3.0, 10.0), 0.01, &mut rng);
        assert_eq!(traffic.cars()[0].position, w.start as f32);
    }

    #[test]
    fn fast_player_sees_respawn_behind_end() {
        let t = Tuning::default();
        let mut rng = StdRng::seed_from_u64(1);
        let w = window(1);
        assert_eq!(w.end, 0);
        let mut traffic = Traffic::from_cars(vec![Car {
            position: 0.1,
            sprite: SpriteId::Car,
            lane: Lane::A,
        }]);
        traffic.advance(&t, w, 70, &mut player(3.0, 150.0), 0.01, &mut rng);
        assert_eq!(traffic.cars()[0].position, 68.0);
    }

    #[test]
    fn respawn_draws_a_fresh_lane() {
        let t = Tuning::default();
        let mut rng = StdRng::seed_from_u64(7);
        let w = window(10);
        let mut traffic = Traffic::from_cars(vec![Car {
            position: 0.0,
            sprite: SpriteId::Car,
            lane: Lane::A,
        }]);

        let mut seen = Vec::new();
        let mut changes = 0;
        for _ in 0..60 {
            let before = traffic.cars()[0].lane;
            traffic.cars[0].position = w.end as f32 + 0.1;
            traffic.advance(&t, w, 70, &mut player(3.0, 150.0), 0.01, &mut rng);

            let car = &traffic.cars()[0];
            assert_eq!(car.position, 7.0);
            assert!(Lane::ALL.contains(&car.lane));
            if car.lane != before {
                changes += 1;
            }
            if !seen.contains(&car.lane) {
                seen.push(car.lane);
            }
        }
        assert_eq!(seen.len(), Lane::ALL.len());
        assert!(changes > 0);
    }

    #[test]
    fn contact_only_on_the_player_slot() {
        let t = Tuning::default();
        let mut rng = StdRng::seed_from_u64(1);
        let w = window(20);
        let mut traffic = Traffic::from_cars(vec![
            Car {
                position: 20.2,
                sprite: SpriteId::Car,
                lane: Lane::B,
            },
            Car {
                position: 25.0,
                sprite: SpriteId::Car,
                lane: Lane::C,
            },
        ]);
        let mut hit = player(0.1, 50.0);
        assert_eq!(traffic.advance(&t, w, 70, &mut hit, 0.01, &mut rng), 1);
        assert_eq!(hit.speed, t.hit_speed);

        let mut clear = player(0.7, 50.0);
        assert_eq!(traffic.advance(&t, w, 70, &mut clear, 0.01, &mut rng), 0);
        assert_eq!(clear.speed, 50.0);
    }
}

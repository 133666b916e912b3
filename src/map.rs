//! Procedural track layout.
//!
//! A [`Map`] is an ordered list of [`Section`]s over score distance. Each
//! section shapes the road through two [`Profile`]s (curvature and elevation)
//! evaluated against the distance covered inside the section. The list always
//! ends with a finish section carrying the finish banner and a sentinel that
//! can never be entered.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::sprites::SpriteId;

// Weighted cascade used to pick a section shape. Each threshold is tested
// against a fresh draw, in order, so the effective odds are 10% / 18% /
// 14.4% / 57.6%.
const P_CURVED_HILL: f64 = 0.9;
const P_ROLLING: f64 = 0.8;
const P_PLATEAU: f64 = 0.8;

/// Shape of a curve or elevation function over progress within a section.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Profile {
    Flat,
    Constant(f32),
    Sine { amplitude: f32, interval: f32 },
}

impl Profile {
    pub fn eval(&self, progress: f32) -> f32 {
        match *self {
            Profile::Flat => 0.0,
            Profile::Constant(v) => v,
            Profile::Sine {
                amplitude,
                interval,
            } => (progress / interval).sin() * amplitude,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub start: f32,
    pub end: f32,
    pub curve: Profile,
    pub height: Profile,
    pub special: Option<SpriteId>,
}

impl Section {
    fn straight(start: f32, end: f32) -> Self {
        Self {
            start,
            end,
            curve: Profile::Flat,
            height: Profile::Flat,
            special: None,
        }
    }

    fn sentinel() -> Self {
        Self::straight(f32::INFINITY, f32::INFINITY)
    }

    /// Strictly inside the section's distance range.
    pub fn contains(&self, distance: f32) -> bool {
        self.start < distance && self.end > distance
    }

    pub fn is_exhausted(&self, distance: f32) -> bool {
        self.end <= distance
    }

    pub fn is_sentinel(&self) -> bool {
        self.start.is_infinite()
    }
}

/// Generation ranges. Integer ranges are half-open and sampled like a
/// truncating float draw, so negative ranges lean toward zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapParams {
    pub length: f32,
    pub gap: Range<i32>,
    pub span: Range<i32>,
    pub height: Range<i32>,
    pub curve: Range<i32>,
    pub interval: Range<i32>,
    pub sine_amplitude: f32,
}

impl Default for MapParams {
    fn default() -> Self {
        Self {
            length: 15_000.0,
            gap: 0..50,
            span: 300..600,
            height: -5..5,
            curve: 5..30,
            interval: 20..40,
            sine_amplitude: 1000.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Map {
    sections: Vec<Section>,
}

impl Map {
    /// Lay out a full track. `finish_span` is the length of the finish
    /// section appended after `params.length` is reached.
    pub fn generate<R: Rng + ?Sized>(params: &MapParams, finish_span: f32, rng: &mut R) -> Self {
        let mut sections = Vec::new();
        let mut at = 0.0f32;

        while at < params.length {
            let span = rand_int(rng, &params.span).max(1) as f32;
            let (curve, height) = pick_shape(params, rng);
            sections.push(Section {
                start: at,
                end: at + span,
                curve,
                height,
                special: None,
            });
            at += span;

            let gap = rand_int(rng, &params.gap);
            if gap > 0 {
                sections.push(Section::straight(at, at + gap as f32));
                at += gap as f32;
            }
        }

        sections.push(Section {
            special: Some(SpriteId::Finish),
            ..Section::straight(at, at + finish_span)
        });
        sections.push(Section::sentinel());

        log::debug!(
            "generated map: {} sections, finish at {:.0}",
            sections.len(),
            at
        );
        Self { sections }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Section at `index`. Indices past the sentinel are a logic error;
    /// release builds clamp to the sentinel.
    pub fn section(&self, index: usize) -> &Section {
        debug_assert!(index < self.sections.len(), "map index {index} past sentinel");
        &self.sections[index.min(self.sections.len() - 1)]
    }

    pub fn sentinel_index(&self) -> usize {
        self.sections.len() - 1
    }

    pub fn finish(&self) -> &Section {
        &self.sections[self.sections.len() - 2]
    }
}

fn pick_shape<R: Rng + ?Sized>(params: &MapParams, rng: &mut R) -> (Profile, Profile) {
    let height = rand_int(rng, &params.height) as f32;
    let sign = if rng.gen::<f64>() >= 0.5 { 1.0 } else { -1.0 };
    let curve = rand_int(rng, &params.curve) as f32 * sign;
    let interval = rand_int(rng, &params.interval).max(1) as f32;

    if rng.gen::<f64>() > P_CURVED_HILL {
        (Profile::Constant(curve), Profile::Constant(height))
    } else if rng.gen::<f64>() > P_ROLLING {
        (
            Profile::Flat,
            Profile::Sine {
                amplitude: params.sine_amplitude,
                interval,
            },
        )
    } else if rng.gen::<f64>() > P_PLATEAU {
        (Profile::Flat, Profile::Constant(height))
    } else {
        (Profile::Constant(curve), Profile::Flat)
    }
}

fn rand_int<R: Rng + ?Sized>(rng: &mut R, range: &Range<i32>) -> i32 {
    if range.start >= range.end {
        return range.start;
    }
    rng.gen_range(range.start as f64..range.end as f64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn map(seed: u64) -> Map {
        let mut rng = StdRng::seed_from_u64(seed);
        Map::generate(&MapParams::default(), 14_000.0, &mut rng)
    }

    #[test]
    fn sections_are_contiguous_and_increasing() {
        for seed in 0..64 {
            let m = map(seed);
            let playable = &m.sections()[..m.len() - 1];
            for s in playable {
                assert!(s.start < s.end, "empty section {:?}", s);
            }
            for pair in playable.windows(2) {
                assert_eq!(pair[0].end, pair[1].start, "seed {seed}");
            }
            assert_eq!(playable[0].start, 0.0);
        }
    }

    #[test]
    fn ends_with_finish_then_unreachable_sentinel() {
        let m = map(7);
        let finish = m.finish();
        assert_eq!(finish.special, Some(SpriteId::Finish));
        assert!(finish.start >= MapParams::default().length);
        assert_eq!(finish.end - finish.start, 14_000.0);
        assert_eq!(finish.curve, Profile::Flat);
        assert_eq!(finish.height, Profile::Flat);

        let sentinel = m.section(m.sentinel_index());
        assert!(sentinel.is_sentinel());
        assert!(!sentinel.contains(f32::MAX));
        assert!(!sentinel.is_exhausted(f32::MAX));
    }

    #[test]
    fn only_the_finish_carries_a_special() {
        let m = map(99);
        let specials = m.sections().iter().filter(|s| s.special.is_some()).count();
        assert_eq!(specials, 1);
    }

    #[test]
    fn same_seed_same_map() {
        let a = map(42);
        let b = map(42);
        assert_eq!(a.sections(), b.sections());
    }

    #[test]
    fn profiles_evaluate() {
        assert_eq!(Profile::Flat.eval(123.0), 0.0);
        assert_eq!(Profile::Constant(-12.0).eval(5.0), -12.0);
        let sine = Profile::Sine {
            amplitude: 1000.0,
            interval: 20.0,
        };
        assert_eq!(sine.eval(0.0), 0.0);
        let quarter = std::f32::consts::FRAC_PI_2 * 20.0;
        assert!((sine.eval(quarter) - 1000.0).abs() < 0.01);
    }

    #[test]
    fn drawn_values_stay_in_range() {
        let params = MapParams::default();
        for seed in 0..32 {
            for s in map(seed).sections() {
                if let Profile::Constant(c) = s.curve {
                    assert!(c.abs() >= 5.0 && c.abs() < 30.0, "curve {c}");
                }
                if let Profile::Constant(h) = s.height {
                    assert!(h > -5.0 && h < 5.0, "height {h}");
                }
                if let Profile::Sine { amplitude, interval } = s.height {
                    assert_eq!(amplitude, params.sine_amplitude);
                    assert!((20.0..40.0).contains(&interval));
                }
            }
        }
    }

    #[test]
    fn empty_range_returns_its_start() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(rand_int(&mut rng, &(3..3)), 3);
    }
}

use rand::{rngs::StdRng, Rng, SeedableRng};
use roadline::audio::Silent;
use roadline::config::Tuning;
use roadline::hud;
use roadline::physics::Controls;
use roadline::race::{Phase, World};
use roadline::traffic::Traffic;

const STEP: f32 = 0.04;

fn throttle() -> Controls {
    Controls {
        up: true,
        ..Controls::default()
    }
}

/// A road with no bends, so the car never drifts onto the sand.
fn straight_tuning(length: f32) -> Tuning {
    let mut t = Tuning::default();
    t.map.curve = 0..1;
    t.map.length = length;
    t
}

fn empty_road(tuning: Tuning, seed: u64) -> World {
    World::new(tuning, seed).with_traffic(Traffic::from_cars(Vec::new()))
}

fn start(world: &mut World, audio: &mut Silent) {
    assert!(world.start_race(audio));
    for _ in 0..100 {
        world.update(STEP, Controls::default(), audio);
        if world.is_racing() {
            return;
        }
    }
    panic!("race never started");
}

#[test]
fn full_throttle_on_a_straight() {
    let mut audio = Silent::default();
    let mut w = empty_road(straight_tuning(15_000.0), 11);
    start(&mut w, &mut audio);

    for _ in 0..75 {
        w.update(STEP, throttle(), &mut audio);
    }
    let expected = (38.0f32 * 75.0 * STEP).min(200.0);
    assert!((w.player().speed - expected).abs() < 1e-2, "speed {}", w.player().speed);

    for _ in 0..200 {
        w.update(STEP, throttle(), &mut audio);
    }
    assert_eq!(w.player().speed, w.tuning().max_speed);
}

#[test]
fn standing_still_goes_nowhere() {
    let mut audio = Silent::default();
    let mut w = empty_road(Tuning::default(), 3);
    start(&mut w, &mut audio);
    let traveled = w.player().traveled;
    let countdown = w.player().countdown;

    for _ in 0..100 {
        w.update(STEP, Controls::default(), &mut audio);
    }
    assert_eq!(w.player().speed, 0.0);
    assert_eq!(w.player().traveled, traveled);
    assert!(w.player().countdown < countdown);
    assert!(w.is_racing());
}

#[test]
fn clock_hitting_zero_ends_the_race() {
    let mut audio = Silent::default();
    let mut w = empty_road(Tuning::default(), 4);
    start(&mut w, &mut audio);
    for _ in 0..30 {
        w.update(STEP, throttle(), &mut audio);
    }

    w.player_mut().countdown = STEP;
    let report = w.update(STEP, throttle(), &mut audio);

    assert_eq!(w.player().countdown, 0.0);
    assert_eq!(w.phase(), Phase::Finished);
    let millis = report.finished_lap.expect("lap recorded");
    assert_eq!(w.highscores().millis(), &[millis]);
    assert_eq!(w.hud().lap, hud::format_lap_millis(millis));
    assert_eq!(w.hud().banner.as_deref(), Some(hud::RETRY_BANNER));
    assert!(w.hud().blink);
}

#[test]
fn short_track_finishes_at_the_banner() {
    let mut audio = Silent::default();
    let mut w = empty_road(straight_tuning(2_000.0), 8);
    start(&mut w, &mut audio);

    let mut frames = 0;
    let lap = loop {
        frames += 1;
        assert!(frames < 1_000, "never reached the finish");
        if let Some(lap) = w.update(STEP, throttle(), &mut audio).finished_lap {
            break lap;
        }
    };

    assert!(w.player().countdown > 0.0, "time ran out before the banner");
    assert!(w.player().traveled >= w.map().finish().start);
    // The frame that started the race already counted.
    let expected = hud::lap_millis((frames + 1) as f32 * STEP);
    assert!(lap.abs_diff(expected) <= 2, "lap {lap} expected {expected}");
}

#[test]
fn finished_race_can_be_restarted() {
    let mut audio = Silent::default();
    let mut w = empty_road(Tuning::default(), 5);
    start(&mut w, &mut audio);
    assert!(!w.start_race(&mut audio));

    w.player_mut().countdown = 0.0;
    w.update(STEP, Controls::default(), &mut audio);
    assert_eq!(w.phase(), Phase::Finished);

    start(&mut w, &mut audio);
    assert!((w.player().countdown - (w.countdown_budget() - STEP)).abs() < 1e-4);
    assert_eq!(w.player().lap_time, STEP);
    assert_eq!(w.highscores().len(), 1);
}

#[test]
fn same_seed_same_track() {
    let a = World::new(Tuning::default(), 1234);
    let b = World::new(Tuning::default(), 1234);
    let c = World::new(Tuning::default(), 4321);
    assert_eq!(a.map().sections(), b.map().sections());
    assert_ne!(a.map().sections(), c.map().sections());
}

#[test]
fn random_driving_keeps_state_in_bounds() {
    for seed in 0..6 {
        let mut rng = StdRng::seed_from_u64(seed + 100);
        let mut audio = Silent::default();
        let mut w = World::new(Tuning::default(), seed);
        let ring_len = w.ring().len();
        let sentinel = w.map().sentinel_index();
        let limit = w.tuning().lateral_limit;
        let top = w.tuning().max_speed;

        let mut traveled = 0.0;
        for frame in 0..3_000 {
            if frame % 400 == 0 {
                w.start_race(&mut audio);
            }
            if rng.gen_bool(0.002) {
                w.reset();
                traveled = 0.0;
            }
            let controls = Controls {
                up: rng.gen_bool(0.7),
                down: rng.gen_bool(0.1),
                left: rng.gen_bool(0.3),
                right: rng.gen_bool(0.3),
            };
            let step = rng.gen_range(0.02..0.08);
            let was = w.phase();
            let report = w.update(step, controls, &mut audio);
            if matches!(was, Phase::Countdown { .. }) && w.is_racing() {
                traveled = 0.0;
            }

            let p = w.player();
            assert!(p.lateral.abs() <= limit, "lateral {}", p.lateral);
            assert!((0.0..=top).contains(&p.speed), "speed {}", p.speed);
            assert!(p.traveled >= traveled);
            traveled = p.traveled;
            assert!(p.cursor.index <= sentinel);
            assert!((0.0..w.ring().circumference()).contains(&p.ring_position));
            assert_eq!(report.recycled, report.window.end);
            assert_eq!(report.window.end, (report.window.start + ring_len - 1) % ring_len);
            for car in w.traffic().cars() {
                assert!((0.0..ring_len as f32).contains(&car.position));
            }
        }
    }
}

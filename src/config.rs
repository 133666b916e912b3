use anyhow::{ensure, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::map::MapParams;

/// Past this, f32 score distances stop resolving single section spans.
pub const MAX_MAP_LENGTH: f32 = 10_000_000.0;
const MAX_SEGMENTS: usize = 10_000;

/// Every physical constant of the simulation. Ring distances advance by
/// `speed` per frame; score distance advances by `speed` per second.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub segment_count: usize,
    pub segment_length: f32,
    /// Depth of the nearest slice in front of the camera.
    pub near_offset: f32,
    pub road_width: f32,
    pub camera_depth: f32,
    pub camera_height: f32,

    pub max_speed: f32,
    pub accel: f32,
    pub braking: f32,
    pub decel: f32,
    pub off_road_limit: f32,
    pub off_road_speed: f32,
    pub off_road_decel: f32,
    pub lateral_limit: f32,
    pub steer_rate: f32,
    pub curve_drift: f32,

    pub enemy_speed: f32,
    pub hit_speed: f32,
    pub respawn_slow_speed: f32,
    pub player_half_width: f32,
    pub car_half_width: f32,

    /// Score distance per second of countdown budget.
    pub countdown_divisor: f32,
    pub countdown_bonus: f32,
    pub countdown_beat: f32,

    pub cloud_parallax: f32,
    pub engine_pitch: f32,
    pub start_pitch: f32,

    pub map: MapParams,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            segment_count: 70,
            segment_length: 200.0,
            near_offset: 270.0,
            road_width: 4000.0,
            camera_depth: 0.2,
            camera_height: 1500.0,

            max_speed: 200.0,
            accel: 38.0,
            braking: -80.0,
            decel: -40.0,
            off_road_limit: 1.15,
            off_road_speed: 40.0,
            off_road_decel: -70.0,
            lateral_limit: 3.0,
            steer_rate: 0.007,
            curve_drift: 5000.0,

            enemy_speed: 8.0,
            hit_speed: 20.0,
            respawn_slow_speed: 30.0,
            player_half_width: 0.2,
            car_half_width: 0.2,

            countdown_divisor: 130.0,
            countdown_bonus: 10.0,
            countdown_beat: 1.0,

            cloud_parallax: 0.13,
            engine_pitch: 4.0,
            start_pitch: 500.0,

            map: MapParams::default(),
        }
    }
}

impl Tuning {
    /// Length of the finish section: one full turn of the ring.
    pub fn finish_span(&self) -> f32 {
        self.segment_count as f32 * self.segment_length
    }

    /// Reject values the ring, the projection or the map generator cannot
    /// work with.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (2..=MAX_SEGMENTS).contains(&self.segment_count),
            "segment_count {} outside 2..={MAX_SEGMENTS}",
            self.segment_count
        );
        for (name, v) in [
            ("segment_length", self.segment_length),
            ("near_offset", self.near_offset),
            ("camera_depth", self.camera_depth),
            ("countdown_divisor", self.countdown_divisor),
        ] {
            ensure!(v.is_finite() && v > 0.0, "{name} must be positive, got {v}");
        }
        ensure!(
            self.map.length.is_finite() && (0.0..=MAX_MAP_LENGTH).contains(&self.map.length),
            "map length {} outside 0..={MAX_MAP_LENGTH}",
            self.map.length
        );
        ensure!(self.max_speed.is_finite() && self.max_speed >= 0.0, "max_speed must be non-negative");
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub fps: u32,
    /// Map seed; 0 draws a fresh one each session.
    pub seed: u64,
    pub enable_color: bool,
    pub muted: bool,
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps: 25,
            seed: 0,
            enable_color: true,
            muted: false,
            tuning: Tuning::default(),
        }
    }
}

pub struct Paths {
    pub settings_path: PathBuf,
    pub highscores_path: PathBuf,
    pub log_path: PathBuf,
}

impl Paths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            settings_path: dir.join("settings.json"),
            highscores_path: dir.join("highscores.json"),
            log_path: dir.join("roadline.log"),
        }
    }
}

pub fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "roadline", "Roadline")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(Paths::in_dir(&dir))
}

/// Missing or unreadable settings fall back to defaults, and so does a
/// tuning block that fails [`Tuning::validate`].
pub fn load_settings(path: &Path) -> Settings {
    let s = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return Settings::default(),
    };
    let mut settings = match serde_json::from_str::<Settings>(&s) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("ignoring {}: {e}", path.display());
            return Settings::default();
        }
    };
    if let Err(e) = settings.tuning.validate() {
        log::warn!("ignoring tuning in {}: {e}", path.display());
        settings.tuning = Tuning::default();
    }
    settings
}

pub fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data)?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

pub fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // rename() cannot replace an existing file on every platform.
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to).with_context(|| format!("replacing {}", to.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::in_dir(dir.path());
        let mut s = Settings::default();
        s.seed = 77;
        s.muted = true;
        s.tuning.max_speed = 150.0;
        save_settings_atomic(&paths.settings_path, &s).unwrap();

        let back = load_settings(&paths.settings_path);
        assert_eq!(back.seed, 77);
        assert!(back.muted);
        assert_eq!(back.tuning.max_speed, 150.0);
        assert!(!paths.settings_path.with_extension("json.tmp").exists());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "fps": 30, "tuning": { "accel": 50.0 } }"#).unwrap();
        let s = load_settings(&path);
        assert_eq!(s.fps, 30);
        assert_eq!(s.tuning.accel, 50.0);
        assert_eq!(s.tuning.braking, -80.0);
        assert_eq!(s.tuning.map, MapParams::default());
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(load_settings(&path).fps, 25);
        assert_eq!(load_settings(&dir.path().join("missing.json")).fps, 25);
    }

    #[test]
    fn unusable_tuning_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        for bad in [
            r#"{ "fps": 30, "tuning": { "segment_count": 1 } }"#,
            r#"{ "fps": 30, "tuning": { "segment_length": 0.0 } }"#,
            r#"{ "fps": 30, "tuning": { "countdown_divisor": -1.0 } }"#,
            r#"{ "fps": 30, "tuning": { "map": { "length": 1e12 } } }"#,
        ] {
            fs::write(&path, bad).unwrap();
            let s = load_settings(&path);
            assert_eq!(s.fps, 30, "{bad}");
            assert_eq!(s.tuning, Tuning::default(), "{bad}");
        }
    }

    #[test]
    fn fallback_tuning_builds_a_playable_world() {
        use crate::audio::Silent;
        use crate::physics::Controls;
        use crate::race::World;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "tuning": { "segment_length": 0.0 } }"#).unwrap();
        let mut world = World::new(load_settings(&path).tuning, 1);
        let mut audio = Silent::default();
        world.player_mut().speed = 50.0;
        world.update(0.04, Controls::default(), &mut audio);
        assert!(world.player().ring_position < world.ring().circumference());
    }

    #[test]
    fn default_tuning_is_valid() {
        assert!(Tuning::default().validate().is_ok());
        let mut t = Tuning::default();
        t.map.length = f32::NAN;
        assert!(t.validate().is_err());
    }
}

//! Values the core publishes for the heads-up display, and the highscore
//! list. Nothing here draws; the front-end reads these fields.

pub const HIGHSCORE_ROWS: usize = 12;

pub const HOME_BANNER: &str = "Press Enter to start!";
pub const RETRY_BANNER: &str = "Press Enter to play!";

#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    pub time: String,
    pub score: String,
    pub speed: String,
    pub lap: String,
    pub banner: Option<String>,
    pub blink: bool,
}

impl Default for Hud {
    fn default() -> Self {
        Self {
            time: pad(0.0, 3),
            score: pad(0.0, 8),
            speed: "0".to_string(),
            lap: format_lap(0.0),
            banner: Some(HOME_BANNER.to_string()),
            blink: true,
        }
    }
}

impl Hud {
    pub fn set_banner(&mut self, text: impl Into<String>, blink: bool) {
        self.banner = Some(text.into());
        self.blink = blink;
    }

    pub fn clear_banner(&mut self) {
        self.banner = None;
        self.blink = false;
    }
}

/// Whole part of `v`, zero-padded to `width` digits.
pub fn pad(v: f32, width: usize) -> String {
    let n = v.abs().floor() as u64;
    format!("{n:0>width$}")
}

pub fn lap_millis(seconds: f32) -> u64 {
    (seconds.max(0.0) as f64 * 1000.0) as u64
}

/// `m'ss"mmm`, e.g. `1'07"250`.
pub fn format_lap_millis(millis: u64) -> String {
    let minutes = millis / 60_000;
    let secs = (millis / 1000) % 60;
    let ms = millis % 1000;
    format!("{minutes}'{secs:02}\"{ms:03}")
}

pub fn format_lap(seconds: f32) -> String {
    format_lap_millis(lap_millis(seconds))
}

/// Finished lap times, fastest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Highscores {
    millis: Vec<u64>,
}

impl Highscores {
    pub fn from_millis(entries: impl IntoIterator<Item = u64>) -> Self {
        let mut millis: Vec<u64> = entries.into_iter().collect();
        millis.sort_unstable();
        Self { millis }
    }

    pub fn record(&mut self, millis: u64) {
        let at = self.millis.partition_point(|&m| m <= millis);
        self.millis.insert(at, millis);
    }

    pub fn len(&self) -> usize {
        self.millis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.millis.is_empty()
    }

    pub fn millis(&self) -> &[u64] {
        &self.millis
    }

    pub fn laps(&self) -> impl Iterator<Item = String> + '_ {
        self.millis.iter().map(|&m| format_lap_millis(m))
    }

    /// Ranked rows for the board, at most [`HIGHSCORE_ROWS`].
    pub fn rows(&self) -> Vec<String> {
        self.laps()
            .take(HIGHSCORE_ROWS)
            .enumerate()
            .map(|(i, lap)| format!("{:>2}. {}", i + 1, lap))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_whole_part() {
        assert_eq!(pad(87.9, 3), "087");
        assert_eq!(pad(1234.5, 8), "00001234");
        assert_eq!(pad(123_456.0, 3), "123456");
        assert_eq!(pad(-2.5, 3), "002");
    }

    #[test]
    fn lap_format_matches_board_style() {
        assert_eq!(format_lap(0.0), "0'00\"000");
        assert_eq!(format_lap_millis(67_250), "1'07\"250");
        assert_eq!(format_lap_millis(600_001), "10'00\"001");
    }

    #[test]
    fn records_stay_sorted() {
        let mut hs = Highscores::from_millis([90_000, 30_000]);
        hs.record(60_000);
        hs.record(10_000);
        assert_eq!(hs.millis(), &[10_000, 30_000, 60_000, 90_000]);
    }

    #[test]
    fn board_shows_twelve_ranked_rows() {
        let hs = Highscores::from_millis((1..=20).map(|s| s * 1000));
        let rows = hs.rows();
        assert_eq!(rows.len(), HIGHSCORE_ROWS);
        assert_eq!(rows[0], " 1. 0'01\"000");
        assert_eq!(rows[11], "12. 0'12\"000");
    }
}

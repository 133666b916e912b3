use crate::config::atomic_rename;
use crate::hud::Highscores;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

pub const HIGHSCORE_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HighscoreEntry {
    pub millis: u64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HighscoreFile {
    pub version: u32,
    pub entries: Vec<HighscoreEntry>,
}

impl Default for HighscoreFile {
    fn default() -> Self {
        Self {
            version: HIGHSCORE_VERSION,
            entries: Vec::new(),
        }
    }
}

impl HighscoreFile {
    pub fn highscores(&self) -> Highscores {
        Highscores::from_millis(self.entries.iter().map(|e| e.millis))
    }

    /// Stamp laps not yet on file with `now`; known entries keep their
    /// original timestamps.
    pub fn merge(&mut self, scores: &Highscores, now: DateTime<Utc>) {
        let mut known: Vec<u64> = self.entries.iter().map(|e| e.millis).collect();
        for &millis in scores.millis() {
            if let Some(i) = known.iter().position(|&m| m == millis) {
                known.swap_remove(i);
                continue;
            }
            self.entries.push(HighscoreEntry {
                millis,
                recorded_at: now,
            });
        }
        self.entries.sort_by_key(|e| e.millis);
    }
}

/// A missing file is an empty board; an unreadable one, or one written by a
/// newer format, is logged and treated the same. Older versions share the
/// entry layout and are upgraded in place.
pub fn load_highscores(path: &Path) -> HighscoreFile {
    let Ok(s) = fs::read_to_string(path) else {
        return HighscoreFile::default();
    };
    let mut file = match serde_json::from_str::<HighscoreFile>(&s) {
        Ok(file) => file,
        Err(e) => {
            log::warn!("ignoring {}: {e}", path.display());
            return HighscoreFile::default();
        }
    };
    if file.version > HIGHSCORE_VERSION {
        log::warn!(
            "ignoring {}: version {} is newer than {HIGHSCORE_VERSION}",
            path.display(),
            file.version
        );
        return HighscoreFile::default();
    }
    if file.version < HIGHSCORE_VERSION {
        log::info!("upgrading {} from version {}", path.display(), file.version);
        file.version = HIGHSCORE_VERSION;
    }
    file.entries.sort_by_key(|e| e.millis);
    file
}

pub fn save_highscores_atomic(path: &Path, file: &HighscoreFile) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(file)?;
    fs::write(&tmp, data)?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

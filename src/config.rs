// loaded once on startup; every field has a default so a partial (or absent)
// config file is fine
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PIANOTTY_DIR: &str = ".pianotty";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub samples_dir: PathBuf, // relative paths resolve against the project dir
    pub keyboard: KeyboardConfig,
    pub playback: PlaybackConfig,
    pub audio: AudioConfig,
    pub input: InputConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    pub start_key: i32,
    pub visible_keys: i32,
    pub min_visible: u8,
    pub max_visible: u8,
    pub default_velocity: f32,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            start_key: 60, // C4
            visible_keys: 13,
            min_visible: 1,
            max_visible: 18,
            default_velocity: 0.7,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub min_visible: i32,
    pub max_visible: i32,
    pub scroll_margin: i32, // keys kept between the melody and the window edge
    pub out_of_window: bool, // songs may sound keys the window doesn't show
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            min_visible: 7,
            max_visible: 18,
            scroll_margin: 2,
            out_of_window: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub release_secs: f32,
    pub reverb_decay_secs: f32,
    pub reverb_wet: f32,
    pub volume_db: f32,
    pub max_voices: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            release_secs: 1.0,
            reverb_decay_secs: 2.0,
            reverb_wet: 0.3,
            volume_db: -5.0,
            max_voices: 32,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub debounce_ms: u64,
    pub tap_release_ms: u64, // synthetic key-up for terminals without release events
    pub frame_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            tap_release_ms: 600,
            frame_ms: 16,
        }
    }
}

impl Config {
    pub fn samples_path(&self, project_dir: &Path) -> PathBuf {
        if self.samples_dir.as_os_str().is_empty() {
            project_dir.join("samples")
        } else if self.samples_dir.is_absolute() {
            self.samples_dir.clone()
        } else {
            project_dir.join(&self.samples_dir)
        }
    }
}

// <project_dir>/.pianotty/config.json
fn config_file_path(project_dir: &Path) -> PathBuf {
    project_dir.join(PIANOTTY_DIR).join(CONFIG_FILE)
}

pub fn load_config(project_dir: &Path) -> Result<Config, ConfigError> {
    let path = config_file_path(project_dir);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    serde_json::from_str(&data).map_err(|source| ConfigError::Parse { path, source })
}

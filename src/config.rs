use std::env;
use std::fs;
use std::path::Path;

use crate::error::{RemuxError, Result};

/// Milliseconds to 90 kHz ticks.
pub const fn ms_to_ticks(ms: u64) -> u64 {
    ms * 90
}

pub const DEFAULT_AUDIO_DELAY_BY_AUDIO_MS: u64 = 150;
pub const DEFAULT_AUDIO_DELAY_BY_VIDEO_MS: u64 = 300;
pub const DEFAULT_FILTER_QUEUE_SIZE: usize = 16;

const ENV_AUDIO_DELAY_BY_AUDIO: &str = "TSREMUX_AUDIO_DELAY_BY_AUDIO_MS";
const ENV_AUDIO_DELAY_BY_VIDEO: &str = "TSREMUX_AUDIO_DELAY_BY_VIDEO_MS";
const ENV_FILTER_QUEUE_SIZE: &str = "TSREMUX_FILTER_QUEUE_SIZE";

/// Tunables of one remuxer.
///
/// The audio delays bound how long ADTS frames may sit in the audio cache
/// before they are flushed as one PES, measured against the next audio
/// frame and the next video frame respectively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemuxConfig {
    /// 90 kHz ticks
    pub max_audio_cache_delay_by_audio: u64,
    /// 90 kHz ticks
    pub max_audio_cache_delay_by_video: u64,
    /// Messages held back while the stream layout is still unknown
    pub filter_queue_size: usize,
}

impl Default for RemuxConfig {
    fn default() -> Self {
        Self {
            max_audio_cache_delay_by_audio: ms_to_ticks(DEFAULT_AUDIO_DELAY_BY_AUDIO_MS),
            max_audio_cache_delay_by_video: ms_to_ticks(DEFAULT_AUDIO_DELAY_BY_VIDEO_MS),
            filter_queue_size: DEFAULT_FILTER_QUEUE_SIZE,
        }
    }
}

impl RemuxConfig {
    /// Defaults overridden by `TSREMUX_*` environment variables. Unset
    /// variables keep their default; malformed ones are an error.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(value) = env::var(ENV_AUDIO_DELAY_BY_AUDIO) {
            config.set("audio_delay_by_audio_ms", &value)?;
        }
        if let Ok(value) = env::var(ENV_AUDIO_DELAY_BY_VIDEO) {
            config.set("audio_delay_by_video_ms", &value)?;
        }
        if let Ok(value) = env::var(ENV_FILTER_QUEUE_SIZE) {
            config.set("filter_queue_size", &value)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reads `key = value` lines; `#` starts a comment and unknown keys are
    /// ignored.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(RemuxError::InvalidData(format!("malformed config line: {}", line)));
            };
            let value = value.trim().trim_matches('"').trim_matches('\'');
            config.set(key.trim(), value)?;
        }

        config.validate()?;
        Ok(config)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "audio_delay_by_audio_ms" => {
                self.max_audio_cache_delay_by_audio = ms_to_ticks(value.trim().parse()?)
            }
            "audio_delay_by_video_ms" => {
                self.max_audio_cache_delay_by_video = ms_to_ticks(value.trim().parse()?)
            }
            "filter_queue_size" => self.filter_queue_size = value.trim().parse()?,
            other => log::debug!("ignoring unknown config key {}", other),
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.filter_queue_size == 0 {
            return Err(RemuxError::InvalidData("filter_queue_size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Writes a commented config template if `path` does not exist yet.
pub fn create_default_config_template<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    if !path.as_ref().exists() {
        let template = format!(
            r#"# tsremux configuration

# Flush buffered audio once it lags the newest audio frame by this much
audio_delay_by_audio_ms = {}

# Flush buffered audio once it lags the newest video frame by this much
audio_delay_by_video_ms = {}

# Messages held back at stream start while the codec layout is detected
filter_queue_size = {}
"#,
            DEFAULT_AUDIO_DELAY_BY_AUDIO_MS, DEFAULT_AUDIO_DELAY_BY_VIDEO_MS, DEFAULT_FILTER_QUEUE_SIZE
        );
        fs::write(path, template)?;
    }
    Ok(())
}

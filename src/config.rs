use crate::game::constants::ui;
use crate::util::rect::Rect;

/// Smallest scene side that still fits the corner zones around the portal
pub const MIN_SCENE_SIDE: f32 = 300.0;
pub const MAX_SCENE_SIDE: f32 = 10_000.0;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("scene size {width}x{height} outside {min}..={max}")]
    SceneSize {
        width: f32,
        height: f32,
        min: f32,
        max: f32,
    },
    #[error("event_buffer must be at least 1")]
    EventBuffer,
    #[error("run_seconds must be positive when set")]
    RunSeconds,
}

/// Simulation runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub scene_width: f32,
    pub scene_height: f32,
    /// Seed for spawn kinds and positions
    pub seed: u64,
    /// Stop the headless run after this many seconds (None = until Ctrl+C)
    pub run_seconds: Option<f64>,
    /// Restart automatically once the restart button would appear
    pub auto_restart: bool,
    /// Drive gravity from the scripted tilt source instead of no sensor
    pub sensor_enabled: bool,
    /// Capacity of the session event channel
    pub event_buffer: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            scene_width: ui::DEFAULT_SCENE_WIDTH,
            scene_height: ui::DEFAULT_SCENE_HEIGHT,
            seed: 0x6772_6176,
            run_seconds: Some(60.0),
            auto_restart: true,
            sensor_enabled: true,
            event_buffer: 1024,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl SimConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; invalid values keep the default
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(width) = lookup("SCENE_WIDTH") {
            match width.parse::<f32>() {
                Ok(parsed) if (MIN_SCENE_SIDE..=MAX_SCENE_SIDE).contains(&parsed) => {
                    config.scene_width = parsed
                }
                Ok(_) => tracing::warn!(
                    "SCENE_WIDTH must be {}-{}, using default",
                    MIN_SCENE_SIDE,
                    MAX_SCENE_SIDE
                ),
                Err(_) => tracing::warn!("Invalid SCENE_WIDTH '{}', using default", width),
            }
        }

        if let Some(height) = lookup("SCENE_HEIGHT") {
            match height.parse::<f32>() {
                Ok(parsed) if (MIN_SCENE_SIDE..=MAX_SCENE_SIDE).contains(&parsed) => {
                    config.scene_height = parsed
                }
                Ok(_) => tracing::warn!(
                    "SCENE_HEIGHT must be {}-{}, using default",
                    MIN_SCENE_SIDE,
                    MAX_SCENE_SIDE
                ),
                Err(_) => tracing::warn!("Invalid SCENE_HEIGHT '{}', using default", height),
            }
        }

        if let Some(seed) = lookup("SEED") {
            if let Ok(parsed) = seed.parse::<u64>() {
                config.seed = parsed;
            } else {
                tracing::warn!("Invalid SEED '{}', using default", seed);
            }
        }

        if let Some(seconds) = lookup("RUN_SECONDS") {
            match seconds.parse::<f64>() {
                // 0 means run until interrupted
                Ok(parsed) if parsed == 0.0 => config.run_seconds = None,
                Ok(parsed) if parsed > 0.0 && parsed.is_finite() => {
                    config.run_seconds = Some(parsed)
                }
                _ => tracing::warn!("Invalid RUN_SECONDS '{}', using default", seconds),
            }
        }

        if let Some(value) = lookup("AUTO_RESTART") {
            match parse_bool(&value) {
                Some(parsed) => config.auto_restart = parsed,
                None => tracing::warn!("Invalid AUTO_RESTART '{}', using default", value),
            }
        }

        if let Some(value) = lookup("SENSOR_ENABLED") {
            match parse_bool(&value) {
                Some(parsed) => config.sensor_enabled = parsed,
                None => tracing::warn!("Invalid SENSOR_ENABLED '{}', using default", value),
            }
        }

        if let Some(buffer) = lookup("EVENT_BUFFER") {
            match buffer.parse::<usize>() {
                Ok(parsed) if parsed > 0 && parsed <= 1_000_000 => config.event_buffer = parsed,
                Ok(_) => tracing::warn!("EVENT_BUFFER must be 1-1000000, using default"),
                Err(_) => tracing::warn!("Invalid EVENT_BUFFER '{}', using default", buffer),
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let side_ok = |side: f32| (MIN_SCENE_SIDE..=MAX_SCENE_SIDE).contains(&side);
        if !side_ok(self.scene_width) || !side_ok(self.scene_height) {
            return Err(ConfigError::SceneSize {
                width: self.scene_width,
                height: self.scene_height,
                min: MIN_SCENE_SIDE,
                max: MAX_SCENE_SIDE,
            });
        }
        if self.event_buffer == 0 {
            return Err(ConfigError::EventBuffer);
        }
        if let Some(seconds) = self.run_seconds {
            if !(seconds > 0.0 && seconds.is_finite()) {
                return Err(ConfigError::RunSeconds);
            }
        }
        Ok(())
    }

    pub fn scene(&self) -> Rect {
        Rect::new(0.0, 0.0, self.scene_width, self.scene_height)
    }
}

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::builder::SketchDefaults;
use crate::ConfigError;

/// Layout quirk class of the hosting platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformSetting {
    #[default]
    Auto,
    Standard,
    QuirkyFullscreen,
}

/// Contents of `seedpaint.toml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub version: u32,
    #[serde(default)]
    pub sketch: SketchSection,
    #[serde(default)]
    pub schedule: ScheduleSection,
    #[serde(default)]
    pub layout: LayoutSection,
    #[serde(default)]
    pub catalog: CatalogSection,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SketchSection {
    pub steps: Option<u64>,
    pub count: Option<u32>,
    pub endless: Option<bool>,
    pub debug_luma: Option<bool>,
    pub pixel_ratio: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleSection {
    #[serde(
        default = "default_swap_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub swap_interval: Duration,
    #[serde(
        default = "default_image_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub image_timeout: Duration,
}

impl Default for ScheduleSection {
    fn default() -> Self {
        Self {
            swap_interval: default_swap_interval(),
            image_timeout: default_image_timeout(),
        }
    }
}

impl ScheduleSection {
    /// `None` when loads may wait forever.
    pub fn image_timeout(&self) -> Option<Duration> {
        if self.image_timeout.is_zero() {
            None
        } else {
            Some(self.image_timeout)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LayoutSection {
    #[serde(default)]
    pub platform: PlatformSetting,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogSection {
    pub palettes: Option<PathBuf>,
    pub maps_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: 1,
            sketch: SketchSection::default(),
            schedule: ScheduleSection::default(),
            layout: LayoutSection::default(),
            catalog: CatalogSection::default(),
        }
    }
}

fn default_swap_interval() -> Duration {
    Duration::from_millis(15_000)
}

fn default_image_timeout() -> Duration {
    Duration::from_secs(10)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v)
                .map_err(|err| E::custom(format!("duration of {v} seconds: {err}")))
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl Settings {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: Settings = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.schedule.swap_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "schedule.swap_interval must be greater than zero".into(),
            ));
        }

        let sketch = &self.sketch;
        if sketch.width == Some(0) || sketch.height == Some(0) {
            return Err(ConfigError::Invalid(
                "sketch width and height must be greater than zero".into(),
            ));
        }

        if let Some(ratio) = sketch.pixel_ratio {
            if !ratio.is_finite() || ratio <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "sketch.pixel_ratio must be a positive number (got {ratio})"
                )));
            }
        }

        if sketch.endless == Some(false) && sketch.steps == Some(0) {
            return Err(ConfigError::Invalid(
                "sketch.steps must be > 0 when endless is disabled".into(),
            ));
        }

        Ok(())
    }

    /// Sketch defaults with this file's overrides applied.
    pub fn sketch_defaults(&self) -> SketchDefaults {
        let mut defaults = SketchDefaults::default();
        let sketch = &self.sketch;
        if let Some(steps) = sketch.steps {
            defaults.steps = steps;
        }
        if let Some(count) = sketch.count {
            defaults.count = count;
        }
        if let Some(endless) = sketch.endless {
            defaults.endless_browser = endless;
        }
        if let Some(debug_luma) = sketch.debug_luma {
            defaults.debug_luma = debug_luma;
        }
        if let Some(ratio) = sketch.pixel_ratio {
            defaults.pixel_ratio = ratio;
        }
        if let Some(width) = sketch.width {
            defaults.width = width;
        }
        if let Some(height) = sketch.height {
            defaults.height = height;
        }
        defaults
    }
}

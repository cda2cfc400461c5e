use std::fmt;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Smoothing fraction applied per frame when nothing else is configured.
pub const DEFAULT_SMOOTHING: f64 = 0.05;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialise configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level layout of `config.toml`.
///
/// Every section and every field is optional; missing values fall back to the
/// defaults that reproduce the stock wave background.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaveConfig {
    pub window: WindowSection,
    pub render: RenderSection,
    pub animation: AnimationSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowSection {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub fullscreen: bool,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            title: "wavepaper".to_string(),
            fullscreen: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSection {
    /// Frame cap; `None` or `0` renders on every redraw callback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(
        deserialize_with = "deserialize_antialias",
        serialize_with = "serialize_antialias"
    )]
    pub antialias: AntialiasSetting,
    pub vsync: VsyncSetting,
    pub color_space: ColorSpaceSetting,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationSection {
    /// Per-frame interpolation fraction for pointer position and bend influence.
    pub smoothing: f64,
    /// How often the renderer logs the uniform block at debug level; zero disables it.
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub stats_interval: Duration,
}

impl Default for AnimationSection {
    fn default() -> Self {
        Self {
            smoothing: DEFAULT_SMOOTHING,
            stats_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AntialiasSetting {
    #[default]
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    /// MSAA sample count, or `None` when the renderer should pick the maximum.
    pub fn samples(self) -> Option<u32> {
        match self {
            Self::Auto => None,
            Self::Off => Some(1),
            Self::Samples2 => Some(2),
            Self::Samples4 => Some(4),
            Self::Samples8 => Some(8),
            Self::Samples16 => Some(16),
        }
    }
}

impl fmt::Display for AntialiasSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.samples() {
            None => f.write_str("auto"),
            Some(1) => f.write_str("off"),
            Some(samples) => write!(f, "{samples}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VsyncSetting {
    #[default]
    Auto,
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpaceSetting {
    #[default]
    Auto,
    Gamma,
    Linear,
}

pub fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" | "0" | "1" => Ok(AntialiasSetting::Off),
        "2" => Ok(AntialiasSetting::Samples2),
        "4" => Ok(AntialiasSetting::Samples4),
        "8" => Ok(AntialiasSetting::Samples8),
        "16" => Ok(AntialiasSetting::Samples16),
        other => Err(format!(
            "invalid antialias setting '{other}'; use auto/off or 2/4/8/16"
        )),
    }
}

fn deserialize_antialias<'de, D>(deserializer: D) -> Result<AntialiasSetting, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    match Helper::deserialize(deserializer)? {
        Helper::Str(raw) => parse_antialias(&raw).map_err(de::Error::custom),
        Helper::Num(value) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            parse_antialias(&value.to_string()).map_err(de::Error::custom)
        }
    }
}

fn serialize_antialias<S>(value: &AntialiasSetting, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
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
            if !v.is_finite() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs_f64(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

impl WaveConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: WaveConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Frame cap with `0` normalised to "uncapped".
    pub fn target_fps(&self) -> Option<f64> {
        self.render.fps.filter(|fps| *fps > 0.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be greater than zero (got {}x{})",
                self.window.width, self.window.height
            )));
        }

        if self.window.title.trim().is_empty() {
            return Err(ConfigError::Invalid("window.title must not be empty".into()));
        }

        if let Some(fps) = self.render.fps {
            if !fps.is_finite() || fps < 0.0 {
                return Err(ConfigError::Invalid("render.fps must be >= 0".into()));
            }
        }

        let smoothing = self.animation.smoothing;
        if !smoothing.is_finite() || smoothing <= 0.0 || smoothing > 1.0 {
            return Err(ConfigError::Invalid(format!(
                "animation.smoothing must be within (0, 1]; got {smoothing}"
            )));
        }

        Ok(())
    }
}

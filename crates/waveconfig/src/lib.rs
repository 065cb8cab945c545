use std::fmt;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Theme requested by the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeSetting {
    Dark,
    Light,
    #[default]
    System,
}

impl ThemeSetting {
    /// The value as written in `config.toml`.
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeSetting::Dark => "dark",
            ThemeSetting::Light => "light",
            ThemeSetting::System => "system",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            0 | 1 => Some(Self::Off),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            8 => Some(Self::Samples8),
            16 => Some(Self::Samples16),
            _ => None,
        }
    }

    /// Sample count requested by the setting; `None` means "pick the maximum".
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

/// Colours fed to the wave shader.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WaveColors {
    #[serde(default = "default_color_a")]
    pub color_a: String,
    #[serde(default = "default_color_b")]
    pub color_b: String,
}

impl Default for WaveColors {
    fn default() -> Self {
        Self {
            color_a: default_color_a(),
            color_b: default_color_b(),
        }
    }
}

impl WaveColors {
    pub fn color_a_rgb(&self) -> Result<[f32; 3], ConfigError> {
        parse_hex_color(&self.color_a)
    }

    pub fn color_b_rgb(&self) -> Result<[f32; 3], ConfigError> {
        parse_hex_color(&self.color_b)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WaveConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub theme: ThemeSetting,
    #[serde(default)]
    pub fps: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_antialias_opt")]
    pub antialias: Option<AntialiasSetting>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(
        default = "default_fallback_cycle",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub fallback_cycle: Duration,
    #[serde(default)]
    pub waves: WaveColors,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            theme: ThemeSetting::default(),
            fps: None,
            antialias: None,
            size: None,
            fallback_cycle: default_fallback_cycle(),
            waves: WaveColors::default(),
        }
    }
}

fn default_version() -> u32 {
    1
}

fn default_fallback_cycle() -> Duration {
    Duration::from_secs(8)
}

fn default_color_a() -> String {
    "#1e40af".to_string()
}

fn default_color_b() -> String {
    "#3b82f6".to_string()
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
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
            Duration::try_from_secs_f64(v).map_err(E::custom)
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(parse_antialias(&raw).map_err(de::Error::custom)?),
        Some(Helper::Num(value)) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            let raw = value.to_string();
            Some(parse_antialias(&raw).map_err(de::Error::custom)?)
        }
    };
    Ok(result)
}

/// Parses `auto`, `off`, or an MSAA sample count.
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

/// Parses `WIDTHxHEIGHT` into a pair of positive dimensions.
pub fn parse_size(value: &str) -> Result<(u32, u32), ConfigError> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| ConfigError::Invalid(format!("size '{value}' must be WIDTHxHEIGHT")))?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(format!("invalid width in size '{value}'")))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(format!("invalid height in size '{value}'")))?;
    if width == 0 || height == 0 {
        return Err(ConfigError::Invalid(format!(
            "size '{value}' must be greater than zero"
        )));
    }
    Ok((width, height))
}

/// Parses `#rrggbb` into normalised RGB components.
pub fn parse_hex_color(value: &str) -> Result<[f32; 3], ConfigError> {
    let digits = value.trim().strip_prefix('#').unwrap_or(value.trim());
    if digits.len() != 6 || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(ConfigError::Invalid(format!(
            "colour '{value}' must be written as #rrggbb"
        )));
    }
    let mut rgb = [0.0; 3];
    for (index, slot) in rgb.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&digits[index * 2..index * 2 + 2], 16)
            .map_err(|_| ConfigError::Invalid(format!("colour '{value}' is not hexadecimal")))?;
        *slot = byte as f32 / 255.0;
    }
    Ok(rgb)
}

impl WaveConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: WaveConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Window size from the file, if one was given.
    pub fn window_size(&self) -> Result<Option<(u32, u32)>, ConfigError> {
        self.size.as_deref().map(parse_size).transpose()
    }

    /// FPS cap with `0` mapped to "uncapped".
    pub fn fps_cap(&self) -> Option<f32> {
        self.fps.filter(|fps| *fps > 0.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if let Some(fps) = self.fps {
            if fps.is_nan() || fps < 0.0 {
                return Err(ConfigError::Invalid("fps must be >= 0".into()));
            }
        }

        self.window_size()?;

        if self.fallback_cycle.is_zero() {
            return Err(ConfigError::Invalid(
                "fallback_cycle must be greater than zero".into(),
            ));
        }

        self.waves.color_a_rgb()?;
        self.waves.color_b_rgb()?;

        Ok(())
    }
}

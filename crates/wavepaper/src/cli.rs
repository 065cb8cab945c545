use std::path::PathBuf;

use clap::{Parser, Subcommand};
use waveconfig::{AntialiasSetting, ThemeSetting};

#[derive(Parser, Debug)]
#[command(
    name = "wavepaper",
    author,
    version,
    about = "Animated wave background that follows the pointer",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Colour theme: `dark`, `light`, or `system` to follow the desktop.
    #[arg(long, value_name = "THEME", value_parser = parse_theme)]
    pub theme: Option<ThemeSetting>,

    /// Window size in physical pixels (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size_arg)]
    pub size: Option<(u32, u32)>,

    /// Optional FPS cap (0=uncapped).
    #[arg(long, value_name = "FPS", value_parser = parse_fps)]
    pub fps: Option<f32>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = waveconfig::parse_antialias)]
    pub antialias: Option<AntialiasSetting>,

    /// Skip the wave planes and show only the gradient fallback.
    #[arg(long)]
    pub force_fallback: bool,

    /// Read configuration from FILE instead of the default location.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a PNG of the gradient fallback without opening a window.
    Snapshot(SnapshotArgs),
    /// Inspect configuration.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct SnapshotArgs {
    /// Destination PNG path.
    #[arg(long, short, value_name = "FILE")]
    pub output: PathBuf,

    /// Seconds into the overlay pulse to capture.
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0, value_parser = parse_time)]
    pub time: f32,

    /// Colour theme; `system` resolves to light without a window.
    #[arg(long, value_name = "THEME", value_parser = parse_theme)]
    pub theme: Option<ThemeSetting>,

    /// Image size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size_arg)]
    pub size: Option<(u32, u32)>,

    /// Read configuration from FILE instead of the default location.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved configuration file path.
    Where,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_theme(value: &str) -> Result<ThemeSetting, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "dark" => Ok(ThemeSetting::Dark),
        "light" => Ok(ThemeSetting::Light),
        "system" | "auto" => Ok(ThemeSetting::System),
        "" => Err("theme must not be empty".to_string()),
        other => Err(format!("unknown theme '{other}'; use dark, light, or system")),
    }
}

pub fn parse_size_arg(value: &str) -> Result<(u32, u32), String> {
    waveconfig::parse_size(value).map_err(|err| err.to_string())
}

pub fn parse_fps(value: &str) -> Result<f32, String> {
    let fps: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid fps '{value}'"))?;
    if !fps.is_finite() || fps < 0.0 {
        return Err("fps must be a finite value >= 0".to_string());
    }
    Ok(fps)
}

pub fn parse_time(value: &str) -> Result<f32, String> {
    let seconds: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid time '{value}'; expected seconds"))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err("time must be a finite number of seconds >= 0".to_string());
    }
    Ok(seconds)
}

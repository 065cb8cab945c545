use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use renderer::{
    export_fallback_png, Antialiasing, OpacityCycle, Renderer, RendererConfig, StillRequest, Theme,
    ThemePreference,
};
use tracing_subscriber::EnvFilter;
use waveconfig::{AntialiasSetting, ThemeSetting, WaveConfig};

use crate::cli::{RunArgs, SnapshotArgs};
use crate::paths::AppPaths;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(args: RunArgs) -> Result<()> {
    let file_config = load_config(args.config.as_deref())?;
    let config = resolve_renderer_config(&args, &file_config)?;
    tracing::info!(
        width = config.surface_size.0,
        height = config.surface_size.1,
        theme = ?config.theme,
        fps = ?config.target_fps,
        force_fallback = config.force_fallback,
        "launching wavepaper"
    );
    Renderer::new(config).run()
}

pub fn snapshot(args: SnapshotArgs) -> Result<()> {
    let file_config = load_config(args.config.as_deref())?;
    let defaults = RendererConfig::default();
    let size = match args.size {
        Some(size) => size,
        None => file_config.window_size()?.unwrap_or(defaults.surface_size),
    };
    // No window means no host theme to follow.
    let theme = match theme_preference(args.theme.unwrap_or(file_config.theme)) {
        ThemePreference::Fixed(theme) => theme,
        ThemePreference::System => Theme::default(),
    };
    let request = StillRequest {
        size,
        theme,
        time: args.time,
        cycle: OpacityCycle::new(file_config.fallback_cycle.as_secs_f32()),
    };
    export_fallback_png(&args.output, &request)?;
    println!("{}", args.output.display());
    Ok(())
}

pub fn config_where() -> Result<()> {
    let paths = AppPaths::discover()?;
    let file = paths.config_file();
    let status = if file.is_file() { "present" } else { "missing" };
    println!("{} ({status})", file.display());
    Ok(())
}

/// Loads the configuration file. A missing default file yields defaults; a
/// missing explicit `--config` file is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<WaveConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => AppPaths::discover()?.config_file(),
    };

    match fs::read_to_string(&path) {
        Ok(contents) => {
            let config = WaveConfig::from_toml_str(&contents)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            tracing::debug!(path = %path.display(), ?config, "loaded configuration");
            Ok(config)
        }
        Err(err) if err.kind() == ErrorKind::NotFound && explicit.is_none() => {
            tracing::debug!(path = %path.display(), "no configuration file; using defaults");
            Ok(WaveConfig::default())
        }
        Err(err) => {
            Err(err).with_context(|| format!("failed to read config file {}", path.display()))
        }
    }
}

/// Merges CLI flags over the configuration file over built-in defaults.
pub fn resolve_renderer_config(args: &RunArgs, file: &WaveConfig) -> Result<RendererConfig> {
    let defaults = RendererConfig::default();

    let surface_size = match args.size {
        Some(size) => size,
        None => file.window_size()?.unwrap_or(defaults.surface_size),
    };
    let target_fps = match args.fps {
        Some(fps) if fps > 0.0 => Some(fps),
        Some(_) => None,
        None => file.fps_cap(),
    };
    let antialiasing = args
        .antialias
        .or(file.antialias)
        .map(antialiasing_mode)
        .unwrap_or(defaults.antialiasing);

    Ok(RendererConfig {
        surface_size,
        theme: theme_preference(args.theme.unwrap_or(file.theme)),
        target_fps,
        antialiasing,
        color_a: file.waves.color_a_rgb()?,
        color_b: file.waves.color_b_rgb()?,
        fallback_cycle: file.fallback_cycle.as_secs_f32(),
        force_fallback: args.force_fallback,
    })
}

fn theme_preference(setting: ThemeSetting) -> ThemePreference {
    match setting {
        ThemeSetting::System => ThemePreference::System,
        fixed => ThemePreference::Fixed(Theme::from_value(fixed.as_str())),
    }
}

fn antialiasing_mode(setting: AntialiasSetting) -> Antialiasing {
    match setting.samples() {
        None => Antialiasing::Auto,
        Some(1) => Antialiasing::Off,
        Some(samples) => Antialiasing::Samples(samples),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn defaults_apply_without_flags_or_file() {
        let config = resolve_renderer_config(&RunArgs::default(), &WaveConfig::default()).unwrap();
        assert_eq!(config.surface_size, (1920, 1080));
        assert_eq!(config.theme, ThemePreference::System);
        assert_eq!(config.target_fps, None);
        assert_eq!(config.antialiasing, Antialiasing::Auto);
        assert_eq!(config.fallback_cycle, 8.0);
        assert!(!config.force_fallback);
    }

    #[test]
    fn cli_flags_override_file_values() {
        let file = WaveConfig {
            theme: ThemeSetting::Light,
            fps: Some(30.0),
            size: Some("800x600".into()),
            antialias: Some(AntialiasSetting::Samples2),
            fallback_cycle: Duration::from_secs(4),
            ..WaveConfig::default()
        };
        let from_file = resolve_renderer_config(&RunArgs::default(), &file).unwrap();
        assert_eq!(from_file.surface_size, (800, 600));
        assert_eq!(from_file.target_fps, Some(30.0));
        assert_eq!(from_file.antialiasing, Antialiasing::Samples(2));
        assert_eq!(from_file.theme, ThemePreference::Fixed(Theme::Light));
        assert_eq!(from_file.fallback_cycle, 4.0);

        let args = RunArgs {
            theme: Some(ThemeSetting::Dark),
            size: Some((640, 480)),
            fps: Some(0.0),
            antialias: Some(AntialiasSetting::Off),
            force_fallback: true,
            config: None,
        };
        let merged = resolve_renderer_config(&args, &file).unwrap();
        assert_eq!(merged.surface_size, (640, 480));
        assert_eq!(merged.target_fps, None);
        assert_eq!(merged.antialiasing, Antialiasing::Off);
        assert_eq!(merged.theme, ThemePreference::Fixed(Theme::Dark));
        assert!(merged.force_fallback);
    }

    #[test]
    fn theme_settings_map_to_preferences() {
        assert_eq!(
            theme_preference(ThemeSetting::Dark),
            ThemePreference::Fixed(Theme::Dark)
        );
        assert_eq!(
            theme_preference(ThemeSetting::Light),
            ThemePreference::Fixed(Theme::Light)
        );
        assert_eq!(theme_preference(ThemeSetting::System), ThemePreference::System);
    }

    #[test]
    fn explicit_config_file_is_loaded_and_must_exist() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "theme = \"dark\"\nfps = 24\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.theme, ThemeSetting::Dark);
        assert_eq!(config.fps_cap(), Some(24.0));

        let missing = dir.path().join("missing.toml");
        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    fn invalid_config_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "version = 2\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("bad.toml"));
    }
}

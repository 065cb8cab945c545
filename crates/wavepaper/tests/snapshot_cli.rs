use std::fs;
use std::process::Command;

use tempfile::TempDir;

#[test]
fn snapshot_writes_png_of_requested_size() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");
    let output = root.path().join("stills/dark.png");

    let status = Command::new(env!("CARGO_BIN_EXE_wavepaper"))
        .env("WAVEPAPER_CONFIG_DIR", &config_dir)
        .args(["snapshot", "--theme", "dark", "--size", "64x32", "--time", "4", "--output"])
        .arg(&output)
        .status()
        .expect("failed to run wavepaper snapshot");

    assert!(status.success());
    let image = image::open(&output).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (64, 32));
    assert!(image.pixels().all(|pixel| pixel[3] == 255));
}

#[test]
fn snapshot_reads_size_from_config_file() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "version = 1\ntheme = \"light\"\nsize = \"40x10\"\n",
    )
    .unwrap();
    let output = root.path().join("light.png");

    let status = Command::new(env!("CARGO_BIN_EXE_wavepaper"))
        .env("WAVEPAPER_CONFIG_DIR", &config_dir)
        .arg("snapshot")
        .arg("--output")
        .arg(&output)
        .status()
        .expect("failed to run wavepaper snapshot");

    assert!(status.success());
    let image = image::open(&output).unwrap();
    assert_eq!((image.width(), image.height()), (40, 10));
}

#[test]
fn invalid_config_fails_snapshot() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "fps = -1\n").unwrap();
    let output = root.path().join("never.png");

    let result = Command::new(env!("CARGO_BIN_EXE_wavepaper"))
        .env("WAVEPAPER_CONFIG_DIR", &config_dir)
        .arg("snapshot")
        .arg("--output")
        .arg(&output)
        .output()
        .expect("failed to run wavepaper snapshot");

    assert!(!result.status.success());
    assert!(!output.exists());
    assert!(String::from_utf8_lossy(&result.stderr).contains("fps"));
}

#[test]
fn config_where_prints_override_path() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");

    let result = Command::new(env!("CARGO_BIN_EXE_wavepaper"))
        .env("WAVEPAPER_CONFIG_DIR", &config_dir)
        .args(["config", "where"])
        .output()
        .expect("failed to run wavepaper config where");

    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    let expected = config_dir.join("config.toml");
    assert!(stdout.contains(&*expected.to_string_lossy()));
    assert!(stdout.contains("missing"));
}

use std::path::Path;

use anyhow::{Context, Result};

use crate::fallback::{FallbackFrame, OpacityCycle};
use crate::theme::Theme;

/// Options for a still image of the gradient fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StillRequest {
    pub size: (u32, u32),
    pub theme: Theme,
    /// Seconds into the overlay animation.
    pub time: f32,
    pub cycle: OpacityCycle,
}

impl Default for StillRequest {
    fn default() -> Self {
        Self {
            size: (1920, 1080),
            theme: Theme::default(),
            time: 0.0,
            cycle: OpacityCycle::default(),
        }
    }
}

/// Rasterises the fallback frame described by `request` and writes it to
/// `path` as PNG. Needs no GPU or display.
pub fn export_fallback_png(path: &Path, request: &StillRequest) -> Result<()> {
    let (width, height) = request.size;
    if width == 0 || height == 0 {
        anyhow::bail!("still size must be positive, got {width}x{height}");
    }

    let frame = FallbackFrame::at(request.theme, &request.cycle, request.time);
    let image = frame.rasterize(width, height);

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write still to {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        width,
        height,
        theme = request.theme.as_str(),
        time = request.time,
        "exported fallback still"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_png_with_requested_dimensions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/still.png");
        let request = StillRequest {
            size: (48, 20),
            theme: Theme::Dark,
            time: 4.0,
            ..StillRequest::default()
        };
        export_fallback_png(&path, &request).unwrap();

        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (48, 20));
        let expected = FallbackFrame::at(Theme::Dark, &OpacityCycle::default(), 4.0)
            .rasterize(48, 20);
        assert_eq!(image.get_pixel(0, 0), expected.get_pixel(0, 0));
        assert_eq!(image.get_pixel(47, 19), expected.get_pixel(47, 19));
    }

    #[test]
    fn rejects_empty_size() {
        let dir = tempdir().unwrap();
        let request = StillRequest {
            size: (0, 10),
            ..StillRequest::default()
        };
        let err = export_fallback_png(&dir.path().join("x.png"), &request).unwrap_err();
        assert!(err.to_string().contains("0x10"));
    }
}

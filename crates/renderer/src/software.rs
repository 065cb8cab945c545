//! CPU presenter used when no GPU surface can be created.

use anyhow::{anyhow, Result};
use minifb::{Key, MouseMode, Window, WindowOptions};

use crate::mode::RenderFailure;
use crate::pointer::{PointerHub, PointerPosition};
use crate::runtime::FrameClock;
use crate::surface::{AnimatedSurface, FrameError, SceneFrame, SceneTarget, SurfaceSettings};
use crate::theme::HostTheme;
use crate::types::RendererConfig;
use crate::window::WINDOW_TITLE;

/// Frame cap for the CPU presenter unless `--fps` says otherwise.
pub(crate) const SOFTWARE_FPS_CAP: f32 = 15.0;

struct SoftwarePresenter {
    window: Window,
    pixels: Vec<u32>,
}

impl SoftwarePresenter {
    fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    fn pointer(&self) -> Option<PointerPosition> {
        self.window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| PointerPosition::new(f64::from(x), f64::from(y)))
    }
}

impl SceneTarget for SoftwarePresenter {
    fn viewport(&self) -> (u32, u32) {
        let (width, height) = self.window.get_size();
        (width as u32, height as u32)
    }

    fn attach_waves(&mut self) -> Result<()> {
        anyhow::bail!("the software presenter cannot draw wave planes")
    }

    fn detach_waves(&mut self) {}

    fn draw(&mut self, frame: &SceneFrame) -> Result<(), FrameError> {
        let (width, height) = self.window.get_size();
        if width == 0 || height == 0 {
            self.window.update();
            return Err(FrameError::Skipped("window minimised".into()));
        }
        frame
            .backdrop
            .rasterize_argb(width, height, &mut self.pixels);
        self.window
            .update_with_buffer(&self.pixels, width, height)
            .map_err(|err| FrameError::Skipped(err.to_string()))
    }
}

/// Runs the gradient fallback in a `minifb` window until it is closed.
pub(crate) fn run(
    config: &RendererConfig,
    hub: &PointerHub,
    theme: HostTheme,
    failure: RenderFailure,
) -> Result<()> {
    let (width, height) = config.surface_size;
    let window = Window::new(
        WINDOW_TITLE,
        width.max(1) as usize,
        height.max(1) as usize,
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        },
    )
    .map_err(|err| anyhow!("failed to open software fallback window: {err}"))?;

    let presenter = SoftwarePresenter {
        window,
        pixels: Vec::new(),
    };
    let settings = SurfaceSettings {
        color_a: config.color_a,
        color_b: config.color_b,
        cycle: crate::fallback::OpacityCycle::new(config.fallback_cycle),
        force_fallback: config.force_fallback,
    };
    let mut surface = AnimatedSurface::mount_failed(presenter, hub, theme, settings, failure);

    let fps = config.target_fps.unwrap_or(SOFTWARE_FPS_CAP).max(1.0);
    surface.target_mut().window.set_target_fps(fps.round() as usize);
    tracing::warn!(fps, "presenting gradient fallback on the CPU");

    let mut clock = FrameClock::start();
    while surface.target().is_open() {
        if let Some(position) = surface.target().pointer() {
            hub.dispatch(position);
        }
        surface.render(clock.sample());
    }
    tracing::info!("software fallback window closed");
    Ok(())
}

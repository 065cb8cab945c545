use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use tracing::{info, warn};

use crate::fallback::OpacityCycle;
use crate::gpu::GpuState;
use crate::mode::RenderFailure;
use crate::pointer::{PointerHub, PointerPosition};
use crate::runtime::{FrameClock, FrameScheduler};
use crate::software::{self, SOFTWARE_FPS_CAP};
use crate::surface::{AnimatedSurface, FrameStatus, SceneTarget, SurfaceSettings};
use crate::theme::{HostTheme, Theme};
use crate::types::RendererConfig;

pub(crate) const WINDOW_TITLE: &str = "wavepaper";

/// Window plus the surface drawing into it.
///
/// Field order matters: the GPU surface must drop before the window it was
/// created from.
struct WindowState {
    surface: AnimatedSurface<GpuState>,
    window: Arc<Window>,
}

impl WindowState {
    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.surface.target_mut().resize(new_size);
    }
}

fn surface_settings(config: &RendererConfig) -> SurfaceSettings {
    SurfaceSettings {
        color_a: config.color_a,
        color_b: config.color_b,
        cycle: OpacityCycle::new(config.fallback_cycle),
        force_fallback: config.force_fallback,
    }
}

pub(crate) fn run(config: &RendererConfig) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(WINDOW_TITLE)
        .with_inner_size(window_size)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let hub = PointerHub::new();
    let theme = HostTheme::new(config.theme, window.theme().map(Theme::from));

    let gpu = match GpuState::new(window.as_ref(), window.inner_size(), config) {
        Ok(gpu) => gpu,
        Err(err) => {
            let failure = RenderFailure::Initialization(format!("{err:#}"));
            drop(window);
            drop(event_loop);
            return software::run(config, &hub, theme, failure);
        }
    };

    let mut target_fps = config.target_fps;
    if target_fps.is_none() && gpu.adapter_profile().is_software() {
        warn!(
            adapter = %gpu.adapter_profile().name,
            cap = SOFTWARE_FPS_CAP,
            "software rasterizer detected; capping frame rate (override with --fps)"
        );
        target_fps = Some(SOFTWARE_FPS_CAP);
    }

    let surface = AnimatedSurface::mount(gpu, &hub, theme, surface_settings(config));
    info!(
        mode = ?surface.mode(),
        theme = surface.theme().as_str(),
        "animated background mounted"
    );
    let mut state = WindowState { surface, window };
    let mut scheduler = FrameScheduler::new(target_fps);
    let mut clock = FrameClock::start();
    state.window().request_redraw();

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        elwt.exit();
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        hub.dispatch(PointerPosition::new(position.x, position.y));
                    }
                    WindowEvent::Resized(new_size) => {
                        state.resize(new_size);
                        state.window().request_redraw();
                    }
                    WindowEvent::ThemeChanged(theme) => {
                        if state.surface.report_theme(Theme::from(theme)) {
                            info!(theme = state.surface.theme().as_str(), "host theme changed");
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        if !scheduler.ready_for_frame(now) {
                            return;
                        }
                        match state.surface.render(clock.sample()) {
                            FrameStatus::Presented(_) => scheduler.mark_rendered(now),
                            FrameStatus::Skipped => {
                                tracing::trace!(
                                    viewport = ?state.surface.target().viewport(),
                                    "frame skipped; retrying"
                                );
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                let now = Instant::now();
                if scheduler.ready_for_frame(now) {
                    tracing::trace!("scheduler: issuing redraw now");
                    state.window().request_redraw();
                    elwt.set_control_flow(ControlFlow::Wait);
                } else if let Some(deadline) = scheduler.next_deadline() {
                    let ms = deadline.saturating_duration_since(now).as_millis();
                    tracing::trace!(deadline_ms = ms, "scheduler: waiting until next frame");
                    elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                } else {
                    elwt.set_control_flow(ControlFlow::Wait);
                }
            }
            _ => {}
        })
        .map_err(|err| anyhow!("window event loop error: {err}"))
}

//! Renderer crate for wavepaper, the animated wave background.
//!
//! Two translucent wave planes follow the pointer over a themed gradient.
//! The overall flow is:
//!
//! ```text
//!   CLI / wavepaper
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ winit event loop ──▶ AnimatedSurface::render()
//!                          │                     │
//!                  CursorMoved ─▶ PointerHub     ├─▶ WaveMotion::advance()
//!                                                └─▶ SceneTarget::draw() ─▶ GPU / CPU
//! ```
//!
//! Per-frame maths (`motion`, `fallback`, `streaks`) is free of graphics
//! types. `AnimatedSurface` owns the one-way fallback latch: once the wave
//! layer fails it is dropped and only the gradient keeps drawing. If no GPU
//! surface can be created at all, a `minifb` window presents the gradient
//! from the CPU instead.

mod compile;
mod export;
mod fallback;
mod gpu;
mod mode;
mod motion;
mod pointer;
mod runtime;
mod software;
mod streaks;
mod surface;
mod theme;
mod types;
mod window;

use anyhow::Result;

pub use export::{export_fallback_png, StillRequest};
pub use fallback::{
    ease_in_out, FallbackFrame, Gradient, GradientSet, OpacityCycle, DEFAULT_CYCLE_SECONDS,
    OPACITY_KEYFRAMES, OVERLAY_STOP_ALPHA,
};
pub use mode::{ModeLatch, RenderFailure, SurfaceMode};
pub use motion::{
    normalize_pointer, view_projection, PlaneMotion, PlaneSpec, ShaderState, WaveFrame,
    WaveMotion,
};
pub use pointer::{PointerHub, PointerPosition, PointerSubscription, PointerTracker};
pub use runtime::{FrameClock, FrameScheduler, TimeSample};
pub use streaks::{streak_layout, Streak, STREAK_COUNT};
pub use surface::{
    AnimatedSurface, FrameError, FrameStatus, SceneFrame, SceneTarget, SurfaceSettings,
};
pub use theme::{HostTheme, Theme, ThemePreference, ThemeSource};
pub use types::{AdapterProfile, Antialiasing, RendererConfig, DEFAULT_COLOR_A, DEFAULT_COLOR_B};

/// Entry point that opens the background window.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Runs until the window is closed. Render-surface failures degrade to
    /// the gradient fallback and are not returned; only window-system errors
    /// are.
    pub fn run(&mut self) -> Result<()> {
        tracing::debug!(config = ?self.config, "starting renderer");
        window::run(&self.config)
    }
}

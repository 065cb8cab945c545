//! The animated surface: drives wave motion, the gradient backdrop, and the
//! one-way fallback latch on top of any [`SceneTarget`].
//!
//! The controller owns no graphics resources. A `SceneTarget` is the thing
//! that actually puts pixels on screen (the wgpu state, or the CPU presenter
//! used when no GPU is available), which keeps the failure policy testable
//! without a device.

use crate::fallback::{FallbackFrame, OpacityCycle};
use crate::mode::{ModeLatch, RenderFailure, SurfaceMode};
use crate::motion::{normalize_pointer, WaveFrame, WaveMotion};
use crate::pointer::{PointerHub, PointerTracker};
use crate::runtime::TimeSample;
use crate::streaks::{streak_layout, Streak, STREAK_COUNT};
use crate::theme::{HostTheme, Theme, ThemeSource};

/// Everything a target needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct SceneFrame {
    pub viewport: (u32, u32),
    pub backdrop: FallbackFrame,
    /// Present only while the waves are rendering.
    pub streaks: Option<[Streak; STREAK_COUNT]>,
    /// `None` once the surface has fallen back.
    pub waves: Option<WaveFrame>,
}

/// Why a frame did not make it to the screen intact.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The wave layer failed. The backdrop may still have been presented.
    #[error("wave layer failed: {0}")]
    Waves(String),
    /// Nothing was presented this time; the next frame may succeed.
    #[error("frame skipped: {0}")]
    Skipped(String),
}

/// Something that can present [`SceneFrame`]s.
pub trait SceneTarget {
    /// Drawable size in physical pixels.
    fn viewport(&self) -> (u32, u32);
    /// Builds the wave layer. Called at most once per surface.
    fn attach_waves(&mut self) -> anyhow::Result<()>;
    /// Releases the wave layer after a failure.
    fn detach_waves(&mut self);
    fn draw(&mut self, frame: &SceneFrame) -> Result<(), FrameError>;
}

/// Outcome of [`AnimatedSurface::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Presented(SurfaceMode),
    Skipped,
}

/// Construction options for [`AnimatedSurface`].
#[derive(Debug, Clone, Copy)]
pub struct SurfaceSettings {
    pub color_a: [f32; 3],
    pub color_b: [f32; 3],
    pub cycle: OpacityCycle,
    pub force_fallback: bool,
}

pub struct AnimatedSurface<T: SceneTarget> {
    target: T,
    tracker: PointerTracker,
    motion: WaveMotion,
    latch: ModeLatch,
    theme: HostTheme,
    cycle: OpacityCycle,
    waves_attached: bool,
}

impl<T: SceneTarget> AnimatedSurface<T> {
    /// Mounts the surface: subscribes to pointer events and tries to build
    /// the wave layer. A failure here trips the latch instead of erroring.
    pub fn mount(target: T, hub: &PointerHub, theme: HostTheme, settings: SurfaceSettings) -> Self {
        let mut surface = Self::unattached(target, hub, theme, settings);
        if settings.force_fallback {
            surface.latch.trip(RenderFailure::Forced);
            return surface;
        }
        match surface.target.attach_waves() {
            Ok(()) => {
                surface.waves_attached = true;
                tracing::info!("wave layer attached");
            }
            Err(err) => {
                surface
                    .latch
                    .trip(RenderFailure::Initialization(format!("{err:#}")));
            }
        }
        surface
    }

    /// Mounts a surface that starts latched into fallback because of
    /// `failure`; the wave layer is never attempted.
    pub fn mount_failed(
        target: T,
        hub: &PointerHub,
        theme: HostTheme,
        settings: SurfaceSettings,
        failure: RenderFailure,
    ) -> Self {
        let mut surface = Self::unattached(target, hub, theme, settings);
        surface.latch.trip(failure);
        surface
    }

    fn unattached(target: T, hub: &PointerHub, theme: HostTheme, settings: SurfaceSettings) -> Self {
        Self {
            target,
            tracker: PointerTracker::mount(hub),
            motion: WaveMotion::new(settings.color_a, settings.color_b),
            latch: ModeLatch::new(),
            theme,
            cycle: settings.cycle,
            waves_attached: false,
        }
    }

    pub fn mode(&self) -> SurfaceMode {
        self.latch.mode()
    }

    pub fn failure(&self) -> Option<&RenderFailure> {
        self.latch.failure()
    }

    pub fn theme(&self) -> Theme {
        self.theme.current()
    }

    /// Forwards a host theme change; returns whether the visible theme changed.
    pub fn report_theme(&mut self, theme: Theme) -> bool {
        self.theme.report(theme)
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    /// Builds the scene for `sample` without drawing it.
    pub fn scene(&mut self, sample: TimeSample) -> SceneFrame {
        let viewport = self.target.viewport();
        let backdrop = FallbackFrame::at(self.theme.current(), &self.cycle, sample.seconds);
        if self.latch.is_fallback() || !self.waves_attached {
            return SceneFrame {
                viewport,
                backdrop,
                streaks: None,
                waves: None,
            };
        }

        let position = self.tracker.position();
        let pointer = normalize_pointer(position, viewport);
        SceneFrame {
            viewport,
            backdrop,
            streaks: Some(streak_layout(position, viewport, sample.seconds)),
            waves: Some(self.motion.advance(sample.seconds, pointer)),
        }
    }

    /// Draws one frame. Render failures are absorbed here: they trip the
    /// latch and release the wave layer, and are never returned.
    pub fn render(&mut self, sample: TimeSample) -> FrameStatus {
        let frame = self.scene(sample);
        match self.target.draw(&frame) {
            Ok(()) => FrameStatus::Presented(self.latch.mode()),
            Err(FrameError::Waves(reason)) => {
                self.latch.trip(RenderFailure::Frame(reason));
                if self.waves_attached {
                    self.target.detach_waves();
                    self.waves_attached = false;
                }
                FrameStatus::Presented(self.latch.mode())
            }
            Err(FrameError::Skipped(reason)) => {
                tracing::debug!(%reason, frame = sample.frame_index, "frame skipped");
                FrameStatus::Skipped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::PointerPosition;
    use crate::theme::ThemePreference;
    use crate::types::{DEFAULT_COLOR_A, DEFAULT_COLOR_B};

    #[derive(Default)]
    struct FakeTarget {
        fail_attach: bool,
        fail_draw_at: Option<usize>,
        attach_calls: usize,
        detach_calls: usize,
        frames: Vec<SceneFrame>,
    }

    impl SceneTarget for FakeTarget {
        fn viewport(&self) -> (u32, u32) {
            (1920, 1080)
        }

        fn attach_waves(&mut self) -> anyhow::Result<()> {
            self.attach_calls += 1;
            if self.fail_attach {
                anyhow::bail!("no wave pipeline");
            }
            Ok(())
        }

        fn detach_waves(&mut self) {
            self.detach_calls += 1;
        }

        fn draw(&mut self, frame: &SceneFrame) -> Result<(), FrameError> {
            let index = self.frames.len();
            self.frames.push(*frame);
            if self.fail_draw_at == Some(index) {
                return Err(FrameError::Waves("validation error".into()));
            }
            Ok(())
        }
    }

    fn settings() -> SurfaceSettings {
        SurfaceSettings {
            color_a: DEFAULT_COLOR_A,
            color_b: DEFAULT_COLOR_B,
            cycle: OpacityCycle::default(),
            force_fallback: false,
        }
    }

    fn dark() -> HostTheme {
        HostTheme::new(ThemePreference::Fixed(Theme::Dark), None)
    }

    #[test]
    fn healthy_surface_renders_waves_and_streaks() {
        let hub = PointerHub::new();
        let mut surface = AnimatedSurface::mount(FakeTarget::default(), &hub, dark(), settings());
        hub.dispatch(PointerPosition::new(1920.0, 0.0));

        let status = surface.render(TimeSample::new(1.0, 0));
        assert_eq!(status, FrameStatus::Presented(SurfaceMode::Rendering));
        let frame = surface.target().frames[0];
        let waves = frame.waves.expect("waves while rendering");
        assert_eq!(waves.planes[0].pointer, [1.0, 1.0]);
        assert!(frame.streaks.is_some());
    }

    #[test]
    fn attach_failure_latches_fallback_without_retry() {
        let hub = PointerHub::new();
        let target = FakeTarget {
            fail_attach: true,
            ..FakeTarget::default()
        };
        let mut surface = AnimatedSurface::mount(target, &hub, dark(), settings());
        assert_eq!(surface.mode(), SurfaceMode::Fallback);
        assert!(matches!(
            surface.failure(),
            Some(RenderFailure::Initialization(_))
        ));

        for frame in 0..10 {
            let status = surface.render(TimeSample::new(frame as f32 * 0.1, frame));
            assert_eq!(status, FrameStatus::Presented(SurfaceMode::Fallback));
        }
        assert_eq!(surface.target().attach_calls, 1);
        assert!(surface.target().frames.iter().all(|f| f.waves.is_none()));
    }

    #[test]
    fn frame_failure_trips_once_and_never_retries_waves() {
        let hub = PointerHub::new();
        let target = FakeTarget {
            fail_draw_at: Some(2),
            ..FakeTarget::default()
        };
        let mut surface = AnimatedSurface::mount(target, &hub, dark(), settings());

        let modes: Vec<_> = (0..8)
            .map(|frame| surface.render(TimeSample::new(frame as f32, frame)))
            .collect();
        assert_eq!(modes[1], FrameStatus::Presented(SurfaceMode::Rendering));
        assert!(modes[2..]
            .iter()
            .all(|status| *status == FrameStatus::Presented(SurfaceMode::Fallback)));

        let target = surface.target();
        assert_eq!(target.detach_calls, 1);
        assert_eq!(target.attach_calls, 1);
        assert!(target.frames[3..].iter().all(|f| f.waves.is_none() && f.streaks.is_none()));
    }

    #[test]
    fn forced_fallback_skips_wave_layer() {
        let hub = PointerHub::new();
        let mut forced = settings();
        forced.force_fallback = true;
        let mut surface = AnimatedSurface::mount(FakeTarget::default(), &hub, dark(), forced);
        assert_eq!(surface.failure(), Some(&RenderFailure::Forced));
        assert_eq!(surface.target().attach_calls, 0);
        surface.render(TimeSample::new(0.0, 0));
        assert!(surface.target().frames[0].waves.is_none());
    }

    #[test]
    fn overlay_pulse_continues_in_fallback() {
        let hub = PointerHub::new();
        let mut surface = AnimatedSurface::mount_failed(
            FakeTarget::default(),
            &hub,
            dark(),
            settings(),
            RenderFailure::Initialization("no adapter".into()),
        );
        let opacities: Vec<f32> = [0.0, 4.0, 8.0]
            .iter()
            .map(|&t| surface.scene(TimeSample::new(t, 0)).backdrop.overlay_opacity)
            .collect();
        assert!((opacities[0] - 0.3).abs() < 1e-3);
        assert!((opacities[1] - 0.7).abs() < 1e-3);
        assert!((opacities[2] - 0.3).abs() < 1e-3);
    }

    #[test]
    fn overlay_pulse_runs_while_rendering() {
        let hub = PointerHub::new();
        let mut surface = AnimatedSurface::mount(FakeTarget::default(), &hub, dark(), settings());
        assert_eq!(surface.mode(), SurfaceMode::Rendering);

        for (frame, (t, expected)) in [(0.0, 0.3), (4.0, 0.7), (8.0, 0.3)].into_iter().enumerate() {
            let status = surface.render(TimeSample::new(t, frame as u64));
            assert_eq!(status, FrameStatus::Presented(SurfaceMode::Rendering));
            let drawn = surface.target().frames[frame];
            assert!(drawn.waves.is_some());
            assert!((drawn.backdrop.overlay_opacity - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn dropping_surface_releases_pointer_listener() {
        let hub = PointerHub::new();
        let surface = AnimatedSurface::mount(FakeTarget::default(), &hub, dark(), settings());
        assert_eq!(hub.listener_count(), 1);
        drop(surface);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn system_theme_follows_host_reports() {
        let hub = PointerHub::new();
        let theme = HostTheme::new(ThemePreference::System, None);
        let mut surface = AnimatedSurface::mount(FakeTarget::default(), &hub, theme, settings());
        assert_eq!(surface.theme(), Theme::Light);
        assert!(surface.report_theme(Theme::Dark));
        surface.render(TimeSample::new(0.0, 0));
        assert_eq!(
            surface.target().frames[0].backdrop.gradients,
            crate::fallback::GradientSet::DARK
        );
    }
}

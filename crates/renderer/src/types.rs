use crate::theme::ThemePreference;

/// Default wave colours (`#1e40af`, `#3b82f6`).
pub const DEFAULT_COLOR_A: [f32; 3] = [30.0 / 255.0, 64.0 / 255.0, 175.0 / 255.0];
pub const DEFAULT_COLOR_B: [f32; 3] = [59.0 / 255.0, 130.0 / 255.0, 246.0 / 255.0];

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Describes the wgpu adapter picked for rendering.
#[derive(Debug, Clone)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
}

impl AdapterProfile {
    pub(crate) fn from_wgpu(info: &wgpu::AdapterInfo) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
        }
    }

    /// True for CPU rasterisers such as llvmpipe or WARP.
    pub fn is_software(&self) -> bool {
        matches!(self.device_type, wgpu::DeviceType::Cpu)
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors the CLI flags and configuration file: how large
/// the window should be, which theme to draw, and how the wave planes are
/// coloured.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Theme selection for the gradient layer.
    pub theme: ThemePreference,
    /// Optional FPS cap; `None` renders on every redraw callback.
    pub target_fps: Option<f32>,
    /// Anti-aliasing mode requested by the caller.
    pub antialiasing: Antialiasing,
    /// First wave colour (`PlaneParams.color_a`).
    pub color_a: [f32; 3],
    /// Second wave colour (`PlaneParams.color_b`).
    pub color_b: [f32; 3],
    /// Length of one fallback opacity cycle in seconds.
    pub fallback_cycle: f32,
    /// Start the run already degraded to the gradient fallback.
    pub force_fallback: bool,
}

impl Default for RendererConfig {
    /// Provides a 1080p configuration that follows the system theme.
    fn default() -> Self {
        Self {
            surface_size: (1920, 1080),
            theme: ThemePreference::System,
            target_fps: None,
            antialiasing: Antialiasing::default(),
            color_a: DEFAULT_COLOR_A,
            color_b: DEFAULT_COLOR_B,
            fallback_cycle: crate::fallback::DEFAULT_CYCLE_SECONDS,
            force_fallback: false,
        }
    }
}

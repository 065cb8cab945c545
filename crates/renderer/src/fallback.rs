//! The gradient fallback: a themed two-layer gradient whose overlay pulses
//! opacity through `[0.3, 0.7, 0.3]` forever.
//!
//! The same maths drives three consumers: the GPU backdrop pass (which is
//! always drawn under the wave planes), the software fallback window, and the
//! PNG snapshot export.

use image::{Rgba, RgbaImage};

use crate::theme::Theme;

/// Default length of one opacity cycle.
pub const DEFAULT_CYCLE_SECONDS: f32 = 8.0;

/// Opacity keyframes of the overlay, evenly spaced over one cycle.
pub const OPACITY_KEYFRAMES: [f32; 3] = [0.3, 0.7, 0.3];

/// Alpha of both overlay colour stops.
pub const OVERLAY_STOP_ALPHA: f32 = 0.3;

const fn hex(rgb: u32) -> [f32; 3] {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    ]
}

const GRAY_900: [f32; 3] = hex(0x111827);
const BLUE_900: [f32; 3] = hex(0x1e3a8a);
const INDIGO_900: [f32; 3] = hex(0x312e81);
const BLUE_800: [f32; 3] = hex(0x1e40af);
const BLUE_700: [f32; 3] = hex(0x1d4ed8);
const BLUE_500: [f32; 3] = hex(0x3b82f6);
const BLUE_400: [f32; 3] = hex(0x60a5fa);

/// A two-stop linear gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient {
    pub from: [f32; 3],
    pub to: [f32; 3],
}

impl Gradient {
    pub fn sample(&self, t: f32) -> [f32; 3] {
        mix3(self.from, self.to, t.clamp(0.0, 1.0))
    }
}

/// Base and overlay gradients for one theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientSet {
    /// Drawn toward the bottom-right corner.
    pub base: Gradient,
    /// Drawn toward the top-right corner at [`OVERLAY_STOP_ALPHA`].
    pub overlay: Gradient,
}

impl GradientSet {
    pub const DARK: GradientSet = GradientSet {
        base: Gradient {
            from: GRAY_900,
            to: BLUE_900,
        },
        overlay: Gradient {
            from: BLUE_900,
            to: INDIGO_900,
        },
    };

    pub const LIGHT: GradientSet = GradientSet {
        base: Gradient {
            from: BLUE_800,
            to: BLUE_500,
        },
        overlay: Gradient {
            from: BLUE_700,
            to: BLUE_400,
        },
    };

    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::DARK,
            Theme::Light => Self::LIGHT,
        }
    }
}

/// Gradient position for a `to bottom right` gradient at `(u, v)`, `v` down.
pub fn bottom_right_t(u: f32, v: f32) -> f32 {
    (u + v) * 0.5
}

/// Gradient position for a `to top right` gradient at `(u, v)`, `v` down.
pub fn top_right_t(u: f32, v: f32) -> f32 {
    (u + 1.0 - v) * 0.5
}

/// CSS `ease-in-out`, i.e. `cubic-bezier(0.42, 0, 0.58, 1)`.
pub fn ease_in_out(progress: f32) -> f32 {
    cubic_bezier(0.42, 0.0, 0.58, 1.0, progress.clamp(0.0, 1.0))
}

fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, x: f32) -> f32 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let curve = |p1: f32, p2: f32, t: f32| {
        let inv = 1.0 - t;
        3.0 * inv * inv * t * p1 + 3.0 * inv * t * t * p2 + t * t * t
    };
    let slope = |p1: f32, p2: f32, t: f32| {
        let inv = 1.0 - t;
        3.0 * inv * inv * p1 + 6.0 * inv * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
    };

    let mut t = x;
    for _ in 0..8 {
        let error = curve(x1, x2, t) - x;
        if error.abs() < 1e-6 {
            return curve(y1, y2, t);
        }
        let d = slope(x1, x2, t);
        if d.abs() < 1e-6 {
            break;
        }
        t -= error / d;
    }

    let (mut low, mut high) = (0.0_f32, 1.0_f32);
    t = x;
    for _ in 0..32 {
        let value = curve(x1, x2, t);
        if (value - x).abs() < 1e-6 {
            break;
        }
        if value < x {
            low = t;
        } else {
            high = t;
        }
        t = (low + high) * 0.5;
    }
    curve(y1, y2, t)
}

/// Overlay opacity animation, repeating forever.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpacityCycle {
    period: f32,
}

impl Default for OpacityCycle {
    fn default() -> Self {
        Self {
            period: DEFAULT_CYCLE_SECONDS,
        }
    }
}

impl OpacityCycle {
    /// Builds a cycle of `period` seconds; non-positive periods use the
    /// default.
    pub fn new(period: f32) -> Self {
        if period.is_finite() && period > 0.0 {
            Self { period }
        } else {
            Self::default()
        }
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    /// Overlay opacity `elapsed` seconds after the animation started.
    pub fn opacity_at(&self, elapsed: f32) -> f32 {
        let progress = (elapsed.max(0.0) % self.period) / self.period;
        let segments = (OPACITY_KEYFRAMES.len() - 1) as f32;
        let scaled = progress * segments;
        let index = (scaled.floor() as usize).min(OPACITY_KEYFRAMES.len() - 2);
        let local = scaled - index as f32;
        let from = OPACITY_KEYFRAMES[index];
        let to = OPACITY_KEYFRAMES[index + 1];
        from + (to - from) * ease_in_out(local)
    }
}

/// Everything needed to shade one fallback frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackFrame {
    pub gradients: GradientSet,
    pub overlay_opacity: f32,
}

impl FallbackFrame {
    pub fn at(theme: Theme, cycle: &OpacityCycle, elapsed: f32) -> Self {
        Self {
            gradients: GradientSet::for_theme(theme),
            overlay_opacity: cycle.opacity_at(elapsed),
        }
    }

    /// Composited colour at normalised position `(u, v)`, `v` pointing down.
    pub fn shade(&self, u: f32, v: f32) -> [f32; 3] {
        let base = self.gradients.base.sample(bottom_right_t(u, v));
        let overlay = self.gradients.overlay.sample(top_right_t(u, v));
        mix3(base, overlay, OVERLAY_STOP_ALPHA * self.overlay_opacity)
    }

    /// Renders the frame into an opaque RGBA image.
    pub fn rasterize(&self, width: u32, height: u32) -> RgbaImage {
        let (w, h) = (width.max(1), height.max(1));
        RgbaImage::from_fn(w, h, |x, y| {
            let [r, g, b] = self.shade(pixel_center(x, w), pixel_center(y, h));
            Rgba([to_byte(r), to_byte(g), to_byte(b), 255])
        })
    }

    /// Renders the frame as `0RGB` words, the layout `minifb` presents.
    pub fn rasterize_argb(&self, width: usize, height: usize, buffer: &mut Vec<u32>) {
        buffer.clear();
        buffer.reserve(width * height);
        let (w, h) = (width.max(1) as u32, height.max(1) as u32);
        for y in 0..height as u32 {
            let v = pixel_center(y, h);
            for x in 0..width as u32 {
                let [r, g, b] = self.shade(pixel_center(x, w), v);
                buffer.push(
                    (u32::from(to_byte(r)) << 16)
                        | (u32::from(to_byte(g)) << 8)
                        | u32::from(to_byte(b)),
                );
            }
        }
    }
}

fn pixel_center(index: u32, extent: u32) -> f32 {
    (index as f32 + 0.5) / extent as f32
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn mix3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

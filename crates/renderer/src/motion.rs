//! Per-frame maths for the wave planes.
//!
//! Nothing in here touches `wgpu`: the render loop samples the clock and the
//! pointer, calls [`WaveMotion::advance`], and uploads the resulting
//! [`ShaderState`]s. That keeps the animation testable without a GPU.

use std::f32::consts::FRAC_PI_4;

use glam::{Mat4, Vec2, Vec3};

use crate::pointer::PointerPosition;

/// Vertical field of view of the scene camera, in degrees.
pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_EYE: [f32; 3] = [0.0, 0.0, 5.0];

/// Converts a pointer position into device coordinates in `[-1, 1]`, with
/// `+y` pointing up. Zero-sized viewports are treated as one pixel wide.
pub fn normalize_pointer(position: PointerPosition, viewport: (u32, u32)) -> [f32; 2] {
    let width = viewport.0.max(1) as f64;
    let height = viewport.1.max(1) as f64;
    [
        ((position.x / width) * 2.0 - 1.0) as f32,
        (-(position.y / height) * 2.0 + 1.0) as f32,
    ]
}

/// Linear interpolation from `current` toward `target`.
pub fn lerp(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// Static description of one wave plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSpec {
    /// Edge length of the square plane in world units.
    pub size: f32,
    /// Grid subdivisions along each edge.
    pub segments: u32,
    /// Resting depth of the plane.
    pub depth: f32,
    /// Z rotation before the first frame is drawn.
    pub initial_rotation: f32,
    /// Multiplier applied to elapsed time before it reaches the shader.
    pub time_scale: f32,
    /// How far the plane drifts toward the pointer (world units per NDC unit).
    pub follow: f32,
    /// Fraction of the remaining distance covered each frame.
    pub damping: f32,
    pub sway_frequency: f32,
    pub sway_amplitude: f32,
    pub opacity: f32,
}

impl PlaneSpec {
    pub const FRONT: PlaneSpec = PlaneSpec {
        size: 10.0,
        segments: 64,
        depth: 0.0,
        initial_rotation: 0.0,
        time_scale: 1.0,
        follow: 0.5,
        damping: 0.05,
        sway_frequency: 0.1,
        sway_amplitude: 0.1,
        opacity: 1.0,
    };

    pub const BACK: PlaneSpec = PlaneSpec {
        size: 15.0,
        segments: 48,
        depth: -1.0,
        initial_rotation: FRAC_PI_4,
        time_scale: 0.8,
        follow: 0.3,
        damping: 0.03,
        sway_frequency: 0.08,
        sway_amplitude: -0.1,
        opacity: 0.7,
    };
}

/// Mutable transform of one plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneMotion {
    spec: PlaneSpec,
    position: Vec2,
    rotation: f32,
}

impl PlaneMotion {
    pub fn new(spec: PlaneSpec) -> Self {
        Self {
            spec,
            position: Vec2::ZERO,
            rotation: spec.initial_rotation,
        }
    }

    pub fn spec(&self) -> &PlaneSpec {
        &self.spec
    }

    pub fn position(&self) -> [f32; 2] {
        self.position.to_array()
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Moves one damping step toward the pointer-scaled target and applies the
    /// time-based sway.
    pub fn step(&mut self, elapsed: f32, pointer: [f32; 2]) {
        let target = Vec2::from(pointer) * self.spec.follow;
        self.position = Vec2::new(
            lerp(self.position.x, target.x, self.spec.damping),
            lerp(self.position.y, target.y, self.spec.damping),
        );
        self.rotation = (elapsed * self.spec.sway_frequency).sin() * self.spec.sway_amplitude;
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.position.x, self.position.y, self.spec.depth))
            * Mat4::from_rotation_z(self.rotation)
    }
}

/// Uniform values for one plane, recomputed every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderState {
    pub time: f32,
    pub color_a: [f32; 3],
    pub color_b: [f32; 3],
    pub pointer: [f32; 2],
    pub opacity: f32,
    pub model: Mat4,
}

/// Output of one animation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveFrame {
    pub planes: [ShaderState; 2],
}

/// Animation state for the front and back planes.
#[derive(Debug, Clone)]
pub struct WaveMotion {
    planes: [PlaneMotion; 2],
    color_a: [f32; 3],
    color_b: [f32; 3],
}

impl WaveMotion {
    pub fn new(color_a: [f32; 3], color_b: [f32; 3]) -> Self {
        Self {
            planes: [
                PlaneMotion::new(PlaneSpec::FRONT),
                PlaneMotion::new(PlaneSpec::BACK),
            ],
            color_a,
            color_b,
        }
    }

    pub fn planes(&self) -> &[PlaneMotion; 2] {
        &self.planes
    }

    /// Advances both planes to `elapsed` seconds with the given normalised
    /// pointer.
    pub fn advance(&mut self, elapsed: f32, pointer: [f32; 2]) -> WaveFrame {
        let planes = [0, 1].map(|index| {
            let plane = &mut self.planes[index];
            plane.step(elapsed, pointer);
            ShaderState {
                time: elapsed * plane.spec.time_scale,
                color_a: self.color_a,
                color_b: self.color_b,
                pointer,
                opacity: plane.spec.opacity,
                model: plane.model_matrix(),
            }
        });
        WaveFrame { planes }
    }
}

/// Combined view-projection matrix of the scene camera.
pub fn view_projection(viewport: (u32, u32)) -> Mat4 {
    let aspect = viewport.0.max(1) as f32 / viewport.1.max(1) as f32;
    let projection = Mat4::perspective_rh(
        CAMERA_FOV_DEGREES.to_radians(),
        aspect,
        CAMERA_NEAR,
        CAMERA_FAR,
    );
    let view = Mat4::look_at_rh(Vec3::from(CAMERA_EYE), Vec3::ZERO, Vec3::Y);
    projection * view
}

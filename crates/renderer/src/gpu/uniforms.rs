use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::fallback::{FallbackFrame, OVERLAY_STOP_ALPHA};
use crate::motion::ShaderState;
use crate::streaks::{Streak, STREAK_COLOR, STREAK_COUNT, STREAK_OPACITY};

fn rgba(rgb: [f32; 3], alpha: f32) -> [f32; 4] {
    [rgb[0], rgb[1], rgb[2], alpha]
}

/// `CameraParams` block shared by both wave planes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniforms {
    pub fn new(view_proj: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
        }
    }
}

/// `PlaneParams` block, one per wave plane.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct PlaneUniforms {
    pub model: [[f32; 4]; 4],
    pub color_a: [f32; 4],
    pub color_b: [f32; 4],
    pub mouse: [f32; 2],
    pub time: f32,
    pub opacity: f32,
}

impl From<&ShaderState> for PlaneUniforms {
    fn from(state: &ShaderState) -> Self {
        Self {
            model: state.model.to_cols_array_2d(),
            color_a: rgba(state.color_a, 1.0),
            color_b: rgba(state.color_b, 1.0),
            mouse: state.pointer,
            time: state.time,
            opacity: state.opacity,
        }
    }
}

/// `BackdropParams` block: gradients, overlay pulse, and streaks.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct BackdropUniforms {
    pub base_from: [f32; 4],
    pub base_to: [f32; 4],
    /// Alpha carries the overlay stop alpha.
    pub overlay_from: [f32; 4],
    pub overlay_to: [f32; 4],
    /// Alpha carries the streak opacity.
    pub streak_color: [f32; 4],
    pub resolution: [f32; 2],
    pub overlay_opacity: f32,
    /// 0 hides the streaks, 1 shows them.
    pub streak_mix: f32,
    pub streaks: [[f32; 4]; STREAK_COUNT],
}

impl BackdropUniforms {
    pub fn new(
        frame: &FallbackFrame,
        streaks: Option<&[Streak; STREAK_COUNT]>,
        resolution: (u32, u32),
    ) -> Self {
        let gradients = &frame.gradients;
        let mut packed = [[0.0; 4]; STREAK_COUNT];
        if let Some(streaks) = streaks {
            for (slot, streak) in packed.iter_mut().zip(streaks) {
                *slot = [streak.top, streak.offset, streak.thickness, 0.0];
            }
        }
        Self {
            base_from: rgba(gradients.base.from, 1.0),
            base_to: rgba(gradients.base.to, 1.0),
            overlay_from: rgba(gradients.overlay.from, OVERLAY_STOP_ALPHA),
            overlay_to: rgba(gradients.overlay.to, OVERLAY_STOP_ALPHA),
            streak_color: rgba(STREAK_COLOR, STREAK_OPACITY),
            resolution: [resolution.0.max(1) as f32, resolution.1.max(1) as f32],
            overlay_opacity: frame.overlay_opacity,
            streak_mix: if streaks.is_some() { 1.0 } else { 0.0 },
            streaks: packed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::OpacityCycle;
    use crate::pointer::PointerPosition;
    use crate::streaks::streak_layout;
    use crate::theme::Theme;

    #[test]
    fn layouts_match_std140_blocks() {
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 64);
        assert_eq!(std::mem::size_of::<PlaneUniforms>(), 112);
        assert_eq!(std::mem::size_of::<BackdropUniforms>(), 176);
    }

    #[test]
    fn backdrop_hides_streaks_without_layout() {
        let frame = FallbackFrame::at(Theme::Dark, &OpacityCycle::default(), 0.0);
        let uniforms = BackdropUniforms::new(&frame, None, (0, 0));
        assert_eq!(uniforms.streak_mix, 0.0);
        assert_eq!(uniforms.resolution, [1.0, 1.0]);
        assert_eq!(uniforms.overlay_from[3], OVERLAY_STOP_ALPHA);
        assert!((uniforms.overlay_opacity - 0.3).abs() < 1e-4);
    }

    #[test]
    fn backdrop_packs_streaks() {
        let frame = FallbackFrame::at(Theme::Light, &OpacityCycle::default(), 4.0);
        let streaks = streak_layout(PointerPosition::new(50.0, 50.0), (100, 100), 3.0);
        let uniforms = BackdropUniforms::new(&frame, Some(&streaks), (100, 100));
        assert_eq!(uniforms.streak_mix, 1.0);
        for (packed, streak) in uniforms.streaks.iter().zip(&streaks) {
            assert_eq!(packed[0], streak.top);
            assert_eq!(packed[1], streak.offset);
            assert_eq!(packed[2], streak.thickness);
        }
    }

    #[test]
    fn plane_uniforms_copy_shader_state() {
        let state = ShaderState {
            time: 2.5,
            color_a: [0.1, 0.2, 0.3],
            color_b: [0.4, 0.5, 0.6],
            pointer: [-0.5, 0.25],
            opacity: 0.7,
            model: Mat4::from_translation(glam::Vec3::new(1.0, 2.0, -1.0)),
        };
        let uniforms = PlaneUniforms::from(&state);
        assert_eq!(uniforms.color_a, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(uniforms.mouse, [-0.5, 0.25]);
        assert_eq!(uniforms.opacity, 0.7);
        assert_eq!(uniforms.model[3], [1.0, 2.0, -1.0, 1.0]);
    }
}

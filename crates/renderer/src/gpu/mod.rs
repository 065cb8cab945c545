//! wgpu side of the animated surface.
//!
//! - `context` owns instance/device/surface wiring and MSAA selection.
//! - `mesh` builds the subdivided plane geometry.
//! - `uniforms` mirrors the GLSL uniform blocks byte for byte.
//! - `pipeline` holds the backdrop pass and the optional wave layer.
//! - `state` glues them together behind [`crate::surface::SceneTarget`].

mod context;
mod mesh;
mod pipeline;
mod state;
mod uniforms;

pub(crate) use state::GpuState;

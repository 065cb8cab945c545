use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use crate::motion::view_projection;
use crate::surface::{FrameError, SceneFrame, SceneTarget};
use crate::types::{AdapterProfile, RendererConfig};

use super::context::{GpuContext, DEPTH_FORMAT};
use super::pipeline::{BackdropLayer, WaveLayer};
use super::uniforms::BackdropUniforms;

/// Depth buffer plus the optional multisampled colour target, sized to the
/// surface.
struct FrameTargets {
    depth: wgpu::TextureView,
    multisample: Option<wgpu::TextureView>,
}

impl FrameTargets {
    fn new(context: &GpuContext) -> Self {
        let size = wgpu::Extent3d {
            width: context.config.width,
            height: context.config.height,
            depth_or_array_layers: 1,
        };
        let depth = context
            .device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("wave depth"),
                size,
                mip_level_count: 1,
                sample_count: context.sample_count,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default());
        let multisample = (context.sample_count > 1).then(|| {
            context
                .device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("msaa color"),
                    size,
                    mip_level_count: 1,
                    sample_count: context.sample_count,
                    dimension: wgpu::TextureDimension::D2,
                    format: context.surface_format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        });
        Self { depth, multisample }
    }
}

pub(crate) struct GpuState {
    context: GpuContext,
    backdrop: BackdropLayer,
    waves: Option<WaveLayer>,
    targets: FrameTargets,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        config: &RendererConfig,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size, config.antialiasing)?;
        let backdrop =
            BackdropLayer::new(&context.device, context.surface_format, context.sample_count);
        let targets = FrameTargets::new(&context);
        tracing::info!(
            adapter = %context.adapter_profile.name,
            width = context.size.width,
            height = context.size.height,
            samples = context.sample_count,
            "GPU surface ready"
        );
        Ok(Self {
            context,
            backdrop,
            waves: None,
            targets,
        })
    }

    pub(crate) fn adapter_profile(&self) -> &AdapterProfile {
        &self.context.adapter_profile
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 || new_size == self.context.size {
            return;
        }
        self.context.resize(new_size);
        self.targets = FrameTargets::new(&self.context);
        tracing::debug!(width = new_size.width, height = new_size.height, "resized surface");
    }

    fn acquire(&self) -> Result<wgpu::SurfaceTexture, FrameError> {
        match self.context.surface.get_current_texture() {
            Ok(texture) => Ok(texture),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.context.reconfigure();
                Err(FrameError::Skipped("surface lost; reconfigured".into()))
            }
            Err(wgpu::SurfaceError::Timeout) => {
                Err(FrameError::Skipped("surface acquire timed out".into()))
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                Err(FrameError::Waves("surface out of memory".into()))
            }
            Err(other) => Err(FrameError::Skipped(other.to_string())),
        }
    }
}

impl SceneTarget for GpuState {
    fn viewport(&self) -> (u32, u32) {
        (self.context.size.width, self.context.size.height)
    }

    fn attach_waves(&mut self) -> Result<()> {
        if self.waves.is_some() {
            return Ok(());
        }
        let device = &self.context.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let layer = WaveLayer::new(device, self.context.surface_format, self.context.sample_count);
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            anyhow::bail!("wave pipeline rejected by the GPU: {error}");
        }
        self.waves = Some(layer);
        Ok(())
    }

    fn detach_waves(&mut self) {
        if self.waves.take().is_some() {
            tracing::debug!("released wave layer");
        }
    }

    fn draw(&mut self, frame: &SceneFrame) -> Result<(), FrameError> {
        let surface_texture = self.acquire()?;
        let frame_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let (color_view, resolve_target) = match &self.targets.multisample {
            Some(msaa) => (msaa, Some(&frame_view)),
            None => (&frame_view, None),
        };

        let device = &self.context.device;
        let queue = &self.context.queue;

        self.backdrop.update(
            queue,
            &BackdropUniforms::new(&frame.backdrop, frame.streaks.as_ref(), frame.viewport),
        );
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("backdrop encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("backdrop pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.backdrop.draw(&mut pass);
        }
        let mut commands = vec![encoder.finish()];

        let mut wave_failure = None;
        if let (Some(waves), Some(wave_frame)) = (&self.waves, &frame.waves) {
            device.push_error_scope(wgpu::ErrorFilter::Validation);
            waves.update(queue, view_projection(frame.viewport), wave_frame);
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("wave encoder"),
            });
            {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("wave pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: color_view,
                        depth_slice: None,
                        resolve_target,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &self.targets.depth,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Discard,
                        }),
                        stencil_ops: None,
                    }),
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
                waves.draw(&mut pass);
            }
            let wave_commands = encoder.finish();
            match pollster::block_on(device.pop_error_scope()) {
                // Drop the wave commands so the backdrop still presents.
                Some(error) => wave_failure = Some(error.to_string()),
                None => commands.push(wave_commands),
            }
        }

        queue.submit(commands);
        surface_texture.present();

        match wave_failure {
            Some(reason) => Err(FrameError::Waves(reason)),
            None => Ok(()),
        }
    }
}

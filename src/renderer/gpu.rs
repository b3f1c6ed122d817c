//! SDF-based WebGPU render surface
//!
//! Both views go through the same fullscreen-triangle pipeline. The
//! projection view renders into an offscreen texture that the primary view
//! samples for the hall walls.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::view::{CameraView, SceneKind, SceneView};
use super::RenderSurface;
use crate::error::Result;
use crate::sim::arena::{arena_diagonal_half_width, arena_half_width};

/// Maximum number of spikes uploaded per frame
pub const MAX_SPIKES: usize = 256;

/// Logs once the first time a frame carries more spikes than the upload holds
#[derive(Debug, Default)]
pub struct SpikeOverflow {
    warned: bool,
}

impl SpikeOverflow {
    /// Returns true when this call emitted the warning
    pub fn check(&mut self, count: usize) -> bool {
        if self.warned || count <= MAX_SPIKES {
            return false;
        }
        self.warned = true;
        log::warn!(
            "{} spikes exceed the {} the renderer uploads; the rest are not drawn",
            count,
            MAX_SPIKES
        );
        true
    }
}

/// Offscreen projection target size (square)
pub const PROJECTION_SIZE: u32 = 1200;
/// Hall ceiling height
const HALL_HEIGHT: f32 = 600.0;

// ============================================================================
// GPU DATA STRUCTURES (must match scene.wgsl)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Globals {
    pub cam_pos: [f32; 4],     // xyz, tan(fov_y / 2)
    pub cam_forward: [f32; 4], // xyz, aspect
    pub cam_right: [f32; 4],   // xyz, view kind
    pub cam_up: [f32; 4],      // xyz, spike count
    pub sky_low: [f32; 4],     // rgb, phase
    pub sky_high: [f32; 4],    // rgb, fog density
    pub fog: [f32; 4],         // rgb, flesh transition
    pub sun: [f32; 4],         // xyz, flesh time
    pub ground: [f32; 4],      // floor offset xy, arena half widths
    pub resolution: [f32; 4],  // width, height, hall height, far plane
    pub markers: [[f32; 4]; 3], // center x, center z, y, height
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpikeInstance {
    pub pos: [f32; 2],
    pub tilt: f32,
    pub rotation: f32,
    pub scale: f32,
    pub _pad: [f32; 3],
}

impl Globals {
    /// Pack a view for the shader
    pub fn new(scene: &SceneView, camera: &CameraView, width: u32, height: u32) -> Self {
        let tan_half = (camera.fov_y_degrees.to_radians() * 0.5).tan();
        let aspect = width as f32 / height.max(1) as f32;
        let forward = camera.forward();
        let right = camera.right();
        let up = camera.up();
        let kind = match scene.kind {
            SceneKind::Primary => 0.0,
            SceneKind::Projection => 1.0,
        };
        let spike_count = scene.spikes.len().min(MAX_SPIKES) as f32;
        let c = &scene.colors;

        Self {
            cam_pos: camera.position.extend(tan_half).to_array(),
            cam_forward: forward.extend(aspect).to_array(),
            cam_right: right.extend(kind).to_array(),
            cam_up: up.extend(spike_count).to_array(),
            sky_low: c.sky_low.extend(scene.phase).to_array(),
            sky_high: c.sky_high.extend(scene.fog_density).to_array(),
            fog: c.fog.extend(scene.flesh_transition).to_array(),
            sun: scene.sun.extend(scene.flesh_time).to_array(),
            ground: [
                scene.floor_offset.x,
                scene.floor_offset.y,
                arena_half_width(),
                arena_diagonal_half_width(),
            ],
            resolution: [
                width as f32,
                height as f32,
                HALL_HEIGHT,
                super::view::FAR_PLANE,
            ],
            markers: scene.markers.map(|m| [m.center.x, m.center.y, m.y, m.height]),
        }
    }
}

/// Spike instances padded to `MAX_SPIKES`
pub fn spike_instances(scene: &SceneView) -> Vec<SpikeInstance> {
    let mut data = vec![SpikeInstance::zeroed(); MAX_SPIKES];
    for (slot, spike) in data.iter_mut().zip(scene.spikes.iter()) {
        *slot = SpikeInstance {
            pos: spike.pos.to_array(),
            tilt: spike.tilt,
            rotation: spike.rotation,
            scale: spike.scale,
            _pad: [0.0; 3],
        };
    }
    data
}

// ============================================================================
// GPU SURFACE
// ============================================================================

pub struct GpuSurface {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    spikes_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,

    projection_view: wgpu::TextureView,
    /// Primary pass: walls sample the projection target
    wall_bind_group: wgpu::BindGroup,
    /// Projection pass: placeholder texture (a target cannot sample itself)
    blank_bind_group: wgpu::BindGroup,
    spike_overflow: SpikeOverflow,

    pub size: (u32, u32),
}

impl GpuSurface {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Self {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("monolith-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let spikes_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("spikes"),
            size: (std::mem::size_of::<SpikeInstance>() * MAX_SPIKES) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &scene_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: spikes_buffer.as_entire_binding(),
                },
            ],
        });

        let wall_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("wall_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let make_texture = |label: &str, size: u32, usage: wgpu::TextureUsages| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: size,
                    height: size,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: surface_format,
                usage,
                view_formats: &[],
            })
        };

        let projection_view = make_texture(
            "projection_target",
            PROJECTION_SIZE,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        )
        .create_view(&wgpu::TextureViewDescriptor::default());
        let blank_view = make_texture("blank", 1, wgpu::TextureUsages::TEXTURE_BINDING)
            .create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("wall_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let wall_group = |label: &str, view: &wgpu::TextureView| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &wall_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                ],
            })
        };
        let wall_bind_group = wall_group("wall_bind_group", &projection_view);
        let blank_bind_group = wall_group("blank_bind_group", &blank_view);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&scene_layout, &wall_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            spikes_buffer,
            scene_bind_group,
            projection_view,
            wall_bind_group,
            blank_bind_group,
            spike_overflow: SpikeOverflow::default(),
            size: (width, height),
        }
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn draw(&self, target: &wgpu::TextureView, walls: &wgpu::BindGroup, clear: wgpu::Color) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
            render_pass.set_bind_group(1, walls, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl RenderSurface for GpuSurface {
    fn submit(&mut self, scene: &SceneView, camera: &CameraView) -> Result<()> {
        let (width, height) = match scene.kind {
            SceneKind::Projection => (PROJECTION_SIZE, PROJECTION_SIZE),
            SceneKind::Primary => self.size,
        };

        let globals = Globals::new(scene, camera, width, height);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
        if scene.kind == SceneKind::Projection {
            self.spike_overflow.check(scene.spikes.len());
            self.queue.write_buffer(
                &self.spikes_buffer,
                0,
                bytemuck::cast_slice(&spike_instances(scene)),
            );
        }

        let fog = scene.colors.fog;
        let clear = wgpu::Color {
            r: fog.x as f64,
            g: fog.y as f64,
            b: fog.z as f64,
            a: 1.0,
        };

        match scene.kind {
            SceneKind::Projection => {
                self.draw(&self.projection_view, &self.blank_bind_group, clear);
            }
            SceneKind::Primary => {
                let output = match self.surface.get_current_texture() {
                    Ok(output) => output,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        self.resize(self.size.0, self.size.1);
                        return Ok(());
                    }
                    Err(e) => return Err(e.into()),
                };
                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                self.draw(&view, &self.wall_bind_group, clear);
                output.present();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SessionConfig, SessionState};

    #[test]
    fn test_gpu_struct_sizes() {
        // Uniform layout: 13 vec4s; spikes use a 32-byte stride
        assert_eq!(std::mem::size_of::<Globals>(), 13 * 16);
        assert_eq!(std::mem::size_of::<SpikeInstance>(), 32);
    }

    #[test]
    fn test_globals_pack_view() {
        let state = SessionState::new(SessionConfig {
            seed: 9,
            start_phase: 2.0,
        });
        let scene = SceneView::projection(&state, false);
        let camera = CameraView::projection(&state);
        let globals = Globals::new(&scene, &camera, 1200, 600);

        assert_eq!(globals.cam_right[3], 1.0);
        assert_eq!(globals.cam_up[3], state.spikes.len() as f32);
        assert_eq!(globals.cam_forward[3], 2.0);
        assert_eq!(globals.sky_low[3], 2.0);
        assert_eq!(globals.markers[2][3], state.monoliths.markers[2].height);
    }

    #[test]
    fn test_spike_instances_padded() {
        let state = SessionState::new(SessionConfig::default());
        let scene = SceneView::projection(&state, false);
        let data = spike_instances(&scene);
        assert_eq!(data.len(), MAX_SPIKES);
        assert_eq!(data[0].pos, state.spikes.spikes[0].pos.to_array());
        assert_eq!(data[MAX_SPIKES - 1], SpikeInstance::zeroed());
    }

    #[test]
    fn test_spike_overflow_warns_once() {
        let mut overflow = SpikeOverflow::default();
        assert!(!overflow.check(MAX_SPIKES));
        assert!(overflow.check(MAX_SPIKES + 1));
        assert!(!overflow.check(MAX_SPIKES + 40));
    }

    #[test]
    fn test_globals_cap_spike_count() {
        let mut state = SessionState::new(SessionConfig::default());
        let mut rng = rand_pcg::Pcg32::new(3, 5);
        while state.spikes.len() <= MAX_SPIKES {
            state
                .spikes
                .spawn(glam::Vec2::ZERO, glam::Vec2::new(0.0, -1.0), &mut rng);
        }
        let scene = SceneView::projection(&state, false);
        let globals = Globals::new(&scene, &CameraView::projection(&state), 1200, 1200);
        assert_eq!(globals.cam_up[3], MAX_SPIKES as f32);
        assert_eq!(spike_instances(&scene).len(), MAX_SPIKES);
    }
}

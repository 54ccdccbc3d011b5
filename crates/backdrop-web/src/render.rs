use crate::constants::*;
use backdrop_core::color::hsl;
use backdrop_core::fields::PolygonField;
use backdrop_core::{Billboard, Camera, Compositor, Field, ParticleBuffers};
use glam::Vec3;
use web_sys as web;
use wgpu::util::DeviceExt;

static SPRITES_WGSL: &str = include_str!("../shaders/sprites.wgsl");

const SHAPE_POINT: u32 = 0;
const SHAPE_CARD: u32 = 1;
const SHAPE_TILE: u32 = 2;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    right: [f32; 4],
    up: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteInstance {
    pos: [f32; 3],
    size: f32,
    color: [f32; 4],
    // Zero axes mean "face the camera".
    right: [f32; 3],
    shape: u32,
    up: [f32; 3],
    _pad: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pos: [f32; 3],
    color: [f32; 4],
}

/// CPU-side draw lists rebuilt from the compositor each frame. The vectors
/// keep their capacity, so steady-state frames do not allocate.
pub struct SceneBatch {
    sprites: Vec<SpriteInstance>,
    vertices: Vec<MeshVertex>,
    fill: Vec<u32>,
    wire: Vec<u32>,
}

impl SceneBatch {
    pub fn new() -> Self {
        Self {
            sprites: Vec::with_capacity(MAX_SPRITES),
            vertices: Vec::with_capacity(MAX_MESH_VERTICES),
            fill: Vec::with_capacity(MAX_MESH_INDICES),
            wire: Vec::with_capacity(MAX_MESH_INDICES),
        }
    }

    fn clear(&mut self) {
        self.sprites.clear();
        self.vertices.clear();
        self.fill.clear();
        self.wire.clear();
    }

    fn sprite(&mut self, pos: Vec3, size: f32, color: Vec3, alpha: f32, shape: u32) {
        self.oriented(pos, size, color, alpha, shape, Vec3::ZERO, Vec3::ZERO);
    }

    #[allow(clippy::too_many_arguments)]
    fn oriented(
        &mut self,
        pos: Vec3,
        size: f32,
        color: Vec3,
        alpha: f32,
        shape: u32,
        right: Vec3,
        up: Vec3,
    ) {
        if self.sprites.len() >= MAX_SPRITES || alpha <= 0.0 {
            return;
        }
        self.sprites.push(SpriteInstance {
            pos: pos.to_array(),
            size,
            color: [color.x, color.y, color.z, alpha],
            right: right.to_array(),
            shape,
            up: up.to_array(),
            _pad: 0,
        });
    }

    fn billboard(&mut self, b: Billboard, size: f32, color: Vec3, alpha: f32, shape: u32) {
        self.oriented(b.center, size, color, alpha, shape, b.right, b.up);
    }

    fn points(&mut self, buffers: &ParticleBuffers, size: f32, opacity: f32) {
        for (p, c) in buffers.positions.iter().zip(&buffers.colors) {
            self.sprite(*p, size, *c, opacity, SHAPE_POINT);
        }
    }

    fn polygons(&mut self, field: &PolygonField) {
        let buffers = field.buffers();
        let n = buffers.len();
        if n * 2 > MAX_MESH_VERTICES
            || field.triangles().len() > MAX_MESH_INDICES
            || field.outline().len() > MAX_MESH_INDICES
        {
            log::warn!("[render] polygon field exceeds mesh capacity; skipped");
            return;
        }
        let fill_alpha = field.activation().opacity();
        for (p, c) in buffers.positions.iter().zip(&buffers.colors) {
            self.vertices.push(MeshVertex {
                pos: p.to_array(),
                color: [c.x, c.y, c.z, fill_alpha],
            });
        }
        // Outline vertices are a second copy carrying the wire colour.
        let wire = field.wire_color();
        let wire_alpha = field.wire_opacity();
        for p in &buffers.positions {
            self.vertices.push(MeshVertex {
                pos: p.to_array(),
                color: [wire.x, wire.y, wire.z, wire_alpha],
            });
        }
        self.fill.extend_from_slice(field.triangles());
        self.wire.extend(field.outline().iter().map(|i| i + n as u32));
    }

    /// Collect everything currently visible.
    pub fn rebuild(&mut self, compositor: &Compositor) {
        self.clear();

        let polygons = compositor.polygons();
        if polygons.visible() {
            self.polygons(polygons);
        }

        let starfield = compositor.starfield();
        if starfield.visible() {
            self.points(starfield.buffers(), STAR_SIZE, starfield.activation().opacity());
        }
        let breather = compositor.breather();
        if breather.visible() {
            self.points(breather.buffers(), BREATH_SIZE, breather.activation().opacity());
        }
        let wavefield = compositor.wavefield();
        if wavefield.visible() {
            self.points(wavefield.buffers(), WAVE_SIZE, wavefield.activation().opacity());
        }

        let models = compositor.models();
        if models.visible() {
            let grow = models.activation().current();
            let count = models.instances().len().max(1) as f32;
            for (i, m) in models.transforms().iter().enumerate() {
                let color = hsl(i as f32 / count, 0.55, 0.6);
                let b = Billboard::from_transform(m);
                self.billboard(b, MODEL_SPRITE_SIZE * grow, color, 1.0, SHAPE_TILE);
            }
        }

        if let Some(posters) = compositor.posters().filter(|p| p.visible()) {
            let opacity = posters.activation().opacity();
            for (m, tex) in posters.live_transforms().iter().zip(posters.live_textures()) {
                let b = Billboard::from_transform(m);
                let color = hsl(*tex as f32 * 0.618, 0.35, 0.55);
                self.billboard(b, b.size, color, opacity, SHAPE_CARD);
            }
        }

        if let Some(ch) = compositor.choreography() {
            let surface = ch.surface();
            let tex_count = ch.config().texture_count.max(1) as f32;
            let base = hsl(surface.base_texture as f32 / tex_count, 0.6, 0.6);
            let overlay = hsl(surface.overlay_texture as f32 / tex_count, 0.6, 0.6);
            let nail = base.lerp(overlay, surface.overlay_opacity);
            self.sprite(ch.hand_world_position(), PROP_SPRITE_SIZE, nail, 1.0, SHAPE_POINT);

            let light = ch.light();
            let glow = light.intensity.clamp(0.0, 1.0);
            let lamp = hsl(light.hue, 0.8, 0.25 + 0.45 * glow);
            self.sprite(ch.dryer_world_position(), PROP_SPRITE_SIZE * 1.6, lamp, 1.0, SHAPE_CARD);

            let sparkle = hsl(light.hue, 0.6, 0.85);
            for p in ch.sparkles() {
                self.sprite(*p, SPARKLE_SIZE, sparkle, ch.sparkle_opacity(), SHAPE_POINT);
            }
        }
    }
}

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    sprite_pipeline: wgpu::RenderPipeline,
    fill_pipeline: wgpu::RenderPipeline,
    wire_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    quad_vb: wgpu::Buffer,
    sprite_vb: wgpu::Buffer,
    mesh_vb: wgpu::Buffer,
    fill_ib: wgpu::Buffer,
    wire_ib: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

fn mesh_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_mesh"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<MeshVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 0,
                        shader_location: 0,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x4,
                        offset: 12,
                        shader_location: 1,
                    },
                ],
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_mesh"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    })
}

impl<'a> GpuState<'a> {
    pub async fn new(canvas: &'a web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Default limits keep older WebGPU implementations happy
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = *caps
            .formats
            .first()
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprites"),
            source: wgpu::ShaderSource::Wgsl(SPRITES_WGSL.into()),
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        // Unit quad corners (two triangles)
        let quad_vertices: [f32; 12] = [
            -0.5, -0.5, 0.5, -0.5, 0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, 0.5,
        ];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vb"),
            contents: bytemuck::cast_slice(&quad_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let sprite_vb = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sprite_vb"),
            size: (std::mem::size_of::<SpriteInstance>() * MAX_SPRITES) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mesh_vb = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("mesh_vb"),
            size: (std::mem::size_of::<MeshVertex>() * MAX_MESH_VERTICES) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let index_buffer = |label: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: (std::mem::size_of::<u32>() * MAX_MESH_INDICES) as u64,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let fill_ib = index_buffer("fill_ib");
        let wire_ib = index_buffer("wire_ib");

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bg"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });

        let sprite_buffers = [
            // slot 0: quad corners
            wgpu::VertexBufferLayout {
                array_stride: (std::mem::size_of::<f32>() * 2) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                }],
            },
            // slot 1: per-sprite data
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<SpriteInstance>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 0,
                        shader_location: 1,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32,
                        offset: 12,
                        shader_location: 2,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x4,
                        offset: 16,
                        shader_location: 3,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 32,
                        shader_location: 5,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Uint32,
                        offset: 44,
                        shader_location: 4,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 48,
                        shader_location: 6,
                    },
                ],
            },
        ];
        let sprite_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_sprite"),
                buffers: &sprite_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_sprite"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });
        let fill_pipeline = mesh_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            format,
            wgpu::PrimitiveTopology::TriangleList,
            "fill_pipeline",
        );
        let wire_pipeline = mesh_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            format,
            wgpu::PrimitiveTopology::LineList,
            "wire_pipeline",
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            sprite_pipeline,
            fill_pipeline,
            wire_pipeline,
            uniform_buffer,
            quad_vb,
            sprite_vb,
            mesh_vb,
            fill_ib,
            wire_ib,
            bind_group,
            width,
            height,
        })
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Upload the batch and draw it. `upload` is false when nothing moved
    /// since the last frame, in which case the previous buffers are reused.
    pub fn render(
        &mut self,
        camera: &Camera,
        batch: &SceneBatch,
        upload: bool,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let view_m = camera.view_matrix();
        let view_proj = camera.projection_matrix() * view_m;
        let right = view_m.row(0).truncate();
        let up = view_m.row(1).truncate();
        self.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: view_proj.to_cols_array_2d(),
                right: right.extend(0.0).to_array(),
                up: up.extend(0.0).to_array(),
            }),
        );
        if upload {
            self.queue
                .write_buffer(&self.sprite_vb, 0, bytemuck::cast_slice(&batch.sprites));
            self.queue
                .write_buffer(&self.mesh_vb, 0, bytemuck::cast_slice(&batch.vertices));
            self.queue
                .write_buffer(&self.fill_ib, 0, bytemuck::cast_slice(&batch.fill));
            self.queue
                .write_buffer(&self.wire_ib, 0, bytemuck::cast_slice(&batch.wire));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let [r, g, b] = CLEAR_COLOR;
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a: 1.0 }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_bind_group(0, &self.bind_group, &[]);

            if !batch.fill.is_empty() {
                rpass.set_pipeline(&self.fill_pipeline);
                rpass.set_vertex_buffer(0, self.mesh_vb.slice(..));
                rpass.set_index_buffer(self.fill_ib.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..batch.fill.len() as u32, 0, 0..1);
            }
            if !batch.wire.is_empty() {
                rpass.set_pipeline(&self.wire_pipeline);
                rpass.set_vertex_buffer(0, self.mesh_vb.slice(..));
                rpass.set_index_buffer(self.wire_ib.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..batch.wire.len() as u32, 0, 0..1);
            }
            if !batch.sprites.is_empty() {
                rpass.set_pipeline(&self.sprite_pipeline);
                rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
                rpass.set_vertex_buffer(1, self.sprite_vb.slice(..));
                rpass.draw(0..6, 0..batch.sprites.len() as u32);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

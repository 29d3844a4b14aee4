use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{PlaneDraw, PlaneList, TextureId};

use super::geometry::{PlaneGeometry, PlaneVertex};
use super::texture::{validate_rgba8, TextureStore, TextureUploadError};

/// Camera uniform: world → clip transform.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    #[inline]
    pub fn from_mat4(view_proj: Mat4) -> Self {
        Self { view_proj: view_proj.to_cols_array_2d() }
    }
}

/// Renderer for textured planes.
///
/// Pipelines and layouts are created lazily on first use and rebuilt if the
/// surface format or MSAA sample count changes. Textures are uploaded by id ahead of the draw
/// that references them; a plane whose texture is missing samples the
/// transparent placeholder.
///
/// Planes are double-sided and alpha blended (premultiplied) in list order,
/// without a depth buffer: the list order is the paint order.
#[derive(Default)]
pub struct PlaneRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline_samples: u32,
    pipeline: Option<wgpu::RenderPipeline>,

    camera_bgl: Option<wgpu::BindGroupLayout>,
    texture_bgl: Option<wgpu::BindGroupLayout>,
    camera_bind_group: Option<wgpu::BindGroup>,
    camera_ubo: Option<wgpu::Buffer>,
    sampler: Option<wgpu::Sampler>,
    textures: Option<TextureStore>,

    geometry_vbo: Option<wgpu::Buffer>,
    geometry_ibo: Option<wgpu::Buffer>,
    geometry_segments: Option<u32>,
    index_count: u32,

    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,
}

impl PlaneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads RGBA8 (straight alpha, sRGB) pixels under `id`, replacing any
    /// previous texture with that id.
    pub fn upload_texture(
        &mut self,
        ctx: &RenderCtx<'_>,
        id: TextureId,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<(), TextureUploadError> {
        let max = ctx.device.limits().max_texture_dimension_2d;
        validate_rgba8(width, height, pixels.len(), max)?;

        self.ensure_layouts(ctx);
        let (Some(bgl), Some(sampler), Some(textures)) =
            (self.texture_bgl.as_ref(), self.sampler.as_ref(), self.textures.as_mut())
        else {
            return Ok(());
        };

        textures.insert(ctx.device, ctx.queue, bgl, sampler, id, width, height, pixels);
        log::debug!("PlaneRenderer: uploaded texture {id:?} ({width}x{height})");
        Ok(())
    }

    /// Renders the visible planes of `planes` into `target`.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        camera: CameraUniform,
        geometry: &PlaneGeometry,
        planes: &PlaneList,
    ) {
        let visible: Vec<&PlaneDraw> = planes.iter_visible().collect();
        if visible.is_empty() {
            return;
        }

        self.ensure_layouts(ctx);
        self.ensure_pipeline(ctx);
        self.ensure_camera(ctx);
        self.ensure_geometry(ctx, geometry);
        self.ensure_instance_capacity(ctx, visible.len());

        let instances: Vec<PlaneInstance> = visible.iter().map(|p| PlaneInstance::from_draw(p)).collect();
        let Some(instance_vbo) = self.instance_vbo.as_ref() else { return };
        ctx.queue.write_buffer(instance_vbo, 0, bytemuck::cast_slice(&instances));

        let Some(ubo) = self.camera_ubo.as_ref() else { return };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&camera));

        let Some(pipeline)    = self.pipeline.as_ref()          else { return };
        let Some(camera_bg)   = self.camera_bind_group.as_ref() else { return };
        let Some(textures)    = self.textures.as_ref()          else { return };
        let Some(vbo)         = self.geometry_vbo.as_ref()      else { return };
        let Some(ibo)         = self.geometry_ibo.as_ref()      else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("drift plane pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: target.resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, camera_bg, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);

        // One draw per plane: each may bind a different image.
        for (i, plane) in visible.iter().enumerate() {
            let i = i as u32;
            rpass.set_bind_group(1, textures.bind_group(plane.texture), &[]);
            rpass.draw_indexed(0..self.index_count, 0, i..i + 1);
        }
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_layouts(&mut self, ctx: &RenderCtx<'_>) {
        if self.texture_bgl.is_some() && self.camera_bgl.is_some() && self.textures.is_some() {
            return;
        }

        let camera_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("drift plane camera bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<CameraUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let texture_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("drift plane texture bgl"),
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

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("drift plane sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        self.textures = Some(TextureStore::new(ctx.device, ctx.queue, &texture_bgl, &sampler));
        self.camera_bgl = Some(camera_bgl);
        self.texture_bgl = Some(texture_bgl);
        self.sampler = Some(sampler);

        // Anything built against the old layouts is stale.
        self.pipeline = None;
        self.camera_bind_group = None;
        self.camera_ubo = None;
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format)
            && self.pipeline_samples == ctx.sample_count
            && self.pipeline.is_some()
        {
            return;
        }
        let (Some(camera_bgl), Some(texture_bgl)) = (self.camera_bgl.as_ref(), self.texture_bgl.as_ref())
        else {
            return;
        };

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("drift plane shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/plane.wgsl").into()),
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("drift plane pipeline layout"),
            bind_group_layouts: &[camera_bgl, texture_bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("drift plane pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[PlaneVertex::layout(), PlaneInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Double-sided.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: ctx.sample_count,
                ..Default::default()
            },
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline_samples = ctx.sample_count;
        self.pipeline = Some(pipeline);
    }

    fn ensure_camera(&mut self, ctx: &RenderCtx<'_>) {
        if self.camera_bind_group.is_some() && self.camera_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.camera_bgl.as_ref() else { return };

        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("drift plane camera ubo"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("drift plane camera bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        self.camera_ubo = Some(ubo);
        self.camera_bind_group = Some(bind_group);
    }

    fn ensure_geometry(&mut self, ctx: &RenderCtx<'_>, geometry: &PlaneGeometry) {
        if self.geometry_segments == Some(geometry.segments())
            && self.geometry_vbo.is_some()
            && self.geometry_ibo.is_some()
        {
            return;
        }

        self.geometry_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("drift plane vbo"),
            contents: bytemuck::cast_slice(geometry.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.geometry_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("drift plane ibo"),
            contents: bytemuck::cast_slice(geometry.indices()),
            usage: wgpu::BufferUsages::INDEX,
        }));
        self.geometry_segments = Some(geometry.segments());
        self.index_count = geometry.index_count();

        log::debug!(
            "PlaneRenderer: uploaded {}x{} grid ({} vertices)",
            geometry.segments(),
            geometry.segments(),
            geometry.vertices().len()
        );
    }

    fn ensure_instance_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }
        let new_cap = required.next_power_of_two().max(16);
        self.instance_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("drift plane instance vbo"),
            size: (new_cap * std::mem::size_of::<PlaneInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
    }
}

// ── blend ─────────────────────────────────────────────────────────────────

fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState { color: component, alpha: component }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Instance data layout (80 bytes):
///
///  offset  0  model    [[f32; 4]; 4]  loc 2..=5 (columns)
///  offset 64  params   [f32; 4]       loc 6  (alpha, offset.x, offset.y, unused)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct PlaneInstance {
    model: [[f32; 4]; 4],
    params: [f32; 4],
}

impl PlaneInstance {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x4, // model col 0
        3 => Float32x4, // model col 1
        4 => Float32x4, // model col 2
        5 => Float32x4, // model col 3
        6 => Float32x4  // params
    ];

    fn from_draw(plane: &PlaneDraw) -> Self {
        Self {
            model: plane.model().to_cols_array_2d(),
            params: [plane.alpha, plane.offset.x, plane.offset.y, 0.0],
        }
    }

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PlaneInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

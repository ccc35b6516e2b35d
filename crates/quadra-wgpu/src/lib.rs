//! # quadra-wgpu
//!
//! wgpu backend for quadra: compiles one pipeline per primitive kind, owns
//! textures and GPU fonts, and turns a [`Frame`]'s commands into batched
//! instanced draws.

mod batch;
mod config;
mod error;
mod font;
mod instance;
pub mod program;
pub mod texture;

pub use batch::{batch_commands, first_missing_texture, Batch};
pub use config::{grown_instance_capacity, RendererConfig, DEFAULT_INSTANCE_CAPACITY};
pub use error::{RenderError, RenderResult};
pub use font::Font;
pub use instance::ShapeInstance;
pub use program::{compile_program, Program, ProgramSource};
pub use texture::{FilterMode, GpuTexture, TextureParams, WrapMode};

use std::collections::HashMap;

use quadra::{Frame, ShapeKind, TextureId, TexturedFont};
use quadra_text::{BitmapFont, BuiltinFace, GlyphSource};

const QUAD_SHADER: &str = include_str!("shaders/quad.wgsl");

/// Label and fragment source of the program drawing `kind`.
fn fragment_program(kind: ShapeKind) -> (&'static str, &'static str) {
    match kind {
        ShapeKind::FillCircle => ("fill circle", include_str!("shaders/fill_circle.wgsl")),
        ShapeKind::StrokeCircle => ("stroke circle", include_str!("shaders/stroke_circle.wgsl")),
        ShapeKind::Line => ("line", include_str!("shaders/line.wgsl")),
        ShapeKind::FillRect => ("fill rect", include_str!("shaders/fill_rect.wgsl")),
        ShapeKind::StrokeRect => ("stroke rect", include_str!("shaders/stroke_rect.wgsl")),
        ShapeKind::Textured => ("textured", include_str!("shaders/textured.wgsl")),
    }
}

struct TextureSlot {
    texture: GpuTexture,
    bind_group: wgpu::BindGroup,
}

/// Live textures keyed by the handles handed out to callers.
struct TextureRegistry {
    layout: wgpu::BindGroupLayout,
    slots: HashMap<TextureId, TextureSlot>,
    next_id: u32,
}

impl TextureRegistry {
    fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("quadra Texture Bind Group Layout"),
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

        Self {
            layout,
            slots: HashMap::new(),
            next_id: 0,
        }
    }

    fn insert(&mut self, device: &wgpu::Device, texture: GpuTexture) -> TextureId {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quadra Texture Bind Group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(texture.sampler()),
                },
            ],
        });

        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.slots.insert(
            id,
            TextureSlot {
                texture,
                bind_group,
            },
        );
        id
    }

    fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pixels: &[u8],
        width: u32,
        height: u32,
        params: TextureParams,
    ) -> RenderResult<TextureId> {
        let texture = texture::upload(device, queue, pixels, width, height, params)?;
        Ok(self.insert(device, texture))
    }

    fn remove(&mut self, id: TextureId) -> RenderResult<()> {
        let slot = self
            .slots
            .remove(&id)
            .ok_or(RenderError::UnknownTexture(id))?;
        slot.texture.destroy();
        Ok(())
    }
}

/// Upload the atlas of `font` as a texture.
fn upload_font(
    textures: &mut TextureRegistry,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    font: &BitmapFont,
    params: TextureParams,
) -> RenderResult<Font> {
    let texture = textures.upload(
        device,
        queue,
        font.image().as_raw(),
        font.width(),
        font.height(),
        params,
    )?;
    Ok(Font::new(texture, font.table().clone()))
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    program: &Program,
    surface_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &program.vertex,
            entry_point: Some("vs_main"),
            buffers: &[
                // Vertex buffer: unit quad
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x2,
                    }],
                },
                // Instance buffer
                ShapeInstance::desc(),
            ],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &program.fragment,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("quadra Instance Buffer"),
        size: (capacity * std::mem::size_of::<ShapeInstance>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// wgpu renderer for quadra frames
pub struct Renderer {
    pipelines: HashMap<ShapeKind, wgpu::RenderPipeline>,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    quad_vertex_buffer: wgpu::Buffer,
    quad_index_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    instances: Vec<ShapeInstance>,
    textures: TextureRegistry,
    font_params: TextureParams,
    default_font: Font,
}

impl Renderer {
    /// Compile every program and build the default font.
    ///
    /// Fails without leaving partial state behind if any program does not compile
    /// or the default font cannot be built.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        config: RendererConfig,
    ) -> RenderResult<Self> {
        // Create uniform buffer (screen size)
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quadra Uniform Buffer"),
            size: std::mem::size_of::<[f32; 2]>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("quadra Globals Bind Group Layout"),
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

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quadra Globals Bind Group"),
            layout: &globals_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let mut textures = TextureRegistry::new(device);

        let shape_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quadra Shape Pipeline Layout"),
            bind_group_layouts: &[&globals_bind_group_layout],
            push_constant_ranges: &[],
        });
        let textured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quadra Textured Pipeline Layout"),
            bind_group_layouts: &[&globals_bind_group_layout, &textures.layout],
            push_constant_ranges: &[],
        });

        let mut pipelines = HashMap::new();
        for kind in ShapeKind::ALL {
            let (label, fragment) = fragment_program(kind);
            let program = compile_program(
                device,
                label,
                ProgramSource {
                    vertex: QUAD_SHADER,
                    fragment,
                },
            )?;
            let layout = match kind {
                ShapeKind::Textured => &textured_layout,
                _ => &shape_layout,
            };
            let pipeline = create_pipeline(device, label, layout, &program, surface_format);
            pipelines.insert(kind, pipeline);
        }
        log::debug!("created {} pipelines for {:?}", pipelines.len(), surface_format);

        // Unit quad vertices: [-1, -1] to [1, 1]
        let quad_vertices: &[[f32; 2]] = &[
            [-1.0, -1.0], // bottom-left
            [1.0, -1.0],  // bottom-right
            [1.0, 1.0],   // top-right
            [-1.0, 1.0],  // top-left
        ];
        let quad_indices: &[u32] = &[0, 1, 2, 0, 2, 3];

        let quad_vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quadra Quad Vertex Buffer"),
            size: (quad_vertices.len() * std::mem::size_of::<[f32; 2]>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: true,
        });
        quad_vertex_buffer
            .slice(..)
            .get_mapped_range_mut()
            .copy_from_slice(bytemuck::cast_slice(quad_vertices));
        quad_vertex_buffer.unmap();

        let quad_index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quadra Quad Index Buffer"),
            size: (quad_indices.len() * std::mem::size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: true,
        });
        quad_index_buffer
            .slice(..)
            .get_mapped_range_mut()
            .copy_from_slice(bytemuck::cast_slice(quad_indices));
        quad_index_buffer.unmap();

        let instance_capacity = config.initial_instance_capacity.max(1);
        let instance_buffer = create_instance_buffer(device, instance_capacity);

        let font_params = TextureParams::uniform(config.font_wrap, config.font_filter);
        let bitmap = BitmapFont::from_source(&mut BuiltinFace::new(), &config.font_alphabet)?;
        let default_font = upload_font(&mut textures, device, queue, &bitmap, font_params)?;

        Ok(Self {
            pipelines,
            uniform_buffer,
            uniform_bind_group,
            quad_vertex_buffer,
            quad_index_buffer,
            instance_buffer,
            instance_capacity,
            instances: Vec::new(),
            textures,
            font_params,
            default_font,
        })
    }

    /// Upload tightly packed RGBA8 pixels and return a handle usable in draw calls.
    pub fn upload_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pixels: &[u8],
        width: u32,
        height: u32,
        params: TextureParams,
    ) -> RenderResult<TextureId> {
        self.textures
            .upload(device, queue, pixels, width, height, params)
    }

    pub fn texture(&self, id: TextureId) -> Option<&GpuTexture> {
        self.textures.slots.get(&id).map(|slot| &slot.texture)
    }

    /// Release a texture. The handle must not be drawn afterwards.
    pub fn destroy_texture(&mut self, id: TextureId) -> RenderResult<()> {
        self.textures.remove(id)
    }

    /// Upload the atlas of `font` with the configured wrap and filter modes.
    pub fn create_font(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        font: &BitmapFont,
    ) -> RenderResult<Font> {
        upload_font(&mut self.textures, device, queue, font, self.font_params)
    }

    /// Render `alphabet` from `source` and upload the resulting atlas.
    pub fn load_font<S>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &mut S,
        alphabet: &str,
    ) -> RenderResult<Font>
    where
        S: GlyphSource + ?Sized,
    {
        let bitmap = BitmapFont::from_source(source, alphabet)?;
        self.create_font(device, queue, &bitmap)
    }

    /// Release the atlas texture of `font`. The default font is owned by the
    /// renderer and is left alone.
    pub fn destroy_font(&mut self, font: Font) -> RenderResult<()> {
        if font.shares_atlas(&self.default_font) {
            log::warn!("ignoring request to destroy the default font");
            return Ok(());
        }
        self.textures.remove(font.texture())
    }

    /// Font built from [`BuiltinFace`] over the configured alphabet.
    pub fn default_font(&self) -> &Font {
        &self.default_font
    }

    /// Draw every command of `frame` on top of `target`, in submission order.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        frame: &Frame,
    ) -> RenderResult<()> {
        let commands = frame.commands();
        if commands.is_empty() {
            return Ok(());
        }

        let batches = batch_commands(commands);
        let slots = &self.textures.slots;
        if let Some(id) = first_missing_texture(&batches, |id| slots.contains_key(&id)) {
            return Err(RenderError::UnknownTexture(id));
        }

        self.instances.clear();
        self.instances
            .extend(commands.iter().map(ShapeInstance::from));

        let capacity = grown_instance_capacity(self.instance_capacity, self.instances.len());
        if capacity != self.instance_capacity {
            self.instance_capacity = capacity;
            self.instance_buffer = create_instance_buffer(device, self.instance_capacity);
            log::debug!("grew instance buffer to {}", self.instance_capacity);
        }

        let uniforms = [frame.width() as f32, frame.height() as f32];
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&uniforms));
        queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&self.instances),
        );

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("quadra Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.quad_vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        render_pass.set_index_buffer(self.quad_index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        let mut current_kind = None;
        for batch in batches {
            let Some(pipeline) = self.pipelines.get(&batch.kind) else {
                continue;
            };
            if current_kind != Some(batch.kind) {
                render_pass.set_pipeline(pipeline);
                current_kind = Some(batch.kind);
            }
            if batch.kind == ShapeKind::Textured {
                let Some(slot) = batch.texture.and_then(|id| self.textures.slots.get(&id)) else {
                    log::warn!("skipping textured batch without a texture");
                    continue;
                };
                render_pass.set_bind_group(1, &slot.bind_group, &[]);
            }
            render_pass.draw_indexed(0..6, 0, batch.instances);
        }

        Ok(())
    }
}

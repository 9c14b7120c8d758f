// renderer.rs — wgpu 渲染器: model pass + debug lines + egui overlay

use crate::app::ViewerState;
use crate::mesh::{Mesh, Vertex};
use crate::model::{ModelUniform, Shading};
use crate::overlay::{self, LineUniform, LineVertex};
use crate::screenshot::{Readback, ScreenshotError};
use anyhow::{anyhow, Context as _};
use glam::Mat4;
use image::RgbaImage;
use std::collections::HashMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 0.3, g: 0.3, b: 0.4, a: 1.0 };
pub const FOV_Y: f32 = 1.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 1000.0;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub fn projection_matrix(aspect: f32) -> Mat4 {
    Mat4::perspective_rh(FOV_Y, aspect, Z_NEAR, Z_FAR)
}

/// Vertex + index buffers for one uploaded [`Mesh`].
#[derive(Debug)]
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, mesh: &Mesh) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }

    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        if self.index_count == 0 {
            return;
        }
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { _texture: texture, view }
    }
}

/// Fill pipeline plus, when the adapter supports it, a line-mode twin.
struct ModelPipelines {
    fill: wgpu::RenderPipeline,
    line: Option<wgpu::RenderPipeline>,
}

struct LineBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

impl LineBuffer {
    fn new(device: &wgpu::Device, label: &str, vertices: &[LineVertex]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            buffer,
            count: vertices.len() as u32,
        }
    }

    fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_vertex_buffer(0, self.buffer.slice(..));
        pass.draw(0..self.count, 0..1);
    }
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some(label),
    })
}

fn depth_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

pub struct Renderer {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    depth: DepthBuffer,

    // model
    model_pipelines: HashMap<Shading, ModelPipelines>,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    wireframe_supported: bool,
    wireframe_warned: bool,

    // grid / axis
    line_pipeline: wgpu::RenderPipeline,
    line_buffer: wgpu::Buffer,
    line_bind_group: wgpu::BindGroup,
    grid: LineBuffer,
    axis: LineBuffer,

    // UI
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, vsync: bool) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = unsafe { instance.create_surface(window.as_ref()) }
            .context("failed to create surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let info = adapter.get_info();
        log::info!("adapter: {} ({:?}, {:?})", info.name, info.device_type, info.backend);

        let wireframe_supported = adapter.features().contains(wgpu::Features::POLYGON_MODE_LINE);
        let features = if wireframe_supported {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            log::warn!("adapter lacks POLYGON_MODE_LINE, wireframe will draw filled");
            wgpu::Features::empty()
        };

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    features,
                    limits: if cfg!(target_arch = "wasm32") {
                        wgpu::Limits::downlevel_webgl2_defaults()
                    } else {
                        wgpu::Limits::default().using_resolution(adapter.limits())
                    },
                    label: None,
                },
                None,
            )
            .await
            .context("failed to open GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: present_mode(vsync),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth = DepthBuffer::new(&device, config.width, config.height);

        // --- 1. Model pipelines ---
        let model_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Uniform Buffer"),
            size: std::mem::size_of::<ModelUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let model_layout = uniform_layout(&device, "model_bind_group_layout");
        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &model_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model_buffer.as_entire_binding(),
            }],
            label: Some("model_bind_group"),
        });

        let phong = device.create_shader_module(wgpu::include_wgsl!("shaders/phong.wgsl"));
        let model_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Model Pipeline Layout"),
            bind_group_layouts: &[&model_layout],
            push_constant_ranges: &[],
        });

        let build_model_pipeline = |shading: Shading, polygon_mode: wgpu::PolygonMode| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(shading.label()),
                layout: Some(&model_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &phong,
                    entry_point: "vs_main",
                    buffers: &[Vertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &phong,
                    entry_point: shading.fragment_entry(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // cube faces are not wound consistently; depth sorts them out
                    cull_mode: None,
                    polygon_mode,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(depth_state()),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            })
        };

        let model_pipelines = Shading::ALL
            .iter()
            .map(|&shading| {
                let pipelines = ModelPipelines {
                    fill: build_model_pipeline(shading, wgpu::PolygonMode::Fill),
                    line: wireframe_supported
                        .then(|| build_model_pipeline(shading, wgpu::PolygonMode::Line)),
                };
                (shading, pipelines)
            })
            .collect();

        // --- 2. Debug line pipeline ---
        let line_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Line Uniform Buffer"),
            size: std::mem::size_of::<LineUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let line_layout = uniform_layout(&device, "line_bind_group_layout");
        let line_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &line_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: line_buffer.as_entire_binding(),
            }],
            label: Some("line_bind_group"),
        });

        let lines = device.create_shader_module(wgpu::include_wgsl!("shaders/lines.wgsl"));
        let line_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Line Pipeline Layout"),
            bind_group_layouts: &[&line_layout],
            push_constant_ranges: &[],
        });
        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Line Pipeline"),
            layout: Some(&line_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &lines,
                entry_point: "vs_main",
                buffers: &[LineVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &lines,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(depth_state()),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let grid = LineBuffer::new(&device, "Grid Lines", &overlay::grid_lines(overlay::GRID_HALF_EXTENT));
        let axis = LineBuffer::new(&device, "Axis Lines", &overlay::axis_lines(overlay::AXIS_LENGTH));

        // --- 3. Egui Setup ---
        let egui_ctx = egui::Context::default();
        let mut egui_state = egui_winit::State::new(window.as_ref());
        // 高 DPI 显示器
        egui_state.set_pixels_per_point(window.scale_factor() as f32);
        let egui_renderer = egui_wgpu::Renderer::new(&device, config.format, None, 1);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            depth,
            model_pipelines,
            model_buffer,
            model_bind_group,
            wireframe_supported,
            wireframe_warned: false,
            line_pipeline,
            line_buffer,
            line_bind_group,
            grid,
            axis,
            egui_ctx,
            egui_state,
            egui_renderer,
        })
    }

    pub fn wireframe_supported(&self) -> bool {
        self.wireframe_supported
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth = DepthBuffer::new(&self.device, new_size.width, new_size.height);
        }
    }

    pub fn set_vsync(&mut self, vsync: bool) {
        let mode = present_mode(vsync);
        if self.config.present_mode != mode {
            self.config.present_mode = mode;
            self.surface.configure(&self.device, &self.config);
            log::info!("vsync {}", if vsync { "on" } else { "off" });
        }
    }

    /// Line mode only when the device can do it.
    fn use_wireframe(&mut self, requested: bool) -> bool {
        if requested && !self.wireframe_supported && !self.wireframe_warned {
            log::warn!("wireframe requested but not supported by this adapter");
            self.wireframe_warned = true;
        }
        requested && self.wireframe_supported
    }

    fn write_uniforms(&self, state: &ViewerState<GpuMesh>, aspect: f32) {
        let view = state.camera.view_matrix();
        let projection = projection_matrix(aspect);

        self.queue.write_buffer(
            &self.model_buffer,
            0,
            bytemuck::bytes_of(&state.model.uniforms(view, projection)),
        );
        self.queue.write_buffer(
            &self.line_buffer,
            0,
            bytemuck::bytes_of(&LineUniform::new(view, projection)),
        );
    }

    /// Clears `color`/`depth` and draws overlays and the model into them.
    fn encode_scene(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        state: &ViewerState<GpuMesh>,
        wireframe: bool,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: true,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: true,
                }),
                stencil_ops: None,
            }),
        });

        if state.overlays.show_grid || state.overlays.show_axis {
            pass.set_pipeline(&self.line_pipeline);
            pass.set_bind_group(0, &self.line_bind_group, &[]);
            if state.overlays.show_grid {
                self.grid.draw(&mut pass);
            }
            if state.overlays.show_axis {
                self.axis.draw(&mut pass);
            }
        }

        let Some(pipelines) = self.model_pipelines.get(&state.model.shading) else {
            return;
        };
        let pipeline = match (&pipelines.line, wireframe) {
            (Some(line), true) => line,
            _ => &pipelines.fill,
        };

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.model_bind_group, &[]);
        for mesh in state.model.meshes() {
            mesh.draw(&mut pass);
        }
    }

    /// One frame: settings panel, regeneration if the panel changed anything,
    /// scene, then the panel on top.
    pub fn render_with_ui(
        &mut self,
        window: &Window,
        state: &mut ViewerState<GpuMesh>,
        run_ui: impl FnOnce(&egui::Context, &mut ViewerState<GpuMesh>),
    ) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        // 1. UI (may change parameters)
        let raw_input = self.egui_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| run_ui(ctx, state));
        self.egui_state
            .handle_platform_output(window, &self.egui_ctx, full_output.platform_output);

        let device = &self.device;
        state.regenerate_if_dirty(|mesh| GpuMesh::upload(device, &mesh));

        // 2. Scene
        state.set_viewport(self.config.width, self.config.height);
        let wireframe = self.use_wireframe(state.overlays.wireframe);
        self.write_uniforms(state, state.aspect());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        self.encode_scene(&mut encoder, &view, &self.depth.view, state, wireframe);

        // 3. UI on top
        let clipped_primitives = self.egui_ctx.tessellate(full_output.shapes);
        let screen_descriptor = egui_wgpu::renderer::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        for (id, delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(&self.device, &self.queue, *id, delta);
        }

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &clipped_primitives,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations { load: wgpu::LoadOp::Load, store: true },
                })],
                depth_stencil_attachment: None,
            });
            self.egui_renderer.render(&mut render_pass, &clipped_primitives, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Renders the scene (without the panel) offscreen and reads it back.
    pub fn capture(&mut self, state: &ViewerState<GpuMesh>) -> Result<RgbaImage, ScreenshotError> {
        let (width, height) = (self.config.width, self.config.height);
        let readback = Readback::new(&self.device, width, height, self.config.format)?;

        let target = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("screenshot_target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let depth = DepthBuffer::new(&self.device, width, height);

        let wireframe = self.use_wireframe(state.overlays.wireframe);
        self.write_uniforms(state, width as f32 / height as f32);

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Screenshot Encoder"),
        });
        self.encode_scene(&mut encoder, &target_view, &depth.view, state, wireframe);
        readback.copy_from(&mut encoder, &target);
        self.queue.submit(std::iter::once(encoder.finish()));

        readback.read(&self.device)
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn projection_maps_near_and_far_to_unit_depth() {
        let proj = projection_matrix(16.0 / 9.0);
        let near = proj * Vec4::new(0.0, 0.0, -Z_NEAR, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -Z_FAR, 1.0);
        assert!((near.z / near.w).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn projection_uses_one_radian_vertical_fov() {
        let proj = projection_matrix(1.0);
        // a point on the top edge of the frustum at depth 1
        let y = (FOV_Y / 2.0).tan();
        let clip = proj * Vec4::new(0.0, y, -1.0, 1.0);
        assert!((clip.y / clip.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn present_mode_follows_vsync() {
        assert_eq!(present_mode(true), wgpu::PresentMode::Fifo);
        assert_eq!(present_mode(false), wgpu::PresentMode::AutoNoVsync);
    }
}

//! Rendering system for the planet simulator

use common::{
    create_dynamic_vertex_buffer, create_uniform_buffer, create_vertex_buffer, GraphicsContext,
    ScreenCamera, ScreenUniform, Vertex,
};
use planet_sim::{BodyRegistry, Projection};

/// Instance data for one body disc
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BodyInstance {
    pub center: [f32; 2],
    pub radius: f32,
    pub color: [f32; 4],
}

impl BodyInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        2 => Float32x2,
        3 => Float32,
        4 => Float32x4,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BodyInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Quad corner for instanced discs
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub corner: [f32; 2],
}

impl QuadVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

const QUAD_VERTICES: &[QuadVertex] = &[
    QuadVertex { corner: [-1.0, -1.0] },
    QuadVertex { corner: [1.0, -1.0] },
    QuadVertex { corner: [1.0, 1.0] },
    QuadVertex { corner: [-1.0, -1.0] },
    QuadVertex { corner: [1.0, 1.0] },
    QuadVertex { corner: [-1.0, 1.0] },
];

// Trails are only worth drawing once they form a visible polyline
const MIN_TRAIL_POINTS: usize = 3;

/// Number of trail vertices to allocate, clamped to what one buffer can hold
fn trail_vertex_budget(max_bodies: usize, trail_capacity: usize, max_buffer_size: u64) -> usize {
    let vertex_size = std::mem::size_of::<Vertex>() as u64;
    let limit = usize::try_from(max_buffer_size / vertex_size).unwrap_or(usize::MAX);
    let wanted = max_bodies.saturating_mul(trail_capacity);
    if wanted > limit {
        log::warn!(
            "{max_bodies} trails of {trail_capacity} points exceed the {max_buffer_size} byte \
             buffer limit; drawing at most {limit} trail points"
        );
    }
    wanted.min(limit)
}

/// What was uploaded for the current frame
#[derive(Debug, Default)]
pub struct FrameGeometry {
    pub num_bodies: u32,
    pub trail_ranges: Vec<(u32, u32)>,
    pub num_link_vertices: u32,
}

pub struct Renderer {
    body_pipeline: wgpu::RenderPipeline,
    trail_pipeline: wgpu::RenderPipeline,
    link_pipeline: wgpu::RenderPipeline,
    quad_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    trail_buffer: wgpu::Buffer,
    link_buffer: wgpu::Buffer,
    screen_buffer: wgpu::Buffer,
    camera: ScreenCamera,
    screen_bind_group: wgpu::BindGroup,
    max_bodies: usize,
    max_trail_vertices: usize,
}

impl Renderer {
    pub fn new(ctx: &GraphicsContext, max_bodies: usize, trail_capacity: usize) -> Self {
        let device = &ctx.device;
        let max_trail_vertices =
            trail_vertex_budget(max_bodies, trail_capacity, device.limits().max_buffer_size);
        let max_link_vertices = max_bodies * max_bodies.saturating_sub(1);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Planet Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/planet.wgsl").into()),
        });

        let camera = ScreenCamera::new(ctx.size.width, ctx.size.height);
        let screen_buffer = create_uniform_buffer(device, &ScreenUniform::from_camera(&camera));

        let screen_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Screen Bind Group Layout"),
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

        let screen_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Screen Bind Group"),
            layout: &screen_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: screen_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Planet Pipeline Layout"),
            bind_group_layouts: &[&screen_bind_group_layout],
            push_constant_ranges: &[],
        });

        let body_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Body Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_body",
                buffers: &[QuadVertex::layout(), BodyInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_body",
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
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
            multiview: None,
        });

        let trail_pipeline = Self::line_pipeline(
            ctx,
            &shader,
            &pipeline_layout,
            "Trail Pipeline",
            wgpu::PrimitiveTopology::LineStrip,
        );
        let link_pipeline = Self::line_pipeline(
            ctx,
            &shader,
            &pipeline_layout,
            "Link Pipeline",
            wgpu::PrimitiveTopology::LineList,
        );

        let quad_buffer = create_vertex_buffer(device, "Quad Buffer", QUAD_VERTICES);
        let instance_buffer =
            create_dynamic_vertex_buffer::<BodyInstance>(device, "Instance Buffer", max_bodies);
        let trail_buffer =
            create_dynamic_vertex_buffer::<Vertex>(device, "Trail Buffer", max_trail_vertices);
        let link_buffer =
            create_dynamic_vertex_buffer::<Vertex>(device, "Link Buffer", max_link_vertices);

        Self {
            body_pipeline,
            trail_pipeline,
            link_pipeline,
            quad_buffer,
            instance_buffer,
            trail_buffer,
            link_buffer,
            screen_buffer,
            camera,
            screen_bind_group,
            max_bodies,
            max_trail_vertices,
        }
    }

    fn line_pipeline(
        ctx: &GraphicsContext,
        shader: &wgpu::ShaderModule,
        layout: &wgpu::PipelineLayout,
        label: &str,
        topology: wgpu::PrimitiveTopology,
    ) -> wgpu::RenderPipeline {
        ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: "vs_line",
                buffers: &[Vertex::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: "fs_line",
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        })
    }

    pub fn resize(&mut self, queue: &wgpu::Queue, width: u32, height: u32) {
        self.camera.resize(width, height);
        queue.write_buffer(
            &self.screen_buffer,
            0,
            bytemuck::cast_slice(&[ScreenUniform::from_camera(&self.camera)]),
        );
    }

    /// Project the registry onto the screen and upload discs, trails and links
    pub fn prepare(
        &self,
        queue: &wgpu::Queue,
        registry: &BodyRegistry,
        projection: &Projection,
        show_trails: bool,
        show_links: bool,
    ) -> FrameGeometry {
        let bodies = registry.all();

        let instances: Vec<BodyInstance> = bodies
            .iter()
            .take(self.max_bodies)
            .map(|body| BodyInstance {
                center: projection.to_screen(body.position()).to_array(),
                radius: body.appearance().radius,
                color: body.appearance().rgba(),
            })
            .collect();
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut geometry = FrameGeometry {
            num_bodies: instances.len() as u32,
            ..Default::default()
        };

        if show_trails {
            let mut trail_vertices = Vec::new();
            for body in bodies.iter().take(self.max_bodies) {
                let trail = body.trajectory();
                if trail.len() < MIN_TRAIL_POINTS {
                    continue;
                }
                if trail_vertices.len() + trail.len() > self.max_trail_vertices {
                    log::warn!("trail buffer full, skipping remaining trails this frame");
                    break;
                }

                let start = trail_vertices.len() as u32;
                let color = body.appearance().rgba();
                trail_vertices.extend(
                    trail
                        .iter()
                        .map(|p| Vertex::new(projection.to_screen(*p).to_array(), color)),
                );
                geometry.trail_ranges.push((start, trail.len() as u32));
            }

            if !trail_vertices.is_empty() {
                queue.write_buffer(&self.trail_buffer, 0, bytemuck::cast_slice(&trail_vertices));
            }
        }

        if show_links {
            let mut link_vertices = Vec::new();
            let shown = &bodies[..bodies.len().min(self.max_bodies)];
            for (i, body) in shown.iter().enumerate() {
                let color = body.appearance().rgba();
                let from = projection.to_screen(body.position()).to_array();
                for other in &shown[i + 1..] {
                    link_vertices.push(Vertex::new(from, color));
                    let to = projection.to_screen(other.position()).to_array();
                    link_vertices.push(Vertex::new(to, color));
                }
            }

            if !link_vertices.is_empty() {
                queue.write_buffer(&self.link_buffer, 0, bytemuck::cast_slice(&link_vertices));
            }
            geometry.num_link_vertices = link_vertices.len() as u32;
        }

        geometry
    }

    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        geometry: &FrameGeometry,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Planet Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, &self.screen_bind_group, &[]);

        if geometry.num_link_vertices > 0 {
            render_pass.set_pipeline(&self.link_pipeline);
            render_pass.set_vertex_buffer(0, self.link_buffer.slice(..));
            render_pass.draw(0..geometry.num_link_vertices, 0..1);
        }

        if !geometry.trail_ranges.is_empty() {
            render_pass.set_pipeline(&self.trail_pipeline);
            render_pass.set_vertex_buffer(0, self.trail_buffer.slice(..));
            for (start, count) in &geometry.trail_ranges {
                render_pass.draw(*start..(*start + *count), 0..1);
            }
        }

        if geometry.num_bodies > 0 {
            render_pass.set_pipeline(&self.body_pipeline);
            render_pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            render_pass.draw(0..6, 0..geometry.num_bodies);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trail_budget_fits_within_buffer_limit() {
        let vertex_size = std::mem::size_of::<Vertex>() as u64;

        assert_eq!(trail_vertex_budget(5, 1000, 256 << 20), 5000);
        assert_eq!(trail_vertex_budget(5, 1000, 100 * vertex_size), 100);
        assert_eq!(trail_vertex_budget(usize::MAX, usize::MAX, 256 << 20), (256 << 20) / 24);
        assert_eq!(trail_vertex_budget(5, 0, 256 << 20), 0);
    }
}

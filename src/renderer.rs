//! The textured, vertex-colored triangle pass.

use glam::Mat4;

use crate::gpu::GpuContext;
use crate::shader::ShaderProgram;
use crate::texture::Texture;
use crate::vertex::{COLOR_STREAM, POSITION_STREAM, UV_STREAM, VertexArray, VertexBuffer};

/// Background color of the frame.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.5,
    b: 1.0,
    a: 1.0,
};

pub const TRIANGLE_POSITIONS: [[f32; 3]; 3] = [[-0.5, -0.5, 0.0], [0.5, -0.5, 0.0], [0.0, 0.5, 0.0]];
pub const TRIANGLE_COLORS: [[f32; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
pub const TRIANGLE_UVS: [[f32; 2]; 3] = [[0.0, 1.0], [1.0, 1.0], [0.5, 0.0]];

/// Draws one triangle with a shader program and texture.
///
/// Field order is drop order: the pipeline goes before the program and
/// buffers it references.
pub struct TriangleRenderer {
    pipeline: wgpu::RenderPipeline,
    texture_bind_group: wgpu::BindGroup,
    program: ShaderProgram,
    vertices: VertexArray,
    // Owns the sampler and view that `texture_bind_group` was built from.
    _texture: Texture,
}

impl TriangleRenderer {
    /// Uploads the triangle and builds the pipeline for `program`.
    ///
    /// The program must take the matrix uniforms at group 0 and the texture
    /// at group 1, with entry points `vs` and `fs`.
    pub fn new(gpu: &GpuContext, program: ShaderProgram, texture: Texture) -> Self {
        let device = &gpu.device;

        let mut vertices = VertexArray::new();
        vertices.take_buffer(VertexBuffer::from_slice(
            gpu,
            "Triangle Positions",
            &TRIANGLE_POSITIONS,
            POSITION_STREAM,
        ));
        vertices.take_buffer(VertexBuffer::from_slice(
            gpu,
            "Triangle Colors",
            &TRIANGLE_COLORS,
            COLOR_STREAM,
        ));
        vertices.take_buffer(VertexBuffer::from_slice(
            gpu,
            "Triangle UVs",
            &TRIANGLE_UVS,
            UV_STREAM,
        ));

        let texture_layout = Texture::bind_group_layout(device);
        let texture_bind_group = texture.bind_group(device, &texture_layout);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Triangle Pipeline Layout"),
            bind_group_layouts: &[program.uniform_layout(), &texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Triangle Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: program.module(),
                entry_point: Some("vs"),
                buffers: &vertices.layouts(),
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: program.module(),
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            // The camera circles the triangle, so both faces must show.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        log::debug!(
            "triangle pipeline built for '{}' with {} vertices",
            program.label(),
            vertices.vertex_count()
        );

        Self {
            pipeline,
            texture_bind_group,
            program,
            vertices,
            _texture: texture,
        }
    }

    /// Stages this frame's matrices and uploads them.
    pub fn prepare(&mut self, queue: &wgpu::Queue, projection: &Mat4, view: &Mat4, model: &Mat4) {
        self.program.set_matrix("projection", projection);
        self.program.set_matrix("view", view);
        self.program.set_matrix("model", model);
        self.program.flush(queue);
    }

    /// Records the draw into an open render pass.
    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, self.program.bind_group(), &[]);
        render_pass.set_bind_group(1, &self.texture_bind_group, &[]);
        self.vertices.bind(render_pass);
        render_pass.draw(0..self.vertices.vertex_count(), 0..1);
    }

    /// Clears the target to [`CLEAR_COLOR`] and draws the triangle into it.
    pub fn draw(
        &mut self,
        gpu: &GpuContext,
        target: &wgpu::TextureView,
        projection: &Mat4,
        view: &Mat4,
        model: &Mat4,
    ) {
        self.prepare(&gpu.queue, projection, view, model);

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Triangle Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Triangle Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.render(&mut render_pass);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
    }
}

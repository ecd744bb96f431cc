//! Vertex buffers and the vertex array that owns them.
//!
//! Each [`VertexBuffer`] holds one attribute stream (positions, colors, ...)
//! in its own GPU buffer. A [`VertexArray`] takes ownership of the buffers,
//! assigns each to a vertex-buffer slot and produces the matching
//! [`wgpu::VertexBufferLayout`]s for pipeline creation.
//!
//! | Stream              | Format    | Shader Location |
//! |---------------------|-----------|-----------------|
//! | [`POSITION_STREAM`] | Float32x3 | 0               |
//! | [`COLOR_STREAM`]    | Float32x3 | 1               |
//! | [`UV_STREAM`]       | Float32x2 | 2               |

use wgpu::util::DeviceExt;

use crate::gpu::GpuContext;

/// One tightly packed attribute stream: a shader location and its format.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexStream {
    attribute: wgpu::VertexAttribute,
}

pub const POSITION_STREAM: VertexStream = VertexStream::new(0, wgpu::VertexFormat::Float32x3);
pub const COLOR_STREAM: VertexStream = VertexStream::new(1, wgpu::VertexFormat::Float32x3);
pub const UV_STREAM: VertexStream = VertexStream::new(2, wgpu::VertexFormat::Float32x2);

impl VertexStream {
    pub const fn new(location: u32, format: wgpu::VertexFormat) -> Self {
        Self {
            attribute: wgpu::VertexAttribute {
                format,
                offset: 0,
                shader_location: location,
            },
        }
    }

    pub fn location(&self) -> u32 {
        self.attribute.shader_location
    }

    pub fn format(&self) -> wgpu::VertexFormat {
        self.attribute.format
    }

    /// Bytes per vertex.
    pub fn stride(&self) -> u64 {
        self.attribute.format.size()
    }

    pub fn layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride(),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: std::slice::from_ref(&self.attribute),
        }
    }
}

/// Exclusive owner of one GPU vertex buffer.
///
/// Not `Clone`: the buffer is released exactly once, when the owner drops.
/// Move it into a [`VertexArray`] with [`VertexArray::take_buffer`].
#[derive(Debug)]
pub struct VertexBuffer {
    buffer: wgpu::Buffer,
    stream: VertexStream,
    len: u32,
}

impl VertexBuffer {
    /// Uploads `data` as one attribute stream.
    ///
    /// `T` must be exactly one vertex of `stream`'s format, e.g. `[f32; 3]`
    /// for `Float32x3`.
    pub fn from_slice<T: bytemuck::Pod>(
        gpu: &GpuContext,
        label: &str,
        data: &[T],
        stream: VertexStream,
    ) -> Self {
        debug_assert_eq!(
            std::mem::size_of::<T>() as u64,
            stream.stride(),
            "element size does not match {:?}",
            stream.format()
        );

        let buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            });

        Self {
            buffer,
            stream,
            len: data.len() as u32,
        }
    }

    pub fn stream(&self) -> &VertexStream {
        &self.stream
    }

    /// Number of vertices in the buffer.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Owns a set of vertex buffers, one per slot, and describes their layout.
#[derive(Debug, Default)]
pub struct VertexArray {
    buffers: Vec<VertexBuffer>,
}

impl VertexArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `buffer` and returns the slot it is bound to.
    pub fn take_buffer(&mut self, buffer: VertexBuffer) -> u32 {
        debug_assert!(
            self.buffers
                .iter()
                .all(|b| b.stream.location() != buffer.stream.location()),
            "shader location {} is already fed by another buffer",
            buffer.stream.location()
        );

        let slot = self.buffers.len() as u32;
        self.buffers.push(buffer);
        slot
    }

    /// One layout per slot, in slot order.
    pub fn layouts(&self) -> Vec<wgpu::VertexBufferLayout<'_>> {
        self.buffers.iter().map(|b| b.stream.layout()).collect()
    }

    /// Vertices drawable from every stream: the length of the shortest one.
    pub fn vertex_count(&self) -> u32 {
        shortest_stream(self.buffers.iter().map(VertexBuffer::len))
    }

    /// Binds every buffer to its slot.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        for (slot, buffer) in self.buffers.iter().enumerate() {
            render_pass.set_vertex_buffer(slot as u32, buffer.buffer.slice(..));
        }
    }
}

fn shortest_stream(lens: impl Iterator<Item = u32>) -> u32 {
    lens.min().unwrap_or(0)
}

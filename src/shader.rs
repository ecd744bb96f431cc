//! WGSL shader programs with named matrix uniforms.
//!
//! A shader is compiled in two steps:
//!
//! 1. [`CompiledShader::compile`] parses and validates WGSL with `naga` and
//!    reflects the matrix uniform block (group 0, binding 0) into a
//!    [`UniformBlock`]. No GPU is involved, so this step is unit-testable.
//! 2. [`ShaderProgram::new`] hands the validated module to wgpu and allocates
//!    the uniform buffer and bind group.
//!
//! Uniforms are set by the member name used in the shader:
//!
//! ```ignore
//! program.set_matrix("projection", &projection);
//! program.set_matrix("view", camera.view());
//! program.flush(&gpu.queue);
//! ```

use std::borrow::Cow;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use glam::Mat4;
use naga::{AddressSpace, ResourceBinding, TypeInner, VectorSize};
use thiserror::Error;

use crate::gpu::GpuContext;

/// Bind group that holds the matrix uniform block.
pub const UNIFORM_GROUP: u32 = 0;
/// Binding of the matrix uniform block inside [`UNIFORM_GROUP`].
pub const UNIFORM_BINDING: u32 = 0;

const MAT4_SIZE: usize = std::mem::size_of::<[[f32; 4]; 4]>();

/// Errors from loading or compiling a shader.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("could not read shader file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse shader '{label}':\n{message}")]
    Parse { label: String, message: String },
    #[error("shader '{label}' failed validation: {message}")]
    Validation { label: String, message: String },
    #[error("shader '{label}' declares no uniform block at group {group}, binding {binding}")]
    MissingUniformBlock {
        label: String,
        group: u32,
        binding: u32,
    },
    #[error("uniform '{name}' in shader '{label}' is not a struct")]
    UnsupportedUniform { label: String, name: String },
}

/// Reads a whole shader file into a string.
pub fn read_shader_file(path: impl AsRef<Path>) -> Result<String, ShaderError> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| ShaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// One member of the reflected uniform block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniformField {
    pub name: String,
    /// Byte offset inside the block.
    pub offset: u32,
    /// Whether the member is a `mat4x4<f32>` and can take [`UniformBlock::set_matrix`].
    pub is_mat4: bool,
}

/// CPU-side staging copy of the matrix uniform block.
///
/// Values written here reach the GPU on the next [`ShaderProgram::flush`].
#[derive(Clone, Debug)]
pub struct UniformBlock {
    fields: Vec<UniformField>,
    bytes: Vec<u8>,
    dirty: bool,
    warned: HashSet<String>,
}

impl UniformBlock {
    /// A zero-filled block of `size` bytes (rounded up to 16) with the given fields.
    pub fn new(fields: Vec<UniformField>, size: usize) -> Self {
        Self {
            fields,
            bytes: vec![0; size.next_multiple_of(16)],
            dirty: true,
            warned: HashSet::new(),
        }
    }

    /// Reflects the uniform block bound at `group`/`binding` of a naga module.
    fn reflect(
        label: &str,
        module: &naga::Module,
        group: u32,
        binding: u32,
    ) -> Result<Self, ShaderError> {
        let wanted = ResourceBinding { group, binding };
        let (_, global) = module
            .global_variables
            .iter()
            .find(|(_, var)| var.space == AddressSpace::Uniform && var.binding == Some(wanted))
            .ok_or_else(|| ShaderError::MissingUniformBlock {
                label: label.to_string(),
                group,
                binding,
            })?;

        let TypeInner::Struct { members, span } = &module.types[global.ty].inner else {
            return Err(ShaderError::UnsupportedUniform {
                label: label.to_string(),
                name: global.name.clone().unwrap_or_default(),
            });
        };

        let fields = members
            .iter()
            .filter_map(|member| {
                let name = member.name.clone()?;
                let is_mat4 = matches!(
                    module.types[member.ty].inner,
                    TypeInner::Matrix {
                        columns: VectorSize::Quad,
                        rows: VectorSize::Quad,
                        scalar,
                    } if scalar == naga::Scalar::F32
                );
                Some(UniformField {
                    name,
                    offset: member.offset,
                    is_mat4,
                })
            })
            .collect();

        Ok(Self::new(fields, *span as usize))
    }

    /// Reflected members in declaration order.
    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    /// Size of the block in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Raw block contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Writes a matrix into the member called `name`.
    ///
    /// Returns `false` and leaves the block untouched if no `mat4x4<f32>`
    /// member has that name. The first miss per name is logged.
    pub fn set_matrix(&mut self, name: &str, matrix: &Mat4) -> bool {
        let Some(field) = self.fields.iter().find(|f| f.name == name && f.is_mat4) else {
            if self.warned.insert(name.to_string()) {
                log::warn!("no mat4x4<f32> uniform named '{name}', ignoring writes");
            }
            return false;
        };

        let start = field.offset as usize;
        let data = matrix.to_cols_array();
        self.bytes[start..start + MAT4_SIZE].copy_from_slice(bytemuck::cast_slice(&data));
        self.dirty = true;
        true
    }

    /// Reads back the matrix stored under `name`.
    pub fn matrix(&self, name: &str) -> Option<Mat4> {
        let field = self.fields.iter().find(|f| f.name == name && f.is_mat4)?;
        let start = field.offset as usize;
        let data: [f32; 16] = bytemuck::pod_read_unaligned(&self.bytes[start..start + MAT4_SIZE]);
        Some(Mat4::from_cols_array(&data))
    }

    fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

/// A parsed and validated WGSL module plus its uniform layout.
pub struct CompiledShader {
    label: String,
    module: naga::Module,
    uniforms: UniformBlock,
}

impl CompiledShader {
    /// Parses, validates and reflects a WGSL source string.
    pub fn compile(label: &str, source: &str) -> Result<Self, ShaderError> {
        let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Parse {
            label: label.to_string(),
            message: e.emit_to_string(source),
        })?;

        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        )
        .validate(&module)
        .map_err(|e| ShaderError::Validation {
            label: label.to_string(),
            message: e.to_string(),
        })?;

        let uniforms = UniformBlock::reflect(label, &module, UNIFORM_GROUP, UNIFORM_BINDING)?;
        log::debug!(
            "shader '{label}': uniform block of {} bytes with {:?}",
            uniforms.size(),
            uniforms.fields().iter().map(|f| &f.name).collect::<Vec<_>>()
        );

        Ok(Self {
            label: label.to_string(),
            module,
            uniforms,
        })
    }

    /// Reads and compiles a WGSL file. The path becomes the label.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ShaderError> {
        let path = path.as_ref();
        let source = read_shader_file(path)?;
        Self::compile(&path.display().to_string(), &source)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn uniforms(&self) -> &UniformBlock {
        &self.uniforms
    }
}

/// A shader module on the GPU with its matrix uniform buffer.
///
/// Owns the module, buffer and bind group; dropping the program releases them.
pub struct ShaderProgram {
    label: String,
    module: wgpu::ShaderModule,
    uniforms: UniformBlock,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl ShaderProgram {
    /// Uploads a compiled shader and allocates its uniform buffer.
    pub fn new(gpu: &GpuContext, shader: CompiledShader) -> Self {
        let CompiledShader {
            label,
            module,
            uniforms,
        } = shader;
        let device = &gpu.device;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Naga(Cow::Owned(module)),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Uniforms")),
            size: uniforms.size() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{label} Uniform Layout")),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: UNIFORM_BINDING,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Uniform Bind Group")),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: UNIFORM_BINDING,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        log::info!("shader program '{label}' ready");

        Self {
            label,
            module,
            uniforms,
            uniform_buffer,
            bind_group_layout,
            bind_group,
        }
    }

    /// Compiles `source` and uploads it.
    pub fn from_source(gpu: &GpuContext, label: &str, source: &str) -> Result<Self, ShaderError> {
        Ok(Self::new(gpu, CompiledShader::compile(label, source)?))
    }

    /// Reads, compiles and uploads a WGSL file.
    pub fn from_file(gpu: &GpuContext, path: impl AsRef<Path>) -> Result<Self, ShaderError> {
        Ok(Self::new(gpu, CompiledShader::from_file(path)?))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }

    /// Layout of the uniform bind group, for building pipeline layouts.
    pub fn uniform_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Stages a named matrix uniform. See [`UniformBlock::set_matrix`].
    pub fn set_matrix(&mut self, name: &str, matrix: &Mat4) -> bool {
        self.uniforms.set_matrix(name, matrix)
    }

    /// Uploads staged uniforms if anything changed since the last flush.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        if self.uniforms.take_dirty() {
            queue.write_buffer(&self.uniform_buffer, 0, self.uniforms.bytes());
        }
    }
}

//! # Spinview
//!
//! **A spinning first-person camera around a textured triangle, on wgpu.**
//!
//! The interesting part is [`Camera`]: a position, a unit direction, the
//! spherical angles that direction corresponds to, and a cached view matrix,
//! all kept consistent through yaw, pitch, look-at and moves. Everything else
//! is the smallest window/GPU harness that puts the camera on screen.
//!
//! ## Quick Start
//!
//! ```no_run
//! use spinview::{AppConfig, Projection};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::new()
//!         .title("spin")
//!         .size(1024, 768)
//!         .projection(Projection::perspective(75.0, 0.1, 100.0));
//!     spinview::run(config)
//! }
//! ```
//!
//! ## Keys
//!
//! - **Esc**: quit
//! - **Space**: pause or resume the spin
//! - **Arrows**: turn and tilt by hand
//! - **R**: back to the starting view

mod app;
mod camera;
mod clock;
mod config;
mod gpu;
mod input;
mod logging;
mod projection;
mod renderer;
mod shader;
mod texture;
mod vertex;

pub use app::{BUILTIN_SHADER, CameraDriver, run};
pub use camera::{
    Camera, CameraError, PITCH_LIMIT, WORLD_UP, angles_from_direction, direction_from_angles,
    wrap_theta,
};
pub use clock::{FrameClock, FrameTime};
pub use config::{AppConfig, CameraConfig, Cli};
pub use gpu::{GpuContext, GpuError, SurfaceErrorAction};
pub use input::Input;
pub use logging::{LoggingConfig, init_logging};
pub use projection::{Projection, aspect_ratio};
pub use renderer::{CLEAR_COLOR, TriangleRenderer};
pub use shader::{
    CompiledShader, ShaderError, ShaderProgram, UniformBlock, UniformField, read_shader_file,
};
pub use texture::{Texture, checkerboard_rgba, load_rgba};
pub use vertex::{COLOR_STREAM, POSITION_STREAM, UV_STREAM, VertexArray, VertexBuffer, VertexStream};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec3};

// Re-export commonly used winit types for convenience
pub use winit::keyboard::KeyCode;

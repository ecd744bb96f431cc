use std::f32::consts::TAU;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use glam::Mat4;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowId};

use crate::camera::{Camera, CameraError};
use crate::clock::FrameClock;
use crate::config::{AppConfig, CameraConfig};
use crate::gpu::{GpuContext, SurfaceErrorAction};
use crate::input::Input;
use crate::projection::Projection;
use crate::renderer::TriangleRenderer;
use crate::shader::ShaderProgram;
use crate::texture::Texture;

/// Source of the built-in triangle shader.
pub const BUILTIN_SHADER: &str = include_str!("shaders/triangle.wgsl");

const CHECKERBOARD_SIZE: u32 = 256;
const CHECKERBOARD_CELLS: u32 = 8;

/// Turns the camera from keyboard state and elapsed time.
///
/// Space pauses the automatic spin, the arrow keys add yaw and pitch and R
/// returns to the configured starting view.
#[derive(Debug, Clone)]
pub struct CameraDriver {
    camera: Camera,
    home: Camera,
    settings: CameraConfig,
    paused: bool,
}

impl CameraDriver {
    pub fn new(settings: CameraConfig) -> Result<Self, CameraError> {
        let home = Camera::looking_at(settings.eye, settings.target)?;
        Ok(Self {
            camera: home.clone(),
            home,
            settings,
            paused: false,
        })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn reset(&mut self) {
        self.camera = self.home.clone();
    }

    /// Advances the camera by `dt` seconds.
    pub fn update(&mut self, input: &Input, dt: f32) {
        if input.key_pressed(KeyCode::Space) {
            self.paused = !self.paused;
            log::info!("spin {}", if self.paused { "paused" } else { "resumed" });
        }
        if input.key_pressed(KeyCode::KeyR) {
            self.reset();
            log::debug!("camera reset");
        }

        let spin = if self.paused { 0.0 } else { self.settings.yaw_speed };
        let manual = input.axis(KeyCode::ArrowRight, KeyCode::ArrowLeft) * self.settings.pitch_speed;
        let yaw = (spin + manual) * dt;
        if yaw != 0.0 && yaw.is_finite() {
            // A single call may only wrap once.
            self.camera.rotate_yaw(yaw % TAU);
        }

        let pitch = input.axis(KeyCode::ArrowUp, KeyCode::ArrowDown) * self.settings.pitch_speed * dt;
        if pitch != 0.0 && pitch.is_finite() {
            self.camera.rotate_pitch(pitch);
        }
    }
}

/// Everything alive while the window is open.
///
/// Field order is drop order: GPU resources go before the device.
struct Running {
    renderer: TriangleRenderer,
    gpu: GpuContext,
    window: Arc<Window>,
    driver: CameraDriver,
    projection: Projection,
    projection_matrix: Mat4,
    model: Mat4,
    input: Input,
    clock: FrameClock,
}

impl Running {
    fn new(event_loop: &ActiveEventLoop, config: &AppConfig) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(config.width, config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let gpu = GpuContext::new(window.clone()).context("failed to initialize the GPU")?;

        let program = match &config.shader_path {
            Some(path) => ShaderProgram::from_file(&gpu, path)
                .with_context(|| format!("failed to load shader {}", path.display()))?,
            None => ShaderProgram::from_source(&gpu, "triangle.wgsl", BUILTIN_SHADER)
                .context("built-in shader failed to compile")?,
        };

        let texture = match &config.texture_path {
            Some(path) => Texture::from_file(&gpu, path)
                .with_context(|| format!("failed to load texture {}", path.display()))?,
            None => Texture::checkerboard(&gpu, CHECKERBOARD_SIZE, CHECKERBOARD_CELLS),
        };

        let renderer = TriangleRenderer::new(&gpu, program, texture);
        let driver = CameraDriver::new(config.camera.clone()).context("invalid camera settings")?;
        let projection_matrix = config.projection.matrix(gpu.aspect());

        log::info!(
            "running at {}x{} with {:?}",
            gpu.width(),
            gpu.height(),
            config.projection
        );

        Ok(Self {
            renderer,
            gpu,
            window,
            driver,
            projection: config.projection,
            projection_matrix,
            model: Mat4::IDENTITY,
            input: Input::new(),
            clock: FrameClock::new(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        if let Some(matrix) = self.projection.matrix_for_size(width, height) {
            self.projection_matrix = matrix;
        }
    }

    fn draw(&mut self) -> Result<()> {
        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(err) => {
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => Err(anyhow!("the GPU ran out of memory")),
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => Ok(()),
                };
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.draw(
            &self.gpu,
            &view,
            &self.projection_matrix,
            self.driver.camera().view(),
            &self.model,
        );

        self.window.pre_present_notify();
        output.present();
        Ok(())
    }
}

enum SpinviewApp {
    Pending { config: AppConfig },
    Running(Box<Running>),
    Failed(Option<anyhow::Error>),
}

impl SpinviewApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        *self = SpinviewApp::Failed(Some(err));
        event_loop.exit();
    }
}

impl ApplicationHandler for SpinviewApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let SpinviewApp::Pending { config } = self {
            match Running::new(event_loop, config) {
                Ok(running) => {
                    running.window.request_redraw();
                    *self = SpinviewApp::Running(Box::new(running));
                }
                Err(err) => self.fail(event_loop, err),
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let SpinviewApp::Running(app) = self else {
            return;
        };

        app.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                app.resize(size.width, size.height);
            }
            WindowEvent::Occluded(false) => {
                // Time spent covered is not one long frame.
                app.clock.reset();
            }
            WindowEvent::RedrawRequested => {
                if app.input.key_pressed(KeyCode::Escape) {
                    event_loop.exit();
                    return;
                }

                let time = app.clock.tick();
                app.driver.update(&app.input, time.dt);

                let result = app.draw();
                app.input.begin_frame();
                app.window.request_redraw();

                if let Err(err) = result {
                    self.fail(event_loop, err.context(format!("frame {}", time.frame_index)));
                }
            }
            _ => {}
        }
    }
}

/// Opens the window and runs the frame loop until it is closed.
///
/// Startup failures (window, GPU, shader, texture) end the loop and are
/// returned here.
pub fn run(config: AppConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create the event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = SpinviewApp::Pending { config };
    event_loop
        .run_app(&mut app)
        .context("event loop terminated with an error")?;

    match app {
        SpinviewApp::Failed(Some(err)) => Err(err),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::f32::consts::PI;

    fn driver() -> CameraDriver {
        CameraDriver::new(CameraConfig::default()).unwrap()
    }

    #[test]
    fn spins_by_yaw_speed() {
        let mut driver = driver();
        let start = driver.camera().theta();

        driver.update(&Input::new(), 0.1);
        let expected = crate::camera::wrap_theta(start + 0.05);
        assert!((driver.camera().theta() - expected).abs() < 1e-5);
    }

    #[test]
    fn space_pauses_spin() {
        let mut driver = driver();
        let mut input = Input::new();
        input.press(KeyCode::Space);

        let before = driver.camera().clone();
        driver.update(&input, 0.1);
        assert!(driver.is_paused());
        assert_eq!(driver.camera(), &before);

        input.begin_frame();
        input.release(KeyCode::Space);
        driver.update(&input, 0.1);
        assert_eq!(driver.camera(), &before);
    }

    #[test]
    fn reset_restores_home_view() {
        let mut driver = driver();
        for _ in 0..10 {
            driver.update(&Input::new(), 0.25);
        }
        assert_ne!(driver.camera().direction(), Vec3::NEG_ONE.normalize());

        let mut input = Input::new();
        input.press(KeyCode::KeyR);
        input.press(KeyCode::Space);
        driver.update(&input, 0.1);

        assert!(
            driver
                .camera()
                .direction()
                .abs_diff_eq(Vec3::NEG_ONE.normalize(), 1e-5)
        );
    }

    #[test]
    fn arrow_keys_pitch() {
        let mut driver = driver();
        let mut input = Input::new();
        input.press(KeyCode::Space);
        driver.update(&input, 0.0001);
        input.begin_frame();

        let phi = driver.camera().phi();
        input.press(KeyCode::ArrowUp);
        driver.update(&input, 0.1);
        assert!((driver.camera().phi() - (phi + 0.1)).abs() < 1e-4);
    }

    #[test]
    fn fast_spin_stays_in_range() {
        let mut driver = CameraDriver::new(CameraConfig {
            yaw_speed: 40.0,
            ..CameraConfig::default()
        })
        .unwrap();

        for _ in 0..50 {
            driver.update(&Input::new(), 0.25);
            let theta = driver.camera().theta();
            assert!(theta > -PI && theta <= PI);
        }
    }

    #[test]
    fn non_finite_speeds_leave_the_camera_alone() {
        let mut driver = CameraDriver::new(CameraConfig {
            yaw_speed: f32::NAN,
            pitch_speed: f32::INFINITY,
            ..CameraConfig::default()
        })
        .unwrap();
        let before = driver.camera().clone();

        let mut input = Input::new();
        input.press(KeyCode::ArrowUp);
        driver.update(&input, 0.1);

        assert_eq!(driver.camera(), &before);
    }

    #[test]
    fn rejects_eye_on_target() {
        let settings = CameraConfig {
            eye: Vec3::ZERO,
            ..CameraConfig::default()
        };
        assert!(CameraDriver::new(settings).is_err());
    }
}

//! Application configuration and command-line parsing.

use std::path::PathBuf;

use clap::Parser;
use glam::Vec3;

use crate::projection::Projection;

/// Where the camera starts and how fast it turns.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub eye: Vec3,
    pub target: Vec3,
    /// Automatic spin in radians per second.
    pub yaw_speed: f32,
    /// Arrow-key pitch in radians per second.
    pub pitch_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::ONE,
            target: Vec3::ZERO,
            yaw_speed: 0.5,
            pitch_speed: 1.0,
        }
    }
}

/// Configuration for the app window and scene.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub projection: Projection,
    pub camera: CameraConfig,
    /// WGSL file replacing the built-in shader.
    pub shader_path: Option<PathBuf>,
    /// Image file replacing the checkerboard texture.
    pub texture_path: Option<PathBuf>,
    pub log_filter: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Spinview".to_string(),
            width: 800,
            height: 600,
            projection: Projection::default(),
            camera: CameraConfig::default(),
            shader_path: None,
            texture_path: None,
            log_filter: None,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    pub fn shader_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.shader_path = Some(path.into());
        self
    }

    pub fn texture_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.texture_path = Some(path.into());
        self
    }

    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }
}

/// Height of the orthographic view volume in world units.
const ORTHO_HEIGHT: f32 = 2.0;

#[derive(Parser, Debug, Clone)]
#[command(name = "spinview")]
#[command(about = "Spinning-camera triangle demo", long_about = None)]
pub struct Cli {
    /// Window width in logical pixels
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Window height in logical pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Window title
    #[arg(long, default_value = "Spinview")]
    pub title: String,

    /// Use an orthographic projection instead of perspective
    #[arg(long)]
    pub ortho: bool,

    /// Vertical field of view in degrees (perspective only)
    #[arg(long, default_value_t = 60.0, value_parser = parse_finite)]
    pub fov: f32,

    /// Automatic yaw speed in radians per second
    #[arg(long, default_value_t = 0.5, allow_negative_numbers = true, value_parser = parse_finite)]
    pub yaw_speed: f32,

    /// WGSL shader file to use instead of the built-in one
    #[arg(long)]
    pub shader: Option<PathBuf>,

    /// Image file to use instead of the checkerboard texture
    #[arg(long)]
    pub texture: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "spinview=trace"
    #[arg(long)]
    pub log: Option<String>,
}

fn parse_finite(arg: &str) -> Result<f32, String> {
    let value: f32 = arg.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("expected a finite number, got {arg}"))
    }
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        let defaults = Projection::default();
        let (near, far) = (defaults.near(), defaults.far());
        let projection = if cli.ortho {
            Projection::orthographic(ORTHO_HEIGHT, near, far)
        } else {
            Projection::perspective(cli.fov, near, far)
        };

        Self {
            title: cli.title,
            width: cli.width,
            height: cli.height,
            projection,
            camera: CameraConfig {
                yaw_speed: cli.yaw_speed,
                ..CameraConfig::default()
            },
            shader_path: cli.shader,
            texture_path: cli.texture,
            log_filter: cli.log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let from_cli = AppConfig::from(Cli::try_parse_from(["spinview"]).unwrap());
        let defaults = AppConfig::default();

        assert_eq!(from_cli.title, defaults.title);
        assert_eq!((from_cli.width, from_cli.height), (800, 600));
        assert_eq!(from_cli.projection, defaults.projection);
        assert_eq!(from_cli.camera, defaults.camera);
        assert!(from_cli.shader_path.is_none());
        assert!(from_cli.log_filter.is_none());
    }

    #[test]
    fn parses_all_flags() {
        let cli = Cli::try_parse_from([
            "spinview",
            "--width",
            "1280",
            "--height",
            "720",
            "--title",
            "demo",
            "--fov",
            "90",
            "--yaw-speed",
            "-1.5",
            "--shader",
            "custom.wgsl",
            "--texture",
            "brick.png",
            "--log",
            "debug",
        ])
        .unwrap();
        let config = AppConfig::from(cli);

        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(config.title, "demo");
        assert_eq!(config.projection, Projection::perspective(90.0, 0.1, 100.0));
        assert_eq!(config.camera.yaw_speed, -1.5);
        assert_eq!(config.shader_path, Some(PathBuf::from("custom.wgsl")));
        assert_eq!(config.texture_path, Some(PathBuf::from("brick.png")));
        assert_eq!(config.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn ortho_flag_selects_orthographic() {
        let config = AppConfig::from(Cli::try_parse_from(["spinview", "--ortho"]).unwrap());
        assert!(matches!(config.projection, Projection::Orthographic { .. }));
    }

    #[test]
    fn rejects_non_finite_numbers() {
        for bad in ["NaN", "inf", "-inf"] {
            assert!(Cli::try_parse_from(["spinview", "--yaw-speed", bad]).is_err());
            assert!(Cli::try_parse_from(["spinview", "--fov", bad]).is_err());
        }
        assert!(Cli::try_parse_from(["spinview", "--yaw-speed", "abc"]).is_err());
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["spinview", "--fullscreen"]).is_err());
    }

    #[test]
    fn builder_overrides_fields() {
        let config = AppConfig::new()
            .title("t")
            .size(320, 240)
            .shader_path("a.wgsl")
            .log_filter("warn");

        assert_eq!(config.title, "t");
        assert_eq!((config.width, config.height), (320, 240));
        assert_eq!(config.shader_path, Some(PathBuf::from("a.wgsl")));
        assert_eq!(config.log_filter.as_deref(), Some("warn"));
    }
}

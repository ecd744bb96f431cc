use glam::Mat4;

/// How eye space is mapped to clip space.
///
/// Matrices target wgpu's clip space (depth in `0..1`, right-handed view).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    /// Perspective frustum with a vertical field of view in radians.
    Perspective { fov_y: f32, near: f32, far: f32 },
    /// Orthographic box; `half_height` is half the visible height in world units.
    Orthographic {
        half_height: f32,
        near: f32,
        far: f32,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Self::Perspective {
            fov_y: 60.0_f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Projection {
    /// Perspective projection with the field of view given in degrees.
    pub fn perspective(fov_degrees: f32, near: f32, far: f32) -> Self {
        Self::Perspective {
            fov_y: fov_degrees.to_radians(),
            near,
            far,
        }
    }

    /// Orthographic projection showing `height` world units vertically.
    pub fn orthographic(height: f32, near: f32, far: f32) -> Self {
        Self::Orthographic {
            half_height: height * 0.5,
            near,
            far,
        }
    }

    pub fn near(&self) -> f32 {
        match *self {
            Self::Perspective { near, .. } | Self::Orthographic { near, .. } => near,
        }
    }

    pub fn far(&self) -> f32 {
        match *self {
            Self::Perspective { far, .. } | Self::Orthographic { far, .. } => far,
        }
    }

    /// Builds the projection matrix for the given aspect ratio (width / height).
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        match *self {
            Self::Perspective { fov_y, near, far } => Mat4::perspective_rh(fov_y, aspect, near, far),
            Self::Orthographic {
                half_height,
                near,
                far,
            } => {
                let half_width = half_height * aspect;
                Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    near,
                    far,
                )
            }
        }
    }

    /// Rebuilds the matrix for a resized surface.
    ///
    /// Returns `None` for a zero-sized surface (e.g. a minimized window); the
    /// caller keeps its previous matrix.
    pub fn matrix_for_size(&self, width: u32, height: u32) -> Option<Mat4> {
        aspect_ratio(width, height).map(|aspect| self.matrix(aspect))
    }
}

/// `width / height`, or `None` if either side is zero.
pub fn aspect_ratio(width: u32, height: u32) -> Option<f32> {
    (width > 0 && height > 0).then(|| width as f32 / height as f32)
}

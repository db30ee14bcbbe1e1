use nalgebra::{Matrix4, Point3, Vector2, Vector3, Vector4};

//=================================
// View Matrix
//=================================

/// Builds the world-to-camera matrix for a rigid camera.
///
/// Each of the first three rows is `(axis, -dot(axis, position))`. For orthonormal
/// axes this is the inverse of the camera's world transform, so no generic
/// matrix inverse is needed.
#[rustfmt::skip]
pub fn view_from_axes(
    x: &Vector3<f32>,
    y: &Vector3<f32>,
    z: &Vector3<f32>,
    position: &Point3<f32>,
) -> Matrix4<f32> {
    let p = position.coords;
    Matrix4::new(
        x.x, x.y, x.z, -x.dot(&p),
        y.x, y.y, y.z, -y.dot(&p),
        z.x, z.y, z.z, -z.dot(&p),
        0.0, 0.0, 0.0, 1.0,
    )
}

//=================================
// Projection
//=================================

/// Pinhole projection parameters derived from the camera config and screen size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub near: f32,
    /// Camera-space units to pixels at unit depth.
    pub factor: f32,
    pub center: Vector2<f32>,
}

impl Projection {
    /// `scale = near * tan(fov / 2)`, `factor = near * height / (2 * scale)`.
    pub fn new(near: f32, fov_rad: f32, width: usize, height: usize) -> Self {
        let scale = near * (fov_rad / 2.0).tan();
        Self {
            near,
            factor: near * height as f32 / (2.0 * scale),
            center: Vector2::new(width as f32 / 2.0, height as f32 / 2.0),
        }
    }

    /// Projects a camera-space point into raster space.
    ///
    /// `z` of the result is the positive depth `-camera.z`. Points behind the
    /// near plane keep their depth but get a zeroed raster position; they are
    /// only drawn after clipping.
    #[inline(always)]
    pub fn to_raster(&self, camera: &Vector3<f32>) -> Vector3<f32> {
        let depth = -camera.z;
        if !(depth >= self.near) {
            return Vector3::new(0.0, 0.0, depth);
        }
        self.project_at(camera, depth)
    }

    /// Projects a point that lies exactly on the near plane.
    #[inline(always)]
    pub fn to_raster_on_near_plane(&self, camera: &Vector3<f32>) -> Vector3<f32> {
        self.project_at(camera, self.near)
    }

    #[inline(always)]
    fn project_at(&self, camera: &Vector3<f32>, depth: f32) -> Vector3<f32> {
        let s = self.factor / depth;
        Vector3::new(
            camera.x * s + self.center.x,
            -camera.y * s + self.center.y,
            depth,
        )
    }
}

/// Applies an affine matrix to a point (w = 1) and drops w.
#[inline(always)]
pub fn transform_point(m: &Matrix4<f32>, p: &Vector4<f32>) -> Vector3<f32> {
    (m * p).xyz()
}

/// Rotates a direction by the linear part of `m`; translation is ignored.
#[inline(always)]
pub fn transform_normal(m: &Matrix4<f32>, n: &Vector4<f32>) -> Vector3<f32> {
    m.fixed_view::<3, 3>(0, 0) * n.xyz()
}

use nalgebra::Vector3;

/// A pixel that passed the inside and depth tests.
#[derive(Debug, Clone, Copy)]
pub struct Fragment {
    pub x: usize,
    pub y: usize,
    /// Screen-linear barycentric weights (sum to 1).
    pub weights: Vector3<f32>,
    /// Perspective-correct depth, `1 / inv_z`.
    pub z: f32,
    /// Interpolated inverse depth, the value stored in the depth buffer.
    pub inv_z: f32,
}

/// Per-pixel shading callback invoked by the rasterizer.
///
/// One shader is built per triangle, so implementations can precompute
/// everything that is constant across the triangle.
pub trait FragmentShader {
    /// Returns the packed 0x00RRGGBB color for the fragment.
    fn fragment(&self, fragment: &Fragment) -> u32;
}

impl<F> FragmentShader for F
where
    F: Fn(&Fragment) -> u32,
{
    fn fragment(&self, fragment: &Fragment) -> u32 {
        self(fragment)
    }
}

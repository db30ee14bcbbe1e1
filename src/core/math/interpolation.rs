use nalgebra::{Vector2, Vector3};

/// Signed area test of `p` against the directed edge `a -> b` in raster space.
///
/// For the three vertices of a front-facing triangle, `edge_function(v0, v1, v2)`
/// is positive and equals twice the triangle's area.
#[inline(always)]
pub fn edge_function(a: Vector2<f32>, b: Vector2<f32>, p: Vector2<f32>) -> f32 {
    (p.x - a.x) * (a.y - b.y) + (p.y - a.y) * (b.x - a.x)
}

/// Returns true if all three edge weights are non-negative.
#[inline(always)]
pub fn is_inside_triangle(weights: Vector3<f32>) -> bool {
    weights.x >= 0.0 && weights.y >= 0.0 && weights.z >= 0.0
}

/// Screen-linear barycentric weights with constant per-pixel deltas.
///
/// Weight `i` belongs to vertex `i` and is the edge function of the opposite
/// edge, normalised by the triangle area. Stepping one pixel right adds `dx`,
/// one row down adds `dy`.
#[derive(Debug, Clone, Copy)]
pub struct EdgeWeights {
    pub origin: Vector3<f32>,
    pub dx: Vector3<f32>,
    pub dy: Vector3<f32>,
}

impl EdgeWeights {
    /// Sets up weights for the sample at `start` (usually a pixel centre).
    pub fn new(v: [Vector2<f32>; 3], inv_area: f32, start: Vector2<f32>) -> Self {
        let origin = Vector3::new(
            edge_function(v[1], v[2], start),
            edge_function(v[2], v[0], start),
            edge_function(v[0], v[1], start),
        ) * inv_area;
        let dx = Vector3::new(v[1].y - v[2].y, v[2].y - v[0].y, v[0].y - v[1].y) * inv_area;
        let dy = Vector3::new(v[2].x - v[1].x, v[0].x - v[2].x, v[1].x - v[0].x) * inv_area;
        Self { origin, dx, dy }
    }
}

/// Interpolated inverse depth `dot(1/z_i, w)` for screen-linear weights.
///
/// Returns `None` unless the result is a positive finite number.
#[inline(always)]
pub fn interpolate_inverse_depth(weights: Vector3<f32>, inv_depths: Vector3<f32>) -> Option<f32> {
    let inv_z = inv_depths.dot(&weights);
    if inv_z > 0.0 && inv_z.is_finite() {
        Some(inv_z)
    } else {
        None
    }
}

/// Perspective-correct interpolation of attributes that were pre-divided by
/// their vertex depth: `z * sum(pre_i * w_i)`.
#[inline(always)]
pub fn perspective_interpolate<T>(pre_divided: &[T; 3], weights: Vector3<f32>, z: f32) -> T
where
    T: Copy + std::ops::Add<Output = T> + std::ops::Mul<f32, Output = T>,
{
    (pre_divided[0] * weights.x + pre_divided[1] * weights.y + pre_divided[2] * weights.z) * z
}

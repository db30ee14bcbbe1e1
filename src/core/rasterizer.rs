use crate::core::framebuffer::{DepthBuffer, PixelBuffer};
use crate::core::math::interpolation::{
    EdgeWeights, edge_function, interpolate_inverse_depth, is_inside_triangle,
};
use crate::core::pipeline::{Fragment, FragmentShader};
use nalgebra::{Vector2, Vector3};

/// Default minimum edge-function area, in pixels².
pub const DEFAULT_MIN_AREA: f32 = 10.0;

/// Why a triangle produced no pixels before the fill loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Bounding box does not intersect the screen.
    OffScreen,
    /// At least one vertex lies behind the near plane.
    BehindNear,
    /// Back-facing, degenerate, or smaller than the minimum area.
    TooSmall,
}

/// Everything the fill loop needs, computed once per triangle.
#[derive(Debug, Clone, Copy)]
pub struct TriangleSetup {
    pub x_min: usize,
    pub x_max: usize,
    pub y_min: usize,
    pub y_max: usize,
    /// Edge-function area (twice the geometric area), positive for front faces.
    pub area: f32,
    /// Weights at the centre of pixel `(x_min, y_min)` and their per-pixel steps.
    pub weights: EdgeWeights,
    /// `1/z` per vertex.
    pub inv_depths: Vector3<f32>,
}

/// Edge-function rasterizer with incremental weight stepping.
///
/// Fill convention: a pixel is covered iff its centre has all three edge
/// weights `>= 0` for a triangle with positive edge-function area. Such a
/// triangle runs clockwise as seen on screen (raster y points down), which is
/// counter-clockwise in camera space where y points up.
#[derive(Debug, Clone, Copy)]
pub struct Rasterizer {
    pub near: f32,
    /// Triangles with an edge-function area below this are skipped.
    /// Exactly this area is still drawn.
    pub min_area: f32,
}

impl Rasterizer {
    pub fn new(near: f32, min_area: f32) -> Self {
        Self { near, min_area }
    }

    /// Bounding box, culling and weight setup for raster-space vertices.
    pub fn setup(
        &self,
        raster: &[Vector3<f32>; 3],
        width: usize,
        height: usize,
    ) -> Result<TriangleSetup, Rejection> {
        let [r0, r1, r2] = raster;
        let min = r0.inf(r1).inf(r2);
        let max = r0.sup(r1).sup(r2);

        if width == 0
            || height == 0
            || min.x >= width as f32
            || min.y >= height as f32
            || max.x < 0.0
            || max.y < 0.0
        {
            return Err(Rejection::OffScreen);
        }
        if min.z < self.near {
            return Err(Rejection::BehindNear);
        }

        let xy = [r0.xy(), r1.xy(), r2.xy()];
        let area = edge_function(xy[0], xy[1], xy[2]);
        // also catches NaN
        if !(area >= self.min_area) {
            return Err(Rejection::TooSmall);
        }

        let x_min = min.x.max(0.0).floor() as usize;
        let y_min = min.y.max(0.0).floor() as usize;
        let x_max = (max.x.floor() as usize).min(width - 1);
        let y_max = (max.y.floor() as usize).min(height - 1);

        let start = Vector2::new(x_min as f32 + 0.5, y_min as f32 + 0.5);
        Ok(TriangleSetup {
            x_min,
            x_max,
            y_min,
            y_max,
            area,
            weights: EdgeWeights::new(xy, 1.0 / area, start),
            inv_depths: Vector3::new(1.0 / r0.z, 1.0 / r1.z, 1.0 / r2.z),
        })
    }

    /// Walks the bounding box, depth tests covered pixels and writes the
    /// shader's color. Returns the number of pixels written.
    pub fn fill<S: FragmentShader>(
        &self,
        setup: &TriangleSetup,
        shader: &S,
        pixels: &mut PixelBuffer,
        depth: &mut DepthBuffer,
    ) -> usize {
        let width = pixels.width();
        let mut written = 0;
        let mut row_weights = setup.weights.origin;

        for y in setup.y_min..=setup.y_max {
            let row = y * width;
            let mut weights = row_weights;
            for x in setup.x_min..=setup.x_max {
                if is_inside_triangle(weights)
                    && let Some(inv_z) = interpolate_inverse_depth(weights, setup.inv_depths)
                    && depth.test_and_set(row + x, inv_z)
                {
                    let fragment = Fragment {
                        x,
                        y,
                        weights,
                        z: 1.0 / inv_z,
                        inv_z,
                    };
                    pixels.set(row + x, shader.fragment(&fragment));
                    written += 1;
                }
                weights += setup.weights.dx;
            }
            row_weights += setup.weights.dy;
        }
        written
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(0.1, DEFAULT_MIN_AREA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(points: [(f32, f32); 3], z: f32) -> [Vector3<f32>; 3] {
        points.map(|(x, y)| Vector3::new(x, y, z))
    }

    #[test]
    fn rejects_off_screen_and_behind_near() {
        let r = Rasterizer::default();
        let off = flat([(-30.0, 5.0), (-20.0, -10.0), (-10.0, 5.0)], 1.0);
        assert_eq!(r.setup(&off, 64, 64).unwrap_err(), Rejection::OffScreen);

        let mut behind = flat([(10.0, 40.0), (30.0, 5.0), (50.0, 40.0)], 1.0);
        behind[2].z = 0.05;
        assert_eq!(r.setup(&behind, 64, 64).unwrap_err(), Rejection::BehindNear);
    }

    #[test]
    fn rejects_back_faces() {
        let r = Rasterizer::default();
        let back = flat([(10.0, 40.0), (50.0, 40.0), (30.0, 5.0)], 1.0);
        assert_eq!(r.setup(&back, 64, 64).unwrap_err(), Rejection::TooSmall);
    }

    #[test]
    fn bounding_box_is_clamped_to_screen() {
        let r = Rasterizer::default();
        let big = flat([(-50.0, 100.0), (20.0, -50.0), (90.0, 100.0)], 2.0);
        let setup = r.setup(&big, 64, 48).unwrap();
        assert_eq!((setup.x_min, setup.x_max), (0, 63));
        assert_eq!((setup.y_min, setup.y_max), (0, 47));
        assert_eq!(setup.inv_depths, Vector3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn closure_shaders_receive_normalised_weights() {
        let r = Rasterizer::default();
        let tri = flat([(2.0, 30.0), (16.0, 2.0), (30.0, 30.0)], 1.0);
        let setup = r.setup(&tri, 32, 32).unwrap();
        let mut data = vec![0u32; 32 * 32];
        let mut pixels = PixelBuffer::new(&mut data, 32, 32).unwrap();
        let mut depth = DepthBuffer::new(32, 32);
        let shader = |f: &Fragment| {
            assert!((f.weights.sum() - 1.0).abs() < 1e-4);
            assert!((f.z - 1.0).abs() < 1e-5);
            1
        };
        let written = r.fill(&setup, &shader, &mut pixels, &mut depth);
        assert!(written > 0);
        assert_eq!(data.iter().filter(|&&p| p == 1).count(), written);
    }

    #[test]
    fn clockwise_on_screen_is_front_facing() {
        // bottom-left, top-middle, bottom-right: clockwise with y pointing down
        let cw = [
            Vector3::new(10.0, 40.0, 1.0),
            Vector3::new(30.0, 5.0, 1.0),
            Vector3::new(50.0, 40.0, 1.0),
        ];
        let setup = Rasterizer::default().setup(&cw, 64, 64).unwrap();
        assert_eq!(setup.area, 1400.0);

        let ccw = [cw[0], cw[2], cw[1]];
        assert!(matches!(
            Rasterizer::default().setup(&ccw, 64, 64),
            Err(Rejection::TooSmall)
        ));
    }
}

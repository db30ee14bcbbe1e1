use nalgebra::{Vector2, Vector3};
use soft_rasterizer::core::framebuffer::{DepthBuffer, PixelBuffer};
use soft_rasterizer::core::math::interpolation::edge_function;
use soft_rasterizer::core::pipeline::Fragment;
use soft_rasterizer::core::rasterizer::{Rasterizer, Rejection};

const W: usize = 96;
const H: usize = 80;

fn raster(points: [(f32, f32); 3]) -> [Vector3<f32>; 3] {
    points.map(|(x, y)| Vector3::new(x, y, 1.0))
}

/// Fills one triangle with color 1 and returns the pixels and the count written.
fn fill(tri: &[Vector3<f32>; 3]) -> (Vec<u32>, usize) {
    let rasterizer = Rasterizer::default();
    let mut data = vec![0u32; W * H];
    let written = match rasterizer.setup(tri, W, H) {
        Ok(setup) => {
            let mut pixels = PixelBuffer::new(&mut data, W, H).unwrap();
            let mut depth = DepthBuffer::new(W, H);
            rasterizer.fill(&setup, &|_: &Fragment| 1u32, &mut pixels, &mut depth)
        }
        Err(_) => 0,
    };
    (data, written)
}

#[test]
fn pixel_is_filled_iff_its_centre_is_inside() {
    let tri = raster([(7.3, 61.7), (44.1, 4.2), (83.6, 70.9)]);
    let (data, written) = fill(&tri);
    let v = tri.map(|p| p.xy());

    let mut filled = 0;
    for y in 0..H {
        for x in 0..W {
            let p = Vector2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w = [
                edge_function(v[1], v[2], p),
                edge_function(v[2], v[0], p),
                edge_function(v[0], v[1], p),
            ];
            let inside = w.iter().all(|&e| e >= 0.0);
            let on_edge = w.iter().any(|e| e.abs() < 1e-2);
            let is_filled = data[y * W + x] == 1;
            if !on_edge {
                assert_eq!(is_filled, inside, "pixel ({x}, {y}) weights {w:?}");
            }
            filled += is_filled as usize;
        }
    }
    assert_eq!(filled, written);
}

#[test]
fn pixel_count_tracks_the_area() {
    let tri = raster([(3.5, 75.2), (50.25, 2.8), (90.1, 60.4)]);
    let (_, written) = fill(&tri);
    let v = tri.map(|p| p.xy());
    let area = edge_function(v[0], v[1], v[2]) / 2.0;
    let perimeter = (v[1] - v[0]).norm() + (v[2] - v[1]).norm() + (v[0] - v[2]).norm();
    let diff = (written as f32 - area).abs();
    assert!(
        diff <= perimeter / 2.0,
        "{written} pixels for area {area}, perimeter {perimeter}"
    );
}

#[test]
fn triangle_below_the_area_threshold_draws_nothing() {
    // edge-function area 9 against the default threshold of 10
    let small = raster([(10.0, 10.0), (13.0, 10.0), (10.0, 13.0)]);
    let v = small.map(|p| p.xy());
    assert_eq!(edge_function(v[0], v[1], v[2]), 9.0);
    assert_eq!(
        Rasterizer::default().setup(&small, W, H).unwrap_err(),
        Rejection::TooSmall
    );
    let (data, written) = fill(&small);
    assert_eq!(written, 0);
    assert!(data.iter().all(|&p| p == 0));
}

#[test]
fn triangle_exactly_at_the_threshold_is_accepted() {
    let edge = raster([(10.0, 10.0), (15.0, 10.0), (10.0, 12.0)]);
    let v = edge.map(|p| p.xy());
    assert_eq!(edge_function(v[0], v[1], v[2]), 10.0);
    let setup = Rasterizer::default().setup(&edge, W, H).unwrap();
    assert_eq!(setup.area, 10.0);
}

#[test]
fn opposite_winding_is_culled() {
    let front = raster([(10.0, 60.0), (40.0, 5.0), (70.0, 60.0)]);
    let back = [front[0], front[2], front[1]];
    assert!(fill(&front).1 > 0);
    assert_eq!(
        Rasterizer::default().setup(&back, W, H).unwrap_err(),
        Rejection::TooSmall
    );
}

#[test]
fn partially_off_screen_triangle_is_clamped() {
    let tri = raster([(-200.0, 300.0), (48.0, -300.0), (300.0, 300.0)]);
    let (data, written) = fill(&tri);
    // the screen lies entirely inside this triangle
    assert_eq!(written, W * H);
    assert!(data.iter().all(|&p| p == 1));
}

#[test]
fn shared_edge_leaves_no_gaps() {
    // two triangles of a quad drawn at the same depth
    let quad = [(12.2, 8.9), (80.7, 14.3), (70.1, 72.6), (5.4, 60.8)];
    let a = raster([quad[0], quad[1], quad[2]]);
    let b = raster([quad[0], quad[2], quad[3]]);
    let rasterizer = Rasterizer::default();
    let mut data = vec![0u32; W * H];
    let mut pixels = PixelBuffer::new(&mut data, W, H).unwrap();
    let mut depth = DepthBuffer::new(W, H);
    for tri in [a, b] {
        let setup = rasterizer.setup(&tri, W, H).unwrap();
        rasterizer.fill(&setup, &|_: &Fragment| 1u32, &mut pixels, &mut depth);
    }

    // every pixel centre strictly inside the quad is covered by one of the halves
    let v = quad.map(|(x, y)| Vector2::new(x, y));
    for y in 0..H {
        for x in 0..W {
            let p = Vector2::new(x as f32 + 0.5, y as f32 + 0.5);
            let inside = (0..4).all(|i| edge_function(v[i], v[(i + 1) % 4], p) > 1e-2);
            if inside {
                assert_eq!(data[y * W + x], 1, "gap at ({x}, {y})");
            }
        }
    }
}

use nalgebra::{Point3, Vector2, Vector3};
use soft_rasterizer::core::framebuffer::PixelBuffer;
use soft_rasterizer::core::geometry::{
    CameraAttribute, ColorAttribute, ProjectedMesh, Triangle, VertexAttribute,
};
use soft_rasterizer::core::math::interpolation::{EdgeWeights, interpolate_inverse_depth};
use soft_rasterizer::core::math::transform::Projection;
use soft_rasterizer::core::pipeline::Fragment;
use soft_rasterizer::core::rasterizer::Rasterizer;
use soft_rasterizer::pipeline::renderer::update_and_render;
use soft_rasterizer::pipeline::shader::SurfaceShader;
use soft_rasterizer::scene::camera::Camera;
use soft_rasterizer::scene::context::{RenderSettings, RendererContext};
use soft_rasterizer::scene::mesh::GeometryStore;
use soft_rasterizer::scene::texture::TextureAtlas;
use soft_rasterizer::ui::input::FrameInput;
use std::f32::consts::PI;

const SIZE: usize = 800;
const NEAR_DEPTH: f32 = 2.0;
const LENGTH: f32 = 4.0;

/// Quad hinged on its near edge (y = -1, depth 2), tilted away from the
/// camera by `tilt` radians. `v` runs from 0 at the near edge to 1 at the far edge.
struct TiltedQuad {
    mesh: ProjectedMesh,
    projection: Projection,
    far_depth: f32,
}

/// Corners in order near-left, near-right, far-right, far-left, split into two
/// front-facing triangles.
const TRIANGLES: [Triangle; 2] = [[0, 3, 2], [0, 2, 1]];

impl TiltedQuad {
    fn new(tilt: f32) -> Self {
        let projection = Projection::new(0.1, PI / 5.0, SIZE, SIZE);
        let far_y = -1.0 + LENGTH * tilt.cos();
        let far_depth = NEAR_DEPTH + LENGTH * tilt.sin();
        let camera = vec![
            Vector3::new(-1.0, -1.0, -NEAR_DEPTH),
            Vector3::new(1.0, -1.0, -NEAR_DEPTH),
            Vector3::new(1.0, far_y, -far_depth),
            Vector3::new(-1.0, far_y, -far_depth),
        ];
        let uvs = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        let normal = (camera[1] - camera[0]).cross(&(camera[3] - camera[0])).normalize();
        let raster = camera.iter().map(|p| projection.to_raster(p)).collect();
        let attributes = uvs
            .iter()
            .map(|&(u, v)| CameraAttribute {
                normal,
                color: ColorAttribute::texture(0, u, v),
            })
            .collect();
        Self {
            mesh: ProjectedMesh {
                camera,
                raster,
                attributes,
            },
            projection,
            far_depth,
        }
    }

    /// Raster position halfway between the projected near and far edge centres.
    fn screen_midpoint(&self) -> Vector2<f32> {
        let near = self
            .projection
            .to_raster(&Vector3::new(0.0, -1.0, -NEAR_DEPTH));
        let far_point = (self.mesh.camera[2] + self.mesh.camera[3]) / 2.0;
        let far = self.projection.to_raster(&far_point);
        (near.xy() + far.xy()) / 2.0
    }

    /// Interpolated UV at a raster position, evaluated through one triangle.
    fn uv_at(&self, triangle: Triangle, at: Vector2<f32>) -> Vector2<f32> {
        let raster = triangle.map(|v| self.mesh.raster[v]);
        let setup = Rasterizer::default().setup(&raster, SIZE, SIZE).unwrap();
        let atlas = TextureAtlas::default();
        let shader =
            SurfaceShader::new(&self.mesh, &atlas, &setup, 0, triangle, triangle).unwrap();

        let xy = raster.map(|r| r.xy());
        let weights = EdgeWeights::new(xy, 1.0 / setup.area, at).origin;
        let inv_z = interpolate_inverse_depth(weights, setup.inv_depths).unwrap();
        let fragment = Fragment {
            x: at.x as usize,
            y: at.y as usize,
            weights,
            z: 1.0 / inv_z,
            inv_z,
        };
        shader.uv(&fragment).unwrap()
    }
}

#[test]
fn both_halves_of_the_quad_agree() {
    let quad = TiltedQuad::new(PI / 3.0);
    let at = quad.screen_midpoint() + Vector2::new(7.0, 0.0);
    let a = quad.uv_at(TRIANGLES[0], at);
    let b = quad.uv_at(TRIANGLES[1], at);
    assert!((a - b).norm() < 1e-3, "{a:?} vs {b:?}");
}

#[test]
fn uv_follows_inverse_depth_weighting() {
    for degrees in [0.0f32, 30.0, 60.0, 80.0] {
        let quad = TiltedQuad::new(degrees.to_radians());
        let v = quad.uv_at(TRIANGLES[0], quad.screen_midpoint()).y;
        // halfway on screen between depths d0 and d1 lies at v = d0 / (d0 + d1)
        let expected = NEAR_DEPTH / (NEAR_DEPTH + quad.far_depth);
        assert!(
            (v - expected).abs() < 1e-3,
            "tilt {degrees}: v = {v}, expected {expected}"
        );
    }
}

#[test]
fn deviation_from_screen_linear_grows_with_tilt() {
    let deviation = |degrees: f32| {
        let quad = TiltedQuad::new(degrees.to_radians());
        // screen-linear interpolation would give exactly 0.5 here
        (quad.uv_at(TRIANGLES[0], quad.screen_midpoint()).y - 0.5).abs()
    };
    let flat = deviation(0.0);
    let mild = deviation(20.0);
    let steep = deviation(70.0);
    assert!(flat < 1e-3, "fronto-parallel quad deviates by {flat}");
    assert!(mild > flat && steep > mild, "{flat} {mild} {steep}");
    assert!(steep > 0.2, "steep tilt deviates by only {steep}");
}

#[test]
fn rendered_texture_bands_compress_with_distance() {
    // floor quad with two texture stripes along v; the near stripe covers
    // far more rows than the far one
    let mut atlas = TextureAtlas::default();
    let white = 0x00ff_ffff;
    atlas.push_tile(|_, y| if y < 256 { white } else { 0 });

    let mut geometry = GeometryStore::default();
    let p = [
        Point3::new(-1.0, -0.5, -2.0),
        Point3::new(1.0, -0.5, -2.0),
        Point3::new(1.0, -0.5, -6.0),
        Point3::new(-1.0, -0.5, -6.0),
    ];
    let uv = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
    let corner =
        |i: usize| VertexAttribute::new(Vector3::y(), ColorAttribute::texture(0, uv[i].0, uv[i].1));
    for t in TRIANGLES {
        geometry.push_triangle(t.map(|i| p[i]), t.map(corner));
    }
    let settings = RenderSettings {
        background: 0x0000_00ff,
        ..RenderSettings::default()
    };
    let mut ctx = RendererContext::new(
        geometry,
        atlas,
        Camera::new(Point3::origin(), 0.1, 0.1),
        settings,
    )
    .unwrap();
    let (w, h) = (200, 300);
    let mut data = vec![0u32; w * h];
    let mut pixels = PixelBuffer::new(&mut data, w, h).unwrap();
    update_and_render(&mut ctx, &mut pixels, &FrameInput::default()).unwrap();

    let column = (0..h).map(|y| data[y * w + w / 2]);
    let (mut lit, mut dark) = (0, 0);
    for c in column {
        match c {
            0x0000_00ff => {}
            c if c & 0x00ff_0000 != 0 => lit += 1,
            _ => dark += 1,
        }
    }
    // screen-linear mapping would split the column evenly
    assert!(lit > 2 * dark, "{lit} lit rows vs {dark} dark rows");
    assert!(dark > 0);
}

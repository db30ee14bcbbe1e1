use crate::core::color::{pack_color, unpack_rgb};
use crate::core::error::RasterError;
use crate::core::geometry::{ColorAttribute, ProjectedMesh, Triangle};
use crate::core::math::interpolation::perspective_interpolate;
use crate::core::pipeline::{Fragment, FragmentShader};
use crate::core::rasterizer::TriangleSetup;
use crate::scene::texture::{TEXTURE_SIZE, TextureAtlas};
use nalgebra::{Vector2, Vector3};

/// Texture lookup data for one triangle.
struct TexturedSurface<'a> {
    atlas: &'a TextureAtlas,
    index: u32,
    /// UVs divided by vertex depth.
    uvs: [Vector2<f32>; 3],
    /// Change of the pre-divided UV and of `1/z` for one pixel step right.
    tpp_x: Vector2<f32>,
    dz_x: f32,
    /// Same for one row down.
    tpp_y: Vector2<f32>,
    dz_y: f32,
}

enum Surface<'a> {
    /// Vertex colors divided by vertex depth.
    Color([Vector3<f32>; 3]),
    Texture(TexturedSurface<'a>),
}

/// Half-vector shader for one triangle.
///
/// The view direction doubles as the light direction, so there is no light
/// source: `shade = clamp(dot(normalize(v + n), n), 0, 1)` with `v` pointing
/// from the surface to the camera. All per-vertex data is divided by depth up
/// front so the fragment only needs one multiply by `z`.
pub struct SurfaceShader<'a> {
    points: [Vector3<f32>; 3],
    normals: [Vector3<f32>; 3],
    surface: Surface<'a>,
}

impl<'a> SurfaceShader<'a> {
    /// Fails when the corners mix solid color and texture attributes, or name
    /// different texture tiles.
    pub fn new(
        mesh: &ProjectedMesh,
        atlas: &'a TextureAtlas,
        setup: &TriangleSetup,
        triangle: usize,
        vertices: Triangle,
        attributes: Triangle,
    ) -> Result<Self, RasterError> {
        let inv = setup.inv_depths;
        let points = [0, 1, 2].map(|i| mesh.camera[vertices[i]] * inv[i]);
        let normals = [0, 1, 2].map(|i| mesh.attributes[attributes[i]].normal * inv[i]);
        let colors = attributes.map(|a| mesh.attributes[a].color);
        for other in &colors[1..] {
            if !colors[0].compatible(other) {
                return Err(colors[0].mismatch(other, triangle));
            }
        }

        let surface = match colors {
            [
                ColorAttribute::Color(c0),
                ColorAttribute::Color(c1),
                ColorAttribute::Color(c2),
            ] => Surface::Color([c0 * inv[0], c1 * inv[1], c2 * inv[2]]),
            [
                ColorAttribute::Texture(t0),
                ColorAttribute::Texture(t1),
                ColorAttribute::Texture(t2),
            ] => {
                let uvs = [t0.mapping * inv[0], t1.mapping * inv[1], t2.mapping * inv[2]];
                let dx = setup.weights.dx;
                let dy = setup.weights.dy;
                Surface::Texture(TexturedSurface {
                    atlas,
                    index: t0.index,
                    uvs,
                    tpp_x: uvs[0] * dx.x + uvs[1] * dx.y + uvs[2] * dx.z,
                    dz_x: inv.dot(&dx),
                    tpp_y: uvs[0] * dy.x + uvs[1] * dy.y + uvs[2] * dy.z,
                    dz_y: inv.dot(&dy),
                })
            }
            _ => return Err(RasterError::MixedColorAttributes { triangle }),
        };

        Ok(Self {
            points,
            normals,
            surface,
        })
    }

    /// Perspective-correct texture coordinate of a fragment, if textured.
    pub fn uv(&self, fragment: &Fragment) -> Option<Vector2<f32>> {
        match &self.surface {
            Surface::Texture(t) => Some(t.uv(fragment)),
            Surface::Color(_) => None,
        }
    }

    /// Texels covered by the fragment along u and v, if textured.
    pub fn footprint(&self, fragment: &Fragment) -> Option<Vector2<f32>> {
        match &self.surface {
            Surface::Texture(t) => Some(t.footprint(t.uv(fragment), fragment.z)),
            Surface::Color(_) => None,
        }
    }
}

impl TexturedSurface<'_> {
    fn uv(&self, fragment: &Fragment) -> Vector2<f32> {
        perspective_interpolate(&self.uvs, fragment.weights, fragment.z)
    }

    /// `d(uv)/dx = (tpp - uv * dz) * z`, per screen axis; the larger of the
    /// two screen axes wins for each texture axis.
    fn footprint(&self, uv: Vector2<f32>, z: f32) -> Vector2<f32> {
        let ddx = (self.tpp_x - uv * self.dz_x) * z;
        let ddy = (self.tpp_y - uv * self.dz_y) * z;
        ddx.abs().sup(&ddy.abs()) * TEXTURE_SIZE as f32
    }

    fn color(&self, fragment: &Fragment) -> Vector3<f32> {
        let uv = self.uv(fragment);
        let footprint = self.footprint(uv, fragment.z);
        unpack_rgb(self.atlas.sample(self.index, uv, footprint))
    }
}

impl FragmentShader for SurfaceShader<'_> {
    fn fragment(&self, fragment: &Fragment) -> u32 {
        let w = fragment.weights;
        let z = fragment.z;
        let base = match &self.surface {
            Surface::Color(colors) => perspective_interpolate(colors, w, z),
            Surface::Texture(t) => t.color(fragment),
        };

        let point = perspective_interpolate(&self.points, w, z);
        let normal = perspective_interpolate(&self.normals, w, z);
        let shade = match (
            normal.try_normalize(f32::EPSILON),
            (-point).try_normalize(f32::EPSILON),
        ) {
            (Some(n), Some(view)) => (view + n)
                .try_normalize(f32::EPSILON)
                .map_or(0.0, |h| h.dot(&n).clamp(0.0, 1.0)),
            _ => 0.0,
        };
        pack_color(base * shade)
    }
}

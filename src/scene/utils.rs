use crate::core::color::pack_rgb;
use crate::core::geometry::{ColorAttribute, VertexAttribute};
use crate::scene::mesh::GeometryStore;
use crate::scene::texture::{TextureAtlas, checkerboard, rings};
use log::info;
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;
use std::str::FromStr;

/// Built-in scenes used when no scene file is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demo {
    /// Textured triangle, textured floor running past the camera, and a few solids.
    Showcase,
    /// One textured triangle at z = -5.
    Triangle,
    Tetrahedra,
    Icosahedra,
}

impl FromStr for Demo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "showcase" => Ok(Demo::Showcase),
            "triangle" => Ok(Demo::Triangle),
            "tetrahedra" | "tetrahedron" => Ok(Demo::Tetrahedra),
            "icosahedra" | "icosahedron" => Ok(Demo::Icosahedra),
            other => Err(format!(
                "Unknown demo scene '{other}' (expected showcase, triangle, tetrahedra or icosahedra)"
            )),
        }
    }
}

const RINGS_TILE: u32 = 0;
const CHECKER_TILE: u32 = 1;

const SOLID_RADIUS: f32 = 2.0;
const SOLID_DEPTH: f32 = -50.0;

fn orange() -> ColorAttribute {
    ColorAttribute::rgb(255.0, 127.5, 0.0)
}
fn red() -> ColorAttribute {
    ColorAttribute::rgb(255.0, 0.0, 0.0)
}
fn blue() -> ColorAttribute {
    ColorAttribute::rgb(0.0, 0.0, 255.0)
}

/// Builds a demo scene. Solids are oriented by an RNG seeded with `seed`, so
/// the same seed always yields the same geometry.
pub fn build_demo(demo: Demo, seed: u64) -> (GeometryStore, TextureAtlas) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut geometry = GeometryStore::default();

    match demo {
        Demo::Triangle => add_triangle(&mut geometry, RINGS_TILE),
        Demo::Tetrahedra => {
            for x in [-3.0, 3.0] {
                add_tetrahedron(&mut geometry, &mut rng, Point3::new(x, 0.0, SOLID_DEPTH));
            }
        }
        Demo::Icosahedra => {
            for x in [-3.0, 3.0] {
                add_icosahedron(&mut geometry, &mut rng, Point3::new(x, 0.0, SOLID_DEPTH));
            }
        }
        Demo::Showcase => {
            add_triangle(&mut geometry, RINGS_TILE);
            add_floor(&mut geometry, CHECKER_TILE, -1.5);
            add_tetrahedron(&mut geometry, &mut rng, Point3::new(-6.0, 1.0, SOLID_DEPTH));
            add_icosahedron(&mut geometry, &mut rng, Point3::new(6.0, 1.0, SOLID_DEPTH));
            add_icosahedron(&mut geometry, &mut rng, Point3::new(0.0, 3.0, -20.0));
        }
    }

    info!(
        "Built {:?} demo: {} vertices, {} triangles",
        demo,
        geometry.vertices().len(),
        geometry.triangle_count()
    );
    (geometry, demo_atlas())
}

/// Two procedural tiles: gradient rings (0) and a checkerboard (1).
pub fn demo_atlas() -> TextureAtlas {
    let mut atlas = TextureAtlas::default();
    atlas.push_tile(rings(24.0));
    atlas.push_tile(checkerboard(32, pack_rgb(230, 230, 230), pack_rgb(40, 90, 160)));
    atlas
}

/// Face normal in the winding used throughout the demos.
fn face_normal(v: &[Point3<f32>], a: usize, b: usize, c: usize) -> Vector3<f32> {
    (v[c] - v[a]).cross(&(v[b] - v[a]))
}

/// Adds faces over `vertices`, each with a flat normal and per-corner colors.
fn add_faces(geometry: &mut GeometryStore, v: &[Point3<f32>], faces: &[([usize; 3], [ColorAttribute; 3])]) {
    let first = geometry.push_vertices(v);
    for &([a, b, c], colors) in faces {
        let n = face_normal(v, a, b, c);
        geometry.push_face(
            [first + a, first + b, first + c],
            colors.map(|color| VertexAttribute::new(n, color)),
        );
    }
}

/// Equilateral triangle of unit circumradius facing the camera at z = -5.
pub fn add_triangle(geometry: &mut GeometryStore, texture: u32) {
    let h = 3.0f32.sqrt() / 2.0;
    let v = [
        Point3::new(-h, -0.5, -5.0),
        Point3::new(0.0, 1.0, -5.0),
        Point3::new(h, -0.5, -5.0),
    ];
    let n = face_normal(&v, 0, 1, 2);
    geometry.push_triangle(
        v,
        [
            VertexAttribute::new(n, ColorAttribute::texture(texture, 0.0, h)),
            VertexAttribute::new(n, ColorAttribute::texture(texture, 0.5, 0.0)),
            VertexAttribute::new(n, ColorAttribute::texture(texture, 1.0, h)),
        ],
    );
}

/// Horizontal textured quad at height `y`, from behind the camera to far ahead.
///
/// Its near edge lies behind the near plane, so it is always clipped; the
/// far end shrinks to a few pixels and samples coarse mip levels.
pub fn add_floor(geometry: &mut GeometryStore, texture: u32, y: f32) {
    let v = [
        Point3::new(-6.0, y, 5.0),
        Point3::new(6.0, y, 5.0),
        Point3::new(6.0, y, -60.0),
        Point3::new(-6.0, y, -60.0),
    ];
    // one texture repeat per 4 units
    let uv = |p: &Point3<f32>| ColorAttribute::texture(texture, (p.x + 6.0) / 4.0, (5.0 - p.z) / 4.0);
    let faces = [
        ([0, 3, 2], [uv(&v[0]), uv(&v[3]), uv(&v[2])]),
        ([0, 2, 1], [uv(&v[0]), uv(&v[2]), uv(&v[1])]),
    ];
    add_faces(geometry, &v, &faces);
}

/// Regular tetrahedron of circumradius 2, randomly oriented around `center`.
pub fn add_tetrahedron<R: Rng>(geometry: &mut GeometryStore, rng: &mut R, center: Point3<f32>) {
    let (x, y, z) = random_unit_axes(rng);
    let k1 = (8.0f32 / 9.0).sqrt();
    let k2 = (2.0f32 / 9.0).sqrt();
    let k3 = (2.0f32 / 3.0).sqrt();
    let v = [
        z,
        k1 * x - z / 3.0,
        -k2 * x + k3 * y - z / 3.0,
        -k2 * x - k3 * y - z / 3.0,
    ]
    .map(|p| center + SOLID_RADIUS * p);

    let (o, r, b) = (orange(), red(), blue());
    let faces = [
        ([0, 2, 1], [o, o, o]),
        ([0, 3, 2], [r, o, o]),
        ([0, 1, 3], [o, o, b]),
        ([1, 2, 3], [o, o, o]),
    ];
    add_faces(geometry, &v, &faces);
}

/// Regular icosahedron of circumradius 2, randomly oriented around `center`.
pub fn add_icosahedron<R: Rng>(geometry: &mut GeometryStore, rng: &mut R, center: Point3<f32>) {
    let (x, y, z) = random_unit_axes(rng);
    let phi = (5.0f32.sqrt() + 1.0) / 2.0;
    let l = 1.0 / (phi + 2.0).sqrt();
    let k = phi * l;
    let v = [
        k * x + l * y,
        k * x - l * y,
        -k * x + l * y,
        -k * x - l * y,
        l * x + k * z,
        -l * x + k * z,
        l * x - k * z,
        -l * x - k * z,
        k * y + l * z,
        k * y - l * z,
        -k * y + l * z,
        -k * y - l * z,
    ]
    .map(|p| center + SOLID_RADIUS * p);

    let (o, r, b) = (orange(), red(), blue());
    let plain = [o, o, o];
    let faces = [
        ([0, 1, 4], plain),
        ([4, 8, 0], plain),
        ([0, 8, 9], plain),
        ([9, 6, 0], [r, o, o]),
        ([0, 6, 1], plain),
        ([1, 10, 4], plain),
        ([4, 10, 5], plain),
        ([5, 8, 4], plain),
        ([5, 2, 8], [b, o, r]),
        ([8, 2, 9], plain),
        ([9, 2, 7], plain),
        ([7, 6, 9], plain),
        ([7, 11, 6], plain),
        ([6, 11, 1], plain),
        ([1, 11, 10], plain),
        ([3, 5, 10], [r, o, o]),
        ([10, 11, 3], plain),
        ([3, 11, 7], plain),
        ([7, 2, 3], plain),
        ([3, 2, 5], plain),
    ];
    add_faces(geometry, &v, &faces);
}

/// Uniformly distributed point on the unit sphere.
fn random_unit_sphere_point<R: Rng>(rng: &mut R) -> Vector3<f32> {
    let cz: f32 = rng.random_range(-1.0..=1.0);
    let angle: f32 = rng.random_range(0.0..2.0 * PI);
    let r = (1.0 - cz * cz).max(0.0).sqrt();
    Vector3::new(angle.cos() * r, angle.sin() * r, cz)
}

/// Random right-handed orthonormal basis.
fn random_unit_axes<R: Rng>(rng: &mut R) -> (Vector3<f32>, Vector3<f32>, Vector3<f32>) {
    let x = random_unit_sphere_point(rng);
    loop {
        let q = random_unit_sphere_point(rng);
        if let Some(y) = x.cross(&q).try_normalize(1e-3) {
            let z = x.cross(&y);
            return (x, y, z);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_names_parse() {
        assert_eq!("Showcase".parse::<Demo>(), Ok(Demo::Showcase));
        assert_eq!("icosahedron".parse::<Demo>(), Ok(Demo::Icosahedra));
        assert!("teapot".parse::<Demo>().is_err());
    }

    #[test]
    fn demos_are_valid_and_deterministic() {
        for demo in [Demo::Showcase, Demo::Triangle, Demo::Tetrahedra, Demo::Icosahedra] {
            let (geometry, atlas) = build_demo(demo, 3);
            geometry.validate().unwrap();
            geometry.validate_textures(&atlas).unwrap();
            let (again, _) = build_demo(demo, 3);
            assert_eq!(geometry.vertices(), again.vertices(), "{demo:?}");
        }
    }

    #[test]
    fn solids_have_expected_sizes() {
        let (tetra, _) = build_demo(Demo::Tetrahedra, 1);
        assert_eq!(tetra.triangle_count(), 8);
        assert_eq!(tetra.vertices().len(), 8);
        let (ico, _) = build_demo(Demo::Icosahedra, 1);
        assert_eq!(ico.triangle_count(), 40);
        assert_eq!(ico.vertices().len(), 24);
    }

    #[test]
    fn solid_normals_point_outwards() {
        let mut geometry = GeometryStore::default();
        let mut rng = StdRng::seed_from_u64(11);
        let center = Point3::new(0.0, 0.0, -50.0);
        add_icosahedron(&mut geometry, &mut rng, center);
        add_tetrahedron(&mut geometry, &mut rng, center);
        for (v, a) in geometry.vertex_indices().iter().zip(geometry.attribute_indices()) {
            let centroid = (geometry.vertices()[v[0]] + geometry.vertices()[v[1]] + geometry.vertices()[v[2]]).xyz() / 3.0;
            let outwards = centroid - center.coords;
            let n = geometry.attributes()[a[0]].normal.xyz();
            assert!(n.dot(&outwards) > 0.0, "face {v:?} faces inwards");
        }
    }

    #[test]
    fn vertices_lie_on_the_circumsphere() {
        let mut geometry = GeometryStore::default();
        let mut rng = StdRng::seed_from_u64(5);
        let center = Point3::new(1.0, 2.0, -50.0);
        add_icosahedron(&mut geometry, &mut rng, center);
        for v in geometry.vertices() {
            let r = (v.xyz() - center.coords).norm();
            assert!((r - SOLID_RADIUS).abs() < 1e-4, "radius {r}");
        }
    }

    #[test]
    fn demo_triangle_faces_the_camera() {
        let mut geometry = GeometryStore::default();
        add_triangle(&mut geometry, 0);
        let n = geometry.attributes()[0].normal.xyz();
        assert!(n.z > 0.0);
    }
}

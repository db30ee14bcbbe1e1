use crate::core::error::RasterError;
use crate::core::geometry::{ProjectedMesh, Triangle};
use crate::core::math::transform::Projection;
use log::warn;

/// Where a triangle lies relative to the near plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NearPlane {
    /// Every vertex is at or beyond the near plane.
    InFront,
    /// Vertices on both sides; the triangle must be clipped.
    Straddling,
    /// Nothing lies beyond the near plane.
    Behind,
}

/// Classifies a triangle by its three raster depths.
pub fn classify(depths: [f32; 3], near: f32) -> NearPlane {
    let min = depths[0].min(depths[1]).min(depths[2]);
    let max = depths[0].max(depths[1]).max(depths[2]);
    if min >= near {
        NearPlane::InFront
    } else if max <= near {
        NearPlane::Behind
    } else {
        NearPlane::Straddling
    }
}

/// Scratch index storage for triangles produced by clipping.
///
/// Generated vertices and attributes are appended to the [`ProjectedMesh`]
/// after the static geometry; the triangles that use them live here. Capacity
/// is reserved once for twice the scene's triangle count, since each clipped
/// triangle yields at most two. [`reset`](Self::reset) starts a new frame.
#[derive(Debug, Clone, Default)]
pub struct ClipArena {
    vertex_indices: Vec<Triangle>,
    attribute_indices: Vec<Triangle>,
    generation: u64,
}

impl ClipArena {
    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            vertex_indices: Vec::with_capacity(2 * triangles),
            attribute_indices: Vec::with_capacity(2 * triangles),
            generation: 0,
        }
    }

    /// Drops last frame's triangles and advances the generation counter.
    pub fn reset(&mut self) {
        self.vertex_indices.clear();
        self.attribute_indices.clear();
        self.generation += 1;
    }

    /// Number of resets so far; equals the frame number while rendering.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.vertex_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_indices.is_empty()
    }

    pub fn vertex_indices(&self) -> &[Triangle] {
        &self.vertex_indices
    }

    pub fn attribute_indices(&self) -> &[Triangle] {
        &self.attribute_indices
    }

    fn push(&mut self, vertices: Triangle, attributes: Triangle) {
        self.vertex_indices.push(vertices);
        self.attribute_indices.push(attributes);
    }
}

/// Clips one triangle against the near plane (`depth >= near` is kept).
///
/// Edge intersections are interpolated in camera space, projected onto the
/// near plane and appended to `mesh`. The visible polygon is emitted into
/// `arena` as one triangle (one vertex in front) or a two-triangle fan (two
/// vertices in front), keeping the original winding. Returns how many
/// triangles were emitted.
///
/// `triangle` is only used to name the offender when the corners mix solid
/// color and texture attributes.
pub fn clip_triangle(
    projection: &Projection,
    mesh: &mut ProjectedMesh,
    arena: &mut ClipArena,
    triangle: usize,
    vertices: Triangle,
    attributes: Triangle,
) -> Result<usize, RasterError> {
    let near = projection.near;
    // (vertex index, attribute index) around the visible polygon
    let mut polygon = [(0usize, 0usize); 4];
    let mut len = 0;

    for i in 0..3 {
        let j = (i + 1) % 3;
        let (va, aa) = (vertices[i], attributes[i]);
        let (vb, ab) = (vertices[j], attributes[j]);
        let za = mesh.raster[va].z;
        let zb = mesh.raster[vb].z;
        let a_inside = za >= near;
        let b_inside = zb >= near;

        if a_inside {
            polygon[len] = (va, aa);
            len += 1;
        }
        if a_inside == b_inside {
            continue;
        }

        let t = (near - za) / (zb - za);
        if !t.is_finite() {
            warn!("Skipping degenerate near-plane edge in triangle {triangle}");
            continue;
        }
        // the intersection coincides with an endpoint that is already kept
        if t <= 0.0 || t >= 1.0 {
            continue;
        }

        let pa = mesh.camera[va];
        let pb = mesh.camera[vb];
        let camera = pa + (pb - pa) * t;
        let (a, b) = (&mesh.attributes[aa], &mesh.attributes[ab]);
        let attribute = a
            .lerp(b, t)
            .ok_or_else(|| a.color.mismatch(&b.color, triangle))?;
        let raster = projection.to_raster_on_near_plane(&camera);
        polygon[len] = mesh.push(camera, raster, attribute);
        len += 1;
    }

    let emitted = match len {
        3 => {
            let [p0, p1, p2, _] = polygon;
            arena.push([p0.0, p1.0, p2.0], [p0.1, p1.1, p2.1]);
            1
        }
        4 => {
            let [p0, p1, p2, p3] = polygon;
            arena.push([p0.0, p1.0, p2.0], [p0.1, p1.1, p2.1]);
            arena.push([p0.0, p2.0, p3.0], [p0.1, p2.1, p3.1]);
            2
        }
        _ => 0,
    };
    Ok(emitted)
}

use crate::core::error::RasterError;
use crate::core::geometry::{ColorAttribute, Triangle, VertexAttribute};
use crate::scene::texture::TextureAtlas;
use nalgebra::{Point3, Vector4};

/// Flat geometry arrays for a whole scene.
///
/// Positions and shading attributes are indexed separately, so a shared vertex
/// can carry a different normal or UV on every face that uses it. Triangle `i`
/// uses `vertex_indices[i]` for positions and `attribute_indices[i]` for attributes.
#[derive(Debug, Clone, Default)]
pub struct GeometryStore {
    vertices: Vec<Vector4<f32>>,
    vertex_indices: Vec<Triangle>,
    attributes: Vec<VertexAttribute>,
    attribute_indices: Vec<Triangle>,
}

impl GeometryStore {
    /// Builds a store from flat index arrays and validates it.
    pub fn from_flat(
        vertices: Vec<Vector4<f32>>,
        vertex_indices: &[usize],
        attributes: Vec<VertexAttribute>,
        attribute_indices: &[usize],
    ) -> Result<Self, RasterError> {
        if vertex_indices.len() != attribute_indices.len() {
            return Err(RasterError::IndexCountMismatch {
                vertex_indices: vertex_indices.len(),
                attribute_indices: attribute_indices.len(),
            });
        }
        let store = Self {
            vertices,
            vertex_indices: to_triangles("vertex", vertex_indices)?,
            attributes,
            attribute_indices: to_triangles("attribute", attribute_indices)?,
        };
        store.validate()?;
        Ok(store)
    }

    /// Checks index bounds and that each triangle's corners share one color
    /// variant and, when textured, one tile.
    pub fn validate(&self) -> Result<(), RasterError> {
        if self.vertex_indices.len() != self.attribute_indices.len() {
            return Err(RasterError::IndexCountMismatch {
                vertex_indices: self.vertex_indices.len() * 3,
                attribute_indices: self.attribute_indices.len() * 3,
            });
        }
        check_bounds("vertex", &self.vertex_indices, self.vertices.len())?;
        check_bounds("attribute", &self.attribute_indices, self.attributes.len())?;

        for (triangle, [a, b, c]) in self.attribute_indices.iter().enumerate() {
            let first = &self.attributes[*a].color;
            for other in [&self.attributes[*b].color, &self.attributes[*c].color] {
                if !first.compatible(other) {
                    return Err(first.mismatch(other, triangle));
                }
            }
        }
        Ok(())
    }

    /// Checks that every texture attribute names a tile present in `atlas`.
    pub fn validate_textures(&self, atlas: &TextureAtlas) -> Result<(), RasterError> {
        let tiles = atlas.tile_count();
        for (attribute, a) in self.attributes.iter().enumerate() {
            if let ColorAttribute::Texture(t) = a.color
                && t.index as usize >= tiles
            {
                return Err(RasterError::TextureOutOfBounds {
                    attribute,
                    index: t.index,
                    tiles,
                });
            }
        }
        Ok(())
    }

    pub fn vertices(&self) -> &[Vector4<f32>] {
        &self.vertices
    }

    pub fn vertex_indices(&self) -> &[Triangle] {
        &self.vertex_indices
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn attribute_indices(&self) -> &[Triangle] {
        &self.attribute_indices
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_indices.is_empty()
    }

    /// Appends a triangle with its own three vertices and attributes.
    ///
    /// Used by scene builders; call [`validate`](Self::validate) when done.
    pub fn push_triangle(&mut self, positions: [Point3<f32>; 3], attributes: [VertexAttribute; 3]) {
        let v = self.vertices.len();
        let a = self.attributes.len();
        self.vertices
            .extend(positions.iter().map(|p| p.to_homogeneous()));
        self.attributes.extend_from_slice(&attributes);
        self.vertex_indices.push([v, v + 1, v + 2]);
        self.attribute_indices.push([a, a + 1, a + 2]);
    }

    /// Appends shared vertices and returns the index of the first one.
    pub fn push_vertices(&mut self, positions: &[Point3<f32>]) -> usize {
        let first = self.vertices.len();
        self.vertices
            .extend(positions.iter().map(|p| p.to_homogeneous()));
        first
    }

    /// Appends a triangle over existing vertices with three fresh attributes.
    pub fn push_face(&mut self, vertices: Triangle, attributes: [VertexAttribute; 3]) {
        let a = self.attributes.len();
        self.attributes.extend_from_slice(&attributes);
        self.vertex_indices.push(vertices);
        self.attribute_indices.push([a, a + 1, a + 2]);
    }
}

fn to_triangles(kind: &'static str, flat: &[usize]) -> Result<Vec<Triangle>, RasterError> {
    if flat.len() % 3 != 0 {
        return Err(RasterError::NotTriangles {
            kind,
            len: flat.len(),
        });
    }
    Ok(flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
}

fn check_bounds(kind: &'static str, triangles: &[Triangle], len: usize) -> Result<(), RasterError> {
    match triangles.iter().flatten().find(|&&i| i >= len) {
        Some(&index) => Err(RasterError::IndexOutOfBounds { kind, index, len }),
        None => Ok(()),
    }
}

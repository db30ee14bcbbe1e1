use crate::core::error::RasterError;
use nalgebra::{Vector2, Vector3, Vector4};

/// A triple of indices into a vertex or attribute array.
pub type Triangle = [usize; 3];

/// Reference into the texture atlas: tile index plus the UV mapping of one corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureRef {
    pub index: u32,
    pub mapping: Vector2<f32>,
}

impl TextureRef {
    pub fn new(index: u32, u: f32, v: f32) -> Self {
        Self {
            index,
            mapping: Vector2::new(u, v),
        }
    }
}

/// Per-corner surface color: either a solid RGB color (channels in 0..=255)
/// or a texture lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorAttribute {
    Color(Vector3<f32>),
    Texture(TextureRef),
}

impl ColorAttribute {
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        ColorAttribute::Color(Vector3::new(r, g, b))
    }

    pub fn texture(index: u32, u: f32, v: f32) -> Self {
        ColorAttribute::Texture(TextureRef::new(index, u, v))
    }

    pub fn is_texture(&self) -> bool {
        matches!(self, ColorAttribute::Texture(_))
    }

    /// True when both attributes are the same variant.
    pub fn same_variant(&self, other: &Self) -> bool {
        self.is_texture() == other.is_texture()
    }

    /// True when both attributes can shade one surface: same variant and, for
    /// textures, the same atlas tile.
    pub fn compatible(&self, other: &Self) -> bool {
        match (self, other) {
            (ColorAttribute::Texture(a), ColorAttribute::Texture(b)) => a.index == b.index,
            _ => self.same_variant(other),
        }
    }

    /// The error reported for `triangle` when `self` and `other` are not
    /// [`compatible`](Self::compatible).
    pub fn mismatch(&self, other: &Self, triangle: usize) -> RasterError {
        if self.same_variant(other) {
            RasterError::MixedTextureTiles { triangle }
        } else {
            RasterError::MixedColorAttributes { triangle }
        }
    }

    /// Linear interpolation between two compatible attributes.
    ///
    /// Returns `None` when the variants or the texture tiles differ.
    pub fn lerp(&self, other: &Self, t: f32) -> Option<Self> {
        match (self, other) {
            (ColorAttribute::Color(a), ColorAttribute::Color(b)) => {
                Some(ColorAttribute::Color(a + (b - a) * t))
            }
            (ColorAttribute::Texture(a), ColorAttribute::Texture(b)) if a.index == b.index => {
                Some(ColorAttribute::Texture(TextureRef {
                    index: a.index,
                    mapping: a.mapping + (b.mapping - a.mapping) * t,
                }))
            }
            _ => None,
        }
    }
}

/// Shading data for one triangle corner as stored in the geometry store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexAttribute {
    /// Object-space normal, homogeneous with w = 0.
    pub normal: Vector4<f32>,
    pub color: ColorAttribute,
}

impl VertexAttribute {
    pub fn new(normal: Vector3<f32>, color: ColorAttribute) -> Self {
        Self {
            normal: normal.push(0.0),
            color,
        }
    }
}

/// A vertex attribute after the transform stage: the normal is in camera space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraAttribute {
    pub normal: Vector3<f32>,
    pub color: ColorAttribute,
}

impl CameraAttribute {
    /// Interpolates normal and color towards `other`.
    /// Returns `None` when the colors are not compatible.
    pub fn lerp(&self, other: &Self, t: f32) -> Option<Self> {
        Some(Self {
            normal: self.normal + (other.normal - self.normal) * t,
            color: self.color.lerp(&other.color, t)?,
        })
    }
}

/// Per-frame output of the transform stage.
///
/// The first entries mirror the geometry store one to one; the clipper appends
/// near-plane intersections after them.
#[derive(Debug, Clone, Default)]
pub struct ProjectedMesh {
    pub camera: Vec<Vector3<f32>>,
    /// Raster x, y and positive depth.
    pub raster: Vec<Vector3<f32>>,
    pub attributes: Vec<CameraAttribute>,
}

impl ProjectedMesh {
    /// Appends a clip-generated vertex with its attribute; returns both indices.
    pub fn push(
        &mut self,
        camera: Vector3<f32>,
        raster: Vector3<f32>,
        attribute: CameraAttribute,
    ) -> (usize, usize) {
        self.camera.push(camera);
        self.raster.push(raster);
        self.attributes.push(attribute);
        (self.camera.len() - 1, self.attributes.len() - 1)
    }
}

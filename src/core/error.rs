use std::fmt;

/// Errors raised while loading, validating or rendering a scene.
///
/// Degenerate or off-screen triangles are never errors; they are skipped by the rasterizer.
#[derive(Debug)]
pub enum RasterError {
    /// The scene file could not be opened or read.
    Io(std::io::Error),
    /// The scene file ended before a section was complete.
    Truncated {
        section: &'static str,
        needed: usize,
        available: usize,
    },
    /// An attribute record carried an unknown color/texture tag.
    InvalidDiscriminant { attribute: usize, value: u32 },
    /// The texel block is not a whole number of 512x512 tiles.
    TexelCount(usize),
    /// Vertex-index and attribute-index arrays describe a different number of corners.
    IndexCountMismatch { vertex_indices: usize, attribute_indices: usize },
    /// An index array length is not a multiple of 3.
    NotTriangles { kind: &'static str, len: usize },
    /// An index points outside the array it addresses.
    IndexOutOfBounds {
        kind: &'static str,
        index: usize,
        len: usize,
    },
    /// A texture attribute references a tile the atlas does not contain.
    TextureOutOfBounds {
        attribute: usize,
        index: u32,
        tiles: usize,
    },
    /// A triangle mixes solid-color and textured corners.
    MixedColorAttributes { triangle: usize },
    /// A textured triangle names more than one atlas tile.
    MixedTextureTiles { triangle: usize },
    /// The output pixel slice is smaller than `width * height`.
    PixelBufferSize { expected: usize, actual: usize },
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterError::Io(e) => write!(f, "failed to read scene: {e}"),
            RasterError::Truncated {
                section,
                needed,
                available,
            } => write!(
                f,
                "scene truncated in {section} block: needed {needed} bytes, {available} available"
            ),
            RasterError::InvalidDiscriminant { attribute, value } => {
                write!(f, "attribute {attribute} has unknown color tag {value}")
            }
            RasterError::TexelCount(n) => {
                write!(f, "texel count {n} is not a multiple of 512x512")
            }
            RasterError::IndexCountMismatch {
                vertex_indices,
                attribute_indices,
            } => write!(
                f,
                "{vertex_indices} vertex indices but {attribute_indices} attribute indices"
            ),
            RasterError::NotTriangles { kind, len } => {
                write!(f, "{kind} index count {len} is not a multiple of 3")
            }
            RasterError::IndexOutOfBounds { kind, index, len } => {
                write!(f, "{kind} index {index} out of bounds (len {len})")
            }
            RasterError::TextureOutOfBounds {
                attribute,
                index,
                tiles,
            } => write!(
                f,
                "attribute {attribute} references texture {index} but the atlas holds {tiles}"
            ),
            RasterError::MixedColorAttributes { triangle } => {
                write!(f, "triangle {triangle} mixes color and texture attributes")
            }
            RasterError::MixedTextureTiles { triangle } => {
                write!(f, "triangle {triangle} samples more than one texture tile")
            }
            RasterError::PixelBufferSize { expected, actual } => {
                write!(f, "pixel buffer holds {actual} pixels, {expected} required")
            }
        }
    }
}

impl std::error::Error for RasterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RasterError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RasterError {
    fn from(e: std::io::Error) -> Self {
        RasterError::Io(e)
    }
}

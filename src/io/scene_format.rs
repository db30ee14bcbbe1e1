//! Binary scene files.
//!
//! Five blocks in order: vertices, vertex indices, attributes, attribute
//! indices, texels. Each starts with a 16-byte header (`u64` count, 8 zero
//! bytes). Everything is little-endian.
//!
//! | block      | record                                                        |
//! |------------|---------------------------------------------------------------|
//! | vertices   | 4 x f32 (w = 1)                                               |
//! | indices    | u64, padded with a zero entry to an even count                |
//! | attributes | normal 4 x f32, u32 tag + 12 pad, 16-byte color/texture union |
//! | texels     | u32 0x00RRGGBB, whole 512x512 tiles                           |

use crate::core::error::RasterError;
use crate::core::geometry::{ColorAttribute, TextureRef, Triangle, VertexAttribute};
use crate::scene::mesh::GeometryStore;
use crate::scene::texture::TextureAtlas;
use log::{info, warn};
use nalgebra::{Vector2, Vector3, Vector4};
use std::fs;
use std::path::Path;

const HEADER_SIZE: usize = 16;
const VERTEX_SIZE: usize = 16;
const INDEX_SIZE: usize = 8;
const ATTRIBUTE_SIZE: usize = 48;
const TEXEL_SIZE: usize = 4;

const TAG_COLOR: u32 = 0;
const TAG_TEXTURE: u32 = 1;

/// Reads and decodes a scene file.
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<(GeometryStore, TextureAtlas), RasterError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let (geometry, atlas) = decode_scene(&bytes)?;
    info!(
        "Loaded scene '{}': {} vertices, {} triangles, {} texture(s)",
        path.display(),
        geometry.vertices().len(),
        geometry.triangle_count(),
        atlas.tile_count()
    );
    Ok((geometry, atlas))
}

/// Decodes a scene and validates indices, color variants and texture references.
pub fn decode_scene(bytes: &[u8]) -> Result<(GeometryStore, TextureAtlas), RasterError> {
    let mut reader = Reader { bytes, offset: 0 };

    let count = reader.header("vertices")?;
    let block = reader.records("vertices", count, VERTEX_SIZE)?;
    let vertices = block
        .chunks_exact(VERTEX_SIZE)
        .map(|r| Vector4::new(f32_at(r, 0), f32_at(r, 4), f32_at(r, 8), f32_at(r, 12)))
        .collect();

    let vertex_indices = reader.indices("vertex indices")?;

    let count = reader.header("attributes")?;
    let block = reader.records("attributes", count, ATTRIBUTE_SIZE)?;
    let attributes = block
        .chunks_exact(ATTRIBUTE_SIZE)
        .enumerate()
        .map(|(i, r)| decode_attribute(i, r))
        .collect::<Result<Vec<_>, _>>()?;

    let attribute_indices = reader.indices("attribute indices")?;

    let count = reader.header("texels")?;
    let block = reader.records("texels", count, TEXEL_SIZE)?;
    let texels = block
        .chunks_exact(TEXEL_SIZE)
        .map(|r| u32_at(r, 0))
        .collect();

    if reader.offset < bytes.len() {
        warn!(
            "Ignoring {} trailing byte(s) after the texel block",
            bytes.len() - reader.offset
        );
    }

    let geometry =
        GeometryStore::from_flat(vertices, &vertex_indices, attributes, &attribute_indices)?;
    let atlas = TextureAtlas::new(texels)?;
    geometry.validate_textures(&atlas)?;
    Ok((geometry, atlas))
}

/// Encodes a scene in the layout read by [`decode_scene`].
pub fn encode_scene(geometry: &GeometryStore, atlas: &TextureAtlas) -> Vec<u8> {
    let mut out = Vec::new();

    write_header(&mut out, geometry.vertices().len());
    for v in geometry.vertices() {
        for c in v.iter() {
            out.extend_from_slice(&c.to_le_bytes());
        }
    }

    write_indices(&mut out, geometry.vertex_indices());

    write_header(&mut out, geometry.attributes().len());
    for a in geometry.attributes() {
        for c in a.normal.iter() {
            out.extend_from_slice(&c.to_le_bytes());
        }
        match a.color {
            ColorAttribute::Color(rgb) => {
                out.extend_from_slice(&TAG_COLOR.to_le_bytes());
                out.extend_from_slice(&[0; 12]);
                for c in rgb.iter() {
                    out.extend_from_slice(&c.to_le_bytes());
                }
                out.extend_from_slice(&[0; 4]);
            }
            ColorAttribute::Texture(t) => {
                out.extend_from_slice(&TAG_TEXTURE.to_le_bytes());
                out.extend_from_slice(&[0; 12]);
                out.extend_from_slice(&t.index.to_le_bytes());
                out.extend_from_slice(&[0; 4]);
                out.extend_from_slice(&t.mapping.x.to_le_bytes());
                out.extend_from_slice(&t.mapping.y.to_le_bytes());
            }
        }
    }

    write_indices(&mut out, geometry.attribute_indices());

    write_header(&mut out, atlas.texels().len());
    for texel in atlas.texels() {
        out.extend_from_slice(&texel.to_le_bytes());
    }
    out
}

/// Writes a scene file, creating or truncating it.
pub fn save_scene<P: AsRef<Path>>(
    path: P,
    geometry: &GeometryStore,
    atlas: &TextureAtlas,
) -> Result<(), RasterError> {
    let path = path.as_ref();
    let bytes = encode_scene(geometry, atlas);
    fs::write(path, &bytes)?;
    info!("Wrote scene '{}' ({} bytes)", path.display(), bytes.len());
    Ok(())
}

fn decode_attribute(index: usize, r: &[u8]) -> Result<VertexAttribute, RasterError> {
    let normal = Vector4::new(f32_at(r, 0), f32_at(r, 4), f32_at(r, 8), f32_at(r, 12));
    let color = match u32_at(r, 16) {
        TAG_COLOR => ColorAttribute::Color(Vector3::new(f32_at(r, 32), f32_at(r, 36), f32_at(r, 40))),
        TAG_TEXTURE => ColorAttribute::Texture(TextureRef {
            index: u32_at(r, 32),
            mapping: Vector2::new(f32_at(r, 40), f32_at(r, 44)),
        }),
        value => {
            return Err(RasterError::InvalidDiscriminant {
                attribute: index,
                value,
            });
        }
    };
    Ok(VertexAttribute { normal, color })
}

fn write_header(out: &mut Vec<u8>, count: usize) {
    out.extend_from_slice(&(count as u64).to_le_bytes());
    out.extend_from_slice(&[0; 8]);
}

fn write_indices(out: &mut Vec<u8>, triangles: &[Triangle]) {
    let count = triangles.len() * 3;
    write_header(out, count);
    for &i in triangles.iter().flatten() {
        out.extend_from_slice(&(i as u64).to_le_bytes());
    }
    if count % 2 == 1 {
        out.extend_from_slice(&0u64.to_le_bytes());
    }
}

// Callers slice records with `chunks_exact`, so offsets are always in range.
fn u32_at(r: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([r[at], r[at + 1], r[at + 2], r[at + 3]])
}

fn f32_at(r: &[u8], at: usize) -> f32 {
    f32::from_bits(u32_at(r, at))
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, section: &'static str, len: usize) -> Result<&'a [u8], RasterError> {
        let available = self.bytes.len() - self.offset;
        if len > available {
            return Err(RasterError::Truncated {
                section,
                needed: len,
                available,
            });
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    /// Block header: `u64` record count and 8 padding bytes.
    fn header(&mut self, section: &'static str) -> Result<usize, RasterError> {
        let h = self.take(section, HEADER_SIZE)?;
        let count = u64::from_le_bytes([h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7]]);
        Ok(usize::try_from(count).unwrap_or(usize::MAX))
    }

    fn records(
        &mut self,
        section: &'static str,
        count: usize,
        size: usize,
    ) -> Result<&'a [u8], RasterError> {
        let len = count.checked_mul(size).unwrap_or(usize::MAX);
        self.take(section, len)
    }

    /// An index block; the zero entry padding odd counts is skipped.
    fn indices(&mut self, section: &'static str) -> Result<Vec<usize>, RasterError> {
        let count = self.header(section)?;
        let padded = count.saturating_add(count % 2);
        let block = self.records(section, padded, INDEX_SIZE)?;
        Ok(block
            .chunks_exact(INDEX_SIZE)
            .take(count)
            .map(|r| {
                let i = u64::from_le_bytes([r[0], r[1], r[2], r[3], r[4], r[5], r[6], r[7]]);
                usize::try_from(i).unwrap_or(usize::MAX)
            })
            .collect())
    }
}

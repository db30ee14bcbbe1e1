use crate::core::color::pack_rgb;
use crate::core::error::RasterError;
use log::info;
use nalgebra::Vector2;

/// Width and height of every atlas tile, in texels.
pub const TEXTURE_SIZE: usize = 512;
/// `log2(TEXTURE_SIZE * TEXTURE_SIZE)`: tile `i` starts at texel `i << TILE_SHIFT`.
pub const TILE_SHIFT: usize = 18;
pub const TEXELS_PER_TILE: usize = 1 << TILE_SHIFT;
/// Largest mip block edge, in texels.
pub const MAX_MIP_BLOCK: f32 = 256.0;

/// Contiguous array of 512x512 tiles of packed 0x00RRGGBB texels.
#[derive(Debug, Clone, Default)]
pub struct TextureAtlas {
    texels: Vec<u32>,
}

impl TextureAtlas {
    pub fn new(texels: Vec<u32>) -> Result<Self, RasterError> {
        if texels.len() % TEXELS_PER_TILE != 0 {
            return Err(RasterError::TexelCount(texels.len()));
        }
        info!("Texture atlas holds {} tile(s)", texels.len() / TEXELS_PER_TILE);
        Ok(Self { texels })
    }

    pub fn tile_count(&self) -> usize {
        self.texels.len() >> TILE_SHIFT
    }

    pub fn texels(&self) -> &[u32] {
        &self.texels
    }

    /// Appends a tile produced by `texel(x, y)` and returns its index.
    pub fn push_tile<F>(&mut self, texel: F) -> u32
    where
        F: Fn(usize, usize) -> u32,
    {
        let index = self.tile_count() as u32;
        self.texels.reserve(TEXELS_PER_TILE);
        for y in 0..TEXTURE_SIZE {
            for x in 0..TEXTURE_SIZE {
                self.texels.push(texel(x, y));
            }
        }
        index
    }

    /// Fetches the texel for a perspective-corrected `uv`.
    ///
    /// `footprint` is the texture-space size of one pixel, in texels, per axis.
    /// UVs wrap into [0, 1); the address snaps to the start of the selected mip block.
    /// Missing tiles read as black.
    pub fn sample(&self, index: u32, uv: Vector2<f32>, footprint: Vector2<f32>) -> u32 {
        let bx = mip_block(footprint.x);
        let by = mip_block(footprint.y);
        let x = wrap_to_texel(uv.x) & !(bx - 1);
        let y = wrap_to_texel(uv.y) & !(by - 1);
        let offset = ((index as usize) << TILE_SHIFT) + y * TEXTURE_SIZE + x;
        self.texels.get(offset).copied().unwrap_or(0)
    }
}

/// Edge length of the mip block for a footprint: the next power of two of the
/// footprint clamped to 1..=256. NaN selects the finest level.
pub fn mip_block(footprint: f32) -> usize {
    let f = if footprint.is_nan() {
        1.0
    } else {
        footprint.clamp(1.0, MAX_MIP_BLOCK)
    };
    (f.ceil() as usize).next_power_of_two()
}

/// Mip level (0 = full resolution) for a footprint.
pub fn mip_level(footprint: f32) -> u32 {
    mip_block(footprint).trailing_zeros()
}

#[inline(always)]
fn wrap_to_texel(c: f32) -> usize {
    // NaN and infinities become NaN here and then texel 0
    let wrapped = c.rem_euclid(1.0);
    ((wrapped * TEXTURE_SIZE as f32) as usize).min(TEXTURE_SIZE - 1)
}

//=================================
// Procedural tiles
//=================================

/// Checkerboard with square cells of `cell` texels.
pub fn checkerboard(cell: usize, a: u32, b: u32) -> impl Fn(usize, usize) -> u32 {
    let cell = cell.max(1);
    move |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            a
        } else {
            b
        }
    }
}

/// Concentric colour rings around the tile centre, useful for spotting mip transitions.
pub fn rings(period: f32) -> impl Fn(usize, usize) -> u32 {
    let period = period.max(1.0);
    move |x, y| {
        let dx = x as f32 - TEXTURE_SIZE as f32 / 2.0;
        let dy = y as f32 - TEXTURE_SIZE as f32 / 2.0;
        let t = ((dx * dx + dy * dy).sqrt() / period).fract();
        let r = (255.0 * t) as u8;
        let g = (255.0 * (1.0 - t)) as u8;
        let b = ((x ^ y) & 0xFF) as u8;
        pack_rgb(r, g, b)
    }
}

use nalgebra::Vector3;

/// Packs 8-bit channels into a 0x00RRGGBB word.
#[inline(always)]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Clamps a float color (channels in 0..=255) and packs it.
/// NaN channels become 0.
#[inline(always)]
pub fn pack_color(color: Vector3<f32>) -> u32 {
    pack_rgb(to_channel(color.x), to_channel(color.y), to_channel(color.z))
}

/// Unpacks a 0x00RRGGBB word into float channels in 0..=255.
#[inline(always)]
pub fn unpack_rgb(texel: u32) -> Vector3<f32> {
    Vector3::new(
        ((texel >> 16) & 0xFF) as f32,
        ((texel >> 8) & 0xFF) as f32,
        (texel & 0xFF) as f32,
    )
}

#[inline(always)]
fn to_channel(v: f32) -> u8 {
    // `as` saturates and maps NaN to 0
    v.clamp(0.0, 255.0) as u8
}

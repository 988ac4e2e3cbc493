//! Small pixel and float helpers shared by both render backends.

/// Finite value or `fallback`.
pub fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}

pub fn premul_rgba8(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    let af = u16::from(a) + 1;
    let premul = |c: u8| -> u8 { ((u16::from(c) * af) >> 8) as u8 };
    [premul(r), premul(g), premul(b), a]
}

pub fn unpremul_rgba8(px: [u8; 4]) -> [u8; 4] {
    let a = px[3];
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let un = |c: u8| -> u8 { ((u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8 };
    [un(px[0]), un(px[1]), un(px[2]), a]
}

/// Convert a straight-alpha RGBA8 buffer to premultiplied in place.
pub fn premultiply_in_place(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let p = premul_rgba8(px[0], px[1], px[2], px[3]);
        px.copy_from_slice(&p);
    }
}

/// Convert a premultiplied RGBA8 buffer to straight alpha in place.
pub fn unpremultiply_in_place(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let p = unpremul_rgba8([px[0], px[1], px[2], px[3]]);
        px.copy_from_slice(&p);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;

//! Whitespace-separated numeric text parsing
//!
//! Description files encode vectors as `"x y z"` text. Malformed or missing
//! components never fail a load: they stay at zero.

use glam::Vec3;

/// Parse a scalar, defaulting to zero on malformed input
pub fn parse_f32(text: &str) -> f32 {
    text.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parse up to `N` leading floats.
///
/// Scanning stops at the first token that is not a finite float; every
/// component from that point on stays zero.
pub fn parse_floats<const N: usize>(text: &str) -> [f32; N] {
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(text.split_whitespace()) {
        match token.parse::<f32>() {
            Ok(v) if v.is_finite() => *slot = v,
            _ => break,
        }
    }
    out
}

/// Parse `"x y z"` into a vector (zero-filled)
pub fn parse_vec3(text: &str) -> Vec3 {
    Vec3::from_array(parse_floats::<3>(text))
}

/// Parse `"x y z"` only if all three components are well formed
pub fn parse_vec3_strict(text: &str) -> Option<Vec3> {
    let mut tokens = text.split_whitespace();
    let mut out = [0.0f32; 3];
    for slot in &mut out {
        *slot = tokens.next()?.parse::<f32>().ok().filter(|v| v.is_finite())?;
    }
    Some(Vec3::from_array(out))
}

/// Parse `"r g b a"` and discard alpha
pub fn parse_rgb(text: &str) -> Vec3 {
    let [r, g, b, _a] = parse_floats::<4>(text);
    Vec3::new(r, g, b)
}

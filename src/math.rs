// Scalar helpers and easing curves shared by every backdrop.
// Everything in here is pure so the animation math can be checked without a canvas.

use rand::Rng;
use std::f64::consts::PI;

pub type Vector2 = glm::DVec2;
pub type Vector3 = glm::DVec3;

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

// Affine remap of `value` from [in_lo, in_hi] onto [out_lo, out_hi].
// Callers guarantee in_lo != in_hi.
pub fn map_range(value: f64, in_lo: f64, in_hi: f64, out_lo: f64, out_hi: f64) -> f64 {
    out_lo + (out_hi - out_lo) * ((value - in_lo) / (in_hi - in_lo))
}

pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Symmetric ease-in-ease-out power curve. `g` is the exponent on each half,
/// so `g = 1` is linear and larger values hold longer at both ends.
pub fn ease_power(p: f64, g: f64) -> f64 {
    if p < 0.5 {
        0.5 * (2.0 * p).powf(g)
    } else {
        1.0 - 0.5 * (2.0 * (1.0 - p)).powf(g)
    }
}

/// Elastic ease-out: overshoots past 1 and settles with a decaying sine.
pub fn ease_out_elastic(x: f64) -> f64 {
    let c4 = (2.0 * PI) / 4.5;
    if x <= 0.0 {
        0.0
    } else if x >= 1.0 {
        1.0
    } else {
        2f64.powf(-8.0 * x) * ((x * 8.0 - 0.75) * c4).sin() + 1.0
    }
}

/// Cubic ease-in-out, used for keyframed loops.
pub fn ease_in_out(p: f64) -> f64 {
    let p = clamp(p, 0.0, 1.0);
    if p < 0.5 {
        4.0 * p * p * p
    } else {
        1.0 - (-2.0 * p + 2.0).powi(3) / 2.0
    }
}

/// Rotates `a` around the midpoint of `a` and `b` by up to half a turn,
/// following the elastic curve for `p`, with a slight radial bounce.
pub fn rotate_about_midpoint(a: Vector2, b: Vector2, p: f64, clockwise: bool) -> Vector2 {
    let middle = (a + b) * 0.5;
    let delta = a - middle;
    let angle = delta.y.atan2(delta.x);
    let radius = glm::length(&delta);
    let orientation = if clockwise { -1.0 } else { 1.0 };
    let bounce = (p * PI).sin() * 0.05 * (1.0 - p);
    let turned = angle + orientation * PI * ease_out_elastic(p);

    glm::vec2(
        middle.x + radius * (1.0 + bounce) * turned.cos(),
        middle.y + radius * (1.0 + bounce) * turned.sin(),
    )
}

/// Uniform sample in [min, max).
pub fn random_between<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    min + rng.gen::<f64>() * (max - min)
}

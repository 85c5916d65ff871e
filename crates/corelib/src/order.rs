//! Transitive total order over floats and small vectors.
//!
//! Vertex deduplication inserts into an ordered set and later resolves ids by
//! binary search, so both sides must agree on one comparator. These helpers
//! compare with [`f32::total_cmp`] after folding `-0.0` into `+0.0`, which
//! keeps the order total and transitive (NaNs included).

use std::cmp::Ordering;

use crate::{Vec2, Vec3};

#[inline]
fn fold_zero(v: f32) -> f32 {
    if v == 0.0 { 0.0 } else { v }
}

/// Compare two scalars; `-0.0` and `+0.0` are equal.
#[inline]
pub fn cmp_scalar(a: f32, b: f32) -> Ordering {
    fold_zero(a).total_cmp(&fold_zero(b))
}

/// Lexicographic x, y, z.
#[inline]
pub fn cmp_vec3(a: Vec3, b: Vec3) -> Ordering {
    cmp_scalar(a.x, b.x)
        .then_with(|| cmp_scalar(a.y, b.y))
        .then_with(|| cmp_scalar(a.z, b.z))
}

/// Lexicographic x, y.
#[inline]
pub fn cmp_vec2(a: Vec2, b: Vec2) -> Ordering {
    cmp_scalar(a.x, b.x).then_with(|| cmp_scalar(a.y, b.y))
}

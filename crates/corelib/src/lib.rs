//! Core types: math re-exports, vertex ordering, colors.

pub use glam::{Vec2, Vec3, vec2, vec3};

pub mod color;
pub mod order;

pub use color::Color;

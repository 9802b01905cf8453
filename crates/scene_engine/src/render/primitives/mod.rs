//! Core rendering primitives

pub mod camera;
pub mod model;

pub use camera::{Camera, MAX_PITCH_DEGREES};
pub use model::Model;

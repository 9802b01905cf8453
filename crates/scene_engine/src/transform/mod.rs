//! Composable transforms
//!
//! [`TransformComponent`] is a single translate/rotate/scale step, static or
//! time-driven. [`Transformation`] owns an ordered set of them and yields the
//! combined model matrix of a drawable object.

pub mod component;
pub mod composite;

pub use component::{TransformComponent, MIN_VELOCITY};
pub use composite::{ComponentHandle, Transformation};

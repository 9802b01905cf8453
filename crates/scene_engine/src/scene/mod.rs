//! # Scene Graph
//!
//! Scenes own drawable objects, a camera, shaders and (weakly) the lights
//! that illuminate them. [`SceneManager`] keeps several scenes and tracks
//! which one is current.

pub mod drawable_object;
pub mod light_object;
pub mod motion;
pub mod spot_light_tracker;
pub mod graph;
pub mod scene_manager;

#[cfg(test)]
mod scene_tests;

pub use drawable_object::DrawableObject;
pub use light_object::LightObject;
pub use motion::{MotionPolicy, OrbitMotion, Territory, WanderMotion};
pub use spot_light_tracker::SpotLightTracker;
pub use graph::{RenderStats, Scene};
pub use scene_manager::SceneManager;

use std::cell::RefCell;
use std::rc::Rc;

use crate::render::Light;

/// Most point lights uploaded for a single object
pub const MAX_SCENE_LIGHTS: usize = 20;

/// Something a scene can own, update and draw
pub trait SceneObject {
    /// Advance the object by `delta_time` seconds
    fn update(&mut self, delta_time: f32);

    /// Drawable state (model, transform, shader, material)
    fn drawable(&self) -> &DrawableObject;

    /// Mutable drawable state
    fn drawable_mut(&mut self) -> &mut DrawableObject;

    /// Light carried by the object, if any
    fn light(&self) -> Option<Rc<RefCell<Light>>> {
        None
    }

    /// Object id
    fn id(&self) -> i32 {
        self.drawable().id()
    }
}

/// Scene errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// No scene was registered under this id
    #[error("Unknown scene id: {0}")]
    UnknownScene(i32),

    /// Object index past the end of the scene
    #[error("Object index {index} out of range (scene has {len} objects)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of objects
        len: usize,
    },
}

//! # Scene Engine
//!
//! A small scene-graph engine: cameras, point lights and a spotlight,
//! composable transforms, textured models and a shared model cache, rendered
//! through an abstract shader backend.
//!
//! ## Features
//!
//! - **Composable Transforms**: static and time-driven components folded into one cached matrix
//! - **Observable Camera and Lights**: scenes refresh their uniforms when either changes
//! - **Model Cache**: every vertex source is parsed at most once
//! - **Backend Agnostic**: GL work happens behind traits; a headless backend records every call
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = HeadlessBackend::new();
//!     let cache = ModelCache::new();
//!
//!     let mut scene = Scene::new();
//!     scene.set_camera(Camera::looking_at(
//!         Vec3::new(0.0, 0.0, 5.0),
//!         Vec3::zeros(),
//!         Vec3::new(0.0, 1.0, 0.0),
//!         45.0, 4.0 / 3.0, 0.1, 100.0,
//!     ));
//!
//!     let shader = scene.create_shader(&backend, "shaders/vertex.glsl", "shaders/phong.glsl")
//!         .ok_or("shader failed")?;
//!
//!     let mut cube = DrawableObject::new();
//!     cube.load_model(&cache, &backend, "models/cube.h", "cube");
//!     cube.add_dynamic_transform(TransformComponent::dynamic_rotate(Vec3::y(), 0.0, 45.0));
//!     cube.set_shader(shader);
//!     scene.add_object(cube);
//!
//!     scene.update(0.016);
//!     let stats = scene.render();
//!     log::info!("drew {} objects", stats.drawn);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;
pub mod config;

pub mod foundation;
pub mod transform;
pub mod render;
pub mod assets;
pub mod scene;
pub mod input;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        core::{ApplicationConfig, Config, ConfigError},
        foundation::{
            math::{Vec3, Mat3, Mat4, Mat4Ext},
            time::Timer,
        },
        transform::{ComponentHandle, TransformComponent, Transformation},
        render::{
            Camera, CameraObserver, GraphicsBackend, HeadlessBackend, Light, LightId,
            LightObserver, LightSlot, Model, ShaderProgram, SpotLight, Texture, UniformValue,
        },
        assets::{ModelCache, ModelData, ModelLoader},
        scene::{
            DrawableObject, LightObject, MotionPolicy, RenderStats, Scene, SceneError,
            SceneManager, SceneObject, SpotLightTracker,
        },
        input::{CameraController, ControllerAction, InputSource, Key},
    };
}

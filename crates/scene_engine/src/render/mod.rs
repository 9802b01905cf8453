//! # Rendering System
//!
//! Rendering abstraction layer for the scene engine.
//!
//! ## Architecture
//!
//! - **Backend traits**: shader programs, vertex buffers and textures behind [`GraphicsBackend`]
//! - **Headless backend**: a recording implementation for tests and offline runs
//! - **Primitives**: the observable [`Camera`] and GPU-resident [`Model`]s
//! - **Lighting**: observable point [`Light`]s and the polled [`SpotLight`]

pub mod backend;
pub mod headless;
pub mod observer;
pub mod primitives;
pub mod lighting;

pub use backend::{
    BackendError, BackendResult, GpuBuffer, GraphicsBackend, ShaderProgram, Texture, UniformValue,
    VertexAttribute, VertexLayout,
};
pub use headless::{HeadlessBackend, HeadlessTexture, RecordingBuffer, RecordingShader, RenderEvent};
pub use observer::{CameraObserver, LightObserver, ObserverList};
pub use primitives::{Camera, Model};
pub use lighting::{Attenuation, Light, LightId, LightSlot, SpotLight, SPOTLIGHT_BLOCK};

//! # Core Engine Module
//!
//! Shared configuration types used by the scene engine and by applications
//! driving it.

pub mod config;

pub use config::{
    ApplicationConfig,
    AssetConfig,
    CameraConfig,
    ControlsConfig,
    EngineConfig,
    WindowConfig,
};
pub use crate::config::{Config, ConfigError};

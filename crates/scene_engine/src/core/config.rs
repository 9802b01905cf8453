//! # Unified Configuration System
//!
//! All configuration structures for the scene engine live here: window
//! metadata handed to the windowing collaborator, camera projection defaults,
//! first-person control tuning, asset locations and core engine behavior.
//!
//! Every section has sensible defaults, so a config file only needs to list
//! the values it overrides.

use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::scene::MAX_SCENE_LIGHTS;

/// # Window Configuration
///
/// Fixed window width, height and title passed at process start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Window title
    pub title: String,
}

impl WindowConfig {
    /// Create a window configuration
    pub fn new(width: u32, height: u32, title: impl Into<String>) -> Self {
        Self {
            width,
            height,
            title: title.into(),
        }
    }

    /// Width / height, guarded against a zero height
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new(800, 600, "Scene Engine")
    }
}

/// # Camera Configuration
///
/// Projection defaults used when scenes create their cameras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane distance
    pub near: f32,
    /// Far clipping plane distance
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// # Controls Configuration
///
/// First-person camera controller tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Movement speed in world units per second
    pub move_speed: f32,
    /// Mouse look sensitivity in degrees per pixel
    pub mouse_sensitivity: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            mouse_sensitivity: 0.1,
        }
    }
}

/// # Asset Configuration
///
/// Where models, shaders and textures are looked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Base directory for assets
    pub assets_dir: String,
    /// Log cache statistics on shutdown
    pub log_cache_stats: bool,
}

impl AssetConfig {
    /// Create a new asset configuration
    pub fn new() -> Self {
        Self {
            assets_dir: "assets".to_string(),
            log_cache_stats: true,
        }
    }

    /// Set assets directory
    pub fn with_assets_dir(mut self, dir: impl Into<String>) -> Self {
        self.assets_dir = dir.into();
        self
    }

    /// Resolve a path relative to the assets directory
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        Path::new(&self.assets_dir).join(relative)
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Engine Configuration
///
/// Core engine behavior configuration including logging and rendering caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level for the engine
    pub log_level: String,
    /// Whether to enable debug features
    pub debug_mode: bool,
    /// Maximum number of point lights uploaded per object
    pub max_lights: usize,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_mode: cfg!(debug_assertions),
            max_lights: MAX_SCENE_LIGHTS,
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable debug mode
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug_mode = enabled;
        self
    }

    /// Set the per-object light cap
    pub fn with_max_lights(mut self, max_lights: usize) -> Self {
        self.max_lights = max_lights;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration that encompasses all engine subsystems.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Window configuration
    pub window: WindowConfig,
    /// Camera defaults
    pub camera: CameraConfig,
    /// Controller tuning
    pub controls: ControlsConfig,
    /// Asset system configuration
    pub assets: AssetConfig,
}

impl ApplicationConfig {
    /// Create a new application configuration with defaults and a window title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            window: WindowConfig {
                title: title.into(),
                ..WindowConfig::default()
            },
            ..Self::default()
        }
    }

    /// Set window size
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// Set the assets directory
    pub fn with_assets_dir(mut self, dir: impl Into<String>) -> Self {
        self.assets.assets_dir = dir.into();
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.window.title.is_empty() {
            return Err("Window title cannot be empty".to_string());
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(format!(
                "Window size must be positive, got {}x{}",
                self.window.width, self.window.height
            ));
        }

        if self.camera.near <= 0.0 || self.camera.near >= self.camera.far {
            return Err(format!(
                "Camera planes must satisfy 0 < near < far, got near={} far={}",
                self.camera.near, self.camera.far
            ));
        }

        if !(self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0) {
            return Err(format!("Field of view must be in (0, 180), got {}", self.camera.fov_degrees));
        }

        if self.engine.max_lights == 0 || self.engine.max_lights > MAX_SCENE_LIGHTS {
            return Err(format!(
                "max_lights must be in 1..={MAX_SCENE_LIGHTS}, got {}",
                self.engine.max_lights
            ));
        }

        Ok(())
    }
}

impl Config for ApplicationConfig {}

//! # Lighting
//!
//! Point lights are observable: the scene hears about changes and, more
//! importantly, about a light being dropped. The spotlight is plain data the
//! scene polls every frame.

pub mod light;
pub mod spot_light;

pub use light::{Attenuation, Light, LightId, LightSlot};
pub use spot_light::{SpotLight, SPOTLIGHT_BLOCK};

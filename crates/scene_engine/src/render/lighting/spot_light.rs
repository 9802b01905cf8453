//! Spotlight (flashlight-style cone light)

use crate::foundation::math::{utils, Vec3};
use crate::render::backend::ShaderProgram;

use super::light::Attenuation;

/// Uniform block the scene writes the spotlight into
pub const SPOTLIGHT_BLOCK: &str = "spotlight";

/// Cone light with a soft edge between the inner and outer cutoff
///
/// Not observable: the scene reads it on every render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotLight {
    position: Vec3,
    direction: Vec3,
    color: Vec3,
    intensity: f32,
    cut_off: f32,
    outer_cut_off: f32,
    attenuation: Attenuation,
    enabled: bool,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self::new(Vec3::zeros(), -Vec3::z())
    }
}

impl SpotLight {
    /// White, enabled spotlight with a 12.5° / 17.5° cone
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            direction: direction.try_normalize(1.0e-6).unwrap_or_else(|| -Vec3::z()),
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            cut_off: 12.5,
            outer_cut_off: 17.5,
            attenuation: Attenuation::default(),
            enabled: true,
        }
    }

    /// Position in world space
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit direction
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Linear RGB color
    pub fn color(&self) -> Vec3 {
        self.color
    }

    /// Intensity multiplier
    pub const fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Inner cone half-angle in degrees
    pub const fn cut_off(&self) -> f32 {
        self.cut_off
    }

    /// Outer cone half-angle in degrees
    pub const fn outer_cut_off(&self) -> f32 {
        self.outer_cut_off
    }

    /// Attenuation coefficients
    pub const fn attenuation(&self) -> Attenuation {
        self.attenuation
    }

    /// Whether the light contributes to shading
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Move the light
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Aim the light; zero-length directions are ignored
    pub fn set_direction(&mut self, direction: Vec3) {
        match direction.try_normalize(1.0e-6) {
            Some(direction) => self.direction = direction,
            None => log::warn!("Ignoring zero-length spotlight direction"),
        }
    }

    /// Change the color
    pub fn set_color(&mut self, color: Vec3) {
        self.color = color;
    }

    /// Change the intensity
    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity;
    }

    /// Set the inner and outer cone half-angles, in degrees
    pub fn set_cut_off(&mut self, inner_degrees: f32, outer_degrees: f32) {
        if outer_degrees < inner_degrees {
            log::warn!(
                "Spotlight outer cutoff {}° is inside the inner cutoff {}°",
                outer_degrees,
                inner_degrees
            );
        }
        self.cut_off = inner_degrees;
        self.outer_cut_off = outer_degrees;
    }

    /// Change the attenuation coefficients
    pub fn set_attenuation(&mut self, constant: f32, linear: f32, quadratic: f32) {
        self.attenuation = Attenuation::new(constant, linear, quadratic);
    }

    /// Turn the light on or off
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Write the light into `<block>.*` uniforms
    ///
    /// Cutoffs are written as cosines; `enabled` is written as an int.
    pub fn apply_to_shader(&self, shader: &dyn ShaderProgram, block: &str) {
        let field = |name: &str| format!("{block}.{name}");

        shader.set_uniform(&field("position"), self.position.into());
        shader.set_uniform(&field("direction"), self.direction.into());
        shader.set_uniform(&field("color"), self.color.into());
        shader.set_uniform(&field("intensity"), self.intensity.into());
        shader.set_uniform(&field("cutOff"), utils::deg_to_rad(self.cut_off).cos().into());
        shader.set_uniform(&field("outerCutOff"), utils::deg_to_rad(self.outer_cut_off).cos().into());
        shader.set_uniform(&field("constant"), self.attenuation.constant.into());
        shader.set_uniform(&field("linear"), self.attenuation.linear.into());
        shader.set_uniform(&field("quadratic"), self.attenuation.quadratic.into());
        shader.set_uniform(&field("enabled"), i32::from(self.enabled).into());
    }
}

//! Point lights

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::math::Vec3;
use crate::render::backend::ShaderProgram;
use crate::render::observer::{LightObserver, ObserverList};

static NEXT_LIGHT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique light identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(u64);

impl LightId {
    fn next() -> Self {
        Self(NEXT_LIGHT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Distance falloff: 1 / (constant + linear·d + quadratic·d²)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    /// Constant term
    pub constant: f32,
    /// Linear term
    pub linear: f32,
    /// Quadratic term
    pub quadratic: f32,
}

impl Attenuation {
    /// Create attenuation coefficients
    pub const fn new(constant: f32, linear: f32, quadratic: f32) -> Self {
        Self { constant, linear, quadratic }
    }

    /// Light fraction reaching `distance`
    pub fn factor(&self, distance: f32) -> f32 {
        let denominator = self.constant + self.linear * distance + self.quadratic * distance * distance;
        if denominator > 0.0 { 1.0 / denominator } else { 1.0 }
    }
}

impl Default for Attenuation {
    /// Roughly a 50 unit range
    fn default() -> Self {
        Self::new(1.0, 0.09, 0.032)
    }
}

/// Where a light's uniforms live in the shader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightSlot {
    /// Single-light shaders: `light.<field>`
    Flat,
    /// Light arrays: `lights[i].<field>`
    Indexed(usize),
}

impl LightSlot {
    /// Full uniform name of `field` in this slot
    pub fn uniform_name(self, field: &str) -> String {
        match self {
            Self::Flat => format!("light.{field}"),
            Self::Indexed(index) => format!("lights[{index}].{field}"),
        }
    }
}

/// Observable point light
///
/// Every setter notifies attached observers before returning. Dropping the
/// light sends a final destruction notification instead of a change.
#[derive(Debug)]
pub struct Light {
    id: LightId,
    position: Vec3,
    color: Vec3,
    intensity: f32,
    attenuation: Attenuation,
    observers: ObserverList<dyn LightObserver>,
}

impl Default for Light {
    fn default() -> Self {
        Self::new()
    }
}

impl Light {
    /// White light of intensity 1 at (0, 10, 0)
    pub fn new() -> Self {
        Self {
            id: LightId::next(),
            position: Vec3::new(0.0, 10.0, 0.0),
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            attenuation: Attenuation::default(),
            observers: ObserverList::new(),
        }
    }

    /// Builder: position
    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Builder: color
    #[must_use]
    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    /// Builder: intensity
    #[must_use]
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Builder: attenuation
    #[must_use]
    pub fn with_attenuation(mut self, attenuation: Attenuation) -> Self {
        self.attenuation = attenuation;
        self
    }

    /// Identity of this light
    pub const fn id(&self) -> LightId {
        self.id
    }

    /// Position in world space
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Linear RGB color
    pub fn color(&self) -> Vec3 {
        self.color
    }

    /// Intensity multiplier
    pub const fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Attenuation coefficients
    pub const fn attenuation(&self) -> Attenuation {
        self.attenuation
    }

    /// Move the light
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.notify_changed();
    }

    /// Change the color
    pub fn set_color(&mut self, color: Vec3) {
        self.color = color;
        self.notify_changed();
    }

    /// Change the intensity
    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity;
        self.notify_changed();
    }

    /// Change the attenuation coefficients
    pub fn set_attenuation(&mut self, constant: f32, linear: f32, quadratic: f32) {
        self.attenuation = Attenuation::new(constant, linear, quadratic);
        self.notify_changed();
    }

    /// Register an observer (idempotent)
    pub fn attach(&mut self, observer: &Rc<dyn LightObserver>) {
        self.observers.attach(observer);
    }

    /// Unregister an observer; does nothing if it was not attached
    pub fn detach(&mut self, observer: &Rc<dyn LightObserver>) {
        self.observers.detach(observer);
    }

    /// Number of attached observers
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Write position, color, intensity and attenuation into `slot`
    pub fn apply_to_shader(&self, shader: &dyn ShaderProgram, slot: LightSlot) {
        shader.set_uniform(&slot.uniform_name("position"), self.position.into());
        shader.set_uniform(&slot.uniform_name("color"), self.color.into());
        shader.set_uniform(&slot.uniform_name("intensity"), self.intensity.into());
        shader.set_uniform(&slot.uniform_name("constant"), self.attenuation.constant.into());
        shader.set_uniform(&slot.uniform_name("linear"), self.attenuation.linear.into());
        shader.set_uniform(&slot.uniform_name("quadratic"), self.attenuation.quadratic.into());
    }

    fn notify_changed(&mut self) {
        for observer in self.observers.snapshot() {
            observer.on_light_changed(self);
        }
    }
}

impl Drop for Light {
    fn drop(&mut self) {
        let observers = self.observers.snapshot();
        if !observers.is_empty() {
            log::debug!("Light {:?} dropped, notifying {} observers", self.id, observers.len());
        }
        for observer in observers {
            observer.on_light_destroyed(self);
        }
        self.observers.clear();
    }
}

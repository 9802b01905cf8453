//! Drawable objects that carry a moving point light

use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::math::Vec3;
use crate::render::lighting::Attenuation;
use crate::render::Light;
use crate::transform::{ComponentHandle, TransformComponent};

use super::motion::{MotionPolicy, Territory};
use super::{DrawableObject, SceneObject};

/// Warm yellow of the default carried light
pub const DEFAULT_LIGHT_COLOR: Vec3 = Vec3::new(1.0, 1.0, 0.3);

/// Intensity of the default carried light
pub const DEFAULT_LIGHT_INTENSITY: f32 = 2.0;

/// Short-range falloff of the default carried light
pub const DEFAULT_LIGHT_ATTENUATION: Attenuation = Attenuation::new(1.0, 0.35, 0.44);

/// A drawable that moves along a [`MotionPolicy`] and drags a light with it
///
/// The object owns its light. Scenes only keep a weak reference, so
/// dropping the object (for example by removing it from its scene) removes
/// the light from every scene that registered it.
#[derive(Debug)]
pub struct LightObject {
    drawable: DrawableObject,
    light: Rc<RefCell<Light>>,
    motion: MotionPolicy,
    translation: ComponentHandle,
    position: Vec3,
}

impl LightObject {
    /// Object following `motion`, carrying the default light
    pub fn new(motion: MotionPolicy) -> Self {
        let position = motion.start_position();

        let mut drawable = DrawableObject::new();
        let translation = drawable.add_dynamic_transform(TransformComponent::dynamic_translate(position, Vec3::zeros()));

        let light = Light::new()
            .with_position(position)
            .with_color(DEFAULT_LIGHT_COLOR)
            .with_intensity(DEFAULT_LIGHT_INTENSITY)
            .with_attenuation(DEFAULT_LIGHT_ATTENUATION);

        Self {
            drawable,
            light: Rc::new(RefCell::new(light)),
            motion,
            translation,
            position,
        }
    }

    /// Circle `center` at the default height and speed
    pub fn orbiting(center: Vec3, radius: f32) -> Self {
        Self::new(MotionPolicy::orbit(center, radius))
    }

    /// Wander inside `territory`; the seed makes the walk reproducible
    pub fn wandering(territory: Territory, seed: u64) -> Self {
        Self::new(MotionPolicy::wander_seeded(territory, seed))
    }

    /// Builder: recolor the carried light and retune its strength
    #[must_use]
    pub fn with_light(self, color: Vec3, intensity: f32, attenuation: Attenuation) -> Self {
        {
            let mut light = self.light.borrow_mut();
            light.set_color(color);
            light.set_intensity(intensity);
            light.set_attenuation(attenuation.constant, attenuation.linear, attenuation.quadratic);
        }
        self
    }

    /// Change the motion speed
    pub fn set_speed(&mut self, speed: f32) {
        self.motion.set_speed(speed);
    }

    /// Current position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Motion policy
    pub const fn motion(&self) -> &MotionPolicy {
        &self.motion
    }

    /// Move, then push the new position to the transform and the light
    pub fn update(&mut self, delta_time: f32) {
        self.position = self.motion.step(self.position, delta_time);

        if let Some(component) = self.drawable.transformation_mut().component_mut(self.translation) {
            component.set_position(self.position);
        }
        self.drawable.update(delta_time);

        self.light.borrow_mut().set_position(self.position);
    }

    /// Shared handle to the carried light
    pub fn light(&self) -> Rc<RefCell<Light>> {
        Rc::clone(&self.light)
    }

    /// Drawable state
    pub const fn drawable(&self) -> &DrawableObject {
        &self.drawable
    }

    /// Mutable drawable state
    pub fn drawable_mut(&mut self) -> &mut DrawableObject {
        &mut self.drawable
    }
}

impl SceneObject for LightObject {
    fn update(&mut self, delta_time: f32) {
        Self::update(self, delta_time);
    }

    fn drawable(&self) -> &DrawableObject {
        &self.drawable
    }

    fn drawable_mut(&mut self) -> &mut DrawableObject {
        &mut self.drawable
    }

    fn light(&self) -> Option<Rc<RefCell<Light>>> {
        Some(Self::light(self))
    }
}

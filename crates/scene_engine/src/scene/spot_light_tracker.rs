//! Flashlight behavior: a spotlight glued to the camera

use std::cell::RefCell;
use std::rc::Rc;

use crate::render::{Camera, CameraObserver, SpotLight};

/// Camera observer that moves a spotlight to the eye and aims it along the
/// view direction on every camera change
#[derive(Debug)]
pub struct SpotLightTracker {
    spotlight: Rc<RefCell<SpotLight>>,
}

impl SpotLightTracker {
    /// Track changes into `spotlight`
    pub fn new(spotlight: Rc<RefCell<SpotLight>>) -> Self {
        Self { spotlight }
    }

    /// The tracked spotlight
    pub fn spotlight(&self) -> Rc<RefCell<SpotLight>> {
        Rc::clone(&self.spotlight)
    }
}

impl CameraObserver for SpotLightTracker {
    fn on_camera_changed(&self, camera: &Camera) {
        let Ok(mut spotlight) = self.spotlight.try_borrow_mut() else {
            log::warn!("Spotlight busy, skipping camera update");
            return;
        };
        spotlight.set_position(camera.position());
        spotlight.set_direction(camera.direction());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;

    fn camera() -> Camera {
        Camera::new(Vec3::new(0.0, 1.0, 5.0), -Vec3::z(), Vec3::y(), 45.0, 4.0 / 3.0, 0.1, 100.0)
    }

    #[test]
    fn test_spotlight_follows_camera() {
        let spotlight = Rc::new(RefCell::new(SpotLight::default()));
        let tracker: Rc<dyn CameraObserver> = Rc::new(SpotLightTracker::new(Rc::clone(&spotlight)));

        let mut camera = camera();
        camera.attach(&tracker);

        camera.set_position(Vec3::new(3.0, 2.0, 1.0));
        camera.look_at(Vec3::new(3.0, 2.0, -9.0));

        let spotlight = spotlight.borrow();
        assert_eq!(spotlight.position(), Vec3::new(3.0, 2.0, 1.0));
        assert_relative_eq!(spotlight.direction(), -Vec3::z(), epsilon = 1e-5);
    }

    #[test]
    fn test_busy_spotlight_is_skipped() {
        let spotlight = Rc::new(RefCell::new(SpotLight::default()));
        let tracker = SpotLightTracker::new(Rc::clone(&spotlight));

        let _guard = spotlight.borrow_mut();
        tracker.on_camera_changed(&camera());
    }
}

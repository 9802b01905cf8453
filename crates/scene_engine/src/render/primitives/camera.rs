//! # 3D Camera System
//!
//! First-person perspective camera with cached view and projection matrices.
//!
//! ## Design Principles
//! - **Always consistent**: every mutator recomputes the affected matrix before returning
//! - **Observable**: attached [`CameraObserver`]s are told about every change
//! - **GL conventions**: right-handed view space, camera looks down -Z

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};
use crate::render::observer::{CameraObserver, ObserverList};

use std::rc::Rc;

/// Pitch limit in degrees; keeps the camera from flipping over the poles
pub const MAX_PITCH_DEGREES: f32 = 89.0;

/// Above this |direction · up| the up vector is rebuilt
const UP_ALIGNMENT_LIMIT: f32 = 0.95;

/// Directions shorter than this are rejected
const MIN_DIRECTION_LENGTH: f32 = 0.001;

/// 3D perspective camera
///
/// Holds the eye position, a unit viewing direction and a unit up vector,
/// plus yaw and pitch angles derived from the direction. Yaw and pitch are in
/// radians; the field of view is in degrees.
///
/// # Coordinate System
/// - direction = (cos pitch · cos yaw, sin pitch, cos pitch · sin yaw)
/// - yaw 0 looks along +X, yaw -90° looks along -Z
///
/// # Observers
/// Observers are held weakly. They are notified synchronously after the
/// camera state and matrices are updated, in no particular order.
#[derive(Debug)]
pub struct Camera {
    position: Vec3,
    direction: Vec3,
    up: Vec3,
    yaw: f32,
    pitch: f32,
    fov_degrees: f32,
    aspect: f32,
    near: f32,
    far: f32,
    view: Mat4,
    projection: Mat4,
    observers: ObserverList<dyn CameraObserver>,
}

impl Camera {
    /// Create a camera from an eye position and a viewing direction
    ///
    /// # Arguments
    /// * `position` - Eye position in world space
    /// * `direction` - Viewing direction (normalized internally)
    /// * `up` - Approximate up vector (normalized internally)
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Viewport width / height
    /// * `near` - Near clipping plane (> 0)
    /// * `far` - Far clipping plane (> near)
    ///
    /// A zero direction falls back to -Z, a zero up vector to +Y.
    pub fn new(position: Vec3, direction: Vec3, up: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let direction = direction.try_normalize(MIN_DIRECTION_LENGTH).unwrap_or_else(|| {
            log::warn!("Camera created with a zero direction, looking down -Z");
            -Vec3::z()
        });
        let up = up.try_normalize(MIN_DIRECTION_LENGTH).unwrap_or_else(Vec3::y);

        let mut camera = Self {
            position,
            direction,
            up,
            yaw: 0.0,
            pitch: 0.0,
            fov_degrees,
            aspect,
            near,
            far,
            view: Mat4::identity(),
            projection: Mat4::identity(),
            observers: ObserverList::new(),
        };

        camera.derive_angles();
        camera.stabilize_up();
        camera.update_view_matrix();
        camera.update_projection_matrix();
        camera
    }

    /// Create a camera at `position` looking at the point `target`
    pub fn looking_at(position: Vec3, target: Vec3, up: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(position, target - position, up, fov_degrees, aspect, near, far)
    }

    /// Move the eye
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
        self.update_view_matrix();
        self.notify();
    }

    /// Point the camera along a new direction
    ///
    /// Yaw and pitch are re-derived from the direction. A zero-length
    /// direction is ignored with a warning.
    pub fn set_target(&mut self, direction: Vec3) {
        let Some(direction) = direction.try_normalize(MIN_DIRECTION_LENGTH) else {
            log::warn!("Ignoring zero-length camera direction");
            return;
        };

        self.direction = direction;
        self.derive_angles();
        self.stabilize_up();
        self.update_view_matrix();
        self.notify();
    }

    /// Point the camera at a world-space point
    pub fn look_at(&mut self, target: Vec3) {
        self.set_target(target - self.position);
    }

    /// Replace the up vector
    pub fn set_up(&mut self, up: Vec3) {
        let Some(up) = up.try_normalize(MIN_DIRECTION_LENGTH) else {
            log::warn!("Ignoring zero-length camera up vector");
            return;
        };

        self.up = up;
        self.stabilize_up();
        self.update_view_matrix();
        self.notify();
    }

    /// Replace every projection parameter
    pub fn set_perspective(&mut self, fov_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.fov_degrees = fov_degrees;
        self.aspect = aspect;
        self.near = near;
        self.far = far;
        self.update_projection_matrix();
        self.notify();
    }

    /// Replace the aspect ratio (window resize)
    ///
    /// Non-positive or non-finite ratios, as produced by a minimized window,
    /// are ignored.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if !(aspect.is_finite() && aspect > 0.0) {
            log::debug!("Ignoring aspect ratio {}", aspect);
            return;
        }

        self.aspect = aspect;
        self.update_projection_matrix();
        self.notify();
    }

    /// Turn the camera by yaw and pitch deltas, in radians
    ///
    /// Pitch is clamped to ±89°. If the new direction comes too close to the
    /// up vector, an orthogonal up vector is rebuilt from the world up axis.
    pub fn update_direction(&mut self, delta_yaw: f32, delta_pitch: f32) {
        let max_pitch = utils::deg_to_rad(MAX_PITCH_DEGREES);
        let yaw = self.yaw + delta_yaw;
        let pitch = utils::clamp(self.pitch + delta_pitch, -max_pitch, max_pitch);

        let raw = Vec3::new(pitch.cos() * yaw.cos(), pitch.sin(), pitch.cos() * yaw.sin());
        let Some(direction) = raw.try_normalize(MIN_DIRECTION_LENGTH) else {
            log::warn!("Camera direction degenerated (length {}), update ignored", raw.norm());
            return;
        };

        self.yaw = yaw;
        self.pitch = pitch;
        self.direction = direction;
        self.stabilize_up();
        self.update_view_matrix();
        self.notify();
    }

    /// Register an observer (idempotent)
    pub fn attach(&mut self, observer: &Rc<dyn CameraObserver>) {
        if self.observers.attach(observer) {
            log::debug!("Camera observer attached ({} total)", self.observers.len());
        }
    }

    /// Unregister an observer; does nothing if it was not attached
    pub fn detach(&mut self, observer: &Rc<dyn CameraObserver>) {
        self.observers.detach(observer);
    }

    /// Number of attached observers
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Eye position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit viewing direction
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Unit up vector
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Unit right vector
    pub fn right(&self) -> Vec3 {
        self.direction.cross(&self.up).try_normalize(MIN_DIRECTION_LENGTH).unwrap_or_else(Vec3::x)
    }

    /// Point one unit ahead of the eye
    pub fn target(&self) -> Vec3 {
        self.position + self.direction
    }

    /// Yaw in radians
    pub const fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in radians
    pub const fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees
    pub const fn fov(&self) -> f32 {
        self.fov_degrees
    }

    /// Aspect ratio
    pub const fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Near clipping plane
    pub const fn near(&self) -> f32 {
        self.near
    }

    /// Far clipping plane
    pub const fn far(&self) -> f32 {
        self.far
    }

    /// View matrix
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// Projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// Projection × view
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection * self.view
    }

    fn derive_angles(&mut self) {
        let max_pitch = utils::deg_to_rad(MAX_PITCH_DEGREES);
        self.pitch = utils::clamp(self.direction.y.clamp(-1.0, 1.0).asin(), -max_pitch, max_pitch);
        self.yaw = self.direction.z.atan2(self.direction.x);
    }

    fn stabilize_up(&mut self) {
        if self.direction.dot(&self.up).abs() <= UP_ALIGNMENT_LIMIT {
            return;
        }

        let world_up = if self.direction.y.abs() < 0.9 { Vec3::y() } else { Vec3::x() };
        let right = self.direction.cross(&world_up).normalize();
        self.up = right.cross(&self.direction).normalize();
        log::trace!("Camera up vector rebuilt: {:?}", self.up);
    }

    fn update_view_matrix(&mut self) {
        self.view = Mat4::look_at(self.position, self.position + self.direction, self.up);
    }

    fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective(utils::deg_to_rad(self.fov_degrees), self.aspect, self.near, self.far);
    }

    fn notify(&mut self) {
        for observer in self.observers.snapshot() {
            observer.on_camera_changed(self);
        }
    }
}

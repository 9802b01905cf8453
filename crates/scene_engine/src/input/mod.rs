//! Input handling
//!
//! The engine reads input through [`InputSource`], so the camera controller
//! works the same with a glfw window (feature `glfw`) and with scripted
//! input in tests or headless runs.

#[cfg(feature = "glfw")]
pub mod glfw_input;

use std::collections::HashSet;

use crate::core::config::ControlsConfig;
use crate::foundation::math::{utils, Vec3};
use crate::render::Camera;

/// Keys the engine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Move forward
    W,
    /// Strafe left
    A,
    /// Move back
    S,
    /// Strafe right
    D,
    /// Toggle the flashlight
    F,
    /// Move up
    Space,
    /// Move down
    LeftShift,
    /// Scene 1
    Num1,
    /// Scene 2
    Num2,
    /// Scene 3
    Num3,
    /// Scene 4
    Num4,
    /// Quit
    Escape,
}

impl Key {
    /// Keys that trigger a one-shot action on press
    pub const ACTION_KEYS: [Self; 6] = [Self::Num1, Self::Num2, Self::Num3, Self::Num4, Self::F, Self::Escape];
}

/// Polled input state
pub trait InputSource {
    /// Whether `key` is held down
    fn is_key_down(&self, key: Key) -> bool;

    /// Cursor position in window pixels (y grows downward)
    fn cursor_position(&self) -> (f64, f64);

    /// Whether mouse look is engaged (right mouse button held)
    fn is_look_active(&self) -> bool;
}

/// One-shot requests raised by key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerAction {
    /// Make scene `id` current
    SwitchScene(i32),
    /// Flip the spotlight on or off
    ToggleFlashlight,
    /// Close the application
    Quit,
}

/// First-person camera control: WASD + Space/Shift movement, right-mouse look
#[derive(Debug, Clone)]
pub struct CameraController {
    /// Units per second
    pub move_speed: f32,
    /// Degrees of rotation per pixel of cursor travel
    pub mouse_sensitivity: f32,
    last_cursor: Option<(f64, f64)>,
    held: HashSet<Key>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::from_config(&ControlsConfig::default())
    }
}

impl CameraController {
    /// Create a controller
    pub fn new(move_speed: f32, mouse_sensitivity: f32) -> Self {
        Self {
            move_speed,
            mouse_sensitivity,
            last_cursor: None,
            held: HashSet::new(),
        }
    }

    /// Create a controller from the controls section of the config
    pub fn from_config(config: &ControlsConfig) -> Self {
        Self::new(config.move_speed, config.mouse_sensitivity)
    }

    /// Move and turn `camera` for one frame
    pub fn update(&mut self, input: &dyn InputSource, camera: &mut Camera, delta_time: f32) {
        let offset = self.movement(input, camera) * self.move_speed * delta_time;
        if offset != Vec3::zeros() {
            camera.set_position(camera.position() + offset);
        }

        self.look(input, camera);
    }

    fn movement(&self, input: &dyn InputSource, camera: &Camera) -> Vec3 {
        let bindings = [
            (Key::W, camera.direction()),
            (Key::S, -camera.direction()),
            (Key::D, camera.right()),
            (Key::A, -camera.right()),
            (Key::Space, camera.up()),
            (Key::LeftShift, -camera.up()),
        ];

        bindings
            .iter()
            .filter(|(key, _)| input.is_key_down(*key))
            .fold(Vec3::zeros(), |sum, (_, axis)| sum + axis)
    }

    fn look(&mut self, input: &dyn InputSource, camera: &mut Camera) {
        let cursor = input.cursor_position();
        if !input.is_look_active() {
            self.last_cursor = None;
            return;
        }

        if let Some((last_x, last_y)) = self.last_cursor.replace(cursor) {
            #[allow(clippy::cast_possible_truncation)]
            let (dx, dy) = ((cursor.0 - last_x) as f32, (last_y - cursor.1) as f32);
            if dx != 0.0 || dy != 0.0 {
                camera.update_direction(
                    utils::deg_to_rad(dx * self.mouse_sensitivity),
                    utils::deg_to_rad(dy * self.mouse_sensitivity),
                );
            }
        }
    }

    /// Actions for keys pressed since the last call
    ///
    /// A held key fires once; it fires again only after being released.
    pub fn poll_actions(&mut self, input: &dyn InputSource) -> Vec<ControllerAction> {
        let mut actions = Vec::new();

        for key in Key::ACTION_KEYS {
            let down = input.is_key_down(key);
            let pressed = down && self.held.insert(key);
            if !down {
                self.held.remove(&key);
            }
            if !pressed {
                continue;
            }

            let action = match key {
                Key::Num1 => ControllerAction::SwitchScene(1),
                Key::Num2 => ControllerAction::SwitchScene(2),
                Key::Num3 => ControllerAction::SwitchScene(3),
                Key::Num4 => ControllerAction::SwitchScene(4),
                Key::F => ControllerAction::ToggleFlashlight,
                _ => ControllerAction::Quit,
            };
            log::debug!("Input action: {:?}", action);
            actions.push(action);
        }

        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::Cell;

    /// Scripted input
    #[derive(Default)]
    struct FakeInput {
        keys: HashSet<Key>,
        cursor: Cell<(f64, f64)>,
        look: bool,
    }

    impl FakeInput {
        fn with_keys(keys: &[Key]) -> Self {
            Self { keys: keys.iter().copied().collect(), ..Self::default() }
        }
    }

    impl InputSource for FakeInput {
        fn is_key_down(&self, key: Key) -> bool {
            self.keys.contains(&key)
        }

        fn cursor_position(&self) -> (f64, f64) {
            self.cursor.get()
        }

        fn is_look_active(&self) -> bool {
            self.look
        }
    }

    fn camera() -> Camera {
        Camera::new(Vec3::zeros(), -Vec3::z(), Vec3::y(), 45.0, 1.0, 0.1, 100.0)
    }

    #[test]
    fn test_forward_movement() {
        let mut controller = CameraController::default();
        let mut camera = camera();

        controller.update(&FakeInput::with_keys(&[Key::W]), &mut camera, 0.5);
        assert_relative_eq!(camera.position(), Vec3::new(0.0, 0.0, -2.5), epsilon = 1e-5);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut controller = CameraController::default();
        let mut camera = camera();

        controller.update(&FakeInput::with_keys(&[Key::A, Key::D, Key::Space, Key::LeftShift]), &mut camera, 1.0);
        assert_relative_eq!(camera.position(), Vec3::zeros(), epsilon = 1e-5);
    }

    #[test]
    fn test_strafe_and_climb() {
        let mut controller = CameraController::new(1.0, 0.1);
        let mut camera = camera();

        controller.update(&FakeInput::with_keys(&[Key::D, Key::Space]), &mut camera, 1.0);
        assert_relative_eq!(camera.position(), Vec3::new(1.0, 1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_look_needs_active_button_and_previous_cursor() {
        let mut controller = CameraController::default();
        let mut camera = camera();
        let yaw = camera.yaw();

        let mut input = FakeInput::default();
        input.cursor.set((100.0, 100.0));
        controller.update(&input, &mut camera, 0.0);
        input.cursor.set((200.0, 100.0));
        controller.update(&input, &mut camera, 0.0);
        assert_eq!(camera.yaw(), yaw);

        input.look = true;
        controller.update(&input, &mut camera, 0.0);
        assert_eq!(camera.yaw(), yaw);

        input.cursor.set((300.0, 50.0));
        controller.update(&input, &mut camera, 0.0);
        assert_relative_eq!(camera.yaw() - yaw, utils::deg_to_rad(10.0), epsilon = 1e-5);
        assert_relative_eq!(camera.pitch(), utils::deg_to_rad(5.0), epsilon = 1e-5);
    }

    #[test]
    fn test_actions_fire_once_per_press() {
        let mut controller = CameraController::default();
        let pressed = FakeInput::with_keys(&[Key::Num2, Key::F]);

        assert_eq!(
            controller.poll_actions(&pressed),
            vec![ControllerAction::SwitchScene(2), ControllerAction::ToggleFlashlight]
        );
        assert!(controller.poll_actions(&pressed).is_empty());

        assert!(controller.poll_actions(&FakeInput::with_keys(&[Key::F])).is_empty());
        assert_eq!(
            controller.poll_actions(&FakeInput::with_keys(&[Key::Num2])),
            vec![ControllerAction::SwitchScene(2)]
        );
    }

    #[test]
    fn test_escape_requests_quit() {
        let mut controller = CameraController::default();
        assert_eq!(
            controller.poll_actions(&FakeInput::with_keys(&[Key::Escape])),
            vec![ControllerAction::Quit]
        );
    }
}

//! [`InputSource`] for glfw windows

use glfw::{Action, MouseButton, Window};

use super::{InputSource, Key};

const fn glfw_key(key: Key) -> glfw::Key {
    match key {
        Key::W => glfw::Key::W,
        Key::A => glfw::Key::A,
        Key::S => glfw::Key::S,
        Key::D => glfw::Key::D,
        Key::F => glfw::Key::F,
        Key::Space => glfw::Key::Space,
        Key::LeftShift => glfw::Key::LeftShift,
        Key::Num1 => glfw::Key::Num1,
        Key::Num2 => glfw::Key::Num2,
        Key::Num3 => glfw::Key::Num3,
        Key::Num4 => glfw::Key::Num4,
        Key::Escape => glfw::Key::Escape,
    }
}

impl InputSource for Window {
    fn is_key_down(&self, key: Key) -> bool {
        matches!(self.get_key(glfw_key(key)), Action::Press | Action::Repeat)
    }

    fn cursor_position(&self) -> (f64, f64) {
        self.get_cursor_pos()
    }

    fn is_look_active(&self) -> bool {
        self.get_mouse_button(MouseButton::Button2) == Action::Press
    }
}

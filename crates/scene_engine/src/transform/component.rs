//! Transform components
//!
//! A component is one elementary transform. Static components (translate,
//! rotate, scale) only change when re-set explicitly; dynamic components
//! evolve every frame through [`TransformComponent::advance`].

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};

/// Velocities shorter than this leave a dynamic translation at rest
pub const MIN_VELOCITY: f32 = 1.0e-4;

/// One elementary transform
///
/// Rotation angles and rotation speeds are in degrees and degrees/second.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformComponent {
    /// Fixed offset
    Translate(Vec3),

    /// Fixed rotation about an axis
    Rotate {
        /// Rotation axis (need not be normalized)
        axis: Vec3,
        /// Angle in degrees
        angle: f32,
    },

    /// Fixed per-axis scale
    Scale(Vec3),

    /// Rotation whose angle advances at a constant speed, kept in [0, 360)
    DynamicRotate {
        /// Rotation axis (need not be normalized)
        axis: Vec3,
        /// Current angle in degrees
        angle: f32,
        /// Angular speed in degrees per second
        speed: f32,
    },

    /// Position integrated from a velocity
    DynamicTranslate {
        /// Current position
        position: Vec3,
        /// Velocity in units per second
        velocity: Vec3,
    },
}

impl TransformComponent {
    /// Fixed translation
    pub fn translate(offset: Vec3) -> Self {
        Self::Translate(offset)
    }

    /// Fixed rotation, angle in degrees
    pub fn rotate(axis: Vec3, angle_degrees: f32) -> Self {
        Self::Rotate { axis, angle: angle_degrees }
    }

    /// Fixed per-axis scale
    pub fn scale(factors: Vec3) -> Self {
        Self::Scale(factors)
    }

    /// Fixed uniform scale
    pub fn uniform_scale(factor: f32) -> Self {
        Self::Scale(Vec3::repeat(factor))
    }

    /// Spinning rotation starting at `initial_degrees`, advancing `speed` degrees per second
    pub fn dynamic_rotate(axis: Vec3, initial_degrees: f32, speed: f32) -> Self {
        Self::DynamicRotate {
            axis,
            angle: wrap_degrees(initial_degrees),
            speed,
        }
    }

    /// Moving translation starting at `position`
    pub fn dynamic_translate(position: Vec3, velocity: Vec3) -> Self {
        Self::DynamicTranslate { position, velocity }
    }

    /// Whether the component changes on [`advance`](Self::advance)
    pub const fn is_dynamic(&self) -> bool {
        matches!(self, Self::DynamicRotate { .. } | Self::DynamicTranslate { .. })
    }

    /// The 4x4 matrix of this component
    pub fn matrix(&self) -> Mat4 {
        match self {
            Self::Translate(offset) => Mat4::translation(*offset),
            Self::Rotate { axis, angle } | Self::DynamicRotate { axis, angle, .. } => {
                Mat4::rotation_degrees(*axis, *angle)
            }
            Self::Scale(factors) => Mat4::scaling(*factors),
            Self::DynamicTranslate { position, .. } => Mat4::translation(*position),
        }
    }

    /// Step the component forward by `delta_time` seconds
    ///
    /// Static components are left untouched.
    pub fn advance(&mut self, delta_time: f32) {
        match self {
            Self::DynamicRotate { angle, speed, .. } => {
                *angle = wrap_degrees(*angle + *speed * delta_time);
            }
            Self::DynamicTranslate { position, velocity } => {
                if velocity.norm() > MIN_VELOCITY {
                    *position += *velocity * delta_time;
                }
            }
            Self::Translate(_) | Self::Rotate { .. } | Self::Scale(_) => {}
        }
    }

    /// Current position of a translation component
    pub fn position(&self) -> Option<Vec3> {
        match self {
            Self::Translate(offset) => Some(*offset),
            Self::DynamicTranslate { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Current angle of a rotation component, in degrees
    pub fn angle(&self) -> Option<f32> {
        match self {
            Self::Rotate { angle, .. } | Self::DynamicRotate { angle, .. } => Some(*angle),
            _ => None,
        }
    }

    /// Re-set the position of a translation component
    ///
    /// Returns `false` (and changes nothing) for other kinds.
    pub fn set_position(&mut self, new_position: Vec3) -> bool {
        match self {
            Self::Translate(offset) => *offset = new_position,
            Self::DynamicTranslate { position, .. } => *position = new_position,
            _ => return false,
        }
        true
    }

    /// Re-set the velocity of a dynamic translation
    pub fn set_velocity(&mut self, new_velocity: Vec3) -> bool {
        if let Self::DynamicTranslate { velocity, .. } = self {
            *velocity = new_velocity;
            true
        } else {
            false
        }
    }

    /// Re-set the angle of a rotation component, in degrees
    pub fn set_angle(&mut self, degrees: f32) -> bool {
        match self {
            Self::Rotate { angle, .. } => *angle = degrees,
            Self::DynamicRotate { angle, .. } => *angle = wrap_degrees(degrees),
            _ => return false,
        }
        true
    }

    /// Re-set the rotation speed of a dynamic rotation, in degrees per second
    pub fn set_speed(&mut self, degrees_per_second: f32) -> bool {
        if let Self::DynamicRotate { speed, .. } = self {
            *speed = degrees_per_second;
            true
        } else {
            false
        }
    }

    /// Re-set the factors of a scale component
    pub fn set_scale(&mut self, new_factors: Vec3) -> bool {
        if let Self::Scale(factors) = self {
            *factors = new_factors;
            true
        } else {
            false
        }
    }
}

fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

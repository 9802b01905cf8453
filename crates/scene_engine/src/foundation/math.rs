//! Math utilities and types
//!
//! Provides fundamental math types for 3D graphics. Matrices follow the
//! OpenGL conventions the shaders expect: right-handed view space, camera
//! looking down -Z, clip-space depth in [-1, 1].

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Mat3, Mat4};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min { min } else if value > max { max } else { value }
    }

    /// Normal matrix for a model matrix: inverse-transpose of the upper 3x3
    ///
    /// A singular matrix (for example a zero scale) yields the identity.
    pub fn normal_matrix(model: &Mat4) -> Mat3 {
        let upper: Mat3 = model.fixed_view::<3, 3>(0, 0).into_owned();
        upper
            .try_inverse()
            .map_or_else(Mat3::identity, |inverse| inverse.transpose())
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Translation matrix
    fn translation(offset: Vec3) -> Mat4;

    /// Non-uniform scale matrix
    fn scaling(factors: Vec3) -> Mat4;

    /// Rotation about an arbitrary axis, angle in degrees
    ///
    /// A zero-length axis yields the identity.
    fn rotation_degrees(axis: Vec3, degrees: f32) -> Mat4;

    /// Create a perspective projection matrix (fov in radians, depth in [-1, 1])
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn translation(offset: Vec3) -> Mat4 {
        Mat4::new_translation(&offset)
    }

    fn scaling(factors: Vec3) -> Mat4 {
        Mat4::new_nonuniform_scaling(&factors)
    }

    fn rotation_degrees(axis: Vec3, degrees: f32) -> Mat4 {
        Unit::try_new(axis, 1.0e-6).map_or_else(Mat4::identity, |axis| {
            Mat4::from_axis_angle(&axis, utils::deg_to_rad(degrees))
        })
    }

    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        // P = [1/(a·t)  0    0             0           ]
        //     [0        1/t  0             0           ]
        //     [0        0    -(f+n)/(f-n)  -2fn/(f-n)  ]
        //     [0        0    -1            0           ]
        let tan_half_fovy = (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();
        result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        result[(1, 1)] = 1.0 / tan_half_fovy;
        result[(2, 2)] = -(far + near) / (far - near);
        result[(2, 3)] = -(2.0 * far * near) / (far - near);
        result[(3, 2)] = -1.0;

        result
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let right = forward.cross(&up).normalize();
        let camera_up = right.cross(&forward);

        let translation = Mat4::new(
            1.0, 0.0, 0.0, -eye.x,
            0.0, 1.0, 0.0, -eye.y,
            0.0, 0.0, 1.0, -eye.z,
            0.0, 0.0, 0.0, 1.0,
        );

        let rotation = Mat4::new(
            right.x, right.y, right.z, 0.0,
            camera_up.x, camera_up.y, camera_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_look_at_matches_nalgebra() {
        let eye = Vec3::new(1.0, 2.0, 5.0);
        let target = Vec3::new(0.0, 0.5, 0.0);
        let up = Vec3::new(0.0, 1.0, 0.0);

        let ours = Mat4::look_at(eye, target, up);
        let reference = Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up);

        assert_relative_eq!(ours, reference, epsilon = 1e-5);
    }

    #[test]
    fn test_perspective_matches_nalgebra() {
        let ours = Mat4::perspective(utils::deg_to_rad(45.0), 4.0 / 3.0, 0.1, 100.0);
        let reference = Mat4::new_perspective(4.0 / 3.0, utils::deg_to_rad(45.0), 0.1, 100.0);

        assert_relative_eq!(ours, reference, epsilon = 1e-5);
    }

    #[test]
    fn test_rotation_with_zero_axis_is_identity() {
        let m = Mat4::rotation_degrees(Vec3::zeros(), 90.0);
        assert_relative_eq!(m, Mat4::identity());
    }

    #[test]
    fn test_rotation_degrees_quarter_turn() {
        let m = Mat4::rotation_degrees(Vec3::new(0.0, 0.0, 2.0), 90.0);
        let rotated = m.transform_vector(&Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(rotated, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_normal_matrix_undoes_non_uniform_scale() {
        let model = Mat4::scaling(Vec3::new(2.0, 1.0, 1.0));
        let normal = utils::normal_matrix(&model);
        assert_relative_eq!(normal[(0, 0)], 0.5, epsilon = 1e-6);
        assert_relative_eq!(normal[(1, 1)], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_normal_matrix_singular_falls_back() {
        let model = Mat4::scaling(Vec3::new(0.0, 1.0, 1.0));
        assert_eq!(utils::normal_matrix(&model), Mat3::identity());
    }
}

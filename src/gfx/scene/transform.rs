//! Position, orientation and scale of a scene object

use cgmath::{InnerSpace, Matrix3, Matrix4, One, Quaternion, Rad, Rotation3, Vector3, Zero};

/// Below this squared length a direction is treated as degenerate
const EPSILON: f32 = 1e-8;

/// Translation, rotation and scale, composed as `T * R * S`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vector3::new(scale, scale, scale);
    }

    /// Rotation from Euler angles applied in X, Y, Z order
    pub fn set_euler_xyz(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = euler_xyz(x, y, z);
    }

    /// Orients local +Z toward `target`
    ///
    /// Leaves the rotation unchanged when `target` coincides with the position,
    /// and picks another up vector when the view direction is parallel to `up`.
    pub fn look_at(&mut self, target: Vector3<f32>, up: Vector3<f32>) {
        let forward = target - self.position;
        if forward.magnitude2() < EPSILON {
            return;
        }
        let forward = forward.normalize();

        let mut right = up.cross(forward);
        if right.magnitude2() < EPSILON {
            let alternate = if forward.z.abs() < 0.9 {
                Vector3::unit_z()
            } else {
                Vector3::unit_x()
            };
            right = alternate.cross(forward);
        }
        let right = right.normalize();
        let up = forward.cross(right);

        self.rotation = Quaternion::from(Matrix3::from_cols(right, up, forward)).normalize();
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// Quaternion for Euler angles applied in X, Y, Z order
pub fn euler_xyz(x: f32, y: f32, z: f32) -> Quaternion<f32> {
    Quaternion::from_angle_x(Rad(x))
        * Quaternion::from_angle_y(Rad(y))
        * Quaternion::from_angle_z(Rad(z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Rotation;

    fn assert_close(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).magnitude() < 1e-4, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_look_at_points_z_at_target() {
        let mut transform = Transform::from_position(Vector3::new(1.0, 2.0, 3.0));
        let target = Vector3::new(4.0, -1.0, 7.0);
        transform.look_at(target, Vector3::unit_y());

        let forward = transform.rotation.rotate_vector(Vector3::unit_z());
        assert_close(forward, (target - transform.position).normalize());

        // Local X stays horizontal with a Y up vector
        let right = transform.rotation.rotate_vector(Vector3::unit_x());
        assert!(right.y.abs() < 1e-5);
    }

    #[test]
    fn test_look_at_same_point_keeps_rotation() {
        let mut transform = Transform::default();
        transform.set_euler_xyz(0.3, 0.2, 0.1);
        let before = transform.rotation;
        transform.look_at(Vector3::zero(), Vector3::unit_y());
        assert_eq!(transform.rotation, before);
    }

    #[test]
    fn test_look_at_along_up_uses_alternate_axis() {
        let mut transform = Transform::default();
        transform.look_at(Vector3::new(0.0, 5.0, 0.0), Vector3::unit_y());
        let forward = transform.rotation.rotate_vector(Vector3::unit_z());
        assert_close(forward, Vector3::unit_y());
        assert!(!transform.rotation.s.is_nan());
    }

    #[test]
    fn test_matrix_order_is_translate_rotate_scale() {
        let mut transform = Transform::from_position(Vector3::new(10.0, 0.0, 0.0));
        transform.set_uniform_scale(2.0);
        transform.set_euler_xyz(0.0, std::f32::consts::FRAC_PI_2, 0.0);

        let p = transform.to_matrix() * Vector3::new(1.0, 0.0, 0.0).extend(1.0);
        // Scale to 2, rotate +X onto -Z, then translate
        assert_close(p.truncate(), Vector3::new(10.0, 0.0, -2.0));
    }

    #[test]
    fn test_euler_order_applies_x_last() {
        let q = euler_xyz(std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2, 0.0);
        let v = q.rotate_vector(Vector3::unit_z());
        // Ry takes +Z to +X, Rx leaves +X alone
        assert_close(v, Vector3::unit_x());
    }
}

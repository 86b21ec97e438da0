use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use crate::config::CameraConfig;
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Where [`OrbitCamera::reset_to_default`] returns to.
#[derive(Debug, Clone, Copy)]
pub struct CameraHome {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub target: Vector3<f32>,
}

/// Camera orbiting `target` on a sphere of radius `distance`.
///
/// `pitch` is the elevation above the XZ plane and `yaw` the azimuth measured
/// from +Z toward +X. World up is +Y.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub home: CameraHome,
    pub uniform: CameraUniform,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.build_projection_matrix() * self.build_view_matrix()
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // Will be auto-calculated in `update()` nevertheless.
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Rad(std::f32::consts::PI / 4.0),
            znear: 0.1,
            zfar: 1000.0,
            home: CameraHome {
                distance,
                pitch,
                yaw,
                target,
            },
            uniform: CameraUniform::default(),
        };
        camera.update();
        camera
    }

    /// Builds a camera from the configured lens, bounds and starting pose.
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self::new(
            config.distance,
            config.pitch,
            config.yaw,
            Vector3::zero(),
            aspect,
        );
        camera.fovy = Deg(config.fov_y_degrees).into();
        camera.znear = config.near;
        camera.zfar = config.far;
        camera.bounds.min_distance = Some(config.min_distance);
        camera.bounds.max_distance = Some(config.max_distance);
        camera.set_distance(config.distance);
        camera.home.distance = camera.distance;
        camera
    }

    pub fn reset_to_default(&mut self) {
        self.distance = self.home.distance;
        self.pitch = self.home.pitch;
        self.yaw = self.home.yaw;
        self.target = self.home.target;

        self.update(); // Recalculate eye position
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    /// Multiplies the distance by `scale`, staying within bounds.
    pub fn scale_distance(&mut self, scale: f32) {
        self.set_distance(self.distance * scale);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        let mut bounded_yaw = yaw;
        if let Some(min_yaw) = self.bounds.min_yaw {
            bounded_yaw = bounded_yaw.clamp(min_yaw, f32::MAX);
        }
        if let Some(max_yaw) = self.bounds.max_yaw {
            bounded_yaw = bounded_yaw.clamp(f32::MIN, max_yaw);
        }
        self.yaw = bounded_yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Moves the target in the plane orthogonal to world up.
    ///
    /// `delta.0` moves along the camera's right vector, `delta.1` along the
    /// view direction projected onto the ground plane.
    pub fn pan(&mut self, delta: (f32, f32)) {
        let (right, forward) = self.ground_axes();
        self.target += right * delta.0 + forward * delta.1;
        self.update();
    }

    /// Camera right vector and the horizontal forward vector.
    pub fn ground_axes(&self) -> (Vector3<f32>, Vector3<f32>) {
        let to_target = self.target - self.eye;
        let mut right = to_target.cross(self.up);
        if right.magnitude2() < f32::EPSILON {
            // Looking straight down the up axis: fall back to the yaw direction
            right = Vector3::new(self.yaw.cos(), 0.0, -self.yaw.sin());
        }
        let right = right.normalize();
        let forward = self.up.cross(right).normalize();
        (right, forward)
    }

    /// World units covered by one pixel at the target's depth.
    pub fn world_units_per_pixel(&self, viewport_height: f32) -> f32 {
        if viewport_height <= 0.0 {
            return 0.0;
        }
        2.0 * self.distance * (self.fovy.0 * 0.5).tan() / viewport_height
    }

    /// Updates the camera after changing `distance`, `pitch`, `yaw` or `target`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn build_view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        Matrix4::look_at_rh(eye, target, self.up)
    }

    pub fn build_projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view = convert_matrix4_to_array(self.build_view_matrix());
        self.uniform.proj = convert_matrix4_to_array(self.build_projection_matrix());
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub min_yaw: Option<f32>,
    pub max_yaw: Option<f32>,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        // Keeps the eye off the poles where the view basis degenerates
        let pole_margin = 1e-4;
        Self {
            min_distance: None,
            max_distance: None,
            min_pitch: -std::f32::consts::FRAC_PI_2 + pole_margin,
            max_pitch: std::f32::consts::FRAC_PI_2 - pole_margin,
            min_yaw: None,
            max_yaw: None,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_eye_on_positive_z_at_zero_angles() {
        let camera = OrbitCamera::new(10.0, 0.0, 0.0, Vector3::zero(), 1.0);
        assert!(approx(camera.eye.x, 0.0));
        assert!(approx(camera.eye.y, 0.0));
        assert!(approx(camera.eye.z, 10.0));
    }

    #[test]
    fn test_eye_keeps_distance_from_target() {
        let target = Vector3::new(1.0, 2.0, 3.0);
        let camera = OrbitCamera::new(7.5, 0.3, 1.1, target, 1.5);
        assert!(approx((camera.eye - target).magnitude(), 7.5));
        assert!(camera.eye.y > target.y);
    }

    #[test]
    fn test_distance_is_clamped() {
        let mut camera = OrbitCamera::from_config(&CameraConfig::default(), 1.0);
        camera.set_distance(10_000.0);
        assert_eq!(camera.distance, 2000.0);
        camera.scale_distance(0.0);
        assert_eq!(camera.distance, 1.0);
    }

    #[test]
    fn test_pitch_never_reaches_the_pole() {
        let mut camera = OrbitCamera::new(10.0, 0.0, 0.0, Vector3::zero(), 1.0);
        camera.add_pitch(10.0);
        assert!(camera.pitch < std::f32::consts::FRAC_PI_2);
        let (right, forward) = camera.ground_axes();
        assert!(approx(right.magnitude(), 1.0));
        assert!(approx(forward.y, 0.0));
    }

    #[test]
    fn test_pan_stays_in_ground_plane() {
        let mut camera = OrbitCamera::new(10.0, 0.8, 0.4, Vector3::zero(), 1.0);
        camera.pan((3.0, -2.0));
        assert!(approx(camera.target.y, 0.0));
        assert!(approx(camera.target.magnitude(), 13.0_f32.sqrt()));
        // The orbit follows the target
        assert!(approx((camera.eye - camera.target).magnitude(), 10.0));
    }

    #[test]
    fn test_reset_returns_home() {
        let mut camera = OrbitCamera::from_config(&CameraConfig::default(), 1.0);
        camera.add_yaw(1.0);
        camera.pan((5.0, 5.0));
        camera.set_distance(300.0);
        camera.reset_to_default();
        assert_eq!(camera.distance, 60.0);
        assert_eq!(camera.yaw, 0.0);
        assert_eq!(camera.target, Vector3::zero());
    }

    #[test]
    fn test_config_lens() {
        let camera = OrbitCamera::from_config(&CameraConfig::default(), 1.5);
        assert!(approx(Deg::from(camera.fovy).0, 25.0));
        assert_eq!(camera.zfar, 4000.0);
        assert_eq!(camera.znear, 0.1);
    }

    #[test]
    fn test_world_units_per_pixel() {
        let camera = OrbitCamera::new(10.0, 0.0, 0.0, Vector3::zero(), 1.0);
        let expected = 2.0 * 10.0 * (std::f32::consts::PI / 8.0).tan() / 500.0;
        assert!(approx(camera.world_units_per_pixel(500.0), expected));
        assert_eq!(camera.world_units_per_pixel(0.0), 0.0);
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let mut camera = OrbitCamera::new(20.0, 0.4, 0.9, Vector3::new(2.0, 0.0, -1.0), 1.3);
        camera.update_view_proj();
        let clip = camera.build_view_projection_matrix() * camera.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(approx(ndc.x, 0.0));
        assert!(approx(ndc.y, 0.0));
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}

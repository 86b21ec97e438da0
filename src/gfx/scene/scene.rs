use cgmath::{Matrix4, Vector3};
use wgpu::Device;

use crate::gfx::{
    camera::camera_utils::CameraManager,
    resources::material::{Material, MaterialManager},
};
use crate::wgpu_utils::binding_builder::BindGroupLayoutWithDesc;

use super::{light::SceneLights, object::Object, starfield::Starfield, transform::euler_xyz};

/// Main scene containing objects, materials, lights and camera
///
/// Everything hangs off a root whose rotation is driven by dragging; object,
/// star and light positions are all relative to it.
pub struct Scene {
    pub camera_manager: CameraManager,
    pub objects: Vec<Object>,
    pub material_manager: MaterialManager, // Centralized material storage
    pub lights: SceneLights,
    pub starfield: Option<Starfield>,
    /// Euler angles of the root about X and Y, in radians
    pub root_rotation: [f32; 2],
    pub clear_color: [f32; 3],
}

impl Scene {
    /// Creates a new scene with the given camera manager
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            objects: Vec::new(),
            material_manager: MaterialManager::new(), // Initialize with default material
            lights: SceneLights::default(),
            starfield: None,
            root_rotation: [0.0, 0.0],
            clear_color: [0.0, 0.0, 0.0],
        }
    }

    /// Updates the scene (camera matrices, etc.)
    pub fn update(&mut self) {
        self.camera_manager.update();
    }

    /// Adds an object, renaming it if the name is taken. Returns its index.
    pub fn add_object(&mut self, mut object: Object) -> usize {
        object.name = self.ensure_unique_name(&object.name);
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn add_material(&mut self, material: Material) {
        self.material_manager.add_material(material);
    }

    pub fn find_object(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|obj| obj.name == name)
    }

    pub fn find_object_mut(&mut self, name: &str) -> Option<&mut Object> {
        self.objects.iter_mut().find(|obj| obj.name == name)
    }

    /// Gets mutable reference to an object by index
    pub fn get_object_mut(&mut self, index: usize) -> Option<&mut Object> {
        self.objects.get_mut(index)
    }

    /// Gets immutable reference to an object by index
    pub fn get_object(&self, index: usize) -> Option<&Object> {
        self.objects.get(index)
    }

    /// Turns the root by a mouse drag of `delta` pixels
    ///
    /// Horizontal motion spins about Y and vertical motion about X.
    pub fn rotate_root(&mut self, delta: (f32, f32), radians_per_pixel: f32) {
        self.root_rotation[1] += delta.0 * radians_per_pixel;
        self.root_rotation[0] += delta.1 * radians_per_pixel;
    }

    pub fn root_matrix(&self) -> Matrix4<f32> {
        Matrix4::from(euler_xyz(self.root_rotation[0], self.root_rotation[1], 0.0))
    }

    /// Lights with the point light carried along by the root rotation
    pub fn world_lights(&self) -> SceneLights {
        let p = self.lights.point_position;
        let world = self.root_matrix() * Vector3::new(p[0], p[1], p[2]).extend(1.0);
        SceneLights {
            point_position: [world.x, world.y, world.z],
            ..self.lights
        }
    }

    /// Syncs objects and materials with the GPU
    ///
    /// Uploads new or replaced geometry, writes world transforms and material
    /// uniforms, and binds textures to materials that need them.
    pub fn update_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        transform_layout: &BindGroupLayoutWithDesc,
        material_layout: &BindGroupLayoutWithDesc,
    ) {
        let root = self.root_matrix();
        for object in self.objects.iter_mut() {
            object.update_gpu_resources(device, queue, transform_layout, root);
        }

        self.material_manager
            .update_gpu_resources(device, queue, material_layout);
    }

    /// Gets material for rendering an object
    pub fn get_material_for_object(&self, object: &Object) -> Option<&Material> {
        self.material_manager
            .get_material_for_object(object.get_material_id())
    }

    // UI helper methods

    /// Gets all object names for UI display
    pub fn get_object_names(&self) -> Vec<String> {
        self.objects.iter().map(|obj| obj.name.clone()).collect()
    }

    /// Gets the total number of objects
    pub fn get_object_count(&self) -> usize {
        self.objects.len()
    }

    /// Gets statistics about the scene
    pub fn get_statistics(&self) -> SceneStatistics {
        let total_triangles: u32 = self.objects.iter().map(|obj| obj.triangle_count()).sum();
        let total_vertices: u32 = self.objects.iter().map(|obj| obj.vertex_count()).sum();

        SceneStatistics {
            object_count: self.objects.len(),
            visible_count: self.objects.iter().filter(|obj| obj.visible).count(),
            material_count: self.material_manager.list_materials().len(),
            texture_count: self.material_manager.texture_count(),
            star_count: self.starfield.as_ref().map_or(0, |s| s.len()),
            total_triangles,
            total_vertices,
        }
    }

    pub fn ensure_unique_name(&self, desired_name: &str) -> String {
        let mut counter = 0;
        let mut test_name = desired_name.to_string();

        while self.objects.iter().any(|obj| obj.name == test_name) {
            counter += 1;
            test_name = format!("{} ({})", desired_name, counter);
        }

        test_name
    }
}

/// Scene statistics for debugging and UI display
#[derive(Debug)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub visible_count: usize,
    pub material_count: usize,
    pub texture_count: usize,
    pub star_count: usize,
    pub total_triangles: u32,
    pub total_vertices: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::gfx::camera::{CameraController, OrbitCamera};
    use crate::gfx::geometry::generate_sphere_with_radius;
    use crate::gfx::scene::object::Topology;

    fn scene() -> Scene {
        let config = CameraConfig::default();
        Scene::new(CameraManager::new(
            OrbitCamera::from_config(&config, 1.5),
            CameraController::from_config(&config),
        ))
    }

    fn sphere(name: &str) -> Object {
        Object::from_geometry(name, &generate_sphere_with_radius(1.0, 8, 6), Topology::Triangles)
    }

    #[test]
    fn test_duplicate_names_get_suffixes() {
        let mut scene = scene();
        scene.add_object(sphere("Planet"));
        scene.add_object(sphere("Planet"));
        scene.add_object(sphere("Planet"));
        assert_eq!(
            scene.get_object_names(),
            vec!["Planet", "Planet (1)", "Planet (2)"]
        );
    }

    #[test]
    fn test_find_object_by_name() {
        let mut scene = scene();
        let index = scene.add_object(sphere("Moon"));
        assert_eq!(index, 0);
        assert!(scene.find_object("Moon").is_some());
        assert!(scene.find_object("Phobos").is_none());

        scene.find_object_mut("Moon").unwrap().visible = false;
        assert!(!scene.get_object(0).unwrap().visible);
    }

    #[test]
    fn test_root_rotation_moves_point_light() {
        let mut scene = scene();
        scene.lights.point_position = [0.0, 0.0, 10.0];
        // Half a turn about Y
        scene.rotate_root((std::f32::consts::PI / 0.005, 0.0), 0.005);

        let light = scene.world_lights().point_position;
        assert!((light[2] + 10.0).abs() < 1e-3);
        assert!(light[0].abs() < 1e-3);
    }

    #[test]
    fn test_statistics_count_visible_objects_and_stars() {
        let mut scene = scene();
        scene.add_object(sphere("Earth"));
        let hidden = scene.add_object(sphere("Clouds"));
        scene.objects[hidden].visible = false;
        scene.starfield = Some(Starfield::new("Star Field", vec![[0.0; 3]; 10]));

        let stats = scene.get_statistics();
        assert_eq!(stats.object_count, 2);
        assert_eq!(stats.visible_count, 1);
        assert_eq!(stats.star_count, 10);
        assert_eq!(stats.total_vertices, 2 * 9 * 7);
    }
}

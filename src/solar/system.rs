//! The Earth–Moon system and its surroundings as a [`Simulation`]
//!
//! Builds every scene object once, then each frame advances the clock, places
//! the bodies and pushes parameter edits from the panel into geometry,
//! materials, stars and lights.

use cgmath::{Vector3, Zero};
use imgui::Ui;

use super::orbit::{
    moon_position, orbit_position, per_frame_to_per_second, satellite_heading, satellite_position,
};
use super::params::SystemParams;
use super::starfield::star_positions;
use crate::config::AssetConfig;
use crate::gfx::assets::{load_model, load_texture, ModelData};
use crate::gfx::geometry::{
    generate_cube, generate_ring, generate_sphere_with_radius, generate_torus, GeometryData,
};
use crate::gfx::resources::material::Material;
use crate::gfx::scene::{
    light::SceneLights,
    object::{Mesh, Object, Topology},
    scene::Scene,
    starfield::Starfield,
};
use crate::simulation::traits::Simulation;
use crate::ui::panel::controls_panel;

const EARTH_MATERIAL: &str = "earth";
const CLOUD_MATERIAL: &str = "clouds";
const MOON_MATERIAL: &str = "moon";
const MOON_ORBIT_MATERIAL: &str = "moon_orbit";
const SATELLITE_ORBIT_MATERIAL: &str = "satellite_orbit";
const SUN_MATERIAL: &str = "sun";

/// Edge of the stand-in cube before the satellite scale is applied
const SATELLITE_FALLBACK_SIZE: f32 = 50.0;

/// Segments of the unit spheres scaled into the Sun and planets
const BODY_SEGMENTS: u32 = 32;

fn planet_material(name: &str) -> String {
    format!("planet/{}", name)
}

/// Indices of the objects this simulation drives
#[derive(Debug, Clone)]
struct Handles {
    earth: usize,
    clouds: usize,
    moon: usize,
    moon_orbit: usize,
    satellite: usize,
    satellite_orbit: usize,
    sun: usize,
    planets: Vec<usize>,
}

pub struct SolarSystem {
    params: SystemParams,
    initial: SystemParams,
    /// Parameters the scene currently reflects
    applied: SystemParams,
    assets: AssetConfig,
    time: f32,
    moon_spin: f32,
    cloud_spin: f32,
    handles: Option<Handles>,
}

impl SolarSystem {
    pub fn new(params: SystemParams, assets: AssetConfig) -> Self {
        Self {
            initial: params.clone(),
            applied: params.clone(),
            params,
            assets,
            time: 0.0,
            moon_spin: 0.0,
            cloud_spin: 0.0,
            handles: None,
        }
    }

    pub fn params(&self) -> &SystemParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut SystemParams {
        &mut self.params
    }

    /// Decodes `file_name` from the asset directory and registers it under that name
    ///
    /// A missing or broken file is logged and the caller falls back to a flat colour.
    fn register_texture(&self, scene: &mut Scene, file_name: &str) -> bool {
        match load_texture(&self.assets.path(file_name)) {
            Ok(texture) => {
                scene.material_manager.add_texture(file_name, texture);
                true
            }
            Err(e) => {
                log::warn!("{}; continuing without it", e);
                false
            }
        }
    }

    fn build_earth(&self, scene: &mut Scene) -> (usize, usize) {
        let earth = &self.params.earth;
        let assets = &self.assets;

        let mut material = if self.register_texture(scene, &assets.earth_day_map) {
            Material::new(EARTH_MATERIAL, [1.0, 1.0, 1.0]).with_map(&assets.earth_day_map)
        } else {
            Material::new(EARTH_MATERIAL, [0.2, 0.4, 0.8])
        };
        if self.register_texture(scene, &assets.earth_bump_map) {
            material = material.with_bump_map(&assets.earth_bump_map, earth.bump_scale);
        }
        if self.register_texture(scene, &assets.earth_specular_map) {
            material = material.with_specular_map(&assets.earth_specular_map);
        }
        if self.register_texture(scene, &assets.earth_night_map) {
            material = material.with_night_map(&assets.earth_night_map, earth.night_intensity);
        }
        scene.add_material(material.with_specular(earth.specular, earth.shininess));

        let clouds = if self.register_texture(scene, &assets.earth_cloud_map) {
            Material::new(CLOUD_MATERIAL, [1.0, 1.0, 1.0]).with_map(&assets.earth_cloud_map)
        } else {
            Material::new(CLOUD_MATERIAL, [0.9, 0.9, 0.9])
        };
        scene.add_material(
            clouds
                .with_opacity(earth.cloud_opacity)
                .with_transparency(true),
        );

        let surface = generate_sphere_with_radius(earth.radius, earth.segments, earth.segments);
        let cloud_layer =
            generate_sphere_with_radius(earth.cloud_radius, earth.segments, earth.segments);
        let earth_index = scene.add_object(
            Object::from_geometry("Earth", &surface, Topology::Triangles).with_material(EARTH_MATERIAL),
        );
        let cloud_index = scene.add_object(
            Object::from_geometry("Clouds", &cloud_layer, Topology::Triangles)
                .with_material(CLOUD_MATERIAL),
        );
        (earth_index, cloud_index)
    }

    fn build_moon(&self, scene: &mut Scene) -> (usize, usize) {
        let moon = &self.params.moon;
        let orbit = &self.params.moon_orbit;
        let map = &self.assets.moon_map;

        // The day map doubles as the height map
        let material = if self.register_texture(scene, map) {
            Material::new(MOON_MATERIAL, [1.0, 1.0, 1.0])
                .with_map(map)
                .with_bump_map(map, moon.bump_scale)
        } else {
            Material::new(MOON_MATERIAL, [0.6, 0.6, 0.6])
        };
        scene.add_material(material);
        scene.add_material(
            Material::unlit(MOON_ORBIT_MATERIAL, orbit.color)
                .with_opacity(orbit.opacity)
                .with_transparency(true),
        );

        let sphere = generate_sphere_with_radius(moon.radius, moon.segments, moon.segments);
        let moon_index = scene.add_object(
            Object::from_geometry("Moon", &sphere, Topology::Triangles).with_material(MOON_MATERIAL),
        );
        let ring = generate_ring(moon.orbit_radius, orbit.segments);
        let orbit_index = scene.add_object(
            Object::from_geometry("Moon Orbit Line", &ring, Topology::LineStrip)
                .with_material(MOON_ORBIT_MATERIAL),
        );
        (moon_index, orbit_index)
    }

    fn build_satellite(&self, scene: &mut Scene) -> (usize, usize) {
        let path = self.assets.path(&self.assets.satellite_model);
        let satellite = match load_model(&path) {
            Ok(model) => satellite_from_model(scene, model),
            Err(e) => {
                log::warn!("{}; using a placeholder cube for the satellite", e);
                let mut cube = generate_cube();
                for vertex in &mut cube.vertices {
                    for axis in vertex.iter_mut() {
                        *axis *= SATELLITE_FALLBACK_SIZE;
                    }
                }
                scene.add_material(Material::new("satellite", [0.75, 0.75, 0.8]));
                Object::from_geometry("Communications Satellite", &cube, Topology::Triangles)
                    .with_material("satellite")
            }
        };
        let satellite_index = scene.add_object(satellite);

        let orbit = &self.params.satellite_orbit;
        scene.add_material(
            Material::unlit(SATELLITE_ORBIT_MATERIAL, orbit.color)
                .with_opacity(orbit.opacity)
                .with_transparency(true),
        );
        let torus = satellite_orbit_geometry(&self.params);
        let orbit_index = scene.add_object(
            Object::from_geometry("Satellite Orbit", &torus, Topology::Triangles)
                .with_material(SATELLITE_ORBIT_MATERIAL),
        );
        (satellite_index, orbit_index)
    }

    fn build_sun_and_planets(&self, scene: &mut Scene) -> (usize, Vec<usize>) {
        let unit_sphere = generate_sphere_with_radius(1.0, BODY_SEGMENTS, BODY_SEGMENTS);

        scene.add_material(Material::unlit(SUN_MATERIAL, self.params.sun.color));
        let sun = scene.add_object(
            Object::from_geometry("Sun", &unit_sphere, Topology::Triangles).with_material(SUN_MATERIAL),
        );

        let planets = self
            .params
            .planets
            .iter()
            .map(|planet| {
                let material_name = planet_material(&planet.name);
                let mut material = Material::new(&material_name, planet.color);
                if let Some(texture) = &planet.texture {
                    if self.register_texture(scene, texture) {
                        material = material.with_map(texture);
                    }
                }
                scene.add_material(material);
                scene.add_object(
                    Object::from_geometry(&planet.name, &unit_sphere, Topology::Triangles)
                        .with_material(&material_name),
                )
            })
            .collect();

        (sun, planets)
    }

    /// Moves every body to where it is at the current time
    fn place_bodies(&self, scene: &mut Scene, handles: &Handles) {
        let params = &self.params;

        if let Some(moon) = scene.get_object_mut(handles.moon) {
            moon.transform.position = moon_position(self.time, &params.moon);
            if params.moon.tidally_locked {
                moon.transform.look_at(Vector3::zero(), Vector3::unit_y());
            } else {
                moon.transform.set_euler_xyz(0.0, self.moon_spin, 0.0);
            }
        }

        if let Some(clouds) = scene.get_object_mut(handles.clouds) {
            clouds.transform.set_euler_xyz(0.0, self.cloud_spin, 0.0);
        }

        if let Some(satellite) = scene.get_object_mut(handles.satellite) {
            let position = satellite_position(self.time, &params.satellite);
            let heading = satellite_heading(self.time, &params.satellite);
            satellite.transform.position = position;
            satellite.transform.look_at(position + heading, Vector3::unit_y());
            satellite.transform.set_uniform_scale(params.satellite.scale);
        }

        if let Some(orbit) = scene.get_object_mut(handles.satellite_orbit) {
            orbit.transform.set_euler_xyz(
                params.satellite_orbit.inclination_x,
                params.satellite_orbit.inclination_y,
                0.0,
            );
        }

        let sun_position = orbit_position(self.time, &params.sun.orbit);
        if let Some(sun) = scene.get_object_mut(handles.sun) {
            sun.transform.position = sun_position;
            sun.transform.set_uniform_scale(params.sun.radius);
        }

        for (&index, planet) in handles.planets.iter().zip(&params.planets) {
            if let Some(object) = scene.get_object_mut(index) {
                object.transform.position = orbit_position(self.time, &planet.orbit);
                object.transform.set_uniform_scale(planet.radius);
            }
        }

        scene.lights = SceneLights::from(&params.lighting);
        if params.sun.light_follows_sun {
            scene.lights.point_position = sun_position.into();
        }
    }

    /// Rebuilds geometry whose shape parameters changed since the last call
    fn regenerate_geometry(&self, scene: &mut Scene, handles: &Handles) {
        let (now, before) = (&self.params, &self.applied);

        if now.moon.radius != before.moon.radius || now.moon.segments != before.moon.segments {
            log::debug!(
                "Rebuilding moon: radius {}, {} segments",
                now.moon.radius,
                now.moon.segments
            );
            let sphere =
                generate_sphere_with_radius(now.moon.radius, now.moon.segments, now.moon.segments);
            set_geometry(scene, handles.moon, &sphere);
        }

        if now.moon.orbit_radius != before.moon.orbit_radius
            || now.moon_orbit.segments != before.moon_orbit.segments
        {
            log::debug!("Rebuilding moon orbit line: radius {}", now.moon.orbit_radius);
            let ring = generate_ring(now.moon.orbit_radius, now.moon_orbit.segments);
            set_geometry(scene, handles.moon_orbit, &ring);
        }

        let torus_changed = now.satellite.radius != before.satellite.radius
            || now.satellite_orbit.tube_radius != before.satellite_orbit.tube_radius
            || now.satellite_orbit.radial_segments != before.satellite_orbit.radial_segments
            || now.satellite_orbit.tubular_segments != before.satellite_orbit.tubular_segments;
        if torus_changed {
            log::debug!("Rebuilding satellite orbit: radius {}", now.satellite.radius);
            set_geometry(scene, handles.satellite_orbit, &satellite_orbit_geometry(now));
        }

        if now.earth.radius != before.earth.radius
            || now.earth.cloud_radius != before.earth.cloud_radius
            || now.earth.segments != before.earth.segments
        {
            let segments = now.earth.segments;
            let surface = generate_sphere_with_radius(now.earth.radius, segments, segments);
            let clouds = generate_sphere_with_radius(now.earth.cloud_radius, segments, segments);
            set_geometry(scene, handles.earth, &surface);
            set_geometry(scene, handles.clouds, &clouds);
        }
    }

    /// Copies colours and surface settings into the materials
    fn update_materials(&self, scene: &mut Scene) {
        let params = &self.params;
        let materials = &mut scene.material_manager;

        if let Some(earth) = materials.get_material_mut(EARTH_MATERIAL) {
            earth.bump_scale = params.earth.bump_scale;
            earth.specular = params.earth.specular;
            earth.shininess = params.earth.shininess;
            earth.night_intensity = params.earth.night_intensity;
        }
        if let Some(clouds) = materials.get_material_mut(CLOUD_MATERIAL) {
            clouds.opacity = params.earth.cloud_opacity;
        }
        if let Some(moon) = materials.get_material_mut(MOON_MATERIAL) {
            moon.bump_scale = params.moon.bump_scale;
        }
        if let Some(orbit) = materials.get_material_mut(MOON_ORBIT_MATERIAL) {
            orbit.color = params.moon_orbit.color;
            orbit.opacity = params.moon_orbit.opacity;
        }
        if let Some(orbit) = materials.get_material_mut(SATELLITE_ORBIT_MATERIAL) {
            orbit.color = params.satellite_orbit.color;
            orbit.opacity = params.satellite_orbit.opacity;
        }
        if let Some(sun) = materials.get_material_mut(SUN_MATERIAL) {
            sun.color = params.sun.color;
        }
        for planet in &params.planets {
            if let Some(material) = materials.get_material_mut(&planet_material(&planet.name)) {
                material.color = planet.color;
            }
        }
    }

    fn update_stars(&self, scene: &mut Scene) {
        let (now, before) = (&self.params.stars, &self.applied.stars);
        let regenerate =
            now.count != before.count || now.spread != before.spread || now.seed != before.seed;

        let starfield = scene
            .starfield
            .get_or_insert_with(|| Starfield::new("Star Field", star_positions(now)));
        if regenerate {
            log::debug!("Regenerating {} stars", now.count);
            starfield.set_positions(star_positions(now));
        }
        starfield.size = now.size;
        starfield.color = now.color;
        starfield.size_attenuation = now.size_attenuation;
    }

    /// Brings the scene in line with the current time and parameters
    fn apply(&mut self, scene: &mut Scene) {
        let Some(handles) = self.handles.clone() else {
            return;
        };
        self.regenerate_geometry(scene, &handles);
        self.update_materials(scene);
        self.update_stars(scene);
        self.place_bodies(scene, &handles);
        if self.applied != self.params {
            self.applied = self.params.clone();
        }
    }
}

/// Turns an imported model into one object with a material per mesh
fn satellite_from_model(scene: &mut Scene, model: ModelData) -> Object {
    let meshes = model
        .meshes
        .into_iter()
        .enumerate()
        .map(|(index, model_mesh)| {
            let material_name = format!("satellite/{}", index);
            let [r, g, b, a] = model_mesh.material.base_color;
            let mut material = Material::new(&material_name, [r, g, b]).with_opacity(a);
            if let Some(texture) = model_mesh.material.base_color_texture {
                let texture_name = format!("{}/{}", model.name, texture.name);
                scene.material_manager.add_texture(&texture_name, texture);
                material = material.with_map(&texture_name);
            }
            scene.add_material(material);
            Mesh::from_geometry(&model_mesh.geometry).with_material(&material_name)
        })
        .collect();
    Object::new("Communications Satellite", meshes)
}

fn satellite_orbit_geometry(params: &SystemParams) -> GeometryData {
    let orbit = &params.satellite_orbit;
    generate_torus(
        params.satellite.radius,
        orbit.tube_radius,
        orbit.radial_segments,
        orbit.tubular_segments,
    )
}

fn set_geometry(scene: &mut Scene, index: usize, geometry: &GeometryData) {
    if let Some(object) = scene.get_object_mut(index) {
        object.set_geometry(geometry);
    }
}

impl Simulation for SolarSystem {
    fn initialize(&mut self, scene: &mut Scene) {
        let (earth, clouds) = self.build_earth(scene);
        let (moon, moon_orbit) = self.build_moon(scene);
        let (satellite, satellite_orbit) = self.build_satellite(scene);
        let (sun, planets) = self.build_sun_and_planets(scene);

        self.handles = Some(Handles {
            earth,
            clouds,
            moon,
            moon_orbit,
            satellite,
            satellite_orbit,
            sun,
            planets,
        });
        self.applied = self.params.clone();
        scene.starfield = None;
        self.apply(scene);

        log::info!(
            "Built solar system: {} objects, {} stars",
            scene.get_object_count(),
            scene.starfield.as_ref().map_or(0, |s| s.len())
        );
    }

    fn update(&mut self, delta_time: f32, scene: &mut Scene) {
        self.time += delta_time;
        self.moon_spin += per_frame_to_per_second(self.params.moon.rotation_speed) * delta_time;
        self.cloud_spin +=
            per_frame_to_per_second(self.params.earth.cloud_rotation_speed) * delta_time;
        self.apply(scene);
    }

    fn render_ui(&mut self, ui: &Ui, scene: &mut Scene) {
        controls_panel(ui, &mut self.params);
        self.apply(scene);
    }

    fn name(&self) -> &str {
        "Solar System"
    }

    fn elapsed(&self) -> f32 {
        self.time
    }

    fn reset(&mut self, scene: &mut Scene) {
        self.time = 0.0;
        self.moon_spin = 0.0;
        self.cloud_spin = 0.0;
        self.params = self.initial.clone();
        self.apply(scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::gfx::camera::{CameraController, CameraManager, OrbitCamera};
    use cgmath::{InnerSpace, Rotation};
    use std::path::PathBuf;

    fn scene() -> Scene {
        let config = CameraConfig::default();
        Scene::new(CameraManager::new(
            OrbitCamera::from_config(&config, 1.5),
            CameraController::from_config(&config),
        ))
    }

    /// A system whose asset directory is empty, so every load falls back
    fn system() -> SolarSystem {
        let mut params = SystemParams::default();
        params.stars.count = 500;
        params.stars.seed = Some(7);
        let assets = AssetConfig {
            directory: PathBuf::from("no-such-asset-directory"),
            ..Default::default()
        };
        SolarSystem::new(params, assets)
    }

    fn initialized() -> (SolarSystem, Scene) {
        let mut scene = scene();
        let mut system = system();
        system.initialize(&mut scene);
        (system, scene)
    }

    fn position(scene: &Scene, name: &str) -> Vector3<f32> {
        scene.find_object(name).unwrap().transform.position
    }

    #[test]
    fn test_initialize_builds_every_body() {
        let (_, scene) = initialized();
        for name in [
            "Earth",
            "Clouds",
            "Moon",
            "Moon Orbit Line",
            "Communications Satellite",
            "Satellite Orbit",
            "Sun",
            "Venus",
            "Mars",
            "Jupiter",
            "Saturn",
        ] {
            assert!(scene.find_object(name).is_some(), "missing {}", name);
        }
        assert_eq!(scene.find_object("Moon Orbit Line").unwrap().topology, Topology::LineStrip);
        assert_eq!(scene.starfield.as_ref().unwrap().len(), 500);
    }

    #[test]
    fn test_missing_textures_fall_back_to_colors() {
        let (_, scene) = initialized();
        let earth = scene.material_manager.get_material(EARTH_MATERIAL).unwrap();
        assert!(earth.map.is_none());
        assert_eq!(earth.color, [0.2, 0.4, 0.8]);

        let clouds = scene.material_manager.get_material(CLOUD_MATERIAL).unwrap();
        assert!(clouds.transparent);
        assert_eq!(clouds.opacity, 0.4);
    }

    #[test]
    fn test_missing_model_uses_placeholder() {
        let (system, scene) = initialized();
        let satellite = scene.find_object("Communications Satellite").unwrap();
        assert_eq!(satellite.meshes.len(), 1);
        assert_eq!(satellite.transform.scale.x, system.params().satellite.scale);
    }

    #[test]
    fn test_update_moves_the_moon_along_its_orbit() {
        let (mut system, mut scene) = initialized();
        let start = position(&scene, "Moon");
        assert!((start.x - 20.0).abs() < 1e-4);

        system.update(2.0, &mut scene);
        let moved = position(&scene, "Moon");
        assert!((moved - start).magnitude() > 0.1);
        assert!((moved.magnitude() - 20.0).abs() < 1e-3);
        assert_eq!(system.elapsed(), 2.0);
    }

    #[test]
    fn test_locked_moon_faces_the_earth() {
        let (mut system, mut scene) = initialized();
        system.update(3.0, &mut scene);

        let moon = scene.find_object("Moon").unwrap();
        let forward = moon.transform.rotation.rotate_vector(Vector3::unit_z());
        let to_earth = -moon.transform.position.normalize();
        assert!((forward - to_earth).magnitude() < 1e-4);
    }

    #[test]
    fn test_clouds_spin_at_the_frame_rate_independent_rate() {
        let (mut system, mut scene) = initialized();
        system.update(1.0, &mut scene);
        // 0.0003 rad per frame at 60 fps for one second
        assert!((system.cloud_spin - 0.018).abs() < 1e-6);
        let clouds = scene.find_object("Clouds").unwrap();
        assert_ne!(clouds.transform.rotation, cgmath::Quaternion::new(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_moon_segment_edit_rebuilds_sphere() {
        let (mut system, mut scene) = initialized();
        assert_eq!(scene.find_object("Moon").unwrap().vertex_count(), 21 * 21);

        system.params_mut().moon.segments = 30;
        system.update(0.0, &mut scene);
        assert_eq!(scene.find_object("Moon").unwrap().vertex_count(), 31 * 31);
        assert_eq!(system.applied.moon.segments, 30);
    }

    #[test]
    fn test_orbit_opacity_edit_reaches_material() {
        let (mut system, mut scene) = initialized();
        system.params_mut().moon_orbit.opacity = 0.9;
        system.params_mut().satellite_orbit.color = [1.0, 0.0, 0.0];
        system.update(0.0, &mut scene);

        let materials = &scene.material_manager;
        assert_eq!(materials.get_material(MOON_ORBIT_MATERIAL).unwrap().opacity, 0.9);
        assert_eq!(
            materials.get_material(SATELLITE_ORBIT_MATERIAL).unwrap().color,
            [1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_star_count_edit_regenerates_points() {
        let (mut system, mut scene) = initialized();
        let revision = scene.starfield.as_ref().unwrap().revision();

        system.params_mut().stars.size = 2.5;
        system.update(0.0, &mut scene);
        assert_eq!(scene.starfield.as_ref().unwrap().revision(), revision);
        assert_eq!(scene.starfield.as_ref().unwrap().size, 2.5);

        system.params_mut().stars.count = 50;
        system.update(0.0, &mut scene);
        let stars = scene.starfield.as_ref().unwrap();
        assert_eq!(stars.len(), 50);
        assert!(stars.revision() > revision);
    }

    #[test]
    fn test_light_can_follow_the_sun() {
        let (mut system, mut scene) = initialized();
        assert_eq!(scene.lights.point_position, [5.0, 3.0, 5.0]);

        system.params_mut().sun.light_follows_sun = true;
        system.update(1.0, &mut scene);
        let sun = position(&scene, "Sun");
        assert_eq!(scene.lights.point_position, [sun.x, sun.y, sun.z]);
    }

    #[test]
    fn test_reset_restores_time_and_params() {
        let (mut system, mut scene) = initialized();
        let start = position(&scene, "Communications Satellite");

        system.params_mut().satellite.radius = 15.0;
        system.update(5.0, &mut scene);
        system.reset(&mut scene);

        assert_eq!(system.elapsed(), 0.0);
        assert_eq!(system.params().satellite.radius, SystemParams::default().satellite.radius);
        assert!((position(&scene, "Communications Satellite") - start).magnitude() < 1e-5);
    }
}

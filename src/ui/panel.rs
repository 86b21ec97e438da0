// src/ui/panel.rs
//! Debug panels
//!
//! "Controls" edits the live [`SystemParams`] in place, one collapsing folder
//! per body. "Scene Objects" lists every object with a visibility toggle and
//! its current world position.

use std::ops::RangeInclusive;

use imgui::internal::DataTypeKind;

use crate::gfx::scene::scene::Scene;
use crate::solar::params::{
    EarthParams, LightingParams, MoonOrbitParams, MoonParams, OrbitParams, PlanetParams,
    SatelliteOrbitParams, SatelliteParams, StarParams, SunParams, SystemParams,
};

/// Slider over an inclusive range; returns true when the value changed
fn slider<K: DataTypeKind>(ui: &imgui::Ui, label: &str, range: &RangeInclusive<K>, value: &mut K) -> bool {
    ui.slider(label, *range.start(), *range.end(), value)
}

/// The "Controls" window with one folder per body
pub fn controls_panel(ui: &imgui::Ui, params: &mut SystemParams) {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }
    let panel_height = (display_size[1] * 0.85).max(400.0);

    ui.window("Controls")
        .size([380.0, panel_height], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .resizable(true)
        .collapsible(true)
        .build(|| {
            moon_folder(ui, &mut params.moon);
            moon_orbit_folder(ui, &mut params.moon_orbit, &mut params.moon.orbit_radius);
            satellite_folder(ui, &mut params.satellite, &mut params.satellite_orbit);
            stars_folder(ui, &mut params.stars);
            earth_folder(ui, &mut params.earth);
            sun_and_planets_folder(ui, &mut params.sun, &mut params.planets);
            lighting_folder(ui, &mut params.lighting);
        });
}

fn moon_folder(ui: &imgui::Ui, moon: &mut MoonParams) {
    if !ui.collapsing_header("Moon", imgui::TreeNodeFlags::empty()) {
        return;
    }
    let _id = ui.push_id("moon");
    slider(ui, "Radius", &MoonParams::RADIUS_RANGE, &mut moon.radius);
    slider(ui, "Segments", &MoonParams::SEGMENTS_RANGE, &mut moon.segments);
    slider(ui, "Orbit Radius", &MoonParams::ORBIT_RADIUS_RANGE, &mut moon.orbit_radius);
    slider(ui, "Orbit Speed", &MoonParams::ORBIT_SPEED_RANGE, &mut moon.orbit_speed);
    slider(
        ui,
        "Rotation Speed",
        &MoonParams::ROTATION_SPEED_RANGE,
        &mut moon.rotation_speed,
    );
    slider(ui, "Bump Scale", &MoonParams::BUMP_SCALE_RANGE, &mut moon.bump_scale);
    ui.checkbox("Face the Earth", &mut moon.tidally_locked);
}

fn moon_orbit_folder(ui: &imgui::Ui, orbit: &mut MoonOrbitParams, orbit_radius: &mut f32) {
    if !ui.collapsing_header("Moon Orbit", imgui::TreeNodeFlags::DEFAULT_OPEN) {
        return;
    }
    let _id = ui.push_id("moon_orbit");
    ui.color_edit3("Orbit Color", &mut orbit.color);
    slider(ui, "Orbit Opacity", &MoonOrbitParams::OPACITY_RANGE, &mut orbit.opacity);
    slider(ui, "Orbit Segments", &MoonOrbitParams::SEGMENTS_RANGE, &mut orbit.segments);
    slider(ui, "Orbit Radius", &MoonParams::ORBIT_RADIUS_RANGE, orbit_radius);
}

fn satellite_folder(ui: &imgui::Ui, satellite: &mut SatelliteParams, orbit: &mut SatelliteOrbitParams) {
    if !ui.collapsing_header("Satellite", imgui::TreeNodeFlags::DEFAULT_OPEN) {
        return;
    }
    let _id = ui.push_id("satellite");
    slider(ui, "Scale", &SatelliteParams::SCALE_RANGE, &mut satellite.scale);
    slider(ui, "Radius", &SatelliteParams::RADIUS_RANGE, &mut satellite.radius);
    slider(ui, "Orbit Speed", &SatelliteParams::ORBIT_SPEED_RANGE, &mut satellite.orbit_speed);
    slider(
        ui,
        "Vertical Amplitude",
        &SatelliteParams::VERTICAL_AMPLITUDE_RANGE,
        &mut satellite.vertical_amplitude,
    );

    let mut inclination_changed = slider(
        ui,
        "Orbit Inclination X",
        &SatelliteOrbitParams::INCLINATION_RANGE,
        &mut orbit.inclination_x,
    );
    inclination_changed |= slider(
        ui,
        "Orbit Inclination Y",
        &SatelliteOrbitParams::INCLINATION_RANGE,
        &mut orbit.inclination_y,
    );
    if inclination_changed {
        orbit.snap_inclinations();
    }
    ui.color_edit3("Orbit Color", &mut orbit.color);
    slider(ui, "Orbit Opacity", &SatelliteOrbitParams::OPACITY_RANGE, &mut orbit.opacity);
}

fn stars_folder(ui: &imgui::Ui, stars: &mut StarParams) {
    if !ui.collapsing_header("Stars", imgui::TreeNodeFlags::empty()) {
        return;
    }
    let _id = ui.push_id("stars");
    slider(ui, "Size", &StarParams::SIZE_RANGE, &mut stars.size);
    ui.color_edit3("Color", &mut stars.color);
    ui.checkbox("Size Attenuation", &mut stars.size_attenuation);
    // Dragging would regenerate the whole cloud every frame
    let mut count = stars.count;
    slider(ui, "Count", &StarParams::COUNT_RANGE, &mut count);
    if ui.is_item_deactivated_after_edit() {
        stars.count = count;
    }
}

fn earth_folder(ui: &imgui::Ui, earth: &mut EarthParams) {
    if !ui.collapsing_header("Earth", imgui::TreeNodeFlags::empty()) {
        return;
    }
    let _id = ui.push_id("earth");
    slider(ui, "Bump Scale", &EarthParams::BUMP_SCALE_RANGE, &mut earth.bump_scale);
    ui.color_edit3("Specular", &mut earth.specular);
    slider(ui, "Shininess", &EarthParams::SHININESS_RANGE, &mut earth.shininess);
    slider(
        ui,
        "City Lights",
        &EarthParams::NIGHT_INTENSITY_RANGE,
        &mut earth.night_intensity,
    );
    slider(ui, "Cloud Opacity", &EarthParams::CLOUD_OPACITY_RANGE, &mut earth.cloud_opacity);
    slider(
        ui,
        "Cloud Rotation",
        &EarthParams::CLOUD_ROTATION_SPEED_RANGE,
        &mut earth.cloud_rotation_speed,
    );
}

fn orbit_controls(ui: &imgui::Ui, orbit: &mut OrbitParams) {
    slider(ui, "Orbit Radius", &OrbitParams::RADIUS_RANGE, &mut orbit.radius);
    slider(ui, "Orbit Speed", &OrbitParams::SPEED_RANGE, &mut orbit.speed);
    slider(ui, "Inclination", &OrbitParams::INCLINATION_RANGE, &mut orbit.inclination);
}

fn sun_and_planets_folder(ui: &imgui::Ui, sun: &mut SunParams, planets: &mut [PlanetParams]) {
    if !ui.collapsing_header("Sun & Planets", imgui::TreeNodeFlags::empty()) {
        return;
    }
    if let Some(_node) = ui.tree_node("Sun") {
        let _id = ui.push_id("sun");
        slider(ui, "Radius", &SunParams::RADIUS_RANGE, &mut sun.radius);
        ui.color_edit3("Color", &mut sun.color);
        orbit_controls(ui, &mut sun.orbit);
        ui.checkbox("Light Follows Sun", &mut sun.light_follows_sun);
    }
    for (index, planet) in planets.iter_mut().enumerate() {
        let _id = ui.push_id_usize(index);
        if let Some(_node) = ui.tree_node(&planet.name) {
            slider(ui, "Radius", &PlanetParams::RADIUS_RANGE, &mut planet.radius);
            ui.color_edit3("Color", &mut planet.color);
            orbit_controls(ui, &mut planet.orbit);
        }
    }
}

fn lighting_folder(ui: &imgui::Ui, lighting: &mut LightingParams) {
    if !ui.collapsing_header("Lighting", imgui::TreeNodeFlags::empty()) {
        return;
    }
    let _id = ui.push_id("lighting");
    ui.color_edit3("Ambient Color", &mut lighting.ambient_color);
    slider(
        ui,
        "Ambient Intensity",
        &LightingParams::INTENSITY_RANGE,
        &mut lighting.ambient_intensity,
    );
    ui.color_edit3("Light Color", &mut lighting.point_color);
    slider(
        ui,
        "Light Intensity",
        &LightingParams::INTENSITY_RANGE,
        &mut lighting.point_intensity,
    );
    ui.input_float3("Light Position", &mut lighting.point_position).build();
}

/// Object list with visibility toggles and a live world position readout
pub fn scene_objects_panel(ui: &imgui::Ui, scene: &mut Scene) {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }

    ui.window("Scene Objects")
        .size([320.0, 360.0], imgui::Condition::FirstUseEver)
        .position([display_size[0] - 340.0, 190.0], imgui::Condition::FirstUseEver)
        .resizable(true)
        .collapsible(true)
        .build(|| {
            let stats = scene.get_statistics();
            ui.text(format!(
                "{} objects ({} visible), {} materials, {} textures",
                stats.object_count, stats.visible_count, stats.material_count, stats.texture_count
            ));
            ui.text(format!(
                "{} triangles, {} vertices, {} stars",
                stats.total_triangles, stats.total_vertices, stats.star_count
            ));
            ui.separator();

            if let Some(starfield) = scene.starfield.as_mut() {
                ui.checkbox(&starfield.name, &mut starfield.visible);
            }

            for (index, object) in scene.objects.iter_mut().enumerate() {
                let _id = ui.push_id_usize(index);
                ui.checkbox(&object.name, &mut object.visible);
                let position = object.world.w;
                ui.same_line_with_pos(200.0);
                ui.text_disabled(format!(
                    "({:.1}, {:.1}, {:.1})",
                    position.x, position.y, position.z
                ));
            }
        });
}

//! Global uniform bindings for camera and scene data
//!
//! Manages the GPU uniform buffer and bind group for global rendering state
//! that is shared across all objects in a scene: camera matrices, the ambient
//! and point lights, and the viewport size used to size star sprites.

use crate::{
    gfx::{camera::camera_utils::CameraUniform, scene::light::SceneLights},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Global uniform buffer content structure
///
/// MUST match the `Globals` struct in the shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],

    ambient: [f32; 4],        // colour * intensity
    light_position: [f32; 4], // world space, w unused
    light_color: [f32; 4],    // colour * intensity
    viewport: [f32; 4],       // width, height in pixels
}

impl GlobalUBOContent {
    pub fn new(camera: &CameraUniform, lights: &SceneLights, viewport: (u32, u32)) -> Self {
        let scaled = |c: [f32; 3], k: f32| [c[0] * k, c[1] * k, c[2] * k, 1.0];
        let p = lights.point_position;

        Self {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            view: camera.view,
            proj: camera.proj,
            ambient: scaled(lights.ambient_color, lights.ambient_intensity),
            light_position: [p[0], p[1], p[2], 1.0],
            light_color: scaled(lights.point_color, lights.point_intensity),
            viewport: [viewport.0 as f32, viewport.1 as f32, 0.0, 0.0],
        }
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Writes this frame's camera, lights and viewport to the global uniform buffer
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: &CameraUniform,
    lights: &SceneLights,
    viewport: (u32, u32),
) {
    ubo.update_content(queue, GlobalUBOContent::new(camera, lights, viewport));
}

/// Manages bind group layouts and bind groups for global uniforms
///
/// This is bound to slot 0 in all render pipelines.
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    /// Sets up the bind group layout for global uniforms but doesn't
    /// create the actual bind group until `create_bind_group()` is called.
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUBO) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .create(device, "Global Bind Group"),
        );
    }

    /// Used when creating render pipelines that need access to global uniforms.
    pub fn bind_group_layouts(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    /// Returns the bind group, if `create_bind_group()` has been called
    pub fn bind_groups(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_globals_layout_size() {
        // One vec4, three mat4, four vec4
        assert_eq!(std::mem::size_of::<GlobalUBOContent>(), 272);
    }

    #[test]
    fn test_light_intensity_is_premultiplied() {
        let lights = SceneLights {
            ambient_color: [1.0, 0.5, 0.0],
            ambient_intensity: 0.5,
            point_color: [1.0, 1.0, 1.0],
            point_intensity: 2.0,
            point_position: [5.0, 3.0, 5.0],
        };
        let content = GlobalUBOContent::new(&CameraUniform::default(), &lights, (800, 600));
        assert_eq!(content.ambient, [0.5, 0.25, 0.0, 1.0]);
        assert_eq!(content.light_color, [2.0, 2.0, 2.0, 1.0]);
        assert_eq!(content.light_position, [5.0, 3.0, 5.0, 1.0]);
        assert_eq!(content.viewport, [800.0, 600.0, 0.0, 0.0]);
    }
}

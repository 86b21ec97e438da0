//! Instanced star sprites
//!
//! Every star is one instance of a screen-facing quad generated in the vertex
//! shader, so the whole starfield is a single draw call. With size attenuation
//! the quad is `size * (height / 2) / depth` pixels across, never below one pixel.

use cgmath::Matrix4;
use wgpu::{BindGroup, Device, Queue, RenderPass, RenderPipeline};

use crate::gfx::{
    resources::{global_bindings::GlobalBindings, texture_resource::TextureResource},
    scene::{starfield::Starfield, vertex::StarInstance},
};
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder},
    binding_types,
    uniform_buffer::{ArrayBuffer, UniformBuffer},
};

/// Smallest sprite edge in pixels
const MIN_STAR_PIXELS: f32 = 1.0;

/// Per-starfield uniform block
///
/// MUST match the `Stars` struct in [`STAR_SHADER`].
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StarUniform {
    root: [[f32; 4]; 4],
    color: [f32; 4],
    params: [f32; 4], // size, attenuate (0/1), min pixels
}

impl StarUniform {
    pub fn new(starfield: &Starfield, root: Matrix4<f32>) -> Self {
        let c = starfield.color;
        Self {
            root: root.into(),
            color: [c[0], c[1], c[2], 1.0],
            params: [
                starfield.size,
                if starfield.size_attenuation { 1.0 } else { 0.0 },
                MIN_STAR_PIXELS,
                0.0,
            ],
        }
    }
}

/// Draws a [`Starfield`] with one instanced call
pub struct StarRenderer {
    render_pipeline: RenderPipeline,
    uniform: UniformBuffer<StarUniform>,
    bind_group: BindGroup,
    instances: Option<ArrayBuffer<StarInstance>>,
    uploaded_revision: u64,
    enabled: bool,
}

impl StarRenderer {
    pub fn new(device: &Device, surface_format: wgpu::TextureFormat, global_bindings: &GlobalBindings) -> Self {
        let layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Star Bind Group Layout");
        let uniform = UniformBuffer::new(device);
        let bind_group = BindGroupBuilder::new(&layout)
            .resource(uniform.binding_resource())
            .create(device, "Star Bind Group");

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Star Shader"),
            source: wgpu::ShaderSource::Wgsl(STAR_SHADER.into()),
        });

        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Star Pipeline Layout"),
            bind_group_layouts: &[global_bindings.bind_group_layouts(), &layout.layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Star Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[StarInstance::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: TextureResource::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            render_pipeline,
            uniform,
            bind_group,
            instances: None,
            uploaded_revision: 0,
            enabled: false,
        }
    }

    /// Uploads star positions when they changed and refreshes the uniform
    pub fn sync(&mut self, device: &Device, queue: &Queue, starfield: Option<&Starfield>, root: Matrix4<f32>) {
        let Some(starfield) = starfield else {
            self.enabled = false;
            return;
        };
        self.enabled = starfield.visible && !starfield.is_empty();

        if starfield.revision() != self.uploaded_revision {
            match &mut self.instances {
                Some(buffer) => buffer.update_data(device, queue, starfield.instances()),
                None => {
                    self.instances = Some(ArrayBuffer::new_vertex(device, queue, starfield.instances()))
                }
            }
            self.uploaded_revision = starfield.revision();
            log::debug!("Uploaded {} stars", starfield.len());
        }

        self.uniform.update_content(queue, StarUniform::new(starfield, root));
    }

    /// Render the stars inside the main pass
    pub fn render(&self, render_pass: &mut RenderPass<'_>, global_bind_group: &BindGroup) {
        if !self.enabled {
            return;
        }
        let Some(instances) = &self.instances else {
            return;
        };
        if instances.is_empty() {
            return;
        }

        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, global_bind_group, &[]);
        render_pass.set_bind_group(1, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, instances.slice());
        render_pass.draw(0..6, 0..instances.len() as u32);
    }
}

const STAR_SHADER: &str = r#"
struct Globals {
    view_position: vec4<f32>,
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    ambient: vec4<f32>,
    light_position: vec4<f32>,
    light_color: vec4<f32>,
    viewport: vec4<f32>,
}

struct Stars {
    root: mat4x4<f32>,
    color: vec4<f32>,
    params: vec4<f32>, // size, attenuate, min pixels
}

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0)
var<uniform> stars: Stars;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
}

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) position: vec3<f32>,
) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
    );

    let view_position = globals.view * stars.root * vec4<f32>(position, 1.0);
    let clip = globals.proj * view_position;

    var size = stars.params.x;
    if (stars.params.y > 0.5) {
        let depth = max(-view_position.z, 0.0001);
        size = stars.params.x * (globals.viewport.y * 0.5) / depth;
    }
    size = max(size, stars.params.z);

    // Corner offsets are half the edge, NDC spans two units per viewport
    let offset = corners[vertex_index] * size / globals.viewport.xy;

    var out: VertexOutput;
    out.clip_position = vec4<f32>(clip.xy + offset * clip.w, clip.z, clip.w);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(stars.color.rgb, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::SquareMatrix;

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<StarUniform>(), 96);
    }

    #[test]
    fn test_uniform_encodes_attenuation() {
        let mut stars = Starfield::new("Star Field", vec![[0.0; 3]]);
        stars.size = 2.0;
        stars.size_attenuation = false;
        let uniform = StarUniform::new(&stars, Matrix4::identity());
        assert_eq!(uniform.params, [2.0, 0.0, MIN_STAR_PIXELS, 0.0]);
        assert_eq!(uniform.color, [1.0, 1.0, 1.0, 1.0]);
    }
}

//! WGPU-based rendering engine for the orrery
//!
//! Owns the surface, device and queue, the shared bind group layouts and the
//! mesh pipelines. A frame is one main pass (stars, opaque meshes, then blended
//! meshes and orbit lines back to front) followed by the UI overlay.

use std::cmp::Ordering;
use std::sync::Arc;

use cgmath::{InnerSpace, Vector3};
use wgpu::{BlendState, PrimitiveTopology, TextureFormat};

use crate::error::GpuError;
use crate::gfx::{
    resources::{
        global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO},
        material::{material_bind_group_layout, Material, Shading},
        texture_resource::TextureResource,
    },
    scene::{
        object::{transform_bind_group_layout, DrawObject, Topology},
        scene::Scene,
    },
};
use crate::wgpu_utils::binding_builder::BindGroupLayoutWithDesc;

use super::pipeline_manager::{PipelineConfig, PipelineManager};
use super::star_renderer::StarRenderer;

pub const PHONG_PIPELINE: &str = "phong";
pub const PHONG_BLEND_PIPELINE: &str = "phong_blend";
pub const BASIC_PIPELINE: &str = "basic";
pub const BASIC_BLEND_PIPELINE: &str = "basic_blend";
pub const LINE_PIPELINE: &str = "basic_lines";

/// Picks the pipeline that draws a mesh with `material`
pub fn pipeline_for(topology: Topology, material: &Material) -> &'static str {
    match (topology, material.shading, material.transparent) {
        (Topology::LineStrip, _, _) => LINE_PIPELINE,
        (Topology::Triangles, Shading::Phong, false) => PHONG_PIPELINE,
        (Topology::Triangles, Shading::Phong, true) => PHONG_BLEND_PIPELINE,
        (Topology::Triangles, Shading::Unlit, false) => BASIC_PIPELINE,
        (Topology::Triangles, Shading::Unlit, true) => BASIC_BLEND_PIPELINE,
    }
}

/// One mesh queued for drawing
struct DrawItem<'a> {
    object: usize,
    mesh: usize,
    material: &'a Material,
    pipeline: &'static str,
    distance: f32,
}

/// Orders blended draws farthest first
fn back_to_front(a: &DrawItem, b: &DrawItem) -> Ordering {
    b.distance.partial_cmp(&a.distance).unwrap_or(Ordering::Equal)
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    transform_layout: BindGroupLayoutWithDesc,
    material_layout: BindGroupLayoutWithDesc,
    star_renderer: StarRenderer,
}

impl RenderEngine {
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<RenderEngine, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: adapter.limits().max_texture_dimension_2d,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(GpuError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(vsync),
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_ubo = GlobalUBO::new(&device);
        let mut global_bindings = GlobalBindings::new(&device);
        global_bindings.create_bind_group(&device, &global_ubo);

        let transform_layout = transform_bind_group_layout(&device);
        let material_layout = material_bind_group_layout(&device);

        let mut pipeline_manager = PipelineManager::new(device.clone());

        if let Err(e) = pipeline_manager.load_shader("phong", include_str!("phong.wgsl")) {
            log::error!("{}", e);
        }
        if let Err(e) = pipeline_manager.load_shader("basic", include_str!("basic.wgsl")) {
            log::error!("{}", e);
        }

        let layouts = vec![
            global_bindings.bind_group_layouts().clone(),
            transform_layout.layout.clone(),
            material_layout.layout.clone(),
        ];
        let mesh_pipeline = |label: &str, shader: &str| {
            PipelineConfig::default_with_shader(shader)
                .with_label(label)
                .with_bind_group_layouts(layouts.clone())
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_color_target(format, BlendState::REPLACE)
        };

        pipeline_manager.register_pipeline(PHONG_PIPELINE, mesh_pipeline("Phong Pipeline", "phong"));
        pipeline_manager.register_pipeline(
            PHONG_BLEND_PIPELINE,
            mesh_pipeline("Phong Blend Pipeline", "phong")
                .with_depth_read_only()
                .with_color_target(format, BlendState::ALPHA_BLENDING),
        );
        pipeline_manager.register_pipeline(BASIC_PIPELINE, mesh_pipeline("Basic Pipeline", "basic"));
        pipeline_manager.register_pipeline(
            BASIC_BLEND_PIPELINE,
            mesh_pipeline("Basic Blend Pipeline", "basic")
                .with_depth_read_only()
                .with_color_target(format, BlendState::ALPHA_BLENDING),
        );
        pipeline_manager.register_pipeline(
            LINE_PIPELINE,
            mesh_pipeline("Line Pipeline", "basic")
                .with_primitive_topology(PrimitiveTopology::LineStrip)
                .with_cull_mode(None)
                .with_depth_read_only()
                .with_color_target(format, BlendState::ALPHA_BLENDING),
        );

        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for error in errors {
                log::error!("{}", error);
            }
        }

        let star_renderer = StarRenderer::new(&device, format, &global_bindings);

        log::info!(
            "Render engine ready: {}x{} {:?}, vsync {}",
            config.width,
            config.height,
            format,
            vsync
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            format,
            pipeline_manager,
            global_ubo,
            global_bindings,
            transform_layout,
            material_layout,
            star_renderer,
        })
    }

    /// Syncs the scene to the GPU and renders one frame
    ///
    /// `ui_callback` records the overlay into the same encoder after the scene
    /// pass. A lost or outdated surface is reconfigured and the frame skipped;
    /// only unrecoverable surface errors are returned.
    pub fn render_frame<F>(
        &mut self,
        scene: &mut Scene,
        ui_callback: Option<F>,
    ) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        self.prepare(scene);

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out waiting for the surface, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let [r, g, b] = scene.clear_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(global_bind_group) = self.global_bindings.bind_groups() {
                self.star_renderer.render(&mut render_pass, global_bind_group);
                render_pass.set_bind_group(0, global_bind_group, &[]);

                let (opaque, blended) = collect_draws(scene);
                for item in opaque.iter().chain(blended.iter()) {
                    self.draw_item(&mut render_pass, scene, item);
                }
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(&self.device, &self.queue, &mut encoder, &surface_texture_view);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Uploads dirty scene resources and this frame's globals
    fn prepare(&mut self, scene: &mut Scene) {
        scene.update_gpu_resources(
            &self.device,
            &self.queue,
            &self.transform_layout,
            &self.material_layout,
        );

        update_global_ubo(
            &mut self.global_ubo,
            &self.queue,
            &scene.camera_manager.camera.uniform,
            &scene.world_lights(),
            (self.config.width, self.config.height),
        );

        self.star_renderer.sync(
            &self.device,
            &self.queue,
            scene.starfield.as_ref(),
            scene.root_matrix(),
        );
    }

    /// Meshes must outlive the pass, so `scene` shares its lifetime
    fn draw_item<'a>(
        &self,
        render_pass: &mut wgpu::RenderPass<'a>,
        scene: &'a Scene,
        item: &DrawItem,
    ) {
        let object = &scene.objects[item.object];
        let (Some(pipeline), Some(transform), Some(material)) = (
            self.pipeline_manager.pipeline(item.pipeline),
            object.get_transform_bind_group(),
            item.material.get_bind_group(),
        ) else {
            return;
        };

        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(1, transform, &[]);
        render_pass.set_bind_group(2, material, &[]);
        render_pass.draw_mesh(&object.meshes[item.mesh]);
    }

    /// Resizes the surface and depth buffer; zero sizes (minimised windows) are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

/// Splits visible meshes into opaque draws and blended draws sorted back to front
fn collect_draws(scene: &Scene) -> (Vec<DrawItem<'_>>, Vec<DrawItem<'_>>) {
    let eye = scene.camera_manager.camera.eye;
    let mut opaque = Vec::new();
    let mut blended = Vec::new();

    for (object_index, object) in scene.objects.iter().enumerate() {
        if !object.visible {
            continue;
        }
        let position: Vector3<f32> = object.world.w.truncate();
        let distance = (position - eye).magnitude();

        for (mesh_index, mesh) in object.meshes.iter().enumerate() {
            let Some(material) = scene
                .material_manager
                .get_material_for_object(object.material_for_mesh(mesh))
            else {
                continue;
            };
            let item = DrawItem {
                object: object_index,
                mesh: mesh_index,
                material,
                pipeline: pipeline_for(object.topology, material),
                distance,
            };
            if material.transparent || object.topology == Topology::LineStrip {
                blended.push(item);
            } else {
                opaque.push(item);
            }
        }
    }

    blended.sort_by(back_to_front);
    (opaque, blended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::gfx::camera::{CameraController, CameraManager, OrbitCamera};
    use crate::gfx::geometry::{generate_ring, generate_sphere_with_radius};
    use crate::gfx::scene::object::Object;

    fn scene() -> Scene {
        let config = CameraConfig::default();
        Scene::new(CameraManager::new(
            OrbitCamera::from_config(&config, 1.5),
            CameraController::from_config(&config),
        ))
    }

    #[test]
    fn test_pipeline_selection() {
        let phong = Material::new("rock", [1.0; 3]);
        let glass = Material::new("glass", [1.0; 3]).with_opacity(0.4);
        let sun = Material::unlit("sun", [1.0; 3]);
        let band = Material::unlit("band", [1.0; 3]).with_opacity(0.5);

        assert_eq!(pipeline_for(Topology::Triangles, &phong), PHONG_PIPELINE);
        assert_eq!(pipeline_for(Topology::Triangles, &glass), PHONG_BLEND_PIPELINE);
        assert_eq!(pipeline_for(Topology::Triangles, &sun), BASIC_PIPELINE);
        assert_eq!(pipeline_for(Topology::Triangles, &band), BASIC_BLEND_PIPELINE);
        assert_eq!(pipeline_for(Topology::LineStrip, &phong), LINE_PIPELINE);
    }

    #[test]
    fn test_blended_draws_sorted_back_to_front() {
        let mut scene = scene();
        scene.add_material(Material::new("glass", [1.0; 3]).with_opacity(0.5));
        scene.add_material(Material::new("rock", [1.0; 3]));

        let sphere = generate_sphere_with_radius(1.0, 8, 6);
        for (name, material, z) in [
            ("Near", "glass", 50.0),
            ("Far", "glass", -50.0),
            ("Solid", "rock", 0.0),
        ] {
            let mut object = Object::from_geometry(name, &sphere, Topology::Triangles).with_material(material);
            object.world = cgmath::Matrix4::from_translation(Vector3::new(0.0, 0.0, z));
            scene.add_object(object);
        }
        let mut hidden =
            Object::from_geometry("Hidden", &generate_ring(5.0, 16), Topology::LineStrip).with_material("rock");
        hidden.visible = false;
        scene.add_object(hidden);

        scene.camera_manager.camera.eye = Vector3::new(0.0, 0.0, 60.0);
        let (opaque, blended) = collect_draws(&scene);

        assert_eq!(opaque.len(), 1);
        assert_eq!(opaque[0].object, 2);
        let order: Vec<usize> = blended.iter().map(|item| item.object).collect();
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn test_line_loops_are_blended() {
        let mut scene = scene();
        scene.add_object(Object::from_geometry(
            "Moon Orbit",
            &generate_ring(20.0, 32),
            Topology::LineStrip,
        ));
        let (opaque, blended) = collect_draws(&scene);
        assert!(opaque.is_empty());
        assert_eq!(blended[0].pipeline, LINE_PIPELINE);
    }
}

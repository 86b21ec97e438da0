use std::ops::Range;

use cgmath::{Matrix, Matrix3, Matrix4, SquareMatrix, Vector3, Vector4};
use wgpu::util::DeviceExt;
use wgpu::Device;

use super::{transform::Transform, vertex::Vertex3D};
use crate::gfx::{geometry::GeometryData, resources::material::MaterialId};
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// How a mesh's vertices are assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    /// Connected line through every vertex, used for orbit loops
    LineStrip,
}

pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    pub vertex_count: u32,
    pub index_count: u32,
    /// Overrides the owning object's material
    pub material_id: Option<MaterialId>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        Self {
            vertex_count: vertices.len() as u32,
            index_count: indices.len() as u32,
            vertices,
            indices,
            vertex_buffer: None,
            index_buffer: None,
            material_id: None,
        }
    }

    pub fn from_geometry(geometry: &GeometryData) -> Self {
        Self::new(geometry.to_vertices(), geometry.indices.clone())
    }

    pub fn with_material(mut self, material_id: &str) -> Self {
        self.material_id = Some(material_id.to_string());
        self
    }

    pub fn triangle_count(&self) -> u32 {
        self.index_count / 3
    }

    pub fn is_uploaded(&self) -> bool {
        self.vertex_buffer.is_some()
    }

    fn upload(&mut self, device: &Device, label: &str) {
        if self.vertices.is_empty() {
            return;
        }
        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index_buffer = (!self.indices.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Index Buffer", label)),
                contents: bytemuck::cast_slice(&self.indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });
    }
}

/// Model and normal matrices of one object
///
/// MUST match the `Transform` struct in the mesh shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn new(model: Matrix4<f32>) -> Self {
        let linear = Matrix3::from_cols(model.x.truncate(), model.y.truncate(), model.z.truncate());
        let normal = linear
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or(linear);
        Self {
            model: model.into(),
            normal: Matrix4::from(normal).into(),
        }
    }
}

/// Layout of the per-object transform bind group, slot 1 in the mesh pipelines
pub fn transform_bind_group_layout(device: &Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_vertex(binding_types::uniform())
        .create(device, "Transform Bind Group Layout")
}

// GPU resources struct to hold the transform uniform and its bind group
pub struct ObjectGpuResources {
    pub transform_ubo: UniformBuffer<TransformUniform>,
    pub transform_bind_group: wgpu::BindGroup,
}

pub struct Object {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub transform: Transform,
    pub topology: Topology,
    pub visible: bool,
    /// World matrix as of the last [`Object::update_gpu_resources`]
    pub world: Matrix4<f32>,
    material_id: Option<MaterialId>,
    pub gpu_resources: Option<ObjectGpuResources>, // None until update_gpu_resources is called
}

impl Object {
    pub fn new(name: &str, meshes: Vec<Mesh>) -> Self {
        Self {
            name: name.to_string(),
            meshes,
            transform: Transform::default(),
            topology: Topology::Triangles,
            visible: true,
            world: Matrix4::identity(),
            material_id: None,
            gpu_resources: None,
        }
    }

    pub fn from_geometry(name: &str, geometry: &GeometryData, topology: Topology) -> Self {
        let mut object = Self::new(name, vec![Mesh::from_geometry(geometry)]);
        object.topology = topology;
        object
    }

    pub fn with_material(mut self, material_id: &str) -> Self {
        self.set_material(material_id);
        self
    }

    pub fn set_material(&mut self, material_id: &str) {
        self.material_id = Some(material_id.to_string());
    }

    pub fn get_material_id(&self) -> Option<&MaterialId> {
        self.material_id.as_ref()
    }

    /// Material used for `mesh`: the mesh's own, else the object's
    pub fn material_for_mesh<'a>(&'a self, mesh: &'a Mesh) -> Option<&'a MaterialId> {
        mesh.material_id.as_ref().or(self.material_id.as_ref())
    }

    /// Swaps in new geometry; buffers are rebuilt on the next GPU sync
    pub fn set_geometry(&mut self, geometry: &GeometryData) {
        self.meshes = vec![Mesh::from_geometry(geometry)];
    }

    pub fn vertex_count(&self) -> u32 {
        self.meshes.iter().map(|m| m.vertex_count).sum()
    }

    pub fn triangle_count(&self) -> u32 {
        self.meshes.iter().map(|m| m.triangle_count()).sum()
    }

    /// World-space position for a given parent matrix
    pub fn world_position(&self, parent: Matrix4<f32>) -> Vector3<f32> {
        (parent * Vector4::new(
            self.transform.position.x,
            self.transform.position.y,
            self.transform.position.z,
            1.0,
        ))
        .truncate()
    }

    /// Uploads missing mesh buffers and writes the world transform
    pub fn update_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
        parent: Matrix4<f32>,
    ) {
        for mesh in self.meshes.iter_mut().filter(|m| !m.is_uploaded()) {
            mesh.upload(device, &self.name);
        }

        self.world = parent * self.transform.to_matrix();
        let uniform = TransformUniform::new(self.world);

        match &mut self.gpu_resources {
            Some(resources) => resources.transform_ubo.update_content(queue, uniform),
            None => {
                let transform_ubo = UniformBuffer::new_with_data(device, &uniform);
                let transform_bind_group = BindGroupBuilder::new(layout)
                    .resource(transform_ubo.binding_resource())
                    .create(device, &format!("{} Transform Bind Group", self.name));
                self.gpu_resources = Some(ObjectGpuResources {
                    transform_ubo,
                    transform_bind_group,
                });
            }
        }
    }

    /// Get the transform bind group for rendering
    pub fn get_transform_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources
            .as_ref()
            .map(|res| &res.transform_bind_group)
    }
}

pub trait DrawObject<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_mesh_instanced(&mut self, mesh: &'a Mesh, instances: Range<u32>);
}

impl<'a, 'b> DrawObject<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b Mesh, instances: Range<u32>) {
        let Some(vertex_buffer) = &mesh.vertex_buffer else {
            return; // Skip drawing if not uploaded
        };
        self.set_vertex_buffer(0, vertex_buffer.slice(..));

        match &mesh.index_buffer {
            Some(index_buffer) => {
                self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                self.draw_indexed(0..mesh.index_count, 0, instances);
            }
            None => self.draw(0..mesh.vertex_count, instances),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::{generate_ring, generate_sphere_with_radius};

    #[test]
    fn test_transform_uniform_size() {
        assert_eq!(std::mem::size_of::<TransformUniform>(), 128);
    }

    #[test]
    fn test_normal_matrix_undoes_nonuniform_scale() {
        let uniform = TransformUniform::new(Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0));
        assert_eq!(uniform.normal[0][0], 0.5);
        assert_eq!(uniform.normal[1][1], 1.0);
        assert_eq!(uniform.normal[3][3], 1.0);
    }

    #[test]
    fn test_mesh_material_overrides_object() {
        let mesh = Mesh::new(Vec::new(), Vec::new()).with_material("panel");
        let plain = Mesh::new(Vec::new(), Vec::new());
        let object = Object::new("Satellite", Vec::new()).with_material("hull");

        assert_eq!(object.material_for_mesh(&mesh).unwrap(), "panel");
        assert_eq!(object.material_for_mesh(&plain).unwrap(), "hull");
    }

    #[test]
    fn test_set_geometry_replaces_meshes() {
        let mut object = Object::from_geometry(
            "Moon",
            &generate_sphere_with_radius(1.0, 10, 10),
            Topology::Triangles,
        );
        assert_eq!(object.vertex_count(), 121);

        object.set_geometry(&generate_sphere_with_radius(1.0, 20, 20));
        assert_eq!(object.meshes.len(), 1);
        assert_eq!(object.vertex_count(), 441);
        assert!(!object.meshes[0].is_uploaded());
    }

    #[test]
    fn test_line_loop_has_no_triangles() {
        let object = Object::from_geometry("Moon Orbit", &generate_ring(20.0, 64), Topology::LineStrip);
        assert_eq!(object.topology, Topology::LineStrip);
        assert_eq!(object.triangle_count(), 0);
        assert_eq!(object.vertex_count(), 65);
    }

    #[test]
    fn test_world_position_applies_parent() {
        let object = Object {
            transform: Transform::from_position(Vector3::new(1.0, 0.0, 0.0)),
            ..Object::new("Probe", Vec::new())
        };
        let parent = Matrix4::from_translation(Vector3::new(0.0, 5.0, 0.0));
        assert_eq!(object.world_position(parent), Vector3::new(1.0, 5.0, 0.0));
    }
}

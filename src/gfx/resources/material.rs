//! Material system for Phong and unlit rendering
//!
//! Materials are stored in [`MaterialManager`] and objects reference them by ID.
//! Texture maps are referenced by name; the manager owns the decoded images and
//! uploads each one once, the first time a material needs it.

use std::collections::{HashMap, HashSet};
use wgpu::Device;

use crate::gfx::assets::texture::TextureData;
use crate::gfx::resources::texture_resource::TextureResource;
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Material ID for referencing materials
pub type MaterialId = String;

pub const FLAG_HAS_MAP: u32 = 1;
pub const FLAG_HAS_BUMP: u32 = 2;
pub const FLAG_HAS_SPECULAR: u32 = 4;
pub const FLAG_HAS_NIGHT: u32 = 8;
pub const FLAG_UNLIT: u32 = 16;

/// GPU uniform data for materials
///
/// MUST match the `Material` struct in the mesh shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub color: [f32; 4],    // rgb + opacity
    pub specular: [f32; 4], // rgb + shininess
    pub params: [f32; 4],   // bump scale, night intensity
    pub flags: u32,
    _padding: [u32; 3],
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Lighting model used by a material
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shading {
    /// Ambient plus one point light with specular highlights
    Phong,
    /// Flat colour, unaffected by lights
    Unlit,
}

/// Layout shared by every material bind group
///
/// uniform, sampler, then the colour, bump, specular and night maps.
pub fn material_bind_group_layout(device: &Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_fragment(binding_types::uniform())
        .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
        .next_binding_fragment(binding_types::texture_2d())
        .next_binding_fragment(binding_types::texture_2d())
        .next_binding_fragment(binding_types::texture_2d())
        .next_binding_fragment(binding_types::texture_2d())
        .create(device, "Material Bind Group Layout")
}

/// Material definition
///
/// Contains material properties and GPU resources. Materials are stored
/// centrally in MaterialManager and shared between objects.
pub struct Material {
    pub name: String,
    pub shading: Shading,
    pub color: [f32; 3],
    pub opacity: f32,
    /// Drawn after opaque objects, sorted back to front, without depth writes
    pub transparent: bool,
    pub specular: [f32; 3],
    pub shininess: f32,
    pub bump_scale: f32,
    pub night_intensity: f32,

    pub map: Option<String>,
    pub bump_map: Option<String>,
    pub specular_map: Option<String>,
    pub night_map: Option<String>,

    // GPU resources - shared by all objects using this material
    material_ubo: Option<MaterialUBO>,
    bind_group: Option<wgpu::BindGroup>,
    bound_maps: Option<[Option<String>; 4]>,
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default", [0.8, 0.8, 0.8])
    }
}

impl Material {
    /// Creates an opaque Phong material of a single colour
    pub fn new(name: &str, color: [f32; 3]) -> Self {
        Self {
            name: name.to_string(),
            shading: Shading::Phong,
            color,
            opacity: 1.0,
            transparent: false,
            specular: [0.07, 0.07, 0.07],
            shininess: 30.0,
            bump_scale: 1.0,
            night_intensity: 0.0,
            map: None,
            bump_map: None,
            specular_map: None,
            night_map: None,
            material_ubo: None,
            bind_group: None,
            bound_maps: None,
        }
    }

    /// Creates an unlit material, used for line loops and the Sun
    pub fn unlit(name: &str, color: [f32; 3]) -> Self {
        Self::new(name, color).with_shading(Shading::Unlit)
    }

    pub fn with_shading(mut self, shading: Shading) -> Self {
        self.shading = shading;
        self
    }

    /// Builder pattern: Set alpha transparency
    ///
    /// Any opacity below one makes the material transparent.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.transparent = self.transparent || self.opacity < 1.0;
        self
    }

    pub fn with_transparency(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    pub fn with_map(mut self, texture: &str) -> Self {
        self.map = Some(texture.to_string());
        self
    }

    pub fn with_bump_map(mut self, texture: &str, scale: f32) -> Self {
        self.bump_map = Some(texture.to_string());
        self.bump_scale = scale;
        self
    }

    pub fn with_specular_map(mut self, texture: &str) -> Self {
        self.specular_map = Some(texture.to_string());
        self
    }

    pub fn with_night_map(mut self, texture: &str, intensity: f32) -> Self {
        self.night_map = Some(texture.to_string());
        self.night_intensity = intensity;
        self
    }

    pub fn with_specular(mut self, specular: [f32; 3], shininess: f32) -> Self {
        self.specular = specular;
        self.shininess = shininess;
        self
    }

    fn maps(&self) -> [Option<String>; 4] {
        [
            self.map.clone(),
            self.bump_map.clone(),
            self.specular_map.clone(),
            self.night_map.clone(),
        ]
    }

    /// Builds the uniform block, flagging only the maps that are available
    pub fn uniform(&self, is_available: impl Fn(&str) -> bool) -> MaterialUniform {
        let has = |map: &Option<String>| map.as_deref().map(&is_available).unwrap_or(false);

        let mut flags = 0;
        if has(&self.map) {
            flags |= FLAG_HAS_MAP;
        }
        if has(&self.bump_map) {
            flags |= FLAG_HAS_BUMP;
        }
        if has(&self.specular_map) {
            flags |= FLAG_HAS_SPECULAR;
        }
        if has(&self.night_map) {
            flags |= FLAG_HAS_NIGHT;
        }
        if self.shading == Shading::Unlit {
            flags |= FLAG_UNLIT;
        }

        MaterialUniform {
            color: [self.color[0], self.color[1], self.color[2], self.opacity],
            specular: [
                self.specular[0],
                self.specular[1],
                self.specular[2],
                self.shininess.max(1.0),
            ],
            params: [self.bump_scale, self.night_intensity, 0.0, 0.0],
            flags,
            _padding: [0; 3],
        }
    }

    /// Gets the bind group for rendering
    pub fn get_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}

/// Fallback textures bound where a material has no map
struct FallbackTextures {
    white: TextureResource,
    black: TextureResource,
}

/// Manages all materials and their textures
///
/// Centralized storage for all materials. Objects reference materials by ID
/// rather than storing material data directly, enabling efficient sharing
/// of GPU resources between objects.
pub struct MaterialManager {
    materials: HashMap<MaterialId, Material>,
    default_material_id: MaterialId,
    textures: HashMap<String, TextureData>,
    gpu_textures: HashMap<String, TextureResource>,
    missing_reported: HashSet<String>,
    fallbacks: Option<FallbackTextures>,
    sampler: Option<wgpu::Sampler>,
}

impl MaterialManager {
    /// Creates a new material manager with a default material
    pub fn new() -> Self {
        let mut materials = HashMap::new();
        materials.insert("default".to_string(), Material::default());

        Self {
            materials,
            default_material_id: "default".to_string(),
            textures: HashMap::new(),
            gpu_textures: HashMap::new(),
            missing_reported: HashSet::new(),
            fallbacks: None,
            sampler: None,
        }
    }

    /// Adds a material, replacing any material with the same name
    pub fn add_material(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    pub fn get_material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn get_material_mut(&mut self, id: &str) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    /// Gets material for an object with fallback to default
    pub fn get_material_for_object(&self, material_id: Option<&MaterialId>) -> Option<&Material> {
        material_id
            .and_then(|id| self.materials.get(id))
            .or_else(|| self.materials.get(&self.default_material_id))
    }

    /// Lists all material IDs
    pub fn list_materials(&self) -> Vec<&MaterialId> {
        self.materials.keys().collect()
    }

    /// Registers a decoded image under `name`
    ///
    /// Replacing a texture that was already uploaded rebinds every material using it.
    pub fn add_texture(&mut self, name: &str, texture: TextureData) {
        if self.gpu_textures.remove(name).is_some() {
            for material in self.materials.values_mut() {
                if material.maps().iter().flatten().any(|map| map == name) {
                    material.bound_maps = None;
                }
            }
        }
        self.missing_reported.remove(name);
        self.textures.insert(name.to_string(), texture);
    }

    /// True if `name` is registered, whether or not it has been uploaded yet
    pub fn has_texture(&self, name: &str) -> bool {
        self.textures.contains_key(name) || self.gpu_textures.contains_key(name)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len() + self.gpu_textures.len()
    }

    /// Syncs every material with the GPU
    ///
    /// Uploads newly referenced textures, writes changed uniforms and rebuilds
    /// bind groups whose texture maps changed.
    pub fn update_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
    ) {
        let Self {
            materials,
            textures,
            gpu_textures,
            missing_reported,
            fallbacks,
            sampler,
            ..
        } = self;

        let fallbacks = fallbacks.get_or_insert_with(|| FallbackTextures {
            white: TextureResource::solid(device, queue, "fallback_white", [255, 255, 255, 255]),
            black: TextureResource::solid(device, queue, "fallback_black", [0, 0, 0, 255]),
        });
        let sampler = sampler.get_or_insert_with(|| {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("Material Sampler"),
                address_mode_u: wgpu::AddressMode::Repeat,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            })
        });

        // Upload textures on first use
        for material in materials.values() {
            for name in material.maps().into_iter().flatten() {
                if gpu_textures.contains_key(&name) {
                    continue;
                }
                // The decoded pixels are released once they live on the GPU
                match textures.remove(&name) {
                    Some(data) => {
                        let resource = TextureResource::from_texture_data(device, queue, &data);
                        gpu_textures.insert(name, resource);
                    }
                    None => {
                        if missing_reported.insert(name.clone()) {
                            log::warn!(
                                "Material '{}' references missing texture '{}', using a flat fallback",
                                material.name,
                                name
                            );
                        }
                    }
                }
            }
        }

        for material in materials.values_mut() {
            let uniform = material.uniform(|name| gpu_textures.contains_key(name));
            material
                .material_ubo
                .get_or_insert_with(|| MaterialUBO::new(device))
                .update_content(queue, uniform);

            let maps = material.maps();
            if material.bind_group.is_some() && material.bound_maps.as_ref() == Some(&maps) {
                continue;
            }

            let Some(ubo) = material.material_ubo.as_ref() else {
                continue;
            };
            let bind_group = BindGroupBuilder::new(layout)
                .resource(ubo.binding_resource())
                .sampler(sampler)
                .texture(map_view(&maps[0], gpu_textures, &fallbacks.white))
                .texture(map_view(&maps[1], gpu_textures, &fallbacks.black))
                .texture(map_view(&maps[2], gpu_textures, &fallbacks.white))
                .texture(map_view(&maps[3], gpu_textures, &fallbacks.black))
                .create(device, &format!("Material Bind Group: {}", material.name));

            log::debug!("Bound material '{}'", material.name);
            material.bind_group = Some(bind_group);
            material.bound_maps = Some(maps);
        }
    }
}

fn map_view<'a>(
    map: &Option<String>,
    gpu_textures: &'a HashMap<String, TextureResource>,
    fallback: &'a TextureResource,
) -> &'a wgpu::TextureView {
    map.as_ref()
        .and_then(|name| gpu_textures.get(name))
        .map(|t| &t.view)
        .unwrap_or(&fallback.view)
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_is_64_bytes() {
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 64);
    }

    #[test]
    fn test_flags_only_for_available_maps() {
        let material = Material::new("earth", [1.0; 3])
            .with_map("day.jpg")
            .with_bump_map("bump.jpg", 0.2)
            .with_night_map("night.jpg", 1.0);

        let uniform = material.uniform(|name| name != "bump.jpg");
        assert_eq!(uniform.flags, FLAG_HAS_MAP | FLAG_HAS_NIGHT);
        assert_eq!(uniform.params[0], 0.2);
        assert_eq!(uniform.params[1], 1.0);
    }

    #[test]
    fn test_unlit_flag_and_opacity() {
        let material = Material::unlit("orbit", [1.0, 0.0, 0.0]).with_opacity(0.5);
        assert!(material.transparent);
        let uniform = material.uniform(|_| true);
        assert_eq!(uniform.flags, FLAG_UNLIT);
        assert_eq!(uniform.color, [1.0, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_opaque_material_stays_opaque() {
        let material = Material::new("moon", [1.0; 3]).with_opacity(1.0);
        assert!(!material.transparent);
    }

    #[test]
    fn test_default_material_fallback() {
        let manager = MaterialManager::new();
        let missing = "nope".to_string();
        let material = manager.get_material_for_object(Some(&missing)).unwrap();
        assert_eq!(material.name, "default");
        assert_eq!(manager.get_material_for_object(None).unwrap().name, "default");
    }

    #[test]
    fn test_textures_are_registered_by_name() {
        let mut manager = MaterialManager::new();
        manager.add_texture("moon.jpg", TextureData::solid("moon.jpg", [9, 9, 9, 255]));
        assert!(manager.has_texture("moon.jpg"));
        assert!(!manager.has_texture("earth.jpg"));
        assert_eq!(manager.texture_count(), 1);
    }
}

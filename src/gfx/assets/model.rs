//! Model import
//!
//! glTF/GLB files are read with the `gltf` crate and OBJ files with `tobj`.
//! Either way the node hierarchy is flattened: every mesh primitive becomes a
//! [`ModelMesh`] with its node transform baked into the vertices.

use std::path::Path;
use std::time::Instant;

use cgmath::{InnerSpace, Matrix, Matrix3, Matrix4, SquareMatrix, Vector3, Vector4};

use super::texture::TextureData;
use crate::error::{AssetError, AssetResult};
use crate::gfx::geometry::GeometryData;

/// Surface description carried by an imported mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMaterial {
    pub name: String,
    pub base_color: [f32; 4],
    pub base_color_texture: Option<TextureData>,
    pub double_sided: bool,
}

impl Default for ModelMaterial {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            base_color_texture: None,
            double_sided: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelMesh {
    pub name: String,
    pub geometry: GeometryData,
    pub material: ModelMaterial,
}

/// All meshes of one model file, in model space.
#[derive(Debug, Clone)]
pub struct ModelData {
    pub name: String,
    pub meshes: Vec<ModelMesh>,
}

impl ModelData {
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.geometry.vertex_count()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.geometry.triangle_count()).sum()
    }
}

/// Loads a model, choosing the importer from the file extension.
pub fn load_model(path: &Path) -> AssetResult<ModelData> {
    if !path.exists() {
        return Err(AssetError::FileNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let started = Instant::now();
    let model = match extension.as_str() {
        "glb" | "gltf" => load_gltf(path)?,
        "obj" => load_obj(path)?,
        _ => return Err(AssetError::UnsupportedFormat(path.to_path_buf())),
    };

    log::info!(
        "Loaded model '{}': {} meshes, {} vertices, {} triangles in {:.0?}",
        model.name,
        model.meshes.len(),
        model.vertex_count(),
        model.triangle_count(),
        started.elapsed()
    );
    Ok(model)
}

fn model_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string())
}

/// Imports a glTF or GLB file.
pub fn load_gltf(path: &Path) -> AssetResult<ModelData> {
    let (document, buffers, images) = gltf::import(path).map_err(|source| AssetError::Gltf {
        path: path.to_path_buf(),
        source,
    })?;

    let mut meshes = Vec::new();
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());

    match scene {
        Some(scene) => {
            for node in scene.nodes() {
                collect_node(
                    path,
                    &node,
                    Matrix4::identity(),
                    &buffers,
                    &images,
                    &mut meshes,
                )?;
            }
        }
        None => {
            // No scene graph: take every mesh as-is
            for mesh in document.meshes() {
                collect_mesh(path, &mesh, Matrix4::identity(), &buffers, &images, &mut meshes)?;
            }
        }
    }

    if meshes.is_empty() {
        return Err(AssetError::NoMeshes(path.to_path_buf()));
    }

    Ok(ModelData {
        name: model_name(path),
        meshes,
    })
}

fn collect_node(
    path: &Path,
    node: &gltf::Node,
    parent: Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
    out: &mut Vec<ModelMesh>,
) -> AssetResult<()> {
    let world = parent * Matrix4::from(node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        collect_mesh(path, &mesh, world, buffers, images, out)?;
    }
    for child in node.children() {
        collect_node(path, &child, world, buffers, images, out)?;
    }
    Ok(())
}

fn collect_mesh(
    path: &Path,
    mesh: &gltf::Mesh,
    world: Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
    out: &mut Vec<ModelMesh>,
) -> AssetResult<()> {
    let mesh_name = mesh
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("mesh_{}", mesh.index()));

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "Skipping {:?} primitive in '{}' of {}",
                primitive.mode(),
                mesh_name,
                path.display()
            );
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| AssetError::NoPositionData(path.to_path_buf()))?
            .collect();

        let mut geometry = GeometryData::new();
        geometry.vertices = positions;
        geometry.indices = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..geometry.vertices.len() as u32).collect(),
        };
        geometry.tex_coords = match reader.read_tex_coords(0) {
            Some(coords) => coords.into_f32().collect(),
            None => vec![[0.0, 0.0]; geometry.vertices.len()],
        };
        match reader.read_normals() {
            Some(normals) => geometry.normals = normals.collect(),
            None => geometry.compute_vertex_normals(),
        }

        bake_transform(&mut geometry, world);

        let material = primitive_material(&primitive.material(), images);
        out.push(ModelMesh {
            name: format!("{}/{}", mesh_name, primitive.index()),
            geometry,
            material,
        });
    }
    Ok(())
}

fn primitive_material(material: &gltf::Material, images: &[gltf::image::Data]) -> ModelMaterial {
    let pbr = material.pbr_metallic_roughness();
    let name = material
        .name()
        .map(str::to_string)
        .or_else(|| material.index().map(|i| format!("material_{}", i)))
        .unwrap_or_else(|| "default".to_string());

    let base_color_texture = pbr.base_color_texture().and_then(|info| {
        let index = info.texture().source().index();
        let image = images.get(index)?;
        let texture = gltf_image_to_rgba(&format!("{}_base_color", name), image);
        if texture.is_none() {
            log::warn!(
                "Unsupported pixel format {:?} for texture of material '{}'",
                image.format,
                name
            );
        }
        texture
    });

    ModelMaterial {
        name,
        base_color: pbr.base_color_factor(),
        base_color_texture,
        double_sided: material.double_sided(),
    }
}

fn gltf_image_to_rgba(name: &str, image: &gltf::image::Data) -> Option<TextureData> {
    use gltf::image::Format;

    let pixels = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8 => image.pixels.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        Format::R8G8 => image
            .pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        _ => return None,
    };

    Some(TextureData {
        name: name.to_string(),
        width: image.width,
        height: image.height,
        pixels,
    })
}

/// Moves vertices into the parent space of `transform`.
fn bake_transform(geometry: &mut GeometryData, transform: Matrix4<f32>) {
    if transform == Matrix4::identity() {
        return;
    }

    let linear = Matrix3::from_cols(
        transform.x.truncate(),
        transform.y.truncate(),
        transform.z.truncate(),
    );
    let normal_matrix = linear
        .invert()
        .map(|inverse| inverse.transpose())
        .unwrap_or(linear);

    for position in &mut geometry.vertices {
        let p = transform * Vector4::new(position[0], position[1], position[2], 1.0);
        *position = [p.x, p.y, p.z];
    }
    for normal in &mut geometry.normals {
        let n = normal_matrix * Vector3::from(*normal);
        *normal = if n.magnitude2() > 0.0 {
            n.normalize().into()
        } else {
            *normal
        };
    }

    // Mirroring transforms flip the winding
    if linear.determinant() < 0.0 {
        for triangle in geometry.indices.chunks_exact_mut(3) {
            triangle.swap(1, 2);
        }
    }
}

/// Imports an OBJ file and its MTL materials.
pub fn load_obj(path: &Path) -> AssetResult<ModelData> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| AssetError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    let materials = materials.unwrap_or_else(|e| {
        log::warn!("No usable MTL for {} ({}), using defaults", path.display(), e);
        Vec::new()
    });

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut meshes = Vec::new();

    for model in &models {
        let mesh = &model.mesh;
        if mesh.positions.is_empty() {
            continue;
        }

        let mut geometry = GeometryData::new();
        geometry.vertices = mesh
            .positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();
        geometry.indices = mesh.indices.clone();
        // OBJ puts v = 0 at the bottom of the image
        geometry.tex_coords = if mesh.texcoords.len() / 2 == geometry.vertices.len() {
            mesh.texcoords
                .chunks_exact(2)
                .map(|t| [t[0], 1.0 - t[1]])
                .collect()
        } else {
            vec![[0.0, 0.0]; geometry.vertices.len()]
        };
        if mesh.normals.len() == mesh.positions.len() {
            geometry.normals = mesh
                .normals
                .chunks_exact(3)
                .map(|n| [n[0], n[1], n[2]])
                .collect();
        } else {
            geometry.compute_vertex_normals();
        }

        let material = mesh
            .material_id
            .and_then(|id| materials.get(id).map(|m| (id, m)))
            .map(|(id, mtl)| obj_material(id, mtl, base_dir))
            .unwrap_or_default();

        meshes.push(ModelMesh {
            name: model.name.clone(),
            geometry,
            material,
        });
    }

    if meshes.is_empty() {
        return Err(AssetError::NoMeshes(path.to_path_buf()));
    }

    Ok(ModelData {
        name: model_name(path),
        meshes,
    })
}

fn obj_material(index: usize, mtl: &tobj::Material, base_dir: &Path) -> ModelMaterial {
    let name = if mtl.name.is_empty() {
        format!("material_{}", index)
    } else {
        mtl.name.clone()
    };
    let diffuse = mtl.diffuse.unwrap_or([0.8, 0.8, 0.8]);

    let base_color_texture = mtl.diffuse_texture.as_ref().and_then(|file| {
        match super::texture::load_texture(&base_dir.join(file)) {
            Ok(texture) => Some(texture),
            Err(e) => {
                log::warn!("Material '{}' texture unavailable: {}", name, e);
                None
            }
        }
    });

    ModelMaterial {
        name,
        base_color: [diffuse[0], diffuse[1], diffuse[2], mtl.dissolve.unwrap_or(1.0)],
        base_color_texture,
        double_sided: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_OBJ: &str = "\
mtllib tri.mtl
o Panel
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
usemtl gold
f 1/1 2/2 3/3
";

    const TRIANGLE_MTL: &str = "\
newmtl gold
Kd 1.0 0.8 0.2
d 0.5
";

    #[test]
    fn test_load_obj_with_material() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tri.obj"), TRIANGLE_OBJ).unwrap();
        std::fs::write(dir.path().join("tri.mtl"), TRIANGLE_MTL).unwrap();

        let model = load_model(&dir.path().join("tri.obj")).unwrap();
        assert_eq!(model.name, "tri");
        assert_eq!(model.meshes.len(), 1);

        let mesh = &model.meshes[0];
        assert_eq!(mesh.geometry.vertex_count(), 3);
        assert_eq!(mesh.geometry.triangle_count(), 1);
        // Computed normal faces +Z for a counter-clockwise triangle in XY
        assert!((mesh.geometry.normals[0][2] - 1.0).abs() < 1e-5);
        // V is flipped to top-left origin
        assert_eq!(mesh.geometry.tex_coords[0], [0.0, 1.0]);
        assert_eq!(mesh.material.name, "gold");
        assert_eq!(mesh.material.base_color, [1.0, 0.8, 0.2, 0.5]);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.fbx");
        std::fs::write(&path, b"binary").unwrap();
        assert!(matches!(
            load_model(&path),
            Err(AssetError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_model_is_reported() {
        assert!(matches!(
            load_model(Path::new("source/none.glb")),
            Err(AssetError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_invalid_glb_is_a_gltf_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.glb");
        std::fs::write(&path, b"glTF but not really").unwrap();
        assert!(matches!(load_model(&path), Err(AssetError::Gltf { .. })));
    }

    #[test]
    fn test_bake_transform_scales_and_flips() {
        let mut geometry = GeometryData::new();
        geometry.vertices = vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        geometry.normals = vec![[1.0, 0.0, 0.0]; 3];
        geometry.indices = vec![0, 1, 2];

        bake_transform(&mut geometry, Matrix4::from_nonuniform_scale(-2.0, 1.0, 1.0));
        assert_eq!(geometry.vertices[0], [-2.0, 0.0, 0.0]);
        assert_eq!(geometry.normals[0], [-1.0, 0.0, 0.0]);
        assert_eq!(geometry.indices, vec![0, 2, 1]);
    }

    #[test]
    fn test_gray_alpha_pixels_expand_to_rgba() {
        let image = gltf::image::Data {
            pixels: vec![10, 200],
            format: gltf::image::Format::R8G8,
            width: 1,
            height: 1,
        };
        let texture = gltf_image_to_rgba("ga", &image).unwrap();
        assert_eq!(texture.pixels, vec![10, 10, 10, 200]);
    }
}

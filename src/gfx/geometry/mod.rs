//! # Procedural Geometry Generation
//!
//! This module generates the primitive shapes the scene is built from, so the
//! only external model is the satellite.
//!
//! ## Supported Primitives
//!
//! - **Sphere**: UV sphere with a radius and configurable resolution
//! - **Ring**: Closed circle in the XZ plane, drawn as a line strip
//! - **Torus**: Ring with a round tube, lying in the XY plane
//! - **Cube**: Unit cube, used when the satellite model is missing
//!
//! ## Usage
//!
//! ```rust
//! use orrery::gfx::geometry::{generate_ring, generate_sphere_with_radius, generate_torus};
//!
//! let earth = generate_sphere_with_radius(5.0, 64, 64);
//! let orbit = generate_ring(20.0, 64);
//! let band = generate_torus(8.0, 0.05, 16, 100);
//! assert_eq!(orbit.vertex_count(), 65);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::vertex::Vertex3D;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v), v = 0 at the top of the image
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding). Empty for line strips.
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            tex_coords: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaves positions, normals and texture coordinates into GPU vertices
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        (0..self.vertices.len())
            .map(|i| Vertex3D {
                position: self.vertices[i],
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                tex_coords: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect()
    }

    /// Replaces the normals with area-weighted averages of the adjacent face normals
    ///
    /// Used for imported meshes that carry no normals of their own.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![[0.0f32; 3]; self.vertices.len()];

        for triangle in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
            if i0 >= normals.len() || i1 >= normals.len() || i2 >= normals.len() {
                continue;
            }
            let (v0, v1, v2) = (self.vertices[i0], self.vertices[i1], self.vertices[i2]);
            let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
            let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
            let face_normal = [
                edge1[1] * edge2[2] - edge1[2] * edge2[1],
                edge1[2] * edge2[0] - edge1[0] * edge2[2],
                edge1[0] * edge2[1] - edge1[1] * edge2[0],
            ];
            for index in [i0, i1, i2] {
                for axis in 0..3 {
                    normals[index][axis] += face_normal[axis];
                }
            }
        }

        for normal in &mut normals {
            let length = (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2]).sqrt();
            *normal = if length > 0.0 {
                [normal[0] / length, normal[1] / length, normal[2] / length]
            } else {
                [0.0, 1.0, 0.0]
            };
        }

        self.normals = normals;
    }

    /// Largest distance of any vertex from the origin
    pub fn bounding_radius(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt())
            .fold(0.0, f32::max)
    }
}

impl Default for GeometryData {
    fn default() -> Self {
        Self::new()
    }
}

//! # Primitive Shape Generation
//!
//! All triangle shapes are generated with outward normals and texture
//! coordinates, wound counter-clockwise when seen from outside.

use super::GeometryData;
use std::f32::consts::{PI, TAU};

/// Generate a unit cube centered at the origin
///
/// Returns a cube with vertices from -0.5 to 0.5 on all axes.
/// Each face has proper normals pointing outward and UV coordinates from 0 to 1.
pub fn generate_cube() -> GeometryData {
    let mut data = GeometryData::new();

    #[rustfmt::skip]
    let positions = [
        // Front face
        [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5],
        // Back face
        [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5, -0.5, -0.5],
        // Left face
        [-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5],
        // Right face
        [ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5],
        // Top face
        [-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5],
        // Bottom face
        [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5],
    ];

    let face_normals = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    data.vertices = positions.to_vec();
    for normal in face_normals {
        for _ in 0..4 {
            data.normals.push(normal);
        }
    }
    for _ in 0..6 {
        data.tex_coords
            .extend_from_slice(&[[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]);
    }

    for face in 0..6u32 {
        let base = face * 4;
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Generate a UV sphere centered at the origin
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `width_segments` - Number of segments around the equator (at least 3)
/// * `height_segments` - Number of segments from pole to pole (at least 2)
///
/// The texture seam sits on -X and `v` runs from 0 at the north pole (+Y)
/// to 1 at the south pole, so equirectangular maps wrap without flipping.
pub fn generate_sphere_with_radius(
    radius: f32,
    width_segments: u32,
    height_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let width_segs = width_segments.max(3);
    let height_segs = height_segments.max(2);

    for iy in 0..=height_segs {
        let v = iy as f32 / height_segs as f32;
        let theta = v * PI;

        for ix in 0..=width_segs {
            let u = ix as f32 / width_segs as f32;
            let phi = u * TAU;

            let normal = [
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            ];

            data.vertices
                .push([normal[0] * radius, normal[1] * radius, normal[2] * radius]);
            data.normals.push(normal);
            data.tex_coords.push([u, v]);
        }
    }

    let row = width_segs + 1;
    for iy in 0..height_segs {
        for ix in 0..width_segs {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;

            // The pole rows collapse to a point, so each only needs one triangle
            if iy != 0 {
                data.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segs - 1 {
                data.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    data
}

/// Generate a closed circle of `radius` in the XZ plane
///
/// The first vertex is repeated at the end so the circle can be drawn as a
/// line strip. Normals point away from the centre.
pub fn generate_ring(radius: f32, segments: u32) -> GeometryData {
    let mut data = GeometryData::new();
    let segs = segments.max(3);

    for i in 0..=segs {
        let t = i as f32 / segs as f32;
        // Wrap exactly so the strip closes on the same vertex
        let angle = if i == segs { 0.0 } else { t * TAU };
        let (sin, cos) = angle.sin_cos();

        data.vertices.push([cos * radius, 0.0, sin * radius]);
        data.normals.push([cos, 0.0, sin]);
        data.tex_coords.push([t, 0.5]);
    }

    data
}

/// Generate a torus around the Z axis
///
/// # Arguments
/// * `radius` - Distance from the centre of the torus to the centre of the tube
/// * `tube` - Radius of the tube
/// * `radial_segments` - Segments around the tube
/// * `tubular_segments` - Segments along the ring
///
/// The ring lies in the XY plane; rotating a quarter turn about X lays it flat.
pub fn generate_torus(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let radial = radial_segments.max(3);
    let tubular = tubular_segments.max(3);

    for j in 0..=radial {
        let v = j as f32 / radial as f32 * TAU;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;

            let ring = radius + tube * v.cos();
            let position = [ring * u.cos(), ring * u.sin(), tube * v.sin()];
            let centre = [radius * u.cos(), radius * u.sin(), 0.0];

            let nx = position[0] - centre[0];
            let ny = position[1] - centre[1];
            let nz = position[2] - centre[2];
            let length = (nx * nx + ny * ny + nz * nz).sqrt().max(f32::EPSILON);

            data.vertices.push(position);
            data.normals.push([nx / length, ny / length, nz / length]);
            data.tex_coords
                .push([i as f32 / tubular as f32, j as f32 / radial as f32]);
        }
    }

    let row = tubular + 1;
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;

            data.indices.extend_from_slice(&[a, b, d]);
            data.indices.extend_from_slice(&[b, c, d]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Every triangle's face normal agrees with its vertex normals
    fn assert_outward_winding(data: &GeometryData) {
        for tri in data.indices.chunks(3) {
            let [p0, p1, p2] = [0, 1, 2].map(|k| data.vertices[tri[k] as usize]);
            let face = cross(sub(p1, p0), sub(p2, p0));
            if dot(face, face) < 1e-12 {
                continue;
            }
            let n = data.normals[tri[0] as usize];
            assert!(dot(face, n) > 0.0, "triangle {:?} faces inward", tri);
        }
    }

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.tex_coords.len(), 24);
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere_with_radius(5.0, 64, 64);
        assert_eq!(sphere.vertices.len(), 65 * 65);
        assert_eq!(sphere.vertices.len(), sphere.normals.len());
        assert_eq!(sphere.vertices.len(), sphere.tex_coords.len());
        // Pole rows contribute one triangle per segment, the rest two
        assert_eq!(sphere.triangle_count(), 64 * 2 * 64 - 2 * 64);
        assert!((sphere.bounding_radius() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_sphere_vertices_lie_on_radius() {
        let sphere = generate_sphere_with_radius(1.2, 20, 20);
        for v in &sphere.vertices {
            let r = dot(*v, *v).sqrt();
            assert!((r - 1.2).abs() < 1e-4);
        }
        // North pole first, south pole last
        assert!((sphere.vertices[0][1] - 1.2).abs() < 1e-4);
        assert!((sphere.vertices.last().unwrap()[1] + 1.2).abs() < 1e-4);
    }

    #[test]
    fn test_sphere_clamps_segments() {
        let sphere = generate_sphere_with_radius(1.0, 0, 0);
        assert_eq!(sphere.vertices.len(), 4 * 3);
    }

    #[test]
    fn test_sphere_winding_is_outward() {
        assert_outward_winding(&generate_sphere_with_radius(2.0, 12, 8));
    }

    #[test]
    fn test_cube_winding_is_outward() {
        assert_outward_winding(&generate_cube());
    }

    #[test]
    fn test_ring_is_closed() {
        let ring = generate_ring(20.0, 64);
        assert_eq!(ring.vertex_count(), 65);
        assert!(ring.indices.is_empty());
        assert_eq!(ring.vertices.first(), ring.vertices.last());
        for v in &ring.vertices {
            assert_eq!(v[1], 0.0);
            assert!(((v[0] * v[0] + v[2] * v[2]).sqrt() - 20.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_ring_minimum_segments() {
        assert_eq!(generate_ring(1.0, 1).vertex_count(), 4);
    }

    #[test]
    fn test_torus_generation() {
        let torus = generate_torus(8.0, 0.05, 16, 100);
        assert_eq!(torus.vertex_count(), 17 * 101);
        assert_eq!(torus.triangle_count(), 16 * 100 * 2);
        assert!((torus.bounding_radius() - 8.05).abs() < 1e-3);
        // Lies in the XY plane
        for v in &torus.vertices {
            assert!(v[2].abs() <= 0.05 + 1e-5);
        }
    }

    #[test]
    fn test_torus_winding_is_outward() {
        assert_outward_winding(&generate_torus(3.0, 1.0, 8, 12));
    }
}

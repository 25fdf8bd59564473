//! Base shapes for instanced ornaments

use std::f32::consts::{PI, TAU};
use crate::math::Vec3;
use crate::particles::ornaments::Shape;
use super::geometry::{Mesh, Vertex};

/// UV sphere with `segments` around and `segments` pole to pole
pub fn uv_sphere(radius: f32, segments: usize) -> Mesh {
    let width = segments.max(3);
    let height = segments.max(2);
    let mut mesh = Mesh::new();

    for row in 0..=height {
        let v = row as f32 / height as f32;
        let polar = v * PI;
        for col in 0..=width {
            let u = col as f32 / width as f32;
            let azimuth = u * TAU;
            let normal = Vec3::new(
                -azimuth.cos() * polar.sin(),
                polar.cos(),
                azimuth.sin() * polar.sin(),
            );
            mesh.add_vertices([Vertex::new(normal.scale(radius), normal)]);
        }
    }

    let stride = (width + 1) as u32;
    for row in 0..height as u32 {
        for col in 0..width as u32 {
            let a = row * stride + col;
            let b = a + stride;
            // Skip the degenerate triangles at the poles
            if row != 0 {
                mesh.add_triangle(a + 1, a, b + 1);
            }
            if row != height as u32 - 1 {
                mesh.add_triangle(a, b, b + 1);
            }
        }
    }

    mesh
}

/// Axis-aligned cube with edge length `size`, flat normals per face
pub fn cube(size: f32) -> Mesh {
    let h = size / 2.0;
    let mut mesh = Mesh::new();

    // (normal, tangent u, tangent v) with u × v = normal for CCW faces
    let faces = [
        (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 1.0, 0.0)),
        (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 0.0)),
        (Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0)),
        (Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
        (Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
        (Vec3::new(0.0, 0.0, -1.0), Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
    ];

    for (normal, u, v) in faces {
        let centre = normal.scale(h);
        let corner = |su: f32, sv: f32| {
            Vertex::new(centre + u.scale(su * h) + v.scale(sv * h), normal)
        };
        let start = mesh.add_vertices([
            corner(-1.0, -1.0),
            corner(1.0, -1.0),
            corner(1.0, 1.0),
            corner(-1.0, 1.0),
        ]);
        mesh.add_quad(start, start + 1, start + 2, start + 3);
    }

    mesh
}

/// Build the mesh for an ornament shape
pub fn mesh_for_shape(shape: Shape) -> Mesh {
    match shape {
        Shape::Sphere { radius, segments } => uv_sphere(radius, segments),
        Shape::Cube { size } => cube(size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_vertices_on_surface() {
        let mesh = uv_sphere(0.25, 16);
        assert_eq!(mesh.vertex_count(), 17 * 17);
        for v in &mesh.vertices {
            assert!((v.position.length() - 0.25).abs() < 1e-5);
            assert!((v.normal.length() - 1.0).abs() < 1e-5);
        }
        // Two caps of single triangles plus full quads in between
        assert_eq!(mesh.triangle_count(), 16 * 2 + 16 * 14 * 2);
    }

    #[test]
    fn test_sphere_indices_in_range() {
        let mesh = uv_sphere(0.08, 8);
        let n = mesh.vertex_count() as u32;
        assert!(mesh.index_data().iter().all(|&i| i < n));
    }

    #[test]
    fn test_sphere_winds_outward() {
        let mesh = uv_sphere(1.0, 12);
        for tri in mesh.index_data().chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.vertices[i as usize].position);
            let face_normal = (b - a).cross(&(c - a));
            let centroid = (a + b + c).scale(1.0 / 3.0);
            assert!(face_normal.dot(&centroid) > 0.0);
        }
    }

    #[test]
    fn test_cube_faces_wind_outward() {
        let mesh = cube(0.4);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert!((mesh.extent() - (3.0f32).sqrt() * 0.2).abs() < 1e-5);

        for tri in mesh.index_data().chunks_exact(3) {
            let a = mesh.vertices[tri[0] as usize];
            let b = mesh.vertices[tri[1] as usize];
            let c = mesh.vertices[tri[2] as usize];
            let face_normal = (b.position - a.position).cross(&(c.position - a.position));
            assert!(face_normal.dot(&a.normal) > 0.0);
        }
    }

    #[test]
    fn test_mesh_for_shape() {
        assert_eq!(mesh_for_shape(Shape::Cube { size: 1.0 }).vertex_count(), 24);
        let sphere = mesh_for_shape(Shape::Sphere { radius: 1.0, segments: 4 });
        assert!((sphere.extent() - 1.0).abs() < 1e-5);
    }
}

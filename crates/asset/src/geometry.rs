//! Procedural meshes: a subdivided plane and a UV sphere.

use std::f32::consts::PI;

use crate::mesh::{MeshData, MeshVertex};

/// Plane in the XY plane facing +Z, centered on the origin.
/// UV (0,0) is the bottom-left corner.
pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let gx = width_segments.max(1);
    let gy = height_segments.max(1);
    let (half_w, half_h) = (width * 0.5, height * 0.5);
    let (seg_w, seg_h) = (width / gx as f32, height / gy as f32);

    let mut vertices = Vec::with_capacity(((gx + 1) * (gy + 1)) as usize);
    for iy in 0..=gy {
        let y = iy as f32 * seg_h - half_h;
        for ix in 0..=gx {
            let x = ix as f32 * seg_w - half_w;
            vertices.push(MeshVertex::new(
                [x, -y, 0.0],
                [0.0, 0.0, 1.0],
                [ix as f32 / gx as f32, 1.0 - iy as f32 / gy as f32],
            ));
        }
    }

    let mut indices = Vec::with_capacity((gx * gy * 6) as usize);
    for iy in 0..gy {
        for ix in 0..gx {
            let a = ix + (gx + 1) * iy;
            let b = ix + (gx + 1) * (iy + 1);
            let c = (ix + 1) + (gx + 1) * (iy + 1);
            let d = (ix + 1) + (gx + 1) * iy;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    MeshData::new(vertices, indices)
}

/// UV sphere centered on the origin. U wraps around Y, V runs from the
/// south pole (0) to the north pole (1).
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);

    let mut vertices = Vec::with_capacity(((ws + 1) * (hs + 1)) as usize);
    for iy in 0..=hs {
        let v = iy as f32 / hs as f32;
        // nudge pole UVs to the middle of their triangle fan
        let u_offset = if iy == 0 {
            0.5 / ws as f32
        } else if iy == hs {
            -0.5 / ws as f32
        } else {
            0.0
        };
        for ix in 0..=ws {
            let u = ix as f32 / ws as f32;
            let phi = u * 2.0 * PI;
            let theta = v * PI;
            let normal = [
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            ];
            let position = normal.map(|c| c * radius);
            vertices.push(MeshVertex::new(position, normal, [u + u_offset, 1.0 - v]));
        }
    }

    let row = ws + 1;
    let mut indices = Vec::new();
    for iy in 0..hs {
        for ix in 0..ws {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != hs - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    MeshData::new(vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    #[test]
    fn unit_plane_is_two_ccw_triangles() {
        let mesh = plane(2.0, 2.0, 1, 1);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        assert!(mesh.is_valid());
        for tri in mesh.indices.chunks(3) {
            let [p0, p1, p2] = [0, 1, 2].map(|i| mesh.vertices[tri[i] as usize].position);
            let n = cross(sub(p1, p0), sub(p2, p0));
            assert!(n[2] > 0.0, "triangle {tri:?} should face +Z");
        }
    }

    #[test]
    fn plane_spans_requested_size() {
        let mesh = plane(2.0, 2.0, 4, 4);
        let xs: Vec<f32> = mesh.vertices.iter().map(|v| v.position[0]).collect();
        let min = xs.iter().cloned().fold(f32::MAX, f32::min);
        let max = xs.iter().cloned().fold(f32::MIN, f32::max);
        assert_eq!((min, max), (-1.0, 1.0));
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = sphere(2.0, 64, 64);
        assert!(mesh.is_valid());
        for v in &mesh.vertices {
            let [x, y, z] = v.position;
            assert!(((x * x + y * y + z * z).sqrt() - 2.0).abs() < 1e-4);
        }
        // poles contribute one triangle per segment, other rows two
        assert_eq!(mesh.indices.len(), (64 * 64 * 2 - 2 * 64) * 3);
    }

    #[test]
    fn sphere_triangles_face_outwards() {
        let mesh = sphere(1.0, 8, 6);
        for tri in mesh.indices.chunks(3) {
            let [p0, p1, p2] = [0, 1, 2].map(|i| mesh.vertices[tri[i] as usize].position);
            let n = cross(sub(p1, p0), sub(p2, p0));
            let c = [
                (p0[0] + p1[0] + p2[0]) / 3.0,
                (p0[1] + p1[1] + p2[1]) / 3.0,
                (p0[2] + p1[2] + p2[2]) / 3.0,
            ];
            let dot = n[0] * c[0] + n[1] * c[1] + n[2] * c[2];
            assert!(dot > 0.0, "triangle {tri:?} faces inwards");
        }
    }
}

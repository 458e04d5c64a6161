//! Indexed triangle meshes as produced by the procedural generators.

/// Object-space vertex: position, unit normal and texture coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Triangle list; every three indices form one counter-clockwise face.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Largest distance of any vertex from the origin.
    pub fn bounding_radius(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| {
                let [x, y, z] = v.position;
                (x * x + y * y + z * z).sqrt()
            })
            .fold(0.0, f32::max)
    }

    /// Non-empty, whole triangles, and no index past the vertex list.
    pub fn is_valid(&self) -> bool {
        let count = self.vertices.len() as u32;
        !self.vertices.is_empty()
            && !self.indices.is_empty()
            && self.indices.len() % 3 == 0
            && self.indices.iter().all(|&i| i < count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshData {
        let v = |x: f32, y: f32| MeshVertex::new([x, y, 0.0], [0.0, 0.0, 1.0], [x, y]);
        MeshData::new(vec![v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0)], vec![0, 1, 2])
    }

    #[test]
    fn single_triangle_is_valid() {
        let data = triangle();
        assert!(data.is_valid());
        assert_eq!(data.triangle_count(), 1);
        assert_eq!(data.bounding_radius(), 1.0);
    }

    #[test]
    fn out_of_range_or_partial_indices_are_invalid() {
        let mut data = triangle();
        data.indices = vec![0, 1, 3];
        assert!(!data.is_valid());
        data.indices = vec![0, 1];
        assert!(!data.is_valid());
        assert!(!MeshData::default().is_valid());
    }
}

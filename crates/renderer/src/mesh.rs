//! GPU meshes and placed mesh instances.

use std::sync::Arc;

use asset::MeshData;
use bytemuck::{Pod, Zeroable};
use corelib::{Mat4, camera::Camera, transform::Transform};
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, BufferUsages, Device, Queue, RenderPass,
    VertexBufferLayout, VertexStepMode, util::DeviceExt,
};

/// Vertex: position + normal + uv.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
    };
}

pub struct GpuMesh {
    vertex_buf: Buffer,
    index_buf: Buffer,
    index_count: u32,
}

impl GpuMesh {
    pub fn new(device: &Device, data: &MeshData, label: &str) -> Self {
        let vertices: Vec<Vertex> = data
            .vertices
            .iter()
            .map(|v| Vertex {
                pos: v.position,
                normal: v.normal,
                uv: v.uv,
            })
            .collect();
        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} VB")),
            contents: bytemuck::cast_slice(&vertices),
            usage: BufferUsages::VERTEX,
        });
        let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} IB")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: BufferUsages::INDEX,
        });
        log::debug!(
            "Mesh '{}': {} vertices, {} triangles, radius {:.3}",
            label,
            data.vertices.len(),
            data.triangle_count(),
            data.bounding_radius()
        );
        Self {
            vertex_buf,
            index_buf,
            index_count: data.indices.len() as u32,
        }
    }

    pub fn draw(&self, rpass: &mut RenderPass<'_>) {
        rpass.set_vertex_buffer(0, self.vertex_buf.slice(..));
        rpass.set_index_buffer(self.index_buf.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Per-object transform UBO (16-byte aligned).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ObjectUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub normal_model: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
}

impl ObjectUniform {
    pub fn new(camera: &Camera, transform: &Transform) -> Self {
        Self {
            view_proj: camera.proj_view().to_cols_array_2d(),
            view: camera.view().to_cols_array_2d(),
            model: transform.matrix().to_cols_array_2d(),
            normal_model: transform.normal_matrix().to_cols_array_2d(),
            camera_position: camera.eye.extend(1.0).to_array(),
        }
    }
}

impl Default for ObjectUniform {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            view: Mat4::IDENTITY.to_cols_array_2d(),
            model: Mat4::IDENTITY.to_cols_array_2d(),
            normal_model: Mat4::IDENTITY.to_cols_array_2d(),
            camera_position: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// A mesh placed in the scene; owns its transform UBO (bind group 0).
pub struct MeshObject {
    pub mesh: Arc<GpuMesh>,
    pub transform: Transform,
    uniform_buf: Buffer,
    bind_group: BindGroup,
}

impl MeshObject {
    pub fn new(
        device: &Device,
        layout: &BindGroupLayout,
        mesh: Arc<GpuMesh>,
        transform: Transform,
    ) -> Self {
        let uniform_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Object UBO"),
            contents: bytemuck::bytes_of(&ObjectUniform::default()),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object BG"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buf.as_entire_binding(),
            }],
        });
        Self {
            mesh,
            transform,
            uniform_buf,
            bind_group,
        }
    }

    /// Upload the matrices for this frame's camera.
    pub fn update(&self, queue: &Queue, camera: &Camera) {
        let u = ObjectUniform::new(camera, &self.transform);
        queue.write_buffer(&self.uniform_buf, 0, bytemuck::bytes_of(&u));
    }

    #[inline]
    pub fn bind_group(&self) -> &BindGroup {
        &self.bind_group
    }

    pub fn draw(&self, rpass: &mut RenderPass<'_>) {
        rpass.set_bind_group(0, &self.bind_group, &[]);
        self.mesh.draw(rpass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::Vec3;

    #[test]
    fn uniform_sizes_match_wgsl() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 4 * 64 + 16);
    }

    #[test]
    fn object_uniform_carries_camera_position() {
        let cam = Camera::looking_at_origin(Vec3::new(12.0, -2.0, -4.0), 25.0, 0.1, 100.0);
        let u = ObjectUniform::new(&cam, &Transform::from_uniform_scale(1.04));
        assert_eq!(u.camera_position, [12.0, -2.0, -4.0, 1.0]);
        assert!((u.model[0][0] - 1.04).abs() < 1e-6);
    }
}

//! Flame material: matcap-lit plane eroded by scrolling noise into a flame.

use bytemuck::{Pod, Zeroable};
use corelib::{Vec3, color::Color};
use wgpu::{BindGroup, Buffer, BufferUsages, Device, Queue, RenderPass, RenderPipeline, util::DeviceExt};

use super::{MeshPipelineDesc, Side, TargetDesc, create_mesh_pipeline, material_bind_group_layout};
use crate::{mesh::MeshObject, texture::GpuTexture};

const SHADER: &str = include_str!("../shaders/flame.wgsl");

/// Uniform block of `flame.wgsl` (vec3 + f32 rows, 16-byte aligned).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FlameUniforms {
    pub pivot_position: [f32; 3],
    pub opacity: f32,
    pub diffuse: [f32; 3],
    pub time: f32,
    pub flame_color: [f32; 3],
    pub alpha_falloff_start: f32,
    pub alpha_falloff_end: f32,
    pub flame_falloff_start: f32,
    pub flame_falloff_end: f32,
    pub _pad: f32,
}

impl Default for FlameUniforms {
    fn default() -> Self {
        Self {
            pivot_position: Vec3::new(0.0, -1.7, 0.0).to_array(),
            opacity: 1.0,
            diffuse: Color::from_hex(0xffffff).to_array(),
            time: 0.0,
            flame_color: Color::linear(0.7, 0.0, 0.0).to_array(),
            alpha_falloff_start: 0.25,
            alpha_falloff_end: 0.4,
            flame_falloff_start: 0.45,
            flame_falloff_end: 0.48,
            _pad: 0.0,
        }
    }
}

pub struct FlameMaterial {
    pipeline: RenderPipeline,
    uniform_buf: Buffer,
    bind_group: BindGroup,
}

impl FlameMaterial {
    pub fn new(
        device: &Device,
        object_bgl: &wgpu::BindGroupLayout,
        target: TargetDesc,
        matcap: &GpuTexture,
        noise: &GpuTexture,
        uniforms: &FlameUniforms,
    ) -> Self {
        let bgl = material_bind_group_layout(device, "Flame BGL", 2);
        let pipeline = create_mesh_pipeline(
            device,
            &MeshPipelineDesc {
                label: "Flame Pipeline",
                shader_src: SHADER,
                material_bgl: &bgl,
                object_bgl,
                target,
                side: Side::Double,
                transparent: true,
            },
        );
        let uniform_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Flame UBO"),
            contents: bytemuck::bytes_of(uniforms),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Flame BG"),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&matcap.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&matcap.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&noise.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&noise.sampler),
                },
            ],
        });
        Self {
            pipeline,
            uniform_buf,
            bind_group,
        }
    }

    pub fn write_uniforms(&self, queue: &Queue, uniforms: &FlameUniforms) {
        queue.write_buffer(&self.uniform_buf, 0, bytemuck::bytes_of(uniforms));
    }

    pub fn draw(&self, rpass: &mut RenderPass<'_>, object: &MeshObject) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(1, &self.bind_group, &[]);
        object.draw(rpass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_is_64_bytes() {
        assert_eq!(std::mem::size_of::<FlameUniforms>(), 64);
    }

    #[test]
    fn defaults_keep_alpha_falloff_inside_flame_falloff() {
        let u = FlameUniforms::default();
        assert!(u.alpha_falloff_start < u.alpha_falloff_end);
        assert!(u.alpha_falloff_end < u.flame_falloff_start);
        assert!(u.flame_falloff_start < u.flame_falloff_end);
        assert!(u.diffuse.iter().all(|c| (c - 1.0).abs() < 1e-6));
        assert_eq!(u.time, 0.0);
    }
}

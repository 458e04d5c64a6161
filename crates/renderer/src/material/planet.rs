//! Planet surface with a day/night terminator, and its atmosphere shell.

use bytemuck::{Pod, Zeroable};
use corelib::{Vec3, Vec4, color::Color};
use wgpu::{BindGroup, Buffer, BufferUsages, Device, Queue, RenderPass, RenderPipeline, util::DeviceExt};

use super::{MeshPipelineDesc, Side, TargetDesc, create_mesh_pipeline, material_bind_group_layout};
use crate::{mesh::MeshObject, texture::GpuTexture};

const PLANET_SHADER: &str = include_str!("../shaders/planet.wgsl");
const ATMOSPHERE_SHADER: &str = include_str!("../shaders/atmosphere.wgsl");

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PlanetUniforms {
    pub night_color: [f32; 4],
    pub sun_direction: [f32; 3],
    pub _pad0: f32,
    pub atmosphere_day_color: [f32; 3],
    pub _pad1: f32,
    pub atmosphere_twilight_color: [f32; 3],
    pub _pad2: f32,
}

impl Default for PlanetUniforms {
    fn default() -> Self {
        Self {
            night_color: Vec4::new(0.0, 0.0, 0.0, 0.9).to_array(),
            sun_direction: Vec3::Z.to_array(),
            _pad0: 0.0,
            atmosphere_day_color: Color::from_hex(0x3a0ca3).to_array(),
            _pad1: 0.0,
            atmosphere_twilight_color: Color::from_hex(0x7209b7).to_array(),
            _pad2: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct AtmosphereUniforms {
    pub sun_direction: [f32; 3],
    pub _pad0: f32,
    pub day_color: [f32; 3],
    pub _pad1: f32,
    pub twilight_color: [f32; 3],
    pub _pad2: f32,
}

impl From<&PlanetUniforms> for AtmosphereUniforms {
    fn from(p: &PlanetUniforms) -> Self {
        Self {
            sun_direction: p.sun_direction,
            _pad0: 0.0,
            day_color: p.atmosphere_day_color,
            _pad1: 0.0,
            twilight_color: p.atmosphere_twilight_color,
            _pad2: 0.0,
        }
    }
}

pub struct PlanetMaterial {
    pipeline: RenderPipeline,
    uniform_buf: Buffer,
    bind_group: BindGroup,
}

impl PlanetMaterial {
    pub fn new(
        device: &Device,
        object_bgl: &wgpu::BindGroupLayout,
        target: TargetDesc,
        day_texture: &GpuTexture,
        uniforms: &PlanetUniforms,
    ) -> Self {
        let bgl = material_bind_group_layout(device, "Planet BGL", 1);
        let pipeline = create_mesh_pipeline(
            device,
            &MeshPipelineDesc {
                label: "Planet Pipeline",
                shader_src: PLANET_SHADER,
                material_bgl: &bgl,
                object_bgl,
                target,
                side: Side::Front,
                transparent: false,
            },
        );
        let uniform_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Planet UBO"),
            contents: bytemuck::bytes_of(uniforms),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Planet BG"),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&day_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&day_texture.sampler),
                },
            ],
        });
        Self {
            pipeline,
            uniform_buf,
            bind_group,
        }
    }

    pub fn write_uniforms(&self, queue: &Queue, uniforms: &PlanetUniforms) {
        queue.write_buffer(&self.uniform_buf, 0, bytemuck::bytes_of(uniforms));
    }

    pub fn draw(&self, rpass: &mut RenderPass<'_>, object: &MeshObject) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(1, &self.bind_group, &[]);
        object.draw(rpass);
    }
}

/// Back-face, alpha-blended shell drawn slightly larger than the planet.
pub struct AtmosphereMaterial {
    pipeline: RenderPipeline,
    uniform_buf: Buffer,
    bind_group: BindGroup,
}

impl AtmosphereMaterial {
    pub fn new(
        device: &Device,
        object_bgl: &wgpu::BindGroupLayout,
        target: TargetDesc,
        uniforms: &AtmosphereUniforms,
    ) -> Self {
        let bgl = material_bind_group_layout(device, "Atmosphere BGL", 0);
        let pipeline = create_mesh_pipeline(
            device,
            &MeshPipelineDesc {
                label: "Atmosphere Pipeline",
                shader_src: ATMOSPHERE_SHADER,
                material_bgl: &bgl,
                object_bgl,
                target,
                side: Side::Back,
                transparent: true,
            },
        );
        let uniform_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Atmosphere UBO"),
            contents: bytemuck::bytes_of(uniforms),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Atmosphere BG"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buf.as_entire_binding(),
            }],
        });
        Self {
            pipeline,
            uniform_buf,
            bind_group,
        }
    }

    pub fn write_uniforms(&self, queue: &Queue, uniforms: &AtmosphereUniforms) {
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
    fn uniform_block_sizes() {
        assert_eq!(std::mem::size_of::<PlanetUniforms>(), 64);
        assert_eq!(std::mem::size_of::<AtmosphereUniforms>(), 48);
    }

    #[test]
    fn atmosphere_shares_sun_and_colors() {
        let planet = PlanetUniforms {
            sun_direction: [1.0, 0.0, 0.0],
            ..Default::default()
        };
        let atmo = AtmosphereUniforms::from(&planet);
        assert_eq!(atmo.sun_direction, [1.0, 0.0, 0.0]);
        assert_eq!(atmo.day_color, planet.atmosphere_day_color);
        assert_eq!(atmo.twilight_color, planet.atmosphere_twilight_color);
    }
}

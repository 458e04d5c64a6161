//! Shader materials: a WGSL program, its uniform block and its textures.
//!
//! Every mesh pipeline uses the same layout convention:
//! group 0 = per-object transforms ([`crate::mesh::ObjectUniform`]),
//! group 1 = material uniform block followed by texture/sampler pairs.

pub mod flame;
pub mod planet;

pub use flame::{FlameMaterial, FlameUniforms};
pub use planet::{AtmosphereMaterial, AtmosphereUniforms, PlanetMaterial, PlanetUniforms};

use wgpu::{
    BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType, BlendState,
    BufferBindingType, ColorTargetState, ColorWrites, DepthBiasState, DepthStencilState, Device,
    Face, FragmentState, PipelineLayoutDescriptor, RenderPipeline, RenderPipelineDescriptor,
    SamplerBindingType, ShaderModuleDescriptor, ShaderSource, ShaderStages, TextureFormat,
    TextureSampleType, TextureViewDimension, VertexState,
};

use crate::{DEPTH_FORMAT, mesh::Vertex};

/// Which faces of a mesh are rasterized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
    Double,
}

impl Side {
    fn cull_mode(self) -> Option<Face> {
        match self {
            Side::Front => Some(Face::Back),
            Side::Back => Some(Face::Front),
            Side::Double => None,
        }
    }
}

/// Color target the material pipelines render into.
#[derive(Clone, Copy, Debug)]
pub struct TargetDesc {
    pub format: TextureFormat,
    pub sample_count: u32,
}

pub(crate) struct MeshPipelineDesc<'a> {
    pub label: &'a str,
    pub shader_src: &'a str,
    pub material_bgl: &'a BindGroupLayout,
    pub object_bgl: &'a BindGroupLayout,
    pub target: TargetDesc,
    pub side: Side,
    pub transparent: bool,
}

/// Layout for [`crate::mesh::MeshObject`] bind groups.
pub fn object_bind_group_layout(device: &Device) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("Object BGL"),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStages::VERTEX_FRAGMENT,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// Material layout: one uniform block then `textures` texture/sampler pairs.
pub(crate) fn material_bind_group_layout(
    device: &Device,
    label: &str,
    textures: u32,
) -> BindGroupLayout {
    let mut entries = vec![BindGroupLayoutEntry {
        binding: 0,
        visibility: ShaderStages::VERTEX_FRAGMENT,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }];
    for i in 0..textures {
        entries.push(BindGroupLayoutEntry {
            binding: 1 + 2 * i,
            visibility: ShaderStages::FRAGMENT,
            ty: BindingType::Texture {
                sample_type: TextureSampleType::Float { filterable: true },
                view_dimension: TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });
        entries.push(BindGroupLayoutEntry {
            binding: 2 + 2 * i,
            visibility: ShaderStages::FRAGMENT,
            ty: BindingType::Sampler(SamplerBindingType::Filtering),
            count: None,
        });
    }
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &entries,
    })
}

pub(crate) fn create_mesh_pipeline(device: &Device, desc: &MeshPipelineDesc<'_>) -> RenderPipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some(desc.label),
        source: ShaderSource::Wgsl(desc.shader_src.into()),
    });
    let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some(desc.label),
        bind_group_layouts: &[desc.object_bgl, desc.material_bgl],
        push_constant_ranges: &[],
    });
    let blend = if desc.transparent {
        BlendState::ALPHA_BLENDING
    } else {
        BlendState::REPLACE
    };
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::LAYOUT],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: desc.target.format,
                blend: Some(blend),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            cull_mode: desc.side.cull_mode(),
            ..Default::default()
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: desc.target.sample_count,
            ..Default::default()
        },
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_maps_to_culled_face() {
        assert_eq!(Side::Front.cull_mode(), Some(Face::Back));
        assert_eq!(Side::Back.cull_mode(), Some(Face::Front));
        assert_eq!(Side::Double.cull_mode(), None);
    }
}

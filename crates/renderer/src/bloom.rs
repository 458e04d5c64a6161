//! Unreal-style bloom: luminosity high-pass, five progressively smaller
//! gaussian-blurred mips, then a weighted composite added over the scene.
//!
//! Mip weights start from [`BLOOM_FACTORS`] and are pulled towards their
//! mirror (`1.2 - factor`) by `radius`, so a larger radius favours the wide,
//! low-resolution mips. The result is scaled by `strength`.

use bytemuck::{Pod, Zeroable};
use wgpu::{
    BindGroup, BindGroupLayout, BindGroupLayoutEntry, BindingType, Buffer, BufferUsages,
    CommandEncoder, Device, Queue, RenderPipeline, Sampler, TextureFormat, TextureView,
    util::DeviceExt,
};

use crate::HDR_FORMAT;

pub const MIP_COUNT: usize = 5;
pub const BLOOM_FACTORS: [f32; MIP_COUNT] = [1.0, 0.8, 0.6, 0.4, 0.2];
pub const KERNEL_SIZES: [u32; MIP_COUNT] = [3, 5, 7, 9, 11];
const SMOOTH_WIDTH: f32 = 0.01;

const SHADER: &str = include_str!("shaders/bloom.wgsl");
const BLUR_SHADER: &str = include_str!("shaders/bloom_blur.wgsl");

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BloomSettings {
    pub strength: f32,
    pub radius: f32,
    /// Luminance above which pixels start to glow.
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            strength: 1.4,
            radius: 0.4,
            threshold: 0.7,
        }
    }
}

#[inline]
pub fn lerp_bloom_factor(factor: f32, radius: f32) -> f32 {
    let mirror = 1.2 - factor;
    factor + (mirror - factor) * radius
}

/// Final composite weight of every mip.
pub fn mip_weights(settings: &BloomSettings) -> [f32; MIP_COUNT] {
    BLOOM_FACTORS.map(|f| settings.strength * lerp_bloom_factor(f, settings.radius))
}

/// Size of blur mip `level` for a `width`x`height` scene (mip 0 is half size).
#[inline]
pub fn mip_size(width: u32, height: u32, level: usize) -> (u32, u32) {
    ((width >> (level + 1)).max(1), (height >> (level + 1)).max(1))
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct BloomParams {
    threshold: f32,
    smooth_width: f32,
    _pad: [f32; 2],
    weights: [f32; 8],
}

impl BloomParams {
    fn new(settings: &BloomSettings) -> Self {
        let mut weights = [0.0; 8];
        weights[..MIP_COUNT].copy_from_slice(&mip_weights(settings));
        Self {
            threshold: settings.threshold,
            smooth_width: SMOOTH_WIDTH,
            _pad: [0.0; 2],
            weights,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct BlurParams {
    direction: [f32; 2],
    inv_size: [f32; 2],
    kernel_radius: f32,
    sigma: f32,
    _pad: [f32; 2],
}

/// Render target sampled by a later pass.
struct Target {
    view: TextureView,
    bind_group: BindGroup,
}

/// One blur level: horizontal then vertical pass.
struct BlurLevel {
    horizontal: Target,
    vertical: Target,
    h_params: BindGroup,
    v_params: BindGroup,
}

pub struct BloomPass {
    device: Device,
    settings: BloomSettings,
    uniform_bgl: BindGroupLayout,
    texture_bgl: BindGroupLayout,
    mips_bgl: BindGroupLayout,
    sampler: Sampler,
    extract_pipeline: RenderPipeline,
    blur_pipeline: RenderPipeline,
    composite_pipeline: RenderPipeline,
    params_buf: Buffer,
    params_bg: BindGroup,
    input_bg: BindGroup,
    bright: Target,
    levels: Vec<BlurLevel>,
    mips_bg: BindGroup,
}

impl BloomPass {
    /// `input` is the HDR scene color of size `width`x`height`; the composite
    /// is written to a target of `output_format`.
    pub fn new(
        device: &Device,
        input: &TextureView,
        output_format: TextureFormat,
        width: u32,
        height: u32,
        settings: BloomSettings,
    ) -> Self {
        let uniform_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bloom-uniform-bgl"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bloom-texture-bgl"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });
        let mut mip_entries: Vec<_> = (0..MIP_COUNT as u32).map(texture_entry).collect();
        mip_entries.push(sampler_entry(MIP_COUNT as u32));
        let mips_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bloom-mips-bgl"),
            entries: &mip_entries,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("bloom-shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });
        let blur_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("bloom-blur-shader"),
            source: wgpu::ShaderSource::Wgsl(BLUR_SHADER.into()),
        });

        let pass_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("bloom-pass-layout"),
            bind_group_layouts: &[&uniform_bgl, &texture_bgl],
            push_constant_ranges: &[],
        });
        let composite_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("bloom-composite-layout"),
            bind_group_layouts: &[&uniform_bgl, &texture_bgl, &mips_bgl],
            push_constant_ranges: &[],
        });

        let extract_pipeline = create_fullscreen_pipeline(
            device,
            &shader,
            &pass_layout,
            "fs_extract",
            HDR_FORMAT,
            "bloom-extract",
        );
        let blur_pipeline = create_fullscreen_pipeline(
            device,
            &blur_shader,
            &pass_layout,
            "fs_blur",
            HDR_FORMAT,
            "bloom-blur",
        );
        let composite_pipeline = create_fullscreen_pipeline(
            device,
            &shader,
            &composite_layout,
            "fs_composite",
            output_format,
            "bloom-composite",
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("bloom-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let params_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bloom-params"),
            contents: bytemuck::bytes_of(&BloomParams::new(&settings)),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let params_bg = uniform_bind_group(device, &uniform_bgl, &params_buf, "bloom-params-bg");

        let input_bg = texture_bind_group(device, &texture_bgl, input, &sampler, "bloom-input-bg");
        let (bright, levels, mips_bg) =
            create_chain(device, &uniform_bgl, &texture_bgl, &mips_bgl, &sampler, width, height);

        Self {
            device: device.clone(),
            settings,
            uniform_bgl,
            texture_bgl,
            mips_bgl,
            sampler,
            extract_pipeline,
            blur_pipeline,
            composite_pipeline,
            params_buf,
            params_bg,
            input_bg,
            bright,
            levels,
            mips_bg,
        }
    }

    #[inline]
    pub fn settings(&self) -> BloomSettings {
        self.settings
    }

    pub fn set_settings(&mut self, queue: &Queue, settings: BloomSettings) {
        if settings != self.settings {
            queue.write_buffer(&self.params_buf, 0, bytemuck::bytes_of(&BloomParams::new(&settings)));
            self.settings = settings;
        }
    }

    /// Recreate the mip chain for a new scene size and input view.
    pub fn resize(&mut self, input: &TextureView, width: u32, height: u32) {
        self.input_bg = texture_bind_group(
            &self.device,
            &self.texture_bgl,
            input,
            &self.sampler,
            "bloom-input-bg",
        );
        let (bright, levels, mips_bg) = create_chain(
            &self.device,
            &self.uniform_bgl,
            &self.texture_bgl,
            &self.mips_bgl,
            &self.sampler,
            width,
            height,
        );
        self.bright = bright;
        self.levels = levels;
        self.mips_bg = mips_bg;
    }

    /// High-pass, blur chain, then scene + bloom into `output`.
    pub fn render(&self, encoder: &mut CommandEncoder, output: &TextureView) {
        self.run_pass(
            encoder,
            &self.extract_pipeline,
            &self.params_bg,
            &[&self.input_bg],
            &self.bright.view,
            "bloom-extract",
        );

        let mut source = &self.bright.bind_group;
        for level in &self.levels {
            self.run_pass(
                encoder,
                &self.blur_pipeline,
                &level.h_params,
                &[source],
                &level.horizontal.view,
                "bloom-blur-h",
            );
            self.run_pass(
                encoder,
                &self.blur_pipeline,
                &level.v_params,
                &[&level.horizontal.bind_group],
                &level.vertical.view,
                "bloom-blur-v",
            );
            source = &level.vertical.bind_group;
        }

        self.run_pass(
            encoder,
            &self.composite_pipeline,
            &self.params_bg,
            &[&self.input_bg, &self.mips_bg],
            output,
            "bloom-composite",
        );
    }

    /// Run a single fullscreen render pass.
    fn run_pass(
        &self,
        encoder: &mut CommandEncoder,
        pipeline: &RenderPipeline,
        uniforms: &BindGroup,
        textures: &[&BindGroup],
        target: &TextureView,
        label: &str,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            ..Default::default()
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, uniforms, &[]);
        for (i, bg) in textures.iter().enumerate() {
            pass.set_bind_group(1 + i as u32, *bg, &[]);
        }
        pass.draw(0..3, 0..1);
    }
}

fn texture_entry(binding: u32) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn uniform_bind_group(
    device: &Device,
    layout: &BindGroupLayout,
    buffer: &Buffer,
    label: &str,
) -> BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

fn texture_bind_group(
    device: &Device,
    layout: &BindGroupLayout,
    view: &TextureView,
    sampler: &Sampler,
    label: &str,
) -> BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn create_target(
    device: &Device,
    layout: &BindGroupLayout,
    sampler: &Sampler,
    width: u32,
    height: u32,
    label: &str,
) -> Target {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: HDR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = texture_bind_group(device, layout, &view, sampler, label);
    Target {
        view,
        bind_group,
    }
}

/// Create the bright-pass target and the blur mip chain.
fn create_chain(
    device: &Device,
    uniform_bgl: &BindGroupLayout,
    texture_bgl: &BindGroupLayout,
    mips_bgl: &BindGroupLayout,
    sampler: &Sampler,
    width: u32,
    height: u32,
) -> (Target, Vec<BlurLevel>, BindGroup) {
    let (bw, bh) = mip_size(width, height, 0);
    let bright = create_target(device, texture_bgl, sampler, bw, bh, "bloom-bright");

    let levels: Vec<BlurLevel> = KERNEL_SIZES
        .iter()
        .enumerate()
        .map(|(i, &kernel)| {
            let (w, h) = mip_size(width, height, i);
            log::trace!("Bloom mip {i}: {w}x{h}");
            let blur_params = |direction: [f32; 2], label: &str| {
                let params = BlurParams {
                    direction,
                    inv_size: [1.0 / w as f32, 1.0 / h as f32],
                    kernel_radius: kernel as f32,
                    sigma: kernel as f32,
                    _pad: [0.0; 2],
                };
                let buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::bytes_of(&params),
                    usage: BufferUsages::UNIFORM,
                });
                uniform_bind_group(device, uniform_bgl, &buf, label)
            };
            BlurLevel {
                horizontal: create_target(device, texture_bgl, sampler, w, h, "bloom-mip-h"),
                vertical: create_target(device, texture_bgl, sampler, w, h, "bloom-mip-v"),
                h_params: blur_params([1.0, 0.0], "bloom-blur-h-params"),
                v_params: blur_params([0.0, 1.0], "bloom-blur-v-params"),
            }
        })
        .collect();

    let mut entries: Vec<wgpu::BindGroupEntry> = levels
        .iter()
        .enumerate()
        .map(|(i, level)| wgpu::BindGroupEntry {
            binding: i as u32,
            resource: wgpu::BindingResource::TextureView(&level.vertical.view),
        })
        .collect();
    entries.push(wgpu::BindGroupEntry {
        binding: MIP_COUNT as u32,
        resource: wgpu::BindingResource::Sampler(sampler),
    });
    let mips_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("bloom-mips-bg"),
        layout: mips_bgl,
        entries: &entries,
    });

    (bright, levels, mips_bg)
}

/// Create a fullscreen render pipeline with the given fragment entry point.
fn create_fullscreen_pipeline(
    device: &Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    fragment_entry: &str,
    target_format: TextureFormat,
    label: &str,
) -> RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_fullscreen"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_radius_keeps_base_factors() {
        let w = mip_weights(&BloomSettings {
            strength: 1.0,
            radius: 0.0,
            threshold: 0.0,
        });
        assert_eq!(w, BLOOM_FACTORS);
    }

    #[test]
    fn full_radius_mirrors_factors() {
        for f in BLOOM_FACTORS {
            assert!((lerp_bloom_factor(f, 1.0) - (1.2 - f)).abs() < 1e-6);
        }
    }

    #[test]
    fn strength_scales_all_weights() {
        let base = mip_weights(&BloomSettings {
            strength: 1.0,
            ..Default::default()
        });
        let doubled = mip_weights(&BloomSettings {
            strength: 2.0,
            ..Default::default()
        });
        for (a, b) in base.iter().zip(doubled) {
            assert!((b - 2.0 * a).abs() < 1e-6);
        }
    }

    #[test]
    fn default_settings_match_flame_scene() {
        let s = BloomSettings::default();
        assert_eq!((s.strength, s.radius, s.threshold), (1.4, 0.4, 0.7));
        // radius 0.4 flattens the falloff towards the wide mips
        let w = mip_weights(&s);
        assert!(w[0] > w[4]);
        assert!((w[0] - 1.4 * 0.68).abs() < 1e-5);
        assert!((w[4] - 1.4 * 0.52).abs() < 1e-5);
    }

    #[test]
    fn mip_chain_dimensions_halve_each_level() {
        let dims: Vec<_> = (0..MIP_COUNT).map(|i| mip_size(1920, 1080, i)).collect();
        assert_eq!(dims, vec![(960, 540), (480, 270), (240, 135), (120, 67), (60, 33)]);
        assert_eq!(mip_size(3, 3, 4), (1, 1));
    }

    #[test]
    fn uniform_blocks_match_wgsl() {
        assert_eq!(std::mem::size_of::<BloomParams>(), 48);
        assert_eq!(std::mem::size_of::<BlurParams>(), 32);
        let p = BloomParams::new(&BloomSettings::default());
        assert_eq!(p.weights[5..], [0.0; 3]);
    }
}

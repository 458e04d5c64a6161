//! Post-processing chain: the scene renders into an HDR target, bloom then
//! composites it into the swapchain image.

use corelib::{color::Color, viewport::Resize};
use wgpu::{CommandEncoder, Device, Queue, RenderPass, TextureFormat, TextureView};

use crate::{
    HDR_FORMAT,
    bloom::{BloomPass, BloomSettings},
    material::TargetDesc,
    target::create_depth_view,
};

pub struct Composer {
    device: Device,
    scene_view: TextureView,
    depth_view: TextureView,
    bloom: BloomPass,
    clear: wgpu::Color,
    width: u32,
    height: u32,
}

impl Composer {
    pub fn new(
        device: &Device,
        output_format: TextureFormat,
        width: u32,
        height: u32,
        bloom: BloomSettings,
        clear: Color,
    ) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let scene_view = create_scene_view(device, width, height);
        let depth_view = create_depth_view(device, width, height, 1);
        let bloom = BloomPass::new(device, &scene_view, output_format, width, height, bloom);
        log::debug!("Composer created at {}x{}", width, height);
        Self {
            device: device.clone(),
            scene_view,
            depth_view,
            bloom,
            clear: wgpu::Color {
                r: clear.r as f64,
                g: clear.g as f64,
                b: clear.b as f64,
                a: 1.0,
            },
            width,
            height,
        }
    }

    /// Format of the target scene materials must be built for.
    #[inline]
    pub fn target_desc() -> TargetDesc {
        TargetDesc {
            format: HDR_FORMAT,
            sample_count: 1,
        }
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn bloom_settings(&self) -> BloomSettings {
        self.bloom.settings()
    }

    pub fn set_bloom_settings(&mut self, queue: &Queue, settings: BloomSettings) {
        self.bloom.set_settings(queue, settings);
    }

    /// Begin the scene pass: cleared HDR color plus depth.
    pub fn scene_pass<'a>(&'a self, encoder: &'a mut CommandEncoder) -> RenderPass<'a> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.scene_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        })
    }

    /// Run bloom over the scene and write the result to `output`.
    pub fn finish(&self, encoder: &mut CommandEncoder, output: &TextureView) {
        self.bloom.render(encoder, output);
    }
}

impl Resize for Composer {
    fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.scene_view = create_scene_view(&self.device, width, height);
        self.depth_view = create_depth_view(&self.device, width, height, 1);
        self.bloom.resize(&self.scene_view, width, height);
        log::debug!("Composer resized to {}x{}", width, height);
    }
}

fn create_scene_view(device: &Device, width: u32, height: u32) -> TextureView {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("SceneHdrTex"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: HDR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    tex.create_view(&wgpu::TextureViewDescriptor::default())
}

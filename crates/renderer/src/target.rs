//! Depth (and optional MSAA color) attachments that follow the surface size.

use corelib::viewport::Resize;
use wgpu::{
    Device, Extent3d, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages,
    TextureView, TextureViewDescriptor,
};

use crate::DEPTH_FORMAT;

/// Attachments for rendering a scene directly into the swapchain image.
pub struct FrameTargets {
    device: Device,
    color_format: TextureFormat,
    sample_count: u32,
    depth_view: TextureView,
    msaa_view: Option<TextureView>,
    width: u32,
    height: u32,
}

impl FrameTargets {
    pub fn new(
        device: &Device,
        color_format: TextureFormat,
        sample_count: u32,
        width: u32,
        height: u32,
    ) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            device: device.clone(),
            color_format,
            sample_count,
            depth_view: create_depth_view(device, width, height, sample_count),
            msaa_view: create_msaa_view(device, color_format, width, height, sample_count),
            width,
            height,
        }
    }

    #[inline]
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    #[inline]
    pub fn depth_view(&self) -> &TextureView {
        &self.depth_view
    }

    /// Color attachment `(view, resolve_target)` for a frame whose final
    /// image is `frame_view`.
    pub fn color_attachment<'a>(
        &'a self,
        frame_view: &'a TextureView,
    ) -> (&'a TextureView, Option<&'a TextureView>) {
        match &self.msaa_view {
            Some(msaa) => (msaa, Some(frame_view)),
            None => (frame_view, None),
        }
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Resize for FrameTargets {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.depth_view = create_depth_view(&self.device, self.width, self.height, self.sample_count);
        self.msaa_view = create_msaa_view(
            &self.device,
            self.color_format,
            self.width,
            self.height,
            self.sample_count,
        );
        log::debug!("Frame targets resized to {}x{}", self.width, self.height);
    }
}

/// Create a depth texture view of the given size.
pub(crate) fn create_depth_view(
    device: &Device,
    width: u32,
    height: u32,
    sample_count: u32,
) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthTex"),
        size: Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}

fn create_msaa_view(
    device: &Device,
    format: TextureFormat,
    width: u32,
    height: u32,
    sample_count: u32,
) -> Option<TextureView> {
    if sample_count <= 1 {
        return None;
    }
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("MsaaColorTex"),
        size: Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: TextureDimension::D2,
        format,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    Some(tex.create_view(&TextureViewDescriptor::default()))
}

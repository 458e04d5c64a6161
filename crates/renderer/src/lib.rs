//! Renderer: wgpu context, GPU resources, shader materials and bloom.
//! wgpu = 27.x, winit = 0.30.x

use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::{
    Device, DeviceDescriptor, Features, Instance, InstanceDescriptor, Limits, PowerPreference,
    PresentMode, Queue, Surface, SurfaceConfiguration, SurfaceError, SurfaceTexture,
    TextureFormat, TextureUsages,
};
use winit::{dpi::PhysicalSize, window::Window};

pub mod bloom;
pub mod composer;
pub mod material;
pub mod mesh;
pub mod target;
pub mod texture;

pub use bloom::{BloomPass, BloomSettings};
pub use composer::Composer;
pub use mesh::{GpuMesh, MeshObject, Vertex};
pub use target::FrameTargets;
pub use texture::{GpuTexture, TextureOptions, Wrap};

/// HDR format for offscreen scene rendering.
pub const HDR_FORMAT: TextureFormat = TextureFormat::Rgba16Float;
pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Surface, device and queue for one window.
pub struct GpuContext {
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    pub device: Device,
    pub queue: Queue,
    pub adapter_info: wgpu::AdapterInfo,
}

impl GpuContext {
    /// Create GPU state bound to an Arc<Window>.
    pub async fn new(window: Arc<Window>, backends: wgpu::Backends) -> Result<Self> {
        let PhysicalSize { width, height } = window.inner_size();
        let width = width.max(1);
        let height = height.max(1);

        // Instance & surface
        let instance = Instance::new(&InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance
            .create_surface(window.clone())
            .context("create_surface failed")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable GPU adapter")?;
        let adapter_info = adapter.get_info();
        log::info!(
            "Adapter: {} ({:?}, {:?})",
            adapter_info.name,
            adapter_info.backend,
            adapter_info.device_type
        );

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Demo Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                ..Default::default()
            })
            .await
            .context("request_device failed")?;

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("Surface reports no formats")?;

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        log::info!("Surface configured: {}x{} {:?}", width, height, surface_format);

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            adapter_info,
        })
    }

    /// Blocking wrapper around [`GpuContext::new`].
    pub fn new_blocking(window: Arc<Window>, backends: wgpu::Backends) -> Result<Self> {
        pollster::block_on(Self::new(window, backends))
    }

    #[inline]
    pub fn surface_format(&self) -> TextureFormat {
        self.surface_config.format
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// Reconfigure the surface for a new window size (physical pixels).
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width.max(1);
        self.surface_config.height = height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
    }

    pub fn acquire_frame(&self) -> Result<SurfaceTexture, SurfaceError> {
        self.surface.get_current_texture()
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        let (w, h) = self.size();
        self.resize(w, h);
    }
}

//! Platform layer: window, event loop and the per-frame lifecycle of a demo.
//!
//! A [`Demo`] is initialised once when the window is first resumed, receives
//! resize and input events, and is updated then rendered on every redraw.
//! Closing the window destroys the demo before the GPU context goes away.

mod debug;

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use renderer::GpuContext;
use wgpu::{CommandEncoder, TextureView};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

pub use debug::DebugPanel;

/// Window size in physical pixels plus the display scale factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl SurfaceSize {
    pub fn of(window: &Window) -> Self {
        let PhysicalSize { width, height } = window.inner_size();
        Self {
            width,
            height,
            scale_factor: window.scale_factor(),
        }
    }

    /// Size in logical (scale-independent) pixels.
    pub fn logical(&self) -> (u32, u32) {
        let unscale = |v: u32| (v as f64 / self.scale_factor.max(f64::EPSILON)).round() as u32;
        (unscale(self.width), unscale(self.height))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

pub trait Demo {
    fn title(&self) -> &str;

    /// Load assets and create GPU resources. Called once.
    fn init(&mut self, gpu: &GpuContext, size: SurfaceSize) -> Result<()>;

    fn resize(&mut self, gpu: &GpuContext, size: SurfaceSize);

    /// Window input not consumed by the debug panel.
    fn input(&mut self, _event: &WindowEvent) {}

    /// Advance per-frame state.
    fn update(&mut self);

    fn render(&mut self, gpu: &GpuContext, encoder: &mut CommandEncoder, frame: &TextureView);

    fn debug_ui(&mut self, _ctx: &egui::Context) {}

    /// Release GPU resources.
    fn destroy(&mut self) {}
}

#[derive(Clone, Debug)]
pub struct RunOptions {
    pub backends: wgpu::Backends,
    pub width: u32,
    pub height: u32,
    pub debug: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            width: 1280,
            height: 720,
            debug: false,
        }
    }
}

struct App<D: Demo> {
    options: RunOptions,
    demo: D,
    window: Option<Arc<Window>>,
    panel: Option<DebugPanel>,
    gpu: Option<GpuContext>,
    error: Option<anyhow::Error>,
    frames: u64,
}

impl<D: Demo> App<D> {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.demo.title())
            .with_inner_size(PhysicalSize::new(self.options.width, self.options.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("Failed to create window")?,
        );
        let size = SurfaceSize::of(&window);
        log::info!(
            "Window created: {}x{} (scale {:.2})",
            size.width,
            size.height,
            size.scale_factor
        );

        let gpu = GpuContext::new_blocking(window.clone(), self.options.backends)?;
        self.demo.init(&gpu, size)?;
        self.demo.resize(&gpu, size);
        if self.options.debug {
            self.panel = Some(DebugPanel::new(&window, &gpu));
        }

        window.request_redraw();
        self.gpu = Some(gpu);
        self.window = Some(window);
        Ok(())
    }

    fn redraw(&mut self) {
        let (Some(window), Some(gpu)) = (self.window.as_ref(), self.gpu.as_mut()) else {
            return;
        };
        self.demo.update();

        let frame = match gpu.acquire_frame() {
            Ok(frame) => frame,
            Err(err) if GpuContext::is_surface_lost(&err) => {
                log::warn!("Surface lost/outdated, reconfiguring");
                gpu.recreate_surface();
                return;
            }
            Err(err) => {
                log::error!("Failed to acquire frame: {err:?}");
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.demo.render(gpu, &mut encoder, &view);
        if let Some(panel) = self.panel.as_mut() {
            let demo = &mut self.demo;
            panel.draw(window, gpu, &mut encoder, &view, |ctx| demo.debug_ui(ctx));
        }

        gpu.queue.submit(Some(encoder.finish()));
        window.pre_present_notify();
        frame.present();

        self.frames += 1;
        if self.frames % 600 == 0 {
            log::trace!("Presented {} frames", self.frames);
        }
    }

    fn shutdown(&mut self) {
        self.demo.destroy();
        self.panel = None;
        self.gpu = None;
        log::info!("Demo '{}' destroyed after {} frames", self.demo.title(), self.frames);
    }
}

impl<D: Demo> ApplicationHandler for App<D> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            self.error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let consumed = self
            .panel
            .as_mut()
            .is_some_and(|panel| panel.on_window_event(&window, &event));

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                let size = SurfaceSize::of(&window);
                if let Some(gpu) = self.gpu.as_mut().filter(|_| !size.is_empty()) {
                    log::info!("Resized: {}x{}", width, height);
                    gpu.resize(width, height);
                    self.demo.resize(gpu, size);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                log::info!("Scale factor changed: {:.3}", scale_factor);
                // the new physical size arrives with the following Resized
            }
            WindowEvent::RedrawRequested => self.redraw(),
            other if !consumed => self.demo.input(&other),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

/// Open a window and drive `demo` until the window is closed.
pub fn run<D: Demo>(options: RunOptions, demo: D) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|e| anyhow!("Event loop error: {e:?}"))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        options,
        demo,
        window: None,
        panel: None,
        gpu: None,
        error: None,
        frames: 0,
    };
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow!("Event loop error: {e:?}"))?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_open_a_720p_window() {
        let o = RunOptions::default();
        assert_eq!((o.width, o.height), (1280, 720));
        assert!(!o.debug);
    }

    #[test]
    fn zero_sized_surface_is_empty() {
        let s = SurfaceSize {
            width: 0,
            height: 600,
            scale_factor: 1.0,
        };
        assert!(s.is_empty());
        let hidpi = SurfaceSize {
            width: 2560,
            height: 1440,
            scale_factor: 2.0,
        };
        assert_eq!(hidpi.logical(), (1280, 720));
        assert!(
            !SurfaceSize {
                width: 1,
                ..s
            }
            .is_empty()
        );
    }
}

//! Optional egui overlay drawn on top of the frame.

use egui_wgpu::ScreenDescriptor;
use renderer::GpuContext;
use wgpu::{CommandEncoder, TextureView};
use winit::{event::WindowEvent, window::Window};

pub struct DebugPanel {
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl DebugPanel {
    pub fn new(window: &Window, gpu: &GpuContext) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx,
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_format(),
            egui_wgpu::RendererOptions {
                msaa_samples: 1,
                depth_stencil_format: None,
                dithering: false,
                predictable_texture_filtering: false,
            },
        );
        log::info!("Debug panel enabled");
        Self { state, renderer }
    }

    /// Feed a window event to egui. Returns true when egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Build the UI with `build` and record its draw into `frame`.
    pub fn draw(
        &mut self,
        window: &Window,
        gpu: &GpuContext,
        encoder: &mut CommandEncoder,
        frame: &TextureView,
        build: impl FnMut(&egui::Context),
    ) {
        let input = self.state.take_egui_input(window);
        let output = self.state.egui_ctx().run(input, build);
        self.state
            .handle_platform_output(window, output.platform_output);

        let (width, height) = gpu.size();
        let screen = ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: output.pixels_per_point,
        };
        let primitives = self
            .state
            .egui_ctx()
            .tessellate(output.shapes, output.pixels_per_point);

        for (id, delta) in &output.textures_delta.set {
            self.renderer
                .update_texture(&gpu.device, &gpu.queue, *id, delta);
        }
        self.renderer
            .update_buffers(&gpu.device, &gpu.queue, encoder, &primitives, &screen);

        {
            let rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: frame,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                ..Default::default()
            });
            // egui-wgpu wants a 'static pass; it is dropped before the encoder finishes.
            let mut rpass = rpass.forget_lifetime();
            self.renderer.render(&mut rpass, &primitives, &screen);
        }

        for id in &output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}

//! Flame demo: a noise-eroded, matcap-lit plane glowing through bloom.

use std::sync::Arc;

use anyhow::Result;
use asset::{TextureLoader, geometry};
use corelib::{
    Vec3,
    camera::Camera,
    clock::Clock,
    color::Color,
    controls::OrbitControls,
    transform::Transform,
    viewport::{Viewport, capped_pixel_ratio},
};
use platform::{Demo, SurfaceSize};
use renderer::{
    BloomSettings, Composer, GpuContext, GpuMesh, GpuTexture, MeshObject, TextureOptions,
    material::{FlameMaterial, FlameUniforms, object_bind_group_layout},
};
use wgpu::{CommandEncoder, TextureView};
use winit::event::WindowEvent;

use crate::{config::FlameConfig, input::drive_controls};

struct FlameScene {
    composer: Composer,
    material: FlameMaterial,
    plane: MeshObject,
}

pub struct FlameDemo {
    config: FlameConfig,
    loader: TextureLoader,
    clear: Color,
    viewport: Viewport,
    camera: Camera,
    controls: OrbitControls,
    clock: Clock,
    uniforms: FlameUniforms,
    bloom: BloomSettings,
    frame_ms: f32,
    /// Physical window height; cursor positions arrive in these pixels.
    window_height: u32,
    scene: Option<FlameScene>,
}

impl FlameDemo {
    pub fn new(config: FlameConfig, loader: TextureLoader) -> Result<Self> {
        let camera = Camera::looking_at_origin(Vec3::from(config.eye), config.fov, 0.1, 100.0);
        let controls = OrbitControls::new(&camera);
        let uniforms = FlameUniforms {
            pivot_position: config.pivot_position,
            flame_color: config.flame_color,
            opacity: config.opacity,
            alpha_falloff_start: config.alpha_falloff[0],
            alpha_falloff_end: config.alpha_falloff[1],
            flame_falloff_start: config.flame_falloff[0],
            flame_falloff_end: config.flame_falloff[1],
            ..FlameUniforms::default()
        };
        Ok(Self {
            clear: config.clear_color()?,
            bloom: config.bloom.into(),
            viewport: Viewport::new(1, 1, 1.0)?,
            camera,
            controls,
            clock: Clock::new(),
            uniforms,
            frame_ms: 0.0,
            window_height: 1,
            scene: None,
            config,
            loader,
        })
    }

    fn track_window(&mut self, size: SurfaceSize) {
        self.window_height = size.height.max(1);
    }

    /// Height used to turn drag distance into rotation.
    #[inline]
    fn drag_height(&self) -> f32 {
        self.window_height as f32
    }

    #[inline]
    pub fn uniforms(&self) -> &FlameUniforms {
        &self.uniforms
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }
}

impl Demo for FlameDemo {
    fn title(&self) -> &str {
        "Flame"
    }

    fn init(&mut self, gpu: &GpuContext, size: SurfaceSize) -> Result<()> {
        let [matcap, noise] = self
            .loader
            .load([self.config.matcap.as_str(), self.config.noise.as_str()])?;
        let matcap = GpuTexture::upload(&gpu.device, &gpu.queue, &matcap, TextureOptions::COLOR, "Matcap");
        let noise = GpuTexture::upload(
            &gpu.device,
            &gpu.queue,
            &noise,
            TextureOptions::DATA_REPEAT,
            "Noise",
        );

        let (width, height) = size.logical();
        self.viewport = Viewport::new(
            width.max(1),
            height.max(1),
            capped_pixel_ratio(size.scale_factor, self.config.pixel_ratio_cap),
        )?;
        let (pw, ph) = self.viewport.physical_size();
        let composer = Composer::new(
            &gpu.device,
            gpu.surface_format(),
            pw,
            ph,
            self.bloom,
            self.clear,
        );

        let object_bgl = object_bind_group_layout(&gpu.device);
        let material = FlameMaterial::new(
            &gpu.device,
            &object_bgl,
            Composer::target_desc(),
            &matcap,
            &noise,
            &self.uniforms,
        );
        let mesh = Arc::new(GpuMesh::new(&gpu.device, &geometry::plane(2.0, 2.0, 1, 1), "Plane"));
        let plane = MeshObject::new(&gpu.device, &object_bgl, mesh, Transform::default());

        log::info!("Flame scene ready ({}x{} @ {:.2})", width, height, self.viewport.pixel_ratio);
        self.scene = Some(FlameScene {
            composer,
            material,
            plane,
        });
        Ok(())
    }

    fn resize(&mut self, _gpu: &GpuContext, size: SurfaceSize) {
        self.track_window(size);
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        self.viewport.pixel_ratio = capped_pixel_ratio(size.scale_factor, self.config.pixel_ratio_cap);
        let (width, height) = size.logical();
        self.viewport
            .apply(width, height, &mut self.camera, &mut scene.composer);
    }

    fn input(&mut self, event: &WindowEvent) {
        let drag_height = self.drag_height();
        drive_controls(&mut self.controls, event, drag_height);
    }

    fn update(&mut self) {
        self.frame_ms = self.clock.delta().as_secs_f32() * 1000.0;
        self.uniforms.time = self.clock.elapsed_secs();
        self.controls.update(&mut self.camera);
    }

    fn render(&mut self, gpu: &GpuContext, encoder: &mut CommandEncoder, frame: &TextureView) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        scene.composer.set_bloom_settings(&gpu.queue, self.bloom);
        scene.material.write_uniforms(&gpu.queue, &self.uniforms);
        scene.plane.update(&gpu.queue, &self.camera);
        {
            let mut rpass = scene.composer.scene_pass(encoder);
            scene.material.draw(&mut rpass, &scene.plane);
        }
        scene.composer.finish(encoder, frame);
    }

    fn debug_ui(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("flame-debug").show(ctx, |ui| {
            ui.heading("Flame");
            ui.label(format!("frame: {:.2} ms", self.frame_ms));
            ui.separator();

            ui.label("Bloom");
            ui.add(egui::Slider::new(&mut self.bloom.strength, 0.0..=3.0).text("strength"));
            ui.add(egui::Slider::new(&mut self.bloom.radius, 0.0..=1.0).text("radius"));
            ui.add(egui::Slider::new(&mut self.bloom.threshold, 0.0..=1.0).text("threshold"));
            ui.separator();

            let u = &mut self.uniforms;
            ui.horizontal(|ui| {
                ui.label("flame color");
                ui.color_edit_button_rgb(&mut u.flame_color);
            });
            ui.add(egui::Slider::new(&mut u.opacity, 0.0..=1.0).text("opacity"));
            ui.add(egui::Slider::new(&mut u.alpha_falloff_start, 0.0..=1.0).text("alpha start"));
            ui.add(egui::Slider::new(&mut u.alpha_falloff_end, 0.0..=1.0).text("alpha end"));
            ui.add(egui::Slider::new(&mut u.flame_falloff_start, 0.0..=1.0).text("flame start"));
            ui.add(egui::Slider::new(&mut u.flame_falloff_end, 0.0..=1.0).text("flame end"));
        });
    }

    fn destroy(&mut self) {
        if self.scene.take().is_some() {
            log::info!("Flame scene released");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn demo() -> FlameDemo {
        FlameDemo::new(FlameConfig::default(), TextureLoader::from_dir("assets")).unwrap()
    }

    #[test]
    fn update_advances_time_monotonically() {
        let mut demo = demo();
        demo.update();
        let first = demo.uniforms().time;
        std::thread::sleep(Duration::from_millis(15));
        demo.update();
        let second = demo.uniforms().time;
        assert!(second > first);
        assert!(second >= 0.015);
    }

    #[test]
    fn config_flows_into_uniforms() {
        let mut config = FlameConfig::default();
        config.flame_color = [0.1, 0.2, 0.3];
        config.alpha_falloff = [0.1, 0.9];
        let demo = FlameDemo::new(config, TextureLoader::from_dir("assets")).unwrap();
        let u = demo.uniforms();
        assert_eq!(u.flame_color, [0.1, 0.2, 0.3]);
        assert_eq!((u.alpha_falloff_start, u.alpha_falloff_end), (0.1, 0.9));
        assert_eq!(u.pivot_position, [0.0, -1.7, 0.0]);
        assert_eq!(u.time, 0.0);
    }

    #[test]
    fn camera_starts_in_front_of_the_plane() {
        let demo = demo();
        assert_eq!(demo.camera().eye, Vec3::new(0.0, 0.0, 2.0));
        assert!((demo.camera().fov_y_rad - 75f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn drag_scale_follows_the_uncapped_window_height() {
        let mut demo = demo();
        demo.track_window(SurfaceSize {
            width: 2560,
            height: 1440,
            scale_factor: 2.0,
        });
        // the composer renders at 1.5x, but cursor pixels are the window's
        assert_eq!(demo.drag_height(), 1440.0);
    }

    #[test]
    fn invalid_clear_color_fails_construction() {
        let config = FlameConfig {
            clear_color: "#12".into(),
            ..FlameConfig::default()
        };
        assert!(FlameDemo::new(config, TextureLoader::from_dir("assets")).is_err());
    }
}

//! Planet demo: day/night shaded sphere inside a back-faced atmosphere shell.

use std::{f32::consts::PI, sync::Arc};

use anyhow::Result;
use asset::{TextureLoader, geometry};
use corelib::{
    Vec3,
    camera::Camera,
    color::Color,
    controls::OrbitControls,
    spherical::Spherical,
    transform::Transform,
    viewport::Viewport,
};
use platform::{Demo, SurfaceSize};
use renderer::{
    FrameTargets, GpuContext, GpuMesh, GpuTexture, MeshObject, TextureOptions,
    material::{
        AtmosphereMaterial, AtmosphereUniforms, PlanetMaterial, PlanetUniforms, TargetDesc,
        object_bind_group_layout,
    },
};
use wgpu::{CommandEncoder, TextureView};
use winit::event::WindowEvent;

use crate::{config::PlanetConfig, input::drive_controls};

const RADIUS: f32 = 2.0;
const SEGMENTS: u32 = 64;
const ATMOSPHERE_SCALE: f32 = 1.04;

struct PlanetScene {
    targets: FrameTargets,
    planet: PlanetMaterial,
    atmosphere: AtmosphereMaterial,
    globe: MeshObject,
    shell: MeshObject,
}

pub struct PlanetDemo {
    config: PlanetConfig,
    loader: TextureLoader,
    clear: Color,
    viewport: Viewport,
    camera: Camera,
    controls: OrbitControls,
    sun: Spherical,
    uniforms: PlanetUniforms,
    scene: Option<PlanetScene>,
}

impl PlanetDemo {
    pub fn new(config: PlanetConfig, loader: TextureLoader) -> Result<Self> {
        let camera = Camera::looking_at_origin(Vec3::from(config.eye), config.fov, 0.1, 100.0);
        let controls = OrbitControls::new(&camera).with_damping(config.damping_factor);
        let mut demo = Self {
            clear: config.clear_color()?,
            viewport: Viewport::new(1, 1, 1.0)?,
            camera,
            controls,
            sun: Spherical::new(1.0, config.sun_phi, config.sun_theta),
            uniforms: PlanetUniforms {
                night_color: config.night_color,
                atmosphere_day_color: config.atmosphere_day_color()?.to_array(),
                atmosphere_twilight_color: config.atmosphere_twilight_color()?.to_array(),
                ..PlanetUniforms::default()
            },
            scene: None,
            config,
            loader,
        };
        demo.update_sun();
        Ok(demo)
    }

    /// Recompute the sun direction shared by the surface and the atmosphere.
    fn update_sun(&mut self) {
        self.uniforms.sun_direction = self.sun.to_vec3().to_array();
    }

    #[inline]
    pub fn uniforms(&self) -> &PlanetUniforms {
        &self.uniforms
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    fn sample_count(&self) -> u32 {
        self.config.msaa_samples.max(1)
    }
}

impl Demo for PlanetDemo {
    fn title(&self) -> &str {
        "Planet"
    }

    fn init(&mut self, gpu: &GpuContext, size: SurfaceSize) -> Result<()> {
        let day = self.loader.load(self.config.day_texture.as_str())?;
        let day = GpuTexture::upload(
            &gpu.device,
            &gpu.queue,
            &day,
            TextureOptions::COLOR.with_anisotropy(self.config.anisotropy),
            "Planet Day",
        );

        self.viewport = Viewport::new(size.width.max(1), size.height.max(1), 1.0)?;
        let target = TargetDesc {
            format: gpu.surface_format(),
            sample_count: self.sample_count(),
        };
        let targets = FrameTargets::new(
            &gpu.device,
            target.format,
            target.sample_count,
            size.width,
            size.height,
        );

        let object_bgl = object_bind_group_layout(&gpu.device);
        let planet = PlanetMaterial::new(&gpu.device, &object_bgl, target, &day, &self.uniforms);
        let atmosphere = AtmosphereMaterial::new(
            &gpu.device,
            &object_bgl,
            target,
            &AtmosphereUniforms::from(&self.uniforms),
        );

        let mesh = Arc::new(GpuMesh::new(
            &gpu.device,
            &geometry::sphere(RADIUS, SEGMENTS, SEGMENTS),
            "Sphere",
        ));
        let globe = MeshObject::new(&gpu.device, &object_bgl, mesh.clone(), Transform::default());
        let shell = MeshObject::new(
            &gpu.device,
            &object_bgl,
            mesh,
            Transform::from_uniform_scale(ATMOSPHERE_SCALE),
        );

        log::info!(
            "Planet scene ready ({}x{}, {}x MSAA)",
            size.width,
            size.height,
            target.sample_count
        );
        self.scene = Some(PlanetScene {
            targets,
            planet,
            atmosphere,
            globe,
            shell,
        });
        Ok(())
    }

    fn resize(&mut self, _gpu: &GpuContext, size: SurfaceSize) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        self.viewport
            .apply(size.width, size.height, &mut self.camera, &mut scene.targets);
    }

    fn input(&mut self, event: &WindowEvent) {
        drive_controls(&mut self.controls, event, self.viewport.height as f32);
    }

    fn update(&mut self) {
        self.controls.update(&mut self.camera);
    }

    fn render(&mut self, gpu: &GpuContext, encoder: &mut CommandEncoder, frame: &TextureView) {
        let Some(scene) = self.scene.as_ref() else {
            return;
        };
        scene.planet.write_uniforms(&gpu.queue, &self.uniforms);
        scene
            .atmosphere
            .write_uniforms(&gpu.queue, &AtmosphereUniforms::from(&self.uniforms));
        scene.globe.update(&gpu.queue, &self.camera);
        scene.shell.update(&gpu.queue, &self.camera);

        let (view, resolve_target) = scene.targets.color_attachment(frame);
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("planet-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: self.clear.r as f64,
                        g: self.clear.g as f64,
                        b: self.clear.b as f64,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: scene.targets.depth_view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });
        scene.planet.draw(&mut rpass, &scene.globe);
        scene.atmosphere.draw(&mut rpass, &scene.shell);
    }

    fn debug_ui(&mut self, ctx: &egui::Context) {
        let mut sun_changed = false;
        egui::SidePanel::right("planet-debug").show(ctx, |ui| {
            ui.heading("Planet");
            ui.label("Sun");
            sun_changed |= ui
                .add(egui::Slider::new(&mut self.sun.phi, 0.0..=PI).text("phi"))
                .changed();
            sun_changed |= ui
                .add(egui::Slider::new(&mut self.sun.theta, -PI..=PI).text("theta"))
                .changed();
            ui.separator();

            ui.label("Atmosphere");
            ui.horizontal(|ui| {
                ui.label("day");
                ui.color_edit_button_rgb(&mut self.uniforms.atmosphere_day_color);
            });
            ui.horizontal(|ui| {
                ui.label("twilight");
                ui.color_edit_button_rgb(&mut self.uniforms.atmosphere_twilight_color);
            });
        });
        if sun_changed {
            self.update_sun();
        }
    }

    fn destroy(&mut self) {
        if self.scene.take().is_some() {
            log::info!("Planet scene released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> PlanetDemo {
        PlanetDemo::new(PlanetConfig::default(), TextureLoader::from_dir("assets")).unwrap()
    }

    #[test]
    fn default_sun_points_along_z() {
        let d = demo().uniforms().sun_direction;
        assert!((Vec3::from(d) - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn atmosphere_colors_come_from_hex() {
        let u = *demo().uniforms();
        assert_eq!(u.atmosphere_day_color, Color::from_hex(0x3a0ca3).to_array());
        assert_eq!(u.atmosphere_twilight_color, Color::from_hex(0x7209b7).to_array());
        assert_eq!(u.night_color, [0.0, 0.0, 0.0, 0.9]);
    }

    #[test]
    fn moving_the_sun_updates_both_materials() {
        let mut demo = demo();
        demo.sun.theta = PI / 2.0;
        demo.update_sun();
        let atmosphere = AtmosphereUniforms::from(demo.uniforms());
        assert!((Vec3::from(atmosphere.sun_direction) - Vec3::X).length() < 1e-6);
        assert_eq!(atmosphere.sun_direction, demo.uniforms().sun_direction);
    }

    #[test]
    fn damping_eases_the_camera_towards_a_drag() {
        let mut demo = demo();
        let start = demo.camera().eye;
        demo.controls.rotate_left(0.5);
        demo.update();
        let first = (demo.camera().eye - start).length();
        demo.update();
        let second = (demo.camera().eye - start).length();
        assert!(first > 0.0);
        assert!(second > first);
        assert!((demo.camera().eye.length() - start.length()).abs() < 1e-3);
    }

    #[test]
    fn msaa_is_on_by_default() {
        assert_eq!(demo().sample_count(), 4);
    }
}

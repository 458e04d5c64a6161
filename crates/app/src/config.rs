//! Tunable demo parameters with optional TOML overrides.
//!
//! Every table uses `#[serde(default)]`, so a file that only sets
//! `[flame.bloom] strength = 2.0` keeps everything else at its default.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use corelib::color::Color;
use renderer::BloomSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub flame: FlameConfig,
    pub planet: PlanetConfig,
}

impl DemoConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the color strings up front so a typo fails at startup.
    pub fn validate(&self) -> Result<()> {
        self.flame.clear_color()?;
        self.planet.clear_color()?;
        self.planet.atmosphere_day_color()?;
        self.planet.atmosphere_twilight_color()?;
        ensure!(
            matches!(self.planet.msaa_samples, 1 | 4),
            "planet.msaa_samples must be 1 or 4, got {}",
            self.planet.msaa_samples
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlameConfig {
    pub fov: f32,
    pub eye: [f32; 3],
    pub pixel_ratio_cap: f32,
    pub clear_color: String,
    pub matcap: String,
    pub noise: String,
    pub pivot_position: [f32; 3],
    pub flame_color: [f32; 3],
    pub opacity: f32,
    pub alpha_falloff: [f32; 2],
    pub flame_falloff: [f32; 2],
    pub bloom: BloomConfig,
}

impl Default for FlameConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            eye: [0.0, 0.0, 2.0],
            pixel_ratio_cap: 1.5,
            clear_color: "#121212".into(),
            matcap: "matcap-01.png".into(),
            noise: "noise.png".into(),
            pivot_position: [0.0, -1.7, 0.0],
            flame_color: [0.7, 0.0, 0.0],
            opacity: 1.0,
            alpha_falloff: [0.25, 0.4],
            flame_falloff: [0.45, 0.48],
            bloom: BloomConfig::default(),
        }
    }
}

impl FlameConfig {
    pub fn clear_color(&self) -> Result<Color> {
        Color::parse(&self.clear_color).context("flame.clear_color")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomConfig {
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        let BloomSettings {
            strength,
            radius,
            threshold,
        } = BloomSettings::default();
        Self {
            strength,
            radius,
            threshold,
        }
    }
}

impl From<BloomConfig> for BloomSettings {
    fn from(c: BloomConfig) -> Self {
        Self {
            strength: c.strength,
            radius: c.radius,
            threshold: c.threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetConfig {
    pub fov: f32,
    pub eye: [f32; 3],
    pub clear_color: String,
    pub msaa_samples: u32,
    pub day_texture: String,
    pub anisotropy: u16,
    pub damping_factor: f32,
    pub night_color: [f32; 4],
    pub atmosphere_day_color: String,
    pub atmosphere_twilight_color: String,
    /// Polar angle of the sun, measured from +Y.
    pub sun_phi: f32,
    pub sun_theta: f32,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            fov: 25.0,
            eye: [12.0, -2.0, -4.0],
            clear_color: "#000011".into(),
            msaa_samples: 4,
            day_texture: "neptune/neptune.png".into(),
            anisotropy: 8,
            damping_factor: 0.05,
            night_color: [0.0, 0.0, 0.0, 0.9],
            atmosphere_day_color: "#3a0ca3".into(),
            atmosphere_twilight_color: "#7209b7".into(),
            sun_phi: std::f32::consts::FRAC_PI_2,
            sun_theta: 0.0,
        }
    }
}

impl PlanetConfig {
    pub fn clear_color(&self) -> Result<Color> {
        Color::parse(&self.clear_color).context("planet.clear_color")
    }

    pub fn atmosphere_day_color(&self) -> Result<Color> {
        Color::parse(&self.atmosphere_day_color).context("planet.atmosphere_day_color")
    }

    pub fn atmosphere_twilight_color(&self) -> Result<Color> {
        Color::parse(&self.atmosphere_twilight_color).context("planet.atmosphere_twilight_color")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let parsed: DemoConfig = toml::from_str("").unwrap();
        assert_eq!(parsed, DemoConfig::default());
    }

    #[test]
    fn partial_table_overrides_only_named_fields() {
        let parsed: DemoConfig = toml::from_str(
            r#"
            [flame.bloom]
            strength = 2.0

            [planet]
            sun_theta = 1.5
            "#,
        )
        .unwrap();
        assert_eq!(parsed.flame.bloom.strength, 2.0);
        assert_eq!(parsed.flame.bloom.radius, 0.4);
        assert_eq!(parsed.flame.fov, 75.0);
        assert_eq!(parsed.planet.sun_theta, 1.5);
        assert_eq!(parsed.planet.day_texture, "neptune/neptune.png");
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = DemoConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: DemoConfig = toml::from_str(&text).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn bad_color_is_rejected() {
        let mut config = DemoConfig::default();
        config.planet.atmosphere_day_color = "purple".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("atmosphere_day_color"));
    }

    #[test]
    fn unsupported_sample_count_is_rejected() {
        let mut config = DemoConfig::default();
        config.planet.msaa_samples = 3;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("msaa_samples"));
        config.planet.msaa_samples = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = std::env::temp_dir().join(format!("shader-demos-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("demo.toml");
        std::fs::write(&path, "[flame]\nopacity = 0.5\n").unwrap();
        let config = DemoConfig::load(&path).unwrap();
        assert_eq!(config.flame.opacity, 0.5);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_reports_path() {
        let err = DemoConfig::load(Path::new("/nonexistent/demo.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/demo.toml"));
    }
}

//! GPU textures uploaded from decoded [`TextureData`].

use asset::TextureData;
use wgpu::{
    AddressMode, Device, Extent3d, FilterMode, Queue, Sampler, SamplerDescriptor, Texture,
    TextureDescriptor, TextureDimension, TextureFormat, TextureUsages, TextureView,
    TextureViewDescriptor,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wrap {
    Clamp,
    Repeat,
}

impl From<Wrap> for AddressMode {
    fn from(w: Wrap) -> Self {
        match w {
            Wrap::Clamp => AddressMode::ClampToEdge,
            Wrap::Repeat => AddressMode::Repeat,
        }
    }
}

/// Sampling and color-space options for an uploaded texture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureOptions {
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
    /// Pixels hold sRGB-encoded color (decoded to linear on sampling).
    pub srgb: bool,
    pub anisotropy: u16,
}

impl TextureOptions {
    /// Color image, clamped at the edges.
    pub const COLOR: Self = Self {
        wrap_s: Wrap::Clamp,
        wrap_t: Wrap::Clamp,
        srgb: true,
        anisotropy: 1,
    };

    /// Data texture (noise, masks): linear values, tiled in both directions.
    pub const DATA_REPEAT: Self = Self {
        wrap_s: Wrap::Repeat,
        wrap_t: Wrap::Repeat,
        srgb: false,
        anisotropy: 1,
    };

    pub fn with_anisotropy(mut self, anisotropy: u16) -> Self {
        self.anisotropy = anisotropy.max(1);
        self
    }

    fn format(&self) -> TextureFormat {
        if self.srgb {
            TextureFormat::Rgba8UnormSrgb
        } else {
            TextureFormat::Rgba8Unorm
        }
    }
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self::COLOR
    }
}

pub struct GpuTexture {
    #[allow(dead_code)]
    texture: Texture,
    pub view: TextureView,
    pub sampler: Sampler,
    pub width: u32,
    pub height: u32,
}

impl GpuTexture {
    pub fn upload(
        device: &Device,
        queue: &Queue,
        data: &TextureData,
        options: TextureOptions,
        label: &str,
    ) -> Self {
        let size = Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: options.format(),
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(data.bytes_per_pixel() * data.width),
                rows_per_image: Some(data.height),
            },
            size,
        );
        let view = texture.create_view(&TextureViewDescriptor::default());
        let sampler = device.create_sampler(&SamplerDescriptor {
            label: Some(label),
            address_mode_u: options.wrap_s.into(),
            address_mode_v: options.wrap_t.into(),
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: FilterMode::Linear,
            anisotropy_clamp: options.anisotropy,
            ..Default::default()
        });
        log::debug!(
            "Uploaded texture '{}' {}x{} {:?}",
            label,
            data.width,
            data.height,
            options
        );
        Self {
            texture,
            view,
            sampler,
            width: data.width,
            height: data.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_options_repeat_linear() {
        let o = TextureOptions::DATA_REPEAT;
        assert_eq!(AddressMode::from(o.wrap_s), AddressMode::Repeat);
        assert_eq!(o.format(), TextureFormat::Rgba8Unorm);
    }

    #[test]
    fn anisotropy_never_drops_below_one() {
        assert_eq!(TextureOptions::COLOR.with_anisotropy(0).anisotropy, 1);
        assert_eq!(TextureOptions::COLOR.with_anisotropy(8).anisotropy, 8);
    }
}

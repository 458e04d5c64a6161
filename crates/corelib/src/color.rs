//! Linear RGB colors built from sRGB hex codes.

use crate::{CoreError, CoreResult, Vec3};

/// Linear-space RGB color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::linear(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::linear(0.0, 0.0, 0.0);

    /// Components already in linear space.
    pub const fn linear(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// `0xRRGGBB` in sRGB, converted to linear.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
        }
    }

    /// Parse `#rrggbb` (leading `#` optional).
    pub fn parse(s: &str) -> CoreResult<Self> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidColor(s.to_owned()));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_hex)
            .map_err(|_| CoreError::InvalidColor(s.to_owned()))
    }

    /// Back to `0xRRGGBB` sRGB.
    pub fn to_hex(&self) -> u32 {
        let channel = |c: f32| (linear_to_srgb(c).clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }
}

impl From<[f32; 3]> for Color {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Self::linear(r, g, b)
    }
}

#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
pub fn linear_to_srgb(c: f32) -> f32 {
    if c < 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(0.41666) - 0.055
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Color, b: Color) -> bool {
        (a.to_vec3() - b.to_vec3()).abs().max_element() < 1e-6
    }

    #[test]
    fn white_and_black_hex() {
        assert!(close(Color::from_hex(0xffffff), Color::WHITE));
        assert!(close(Color::from_hex(0x000000), Color::BLACK));
    }

    #[test]
    fn parse_round_trips_through_hex() {
        let c = Color::parse("#3a0ca3").unwrap();
        assert_eq!(c.to_hex(), 0x3a0ca3);
        assert!(c.b > c.r && c.r > c.g);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(
            Color::parse("#12345"),
            Err(CoreError::InvalidColor("#12345".into()))
        );
        assert!(Color::parse("zzzzzz").is_err());
        assert!(Color::parse("+12345").is_err());
        assert!(Color::parse("#+abcde").is_err());
    }
}

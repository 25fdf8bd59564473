use std::fmt;
use serde::{Deserialize, Serialize};
use crate::error::EngineError;
use super::Vec3;

/// RGB colour with components in [0, 1], written as `#RRGGBB` in config files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Result<Self, EngineError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(EngineError::InvalidColor(hex.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| EngineError::InvalidColor(hex.to_string()))
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    pub fn to_hex(&self) -> String {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02X}{:02X}{:02X}", q(self.r), q(self.g), q(self.b))
    }

    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    pub fn mix(&self, other: &Color, t: f32) -> Color {
        let v = self.to_vec3().lerp(&other.to_vec3(), t);
        Color::rgb(v.x, v.y, v.z)
    }
}

impl TryFrom<String> for Color {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Palette of the signature look
pub mod theme {
    use super::Color;

    pub const EMERALD: Color = Color::rgb(0.0, 66.0 / 255.0, 37.0 / 255.0);
    pub const DEEP_EMERALD: Color = Color::rgb(1.0 / 255.0, 32.0 / 255.0, 15.0 / 255.0);
    pub const GOLD: Color = Color::rgb(212.0 / 255.0, 175.0 / 255.0, 55.0 / 255.0);
    pub const BRIGHT_GOLD: Color = Color::rgb(1.0, 215.0 / 255.0, 0.0);
    pub const WARM_WHITE: Color = Color::rgb(1.0, 253.0 / 255.0, 208.0 / 255.0);
    pub const ACCENT_RED: Color = Color::rgb(139.0 / 255.0, 0.0, 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        let c = Color::from_hex("#FFD700").unwrap();
        assert_eq!(c, theme::BRIGHT_GOLD);
        assert_eq!(Color::from_hex("004225").unwrap(), theme::EMERALD);
    }

    #[test]
    fn test_rejects_bad_hex() {
        assert!(Color::from_hex("#FFF").is_err());
        assert!(Color::from_hex("#GG0000").is_err());
        assert!(Color::from_hex("#ÿÿÿ").is_err());
    }

    #[test]
    fn test_hex_roundtrip_through_serde() {
        let yaml = serde_yaml::to_string(&theme::ACCENT_RED).unwrap();
        assert!(yaml.contains("#8B0000"));
        let back: Color = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, theme::ACCENT_RED);
    }

    #[test]
    fn test_mix() {
        let m = Color::rgb(0.0, 0.0, 0.0).mix(&Color::rgb(1.0, 0.5, 0.0), 0.5);
        assert!((m.r - 0.5).abs() < 1e-6);
        assert!((m.g - 0.25).abs() < 1e-6);
    }
}

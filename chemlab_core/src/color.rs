//! Solution colors.
//!
//! Colors are kept as 8-bit RGB triples. Arithmetic (weighted blending,
//! interpolation) happens in `f64` space via `nalgebra::Vector3` and is
//! rounded back per channel.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Failure to parse a `#RRGGBB` string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color '{0}': expected #RRGGBB")]
pub struct ColorParseError(pub String);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ColorParseError(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ColorParseError(hex.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Returns the color as a float vector (0..=255 per channel).
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.r as f64, self.g as f64, self.b as f64)
    }

    /// Rounds a float vector back to a color, clamping each channel.
    pub fn from_vector(v: Vector3<f64>) -> Self {
        let channel = |x: f64| x.round().clamp(0.0, 255.0) as u8;
        Self::new(channel(v.x), channel(v.y), channel(v.z))
    }

    /// Linear interpolation from `self` to `other`; `t` is clamped to [0, 1].
    pub fn lerp(self, other: Rgb, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let a = self.to_vector();
        Self::from_vector(a + (other.to_vector() - a) * t)
    }

    /// Amount-weighted average of `(color, weight)` pairs.
    ///
    /// Returns `None` for an empty input. When every weight is zero the
    /// colors are averaged with equal weight.
    pub fn weighted_average<I>(samples: I) -> Option<Self>
    where
        I: IntoIterator<Item = (Rgb, f64)>,
    {
        let samples: Vec<(Rgb, f64)> = samples.into_iter().collect();
        if samples.is_empty() {
            return None;
        }

        let total: f64 = samples.iter().map(|(_, w)| w.max(0.0)).sum();
        let sum = if total > 0.0 {
            samples
                .iter()
                .fold(Vector3::zeros(), |acc, (c, w)| acc + c.to_vector() * w.max(0.0))
                / total
        } else {
            samples
                .iter()
                .fold(Vector3::zeros(), |acc, (c, _)| acc + c.to_vector())
                / samples.len() as f64
        };

        Some(Self::from_vector(sum))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Rendered color of a container's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "rgb", rename_all = "snake_case")]
pub enum MixedColor {
    /// Empty container.
    Transparent,
    /// A single chemical's color or a lookup-table reaction color.
    Solid(Rgb),
    /// Weighted average of the chemicals present.
    Blended(Rgb),
}

impl MixedColor {
    /// Returns the underlying color, if any.
    pub fn rgb(&self) -> Option<Rgb> {
        match self {
            MixedColor::Transparent => None,
            MixedColor::Solid(c) | MixedColor::Blended(c) => Some(*c),
        }
    }
}

impl fmt::Display for MixedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MixedColor::Transparent => write!(f, "transparent"),
            MixedColor::Solid(c) => write!(f, "{}", c),
            MixedColor::Blended(c) => write!(f, "rgb({},{},{})", c.r, c.g, c.b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_hex() {
        let pink: Rgb = "#FFB6C1".parse().unwrap();
        assert_eq!(pink, Rgb::new(0xFF, 0xB6, 0xC1));
        assert_eq!(pink.to_string(), "#FFB6C1");
        assert_eq!(Rgb::from_hex("98fb98").unwrap(), Rgb::new(0x98, 0xFB, 0x98));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Rgb::from_hex("#FFF").is_err());
        assert!(Rgb::from_hex("#GGGGGG").is_err());
        assert!(Rgb::from_hex("#FFB6C1AA").is_err());
    }

    #[test]
    fn test_weighted_average_black_white() {
        let mixed = Rgb::weighted_average([
            (Rgb::new(0, 0, 0), 10.0),
            (Rgb::new(255, 255, 255), 10.0),
        ])
        .unwrap();
        assert_eq!(mixed, Rgb::new(128, 128, 128));
        assert_eq!(MixedColor::Blended(mixed).to_string(), "rgb(128,128,128)");
    }

    #[test]
    fn test_weighted_average_respects_weights() {
        let mixed = Rgb::weighted_average([
            (Rgb::new(0, 0, 0), 30.0),
            (Rgb::new(200, 100, 40), 10.0),
        ])
        .unwrap();
        assert_eq!(mixed, Rgb::new(50, 25, 10));
    }

    #[test]
    fn test_weighted_average_zero_weights() {
        let mixed = Rgb::weighted_average([
            (Rgb::new(10, 20, 30), 0.0),
            (Rgb::new(30, 40, 50), 0.0),
        ])
        .unwrap();
        assert_eq!(mixed, Rgb::new(20, 30, 40));
        assert!(Rgb::weighted_average(std::iter::empty()).is_none());
    }

    #[test]
    fn test_lerp_endpoints_and_clamp() {
        let a = Rgb::new(0, 0, 0);
        let b = Rgb::new(200, 100, 50);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgb::new(100, 50, 25));
        assert_eq!(a.lerp(b, 7.0), b);
    }

    #[test]
    fn test_mixed_color_display() {
        assert_eq!(MixedColor::Transparent.to_string(), "transparent");
        assert_eq!(MixedColor::Solid(Rgb::new(255, 182, 193)).to_string(), "#FFB6C1");
        assert_eq!(MixedColor::Transparent.rgb(), None);
    }
}

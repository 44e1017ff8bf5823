//! CSS-style color strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Color;
use crate::error::GraphError;

impl Color {
    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = [self.r, self.g, self.b, self.a].map(to_byte);
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl FromStr for Color {
    type Err = GraphError;

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` or `rgba(r, g, b, a)`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let text = input.trim();
        let invalid = || GraphError::InvalidColor(input.to_string());

        if let Some(hex) = text.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }

        let lower = text.to_ascii_lowercase();
        let (body, has_alpha) = if let Some(body) = lower.strip_prefix("rgba(") {
            (body, true)
        } else if let Some(body) = lower.strip_prefix("rgb(") {
            (body, false)
        } else {
            return Err(invalid());
        };
        let body = body.strip_suffix(')').ok_or_else(invalid)?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != if has_alpha { 4 } else { 3 } {
            return Err(invalid());
        }

        let mut channels = [0.0_f32; 3];
        for (channel, part) in channels.iter_mut().zip(&parts) {
            let value: f32 = part.parse().map_err(|_| invalid())?;
            if !(0.0..=255.0).contains(&value) {
                return Err(invalid());
            }
            *channel = value / 255.0;
        }
        let alpha = match parts.get(3) {
            Some(part) => {
                let value: f32 = part.parse().map_err(|_| invalid())?;
                if !(0.0..=1.0).contains(&value) {
                    return Err(invalid());
                }
                value
            }
            None => 1.0,
        };
        Ok(Color::new(channels[0], channels[1], channels[2], alpha))
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |index: usize| u8::from_str_radix(hex.get(index..index + 2)?, 16).ok();
    match hex.len() {
        3 => {
            let mut channels = [0_u8; 3];
            for (channel, digit) in channels.iter_mut().zip(hex.chars()) {
                let value = digit.to_digit(16)? as u8;
                *channel = value * 17;
            }
            Some(Color::rgb8(channels[0], channels[1], channels[2]))
        }
        6 => Some(Color::rgb8(byte(0)?, byte(2)?, byte(4)?)),
        8 => {
            let mut color = Color::rgb8(byte(0)?, byte(2)?, byte(4)?);
            color.a = byte(6)? as f32 / 255.0;
            Some(color)
        }
        _ => None,
    }
}

fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        let short: Color = "#fff".parse().unwrap();
        assert_eq!(short, Color::WHITE);
        let long: Color = "#2979ff".parse().unwrap();
        assert_eq!(long, Color::rgb8(0x29, 0x79, 0xff));
        let alpha: Color = "#00000080".parse().unwrap();
        assert!((alpha.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn parses_rgb_functions() {
        let gray: Color = "rgb(120, 120, 120)".parse().unwrap();
        assert_eq!(gray, Color::rgb8(120, 120, 120));
        let translucent: Color = "rgba(0,0,0,0.5)".parse().unwrap();
        assert_eq!(translucent.a, 0.5);
    }

    #[test]
    fn rejects_garbage() {
        for input in ["", "#12", "#ggg", "rgb(1,2)", "rgb(300,0,0)", "hsl(0,0,0)", "rgba(0,0,0,2)"] {
            assert!(input.parse::<Color>().is_err(), "{input} should not parse");
        }
    }

    #[test]
    fn hex_output_is_stable() {
        assert_eq!(Color::rgb8(0xdd, 0x2c, 0x00).to_hex(), "#dd2c00");
        assert_eq!(Color::new(0.0, 0.0, 0.0, 0.0).to_hex(), "#00000000");
    }
}

use serde::{Deserialize, Serialize};

/// RGBA color.
///
/// In configuration files a color is written either as an `[r, g, b, a]` array with the alpha
/// channel in `0..=1` range, as an opaque `[r, g, b]` array or as a `#RRGGBB` / `#RRGGBBAA` hex
/// string. It is always serialized as a HEX8 string.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "String")]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(String),
    Channels(Vec<f64>),
}

impl TryFrom<ColorRepr> for Color {
    type Error = String;

    fn try_from(value: ColorRepr) -> Result<Self, Self::Error> {
        match value {
            ColorRepr::Hex(hex) => {
                Self::try_from_hex(&hex).ok_or_else(|| format!("invalid hex color '{hex}'"))
            }
            ColorRepr::Channels(channels) => {
                let channel = |v: f64| -> Result<u8, String> {
                    if (0.0..=255.0).contains(&v) {
                        Ok(v.round() as u8)
                    } else {
                        Err(format!("color channel {v} is out of 0..=255 range"))
                    }
                };
                match channels.as_slice() {
                    [r, g, b] => Ok(Self::rgba(channel(*r)?, channel(*g)?, channel(*b)?, 255)),
                    [r, g, b, a] if (0.0..=1.0).contains(a) => Ok(Self::rgba_alpha(
                        channel(*r)?,
                        channel(*g)?,
                        channel(*b)?,
                        *a,
                    )),
                    [_, _, _, a] => Err(format!("alpha {a} is out of 0..=1 range")),
                    _ => Err(format!(
                        "color must have 3 or 4 channels, got {}",
                        channels.len()
                    )),
                }
            }
        }
    }
}

impl From<Color> for String {
    fn from(val: Color) -> Self {
        val.to_hex()
    }
}

impl Color {
    /// Transparent color: `#00000000`
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    /// Red color: `#FF0000FF`
    pub const RED: Color = Color::rgba(255, 0, 0, 255);
    /// White color: `#FFFFFFFF`
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    /// Black color: `#000000FF`
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);

    /// Constructs color from its RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Constructs color from RGB channels and opacity in `0..=1` range. Opacity outside the range
    /// is clamped.
    pub fn rgba_alpha(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { r, g, b, a }
    }

    /// Converts the color into u8 array (RGBA).
    pub fn to_u8_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Converts the color into HEX8 string: `#RRGGBBAA`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }

    /// Parses a color from the hex string. Hex string can be either HEX6 (`#RRGGBB`) or HEX8 (`#RRGGBBAA`).
    pub fn try_from_hex(hex_string: &str) -> Option<Self> {
        if hex_string.len() != 7 && hex_string.len() != 9 || !hex_string.starts_with('#') {
            return None;
        }

        let r = u8::from_str_radix(hex_string.get(1..3)?, 16).ok()?;
        let g = u8::from_str_radix(hex_string.get(3..5)?, 16).ok()?;
        let b = u8::from_str_radix(hex_string.get(5..7)?, 16).ok()?;
        let a = if hex_string.len() == 9 {
            u8::from_str_radix(hex_string.get(7..9)?, 16).ok()?
        } else {
            255
        };

        Some(Self { r, g, b, a })
    }

    /// Returns a new color instance, copied from the base one but with the given alpha channel.
    pub fn with_alpha(&self, a: u8) -> Self {
        Self { a, ..*self }
    }

    /// Returns true if the color is fully transparent (`a == 0`).
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Red component of the color in RGBA space.
    pub fn r(&self) -> u8 {
        self.r
    }

    /// Green component of the color in RGBA space.
    pub fn g(&self) -> u8 {
        self.g
    }

    /// Blue component of the color in RGBA space.
    pub fn b(&self) -> u8 {
        self.b
    }

    /// Opacity component of the color.
    pub fn a(&self) -> u8 {
        self.a
    }

    /// Opacity in `0..=1` range.
    pub fn alpha(&self) -> f64 {
        self.a as f64 / 255.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_serialization() {
        let hex = "#FF1000AA";
        let color = Color::try_from_hex(hex).unwrap();
        assert_eq!(&color.to_hex(), hex);

        let json = serde_json::to_string(&color).unwrap();
        assert_eq!(json, format!("\"{hex}\""));
        assert_eq!(serde_json::from_str::<Color>(&json).unwrap(), color);
    }

    #[test]
    fn color_from_channel_arrays() {
        let color: Color = serde_json::from_str("[255, 0, 0, 0.6]").unwrap();
        assert_eq!(color, Color::rgba(255, 0, 0, 153));

        let opaque: Color = serde_json::from_str("[0, 112, 255]").unwrap();
        assert_eq!(opaque, Color::rgba(0, 112, 255, 255));

        let transparent: Color = serde_json::from_str("[115, 178, 115, 0]").unwrap();
        assert!(transparent.is_transparent());
    }

    #[test]
    fn invalid_colors_are_rejected() {
        assert!(serde_json::from_str::<Color>("[255, 0]").is_err());
        assert!(serde_json::from_str::<Color>("[256, 0, 0]").is_err());
        assert!(serde_json::from_str::<Color>("[255, 0, 0, 2.0]").is_err());
        assert!(serde_json::from_str::<Color>("\"red\"").is_err());
    }
}

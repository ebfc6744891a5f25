use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
///
/// Serializes as a `#rrggbbaa` hex string and parses `#rgb`, `#rrggbb` and
/// `#rrggbbaa`, so chart configuration files can use the familiar notation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Parses a `#rgb`, `#rrggbb` or `#rrggbbaa` hex color.
    pub fn from_hex(input: &str) -> ChartResult<Self> {
        let digits = input.trim().strip_prefix('#').ok_or_else(|| {
            ChartError::InvalidData(format!("color `{input}` must start with `#`"))
        })?;
        if !digits.is_ascii() {
            return Err(ChartError::InvalidData(format!(
                "color `{input}` must be ascii hex"
            )));
        }

        let channel = |text: &str| -> ChartResult<f64> {
            u8::from_str_radix(text, 16)
                .map(|value| f64::from(value) / 255.0)
                .map_err(|_| ChartError::InvalidData(format!("color `{input}` is not valid hex")))
        };

        match digits.len() {
            3 => {
                let expand = |index: usize| channel(&digits[index..=index].repeat(2));
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            8 => Ok(Self::rgba(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                channel(&digits[6..8])?,
            )),
            _ => Err(ChartError::InvalidData(format!(
                "color `{input}` must have 3, 6 or 8 hex digits"
            ))),
        }
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        let byte = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            byte(self.red),
            byte(self.green),
            byte(self.blue),
            byte(self.alpha)
        )
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

impl TryFrom<String> for Color {
    type Error = ChartError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Horizontal text alignment relative to the anchor x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextHAlign {
    Left,
    Center,
    Right,
}

/// Font used for label text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub size_px: f64,
    pub family: String,
}

impl FontSpec {
    #[must_use]
    pub fn new(size_px: f64, family: impl Into<String>) -> Self {
        Self {
            size_px,
            family: family.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!(Color::from_hex("#fff").expect("short"), Color::WHITE);
        assert_eq!(Color::from_hex("#000000").expect("long"), Color::BLACK);

        let translucent = Color::from_hex("#ff000080").expect("with alpha");
        assert_eq!(translucent.red, 1.0);
        assert!((translucent.alpha - 128.0 / 255.0).abs() <= 1e-12);
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(Color::from_hex("777777").is_err());
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#zzzzzz").is_err());
        assert!(Color::from_hex("#éé").is_err());
    }

    #[test]
    fn hex_round_trips_through_string() {
        let color = Color::from_hex("#777777").expect("grey");
        assert_eq!(color.to_hex(), "#777777ff");
    }
}

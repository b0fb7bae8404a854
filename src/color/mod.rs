mod hex;
mod hue;

pub use hex::{EncodedColor, encode_hex, parse_hex, preset, PRESETS};
pub use hue::{HUE_DEGREES, hue_to_rgb};
use smart_leds::RGB8;

use crate::Error;

pub type Color = RGB8;

/// Create a color from a u32 value (0xRRGGBB format)
pub const fn rgb_from_u32(color: u32) -> Color {
    Color {
        r: ((color >> 16) & 0xFF) as u8,
        g: ((color >> 8) & 0xFF) as u8,
        b: (color & 0xFF) as u8,
    }
}

/// Create a color from wide integer components.
///
/// Out of range components are rejected, never clamped.
pub fn try_from_components(r: i32, g: i32, b: i32) -> Result<Color, Error> {
    let channel = |name: &str, value: i32| {
        u8::try_from(value).map_err(|_| {
            Error::InvalidColor(format!("{name} component {value} is outside 0..=255"))
        })
    };

    Ok(Color {
        r: channel("red", r)?,
        g: channel("green", g)?,
        b: channel("blue", b)?,
    })
}

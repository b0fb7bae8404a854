use core::fmt::Write;

use heapless::String;

use super::{Color, rgb_from_u32};
use crate::Error;

/// Color encoded for a device control surface
pub type EncodedColor = String<16>;

/// Named colors offered by the settings UI
pub const PRESETS: [(&str, Color); 6] = [
    ("red", rgb_from_u32(0x00ff_0000)),
    ("green", rgb_from_u32(0x0000_ff00)),
    ("blue", rgb_from_u32(0x0000_00ff)),
    ("purple", rgb_from_u32(0x0080_0080)),
    ("white", rgb_from_u32(0x00ff_ffff)),
    ("orange", rgb_from_u32(0x00ff_7f00)),
];

/// Encode a color as lowercase `rrggbb`, the format `hp-wmi` zone files accept
pub fn encode_hex(color: Color) -> EncodedColor {
    let mut encoded = EncodedColor::new();
    // Six hex digits always fit
    let _ = write!(encoded, "{:02x}{:02x}{:02x}", color.r, color.g, color.b);
    encoded
}

/// Parse `rrggbb` or `#rrggbb`
pub fn parse_hex(value: &str) -> Result<Color, Error> {
    let digits = value.trim();
    let digits = digits.strip_prefix('#').unwrap_or(digits);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidColor(format!(
            "expected six hex digits, got {value:?}"
        )));
    }
    let raw = u32::from_str_radix(digits, 16)
        .map_err(|err| Error::InvalidColor(format!("{value:?}: {err}")))?;

    Ok(rgb_from_u32(raw))
}

/// Look up a preset by name, ignoring case
pub fn preset(name: &str) -> Option<Color> {
    PRESETS
        .iter()
        .find(|(preset, _)| preset.eq_ignore_ascii_case(name.trim()))
        .map(|(_, color)| *color)
}

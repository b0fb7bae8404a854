use super::Color;

/// Number of degrees in a full hue circle
pub const HUE_DEGREES: u16 = 360;

/// Convert a hue in degrees to RGB at full saturation and value.
///
/// Hues outside `0..360` wrap around.
#[allow(clippy::cast_possible_truncation)]
pub const fn hue_to_rgb(hue: u16) -> Color {
    let hue = hue % HUE_DEGREES;
    let sector = hue / 60;
    let offset = (hue % 60) as u32;
    // Rounded 255 * offset / 60
    let rising = ((255 * offset + 30) / 60) as u8;
    let falling = 255 - rising;

    match sector {
        0 => Color { r: 255, g: rising, b: 0 },
        1 => Color { r: falling, g: 255, b: 0 },
        2 => Color { r: 0, g: 255, b: rising },
        3 => Color { r: 0, g: falling, b: 255 },
        4 => Color { r: rising, g: 0, b: 255 },
        _ => Color { r: 255, g: 0, b: falling },
    }
}

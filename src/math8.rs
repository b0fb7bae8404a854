/// Linearly interpolate between two 8-bit values.
///
/// Computes `round(a + (b - a) * step / steps)` with integer math, rounding
/// half away from zero. `steps == 0` yields `b`.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn lerp8(a: u8, b: u8, step: u32, steps: u32) -> u8 {
    if steps == 0 || step >= steps {
        return b;
    }
    let delta = (b as i64 - a as i64) * step as i64;
    let steps = steps as i64;
    let offset = if delta >= 0 {
        (delta + steps / 2) / steps
    } else {
        -((-delta + steps / 2) / steps)
    };
    let value = a as i64 + offset;

    if value < 0 {
        0
    } else if value > 255 {
        255
    } else {
        value as u8
    }
}

/// Progress of `step` out of `steps` on a 0-255 scale
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub const fn progress8(step: u32, steps: u32) -> u8 {
    if steps == 0 || step >= steps {
        return 255;
    }

    ((step as u64 * 255) / steps as u64) as u8
}

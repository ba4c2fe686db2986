//! Color helpers: channel scaling, HSL conversion and the LED gamma ramp.

pub use smart_leds::RGB8 as Rgb;

pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// Multiply a channel by `factor / 255`, truncating.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn scale_channel(value: u8, factor: u8) -> u8 {
    ((value as u16 * factor as u16) / 255) as u8
}

/// Multiply every channel of `color` by `factor / 255`.
#[inline]
#[must_use]
pub const fn scale_rgb(color: Rgb, factor: u8) -> Rgb {
    Rgb {
        r: scale_channel(color.r, factor),
        g: scale_channel(color.g, factor),
        b: scale_channel(color.b, factor),
    }
}

/// Convert HSL (each component in `0.0..=1.0`) to RGB.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Rgb {
    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    };

    Rgb {
        r: (r * 255.0) as u8,
        g: (g * 255.0) as u8,
        b: (b * 255.0) as u8,
    }
}

fn hue_to_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

/// Fully saturated color at `position / 255` around the hue wheel.
#[inline]
#[must_use]
pub fn color_wheel(position: u8) -> Rgb {
    hsl_to_rgb(f32::from(position) / 255.0, 1.0, 0.5)
}

/// Perceptual brightness ramp for WS2812 LEDs.
///
/// Not applied to composed frames; callers that want perceptual correction
/// map each channel through [`gamma8`] themselves.
pub static GAMMA8: [u8; 256] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, //
    2, 3, 3, 3, 3, 3, 4, 4, 4, 4, 4, 5, 5, 5, 5, 6, //
    6, 6, 6, 7, 7, 7, 8, 8, 8, 8, 9, 9, 9, 10, 10, 11, //
    11, 11, 12, 12, 13, 13, 13, 14, 14, 15, 15, 16, 16, 17, 17, 18, //
    18, 19, 19, 20, 20, 21, 21, 22, 23, 23, 24, 24, 25, 26, 26, 27, //
    28, 28, 29, 30, 30, 31, 32, 32, 33, 34, 35, 36, 36, 37, 38, 39, //
    40, 40, 41, 42, 43, 44, 45, 46, 47, 48, 49, 49, 50, 51, 52, 53, //
    54, 55, 57, 58, 59, 60, 61, 62, 63, 64, 65, 66, 68, 69, 70, 71, //
    72, 74, 75, 76, 77, 79, 80, 81, 83, 84, 85, 87, 88, 89, 91, 92, //
    94, 95, 97, 98, 99, 101, 103, 104, 106, 107, 109, 110, 112, 113, 115, 117, //
    118, 120, 122, 123, 125, 127, 129, 130, 132, 134, 136, 138, 139, 141, 143, 145, //
    147, 149, 151, 153, 155, 157, 159, 161, 163, 165, 167, 169, 171, 173, 175, 177, //
    179, 182, 184, 186, 188, 190, 193, 195, 197, 200, 202, 204, 207, 209, 211, 214, //
    216, 219, 221, 223, 226, 228, 231, 234, 236, 239, 241, 244, 247, 249, 252, 255, //
];

#[inline]
#[must_use]
pub fn gamma8(value: u8) -> u8 {
    GAMMA8[usize::from(value)]
}

use image::Rgb;
use palette::{Hsl, IntoColor, Mix, Srgb};

// ---------------------------------------------------------------------------
// Plot colours
// ---------------------------------------------------------------------------

/// Marker colour: a muted blue.
pub const MARKER_HSL: (f32, f32, f32) = (205.0, 0.71, 0.41);

pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
pub const FOREGROUND: Rgb<u8> = Rgb([0, 0, 0]);
pub const GRID: Rgb<u8> = Rgb([176, 176, 176]);

/// Convert an HSL triple (hue in degrees, saturation and lightness in
/// `0..=1`) to an 8-bit RGB pixel.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Rgb<u8> {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    to_pixel(rgb)
}

/// Composite `over` onto `base` with the given opacity, in linear light.
pub fn blend(base: Rgb<u8>, over: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let base = from_pixel(base).into_linear::<f32>();
    let over = from_pixel(over).into_linear::<f32>();
    to_pixel(Srgb::from_linear(base.mix(over, alpha.clamp(0.0, 1.0))))
}

fn from_pixel(p: Rgb<u8>) -> Srgb {
    Srgb::<u8>::new(p[0], p[1], p[2]).into_format::<f32>()
}

fn to_pixel(c: Srgb) -> Rgb<u8> {
    let c = c.into_format::<u8>();
    Rgb([c.red, c.green, c.blue])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_hues() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), Rgb([255, 0, 0]));
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), Rgb([0, 255, 0]));
        assert_eq!(hsl_to_rgb(0.0, 0.0, 1.0), Rgb([255, 255, 255]));
    }

    #[test]
    fn blend_endpoints() {
        let red = Rgb([255, 0, 0]);
        assert_eq!(blend(BACKGROUND, red, 1.0), red);
        assert_eq!(blend(BACKGROUND, red, 0.0), BACKGROUND);
    }

    #[test]
    fn blend_half_is_between() {
        let c = blend(BACKGROUND, FOREGROUND, 0.5);
        assert!(c[0] > 0 && c[0] < 255);
        assert_eq!(c[0], c[1]);
        assert_eq!(c[1], c[2]);
    }
}

//! Colorspace conversion from framebuffer pixels to the panel's RGB565.
//!
//! Conversion truncates: the low bits of each channel are dropped, no rounding
//! or dithering is applied.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::pixelcolor::RgbColor;

/// Convert one XRGB8888 pixel to RGB565.
#[inline]
#[must_use]
pub const fn xrgb8888_pixel_to_rgb565(pixel: u32) -> u16 {
    (((pixel & 0x00F8_0000) >> 8) | ((pixel & 0x0000_FC00) >> 5) | ((pixel & 0x0000_00F8) >> 3))
        as u16
}

/// Convert XRGB8888 pixels to RGB565.
///
/// `swap_bytes` swaps the two bytes of every result. That is what a
/// little-endian host needs when the bus can only move 8-bit words and the
/// panel expects the high byte first.
///
/// Converts `min(src.len(), dst.len())` pixels.
pub fn xrgb8888_to_rgb565(src: &[u32], dst: &mut [u16], swap_bytes: bool) {
    for (out, &pixel) in dst.iter_mut().zip(src) {
        let value = xrgb8888_pixel_to_rgb565(pixel);
        *out = if swap_bytes { value.swap_bytes() } else { value };
    }
}

/// Copy RGB565 pixels, optionally swapping bytes.
pub fn rgb565_copy(src: &[u16], dst: &mut [u16], swap_bytes: bool) {
    for (out, &pixel) in dst.iter_mut().zip(src) {
        *out = if swap_bytes { pixel.swap_bytes() } else { pixel };
    }
}

/// Convert an [`Rgb888`] color to RGB565 the same way framebuffer pixels are.
#[must_use]
pub fn to_rgb565(color: Rgb888) -> u16 {
    xrgb8888_pixel_to_rgb565(to_xrgb8888(color))
}

/// Pack an [`Rgb888`] color as an XRGB8888 word.
#[must_use]
pub fn to_xrgb8888(color: Rgb888) -> u32 {
    (u32::from(color.r()) << 16) | (u32::from(color.g()) << 8) | u32::from(color.b())
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec;

    use super::*;

    #[test]
    fn test_primary_colors() {
        assert_eq!(xrgb8888_pixel_to_rgb565(0x00F8_0000), 0xF800);
        assert_eq!(xrgb8888_pixel_to_rgb565(0x0000_FC00), 0x07E0);
        assert_eq!(xrgb8888_pixel_to_rgb565(0x0000_00F8), 0x001F);
        assert_eq!(xrgb8888_pixel_to_rgb565(0x00FF_FFFF), 0xFFFF);
        assert_eq!(xrgb8888_pixel_to_rgb565(0x0000_0000), 0x0000);
    }

    #[test]
    fn test_truncates_low_bits() {
        // low 3 bits of red and blue, low 2 bits of green are dropped
        assert_eq!(xrgb8888_pixel_to_rgb565(0x0007_0307), 0x0000);
        assert_eq!(xrgb8888_pixel_to_rgb565(0x0000_00FF), 0x001F);
        // the X byte is ignored
        assert_eq!(xrgb8888_pixel_to_rgb565(0xFF00_0000), 0x0000);
    }

    #[test]
    fn test_slice_conversion() {
        let src = [0x00F8_0000, 0x0000_00F8, 0x0000_FC00];
        let mut dst = [0u16; 3];
        xrgb8888_to_rgb565(&src, &mut dst, false);
        assert_eq!(dst, [0xF800, 0x001F, 0x07E0]);
    }

    #[test]
    fn test_swap_bytes() {
        let src = [0x00F8_0000, 0x0000_00F8];
        let mut dst = [0u16; 2];
        xrgb8888_to_rgb565(&src, &mut dst, true);
        assert_eq!(dst, [0x00F8, 0x1F00]);
    }

    #[test]
    fn test_empty_is_noop() {
        let mut dst: [u16; 0] = [];
        xrgb8888_to_rgb565(&[], &mut dst, true);

        let mut dst = vec![0xAAAAu16; 2];
        xrgb8888_to_rgb565(&[], &mut dst, false);
        assert_eq!(dst, vec![0xAAAA, 0xAAAA]);
    }

    #[test]
    fn test_rgb565_copy() {
        let mut dst = [0u16; 2];
        rgb565_copy(&[0xF800, 0x1234], &mut dst, false);
        assert_eq!(dst, [0xF800, 0x1234]);
        rgb565_copy(&[0xF800, 0x1234], &mut dst, true);
        assert_eq!(dst, [0x00F8, 0x3412]);
    }

    #[test]
    fn test_rgb888_helpers() {
        assert_eq!(to_xrgb8888(Rgb888::new(0x12, 0x34, 0x56)), 0x0012_3456);
        assert_eq!(to_rgb565(Rgb888::RED), 0xF800);
        assert_eq!(to_rgb565(Rgb888::GREEN), 0x07E0);
        assert_eq!(to_rgb565(Rgb888::BLUE), 0x001F);
        assert_eq!(to_rgb565(Rgb888::WHITE), 0xFFFF);
    }
}

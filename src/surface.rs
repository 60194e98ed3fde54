//! The pixel source a device flushes from, and an owned software
//! framebuffer implementing it.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_dma::ReadBuffer;
use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::{Dimensions, OriginDimensions, Point, Size};
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::Pixel;

use crate::convert::{to_rgb565, to_xrgb8888};
use crate::rect::Rect;

/// DRM fourcc of XRGB8888
pub const FOURCC_XRGB8888: u32 = u32::from_le_bytes(*b"XR24");
/// DRM fourcc of RGB565
pub const FOURCC_RGB565: u32 = u32::from_le_bytes(*b"RG16");

/// Pixel layout of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelFormat {
    /// 16 bits per pixel, `rrrrrggg gggbbbbb`
    Rgb565,
    /// 32 bits per pixel, `xxxxxxxx rrrrrrrr gggggggg bbbbbbbb`
    Xrgb8888,
    /// Anything else, by fourcc code
    Other(u32),
}

impl PixelFormat {
    /// The DRM fourcc code of the format.
    #[must_use]
    pub const fn fourcc(self) -> u32 {
        match self {
            PixelFormat::Rgb565 => FOURCC_RGB565,
            PixelFormat::Xrgb8888 => FOURCC_XRGB8888,
            PixelFormat::Other(code) => code,
        }
    }
}

/// Borrowed pixel memory of a surface, row-major, `width` pixels per row,
/// native-endian words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pixels<'a> {
    /// RGB565 words
    Rgb565(&'a [u16]),
    /// XRGB8888 words
    Xrgb8888(&'a [u32]),
    /// A format the converter cannot read
    Other(u32),
}

impl Pixels<'_> {
    /// Format of the borrowed memory.
    #[must_use]
    pub const fn format(&self) -> PixelFormat {
        match self {
            Pixels::Rgb565(_) => PixelFormat::Rgb565,
            Pixels::Xrgb8888(_) => PixelFormat::Xrgb8888,
            Pixels::Other(code) => PixelFormat::Other(*code),
        }
    }
}

/// A framebuffer the device reads pixels from.
pub trait Surface {
    /// Width in pixels.
    fn width(&self) -> u16;

    /// Height in pixels.
    fn height(&self) -> u16;

    /// The pixel memory.
    fn pixels(&self) -> Pixels<'_>;

    /// The pixel format.
    fn format(&self) -> PixelFormat {
        self.pixels().format()
    }

    /// Damage accumulated by drawing since the last call, then reset.
    ///
    /// Surfaces that do not track their own damage report nothing.
    fn take_damage(&mut self) -> Rect {
        Rect::EMPTY
    }
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn width(&self) -> u16 {
        (**self).width()
    }

    fn height(&self) -> u16 {
        (**self).height()
    }

    fn pixels(&self) -> Pixels<'_> {
        (**self).pixels()
    }

    fn format(&self) -> PixelFormat {
        (**self).format()
    }

    fn take_damage(&mut self) -> Rect {
        (**self).take_damage()
    }
}

#[derive(Clone, PartialEq, Eq)]
enum Storage {
    Rgb565(Vec<u16>),
    Xrgb8888(Vec<u32>),
}

/// Heap-backed framebuffer drawable with `embedded-graphics`.
///
/// Every drawing operation widens the framebuffer's damage rectangle; hand it
/// to the device with [`Surface::take_damage`] (done by
/// [`Device::draw`](crate::device::Device::draw)).
///
/// # Example
/// ```rust
/// use embedded_graphics::pixelcolor::Rgb888;
/// use embedded_graphics::prelude::*;
/// use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
/// use keidei_dbi::surface::{Framebuffer, Surface};
/// use keidei_dbi::Rect;
///
/// let mut fb = Framebuffer::new_xrgb8888(480, 320);
/// Rectangle::new(Point::new(10, 20), Size::new(4, 2))
///     .into_styled(PrimitiveStyle::with_fill(Rgb888::RED))
///     .draw(&mut fb)
///     .unwrap();
/// assert_eq!(fb.take_damage(), Rect::new(10, 13, 20, 21));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u16,
    height: u16,
    storage: Storage,
    damage: Rect,
}

impl Framebuffer {
    /// A black XRGB8888 framebuffer.
    #[must_use]
    pub fn new_xrgb8888(width: u16, height: u16) -> Self {
        let len = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            storage: Storage::Xrgb8888(vec![0; len]),
            damage: Rect::EMPTY,
        }
    }

    /// A black RGB565 framebuffer.
    #[must_use]
    pub fn new_rgb565(width: u16, height: u16) -> Self {
        let len = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            storage: Storage::Rgb565(vec![0; len]),
            damage: Rect::EMPTY,
        }
    }

    /// Damage accumulated so far, left in place.
    #[must_use]
    pub fn damage(&self) -> Rect {
        self.damage
    }

    /// Set one pixel. Points outside the framebuffer are ignored.
    pub fn set_pixel(&mut self, p: Point, color: Rgb888) {
        if p.x < 0 || p.y < 0 {
            return;
        }
        let (x, y) = (p.x as usize, p.y as usize);
        if x >= usize::from(self.width) || y >= usize::from(self.height) {
            return;
        }
        let index = y * usize::from(self.width) + x;
        match &mut self.storage {
            Storage::Rgb565(buf) => buf[index] = to_rgb565(color),
            Storage::Xrgb8888(buf) => buf[index] = to_xrgb8888(color),
        }
        let (x, y) = (x as u16, y as u16);
        self.damage = self.damage.union(Rect::new(x, x, y, y));
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb888) {
        if rect.is_empty() {
            return;
        }
        let width = usize::from(self.width);
        let columns = usize::from(rect.x1)..=usize::from(rect.x2);
        for y in usize::from(rect.y1)..=usize::from(rect.y2) {
            let row = y * width;
            let span = row + columns.start()..=row + columns.end();
            match &mut self.storage {
                Storage::Rgb565(buf) => buf[span].fill(to_rgb565(color)),
                Storage::Xrgb8888(buf) => buf[span].fill(to_xrgb8888(color)),
            }
        }
        self.damage = self.damage.union(rect);
    }
}

impl core::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format())
            .field("damage", &self.damage)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Framebuffer {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Framebuffer {}x{} {} damage: {}",
            self.width,
            self.height,
            Surface::format(self),
            self.damage
        );
    }
}

impl Surface for Framebuffer {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn pixels(&self) -> Pixels<'_> {
        match &self.storage {
            Storage::Rgb565(buf) => Pixels::Rgb565(buf),
            Storage::Xrgb8888(buf) => Pixels::Xrgb8888(buf),
        }
    }

    fn take_damage(&mut self) -> Rect {
        core::mem::take(&mut self.damage)
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(u32::from(self.width), u32::from(self.height))
    }
}

impl DrawTarget for Framebuffer {
    type Color = Rgb888;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for pixel in pixels {
            self.set_pixel(pixel.0, pixel.1);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        self.fill_rect(Rect::from(area), color);
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect(Rect::full(self.width, self.height), color);
        Ok(())
    }
}

unsafe impl ReadBuffer for Framebuffer {
    type Word = u8;

    unsafe fn read_buffer(&self) -> (*const u8, usize) {
        match &self.storage {
            Storage::Rgb565(buf) => (buf.as_ptr().cast::<u8>(), core::mem::size_of_val(&buf[..])),
            Storage::Xrgb8888(buf) => (buf.as_ptr().cast::<u8>(), core::mem::size_of_val(&buf[..])),
        }
    }
}

//! Flushing driver core for small serial LCD panels: keidei 3.5" boards and
//! generic MIPI DBI controllers.
//!
//! ## How these panels work
//!
//! The panels carry a display controller with its own frame memory. The host
//! never scans the glass; it talks to the controller with DCS commands:
//!
//! - **`SET_COLUMN_ADDRESS` / `SET_PAGE_ADDRESS`** – select a rectangular window
//! - **`WRITE_MEMORY_START`** – stream RGB565 pixels into that window, left to
//!   right, top to bottom
//! - everything else (sleep, gamma, pixel format, address mode) is set once
//!   at initialization
//!
//! A canonical 4-wire DBI bus tells commands from parameters with a separate
//! data / command line. The keidei boards have no such line on their SPI
//! header and encode the distinction, and even the reset line, into the byte
//! stream itself. Each board revision does it differently; see [`keidei`].
//! The PiScreen boards keep the D/C line but put a 16-bit parallel converter
//! behind the SPI bus; see [`piscreen`].
//!
//! Beyond the keidei boards, [`panel`] carries init and rotation tables for
//! common DBI controllers (HX8340BN, HX8353D, HX8357D, ILI934x, ILI9481,
//! ILI9486, S6D02A1, ST7735R, ST7789V, TinyLCD, R61581). A device-tree style
//! word list can replace a panel's table; see [`init`].
//!
//! ## Driver structure
//!
//! ```text
//!  drawing ──► Surface ──damage──► DirtyTracker ──► Device::flush_now
//!                                                      │
//!                 convert (XRGB8888 → RGB565) ◄────────┘
//!                                │
//!                 ProtocolEncoder (keidei v2/v5/v6, MIPI DBI, PiScreen)
//!                                │
//!                            Transport (SPI + lines)
//! ```
//!
//! 1. A [`surface::Surface`] holds the host's pixels. Drawing on it through
//!    [`Device::draw`] (or reporting writes with
//!    [`Device::on_surface_write`]) accumulates damage.
//! 2. The [`dirty::DirtyTracker`] merges damage into one bounding box and
//!    makes sure only one flush runs at a time.
//! 3. A flush snapshots the damage, addresses the window, converts the pixels
//!    to RGB565 and streams them through the [`encoder::Encoder`] picked at
//!    attach time.
//!
//! ## Example
//!
//! ```
//! use embedded_graphics::pixelcolor::Rgb888;
//! use embedded_graphics::prelude::*;
//! use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
//! use keidei_dbi::device::{Config, Device, FlushOutcome, NoTimer};
//! use keidei_dbi::transport::{Line, Transport};
//! use keidei_dbi::{Framebuffer, Rect, Variant};
//!
//! // A bus that accepts everything.
//! struct Sink;
//!
//! impl Transport for Sink {
//!     type Error = ();
//!
//!     fn write(&mut self, _buf: &[u8]) -> Result<(), ()> {
//!         Ok(())
//!     }
//!
//!     fn acquire_line(&mut self, _line: Line) -> Result<(), ()> {
//!         Ok(())
//!     }
//!
//!     fn set_line(&mut self, _line: Line, _high: bool) -> Result<(), ()> {
//!         Ok(())
//!     }
//! }
//!
//! struct NoDelay;
//!
//! impl embedded_hal::delay::DelayNs for NoDelay {
//!     fn delay_ns(&mut self, _ns: u32) {}
//! }
//!
//! let device = Device::attach(Variant::V60, Sink, NoDelay, NoTimer, Config::new()).unwrap();
//! device.set_surface(Framebuffer::new_xrgb8888(480, 320));
//! device.enable().unwrap();
//!
//! device.draw(|fb| {
//!     Rectangle::new(Point::new(10, 10), Size::new(20, 5))
//!         .into_styled(PrimitiveStyle::with_fill(Rgb888::GREEN))
//!         .draw(fb)
//!         .unwrap();
//! });
//! // without a timer, flush explicitly
//! assert_eq!(
//!     device.flush_now(),
//!     Ok(FlushOutcome::Flushed(Rect::full(480, 320)))
//! );
//! ```
//!
//! ## Available Feature Flags
//!
//! ### `log` Feature (enabled by default)
//! Routes the driver's diagnostics (initialization, flush windows, transport
//! failures) through the `log` facade.
//!
//! ### `defmt` Feature
//! Implements `defmt::Format` for the public types and routes diagnostics
//! through `defmt` instead of `log`.
//!
//! ```toml
//! [dependencies]
//! keidei-dbi = { version = "0.1.0", default-features = false, features = ["defmt"] }
//! ```
#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod convert;
pub mod dcs;
pub mod device;
pub mod dirty;
pub mod encoder;
pub mod error;
pub mod init;
pub mod keidei;
pub mod mipi;
pub mod panel;
pub mod piscreen;
pub mod rect;
pub mod surface;
pub mod transport;

use embedded_graphics::pixelcolor::Rgb888;

pub use device::{Config, Device};
pub use encoder::{Encoder, ProtocolEncoder, Variant};
pub use error::Error;
pub use panel::Panel;
pub use piscreen::Piscreen;
pub use rect::Rect;
pub use surface::{Framebuffer, Surface};
pub use transport::{SpiTransport, Transport};

/// Color type drawn onto surfaces
pub type Color = Rgb888;

#[cfg(test)]
mod tests {
    extern crate std;

    use std::format;

    use super::*;
    use embedded_graphics::pixelcolor::RgbColor;

    #[test]
    fn test_color_type_alias() {
        let red: Color = Color::RED;
        assert_eq!(red, Rgb888::RED);
        assert_eq!(convert::to_rgb565(red), 0xF800);
        assert_eq!(convert::to_rgb565(Color::GREEN), 0x07E0);
        assert_eq!(convert::to_rgb565(Color::BLUE), 0x001F);
    }

    #[test]
    fn test_every_keidei_variant_has_a_name() {
        for variant in [Variant::V10, Variant::V20, Variant::V50, Variant::V60] {
            assert!(variant.name().starts_with("keidei_v"));
            assert_eq!(variant.panel().is_some(), variant != Variant::V10);
        }
    }

    #[test]
    fn test_error_debug() {
        let err: Error<()> = Error::InvalidFormat;
        assert_eq!(format!("{err:?}"), "InvalidFormat");
    }
}

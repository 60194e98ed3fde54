//! Encoders for the keidei 3.5" panel family.
//!
//! None of the keidei boards has a data / command line wired to the SPI
//! header. Instead every byte carries marker bits that the board's glue logic
//! decodes. The hardware samples the markers on two lines at slightly
//! different moments, so each value is sent twice: once with the "before"
//! (`BE`) tag and once with the "after" (`AF`) tag.
//!
//! | revision | value frame                                        | transactions |
//! |----------|----------------------------------------------------|--------------|
//! | v2.0     | `[hi, lo, BE, hi, lo, AF]`                         | 1            |
//! | v5.0     | `[v >> 1, (v & 1) << 5 \| BE]`, same with `AF`     | 2            |
//! | v6.0     | `[BE, 0x00, v]` with the `tsc` line high           | 1            |
//!
//! The reset line is not a GPIO either: it is a bit inside the data stream.

use crate::encoder::{ProtocolEncoder, Step};
use crate::error::Error;
use crate::transport::{Line, Transport};

/// Reset bit pattern: reset asserted
pub const RESET: u8 = 0x00; /* 00000 */
/// Reset bit pattern: reset released
pub const NORESET: u8 = 0x01; /* 00001 */
/// Command tag, first sample
pub const CMD_BE: u8 = 0x11; /* 10001 */
/// Command tag, second sample
pub const CMD_AF: u8 = 0x1B; /* 11011 */
/// Data tag, first sample
pub const DATA_BE: u8 = 0x15; /* 10101 */
/// Data tag, second sample
pub const DATA_AF: u8 = 0x1F; /* 11111 */

const fn tags(data: bool) -> (u8, u8) {
    if data {
        (DATA_BE, DATA_AF)
    } else {
        (CMD_BE, CMD_AF)
    }
}

/// keidei v1.0: known revision without a defined encoding.
///
/// Attaching it always fails with [`Error::Unsupported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Unsupported;

impl ProtocolEncoder for Unsupported {
    fn write_command<T: Transport>(&self, _t: &mut T, _cmd: u8) -> Result<(), Error<T::Error>> {
        Err(Error::Unsupported)
    }

    fn write_data<T: Transport>(&self, _t: &mut T, _params: &[u8]) -> Result<(), Error<T::Error>> {
        Err(Error::Unsupported)
    }

    fn write_pixels<T: Transport>(
        &self,
        _t: &mut T,
        _pixels: &[u16],
    ) -> Result<(), Error<T::Error>> {
        Err(Error::Unsupported)
    }

    fn write_raw<T: Transport>(&self, _t: &mut T, _buf: &[u8]) -> Result<(), Error<T::Error>> {
        Err(Error::Unsupported)
    }

    fn reset_sequence(&self) -> &'static [Step] {
        &[]
    }

    fn acquire<T: Transport>(&self, _t: &mut T) -> Result<(), Error<T::Error>> {
        error!("keidei v1.0 is not supported");
        Err(Error::Unsupported)
    }
}

/// keidei v2.0: one 6-byte transaction per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Keidei20;

impl Keidei20 {
    /// Frame a 16-bit value.
    #[must_use]
    pub const fn frame(val: u16, data: bool) -> [u8; 6] {
        let (be, af) = tags(data);
        let [hi, lo] = val.to_be_bytes();
        [hi, lo, be, hi, lo, af]
    }

    fn write<T: Transport>(t: &mut T, val: u16, data: bool) -> Result<(), Error<T::Error>> {
        let buf = Self::frame(val, data);
        trace!("{:?}", buf);
        t.write(&buf).map_err(Error::Transport)
    }
}

impl ProtocolEncoder for Keidei20 {
    fn write_command<T: Transport>(&self, t: &mut T, cmd: u8) -> Result<(), Error<T::Error>> {
        Self::write(t, u16::from(cmd), false)
    }

    fn write_data<T: Transport>(&self, t: &mut T, params: &[u8]) -> Result<(), Error<T::Error>> {
        params
            .iter()
            .try_for_each(|&b| Self::write(t, u16::from(b), true))
    }

    fn write_pixels<T: Transport>(
        &self,
        t: &mut T,
        pixels: &[u16],
    ) -> Result<(), Error<T::Error>> {
        pixels.iter().try_for_each(|&p| Self::write(t, p, true))
    }

    fn reset_sequence(&self) -> &'static [Step] {
        &[
            Step::Raw(&[0, 0, NORESET]),
            Step::DelayMs(50),
            Step::Raw(&[0, 0, RESET]),
            Step::DelayMs(100),
            Step::Raw(&[0, 0, NORESET]),
            Step::DelayMs(50),
        ]
    }
}

/// keidei v5.0: each byte is spread over a shifted pair and sent twice, in
/// two transactions.
///
/// Pixels carry two extra bits (`pseudo`) that widen RGB565 to the 18-bit
/// interface format the v5.0 panel is set up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Keidei50;

impl Keidei50 {
    /// Frame one byte as its two half-transactions.
    #[must_use]
    pub const fn frame(val: u8, data: bool) -> ([u8; 2], [u8; 2]) {
        let (be, af) = tags(data);
        let high = val >> 1;
        let low = (val & 1) << 5;
        ([high, low | be], [high, low | af])
    }

    /// Frame one RGB565 pixel as its two half-transactions.
    #[must_use]
    pub const fn pixel_frame(val: u16) -> ([u8; 3], [u8; 3]) {
        let pseudo = (((val >> 5) & 0x40) | ((val << 5) & 0x20)) as u8;
        let [hi, lo] = val.to_be_bytes();
        ([hi, lo, pseudo | DATA_BE], [hi, lo, pseudo | DATA_AF])
    }

    fn write8<T: Transport>(t: &mut T, val: u8, data: bool) -> Result<(), Error<T::Error>> {
        let (first, second) = Self::frame(val, data);
        trace!("{:#x} / {:?} / {:?}", val, first, second);
        t.write_split(&first, &second).map_err(Error::Transport)
    }
}

impl ProtocolEncoder for Keidei50 {
    fn write_command<T: Transport>(&self, t: &mut T, cmd: u8) -> Result<(), Error<T::Error>> {
        Self::write8(t, cmd, false)
    }

    fn write_data<T: Transport>(&self, t: &mut T, params: &[u8]) -> Result<(), Error<T::Error>> {
        params.iter().try_for_each(|&b| Self::write8(t, b, true))
    }

    fn write_pixels<T: Transport>(
        &self,
        t: &mut T,
        pixels: &[u16],
    ) -> Result<(), Error<T::Error>> {
        for &pixel in pixels {
            let (first, second) = Self::pixel_frame(pixel);
            trace!("{:#x} / {:?} / {:?}", pixel, first, second);
            t.write_split(&first, &second).map_err(Error::Transport)?;
        }
        Ok(())
    }

    fn reset_sequence(&self) -> &'static [Step] {
        &[
            Step::Raw(&[NORESET]),
            Step::DelayMs(50),
            Step::Raw(&[RESET]),
            Step::DelayMs(100),
            Step::Raw(&[NORESET]),
            Step::DelayMs(50),
        ]
    }
}

/// keidei v6.0: 3-byte frames, each bracketed by the `tsc` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Keidei60;

impl Keidei60 {
    /// Frame one command or parameter byte.
    #[must_use]
    pub const fn frame(val: u8, data: bool) -> [u8; 3] {
        [if data { DATA_BE } else { CMD_BE }, 0x00, val]
    }

    /// Frame one RGB565 pixel.
    #[must_use]
    pub const fn pixel_frame(val: u16) -> [u8; 3] {
        let [hi, lo] = val.to_be_bytes();
        [DATA_BE, hi, lo]
    }

    /// The select line is released even when the write fails.
    fn write<T: Transport>(t: &mut T, buf: &[u8]) -> Result<(), Error<T::Error>> {
        trace!("{:?}", buf);
        t.set_line(Line::Tsc, true).map_err(Error::Transport)?;
        let written = t.write(buf);
        t.set_line(Line::Tsc, false).map_err(Error::Transport)?;
        written.map_err(Error::Transport)
    }
}

impl ProtocolEncoder for Keidei60 {
    fn write_command<T: Transport>(&self, t: &mut T, cmd: u8) -> Result<(), Error<T::Error>> {
        Self::write(t, &Self::frame(cmd, false))
    }

    fn write_data<T: Transport>(&self, t: &mut T, params: &[u8]) -> Result<(), Error<T::Error>> {
        params
            .iter()
            .try_for_each(|&b| Self::write(t, &Self::frame(b, true)))
    }

    fn write_pixels<T: Transport>(
        &self,
        t: &mut T,
        pixels: &[u16],
    ) -> Result<(), Error<T::Error>> {
        pixels
            .iter()
            .try_for_each(|&p| Self::write(t, &Self::pixel_frame(p)))
    }

    fn write_raw<T: Transport>(&self, t: &mut T, buf: &[u8]) -> Result<(), Error<T::Error>> {
        Self::write(t, buf)
    }

    fn reset_sequence(&self) -> &'static [Step] {
        const NORESET_PATTERN: &[u8] = &[RESET, NORESET, RESET, RESET];
        const RESET_PATTERN: &[u8] = &[RESET, RESET, RESET, RESET];
        &[
            Step::Raw(NORESET_PATTERN),
            Step::DelayMs(50),
            Step::Raw(RESET_PATTERN),
            Step::DelayMs(100),
            Step::Raw(NORESET_PATTERN),
            Step::DelayMs(50),
        ]
    }

    fn acquire<T: Transport>(&self, t: &mut T) -> Result<(), Error<T::Error>> {
        debug!("Enable tsc gpio");
        t.acquire_line(Line::Tsc).map_err(|e| {
            error!("Failed to get gpio 'tsc'");
            Error::Transport(e)
        })
    }
}

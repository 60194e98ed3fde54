//! The protocol encoder capability and the table-driven sequence runner.
//!
//! Every hardware variant frames the same logical stream (a command byte,
//! then parameter bytes or 16-bit pixels) differently. [`ProtocolEncoder`] is
//! the one capability they all implement; [`Encoder`] selects one at attach
//! time and never changes afterwards.
//!
//! Reset pulses and panel initialization are data: slices of [`Step`]s run by
//! [`run_sequence`], so every mandatory wait goes through the caller's delay
//! provider instead of being hidden inside the encoder.

use embedded_hal::delay::DelayNs;

use crate::dcs;
use crate::error::Error;
use crate::keidei::{Keidei20, Keidei50, Keidei60, Unsupported};
use crate::mipi::MipiDbi;
use crate::piscreen::Piscreen;
use crate::transport::{Line, Transport};

/// One entry of a reset or initialization table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Raw bytes written through the encoder's raw framing (reset patterns)
    Raw(&'static [u8]),
    /// A command with its parameters
    Command(u8, &'static [u8]),
    /// Blocking wait in milliseconds
    DelayMs(u32),
    /// Blocking wait in microseconds
    DelayUs(u32),
    /// Drive a control line
    Line(Line, bool),
}

/// Pixels decoded from a parameter buffer per encoder call.
const PIXEL_CHUNK: usize = 32;

/// Serializes commands, parameters and pixels for one hardware variant.
pub trait ProtocolEncoder {
    /// Frame and send a command byte.
    ///
    /// # Errors
    ///
    /// The transport failure, or [`Error::Unsupported`].
    fn write_command<T: Transport>(&self, t: &mut T, cmd: u8) -> Result<(), Error<T::Error>>;

    /// Frame and send parameter bytes.
    ///
    /// # Errors
    ///
    /// The first transport failure, or [`Error::Unsupported`].
    fn write_data<T: Transport>(&self, t: &mut T, params: &[u8]) -> Result<(), Error<T::Error>>;

    /// Frame and send RGB565 pixels following `WRITE_MEMORY_START`.
    ///
    /// # Errors
    ///
    /// The first transport failure, or [`Error::Unsupported`].
    fn write_pixels<T: Transport>(&self, t: &mut T, pixels: &[u16])
        -> Result<(), Error<T::Error>>;

    /// Send raw bytes from a [`Step::Raw`] entry.
    ///
    /// # Errors
    ///
    /// The transport failure.
    fn write_raw<T: Transport>(&self, t: &mut T, buf: &[u8]) -> Result<(), Error<T::Error>> {
        t.write(buf).map_err(Error::Transport)
    }

    /// The reset pulse for this variant.
    fn reset_sequence(&self) -> &'static [Step];

    /// Claim the lines this variant needs before reset.
    ///
    /// # Errors
    ///
    /// A line could not be acquired, or [`Error::Unsupported`].
    fn acquire<T: Transport>(&self, t: &mut T) -> Result<(), Error<T::Error>> {
        let _ = t;
        Ok(())
    }

    /// Whether converted pixels must be byte-swapped for this transport.
    fn pixel_byte_swap<T: Transport>(&self, t: &T) -> bool {
        let _ = t;
        false
    }

    /// Send `cmd` followed by `params`.
    ///
    /// For `WRITE_MEMORY_START` the parameters are a pixel stream: they are
    /// read as native-endian 16-bit values (a trailing odd byte is dropped)
    /// and sent through [`ProtocolEncoder::write_pixels`].
    ///
    /// # Errors
    ///
    /// The first transport failure, or [`Error::Unsupported`].
    fn command<T: Transport>(
        &self,
        t: &mut T,
        cmd: u8,
        params: &[u8],
    ) -> Result<(), Error<T::Error>> {
        log_command(cmd, params);

        self.write_command(t, cmd)?;
        if params.is_empty() {
            return Ok(());
        }

        if cmd == dcs::WRITE_MEMORY_START {
            let mut pixels = [0u16; PIXEL_CHUNK];
            for bytes in params.chunks(PIXEL_CHUNK * 2) {
                let count = bytes.len() / 2;
                for (pixel, pair) in pixels.iter_mut().zip(bytes.chunks_exact(2)) {
                    *pixel = u16::from_ne_bytes([pair[0], pair[1]]);
                }
                self.write_pixels(t, &pixels[..count])?;
            }
            Ok(())
        } else {
            self.write_data(t, params)
        }
    }

    /// Send `WRITE_MEMORY_START` followed by `pixels`.
    ///
    /// # Errors
    ///
    /// The first transport failure, or [`Error::Unsupported`].
    fn write_memory<T: Transport>(&self, t: &mut T, pixels: &[u16]) -> Result<(), Error<T::Error>> {
        debug!("cmd={:#x}, pixels={}", dcs::WRITE_MEMORY_START, pixels.len());
        self.write_command(t, dcs::WRITE_MEMORY_START)?;
        if pixels.is_empty() {
            return Ok(());
        }
        self.write_pixels(t, pixels)
    }
}

fn log_command(cmd: u8, params: &[u8]) {
    if params.is_empty() {
        debug!("cmd={:#x}", cmd);
    } else if params.len() <= 32 {
        debug!("cmd={:#x}, par={:?}", cmd, params);
    } else {
        debug!("cmd={:#x}, len={}", cmd, params.len());
    }
}

/// Run a reset or initialization table.
///
/// Stops at the first failing step.
///
/// # Errors
///
/// The first failure of a step.
pub fn run_sequence<E, T, D>(
    encoder: &E,
    t: &mut T,
    delay: &mut D,
    steps: &[Step],
) -> Result<(), Error<T::Error>>
where
    E: ProtocolEncoder + ?Sized,
    T: Transport,
    D: DelayNs,
{
    for step in steps {
        match *step {
            Step::Raw(bytes) => encoder.write_raw(t, bytes)?,
            Step::Command(cmd, params) => encoder.command(t, cmd, params)?,
            Step::DelayMs(ms) => delay.delay_ms(ms),
            Step::DelayUs(us) => delay.delay_us(us),
            Step::Line(line, high) => t.set_line(line, high).map_err(Error::Transport)?,
        }
    }
    Ok(())
}

/// The hardware variant an [`Encoder`] is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Variant {
    /// keidei v1.0, known but without a defined encoding
    V10,
    /// keidei v2.0
    V20,
    /// keidei v5.0
    V50,
    /// keidei v6.0
    V60,
}

impl Variant {
    /// The device-tree style name of the variant.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Variant::V10 => "keidei_v10",
            Variant::V20 => "keidei_v20",
            Variant::V50 => "keidei_v50",
            Variant::V60 => "keidei_v60",
        }
    }

    /// The encoder for this variant.
    #[must_use]
    pub const fn encoder(self) -> Encoder {
        match self {
            Variant::V10 => Encoder::Unsupported(Unsupported),
            Variant::V20 => Encoder::Keidei20(Keidei20),
            Variant::V50 => Encoder::Keidei50(Keidei50),
            Variant::V60 => Encoder::Keidei60(Keidei60),
        }
    }
}

/// Tagged choice of encoder, fixed for the lifetime of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Encoder {
    /// keidei v1.0
    Unsupported(Unsupported),
    /// keidei v2.0
    Keidei20(Keidei20),
    /// keidei v5.0
    Keidei50(Keidei50),
    /// keidei v6.0
    Keidei60(Keidei60),
    /// Canonical 4-wire MIPI DBI
    MipiDbi(MipiDbi),
    /// 4-wire DBI behind a 16-bit parallel converter
    Piscreen(Piscreen),
}

impl From<MipiDbi> for Encoder {
    fn from(encoder: MipiDbi) -> Self {
        Encoder::MipiDbi(encoder)
    }
}

impl From<Piscreen> for Encoder {
    fn from(encoder: Piscreen) -> Self {
        Encoder::Piscreen(encoder)
    }
}

macro_rules! dispatch {
    ($self:ident, $enc:ident => $body:expr) => {
        match $self {
            Encoder::Unsupported($enc) => $body,
            Encoder::Keidei20($enc) => $body,
            Encoder::Keidei50($enc) => $body,
            Encoder::Keidei60($enc) => $body,
            Encoder::MipiDbi($enc) => $body,
            Encoder::Piscreen($enc) => $body,
        }
    };
}

impl ProtocolEncoder for Encoder {
    fn write_command<T: Transport>(&self, t: &mut T, cmd: u8) -> Result<(), Error<T::Error>> {
        dispatch!(self, enc => enc.write_command(t, cmd))
    }

    fn write_data<T: Transport>(&self, t: &mut T, params: &[u8]) -> Result<(), Error<T::Error>> {
        dispatch!(self, enc => enc.write_data(t, params))
    }

    fn write_pixels<T: Transport>(
        &self,
        t: &mut T,
        pixels: &[u16],
    ) -> Result<(), Error<T::Error>> {
        dispatch!(self, enc => enc.write_pixels(t, pixels))
    }

    fn write_raw<T: Transport>(&self, t: &mut T, buf: &[u8]) -> Result<(), Error<T::Error>> {
        dispatch!(self, enc => enc.write_raw(t, buf))
    }

    fn reset_sequence(&self) -> &'static [Step] {
        dispatch!(self, enc => enc.reset_sequence())
    }

    fn acquire<T: Transport>(&self, t: &mut T) -> Result<(), Error<T::Error>> {
        dispatch!(self, enc => enc.acquire(t))
    }

    fn pixel_byte_swap<T: Transport>(&self, t: &T) -> bool {
        dispatch!(self, enc => enc.pixel_byte_swap(t))
    }

    fn command<T: Transport>(
        &self,
        t: &mut T,
        cmd: u8,
        params: &[u8],
    ) -> Result<(), Error<T::Error>> {
        dispatch!(self, enc => enc.command(t, cmd, params))
    }
}

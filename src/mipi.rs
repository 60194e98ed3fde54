//! Canonical MIPI DBI type C option 3 encoder: 4-wire SPI with a data /
//! command select line.

use crate::dcs;
use crate::encoder::{ProtocolEncoder, Step};
use crate::error::Error;
use crate::transport::{Line, Transport};

/// Reset pulse followed by a soft reset.
static HW_RESET: &[Step] = &[
    Step::Line(Line::Reset, false),
    Step::DelayUs(20),
    Step::Line(Line::Reset, true),
    Step::DelayMs(120),
    Step::Command(dcs::SOFT_RESET, &[]),
    Step::DelayMs(5),
];

/// Reset pulse alone.
pub(crate) static HW_PULSE: &[Step] = &[
    Step::Line(Line::Reset, false),
    Step::DelayUs(20),
    Step::Line(Line::Reset, true),
    Step::DelayMs(120),
];

/// Soft reset only, for boards without a reset line. The controller state is
/// unknown, so wait as if it was leaving sleep mode.
static SOFT_RESET: &[Step] = &[Step::Command(dcs::SOFT_RESET, &[]), Step::DelayMs(120)];

/// 4-wire DBI encoder.
///
/// Commands go out with D/C low, parameters and pixels with D/C high. Pixels
/// are sent as 16-bit words when the transport can, otherwise as big-endian
/// byte pairs, which means the converter has to swap them on little-endian
/// hosts (see [`ProtocolEncoder::pixel_byte_swap`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MipiDbi {
    hw_reset: bool,
    soft_reset: bool,
}

impl Default for MipiDbi {
    fn default() -> Self {
        Self::new()
    }
}

impl MipiDbi {
    /// Encoder for a board with the reset line wired.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            hw_reset: true,
            soft_reset: true,
        }
    }

    /// Encoder for a board without a reset line.
    #[must_use]
    pub const fn without_reset_line() -> Self {
        Self {
            hw_reset: false,
            soft_reset: true,
        }
    }

    /// Encoder that pulses the reset line without a trailing soft reset, for
    /// controllers like the R61581 on the MZ61581 board.
    #[must_use]
    pub const fn pulse_only() -> Self {
        Self {
            hw_reset: true,
            soft_reset: false,
        }
    }

    /// Returns `true` if the reset line is pulsed on attach.
    #[must_use]
    pub const fn has_reset_line(&self) -> bool {
        self.hw_reset
    }
}

impl ProtocolEncoder for MipiDbi {
    fn write_command<T: Transport>(&self, t: &mut T, cmd: u8) -> Result<(), Error<T::Error>> {
        t.set_line(Line::Dc, false).map_err(Error::Transport)?;
        t.write(&[cmd]).map_err(Error::Transport)
    }

    fn write_data<T: Transport>(&self, t: &mut T, params: &[u8]) -> Result<(), Error<T::Error>> {
        if params.is_empty() {
            return Ok(());
        }
        t.set_line(Line::Dc, true).map_err(Error::Transport)?;
        t.write(params).map_err(Error::Transport)
    }

    fn write_pixels<T: Transport>(
        &self,
        t: &mut T,
        pixels: &[u16],
    ) -> Result<(), Error<T::Error>> {
        t.set_line(Line::Dc, true).map_err(Error::Transport)?;
        t.write_words(pixels).map_err(Error::Transport)
    }

    fn reset_sequence(&self) -> &'static [Step] {
        match (self.hw_reset, self.soft_reset) {
            (true, true) => HW_RESET,
            (true, false) => HW_PULSE,
            (false, _) => SOFT_RESET,
        }
    }

    fn acquire<T: Transport>(&self, t: &mut T) -> Result<(), Error<T::Error>> {
        t.acquire_line(Line::Dc).map_err(|e| {
            error!("Failed to get gpio 'dc'");
            Error::Transport(e)
        })?;
        if self.hw_reset {
            t.acquire_line(Line::Reset).map_err(|e| {
                error!("Failed to get gpio 'reset'");
                Error::Transport(e)
            })?;
        }
        Ok(())
    }

    fn pixel_byte_swap<T: Transport>(&self, t: &T) -> bool {
        cfg!(target_endian = "little") && !t.supports_16bit_words()
    }
}

//! PiScreen framing: a 4-wire DBI bus behind an SPI to 16-bit parallel
//! converter.
//!
//! The converter latches 16 bits per transfer, so commands and short
//! configuration blocks are widened to big-endian words. Pixel data is
//! already 16 bits wide and goes out untouched.

use crate::encoder::{ProtocolEncoder, Step};
use crate::error::Error;
use crate::mipi::HW_PULSE;
use crate::transport::{Line, Transport};

/// Longest parameter block that is widened to words; longer blocks are data.
const WIDEN_MAX: usize = 32;

/// PiScreen encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Piscreen {
    hw_reset: bool,
}

impl Default for Piscreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Piscreen {
    /// Encoder for a board with the reset line wired.
    #[must_use]
    pub const fn new() -> Self {
        Self { hw_reset: true }
    }

    /// Encoder for a board without a reset line. There is no soft reset
    /// fallback: the panel table starts from whatever state it finds.
    #[must_use]
    pub const fn without_reset_line() -> Self {
        Self { hw_reset: false }
    }
}

impl ProtocolEncoder for Piscreen {
    fn write_command<T: Transport>(&self, t: &mut T, cmd: u8) -> Result<(), Error<T::Error>> {
        t.set_line(Line::Dc, false).map_err(Error::Transport)?;
        t.write(&u16::from(cmd).to_be_bytes())
            .map_err(Error::Transport)
    }

    fn write_data<T: Transport>(&self, t: &mut T, params: &[u8]) -> Result<(), Error<T::Error>> {
        if params.is_empty() {
            return Ok(());
        }
        t.set_line(Line::Dc, true).map_err(Error::Transport)?;
        if params.len() > WIDEN_MAX {
            return t.write(params).map_err(Error::Transport);
        }

        let mut wide = [0u8; WIDEN_MAX * 2];
        for (word, &b) in wide.chunks_exact_mut(2).zip(params) {
            word.copy_from_slice(&u16::from(b).to_be_bytes());
        }
        t.write(&wide[..params.len() * 2])
            .map_err(Error::Transport)
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
        if self.hw_reset {
            HW_PULSE
        } else {
            &[]
        }
    }

    fn acquire<T: Transport>(&self, t: &mut T) -> Result<(), Error<T::Error>> {
        if self.hw_reset {
            t.acquire_line(Line::Reset).map_err(|e| {
                error!("Failed to get gpio 'reset'");
                Error::Transport(e)
            })?;
        }
        t.acquire_line(Line::Dc).map_err(|e| {
            error!("Failed to get gpio 'dc'");
            Error::Transport(e)
        })
    }

    fn pixel_byte_swap<T: Transport>(&self, t: &T) -> bool {
        cfg!(target_endian = "little") && !t.supports_16bit_words()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec;
    use std::vec::Vec;

    use super::*;
    use crate::dcs;
    use crate::encoder::run_sequence;
    use crate::encoder::tests::{Event, MockDelay, MockTransport};

    #[test]
    fn test_command_is_widened() {
        let mut t = MockTransport::default();
        Piscreen::new()
            .command(&mut t, 0xC5, &[0x00, 0x01, 0x02, 0xFF])
            .unwrap();
        assert_eq!(
            t.events,
            vec![
                Event::Line(Line::Dc, false),
                Event::Write(vec![0x00, 0xC5]),
                Event::Line(Line::Dc, true),
                Event::Write(vec![0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0x00, 0xFF]),
            ]
        );
    }

    #[test]
    fn test_command_without_params() {
        let mut t = MockTransport::default();
        Piscreen::new()
            .command(&mut t, dcs::EXIT_SLEEP_MODE, &[])
            .unwrap();
        assert_eq!(
            t.events,
            vec![Event::Line(Line::Dc, false), Event::Write(vec![0x00, 0x11])]
        );
    }

    #[test]
    fn test_long_blocks_are_raw() {
        let block: Vec<u8> = (0..=32).collect();
        let mut t = MockTransport::default();
        Piscreen::new().command(&mut t, 0xE0, &block).unwrap();
        assert_eq!(t.writes(), vec![vec![0x00, 0xE0], block]);

        // exactly 32 bytes still counts as configuration
        let mut t = MockTransport::default();
        Piscreen::new().command(&mut t, 0xE0, &[0xAB; 32]).unwrap();
        assert_eq!(t.writes()[1].len(), 64);
        assert_eq!(&t.writes()[1][..4], &[0x00, 0xAB, 0x00, 0xAB]);
    }

    #[test]
    fn test_pixels_are_not_widened() {
        let mut t = MockTransport::default();
        Piscreen::new()
            .write_memory(&mut t, &[0xF800, 0x001F])
            .unwrap();
        assert_eq!(
            t.events,
            vec![
                Event::Line(Line::Dc, false),
                Event::Write(vec![0x00, dcs::WRITE_MEMORY_START]),
                Event::Line(Line::Dc, true),
                Event::Words(vec![0xF800, 0x001F]),
            ]
        );
    }

    #[test]
    fn test_reset_is_pulse_only() {
        let mut t = MockTransport::default();
        let mut delay = MockDelay::default();
        let encoder = Piscreen::new();
        encoder.acquire(&mut t).unwrap();
        run_sequence(&encoder, &mut t, &mut delay, encoder.reset_sequence()).unwrap();
        assert_eq!(
            t.events,
            vec![
                Event::Acquire(Line::Reset),
                Event::Acquire(Line::Dc),
                Event::Line(Line::Reset, false),
                Event::Line(Line::Reset, true),
            ]
        );
        assert_eq!(delay.waits_us, vec![20, 120_000]);

        let mut t = MockTransport::default();
        let encoder = Piscreen::without_reset_line();
        encoder.acquire(&mut t).unwrap();
        assert!(encoder.reset_sequence().is_empty());
        assert_eq!(t.events, vec![Event::Acquire(Line::Dc)]);
    }
}

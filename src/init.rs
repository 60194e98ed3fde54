//! fbtft-style init sequences given as `u32` words, typically from a device
//! tree `init` property.
//!
//! ```text
//! INIT_CMD | 0x11,                 exit sleep, no parameters
//! INIT_DELAY | 120,                wait 120 ms
//! INIT_CMD | 0x3A, 0x55,           pixel format, one parameter
//! INIT_CMD | 0x29,                 display on
//! ```
//!
//! A sequence is validated completely before anything is sent, so a bad word
//! never leaves the panel half initialized.

use embedded_hal::delay::DelayNs;

use crate::encoder::ProtocolEncoder;
use crate::error::Error;
use crate::transport::Transport;

/// Marks a command word; the command is the low byte.
pub const INIT_CMD: u32 = 1 << 24;
/// Marks a delay word; the low 16 bits are milliseconds.
pub const INIT_DELAY: u32 = 1 << 25;

/// Most parameters one command may carry.
pub const MAX_PARAMS: usize = 63;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Command { cmd: u8, len: usize },
    DelayMs(u32),
}

/// Walks a word slice one operation at a time.
struct Ops<'a> {
    words: &'a [u32],
}

impl Ops<'_> {
    fn next<E>(&mut self, params: &mut [u8; MAX_PARAMS]) -> Result<Option<Op>, Error<E>> {
        let Some((&word, rest)) = self.words.split_first() else {
            return Ok(None);
        };
        self.words = rest;

        if word & INIT_CMD != 0 {
            let cmd = (word & 0xFFFF) as u8;
            let mut len = 0;
            while let Some((&param, rest)) = self.words.split_first() {
                if param & 0xFFFF_0000 != 0 {
                    break;
                }
                if len == MAX_PARAMS {
                    error!("Maximum register values exceeded");
                    return Err(Error::InvalidInit);
                }
                params[len] = param as u8;
                len += 1;
                self.words = rest;
            }
            Ok(Some(Op::Command { cmd, len }))
        } else if word & INIT_DELAY != 0 {
            Ok(Some(Op::DelayMs(word & 0xFFFF)))
        } else {
            error!("illegal init value {:#x}", word);
            Err(Error::InvalidInit)
        }
    }
}

/// Check `words` without sending anything.
///
/// # Errors
///
/// [`Error::InvalidInit`] for a word that is neither a command nor a delay
/// where one is expected, or a command with more than [`MAX_PARAMS`]
/// parameters.
pub fn validate<E>(words: &[u32]) -> Result<(), Error<E>> {
    let mut ops = Ops { words };
    let mut params = [0u8; MAX_PARAMS];
    while ops.next::<E>(&mut params)?.is_some() {}
    Ok(())
}

/// Validate and run an init-word sequence.
///
/// Returns `false` if `words` is empty, in which case the caller falls back to
/// its built-in table.
///
/// # Errors
///
/// [`Error::InvalidInit`] (nothing sent), or the first transport failure.
pub fn run_init_words<E, T, D>(
    encoder: &E,
    t: &mut T,
    delay: &mut D,
    words: &[u32],
) -> Result<bool, Error<T::Error>>
where
    E: ProtocolEncoder + ?Sized,
    T: Transport,
    D: DelayNs,
{
    if words.is_empty() {
        return Ok(false);
    }
    validate::<T::Error>(words)?;
    debug!("running {} init words", words.len());

    let mut ops = Ops { words };
    let mut params = [0u8; MAX_PARAMS];
    while let Some(op) = ops.next::<T::Error>(&mut params)? {
        match op {
            Op::Command { cmd, len } => encoder.command(t, cmd, &params[..len])?,
            Op::DelayMs(ms) => {
                debug!("msleep({})", ms);
                delay.delay_ms(ms);
            }
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec;
    use std::vec::Vec;

    use super::*;
    use crate::dcs;
    use crate::encoder::tests::{Event, MockDelay, MockTransport};
    use crate::mipi::MipiDbi;
    use crate::transport::Line;

    #[test]
    fn test_commands_and_delays() {
        let words = [
            INIT_CMD | u32::from(dcs::EXIT_SLEEP_MODE),
            INIT_DELAY | 120,
            INIT_CMD | u32::from(dcs::SET_PIXEL_FORMAT),
            0x55,
            INIT_CMD | 0xC5,
            0x00,
            0x01,
            0x02,
        ];
        let mut t = MockTransport::default();
        let mut delay = MockDelay::default();
        assert_eq!(
            run_init_words(&MipiDbi::new(), &mut t, &mut delay, &words),
            Ok(true)
        );
        assert_eq!(
            t.writes(),
            vec![
                vec![0x11],
                vec![0x3A],
                vec![0x55],
                vec![0xC5],
                vec![0x00, 0x01, 0x02],
            ]
        );
        assert_eq!(delay.waits_ms(), vec![120]);
    }

    #[test]
    fn test_empty_sequence_falls_back() {
        let mut t = MockTransport::default();
        let mut delay = MockDelay::default();
        assert_eq!(
            run_init_words(&MipiDbi::new(), &mut t, &mut delay, &[]),
            Ok(false)
        );
        assert!(t.events.is_empty());
    }

    #[test]
    fn test_delay_uses_low_16_bits() {
        let mut t = MockTransport::default();
        let mut delay = MockDelay::default();
        run_init_words(&MipiDbi::new(), &mut t, &mut delay, &[INIT_DELAY | 0x1_0005]).unwrap();
        assert_eq!(delay.waits_ms(), vec![5]);
    }

    #[test]
    fn test_illegal_word_sends_nothing() {
        let words = [INIT_CMD | 0x11, INIT_DELAY | 5, INIT_CMD | 0x29];
        assert_eq!(validate::<()>(&words), Ok(()));
        // parameters cannot follow a delay
        let words = [INIT_CMD | 0x11, INIT_DELAY | 5, 0x29];
        assert_eq!(validate::<()>(&words), Err(Error::InvalidInit));

        // a plain word where a command or delay is expected
        let words = [0x29, INIT_CMD | 0x11];
        let mut t = MockTransport::default();
        let mut delay = MockDelay::default();
        assert_eq!(
            run_init_words(&MipiDbi::new(), &mut t, &mut delay, &words),
            Err(Error::InvalidInit)
        );
        assert!(t.events.is_empty());
        assert!(delay.waits_us.is_empty());

        // upper bits other than the two markers
        let words = [INIT_CMD | 0x11, 0x0400_0000];
        assert_eq!(validate::<()>(&words), Err(Error::InvalidInit));
    }

    #[test]
    fn test_parameter_limit() {
        let mut words: Vec<u32> = vec![INIT_CMD | 0xE0];
        words.extend((0..MAX_PARAMS as u32).map(|i| i & 0xFF));
        let mut t = MockTransport::default();
        let mut delay = MockDelay::default();
        run_init_words(&MipiDbi::new(), &mut t, &mut delay, &words).unwrap();
        assert_eq!(t.writes()[1].len(), MAX_PARAMS);
        assert_eq!(t.events[2], Event::Line(Line::Dc, true));

        words.push(0x00);
        let mut t = MockTransport::default();
        assert_eq!(
            run_init_words(&MipiDbi::new(), &mut t, &mut delay, &words),
            Err(Error::InvalidInit)
        );
        assert!(t.events.is_empty());
    }
}

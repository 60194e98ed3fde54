//! Abstract write-mostly bus the encoders serialize onto, plus an adapter for
//! `embedded-hal` SPI devices and output pins.

use core::fmt;

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Operation, SpiDevice};

use crate::error::Error;

/// Auxiliary control lines a transport may drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    /// Data / command select of a 4-wire DBI bus
    Dc,
    /// Panel hardware reset (active low)
    Reset,
    /// Select line bracketing every transfer on keidei v6.0 boards
    Tsc,
}

/// A serial bus with optional control lines.
///
/// Every call is one bus transaction (chip-select asserted for its duration)
/// and must complete before returning. Retrying is up to the implementation;
/// errors returned here are passed straight up.
pub trait Transport {
    /// Bus or pin error.
    type Error;

    /// Write `buf` as one transaction.
    ///
    /// # Errors
    ///
    /// Any bus failure.
    fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error>;

    /// Write `first` and `second` as two back-to-back transactions.
    ///
    /// # Errors
    ///
    /// Any bus failure; `second` is not sent if `first` failed.
    fn write_split(&mut self, first: &[u8], second: &[u8]) -> Result<(), Self::Error> {
        self.write(first)?;
        self.write(second)
    }

    /// Returns `true` if [`Transport::write_words`] moves real 16-bit words.
    fn supports_16bit_words(&self) -> bool {
        false
    }

    /// Write 16-bit words.
    ///
    /// The default sends the words' in-memory (native-endian) bytes over the
    /// 8-bit bus, so callers byte-swap beforehand when the receiver wants the
    /// high byte first.
    ///
    /// # Errors
    ///
    /// Any bus failure.
    fn write_words(&mut self, words: &[u16]) -> Result<(), Self::Error> {
        let mut chunk = [0u8; 64];
        for part in words.chunks(chunk.len() / 2) {
            for (bytes, word) in chunk.chunks_exact_mut(2).zip(part) {
                bytes.copy_from_slice(&word.to_ne_bytes());
            }
            self.write(&chunk[..part.len() * 2])?;
        }
        Ok(())
    }

    /// Returns `true` if [`Transport::read`] is implemented.
    fn is_readable(&self) -> bool {
        false
    }

    /// Send `cmd` and read `buf.len()` bytes back.
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] unless overridden, or the bus failure.
    fn read(&mut self, cmd: u8, buf: &mut [u8]) -> Result<(), Error<Self::Error>> {
        let _ = (cmd, buf);
        Err(Error::Unsupported)
    }

    /// Claim `line` and drive it to its inactive (high) level.
    ///
    /// # Errors
    ///
    /// The line is not wired or could not be configured.
    fn acquire_line(&mut self, line: Line) -> Result<(), Self::Error>;

    /// Drive `line` high or low.
    ///
    /// # Errors
    ///
    /// The line is not wired or the pin failed.
    fn set_line(&mut self, line: Line, high: bool) -> Result<(), Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        (**self).write(buf)
    }

    fn write_split(&mut self, first: &[u8], second: &[u8]) -> Result<(), Self::Error> {
        (**self).write_split(first, second)
    }

    fn supports_16bit_words(&self) -> bool {
        (**self).supports_16bit_words()
    }

    fn write_words(&mut self, words: &[u16]) -> Result<(), Self::Error> {
        (**self).write_words(words)
    }

    fn is_readable(&self) -> bool {
        (**self).is_readable()
    }

    fn read(&mut self, cmd: u8, buf: &mut [u8]) -> Result<(), Error<Self::Error>> {
        (**self).read(cmd, buf)
    }

    fn acquire_line(&mut self, line: Line) -> Result<(), Self::Error> {
        (**self).acquire_line(line)
    }

    fn set_line(&mut self, line: Line, high: bool) -> Result<(), Self::Error> {
        (**self).set_line(line, high)
    }
}

/// Errors of [`SpiTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError<S, P> {
    /// The SPI device failed
    Spi(S),
    /// A control pin failed
    Pin(P),
    /// The line was never wired to this transport
    MissingLine(Line),
}

impl<S: fmt::Debug, P: fmt::Debug> fmt::Display for TransportError<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Spi(e) => write!(f, "spi: {e:?}"),
            TransportError::Pin(e) => write!(f, "pin: {e:?}"),
            TransportError::MissingLine(line) => write!(f, "line {line:?} not wired"),
        }
    }
}

/// [`Transport`] over an `embedded-hal` [`SpiDevice`] and optional control
/// pins of one pin type.
pub struct SpiTransport<SPI, P> {
    spi: SPI,
    dc: Option<P>,
    reset: Option<P>,
    tsc: Option<P>,
    readable: bool,
}

impl<SPI, P> SpiTransport<SPI, P>
where
    SPI: SpiDevice,
    P: OutputPin,
{
    /// A transport with no control lines (keidei v2.0 / v5.0 wiring).
    pub fn new(spi: SPI) -> Self {
        Self {
            spi,
            dc: None,
            reset: None,
            tsc: None,
            readable: false,
        }
    }

    /// Wire the data / command select pin.
    #[must_use]
    pub fn with_dc(mut self, dc: P) -> Self {
        self.dc = Some(dc);
        self
    }

    /// Wire the hardware reset pin.
    #[must_use]
    pub fn with_reset(mut self, reset: P) -> Self {
        self.reset = Some(reset);
        self
    }

    /// Wire the keidei v6.0 `tsc` pin.
    #[must_use]
    pub fn with_tsc(mut self, tsc: P) -> Self {
        self.tsc = Some(tsc);
        self
    }

    /// Allow register reads (the controller's MISO must be connected).
    #[must_use]
    pub fn with_read_support(mut self) -> Self {
        self.readable = true;
        self
    }

    /// Release the SPI device and pins.
    pub fn release(self) -> (SPI, Option<P>, Option<P>, Option<P>) {
        (self.spi, self.dc, self.reset, self.tsc)
    }

    fn pin(&mut self, line: Line) -> Result<&mut P, TransportError<SPI::Error, P::Error>> {
        let pin = match line {
            Line::Dc => self.dc.as_mut(),
            Line::Reset => self.reset.as_mut(),
            Line::Tsc => self.tsc.as_mut(),
        };
        pin.ok_or(TransportError::MissingLine(line))
    }
}

impl<SPI, P> Transport for SpiTransport<SPI, P>
where
    SPI: SpiDevice,
    P: OutputPin,
{
    type Error = TransportError<SPI::Error, P::Error>;

    fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        self.spi.write(buf).map_err(TransportError::Spi)
    }

    fn is_readable(&self) -> bool {
        self.readable
    }

    fn read(&mut self, cmd: u8, buf: &mut [u8]) -> Result<(), Error<Self::Error>> {
        if !self.readable {
            return Err(Error::Unsupported);
        }
        if self.dc.is_some() {
            self.set_line(Line::Dc, false).map_err(Error::Transport)?;
        }
        self.spi
            .transaction(&mut [Operation::Write(&[cmd]), Operation::Read(buf)])
            .map_err(|e| Error::Transport(TransportError::Spi(e)))
    }

    fn acquire_line(&mut self, line: Line) -> Result<(), Self::Error> {
        self.pin(line)?.set_high().map_err(TransportError::Pin)
    }

    fn set_line(&mut self, line: Line, high: bool) -> Result<(), Self::Error> {
        let pin = self.pin(line)?;
        if high {
            pin.set_high()
        } else {
            pin.set_low()
        }
        .map_err(TransportError::Pin)
    }
}

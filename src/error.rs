//! Error type shared by the encoders, the dirty tracker and the device.

use core::fmt;

/// Errors reported by this crate.
///
/// `E` is the error type of the [`Transport`](crate::transport::Transport)
/// in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// A bus write, read or line change failed. Never retried here.
    Transport(E),
    /// The variant or transport has no defined encoding for the operation.
    Unsupported,
    /// The pixel conversion buffer could not be obtained.
    Allocation,
    /// The surface uses a pixel format the converter does not know.
    InvalidFormat,
    /// A flush was requested with no surface attached.
    NoSurface,
    /// An init-word sequence has an illegal word or too many parameters.
    InvalidInit,
}

impl<E> Error<E> {
    /// Short, static description suitable for log lines.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Error::Transport(_) => "transport error",
            Error::Unsupported => "operation not supported",
            Error::Allocation => "allocation failed",
            Error::InvalidFormat => "unsupported pixel format",
            Error::NoSurface => "no surface attached",
            Error::InvalidInit => "invalid init sequence",
        }
    }

    /// Map the transport error type.
    pub fn map_transport<F>(self, f: impl FnOnce(E) -> F) -> Error<F> {
        match self {
            Error::Transport(e) => Error::Transport(f(e)),
            Error::Unsupported => Error::Unsupported,
            Error::Allocation => Error::Allocation,
            Error::InvalidFormat => Error::InvalidFormat,
            Error::NoSurface => Error::NoSurface,
            Error::InvalidInit => Error::InvalidInit,
        }
    }
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "transport error: {e}"),
            other => f.write_str(other.kind()),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> core::error::Error for Error<E> {}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for Error<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Transport(e) => defmt::write!(f, "transport error: {}", e),
            other => defmt::write!(f, "{}", other.kind()),
        }
    }
}

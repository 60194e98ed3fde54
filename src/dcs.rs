//! MIPI Display Command Set opcodes, register layouts and read-back helpers.

use bitfield::bitfield;

use crate::error::Error;
use crate::transport::Transport;

/// No operation
pub const NOP: u8 = 0x00;
/// Software reset
pub const SOFT_RESET: u8 = 0x01;
/// Read display identification (3 bytes)
pub const GET_DISPLAY_ID: u8 = 0x04;
/// Read display status (4 bytes)
pub const GET_DISPLAY_STATUS: u8 = 0x09;
/// Read power mode
pub const GET_POWER_MODE: u8 = 0x0A;
/// Read address mode (MADCTL)
pub const GET_ADDRESS_MODE: u8 = 0x0B;
/// Read pixel format
pub const GET_PIXEL_FORMAT: u8 = 0x0C;
/// Read display mode
pub const GET_DISPLAY_MODE: u8 = 0x0D;
/// Read signal mode
pub const GET_SIGNAL_MODE: u8 = 0x0E;
/// Read self-diagnostic result
pub const GET_DIAGNOSTIC_RESULT: u8 = 0x0F;
/// Enter sleep mode
pub const ENTER_SLEEP_MODE: u8 = 0x10;
/// Exit sleep mode
pub const EXIT_SLEEP_MODE: u8 = 0x11;
/// Leave partial mode
pub const ENTER_NORMAL_MODE: u8 = 0x13;
/// Leave inverted colors
pub const EXIT_INVERT_MODE: u8 = 0x20;
/// Invert colors
pub const ENTER_INVERT_MODE: u8 = 0x21;
/// Select gamma curve
pub const SET_GAMMA_CURVE: u8 = 0x26;
/// Display off
pub const SET_DISPLAY_OFF: u8 = 0x28;
/// Display on
pub const SET_DISPLAY_ON: u8 = 0x29;
/// Column address window
pub const SET_COLUMN_ADDRESS: u8 = 0x2A;
/// Page (row) address window
pub const SET_PAGE_ADDRESS: u8 = 0x2B;
/// Start writing pixels into the address window
pub const WRITE_MEMORY_START: u8 = 0x2C;
/// Color lookup table
pub const WRITE_LUT: u8 = 0x2D;
/// Tearing effect line off
pub const SET_TEAR_OFF: u8 = 0x34;
/// Tearing effect line on
pub const SET_TEAR_ON: u8 = 0x35;
/// Memory access control (MADCTL)
pub const SET_ADDRESS_MODE: u8 = 0x36;
/// Interface pixel format
pub const SET_PIXEL_FORMAT: u8 = 0x3A;
/// Tearing effect scanline
pub const SET_TEAR_SCANLINE: u8 = 0x44;

/// `SET_PIXEL_FORMAT` parameter for 16 bits per pixel
pub const PIXEL_FMT_16BIT: u8 = 0x55;
/// `SET_PIXEL_FORMAT` parameter for 18 bits per pixel
pub const PIXEL_FMT_18BIT: u8 = 0x66;

bitfield! {
    /// Memory access control (MADCTL) register.
    ///
    /// - Bit 7: row address order (MY)
    /// - Bit 6: column address order (MX)
    /// - Bit 5: row / column exchange (MV)
    /// - Bit 4: vertical refresh order (ML)
    /// - Bit 3: BGR subpixel order
    /// - Bit 2: horizontal refresh order (MH)
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct AddressMode(u8);
    impl Debug;
    pub my, set_my: 7;
    pub mx, set_mx: 6;
    pub mv, set_mv: 5;
    pub ml, set_ml: 4;
    pub bgr, set_bgr: 3;
    pub mh, set_mh: 2;
}

impl AddressMode {
    /// Row address order
    pub const MY: u8 = 1 << 7;
    /// Column address order
    pub const MX: u8 = 1 << 6;
    /// Row / column exchange
    pub const MV: u8 = 1 << 5;
    /// Vertical refresh order
    pub const ML: u8 = 1 << 4;
    /// BGR subpixel order
    pub const BGR: u8 = 1 << 3;
    /// Horizontal refresh order
    pub const MH: u8 = 1 << 2;

    /// Wrap a raw register value.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// The raw register value.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Pick the address mode for `rotation` from a panel's rotation table
    /// (0°, 90°, 180°, 270°), optionally switching to BGR order.
    #[must_use]
    pub fn for_rotation(table: &[u8; 4], rotation: Rotation, bgr: bool) -> Self {
        let mut mode = Self(table[rotation.index()]);
        if bgr {
            mode.set_bgr(true);
        }
        mode
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AddressMode {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "AddressMode({=u8:#x})", self.0);
    }
}

bitfield! {
    /// Power mode register as returned by `GET_POWER_MODE`.
    ///
    /// Bits 0, 1 and 7 are reserved.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct PowerMode(u8);
    impl Debug;
    pub idle, _: 6;
    pub partial, _: 5;
    pub sleep_out, _: 4;
    pub normal, _: 3;
    pub display_on, _: 2;
}

impl PowerMode {
    const RESERVED_MASK: u8 = (1 << 0) | (1 << 1) | (1 << 7);

    /// Wrap a raw register value.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Register value with the reserved bits cleared.
    #[must_use]
    pub const fn defined_bits(self) -> u8 {
        self.0 & !Self::RESERVED_MASK
    }

    /// On means: display on, normal mode, out of sleep, nothing else.
    #[must_use]
    pub const fn is_on(self) -> bool {
        self.defined_bits() == ((1 << 2) | (1 << 3) | (1 << 4))
    }
}

/// Panel rotation in degrees clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    /// No rotation
    #[default]
    Deg0,
    /// 90°
    Deg90,
    /// 180°
    Deg180,
    /// 270°
    Deg270,
}

impl Rotation {
    const fn index(self) -> usize {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }
}

/// Returns `true` if the display can be verified to be on.
///
/// Transports that cannot read, and failed reads, report `false`.
pub fn display_is_on<T: Transport>(transport: &mut T) -> bool {
    if !transport.is_readable() {
        return false;
    }
    let mut val = [0u8; 1];
    if transport.read(GET_POWER_MODE, &mut val).is_err() {
        return false;
    }
    let on = PowerMode::from_bits(val[0]).is_on();
    if on {
        debug!("Display is ON");
    }
    on
}

/// Read the diagnostic registers and log them at debug level.
///
/// # Errors
///
/// Returns [`Error::Unsupported`] if the transport cannot read, or the first
/// read failure.
pub fn dump_registers<T: Transport>(transport: &mut T) -> Result<(), Error<T::Error>> {
    if !transport.is_readable() {
        return Err(Error::Unsupported);
    }

    let mut id = [0u8; 3];
    transport.read(GET_DISPLAY_ID, &mut id)?;
    debug!("Display ID ({:#x}): {:?}", GET_DISPLAY_ID, id);

    let mut status = [0u8; 4];
    transport.read(GET_DISPLAY_STATUS, &mut status)?;
    debug!("Display status ({:#x}): {:?}", GET_DISPLAY_STATUS, status);

    for (name, cmd) in [
        ("Power mode", GET_POWER_MODE),
        ("Address mode", GET_ADDRESS_MODE),
        ("Pixel format", GET_PIXEL_FORMAT),
        ("Display mode", GET_DISPLAY_MODE),
        ("Display signal mode", GET_SIGNAL_MODE),
        ("Diagnostic result", GET_DIAGNOSTIC_RESULT),
    ] {
        let mut val = [0u8; 1];
        transport.read(cmd, &mut val)?;
        debug!("{} ({:#x}): {:#x}", name, cmd, val[0]);
    }
    Ok(())
}

//! Panel descriptors: native size and vendor initialization tables.
//!
//! The tables are opaque vendor data. They run right after the encoder's reset
//! sequence, through the same encoder, so the keidei tables below go out with
//! keidei framing. Bring-up order is reset, `init`, address mode (when the
//! panel has a rotation table), then `finish`.

use crate::dcs::{self, AddressMode};
use crate::encoder::{Step, Variant};

const MY: u8 = AddressMode::MY;
const MX: u8 = AddressMode::MX;
const MV: u8 = AddressMode::MV;
const BGR: u8 = AddressMode::BGR;

/// ILI9481 horizontal flip (address mode bit 0)
const ILI9481_HFLIP: u8 = 1 << 0;
/// ILI9481 vertical flip (address mode bit 1)
const ILI9481_VFLIP: u8 = 1 << 1;

const DISPLAY_ON: &[Step] = &[Step::Command(dcs::SET_DISPLAY_ON, &[])];

/// A display panel the driver knows how to bring up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Panel {
    /// Human readable name
    pub name: &'static str,
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// Initialization sequence run after reset
    pub init: &'static [Step],
    /// `SET_ADDRESS_MODE` values for 0°, 90°, 180° and 270°
    pub rotations: Option<[u8; 4]>,
    /// Run after the address mode is set
    pub finish: &'static [Step],
}

impl Panel {
    /// Address mode for `rotation`, if the panel has a rotation table.
    #[must_use]
    pub fn address_mode(&self, rotation: dcs::Rotation, bgr: bool) -> Option<AddressMode> {
        self.rotations
            .as_ref()
            .map(|table| AddressMode::for_rotation(table, rotation, bgr))
    }
}

/// Look a panel up by name.
#[must_use]
pub fn find(name: &str) -> Option<&'static Panel> {
    PANELS.iter().copied().find(|panel| panel.name == name)
}

/// Every panel this crate has tables for.
pub static PANELS: &[&Panel] = &[
    &KEIDEI_V20,
    &KEIDEI_V50,
    &KEIDEI_V60,
    &HX8340BN,
    &HX8353D,
    &HX8357D,
    &ILI9340,
    &ILI9341,
    &ILI9481,
    &ILI9486,
    &S6D02A1,
    &ST7735R,
    &ST7789V,
    &TINYLCD,
    &MZ61581,
    &PISCREEN,
    &PISCREEN2,
];

impl Variant {
    /// The panel driven by this keidei revision, or `None` for v1.0.
    #[must_use]
    pub fn panel(self) -> Option<&'static Panel> {
        match self {
            Variant::V10 => None,
            Variant::V20 => Some(&KEIDEI_V20),
            Variant::V50 => Some(&KEIDEI_V50),
            Variant::V60 => Some(&KEIDEI_V60),
        }
    }
}

/// keidei v2.0, 480x320, 16 bpp
pub static KEIDEI_V20: Panel = Panel {
    name: "keidei_v20",
    width: 480,
    height: 320,
    init: &[
        Step::Command(dcs::EXIT_SLEEP_MODE, &[]),
        Step::DelayMs(120),
        Step::Command(0xEE, &[0x02, 0x01, 0x02, 0x01]),
        Step::Command(
            0xED,
            &[
                0x00, 0x00, 0x9A, 0x9A, 0x9B, 0x9B, 0x00, 0x00, 0x00, 0x00, 0xAE, 0xAE, 0x01, 0xA2,
                0x00,
            ],
        ),
        Step::Command(0xB4, &[0x00]),
        Step::Command(0xC0, &[0x10, 0x3B, 0x00, 0x02, 0x11]),
        Step::Command(0xC1, &[0x10]),
        Step::Command(
            0xC8,
            &[0x00, 0x46, 0x12, 0x20, 0x0C, 0x00, 0x56, 0x12, 0x67, 0x02, 0x00, 0x0C],
        ),
        Step::Command(0xD0, &[0x44, 0x42, 0x06]),
        Step::Command(0xD1, &[0x43, 0x16]),
        Step::Command(0xD2, &[0x04, 0x22]),
        Step::Command(0xD3, &[0x04, 0x12]),
        Step::Command(0xD4, &[0x07, 0x12]),
        Step::Command(0xE9, &[0x00]),
        Step::Command(0xC5, &[0x08]),
        Step::Command(dcs::SET_ADDRESS_MODE, &[0x6A]),
        Step::Command(dcs::SET_PIXEL_FORMAT, &[dcs::PIXEL_FMT_16BIT]),
        Step::Command(dcs::SET_COLUMN_ADDRESS, &[0x00, 0x00, 0x01, 0x3F]),
        Step::Command(dcs::SET_PAGE_ADDRESS, &[0x00, 0x00, 0x01, 0xE0]),
        Step::DelayMs(120),
        Step::Command(dcs::ENTER_INVERT_MODE, &[]),
    ],
    rotations: None,
    finish: &[],
};

/// keidei v5.0, 480x320, 18 bpp interface
pub static KEIDEI_V50: Panel = Panel {
    name: "keidei_v50",
    width: 480,
    height: 320,
    init: &[
        Step::Command(dcs::NOP, &[]),
        Step::Command(dcs::EXIT_SLEEP_MODE, &[]),
        Step::DelayMs(200),
        Step::Command(0xEE, &[0x02, 0x01, 0x02, 0x01]),
        Step::Command(
            0xED,
            &[
                0x00, 0x00, 0x9A, 0x9A, 0x9B, 0x9B, 0x00, 0x00, 0x00, 0x00, 0xAE, 0xAE, 0x01, 0xA2,
                0x00,
            ],
        ),
        Step::Command(0xB4, &[0x00]),
        Step::Command(0xC0, &[0x10, 0x3B, 0x00, 0x02, 0x11]),
        Step::Command(0xC1, &[0x10]),
        Step::Command(
            0xC8,
            &[0x00, 0x46, 0x12, 0x20, 0x0C, 0x00, 0x56, 0x12, 0x67, 0x02, 0x00, 0x0C],
        ),
        Step::Command(0xD0, &[0x44, 0x42, 0x06]),
        Step::Command(0xD1, &[0x43, 0x16]),
        Step::Command(0xD2, &[0x04, 0x22]),
        Step::Command(0xD3, &[0x04, 0x12]),
        Step::Command(0xD4, &[0x07, 0x12]),
        Step::Command(0xE9, &[0x00]),
        Step::Command(0xC5, &[0x08]),
        Step::Command(dcs::SET_ADDRESS_MODE, &[0x2A]),
        Step::Command(dcs::SET_PIXEL_FORMAT, &[dcs::PIXEL_FMT_18BIT]),
        Step::Command(dcs::SET_TEAR_ON, &[0x00]),
        Step::Command(dcs::SET_DISPLAY_ON, &[]),
        Step::DelayMs(200),
        Step::Command(dcs::NOP, &[]),
        Step::Command(dcs::EXIT_SLEEP_MODE, &[]),
        Step::DelayMs(200),
        Step::Command(0xEE, &[0x02, 0x01, 0x02, 0x01]),
        Step::Command(
            0xED,
            &[
                0x00, 0x00, 0x9A, 0x9A, 0x9B, 0x9B, 0x00, 0x00, 0x00, 0x00, 0xAE, 0xAF, 0x01, 0xA2,
                0x01, 0xBF, 0x2A,
            ],
        ),
    ],
    rotations: None,
    finish: &[],
};

/// keidei v6.0, 480x320, 16 bpp
pub static KEIDEI_V60: Panel = Panel {
    name: "keidei_v60",
    width: 480,
    height: 320,
    init: &[
        Step::Command(dcs::NOP, &[]),
        Step::DelayMs(10),
        Step::Command(0xFF, &[]),
        Step::Command(0xFF, &[]),
        Step::DelayMs(10),
        Step::Command(0xFF, &[]),
        Step::Command(0xFF, &[]),
        Step::Command(0xFF, &[]),
        Step::Command(0xFF, &[]),
        Step::DelayMs(15),
        Step::Command(dcs::EXIT_SLEEP_MODE, &[]),
        Step::DelayMs(150),
        Step::Command(0xB0, &[0x00]),
        Step::Command(0xB3, &[0x02, 0x00, 0x00, 0x00]),
        Step::Command(0xB9, &[0x01, 0x00, 0x0F, 0x0F]),
        Step::Command(0xC0, &[0x13, 0x3B, 0x00, 0x02, 0x00, 0x01, 0x00, 0x43]),
        Step::Command(0xC1, &[0x08, 0x0F, 0x08, 0x08]),
        Step::Command(0xC4, &[0x11, 0x07, 0x03, 0x04]),
        Step::Command(0xC6, &[0x00]),
        Step::Command(
            0xC8,
            &[
                0x03, 0x03, 0x13, 0x5C, 0x03, 0x07, 0x14, 0x08, 0x00, 0x21, 0x08, 0x14, 0x07, 0x53,
                0x0C, 0x13, 0x03, 0x03, 0x21, 0x00,
            ],
        ),
        Step::Command(dcs::SET_TEAR_ON, &[0x00]),
        Step::Command(dcs::SET_ADDRESS_MODE, &[0x60]),
        Step::Command(dcs::SET_PIXEL_FORMAT, &[dcs::PIXEL_FMT_16BIT]),
        Step::Command(dcs::SET_TEAR_SCANLINE, &[0x00, 0x01]),
        Step::Command(0xD0, &[0x07, 0x07, 0x1D, 0x03]),
        Step::Command(0xD1, &[0x03, 0x30, 0x10]),
        Step::Command(0xD2, &[0x03, 0x14, 0x04]),
        Step::Command(dcs::SET_DISPLAY_ON, &[]),
        Step::DelayMs(30),
        Step::Command(dcs::SET_COLUMN_ADDRESS, &[0x00, 0x00, 0x01, 0x3F]),
        Step::Command(dcs::SET_PAGE_ADDRESS, &[0x00, 0x00, 0x01, 0xE0]),
        Step::Command(0xB4, &[0x00]),
        Step::Command(dcs::WRITE_MEMORY_START, &[]),
        Step::DelayMs(10),
        Step::Command(dcs::SET_ADDRESS_MODE, &[0b1110_1010]),
    ],
    rotations: None,
    finish: &[],
};

/// ILI9341 on a MI0283QT-9A module, 240x320, 16 bpp
pub static ILI9341: Panel = Panel {
    name: "ili9341",
    width: 240,
    height: 320,
    init: &[
        Step::Command(dcs::SOFT_RESET, &[]),
        Step::DelayMs(5),
        Step::Command(dcs::SET_DISPLAY_OFF, &[]),
        Step::Command(0xCF, &[0x00, 0x83, 0x30]),
        Step::Command(0xED, &[0x64, 0x03, 0x12, 0x81]),
        Step::Command(0xE8, &[0x85, 0x01, 0x79]),
        Step::Command(0xCB, &[0x39, 0x2C, 0x00, 0x34, 0x02]),
        Step::Command(0xF7, &[0x20]),
        Step::Command(0xEA, &[0x00, 0x00]),
        // power control
        Step::Command(0xC0, &[0x26]),
        Step::Command(0xC1, &[0x11]),
        // VCOM
        Step::Command(0xC5, &[0x35, 0x3E]),
        Step::Command(0xC7, &[0xBE]),
        Step::Command(dcs::SET_PIXEL_FORMAT, &[dcs::PIXEL_FMT_16BIT]),
        // frame rate
        Step::Command(0xB1, &[0x00, 0x1B]),
        Step::Command(dcs::SET_GAMMA_CURVE, &[0x01]),
        // entry mode set
        Step::Command(0xB7, &[0x07]),
        Step::Command(0xB6, &[0x0A, 0x82, 0x27, 0x00]),
        Step::Command(dcs::EXIT_SLEEP_MODE, &[]),
        Step::DelayMs(100),
        Step::Command(dcs::SET_DISPLAY_ON, &[]),
        Step::DelayMs(20),
        Step::Command(
            0xE0,
            &[
                0x1F, 0x1A, 0x18, 0x0A, 0x0F, 0x06, 0x45, 0x87, 0x32, 0x0A, 0x07, 0x02, 0x07, 0x05,
                0x00,
            ],
        ),
        Step::Command(
            0xE1,
            &[
                0x00, 0x25, 0x27, 0x05, 0x10, 0x09, 0x3A, 0x78, 0x4D, 0x05, 0x18, 0x0D, 0x38, 0x3A,
                0x1F,
            ],
        ),
    ],
    rotations: Some([
        AddressMode::MX,
        AddressMode::MV | AddressMode::MY | AddressMode::MX,
        AddressMode::MY,
        AddressMode::MV | AddressMode::ML,
    ]),
    finish: &[],
};

/// HX8340BN on a BTL221722-276L module, 176x220
pub static HX8340BN: Panel = Panel {
    name: "hx8340bn",
    width: 176,
    height: 220,
    init: &[
        // extended command set
        Step::Command(0xC1, &[0xFF, 0x83, 0x40]),
        Step::Command(dcs::EXIT_SLEEP_MODE, &[]),
        Step::DelayMs(150),
        Step::Command(0xCA, &[0x70, 0x00, 0xD9]),
        // oscillator
        Step::Command(0xB0, &[0x01, 0x11]),
        // drive ability
        Step::Command(0xC9, &[0x90, 0x49, 0x10, 0x28, 0x28, 0x10, 0x00, 0x06]),
        Step::DelayMs(20),
        // VCOM
        Step::Command(0xB5, &[0x35, 0x20, 0x45]),
        Step::Command(0xB4, &[0x33, 0x25, 0x4C]),
        Step::DelayMs(10),
        Step::Command(dcs::SET_PIXEL_FORMAT, &[dcs::PIXEL_FMT_16BIT]),
        Step::Command(dcs::SET_DISPLAY_ON, &[]),
        Step::DelayMs(10),
        Step::Command(dcs::SET_GAMMA_CURVE, &[0x01]),
        Step::Command(0xC2, &[0x60, 0x71, 0x01, 0x0E, 0x05, 0x02, 0x09, 0x31, 0x0A]),
        Step::Command(0xC3, &[0x67, 0x30, 0x61, 0x17, 0x48, 0x07, 0x05, 0x33]),
    ],
    rotations: Some([0, MY | MV, MX | MY, MX | MV]),
    finish: &[],
};

/// HX8353D, 128x160
pub static HX8353D: Panel = Panel {
    name: "hx8353d",
    width: 128,
    height: 160,
    init: &[
        Step::Command(0xB9, &[0xFF, 0x83, 0x53]),
        Step::Command(0xB0, &[0x3C, 0x01]),
        Step::Command(0xB6, &[0x94, 0x6C, 0x50]),
        Step::Command(0xB1, &[0x00, 0x01, 0x1B, 0x03, 0x01, 0x08, 0x77, 0x89]),
        Step::Command(dcs::SET_PIXEL_FORMAT, &[0x05]),
        Step::Command(dcs::SET_ADDRESS_MODE, &[0xC0]),
        Step::Command(dcs::EXIT_SLEEP_MODE, &[]),
        Step::DelayMs(150),
        Step::Command(dcs::SET_DISPLAY_ON, &[]),
        Step::Command(dcs::WRITE_LUT, &HX8353D_LUT),
        Step::Command(
            0xE0,
            &[
                0x50, 0x77, 0x40, 0x08, 0xBF, 0x00, 0x03, 0x0F, 0x00, 0x01, 0x73, 0x00, 0x72, 0x03,
                0xB0, 0x0F, 0x08, 0x00, 0x0F,
            ],
        ),
    ],
    rotations: Some([MX | MY, MX | MV, 0, MY | MV]),
    finish: &[],
};

/// Linear RGB565 lookup: 32 red, 64 green, 32 blue levels.
const HX8353D_LUT: [u8; 128] = {
    let mut lut = [0u8; 128];
    let mut i = 0;
    while i < 32 {
        lut[i] = (i * 2) as u8;
        lut[96 + i] = (i * 2) as u8;
        i += 1;
    }
    let mut g = 0;
    while g < 64 {
        lut[32 + g] = g as u8;
        g += 1;
    }
    lut
};

/// HX8357D, 320x480
pub static HX8357D: Panel = Panel {
    name: "hx8357d",
    width: 320,
    height: 480,
    init: &[
        Step::Command(0xB9, &[0xFF, 0x83, 0x57]),
        Step::DelayMs(150),
        // RGB interface, enables SDO
        Step::Command(0xB3, &[0x00, 0x00, 0x06, 0x06]),
        Step::Command(0xB6, &[0x25]),
        Step::Command(0xB0, &[0x68]),
        // BGR, gate direction swapped
        Step::Command(0xCC, &[0x05]),
        Step::Command(0xB1, &[0x00, 0x15, 0x1C, 0x1C, 0x83, 0xAA]),
        Step::Command(0xC0, &[0x50, 0x50, 0x01, 0x3C, 0x1E, 0x08]),
        Step::Command(0xB4, &[0x02, 0x40, 0x00, 0x2A, 0x2A, 0x0D, 0x78]),
        Step::Command(
            0xE0,
            &[
                0x02, 0x0A, 0x11, 0x1D, 0x23, 0x35, 0x41, 0x4B, 0x4B, 0x42, 0x3A, 0x27, 0x1B, 0x08,
                0x09, 0x03, 0x02, 0x0A, 0x11, 0x1D, 0x23, 0x35, 0x41, 0x4B, 0x4B, 0x42, 0x3A, 0x27,
                0x1B, 0x08, 0x09, 0x03, 0x00, 0x01,
            ],
        ),
        Step::Command(dcs::SET_PIXEL_FORMAT, &[dcs::PIXEL_FMT_16BIT]),
        Step::Command(dcs::SET_ADDRESS_MODE, &[0xC0]),
        Step::Command(dcs::SET_TEAR_ON, &[0x00]),
        Step::Command(dcs::SET_TEAR_SCANLINE, &[0x00, 0x02]),
        Step::Command(dcs::EXIT_SLEEP_MODE, &[]),
        Step::DelayMs(150),
        Step::Command(dcs::SET_DISPLAY_ON, &[]),
        Step::DelayUs(5000),
    ],
    rotations: Some([MX | MY, MY | MV, 0, MX | MV]),
    finish: &[],
};

/// ILI9340, 240x320
pub static ILI9340: Panel = Panel {
    name: "ili9340",
    width: 240,
    height: 320,
    init: &[
        Step::Command(0xEF, &[0x03, 0x80, 0x02]),
        Step::Command(0xCF, &[0x00, 0xC1, 0x30]),
        Step::Command(0xED, &[0x64, 0x03, 0x12, 0x81]),
        Step::Command(0xE8, &[0x85, 0x00, 0x78]),
        Step::Command(0xCB, &[0x39, 0x2C, 0x00, 0x34, 0x02]),
        Step::Command(0xF7, &[0x20]),
        Step::Command(0xEA, &[0x00, 0x00]),
        // power control
        Step::Command(0xC0, &[0x23]),
        Step::Command(0xC1, &[0x10]),
        // VCOM
        Step::Command(0xC5, &[0x3E, 0x28]),
        Step::Command(0xC7, &[0x86]),
        Step::Command(dcs::SET_PIXEL_FORMAT, &[dcs::PIXEL_FMT_16BIT]),
        // 79 Hz
        Step::Command(0xB1, &[0x00, 0x18]),
        Step::Command(0xB6, &[0x08, 0x82, 0x27]),
        // gamma function disable
        Step::Command(0xF2, &[0x00]),
        Step::Command(dcs::SET_GAMMA_CURVE, &[0x01]),
        Step::Command(
            0xE0,
            &[
                0x0F, 0x31, 0x2B, 0x0C, 0x0E, 0x08, 0x4E, 0xF1, 0x37, 0x07, 0x10, 0x03, 0x0E, 0x09,
                0x00,
            ],
        ),
        Step::Command(
            0xE1,
            &[
                0x00, 0x0E, 0x14, 0x03, 0x11, 0x07, 0x31, 0xC1, 0x48, 0x08, 0x0F, 0x0C, 0x31, 0x36,
                0x0F,
            ],
        ),
        Step::Command(dcs::EXIT_SLEEP_MODE, &[]),
        Step::DelayMs(120),
        Step::Command(dcs::SET_DISPLAY_ON, &[]),
    ],
    rotations: Some([MX, MV | MY | MX, MY, MV]),
    finish: &[],
};

/// ILI9481, 320x480
pub static ILI9481: Panel = Panel {
    name: "ili9481",
    width: 320,
    height: 480,
    init: &[
        Step::Command(dcs::EXIT_SLEEP_MODE, &[]),
        Step::DelayMs(50),
        // power
        Step::Command(0xD0, &[0x07, 0x42, 0x18]),
        Step::Command(0xD1, &[0x00, 0x07, 0x10]),
        Step::Command(0xD2, &[0x01, 0x02]),
        // panel driving
        Step::Command(0xC0, &[0x10, 0x3B, 0x00, 0x02, 0x11]),
        Step::Command(0xC5, &[0x03]),
        Step::Command(dcs::SET_PIXEL_FORMAT, &[dcs::PIXEL_FMT_16BIT]),
        Step::Command(
            0xC8,
            &[0x00, 0x32, 0x36, 0x45, 0x06, 0x16, 0x37, 0x75, 0x77, 0x54, 0x0C, 0x00],
        ),
        Step::Command(dcs::SET_DISPLAY_ON, &[]),
    ],
    rotations: Some([
        ILI9481_HFLIP,
        MV,
        ILI9481_VFLIP,
        MV | ILI9481_VFLIP | ILI9481_HFLIP,
    ]),
    finish: &[],
};

/// ILI9486, 320x480
pub static ILI9486: Panel = Panel {
    name: "ili9486",
    width: 320,
    height: 480,
    init: &[
        // interface mode control
        Step::Command(0xB0, &[0x00]),
        Step::Command(dcs::EXIT_SLEEP_MODE, &[]),
        Step::DelayMs(250),
        Step::Command(dcs::SET_PIXEL_FORMAT, &[dcs::PIXEL_FMT_16BIT]),
        Step::Command(0xC2, &[0x44]),
        Step::Command(0xC5, &[0x00, 0x00, 0x00, 0x00]),
        Step::Command(0xE0, &ILI9486_GAMMA_POS),
        Step::Command(0xE1, &ILI9486_GAMMA_NEG),
        Step::Command(0xE2, &ILI9486_GAMMA_NEG),
        Step::Command(dcs::EXIT_SLEEP_MODE, &[]),
        Step::Command(dcs::SET_DISPLAY_ON, &[]),
    ],
    rotations: Some([MY, MV, MX, MY | MX | MV]),
    finish: &[],
};

const ILI9486_GAMMA_POS: [u8; 15] = [
    0x0F, 0x1F, 0x1C, 0x0C, 0x0F, 0x08, 0x48, 0x98, 0x37, 0x0A, 0x13, 0x04, 0x11, 0x0D, 0x00,
];

const ILI9486_GAMMA_NEG: [u8; 15] = [
    0x0F, 0x32, 0x2E, 0x0B, 0x0D, 0x05, 0x47, 0x75, 0x37, 0x06, 0x10, 0x03, 0x24, 0x20, 0x00,
];

/// S6D02A1, 128x160
pub static S6D02A1: Panel = Panel {
    name: "s6d02a1",
    width: 128,
    height: 160,
    init: &[
        Step::Command(0xF0, &[0x5A, 0x5A]),
        Step::Command(0xFC, &[0x5A, 0x5A]),
        Step::Command(
            0xFA,
            &[
                0x02, 0x1F, 0x00, 0x10, 0x22, 0x30, 0x38, 0x3A, 0x3A, 0x3A, 0x3A, 0x3A, 0x3D, 0x02,
                0x01,
            ],
        ),
        Step::Command(
            0xFB,
            &[
                0x21, 0x00, 0x02, 0x04, 0x07, 0x0A, 0x0B, 0x0C, 0x0C, 0x16, 0x1E, 0x30, 0x3F, 0x01,
                0x02,
            ],
        ),
        // power setting sequence
        Step::Command(
            0xFD,
            &[0x00, 0x00, 0x00, 0x17, 0x10, 0x00, 0x01, 0x01, 0x00, 0x1F, 0x1F],
        ),
        Step::Command(
            0xF4,
            &[
                0x00, 0x00, 0x00, 0x00, 0x00, 0x3F, 0x3F, 0x07, 0x00, 0x3C, 0x36, 0x00, 0x3C, 0x36,
                0x00,
            ],
        ),
        Step::Command(
            0xF5,
            &[0x00, 0x70, 0x66, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x6D, 0x66, 0x06],
        ),
        Step::Command(
            0xF6,
            &[0x02, 0x00, 0x3F, 0x00, 0x00, 0x00, 0x02, 0x00, 0x06, 0x01, 0x00],
        ),
        Step::Command(
            0xF2,
            &[
                0x00, 0x01, 0x03, 0x08, 0x08, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00,
                0x04, 0x08, 0x08,
            ],
        ),
        Step::Command(0xF8, &[0x11]),
        Step::Command(0xF7, &[0xC8, 0x20, 0x00, 0x00]),
        Step::Command(0xF3, &[0x00, 0x00]),
        Step::Command(dcs::EXIT_SLEEP_MODE, &[]),
        Step::DelayMs(50),
        Step::Command(0xF3, &[0x00, 0x01]),
        Step::DelayMs(50),
        Step::Command(0xF3, &[0x00, 0x03]),
        Step::DelayMs(50),
        Step::Command(0xF3, &[0x00, 0x07]),
        Step::DelayMs(50),
        Step::Command(0xF3, &[0x00, 0x0F]),
        Step::DelayMs(50),
        Step::Command(
            0xF4,
            &[
                0x00, 0x04, 0x00, 0x00, 0x00, 0x3F, 0x3F, 0x07, 0x00, 0x3C, 0x36, 0x00, 0x3C, 0x36,
                0x00,
            ],
        ),
        Step::DelayMs(50),
        Step::Command(0xF3, &[0x00, 0x1F]),
        Step::DelayMs(50),
        Step::Command(0xF3, &[0x00, 0x7F]),
        Step::DelayMs(50),
        Step::Command(0xF3, &[0x00, 0xFF]),
        Step::DelayMs(50),
        Step::Command(
            0xFD,
            &[0x00, 0x00, 0x00, 0x17, 0x10, 0x00, 0x00, 0x01, 0x00, 0x16, 0x16],
        ),
        Step::Command(
            0xF4,
            &[
                0x00, 0x09, 0x00, 0x00, 0x00, 0x3F, 0x3F, 0x07, 0x00, 0x3C, 0x36, 0x00, 0x3C, 0x36,
                0x00,
            ],
        ),
        // initializing sequence
        Step::Command(dcs::SET_ADDRESS_MODE, &[0x08]),
        Step::Command(dcs::SET_TEAR_ON, &[0x00]),
        Step::Command(dcs::SET_PIXEL_FORMAT, &[0x05]),
        Step::Command(dcs::SET_GAMMA_CURVE, &[0x01]),
        Step::DelayMs(150),
        Step::Command(dcs::SET_DISPLAY_ON, &[]),
        Step::Command(dcs::WRITE_MEMORY_START, &[]),
    ],
    rotations: Some([MX | MY, MX | MV, 0, MY | MV]),
    finish: &[],
};

/// ST7735R, 128x160
pub static ST7735R: Panel = Panel {
    name: "st7735r",
    width: 128,
    height: 160,
    init: &[
        Step::Command(dcs::EXIT_SLEEP_MODE, &[]),
        Step::DelayMs(500),
        // frame rate: normal, idle, partial
        Step::Command(0xB1, &[0x01, 0x2C, 0x2D]),
        Step::Command(0xB2, &[0x01, 0x2C, 0x2D]),
        Step::Command(0xB3, &[0x01, 0x2C, 0x2D, 0x01, 0x2C, 0x2D]),
        // no inversion
        Step::Command(0xB4, &[0x07]),
        // power control
        Step::Command(0xC0, &[0xA2, 0x02, 0x84]),
        Step::Command(0xC1, &[0xC5]),
        Step::Command(0xC2, &[0x0A, 0x00]),
        Step::Command(0xC3, &[0x8A, 0x2A]),
        Step::Command(0xC4, &[0x8A, 0xEE]),
        Step::Command(0xC5, &[0x0E]),
        Step::Command(dcs::EXIT_INVERT_MODE, &[]),
        Step::Command(dcs::SET_PIXEL_FORMAT, &[dcs::PIXEL_FMT_16BIT]),
        Step::Command(dcs::SET_DISPLAY_ON, &[]),
        Step::DelayMs(100),
        Step::Command(dcs::ENTER_NORMAL_MODE, &[]),
        Step::DelayMs(10),
        Step::Command(
            0xE0,
            &[
                0x02, 0x1C, 0x07, 0x12, 0x37, 0x32, 0x29, 0x2D, 0x29, 0x25, 0x2B, 0x39, 0x00, 0x01,
                0x03, 0x10,
            ],
        ),
        Step::Command(
            0xE1,
            &[
                0x03, 0x1D, 0x07, 0x06, 0x2E, 0x2C, 0x29, 0x2D, 0x2E, 0x2E, 0x37, 0x3F, 0x00, 0x00,
                0x02, 0x10,
            ],
        ),
    ],
    rotations: Some([MX | MY, MX | MV, 0, MY | MV]),
    finish: &[],
};

/// ST7789V, 240x320
pub static ST7789V: Panel = Panel {
    name: "st7789v",
    width: 240,
    height: 320,
    init: &[
        Step::Command(dcs::EXIT_SLEEP_MODE, &[]),
        Step::DelayMs(120),
        Step::Command(dcs::SET_PIXEL_FORMAT, &[dcs::PIXEL_FMT_16BIT]),
        // porch
        Step::Command(0xB2, &[0x08, 0x08, 0x00, 0x22, 0x22]),
        // VGH 13.26 V, VGL -10.43 V
        Step::Command(0xB7, &[0x35]),
        // VDV and VRH from registers
        Step::Command(0xC2, &[0x01, 0xFF]),
        Step::Command(0xC3, &[0x0B]),
        Step::Command(0xC4, &[0x20]),
        // VCOM 0.9 V, no offset
        Step::Command(0xBB, &[0x20]),
        Step::Command(0xC5, &[0x20]),
        Step::Command(0xD0, &[0xA4, 0xA1]),
        Step::Command(dcs::SET_DISPLAY_ON, &[]),
        Step::Command(
            0xE0,
            &[
                0xD0, 0x00, 0x14, 0x15, 0x13, 0x2C, 0x42, 0x43, 0x4E, 0x09, 0x16, 0x14, 0x18, 0x21,
            ],
        ),
        Step::Command(
            0xE1,
            &[
                0xD0, 0x00, 0x14, 0x15, 0x13, 0x0B, 0x43, 0x55, 0x53, 0x0C, 0x17, 0x14, 0x23, 0x20,
            ],
        ),
    ],
    rotations: Some([0, MY | MV, MX | MY, MX | MV]),
    finish: &[],
};

/// TinyLCD 3.5", 320x480
pub static TINYLCD: Panel = Panel {
    name: "tinylcd",
    width: 320,
    height: 480,
    init: &[
        Step::Command(0xB0, &[0x80]),
        Step::Command(0xC0, &[0x0A, 0x0A]),
        Step::Command(0xC1, &[0x45, 0x07]),
        Step::Command(0xC2, &[0x33]),
        Step::Command(0xC5, &[0x00, 0x42, 0x80]),
        Step::Command(0xB1, &[0xD0, 0x11]),
        Step::Command(0xB4, &[0x02]),
        Step::Command(0xB6, &[0x00, 0x22, 0x3B]),
        Step::Command(0xB7, &[0x07]),
        Step::Command(dcs::SET_ADDRESS_MODE, &[0x58]),
        Step::Command(0xF0, &[0x36, 0xA5, 0xD3]),
        Step::Command(0xE5, &[0x80]),
        Step::Command(0xE5, &[0x01]),
        Step::Command(0xB3, &[0x00]),
        Step::Command(0xE5, &[0x00]),
        Step::Command(0xF0, &[0x36, 0xA5, 0x53]),
        Step::Command(
            0xE0,
            &[0x00, 0x35, 0x33, 0x00, 0x00, 0x00, 0x00, 0x35, 0x33, 0x00, 0x00, 0x00],
        ),
        Step::Command(dcs::SET_PIXEL_FORMAT, &[dcs::PIXEL_FMT_16BIT]),
        Step::Command(dcs::EXIT_SLEEP_MODE, &[]),
        Step::DelayMs(50),
        Step::Command(dcs::SET_DISPLAY_ON, &[]),
        Step::Command(0xB6, &[0x00, 0x22, 0x3B]),
    ],
    rotations: Some([0x08, 0x38, 0x58, 0x28]),
    finish: &[],
};

/// MZ61581 board (R61581), 480x320. Attach with
/// [`MipiDbi::pulse_only`](crate::mipi::MipiDbi::pulse_only).
pub static MZ61581: Panel = Panel {
    name: "mz61581",
    width: 480,
    height: 320,
    init: &[
        Step::Command(0xB0, &[0x00]),
        Step::Command(dcs::EXIT_SLEEP_MODE, &[]),
        Step::DelayMs(120),
        Step::Command(0xB3, &[0x02, 0x00, 0x00, 0x00]),
        Step::Command(0xC0, &[0x13, 0x3B, 0x00, 0x02, 0x00, 0x01, 0x00, 0x43]),
        Step::Command(0xC1, &[0x08, 0x16, 0x08, 0x08]),
        Step::Command(0xC4, &[0x11, 0x07, 0x03, 0x03]),
        Step::Command(0xC6, &[0x00]),
        Step::Command(
            0xC8,
            &[
                0x03, 0x03, 0x13, 0x5C, 0x03, 0x07, 0x14, 0x08, 0x00, 0x21, 0x08, 0x14, 0x07, 0x53,
                0x0C, 0x13, 0x03, 0x03, 0x21, 0x00,
            ],
        ),
        Step::Command(dcs::SET_TEAR_ON, &[0x00]),
        Step::Command(dcs::SET_ADDRESS_MODE, &[0xA0]),
        Step::Command(dcs::SET_PIXEL_FORMAT, &[dcs::PIXEL_FMT_16BIT]),
        Step::Command(dcs::SET_TEAR_SCANLINE, &[0x00, 0x01]),
        Step::Command(0xD0, &[0x07, 0x07, 0x1D, 0x03]),
        Step::Command(0xD1, &[0x03, 0x30, 0x10]),
        Step::Command(0xD2, &[0x03, 0x14, 0x04]),
    ],
    rotations: Some([MY | MV | BGR, MY | MX | BGR, MX | MV | BGR, BGR]),
    finish: DISPLAY_ON,
};

/// PiScreen 3.5" (ILI9486), 480x320. Attach with
/// [`Piscreen`](crate::piscreen::Piscreen).
pub static PISCREEN: Panel = Panel {
    name: "piscreen",
    width: 480,
    height: 320,
    init: &[
        Step::Command(0xB0, &[0x00]),
        Step::Command(dcs::EXIT_SLEEP_MODE, &[]),
        Step::DelayMs(120),
        Step::Command(dcs::SET_PIXEL_FORMAT, &[dcs::PIXEL_FMT_16BIT]),
        Step::Command(0xC2, &[0x44]),
        Step::Command(0xC5, &[0x00, 0x00, 0x00, 0x00]),
        Step::Command(0xE0, &ILI9486_GAMMA_POS),
        Step::Command(0xE1, &ILI9486_GAMMA_NEG),
        Step::Command(0xE2, &ILI9486_GAMMA_NEG),
    ],
    rotations: Some([MY | MX | MV | BGR, MY | BGR, MV | BGR, MX | BGR]),
    finish: DISPLAY_ON,
};

/// PiScreen 3.5" v2 (ILI9488), 480x320. Attach with
/// [`Piscreen`](crate::piscreen::Piscreen).
pub static PISCREEN2: Panel = Panel {
    name: "piscreen2",
    width: 480,
    height: 320,
    init: &[
        Step::Command(0xB0, &[0x00]),
        Step::Command(dcs::EXIT_SLEEP_MODE, &[]),
        Step::DelayMs(120),
        Step::Command(dcs::SET_PIXEL_FORMAT, &[dcs::PIXEL_FMT_16BIT]),
        Step::Command(0xC0, &[0x11, 0x09]),
        Step::Command(0xC1, &[0x41]),
        Step::Command(0xC5, &[0x00, 0x00, 0x00, 0x00]),
        Step::Command(0xB6, &[0x00, 0x02]),
        Step::Command(0xF7, &[0xA9, 0x51, 0x2C, 0x02]),
        Step::Command(0xBE, &[0x00, 0x04]),
        Step::Command(0xE9, &[0x00]),
    ],
    rotations: Some([MV | BGR, MX | BGR, MY | MX | MV | BGR, MY | BGR]),
    finish: DISPLAY_ON,
};

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec;

    use super::*;
    use crate::dcs::Rotation;
    use crate::encoder::run_sequence;
    use crate::encoder::tests::{MockDelay, MockTransport};
    use crate::keidei::Keidei60;
    use crate::mipi::MipiDbi;

    #[test]
    fn test_variant_panels() {
        assert!(Variant::V10.panel().is_none());
        for variant in [Variant::V20, Variant::V50, Variant::V60] {
            let panel = variant.panel().unwrap();
            assert_eq!((panel.width, panel.height), (480, 320));
            assert_eq!(panel.name, variant.name());
        }
    }

    #[test]
    fn test_ili9341_rotation() {
        assert_eq!(
            ILI9341.address_mode(Rotation::Deg0, false),
            Some(AddressMode::from_bits(0x40))
        );
        assert_eq!(
            ILI9341.address_mode(Rotation::Deg90, true),
            Some(AddressMode::from_bits(0xE8))
        );
        assert_eq!(KEIDEI_V20.address_mode(Rotation::Deg90, false), None);
    }

    #[test]
    fn test_v60_init_ends_with_address_mode() {
        let mut t = MockTransport::default();
        let mut delay = MockDelay::default();
        run_sequence(&Keidei60, &mut t, &mut delay, KEIDEI_V60.init).unwrap();
        let writes = t.writes();
        assert_eq!(writes[0], vec![0x11, 0x00, 0x00]);
        assert_eq!(writes[writes.len() - 2], vec![0x11, 0x00, 0x36]);
        assert_eq!(writes[writes.len() - 1], vec![0x15, 0x00, 0xEA]);
        assert_eq!(delay.total_ms(), 10 + 10 + 15 + 150 + 30 + 10);
    }

    #[test]
    fn test_find_by_name() {
        for panel in PANELS {
            assert_eq!(find(panel.name), Some(*panel));
        }
        assert_eq!(find("st7789v").map(|p| (p.width, p.height)), Some((240, 320)));
        assert_eq!(find("hx8340bn").map(|p| (p.width, p.height)), Some((176, 220)));
        assert!(find("ili9163").is_none());
    }

    #[test]
    fn test_dbi_panel_sizes() {
        let sizes = [
            (&HX8353D, 128, 160),
            (&HX8357D, 320, 480),
            (&ILI9340, 240, 320),
            (&ILI9481, 320, 480),
            (&ILI9486, 320, 480),
            (&S6D02A1, 128, 160),
            (&ST7735R, 128, 160),
            (&TINYLCD, 320, 480),
            (&MZ61581, 480, 320),
            (&PISCREEN, 480, 320),
            (&PISCREEN2, 480, 320),
        ];
        for (panel, width, height) in sizes {
            assert_eq!((panel.width, panel.height), (width, height), "{}", panel.name);
            assert!(panel.rotations.is_some());
        }
    }

    #[test]
    fn test_rotation_tables() {
        let mode = |panel: &Panel, rotation| panel.address_mode(rotation, false).unwrap().bits();
        // HX8357D keeps its own table
        assert_eq!(mode(&HX8357D, Rotation::Deg0), 0xC0);
        assert_eq!(mode(&HX8357D, Rotation::Deg270), 0x60);
        assert_eq!(mode(&ILI9340, Rotation::Deg270), 0x20);
        // flip bits, not MADCTL mirror bits
        assert_eq!(mode(&ILI9481, Rotation::Deg0), 0x01);
        assert_eq!(mode(&ILI9481, Rotation::Deg270), 0x23);
        assert_eq!(mode(&TINYLCD, Rotation::Deg180), 0x58);
        assert_eq!(mode(&ST7789V, Rotation::Deg90), 0xA0);
        assert_eq!(mode(&PISCREEN, Rotation::Deg90), 0x88);
        assert_eq!(mode(&PISCREEN2, Rotation::Deg180), 0xE8);
        assert_eq!(mode(&MZ61581, Rotation::Deg0), 0xA8);
    }

    #[test]
    fn test_display_on_after_rotation() {
        for panel in [&MZ61581, &PISCREEN, &PISCREEN2] {
            assert_eq!(panel.finish, &[Step::Command(dcs::SET_DISPLAY_ON, &[])]);
        }
        assert!(PANELS
            .iter()
            .filter(|p| !["mz61581", "piscreen", "piscreen2"].contains(&p.name))
            .all(|p| p.finish.is_empty()));
    }

    #[test]
    fn test_hx8353d_lut() {
        assert_eq!(&HX8353D_LUT[..4], &[0, 2, 4, 6]);
        assert_eq!(HX8353D_LUT[31], 62);
        assert_eq!(&HX8353D_LUT[32..35], &[0, 1, 2]);
        assert_eq!(HX8353D_LUT[95], 63);
        assert_eq!(HX8353D_LUT[96], 0);
        assert_eq!(HX8353D_LUT[127], 62);
    }

    #[test]
    fn test_dbi_tables_run() {
        for panel in [&S6D02A1, &ST7735R, &HX8357D] {
            let mut t = MockTransport::default();
            let mut delay = MockDelay::default();
            run_sequence(&MipiDbi::new(), &mut t, &mut delay, panel.init).unwrap();
            assert!(!t.writes().is_empty());
        }

        let mut t = MockTransport::default();
        let mut delay = MockDelay::default();
        run_sequence(&MipiDbi::new(), &mut t, &mut delay, ST7735R.init).unwrap();
        assert_eq!(delay.total_ms(), 500 + 100 + 10);
        assert!(t.writes().contains(&vec![dcs::ENTER_NORMAL_MODE]));
    }
}

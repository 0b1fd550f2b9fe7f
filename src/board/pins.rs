//! GPIO |     Function       |      Notes
//! -----+--------------------+----------------------------------
//!  1-4 | LCD QSPI D0-D3     | AXS15231B, quad data lines
//!  5   | LCD QSPI CLK       |
//!  6   | LCD backlight      | Active high
//!  7   | I2C SCL            | TCA9554 expander (0x20), touch
//!  8   | I2C SDA            |
//!  9   | Right plate        | Pull follows contact polarity
//! 10   | Wire contact       | Pull follows contact polarity
//! 12   | LCD QSPI CS        |
//! 17   | Indicator data     | SK9822
//! 18   | Indicator clock    | SK9822
//! 21   | Left plate         | Pull follows contact polarity
//! 38   | Strip A data       | SK9822, decorative
//! 39   | Strip A clock      |
//! 40   | Strip B data       | SK9822, decorative
//! 41   | Strip B clock      |
//! 42   | Strip C data       | SK9822, decorative
//! 45   | Strip C clock      | Strapping pin, keep strip unpowered at reset
//! 47   | DFPlayer RX        | ESP32 RX <- module TX, level shifted
//! 48   | DFPlayer TX        | ESP32 TX -> module RX, level shifted
//!
//! Expander: P1 = LCD reset, P2 = touch interrupt (active low).

// ----- LCD (QSPI) -----
pub const LCD_CS: u8 = 12;
pub const LCD_CLK: u8 = 5;
pub const LCD_D0: u8 = 1;
pub const LCD_D1: u8 = 2;
pub const LCD_D2: u8 = 3;
pub const LCD_D3: u8 = 4;
pub const LCD_BL: u8 = 6;

// ----- I2C -----
pub const I2C_SDA: u8 = 8;
pub const I2C_SCL: u8 = 7;

// ----- Contacts -----
pub const PLATE_LEFT: u8 = 21;
pub const PLATE_RIGHT: u8 = 9;
pub const WIRE: u8 = 10;

// ----- LED strips (data, clock) -----
pub const INDICATOR: (u8, u8) = (17, 18);
pub const STRIP_A: (u8, u8) = (38, 39);
pub const STRIP_B: (u8, u8) = (40, 41);
pub const STRIP_C: (u8, u8) = (42, 45);

// ----- DFPlayer (UART1) -----
pub const DFPLAYER_RX: u8 = 47;
pub const DFPLAYER_TX: u8 = 48;

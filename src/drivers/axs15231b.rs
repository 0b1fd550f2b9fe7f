// AXS15231B LCD controller over QSPI (320x480 native, driven landscape)
//
// Register writes: opcode 0x02, 24-bit address = reg << 8, params on one
// line. Pixel writes: opcode 0x32, address 0x2C00 for the first chunk of
// a window and 0x3C00 (memory write continue) after that, RGB565 big
// endian on four lines. Blocking half-duplex transfers are limited to the
// 64 byte SPI FIFO, so windows go out in 32 pixel chunks.

use core::fmt;

use buzz_kernel::render::{Panel, Region, SCREEN_H, SCREEN_W};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::IntoStorage;
use esp_hal::Blocking;
use esp_hal::delay::Delay;
use esp_hal::gpio::Output;
use esp_hal::spi::master::{Address, Command, DataMode, Spi};

pub const SPI_FREQ_MHZ: u32 = 40;

const FIFO_BYTES: usize = 64;

const OP_WRITE_REG: u16 = 0x02;
const OP_WRITE_PIXELS: u16 = 0x32;

mod cmd {
    pub const SLEEP_OUT: u8 = 0x11;
    pub const DISPLAY_ON: u8 = 0x29;
    pub const COLUMN_ADDR: u8 = 0x2A;
    pub const ROW_ADDR: u8 = 0x2B;
    pub const MEMORY_WRITE: u8 = 0x2C;
    pub const MADCTL: u8 = 0x36;
    pub const MEMORY_WRITE_CONTINUE: u8 = 0x3C;
    pub const COLMOD: u8 = 0x3A;
}

// MV | MX: rows and columns swapped, landscape with the connector on the left
const MADCTL_LANDSCAPE: u8 = 0x60;
const COLMOD_RGB565: u8 = 0x55;

#[derive(Debug)]
pub enum PanelError {
    Spi(esp_hal::spi::Error),
    /// Window outside the 480x320 screen.
    Window(Region),
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelError::Spi(e) => write!(f, "qspi error: {:?}", e),
            PanelError::Window(r) => write!(f, "window {}x{}+{}+{} off screen", r.w, r.h, r.x, r.y),
        }
    }
}

impl From<esp_hal::spi::Error> for PanelError {
    fn from(e: esp_hal::spi::Error) -> Self {
        PanelError::Spi(e)
    }
}

pub struct Axs15231b {
    spi: Spi<'static, Blocking>,
    backlight: Output<'static>,
}

impl Axs15231b {
    /// The panel must already have been through its reset pulse.
    pub fn new(spi: Spi<'static, Blocking>, backlight: Output<'static>) -> Self {
        Self { spi, backlight }
    }

    pub fn init(&mut self, delay: &mut Delay) -> Result<(), PanelError> {
        self.write_reg(cmd::SLEEP_OUT, &[])?;
        delay.delay_millis(120);
        self.write_reg(cmd::MADCTL, &[MADCTL_LANDSCAPE])?;
        self.write_reg(cmd::COLMOD, &[COLMOD_RGB565])?;
        self.write_reg(cmd::DISPLAY_ON, &[])?;
        delay.delay_millis(20);
        self.backlight.set_high();
        log::info!("axs15231b: {}x{} landscape", SCREEN_W, SCREEN_H);
        Ok(())
    }

    fn write_reg(&mut self, reg: u8, params: &[u8]) -> Result<(), PanelError> {
        self.spi.half_duplex_write(
            DataMode::Single,
            Command::_8Bit(OP_WRITE_REG, DataMode::Single),
            Address::_24Bit((reg as u32) << 8, DataMode::Single),
            0,
            params,
        )?;
        Ok(())
    }

    fn set_window(&mut self, win: Region) -> Result<(), PanelError> {
        let [x0h, x0l] = win.x.to_be_bytes();
        let [x1h, x1l] = (win.x + win.w - 1).to_be_bytes();
        let [y0h, y0l] = win.y.to_be_bytes();
        let [y1h, y1l] = (win.y + win.h - 1).to_be_bytes();
        self.write_reg(cmd::COLUMN_ADDR, &[x0h, x0l, x1h, x1l])?;
        self.write_reg(cmd::ROW_ADDR, &[y0h, y0l, y1h, y1l])
    }

    fn write_chunk(&mut self, first: bool, bytes: &[u8]) -> Result<(), PanelError> {
        let reg = if first {
            cmd::MEMORY_WRITE
        } else {
            cmd::MEMORY_WRITE_CONTINUE
        };
        self.spi.half_duplex_write(
            DataMode::Quad,
            Command::_8Bit(OP_WRITE_PIXELS, DataMode::Single),
            Address::_24Bit((reg as u32) << 8, DataMode::Single),
            0,
            bytes,
        )?;
        Ok(())
    }
}

impl Panel for Axs15231b {
    type Error = PanelError;

    fn write_window(&mut self, win: Region, pixels: &[Rgb565]) -> Result<(), PanelError> {
        if win.is_empty() || win.x + win.w > SCREEN_W || win.y + win.h > SCREEN_H {
            return Err(PanelError::Window(win));
        }
        self.set_window(win)?;

        let mut chunk = [0u8; FIFO_BYTES];
        let mut first = true;
        for group in pixels.chunks(FIFO_BYTES / 2) {
            for (dst, px) in chunk.chunks_exact_mut(2).zip(group) {
                dst.copy_from_slice(&px.into_storage().to_be_bytes());
            }
            self.write_chunk(first, &chunk[..group.len() * 2])?;
            first = false;
        }
        Ok(())
    }
}

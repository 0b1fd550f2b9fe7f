// SK9822 / APA102 strip, bit-banged on two GPIOs
//
// Frame: 4 x 0x00 start, per LED [0xE0 | brightness>>3, B, G, R],
// 4 x 0xFF end. Bits go out MSB first: set data, clock high, clock low.
// The end frame covers the extra clock edges for up to 64 LEDs.

use core::fmt;

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_hal::digital::OutputPin;

use crate::config::MAX_STRIP_LEDS;
use crate::led::{LedStrip, OFF};

const MAX_LEDS: usize = MAX_STRIP_LEDS as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sk9822Error {
    /// Data or clock pin refused a level change.
    Pin,
}

impl fmt::Display for Sk9822Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sk9822Error::Pin => write!(f, "strip pin write failed"),
        }
    }
}

pub struct Sk9822<D, C> {
    data: D,
    clock: C,
    pixels: [Rgb888; MAX_LEDS],
    len: usize,
    brightness: u8,
}

impl<D: OutputPin, C: OutputPin> Sk9822<D, C> {
    /// `len` is clamped to the supported maximum.
    pub fn new(data: D, clock: C, len: usize) -> Self {
        Self {
            data,
            clock,
            pixels: [OFF; MAX_LEDS],
            len: len.min(MAX_LEDS),
            brightness: 255,
        }
    }

    pub fn pixels(&self) -> &[Rgb888] {
        &self.pixels[..self.len]
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Sk9822Error> {
        for bit in (0..8).rev() {
            let high = byte & (1 << bit) != 0;
            let level = if high {
                self.data.set_high()
            } else {
                self.data.set_low()
            };
            level.map_err(|_| Sk9822Error::Pin)?;
            self.clock.set_high().map_err(|_| Sk9822Error::Pin)?;
            self.clock.set_low().map_err(|_| Sk9822Error::Pin)?;
        }
        Ok(())
    }
}

impl<D: OutputPin, C: OutputPin> LedStrip for Sk9822<D, C> {
    type Error = Sk9822Error;

    fn len(&self) -> usize {
        self.len
    }

    fn set_pixel(&mut self, index: usize, color: Rgb888) {
        if index < self.len {
            self.pixels[index] = color;
        }
    }

    fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    fn show(&mut self) -> Result<(), Self::Error> {
        for _ in 0..4 {
            self.write_byte(0x00)?;
        }
        let global = 0xE0 | (self.brightness >> 3);
        for i in 0..self.len {
            let px = self.pixels[i];
            self.write_byte(global)?;
            self.write_byte(px.b())?;
            self.write_byte(px.g())?;
            self.write_byte(px.r())?;
        }
        for _ in 0..4 {
            self.write_byte(0xFF)?;
        }
        Ok(())
    }
}

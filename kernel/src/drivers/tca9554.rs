// TCA9554 8-bit I2C I/O expander
//
// On the 3.5" board it owns the LCD reset line (P1) and the touch
// controller interrupt (P2, active low). Registers: 0 input, 1 output,
// 2 polarity inversion, 3 configuration (bit set = input).

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::input::TouchSensor;

pub const DEFAULT_ADDR: u8 = 0x20;

pub const PIN_LCD_RESET: u8 = 1;
pub const PIN_TOUCH_INT: u8 = 2;

const REG_INPUT: u8 = 0x00;
const REG_OUTPUT: u8 = 0x01;
const REG_POLARITY: u8 = 0x02;
const REG_CONFIG: u8 = 0x03;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tca9554Error<E> {
    I2c(E),
    BadPin(u8),
}

impl<E: fmt::Debug> fmt::Display for Tca9554Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tca9554Error::I2c(e) => write!(f, "i2c error: {:?}", e),
            Tca9554Error::BadPin(p) => write!(f, "no expander pin {}", p),
        }
    }
}

pub struct Tca9554<I> {
    i2c: I,
    addr: u8,
    output: u8, // shadow of REG_OUTPUT
    config: u8, // shadow of REG_CONFIG
}

impl<I: I2c> Tca9554<I> {
    pub fn new(i2c: I, addr: u8) -> Self {
        // power-on defaults: all inputs, outputs latched high
        Self {
            i2c,
            addr,
            output: 0xFF,
            config: 0xFF,
        }
    }

    /// Check the chip answers and put it in a known state (no inversion).
    pub fn probe(&mut self) -> Result<(), Tca9554Error<I::Error>> {
        self.read_reg(REG_INPUT)?;
        self.write_reg(REG_POLARITY, 0x00)?;
        self.write_reg(REG_OUTPUT, self.output)?;
        self.write_reg(REG_CONFIG, self.config)
    }

    pub fn set_direction(
        &mut self,
        pin: u8,
        direction: Direction,
    ) -> Result<(), Tca9554Error<I::Error>> {
        let mask = Self::mask(pin)?;
        match direction {
            Direction::Input => self.config |= mask,
            Direction::Output => self.config &= !mask,
        }
        self.write_reg(REG_CONFIG, self.config)
    }

    pub fn write_pin(&mut self, pin: u8, high: bool) -> Result<(), Tca9554Error<I::Error>> {
        let mask = Self::mask(pin)?;
        if high {
            self.output |= mask;
        } else {
            self.output &= !mask;
        }
        self.write_reg(REG_OUTPUT, self.output)
    }

    pub fn read_pin(&mut self, pin: u8) -> Result<bool, Tca9554Error<I::Error>> {
        let mask = Self::mask(pin)?;
        Ok(self.read_reg(REG_INPUT)? & mask != 0)
    }

    /// Drive `pin` as a reset line: high 10 ms, low 10 ms, high and wait 200 ms.
    pub fn reset_pulse<D: DelayNs>(
        &mut self,
        pin: u8,
        delay: &mut D,
    ) -> Result<(), Tca9554Error<I::Error>> {
        self.set_direction(pin, Direction::Output)?;
        self.write_pin(pin, true)?;
        delay.delay_ms(10);
        self.write_pin(pin, false)?;
        delay.delay_ms(10);
        self.write_pin(pin, true)?;
        delay.delay_ms(200);
        Ok(())
    }

    pub fn release(self) -> I {
        self.i2c
    }

    fn mask(pin: u8) -> Result<u8, Tca9554Error<I::Error>> {
        if pin < 8 {
            Ok(1 << pin)
        } else {
            Err(Tca9554Error::BadPin(pin))
        }
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Tca9554Error<I::Error>> {
        self.i2c
            .write(self.addr, &[reg, value])
            .map_err(Tca9554Error::I2c)
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, Tca9554Error<I::Error>> {
        let mut buf = [0u8];
        self.i2c
            .write_read(self.addr, &[reg], &mut buf)
            .map_err(Tca9554Error::I2c)?;
        Ok(buf[0])
    }
}

/// Touch interrupt line on the expander, read as a touch level.
pub struct TouchLine<I> {
    expander: Tca9554<I>,
    pin: u8,
}

impl<I: I2c> TouchLine<I> {
    pub fn new(mut expander: Tca9554<I>, pin: u8) -> Result<Self, Tca9554Error<I::Error>> {
        expander.set_direction(pin, Direction::Input)?;
        Ok(Self { expander, pin })
    }
}

impl<I: I2c> TouchSensor for TouchLine<I> {
    fn is_touched(&mut self) -> bool {
        // active low; a failed read is "not touched"
        matches!(self.expander.read_pin(self.pin), Ok(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    // Register file behind a fake bus; `input` is what the pins read.
    struct FakeBus {
        regs: [u8; 4],
        input: u8,
        writes: Vec<(u8, u8)>,
        present: bool,
    }

    impl FakeBus {
        fn new() -> Self {
            Self {
                regs: [0xFF, 0xFF, 0x00, 0xFF],
                input: 0xFF,
                writes: Vec::new(),
                present: true,
            }
        }
    }

    impl ErrorType for FakeBus {
        type Error = ErrorKind;
    }

    impl I2c for FakeBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), ErrorKind> {
            if !self.present || address != DEFAULT_ADDR {
                return Err(ErrorKind::NoAcknowledge(
                    embedded_hal::i2c::NoAcknowledgeSource::Address,
                ));
            }
            let mut reg = 0usize;
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        reg = bytes[0] as usize;
                        if let Some(&value) = bytes.get(1) {
                            self.regs[reg] = value;
                            self.writes.push((reg as u8, value));
                        }
                    }
                    Operation::Read(buf) => {
                        buf[0] = if reg == 0 { self.input } else { self.regs[reg] };
                    }
                }
            }
            Ok(())
        }
    }

    struct CountingDelay(u32);

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.0 += ns / 1_000_000;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.0 += ms;
        }
    }

    #[test]
    fn reset_pulse_drives_pin_high_low_high() {
        let mut exp = Tca9554::new(FakeBus::new(), DEFAULT_ADDR);
        let mut delay = CountingDelay(0);
        exp.reset_pulse(PIN_LCD_RESET, &mut delay).unwrap();

        let bus = exp.release();
        assert_eq!(delay.0, 220);
        assert_eq!(bus.regs[REG_CONFIG as usize] & 0b10, 0);
        let outputs: Vec<bool> = bus
            .writes
            .iter()
            .filter(|(r, _)| *r == REG_OUTPUT)
            .map(|(_, v)| v & 0b10 != 0)
            .collect();
        assert_eq!(outputs, [true, false, true]);
    }

    #[test]
    fn missing_chip_fails_probe() {
        let mut bus = FakeBus::new();
        bus.present = false;
        let mut exp = Tca9554::new(bus, DEFAULT_ADDR);
        assert!(matches!(exp.probe(), Err(Tca9554Error::I2c(_))));
    }

    #[test]
    fn bad_pin_is_rejected() {
        let mut exp = Tca9554::new(FakeBus::new(), DEFAULT_ADDR);
        assert_eq!(exp.write_pin(8, true), Err(Tca9554Error::BadPin(8)));
    }

    #[test]
    fn touch_line_is_active_low() {
        let exp = Tca9554::new(FakeBus::new(), DEFAULT_ADDR);
        let mut touch = TouchLine::new(exp, PIN_TOUCH_INT).unwrap();
        assert!(!touch.is_touched());

        touch.expander.i2c.input = !(1 << PIN_TOUCH_INT);
        assert!(touch.is_touched());

        touch.expander.i2c.present = false;
        assert!(!touch.is_touched());
    }
}

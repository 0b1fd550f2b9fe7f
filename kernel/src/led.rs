// Addressable LED strips: the seam, the decorative rainbow, and the
// single status indicator with its pulsing win ramp.

use core::fmt::Debug;

use embedded_graphics::pixelcolor::Rgb888;

use crate::config::IndicatorColors;
use crate::effect::IndicatorMode;

pub const OFF: Rgb888 = Rgb888::new(0, 0, 0);

/// Hue added per animation step, on a 16-bit hue circle.
pub const HUE_STEP: u16 = 256;

pub trait LedStrip {
    type Error: Debug;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Out of range indices are ignored.
    fn set_pixel(&mut self, index: usize, color: Rgb888);

    /// Global brightness applied to every pixel on `show`.
    fn set_brightness(&mut self, brightness: u8);

    /// Push the pixel buffer to the hardware.
    fn show(&mut self) -> Result<(), Self::Error>;

    fn fill(&mut self, color: Rgb888) {
        for i in 0..self.len() {
            self.set_pixel(i, color);
        }
    }

    fn clear(&mut self) {
        self.fill(OFF);
    }
}

/// Colour wheel: 0..=255 walks red -> green -> blue -> red.
pub const fn wheel(pos: u8) -> Rgb888 {
    let pos = 255 - pos;
    if pos < 85 {
        Rgb888::new(255 - pos * 3, 0, pos * 3)
    } else if pos < 170 {
        let pos = pos - 85;
        Rgb888::new(0, pos * 3, 255 - pos * 3)
    } else {
        let pos = pos - 170;
        Rgb888::new(pos * 3, 255 - pos * 3, 0)
    }
}

/// Rainbow spread over a strip, rotated by `HUE_STEP` every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rainbow {
    hue: u16,
}

impl Rainbow {
    pub const fn new() -> Self {
        Self { hue: 0 }
    }

    pub fn hue(&self) -> u16 {
        self.hue
    }

    /// Write the current frame into `strip` (does not show it).
    pub fn paint<S: LedStrip>(&self, strip: &mut S) {
        let n = strip.len() as u32;
        if n == 0 {
            return;
        }
        for i in 0..n {
            let pixel_hue = self.hue.wrapping_add((i * 65_536 / n) as u16);
            strip.set_pixel(i as usize, wheel((pixel_hue >> 8) as u8));
        }
    }

    pub fn advance(&mut self) {
        self.hue = self.hue.wrapping_add(HUE_STEP);
    }
}

/// Triangular brightness ramp between `min` and `max`.
#[derive(Debug, Clone, Copy)]
pub struct Pulse {
    level: u8,
    rising: bool,
    step: u8,
    min: u8,
    max: u8,
}

impl Pulse {
    pub const fn new(min: u8, max: u8, step: u8) -> Self {
        Self {
            level: max,
            rising: false,
            step,
            min,
            max,
        }
    }

    pub fn reset(&mut self) {
        self.level = self.max;
        self.rising = false;
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// Move one step and return the new level.
    pub fn next_level(&mut self) -> u8 {
        if self.rising {
            self.level = self.level.saturating_add(self.step).min(self.max);
            if self.level == self.max {
                self.rising = false;
            }
        } else {
            self.level = self.level.saturating_sub(self.step).max(self.min);
            if self.level == self.min {
                self.rising = true;
            }
        }
        self.level
    }
}

// SK9822 global brightness has 5 bits, so steps of 8 are all visible.
const PULSE_MIN: u8 = 16;
const PULSE_STEP: u8 = 8;

/// The status indicator strip: one colour per game mode, pulsing on a win.
pub struct Indicator<S> {
    strip: S,
    colors: IndicatorColors,
    brightness: u8,
    mode: IndicatorMode,
    pulse: Pulse,
}

impl<S: LedStrip> Indicator<S> {
    pub fn new(strip: S, colors: IndicatorColors, brightness: u8) -> Self {
        Self {
            strip,
            colors,
            brightness,
            mode: IndicatorMode::Idle,
            pulse: Pulse::new(PULSE_MIN.min(brightness), brightness, PULSE_STEP),
        }
    }

    pub fn mode(&self) -> IndicatorMode {
        self.mode
    }

    pub fn strip(&self) -> &S {
        &self.strip
    }

    fn color(&self, mode: IndicatorMode) -> Rgb888 {
        match mode {
            IndicatorMode::Idle => self.colors.idle,
            IndicatorMode::Ready => self.colors.ready,
            IndicatorMode::Win => self.colors.win,
            IndicatorMode::Lose => self.colors.lose,
        }
    }

    pub fn set_mode(&mut self, mode: IndicatorMode) -> Result<(), S::Error> {
        self.mode = mode;
        self.pulse.reset();
        self.strip.fill(self.color(mode));
        self.strip.set_brightness(self.brightness);
        self.strip.show()
    }

    /// Advance the win pulse; returns false (and does nothing) in other modes.
    pub fn pulse_step(&mut self) -> Result<bool, S::Error> {
        if self.mode != IndicatorMode::Win {
            return Ok(false);
        }
        let level = self.pulse.next_level();
        self.strip.set_brightness(level);
        self.strip.show()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use core::convert::Infallible;

    struct MemStrip {
        pixels: Vec<Rgb888>,
        brightness: u8,
        shows: usize,
    }

    impl MemStrip {
        fn new(n: usize) -> Self {
            Self {
                pixels: vec![OFF; n],
                brightness: 0,
                shows: 0,
            }
        }
    }

    impl LedStrip for MemStrip {
        type Error = Infallible;

        fn len(&self) -> usize {
            self.pixels.len()
        }

        fn set_pixel(&mut self, index: usize, color: Rgb888) {
            if let Some(p) = self.pixels.get_mut(index) {
                *p = color;
            }
        }

        fn set_brightness(&mut self, brightness: u8) {
            self.brightness = brightness;
        }

        fn show(&mut self) -> Result<(), Infallible> {
            self.shows += 1;
            Ok(())
        }
    }

    #[test]
    fn wheel_hits_primary_colours() {
        assert_eq!(wheel(0), Rgb888::new(255, 0, 0));
        assert_eq!(wheel(85), Rgb888::new(0, 255, 0));
        assert_eq!(wheel(170), Rgb888::new(0, 0, 255));
        assert_eq!(wheel(255), Rgb888::new(255, 0, 0));
    }

    #[test]
    fn rainbow_spreads_and_rotates() {
        let mut strip = MemStrip::new(3);
        let mut rainbow = Rainbow::new();
        rainbow.paint(&mut strip);
        assert_eq!(strip.pixels[0], wheel(0));
        assert_eq!(strip.pixels[1], wheel(85));
        assert_eq!(strip.pixels[2], wheel(170));

        rainbow.advance();
        assert_eq!(rainbow.hue(), 256);
        rainbow.paint(&mut strip);
        assert_eq!(strip.pixels[0], wheel(1));
    }

    #[test]
    fn rainbow_hue_wraps() {
        let mut rainbow = Rainbow::new();
        for _ in 0..256 {
            rainbow.advance();
        }
        assert_eq!(rainbow.hue(), 0);
    }

    #[test]
    fn pulse_is_a_triangle() {
        let mut pulse = Pulse::new(10, 30, 10);
        let levels: Vec<u8> = (0..6).map(|_| pulse.next_level()).collect();
        assert_eq!(levels, [20, 10, 20, 30, 20, 10]);
    }

    #[test]
    fn indicator_colours_follow_mode() {
        let colors = GameConfig::default().colors;
        let mut ind = Indicator::new(MemStrip::new(4), colors, 128);

        ind.set_mode(IndicatorMode::Ready).unwrap();
        assert!(ind.strip().pixels.iter().all(|p| *p == colors.ready));
        assert_eq!(ind.strip().brightness, 128);

        // no pulse outside a win
        assert!(!ind.pulse_step().unwrap());
        assert_eq!(ind.strip().shows, 1);
    }

    #[test]
    fn win_indicator_pulses_brightness() {
        let colors = GameConfig::default().colors;
        let mut ind = Indicator::new(MemStrip::new(4), colors, 128);
        ind.set_mode(IndicatorMode::Win).unwrap();

        assert!(ind.pulse_step().unwrap());
        assert_eq!(ind.strip().brightness, 120);
        for _ in 0..20 {
            ind.pulse_step().unwrap();
        }
        assert!(ind.strip().brightness >= PULSE_MIN);
        assert!(ind.strip().brightness <= 128);
        assert!(ind.strip().pixels.iter().all(|p| *p == colors.win));
    }
}

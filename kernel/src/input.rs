// Debounced contact inputs
//
// Three contacts, sampled every game tick:
//   left plate, right plate  start / finish pads
//   wire                     ring touching the wire (ends the game)
//
// Continuous time-based debounce: a new level is committed only after it
// has held unchanged for the whole window. The same window applies to all
// three contacts, the wire included. Pin read errors read as "not touching".

use embedded_hal::digital::InputPin;

use crate::config::Polarity;

pub const TOUCH_DEBOUNCE_MS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

/// Per-signal debounce state: last raw level, when it last changed, and
/// the committed stable level.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    raw: bool,
    raw_since: u64,
    stable: bool,
    window_ms: u32,
}

impl Debouncer {
    pub const fn new(window_ms: u32) -> Self {
        Self {
            raw: false,
            raw_since: 0,
            stable: false,
            window_ms,
        }
    }

    /// Feed one raw sample; returns the edge when the stable level flips.
    pub fn update(&mut self, raw: bool, now: u64) -> Option<Edge> {
        if raw != self.raw {
            self.raw = raw;
            self.raw_since = now;
        }

        if self.raw == self.stable {
            return None;
        }
        if now.saturating_sub(self.raw_since) < self.window_ms as u64 {
            return None;
        }

        self.stable = self.raw;
        Some(if self.stable {
            Edge::Rising
        } else {
            Edge::Falling
        })
    }

    #[inline]
    pub fn stable(&self) -> bool {
        self.stable
    }
}

/// One contact pin with its polarity and debounce state.
pub struct Contact<P> {
    pin: P,
    polarity: Polarity,
    debounce: Debouncer,
}

impl<P: InputPin> Contact<P> {
    pub fn new(pin: P, polarity: Polarity, debounce_ms: u32) -> Self {
        Self {
            pin,
            polarity,
            debounce: Debouncer::new(debounce_ms),
        }
    }

    /// Raw "touching" level, polarity applied.
    pub fn read_active(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(level) => self.polarity.is_active(level),
            Err(_) => false,
        }
    }

    /// Sample the pin and return the stable "touching" state.
    pub fn sample(&mut self, now: u64) -> bool {
        let active = self.read_active();
        if let Some(edge) = self.debounce.update(active, now) {
            log::trace!("contact {:?} at {}", edge, now);
        }
        self.debounce.stable()
    }
}

/// Debounced contact levels for one game tick, plus a touch event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inputs {
    pub left_plate: bool,
    pub right_plate: bool,
    pub wire: bool,
    /// Rising edge of the touch panel this tick.
    pub touch: bool,
}

pub struct ContactSampler<P> {
    left: Contact<P>,
    right: Contact<P>,
    wire: Contact<P>,
}

impl<P: InputPin> ContactSampler<P> {
    pub fn new(left: P, right: P, wire: P, polarity: Polarity, debounce_ms: u32) -> Self {
        Self {
            left: Contact::new(left, polarity, debounce_ms),
            right: Contact::new(right, polarity, debounce_ms),
            wire: Contact::new(wire, polarity, debounce_ms),
        }
    }

    pub fn sample(&mut self, now: u64) -> Inputs {
        Inputs {
            left_plate: self.left.sample(now),
            right_plate: self.right.sample(now),
            wire: self.wire.sample(now),
            touch: false,
        }
    }
}

/// Single "is touched" signal, used to gate restart in the touch variant.
pub trait TouchSensor {
    fn is_touched(&mut self) -> bool;
}

/// No touch hardware: never touched.
impl<T: TouchSensor> TouchSensor for Option<T> {
    fn is_touched(&mut self) -> bool {
        self.as_mut().is_some_and(|t| t.is_touched())
    }
}

/// Turns a raw touch level into debounced press events.
pub struct TouchGate<T> {
    sensor: T,
    debounce: Debouncer,
}

impl<T: TouchSensor> TouchGate<T> {
    pub fn new(sensor: T) -> Self {
        Self {
            sensor,
            debounce: Debouncer::new(TOUCH_DEBOUNCE_MS),
        }
    }

    /// True once per confirmed press.
    pub fn poll(&mut self, now: u64) -> bool {
        let raw = self.sensor.is_touched();
        matches!(self.debounce.update(raw, now), Some(Edge::Rising))
    }

    pub fn sensor_mut(&mut self) -> &mut T {
        &mut self.sensor
    }
}

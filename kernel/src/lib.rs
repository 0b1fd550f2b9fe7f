// Game kernel for the buzz-wire exhibit (ESP32-S3 + 3.5" LCD)
//
// Everything here is board independent: the game state machine, contact
// debouncing, the job scheduler, region rendering and the chip drivers
// that only need embedded-hal / embedded-io. The firmware crate wires
// these to esp-hal peripherals; the host test suite wires them to fakes.

#![cfg_attr(not(test), no_std)]

pub mod audio;
pub mod cadence;
pub mod config;
pub mod drivers;
pub mod effect;
pub mod exhibit;
pub mod game;
pub mod input;
pub mod led;
pub mod present;
pub mod render;
pub mod scheduler;
pub mod stack_fmt;

pub use config::GameConfig;
pub use exhibit::{Exhibit, Hardware};
pub use game::{Game, GameState, Side};
pub use scheduler::{Job, Scheduler};

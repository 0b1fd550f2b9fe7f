#![no_std]

pub mod board;
pub mod drivers;
pub mod wake;

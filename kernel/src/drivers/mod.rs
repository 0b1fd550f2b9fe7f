// Chip drivers that only need embedded-hal / embedded-io traits.
//
// Board independent; pin and bus wiring lives in the firmware's board/.

pub mod dfplayer;
pub mod sk9822;
pub mod tca9554;

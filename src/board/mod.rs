//! Waveshare ESP32-S3 3.5" touch LCD board support for the buzz-wire cabinet.
//!
//! Maps the physical hardware to the kernel's seams so the game code never
//! sees a GPIO number. The display and the I/O expander are critical: if
//! either fails the exhibit must not run. The DFPlayer is optional and the
//! game runs silent without it.

pub mod pins;

use core::fmt;

use buzz_kernel::config::{GameConfig, Polarity};
use buzz_kernel::drivers::dfplayer::{self, DfPlayer};
use buzz_kernel::drivers::sk9822::Sk9822;
use buzz_kernel::drivers::tca9554::{
    self, PIN_LCD_RESET, PIN_TOUCH_INT, Tca9554, Tca9554Error, TouchLine,
};
use buzz_kernel::render::BandRenderer;
use buzz_kernel::{Exhibit, Hardware};
use esp_hal::{
    Blocking,
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, OutputPin, Pull},
    i2c::master::{self as i2c, I2c},
    peripherals::Peripherals,
    spi::{
        self,
        master::{self as spi_master, Spi},
    },
    time::Rate,
    uart::{self, Uart},
};

use log::{info, warn};

use crate::drivers::axs15231b::{Axs15231b, PanelError, SPI_FREQ_MHZ};

const I2C_FREQ_KHZ: u32 = 400;

// Type Aliases
pub type Contact = Input<'static>;
pub type Strip = Sk9822<Output<'static>, Output<'static>>;
pub type Touch = TouchLine<I2c<'static, Blocking>>;
pub type Lcd = BandRenderer<Axs15231b>;
pub type Player = Option<DfPlayer<Uart<'static, Blocking>>>;

pub const DECORATIVE_STRIPS: usize = 3;

pub type BoardHardware = Hardware<Contact, Lcd, Player, Strip, Touch, DECORATIVE_STRIPS>;
pub type BoardExhibit = Exhibit<Contact, Lcd, Player, Strip, Touch, DECORATIVE_STRIPS>;

#[derive(Debug)]
pub enum BoardError {
    I2cConfig(i2c::ConfigError),
    SpiConfig(spi_master::ConfigError),
    Expander(Tca9554Error<i2c::Error>),
    Panel(PanelError),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::I2cConfig(e) => write!(f, "i2c config: {:?}", e),
            BoardError::SpiConfig(e) => write!(f, "qspi config: {:?}", e),
            BoardError::Expander(e) => write!(f, "tca9554: {}", e),
            BoardError::Panel(e) => write!(f, "lcd: {}", e),
        }
    }
}

impl From<Tca9554Error<i2c::Error>> for BoardError {
    fn from(e: Tca9554Error<i2c::Error>) -> Self {
        BoardError::Expander(e)
    }
}

impl From<PanelError> for BoardError {
    fn from(e: PanelError) -> Self {
        BoardError::Panel(e)
    }
}

// Hardware Bundles
/// Three contacts, pulled to the idle level of the configured polarity.
pub struct ContactHw {
    pub left: Contact,
    pub right: Contact,
    pub wire: Contact,
}

pub struct LedHw {
    pub indicator: Strip,
    pub strips: [Strip; DECORATIVE_STRIPS],
}

/// Complete board hardware, initialized and ready for the exhibit.
pub struct Board {
    pub contacts: ContactHw,
    pub display: Lcd,
    pub touch: Touch,
    pub audio: Player,
    pub leds: LedHw,
}

impl Board {
    pub fn init(
        p: Peripherals,
        config: &GameConfig,
        delay: &mut Delay,
    ) -> Result<Self, BoardError> {
        // idle level opposite to the contact level
        let pull = match config.polarity {
            Polarity::ActiveHigh => Pull::Down,
            Polarity::ActiveLow => Pull::Up,
        };
        let input_cfg = InputConfig::default().with_pull(pull);
        let contacts = ContactHw {
            left: Input::new(p.GPIO21, input_cfg),
            right: Input::new(p.GPIO9, input_cfg),
            wire: Input::new(p.GPIO10, input_cfg),
        };

        let strip_len = config.strip_leds as usize;
        let leds = LedHw {
            indicator: strip(p.GPIO17, p.GPIO18, config.indicator_leds as usize),
            strips: [
                strip(p.GPIO38, p.GPIO39, strip_len),
                strip(p.GPIO40, p.GPIO41, strip_len),
                strip(p.GPIO42, p.GPIO45, strip_len),
            ],
        };

        let i2c_cfg = i2c::Config::default().with_frequency(Rate::from_khz(I2C_FREQ_KHZ));
        let bus = I2c::new(p.I2C0, i2c_cfg)
            .map_err(BoardError::I2cConfig)?
            .with_sda(p.GPIO8)
            .with_scl(p.GPIO7);
        let mut expander = Tca9554::new(bus, tca9554::DEFAULT_ADDR);
        expander.probe()?;
        expander.reset_pulse(PIN_LCD_RESET, delay)?;
        let touch = TouchLine::new(expander, PIN_TOUCH_INT)?;
        info!("board: tca9554 at {:#04x}", tca9554::DEFAULT_ADDR);

        let backlight = Output::new(p.GPIO6, Level::Low, OutputConfig::default());
        let spi_cfg = spi_master::Config::default()
            .with_frequency(Rate::from_mhz(SPI_FREQ_MHZ))
            .with_mode(spi::Mode::_0);
        let qspi = Spi::new(p.SPI2, spi_cfg)
            .map_err(BoardError::SpiConfig)?
            .with_sck(p.GPIO5)
            .with_cs(p.GPIO12)
            .with_sio0(p.GPIO1)
            .with_sio1(p.GPIO2)
            .with_sio2(p.GPIO3)
            .with_sio3(p.GPIO4);
        let mut panel = Axs15231b::new(qspi, backlight);
        panel.init(delay)?;
        let display = BandRenderer::new(panel);

        let audio = match Uart::new(
            p.UART1,
            uart::Config::default().with_baudrate(dfplayer::BAUD),
        ) {
            Ok(uart) => init_player(uart.with_rx(p.GPIO47).with_tx(p.GPIO48), config, delay),
            Err(e) => {
                warn!("board: dfplayer uart: {:?}, running silent", e);
                None
            }
        };

        Ok(Board {
            contacts,
            display,
            touch,
            audio,
            leds,
        })
    }

    pub fn into_hardware(self) -> BoardHardware {
        Hardware {
            left_plate: self.contacts.left,
            right_plate: self.contacts.right,
            wire: self.contacts.wire,
            touch: self.touch,
            screen: self.display,
            audio: self.audio,
            indicator: self.leds.indicator,
            strips: self.leds.strips,
        }
    }
}

fn strip(data: impl OutputPin + 'static, clock: impl OutputPin + 'static, len: usize) -> Strip {
    Sk9822::new(
        Output::new(data, Level::Low, OutputConfig::default()),
        Output::new(clock, Level::Low, OutputConfig::default()),
        len,
    )
}

fn init_player(uart: Uart<'static, Blocking>, config: &GameConfig, delay: &mut Delay) -> Player {
    let mut player = DfPlayer::new(uart, config.clips, config.volume);
    match player.init(delay) {
        Ok(()) => {
            info!("board: dfplayer ready, volume {}", player.volume());
            Some(player)
        }
        Err(e) => {
            warn!("board: dfplayer: {}, running silent", e);
            None
        }
    }
}

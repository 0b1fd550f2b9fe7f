// Whole-exhibit runs on the host: fake contact pins, a recording screen,
// a recording audio player and in-memory strips, ticked like the firmware
// timer does (every 5 ms).

use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;

use buzz_kernel::audio::AudioOut;
use buzz_kernel::cadence::BASE_TICK_MS;
use buzz_kernel::config::{Polarity, Preset};
use buzz_kernel::effect::Clip;
use buzz_kernel::input::TouchSensor;
use buzz_kernel::led::LedStrip;
use buzz_kernel::render::{Region, Screen, TextStyle};
use buzz_kernel::{Exhibit, GameConfig, GameState, Hardware, Side};
use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin};

#[derive(Clone)]
struct Pin(Rc<Cell<bool>>);

impl Pin {
    fn new(level: bool) -> Self {
        Self(Rc::new(Cell::new(level)))
    }

    fn set(&self, level: bool) {
        self.0.set(level);
    }
}

impl ErrorType for Pin {
    type Error = Infallible;
}

impl InputPin for Pin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }
}

struct Touch(Rc<Cell<bool>>);

impl TouchSensor for Touch {
    fn is_touched(&mut self) -> bool {
        self.0.get()
    }
}

#[derive(Default)]
struct TextLog {
    texts: Vec<String>,
    fills: usize,
}

impl Screen for TextLog {
    type Error = Infallible;

    fn fill(&mut self, _region: Region, _color: Rgb565) -> Result<(), Infallible> {
        self.fills += 1;
        Ok(())
    }

    fn text(&mut self, _region: Region, text: &str, _style: TextStyle) -> Result<(), Infallible> {
        self.texts.push(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct Player {
    played: Vec<Clip>,
    pumps: usize,
}

impl AudioOut for Player {
    type Error = Infallible;

    fn play(&mut self, clip: Clip) -> Result<(), Infallible> {
        self.played.push(clip);
        Ok(())
    }

    fn pump(&mut self) -> Result<(), Infallible> {
        self.pumps += 1;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        false
    }
}

struct Strip {
    pixels: [Rgb888; 6],
    shows: usize,
}

impl Strip {
    fn new() -> Self {
        Self {
            pixels: [Rgb888::new(0, 0, 0); 6],
            shows: 0,
        }
    }
}

impl LedStrip for Strip {
    type Error = Infallible;

    fn len(&self) -> usize {
        self.pixels.len()
    }

    fn set_pixel(&mut self, index: usize, color: Rgb888) {
        if let Some(p) = self.pixels.get_mut(index) {
            *p = color;
        }
    }

    fn set_brightness(&mut self, _brightness: u8) {}

    fn show(&mut self) -> Result<(), Infallible> {
        self.shows += 1;
        Ok(())
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

struct Rig {
    exhibit: Exhibit<Pin, TextLog, Player, Strip, Touch, 2>,
    left: Pin,
    right: Pin,
    wire: Pin,
    touch: Rc<Cell<bool>>,
    idle_level: bool,
    now: u64,
}

impl Rig {
    fn new(preset: Preset) -> Self {
        let config = GameConfig::preset(preset);
        let idle_level = !config.polarity.active_level();
        let left = Pin::new(idle_level);
        let right = Pin::new(idle_level);
        let wire = Pin::new(idle_level);
        let touch = Rc::new(Cell::new(false));

        let hw = Hardware {
            left_plate: left.clone(),
            right_plate: right.clone(),
            wire: wire.clone(),
            touch: Touch(touch.clone()),
            screen: TextLog::default(),
            audio: Player::default(),
            indicator: Strip::new(),
            strips: [Strip::new(), Strip::new()],
        };
        let mut exhibit = Exhibit::new(config, hw, 0);
        exhibit.boot(&mut NoDelay).unwrap();

        Self {
            exhibit,
            left,
            right,
            wire,
            touch,
            idle_level,
            now: 0,
        }
    }

    fn contact(&self, pin: &Pin, touching: bool) {
        pin.set(if touching { !self.idle_level } else { self.idle_level });
    }

    fn run_for(&mut self, ms: u64) {
        let end = self.now + ms;
        while self.now < end {
            self.exhibit.tick(self.now);
            self.now += BASE_TICK_MS as u64;
        }
    }

    fn state(&self) -> GameState {
        self.exhibit.state()
    }

    fn texts(&self) -> &[String] {
        &self.exhibit.presenter().screen().texts
    }

    fn played(&self) -> &[Clip] {
        &self.exhibit.presenter().audio().played
    }

    // rest on the left plate, then lift off
    fn start_left(&mut self) {
        self.contact(&self.left, true);
        self.run_for(50);
        assert_eq!(self.state(), GameState::ReadyLeft);
        self.contact(&self.left, false);
        self.run_for(50);
        assert_eq!(self.state(), GameState::Running);
    }
}

#[test]
fn boot_runs_self_test_and_splash() {
    let rig = Rig::new(Preset::Classic);
    let screen = rig.exhibit.presenter().screen();
    // red, green, blue, splash background
    assert_eq!(screen.fills, 4);
    assert!(rig.texts().iter().any(|t| t == "BUZZ WIRE"));
    assert_eq!(rig.state(), GameState::AwaitingStart);
}

#[test]
fn plate_held_past_debounce_arms_game() {
    let mut rig = Rig::new(Preset::Classic);
    rig.contact(&rig.left, true);
    rig.run_for(20);
    assert_eq!(rig.state(), GameState::AwaitingStart);
    rig.run_for(30);
    assert_eq!(rig.state(), GameState::ReadyLeft);
    assert_eq!(rig.exhibit.game().start_side(), Some(Side::Left));
}

#[test]
fn full_cycle_win_then_auto_restart() {
    let mut rig = Rig::new(Preset::Classic);
    rig.start_left();

    rig.run_for(5_000);
    assert_eq!(rig.state(), GameState::Running);
    assert!(rig.texts().iter().any(|t| t == "58.0"));

    rig.contact(&rig.right, true);
    rig.run_for(50);
    assert_eq!(rig.state(), GameState::Won);
    assert_eq!(rig.played(), [Clip::Win]);
    assert!(rig.texts().iter().any(|t| t == "GAGNE !"));
    // 5 s of play plus the debounce windows around it
    let elapsed = rig.exhibit.game().elapsed_ms();
    assert!((5_000..=5_100).contains(&elapsed));

    rig.contact(&rig.right, false);
    rig.run_for(6_900);
    assert_eq!(rig.state(), GameState::Won);
    rig.run_for(200);
    assert_eq!(rig.state(), GameState::AwaitingStart);
    assert_eq!(rig.exhibit.game().start_side(), None);
    assert_eq!(rig.texts().last().map(String::as_str), Some("Ne touchez pas le fil !"));
}

#[test]
fn right_start_wins_on_left_plate() {
    let mut rig = Rig::new(Preset::Classic);
    rig.contact(&rig.right, true);
    rig.run_for(50);
    assert_eq!(rig.state(), GameState::ReadyRight);
    rig.contact(&rig.right, false);
    rig.run_for(50);
    assert_eq!(rig.state(), GameState::Running);
    assert_eq!(rig.exhibit.game().start_side(), Some(Side::Right));

    rig.run_for(1_000);
    rig.contact(&rig.right, true);
    rig.run_for(100);
    assert_eq!(rig.state(), GameState::Running);
    rig.contact(&rig.right, false);
    rig.run_for(100);

    rig.contact(&rig.left, true);
    rig.run_for(50);
    assert_eq!(rig.state(), GameState::Won);
    assert_eq!(rig.played(), [Clip::Win]);
}

#[test]
fn wire_bounce_is_filtered_but_real_touch_loses() {
    let mut rig = Rig::new(Preset::Classic);
    rig.start_left();

    // 15 ms spark on the wire
    rig.contact(&rig.wire, true);
    rig.run_for(15);
    rig.contact(&rig.wire, false);
    rig.run_for(100);
    assert_eq!(rig.state(), GameState::Running);

    rig.contact(&rig.wire, true);
    rig.run_for(50);
    assert_eq!(rig.state(), GameState::Lost);
    assert_eq!(rig.played(), [Clip::Lose]);
}

#[test]
fn touching_wire_on_arrival_is_a_loss() {
    let mut rig = Rig::new(Preset::Classic);
    rig.start_left();
    rig.run_for(1_000);

    rig.contact(&rig.wire, true);
    rig.contact(&rig.right, true);
    rig.run_for(50);
    assert_eq!(rig.state(), GameState::Lost);
    assert!(!rig.played().contains(&Clip::Win));
}

#[test]
fn untouched_run_times_out() {
    let mut rig = Rig::new(Preset::Classic);
    rig.start_left();
    rig.run_for(59_900);
    assert_eq!(rig.state(), GameState::Running);
    rig.run_for(200);
    assert_eq!(rig.state(), GameState::TimedOut);
    assert_eq!(rig.played(), [Clip::Timeout]);
    assert!(rig.texts().iter().any(|t| t == "TEMPS ECOULE"));
}

#[test]
fn touch_preset_restarts_on_tap() {
    let mut rig = Rig::new(Preset::Touch);
    rig.start_left();
    rig.contact(&rig.wire, true);
    rig.run_for(50);
    assert_eq!(rig.state(), GameState::Lost);
    rig.contact(&rig.wire, false);

    rig.run_for(1_000);
    assert_eq!(rig.state(), GameState::Lost);
    rig.touch.set(true);
    rig.run_for(60);
    assert_eq!(rig.state(), GameState::AwaitingStart);
}

#[test]
fn pullup_preset_reads_low_as_contact() {
    let mut rig = Rig::new(Preset::Pullup);
    assert_eq!(rig.exhibit.config().polarity, Polarity::ActiveLow);
    // all lines idle high: nothing happens
    rig.run_for(500);
    assert_eq!(rig.state(), GameState::AwaitingStart);

    rig.start_left();
    rig.contact(&rig.right, true);
    rig.run_for(50);
    assert_eq!(rig.state(), GameState::Won);
}

#[test]
fn animation_and_audio_run_in_every_state() {
    let mut rig = Rig::new(Preset::Classic);
    rig.run_for(100);
    let shows = rig.exhibit.strips()[0].shows;
    assert_eq!(shows, 20);
    assert_eq!(rig.exhibit.presenter().audio().pumps, 20);

    rig.start_left();
    rig.run_for(100);
    assert_eq!(rig.exhibit.strips()[1].shows, 20 + 20 + 20);
    assert_ne!(rig.exhibit.strips()[0].pixels[0], Rgb888::new(0, 0, 0));
}

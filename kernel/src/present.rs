// Presentation layer: applies game effects to the screen, the audio
// player and the indicator strip.
//
// Screen layout (480x320 landscape):
//   HEADER   0..60     title
//   COUNTER  90..210   big SS.s counter
//   MESSAGE  240..290  one line of instructions
//   FOOTER   290..320  hint
//
// Runtime driver errors are logged and swallowed: the game keeps running
// without sound or light. The countdown only redraws when the displayed
// tenth of a second changes.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_hal::delay::DelayNs;

use crate::audio::AudioOut;
use crate::effect::{Clip, Effect, IndicatorMode, View};
use crate::game::Side;
use crate::led::{Indicator, LedStrip};
use crate::render::{Alignment, Region, Screen, TextSize, TextStyle, palette};
use crate::stack_fmt::{StackFmt, tenths, write_seconds};

pub const HEADER: Region = Region::new(0, 0, 480, 60);
pub const COUNTER: Region = Region::new(0, 90, 480, 120);
pub const MESSAGE: Region = Region::new(0, 240, 480, 50);
pub const FOOTER: Region = Region::new(0, 290, 480, 30);

/// Below this the counter turns red.
const HURRY_MS: u64 = 10_000;
const SELF_TEST_MS: u32 = 300;

const TITLE: &str = "BUZZ WIRE";
const HINT: &str = "Ne touchez pas le fil !";

pub struct Presenter<D, A, S> {
    screen: D,
    audio: A,
    indicator: Indicator<S>,
    timeout_ms: u64,
    last_tenths: Option<u64>,
    audio_fault: bool,
}

impl<D, A, S> Presenter<D, A, S>
where
    D: Screen,
    A: AudioOut,
    S: LedStrip,
{
    pub fn new(screen: D, audio: A, indicator: Indicator<S>, timeout_ms: u64) -> Self {
        Self {
            screen,
            audio,
            indicator,
            timeout_ms,
            last_tenths: None,
            audio_fault: false,
        }
    }

    pub fn screen(&self) -> &D {
        &self.screen
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn indicator(&self) -> &Indicator<S> {
        &self.indicator
    }

    /// Red, green, blue full-screen fills; proves the panel is alive.
    pub fn self_test<T: DelayNs>(&mut self, delay: &mut T) -> Result<(), D::Error> {
        for color in [palette::RED, palette::GREEN, palette::BLUE] {
            self.screen.clear(color)?;
            self.screen.flush()?;
            delay.delay_ms(SELF_TEST_MS);
        }
        Ok(())
    }

    pub fn splash(&mut self) -> Result<(), D::Error> {
        let bg = palette::SPARKOH;
        self.screen.clear(bg)?;
        self.screen.text(
            HEADER,
            "SPARKOH!",
            TextStyle::new(TextSize::Title, palette::WHITE, bg),
        )?;
        self.screen.text(
            COUNTER,
            TITLE,
            TextStyle::new(TextSize::Title, palette::YELLOW, bg),
        )?;
        self.screen.text(
            FOOTER,
            concat!("v", env!("CARGO_PKG_VERSION")),
            TextStyle::new(TextSize::Body, palette::CYAN, bg),
        )?;
        self.screen.flush()
    }

    pub fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::PlayClip(clip) => self.play(clip),
            Effect::SetIndicator(mode) => self.set_indicator(mode),
            Effect::Render(view) => {
                if let Err(e) = self.render(view) {
                    log::warn!("present: render {:?} failed: {:?}", view, e);
                }
            }
        }
    }

    fn play(&mut self, clip: Clip) {
        if let Err(e) = self.audio.play(clip) {
            log::warn!("present: clip {} failed: {:?}", clip, e);
        }
    }

    fn set_indicator(&mut self, mode: IndicatorMode) {
        if let Err(e) = self.indicator.set_mode(mode) {
            log::warn!("present: indicator {:?} failed: {:?}", mode, e);
        }
    }

    pub fn pump_audio(&mut self) {
        match self.audio.pump() {
            Ok(()) => self.audio_fault = false,
            Err(e) => {
                if !self.audio_fault {
                    log::warn!("present: audio pump failed: {:?}", e);
                }
                self.audio_fault = true;
            }
        }
    }

    pub fn pulse_indicator(&mut self) {
        if let Err(e) = self.indicator.pulse_step() {
            log::warn!("present: indicator pulse failed: {:?}", e);
        }
    }

    pub fn render(&mut self, view: View) -> Result<(), D::Error> {
        match view {
            View::Idle => self.idle()?,
            View::Ready(side) => self.ready(side)?,
            View::Playfield => self.playfield()?,
            View::Countdown { remaining_ms } => {
                if !self.countdown(remaining_ms)? {
                    return Ok(());
                }
            }
            View::Won { elapsed_ms } => {
                self.result("GAGNE !", "Bravo !", palette::GREEN, elapsed_ms)?
            }
            View::Lost { elapsed_ms } => {
                self.result("PERDU !", "Vous avez touche le fil", palette::RED, elapsed_ms)?
            }
            View::TimedOut { elapsed_ms } => {
                self.result("TEMPS ECOULE", "Trop lent !", palette::ORANGE, elapsed_ms)?
            }
        }
        self.screen.flush()
    }

    fn idle(&mut self) -> Result<(), D::Error> {
        let bg = palette::SPARKOH;
        self.last_tenths = None;
        self.screen.clear(bg)?;
        self.screen
            .text(HEADER, TITLE, TextStyle::new(TextSize::Title, palette::WHITE, bg))?;
        self.screen.text(
            MESSAGE,
            "Posez l'anneau !",
            TextStyle::new(TextSize::Title, palette::YELLOW, bg),
        )?;
        self.screen
            .text(FOOTER, HINT, TextStyle::new(TextSize::Body, palette::WHITE, bg))
    }

    fn ready(&mut self, side: Side) -> Result<(), D::Error> {
        let bg = palette::SPARKOH;
        // ring rests on `side`, the finish is across
        let (text, align) = match side.opposite() {
            Side::Right => ("Allez a droite ->", Alignment::CenterRight),
            Side::Left => ("<- Allez a gauche", Alignment::CenterLeft),
        };
        self.draw_seconds(self.timeout_ms, palette::WHITE, bg)?;
        self.screen.text(
            MESSAGE,
            text,
            TextStyle::new(TextSize::Title, palette::ORANGE, bg).aligned(align),
        )
    }

    fn playfield(&mut self) -> Result<(), D::Error> {
        let bg = palette::BLACK;
        self.last_tenths = None;
        self.screen.clear(bg)?;
        self.screen
            .text(HEADER, TITLE, TextStyle::new(TextSize::Title, palette::WHITE, bg))?;
        self.screen.text(
            MESSAGE,
            "C'est parti !",
            TextStyle::new(TextSize::Title, palette::GREEN, bg),
        )?;
        self.screen
            .text(FOOTER, HINT, TextStyle::new(TextSize::Body, palette::WHITE, bg))
    }

    // Returns false when the shown value did not change.
    fn countdown(&mut self, remaining_ms: u64) -> Result<bool, D::Error> {
        let t = tenths(remaining_ms);
        if self.last_tenths == Some(t) {
            return Ok(false);
        }
        self.last_tenths = Some(t);
        let fg = if remaining_ms < HURRY_MS {
            palette::RED
        } else {
            palette::YELLOW
        };
        self.draw_seconds(remaining_ms, fg, palette::BLACK)?;
        Ok(true)
    }

    fn result(
        &mut self,
        title: &str,
        message: &str,
        bg: Rgb565,
        elapsed_ms: u64,
    ) -> Result<(), D::Error> {
        self.last_tenths = None;
        self.screen.clear(bg)?;
        self.screen
            .text(HEADER, title, TextStyle::new(TextSize::Title, palette::WHITE, bg))?;
        self.draw_seconds(elapsed_ms, palette::WHITE, bg)?;
        self.screen
            .text(MESSAGE, message, TextStyle::new(TextSize::Title, palette::BLACK, bg))
    }

    fn draw_seconds(&mut self, ms: u64, fg: Rgb565, bg: Rgb565) -> Result<(), D::Error> {
        let mut buf: StackFmt<12> = StackFmt::new();
        let _ = write_seconds(&mut buf, ms);
        self.screen
            .text(COUNTER, buf.as_str(), TextStyle::new(TextSize::Counter, fg, bg))
    }
}

// The exhibit: every peripheral plus the game, owned by one struct that
// the run loop ticks. Nothing here is global.
//
// Each tick queues the jobs whose cadence is due and drains the queue by
// priority. The audio pump runs every tick. The game steps at
// `game_tick_ms`. The decorative rainbow runs on its own interval and
// never looks at the game state.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

use crate::audio::AudioOut;
use crate::cadence::Interval;
use crate::config::GameConfig;
use crate::effect::{Effect, IndicatorMode};
use crate::game::{Game, GameState};
use crate::input::{ContactSampler, TouchGate, TouchSensor};
use crate::led::{Indicator, LedStrip, Rainbow};
use crate::present::Presenter;
use crate::render::Screen;
use crate::scheduler::{Job, Scheduler};

/// Peripherals handed over by the board at boot.
pub struct Hardware<C, D, A, S, T, const N: usize> {
    pub left_plate: C,
    pub right_plate: C,
    pub wire: C,
    pub touch: T,
    pub screen: D,
    pub audio: A,
    pub indicator: S,
    pub strips: [S; N],
}

pub struct Exhibit<C, D, A, S, T, const N: usize> {
    config: GameConfig,
    sampler: ContactSampler<C>,
    touch: TouchGate<T>,
    game: Game,
    presenter: Presenter<D, A, S>,
    strips: [S; N],
    rainbow: Rainbow,
    scheduler: Scheduler,
    game_tick: Interval,
    animation: Interval,
    pulse: Interval,
    strip_fault: bool,
}

impl<C, D, A, S, T, const N: usize> Exhibit<C, D, A, S, T, N>
where
    C: InputPin,
    D: Screen,
    A: AudioOut,
    S: LedStrip,
    T: TouchSensor,
{
    pub fn new(config: GameConfig, hw: Hardware<C, D, A, S, T, N>, now: u64) -> Self {
        let Hardware {
            left_plate,
            right_plate,
            wire,
            touch,
            screen,
            audio,
            indicator,
            mut strips,
        } = hw;

        for strip in strips.iter_mut() {
            strip.set_brightness(config.brightness);
        }
        let indicator = Indicator::new(indicator, config.colors, config.brightness);

        Self {
            sampler: ContactSampler::new(
                left_plate,
                right_plate,
                wire,
                config.polarity,
                config.debounce_ms,
            ),
            touch: TouchGate::new(touch),
            game: Game::new(&config, now),
            presenter: Presenter::new(screen, audio, indicator, config.timeout_ms as u64),
            strips,
            rainbow: Rainbow::new(),
            scheduler: Scheduler::new(),
            game_tick: Interval::new(config.game_tick_ms, now),
            animation: Interval::new(config.animation_ms, now),
            pulse: Interval::new(config.pulse_step_ms, now),
            strip_fault: false,
            config,
        }
    }

    /// Panel self-test, splash, indicator to idle. A screen error here is fatal.
    pub fn boot<W: DelayNs>(&mut self, delay: &mut W) -> Result<(), D::Error> {
        log::info!(
            "exhibit: boot, preset {} ({:?}, debounce {} ms, timeout {} ms, restart {:?} {} ms)",
            self.config.preset,
            self.config.polarity,
            self.config.debounce_ms,
            self.config.timeout_ms,
            self.config.restart,
            self.config.restart_delay_ms,
        );
        self.presenter.self_test(delay)?;
        self.presenter.splash()?;
        self.presenter.apply(Effect::SetIndicator(IndicatorMode::Idle));
        Ok(())
    }

    pub fn tick(&mut self, now: u64) {
        self.schedule(Job::PumpAudio);
        if self.game_tick.due(now) {
            self.schedule(Job::StepGame);
        }
        if self.pulse.due(now) {
            self.schedule(Job::PulseIndicator);
        }
        if self.animation.due(now) {
            self.schedule(Job::Animate);
        }

        while let Some(job) = self.scheduler.pop() {
            self.run(job, now);
        }
    }

    fn schedule(&mut self, job: Job) {
        if let Err(e) = self.scheduler.push_unique(job) {
            log::warn!("exhibit: {}", e);
        }
    }

    fn run(&mut self, job: Job, now: u64) {
        match job {
            Job::PumpAudio => self.presenter.pump_audio(),
            Job::StepGame => self.step_game(now),
            Job::PulseIndicator => self.presenter.pulse_indicator(),
            Job::Animate => self.animate(),
        }
    }

    fn step_game(&mut self, now: u64) {
        let mut inputs = self.sampler.sample(now);
        inputs.touch = self.touch.poll(now);
        let effects = self.game.advance(now, inputs);
        for effect in effects.iter() {
            self.presenter.apply(effect);
        }
    }

    fn animate(&mut self) {
        let mut failed = false;
        for strip in self.strips.iter_mut() {
            self.rainbow.paint(strip);
            if let Err(e) = strip.show() {
                if !self.strip_fault {
                    log::warn!("exhibit: strip write failed: {:?}", e);
                }
                failed = true;
            }
        }
        self.strip_fault = failed;
        self.rainbow.advance();
    }

    pub fn state(&self) -> GameState {
        self.game.state()
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn presenter(&self) -> &Presenter<D, A, S> {
        &self.presenter
    }

    pub fn strips(&self) -> &[S; N] {
        &self.strips
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

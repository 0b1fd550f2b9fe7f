// Buzz-wire game state machine
//
//   AwaitingStart --plate--> ReadyLeft/Right --plate released--> Running
//   Running --wire--> Lost | --timeout--> TimedOut | --other plate--> Won
//   Won/Lost/TimedOut --restart delay or touch--> AwaitingStart
//
// `advance` is pure: it reads debounced inputs and a monotonic timestamp
// and returns the effects to apply. In Running the checks run in a fixed
// order (wire, timeout, finish plate) so touching the wire on arrival is
// a loss. Elapsed time is always now - run start, never accumulated.

use core::fmt;

use crate::config::{GameConfig, RestartPolicy};
use crate::effect::{Clip, Effect, Effects, IndicatorMode, View};
use crate::input::Inputs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    AwaitingStart,
    ReadyLeft,
    ReadyRight,
    Running,
    Won,
    Lost,
    TimedOut,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameState::AwaitingStart => "AwaitingStart",
            GameState::ReadyLeft => "ReadyLeft",
            GameState::ReadyRight => "ReadyRight",
            GameState::Running => "Running",
            GameState::Won => "Won",
            GameState::Lost => "Lost",
            GameState::TimedOut => "TimedOut",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The plate that finishes a run started from this side.
    pub const fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    fn plate(self, inputs: &Inputs) -> bool {
        match self {
            Side::Left => inputs.left_plate,
            Side::Right => inputs.right_plate,
        }
    }
}

/// The time limits the machine needs out of `GameConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub timeout_ms: u64,
    pub restart_delay_ms: u64,
    pub restart: RestartPolicy,
    pub abandon_ms: u64,
    pub countdown_refresh_ms: u64,
}

impl From<&GameConfig> for Timing {
    fn from(c: &GameConfig) -> Self {
        Self {
            timeout_ms: c.timeout_ms as u64,
            restart_delay_ms: c.restart_delay_ms as u64,
            restart: c.restart,
            abandon_ms: c.abandon_ms as u64,
            countdown_refresh_ms: c.countdown_refresh_ms as u64,
        }
    }
}

pub struct Game {
    state: GameState,
    timing: Timing,
    start_side: Option<Side>,
    run_started_at: u64,
    elapsed_ms: u64,
    result_since: u64,
    awaiting_since: u64,
    idle_prompted: bool,
    countdown_at: u64,
}

impl Game {
    pub fn new(config: &GameConfig, now: u64) -> Self {
        Self {
            state: GameState::AwaitingStart,
            timing: Timing::from(config),
            start_side: None,
            run_started_at: 0,
            elapsed_ms: 0,
            result_since: 0,
            awaiting_since: now,
            idle_prompted: false,
            countdown_at: 0,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn start_side(&self) -> Option<Side> {
        self.start_side
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// When the current result screen appeared (0 outside result states).
    pub fn result_since(&self) -> u64 {
        self.result_since
    }

    /// One step of the machine.
    pub fn advance(&mut self, now: u64, inputs: Inputs) -> Effects {
        match self.state {
            GameState::AwaitingStart => self.awaiting(now, &inputs),
            GameState::ReadyLeft => self.ready(now, &inputs, Side::Left),
            GameState::ReadyRight => self.ready(now, &inputs, Side::Right),
            GameState::Running => self.running(now, &inputs),
            GameState::Won | GameState::Lost | GameState::TimedOut => self.result(now, &inputs),
        }
    }

    fn enter(&mut self, next: GameState) {
        log::info!("game: {} -> {}", self.state, next);
        self.state = next;
    }

    fn awaiting(&mut self, now: u64, inputs: &Inputs) -> Effects {
        // left plate wins a tie
        let side = if inputs.left_plate {
            Side::Left
        } else if inputs.right_plate {
            Side::Right
        } else {
            if !self.idle_prompted
                && now.saturating_sub(self.awaiting_since) >= self.timing.abandon_ms
            {
                self.idle_prompted = true;
                return Effects::none()
                    .with(Effect::SetIndicator(IndicatorMode::Idle))
                    .with(Effect::Render(View::Idle));
            }
            return Effects::none();
        };

        self.start_side = Some(side);
        self.enter(match side {
            Side::Left => GameState::ReadyLeft,
            Side::Right => GameState::ReadyRight,
        });
        Effects::none()
            .with(Effect::SetIndicator(IndicatorMode::Ready))
            .with(Effect::Render(View::Ready(side)))
    }

    fn ready(&mut self, now: u64, inputs: &Inputs, side: Side) -> Effects {
        if side.plate(inputs) {
            return Effects::none();
        }

        self.enter(GameState::Running);
        self.run_started_at = now;
        self.elapsed_ms = 0;
        self.countdown_at = now;
        log::debug!("game: run from {:?} started at {}", side, now);
        Effects::none()
            .with(Effect::Render(View::Playfield))
            .with(Effect::Render(View::Countdown {
                remaining_ms: self.timing.timeout_ms,
            }))
    }

    fn running(&mut self, now: u64, inputs: &Inputs) -> Effects {
        let Some(side) = self.start_side else {
            log::warn!("game: running without a start side, resetting");
            return self.restart(now);
        };

        self.elapsed_ms = now.saturating_sub(self.run_started_at);
        let elapsed_ms = self.elapsed_ms;

        if inputs.wire {
            self.finish(now, GameState::Lost);
            return Effects::none()
                .with(Effect::SetIndicator(IndicatorMode::Lose))
                .with(Effect::PlayClip(Clip::Lose))
                .with(Effect::Render(View::Lost { elapsed_ms }));
        }

        if elapsed_ms >= self.timing.timeout_ms {
            self.finish(now, GameState::TimedOut);
            return Effects::none()
                .with(Effect::SetIndicator(IndicatorMode::Lose))
                .with(Effect::PlayClip(Clip::Timeout))
                .with(Effect::Render(View::TimedOut { elapsed_ms }));
        }

        if side.opposite().plate(inputs) {
            self.finish(now, GameState::Won);
            return Effects::none()
                .with(Effect::SetIndicator(IndicatorMode::Win))
                .with(Effect::PlayClip(Clip::Win))
                .with(Effect::Render(View::Won { elapsed_ms }));
        }

        if now.saturating_sub(self.countdown_at) >= self.timing.countdown_refresh_ms {
            self.countdown_at = now;
            return Effects::none().with(Effect::Render(View::Countdown {
                remaining_ms: self.timing.timeout_ms - elapsed_ms,
            }));
        }

        Effects::none()
    }

    fn finish(&mut self, now: u64, result: GameState) {
        self.enter(result);
        self.result_since = now;
        log::info!("game: {} after {} ms", result, self.elapsed_ms);
    }

    fn result(&mut self, now: u64, inputs: &Inputs) -> Effects {
        let policy = self.timing.restart;
        let delay_done = policy.uses_delay()
            && now.saturating_sub(self.result_since) >= self.timing.restart_delay_ms;
        let touched = policy.uses_touch() && inputs.touch;

        if delay_done || touched {
            return self.restart(now);
        }
        Effects::none()
    }

    fn restart(&mut self, now: u64) -> Effects {
        self.enter(GameState::AwaitingStart);
        self.start_side = None;
        self.run_started_at = 0;
        self.elapsed_ms = 0;
        self.result_since = 0;
        self.countdown_at = 0;
        self.awaiting_since = now;
        // the idle prompt goes out right now, not after the abandon delay
        self.idle_prompted = true;
        Effects::none()
            .with(Effect::SetIndicator(IndicatorMode::Idle))
            .with(Effect::Render(View::Idle))
    }
}

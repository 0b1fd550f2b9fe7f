// Side effects described by the game and carried out by the presenter.

use core::fmt;

use crate::game::Side;

/// One-shot audio clip, addressed by logical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clip {
    Win,
    Lose,
    Timeout,
}

impl Clip {
    pub const fn name(self) -> &'static str {
        match self {
            Clip::Win => "win",
            Clip::Lose => "lose",
            Clip::Timeout => "timeout",
        }
    }
}

impl fmt::Display for Clip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the status indicator strip shows. `Win` pulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorMode {
    Idle,
    Ready,
    Win,
    Lose,
}

/// Screen content for one game situation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// "Place the ring" attract prompt.
    Idle,
    /// Ring is on a plate; `Side` is where it rests.
    Ready(Side),
    /// Cleared play screen at the start of a run.
    Playfield,
    Countdown { remaining_ms: u64 },
    Won { elapsed_ms: u64 },
    Lost { elapsed_ms: u64 },
    TimedOut { elapsed_ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    PlayClip(Clip),
    SetIndicator(IndicatorMode),
    Render(View),
}

const MAX_EFFECTS: usize = 4;

/// Effects produced by one `advance` call, in application order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effects {
    items: [Option<Effect>; MAX_EFFECTS],
    len: usize,
}

impl Effects {
    pub const fn none() -> Self {
        Self {
            items: [None; MAX_EFFECTS],
            len: 0,
        }
    }

    pub fn push(&mut self, effect: Effect) {
        if self.len >= MAX_EFFECTS {
            log::warn!("effects: dropping {:?}", effect);
            return;
        }
        self.items[self.len] = Some(effect);
        self.len += 1;
    }

    pub fn with(mut self, effect: Effect) -> Self {
        self.push(effect);
        self
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, effect: &Effect) -> bool {
        self.iter().any(|e| e == *effect)
    }

    pub fn iter(&self) -> impl Iterator<Item = Effect> + '_ {
        self.items[..self.len].iter().flatten().copied()
    }
}

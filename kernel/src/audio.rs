// Audio output seam: one-shot clips by logical name, pumped every tick.

use core::fmt::Debug;

use crate::effect::Clip;

pub trait AudioOut {
    type Error: Debug;

    /// Start `clip`; returns immediately.
    fn play(&mut self, clip: Clip) -> Result<(), Self::Error>;

    /// Keep playback going; called every scheduler tick, must not block.
    fn pump(&mut self) -> Result<(), Self::Error>;

    fn is_playing(&self) -> bool;
}

/// Missing player (failed to come up at boot): the game runs silent.
impl<A: AudioOut> AudioOut for Option<A> {
    type Error = A::Error;

    fn play(&mut self, clip: Clip) -> Result<(), Self::Error> {
        match self {
            Some(audio) => audio.play(clip),
            None => {
                log::debug!("audio: no player, skipping {}", clip);
                Ok(())
            }
        }
    }

    fn pump(&mut self) -> Result<(), Self::Error> {
        match self {
            Some(audio) => audio.pump(),
            None => Ok(()),
        }
    }

    fn is_playing(&self) -> bool {
        self.as_ref().is_some_and(|a| a.is_playing())
    }
}

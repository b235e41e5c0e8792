use std::sync::mpsc::SyncSender;

/// The discrete effects wired to the cabinet's sound board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    Shoot,
    InvaderDeath,
    Explosion,
    FleetMovement1,
    FleetMovement2,
    FleetMovement3,
    FleetMovement4,
    UfoPassing,
    UfoHit,
}

impl SoundEffect {
    pub const COUNT: usize = 9;

    pub const ALL: [SoundEffect; Self::COUNT] = [
        SoundEffect::Shoot,
        SoundEffect::InvaderDeath,
        SoundEffect::Explosion,
        SoundEffect::FleetMovement1,
        SoundEffect::FleetMovement2,
        SoundEffect::FleetMovement3,
        SoundEffect::FleetMovement4,
        SoundEffect::UfoPassing,
        SoundEffect::UfoHit,
    ];

    /// Fleet movement steps in port 5 bit order.
    pub const FLEET: [SoundEffect; 4] = [
        SoundEffect::FleetMovement1,
        SoundEffect::FleetMovement2,
        SoundEffect::FleetMovement3,
        SoundEffect::FleetMovement4,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            SoundEffect::Shoot => "shoot.wav",
            SoundEffect::InvaderDeath => "invaderkilled.wav",
            SoundEffect::Explosion => "explosion.wav",
            SoundEffect::FleetMovement1 => "fastinvader1.wav",
            SoundEffect::FleetMovement2 => "fastinvader2.wav",
            SoundEffect::FleetMovement3 => "fastinvader3.wav",
            SoundEffect::FleetMovement4 => "fastinvader4.wav",
            SoundEffect::UfoPassing => "ufo_lowpitch.wav",
            SoundEffect::UfoHit => "ufo_highpitch.wav",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Turns the level-triggered sound latches into one-shot triggers.
///
/// The game rewrites ports 3 and 5 constantly, so an effect is only sent on
/// the write where its bit goes from low to high.
pub struct SoundDispatcher {
    active: [bool; SoundEffect::COUNT],
    triggers: SyncSender<SoundEffect>,
}

impl SoundDispatcher {
    pub fn new(triggers: SyncSender<SoundEffect>) -> Self {
        Self {
            active: [false; SoundEffect::COUNT],
            triggers,
        }
    }

    pub fn notify(&mut self, effect: SoundEffect, bit_is_set: bool) {
        let was_active = std::mem::replace(&mut self.active[effect.index()], bit_is_set);
        if bit_is_set && !was_active {
            log::trace!("sound {effect:?} triggered");
            if self.triggers.send(effect).is_err() {
                log::warn!("presentation stopped, dropping {effect:?}");
            }
        }
    }

    #[cfg(test)]
    pub fn is_active(&self, effect: SoundEffect) -> bool {
        self.active[effect.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::{sync_channel, Receiver};

    fn dispatcher() -> (SoundDispatcher, Receiver<SoundEffect>) {
        let (tx, rx) = sync_channel(16);
        (SoundDispatcher::new(tx), rx)
    }

    #[test]
    fn test_single_trigger_per_pulse() {
        let (mut sounds, rx) = dispatcher();
        sounds.notify(SoundEffect::Shoot, false);
        sounds.notify(SoundEffect::Shoot, true);
        sounds.notify(SoundEffect::Shoot, true);
        sounds.notify(SoundEffect::Shoot, false);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![SoundEffect::Shoot]);
        assert!(!sounds.is_active(SoundEffect::Shoot));
    }

    #[test]
    fn test_retrigger_after_release() {
        let (mut sounds, rx) = dispatcher();
        for level in [true, false, true] {
            sounds.notify(SoundEffect::UfoHit, level);
        }
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn test_effects_are_independent() {
        let (mut sounds, rx) = dispatcher();
        sounds.notify(SoundEffect::Explosion, true);
        sounds.notify(SoundEffect::InvaderDeath, true);
        sounds.notify(SoundEffect::Explosion, true);
        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec![SoundEffect::Explosion, SoundEffect::InvaderDeath]
        );
    }

    #[test]
    fn test_effect_order_matches_index() {
        for (i, effect) in SoundEffect::ALL.iter().enumerate() {
            assert_eq!(effect.index(), i);
        }
    }
}

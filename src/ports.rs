use crate::{
    input::InputLink,
    modes::ModeFlags,
    sound::{SoundDispatcher, SoundEffect},
};

// Read ports
pub const INP0: u8 = 0;
pub const INP1: u8 = 1;
pub const INP2: u8 = 2;
pub const SHIFT_IN: u8 = 3;

// Write ports
pub const SHIFT_AMOUNT: u8 = 2;
pub const SOUND1: u8 = 3;
pub const SHIFT_DATA: u8 = 4;
pub const SOUND2: u8 = 5;
pub const WATCHDOG: u8 = 6;

const EXTENDED_PLAY_BIT: u8 = 1 << 4;
const COCKTAIL_BIT: u8 = 1 << 5;

/// The dedicated shift hardware (an MB14241 on the real board).
///
/// Writes to port 4 push a byte into the top of a 16-bit register; port 3 reads
/// eight bits out of it, `offset` bits down from the top.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShiftRegister {
    value: u16,
    offset: u8,
}

impl ShiftRegister {
    pub fn feed(&mut self, byte: u8) {
        self.value = (self.value >> 8) | (u16::from(byte) << 8);
    }

    pub fn set_offset(&mut self, byte: u8) {
        self.offset = byte & 0b111;
    }

    pub fn read(&self) -> u8 {
        (self.value >> (8 - self.offset)) as u8
    }
}

/// Port-mapped I/O as the interpreter sees it.
pub struct PortController {
    inputs: InputLink,
    shifter: ShiftRegister,
    sounds: SoundDispatcher,
    modes: ModeFlags,
    cocktail_latch: bool,
    extended_play_latch: bool,
}

impl PortController {
    pub fn new(inputs: InputLink, sounds: SoundDispatcher, modes: ModeFlags) -> Self {
        Self {
            inputs,
            shifter: ShiftRegister::default(),
            sounds,
            modes,
            cocktail_latch: false,
            extended_play_latch: false,
        }
    }

    /// Port reads. Input ports block until the input actor answers.
    pub fn read(&mut self, port: u8) -> u8 {
        match port {
            INP0 | INP1 | INP2 => self.inputs.read(port),
            SHIFT_IN => self.shifter.read(),
            _ => {
                log::warn!("read from unmapped port {port}");
                0
            }
        }
    }

    pub fn write(&mut self, port: u8, value: u8) {
        log::trace!("out {port} <- {value:#04x}");
        match port {
            SHIFT_AMOUNT => self.shifter.set_offset(value),
            SHIFT_DATA => self.shifter.feed(value),
            SOUND1 => self.write_sound1(value),
            SOUND2 => self.write_sound2(value),
            WATCHDOG => {}
            _ => log::warn!("write {value:#04x} to unmapped port {port}"),
        }
    }

    // bit 0 UFO (repeats), 1 shot, 2 player death, 3 invader death,
    // 4 extended play, 5 amp enable
    fn write_sound1(&mut self, value: u8) {
        self.sounds.notify(SoundEffect::UfoPassing, value & 1 != 0);
        self.sounds.notify(SoundEffect::Shoot, value & (1 << 1) != 0);
        self.sounds.notify(SoundEffect::Explosion, value & (1 << 2) != 0);
        self.sounds
            .notify(SoundEffect::InvaderDeath, value & (1 << 3) != 0);

        let extended_play = value & EXTENDED_PLAY_BIT != 0;
        if extended_play && !self.extended_play_latch {
            log::info!("extended play");
        }
        self.extended_play_latch = extended_play;
    }

    // bits 0-3 fleet movement, 4 UFO hit, 5 cocktail flip
    fn write_sound2(&mut self, value: u8) {
        for (bit, effect) in SoundEffect::FLEET.into_iter().enumerate() {
            self.sounds.notify(effect, value & (1 << bit) != 0);
        }
        self.sounds.notify(SoundEffect::UfoHit, value & (1 << 4) != 0);

        // debounced like the sound bits: the game rewrites port 5 every frame
        let cocktail = value & COCKTAIL_BIT != 0;
        if cocktail && !self.cocktail_latch {
            let flipped = self.modes.toggle_cocktail();
            log::debug!("cocktail mode {}", if flipped { "on" } else { "off" });
        }
        self.cocktail_latch = cocktail;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputAggregator;
    use std::{
        sync::mpsc::{sync_channel, Receiver},
        thread,
    };

    struct Rig {
        ports: PortController,
        sounds: Receiver<SoundEffect>,
        modes: ModeFlags,
    }

    fn rig() -> Rig {
        let modes = ModeFlags::default();
        let (link, aggregator) = InputAggregator::new(modes.clone());
        thread::spawn(move || aggregator.run());
        let (tx, sounds) = sync_channel(16);
        Rig {
            ports: PortController::new(link, SoundDispatcher::new(tx), modes.clone()),
            sounds,
            modes,
        }
    }

    #[test]
    fn test_shift_register_window() {
        for offset in 0..8u8 {
            let (b1, b2) = (0xa5u8, 0x3cu8);
            let mut shifter = ShiftRegister::default();
            shifter.set_offset(offset);
            shifter.feed(b1);
            shifter.feed(b2);
            let expected = (((u16::from(b2) << 8) | u16::from(b1)) >> (8 - offset)) as u8;
            assert_eq!(shifter.read(), expected, "offset {offset}");
        }
    }

    #[test]
    fn test_shift_offset_is_masked() {
        let mut shifter = ShiftRegister::default();
        shifter.set_offset(0xff);
        shifter.feed(0x00);
        shifter.feed(0x01);
        // 0x0100 read seven bits down
        assert_eq!(shifter.read(), 0x80);
    }

    #[test]
    fn test_shift_through_ports() {
        let mut rig = rig();
        rig.ports.write(SHIFT_DATA, 0xff);
        rig.ports.write(SHIFT_DATA, 0x00);
        rig.ports.write(SHIFT_AMOUNT, 2);
        assert_eq!(rig.ports.read(SHIFT_IN), 0b0000_0011);
    }

    #[test]
    fn test_input_ports_read_initial_state() {
        let mut rig = rig();
        assert_eq!(rig.ports.read(INP0), 0b0000_1110);
        assert_eq!(rig.ports.read(INP1), 0b0000_1000);
        assert_eq!(rig.ports.read(INP2), 0);
    }

    #[test]
    fn test_sound_ports_map_bits() {
        let mut rig = rig();
        rig.ports.write(SOUND1, 0b0000_1111);
        rig.ports.write(SOUND1, 0b0000_1111);
        rig.ports.write(SOUND2, 0b0001_0001);
        let fired: Vec<_> = rig.sounds.try_iter().collect();
        assert_eq!(
            fired,
            vec![
                SoundEffect::UfoPassing,
                SoundEffect::Shoot,
                SoundEffect::Explosion,
                SoundEffect::InvaderDeath,
                SoundEffect::FleetMovement1,
                SoundEffect::UfoHit,
            ]
        );
    }

    #[test]
    fn test_cocktail_bit_flips_once_per_rising_edge() {
        let mut rig = rig();
        assert!(!rig.modes.cocktail());
        rig.ports.write(SOUND2, COCKTAIL_BIT);
        rig.ports.write(SOUND2, COCKTAIL_BIT);
        assert!(rig.modes.cocktail());
        rig.ports.write(SOUND2, 0);
        rig.ports.write(SOUND2, COCKTAIL_BIT);
        assert!(!rig.modes.cocktail());
    }

    #[test]
    fn test_watchdog_and_unmapped_ports_are_ignored() {
        let mut rig = rig();
        rig.ports.write(WATCHDOG, 0xff);
        rig.ports.write(7, 0xff);
        assert_eq!(rig.ports.read(7), 0);
        assert!(rig.sounds.try_recv().is_err());
    }
}

use minifb::Key;

use crate::ports::{INP1, INP2};

/// What a key does to the cabinet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Holds `bit` of input port `port` high while the key is down.
    Port { port: u8, bit: u8 },
    ToggleMonochrome,
    Quit,
}

const fn hold(port: u8, bit: u8) -> Option<Action> {
    Some(Action::Port { port, bit })
}

pub fn action_for(key: Key) -> Option<Action> {
    match key {
        Key::C => hold(INP1, 0), // coin
        Key::Key2 => hold(INP1, 1),
        Key::Key1 => hold(INP1, 2),
        Key::Space | Key::Comma => hold(INP1, 4),
        Key::Left => hold(INP1, 5),
        Key::Right => hold(INP1, 6),

        Key::T => hold(INP2, 2), // tilt
        Key::B => hold(INP2, 3), // dip: bonus life at 1000
        Key::V => hold(INP2, 4),
        Key::Y => hold(INP2, 5),
        Key::X => hold(INP2, 6),
        Key::I => hold(INP2, 7), // dip: coin info off

        Key::F9 => Some(Action::ToggleMonochrome),
        Key::Escape => Some(Action::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_controls() {
        assert_eq!(action_for(Key::C), Some(Action::Port { port: 1, bit: 0 }));
        assert_eq!(action_for(Key::Left), Some(Action::Port { port: 1, bit: 5 }));
        assert_eq!(action_for(Key::X), Some(Action::Port { port: 2, bit: 6 }));
        assert_eq!(action_for(Key::Comma), action_for(Key::Space));
    }

    #[test]
    fn test_unbound_keys() {
        assert_eq!(action_for(Key::Q), None);
        assert_eq!(action_for(Key::F9), Some(Action::ToggleMonochrome));
        assert_eq!(action_for(Key::Escape), Some(Action::Quit));
    }
}

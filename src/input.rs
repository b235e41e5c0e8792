use std::sync::mpsc::{sync_channel, Receiver, SyncSender};

use minifb::Key;

use crate::{
    keyboard::{action_for, Action},
    modes::ModeFlags,
};

/// An input event as delivered by the window layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEvent {
    Key { key: Key, pressed: bool, repeat: bool },
    Quit,
}

/// Everything the input actor can be asked to do.
#[derive(Debug)]
pub enum InputMessage {
    /// The interpreter wants the current byte of an input port.
    Read(u8),
    Event(RawEvent),
}

/// The three input ports as bit-packed bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortState([u8; 3]);

impl PortState {
    pub fn get(&self, port: u8) -> u8 {
        self.0.get(port as usize).copied().unwrap_or(0)
    }

    pub fn set(&mut self, port: u8, bit: u8, on: bool) {
        if let Some(byte) = self.0.get_mut(port as usize) {
            if on {
                *byte |= 1 << bit;
            } else {
                *byte &= !(1 << bit);
            }
        }
    }
}

impl Default for PortState {
    // port 0 bits 1-3 and port 1 bit 3 are tied high on the board
    fn default() -> Self {
        Self([0b0000_1110, 0b0000_1000, 0b0000_0000])
    }
}

/// The emulation side of the input actor: one blocking read per port access.
pub struct InputLink {
    requests: SyncSender<InputMessage>,
    replies: Receiver<u8>,
}

impl InputLink {
    /// A handle for pushing raw events to the same actor.
    pub fn events(&self) -> SyncSender<InputMessage> {
        self.requests.clone()
    }

    /// `None` once the input actor has stopped serving.
    pub fn try_read(&self, port: u8) -> Option<u8> {
        self.requests.send(InputMessage::Read(port)).ok()?;
        self.replies.recv().ok()
    }

    pub fn read(&self, port: u8) -> u8 {
        self.try_read(port).unwrap_or_else(|| {
            log::warn!("input actor gone, port {port} reads as 0");
            0
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Owns the port bits and serves them to the interpreter.
///
/// Port reads and raw events arrive on one rendezvous channel and are handled in
/// arrival order, so a read always sees every event that reached the actor
/// before it.
pub struct InputAggregator {
    state: PortState,
    requests: Receiver<InputMessage>,
    replies: SyncSender<u8>,
    modes: ModeFlags,
}

impl InputAggregator {
    pub fn new(modes: ModeFlags) -> (InputLink, InputAggregator) {
        let (request_tx, request_rx) = sync_channel(0);
        let (reply_tx, reply_rx) = sync_channel(0);
        let link = InputLink {
            requests: request_tx,
            replies: reply_rx,
        };
        let aggregator = InputAggregator {
            state: PortState::default(),
            requests: request_rx,
            replies: reply_tx,
            modes,
        };
        (link, aggregator)
    }

    #[cfg(test)]
    pub fn state(&self) -> PortState {
        self.state
    }

    pub fn handle(&mut self, message: InputMessage) -> Flow {
        match message {
            InputMessage::Read(port) => {
                if self.replies.send(self.state.get(port)).is_err() {
                    log::warn!("port {port} read abandoned");
                    return Flow::Quit;
                }
                Flow::Continue
            }
            InputMessage::Event(RawEvent::Quit) => Flow::Quit,
            InputMessage::Event(RawEvent::Key {
                key,
                pressed,
                repeat,
            }) => self.handle_key(key, pressed, repeat),
        }
    }

    fn handle_key(&mut self, key: Key, pressed: bool, repeat: bool) -> Flow {
        match action_for(key) {
            Some(Action::Port { port, bit }) => {
                self.state.set(port, bit, pressed);
                Flow::Continue
            }
            Some(Action::ToggleMonochrome) => {
                if pressed && !repeat {
                    let monochrome = self.modes.toggle_monochrome();
                    log::info!("monochrome {}", if monochrome { "on" } else { "off" });
                }
                Flow::Continue
            }
            Some(Action::Quit) if pressed => Flow::Quit,
            _ => Flow::Continue,
        }
    }

    /// Serves until a quit event arrives or every sender is gone.
    pub fn run(mut self) -> Flow {
        while let Ok(message) = self.requests.recv() {
            if self.handle(message) == Flow::Quit {
                log::info!("quit requested");
                return Flow::Quit;
            }
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn press(key: Key) -> InputMessage {
        InputMessage::Event(RawEvent::Key {
            key,
            pressed: true,
            repeat: false,
        })
    }

    fn release(key: Key) -> InputMessage {
        InputMessage::Event(RawEvent::Key {
            key,
            pressed: false,
            repeat: false,
        })
    }

    fn repeat(key: Key) -> InputMessage {
        InputMessage::Event(RawEvent::Key {
            key,
            pressed: true,
            repeat: true,
        })
    }

    #[test]
    fn test_port_bits_follow_keys() {
        let (_link, mut input) = InputAggregator::new(ModeFlags::default());
        input.handle(press(Key::Right));
        input.handle(press(Key::V));
        assert_eq!(input.state().get(1), 0b0100_1000);
        assert_eq!(input.state().get(2), 0b0001_0000);
        input.handle(release(Key::Right));
        assert_eq!(input.state().get(1), 0b0000_1000);
    }

    #[test]
    fn test_monochrome_toggle_ignores_repeats() {
        let modes = ModeFlags::default();
        let (_link, mut input) = InputAggregator::new(modes.clone());
        input.handle(press(Key::F9));
        input.handle(repeat(Key::F9));
        input.handle(repeat(Key::F9));
        input.handle(release(Key::F9));
        assert!(!modes.monochrome());
        assert_eq!(input.state(), PortState::default());
    }

    #[test]
    fn test_escape_quits_on_press_only() {
        let (_link, mut input) = InputAggregator::new(ModeFlags::default());
        assert_eq!(input.handle(release(Key::Escape)), Flow::Continue);
        assert_eq!(input.handle(press(Key::Escape)), Flow::Quit);
    }

    #[test]
    fn test_coin_then_quit_end_to_end() {
        let (link, input) = InputAggregator::new(ModeFlags::default());
        let events = link.events();
        let actor = thread::spawn(move || input.run());

        events.send(press(Key::C)).unwrap();
        assert_eq!(link.read(1) & 1, 1);
        events.send(release(Key::C)).unwrap();
        assert_eq!(link.read(1) & 1, 0);

        events.send(InputMessage::Event(RawEvent::Quit)).unwrap();
        assert_eq!(actor.join().unwrap(), Flow::Quit);
        assert_eq!(link.try_read(1), None);
        assert!(events.send(press(Key::C)).is_err());
    }

    #[test]
    fn test_actor_stops_when_senders_drop() {
        let (link, input) = InputAggregator::new(ModeFlags::default());
        let actor = thread::spawn(move || input.run());
        assert_eq!(link.read(0), 0b0000_1110);
        drop(link);
        assert_eq!(actor.join().unwrap(), Flow::Continue);
    }

    #[test]
    fn test_unknown_port_reads_zero() {
        let mut state = PortState::default();
        state.set(7, 0, true);
        assert_eq!(state.get(7), 0);
    }
}

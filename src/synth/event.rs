//! The event bus shared by songs and the control API, and the message type
//! hosts use to reach it from another thread.

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

pub const OPCODE_NOTE_OFF: u8 = 0x80;
pub const OPCODE_NOTE_ON: u8 = 0x90;
/// Note-On with a built-in duration in frames. Not standard MIDI.
pub const OPCODE_NOTE_ONCE: u8 = 0x98;
pub const OPCODE_CONTROL: u8 = 0xb0;
pub const OPCODE_PROGRAM: u8 = 0xc0;
pub const OPCODE_WHEEL: u8 = 0xe0;
/// With a channel id in 8..=15 resets that channel; 16 or above resets all.
pub const OPCODE_RESET: u8 = 0xff;

pub const CONTROL_BANK_MSB: u8 = 0x00;
pub const CONTROL_VOLUME: u8 = 0x07;
pub const CONTROL_PAN: u8 = 0x0a;
pub const CONTROL_BANK_LSB: u8 = 0x20;

/// One event in `Synth::event` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub chid: u8,
    pub opcode: u8,
    pub a: u8,
    pub b: u8,
    /// Frames. Only meaningful for [`OPCODE_NOTE_ONCE`].
    pub dur: i32,
}

impl Event {
    pub fn new(chid: u8, opcode: u8, a: u8, b: u8, dur: i32) -> Self {
        Self { chid, opcode, a, b, dur }
    }

    pub fn note_once(chid: u8, note: u8, velocity: u8, dur: i32) -> Self {
        Self::new(chid, OPCODE_NOTE_ONCE, note, velocity, dur)
    }

    /// Split a 14-bit wheel position across `a` and `b` so that `a | b << 7`
    /// puts it back together.
    pub fn wheel(chid: u8, value: u16) -> Self {
        let value = value & 0x3fff;
        Self::new(chid, OPCODE_WHEEL, (value & 0x7f) as u8, (value >> 7) as u8, 0)
    }
}

/// Control requests a host can queue from outside the audio thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    Event(Event),
    PlaySong {
        qual: u16,
        id: u16,
        force: bool,
        repeat: bool,
    },
    PlaySound {
        qual: u16,
        id: u16,
        trim: f32,
        pan: f32,
    },
    SetPlayhead {
        beats: f64,
    },
    /// Release everything on every channel.
    AllNotesOff,
}

impl From<Event> for SynthMessage {
    fn from(event: Event) -> Self {
        SynthMessage::Event(event)
    }
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

impl MessageReceiver for std::collections::VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}

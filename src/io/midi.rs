//! Raw MIDI channel messages, for hosts that feed a live bus into
//! [`crate::Synth::event`].

use crate::synth::event::{Event, OPCODE_CONTROL, OPCODE_NOTE_OFF, OPCODE_NOTE_ON, OPCODE_PROGRAM, OPCODE_RESET};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// 14-bit, 0x2000 center.
    PitchBend { channel: u8, value: u16 },
    ProgramChange { channel: u8, program: u8 },
    /// System Reset (0xff).
    Reset,
}

impl MidiEvent {
    /// Parse one complete message. Running status, sysex and the other
    /// system messages aren't supported.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        if status == 0xff {
            return Some(MidiEvent::Reset);
        }
        let channel = status & 0x0f;
        let byte = |i: usize| data.get(i).copied().filter(|b| b & 0x80 == 0);
        let event = match status & 0xf0 {
            0x80 => MidiEvent::NoteOff {
                channel,
                key: byte(0)?,
                velocity: byte(1)?,
            },
            0x90 => match (byte(0)?, byte(1)?) {
                (key, 0) => MidiEvent::NoteOff { channel, key, velocity: 0x40 },
                (key, velocity) => MidiEvent::NoteOn { channel, key, velocity },
            },
            0xb0 => MidiEvent::ControlChange {
                channel,
                controller: byte(0)?,
                value: byte(1)?,
            },
            0xc0 => MidiEvent::ProgramChange {
                channel,
                program: byte(0)?,
            },
            0xe0 => MidiEvent::PitchBend {
                channel,
                value: byte(0)? as u16 | (byte(1)? as u16) << 7,
            },
            _ => return None,
        };
        Some(event)
    }
}

impl From<MidiEvent> for Event {
    fn from(midi: MidiEvent) -> Self {
        match midi {
            MidiEvent::NoteOn { channel, key, velocity } => Event::new(channel, OPCODE_NOTE_ON, key, velocity, 0),
            MidiEvent::NoteOff { channel, key, velocity } => Event::new(channel, OPCODE_NOTE_OFF, key, velocity, 0),
            MidiEvent::ControlChange {
                channel,
                controller,
                value,
            } => Event::new(channel, OPCODE_CONTROL, controller, value, 0),
            MidiEvent::PitchBend { channel, value } => Event::wheel(channel, value),
            MidiEvent::ProgramChange { channel, program } => Event::new(channel, OPCODE_PROGRAM, program, 0, 0),
            MidiEvent::Reset => Event::new(0xff, OPCODE_RESET, 0, 0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::event::OPCODE_WHEEL;

    #[test]
    fn parses_channel_messages() {
        assert_eq!(
            MidiEvent::parse(&[0x93, 60, 100]),
            Some(MidiEvent::NoteOn { channel: 3, key: 60, velocity: 100 })
        );
        assert_eq!(
            MidiEvent::parse(&[0x93, 60, 0]),
            Some(MidiEvent::NoteOff { channel: 3, key: 60, velocity: 0x40 })
        );
        assert_eq!(
            MidiEvent::parse(&[0xe0, 0x00, 0x40]),
            Some(MidiEvent::PitchBend { channel: 0, value: 0x2000 })
        );
        assert_eq!(MidiEvent::parse(&[0xc9, 5]), Some(MidiEvent::ProgramChange { channel: 9, program: 5 }));
        assert_eq!(MidiEvent::parse(&[0xff]), Some(MidiEvent::Reset));
    }

    #[test]
    fn rejects_short_or_bad_data() {
        assert_eq!(MidiEvent::parse(&[]), None);
        assert_eq!(MidiEvent::parse(&[0x90, 60]), None);
        assert_eq!(MidiEvent::parse(&[0x90, 0x80, 1]), None);
        assert_eq!(MidiEvent::parse(&[0xf8]), None);
    }

    #[test]
    fn converts_to_bus_events() {
        let wheel: Event = MidiEvent::PitchBend { channel: 2, value: 0x3fff }.into();
        assert_eq!((wheel.chid, wheel.opcode, wheel.a, wheel.b), (2, OPCODE_WHEEL, 0x7f, 0x7f));
        let reset: Event = MidiEvent::Reset.into();
        assert_eq!((reset.chid, reset.opcode), (0xff, OPCODE_RESET));
    }
}

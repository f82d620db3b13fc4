//! Song bytecode: decoding, playback cursor and encoding.
//!
//! ```text
//! header (42 bytes)
//!   0  4   signature "\xbe\xee\xeeP"
//!   4  2   tempo, ms per beat
//!   6  2   start offset (>= 42)
//!   8  2   loop offset (start..len)
//!   10 4*8 channel records: pid, volume, pan, reserved
//!
//! events
//!   0xxxxxxx                    delay x ms (0 = end of song)
//!   1000vvvv cccnnnnn nnDDDDDD  note with duration D*32 ms
//!   1001vvcc cnnnnnnn           note, zero duration
//!   10100ccc wwwwwwww           wheel, w<<6 as 14 bits
//!   anything else               reserved
//! ```

use std::sync::Arc;

use super::event::Event;
use crate::error::DecodeError;
use crate::SONG_CHANNEL_COUNT;

pub const SONG_SIGNATURE: [u8; 4] = [0xbe, 0xee, 0xee, b'P'];
pub const SONG_HEADER_LEN: usize = 10 + 4 * SONG_CHANNEL_COUNT;

/// Longest delay one event byte can carry.
const DELAY_LIMIT_MS: u32 = 63;
/// Bounded note durations count in these.
const DURATION_UNIT_MS: u32 = 32;

/// One of the 8 header channel records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelRecord {
    pub pid: u8,
    /// Zero means the channel is unused and won't be instantiated.
    pub volume: u8,
    /// 0x80 is center.
    pub pan: u8,
}

/// What [`Song::step`] found at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongStep {
    Event(Event),
    /// Frames until the next event.
    Delay(usize),
    End,
}

#[derive(Debug, Clone)]
pub struct Song {
    src: Arc<[u8]>,
    tempo: u16,
    start: usize,
    loop_at: usize,
    pos: usize,
    delay: usize,
    playhead_ms: f64,
    /// Where `playhead_ms` lands once the pending delay runs out. Avoids
    /// accumulating rounding error from the per-frame advance.
    playhead_ms_next: Option<f64>,
    repeat: bool,
    resource: Option<(u16, u16)>,
    frames_per_ms: f32,
}

impl Song {
    /// Validate the header and set the cursor at the start offset.
    /// `resource` is the (qualifier, id) the song was loaded from, if any.
    pub fn new(rate: u32, src: &[u8], repeat: bool, resource: Option<(u16, u16)>) -> Result<Self, DecodeError> {
        if src.len() < SONG_HEADER_LEN {
            return Err(DecodeError::Truncated(src.len()));
        }
        if src[..4] != SONG_SIGNATURE {
            return Err(DecodeError::Signature);
        }
        let be16 = |at: usize| u16::from_be_bytes([src[at], src[at + 1]]);
        let tempo = be16(4);
        let start = be16(6) as usize;
        let loop_at = be16(8) as usize;
        if tempo == 0 {
            return Err(DecodeError::Header("tempo"));
        }
        if start < SONG_HEADER_LEN {
            return Err(DecodeError::Header("start"));
        }
        if loop_at < start || loop_at >= src.len() {
            return Err(DecodeError::Header("loop"));
        }
        Ok(Self {
            src: Arc::from(src),
            tempo,
            start,
            loop_at,
            pos: start,
            delay: 0,
            playhead_ms: 0.0,
            playhead_ms_next: None,
            repeat,
            resource,
            frames_per_ms: rate as f32 / 1000.0,
        })
    }

    pub fn tempo(&self) -> u16 {
        self.tempo
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn resource(&self) -> Option<(u16, u16)> {
        self.resource
    }

    pub fn is_resource(&self, qual: u16, id: u16) -> bool {
        self.resource == Some((qual, id))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.src
    }

    pub fn channel_records(&self) -> [ChannelRecord; SONG_CHANNEL_COUNT] {
        let mut records = [ChannelRecord::default(); SONG_CHANNEL_COUNT];
        for (record, raw) in records.iter_mut().zip(self.src[10..SONG_HEADER_LEN].chunks_exact(4)) {
            *record = ChannelRecord {
                pid: raw[0],
                volume: raw[1],
                pan: raw[2],
            };
        }
        records
    }

    /// Read up to the next event or delay. With `skip`, events are consumed
    /// without being returned.
    pub fn step(&mut self, skip: bool) -> Result<SongStep, DecodeError> {
        loop {
            if self.delay > 0 {
                return Ok(SongStep::Delay(self.delay));
            }
            let Some(&lead) = self.src.get(self.pos).filter(|&&b| b != 0) else {
                if !self.repeat {
                    return Ok(SongStep::End);
                }
                // Loop with a forced delay, in case the body has none.
                self.pos = self.loop_at;
                self.delay = 1;
                self.playhead_ms = 1.0;
                self.playhead_ms_next = Some(1.0);
                return Ok(SongStep::Delay(1));
            };
            self.pos += 1;

            if lead & 0x80 == 0 {
                let frames = (lead as f32 * self.frames_per_ms).round() as usize;
                self.delay = frames.max(1);
                self.playhead_ms_next = Some(self.playhead_ms + lead as f64);
                return Ok(SongStep::Delay(self.delay));
            }

            let (len, event) = match lead & 0xf0 {
                0x80 => {
                    let [a, b] = self.operands()?;
                    let chid = a >> 5;
                    let mut velocity = (lead & 0x0f) << 3;
                    velocity |= velocity >> 4;
                    let note = ((a & 0x1f) << 2) | (b >> 6);
                    let ms = ((b & 0x3f) as u32) << 5;
                    let dur = (ms as f32 * self.frames_per_ms).round() as i32;
                    (2, Event::note_once(chid, note, velocity, dur.max(0)))
                }
                0x90 => {
                    let [a, _] = self.operands()?;
                    let chid = ((lead & 0x03) << 1) | (a >> 7);
                    let mut velocity = (lead & 0x0c) << 2;
                    velocity |= velocity >> 2;
                    velocity |= velocity >> 4;
                    (1, Event::note_once(chid, a & 0x7f, velocity, 0))
                }
                0xa0 if lead & 0x08 == 0 => {
                    let [v, _] = self.operands()?;
                    (1, Event::wheel(lead & 0x07, (v as u16) << 6))
                }
                _ => return Err(DecodeError::ReservedEvent(lead)),
            };
            if self.pos + len > self.src.len() {
                return Err(DecodeError::Truncated(self.pos));
            }
            self.pos += len;
            if !skip {
                return Ok(SongStep::Event(event));
            }
        }
    }

    /// The two bytes after the lead, zero-padded at end of data. Callers check
    /// the real length before committing.
    fn operands(&self) -> Result<[u8; 2], DecodeError> {
        let a = *self.src.get(self.pos).ok_or(DecodeError::Truncated(self.pos))?;
        let b = self.src.get(self.pos + 1).copied().unwrap_or(0);
        Ok([a, b])
    }

    /// Dispatch everything at the cursor, then return frames to the next
    /// event, or `None` at the end.
    pub fn update(&mut self, skip: bool, mut dispatch: impl FnMut(Event)) -> Result<Option<usize>, DecodeError> {
        loop {
            match self.step(skip)? {
                SongStep::Event(event) => dispatch(event),
                SongStep::Delay(frames) => return Ok(Some(frames)),
                SongStep::End => return Ok(None),
            }
        }
    }

    /// Move time forward. `frames` must not exceed the last returned delay.
    pub fn advance(&mut self, frames: usize) {
        if frames == 0 {
            return;
        }
        self.playhead_ms += frames as f64 / self.frames_per_ms as f64;
        self.delay = self.delay.saturating_sub(frames);
        if self.delay == 0 {
            if let Some(next) = self.playhead_ms_next.take() {
                self.playhead_ms = next;
            }
        }
    }

    /// Position in beats, less `adjust` seconds of output not yet heard.
    pub fn playhead(&self, adjust: f64) -> f64 {
        (self.playhead_ms - adjust * 1000.0).max(0.0) / self.tempo as f64
    }

    /// Seek to `beats` from the start, skipping events on the way.
    pub fn set_playhead(&mut self, beats: f64) {
        self.pos = self.start;
        self.delay = 1;
        self.playhead_ms = 1.0;
        self.playhead_ms_next = Some(1.0);
        let mut remaining = (beats * self.tempo as f64 * self.frames_per_ms as f64) as usize;
        while remaining > 0 {
            match self.step(true) {
                Ok(SongStep::Delay(frames)) => {
                    let frames = frames.min(remaining);
                    self.advance(frames);
                    remaining -= frames;
                }
                _ => break,
            }
        }
    }

    /// Sum of every delay from the start offset to the end, in ms.
    pub fn duration_ms(&self) -> u32 {
        let mut total = 0;
        let mut pos = self.start;
        while let Some(&lead) = self.src.get(pos) {
            pos += match lead {
                0 => break,
                0x01..=0x7f => {
                    total += lead as u32;
                    1
                }
                0x80..=0x8f => 3,
                0x90..=0xa7 => 2,
                _ => break,
            };
        }
        total
    }

    pub fn duration_beats(&self) -> f64 {
        self.duration_ms() as f64 / self.tempo as f64
    }
}

/// Builds song bytecode event by event.
///
/// Time only moves through [`SongWriter::wait`]; notes and wheel changes are
/// written at the current time.
#[derive(Debug, Clone)]
pub struct SongWriter {
    tempo: u16,
    channels: [ChannelRecord; SONG_CHANNEL_COUNT],
    events: Vec<u8>,
    pending_ms: u32,
}

impl SongWriter {
    /// `us_per_qnote` as in a MIDI tempo meta event.
    pub fn new(us_per_qnote: u32) -> Self {
        let tempo = ((us_per_qnote + 500) / 1000).clamp(1, u16::MAX as u32) as u16;
        Self {
            tempo,
            channels: [ChannelRecord::default(); SONG_CHANNEL_COUNT],
            events: Vec::new(),
            pending_ms: 0,
        }
    }

    pub fn channel(&mut self, chid: u8, record: ChannelRecord) -> &mut Self {
        if let Some(slot) = self.channels.get_mut(chid as usize) {
            *slot = record;
        }
        self
    }

    pub fn wait(&mut self, ms: u32) -> &mut Self {
        self.pending_ms += ms;
        self
    }

    fn flush_delay(&mut self) {
        while self.pending_ms > 0 {
            let ms = self.pending_ms.min(DELAY_LIMIT_MS);
            self.events.push(ms as u8);
            self.pending_ms -= ms;
        }
    }

    /// Note on `chid` 0..=7. Durations under 32 ms become fire-and-forget.
    pub fn note(&mut self, chid: u8, note: u8, velocity: u8, dur_ms: u32) -> &mut Self {
        self.flush_delay();
        let (chid, note, velocity) = (chid & 0x07, note & 0x7f, velocity & 0x7f);
        let duration = (dur_ms / DURATION_UNIT_MS).min(63) as u8;
        if duration > 0 {
            self.events.extend_from_slice(&[
                0x80 | (velocity >> 3),
                (chid << 5) | (note >> 2),
                (note << 6) | duration,
            ]);
        } else {
            self.events.extend_from_slice(&[
                0x90 | ((velocity >> 3) & 0x0c) | (chid >> 1),
                (chid << 7) | note,
            ]);
        }
        self
    }

    /// 14-bit wheel position, 0x2000 center. Only the top 8 bits survive.
    pub fn wheel(&mut self, chid: u8, value: u16) -> &mut Self {
        self.flush_delay();
        self.events.extend_from_slice(&[0xa0 | (chid & 0x07), ((value & 0x3fff) >> 6) as u8]);
        self
    }

    pub fn finish(&mut self) -> Vec<u8> {
        self.flush_delay();
        let mut out = Vec::with_capacity(SONG_HEADER_LEN + self.events.len());
        out.extend_from_slice(&SONG_SIGNATURE);
        out.extend_from_slice(&self.tempo.to_be_bytes());
        out.extend_from_slice(&(SONG_HEADER_LEN as u16).to_be_bytes());
        out.extend_from_slice(&(SONG_HEADER_LEN as u16).to_be_bytes());
        for record in &self.channels {
            out.extend_from_slice(&[record.pid, record.volume, record.pan, 0]);
        }
        out.extend_from_slice(&self.events);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::event::{OPCODE_NOTE_ONCE, OPCODE_WHEEL};

    const RATE: u32 = 1000;

    fn collect(song: &mut Song) -> Vec<(u64, Event)> {
        let mut now = 0u64;
        let mut out = Vec::new();
        while let Some(frames) = song.update(false, |e| out.push((now, e))).unwrap() {
            song.advance(frames);
            now += frames as u64;
        }
        out
    }

    fn simple() -> Vec<u8> {
        SongWriter::new(500_000)
            .channel(0, ChannelRecord { pid: 2, volume: 0x80, pan: 0x80 })
            .note(0, 60, 127, 100)
            .wait(130)
            .note(3, 64, 64, 0)
            .wheel(3, 0x3fff)
            .wait(10)
            .finish()
    }

    #[test]
    fn header_validation() {
        let good = simple();
        assert!(Song::new(RATE, &good, false, None).is_ok());
        assert_eq!(Song::new(RATE, &good[..41], false, None).unwrap_err(), DecodeError::Truncated(41));

        let mut bad = good.clone();
        bad[3] = b'Q';
        assert_eq!(Song::new(RATE, &bad, false, None).unwrap_err(), DecodeError::Signature);

        let mut bad = good.clone();
        bad[4..6].copy_from_slice(&[0, 0]);
        assert_eq!(Song::new(RATE, &bad, false, None).unwrap_err(), DecodeError::Header("tempo"));

        let mut bad = good.clone();
        bad[6..8].copy_from_slice(&[0, 41]);
        assert_eq!(Song::new(RATE, &bad, false, None).unwrap_err(), DecodeError::Header("start"));

        let mut bad = good;
        let len = bad.len() as u16;
        bad[8..10].copy_from_slice(&len.to_be_bytes());
        assert_eq!(Song::new(RATE, &bad, false, None).unwrap_err(), DecodeError::Header("loop"));
    }

    #[test]
    fn writer_round_trips_timing() {
        let bytes = simple();
        let mut song = Song::new(RATE, &bytes, false, Some((0, 7))).unwrap();
        assert_eq!(song.tempo(), 500);
        assert_eq!(song.channel_records()[0], ChannelRecord { pid: 2, volume: 0x80, pan: 0x80 });
        assert_eq!(song.channel_records()[1].volume, 0);

        let events = collect(&mut song);
        assert_eq!(events.len(), 3);
        let (t, e) = events[0];
        assert_eq!((t, e.chid, e.opcode, e.a, e.b), (0, 0, OPCODE_NOTE_ONCE, 60, 127));
        // 100 ms rounds down to 3 units of 32.
        assert_eq!(e.dur, 96);
        let (t, e) = events[1];
        assert_eq!((t, e.chid, e.a, e.dur), (130, 3, 64, 0));
        // 2-bit velocity 0b10 widened to 7 bits.
        assert_eq!(e.b, 0x2a);
        let (t, e) = events[2];
        assert_eq!((t, e.opcode), (130, OPCODE_WHEEL));
        assert_eq!(e.a as u16 | (e.b as u16) << 7, 0x3fc0);
    }

    #[test]
    fn long_waits_split_into_63_ms_delays() {
        let bytes = SongWriter::new(1_000_000).wait(200).note(0, 1, 1, 0).finish();
        assert_eq!(&bytes[SONG_HEADER_LEN..SONG_HEADER_LEN + 4], &[63, 63, 63, 11]);
        let song = Song::new(RATE, &bytes, false, None).unwrap();
        assert_eq!(song.duration_ms(), 200);
        assert_eq!(song.duration_beats(), 0.2);
    }

    #[test]
    fn playhead_tracks_delays() {
        let bytes = simple();
        let mut song = Song::new(RATE, &bytes, false, None).unwrap();
        assert_eq!(song.playhead(0.0), 0.0);
        song.update(false, |_| {}).unwrap();
        song.advance(63);
        assert!((song.playhead(0.0) - 0.126).abs() < 1e-9);
        assert_eq!(song.update(false, |_| {}).unwrap(), Some(63));
        song.advance(30);
        assert!((song.playhead(0.0) - 0.186).abs() < 1e-9);
        assert!((song.playhead(0.05) - 0.086).abs() < 1e-9);
        assert_eq!(song.playhead(1.0), 0.0);
    }

    #[test]
    fn repeat_loops_with_a_one_frame_delay() {
        let bytes = SongWriter::new(500_000).note(1, 60, 100, 0).wait(5).finish();
        let mut song = Song::new(RATE, &bytes, true, None).unwrap();
        let mut notes = 0;
        let mut frames = 0;
        while frames < 100 {
            let delay = song.update(false, |_| notes += 1).unwrap().unwrap();
            song.advance(delay);
            frames += delay;
        }
        // 5 ms of body plus 1 frame of loop overhead per pass.
        assert_eq!(notes, 100 / 6 + 1);
    }

    #[test]
    fn end_without_repeat() {
        let bytes = SongWriter::new(500_000).note(1, 60, 100, 0).finish();
        let mut song = Song::new(RATE, &bytes, false, None).unwrap();
        let mut notes = 0;
        assert_eq!(song.update(false, |_| notes += 1).unwrap(), None);
        assert_eq!(notes, 1);
    }

    #[test]
    fn reserved_and_truncated_events() {
        let mut bytes = SongWriter::new(500_000).finish();
        bytes.push(0xb0);
        let mut song = Song::new(RATE, &bytes, false, None).unwrap();
        assert_eq!(song.step(false).unwrap_err(), DecodeError::ReservedEvent(0xb0));

        let mut bytes = SongWriter::new(500_000).finish();
        bytes.extend_from_slice(&[0x8f, 0x20]);
        let mut song = Song::new(RATE, &bytes, false, None).unwrap();
        assert_eq!(song.step(false).unwrap_err(), DecodeError::Truncated(43));
    }

    #[test]
    fn set_playhead_skips_events() {
        let bytes = SongWriter::new(100_000)
            .note(0, 60, 100, 0)
            .wait(50)
            .note(0, 62, 100, 0)
            .wait(50)
            .note(0, 64, 100, 0)
            .wait(50)
            .finish();
        let mut song = Song::new(RATE, &bytes, false, None).unwrap();
        // 65 ms at 100 ms per beat. Seeking costs one frame up front.
        song.set_playhead(0.65);
        let events = collect(&mut song);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].1.a, 64);
        assert_eq!(events[0].0, 36);
    }
}

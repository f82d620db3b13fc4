//! The top-level synthesizer.
//!
//! Owns every channel, pool, printer and song, and is the only thing a host
//! talks to. All mutation happens on the thread that pulls audio; see
//! [`super::SharedSynth`] for reaching it from elsewhere.

use fastrand::Rng;

use super::builtin::Builtin;
use super::cache::PcmCache;
use super::channel::{Channel, ChannelMode, Instrument};
use super::event::*;
use super::fx::FxProc;
use super::playback::Playback;
use super::pool::{Pool, PoolEntry};
use super::song::{Song, SongStep};
use super::tables::NoteTables;
use super::voice::Voice;
use crate::config::SynthConfig;
use crate::error::ConfigError;
use crate::io::{ResourceKind, ResourceProvider};
use crate::sfg::{Pcm, Printer};
use crate::{CHANNEL_COUNT, PLAYBACK_LIMIT, PROC_LIMIT, QUANTIZE_LEVEL, SONG_CHANNEL_COUNT, VOICE_LIMIT};

const NOISE_SEED: u64 = 0x0e99_5eed;

/// Resource lookups go through this. Boxed so the synth stays `Send`.
pub type BoxedResources = Box<dyn ResourceProvider + Send>;

pub struct Synth {
    config: SynthConfig,
    /// Interleaved samples per generation chunk.
    buffer_limit: usize,
    tables: NoteTables,
    resources: Option<BoxedResources>,
    cache: PcmCache,
    printers: Vec<Printer>,
    voices: Pool<Voice>,
    procs: Pool<FxProc>,
    playbacks: Pool<Playback>,
    channels: [Option<Channel>; CHANNEL_COUNT],
    /// Bank and program per channel: bits 0..7 program, 7..14 bank LSB,
    /// 14..21 bank MSB.
    pids: [u32; CHANNEL_COUNT],
    song: Option<Song>,
    song_next: Option<Song>,
    override_zero: Option<Builtin>,
    /// Frames generated since creation. Birthdays come from here.
    framec: u64,
    /// Frame count of the update in progress, zero outside updates.
    update_in_progress: usize,
    rng: Rng,
    qbuf: Vec<f32>,
}

impl std::fmt::Debug for Synth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synth")
            .field("config", &self.config)
            .field("voices", &self.voices.len())
            .field("procs", &self.procs.len())
            .field("playbacks", &self.playbacks.len())
            .field("printers", &self.printers.len())
            .field("song", &self.song.as_ref().map(Song::resource))
            .finish_non_exhaustive()
    }
}

impl Synth {
    pub fn new(config: SynthConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let buffer_limit = config.buffer_limit();
        Ok(Self {
            config,
            buffer_limit,
            tables: NoteTables::new(config.rate),
            resources: None,
            cache: PcmCache::new(),
            printers: Vec::new(),
            voices: Pool::with_capacity(VOICE_LIMIT),
            procs: Pool::with_capacity(PROC_LIMIT),
            playbacks: Pool::with_capacity(PLAYBACK_LIMIT),
            channels: Default::default(),
            pids: [0; CHANNEL_COUNT],
            song: None,
            song_next: None,
            override_zero: None,
            framec: 0,
            update_in_progress: 0,
            rng: Rng::with_seed(NOISE_SEED),
            qbuf: vec![0.0; buffer_limit],
        })
    }

    pub fn with_resources(
        config: SynthConfig,
        resources: impl ResourceProvider + Send + 'static,
    ) -> Result<Self, ConfigError> {
        let mut synth = Self::new(config)?;
        synth.set_resources(resources);
        Ok(synth)
    }

    /// Swap the resource provider. Cached sounds are kept.
    pub fn set_resources(&mut self, resources: impl ResourceProvider + Send + 'static) {
        self.resources = Some(Box::new(resources));
    }

    pub fn config(&self) -> SynthConfig {
        self.config
    }

    fn lookup(&self, kind: ResourceKind, qual: u16, id: u16) -> Option<&[u8]> {
        self.resources.as_ref()?.lookup(kind, qual, id)
    }

    // ---------------------------------------------------------------- output

    /// Fill `out` with interleaved samples. A trailing partial frame is
    /// left silent.
    pub fn update_f32(&mut self, out: &mut [f32]) {
        let chanc = self.config.channels;
        let frames = out.len() / chanc;
        self.framec += frames as u64;
        self.update_in_progress = frames;
        self.printers.retain_mut(|printer| !printer.update(frames));

        out.fill(0.0);
        for chunk in out.chunks_mut(self.buffer_limit) {
            let frames = chunk.len() / chanc;
            self.update_mono(&mut chunk[..frames]);
            expand(chunk, frames, chanc);
        }

        self.update_in_progress = 0;
        self.voices.reap();
        self.procs.reap();
        self.playbacks.reap();
    }

    /// As [`Synth::update_f32`], quantized.
    pub fn update_i16(&mut self, out: &mut [i16]) {
        let mut qbuf = std::mem::take(&mut self.qbuf);
        for chunk in out.chunks_mut(self.buffer_limit) {
            let src = &mut qbuf[..chunk.len()];
            self.update_f32(src);
            for (dst, src) in chunk.iter_mut().zip(src.iter()) {
                *dst = (*src * QUANTIZE_LEVEL) as i16;
            }
        }
        self.qbuf = qbuf;
    }

    /// One mono run, at most one chunk long. The song runs first and may
    /// split the run at its event boundaries.
    fn update_mono(&mut self, v: &mut [f32]) {
        let mut start = 0;
        while start < v.len() {
            let mut len = v.len() - start;
            if self.song.is_some() {
                match self.step_song() {
                    Some(delay) => {
                        len = len.min(delay);
                        if let Some(song) = self.song.as_mut() {
                            song.advance(len);
                        }
                    }
                    None => self.end_song(),
                }
            } else if self.song_next.is_some() && !self.has_song_voices() {
                self.song = self.song_next.take();
                self.welcome_song();
            }

            let dst = &mut v[start..start + len];
            let sine = self.tables.sine();
            for voice in self.voices.iter_mut() {
                voice.update(dst, sine, &mut self.rng);
            }
            for proc in self.procs.iter_mut() {
                proc.update(dst, sine);
            }
            for playback in self.playbacks.iter_mut() {
                playback.update(dst);
            }
            start += len;
        }
    }

    /// Dispatch the song's events at the cursor. Returns frames to its next
    /// event, or `None` once it has ended.
    fn step_song(&mut self) -> Option<usize> {
        loop {
            let step = self.song.as_mut()?.step(false);
            match step {
                Ok(SongStep::Event(event)) => self.dispatch(event),
                Ok(SongStep::Delay(frames)) => return Some(frames),
                Ok(SongStep::End) => return None,
                Err(err) => {
                    tracing::debug!(%err, "song stream is corrupt, ending it");
                    return None;
                }
            }
        }
    }

    // ----------------------------------------------------------------- songs

    /// Play song `(qual, id)`. Unless `force`, asking for the song that is
    /// already playing or pending does nothing. A missing resource fades to
    /// silence; a corrupt one changes nothing.
    pub fn play_song(&mut self, qual: u16, id: u16, force: bool, repeat: bool) {
        if !force {
            let current = self.song_next.as_ref().or(self.song.as_ref());
            if current.is_some_and(|song| song.is_resource(qual, id)) {
                return;
            }
        }
        let song = match self.lookup(ResourceKind::Song, qual, id) {
            Some(src) if !src.is_empty() => match Song::new(self.config.rate, src, repeat, Some((qual, id))) {
                Ok(song) => Some(song),
                Err(err) => {
                    tracing::debug!(qual, id, %err, "song failed to decode");
                    return;
                }
            },
            _ => None,
        };
        self.install_song(song);
    }

    /// Play a song from raw bytes. Empty input ends the current song.
    pub fn play_song_bytes(&mut self, src: &[u8], repeat: bool) {
        if src.is_empty() {
            self.song_next = None;
            self.end_song();
            return;
        }
        match Song::new(self.config.rate, src, repeat, None) {
            Ok(song) => self.install_song(Some(song)),
            Err(err) => tracing::debug!(%err, "song failed to decode"),
        }
    }

    fn install_song(&mut self, song: Option<Song>) {
        if self.song.is_none() && self.song_next.is_none() && !self.has_song_voices() {
            self.song = song;
            self.welcome_song();
            return;
        }
        self.song_next = song;
        self.end_song();
    }

    /// Drop the current song and let its voices wind down. Channels stay, a
    /// fading voice may still need them.
    fn end_song(&mut self) {
        let Some(song) = self.song.take() else {
            return;
        };
        tracing::debug!(resource = ?song.resource(), "song ended");
        for voice in self.voices.iter_mut() {
            voice.release();
        }
        for proc in self.procs.iter_mut() {
            proc.release();
        }
        self.pids[..SONG_CHANNEL_COUNT].fill(0);
    }

    /// Replace the song channels with the current song's.
    fn welcome_song(&mut self) {
        for channel in self.channels[..SONG_CHANNEL_COUNT].iter_mut() {
            *channel = None;
        }
        let Some(records) = self.song.as_ref().map(Song::channel_records) else {
            return;
        };
        tracing::debug!(resource = ?self.song.as_ref().and_then(Song::resource), "song started");
        for (chid, record) in records.iter().enumerate() {
            self.pids[chid] = record.pid as u32;
            if record.volume == 0 {
                continue;
            }
            let chid = chid as u8;
            self.instantiate_channel(chid);
            self.channel_control(chid, CONTROL_VOLUME, record.volume >> 1);
            self.channel_control(chid, CONTROL_PAN, record.pan >> 1);
        }
    }

    fn has_song_voices(&self) -> bool {
        self.voices.iter().any(Voice::is_song) || self.procs.iter().any(FxProc::is_song)
    }

    /// (qualifier, id, repeat) of the pending song, else the current one.
    /// Songs played from bytes report id 0.
    pub fn song(&self) -> (u16, u16, bool) {
        match self.song_next.as_ref().or(self.song.as_ref()) {
            Some(song) => {
                let (qual, id) = song.resource().unwrap_or((0, 0));
                (qual, id, song.repeat())
            }
            None => (0, 0, false),
        }
    }

    pub fn is_song_playing(&self) -> bool {
        self.song.is_some()
    }

    /// Song position in beats, or -1 with no song. `adjust` is seconds of
    /// generated audio the listener hasn't heard yet.
    pub fn playhead(&self, adjust: f64) -> f64 {
        match self.song_next.as_ref().or(self.song.as_ref()) {
            Some(song) => song.playhead(adjust),
            None => -1.0,
        }
    }

    pub fn set_playhead(&mut self, beats: f64) {
        if let Some(next) = self.song_next.as_mut() {
            next.set_playhead(beats);
        } else if let Some(song) = self.song.as_mut() {
            song.set_playhead(beats);
            for voice in self.voices.iter_mut() {
                voice.release();
            }
        }
    }

    /// Length of the pending or current song in beats, 0 with no song.
    pub fn duration(&self) -> f64 {
        self.song_next
            .as_ref()
            .or(self.song.as_ref())
            .map_or(0.0, Song::duration_beats)
    }

    pub fn frames_per_beat(&self) -> u32 {
        match self.song.as_ref().map(Song::tempo) {
            Some(tempo) if tempo > 0 => (tempo as u64 * self.config.rate as u64 / 1000) as u32,
            _ => self.config.rate >> 1,
        }
    }

    // ---------------------------------------------------------------- sounds

    /// Play sound `(qual, id)`. Prints it on first use and caches the PCM.
    /// Falls back to qualifier zero when `qual` has no such sound.
    pub fn play_sound(&mut self, qual: u16, id: u16, trim: f32, pan: f32) {
        if trim <= 0.0 {
            return;
        }
        for qual in [qual, 0] {
            if let Some(pcm) = self.cache.find(qual, id) {
                let pcm = pcm.clone();
                self.start_playback(pcm, trim, pan);
                return;
            }
            if self.lookup(ResourceKind::Sound, qual, id).is_some_and(|src| !src.is_empty()) {
                if let Some(pcm) = self.print_resource(qual, id) {
                    self.start_playback(pcm, trim, pan);
                }
                return;
            }
            if qual == 0 {
                return;
            }
        }
    }

    fn print_resource(&mut self, qual: u16, id: u16) -> Option<Pcm> {
        let Some(src) = self.resources.as_ref().and_then(|r| r.lookup(ResourceKind::Sound, qual, id)) else {
            return None;
        };
        let pcm = start_printer(&mut self.printers, self.config.rate, self.update_in_progress, src)?;
        if let Err(at) = self.cache.search(qual, id) {
            self.cache.insert(at, qual, id, pcm.clone());
        }
        Some(pcm)
    }

    /// Print and play raw SFG bytes. Never cached.
    pub fn play_sound_bytes(&mut self, src: &[u8], trim: f32, pan: f32) {
        if trim <= 0.0 || src.is_empty() {
            return;
        }
        if let Some(pcm) = start_printer(&mut self.printers, self.config.rate, self.update_in_progress, src) {
            self.start_playback(pcm, trim, pan);
        }
    }

    fn start_playback(&mut self, pcm: Pcm, trim: f32, pan: f32) {
        self.playbacks.insert(Playback::new(pcm, trim, pan));
    }

    /// Drop every printed sound, and the playbacks and printers holding them.
    pub fn clear_cache(&mut self) {
        self.playbacks.clear();
        self.printers.clear();
        self.cache.clear();
    }

    // ---------------------------------------------------------------- events

    /// The event bus. Songs use it too, so channels 0..=7 belong to the song
    /// while one is playing.
    pub fn event(&mut self, chid: u8, opcode: u8, a: u8, b: u8, dur: i32) {
        match opcode {
            OPCODE_NOTE_OFF => self.note_off(chid, a),
            OPCODE_NOTE_ON => self.note_on(chid, a, b),
            OPCODE_NOTE_ONCE => self.note_once(chid, a, b, dur),
            OPCODE_CONTROL => self.control(chid, a, b),
            OPCODE_PROGRAM => self.program(chid, a),
            OPCODE_WHEEL => self.wheel(chid, a as u16 | (b as u16) << 7),
            OPCODE_RESET => self.reset(chid),
            _ => {}
        }
    }

    pub fn dispatch(&mut self, event: Event) {
        self.event(event.chid, event.opcode, event.a, event.b, event.dur);
    }

    /// Apply every queued message. Returns how many there were.
    pub fn drain_messages(&mut self, rx: &mut impl MessageReceiver) -> usize {
        let mut count = 0;
        while let Some(message) = rx.pop() {
            count += 1;
            match message {
                SynthMessage::Event(event) => self.dispatch(event),
                SynthMessage::PlaySong { qual, id, force, repeat } => self.play_song(qual, id, force, repeat),
                SynthMessage::PlaySound { qual, id, trim, pan } => self.play_sound(qual, id, trim, pan),
                SynthMessage::SetPlayhead { beats } => self.set_playhead(beats),
                SynthMessage::AllNotesOff => {
                    for voice in self.voices.iter_mut() {
                        voice.release();
                    }
                    for proc in self.procs.iter_mut() {
                        proc.release_notes();
                    }
                }
            }
        }
        count
    }

    /// Channel `chid`, instantiated from its pid on first use.
    fn channel_mode_lazy(&mut self, chid: u8) -> Option<ChannelMode> {
        let index = chid as usize;
        if index >= CHANNEL_COUNT {
            return None;
        }
        if self.channels[index].is_none() {
            self.instantiate_channel(chid);
        }
        self.channels[index].as_ref().map(Channel::mode)
    }

    fn instantiate_channel(&mut self, chid: u8) {
        let index = chid as usize;
        let rate = self.config.rate;
        let Some(channel) = Channel::new(chid, self.pids[index], rate, &self.tables, self.override_zero.as_ref())
        else {
            return;
        };
        if let Instrument::Fx(params) = channel.instrument() {
            let proc = FxProc::new(&channel, params, rate, self.frames_per_beat(), self.framec);
            self.procs.insert(proc);
        }
        self.channels[index] = Some(channel);
    }

    fn proc_mut(&mut self, chid: u8) -> Option<&mut FxProc> {
        self.procs.iter_mut().find(|p| !p.is_defunct() && p.chid() == chid)
    }

    fn begin_voice(&mut self, chid: u8, note: u8, velocity: u8, dur: i32) {
        let Some(channel) = self.channels.get(chid as usize).and_then(Option::as_ref) else {
            return;
        };
        if let Some(voice) = Voice::begin(channel, note, velocity, dur, self.config.rate, &self.tables, self.framec) {
            self.voices.insert(voice);
        }
    }

    fn play_drum(&mut self, chid: u8, note: u8, velocity: u8) {
        let Some(channel) = self.channels[chid as usize].as_ref() else {
            return;
        };
        if let Instrument::Drum { base } = *channel.instrument() {
            let (trim, pan) = (channel.drum_trim(velocity), channel.pan());
            self.play_sound(0, base.wrapping_add(note as u16), trim, pan);
        }
    }

    fn note_on(&mut self, chid: u8, note: u8, velocity: u8) {
        match self.channel_mode_lazy(chid) {
            None => {}
            Some(ChannelMode::Drum) => self.play_drum(chid, note, velocity),
            Some(ChannelMode::Fx) => {
                let framec = self.framec;
                if let Some(proc) = self.procs.iter_mut().find(|p| !p.is_defunct() && p.chid() == chid) {
                    proc.note_on(note, velocity, &self.tables, framec);
                }
            }
            Some(_) => self.begin_voice(chid, note, velocity, i32::MAX),
        }
    }

    fn note_once(&mut self, chid: u8, note: u8, velocity: u8, dur: i32) {
        match self.channel_mode_lazy(chid) {
            None => {}
            Some(ChannelMode::Drum) => self.play_drum(chid, note, velocity),
            Some(ChannelMode::Fx) => {
                let framec = self.framec;
                if let Some(proc) = self.procs.iter_mut().find(|p| !p.is_defunct() && p.chid() == chid) {
                    proc.note_once(note, velocity, dur, &self.tables, framec);
                }
            }
            Some(_) => self.begin_voice(chid, note, velocity, dur),
        }
    }

    fn note_off(&mut self, chid: u8, note: u8) {
        match self.channel_mode_lazy(chid) {
            None | Some(ChannelMode::Drum) => {}
            Some(ChannelMode::Fx) => {
                if let Some(proc) = self.proc_mut(chid) {
                    proc.note_off(note);
                }
            }
            Some(_) => {
                if let Some(voice) = self.voices.iter_mut().find(|v| v.is_note(chid, note)) {
                    voice.release();
                }
            }
        }
    }

    fn control(&mut self, chid: u8, key: u8, value: u8) {
        let Some(pid) = self.pids.get_mut(chid as usize) else {
            return;
        };
        // Bank changes apply at the next program change.
        match key {
            CONTROL_BANK_MSB => *pid = (*pid & 0xffe0_3fff) | ((value as u32) << 14),
            CONTROL_BANK_LSB => *pid = (*pid & 0xffff_c07f) | ((value as u32) << 7),
            0x21..=0x3f => {}
            _ => self.channel_control(chid, key, value),
        }
    }

    fn channel_control(&mut self, chid: u8, key: u8, value: u8) {
        let Some(mode) = self.channel_mode_lazy(chid) else {
            return;
        };
        if let Some(channel) = self.channels[chid as usize].as_mut() {
            channel.control(key, value);
        }
        if mode == ChannelMode::Fx {
            if let Some(proc) = self.proc_mut(chid) {
                proc.control(key, value);
            }
        }
    }

    /// Swap the program. The new channel is built lazily by the next event
    /// that needs it.
    fn program(&mut self, chid: u8, program: u8) {
        let index = chid as usize;
        if index >= CHANNEL_COUNT {
            return;
        }
        self.pids[index] = (self.pids[index] & !0x7f) | (program & 0x7f) as u32;
        if self.channels[index].is_some() {
            self.drop_channel(chid);
        }
    }

    fn wheel(&mut self, chid: u8, value: u16) {
        let Some(mode) = self.channel_mode_lazy(chid) else {
            return;
        };
        let Some(channel) = self.channels[chid as usize].as_mut() else {
            return;
        };
        if channel.wheel() == value {
            return;
        }
        match channel.set_wheel(value) {
            Some(bend) => {
                for voice in self.voices.iter_mut().filter(|v| !v.is_defunct() && v.chid() == chid) {
                    voice.set_bend(bend);
                }
            }
            None if mode == ChannelMode::Fx => {
                if let Some(proc) = self.proc_mut(chid) {
                    proc.wheel(value);
                }
            }
            None => {}
        }
    }

    fn reset(&mut self, chid: u8) {
        match chid as usize {
            index if index < SONG_CHANNEL_COUNT => {}
            index if index < CHANNEL_COUNT => self.drop_channel(chid),
            _ => {
                for chid in 0..CHANNEL_COUNT as u8 {
                    self.drop_channel(chid);
                }
            }
        }
    }

    /// Delete a channel along with every voice and proc on it, without any
    /// release tail.
    fn drop_channel(&mut self, chid: u8) {
        self.voices.retain(|v| v.chid() != chid);
        self.procs.retain(|p| p.chid() != chid);
        if let Some(channel) = self.channels.get_mut(chid as usize) {
            *channel = None;
        }
    }

    /// Replace instrument zero, or restore the built-in one with `None`.
    /// Every voice, proc and channel is dropped immediately; songs and
    /// playbacks carry on.
    pub fn override_program_zero(&mut self, builtin: Option<Builtin>) {
        self.override_zero = builtin;
        self.voices.clear();
        self.procs.clear();
        for channel in self.channels.iter_mut() {
            *channel = None;
        }
    }

    // --------------------------------------------------------- introspection

    pub fn voice_count(&self) -> usize {
        self.voices.live()
    }

    pub fn proc_count(&self) -> usize {
        self.procs.live()
    }

    pub fn playback_count(&self) -> usize {
        self.playbacks.live()
    }

    pub fn printer_count(&self) -> usize {
        self.printers.len()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn channel_mode(&self, chid: u8) -> Option<ChannelMode> {
        self.channels.get(chid as usize)?.as_ref().map(Channel::mode)
    }

    pub fn frames_generated(&self) -> u64 {
        self.framec
    }
}

/// Decode `src` and register a printer for it. Printers created mid-update
/// catch up by that update's length right away.
fn start_printer(printers: &mut Vec<Printer>, rate: u32, pending: usize, src: &[u8]) -> Option<Pcm> {
    let mut printer = match Printer::new(rate, src) {
        Ok(printer) => printer,
        Err(err) => {
            tracing::debug!(%err, "sound failed to decode");
            return None;
        }
    };
    if pending > 0 {
        printer.update(pending);
    }
    let pcm = printer.pcm().clone();
    printers.push(printer);
    Some(pcm)
}

/// Spread `frames` mono samples at the front of `v` across `chanc` channels.
fn expand(v: &mut [f32], frames: usize, chanc: usize) {
    if chanc < 2 {
        return;
    }
    for i in (0..frames).rev() {
        let sample = v[i];
        v[i * chanc..(i + 1) * chanc].fill(sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ResourceStore;
    use crate::synth::song::{ChannelRecord, SongWriter};

    const RATE: u32 = 22_050;

    fn store() -> ResourceStore {
        let mut store = ResourceStore::new();
        let song = SongWriter::new(500_000)
            .channel(0, ChannelRecord { pid: 0x22, volume: 0xff, pan: 0x80 })
            .channel(1, ChannelRecord { pid: 0x19, volume: 0x80, pan: 0x80 })
            .note(0, 60, 127, 32)
            .note(1, 64, 100, 64)
            .wait(100)
            .finish();
        store.insert(ResourceKind::Song, 0, 7, song);
        store
            .insert_sfg_source(0, "sound 1\nshape square\nlevel 1 50 0\nend\nsound 0x80\nshape noise\nlevel 1 30 0\nend\n", None)
            .unwrap();
        store
    }

    fn synth(channels: usize) -> Synth {
        Synth::with_resources(SynthConfig::new(RATE, channels).unwrap(), store()).unwrap()
    }

    fn render(synth: &mut Synth, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames * synth.config().channels];
        synth.update_f32(&mut out);
        out
    }

    #[test]
    fn rejects_bad_config() {
        let config = SynthConfig { rate: 10, channels: 1 };
        assert_eq!(Synth::new(config).unwrap_err(), ConfigError::Rate(10));
    }

    #[test]
    fn silent_without_input() {
        let mut synth = synth(2);
        assert!(render(&mut synth, 3000).iter().all(|&s| s == 0.0));
        assert_eq!(synth.playhead(0.0), -1.0);
        assert_eq!(synth.song(), (0, 0, false));
        assert_eq!(synth.frames_per_beat(), RATE / 2);
    }

    #[test]
    fn bounded_note_sounds_then_decays() {
        let mut synth = synth(1);
        synth.event(0, OPCODE_PROGRAM, 0x22, 0, 0);
        synth.event(0, OPCODE_NOTE_ONCE, 60, 0x7f, (RATE / 1000 * 32) as i32);
        let head = render(&mut synth, 2048);
        assert!(head.iter().any(|&s| s != 0.0));
        assert_eq!(synth.voice_count(), 1);
        for _ in 0..40 {
            render(&mut synth, 1024);
        }
        assert_eq!(synth.voice_count(), 0);
        assert!(render(&mut synth, 256).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn channels_are_duplicated() {
        let mut synth = synth(3);
        synth.event(9, OPCODE_NOTE_ON, 69, 100, 0);
        let out = render(&mut synth, 500);
        assert!(out.iter().any(|&s| s != 0.0));
        for frame in out.chunks_exact(3) {
            assert_eq!(frame[0], frame[1]);
            assert_eq!(frame[1], frame[2]);
        }
    }

    #[test]
    fn i16_matches_scaled_f32() {
        let mut a = synth(2);
        let mut b = synth(2);
        for s in [&mut a, &mut b] {
            s.event(10, OPCODE_NOTE_ON, 50, 127, 0);
        }
        let f = render(&mut a, 3000);
        let mut i = vec![0i16; 6000];
        b.update_i16(&mut i);
        for (f, i) in f.iter().zip(&i) {
            assert_eq!((f * QUANTIZE_LEVEL) as i16, *i);
        }
    }

    #[test]
    fn play_song_twice_is_a_no_op() {
        let mut synth = synth(1);
        synth.play_song(0, 7, false, true);
        assert_eq!(synth.song(), (0, 7, true));
        assert_eq!(synth.channel_mode(0), Some(ChannelMode::Wave));
        assert_eq!(synth.channel_mode(1), Some(ChannelMode::Fx));
        assert_eq!(synth.proc_count(), 1);
        render(&mut synth, 1000);
        let playhead = synth.playhead(0.0);
        assert!(playhead > 0.0);

        synth.play_song(0, 7, false, true);
        assert!(synth.is_song_playing());
        assert_eq!(synth.playhead(0.0), playhead);
    }

    #[test]
    fn song_swap_waits_for_voices() {
        let mut synth = synth(1);
        synth.play_song(0, 7, false, false);
        render(&mut synth, 500);
        assert!(synth.voice_count() > 0);

        synth.play_song(0, 7, true, false);
        // Current song ended, new one pending until the tails finish.
        assert!(!synth.is_song_playing());
        assert_eq!(synth.song(), (0, 7, false));
        render(&mut synth, 256);
        assert!(!synth.is_song_playing());
        for _ in 0..100 {
            render(&mut synth, 1024);
        }
        assert!(synth.is_song_playing() || synth.song() == (0, 0, false));
    }

    #[test]
    fn missing_song_fades_to_silence() {
        let mut synth = synth(1);
        synth.play_song(0, 7, false, true);
        render(&mut synth, 500);
        synth.play_song(0, 99, false, true);
        assert!(!synth.is_song_playing());
        assert_eq!(synth.song(), (0, 0, false));
        for _ in 0..100 {
            render(&mut synth, 1024);
        }
        assert_eq!(synth.voice_count() + synth.proc_count(), 0);
    }

    #[test]
    fn corrupt_song_changes_nothing() {
        let mut synth = synth(1);
        synth.play_song(0, 7, false, true);
        synth.play_song_bytes(&[0xbe, 0xee, 0xee, b'X'], false);
        assert_eq!(synth.song(), (0, 7, true));
    }

    #[test]
    fn sounds_print_once_and_cache() {
        let mut synth = synth(1);
        synth.play_sound(0, 1, 1.0, 0.0);
        synth.play_sound(0, 1, 1.0, 0.0);
        assert_eq!(synth.cache_len(), 1);
        assert_eq!(synth.printer_count(), 1);
        assert_eq!(synth.playback_count(), 2);
        assert!(render(&mut synth, 256).iter().any(|&s| s != 0.0));
        // Finished printers go on the next update.
        render(&mut synth, 2048);
        assert_eq!(synth.printer_count(), 0);

        synth.clear_cache();
        assert_eq!(synth.cache_len(), 0);
        assert_eq!(synth.playback_count(), 0);
    }

    #[test]
    fn sound_qualifier_falls_back_to_zero() {
        let mut synth = synth(1);
        synth.play_sound(5, 1, 1.0, 0.0);
        assert_eq!(synth.playback_count(), 1);
        assert_eq!(synth.cache_len(), 1);
        synth.play_sound(5, 2, 1.0, 0.0);
        assert_eq!(synth.playback_count(), 1);
        synth.play_sound(0, 1, 0.0, 0.0);
        assert_eq!(synth.playback_count(), 1);
    }

    #[test]
    fn sound_bytes_are_not_cached() {
        let mut synth = synth(1);
        let src = crate::sfg::compile("level 1 10 0").unwrap();
        synth.play_sound_bytes(&src, 0.5, 0.0);
        assert_eq!(synth.playback_count(), 1);
        assert_eq!(synth.cache_len(), 0);
        synth.play_sound_bytes(&[1, 2, 3], 0.5, 0.0);
        assert_eq!(synth.playback_count(), 1);
    }

    #[test]
    fn drum_channel_plays_sounds() {
        let mut synth = synth(1);
        // Bank LSB 1 program 0 is pid 0x80, drum kit 0: note n plays sound n.
        synth.event(12, OPCODE_CONTROL, CONTROL_BANK_LSB, 1, 0);
        synth.event(12, OPCODE_PROGRAM, 0, 0, 0);
        assert_eq!(synth.pids[12], 0x80);
        synth.event(12, OPCODE_NOTE_ON, 1, 100, 0);
        assert_eq!(synth.channel_mode(12), Some(ChannelMode::Drum));
        assert_eq!(synth.playback_count(), 1);
        synth.event(12, OPCODE_NOTE_OFF, 1, 0, 0);
        assert_eq!(synth.playback_count(), 1);
    }

    #[test]
    fn bank_select_bits() {
        let mut synth = synth(1);
        synth.event(3, OPCODE_PROGRAM, 0x05, 0, 0);
        synth.event(3, OPCODE_CONTROL, CONTROL_BANK_MSB, 0x7f, 0);
        synth.event(3, OPCODE_CONTROL, CONTROL_BANK_LSB, 0x01, 0);
        assert_eq!(synth.pids[3], (0x7f << 14) | (1 << 7) | 5);
        synth.event(3, OPCODE_CONTROL, 0x25, 0x7f, 0);
        assert_eq!(synth.pids[3], (0x7f << 14) | (1 << 7) | 5);
        // Out of range pid: no channel, events ignored.
        synth.event(3, OPCODE_NOTE_ON, 60, 100, 0);
        assert_eq!(synth.channel_mode(3), None);
        assert_eq!(synth.voice_count(), 0);
    }

    #[test]
    fn program_change_drops_voices_hard() {
        let mut synth = synth(1);
        synth.event(9, OPCODE_NOTE_ON, 60, 100, 0);
        assert_eq!(synth.voice_count(), 1);
        synth.event(9, OPCODE_PROGRAM, 0x02, 0, 0);
        assert_eq!(synth.voice_count(), 0);
        assert_eq!(synth.channel_mode(9), None);
        synth.event(9, OPCODE_NOTE_ON, 60, 100, 0);
        assert_eq!(synth.channel_mode(9), Some(ChannelMode::FmRelative));
    }

    #[test]
    fn note_off_releases_matching_voice() {
        let mut synth = synth(1);
        synth.event(9, OPCODE_NOTE_ON, 60, 100, 0);
        synth.event(9, OPCODE_NOTE_ON, 62, 100, 0);
        render(&mut synth, 1000);
        synth.event(9, OPCODE_NOTE_OFF, 60, 0, 0);
        render(&mut synth, 16);
        assert_eq!(synth.voice_count(), 1);
        synth.event(9, OPCODE_NOTE_OFF, 60, 0, 0);
        render(&mut synth, 16);
        assert_eq!(synth.voice_count(), 1);
    }

    #[test]
    fn reset_ignores_song_channels() {
        let mut synth = synth(1);
        synth.event(2, OPCODE_NOTE_ON, 60, 100, 0);
        synth.event(10, OPCODE_NOTE_ON, 60, 100, 0);
        synth.event(2, OPCODE_RESET, 0, 0, 0);
        assert_eq!(synth.voice_count(), 2);
        synth.event(10, OPCODE_RESET, 0, 0, 0);
        assert_eq!(synth.voice_count(), 1);
        assert_eq!(synth.channel_mode(10), None);
        synth.event(0xff, OPCODE_RESET, 0, 0, 0);
        assert_eq!(synth.voice_count(), 0);
        assert_eq!(synth.channel_mode(2), None);
    }

    #[test]
    fn events_past_channel_sixteen_are_ignored() {
        let mut synth = synth(1);
        synth.event(16, OPCODE_NOTE_ON, 60, 100, 0);
        synth.event(16, OPCODE_CONTROL, CONTROL_BANK_MSB, 1, 0);
        synth.event(16, OPCODE_PROGRAM, 1, 0, 0);
        assert_eq!(synth.voice_count(), 0);
    }

    #[test]
    fn voice_pool_is_bounded() {
        let mut synth = synth(1);
        for note in 0..100u8 {
            synth.event(9, OPCODE_NOTE_ON, note, 100, 0);
        }
        assert_eq!(synth.voice_count(), VOICE_LIMIT);
    }

    #[test]
    fn wheel_retunes_live_voices() {
        let mut plain = synth(1);
        let mut bent = synth(1);
        for s in [&mut plain, &mut bent] {
            s.event(9, OPCODE_PROGRAM, 0x50, 0, 0);
            s.event(9, OPCODE_NOTE_ON, 69, 127, 0);
            render(s, 1024);
        }
        bent.dispatch(Event::wheel(9, 0x2000));
        assert_eq!(render(&mut plain, 512), render(&mut bent, 512));
        bent.dispatch(Event::wheel(9, 0x3fff));
        assert_ne!(render(&mut plain, 512), render(&mut bent, 512));
    }

    #[test]
    fn override_zero_drops_everything() {
        let mut synth = synth(1);
        synth.event(9, OPCODE_NOTE_ON, 60, 100, 0);
        synth.override_program_zero(Some(Builtin::Wave {
            wave: [0xff, 0, 0, 0, 0, 0, 0, 0],
            level: 0x9a,
        }));
        assert_eq!(synth.voice_count(), 0);
        assert_eq!(synth.channel_mode(9), None);
        synth.event(9, OPCODE_NOTE_ON, 60, 100, 0);
        assert_eq!(synth.channel_mode(9), Some(ChannelMode::Wave));
        synth.override_program_zero(None);
        synth.event(9, OPCODE_NOTE_ON, 60, 100, 0);
        assert_eq!(synth.channel_mode(9), Some(ChannelMode::Blip));
    }

    #[test]
    fn set_playhead_and_duration() {
        let mut synth = synth(1);
        assert_eq!(synth.duration(), 0.0);
        synth.play_song(0, 7, false, true);
        assert!((synth.duration() - 0.2).abs() < 1e-9);
        render(&mut synth, 1000);
        synth.set_playhead(0.0);
        assert!(synth.playhead(0.0) < 0.01);
    }

    #[test]
    fn drained_messages_apply_in_order() {
        let mut synth = synth(1);
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(SynthMessage::from(Event::new(9, OPCODE_NOTE_ON, 60, 100, 0)));
        queue.push_back(SynthMessage::PlaySound { qual: 0, id: 1, trim: 1.0, pan: 0.0 });
        queue.push_back(SynthMessage::AllNotesOff);
        assert_eq!(synth.drain_messages(&mut queue), 3);
        assert_eq!(synth.playback_count(), 1);
        for _ in 0..10 {
            render(&mut synth, 1024);
        }
        assert_eq!(synth.voice_count(), 0);
    }

    #[test]
    fn expand_in_place() {
        let mut v = [1.0, 2.0, 3.0, 0.0, 0.0, 0.0];
        expand(&mut v, 3, 2);
        assert_eq!(v, [1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
    }
}

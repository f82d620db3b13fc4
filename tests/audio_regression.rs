//! End-to-end output checks: bounded, deterministic, properly interleaved.

use egg_synth::io::{ResourceKind, ResourceStore};
use egg_synth::synth::event::{OPCODE_CONTROL, OPCODE_NOTE_ON, OPCODE_PROGRAM, OPCODE_WHEEL};
use egg_synth::synth::{ChannelRecord, SongWriter, BUILTINS};
use egg_synth::{Synth, SynthConfig, QUANTIZE_LEVEL};

fn store() -> ResourceStore {
    let mut writer = SongWriter::new(400_000);
    writer
        .channel(0, ChannelRecord { pid: 0x04, volume: 0xff, pan: 0x80 })
        .channel(1, ChannelRecord { pid: 0x19, volume: 0xff, pan: 0x80 })
        .channel(2, ChannelRecord { pid: 0x26, volume: 0xc0, pan: 0x80 })
        .channel(3, ChannelRecord { pid: 0x80, volume: 0xff, pan: 0x80 });
    for step in 0..16u8 {
        writer.note(0, 60 + step % 12, 100, 150);
        writer.note(1, 48 + step % 5, 110, 300);
        writer.note(2, 36 + step % 3, 120, 200);
        writer.note(3, 1 + step % 2, 127, 0);
        if step == 8 {
            writer.wheel(0, 0x3000);
        }
        writer.wait(100);
    }
    let mut store = ResourceStore::new();
    store.insert(ResourceKind::Song, 0, 1, writer.finish());
    store
        .insert_sfg_source(
            0,
            "sound 1\nshape noise\nlevel 1 50 0\nlopass 800\nend\nsound 2\nshape square\nrate 400 40 100\nlevel 1 80 0\nend\n",
            None,
        )
        .unwrap();
    store
}

fn render(channels: usize, seconds: f32) -> Vec<f32> {
    let rate = 22_050;
    let mut synth = Synth::with_resources(SynthConfig::new(rate, channels).unwrap(), store()).unwrap();
    synth.play_song(0, 1, false, false);
    synth.event(12, OPCODE_PROGRAM, 0x50, 0, 0);
    synth.event(12, OPCODE_CONTROL, 0x07, 0x60, 0);
    synth.event(12, OPCODE_NOTE_ON, 72, 90, 0);
    synth.event(12, OPCODE_WHEEL, 0x00, 0x50, 0);

    let mut out = vec![0.0; (rate as f32 * seconds) as usize * channels];
    // Odd block sizes to cross song events and chunk boundaries.
    for block in out.chunks_mut(1000 * channels) {
        synth.update_f32(block);
    }
    out
}

#[test]
fn output_is_bounded_and_audible() {
    let out = render(1, 2.0);
    assert!(out.iter().all(|s| s.is_finite() && s.abs() <= 2.0));
    let rms = (out.iter().map(|s| s * s).sum::<f32>() / out.len() as f32).sqrt();
    assert!(rms > 0.001, "rms {rms}");
}

#[test]
fn output_is_deterministic() {
    assert_eq!(render(1, 1.0), render(1, 1.0));
}

#[test]
fn channels_carry_the_mono_signal() {
    let mono = render(1, 0.5);
    let quad = render(4, 0.5);
    assert_eq!(quad.len(), mono.len() * 4);
    for (frame, &m) in quad.chunks_exact(4).zip(&mono) {
        assert!(frame.iter().all(|&s| s == m));
    }
}

#[test]
fn i16_output_quantizes_f32() {
    let rate = 11_025;
    let make = || {
        let mut synth = Synth::with_resources(SynthConfig::new(rate, 2).unwrap(), store()).unwrap();
        synth.play_song(0, 1, false, false);
        synth
    };
    let mut a = make();
    let mut b = make();
    let mut f = vec![0.0f32; 4410];
    let mut i = vec![0i16; 4410];
    a.update_f32(&mut f);
    b.update_i16(&mut i);
    for (&f, &i) in f.iter().zip(&i) {
        assert_eq!((f * QUANTIZE_LEVEL) as i16, i);
    }
}

#[test]
fn every_program_makes_sound() {
    for pid in 0..BUILTINS.len() as u8 {
        let mut synth = Synth::new(SynthConfig::new(22_050, 1).unwrap()).unwrap();
        synth.event(8, OPCODE_PROGRAM, pid, 0, 0);
        synth.event(8, OPCODE_NOTE_ON, 60, 127, 0);
        let mut out = vec![0.0f32; 4096];
        synth.update_f32(&mut out);
        assert!(out.iter().any(|&s| s != 0.0), "program 0x{pid:02x} is silent");
        assert!(out.iter().all(|s| s.is_finite()), "program 0x{pid:02x} blew up");
    }
}

//! Full synth updates with realistic loads.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use egg_synth::io::{ResourceKind, ResourceStore};
use egg_synth::synth::event::{OPCODE_NOTE_ON, OPCODE_PROGRAM};
use egg_synth::synth::{ChannelRecord, SongWriter};
use egg_synth::{Synth, SynthConfig};

use crate::{BLOCK_SIZES, RATE};

fn song() -> Vec<u8> {
    let mut writer = SongWriter::new(500_000);
    for (chid, pid) in [0x00u8, 0x04, 0x10, 0x19, 0x22, 0x26, 0x50, 0x80].into_iter().enumerate() {
        writer.channel(chid as u8, ChannelRecord { pid, volume: 0xc0, pan: 0x80 });
    }
    for step in 0..64u8 {
        for chid in 0..8u8 {
            let note = 36 + (step as u32 * 5 + chid as u32 * 7) % 48;
            writer.note(chid, note as u8, 100, 250);
        }
        writer.wait(125);
    }
    writer.finish()
}

fn synth() -> Synth {
    let mut store = ResourceStore::new();
    store.insert(ResourceKind::Song, 0, 1, song());
    store
        .insert_sfg_source(0, "sound 1\nshape noise\nlevel 1 80 0\nlopass 3000\nend\n", None)
        .expect("valid sfg");
    Synth::with_resources(SynthConfig::new(RATE, 2).expect("valid config"), store).expect("valid config")
}

pub fn bench_synth(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/synth");

    for &size in BLOCK_SIZES {
        let mut out = vec![0.0f32; size * 2];

        let mut idle = synth();
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| idle.update_f32(black_box(&mut out)))
        });

        // Every voice slot busy with a held note.
        let mut chord = synth();
        for chid in 8..16u8 {
            chord.event(chid, OPCODE_PROGRAM, [0x00, 0x02, 0x04, 0x05, 0x10, 0x22, 0x26, 0x50][chid as usize - 8], 0, 0);
            for note in 0..4 {
                chord.event(chid, OPCODE_NOTE_ON, 48 + note * 4, 100, 0);
            }
        }
        group.bench_with_input(BenchmarkId::new("voices_full", size), &size, |b, _| {
            b.iter(|| chord.update_f32(black_box(&mut out)))
        });

        let mut song = synth();
        song.play_song(0, 1, false, true);
        group.bench_with_input(BenchmarkId::new("song", size), &size, |b, _| {
            b.iter(|| song.update_f32(black_box(&mut out)))
        });

        let mut i16_out = vec![0i16; size * 2];
        group.bench_with_input(BenchmarkId::new("song_i16", size), &size, |b, _| {
            b.iter(|| song.update_i16(black_box(&mut i16_out)))
        });
    }

    group.finish();
}

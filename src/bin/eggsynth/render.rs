//! Offline rendering to WAV

use std::path::Path;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use hound::{SampleFormat, WavSpec, WavWriter};

use egg_synth::{Synth, SynthConfig, BUFFER_LIMIT};

use super::assets::Program;

/// Upper bound when rendering until silence, in seconds.
const MAX_SECONDS: u32 = 600;

/// Render `program` into a 16-bit WAV. Returns frames written.
pub fn render_wav(config: SynthConfig, program: &Program, seconds: Option<f32>, path: &Path) -> EyreResult<u64> {
    let mut synth = Synth::with_resources(config, program.store.clone()).wrap_err("invalid output format")?;
    program.start(&mut synth, false);

    let spec = WavSpec {
        channels: config.channels as u16,
        sample_rate: config.rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer =
        WavWriter::create(path, spec).wrap_err_with(|| format!("failed to create {}", path.display()))?;

    let limit = match seconds {
        Some(s) => (s.max(0.0) * config.rate as f32) as u64,
        None => MAX_SECONDS as u64 * config.rate as u64,
    };
    let block_frames = BUFFER_LIMIT / config.channels;
    let mut block = vec![0i16; block_frames * config.channels];
    let mut frames = 0u64;

    while frames < limit {
        let len = (limit - frames).min(block_frames as u64) as usize;
        let out = &mut block[..len * config.channels];
        synth.update_i16(out);
        for &sample in out.iter() {
            writer.write_sample(sample)?;
        }
        frames += len as u64;
        if seconds.is_none() && is_idle(&synth) {
            break;
        }
    }

    writer.finalize().wrap_err("failed to finish WAV")?;
    tracing::debug!(frames, "render complete");
    Ok(frames)
}

fn is_idle(synth: &Synth) -> bool {
    !synth.is_song_playing()
        && synth.song() == (0, 0, false)
        && synth.voice_count() == 0
        && synth.proc_count() == 0
        && synth.playback_count() == 0
}

//! Live playback: cpal output stream driving a synth, with the TUI on the
//! main thread

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use rtrb::RingBuffer;

use egg_synth::synth::SynthMessage;
use egg_synth::{Synth, SynthConfig};

use crate::assets::{Kind, Program, SONG_ID, SOUND_ID};
use crate::ui::{UiApp, UiStateInit, UiStateUpdate, VIS_BUFFER_SIZE};

const CONTROL_QUEUE: usize = 64;

pub fn play(program: Program, repeat: bool) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let supported = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let rate = supported.sample_rate().0;
    let channels = supported.channels() as usize;
    let config = SynthConfig::new(rate, channels).wrap_err("output device format not supported")?;

    let mut synth = Synth::with_resources(config, program.store.clone()).wrap_err("failed to start synth")?;
    program.start(&mut synth, repeat);

    let duration = synth.duration();
    let restart = match program.kind {
        Kind::Song => SynthMessage::PlaySong {
            qual: 0,
            id: SONG_ID,
            force: true,
            repeat,
        },
        Kind::Sound => SynthMessage::PlaySound {
            qual: 0,
            id: SOUND_ID,
            trim: 1.0,
            pan: 0.0,
        },
    };

    let (mut audio_tx, audio_rx) = RingBuffer::<f32>::new(VIS_BUFFER_SIZE * 4);
    let (mut state_tx, state_rx) = RingBuffer::<UiStateUpdate>::new(16);
    let (control_tx, mut control_rx) = RingBuffer::<SynthMessage>::new(CONTROL_QUEUE);

    let stream = device.build_output_stream(
        &supported.into(),
        move |data: &mut [f32], _| {
            synth.drain_messages(&mut control_rx);
            synth.update_f32(data);

            // First channel only; every channel carries the same signal.
            for frame in data.chunks_exact(channels) {
                if audio_tx.push(frame[0]).is_err() {
                    break;
                }
            }
            let _ = state_tx.push(UiStateUpdate::from_synth(&synth));
        },
        |err| tracing::error!("audio stream error: {err}"),
        None,
    )?;
    stream.play()?;

    let init = UiStateInit {
        name: program.name.clone(),
        sample_rate: rate,
        duration,
    };
    let mut app = UiApp::new(audio_rx, state_rx, control_tx, restart, init);
    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();
    result
}

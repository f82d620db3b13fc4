//! eggsynth - compile, render and play egg_synth songs and sound effects
//!
//! Run with: cargo run -- play song.egs --sounds drums.sfg

mod app;
mod assets;
mod render;
mod ui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

use egg_synth::sfg::SoundId;
use egg_synth::synth::{ChannelRecord, SongWriter};
use egg_synth::SynthConfig;

#[derive(Parser)]
#[command(name = "eggsynth")]
#[command(about = "Procedural song and sound effect synthesizer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every numbered sound in an SFG file to a binary
    Compile {
        /// SFG text file
        input: PathBuf,

        /// Output directory for <id>.sfg binaries
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Render a song or sound offline to a 16-bit WAV
    Render {
        /// Song binary, or SFG text or binary
        input: PathBuf,

        /// Sound id when the input holds several
        #[arg(long)]
        id: Option<u16>,

        /// SFG file loaded as the drum and sound bank
        #[arg(long)]
        sounds: Option<PathBuf>,

        #[arg(long, default_value_t = 44_100)]
        rate: u32,

        #[arg(long, default_value_t = 2)]
        channels: usize,

        /// Fixed length; by default render until everything falls silent
        #[arg(long)]
        seconds: Option<f32>,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Play a song or sound through the default output device
    Play {
        /// Song binary, or SFG text or binary
        input: PathBuf,

        #[arg(long)]
        id: Option<u16>,

        #[arg(long)]
        sounds: Option<PathBuf>,

        /// Loop the song
        #[arg(long)]
        repeat: bool,
    },

    /// Write a short demo song
    DemoSong {
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Compile { input, out } => compile(&input, &out),
        Commands::Render {
            input,
            id,
            sounds,
            rate,
            channels,
            seconds,
            output,
        } => {
            let config = SynthConfig::new(rate, channels).wrap_err("invalid output format")?;
            let program = assets::Program::load(&input, id, sounds.as_deref())?;
            let frames = render::render_wav(config, &program, seconds, &output)?;
            println!("{}: {} frames at {} Hz", output.display(), frames, rate);
            Ok(())
        }
        Commands::Play {
            input,
            id,
            sounds,
            repeat,
        } => {
            let program = assets::Program::load(&input, id, sounds.as_deref())?;
            app::play(program, repeat)
        }
        Commands::DemoSong { output } => {
            std::fs::write(&output, demo_song())
                .wrap_err_with(|| format!("failed to write {}", output.display()))?;
            println!("wrote {}", output.display());
            Ok(())
        }
    }
}

fn compile(input: &std::path::Path, out: &std::path::Path) -> EyreResult<()> {
    let src = std::fs::read_to_string(input).wrap_err_with(|| format!("failed to read {}", input.display()))?;
    std::fs::create_dir_all(out).wrap_err_with(|| format!("failed to create {}", out.display()))?;

    let mut written = Vec::new();
    let result = egg_synth::sfg::split(&src, |block| {
        let bytes = egg_synth::sfg::compile_block(block.text, block.lineno0)?;
        written.push((block.id, bytes));
        Ok::<(), egg_synth::CompileError>(())
    });
    if let Err(err) = result {
        // Compiler style, so editors can jump to it.
        eprintln!("{}:{}: {}", input.display(), err.line, err.kind);
        std::process::exit(1);
    }

    for (id, bytes) in &written {
        let name = match id {
            SoundId::Anonymous => "sound".to_string(),
            id => id.to_string(),
        };
        let path = out.join(format!("{name}.sfg"));
        std::fs::write(&path, bytes).wrap_err_with(|| format!("failed to write {}", path.display()))?;
        println!("{} ({} bytes)", path.display(), bytes.len());
    }
    Ok(())
}

/// Two bars of arpeggio over a bass line, with a few drum hits on channel 7.
fn demo_song() -> Vec<u8> {
    const BEAT_MS: u32 = 400;
    let mut writer = SongWriter::new(BEAT_MS * 1000);
    writer
        .channel(0, ChannelRecord { pid: 0x50, volume: 0xc0, pan: 0x80 })
        .channel(1, ChannelRecord { pid: 0x22, volume: 0xff, pan: 0x80 })
        .channel(7, ChannelRecord { pid: 0x80, volume: 0xff, pan: 0x80 });

    let chords: [[u8; 4]; 4] = [[60, 64, 67, 72], [57, 60, 64, 69], [53, 57, 60, 65], [55, 59, 62, 67]];
    for chord in chords {
        writer.note(1, chord[0] - 24, 110, BEAT_MS * 2);
        for (step, &note) in chord.iter().chain(chord.iter().rev()).enumerate() {
            writer.note(0, note, 90, BEAT_MS / 2);
            if step % 4 == 0 {
                writer.note(7, 1, 120, 0);
            }
            writer.wait(BEAT_MS / 2);
        }
    }
    writer.finish()
}

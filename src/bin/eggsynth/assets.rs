//! Loading songs and sounds from disk into a resource store

use std::path::Path;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};

use egg_synth::io::{ResourceKind, ResourceStore};
use egg_synth::sfg::{self, SoundId};
use egg_synth::synth::song::SONG_SIGNATURE;
use egg_synth::synth::Song;
use egg_synth::Synth;

/// Where the loaded input lives in the store.
pub const SONG_ID: u16 = 1;
/// Sounds loaded as the main input sit above any bank id.
pub const SOUND_ID: u16 = 0xfff0;

const SFG_SIGNATURE: [u8; 2] = [0xeb, 0xeb];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Song,
    Sound,
}

/// One playable input plus the resources it needs.
pub struct Program {
    pub kind: Kind,
    pub name: String,
    pub store: ResourceStore,
}

impl Program {
    /// Load `input` (song binary, SFG binary or SFG text) and, optionally, an
    /// SFG text file of numbered sounds for drum channels.
    pub fn load(input: &Path, id: Option<u16>, sounds: Option<&Path>) -> EyreResult<Self> {
        let mut store = ResourceStore::new();
        if let Some(path) = sounds {
            let src = std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))?;
            let count = store
                .insert_sfg_source(0, &src, None)
                .map_err(|err| eyre!("{}:{}: {}", path.display(), err.line, err.kind))?;
            tracing::info!(count, "loaded sound bank");
        }

        let bytes = std::fs::read(input).wrap_err_with(|| format!("failed to read {}", input.display()))?;
        let name = input
            .file_name()
            .map_or_else(|| input.display().to_string(), |n| n.to_string_lossy().into_owned());

        let kind = if bytes.starts_with(&SONG_SIGNATURE) {
            // Validate up front so a bad file fails here, not as silence.
            Song::new(44_100, &bytes, false, None).wrap_err("song header is invalid")?;
            store.insert(ResourceKind::Song, 0, SONG_ID, bytes);
            Kind::Song
        } else if bytes.starts_with(&SFG_SIGNATURE) {
            sfg::Printer::new(44_100, &bytes).wrap_err("sound program is invalid")?;
            store.insert(ResourceKind::Sound, 0, SOUND_ID, bytes);
            Kind::Sound
        } else {
            let src = String::from_utf8(bytes).map_err(|_| eyre!("{} is neither a song nor SFG text", input.display()))?;
            let compiled = compile_text(&src, id).map_err(|err| eyre!("{}: {err}", input.display()))?;
            store.insert(ResourceKind::Sound, 0, SOUND_ID, compiled);
            Kind::Sound
        };

        Ok(Self { kind, name, store })
    }

    /// Start the input on `synth`. Restarts a song from the top.
    pub fn start(&self, synth: &mut Synth, repeat: bool) {
        match self.kind {
            Kind::Song => synth.play_song(0, SONG_ID, true, repeat),
            Kind::Sound => synth.play_sound(0, SOUND_ID, 1.0, 0.0),
        }
    }
}

/// Compile the block numbered `id`, or the first block when `id` is `None`.
fn compile_text(src: &str, id: Option<u16>) -> Result<Vec<u8>, String> {
    let mut found = None;
    sfg::split(src, |block| {
        if found.is_some() {
            return Ok(());
        }
        let wanted = match (id, &block.id) {
            (None, _) => true,
            (Some(id), SoundId::Number(n)) => id == *n,
            (Some(_), _) => false,
        };
        if wanted {
            found = Some(sfg::compile_block(block.text, block.lineno0)?);
        }
        Ok::<(), egg_synth::CompileError>(())
    })
    .map_err(|err| err.to_string())?;

    found.ok_or_else(|| match id {
        Some(id) => format!("no sound {id}"),
        None => "no sounds".to_string(),
    })
}

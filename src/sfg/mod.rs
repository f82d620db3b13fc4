//! Sound-effect programs: a line-oriented text DSL compiled to a compact binary,
//! and the printer that renders that binary to PCM.
//!
//! ```text
//! text ──split──▶ blocks ──compile──▶ binary ──Printer──▶ Pcm
//! ```

pub mod compile;
pub mod decode;
pub mod env;
pub mod pcm;
pub mod printer;
pub mod split;

pub use compile::{compile, compile_block};
pub use env::SfgEnv;
pub use pcm::Pcm;
pub use printer::Printer;
pub use split::{split, SoundBlock, SoundId};

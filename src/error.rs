//! Error types for the compiler, the binary decoders and configuration.
//!
//! Nothing here is fatal to a host. Decode failures inside [`crate::Synth`] are
//! logged and turned into silence; only the standalone entry points
//! ([`crate::sfg::compile`], [`crate::sfg::Printer::new`], [`crate::synth::Song::new`])
//! hand them back to the caller.

use thiserror::Error;

/// SFG text failed to compile. `line` is 1-based within the whole source file.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}: {kind}")]
pub struct CompileError {
    pub line: usize,
    pub kind: CompileErrorKind,
}

impl CompileError {
    pub fn new(line: usize, kind: CompileErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileErrorKind {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("'master' may only be the first command in a sound")]
    MasterNotFirst,
    #[error("expected number, found '{0}'")]
    ExpectedNumber(String),
    #[error("expected delay in ms, found '{0}'")]
    ExpectedMilliseconds(String),
    #[error("'{0}' not in enum for this field")]
    NotInEnum(String),
    #[error("too many tokens: {0}, limit 255")]
    TooManyTokens(usize),
    #[error("multiple '{0}' commands in voice")]
    RepeatedFeature(String),
    #[error("command '{0}' not allowed here, must come earlier")]
    MustComeEarlier(String),
    #[error("duration {0} ms exceeds limit (65535)")]
    DurationTooLong(u32),
    #[error("expected integer or C identifier for sound name, found '{0}'")]
    BadSoundId(String),
    #[error("unexpected line at outer scope, expected 'sound ID'")]
    UnexpectedOuterLine,
    #[error("unclosed sound block")]
    UnclosedBlock,
}

/// Binary song or SFG program is malformed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("signature mismatch")]
    Signature,
    #[error("unexpected end of data at offset {0}")]
    Truncated(usize),
    #[error("invalid header field: {0}")]
    Header(&'static str),
    #[error("unknown oscillator features 0x{0:02x}")]
    UnknownFeatures(u8),
    #[error("unknown wave shape {0}")]
    UnknownShape(u8),
    #[error("unknown opcode 0x{0:02x}")]
    UnknownOpcode(u8),
    #[error("reserved song event 0x{0:02x}")]
    ReservedEvent(u8),
    #[error("output rate {0} out of range 200..=200000")]
    Rate(u32),
}

/// Rejected [`crate::SynthConfig`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("sample rate {0} out of range 200..=200000")]
    Rate(u32),
    #[error("channel count {0} out of range 1..=8")]
    Channels(usize),
}

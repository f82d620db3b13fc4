//! Multi-sound SFG files.
//!
//! ```text
//! sound 12
//!   shape square
//!   level 0 10 1 200 0
//! end
//!
//! sound explosion
//!   ...
//! end
//! ```
//!
//! A file without any `sound` fence is a single anonymous sound.

use crate::error::{CompileError, CompileErrorKind};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SoundId {
    /// 1..=65535.
    Number(u16),
    /// A C identifier.
    Name(String),
    /// Unfenced input.
    Anonymous,
}

impl SoundId {
    pub fn number(&self) -> Option<u16> {
        match self {
            SoundId::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl std::fmt::Display for SoundId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoundId::Number(n) => write!(f, "{n}"),
            SoundId::Name(name) => f.write_str(name),
            SoundId::Anonymous => f.write_str("(anonymous)"),
        }
    }
}

/// One sound's source, ready for [`super::compile_block`].
#[derive(Debug, Clone, PartialEq)]
pub struct SoundBlock<'a> {
    pub id: SoundId,
    pub text: &'a str,
    /// 1-based line of the `sound` fence, 0 for anonymous input. Block lines
    /// count up from here.
    pub lineno0: usize,
}

/// Strip a `#` comment and surrounding control/space bytes.
pub(crate) fn clean_line(line: &str) -> &str {
    let line = match line.find('#') {
        Some(p) => &line[..p],
        None => line,
    };
    line.trim_matches(|c: char| c <= ' ')
}

pub(crate) fn parse_int(token: &str) -> Option<i64> {
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };
    let v = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<i64>().ok()?
    };
    Some(if negative { -v } else { v })
}

fn is_identifier(id: &str) -> bool {
    let mut bytes = id.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn parse_sound_id(id: &str) -> Option<SoundId> {
    if let Some(n) = parse_int(id) {
        if (1..=0xffff).contains(&n) {
            return Some(SoundId::Number(n as u16));
        }
    }
    is_identifier(id).then(|| SoundId::Name(id.to_string()))
}

/// Call `cb` once per `sound ... end` block, in order.
///
/// Stops at the first error from either the splitter or the callback.
pub fn split<'a, F, E>(src: &'a str, mut cb: F) -> Result<(), E>
where
    F: FnMut(SoundBlock<'a>) -> Result<(), E>,
    E: From<CompileError>,
{
    // (id, text start, fence line)
    let mut open: Option<(SoundId, usize, usize)> = None;
    let mut soundc = 0;
    let mut offset = 0;

    for (index, raw) in src.split_inclusive('\n').enumerate() {
        let lineno = index + 1;
        let start = offset;
        offset += raw.len();
        let line = clean_line(raw);
        if line.is_empty() {
            continue;
        }

        if open.is_some() {
            if line == "end" {
                if let Some((id, text_start, lineno0)) = open.take() {
                    soundc += 1;
                    cb(SoundBlock {
                        id,
                        text: &src[text_start..start],
                        lineno0,
                    })?;
                }
            }
            continue;
        }

        if line.len() >= 6 && line.starts_with("sound") && line.as_bytes()[5] <= b' ' {
            let id_text = line[6..].trim_start_matches(|c: char| c <= ' ');
            let id = parse_sound_id(id_text).ok_or_else(|| {
                CompileError::new(lineno, CompileErrorKind::BadSoundId(id_text.to_string()))
            })?;
            open = Some((id, offset, lineno));
            continue;
        }

        if soundc == 0 {
            return cb(SoundBlock {
                id: SoundId::Anonymous,
                text: src,
                lineno0: 0,
            });
        }
        return Err(CompileError::new(lineno, CompileErrorKind::UnexpectedOuterLine).into());
    }

    if let Some((_, _, lineno0)) = open {
        return Err(CompileError::new(lineno0, CompileErrorKind::UnclosedBlock).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(src: &str) -> Result<Vec<(SoundId, String, usize)>, CompileError> {
        let mut out = Vec::new();
        split(src, |block: SoundBlock<'_>| {
            out.push((block.id, block.text.to_string(), block.lineno0));
            Ok::<(), CompileError>(())
        })?;
        Ok(out)
    }

    #[test]
    fn fenced_blocks_report_id_text_and_line() {
        let src = "# bank\nsound 3\nshape square\nend\n\nsound boom_2\nlevel 0 10 1\nend\n";
        let blocks = collect(src).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].0, SoundId::Number(3));
        assert_eq!(blocks[0].1, "shape square\n");
        assert_eq!(blocks[0].2, 2);
        assert_eq!(blocks[1].0, SoundId::Name("boom_2".into()));
        assert_eq!(blocks[1].1, "level 0 10 1\n");
        assert_eq!(blocks[1].2, 6);
    }

    #[test]
    fn unfenced_input_is_one_anonymous_block() {
        let src = "shape sine\nlevel 0 10 1 20 0\n";
        let blocks = collect(src).unwrap();
        assert_eq!(blocks, vec![(SoundId::Anonymous, src.to_string(), 0)]);
    }

    #[test]
    fn rejects_bad_ids() {
        for id in ["0", "65536", "9lives", "a-b"] {
            let src = format!("sound {id}\nend\n");
            let err = collect(&src).unwrap_err();
            assert_eq!(err.line, 1, "{id}");
            assert!(matches!(err.kind, CompileErrorKind::BadSoundId(_)), "{id}");
        }
    }

    #[test]
    fn outer_line_after_block_is_error() {
        let err = collect("sound 1\nend\nshape sine\n").unwrap_err();
        assert_eq!(err, CompileError::new(3, CompileErrorKind::UnexpectedOuterLine));
    }

    #[test]
    fn unclosed_block_cites_fence_line() {
        let err = collect("\n\nsound 9\nshape sine\n").unwrap_err();
        assert_eq!(err, CompileError::new(3, CompileErrorKind::UnclosedBlock));
    }

    #[test]
    fn parse_int_accepts_hex_and_sign() {
        assert_eq!(parse_int("0x10"), Some(16));
        assert_eq!(parse_int("-5"), Some(-5));
        assert_eq!(parse_int("1.5"), None);
        assert_eq!(parse_int(""), None);
    }
}

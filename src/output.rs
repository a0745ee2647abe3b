//! Terminal output for search hits, mined prefixes and file statistics

use crate::index::Candidate;
use crate::position::{CharOffset, TokenOffset};
use crate::token::TokenFile;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Characters of text shown after each hit
const CONTEXT_CHARS: u64 = 40;

fn stdout(color: bool) -> StandardStream {
    StandardStream::stdout(if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    })
}

/// Print every hit as `position:` followed by the match and the text after it
pub fn print_hits(token_file: &dyn TokenFile, query: &str, hits: &[TokenOffset], color: bool) -> io::Result<()> {
    write_hits(&mut stdout(color), token_file, query, hits)
}

pub fn write_hits<W: WriteColor>(
    out: &mut W,
    token_file: &dyn TokenFile,
    query: &str,
    hits: &[TokenOffset],
) -> io::Result<()> {
    let query_chars = query.chars().count() as u64;
    for &hit in hits {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "{}", hit)?;
        out.reset()?;
        write!(out, ":")?;

        let text = token_file
            .read_string(hit, CharOffset(query_chars + CONTEXT_CHARS), CharOffset::ZERO)
            .map_err(io::Error::other)?;
        let split = text
            .char_indices()
            .nth(query_chars as usize)
            .map_or(text.len(), |(i, _)| i);

        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(out, "{}", escape(&text[..split]))?;
        out.reset()?;
        writeln!(out, "{}", escape(&text[split..]))?;
    }
    Ok(())
}

/// Print mined prefixes as a fitness / count / prefix table
pub fn print_candidates(candidates: &[Candidate], color: bool) -> io::Result<()> {
    write_candidates(&mut stdout(color), candidates)
}

pub fn write_candidates<W: WriteColor>(out: &mut W, candidates: &[Candidate]) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_bold(true))?;
    writeln!(out, "{:>10} {:>8}  prefix", "fitness", "count")?;
    out.reset()?;
    for candidate in candidates {
        write!(out, "{:>10} {:>8}  ", candidate.fitness(), candidate.count)?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        writeln!(out, "\"{}\"", escape(&candidate.prefix))?;
        out.reset()?;
    }
    Ok(())
}

/// Print `label: value` lines with the labels highlighted
pub fn print_fields(fields: &[(&str, String)], color: bool) -> io::Result<()> {
    let mut out = stdout(color);
    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in fields {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(out, "{:<width$}", label, width = width)?;
        out.reset()?;
        writeln!(out, "  {}", value)?;
    }
    Ok(())
}

/// Control characters written as escapes so every hit stays on one line
fn escape(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' => "\\n".to_string(),
            '\r' => "\\r".to_string(),
            '\t' => "\\t".to_string(),
            c if c.is_control() => c.escape_unicode().to_string(),
            c => c.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::ByteTokenFile;
    use termcolor::NoColor;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a\tb\nc"), "a\\tb\\nc");
        assert_eq!(escape("\u{1}"), "\\u{1}");
    }

    #[test]
    fn test_write_hits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, b"ab\ncd").unwrap();
        let file = ByteTokenFile::open(&path).unwrap();

        let mut out = NoColor::new(Vec::new());
        write_hits(&mut out, &file, "b", &[TokenOffset(1)]).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.starts_with("1:b\\ncdab"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_write_candidates() {
        let mut out = NoColor::new(Vec::new());
        let candidates = vec![Candidate {
            prefix: "the ".to_string(),
            count: 100,
        }];
        write_candidates(&mut out, &candidates).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.contains("\"the \""));
        assert!(text.contains("100"));
    }
}

//! Compress a token file against a codec and expand it back

use super::trie::PrefixTrie;
use super::{save_codec, validate_codec};
use crate::error::{Error, Result};
use crate::position::{ElementOffset, TokenOffset};
use crate::storage::CodeArray;
use crate::token::{Encoding, TokenFile};
use crate::utils::paths::{compressed_path, dictionary_path};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Characters of upcoming text quoted in a coverage error
const UPCOMING_PREVIEW_CHARS: usize = 32;

/// Encode `token_file` with `codec`, writing `<file>.compressed` (one `u32`
/// LE code per emitted entry) and `<file>.dictionary`. Returns both paths.
///
/// At each position the longest entry spelling the next whole tokens is
/// chosen. A position no entry covers fails with `NoCoveringPrefix` and
/// leaves neither file behind.
pub fn write_compressed(token_file: &dyn TokenFile, codec: &[String]) -> Result<(PathBuf, PathBuf)> {
    validate_codec(codec)?;
    let start = Instant::now();
    let trie = PrefixTrie::new(codec);
    let code_path = compressed_path(token_file.path());
    let dict_path = dictionary_path(token_file.path());

    let emitted = match encode_tokens(token_file, &trie, &code_path) {
        Ok(emitted) => emitted,
        Err(e) => {
            let _ = fs::remove_file(&code_path);
            return Err(e);
        }
    };
    if let Err(e) = save_codec(codec, &dict_path) {
        let _ = fs::remove_file(&code_path);
        let _ = fs::remove_file(&dict_path);
        return Err(e);
    }

    info!(
        path = %token_file.path().display(),
        tokens = token_file.token_count().get(),
        codes = emitted,
        entries = codec.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "compressed token file"
    );
    Ok((code_path, dict_path))
}

fn encode_tokens(token_file: &dyn TokenFile, trie: &PrefixTrie, code_path: &Path) -> Result<u64> {
    let mut writer = BufWriter::with_capacity(65536, File::create(code_path)?);
    let count = token_file.token_count().get();
    let mut position = 0u64;
    let mut emitted = 0u64;

    while position < count {
        let remaining = (count - position) as usize;
        let tokens = token_file.tokens(TokenOffset(position)).take(remaining);
        let Some((code, consumed)) = trie.longest_match(tokens) else {
            let upcoming: String = token_file
                .chars(token_file.token_to_char(TokenOffset(position)))
                .take(UPCOMING_PREVIEW_CHARS)
                .collect();
            return Err(Error::NoCoveringPrefix { position, upcoming });
        };
        writer.write_all(&code.to_le_bytes())?;
        position += consumed as u64;
        emitted += 1;
    }

    writer.flush()?;
    debug!(codes = emitted, "wrote code file");
    Ok(emitted)
}

/// Decode `code_file` with `codec`, writing the text of each code to
/// `output` in `encoding`. Returns the number of bytes written.
pub fn expand(codec: &[String], code_file: &Path, output: &Path, encoding: Encoding) -> Result<u64> {
    let codes = CodeArray::open(code_file)?;
    let mut writer = BufWriter::with_capacity(65536, File::create(output)?);
    let mut buf = Vec::new();
    let mut written = 0u64;

    for i in ElementOffset::ZERO.range_to(codes.len()) {
        let code = codes.get(i)?;
        let entry = codec.get(code as usize).ok_or(Error::CodeOutOfRange {
            code,
            codec_len: codec.len(),
        })?;
        buf.clear();
        encoding.encode(entry, &mut buf);
        writer.write_all(&buf)?;
        written += buf.len() as u64;
    }

    writer.flush()?;
    debug!(
        codes = codes.len().get(),
        bytes = written,
        output = %output.display(),
        "expanded code file"
    );
    Ok(written)
}

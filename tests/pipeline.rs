//! End-to-end tests: tokenize, index, search, mine, compress and expand.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokidx::codec::{self, load_codec};
use tokidx::index::FileIndexer;
use tokidx::position::{CharOffset, ElementOffset, TokenOffset};
use tokidx::storage::{PositionArray, RecordStore};
use tokidx::token::{
    self, ByteTokenFile, CharTokenFile, CodedTokenFile, Encoding, TokenFile, TokenFileOptions,
    TokenizerKind,
};
use tokidx::config::Config;
use tokidx::utils::{
    compressed_path, dictionary_for_compressed, dictionary_path, expanded_for_compressed, expanded_path,
    index_path,
};
use tokidx::Error;

const SAMPLE: &str = "This is a test data file.";

fn write_fixture(name: &str, content: &[u8]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    (dir, path)
}

fn build<F: TokenFile>(file: F, data: &Path) -> FileIndexer<F> {
    let mut indexer = FileIndexer::create(file, &index_path(data)).unwrap();
    indexer.build_index(2).unwrap();
    indexer
}

fn offsets(values: &[u64]) -> Vec<TokenOffset> {
    values.iter().map(|v| TokenOffset(*v)).collect()
}

fn assert_sample_hits<F: TokenFile>(indexer: &FileIndexer<F>) {
    assert_eq!(indexer.find("This").unwrap(), offsets(&[0]));
    assert_eq!(indexer.find("is").unwrap(), offsets(&[2, 5]));
    assert_eq!(indexer.find("a").unwrap(), offsets(&[8, 16, 18]));
    assert_eq!(indexer.find("foo").unwrap(), offsets(&[]));
}

#[test]
fn sample_sentence_with_byte_tokens() {
    let (_dir, path) = write_fixture("sample.txt", SAMPLE.as_bytes());
    let indexer = build(ByteTokenFile::open(&path).unwrap(), &path);
    assert_sample_hits(&indexer);
}

#[test]
fn sample_sentence_with_char_tokens() {
    let (_dir, path) = write_fixture("sample.txt", SAMPLE.as_bytes());
    let indexer = build(CharTokenFile::open(&path, Encoding::Utf8, 4).unwrap(), &path);
    assert_sample_hits(&indexer);
}

#[test]
fn sample_sentence_with_single_char_buckets() {
    let (_dir, path) = write_fixture("sample.txt", SAMPLE.as_bytes());
    for kind in [TokenizerKind::Bytes, TokenizerKind::Chars] {
        let file = token::open(&path, kind, &TokenFileOptions::default()).unwrap();
        let mut indexer = FileIndexer::create(file, &index_path(&path)).unwrap();
        indexer.build_index(1).unwrap();
        assert_sample_hits(&indexer);
    }
}

#[test]
fn streams_repeat_with_the_file_period() {
    let (_dir, path) = write_fixture("period.txt", "héllo wörld \n".as_bytes());
    for kind in [TokenizerKind::Bytes, TokenizerKind::Chars, TokenizerKind::Words] {
        let file = token::open(&path, kind, &TokenFileOptions::default()).unwrap();
        let count = file.token_count().as_usize();
        for start in [0u64, 3, count as u64 + 1] {
            let twice: Vec<String> = file.tokens(TokenOffset(start)).take(2 * count).collect();
            assert_eq!(twice[..count], twice[count..], "tokenizer {}", kind);

            let chars = file.char_count().as_usize();
            let text: String = file.chars(CharOffset(start)).take(2 * chars).collect();
            let (first, second) = text.split_at(text.len() / 2);
            assert_eq!(first, second, "tokenizer {}", kind);
        }
    }
}

#[test]
fn index_survives_reopen() {
    let (_dir, path) = write_fixture("sample.txt", SAMPLE.as_bytes());
    let indexer = build(ByteTokenFile::open(&path).unwrap(), &path);
    indexer.close().unwrap();

    let reopened = FileIndexer::open(ByteTokenFile::open(&path).unwrap(), &index_path(&path)).unwrap();
    assert_sample_hits(&reopened);
}

#[test]
fn index_for_other_tokenizer_is_rejected() {
    let (_dir, path) = write_fixture("words.txt", b"one two three");
    let indexer = build(ByteTokenFile::open(&path).unwrap(), &path);
    indexer.close().unwrap();

    let words = token::open(&path, TokenizerKind::Words, &TokenFileOptions::default()).unwrap();
    assert!(matches!(
        FileIndexer::open(words, &index_path(&path)),
        Err(Error::IndexLengthMismatch { .. })
    ));
}

#[test]
fn empty_file_is_rejected_by_every_tokenizer() {
    let (_dir, path) = write_fixture("empty.txt", b"");
    for kind in [TokenizerKind::Bytes, TokenizerKind::Chars, TokenizerKind::Words] {
        assert!(matches!(
            token::open(&path, kind, &TokenFileOptions::default()),
            Err(Error::DataFileEmpty { .. })
        ));
    }
}

#[test]
fn round_trip_every_tokenizer() {
    let text = "Der Bär läuft. The bear runs; the bear rests.\n\tÉté! ".repeat(8);
    for kind in [TokenizerKind::Bytes, TokenizerKind::Chars, TokenizerKind::Words] {
        let (_dir, path) = write_fixture("corpus.txt", text.as_bytes());
        let file = token::open(&path, kind, &TokenFileOptions::default()).unwrap();
        let indexer = build(file, &path);

        let codec = indexer.build_codec(0, 32).unwrap();
        let (code_path, dict_path) = codec::write_compressed(indexer.token_file(), &codec).unwrap();
        assert_eq!(code_path, compressed_path(&path));
        assert_eq!(dict_path, dictionary_path(&path));

        let out = expanded_path(&path);
        let encoding = indexer.token_file().encoding();
        codec::expand(&load_codec(&dict_path).unwrap(), &code_path, &out, encoding).unwrap();
        assert_eq!(fs::read(&out).unwrap(), text.as_bytes(), "tokenizer {}", kind);
    }
}

#[test]
fn byte_tokens_expand_to_the_original_bytes() {
    let data = b"caf\xe9 caf\xe9 caf\xe9 \xff\x00 data";
    let (_dir, path) = write_fixture("latin.bin", data);
    let config = Config {
        tokenizer: TokenizerKind::Bytes,
        ..Config::default()
    };
    let file = token::open(&path, config.tokenizer, &config.token_file_options().unwrap()).unwrap();
    let indexer = build(file, &path);
    let codec = indexer.build_codec(0, 8).unwrap();
    let (code_path, _) = codec::write_compressed(indexer.token_file(), &codec).unwrap();

    let dict_path = dictionary_for_compressed(&code_path);
    let out = expanded_for_compressed(&code_path);
    assert_eq!(out, expanded_path(&path));
    let written = codec::expand(
        &load_codec(&dict_path).unwrap(),
        &code_path,
        &out,
        config.expand_encoding().unwrap(),
    )
    .unwrap();
    assert_eq!(written, data.len() as u64);
    assert_eq!(fs::read(&out).unwrap(), data);
}

#[test]
fn compression_shrinks_repetitive_text() {
    let text = "the quick brown fox jumps over the lazy dog. ".repeat(50);
    let (_dir, path) = write_fixture("fox.txt", text.as_bytes());
    let indexer = build(ByteTokenFile::open(&path).unwrap(), &path);
    let codec = indexer.build_codec(0, 16).unwrap();
    let (code_path, _) = codec::write_compressed(indexer.token_file(), &codec).unwrap();
    let compressed = fs::metadata(&code_path).unwrap().len();
    assert!(compressed < text.len() as u64, "{} >= {}", compressed, text.len());
}

#[test]
fn uncovered_data_leaves_no_output() {
    let (_dir, path) = write_fixture("data.txt", b"abcabx");
    let file = ByteTokenFile::open(&path).unwrap();
    let codec: Vec<String> = ["a", "b", "c", "abc"].iter().map(|s| s.to_string()).collect();
    let result = codec::write_compressed(&file, &codec);
    assert!(matches!(result, Err(Error::NoCoveringPrefix { position: 5, .. })));
    assert!(!compressed_path(&path).exists());
    assert!(!dictionary_path(&path).exists());
}

#[test]
fn compressed_output_can_be_indexed_and_searched() {
    let text = "to be or not to be, that is the question. ".repeat(6);
    let (_dir, path) = write_fixture("hamlet.txt", text.as_bytes());
    let words = token::open(&path, TokenizerKind::Words, &TokenFileOptions::default()).unwrap();
    let indexer = build(words, &path);
    let codec = indexer.build_codec(0, 8).unwrap();
    let (code_path, _) = codec::write_compressed(indexer.token_file(), &codec).unwrap();

    let coded = token::open(&code_path, TokenizerKind::Coded, &TokenFileOptions::default()).unwrap();
    assert_eq!(coded.char_count().get(), text.chars().count() as u64);
    let coded_indexer = build(coded, &code_path);

    // Hits are code positions whose text starts with the query
    let hits = coded_indexer.find("to be").unwrap();
    assert!(hits.contains(&TokenOffset::ZERO));
    for hit in &hits {
        let text = coded_indexer
            .token_file()
            .read_string(*hit, CharOffset(5), CharOffset::ZERO)
            .unwrap();
        assert_eq!(text, "to be");
    }
    let whole = coded_indexer
        .token_file()
        .read_string(TokenOffset::ZERO, CharOffset(text.chars().count() as u64), CharOffset::ZERO)
        .unwrap();
    assert_eq!(whole, text);
}

#[test]
fn coded_file_with_explicit_dictionary() {
    let (dir, path) = write_fixture("codes.bin", &[1, 0, 0, 0, 0, 0, 0, 0]);
    let dictionary = dir.path().join("my.dictionary");
    codec::save_codec(&["x".to_string(), "yz".to_string()], &dictionary).unwrap();

    let file = CodedTokenFile::open(&path, &dictionary).unwrap();
    assert_eq!(file.token_count(), TokenOffset(2));
    let text: String = file.chars(CharOffset::ZERO).take(6).collect();
    assert_eq!(text, "yzxyzx");
}

#[test]
fn mapped_array_scenario() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("longs.bin");
    let mut array = PositionArray::create(&path).unwrap();
    assert_eq!(array.len(), ElementOffset(0));
    array.append(42).unwrap();
    assert_eq!(array.len(), ElementOffset(1));
    assert_eq!(array.get(ElementOffset(0)).unwrap(), 42);
    assert!(matches!(
        array.get(ElementOffset(1)),
        Err(Error::IndexOutOfRange { index: 1, length: 1 })
    ));
}

#[test]
fn record_store_reads_back_in_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.bin");
    let mut store = RecordStore::open(&path).unwrap();
    store.append(b"alpha").unwrap();
    store.append(b"").unwrap();
    store.append("ünï".as_bytes()).unwrap();
    assert_eq!(store.get(ElementOffset(2)).unwrap(), Some("ünï".as_bytes().to_vec()));
    assert_eq!(store.get(ElementOffset(3)).unwrap(), None);
    store.close().unwrap();

    let mut reopened = RecordStore::open(&path).unwrap();
    assert_eq!(reopened.len(), ElementOffset(3));
    assert_eq!(reopened.get(ElementOffset(1)).unwrap(), Some(Vec::new()));
}

#[test]
fn periodic_document_indexes_and_searches() {
    let (_dir, path) = write_fixture("periodic.txt", "ab".repeat(700).as_bytes());
    let indexer = build(ByteTokenFile::open(&path).unwrap(), &path);
    assert_eq!(indexer.count("ab").unwrap(), 700);
    assert_eq!(indexer.count("ba").unwrap(), 700);
    assert_eq!(indexer.count("aa").unwrap(), 0);
    // The stream wraps, so a query longer than the file still matches
    let long = "ab".repeat(800);
    assert_eq!(indexer.count(&long).unwrap(), 700);
}

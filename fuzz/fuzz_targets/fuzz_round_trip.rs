#![no_main]

use libfuzzer_sys::fuzz_target;
use tokidx::codec;
use tokidx::index::FileIndexer;
use tokidx::token::{ByteTokenFile, TokenFile};
use tokidx::utils::{expanded_path, index_path};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() || data.len() > 4096 {
        return;
    }
    let Ok(dir) = tempfile::tempdir() else {
        return;
    };
    let path = dir.path().join("data.bin");
    if std::fs::write(&path, data).is_err() {
        return;
    }

    // Index, mine a covering codec, compress and expand: the bytes come back
    let file = ByteTokenFile::open(&path).unwrap();
    let mut indexer = FileIndexer::create(file, &index_path(&path)).unwrap();
    indexer.build_index(2).unwrap();
    let codec = indexer.build_codec(0, 16).unwrap();
    let (code_path, _) = codec::write_compressed(indexer.token_file(), &codec).unwrap();
    let out = expanded_path(&path);
    codec::expand(&codec, &code_path, &out, indexer.token_file().encoding()).unwrap();
    assert_eq!(std::fs::read(&out).unwrap(), data);
});

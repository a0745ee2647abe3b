#![no_main]

use libfuzzer_sys::fuzz_target;
use tokidx::token::Encoding;

fuzz_target!(|data: &[u8]| {
    // Decoding never panics and never yields more characters than bytes
    for encoding in [Encoding::Utf8, Encoding::Latin1, Encoding::Ascii] {
        let text = encoding.decode(data, encoding.max_char_bytes());
        assert!(text.chars().count() <= data.len());
    }
    // Valid UTF-8 decodes to itself
    if let Ok(s) = std::str::from_utf8(data) {
        assert_eq!(Encoding::Utf8.decode(data, 4), s);
    }
});

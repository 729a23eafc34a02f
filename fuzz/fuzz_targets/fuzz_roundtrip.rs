#![no_main]
use libfuzzer_sys::fuzz_target;
use xmlscope::parser::{parse_str_with_options, ParseOptions};
use xmlscope::serial::marshal;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let opts = ParseOptions::default().char_data(true).comments(true);
        // Parse -> marshal -> parse roundtrip should never panic
        if let Ok(root) = parse_str_with_options(s, &opts) {
            let output = marshal(&root);
            let _ = parse_str_with_options(&output, &opts);
        }
    }
});

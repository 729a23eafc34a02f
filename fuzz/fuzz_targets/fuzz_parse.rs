#![no_main]
use libfuzzer_sys::fuzz_target;
use xmlscope::parser::{parse_bytes_with_options, ParseOptions};

fuzz_target!(|data: &[u8]| {
    let opts = ParseOptions::default()
        .char_data(true)
        .comments(true)
        .proc_inst(true)
        .directives(true);
    // Parsing arbitrary bytes must never panic, and a parsed tree must
    // survive every query and rewrite pass.
    if let Ok(mut root) = parse_bytes_with_options(data, &opts) {
        let _ = root.flatten();
        let _ = root.simplify_ns();
        root.remove_empty();
    }
});

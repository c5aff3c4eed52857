#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = fdo::decompile(data) {
        if let Ok(bytes) = fdo::compile(&text) {
            _ = fdo::decompile(&bytes);
        }
    }
});

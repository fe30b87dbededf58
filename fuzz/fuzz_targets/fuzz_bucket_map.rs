#![no_main]

use hashring_eval::loader::{parse_bucket_map, parse_bucket_maps};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parse_bucket_map(text);
    }

    if let Ok(maps) = parse_bucket_maps(data) {
        assert!(maps.len() <= data.split(|&b| b == b'\n').count());
    }
});

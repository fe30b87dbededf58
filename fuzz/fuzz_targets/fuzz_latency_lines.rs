#![no_main]

use hashring_eval::loader::parse_latency_lines;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for suffixed in [false, true] {
        if let Ok(loaded) = parse_latency_lines(data, suffixed) {
            // Every accepted non-blank line yields exactly one sample
            let lines = data
                .split(|&b| b == b'\n')
                .filter(|l| !String::from_utf8_lossy(l).trim().is_empty())
                .count();
            assert_eq!(loaded.samples.len(), lines);

            if !suffixed {
                assert!(loaded.units.is_empty());
            }
            for unit in &loaded.units {
                assert!(hashring_eval::Unit::from_marker(unit).is_some());
            }
        }
    }
});

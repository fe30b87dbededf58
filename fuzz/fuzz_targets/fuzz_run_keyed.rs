#![no_main]

use hashring_eval::loader::parse_run_keyed;
use hashring_eval::max_per_run;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(observations) = parse_run_keyed(data) {
        let keys = observations.keys();
        assert_eq!(keys.len(), observations.len());

        // Every observed run has at least one value, so no key is missing
        let maxima = max_per_run(&observations, &keys).unwrap();
        for (key, max) in maxima {
            let values = observations.get(key).unwrap();
            assert!(max.is_finite());
            assert!(values.iter().all(|v| *v <= max));
        }
    }
});

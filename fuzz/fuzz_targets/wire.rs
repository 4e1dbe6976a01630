#![no_main]

use count_distinct::DistinctAccumulator;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(mut acc) = DistinctAccumulator::from_bytes(data) {
        let count = acc.distinct_count();
        assert!(count > 0);
        let bytes = acc.to_bytes().unwrap();
        let mut reloaded = DistinctAccumulator::from_bytes(&bytes).unwrap();
        assert_eq!(reloaded.distinct_count(), count);
    }

    if let Ok(mut acc) = serde_json::from_slice::<DistinctAccumulator>(data) {
        acc.push(&vec![0; acc.item_size()]);
        assert!(acc.distinct_count() > 0);
    }
});

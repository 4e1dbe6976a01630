#![no_main]

use count_distinct::DistinctAccumulator;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let item_size = usize::from(data[0] % 8) + 1;
    let records = &data[1..];

    let mut left = DistinctAccumulator::new(item_size);
    let mut right = DistinctAccumulator::new(item_size);
    let mut total = 0;
    for (i, record) in records.chunks_exact(item_size).enumerate() {
        if i % 2 == 0 {
            left.push(record);
        } else {
            right.push(record);
        }
        total += 1;
    }

    left.merge(right).unwrap();
    let count = left.distinct_count();
    assert!(count <= total);
    assert!(left.size_of() > 0);

    let collected: Vec<&[u8]> = left.records().collect();
    assert!(collected.windows(2).all(|pair| pair[0] < pair[1]));

    if count > 0 {
        let bytes = left.to_bytes().unwrap();
        let mut reloaded = DistinctAccumulator::from_bytes(&bytes).unwrap();
        assert_eq!(reloaded.distinct_count(), count);
    }
});

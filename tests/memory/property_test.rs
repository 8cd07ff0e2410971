/*!
 * Property-based tests for request and release sequences
 */

use proptest::prelude::*;
use segment_provider::{Segment, SegmentProvider, SegmentProviderConfig};

const GRANULE: usize = 64;
const SYSTEM_SEGMENT: usize = 4096;

#[derive(Debug, Clone)]
enum Op {
    Request(usize),
    Release(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1usize..3 * SYSTEM_SEGMENT).prop_map(Op::Request),
        2 => any::<usize>().prop_map(Op::Release),
    ]
}

proptest! {
    #[test]
    fn prop_live_segments_never_overlap(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let config = SegmentProviderConfig::new(GRANULE, SYSTEM_SEGMENT, usize::MAX);
        let mut provider = SegmentProvider::with_heap(config).unwrap();
        let mut live: Vec<Segment> = Vec::new();

        for op in ops {
            match op {
                Op::Request(size) => {
                    let segment = provider.request(size).unwrap();
                    prop_assert!(segment.size() >= size);
                    prop_assert_eq!(segment.size() % GRANULE, 0);
                    prop_assert!(live.iter().all(|other| !other.overlaps(&segment)));
                    live.push(segment);
                }
                Op::Release(pick) if !live.is_empty() => {
                    let segment = live.swap_remove(pick % live.len());
                    provider.release(segment).unwrap();
                }
                Op::Release(_) => {}
            }

            let stats = provider.stats();
            prop_assert_eq!(
                provider.bytes_allocated(),
                stats.system_segments * SYSTEM_SEGMENT + provider.large_bytes_allocated()
            );
            prop_assert!(provider.region_real_bytes_in_use() <= provider.region_bytes_in_use());
            prop_assert!(provider.region_bytes_in_use() <= provider.region_bytes_allocated());
            prop_assert!(provider.region_bytes_allocated() <= provider.bytes_allocated());
            prop_assert_eq!(stats.large_segments, live.iter().filter(|s| s.size() > SYSTEM_SEGMENT).count());
        }
    }
}

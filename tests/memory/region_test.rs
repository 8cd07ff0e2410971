/*!
 * Region scope tests
 */

use crate::support::{recording_provider, GRANULE};
use pretty_assertions::assert_eq;
use segment_provider::{MemoryError, Region, RegionKind};

#[test]
fn test_region_bumps_within_segment() {
    let (mut provider, _backing) = recording_provider();
    {
        let mut region = Region::new(&mut provider, "scratch");
        let a = region.allocate(8).unwrap();
        let b = region.allocate(8).unwrap();
        assert_eq!(b, a + 8);
        assert_eq!(region.segment_count(), 1);
        assert_eq!(region.bytes_allocated(), 16);
        assert!(region.log_id().is_none());
    }
    assert_eq!(provider.region_bytes_in_use(), 0);
    assert_eq!(provider.free_segment_count(), 1);
}

#[test]
fn test_region_requests_new_segment_when_full() {
    let (mut provider, _backing) = recording_provider();
    let mut region = Region::new(&mut provider, "scratch");
    region.allocate(GRANULE).unwrap();
    region.allocate(1).unwrap();
    region.allocate(3 * GRANULE).unwrap();
    assert_eq!(region.segment_count(), 3);
}

#[test]
fn test_region_rejects_zero_bytes() {
    let (mut provider, _backing) = recording_provider();
    let mut region = Region::new(&mut provider, "scratch");
    assert_eq!(region.allocate(0).unwrap_err(), MemoryError::InvalidSize(0));
}

#[test]
fn test_region_log_records_lifetime() {
    let (mut provider, _backing) = recording_provider();
    provider.set_collect_region_log();
    {
        let mut region = Region::with_kind(&mut provider, "frame", RegionKind::Stack);
        region.allocate(100).unwrap();
        region.allocate(10).unwrap();
    }

    let log = provider.region_logs().iter().next().unwrap();
    assert_eq!(log.name, "frame");
    assert_eq!(log.kind, RegionKind::Stack);
    assert_eq!(log.bytes_allocated, 110);
    assert_eq!(log.segments_requested, 1);
    assert_eq!(log.segment_bytes, 128);
    assert_eq!(log.created, 1);
    assert_eq!(log.destroyed, Some(2));
    assert_eq!(log.lifetime(), Some(1));
}

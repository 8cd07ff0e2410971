/*!
 * End-to-end allocation scenarios
 */

use crate::support::{recording_provider, BackingEvent, RecordingBacking, SYSTEM_SEGMENT};
use pretty_assertions::assert_eq;
use segment_provider::{
    CompilationRegistry, Region, SegmentProvider, SegmentProviderConfig,
};
use serial_test::serial;
use std::sync::Arc;

#[test]
fn test_small_requests_carve_one_system_segment() {
    let backing = RecordingBacking::shared();
    let config = SegmentProviderConfig::new(4, SYSTEM_SEGMENT, 1_000_000);
    let mut provider = SegmentProvider::new(config, Arc::clone(&backing)).unwrap();

    let first = provider.request(100).unwrap();
    assert_eq!(first.size(), 100);
    assert_eq!(backing.lock().requests(), vec![SYSTEM_SEGMENT]);

    let mut segments = vec![first];
    for _ in 1..10 {
        segments.push(provider.request(100).unwrap());
    }
    assert_eq!(backing.lock().requests().len(), 1);
    assert_eq!(provider.region_bytes_in_use(), 1000);

    for segment in segments {
        provider.release(segment).unwrap();
    }
    assert_eq!(provider.free_segment_count(), 10);
    assert!(backing.lock().releases().is_empty());
    assert_eq!(provider.bytes_allocated(), SYSTEM_SEGMENT);

    drop(provider);
    assert_eq!(backing.lock().releases().len(), 1);
    assert_eq!(backing.lock().outstanding(), 0);
}

#[test]
fn test_large_request_round_trips_to_backing() {
    let (mut provider, backing) = recording_provider();

    let segment = provider.request(8192).unwrap();
    let base = segment.base();
    assert_eq!(backing.lock().events, vec![BackingEvent::Requested(8192)]);

    provider.release(segment).unwrap();
    assert_eq!(
        backing.lock().events,
        vec![
            BackingEvent::Requested(8192),
            BackingEvent::Released { base, size: 8192 },
        ]
    );
    assert_eq!(provider.free_segment_count(), 0);
    assert_eq!(provider.bytes_allocated(), 0);
}

#[test]
#[serial]
fn test_three_scopes_register_one_compilation() {
    let registry = CompilationRegistry::global();
    let before = registry.len();

    let (mut provider, _backing) = recording_provider();
    provider.set_collect_region_log();
    for name in ["parse", "optimize", "emit"] {
        let mut region = Region::new(&mut provider, name);
        region.allocate(48).unwrap();
    }
    let sequence = provider.finish().unwrap().expect("registered");

    assert_eq!(registry.len(), before + 1);
    let record = registry.find(sequence).unwrap();
    let names: Vec<&str> = record.regions.iter().map(|log| log.name.as_str()).collect();
    assert_eq!(names, vec!["parse", "optimize", "emit"]);
    assert!(record.regions.iter().all(|log| log.destroyed.is_some()));
}

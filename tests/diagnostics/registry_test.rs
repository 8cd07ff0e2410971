/*!
 * Compilation registry tests
 */

use crate::support::{config, RecordingBacking};
use pretty_assertions::assert_eq;
use segment_provider::{CompilationRegistry, Region, SegmentProvider};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

fn compile(registry: Arc<CompilationRegistry>, regions: usize) -> u32 {
    let backing = RecordingBacking::shared();
    let mut provider = SegmentProvider::new(config(), backing)
        .unwrap()
        .with_registry(registry);
    provider.set_collect_region_log();
    for i in 0..regions {
        let mut region = Region::new(&mut provider, format!("pass-{}", i));
        region.allocate(32 * (i + 1)).unwrap();
    }
    provider.finish().unwrap().expect("registered")
}

#[test]
fn test_concurrent_finishes_get_unique_sequences() {
    let registry = Arc::new(CompilationRegistry::new());
    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || compile(registry, worker % 3 + 1))
        })
        .collect();

    let sequences: HashSet<u32> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(sequences.len(), 8);
    assert_eq!(registry.len(), 8);
    for summary in registry.summaries() {
        assert!(sequences.contains(&summary.sequence));
        assert!(summary.region_count >= 1);
    }
}

#[test]
fn test_drop_without_finish_still_registers() {
    let registry = Arc::new(CompilationRegistry::new());
    {
        let mut provider = SegmentProvider::with_heap(config())
            .unwrap()
            .with_registry(Arc::clone(&registry));
        provider.set_collect_region_log();
        let _segment = provider.request(100).unwrap();
    }

    let records = registry.drain();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].bytes_allocated, 4096);
    assert!(registry.is_empty());
}

#[test]
fn test_provider_without_logging_leaves_registry_alone() {
    let registry = Arc::new(CompilationRegistry::new());
    compile_silently(Arc::clone(&registry));
    assert!(registry.is_empty());
}

fn compile_silently(registry: Arc<CompilationRegistry>) {
    let mut provider = SegmentProvider::with_heap(config())
        .unwrap()
        .with_registry(registry);
    let mut region = Region::new(&mut provider, "quiet");
    region.allocate(10).unwrap();
    assert!(region.log_id().is_none());
}

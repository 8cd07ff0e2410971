/*!
 * Report output tests
 */

use crate::support::config;
use segment_provider::{print_all_compilations, CompilationRegistry, Region, SegmentProvider};
use serial_test::serial;
use std::sync::Arc;

#[test]
#[serial]
fn test_print_all_compilations_lists_global_records() {
    let mut provider = SegmentProvider::with_heap(config()).unwrap();
    provider.set_collect_region_log();
    {
        let mut region = Region::new(&mut provider, "lowering");
        region.allocate(200).unwrap();
    }
    let sequence = provider.finish().unwrap().expect("registered");

    let mut out = Vec::new();
    print_all_compilations(&mut out).unwrap();
    let report = String::from_utf8(out).unwrap();

    let header = format!("Compilation {}, Memory usage: 4096", sequence);
    assert!(report.contains(&header), "missing {:?} in:\n{}", header, report);
    assert!(report.contains("Region lowering (heap)"));
}

#[test]
fn test_json_report_includes_regions() {
    let registry = Arc::new(CompilationRegistry::new());
    let mut provider = SegmentProvider::with_heap(config())
        .unwrap()
        .with_registry(Arc::clone(&registry));
    provider.set_collect_region_log();
    {
        let mut region = Region::new(&mut provider, "codegen");
        region.allocate(64).unwrap();
    }
    let sequence = provider.finish().unwrap().expect("registered");

    let mut out = Vec::new();
    registry.write_json(&mut out).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(value[0]["sequence"], sequence);
    assert_eq!(value[0]["bytes_allocated"], 4096);
    assert_eq!(value[0]["regions"][0]["name"], "codegen");
    assert_eq!(value[0]["regions"][0]["kind"], "heap");
}

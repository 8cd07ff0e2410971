/*!
 * Segment Report
 *
 * Runs a handful of simulated compilations on worker threads, each with its
 * own segment provider and region logging enabled, then prints the
 * compilation registry.
 *
 * Environment variables:
 * - SEGMENT_PROVIDER_*: provider configuration (see `core::limits`)
 * - SEGMENT_REPORT_WORKERS: number of concurrent compilations (default: 4)
 * - SEGMENT_REPORT_JSON: print the registry as JSON instead of text
 */

use std::error::Error;
use std::thread;
use tracing::{info, warn};

use segment_provider::monitoring::span_compilation;
use segment_provider::{
    init_tracing, print_all_compilations, CompilationRegistry, MemoryResult, Region, RegionKind,
    SegmentProvider, SegmentProviderConfig,
};

const DEFAULT_WORKERS: usize = 4;

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = SegmentProviderConfig::from_env()?;
    let workers = std::env::var("SEGMENT_REPORT_WORKERS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_WORKERS);

    info!(workers, ?config, "Starting simulated compilations");

    let handles: Vec<_> = (0..workers)
        .map(|worker| {
            thread::Builder::new()
                .name(format!("compile-{}", worker))
                .spawn(move || compile(worker, config))
        })
        .collect::<Result<_, _>>()?;

    for handle in handles {
        match handle.join() {
            Ok(Ok(sequence)) => info!(?sequence, "Compilation finished"),
            Ok(Err(e)) => warn!(error = %e, "Compilation failed"),
            Err(_) => warn!("Compilation thread panicked"),
        }
    }

    let mut stdout = std::io::stdout().lock();
    let json = std::env::var("SEGMENT_REPORT_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);
    if json {
        CompilationRegistry::global().write_json(&mut stdout)?;
    } else {
        print_all_compilations(&mut stdout)?;
    }
    Ok(())
}

/// One simulated compilation: a few nested phases of varying appetite
fn compile(worker: usize, config: SegmentProviderConfig) -> MemoryResult<Option<u32>> {
    let mut provider = SegmentProvider::with_heap(config)?;
    provider.set_collect_region_log();
    let span = span_compilation(&format!("method-{}", worker), provider.id().as_u64());
    let _guard = span.enter();

    let phases: [(&str, RegionKind, usize, usize); 3] = [
        ("ilgen", RegionKind::Heap, 48, 256),
        ("optimizer", RegionKind::Stack, 96, 1024),
        ("codegen", RegionKind::Heap, 32, 4096),
    ];
    for (name, kind, count, object_size) in phases {
        let mut region = Region::with_kind(&mut provider, name, kind);
        for i in 0..count {
            region.allocate(object_size * (1 + (i + worker) % 3))?;
        }
    }

    // One oversized buffer per compilation exercises the dedicated-segment path
    let buffer = provider.request(provider.system_segment_size() + 1)?;
    provider.release(buffer)?;

    provider.finish()
}

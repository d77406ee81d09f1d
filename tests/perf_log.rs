//! Counters on the process-wide perf log.
//!
//! Kept to a single test: the log is global to this test binary.

use hydra_scene::scene::{AddedPrimEntry, RemovedPrimEntry, RetainedSceneIndex};
use hydra_scene::tracker::PerfLog;
use hydra_scene::util::ScenePath;
use hydra_scene::{perf_counter_add, perf_counter_incr, perf_counter_set};

fn p(s: &str) -> ScenePath {
    ScenePath::parse(s).unwrap()
}

#[test]
fn test_global_counters() {
    let perf = PerfLog::instance();
    assert!(!perf.is_enabled());

    // Nothing is recorded while disabled.
    perf_counter_incr!("ignored");
    assert_eq!(perf.counter("ignored"), 0.0);
    assert!(perf.counters().is_empty());

    perf.enable();
    perf_counter_incr!("custom");
    perf_counter_add!("custom", 2.0);
    assert_eq!(perf.counter("custom"), 3.0);
    perf_counter_set!("custom", 0.5);
    assert_eq!(perf.counter("custom"), 0.5);

    let scene = RetainedSceneIndex::new();
    scene.add_prims(&[AddedPrimEntry::new(p("/A/B"), "mesh")]);
    scene.add_prims(&[AddedPrimEntry::new(p("/A/C"), "mesh")]);
    scene.remove_prims(&[RemovedPrimEntry::new(p("/A"))]);
    assert_eq!(perf.counter("sceneIndex:primsAdded"), 3.0);
    assert_eq!(perf.counter("sceneIndex:primsRemoved"), 1.0);

    perf.reset_counters();
    assert_eq!(perf.counter("custom"), 0.0);
    assert_eq!(perf.counter("sceneIndex:primsAdded"), 0.0);

    perf.disable();
    scene.add_prims(&[AddedPrimEntry::new(p("/D"), "mesh")]);
    assert_eq!(perf.counter("sceneIndex:primsAdded"), 0.0);
}

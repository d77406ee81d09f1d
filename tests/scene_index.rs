//! Observer protocol across stacked scene indices.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use hydra_scene::core::{DataSourceLocatorSet, RetainedContainerDataSource};
use hydra_scene::scene::{
    compute_scene_index_diff_delta, AddedPrimEntry, DirtiedPrimEntry, MergingSceneIndex,
    RemovedPrimEntry, RenamedPrimEntry, RetainedSceneIndex, SceneFilter, SceneIndex,
    SceneIndexHandle, SceneIndexObserver, SceneIndexPrim, SingleInputFilteringSceneIndex,
    SwitchingSceneIndex,
};
use hydra_scene::util::ScenePath;
use hydra_scene::Error;

fn p(s: &str) -> ScenePath {
    ScenePath::parse(s).unwrap()
}

#[derive(Default)]
struct Log {
    lines: RefCell<Vec<String>>,
}

impl Log {
    fn attach(scene: &dyn SceneIndex) -> Rc<Self> {
        let log = Rc::new(Self::default());
        let weak = Rc::downgrade(&log);
        scene.add_observer(weak);
        log
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.borrow_mut())
    }
}

impl SceneIndexObserver for Log {
    fn prims_added(&self, _sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
        let mut lines = self.lines.borrow_mut();
        for e in entries {
            lines.push(format!("add {} {}", e.prim_path, e.prim_type));
        }
    }

    fn prims_removed(&self, _sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
        let mut lines = self.lines.borrow_mut();
        for e in entries {
            lines.push(format!("remove {}", e.prim_path));
        }
    }

    fn prims_dirtied(&self, _sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]) {
        let mut lines = self.lines.borrow_mut();
        for e in entries {
            lines.push(format!("dirty {}", e.prim_path));
        }
    }

    fn prims_renamed(&self, _sender: &dyn SceneIndex, entries: &[RenamedPrimEntry]) {
        let mut lines = self.lines.borrow_mut();
        for e in entries {
            lines.push(format!("rename {} {}", e.old_prim_path, e.new_prim_path));
        }
    }
}

/// Hides its whole input while disabled.
#[derive(Default)]
struct Toggle {
    disabled: Cell<bool>,
}

impl SceneFilter for Toggle {
    fn prim(&self, input: &dyn SceneIndex, path: &ScenePath) -> SceneIndexPrim {
        if self.disabled.get() {
            SceneIndexPrim::default()
        } else {
            input.get_prim(path)
        }
    }

    fn child_prim_paths(&self, input: &dyn SceneIndex, path: &ScenePath) -> Vec<ScenePath> {
        if self.disabled.get() {
            Vec::new()
        } else {
            input.get_child_prim_paths(path)
        }
    }
}

fn disable(scene: &SingleInputFilteringSceneIndex<Toggle>) {
    scene.filter().disabled.set(true);
    scene.send_prims_removed(&[RemovedPrimEntry::new(ScenePath::absolute_root())]);
}

#[test]
fn test_merging_disable_strongest_input() {
    let strong = RetainedSceneIndex::new();
    strong.add_prims(&[
        AddedPrimEntry::new(p("/A"), "strongType"),
        AddedPrimEntry::new(p("/A/a1"), "mesh"),
    ]);
    let weak = RetainedSceneIndex::new();
    weak.add_prims(&[
        AddedPrimEntry::new(p("/A"), "weakType"),
        AddedPrimEntry::new(p("/A/b1"), "mesh"),
    ]);

    let toggled = SingleInputFilteringSceneIndex::new(strong as SceneIndexHandle, Toggle::default());
    let merged = MergingSceneIndex::new();
    merged.add_input_scene(toggled.clone() as SceneIndexHandle, ScenePath::absolute_root());
    merged.add_input_scene(weak as SceneIndexHandle, ScenePath::absolute_root());
    let log = Log::attach(&*merged);

    assert_eq!(merged.get_prim(&p("/A")).prim_type, "strongType");
    assert_eq!(merged.get_child_prim_paths(&p("/A")), vec![p("/A/a1"), p("/A/b1")]);

    disable(&toggled);
    assert_eq!(
        log.take(),
        vec!["remove /", "add / ", "add /A weakType", "add /A/b1 mesh"]
    );
    assert_eq!(merged.get_prim(&p("/A")).prim_type, "weakType");
    assert_eq!(merged.get_child_prim_paths(&p("/A")), vec![p("/A/b1")]);
    assert!(merged.get_prim(&p("/A/a1")).is_empty());
}

#[test]
fn test_merging_forwards_input_notices() {
    let a = RetainedSceneIndex::new();
    let b = RetainedSceneIndex::new();
    b.add_prims(&[AddedPrimEntry::new(p("/World/Cube"), "mesh")]);

    let merged = MergingSceneIndex::new();
    merged.add_input_scene(a.clone() as SceneIndexHandle, ScenePath::absolute_root());
    merged.add_input_scene(b.clone() as SceneIndexHandle, ScenePath::absolute_root());
    let log = Log::attach(&*merged);

    // Typed by the weaker input until the stronger one provides a type.
    a.add_prims(&[AddedPrimEntry::new(p("/World/Cube"), "")]);
    assert_eq!(log.take(), vec!["add /World ", "add /World/Cube mesh"]);

    a.dirty_prims(&[DirtiedPrimEntry::new(p("/World/Cube"), DataSourceLocatorSet::universal())]);
    assert_eq!(log.take(), vec!["dirty /World/Cube"]);

    // Still provided by `b`, so the removal is followed by a re-add.
    a.remove_prims(&[RemovedPrimEntry::new(p("/World"))]);
    assert_eq!(
        log.take(),
        vec!["remove /World", "add /World ", "add /World/Cube mesh"]
    );
}

#[test]
fn test_merging_active_root_insertion() {
    let base = RetainedSceneIndex::new();
    base.add_prims(&[AddedPrimEntry::new(p("/World"), "xform")]);
    let props = RetainedSceneIndex::new();
    props.add_prims(&[
        AddedPrimEntry::new(p("/World/Props/Chair"), "mesh"),
        AddedPrimEntry::new(p("/Elsewhere"), "mesh"),
    ]);

    let merged = MergingSceneIndex::new();
    merged.add_input_scene(base as SceneIndexHandle, ScenePath::absolute_root());
    let log = Log::attach(&*merged);

    merged.insert_input_scene(0, props.clone() as SceneIndexHandle, p("/World/Props"));
    assert_eq!(
        log.take(),
        vec!["add / ", "add /World xform", "add /World/Props ", "add /World/Props/Chair mesh"]
    );
    assert!(merged.get_prim(&p("/Elsewhere")).is_empty());
    assert_eq!(merged.input_scenes().len(), 2);

    let handle: SceneIndexHandle = props;
    merged.remove_input_scene(&handle);
    assert_eq!(log.take(), vec!["remove /World/Props"]);
    assert_eq!(merged.input_scenes().len(), 1);
}

#[test]
fn test_merging_ignores_notices_outside_active_root() {
    let base = RetainedSceneIndex::new();
    base.add_prims(&[AddedPrimEntry::new(p("/World"), "xform")]);
    let props = RetainedSceneIndex::new();
    props.add_prims(&[
        AddedPrimEntry::new(p("/World/Props/Chair"), "mesh"),
        AddedPrimEntry::new(p("/Elsewhere"), "mesh"),
    ]);

    let merged = MergingSceneIndex::new();
    merged.add_input_scene(base as SceneIndexHandle, ScenePath::absolute_root());
    merged.add_input_scene(props.clone() as SceneIndexHandle, p("/World/Props"));
    let log = Log::attach(&*merged);
    assert!(merged.get_prim(&p("/Elsewhere")).is_empty());

    props.dirty_prims(&[DirtiedPrimEntry::new(p("/Elsewhere"), DataSourceLocatorSet::universal())]);
    props.remove_prims(&[RemovedPrimEntry::new(p("/Elsewhere"))]);
    props.add_prims(&[AddedPrimEntry::new(p("/Elsewhere/Again"), "mesh")]);
    assert!(log.take().is_empty());

    props.dirty_prims(&[
        DirtiedPrimEntry::new(p("/World/Props/Chair"), DataSourceLocatorSet::universal()),
        DirtiedPrimEntry::new(p("/Elsewhere/Again"), DataSourceLocatorSet::universal()),
    ]);
    assert_eq!(log.take(), vec!["dirty /World/Props/Chair"]);

    // Removing an ancestor of the active root empties the root, which the
    // merge keeps exposing.
    props.remove_prims(&[RemovedPrimEntry::new(ScenePath::absolute_root())]);
    assert_eq!(log.take(), vec!["remove /World/Props", "add /World/Props "]);
    assert_eq!(merged.get_child_prim_paths(&p("/World")), vec![p("/World/Props")]);
    assert!(merged.get_prim(&p("/World/Props/Chair")).is_empty());
}

#[test]
fn test_merging_ignores_notices_from_non_inputs() {
    let a = RetainedSceneIndex::new();
    a.add_prims(&[AddedPrimEntry::new(p("/A"), "mesh")]);
    let stranger = RetainedSceneIndex::new();

    let merged = MergingSceneIndex::new();
    merged.add_input_scene(a.clone() as SceneIndexHandle, ScenePath::absolute_root());
    let log = Log::attach(&*merged);

    let removed = [RemovedPrimEntry::new(p("/A"))];
    let dirtied = [DirtiedPrimEntry::new(p("/A"), DataSourceLocatorSet::universal())];
    merged.prims_removed(&*stranger, &removed);
    merged.prims_dirtied(&*stranger, &dirtied);
    assert!(log.take().is_empty());

    // A former input no longer reaches observers.
    let handle: SceneIndexHandle = a.clone();
    merged.remove_input_scene(&handle);
    assert_eq!(log.take(), vec!["remove /"]);
    merged.prims_removed(&*a, &removed);
    merged.prims_dirtied(&*a, &dirtied);
    assert!(log.take().is_empty());
}

#[test]
fn test_switching_root_diff() {
    let a = RetainedSceneIndex::new();
    a.add_prims(&[AddedPrimEntry::new(p("/A"), "mesh")]);
    let b = RetainedSceneIndex::new();
    b.add_prims(&[AddedPrimEntry::new(p("/B/C"), "points")]);

    let switching = SwitchingSceneIndex::new(vec![a.clone() as SceneIndexHandle, b.clone() as SceneIndexHandle], 0);
    let log = Log::attach(&*switching);
    assert_eq!(switching.get_prim(&p("/A")).prim_type, "mesh");

    switching.set_index(1).unwrap();
    assert_eq!(
        log.take(),
        vec!["remove /", "add / ", "add /B ", "add /B/C points"]
    );
    assert_eq!(switching.current_index(), 1);
    assert!(switching.get_prim(&p("/A")).is_empty());

    // Only the active input is forwarded.
    a.add_prims(&[AddedPrimEntry::new(p("/Z"), "mesh")]);
    b.add_prims(&[AddedPrimEntry::new(p("/B/D"), "mesh")]);
    assert_eq!(log.take(), vec!["add /B/D mesh"]);

    // Same index: no notices.
    switching.set_index(1).unwrap();
    assert!(log.take().is_empty());

    assert!(matches!(
        switching.set_index(5),
        Err(Error::InputOutOfBounds { index: 5, count: 2 })
    ));
    assert_eq!(switching.current_index(), 1);
}

#[test]
fn test_switching_delta_diff() {
    let shared = RetainedContainerDataSource::empty();
    let entry = |path: &str, ty: &str, data| AddedPrimEntry {
        prim_path: p(path),
        prim_type: ty.into(),
        data_source: Some(data),
    };

    let a = RetainedSceneIndex::new();
    a.add_prims(&[
        entry("/A", "mesh", shared.clone()),
        AddedPrimEntry::new(p("/B"), "mesh"),
        entry("/D", "mesh", RetainedContainerDataSource::empty()),
        AddedPrimEntry::new(p("/Gone/Child"), "mesh"),
    ]);
    let b = RetainedSceneIndex::new();
    b.add_prims(&[
        entry("/A", "mesh", shared),
        AddedPrimEntry::new(p("/B"), "cube"),
        AddedPrimEntry::new(p("/C"), "points"),
        entry("/D", "mesh", RetainedContainerDataSource::empty()),
    ]);

    let switching = SwitchingSceneIndex::new(vec![a as SceneIndexHandle, b as SceneIndexHandle], 0)
        .with_diff_fn(Box::new(compute_scene_index_diff_delta));
    let log = Log::attach(&*switching);

    switching.set_index(1).unwrap();
    assert_eq!(
        log.take(),
        vec!["remove /Gone", "add /B cube", "add /C points", "dirty /D"]
    );
}

#[test]
fn test_filter_chain_over_merge() {
    let a = RetainedSceneIndex::new();
    a.add_prims(&[AddedPrimEntry::new(p("/A"), "mesh")]);
    let merged = MergingSceneIndex::new();
    merged.add_input_scene(a.clone() as SceneIndexHandle, ScenePath::absolute_root());

    let toggled = SingleInputFilteringSceneIndex::new(merged as SceneIndexHandle, Toggle::default());
    let log = Log::attach(&*toggled);

    a.rename_prims(&[RenamedPrimEntry::new(p("/A"), p("/Renamed"))]);
    // A single-input merge converts renames into remove and add.
    assert_eq!(log.take(), vec!["remove /A", "add /Renamed mesh"]);
    assert_eq!(toggled.get_prim(&p("/Renamed")).prim_type, "mesh");

    disable(&toggled);
    assert_eq!(log.take(), vec!["remove /"]);
    assert!(toggled.get_child_prim_paths(&ScenePath::absolute_root()).is_empty());
}

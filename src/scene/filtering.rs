//! Single-input filtering scene index.
//!
//! The wrapper owns the observer plumbing; a [`SceneFilter`] supplies the
//! actual transformation. Every hook defaults to passing the input through
//! unchanged.

use std::rc::{Rc, Weak};

use super::{
    AddedPrimEntry, DirtiedPrimEntry, FilteringSceneIndex, ObserverHandle, ObserverList,
    RemovedPrimEntry, RenamedPrimEntry, SceneIndex, SceneIndexHandle, SceneIndexObserver,
    SceneIndexPrim,
};
use crate::util::ScenePath;

/// Transformation applied by a [`SingleInputFilteringSceneIndex`].
pub trait SceneFilter {
    fn name(&self) -> &str {
        "SceneFilter"
    }

    fn prim(&self, input: &dyn SceneIndex, path: &ScenePath) -> SceneIndexPrim {
        input.get_prim(path)
    }

    fn child_prim_paths(&self, input: &dyn SceneIndex, path: &ScenePath) -> Vec<ScenePath> {
        input.get_child_prim_paths(path)
    }

    fn prims_added(&self, _input: &dyn SceneIndex, entries: &[AddedPrimEntry]) -> Vec<AddedPrimEntry> {
        entries.to_vec()
    }

    fn prims_removed(
        &self,
        _input: &dyn SceneIndex,
        entries: &[RemovedPrimEntry],
    ) -> Vec<RemovedPrimEntry> {
        entries.to_vec()
    }

    fn prims_dirtied(
        &self,
        _input: &dyn SceneIndex,
        entries: &[DirtiedPrimEntry],
    ) -> Vec<DirtiedPrimEntry> {
        entries.to_vec()
    }

    fn prims_renamed(
        &self,
        _input: &dyn SceneIndex,
        entries: &[RenamedPrimEntry],
    ) -> Vec<RenamedPrimEntry> {
        entries.to_vec()
    }
}

/// Scene index wrapping exactly one input.
///
/// The index registers itself (weakly) as an observer of its input, runs
/// every notice through the filter and re-sends the result.
pub struct SingleInputFilteringSceneIndex<F: SceneFilter> {
    input: SceneIndexHandle,
    filter: F,
    observers: ObserverList,
}

impl<F: SceneFilter + 'static> SingleInputFilteringSceneIndex<F> {
    pub fn new(input: SceneIndexHandle, filter: F) -> Rc<Self> {
        let this = Rc::new(Self {
            input,
            filter,
            observers: ObserverList::new(),
        });
        let weak: Weak<Self> = Rc::downgrade(&this);
        let observer: ObserverHandle = weak;
        this.input.add_observer(observer);
        this
    }
}

impl<F: SceneFilter> SingleInputFilteringSceneIndex<F> {
    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn input_scene(&self) -> &SceneIndexHandle {
        &self.input
    }

    pub fn is_observed(&self) -> bool {
        self.observers.is_observed()
    }

    // Filters with their own state changes send through these.

    pub fn send_prims_added(&self, entries: &[AddedPrimEntry]) {
        self.observers.send_prims_added(self, entries);
    }

    pub fn send_prims_removed(&self, entries: &[RemovedPrimEntry]) {
        self.observers.send_prims_removed(self, entries);
    }

    pub fn send_prims_dirtied(&self, entries: &[DirtiedPrimEntry]) {
        self.observers.send_prims_dirtied(self, entries);
    }

    pub fn send_prims_renamed(&self, entries: &[RenamedPrimEntry]) {
        self.observers.send_prims_renamed(self, entries);
    }
}

impl<F: SceneFilter> SceneIndex for SingleInputFilteringSceneIndex<F> {
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim {
        self.filter.prim(self.input.as_ref(), path)
    }

    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath> {
        self.filter.child_prim_paths(self.input.as_ref(), path)
    }

    fn add_observer(&self, observer: ObserverHandle) {
        self.observers.add(observer);
    }

    fn remove_observer(&self, observer: &ObserverHandle) {
        self.observers.remove(observer);
    }

    fn display_name(&self) -> String {
        self.filter.name().to_string()
    }
}

impl<F: SceneFilter> FilteringSceneIndex for SingleInputFilteringSceneIndex<F> {
    fn input_scenes(&self) -> Vec<SceneIndexHandle> {
        vec![self.input.clone()]
    }
}

impl<F: SceneFilter> SceneIndexObserver for SingleInputFilteringSceneIndex<F> {
    fn prims_added(&self, sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
        if !self.observers.is_observed() {
            return;
        }
        let out = self.filter.prims_added(sender, entries);
        self.observers.send_prims_added(self, &out);
    }

    fn prims_removed(&self, sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
        if !self.observers.is_observed() {
            return;
        }
        let out = self.filter.prims_removed(sender, entries);
        self.observers.send_prims_removed(self, &out);
    }

    fn prims_dirtied(&self, sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]) {
        if !self.observers.is_observed() {
            return;
        }
        let out = self.filter.prims_dirtied(sender, entries);
        self.observers.send_prims_dirtied(self, &out);
    }

    fn prims_renamed(&self, sender: &dyn SceneIndex, entries: &[RenamedPrimEntry]) {
        if !self.observers.is_observed() {
            return;
        }
        let out = self.filter.prims_renamed(sender, entries);
        self.observers.send_prims_renamed(self, &out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::testing::RecordingObserver;
    use crate::scene::RetainedSceneIndex;
    use crate::util::Token;

    fn p(s: &str) -> ScenePath {
        ScenePath::parse(s).unwrap()
    }

    /// Hides every prim named `Hidden` and renames types to upper case.
    struct HideFilter;

    impl SceneFilter for HideFilter {
        fn prim(&self, input: &dyn SceneIndex, path: &ScenePath) -> SceneIndexPrim {
            if path.name().is_some_and(|n| n == "Hidden") {
                return SceneIndexPrim::default();
            }
            let mut prim = input.get_prim(path);
            prim.prim_type = Token::new(&prim.prim_type.to_uppercase());
            prim
        }

        fn child_prim_paths(&self, input: &dyn SceneIndex, path: &ScenePath) -> Vec<ScenePath> {
            input
                .get_child_prim_paths(path)
                .into_iter()
                .filter(|c| c.name().is_some_and(|n| n != "Hidden"))
                .collect()
        }

        fn prims_added(&self, _input: &dyn SceneIndex, entries: &[AddedPrimEntry]) -> Vec<AddedPrimEntry> {
            entries
                .iter()
                .filter(|e| !e.prim_path.elements().iter().any(|n| n == "Hidden"))
                .cloned()
                .collect()
        }
    }

    #[test]
    fn test_pass_through() {
        struct Identity;
        impl SceneFilter for Identity {}

        let input = RetainedSceneIndex::new();
        input.add_prims(&[AddedPrimEntry::new(p("/A"), "mesh")]);
        let filtered = SingleInputFilteringSceneIndex::new(input.clone(), Identity);
        let log = RecordingObserver::attach(&*filtered);

        assert_eq!(filtered.get_prim(&p("/A")).prim_type, "mesh");
        input.add_prims(&[AddedPrimEntry::new(p("/B"), "points")]);
        input.remove_prims(&[RemovedPrimEntry::new(p("/A"))]);
        assert_eq!(log.take(), vec!["add /B", "remove /A"]);
        assert_eq!(filtered.input_scenes().len(), 1);
    }

    #[test]
    fn test_filter_hooks() {
        let input = RetainedSceneIndex::new();
        let filtered = SingleInputFilteringSceneIndex::new(input.clone(), HideFilter);
        let log = RecordingObserver::attach(&*filtered);

        input.add_prims(&[
            AddedPrimEntry::new(p("/A"), "mesh"),
            AddedPrimEntry::new(p("/Hidden"), "mesh"),
        ]);
        assert_eq!(log.take(), vec!["add /A"]);
        assert_eq!(filtered.get_prim(&p("/A")).prim_type, "MESH");
        assert!(filtered.get_prim(&p("/Hidden")).is_empty());
        assert_eq!(filtered.get_child_prim_paths(&p("/")), vec![p("/A")]);
    }

    #[test]
    fn test_unobserved_drops_notices() {
        struct Identity;
        impl SceneFilter for Identity {}

        let input = RetainedSceneIndex::new();
        let filtered = SingleInputFilteringSceneIndex::new(input.clone(), Identity);
        {
            let _log = RecordingObserver::attach(&*filtered);
        }
        // The observer is gone; sending must not fail.
        input.add_prims(&[AddedPrimEntry::new(p("/A"), "mesh")]);
        assert!(!filtered.is_observed());
    }
}

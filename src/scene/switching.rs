//! Scene index exposing one of several inputs.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::{
    compute_scene_index_diff_root, is_same_scene, AddedPrimEntry, DirtiedPrimEntry,
    FilteringSceneIndex, ObserverHandle, ObserverList, RemovedPrimEntry, RenamedPrimEntry,
    SceneIndex, SceneIndexDiff, SceneIndexDiffFn, SceneIndexHandle, SceneIndexObserver,
    SceneIndexPrim,
};
use crate::util::{Error, Result, ScenePath};

/// Forwards queries and notices of the active input only.
///
/// Changing the active input sends the notices computed by the diff
/// function between the old and the new input.
pub struct SwitchingSceneIndex {
    inputs: Vec<SceneIndexHandle>,
    index: Cell<usize>,
    diff_fn: RefCell<SceneIndexDiffFn>,
    observers: ObserverList,
    self_weak: Weak<SwitchingSceneIndex>,
}

impl SwitchingSceneIndex {
    /// Build over `inputs` with `initial_index` active.
    ///
    /// An out-of-range initial index leaves no input active.
    pub fn new(inputs: Vec<SceneIndexHandle>, initial_index: usize) -> Rc<Self> {
        let diff_fn: SceneIndexDiffFn = Box::new(compute_scene_index_diff_root);
        let this = Rc::new_cyclic(|weak| Self {
            inputs,
            index: Cell::new(initial_index),
            diff_fn: RefCell::new(diff_fn),
            observers: ObserverList::new(),
            self_weak: weak.clone(),
        });
        if let Some(current) = this.current() {
            current.add_observer(this.observer_handle());
        } else {
            tracing::warn!(initial_index, count = this.inputs.len(), "no active input");
        }
        this
    }

    /// Replace the diff strategy used on switch.
    pub fn with_diff_fn(self: Rc<Self>, diff_fn: SceneIndexDiffFn) -> Rc<Self> {
        *self.diff_fn.borrow_mut() = diff_fn;
        self
    }

    fn observer_handle(&self) -> ObserverHandle {
        let weak: Weak<Self> = self.self_weak.clone();
        weak
    }

    fn current(&self) -> Option<&SceneIndexHandle> {
        self.inputs.get(self.index.get())
    }

    pub fn current_index(&self) -> usize {
        self.index.get()
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Make input `index` active.
    #[tracing::instrument(skip(self))]
    pub fn set_index(&self, index: usize) -> Result<()> {
        if index >= self.inputs.len() {
            return Err(Error::InputOutOfBounds {
                index,
                count: self.inputs.len(),
            });
        }
        if index == self.index.get() {
            return Ok(());
        }

        let previous = self.current().cloned();
        if let Some(previous) = &previous {
            previous.remove_observer(&self.observer_handle());
        }
        self.index.set(index);
        let next = self.inputs[index].clone();
        next.add_observer(self.observer_handle());

        if !self.observers.is_observed() {
            return Ok(());
        }
        let diff: SceneIndexDiff = (*self.diff_fn.borrow())(previous.as_deref(), Some(&*next));
        self.observers.send_prims_removed(self, &diff.removed);
        self.observers.send_prims_added(self, &diff.added);
        self.observers.send_prims_renamed(self, &diff.renamed);
        self.observers.send_prims_dirtied(self, &diff.dirtied);
        Ok(())
    }

    fn from_current(&self, sender: &dyn SceneIndex) -> bool {
        self.current().is_some_and(|c| is_same_scene(sender, c))
    }
}

impl SceneIndex for SwitchingSceneIndex {
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim {
        self.current()
            .map(|c| c.get_prim(path))
            .unwrap_or_default()
    }

    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath> {
        self.current()
            .map(|c| c.get_child_prim_paths(path))
            .unwrap_or_default()
    }

    fn add_observer(&self, observer: ObserverHandle) {
        self.observers.add(observer);
    }

    fn remove_observer(&self, observer: &ObserverHandle) {
        self.observers.remove(observer);
    }

    fn display_name(&self) -> String {
        "SwitchingSceneIndex".to_string()
    }
}

impl FilteringSceneIndex for SwitchingSceneIndex {
    fn input_scenes(&self) -> Vec<SceneIndexHandle> {
        self.inputs.clone()
    }
}

impl SceneIndexObserver for SwitchingSceneIndex {
    fn prims_added(&self, sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
        if self.from_current(sender) {
            self.observers.send_prims_added(self, entries);
        }
    }

    fn prims_removed(&self, sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
        if self.from_current(sender) {
            self.observers.send_prims_removed(self, entries);
        }
    }

    fn prims_dirtied(&self, sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]) {
        if self.from_current(sender) {
            self.observers.send_prims_dirtied(self, entries);
        }
    }

    fn prims_renamed(&self, sender: &dyn SceneIndex, entries: &[RenamedPrimEntry]) {
        if self.from_current(sender) {
            self.observers.send_prims_renamed(self, entries);
        }
    }
}

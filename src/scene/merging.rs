//! Scene index composing several inputs, strongest first.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

use super::{
    is_same_scene, AddedPrimEntry, DirtiedPrimEntry, FilteringSceneIndex, ObserverHandle,
    ObserverList, PrimView, RemovedPrimEntry, RenamedPrimEntry, SceneIndex, SceneIndexHandle,
    SceneIndexObserver, SceneIndexPrim,
};
use crate::core::OverlayContainerDataSource;
use crate::util::{ScenePath, Token};

#[derive(Clone)]
struct InputEntry {
    scene: SceneIndexHandle,
    active_root: ScenePath,
}

/// Merges prims of its inputs.
///
/// An input only contributes at and below its active root. Types resolve
/// to the first non-empty type and data sources are overlaid, both in
/// input order.
pub struct MergingSceneIndex {
    inputs: RefCell<Vec<InputEntry>>,
    observers: ObserverList,
    self_weak: Weak<MergingSceneIndex>,
}

impl MergingSceneIndex {
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|weak| Self {
            inputs: RefCell::new(Vec::new()),
            observers: ObserverList::new(),
            self_weak: weak.clone(),
        })
    }

    fn observer_handle(&self) -> ObserverHandle {
        let weak: Weak<Self> = self.self_weak.clone();
        weak
    }

    /// Append a weakest input contributing below `active_root`.
    pub fn add_input_scene(&self, scene: SceneIndexHandle, active_root: ScenePath) {
        let position = self.inputs.borrow().len();
        self.insert_input_scene(position, scene, active_root);
    }

    /// Insert an input at `position` in strength order (0 is strongest).
    #[tracing::instrument(skip_all, fields(root = %active_root))]
    pub fn insert_input_scene(&self, position: usize, scene: SceneIndexHandle, active_root: ScenePath) {
        scene.add_observer(self.observer_handle());
        {
            let mut inputs = self.inputs.borrow_mut();
            let position = position.min(inputs.len());
            inputs.insert(
                position,
                InputEntry {
                    scene: scene.clone(),
                    active_root: active_root.clone(),
                },
            );
        }

        if !self.observers.is_observed() {
            return;
        }

        // Ancestors of the root become visible too.
        let mut added: Vec<AddedPrimEntry> = active_root
            .parent()
            .ancestors()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .map(|path| {
                let prim_type = self.get_prim(&path).prim_type;
                AddedPrimEntry::new(path, prim_type)
            })
            .collect();
        for path in PrimView::new(&*scene, active_root) {
            let prim_type = self.get_prim(&path).prim_type;
            added.push(AddedPrimEntry::new(path, prim_type));
        }
        self.observers.send_prims_added(self, &added);
    }

    /// Remove an input; prims it alone provided are removed and prims
    /// still provided by other inputs are re-added.
    #[tracing::instrument(skip_all)]
    pub fn remove_input_scene(&self, scene: &SceneIndexHandle) {
        let removed = {
            let mut inputs = self.inputs.borrow_mut();
            let Some(index) = inputs
                .iter()
                .position(|e| Rc::ptr_eq(&e.scene, scene))
            else {
                tracing::warn!("remove_input_scene: not an input");
                return;
            };
            inputs.remove(index)
        };
        removed.scene.remove_observer(&self.observer_handle());

        if !self.observers.is_observed() {
            return;
        }

        let root = removed.active_root;
        let mut removed_entries = Vec::new();
        let mut added_entries = Vec::new();
        self.removal_with_readd(&root, &mut removed_entries, &mut added_entries);
        self.observers.send_prims_removed(self, &removed_entries);
        self.observers.send_prims_added(self, &added_entries);
    }

    /// Inputs in strength order.
    pub fn input_scenes(&self) -> Vec<SceneIndexHandle> {
        self.inputs.borrow().iter().map(|e| e.scene.clone()).collect()
    }

    /// Inputs active at `path`.
    fn inputs_at(&self, path: &ScenePath) -> Vec<SceneIndexHandle> {
        self.inputs
            .borrow()
            .iter()
            .filter(|e| path.has_prefix(&e.active_root))
            .map(|e| e.scene.clone())
            .collect()
    }

    /// Active root of the input `sender`, if it is one of our inputs.
    fn active_root_of(&self, sender: &dyn SceneIndex) -> Option<ScenePath> {
        let root = self
            .inputs
            .borrow()
            .iter()
            .find(|e| is_same_scene(sender, &e.scene))
            .map(|e| e.active_root.clone());
        if root.is_none() {
            tracing::trace!(sender = %sender.display_name(), "notice from a scene that is not an input");
        }
        root
    }

    /// True when some input still exposes a prim at `path`.
    fn any_input_has_prim(&self, path: &ScenePath) -> bool {
        let inputs = self.inputs.borrow().clone();
        inputs.iter().any(|entry| input_has_prim(entry, path))
    }

    fn removal_with_readd(
        &self,
        path: &ScenePath,
        removed: &mut Vec<RemovedPrimEntry>,
        added: &mut Vec<AddedPrimEntry>,
    ) {
        removed.push(RemovedPrimEntry::new(path.clone()));
        if self.any_input_has_prim(path) {
            for p in PrimView::new(self, path.clone()) {
                let prim_type = self.get_prim(&p).prim_type;
                added.push(AddedPrimEntry::new(p, prim_type));
            }
        }
    }
}

fn input_has_prim(entry: &InputEntry, path: &ScenePath) -> bool {
    if path.is_absolute_root() {
        return true;
    }
    if entry.active_root.has_prefix(path) {
        // The root and its ancestors are materialized by the merge itself.
        return true;
    }
    if !path.has_prefix(&entry.active_root) {
        return false;
    }
    entry
        .scene
        .get_child_prim_paths(&path.parent())
        .iter()
        .any(|c| c == path)
}

impl SceneIndex for MergingSceneIndex {
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim {
        let inputs = self.inputs_at(path);
        let mut prim_type = Token::empty();
        let mut containers = Vec::new();
        for input in &inputs {
            let prim = input.get_prim(path);
            if prim_type.is_empty() && !prim.prim_type.is_empty() {
                prim_type = prim.prim_type;
            }
            if let Some(ds) = prim.data_source {
                containers.push(ds);
            }
        }
        let data_source = match containers.len() {
            0 => None,
            1 => containers.pop(),
            _ => Some(OverlayContainerDataSource::new(containers)),
        };
        SceneIndexPrim::new(prim_type, data_source)
    }

    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath> {
        let inputs = self.inputs.borrow().clone();
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        let mut push = |child: ScenePath, out: &mut Vec<ScenePath>| {
            if seen.insert(child.clone()) {
                out.push(child);
            }
        };
        for entry in &inputs {
            if path.has_prefix(&entry.active_root) {
                for child in entry.scene.get_child_prim_paths(path) {
                    push(child, &mut out);
                }
            } else if entry.active_root.has_prefix(path) {
                // Step toward a deeper root.
                let depth = path.element_count();
                if let Some(name) = entry.active_root.elements().get(depth) {
                    push(path.append_child(name), &mut out);
                }
            }
        }
        out
    }

    fn add_observer(&self, observer: ObserverHandle) {
        self.observers.add(observer);
    }

    fn remove_observer(&self, observer: &ObserverHandle) {
        self.observers.remove(observer);
    }

    fn display_name(&self) -> String {
        "MergingSceneIndex".to_string()
    }
}

impl FilteringSceneIndex for MergingSceneIndex {
    fn input_scenes(&self) -> Vec<SceneIndexHandle> {
        MergingSceneIndex::input_scenes(self)
    }
}

impl SceneIndexObserver for MergingSceneIndex {
    fn prims_added(&self, sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
        if !self.observers.is_observed() {
            return;
        }
        let Some(root) = self.active_root_of(sender) else {
            return;
        };
        let out: Vec<AddedPrimEntry> = entries
            .iter()
            .filter(|e| e.prim_path.has_prefix(&root))
            .map(|e| {
                let prim_type = self.get_prim(&e.prim_path).prim_type;
                AddedPrimEntry::new(e.prim_path.clone(), prim_type)
            })
            .collect();
        self.observers.send_prims_added(self, &out);
    }

    fn prims_removed(&self, sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
        if !self.observers.is_observed() {
            return;
        }
        let Some(root) = self.active_root_of(sender) else {
            return;
        };

        // Removing an ancestor of the active root removes the root itself.
        let mut paths: Vec<ScenePath> = entries
            .iter()
            .filter_map(|e| {
                if e.prim_path.has_prefix(&root) {
                    Some(e.prim_path.clone())
                } else if root.has_prefix(&e.prim_path) {
                    Some(root.clone())
                } else {
                    None
                }
            })
            .collect();
        if paths.is_empty() {
            return;
        }

        if self.inputs.borrow().len() < 2 {
            let out: Vec<RemovedPrimEntry> = paths.into_iter().map(RemovedPrimEntry::new).collect();
            self.observers.send_prims_removed(self, &out);
            return;
        }

        // Drop entries already covered by a removed ancestor.
        paths.sort();
        paths.dedup();
        let mut roots: Vec<ScenePath> = Vec::new();
        for path in paths {
            if !roots.iter().any(|r| path.has_prefix(r)) {
                roots.push(path);
            }
        }

        let mut removed = Vec::new();
        let mut added = Vec::new();
        for path in &roots {
            self.removal_with_readd(path, &mut removed, &mut added);
        }
        self.observers.send_prims_removed(self, &removed);
        self.observers.send_prims_added(self, &added);
    }

    fn prims_dirtied(&self, sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]) {
        if !self.observers.is_observed() {
            return;
        }
        let Some(root) = self.active_root_of(sender) else {
            return;
        };
        if entries.iter().all(|e| e.prim_path.has_prefix(&root)) {
            self.observers.send_prims_dirtied(self, entries);
            return;
        }
        let out: Vec<DirtiedPrimEntry> = entries
            .iter()
            .filter(|e| e.prim_path.has_prefix(&root))
            .cloned()
            .collect();
        self.observers.send_prims_dirtied(self, &out);
    }

    fn prims_renamed(&self, sender: &dyn SceneIndex, entries: &[RenamedPrimEntry]) {
        if !self.observers.is_observed() {
            return;
        }
        let (removed, added) = super::convert_prims_renamed_to_removed_and_added(sender, entries);
        self.prims_removed(sender, &removed);
        self.prims_added(sender, &added);
    }
}

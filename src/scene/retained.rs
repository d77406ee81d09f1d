//! Scene index that owns its prims.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::rc::Rc;

use super::{
    AddedPrimEntry, DirtiedPrimEntry, ObserverHandle, ObserverList, RemovedPrimEntry,
    RenamedPrimEntry, SceneIndex, SceneIndexPrim,
};
use crate::core::ContainerHandle;
use crate::util::{ScenePath, Token};

#[derive(Clone, Default)]
struct Entry {
    prim_type: Token,
    data_source: Option<ContainerHandle>,
}

/// Prim storage keyed by path.
///
/// Ancestors of added prims are materialized as untyped, data-less prims
/// so the hierarchy is always connected. `/` always exists.
pub struct RetainedSceneIndex {
    entries: RefCell<BTreeMap<ScenePath, Entry>>,
    observers: ObserverList,
}

impl RetainedSceneIndex {
    pub fn new() -> Rc<Self> {
        let mut entries = BTreeMap::new();
        entries.insert(ScenePath::absolute_root(), Entry::default());
        Rc::new(Self {
            entries: RefCell::new(entries),
            observers: ObserverList::new(),
        })
    }

    /// Insert or overwrite prims.
    ///
    /// Newly created ancestors are announced ahead of the entries
    /// themselves.
    pub fn add_prims(&self, entries: &[AddedPrimEntry]) {
        let mut notices = Vec::with_capacity(entries.len());
        {
            let mut map = self.entries.borrow_mut();
            for entry in entries {
                if !entry.prim_path.is_absolute() {
                    tracing::warn!(path = %entry.prim_path, "ignoring relative prim path");
                    continue;
                }
                for ancestor in entry.prim_path.parent().prefixes() {
                    if !map.contains_key(&ancestor) {
                        map.insert(ancestor.clone(), Entry::default());
                        notices.push(AddedPrimEntry::new(ancestor, Token::empty()));
                    }
                }
                map.insert(
                    entry.prim_path.clone(),
                    Entry {
                        prim_type: entry.prim_type.clone(),
                        data_source: entry.data_source.clone(),
                    },
                );
                notices.push(entry.clone());
            }
        }
        self.observers.send_prims_added(self, &notices);
    }

    /// Remove prims together with their subtrees.
    pub fn remove_prims(&self, entries: &[RemovedPrimEntry]) {
        {
            let mut map = self.entries.borrow_mut();
            for entry in entries {
                let doomed = subtree_keys(&map, &entry.prim_path);
                for path in doomed {
                    map.remove(&path);
                }
            }
            // The root is never really removed, only emptied.
            map.entry(ScenePath::absolute_root()).or_default();
        }
        self.observers.send_prims_removed(self, entries);
    }

    /// Forward dirtied notices for prims that exist.
    pub fn dirty_prims(&self, entries: &[DirtiedPrimEntry]) {
        let existing: Vec<DirtiedPrimEntry> = {
            let map = self.entries.borrow();
            entries
                .iter()
                .filter(|e| map.contains_key(&e.prim_path))
                .cloned()
                .collect()
        };
        self.observers.send_prims_dirtied(self, &existing);
    }

    /// Move prim subtrees to new paths.
    pub fn rename_prims(&self, entries: &[RenamedPrimEntry]) {
        let mut applied = Vec::with_capacity(entries.len());
        {
            let mut map = self.entries.borrow_mut();
            for entry in entries {
                let moved: Vec<(ScenePath, Entry)> = subtree_keys(&map, &entry.old_prim_path)
                    .into_iter()
                    .filter_map(|path| map.remove(&path).map(|e| (path, e)))
                    .collect();
                if moved.is_empty() {
                    tracing::warn!(path = %entry.old_prim_path, "rename of missing prim");
                    continue;
                }
                for ancestor in entry.new_prim_path.parent().prefixes() {
                    map.entry(ancestor).or_default();
                }
                for (path, e) in moved {
                    if let Some(target) =
                        path.replace_prefix(&entry.old_prim_path, &entry.new_prim_path)
                    {
                        map.insert(target, e);
                    }
                }
                applied.push(entry.clone());
            }
        }
        self.observers.send_prims_renamed(self, &applied);
    }

    /// Number of stored prims, `/` included.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

fn subtree_keys(map: &BTreeMap<ScenePath, Entry>, root: &ScenePath) -> Vec<ScenePath> {
    map.range((Bound::Included(root), Bound::Unbounded))
        .map(|(path, _)| path)
        .take_while(|path| path.has_prefix(root))
        .cloned()
        .collect()
}

impl SceneIndex for RetainedSceneIndex {
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim {
        match self.entries.borrow().get(path) {
            Some(e) => SceneIndexPrim::new(e.prim_type.clone(), e.data_source.clone()),
            None => SceneIndexPrim::default(),
        }
    }

    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath> {
        let map = self.entries.borrow();
        if !map.contains_key(path) {
            return Vec::new();
        }
        let depth = path.element_count() + 1;
        map.range((Bound::Excluded(path), Bound::Unbounded))
            .map(|(p, _)| p)
            .take_while(|p| p.has_prefix(path))
            .filter(|p| p.element_count() == depth)
            .cloned()
            .collect()
    }

    fn add_observer(&self, observer: ObserverHandle) {
        self.observers.add(observer);
    }

    fn remove_observer(&self, observer: &ObserverHandle) {
        self.observers.remove(observer);
    }

    fn display_name(&self) -> String {
        "RetainedSceneIndex".to_string()
    }
}

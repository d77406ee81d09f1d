//! Scene index and observer protocol.
//!
//! A scene index answers two queries, `get_prim` and
//! `get_child_prim_paths`, and pushes batched notices to its observers
//! when the answers change. Scene indices are single threaded and shared
//! through `Rc`; observers are held weakly so a subject never keeps its
//! observers alive.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::core::{ContainerHandle, DataSourceLocatorSet};
use crate::util::{ScenePath, Token};

/// The answer to a prim query.
///
/// A prim that does not exist has an empty type and no data source.
#[derive(Clone, Default)]
pub struct SceneIndexPrim {
    pub prim_type: Token,
    pub data_source: Option<ContainerHandle>,
}

impl SceneIndexPrim {
    pub fn new(prim_type: impl Into<Token>, data_source: Option<ContainerHandle>) -> Self {
        Self {
            prim_type: prim_type.into(),
            data_source,
        }
    }

    /// True when the prim has neither type nor data.
    pub fn is_empty(&self) -> bool {
        self.prim_type.is_empty() && self.data_source.is_none()
    }
}

impl fmt::Debug for SceneIndexPrim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneIndexPrim")
            .field("prim_type", &self.prim_type)
            .field("has_data_source", &self.data_source.is_some())
            .finish()
    }
}

// ============================================================================
// Notice entries
// ============================================================================

/// A prim was added, or replaced if it already existed.
#[derive(Clone)]
pub struct AddedPrimEntry {
    pub prim_path: ScenePath,
    pub prim_type: Token,
    pub data_source: Option<ContainerHandle>,
}

impl AddedPrimEntry {
    pub fn new(prim_path: ScenePath, prim_type: impl Into<Token>) -> Self {
        Self {
            prim_path,
            prim_type: prim_type.into(),
            data_source: None,
        }
    }
}

impl fmt::Debug for AddedPrimEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Added({}, {:?})", self.prim_path, self.prim_type)
    }
}

/// A prim and all of its descendants were removed.
#[derive(Clone, PartialEq, Eq)]
pub struct RemovedPrimEntry {
    pub prim_path: ScenePath,
}

impl RemovedPrimEntry {
    pub fn new(prim_path: ScenePath) -> Self {
        Self { prim_path }
    }
}

impl fmt::Debug for RemovedPrimEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Removed({})", self.prim_path)
    }
}

/// Data at the given locators of a prim changed.
#[derive(Clone, PartialEq)]
pub struct DirtiedPrimEntry {
    pub prim_path: ScenePath,
    pub dirty_locators: DataSourceLocatorSet,
}

impl DirtiedPrimEntry {
    pub fn new(prim_path: ScenePath, dirty_locators: DataSourceLocatorSet) -> Self {
        Self {
            prim_path,
            dirty_locators,
        }
    }
}

impl fmt::Debug for DirtiedPrimEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dirtied({}, {:?})", self.prim_path, self.dirty_locators)
    }
}

/// A prim subtree moved to a new path.
#[derive(Clone, PartialEq, Eq)]
pub struct RenamedPrimEntry {
    pub old_prim_path: ScenePath,
    pub new_prim_path: ScenePath,
}

impl RenamedPrimEntry {
    pub fn new(old_prim_path: ScenePath, new_prim_path: ScenePath) -> Self {
        Self {
            old_prim_path,
            new_prim_path,
        }
    }
}

impl fmt::Debug for RenamedPrimEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Renamed({} -> {})", self.old_prim_path, self.new_prim_path)
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Weak observer reference held by scene indices.
pub type ObserverHandle = Weak<dyn SceneIndexObserver>;

/// Shared scene index handle.
pub type SceneIndexHandle = Rc<dyn SceneIndex>;

/// A queryable, observable view over prims.
pub trait SceneIndex {
    /// The prim at `path`; empty when absent.
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim;

    /// Paths of the direct children of `path`.
    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath>;

    /// Start sending notices to `observer`. Adding twice is a no-op.
    fn add_observer(&self, observer: ObserverHandle);

    fn remove_observer(&self, observer: &ObserverHandle);

    /// Name for logging and pipeline dumps.
    fn display_name(&self) -> String {
        "SceneIndex".to_string()
    }
}

/// A scene index built on other scene indices.
pub trait FilteringSceneIndex: SceneIndex {
    fn input_scenes(&self) -> Vec<SceneIndexHandle>;
}

/// Receives batched notices from scene indices.
///
/// Every method gets the sending scene index so an observer of several
/// inputs can tell them apart.
pub trait SceneIndexObserver {
    fn prims_added(&self, sender: &dyn SceneIndex, entries: &[AddedPrimEntry]);

    fn prims_removed(&self, sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]);

    fn prims_dirtied(&self, sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]);

    fn prims_renamed(&self, sender: &dyn SceneIndex, entries: &[RenamedPrimEntry]);
}

/// True when `sender` is the scene index behind `handle`.
pub fn is_same_scene(sender: &dyn SceneIndex, handle: &SceneIndexHandle) -> bool {
    std::ptr::addr_eq(sender as *const dyn SceneIndex, Rc::as_ptr(handle))
}

// ============================================================================
// Observer list
// ============================================================================

/// Weak observer registry with notice fan-out.
///
/// Dead observers are pruned as they are found. Sending works on a
/// snapshot, so observers may add or remove observers (or query the
/// sender) while handling a notice.
#[derive(Default)]
pub struct ObserverList {
    observers: RefCell<Vec<ObserverHandle>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, observer: ObserverHandle) {
        let mut observers = self.observers.borrow_mut();
        if !observers.iter().any(|o| Weak::ptr_eq(o, &observer)) {
            observers.push(observer);
        }
    }

    pub fn remove(&self, observer: &ObserverHandle) {
        self.observers.borrow_mut().retain(|o| !Weak::ptr_eq(o, observer));
    }

    /// True when at least one live observer is registered.
    pub fn is_observed(&self) -> bool {
        let mut observers = self.observers.borrow_mut();
        observers.retain(|o| o.strong_count() > 0);
        !observers.is_empty()
    }

    fn live(&self) -> Vec<Rc<dyn SceneIndexObserver>> {
        let mut observers = self.observers.borrow_mut();
        observers.retain(|o| o.strong_count() > 0);
        observers.iter().filter_map(Weak::upgrade).collect()
    }

    pub fn send_prims_added(&self, sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
        if entries.is_empty() {
            return;
        }
        tracing::debug!(sender = %sender.display_name(), count = entries.len(), "prims added");
        crate::perf_counter_add!("sceneIndex:primsAdded", entries.len() as f64);
        for observer in self.live() {
            observer.prims_added(sender, entries);
        }
    }

    pub fn send_prims_removed(&self, sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
        if entries.is_empty() {
            return;
        }
        tracing::debug!(sender = %sender.display_name(), count = entries.len(), "prims removed");
        crate::perf_counter_add!("sceneIndex:primsRemoved", entries.len() as f64);
        for observer in self.live() {
            observer.prims_removed(sender, entries);
        }
    }

    pub fn send_prims_dirtied(&self, sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]) {
        if entries.is_empty() {
            return;
        }
        tracing::debug!(sender = %sender.display_name(), count = entries.len(), "prims dirtied");
        crate::perf_counter_add!("sceneIndex:primsDirtied", entries.len() as f64);
        for observer in self.live() {
            observer.prims_dirtied(sender, entries);
        }
    }

    pub fn send_prims_renamed(&self, sender: &dyn SceneIndex, entries: &[RenamedPrimEntry]) {
        if entries.is_empty() {
            return;
        }
        tracing::debug!(sender = %sender.display_name(), count = entries.len(), "prims renamed");
        crate::perf_counter_add!("sceneIndex:primsRenamed", entries.len() as f64);
        for observer in self.live() {
            observer.prims_renamed(sender, entries);
        }
    }
}

/// Turn renames into removals of the old paths plus additions for every
/// prim now found under the new paths of `sender`.
pub fn convert_prims_renamed_to_removed_and_added(
    sender: &dyn SceneIndex,
    entries: &[RenamedPrimEntry],
) -> (Vec<RemovedPrimEntry>, Vec<AddedPrimEntry>) {
    let mut removed = Vec::with_capacity(entries.len());
    let mut added = Vec::new();
    for entry in entries {
        removed.push(RemovedPrimEntry::new(entry.old_prim_path.clone()));
        for path in super::PrimView::new(sender, entry.new_prim_path.clone()) {
            let prim_type = sender.get_prim(&path).prim_type;
            added.push(AddedPrimEntry::new(path, prim_type));
        }
    }
    (removed, added)
}

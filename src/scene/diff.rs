//! Notices that turn one scene into another.
//!
//! Used by [`SwitchingSceneIndex`](super::SwitchingSceneIndex) when the
//! active input changes.

use super::{
    AddedPrimEntry, DirtiedPrimEntry, PrimView, RemovedPrimEntry, RenamedPrimEntry, SceneIndex,
};
use crate::core::{container_ptr_eq, DataSourceLocatorSet};
use crate::util::ScenePath;

/// Batches to send, in order: removed, added, renamed, dirtied.
#[derive(Debug, Default, Clone)]
pub struct SceneIndexDiff {
    pub removed: Vec<RemovedPrimEntry>,
    pub added: Vec<AddedPrimEntry>,
    pub renamed: Vec<RenamedPrimEntry>,
    pub dirtied: Vec<DirtiedPrimEntry>,
}

impl SceneIndexDiff {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
            && self.added.is_empty()
            && self.renamed.is_empty()
            && self.dirtied.is_empty()
    }
}

/// Signature of a diff strategy.
pub type SceneIndexDiffFn =
    Box<dyn Fn(Option<&dyn SceneIndex>, Option<&dyn SceneIndex>) -> SceneIndexDiff>;

fn add_subtree(scene: &dyn SceneIndex, root: ScenePath, out: &mut Vec<AddedPrimEntry>) {
    for path in PrimView::new(scene, root) {
        let prim_type = scene.get_prim(&path).prim_type;
        out.push(AddedPrimEntry::new(path, prim_type));
    }
}

/// Remove `/` and add every prim of `b`.
#[tracing::instrument(skip_all)]
pub fn compute_scene_index_diff_root(
    a: Option<&dyn SceneIndex>,
    b: Option<&dyn SceneIndex>,
) -> SceneIndexDiff {
    let mut diff = SceneIndexDiff::default();
    if a.is_some() {
        diff.removed.push(RemovedPrimEntry::new(ScenePath::absolute_root()));
    }
    if let Some(b) = b {
        add_subtree(b, ScenePath::absolute_root(), &mut diff.added);
    }
    diff
}

/// Walk both scenes and report only what changed.
///
/// Prims with equal types whose containers differ by identity are
/// dirtied with the universal locator set; a type change re-adds the prim.
#[tracing::instrument(skip_all)]
pub fn compute_scene_index_diff_delta(
    a: Option<&dyn SceneIndex>,
    b: Option<&dyn SceneIndex>,
) -> SceneIndexDiff {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        (a, b) => return compute_scene_index_diff_root(a, b),
    };
    let mut diff = SceneIndexDiff::default();
    let root = ScenePath::absolute_root();
    compare_prim(a, b, &root, &mut diff);
    compare_children(a, b, &root, &mut diff);
    tracing::debug!(
        removed = diff.removed.len(),
        added = diff.added.len(),
        dirtied = diff.dirtied.len(),
        "delta diff"
    );
    diff
}

fn compare_prim(a: &dyn SceneIndex, b: &dyn SceneIndex, path: &ScenePath, diff: &mut SceneIndexDiff) {
    let pa = a.get_prim(path);
    let pb = b.get_prim(path);
    if pa.prim_type != pb.prim_type {
        diff.added.push(AddedPrimEntry::new(path.clone(), pb.prim_type));
    } else if !container_ptr_eq(pa.data_source.as_ref(), pb.data_source.as_ref()) {
        diff.dirtied.push(DirtiedPrimEntry::new(
            path.clone(),
            DataSourceLocatorSet::universal(),
        ));
    }
}

fn compare_children(a: &dyn SceneIndex, b: &dyn SceneIndex, path: &ScenePath, diff: &mut SceneIndexDiff) {
    let children_a = a.get_child_prim_paths(path);
    let children_b = b.get_child_prim_paths(path);

    for child in &children_a {
        if !children_b.contains(child) {
            diff.removed.push(RemovedPrimEntry::new(child.clone()));
        }
    }
    for child in &children_b {
        if children_a.contains(child) {
            compare_prim(a, b, child, diff);
            compare_children(a, b, child, diff);
        } else {
            add_subtree(b, child.clone(), &mut diff.added);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ContainerHandle, RetainedContainerDataSource};
    use crate::scene::RetainedSceneIndex;
    use crate::util::Token;

    fn p(s: &str) -> ScenePath {
        ScenePath::parse(s).unwrap()
    }

    #[test]
    fn test_root_diff() {
        let b = RetainedSceneIndex::new();
        b.add_prims(&[AddedPrimEntry::new(p("/A/B"), "mesh")]);
        let diff = compute_scene_index_diff_root(None, Some(&*b));
        assert!(diff.removed.is_empty());
        let added: Vec<String> = diff.added.iter().map(|e| e.prim_path.to_string()).collect();
        assert_eq!(added, vec!["/", "/A", "/A/B"]);
    }

    #[test]
    fn test_delta_diff() {
        let shared = RetainedContainerDataSource::empty();
        let a = RetainedSceneIndex::new();
        let b = RetainedSceneIndex::new();
        let with = |path: &str, ty: &str, ds: Option<ContainerHandle>| AddedPrimEntry {
            prim_path: p(path),
            prim_type: Token::new(ty),
            data_source: ds,
        };
        a.add_prims(&[
            with("/Same", "mesh", Some(shared.clone())),
            with("/Prim", "mesh", None),
            with("/Removed", "mesh", None),
            with("/Changed", "mesh", Some(RetainedContainerDataSource::empty())),
        ]);
        b.add_prims(&[
            with("/Same", "mesh", Some(shared.clone())),
            with("/Prim", "points", None),
            with("/Changed", "mesh", Some(RetainedContainerDataSource::empty())),
            with("/New/Child", "mesh", None),
        ]);

        let diff = compute_scene_index_diff_delta(Some(&*a), Some(&*b));
        let removed: Vec<String> = diff.removed.iter().map(|e| e.prim_path.to_string()).collect();
        let added: Vec<String> = diff.added.iter().map(|e| e.prim_path.to_string()).collect();
        let dirtied: Vec<String> = diff.dirtied.iter().map(|e| e.prim_path.to_string()).collect();
        assert_eq!(removed, vec!["/Removed"]);
        assert_eq!(added, vec!["/New", "/New/Child", "/Prim"]);
        assert_eq!(dirtied, vec!["/Changed"]);
        assert!(diff.dirtied[0].dirty_locators.is_universal());
    }
}

//! Depth-first traversal of a scene index.

use super::SceneIndex;
use crate::util::ScenePath;

/// Pre-order traversal of the prims at and below a root.
///
/// Children are fetched lazily, so [`skip_descendants`](Self::skip_descendants)
/// called right after a path is yielded avoids querying its subtree.
///
/// ```ignore
/// let mut view = PrimView::new(scene.as_ref(), ScenePath::absolute_root());
/// while let Some(path) = view.next() {
///     if path.element_count() == 2 {
///         view.skip_descendants();
///     }
/// }
/// ```
pub struct PrimView<'a> {
    scene: &'a dyn SceneIndex,
    stack: Vec<ScenePath>,
    /// Last yielded path, children not yet expanded.
    last: Option<ScenePath>,
    skip: bool,
}

impl<'a> PrimView<'a> {
    pub fn new(scene: &'a dyn SceneIndex, root: ScenePath) -> Self {
        Self {
            scene,
            stack: vec![root],
            last: None,
            skip: false,
        }
    }

    /// Do not descend below the path most recently yielded.
    pub fn skip_descendants(&mut self) {
        self.skip = true;
    }
}

impl Iterator for PrimView<'_> {
    type Item = ScenePath;

    fn next(&mut self) -> Option<ScenePath> {
        if let Some(last) = self.last.take() {
            if !self.skip {
                let children = self.scene.get_child_prim_paths(&last);
                self.stack.extend(children.into_iter().rev());
            }
        }
        self.skip = false;
        let path = self.stack.pop()?;
        self.last = Some(path.clone());
        Some(path)
    }
}

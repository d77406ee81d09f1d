//! Scene indices: prim storage, composition and change notices.
//!
//! - [`RetainedSceneIndex`] - Owns prims directly
//! - [`SingleInputFilteringSceneIndex`] - Wraps one input with a [`SceneFilter`]
//! - [`MergingSceneIndex`] - Strongest-first composition of inputs
//! - [`SwitchingSceneIndex`] - One active input out of several
//! - [`PinnedCurveExpandingFilter`] - Pinned cubic curves to nonperiodic
//! - [`PrimView`] - Depth-first traversal
//! - [`load_scene_json`] - Retained scenes from JSON descriptions
//! - [`compute_scene_index_diff_root`] / [`compute_scene_index_diff_delta`]

mod base;
mod diff;
mod filtering;
mod json;
mod merging;
mod pinned_curves;
mod prim_view;
mod retained;
mod switching;

pub use base::*;
pub use diff::{
    compute_scene_index_diff_delta, compute_scene_index_diff_root, SceneIndexDiff,
    SceneIndexDiffFn,
};
pub use filtering::{SceneFilter, SingleInputFilteringSceneIndex};
pub use json::{load_scene_json, parse_scene_json};
pub use merging::MergingSceneIndex;
pub use pinned_curves::{PinnedCurveExpandingFilter, PinnedCurveExpandingSceneIndex};
pub use prim_view::PrimView;
pub use retained::RetainedSceneIndex;
pub use switching::SwitchingSceneIndex;

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Records notices as `"<kind> <path>"` lines.
    #[derive(Default)]
    pub struct RecordingObserver {
        lines: RefCell<Vec<String>>,
        types: RefCell<Vec<String>>,
    }

    impl RecordingObserver {
        /// Observe `scene`; the returned handle keeps the observer alive.
        pub fn attach(scene: &dyn SceneIndex) -> Rc<Self> {
            let this = Rc::new(Self::default());
            let weak = Rc::downgrade(&this);
            scene.add_observer(weak);
            this
        }

        /// Drain recorded lines.
        pub fn take(&self) -> Vec<String> {
            self.types.borrow_mut().clear();
            std::mem::take(&mut *self.lines.borrow_mut())
        }

        /// Types of added entries since the last `take`.
        pub fn types(&self) -> Vec<String> {
            self.types.borrow().clone()
        }

        fn push(&self, kind: &str, path: &crate::util::ScenePath) {
            self.lines.borrow_mut().push(format!("{kind} {path}"));
        }
    }

    impl SceneIndexObserver for RecordingObserver {
        fn prims_added(&self, _sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
            for e in entries {
                self.push("add", &e.prim_path);
                self.types.borrow_mut().push(e.prim_type.to_string());
            }
        }

        fn prims_removed(&self, _sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
            for e in entries {
                self.push("remove", &e.prim_path);
            }
        }

        fn prims_dirtied(&self, _sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]) {
            for e in entries {
                self.push("dirty", &e.prim_path);
            }
        }

        fn prims_renamed(&self, _sender: &dyn SceneIndex, entries: &[RenamedPrimEntry]) {
            for e in entries {
                self.push("rename", &e.old_prim_path);
            }
        }
    }
}

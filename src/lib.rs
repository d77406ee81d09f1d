//! # hydra-scene
//!
//! Scene-index composition and change propagation.
//!
//! A scene is a tree of prims addressed by [`util::ScenePath`]; each prim
//! has a type and a lazily evaluated tree of immutable data sources. Scene
//! indices answer prim and child queries and notify observers of changes,
//! and they stack: filters rewrite their input, merges layer several
//! inputs, switches pick one of several.
//!
//! ## Modules
//!
//! - [`util`] - Tokens, paths, values, errors, diagnostics
//! - [`core`] - Data sources, locators, overlay and editor composition
//! - [`schema`] - Typed views over well-known prim data
//! - [`scene`] - Scene indices and the observer protocol
//! - [`collection`] - Path expressions and predicate matching
//! - [`tracker`] - Sorted ids, dependency sort, dirty bits, perf log
//! - [`attribute`] - Time-sampled attributes with value blocking
//! - [`settings`] - Persistent settings and logging setup
//!
//! ## Example
//!
//! ```ignore
//! use hydra_scene::prelude::*;
//!
//! let scene = RetainedSceneIndex::new();
//! scene.add_prims(&[AddedPrimEntry::new(ScenePath::parse("/World/Cube")?, "mesh")]);
//!
//! let expr: PathExpression = "//{hdType:mesh}".parse()?;
//! let eval = CollectionExpressionEvaluator::new(Some(scene), expr);
//! for path in eval.populate_all_matches(&ScenePath::absolute_root()) {
//!     println!("{path}");
//! }
//! ```

pub mod util;
pub mod core;
pub mod schema;
pub mod scene;
pub mod collection;
pub mod tracker;
pub mod attribute;
pub mod settings;

// Re-export commonly used types
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result, ScenePath, Time, Token, Value};
    pub use crate::core::{
        ContainerDataSource, ContainerDataSourceEditor, ContainerHandle, DataSource,
        DataSourceLocator, DataSourceLocatorSet, OverlayContainerDataSource, SampledDataSource,
    };
    pub use crate::scene::{
        AddedPrimEntry, DirtiedPrimEntry, MergingSceneIndex, RemovedPrimEntry, RenamedPrimEntry,
        RetainedSceneIndex, SceneFilter, SceneIndex, SceneIndexHandle, SceneIndexObserver,
        SceneIndexPrim, SingleInputFilteringSceneIndex, SwitchingSceneIndex,
    };
    pub use crate::collection::{CollectionExpressionEvaluator, MatchKind, PathExpression, PredicateLibrary};
    pub use crate::attribute::{Attribute, AttributeQuery};
}

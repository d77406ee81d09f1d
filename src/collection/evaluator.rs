//! Evaluate path expressions against a scene index.

use std::collections::HashMap;

use super::expression::{ExpressionNode, PathExpression, PathPattern, PatternComponent};
use super::predicate::{PredicateLibrary, PredicateResult};
use crate::scene::{PrimView, SceneIndex, SceneIndexHandle};
use crate::util::ScenePath;

/// How [`CollectionExpressionEvaluator::populate_matches`] collects paths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchKind {
    /// Every matching prim.
    #[default]
    MatchAll,
    /// Matching prims without a matching ancestor.
    ShallowestMatches,
    /// The shallowest matches and everything below them.
    ShallowestMatchesAndAllDescendants,
}

/// Matches paths against a [`PathExpression`], evaluating predicates on
/// prims of a scene index.
///
/// Paths are not checked for existence: a pattern without predicates can
/// match a path the scene does not contain.
pub struct CollectionExpressionEvaluator {
    scene: Option<SceneIndexHandle>,
    expression: PathExpression,
    library: PredicateLibrary,
}

impl CollectionExpressionEvaluator {
    /// Evaluator using the standard predicate library.
    pub fn new(scene: Option<SceneIndexHandle>, expression: PathExpression) -> Self {
        Self::with_library(scene, expression, PredicateLibrary::standard())
    }

    pub fn with_library(
        scene: Option<SceneIndexHandle>,
        expression: PathExpression,
        library: PredicateLibrary,
    ) -> Self {
        for name in expression.predicate_names() {
            if !library.contains(&name) {
                tracing::warn!(predicate = %name, expression = %expression, "predicate not in library");
            }
        }
        Self {
            scene,
            expression,
            library,
        }
    }

    /// True without a scene or with an empty expression; nothing matches.
    pub fn is_empty(&self) -> bool {
        self.scene.is_none() || self.expression.is_empty()
    }

    pub fn expression(&self) -> &PathExpression {
        &self.expression
    }

    pub fn matches(&self, path: &ScenePath) -> bool {
        self.match_result(path).value
    }

    /// Match result including whether it holds for all descendants.
    pub fn match_result(&self, path: &ScenePath) -> PredicateResult {
        match (&self.scene, self.expression.root()) {
            (Some(scene), Some(root)) => self.eval_node(&**scene, root, path),
            _ => PredicateResult::constant(false),
        }
    }

    /// Every match at or below `root`.
    pub fn populate_all_matches(&self, root: &ScenePath) -> Vec<ScenePath> {
        self.populate_matches(root, MatchKind::MatchAll)
    }

    /// Matches at or below `root`, in traversal order.
    #[tracing::instrument(skip_all, fields(root = %root, kind = ?kind))]
    pub fn populate_matches(&self, root: &ScenePath, kind: MatchKind) -> Vec<ScenePath> {
        let mut out = Vec::new();
        let Some(scene) = &self.scene else {
            return out;
        };
        if self.expression.is_empty() {
            return out;
        }
        let scene: &dyn SceneIndex = &**scene;
        let mut view = PrimView::new(scene, root.clone());
        while let Some(path) = view.next() {
            let result = self.match_result(&path);
            match kind {
                MatchKind::MatchAll => {
                    if result.is_constant() {
                        if result.value {
                            out.extend(PrimView::new(scene, path));
                        }
                        view.skip_descendants();
                    } else if result.value {
                        out.push(path);
                    }
                }
                MatchKind::ShallowestMatches => {
                    if result.value {
                        out.push(path);
                        view.skip_descendants();
                    } else if result.is_constant() {
                        view.skip_descendants();
                    }
                }
                MatchKind::ShallowestMatchesAndAllDescendants => {
                    if result.value {
                        out.extend(PrimView::new(scene, path));
                        view.skip_descendants();
                    } else if result.is_constant() {
                        view.skip_descendants();
                    }
                }
            }
        }
        tracing::debug!(count = out.len(), "populated matches");
        out
    }

    fn eval_node(&self, scene: &dyn SceneIndex, node: &ExpressionNode, path: &ScenePath) -> PredicateResult {
        match node {
            ExpressionNode::Pattern(pattern) => {
                PatternMatcher::new(scene, &self.library, pattern, path).result()
            }
            ExpressionNode::Complement(e) => self.eval_node(scene, e, path).not(),
            ExpressionNode::Union(a, b) => self
                .eval_node(scene, a, path)
                .or(|| self.eval_node(scene, b, path)),
            ExpressionNode::Intersection(a, b) => self
                .eval_node(scene, a, path)
                .and(|| self.eval_node(scene, b, path)),
            ExpressionNode::Difference(a, b) => self
                .eval_node(scene, a, path)
                .and(|| self.eval_node(scene, b, path).not()),
        }
    }
}

/// Backtracking match of one pattern against one path.
struct PatternMatcher<'a> {
    scene: &'a dyn SceneIndex,
    library: &'a PredicateLibrary,
    components: &'a [PatternComponent],
    path: &'a ScenePath,
    /// Element test results keyed by (component, element).
    tested: HashMap<(usize, usize), bool>,
}

impl<'a> PatternMatcher<'a> {
    fn new(
        scene: &'a dyn SceneIndex,
        library: &'a PredicateLibrary,
        pattern: &'a PathPattern,
        path: &'a ScenePath,
    ) -> Self {
        Self {
            scene,
            library,
            components: pattern.components(),
            path,
            tested: HashMap::new(),
        }
    }

    fn result(mut self) -> PredicateResult {
        if !self.path.is_absolute() {
            return PredicateResult::constant(false);
        }
        // `//{pred}`: the predicate alone decides, constancy included.
        if let [PatternComponent::Stretch, PatternComponent::Element {
            glob: None,
            predicate: Some(predicate),
        }] = self.components
        {
            if self.path.is_absolute_root() {
                return PredicateResult::varying(false);
            }
            let prim = self.scene.get_prim(self.path);
            return predicate.evaluate(self.library, &prim);
        }

        if self.full_match(0, 0) {
            if matches!(self.components.last(), Some(PatternComponent::Stretch)) {
                PredicateResult::constant(true)
            } else {
                PredicateResult::varying(true)
            }
        } else if self.can_extend(0, 0) {
            PredicateResult::varying(false)
        } else {
            PredicateResult::constant(false)
        }
    }

    fn full_match(&mut self, ci: usize, ei: usize) -> bool {
        let n = self.path.element_count();
        match self.components.get(ci) {
            None => ei == n,
            Some(PatternComponent::Stretch) => {
                self.full_match(ci + 1, ei) || (ei < n && self.full_match(ci, ei + 1))
            }
            Some(PatternComponent::Element { .. }) => {
                ei < n && self.element_matches(ci, ei) && self.full_match(ci + 1, ei + 1)
            }
        }
    }

    /// True when some descendant path could still match, i.e. every path
    /// element was consumed with components left over.
    fn can_extend(&mut self, ci: usize, ei: usize) -> bool {
        let n = self.path.element_count();
        if ei == n {
            return ci < self.components.len();
        }
        match self.components.get(ci) {
            None => false,
            Some(PatternComponent::Stretch) => {
                self.can_extend(ci + 1, ei) || self.can_extend(ci, ei + 1)
            }
            Some(PatternComponent::Element { .. }) => {
                self.element_matches(ci, ei) && self.can_extend(ci + 1, ei + 1)
            }
        }
    }

    fn element_matches(&mut self, ci: usize, ei: usize) -> bool {
        if let Some(&hit) = self.tested.get(&(ci, ei)) {
            return hit;
        }
        let hit = match &self.components[ci] {
            PatternComponent::Stretch => true,
            PatternComponent::Element { glob, predicate } => {
                let name = &self.path.elements()[ei];
                glob.as_ref().map_or(true, |g| g.matches(name))
                    && predicate.as_ref().map_or(true, |p| {
                        let prefix = ScenePath::from_elements(self.path.elements()[..=ei].iter().cloned());
                        let prim = self.scene.get_prim(&prefix);
                        crate::perf_counter_incr!("collection:predicateEvaluations");
                        p.evaluate(self.library, &prim).value
                    })
            }
        };
        self.tested.insert((ci, ei), hit);
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{AddedPrimEntry, RetainedSceneIndex};

    fn p(s: &str) -> ScenePath {
        ScenePath::parse(s).unwrap()
    }

    fn evaluator(scene: &std::rc::Rc<RetainedSceneIndex>, expr: &str) -> CollectionExpressionEvaluator {
        CollectionExpressionEvaluator::new(
            Some(scene.clone() as SceneIndexHandle),
            PathExpression::parse(expr).unwrap(),
        )
    }

    #[test]
    fn test_empty_evaluator() {
        let e = CollectionExpressionEvaluator::new(None, PathExpression::default());
        assert!(e.is_empty());
        assert!(!e.matches(&p("/Foo")));

        let e = CollectionExpressionEvaluator::new(None, PathExpression::parse("/Foo").unwrap());
        assert!(e.is_empty());
        assert!(!e.matches(&p("/Foo")));

        let scene = RetainedSceneIndex::new();
        let e = CollectionExpressionEvaluator::new(
            Some(scene as SceneIndexHandle),
            PathExpression::default(),
        );
        assert!(e.is_empty());
        assert!(e.populate_all_matches(&p("/")).is_empty());
    }

    #[test]
    fn test_match_constancy() {
        let scene = RetainedSceneIndex::new();
        let e = evaluator(&scene, "/A//");
        assert_eq!(e.match_result(&p("/A/B")), PredicateResult::constant(true));
        assert_eq!(e.match_result(&p("/B")), PredicateResult::constant(false));
        assert_eq!(e.match_result(&p("/")), PredicateResult::varying(false));

        let e = evaluator(&scene, "/A/B");
        assert_eq!(e.match_result(&p("/A/B")), PredicateResult::varying(true));
        assert_eq!(e.match_result(&p("/A/B/C")), PredicateResult::constant(false));
    }

    #[test]
    fn test_set_algebra() {
        let scene = RetainedSceneIndex::new();
        let e = evaluator(&scene, "/A// - /A/B//");
        assert!(e.matches(&p("/A/C")));
        assert!(!e.matches(&p("/A/B/X")));

        let e = evaluator(&scene, "~/A//");
        assert!(e.matches(&p("/B")));
        assert!(!e.matches(&p("/A")));

        let e = evaluator(&scene, "//X & /A//");
        assert!(e.matches(&p("/A/B/X")));
        assert!(!e.matches(&p("/C/X")));
    }

    #[test]
    fn test_populate_kinds() {
        let scene = RetainedSceneIndex::new();
        scene.add_prims(&[
            AddedPrimEntry::new(p("/a/foobar/b"), "scope"),
            AddedPrimEntry::new(p("/a/foobar/bar"), "scope"),
            AddedPrimEntry::new(p("/a/foobar/baz"), "scope"),
        ]);
        let e = evaluator(&scene, "//*bar");
        assert_eq!(
            e.populate_matches(&p("/"), MatchKind::MatchAll),
            vec![p("/a/foobar"), p("/a/foobar/bar")]
        );
        assert_eq!(
            e.populate_matches(&p("/"), MatchKind::ShallowestMatches),
            vec![p("/a/foobar")]
        );
        assert_eq!(
            e.populate_matches(&p("/"), MatchKind::ShallowestMatchesAndAllDescendants),
            vec![
                p("/a/foobar"),
                p("/a/foobar/b"),
                p("/a/foobar/bar"),
                p("/a/foobar/baz"),
            ]
        );
    }
}

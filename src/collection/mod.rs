//! Collections: path expressions evaluated against a scene.
//!
//! - [`PathExpression`] - Parsed pattern set algebra
//! - [`PredicateLibrary`] - Named predicates usable inside `{...}`
//! - [`CollectionExpressionEvaluator`] - Matching and population
//!
//! ```ignore
//! let expr: PathExpression = "//{hdPurpose:food and hdHasPrimvar:fresh}".parse()?;
//! let eval = CollectionExpressionEvaluator::new(Some(scene), expr);
//! for path in eval.populate_all_matches(&ScenePath::absolute_root()) {
//!     println!("{path}");
//! }
//! ```

mod evaluator;
mod expression;
mod predicate;

pub use evaluator::{CollectionExpressionEvaluator, MatchKind};
pub use expression::{
    ExpressionNode, Glob, PathExpression, PathPattern, PatternComponent, PredicateExpr,
};
pub use predicate::{
    CallArg, Constancy, PredicateArgs, PredicateFn, PredicateLibrary, PredicateResult,
};

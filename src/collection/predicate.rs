//! Predicate functions usable inside `{...}` in path expressions.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::core::{resolve, DataSourceLocator};
use crate::scene::SceneIndexPrim;
use crate::schema::{MaterialBindingsSchema, PrimvarsSchema, PurposeSchema, Schema, VisibilitySchema};
use crate::util::{Token, Value};

/// Whether a predicate result also holds for every descendant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constancy {
    ConstantOverDescendants,
    MayVaryOverDescendants,
}

/// Outcome of evaluating a predicate on one prim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PredicateResult {
    pub value: bool,
    pub constancy: Constancy,
}

impl PredicateResult {
    pub fn varying(value: bool) -> Self {
        Self {
            value,
            constancy: Constancy::MayVaryOverDescendants,
        }
    }

    pub fn constant(value: bool) -> Self {
        Self {
            value,
            constancy: Constancy::ConstantOverDescendants,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.constancy == Constancy::ConstantOverDescendants
    }

    pub fn not(self) -> Self {
        Self {
            value: !self.value,
            constancy: self.constancy,
        }
    }

    /// Logical and; a constant false operand decides the constancy.
    pub fn and(self, rhs: impl FnOnce() -> Self) -> Self {
        if !self.value {
            return self;
        }
        let rhs = rhs();
        if !rhs.value {
            return rhs;
        }
        Self::both(true, self, rhs)
    }

    /// Logical or; a constant true operand decides the constancy.
    pub fn or(self, rhs: impl FnOnce() -> Self) -> Self {
        if self.value {
            return self;
        }
        let rhs = rhs();
        if rhs.value {
            return rhs;
        }
        Self::both(false, self, rhs)
    }

    fn both(value: bool, a: Self, b: Self) -> Self {
        if a.is_constant() && b.is_constant() {
            Self::constant(value)
        } else {
            Self::varying(value)
        }
    }
}

/// Arguments bound to a predicate's parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PredicateArgs {
    values: Vec<(Token, Value)>,
}

impl PredicateArgs {
    /// Argument by parameter name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Argument by parameter position.
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.values.get(index).map(|(_, v)| v)
    }

    /// Argument rendered as text; `None` when missing or empty.
    pub fn text(&self, index: usize) -> Option<String> {
        match self.at(index)? {
            Value::Empty => None,
            Value::Token(t) => Some(t.to_string()),
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn bool_at(&self, index: usize) -> Option<bool> {
        self.at(index).and_then(Value::as_bool)
    }
}

/// One argument as written in an expression.
#[derive(Clone, Debug, PartialEq)]
pub struct CallArg {
    /// Keyword, for `name=value` arguments.
    pub name: Option<Token>,
    pub value: Value,
}

/// Signature of predicate functions.
pub type PredicateFn = Arc<dyn Fn(&SceneIndexPrim, &PredicateArgs) -> PredicateResult + Send + Sync>;

#[derive(Clone)]
struct PredicateDef {
    func: PredicateFn,
    /// Parameter names with defaults; `Value::Empty` marks a required one.
    params: Vec<(Token, Value)>,
}

/// Named predicate functions.
///
/// Libraries are values: [`define`](Self::define) returns an extended copy
/// and leaves the original untouched.
#[derive(Clone, Default)]
pub struct PredicateLibrary {
    predicates: Arc<BTreeMap<Token, PredicateDef>>,
}

impl fmt::Debug for PredicateLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.predicates.keys()).finish()
    }
}

impl PredicateLibrary {
    /// A library without predicates.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in scene predicates.
    pub fn standard() -> Self {
        static STANDARD: OnceLock<PredicateLibrary> = OnceLock::new();
        STANDARD.get_or_init(build_standard).clone()
    }

    /// Return a copy of this library with `name` (re)defined.
    pub fn define<F, I, N>(&self, name: &str, func: F, params: I) -> Self
    where
        F: Fn(&SceneIndexPrim, &PredicateArgs) -> PredicateResult + Send + Sync + 'static,
        I: IntoIterator<Item = (N, Value)>,
        N: Into<Token>,
    {
        let mut predicates = (*self.predicates).clone();
        predicates.insert(
            Token::new(name),
            PredicateDef {
                func: Arc::new(func),
                params: params.into_iter().map(|(n, v)| (n.into(), v)).collect(),
            },
        );
        Self {
            predicates: Arc::new(predicates),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    pub fn names(&self) -> Vec<Token> {
        self.predicates.keys().cloned().collect()
    }

    /// Bind `args` and run predicate `name` on `prim`.
    ///
    /// Unknown predicates evaluate to a constant false.
    pub fn call(&self, name: &str, args: &[CallArg], prim: &SceneIndexPrim) -> PredicateResult {
        let Some(def) = self.predicates.get(name) else {
            tracing::warn!(predicate = name, "unknown predicate");
            return PredicateResult::constant(false);
        };
        (def.func)(prim, &bind_args(&def.params, args))
    }
}

/// Match positional and keyword arguments to parameters, falling back to
/// defaults.
fn bind_args(params: &[(Token, Value)], args: &[CallArg]) -> PredicateArgs {
    let mut values: Vec<(Token, Value)> = params.to_vec();
    let mut next_positional = 0;
    for arg in args {
        match &arg.name {
            Some(name) => match values.iter_mut().find(|(n, _)| n == name) {
                Some(slot) => slot.1 = arg.value.clone(),
                None => tracing::warn!(%name, "unknown predicate argument"),
            },
            None => {
                if let Some(slot) = values.get_mut(next_positional) {
                    slot.1 = arg.value.clone();
                } else if params.is_empty() {
                    // Parameterless predicates still see their arguments.
                    values.push((Token::empty(), arg.value.clone()));
                }
                next_positional += 1;
            }
        }
    }
    PredicateArgs { values }
}

// ============================================================================
// Built-ins
// ============================================================================

fn type_predicate(prim: &SceneIndexPrim, args: &PredicateArgs) -> PredicateResult {
    let wanted = args.text(0).unwrap_or_default();
    PredicateResult::varying(prim.prim_type.as_str() == wanted)
}

fn visible_predicate(prim: &SceneIndexPrim, args: &PredicateArgs) -> PredicateResult {
    let wanted = args.bool_at(0).unwrap_or(true);
    let authored = prim
        .data_source
        .as_ref()
        .and_then(VisibilitySchema::from_parent)
        .and_then(|s| s.visibility());
    PredicateResult::varying(authored == Some(wanted))
}

fn purpose_predicate(prim: &SceneIndexPrim, args: &PredicateArgs) -> PredicateResult {
    let wanted = args.text(0).unwrap_or_default();
    let purpose = prim
        .data_source
        .as_ref()
        .and_then(PurposeSchema::from_parent)
        .and_then(|s| s.purpose());
    PredicateResult::varying(purpose.is_some_and(|p| p.as_str() == wanted))
}

fn has_data_source_predicate(prim: &SceneIndexPrim, args: &PredicateArgs) -> PredicateResult {
    let (Some(ds), Some(text)) = (&prim.data_source, args.text(0)) else {
        return PredicateResult::varying(false);
    };
    let locator = DataSourceLocator::parse(&text);
    PredicateResult::varying(resolve(ds, &locator).is_some())
}

fn has_primvar_predicate(prim: &SceneIndexPrim, args: &PredicateArgs) -> PredicateResult {
    let (Some(ds), Some(name)) = (&prim.data_source, args.text(0)) else {
        return PredicateResult::varying(false);
    };
    let found = PrimvarsSchema::from_parent(ds).is_some_and(|p| p.primvar(&name).is_some());
    PredicateResult::varying(found)
}

fn has_material_binding_predicate(prim: &SceneIndexPrim, args: &PredicateArgs) -> PredicateResult {
    let (Some(ds), Some(needle)) = (&prim.data_source, args.text(0)) else {
        return PredicateResult::varying(false);
    };
    let bound = MaterialBindingsSchema::from_parent(ds)
        .and_then(|b| b.all_purpose_binding())
        .and_then(|b| b.path());
    PredicateResult::varying(bound.is_some_and(|path| path.to_string().contains(&needle)))
}

fn build_standard() -> PredicateLibrary {
    PredicateLibrary::empty()
        .define("hdType", type_predicate, [("typeName", Value::Empty)])
        .define("type", type_predicate, [("typeName", Value::Empty)])
        .define("hdVisible", visible_predicate, [("visibility", Value::Bool(true))])
        .define("hdPurpose", purpose_predicate, [("purpose", Value::Empty)])
        .define("hdHasDataSource", has_data_source_predicate, [("locator", Value::Empty)])
        .define("hdHasPrimvar", has_primvar_predicate, [("primvarName", Value::Empty)])
        .define("hasPrimvar", has_primvar_predicate, [("primvarName", Value::Empty)])
        .define(
            "hdHasMaterialBinding",
            has_material_binding_predicate,
            [("materialPath", Value::Empty)],
        )
}

//! Topological ordering of computation dependencies.
//!
//! The input maps each node to the nodes it depends on. The output lists
//! every node after all of its transitive dependencies. Ties between
//! unrelated nodes follow the map's iteration order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Write};

use crate::util::{Error, Result};

/// Node → set of nodes it depends on.
///
/// Nodes without an entry have no dependencies. Dependencies that never
/// appear as keys are still emitted.
pub type DependencyMap<T> = BTreeMap<T, BTreeSet<T>>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Order `deps` so each node follows its dependencies.
///
/// Fails with [`Error::DependencyCycle`] if any cycle exists; no partial
/// order is produced.
#[tracing::instrument(level = "debug", skip_all, fields(nodes = deps.len()))]
pub fn dependency_sort<T>(deps: &DependencyMap<T>) -> Result<Vec<T>>
where
    T: Ord + Clone + fmt::Debug,
{
    let mut marks: BTreeMap<T, Mark> = BTreeMap::new();
    let mut order = Vec::with_capacity(deps.len());

    for node in deps.keys() {
        if let Err(err) = visit(node, deps, &mut marks, &mut order) {
            tracing::debug!(map = %format_dependency_map(deps), "dependency sort failed");
            return Err(err);
        }
    }

    Ok(order)
}

fn visit<T>(
    node: &T,
    deps: &DependencyMap<T>,
    marks: &mut BTreeMap<T, Mark>,
    order: &mut Vec<T>,
) -> Result<()>
where
    T: Ord + Clone + fmt::Debug,
{
    match marks.get(node) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::InProgress) => {
            tracing::debug!(?node, "dependency cycle");
            return Err(Error::DependencyCycle(format!("{:?}", node)));
        }
        None => {}
    }

    marks.insert(node.clone(), Mark::InProgress);
    if let Some(children) = deps.get(node) {
        for dep in children {
            visit(dep, deps, marks, order)?;
        }
    }
    marks.insert(node.clone(), Mark::Done);
    order.push(node.clone());
    Ok(())
}

/// Render a dependency map, one `node -> deps` line per entry.
pub fn format_dependency_map<T: fmt::Debug>(deps: &DependencyMap<T>) -> String {
    let mut out = String::new();
    for (node, children) in deps {
        let _ = writeln!(out, "{:?} -> {:?}", node, children);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&'static str, &[&'static str])]) -> DependencyMap<&'static str> {
        edges
            .iter()
            .map(|(node, deps)| (*node, deps.iter().copied().collect()))
            .collect()
    }

    fn occurs_before(order: &[&str], a: &str, b: &str) -> bool {
        let pos = |x: &str| order.iter().position(|n| *n == x);
        matches!((pos(a), pos(b)), (Some(i), Some(j)) if i < j)
    }

    #[test]
    fn test_linear_chain() {
        let deps = graph(&[("A", &["B"]), ("B", &["C"])]);
        let order = dependency_sort(&deps).unwrap();
        assert_eq!(order, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_tree() {
        let deps = graph(&[("A", &["B", "F"]), ("B", &["C", "E"]), ("C", &["D"])]);
        let order = dependency_sort(&deps).unwrap();
        assert_eq!(order.len(), 6);
        assert!(occurs_before(&order, "F", "A"));
        assert!(occurs_before(&order, "B", "A"));
        assert!(occurs_before(&order, "C", "B"));
        assert!(occurs_before(&order, "E", "B"));
        assert!(occurs_before(&order, "D", "C"));
    }

    #[test]
    fn test_cycle_fails() {
        let deps = graph(&[("A", &["B", "F"]), ("B", &["D"]), ("C", &["B"]), ("D", &["C", "E"])]);
        let err = dependency_sort(&deps).unwrap_err();
        assert!(matches!(err, Error::DependencyCycle(_)));
    }

    #[test]
    fn test_self_cycle_and_empty() {
        assert!(dependency_sort(&graph(&[("A", &["A"])])).is_err());
        assert!(dependency_sort(&DependencyMap::<u32>::new()).unwrap().is_empty());
    }

    #[test]
    fn test_format() {
        let deps = graph(&[("A", &["B"])]);
        assert_eq!(format_dependency_map(&deps), "\"A\" -> {\"B\"}\n");
    }
}

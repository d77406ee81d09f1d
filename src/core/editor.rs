//! Building patched containers from a sequence of edits.

use std::collections::BTreeMap;

use super::{
    ContainerDataSource, ContainerHandle, DataSource, DataSourceLocator,
    OverlayContainerDataSource, RetainedContainerDataSource,
};
use crate::util::Token;

/// One key in the pending-edit trie.
#[derive(Default)]
struct Entry {
    /// `Some(value)` when a `set` targeted this key; `Some(None)` deletes.
    set: Option<Option<DataSource>>,
    /// Edits below this key, applied over whatever the key resolves to.
    child: Option<Node>,
}

#[derive(Default)]
struct Node {
    entries: BTreeMap<Token, Entry>,
}

/// Builds a new container from an optional initial container plus ordered
/// `set` and `overlay` edits.
///
/// A later `set` masks everything previously at its locator, including
/// sub-edits. Setting `None` deletes the key. `overlay` layers a container
/// over whatever the locator currently resolves to, keeping siblings.
/// Keys of the initial container that no edit touches are passed through
/// unchanged (shared, not copied).
///
/// ```ignore
/// let patched = ContainerDataSourceEditor::with_initial(prim)
///     .set(&"visibility.visibility".into(), Some(retained_bool(false)))
///     .finish();
/// ```
#[derive(Default)]
pub struct ContainerDataSourceEditor {
    initial: Option<ContainerHandle>,
    root: Node,
}

impl ContainerDataSourceEditor {
    /// An editor starting from nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// An editor starting from `initial`.
    pub fn with_initial(initial: ContainerHandle) -> Self {
        Self {
            initial: Some(initial),
            root: Node::default(),
        }
    }

    /// Replace the data source at `locator`. `None` deletes it.
    ///
    /// Setting the empty locator replaces the whole container.
    pub fn set(&mut self, locator: &DataSourceLocator, value: Option<DataSource>) -> &mut Self {
        let Some(name) = locator.last_element() else {
            self.initial = value.and_then(DataSource::into_container);
            self.root = Node::default();
            return self;
        };
        let parent = self.node_mut(&locator.remove_last());
        let entry = parent.entries.entry(name.clone()).or_default();
        entry.set = Some(value);
        entry.child = None;
        self
    }

    /// Layer `container` over whatever `locator` currently resolves to.
    pub fn overlay(&mut self, locator: &DataSourceLocator, container: ContainerHandle) -> &mut Self {
        let current = self.current_at(locator).and_then(DataSource::into_container);
        let merged = OverlayContainerDataSource::overlay_nonempty(Some(container), current);
        self.set(locator, merged.map(DataSource::Container))
    }

    /// Materialize the edited container.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn finish(&self) -> ContainerHandle {
        if self.root.entries.is_empty() {
            return self
                .initial
                .clone()
                .unwrap_or_else(RetainedContainerDataSource::empty);
        }
        finish_node(self.initial.as_ref(), &self.root)
    }

    fn node_mut(&mut self, locator: &DataSourceLocator) -> &mut Node {
        let mut node = &mut self.root;
        for name in locator.elements() {
            let entry = node.entries.entry(name.clone()).or_default();
            node = entry.child.get_or_insert_with(Node::default);
        }
        node
    }

    /// What `finish()` would produce at `locator` right now.
    fn current_at(&self, locator: &DataSourceLocator) -> Option<DataSource> {
        let mut base = self.initial.clone().map(DataSource::Container);
        let mut node = Some(&self.root);
        for name in locator.elements() {
            let entry = node.and_then(|n| n.entries.get(name));
            base = match entry.and_then(|e| e.set.as_ref()) {
                Some(set) => set.clone(),
                None => base.as_ref().and_then(|b| b.as_container()?.get(name)),
            };
            node = entry.and_then(|e| e.child.as_ref());
        }
        match node {
            Some(node) if !node.entries.is_empty() => Some(DataSource::Container(finish_node(
                base.as_ref().and_then(DataSource::as_container),
                node,
            ))),
            _ => base,
        }
    }
}

/// Apply the edits of `node` over `base`.
fn finish_node(base: Option<&ContainerHandle>, node: &Node) -> ContainerHandle {
    let mut entries: Vec<(Token, DataSource)> = Vec::new();

    if let Some(base) = base {
        for name in base.names() {
            if node.entries.contains_key(&name) {
                continue;
            }
            if let Some(ds) = base.get(&name) {
                entries.push((name, ds));
            }
        }
    }

    for (name, entry) in &node.entries {
        let child_base = match &entry.set {
            Some(set) => set.clone(),
            None => base.and_then(|b| b.get(name)),
        };
        let resolved = match &entry.child {
            Some(child) => Some(DataSource::Container(finish_node(
                child_base.as_ref().and_then(DataSource::as_container),
                child,
            ))),
            None => child_base,
        };
        if let Some(ds) = resolved {
            entries.push((name.clone(), ds));
        }
    }

    RetainedContainerDataSource::new(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{debug_print, retained_container, retained_value};

    fn l(s: &str) -> DataSourceLocator {
        DataSourceLocator::parse(s.replace('/', ".").as_str())
    }

    fn int(v: i32) -> Option<DataSource> {
        Some(retained_value(v))
    }

    fn print(c: ContainerHandle) -> String {
        debug_print(&DataSource::Container(c))
    }

    #[test]
    fn test_two_level_override() {
        let sub = RetainedContainerDataSource::new([("B", retained_value(1))]);
        let mut editor = ContainerDataSourceEditor::new();
        editor
            .set(&l("A"), Some(DataSource::Container(sub)))
            .set(&l("A/C"), int(2))
            .set(&l("A/D/E"), int(3));

        let expected = RetainedContainerDataSource::new([(
            "A",
            retained_container([
                ("B", retained_value(1)),
                ("C", retained_value(2)),
                ("D", retained_container([("E", retained_value(3))])),
            ]),
        )]);
        assert_eq!(print(editor.finish()), print(expected));
    }

    #[test]
    fn test_set_null_deletes() {
        let mut editor = ContainerDataSourceEditor::new();
        editor
            .set(&l("A/B"), int(1))
            .set(&l("A/C"), int(2))
            .set(&l("A/B"), None)
            .set(&l("Z/Y"), None);

        let expected = RetainedContainerDataSource::new([
            ("A", retained_container([("C", retained_value(2))])),
            ("Z", DataSource::Container(RetainedContainerDataSource::empty())),
        ]);
        assert_eq!(print(editor.finish()), print(expected));
    }

    #[test]
    fn test_initial_container_kept() {
        let initial = RetainedContainerDataSource::new([
            ("A", retained_container([("B", retained_value(1))])),
            ("Q", retained_value(9)),
        ]);
        let mut editor = ContainerDataSourceEditor::with_initial(initial.clone());
        editor.set(&l("A/C"), int(2));
        let out = editor.finish();

        let expected = RetainedContainerDataSource::new([
            ("A", retained_container([("B", retained_value(1)), ("C", retained_value(2))])),
            ("Q", retained_value(9)),
        ]);
        assert_eq!(print(out.clone()), print(expected));

        // untouched children are shared with the initial container
        let q_in = initial.get(&Token::new("Q")).unwrap();
        let q_out = out.get(&Token::new("Q")).unwrap();
        assert!(q_in.ptr_eq(&q_out));
    }

    #[test]
    fn test_set_masks_initial_and_previous() {
        let initial = RetainedContainerDataSource::new([(
            "A",
            retained_container([("B", retained_value(1))]),
        )]);
        let x = RetainedContainerDataSource::new([("X", retained_value(1))]);
        let y = RetainedContainerDataSource::new([("Y", retained_value(2))]);

        let mut editor = ContainerDataSourceEditor::with_initial(initial);
        editor
            .set(&l("A"), Some(DataSource::Container(x)))
            .set(&l("A/X2"), int(5))
            .set(&l("A"), Some(DataSource::Container(y)));

        let expected = RetainedContainerDataSource::new([(
            "A",
            retained_container([("Y", retained_value(2))]),
        )]);
        assert_eq!(print(editor.finish()), print(expected));
    }

    #[test]
    fn test_overlay_keeps_siblings() {
        let initial = RetainedContainerDataSource::new([(
            "A",
            retained_container([("B", retained_value(1)), ("C", retained_value(2))]),
        )]);
        let sub = RetainedContainerDataSource::new([("C", retained_value(20)), ("D", retained_value(30))]);

        let mut overlaid = ContainerDataSourceEditor::with_initial(initial.clone());
        overlaid.overlay(&l("A"), sub.clone());
        let expected = RetainedContainerDataSource::new([(
            "A",
            retained_container([
                ("B", retained_value(1)),
                ("C", retained_value(20)),
                ("D", retained_value(30)),
            ]),
        )]);
        assert_eq!(print(overlaid.finish()), print(expected));

        let mut replaced = ContainerDataSourceEditor::with_initial(initial);
        replaced.set(&l("A"), Some(DataSource::Container(sub)));
        let expected = RetainedContainerDataSource::new([(
            "A",
            retained_container([("C", retained_value(20)), ("D", retained_value(30))]),
        )]);
        assert_eq!(print(replaced.finish()), print(expected));
    }

    #[test]
    fn test_overlay_after_sub_edits() {
        let mut editor = ContainerDataSourceEditor::new();
        editor.set(&l("A/B"), int(1));
        editor.overlay(&l("A"), RetainedContainerDataSource::new([("C", retained_value(2))]));
        editor.set(&l("A/C"), int(3));

        let expected = RetainedContainerDataSource::new([(
            "A",
            retained_container([("B", retained_value(1)), ("C", retained_value(3))]),
        )]);
        assert_eq!(print(editor.finish()), print(expected));
    }

    #[test]
    fn test_empty_editor() {
        let editor = ContainerDataSourceEditor::new();
        assert!(editor.finish().names().is_empty());
    }
}

use std::sync::Arc;

use netedit_core::Model;
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::operation::{Descriptor, Selection};

/// The operations an editor offers, in menu order.
#[derive(Default, Clone)]
pub struct OperationCatalog {
    entries: Vec<Arc<dyn Descriptor>>,
}

impl OperationCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation at the end of the menu.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::DuplicateOperation` if an operation with the
    /// same name is registered already.
    pub fn register(&mut self, descriptor: Arc<dyn Descriptor>) -> Result<()> {
        let name = descriptor.name();
        if self.get(name).is_some() {
            return Err(EngineError::DuplicateOperation(name));
        }
        debug!(operation = name, "registered operation");
        self.entries.push(descriptor);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Descriptor>> {
        self.entries.iter().find(|d| d.name() == name)
    }

    /// Look up an operation by name.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::UnknownOperation` if no operation has that name.
    pub fn require(&self, name: &str) -> Result<&Arc<dyn Descriptor>> {
        self.get(name)
            .ok_or_else(|| EngineError::UnknownOperation(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Descriptor>> {
        self.entries.iter()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|d| d.name()).collect()
    }

    /// Names of the operations that apply to `selection`.
    #[must_use]
    pub fn enabled_for(&self, selection: &Selection, model: &Model) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|d| d.is_valid(selection, model))
            .map(|d| d.name())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for OperationCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use netedit_core::NodeType;

    use super::*;

    struct Fixed {
        name: &'static str,
        min_nodes: usize,
    }

    impl Descriptor for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn description(&self) -> &'static str {
            "fixed"
        }

        fn is_valid(&self, selection: &Selection, _model: &Model) -> bool {
            selection.nodes.len() >= self.min_nodes
        }
    }

    fn catalog() -> OperationCatalog {
        let mut catalog = OperationCatalog::new();
        catalog
            .register(Arc::new(Fixed {
                name: "one",
                min_nodes: 1,
            }))
            .expect("first registration");
        catalog
            .register(Arc::new(Fixed {
                name: "two",
                min_nodes: 2,
            }))
            .expect("second registration");
        catalog
    }

    #[test]
    fn register_keeps_menu_order() {
        assert_eq!(catalog().names(), vec!["one", "two"]);
    }

    #[test]
    fn register_rejects_duplicate_name() {
        let mut catalog = catalog();

        let err = catalog
            .register(Arc::new(Fixed {
                name: "one",
                min_nodes: 0,
            }))
            .expect_err("duplicate");

        assert!(matches!(err, EngineError::DuplicateOperation("one")));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn enabled_for_filters_by_selection() {
        let model = Model::new()
            .with_node("a", "A", NodeType::Gene)
            .with_node("b", "B", NodeType::Gene);
        let catalog = catalog();

        assert_eq!(
            catalog.enabled_for(&Selection::of_nodes(["a"]), &model),
            vec!["one"]
        );
        assert_eq!(
            catalog.enabled_for(&Selection::of_nodes(["a", "b"]), &model),
            vec!["one", "two"]
        );
        assert!(catalog.enabled_for(&Selection::new(), &model).is_empty());
    }

    #[test]
    fn require_reports_unknown_name() {
        let Err(err) = catalog().require("three") else {
            panic!("expected an unknown operation");
        };

        assert_eq!(err.to_string(), "unknown operation 'three'");
    }
}

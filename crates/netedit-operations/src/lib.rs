//! The netedit edit operations and the catalog that offers them.

mod error;
pub mod fixtures;
pub mod operations;

use std::sync::Arc;

use netedit_engine::{Descriptor, Operation, OperationCatalog, Progress, Selection, start};
use netedit_journal::Session;
use serde::de::DeserializeOwned;
use tracing::info;

pub use error::{OperationError, Result};
use operations::{ChangeNodeType, MergeNodes, MoveToRegion, RenameNode, SetNodeColor};

/// Every operation, in menu order.
#[must_use]
pub fn standard_catalog() -> OperationCatalog {
    let mut catalog = OperationCatalog::new();
    for descriptor in [
        Arc::new(MergeNodes) as Arc<dyn Descriptor>,
        Arc::new(ChangeNodeType),
        Arc::new(RenameNode),
        Arc::new(MoveToRegion),
        Arc::new(SetNodeColor),
    ] {
        if let Err(err) = catalog.register(descriptor) {
            tracing::error!(error = %err, "skipping operation");
        }
    }
    catalog
}

/// Start the operation named `name` with arguments given as a TOML table,
/// and run it until it first suspends or ends.
///
/// # Errors
///
/// Returns `OperationError::UnknownOperation` for an unknown name,
/// `OperationError::InvalidPreload` if `args` do not fit the operation, and
/// `OperationError::Engine` if the operation misuses the engine.
pub fn launch(name: &str, args: toml::Table, session: &mut Session) -> Result<Progress> {
    match name {
        MergeNodes::NAME => launch_preloaded(MergeNodes, args, session),
        ChangeNodeType::NAME => launch_preloaded(ChangeNodeType, args, session),
        RenameNode::NAME => launch_preloaded(RenameNode, args, session),
        MoveToRegion::NAME => launch_preloaded(MoveToRegion, args, session),
        SetNodeColor::NAME => launch_preloaded(SetNodeColor, args, session),
        other => Err(unknown(other)),
    }
}

/// Start the operation named `name` against an interactive selection.
///
/// # Errors
///
/// Returns `OperationError::UnknownOperation` for an unknown name and
/// `OperationError::Engine` if the operation does not apply to `selection`
/// or misuses the engine.
pub fn launch_interactive(
    name: &str,
    selection: &Selection,
    session: &mut Session,
) -> Result<Progress> {
    match name {
        MergeNodes::NAME => launch_selected(MergeNodes, selection, session),
        ChangeNodeType::NAME => launch_selected(ChangeNodeType, selection, session),
        RenameNode::NAME => launch_selected(RenameNode, selection, session),
        MoveToRegion::NAME => launch_selected(MoveToRegion, selection, session),
        SetNodeColor::NAME => launch_selected(SetNodeColor, selection, session),
        other => Err(unknown(other)),
    }
}

fn launch_preloaded<O>(operation: O, args: toml::Table, session: &mut Session) -> Result<Progress>
where
    O: Operation + 'static,
    O::Preload: DeserializeOwned,
{
    let preload: O::Preload = toml::Value::Table(args)
        .try_into()
        .map_err(|source| OperationError::InvalidPreload {
            operation: operation.name(),
            source,
        })?;
    info!(operation = operation.name(), "starting operation");
    let context = operation.preloaded_context(preload);
    Ok(start(Arc::new(operation), context, session)?)
}

fn launch_selected<O>(operation: O, selection: &Selection, session: &mut Session) -> Result<Progress>
where
    O: Operation + 'static,
{
    let context = operation.initial_context(selection, session.model())?;
    info!(
        operation = operation.name(),
        nodes = selection.nodes.len(),
        "starting operation"
    );
    Ok(start(Arc::new(operation), context, session)?)
}

fn unknown(name: &str) -> OperationError {
    OperationError::UnknownOperation {
        name: name.to_string(),
        available: standard_catalog().names().join(", "),
    }
}

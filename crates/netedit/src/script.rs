use std::fs;
use std::path::Path;

use netedit_core::Model;
use netedit_engine::Answer;
use netedit_journal::SessionConfig;
use serde::Deserialize;

use crate::error::{CliError, Result};

/// A batch of invocations against a seed model.
///
/// ```toml
/// [session]
/// undo-depth = 20
///
/// [model]
/// nodes = [{ id = "a", name = "Alpha" }]
///
/// [[steps]]
/// do = "rename-node"
/// node = "a"
/// answers = [{ dialog = { name = "Omega" } }]
///
/// [[steps]]
/// do = "undo"
/// ```
///
/// Every key of a step other than `do` and `answers` is handed to the
/// operation as its preload arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Script {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub model: Model,
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScriptStep {
    #[serde(rename = "do")]
    pub action: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(flatten)]
    pub args: toml::Table,
}

#[derive(Debug, PartialEq)]
pub(crate) enum Action<'a> {
    Undo,
    Redo,
    Invoke(&'a str),
}

impl ScriptStep {
    pub(crate) fn action(&self) -> Action<'_> {
        match self.action.as_str() {
            "undo" => Action::Undo,
            "redo" => Action::Redo,
            name => Action::Invoke(name),
        }
    }
}

impl Script {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| CliError::ReadScript {
            path: path.to_path_buf(),
            source,
        })?;
        let script: Self = toml::from_str(&text).map_err(|source| CliError::ParseScript {
            path: path.to_path_buf(),
            source,
        })?;
        script.session.validate()?;
        Ok(script)
    }
}

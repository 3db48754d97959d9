mod list;
mod run;

use clap::Subcommand;

use crate::error::Result;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List operations and which of them apply to a selection
    List(list::ListArgs),
    /// Run a script of operations, undo and redo against its model
    Run(run::RunArgs),
}

impl Commands {
    pub(crate) fn execute(self) -> Result<()> {
        match self {
            Self::List(args) => list::run(args),
            Self::Run(args) => run::run(args),
        }
    }
}

use std::path::PathBuf;

use clap::Args;
use netedit_engine::Selection;
use netedit_operations::{fixtures, standard_catalog};

use crate::error::Result;
use crate::output::format_catalog;
use crate::script::Script;

#[derive(Args)]
pub(crate) struct ListArgs {
    /// Script whose model the selection refers to (default: built-in sample model)
    #[arg(long)]
    script: Option<PathBuf>,

    /// Selected node ids
    #[arg(long = "select", short = 's', num_args = 1..)]
    select: Vec<String>,
}

pub(crate) fn run(args: ListArgs) -> Result<()> {
    let model = match &args.script {
        Some(path) => Script::load(path)?.model,
        None => fixtures::sample_model(),
    };
    let selection = Selection::of_nodes(args.select.iter().map(String::as_str));

    print!("{}", format_catalog(&standard_catalog(), &selection, &model));
    Ok(())
}

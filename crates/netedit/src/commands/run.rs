use std::path::PathBuf;

use clap::Args;
use netedit_engine::Progress;
use netedit_journal::Session;
use netedit_operations::launch;
use tracing::{debug, info};

use crate::answers::{AnswerSource, ScriptedAnswers, TerminalAnswers};
use crate::error::{CliError, Result};
use crate::output::{format_completion, format_history};
use crate::script::{Action, Script, ScriptStep};

#[derive(Args)]
pub(crate) struct RunArgs {
    /// Script to run
    script: PathBuf,

    /// Answer suspended operations on the terminal instead of from the script
    #[arg(long, short = 'i')]
    interactive: bool,

    /// Show the steps each operation ran
    #[arg(long)]
    trace: bool,

    /// Print the final model as TOML
    #[arg(long)]
    print_model: bool,
}

pub(crate) fn run(args: RunArgs) -> Result<()> {
    let script = Script::load(&args.script)?;
    let mut session = Session::with_config(script.model, script.session);
    let mut terminal = if args.interactive {
        Some(TerminalAnswers::new()?)
    } else {
        None
    };

    for (index, step) in script.steps.into_iter().enumerate() {
        let index = index + 1;
        match step.action() {
            Action::Undo => match session.undo()? {
                Some(receipt) => println!("[{index}] undo: {}", receipt.label),
                None => println!("[{index}] undo: nothing to undo"),
            },
            Action::Redo => match session.redo()? {
                Some(receipt) => println!("[{index}] redo: {}", receipt.label),
                None => println!("[{index}] redo: nothing to redo"),
            },
            Action::Invoke(_) => {
                let output = match terminal.as_mut() {
                    Some(source) => invoke(index, step, &mut session, source, args.trace)?,
                    None => {
                        let mut scripted = ScriptedAnswers::new(step.answers.clone());
                        let output = invoke(index, step, &mut session, &mut scripted, args.trace)?;
                        if scripted.remaining() > 0 {
                            debug!(index, unused = scripted.remaining(), "answers left over");
                        }
                        output
                    }
                };
                print!("{output}");
            }
        }
    }

    println!();
    print!("{}", format_history(session.history()));
    if args.print_model {
        println!();
        print!("{}", toml::to_string(session.model())?);
    }
    Ok(())
}

/// Drive one invocation to its end, answering every suspension from `source`.
fn invoke(
    index: usize,
    step: ScriptStep,
    session: &mut Session,
    source: &mut dyn AnswerSource,
    show_trace: bool,
) -> Result<String> {
    let mut progress = launch(&step.action, step.args, session)?;
    loop {
        match progress {
            Progress::Finished(completion) => {
                info!(index, operation = completion.operation, result = %completion.result, "operation ended");
                return Ok(format_completion(index, &completion, show_trace));
            }
            Progress::Suspended(pending) => {
                let operation = pending.operation();
                let Some(answer) = source.answer(operation, pending.request())? else {
                    return Err(CliError::AnswersExhausted {
                        index,
                        operation,
                        step: pending.next_step(),
                    });
                };
                progress = pending.resume(session, Some(answer))?;
            }
        }
    }
}

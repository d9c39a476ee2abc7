//! Purpose: Hold top-level CLI command dispatch for `weakdecode`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Every command writes exactly one JSON document (or completions) to stdout.

use super::*;
use weakdecode::{Input, detect, parse_document, to_map};

pub(super) fn dispatch_command(
    command: Command,
    config: &DecoderConfig,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "weakdecode", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Detect { input } => {
            let bytes = read_input(input.as_deref())?;
            let format = detect(Input::Bytes(&bytes))?;
            let mut report = weakdecode::Mapping::new();
            report.insert("format".to_string(), Value::from(format.as_str()));
            emit_value(&Value::Mapping(report), color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Parse { input } => {
            let bytes = read_input(input.as_deref())?;
            let document = parse_document(&bytes)?;
            emit_value(&Value::Mapping(document), color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Config => {
            let projected = to_map(config)?;
            emit_value(&Value::Mapping(projected), color_mode);
            Ok(RunOutcome::ok())
        }
    }
}

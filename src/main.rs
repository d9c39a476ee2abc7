//! Purpose: `weakdecode` CLI entry point for inspecting documents and decoder settings.
//! Role: Binary crate root; parses args, builds the decoder config, dispatches commands.
//! Invariants: Commands emit JSON on stdout (pretty on a TTY, compact otherwise).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `to_exit_code`.
use std::error::Error as StdError;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::{
    Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint,
    error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, json};
use tracing_subscriber::EnvFilter;

mod color_json;
mod command_dispatch;

use color_json::colorize_value;
use weakdecode::{Decoder, DecoderConfig, Error, ErrorKind, Value, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint(clap_error_hint(&err)),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    decoder_config(&cli.decoder)
        .and_then(|config| command_dispatch::dispatch_command(cli.command, &config, color_mode))
        .map_err(add_io_hint)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "weakdecode",
    version,
    about = "Inspect documents the way the weak-typed decoder sees them",
    long_about = None,
    after_help = r#"EXAMPLES
  $ weakdecode detect settings.yaml
  $ echo '{"id": "42"}' | weakdecode parse
  $ weakdecode --strict --tag yaml config
  $ weakdecode --config decoder.yaml config

LOGGING
  Set RUST_LOG (for example RUST_LOG=debug) to trace format detection and fallbacks."#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(flatten)]
    decoder: DecoderArgs,
    #[arg(
        long,
        global = true,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics and pretty JSON output: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct DecoderArgs {
    #[arg(
        long,
        global = true,
        help = "Decoder config file (JSON or YAML); flags below override it",
        value_hint = ValueHint::FilePath
    )]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Tag namespace used to resolve field names")]
    tag: Option<String>,
    #[arg(long, global = true, help = "Disable weak typing (no textual coercions)")]
    strict: bool,
    #[arg(long, global = true, help = "Treat document keys without a field as errors")]
    deny_unknown: bool,
    #[arg(long, global = true, help = "Merge into the destination instead of zeroing it first")]
    keep_existing: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Report whether input is treated as JSON or YAML",
        after_help = r#"EXAMPLES
  $ weakdecode detect config.json
  $ printf 'id: 1\n' | weakdecode detect"#
    )]
    Detect {
        #[arg(help = "Input file (default: stdin; `-` also means stdin)", value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,
    },
    #[command(
        about = "Parse input into the generic document and print it as JSON",
        long_about = r#"Parse input into the generic document the decoder works on.

Input starting with `{` or `[` is parsed as JSON, falling back to YAML flow style.
Anything else is parsed as YAML. The document root must be a mapping."#
    )]
    Parse {
        #[arg(help = "Input file (default: stdin; `-` also means stdin)", value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,
    },
    #[command(about = "Print the effective decoder configuration")]
    Config,
    #[command(about = "Generate shell completions")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// Defaults, then the config file (omitted keys keep defaults), then flags.
fn decoder_config(args: &DecoderArgs) -> Result<DecoderConfig, Error> {
    let mut config = DecoderConfig::default();
    if let Some(path) = &args.config {
        let bytes = std::fs::read(path).map_err(|err| io_error(err, "failed to read config file", path))?;
        let loader = Decoder::new(DecoderConfig::new().with_zero_destination_first(false));
        loader.decode(&bytes, &mut config).map_err(|err| {
            let hint = format!("Check the decoder config file {}.", path.display());
            if err.hint().is_some() {
                err
            } else {
                err.with_hint(hint)
            }
        })?;
        tracing::debug!(path = %path.display(), "loaded decoder config");
    }
    if let Some(tag) = &args.tag {
        config.tag_name = tag.clone();
    }
    if args.strict {
        config.weakly_typed = false;
    }
    if args.deny_unknown {
        config.ignore_unknown_keys = false;
    }
    if args.keep_existing {
        config.zero_destination_first = false;
    }
    Ok(config)
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>, Error> {
    match path {
        Some(path) if path != Path::new("-") => {
            std::fs::read(path).map_err(|err| io_error(err, "failed to read input", path))
        }
        _ => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
            Ok(buf)
        }
    }
}

fn io_error(err: io::Error, message: &str, path: &Path) -> Error {
    Error::new(ErrorKind::Io)
        .with_message(format!("{message}: {}", path.display()))
        .with_source(err)
}

fn add_io_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Io || err.hint().is_some() {
        return err;
    }
    err.with_hint("I/O error. Check the path and file permissions.")
}

fn emit_value(value: &Value, color_mode: ColorMode) {
    let is_tty = io::stdout().is_terminal();
    let use_color = color_mode.use_color(is_tty);
    let json = if is_tty || use_color {
        colorize_value(value, use_color)
    } else {
        serde_json::to_string(value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    };
    println!("{json}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::EmptyInput => "input is empty".to_string(),
        ErrorKind::UnsupportedInputType => "unsupported input type".to_string(),
        ErrorKind::Parse => "parse error".to_string(),
        ErrorKind::InvalidDestination => "invalid destination".to_string(),
        ErrorKind::UnknownField => "unknown field".to_string(),
        ErrorKind::TypeConversion => "type conversion failed".to_string(),
        ErrorKind::NotAStruct => "not a record".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> serde_json::Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path_display() {
        inner.insert("path".to_string(), json!(path));
    }
    if let Some(conversion) = err.conversion() {
        inner.insert(
            "conversion".to_string(),
            json!({
                "value": conversion.value,
                "source_type": conversion.source_type,
                "target_type": conversion.target_type,
            }),
        );
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), serde_json::Value::Object(inner));
    serde_json::Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path_display() {
        lines.push(format!(
            "{} {path}",
            colorize_label("at:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let command = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .and_then(|usage| {
            usage
                .split_whitespace()
                .skip_while(|token| *token != "weakdecode")
                .nth(1)
                .filter(|token| !token.starts_with(['-', '<', '[']))
                .map(str::to_string)
        });

    match command {
        Some(command) => format!("Try `weakdecode {command} --help`."),
        None => "Try `weakdecode --help`.".to_string(),
    }
}

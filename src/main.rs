//! Purpose: `querystate` CLI entry point and command dispatch bootstrap.
//! Role: Binary crate root; parses args, runs commands, prints results on stdout.
//! Invariants: stdout carries only command output (query strings, JSON, short urls).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::ffi::OsString;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand, ValueHint, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use querystate::api::{
    ComponentParams, DEFAULT_SHORTENER_ENDPOINT, DEFAULT_SHORTENER_TIMEOUT_MS, Error, ErrorKind,
    FieldRef, FieldValue, HttpShortener, ShortenOutcome, ShortenerConfig, apply_stored_values,
    encode, parse, shorten_search, to_exit_code,
};

const DEFAULT_ORIGIN: &str = "http://127.0.0.1:8050";

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
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse_from(std::env::args_os().collect::<Vec<OsString>>()) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
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
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Try `querystate --help`."));
            }
        },
    };

    command_dispatch::dispatch_command(cli.command)
        .map_err(add_corrupt_hint)
        .map_err(add_io_hint)
}

#[derive(Parser)]
#[command(
    name = "querystate",
    version,
    about = "Store UI control state in a URL query string and restore it",
    long_about = None,
    after_help = r#"EXAMPLES
  $ querystate encode country.value=USA clicks.n_clicks=3
  ?country=value&country=USA&clicks=n_clicks&clicks=3
  $ querystate parse 'http://127.0.0.1:8050/?country=value&country=USA'
  {"country":[["value","USA"]]}
  $ querystate apply '?country=value&country=USA' --defaults '{"id":"country","value":"Canada"}'
  {"id":"country","value":"USA"}"#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode field values into a query string.
    Encode {
        #[arg(
            value_name = "FIELD=VALUE",
            help = "Field as `<id>.<param>=<json>`; non-JSON text is taken as a string, `null` as unset"
        )]
        fields: Vec<String>,
        #[arg(
            long,
            value_name = "PATH",
            value_hint = ValueHint::FilePath,
            help = "Read a JSON array of {\"id\",\"param\",\"value\"} objects (`-` for stdin)"
        )]
        input: Option<PathBuf>,
        #[arg(long, help = "Emit {\"search\": ...} instead of the bare query string")]
        json: bool,
    },
    /// Parse a URL or query string into component state (JSON).
    Parse {
        #[arg(value_name = "URL")]
        url: String,
    },
    /// Override a component's default params with values stored in a URL.
    Apply {
        #[arg(value_name = "URL")]
        url: String,
        #[arg(
            long,
            value_name = "JSON",
            help = "Default params as a JSON object with a string `id`"
        )]
        defaults: String,
    },
    /// Shorten the page url for an encoded query string.
    Shorten {
        #[arg(value_name = "SEARCH", default_value = "")]
        search: String,
        #[arg(long, env = "QUERYSTATE_ORIGIN", default_value = DEFAULT_ORIGIN)]
        origin: String,
        #[arg(
            long,
            env = "QUERYSTATE_SHORTENER_URL",
            default_value = DEFAULT_SHORTENER_ENDPOINT
        )]
        endpoint: String,
        #[arg(
            long,
            env = "QUERYSTATE_SHORTENER_TIMEOUT_MS",
            default_value_t = DEFAULT_SHORTENER_TIMEOUT_MS
        )]
        timeout_ms: u64,
    },
    /// Print a shell completion script.
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Print version information as JSON.
    Version,
}

#[derive(Debug, Deserialize)]
struct FieldInput {
    id: String,
    param: String,
    #[serde(default)]
    value: Value,
}

#[derive(Serialize)]
struct EncodeOutput<'a> {
    search: &'a str,
}

fn collect_fields(
    fields: &[String],
    input: Option<&Path>,
) -> Result<(Vec<FieldRef>, Vec<Option<FieldValue>>), Error> {
    let mut refs = Vec::new();
    let mut values = Vec::new();

    if let Some(path) = input {
        let text = read_input(path)?;
        let entries: Vec<FieldInput> = serde_json::from_str(&text).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message("invalid field input json")
                .with_hint(r#"Expected [{"id": "...", "param": "...", "value": ...}, ...]"#)
                .with_source(err)
        })?;
        for entry in entries {
            refs.push(FieldRef::new(entry.id, entry.param));
            values.push(FieldValue::from_json(&entry.value)?);
        }
    }

    for raw in fields {
        let (field, value) = parse_field_arg(raw)?;
        refs.push(field);
        values.push(value);
    }
    Ok((refs, values))
}

fn parse_field_arg(raw: &str) -> Result<(FieldRef, Option<FieldValue>), Error> {
    let Some((field, value)) = raw.split_once('=') else {
        return Err(Error::new(ErrorKind::Usage)
            .with_message(format!("field argument `{raw}` is missing `=`"))
            .with_hint("Use `<id>.<param>=<value>`, e.g. `clicks.n_clicks=3`."));
    };
    let field: FieldRef = field.parse()?;
    let value = match serde_json::from_str::<Value>(value) {
        Ok(json) => FieldValue::from_json(&json)?,
        Err(_) => Some(FieldValue::str(value)),
    };
    Ok((field, value))
}

fn read_input(path: &Path) -> Result<String, Error> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read stdin")
                .with_source(err)
        })?;
        return Ok(text);
    }
    fs::read_to_string(path).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message(format!("failed to read {}", path.display()))
            .with_source(err)
    })
}

fn parse_defaults(raw: &str) -> Result<ComponentParams, Error> {
    let value: Value = serde_json::from_str(raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid --defaults json")
            .with_source(err)
    })?;
    ComponentParams::from_json(value)
}

fn shortener_config(endpoint: String, timeout_ms: u64) -> ShortenerConfig {
    ShortenerConfig {
        endpoint,
        timeout: Duration::from_millis(timeout_ms),
    }
}

fn emit_json<T: Serialize>(value: &T) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    println!(
        "{}",
        json.unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    );
}

fn emit_version_output() {
    emit_json(&json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }));
}

fn add_io_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Io || err.hint().is_some() {
        return err;
    }
    err.with_hint("Check the input path or network access; set RUST_LOG=debug for details.")
}

fn add_corrupt_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Corrupt || err.hint().is_some() {
        return err;
    }
    err.with_hint("The query string does not decode; regenerate it with `querystate encode`.")
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }
    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    err.message()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{:?}", err.kind()))
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut current = err.source();
    while let Some(source) = current {
        causes.push(source.to_string());
        current = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(component) = err.component() {
        inner.insert("component".to_string(), json!(component));
    }
    if let Some(position) = err.position() {
        inner.insert("position".to_string(), json!(position));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", error_message(err))];
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    if let Some(component) = err.component() {
        lines.push(format!("component: {component}"));
    }
    if let Some(position) = err.position() {
        lines.push(format!("position: {position}"));
    }
    for cause in error_causes(err) {
        lines.push(format!("caused by: {cause}"));
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

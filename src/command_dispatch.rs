//! Purpose: Hold top-level CLI command dispatch for `querystate`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Each command writes exactly one result to stdout on success.

use super::*;

pub(super) fn dispatch_command(command: Command) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "querystate", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output();
            Ok(RunOutcome::ok())
        }
        Command::Encode {
            fields,
            input,
            json,
        } => {
            if fields.is_empty() && input.is_none() {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("encode requires fields or --input")
                    .with_hint("Use `querystate encode country.value=USA` or `--input fields.json`."));
            }
            let (refs, values) = collect_fields(&fields, input.as_deref())?;
            let search = encode(&refs, &values)?;
            if json {
                emit_json(&EncodeOutput { search: &search });
            } else {
                println!("{search}");
            }
            Ok(RunOutcome::ok())
        }
        Command::Parse { url } => {
            let snapshot = parse(&url)?;
            emit_json(&snapshot);
            Ok(RunOutcome::ok())
        }
        Command::Apply { url, defaults } => {
            let defaults = parse_defaults(&defaults)?;
            let snapshot = parse(&url)?;
            let applied = apply_stored_values(&snapshot, defaults);
            emit_json(&applied.to_json());
            Ok(RunOutcome::ok())
        }
        Command::Shorten {
            search,
            origin,
            endpoint,
            timeout_ms,
        } => {
            if search.strip_prefix('?').unwrap_or(&search).is_empty() {
                println!("{}", ShortenOutcome::NothingToShorten);
                return Ok(RunOutcome::ok());
            }
            let shortener = HttpShortener::new(shortener_config(endpoint, timeout_ms))?;
            let outcome = shorten_search(&shortener, &origin, &search)?;
            println!("{outcome}");
            Ok(RunOutcome::ok())
        }
    }
}

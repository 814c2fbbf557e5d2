//! Renderers for command results.
//!
//! Plain mode mirrors the instance's own wording; JSON mode emits exactly one
//! document per command on stdout.

use anyhow::anyhow;
use ribbitx_api_models::VersionInfo;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};
use crate::console::Console;

/// Final state of a mutating command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Created,
    Updated,
    Deleted,
    Canceled,
    Invalid,
}

impl Outcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Canceled => "canceled",
            Self::Invalid => "invalid-input",
        }
    }
}

/// Banners and candidate lists: stdout in plain mode, stderr otherwise so the
/// JSON document stays alone on stdout.
pub(crate) fn announce(
    console: &mut dyn Console,
    format: OutputFormat,
    line: &str,
) -> CliResult<()> {
    match format {
        OutputFormat::Plain => console.say(line),
        OutputFormat::Json => console.note(line),
    }
}

pub(crate) fn render_ping(
    console: &mut dyn Console,
    format: OutputFormat,
    status: u16,
) -> CliResult<()> {
    match format {
        OutputFormat::Plain => console.say("HTTP Status OK"),
        OutputFormat::Json => console.say(&to_pretty_json(&json!({
            "status": status,
            "healthy": true,
        }))?),
    }
}

pub(crate) fn render_version(
    console: &mut dyn Console,
    format: OutputFormat,
    info: &VersionInfo,
) -> CliResult<()> {
    match format {
        OutputFormat::Plain => {
            console.say(&format!("Artifactory Version: {}", info.version))?;
            console.say(&format!("Artifactory Revision: {}", info.revision))
        }
        OutputFormat::Json => console.say(&to_pretty_json(info)?),
    }
}

/// The storage summary is already JSON, so both modes pretty-print it.
pub(crate) fn render_storage(console: &mut dyn Console, summary: &Value) -> CliResult<()> {
    console.say(&to_pretty_json(summary)?)
}

pub(crate) fn render_names(
    console: &mut dyn Console,
    format: OutputFormat,
    names: &[String],
) -> CliResult<()> {
    match format {
        OutputFormat::Plain => names.iter().try_for_each(|name| console.say(name)),
        OutputFormat::Json => console.say(&to_pretty_json(names)?),
    }
}

/// Report a mutation. `fields` identify the target in JSON mode; `message` is
/// the plain-mode line.
pub(crate) fn render_outcome(
    console: &mut dyn Console,
    format: OutputFormat,
    outcome: Outcome,
    fields: &[(&str, &str)],
    message: &str,
) -> CliResult<()> {
    match format {
        OutputFormat::Plain => console.say(message),
        OutputFormat::Json => {
            let mut document = Map::new();
            document.insert("result".into(), Value::from(outcome.as_str()));
            for (name, value) in fields {
                document.insert((*name).to_string(), Value::from(*value));
            }
            if matches!(outcome, Outcome::Canceled | Outcome::Invalid) {
                document.insert("message".into(), Value::from(message));
            }
            console.say(&to_pretty_json(&Value::Object(document))?)
        }
    }
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

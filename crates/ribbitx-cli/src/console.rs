//! Terminal interaction: result lines, prompts, and confirmations.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::anyhow;
use ribbitx_api_models::RepoClass;

use crate::client::{CliError, CliResult};

/// Everything a command handler needs from the terminal.
pub(crate) trait Console {
    /// Emit a result line on stdout.
    fn say(&mut self, line: &str) -> CliResult<()>;

    /// Emit an informational line on stderr.
    fn note(&mut self, line: &str) -> CliResult<()>;

    /// Prompt for one line of input. `None` means the input stream is exhausted.
    fn ask(&mut self, prompt: &str) -> CliResult<Option<String>>;

    /// Prompt for one line of input without echoing it.
    fn ask_secret(&mut self, prompt: &str) -> CliResult<Option<String>>;
}

/// Console bound to the process's standard streams.
#[derive(Debug, Default)]
pub(crate) struct StdConsole;

impl StdConsole {
    fn read_line() -> CliResult<Option<String>> {
        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|err| CliError::failure(anyhow!("failed to read from stdin: {err}")))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn write_prompt(prompt: &str) -> CliResult<()> {
        let mut stderr = io::stderr().lock();
        stderr
            .write_all(prompt.as_bytes())
            .and_then(|()| stderr.flush())
            .map_err(|err| CliError::failure(anyhow!("failed to write prompt: {err}")))
    }
}

impl Console for StdConsole {
    fn say(&mut self, line: &str) -> CliResult<()> {
        writeln!(io::stdout().lock(), "{line}")
            .map_err(|err| CliError::failure(anyhow!("failed to write output: {err}")))
    }

    fn note(&mut self, line: &str) -> CliResult<()> {
        writeln!(io::stderr().lock(), "{line}")
            .map_err(|err| CliError::failure(anyhow!("failed to write output: {err}")))
    }

    fn ask(&mut self, prompt: &str) -> CliResult<Option<String>> {
        Self::write_prompt(prompt)?;
        Self::read_line()
    }

    fn ask_secret(&mut self, prompt: &str) -> CliResult<Option<String>> {
        if io::stdin().is_terminal() {
            rpassword::prompt_password(prompt)
                .map(Some)
                .map_err(|err| CliError::failure(anyhow!("failed to read password: {err}")))
        } else {
            Self::read_line()
        }
    }
}

/// Outcome of a destructive-action confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Confirmation {
    Approved,
    Declined,
    Invalid(String),
}

/// Ask a yes/no question. Only an exact `y` (after trimming) approves.
pub(crate) fn confirm(
    console: &mut dyn Console,
    assume_yes: bool,
    question: &str,
) -> CliResult<Confirmation> {
    if assume_yes {
        return Ok(Confirmation::Approved);
    }
    let answer = console
        .ask(&format!("{question} [y/n]: "))?
        .unwrap_or_default();
    Ok(match answer.trim() {
        "y" => Confirmation::Approved,
        "n" => Confirmation::Declined,
        other => Confirmation::Invalid(other.to_string()),
    })
}

/// Use the flag value when present, otherwise prompt. Blank values are rejected.
pub(crate) fn resolve_required(
    console: &mut dyn Console,
    value: Option<String>,
    prompt: &str,
    flag: &str,
) -> CliResult<String> {
    let raw = resolve_text(console, value, prompt, flag)?;
    if raw.is_empty() {
        return Err(CliError::usage(format!("{flag} must not be empty")));
    }
    Ok(raw)
}

/// Like [`resolve_required`] but keeps blank input.
pub(crate) fn resolve_text(
    console: &mut dyn Console,
    value: Option<String>,
    prompt: &str,
    flag: &str,
) -> CliResult<String> {
    let raw = match value {
        Some(value) => value,
        None => console
            .ask(prompt)?
            .ok_or_else(|| CliError::usage(format!("{flag} was not provided and stdin is closed")))?,
    };
    Ok(raw.trim().to_string())
}

/// Optional free text; blank input becomes `None`.
pub(crate) fn resolve_optional(
    console: &mut dyn Console,
    value: Option<String>,
    prompt: &str,
) -> CliResult<Option<String>> {
    let raw = match value {
        Some(value) => value,
        None => console.ask(prompt)?.unwrap_or_default(),
    };
    let trimmed = raw.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

/// Passwords are taken verbatim apart from the line terminator.
pub(crate) fn resolve_secret(
    console: &mut dyn Console,
    value: Option<String>,
    prompt: &str,
    flag: &str,
) -> CliResult<String> {
    let secret = match value {
        Some(value) => value,
        None => console
            .ask_secret(prompt)?
            .ok_or_else(|| CliError::usage(format!("{flag} was not provided and stdin is closed")))?,
    };
    if secret.is_empty() {
        return Err(CliError::usage(format!("{flag} must not be empty")));
    }
    Ok(secret)
}

pub(crate) fn resolve_repo_class(
    console: &mut dyn Console,
    value: Option<RepoClass>,
    prompt: &str,
    flag: &str,
) -> CliResult<RepoClass> {
    if let Some(class) = value {
        return Ok(class);
    }
    let raw = resolve_required(console, None, prompt, flag)?;
    raw.parse::<RepoClass>()
        .map_err(|err| CliError::usage(err.to_string()))
}

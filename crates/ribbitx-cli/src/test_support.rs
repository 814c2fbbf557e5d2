//! Fixtures shared by the handler tests.

use std::collections::VecDeque;
use std::net::TcpListener;
use std::time::Duration;

use httpmock::MockServer;

use crate::cli::OutputFormat;
use crate::client::{ApiClient, ApiKey, AppContext, CliResult, ClientConfig};
use crate::console::Console;

pub(crate) const TEST_API_KEY: &str = "secret-key";
pub(crate) const API_PREFIX: &str = "/artifactory/api";

/// Console fed from a queue of canned answers that records everything shown.
#[derive(Debug, Default)]
pub(crate) struct ScriptedConsole {
    answers: VecDeque<String>,
    pub(crate) lines: Vec<String>,
    pub(crate) notes: Vec<String>,
    pub(crate) prompts: Vec<String>,
    pub(crate) secret_prompts: Vec<String>,
}

impl ScriptedConsole {
    pub(crate) fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Result lines joined the way they would appear on stdout.
    pub(crate) fn stdout(&self) -> String {
        self.lines.join("\n")
    }
}

impl Console for ScriptedConsole {
    fn say(&mut self, line: &str) -> CliResult<()> {
        self.lines.push(line.to_string());
        Ok(())
    }

    fn note(&mut self, line: &str) -> CliResult<()> {
        self.notes.push(line.to_string());
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> CliResult<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }

    fn ask_secret(&mut self, prompt: &str) -> CliResult<Option<String>> {
        self.secret_prompts.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }
}

fn context_with(base_url: &str, api_key: Option<ApiKey>, output: OutputFormat) -> AppContext {
    let config = ClientConfig {
        base_url: base_url.parse().expect("valid URL"),
        api_key,
        timeout: Duration::from_secs(5),
        request_id: "test-request".to_string(),
    };
    AppContext {
        api: ApiClient::new(&config).expect("client"),
        output,
    }
}

/// Context pointed at the mock server, authenticated with [`TEST_API_KEY`].
pub(crate) fn context_for(server: &MockServer, output: OutputFormat) -> AppContext {
    context_with(
        &format!("{}{API_PREFIX}", server.base_url()),
        ApiKey::new(TEST_API_KEY),
        output,
    )
}

pub(crate) fn anonymous_context_for(server: &MockServer) -> AppContext {
    context_with(
        &format!("{}{API_PREFIX}", server.base_url()),
        None,
        OutputFormat::Plain,
    )
}

/// Context pointed at a port nothing listens on.
pub(crate) fn unreachable_context(output: OutputFormat) -> AppContext {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    context_with(
        &format!("http://127.0.0.1:{port}{API_PREFIX}"),
        ApiKey::new(TEST_API_KEY),
        output,
    )
}

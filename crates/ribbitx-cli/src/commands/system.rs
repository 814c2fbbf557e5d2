//! Instance health, version, and storage queries.

use reqwest::StatusCode;
use ribbitx_api_models::VersionInfo;
use tracing::info;

use crate::cli::OutputFormat;
use crate::client::{AppContext, CliResult, classify_problem, expect_status};
use crate::console::Console;
use crate::output::{announce, render_ping, render_storage, render_version};

pub(crate) async fn handle_ping(ctx: &AppContext, console: &mut dyn Console) -> CliResult<()> {
    const OPERATION: &str = "ping instance";

    announce(console, ctx.output, "Pinging... Response 200 means OK!")?;
    let result = ctx.api.get(OPERATION, &["system", "ping"], &[]).await?;
    let status = result.status.as_u16();
    if ctx.output == OutputFormat::Plain {
        console.say(&format!("HTTP Response {status}"))?;
    }

    if result.status == StatusCode::OK {
        info!(status, "instance is healthy");
        return render_ping(console, ctx.output, status);
    }

    announce(
        console,
        ctx.output,
        "Please check instance. Potentially unhealthy.",
    )?;
    Err(classify_problem(&result, OPERATION))
}

pub(crate) async fn handle_version(ctx: &AppContext, console: &mut dyn Console) -> CliResult<()> {
    const OPERATION: &str = "fetch version";

    let result = ctx.api.get(OPERATION, &["system", "version"], &[]).await?;
    let result = expect_status(result, StatusCode::OK, OPERATION)?;
    let info: VersionInfo = result.decode(OPERATION)?;
    render_version(console, ctx.output, &info)
}

pub(crate) async fn handle_storage(ctx: &AppContext, console: &mut dyn Console) -> CliResult<()> {
    const OPERATION: &str = "fetch storage info";

    let result = ctx.api.get(OPERATION, &["storageinfo"], &[]).await?;
    let result = expect_status(result, StatusCode::OK, OPERATION)?;
    let document = result
        .json_value()
        .ok_or_else(|| result.malformed(OPERATION, "body is not JSON"))?;
    let summary = document
        .get("fileStoreSummary")
        .filter(|summary| !summary.is_null())
        .ok_or_else(|| result.malformed(OPERATION, "missing 'fileStoreSummary'"))?;
    render_storage(console, summary)
}

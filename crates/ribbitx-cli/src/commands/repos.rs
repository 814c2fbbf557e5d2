//! Repository listing, creation, description updates, and deletion.

use reqwest::StatusCode;
use ribbitx_api_models::{RepoClass, RepositorySpec, RepositorySummary, RepositoryUpdate};
use tracing::{info, warn};

use crate::cli::{RepoCreateArgs, RepoDeleteArgs, RepoListArgs, RepoUpdateArgs};
use crate::client::{AppContext, CliResult, expect_deleted, expect_status};
use crate::console::{
    Confirmation, Console, confirm, resolve_optional, resolve_repo_class, resolve_required,
    resolve_text,
};
use crate::output::{Outcome, announce, render_names, render_outcome};

const TYPE_PROMPT: &str = "What type of repositories do you want to see? (local, remote, virtual): ";

pub(crate) async fn handle_repo_list(
    ctx: &AppContext,
    console: &mut dyn Console,
    args: RepoListArgs,
) -> CliResult<()> {
    let class = resolve_repo_class(console, args.repo_type, TYPE_PROMPT, "--type")?;
    let keys = fetch_repository_keys(ctx, class).await?;
    render_names(console, ctx.output, &keys)
}

async fn fetch_repository_keys(ctx: &AppContext, class: RepoClass) -> CliResult<Vec<String>> {
    let operation = format!("list {class} repositories");
    let result = ctx
        .api
        .get(&operation, &["repositories"], &[("type", class.as_str())])
        .await?;
    let result = expect_status(result, StatusCode::OK, &operation)?;
    let repositories: Vec<RepositorySummary> = result.decode(&operation)?;
    Ok(repositories.into_iter().map(|repo| repo.key).collect())
}

pub(crate) async fn handle_repo_create(
    ctx: &AppContext,
    console: &mut dyn Console,
    args: RepoCreateArgs,
) -> CliResult<()> {
    announce(console, ctx.output, "This command will CREATE a new repository!")?;
    let key = resolve_required(
        console,
        args.key,
        "Please enter new repository name: ",
        "--key",
    )?;
    let rclass = resolve_repo_class(
        console,
        args.rclass,
        "Please enter the repository type (local, remote, virtual): ",
        "--rclass",
    )?;
    let package_type = resolve_text(
        console,
        args.package_type,
        "Please enter the package type (e.g. maven, npm, generic): ",
        "--package-type",
    )?;
    let description = resolve_optional(
        console,
        args.description,
        "Please enter the public description: ",
    )?;

    let spec = RepositorySpec {
        key,
        rclass,
        package_type,
        description,
    };
    let operation = format!("create repository '{}'", spec.key);
    let result = ctx
        .api
        .put(&operation, &["repositories", &spec.key], &spec)
        .await?;
    expect_status(result, StatusCode::OK, &operation)?;

    info!(key = %spec.key, rclass = %spec.rclass, "repository created");
    render_outcome(
        console,
        ctx.output,
        Outcome::Created,
        &[("key", spec.key.as_str())],
        &format!("Successfully created repository '{}'", spec.key),
    )
}

pub(crate) async fn handle_repo_update(
    ctx: &AppContext,
    console: &mut dyn Console,
    args: RepoUpdateArgs,
) -> CliResult<()> {
    let key = resolve_required(
        console,
        args.key,
        "Please enter the repository name: ",
        "--key",
    )?;
    let description = resolve_text(
        console,
        args.description,
        "Please enter the new public description: ",
        "--description",
    )?;

    let body = RepositoryUpdate {
        key: key.clone(),
        description,
    };
    let operation = format!("update repository '{key}'");
    let result = ctx
        .api
        .post(&operation, &["repositories", &key], &body)
        .await?;
    expect_status(result, StatusCode::OK, &operation)?;

    info!(%key, "repository description updated");
    render_outcome(
        console,
        ctx.output,
        Outcome::Updated,
        &[("key", key.as_str())],
        &format!("The repository '{key}' public description has been updated."),
    )
}

pub(crate) async fn handle_repo_delete(
    ctx: &AppContext,
    console: &mut dyn Console,
    args: RepoDeleteArgs,
) -> CliResult<()> {
    announce(
        console,
        ctx.output,
        "This command will DELETE a selected repository!",
    )?;

    let key = if let Some(key) = args.key {
        resolve_required(console, Some(key), "", "--key")?
    } else {
        let class = resolve_repo_class(console, args.repo_type, TYPE_PROMPT, "--type")?;
        let candidates = fetch_repository_keys(ctx, class).await?;
        for candidate in &candidates {
            announce(console, ctx.output, candidate)?;
        }
        resolve_required(
            console,
            None,
            "What is the name of the repository you wish to delete: ",
            "--key",
        )?
    };

    let decision = confirm(
        console,
        args.yes,
        &format!("Are you sure you want to delete the repository named: {key}?"),
    )?;
    match decision {
        Confirmation::Approved => {}
        Confirmation::Declined => {
            return render_outcome(
                console,
                ctx.output,
                Outcome::Canceled,
                &[("key", key.as_str())],
                "Deletion canceled.",
            );
        }
        Confirmation::Invalid(answer) => {
            warn!(%key, %answer, "unrecognised confirmation answer");
            return render_outcome(
                console,
                ctx.output,
                Outcome::Invalid,
                &[("key", key.as_str())],
                "Invalid input, nothing deleted.",
            );
        }
    }

    let operation = format!("delete repository '{key}'");
    let result = ctx.api.delete(&operation, &["repositories", &key]).await?;
    expect_deleted(result, &operation)?;

    info!(%key, "repository deleted");
    render_outcome(
        console,
        ctx.output,
        Outcome::Deleted,
        &[("key", key.as_str())],
        &format!("The repository '{key}' has been removed successfully."),
    )
}

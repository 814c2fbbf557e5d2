//! User listing, creation, and deletion.

use reqwest::StatusCode;
use ribbitx_api_models::{UserSpec, UserSummary};
use tracing::{info, warn};

use crate::cli::{UserCreateArgs, UserDeleteArgs};
use crate::client::{AppContext, CliResult, expect_deleted, expect_status};
use crate::console::{
    Confirmation, Console, confirm, resolve_required, resolve_secret, resolve_text,
};
use crate::output::{Outcome, announce, render_names, render_outcome};

pub(crate) async fn handle_user_list(ctx: &AppContext, console: &mut dyn Console) -> CliResult<()> {
    let names = fetch_user_names(ctx).await?;
    render_names(console, ctx.output, &names)
}

async fn fetch_user_names(ctx: &AppContext) -> CliResult<Vec<String>> {
    const OPERATION: &str = "list users";

    let result = ctx.api.get(OPERATION, &["security", "users"], &[]).await?;
    let result = expect_status(result, StatusCode::OK, OPERATION)?;
    let users: Vec<UserSummary> = result.decode(OPERATION)?;
    Ok(users.into_iter().map(|user| user.name).collect())
}

pub(crate) async fn handle_user_create(
    ctx: &AppContext,
    console: &mut dyn Console,
    args: UserCreateArgs,
) -> CliResult<()> {
    announce(console, ctx.output, "This command will CREATE a new user!")?;
    let name = resolve_required(console, args.name, "Please enter new username: ", "--name")?;
    let email = resolve_text(
        console,
        args.email,
        "Please enter the new user's email address: ",
        "--email",
    )?;
    let password = resolve_secret(console, args.password, "Enter Password: ", "--password")?;

    let spec = UserSpec {
        name,
        email,
        password,
    };
    let operation = format!("create user '{}' <{}>", spec.name, spec.email);
    let result = ctx
        .api
        .put(&operation, &["security", "users", &spec.name], &spec)
        .await?;
    expect_status(result, StatusCode::CREATED, &operation)?;

    info!(name = %spec.name, "user created");
    render_outcome(
        console,
        ctx.output,
        Outcome::Created,
        &[("name", spec.name.as_str()), ("email", spec.email.as_str())],
        &format!(
            "The user '{}' with email '{}' has been created successfully.",
            spec.name, spec.email
        ),
    )
}

pub(crate) async fn handle_user_delete(
    ctx: &AppContext,
    console: &mut dyn Console,
    args: UserDeleteArgs,
) -> CliResult<()> {
    announce(console, ctx.output, "This command will DELETE a selected user!")?;

    let name = if let Some(name) = args.name {
        resolve_required(console, Some(name), "", "--name")?
    } else {
        for candidate in fetch_user_names(ctx).await? {
            announce(console, ctx.output, &candidate)?;
        }
        resolve_required(
            console,
            None,
            "What is the name of the user you wish to delete: ",
            "--name",
        )?
    };

    match confirm(
        console,
        args.yes,
        &format!("Are you sure you want to delete the user named: {name}?"),
    )? {
        Confirmation::Approved => {}
        Confirmation::Declined => {
            return render_outcome(
                console,
                ctx.output,
                Outcome::Canceled,
                &[("name", name.as_str())],
                "Deletion canceled.",
            );
        }
        Confirmation::Invalid(answer) => {
            warn!(%name, %answer, "unrecognised confirmation answer");
            return render_outcome(
                console,
                ctx.output,
                Outcome::Invalid,
                &[("name", name.as_str())],
                "Invalid input, nothing deleted.",
            );
        }
    }

    let operation = format!("delete user '{name}'");
    let result = ctx
        .api
        .delete(&operation, &["security", "users", &name])
        .await?;
    expect_deleted(result, &operation)?;

    info!(%name, "user deleted");
    render_outcome(
        console,
        ctx.output,
        Outcome::Deleted,
        &[("name", name.as_str())],
        &format!("The user '{name}' has been removed successfully."),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::client::CliError;
    use crate::test_support::{ScriptedConsole, context_for};
    use httpmock::prelude::*;
    use serde_json::{Value, json};

    fn create_args(name: &str, email: &str, password: &str) -> UserCreateArgs {
        UserCreateArgs {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn list_prints_user_names() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/artifactory/api/security/users");
            then.status(200).json_body(json!([
                {"name": "admin", "uri": "ignored", "realm": "internal"},
                {"name": "alice"}
            ]));
        });

        let ctx = context_for(&server, OutputFormat::Plain);
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        handle_user_list(&ctx, &mut console)
            .await
            .expect("list should succeed");
        mock.assert();
        assert_eq!(console.lines, vec!["admin".to_string(), "alice".to_string()]);
    }

    #[tokio::test]
    async fn list_empty_prints_nothing() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/artifactory/api/security/users");
            then.status(200).json_body(json!([]));
        });

        let ctx = context_for(&server, OutputFormat::Plain);
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        handle_user_list(&ctx, &mut console)
            .await
            .expect("list should succeed");
        assert!(console.lines.is_empty());
    }

    #[tokio::test]
    async fn create_expects_created_status() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/artifactory/api/security/users/bob")
                .json_body(json!({"name": "bob", "email": "b@x.io", "password": "p"}));
            then.status(201);
        });

        let ctx = context_for(&server, OutputFormat::Plain);
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        handle_user_create(&ctx, &mut console, create_args("bob", "b@x.io", "p"))
            .await
            .expect("create should succeed");
        mock.assert();
        assert_eq!(
            console.lines.last().map(String::as_str),
            Some("The user 'bob' with email 'b@x.io' has been created successfully.")
        );
    }

    #[tokio::test]
    async fn create_treats_plain_ok_as_failure() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(PUT).path("/artifactory/api/security/users/bob");
            then.status(200);
        });

        let ctx = context_for(&server, OutputFormat::Plain);
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        let err = handle_user_create(&ctx, &mut console, create_args("bob", "b@x.io", "p"))
            .await
            .expect_err("only 201 means created");
        assert!(matches!(err, CliError::UnexpectedStatus { status: 200, .. }));
    }

    #[tokio::test]
    async fn create_reports_server_validation_message() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(PUT).path("/artifactory/api/security/users/bob");
            then.status(400)
                .header("content-type", "application/json")
                .json_body(json!({"errors": [{"status": 400, "message": "Email is invalid"}]}));
        });

        let ctx = context_for(&server, OutputFormat::Plain);
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        let err = handle_user_create(&ctx, &mut console, create_args("bob", "nope", "p"))
            .await
            .expect_err("create should fail");
        let message = err.display_message();
        assert!(message.contains("Email is invalid"));
        assert!(message.contains("bob"));
        assert!(message.contains("nope"));
        assert!(!message.contains("password"));
    }

    #[tokio::test]
    async fn create_prompts_with_hidden_password() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/artifactory/api/security/users/carol")
                .json_body(json!({"name": "carol", "email": "c@x.io", "password": "hunter2"}));
            then.status(201);
        });

        let ctx = context_for(&server, OutputFormat::Json);
        let mut console = ScriptedConsole::new(["carol", "c@x.io", "hunter2"]);
        handle_user_create(
            &ctx,
            &mut console,
            UserCreateArgs {
                name: None,
                email: None,
                password: None,
            },
        )
        .await
        .expect("create should succeed");
        mock.assert();
        assert_eq!(console.prompts.len(), 2);
        assert_eq!(console.secret_prompts, vec!["Enter Password: ".to_string()]);
        let stdout = console.stdout();
        assert!(!stdout.contains("hunter2"));
        let parsed: Value = serde_json::from_str(&stdout).expect("json output");
        assert_eq!(
            parsed,
            json!({"result": "created", "name": "carol", "email": "c@x.io"})
        );
    }

    #[tokio::test]
    async fn delete_lists_candidates_when_name_missing() {
        let server = MockServer::start_async().await;
        let list = server.mock(|when, then| {
            when.method(GET).path("/artifactory/api/security/users");
            then.status(200).json_body(json!([{"name": "alice"}, {"name": "bob"}]));
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/artifactory/api/security/users/bob");
            then.status(200);
        });

        let ctx = context_for(&server, OutputFormat::Plain);
        let mut console = ScriptedConsole::new(["bob", " y "]);
        handle_user_delete(
            &ctx,
            &mut console,
            UserDeleteArgs {
                name: None,
                yes: false,
            },
        )
        .await
        .expect("delete should succeed");
        list.assert();
        delete.assert();
        assert_eq!(
            console.lines,
            vec![
                "This command will DELETE a selected user!".to_string(),
                "alice".to_string(),
                "bob".to_string(),
                "The user 'bob' has been removed successfully.".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn delete_declined_sends_no_delete() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(DELETE);
            then.status(500);
        });

        let ctx = context_for(&server, OutputFormat::Json);
        let mut console = ScriptedConsole::new(["n"]);
        handle_user_delete(
            &ctx,
            &mut console,
            UserDeleteArgs {
                name: Some("bob".into()),
                yes: false,
            },
        )
        .await
        .expect("declining is not an error");
        let parsed: Value = serde_json::from_str(&console.stdout()).expect("json output");
        assert_eq!(parsed["result"], json!("canceled"));
        assert_eq!(parsed["name"], json!("bob"));
    }

    #[tokio::test]
    async fn delete_unauthorized_is_auth_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(DELETE).path("/artifactory/api/security/users/bob");
            then.status(401);
        });

        let ctx = context_for(&server, OutputFormat::Plain);
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        let err = handle_user_delete(
            &ctx,
            &mut console,
            UserDeleteArgs {
                name: Some("bob".into()),
                yes: true,
            },
        )
        .await
        .expect_err("delete should fail");
        assert!(matches!(err, CliError::Auth { status: 401, .. }));
        assert!(err.display_message().contains("delete user 'bob'"));
    }

    #[tokio::test]
    async fn delete_never_sent_without_exact_y() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(DELETE);
            then.status(500);
        });

        let ctx = context_for(&server, OutputFormat::Plain);
        for answer in ["n", "Y", "yes", "", "y y", "no"] {
            let mut console = ScriptedConsole::new([answer]);
            handle_user_delete(
                &ctx,
                &mut console,
                UserDeleteArgs {
                    name: Some("bob".into()),
                    yes: false,
                },
            )
            .await
            .expect("nothing should be deleted");
            let last = console.lines.last().map(String::as_str);
            assert!(
                matches!(
                    last,
                    Some("Deletion canceled." | "Invalid input, nothing deleted.")
                ),
                "unexpected output for {answer:?}: {last:?}"
            );
        }
    }

    #[tokio::test]
    async fn create_sends_blank_email_to_instance() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/artifactory/api/security/users/bob")
                .json_body(json!({"name": "bob", "email": "", "password": "p"}));
            then.status(400).json_body(json!({
                "errors": [{"status": 400, "message": "Email is required"}]
            }));
        });

        let ctx = context_for(&server, OutputFormat::Plain);
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        let err = handle_user_create(&ctx, &mut console, create_args("bob", "", "p"))
            .await
            .expect_err("instance rejects the email");
        mock.assert();
        assert!(matches!(err, CliError::Validation { status: 400, .. }));
        assert!(err.display_message().contains("Email is required"));
    }
}

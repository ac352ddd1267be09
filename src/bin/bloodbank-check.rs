use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};

use bloodbank::{
    auth::dto::LoginRequest,
    client::{
        check_server_connection, network_error_message, candidate_urls, sign_in, ApiClient,
        FileTokenStore, GuardOutcome, RouteGuard, SignInError,
    },
    model::Role,
    telemetry,
};

/// Checks the API and manages the saved session.
#[derive(Parser, Debug)]
#[command(name = "bloodbank-check", version)]
struct Cli {
    #[arg(long, global = true, env = "API_BASE_URL", default_value = "http://localhost:5000")]
    base_url: String,

    /// JSON file holding `{"token": "..."}`.
    #[arg(long, global = true, default_value = ".bloodbank/session.json")]
    token_file: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify the server is up and the saved session is valid (default).
    Check,
    /// Log in and save the session token.
    Login {
        #[arg(long)]
        role: Role,
        #[arg(long)]
        email: String,
        #[arg(long, env = "BLOODBANK_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing("bloodbank=info");
    let cli = Cli::parse();

    if !check_server_connection(&candidate_urls(&cli.base_url)).await {
        tracing::error!(base_url = %cli.base_url, "server is not reachable");
        return Ok(ExitCode::from(2));
    }

    let client = ApiClient::new(&cli.base_url)?;
    let store = FileTokenStore::new(cli.token_file);

    let code = match cli.command.unwrap_or(Command::Check) {
        Command::Check => check(&client, &store).await,
        Command::Login {
            role,
            email,
            password,
        } => {
            let request = LoginRequest {
                role,
                email,
                password,
            };
            match sign_in(&client, &store, &request).await {
                Ok(user) => {
                    tracing::info!(
                        user = %user.display_name(),
                        path = %store.path().display(),
                        "logged in"
                    );
                    ExitCode::SUCCESS
                }
                Err(SignInError::Api(e)) if e.is_rejection() => {
                    tracing::warn!(error = %e, "login refused");
                    ExitCode::from(1)
                }
                Err(SignInError::Api(e)) => {
                    let notice = network_error_message(&e, client.base_url());
                    tracing::error!(%notice, "login failed");
                    ExitCode::from(2)
                }
                Err(e @ SignInError::Save(_)) => {
                    tracing::error!(error = %e, "login failed");
                    ExitCode::from(2)
                }
            }
        }
    };
    Ok(code)
}

async fn check(client: &ApiClient, store: &FileTokenStore) -> ExitCode {
    match RouteGuard::new(client, store).check().await {
        GuardOutcome::Authenticated(user) => {
            tracing::info!(
                user = %user.display_name(),
                role = %user.role,
                email = %user.email,
                "session valid"
            );
            ExitCode::SUCCESS
        }
        GuardOutcome::RedirectToLogin { notice } => {
            tracing::warn!(
                notice = notice.as_deref().unwrap_or("no saved session"),
                path = %store.path().display(),
                "login required"
            );
            ExitCode::from(1)
        }
        GuardOutcome::Unavailable { notice } => {
            tracing::error!(%notice, "could not validate session");
            ExitCode::from(2)
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use ev_portal_session::auth::{LoginForm, LoginOutcome, ResolvedRole};
use ev_portal_session::config::PortalConfig;
use ev_portal_session::logging::{self, LogFormat};
use ev_portal_session::routing::{Navigation, Resolution};
use ev_portal_session::{PortalResult, PortalState};

#[derive(Parser)]
#[command(name = "ev-portal", version, about = "EV staff portal session client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in as a Backoffice or Operator account
    Login {
        username: String,
        #[arg(long, env = "EV_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Clear the stored session
    Logout,
    /// Show the current session and role
    Whoami,
    /// Resolve a portal path against the current session
    Open { path: String },
    /// Fetch the signed-in staff profile
    Profile,
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init(LogFormat::from_env());
    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            error!(code = e.error_code(), "{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> PortalResult<ExitCode> {
    let config = PortalConfig::from_env()?;
    info!(
        api = %config.api_base_url,
        session_dir = %config.session_dir.display(),
        "Portal configured"
    );
    let state = PortalState::from_config(config)?;

    match command {
        Command::Login { username, password } => login(&state, username, password).await,
        Command::Logout => {
            state.session.sign_out();
            println!("Signed out");
            Ok(ExitCode::SUCCESS)
        }
        Command::Whoami => {
            whoami(&state);
            Ok(ExitCode::SUCCESS)
        }
        Command::Open { path } => {
            let navigation = state.navigator().resolve(&path)?;
            print_navigation(&navigation);
            Ok(ExitCode::SUCCESS)
        }
        Command::Profile => {
            let profile = state.api.my_profile().await?;
            match serde_json::to_string_pretty(&profile) {
                Ok(json) => println!("{json}"),
                Err(_) => println!("{profile:?}"),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn login(state: &PortalState, username: String, password: String) -> PortalResult<ExitCode> {
    let view = CancellationToken::new();
    let interrupt = view.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let mut flow = state.login_flow();
    let outcome = flow.submit(&LoginForm::new(username, password), &view).await;

    match outcome {
        LoginOutcome::Accepted { role, redirect_to } => {
            println!("Signed in as {role}");
            print_navigation(&state.navigator().resolve(redirect_to)?);
            Ok(ExitCode::SUCCESS)
        }
        LoginOutcome::Rejected(err) => {
            eprintln!("{}", err.user_message());
            Ok(ExitCode::FAILURE)
        }
        LoginOutcome::Invalid(errors) => {
            for e in errors {
                eprintln!("{}: {}", e.field, e.message);
            }
            Ok(ExitCode::FAILURE)
        }
        LoginOutcome::Abandoned => {
            eprintln!("Login cancelled");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn whoami(state: &PortalState) {
    let Some(credential) = state.session.current_token() else {
        println!("Not signed in");
        return;
    };

    match state.session.role_resolver().role() {
        ResolvedRole::Role(role) => println!("role: {role}"),
        _ => println!("role: (unresolved)"),
    }
    if let Ok(claims) = credential.claims() {
        if let Some(subject) = claims.subject() {
            println!("user: {subject}");
        }
        if let Some(expires) = claims.expires_at() {
            println!("expires: {}", expires.to_rfc3339());
        }
    }
}

fn print_navigation(navigation: &Navigation) {
    for hop in &navigation.redirects {
        println!("{} -> {} ({:?})", hop.from, hop.to, hop.reason);
    }
    match &navigation.resolution {
        Resolution::Render(route) => println!("{} renders {:?}", route.path, route.screen),
        Resolution::Pending(route) => println!("{} is waiting for the session", route.path),
    }
}

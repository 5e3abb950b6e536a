use std::error::Error;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use ideaboard::auth;
use ideaboard::config::Config;
use ideaboard::models::Role;
use ideaboard::server::{self, database_uri};
use ideaboard::services::accounts::validate_credentials;

#[derive(Parser, Debug)]
#[command(name = "ideaboard", version, about = "Community idea board server")]
struct Cli {
    /// Configuration file
    #[arg(long, short = 'c', env = "IDEABOARD_CONFIG", default_value = "config.toml")]
    config: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (the default)
    Serve,
    /// Manage accounts directly in the auth database
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand, Debug)]
enum AdminAction {
    AddUser {
        username: String,
        password: String,
        #[arg(long)]
        admin: bool,
    },
    SetAdmin { username: String },
    Block { username: String },
    Unblock { username: String },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

async fn admin(cfg: &Config, action: AdminAction) -> Result<(), Box<dyn Error + Send + Sync>> {
    let auth = auth::open(&database_uri(&cfg.auth_db_path)).await?;
    let (username, found) = match action {
        AdminAction::AddUser {
            username,
            password,
            admin,
        } => {
            validate_credentials(&username, &password)?;
            let role = if admin { Role::Admin } else { Role::User };
            let added = auth.add_user(&username, &password, role).await?.is_some();
            if !added {
                return Err(format!("user {username} already exists").into());
            }
            (username, true)
        }
        AdminAction::SetAdmin { username } => {
            let found = auth.set_role(&username, Role::Admin).await?;
            (username, found)
        }
        AdminAction::Block { username } => {
            let found = auth.set_blocked(&username, true).await?;
            (username, found)
        }
        AdminAction::Unblock { username } => {
            let found = auth.set_blocked(&username, false).await?;
            (username, found)
        }
    };
    if !found {
        return Err(format!("no such user: {username}").into());
    }
    tracing::info!(%username, "account updated");
    Ok(())
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let cfg = Config::from_file(&cli.config)?;
    tracing::debug!(?cfg, "configuration loaded");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => server::run(cfg).await,
        Command::Admin { action } => admin(&cfg, action).await,
    }
}

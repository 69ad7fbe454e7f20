//! PVZ CLI - Database migrations and user management.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! pvz-cli migrate
//!
//! # Create a password account
//! pvz-cli user create -e staff@example.com -p 'long enough' -r staff
//! ```
//!
//! Both commands read `PVZ_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pvz-cli")]
#[command(author, version, about = "PVZ reception service tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage password accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new account
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Role (`staff` or `moderator`)
        #[arg(short, long, default_value = "staff")]
        role: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                password,
                role,
            } => {
                let user = commands::user::create(&email, &password, &role).await?;
                tracing::info!(user_id = %user.id, email = %user.email, role = %user.role, "user created");
            }
        },
    }
    Ok(())
}

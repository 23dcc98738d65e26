//! Operator CLI for the meetings service
//!
//! Outputs JSON so scripts can parse the result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use server_core::common::{MeetingId, RegistrationId, UserId};
use server_core::config::Config;
use server_core::domains::meetings::{join_meeting, JoinMeetingOutcome};
use server_core::kernel::{NotificationHub, ServerDeps};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "meetings_cli")]
#[command(about = "Meeting registrations CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run pending database migrations
    Migrate,

    /// Register a user for a meeting
    Join {
        #[arg(long)]
        meeting: MeetingId,
        #[arg(long)]
        user: UserId,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Ok,
    Invalid,
}

#[derive(Serialize)]
struct Response {
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    registration_id: Option<RegistrationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let response = match cli.command {
        Commands::Migrate => migrate(&pool).await?,
        Commands::Join { meeting, user } => {
            let hub = NotificationHub::with_capacity(config.notification_channel_capacity);
            let deps = ServerDeps::postgres(pool.clone(), hub);
            join(meeting, user, &deps).await?
        }
    };

    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

async fn migrate(pool: &PgPool) -> Result<Response> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    Ok(Response {
        status: Status::Ok,
        registration_id: None,
        message: Some("migrations applied".to_string()),
    })
}

async fn join(meeting: MeetingId, user: UserId, deps: &ServerDeps) -> Result<Response> {
    let response = match join_meeting(meeting, user, deps).await? {
        JoinMeetingOutcome::Ok(registration) => Response {
            status: Status::Ok,
            registration_id: Some(registration.id),
            message: None,
        },
        JoinMeetingOutcome::Invalid => Response {
            status: Status::Invalid,
            registration_id: None,
            message: None,
        },
    };

    Ok(response)
}

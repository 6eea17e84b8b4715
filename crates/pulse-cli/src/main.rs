mod commands;

use clap::{Parser, Subcommand};
use pulse_core::UserId;
use pulse_pipeline::Pipeline;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "pulse-cli")]
#[command(about = "Pulse insight and LinkedIn post pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance.
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Search, score and store insights for a user's topic of the day.
    Ingest {
        #[arg(long, env = "PULSE_USER_ID")]
        user: UserId,
        /// Weekday override, 0 = Sunday. Defaults to today.
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=6))]
        day: Option<u8>,
    },
    /// Generate a draft from one to three insights.
    Generate {
        #[arg(long, env = "PULSE_USER_ID")]
        user: UserId,
        #[arg(long = "insight", required = true, num_args = 1..)]
        insights: Vec<Uuid>,
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=6))]
        day: Option<u8>,
    },
    /// Generate and attach an illustration to a draft.
    Image {
        #[arg(long, env = "PULSE_USER_ID")]
        user: UserId,
        #[arg(long)]
        draft: Uuid,
    },
    /// Publish a draft to LinkedIn.
    Publish {
        #[arg(long, env = "PULSE_USER_ID")]
        user: UserId,
        #[arg(long)]
        draft: Uuid,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("pulse-cli ready; run with --help for commands");
        return Ok(());
    };

    match command {
        Commands::Db { command } => run_db(command).await,
        Commands::Ingest { user, day } => {
            let pipeline = connect_pipeline().await?;
            commands::run_ingest(&pipeline, user, day).await
        }
        Commands::Generate {
            user,
            insights,
            day,
        } => {
            let pipeline = connect_pipeline().await?;
            commands::run_generate(&pipeline, user, &insights, day).await
        }
        Commands::Image { user, draft } => {
            let pipeline = connect_pipeline().await?;
            commands::run_image(&pipeline, user, draft).await
        }
        Commands::Publish { user, draft } => {
            let pipeline = connect_pipeline().await?;
            commands::run_publish(&pipeline, user, draft).await
        }
    }
}

fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    // stdout carries the JSON results
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Database maintenance needs only `DATABASE_URL` and the pool settings.
async fn run_db(command: DbCommands) -> anyhow::Result<()> {
    let config = pulse_core::load_db_config_from_env()?;
    init_tracing(&config.log_level)?;

    let pool_config = pulse_db::PoolConfig::from_db_config(&config);
    let pool = pulse_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        DbCommands::Ping => {
            pulse_db::health_check(&pool).await?;
            println!("database reachable");
        }
        DbCommands::Migrate => {
            let applied = pulse_db::run_migrations(&pool).await?;
            tracing::info!(applied, "migrations complete");
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}

async fn connect_pipeline() -> anyhow::Result<Pipeline> {
    let config = pulse_core::load_app_config_from_env()?;
    init_tracing(&config.log_level)?;

    let pool_config = pulse_db::PoolConfig::from_app_config(&config);
    let pool = pulse_db::connect_pool(&config.database_url, pool_config).await?;
    commands::build_pipeline(&config, pool)
}

#[cfg(test)]
mod tests;

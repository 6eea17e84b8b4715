mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use pulse_core::UserId;
use pulse_pipeline::Pipeline;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::IdentityConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(pulse_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = pulse_db::PoolConfig::from_app_config(&config);
    let pool = pulse_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = pulse_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let capabilities = pulse_pipeline::production_capabilities(&config, pool)?;
    let pipeline = Arc::new(Pipeline::new(capabilities));

    let _scheduler = scheduler::build_scheduler(Arc::clone(&pipeline), &config.reconcile_cron).await?;

    let identity = IdentityConfig {
        demo_user: config.demo_user_id.map(UserId::new),
    };
    let app = build_app(AppState { pipeline }, identity);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "pulse-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vaultdrops::Catalog;
use vaultdrops_community::{router, AppState};
use vaultdrops_store::{SqlxSqliteDb, SubmissionsRepository};

#[derive(Parser)]
#[command(name = "vaultdrops-community")]
#[command(about = "Community API server for VaultDrops drop-rate submissions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Start the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3030")]
        port: u16,

        /// Database path or URL
        #[arg(short, long, env = "DATABASE_URL", default_value = "share/community.db")]
        database: String,

        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,

        /// Boss catalog manifest; the embedded copy is used when omitted
        #[arg(long, env = "VAULTDROPS_CATALOG")]
        catalog: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            database,
            bind,
            catalog,
        } => {
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "vaultdrops_community=info,tower_http=debug".into()),
                )
                .with(tracing_subscriber::fmt::layer())
                .init();

            // Build database URL - only add sqlite: prefix for local file paths
            let db_url = if database.contains("://") {
                database.clone()
            } else {
                format!("sqlite:{}?mode=rwc", database)
            };

            tracing::info!("Connecting to database: {}", db_url);
            let db = SqlxSqliteDb::connect(&db_url).await?;
            db.init().await?;
            tracing::info!("Database initialized");

            let catalog = match catalog {
                Some(path) => {
                    tracing::info!("Loading catalog from {}", path.display());
                    Catalog::load(&path)?
                }
                None => Catalog::embedded().clone(),
            };
            tracing::info!("Catalog loaded: {} bosses", catalog.len());

            let app = router(Arc::new(AppState { db, catalog }));

            let bind_addr = format!("{}:{}", bind, port);
            tracing::info!("Starting server on {}", bind_addr);
            tracing::info!("OpenAPI spec available at /openapi.json");
            tracing::info!("Interactive docs at /docs");

            let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

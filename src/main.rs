use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use haap::api::{self, AppState};
use haap::config::{Cli, Commands, ServerConfig};
use haap_core::models::{Actor, Role, SelectionInput};
use haap_core::LogNotifier;

async fn serve(cli: &Cli, config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.addr()?;
    tracing::info!("Starting HAAP server on {}", addr);

    let db = cli.open_database()?;
    let app = api::create_router(AppState::new(db, Arc::new(LogNotifier)));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HAAP server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "haap=debug,haap_core=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Serve { host, port }) => {
            let config = ServerConfig {
                host: host.clone(),
                port: *port,
            };
            serve(&cli, config).await?;
        }
        Some(Commands::Migrate) => {
            cli.open_database()?;
            tracing::info!("Schema is up to date");
        }
        Some(Commands::CreateAdmin {
            first_name,
            last_name,
            whatsapp,
            email,
        }) => {
            let db = cli.open_database()?;
            let admin = db.create_admin(first_name, last_name, whatsapp, email.as_deref())?;
            println!("Created administrator {} ({})", admin.full_name(), admin.id);
        }
        Some(Commands::Report { municipality }) => {
            let db = cli.open_database()?;
            // The command line runs with ministry-wide scope.
            let operator = Actor {
                user_id: Uuid::nil(),
                role: Role::MoeAdmin,
                municipality_id: None,
            };
            let filter = SelectionInput {
                municipality: municipality.clone(),
                ..Default::default()
            };
            let report = db.children_report(&operator, &filter)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        None => serve(&cli, ServerConfig::default()).await?,
    }

    Ok(())
}

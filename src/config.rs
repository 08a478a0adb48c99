use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use haap_core::Database;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "haap")]
#[command(about = "Early childhood education tracking for municipalities")]
pub struct Cli {
    /// SQLite database file (defaults to the platform data directory)
    #[arg(long, env = "HAAP_DATABASE", global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind
        #[arg(long, env = "HAAP_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port for HTTP API
        #[arg(short, long, env = "HAAP_PORT", default_value = "3000")]
        port: u16,
    },
    /// Create or update the database schema and exit
    Migrate,
    /// Create a ministry administrator account
    CreateAdmin {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        whatsapp: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// Print the children report as JSON
    Report {
        /// Municipality id to filter on
        #[arg(long)]
        municipality: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

impl Cli {
    /// Open the configured database and bring its schema up to date.
    pub fn open_database(&self) -> anyhow::Result<Database> {
        let db = match &self.database {
            Some(path) => Database::open(path)?,
            None => {
                info!("HAAP_DATABASE not set, using {:?}", Database::default_path()?);
                Database::open_default()?
            }
        };
        db.migrate()?;
        Ok(db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["haap", "serve"]).unwrap();
        match cli.command {
            Some(Commands::Serve { host, port }) => {
                assert_eq!(ServerConfig { host, port }, ServerConfig::default());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn database_flag_is_global() {
        let cli = Cli::try_parse_from(["haap", "migrate", "--database", "/tmp/haap.db"]).unwrap();
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/haap.db")));
        assert!(matches!(cli.command, Some(Commands::Migrate)));
    }

    #[test]
    fn create_admin_takes_named_args() {
        let cli = Cli::try_parse_from([
            "haap",
            "create-admin",
            "--first-name",
            "Ana",
            "--last-name",
            "Soares",
            "--whatsapp",
            "+67077000001",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::CreateAdmin { first_name, email, .. }) => {
                assert_eq!(first_name, "Ana");
                assert_eq!(email, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn addr_parses() {
        let config = ServerConfig {
            host: "0.0.0.0".into(),
            port: 8080,
        };
        assert_eq!(config.addr().unwrap().port(), 8080);
    }
}

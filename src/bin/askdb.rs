//! askdb CLI: serve the API, seed the demo database, run ad-hoc queries.

use askdb::config::{LlmConfig, ServiceConfig};
use askdb::db;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "askdb")]
#[command(about = "Natural language to SQL over an embedded sales database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Bind address
        #[arg(long, env = "ASKDB_BIND_ADDR", default_value = "0.0.0.0:8000")]
        bind: String,

        /// SQLite database path
        #[arg(long, short, env = "ASKDB_DATABASE", default_value = "sales_data.db")]
        database: PathBuf,

        /// Completion endpoint base URL
        #[arg(long, env = "ASKDB_LLM_BASE_URL")]
        llm_url: Option<String>,

        /// Model name served by the endpoint
        #[arg(long, env = "ASKDB_LLM_MODEL")]
        model: Option<String>,
    },

    /// Create and populate the demo database
    Seed {
        /// SQLite database path
        #[arg(long, short, default_value = "sales_data.db")]
        database: PathBuf,
    },

    /// Execute a SQL statement and print rows as JSON
    Query {
        /// SQLite database path
        #[arg(long, short, default_value = "sales_data.db")]
        database: PathBuf,

        /// SQL query string
        query: String,
    },

    /// Print the table definitions
    Schema {
        /// SQLite database path
        #[arg(long, short, default_value = "sales_data.db")]
        database: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            database,
            llm_url,
            model,
        } => {
            let mut llm = LlmConfig::from_env();
            if let Some(url) = llm_url {
                llm.base_url = url;
            }
            if let Some(model) = model {
                llm.model = model;
            }

            let config = ServiceConfig {
                database_path: database,
                bind_addr: bind,
                llm,
            };

            askdb::server::serve(config).await?;
        }

        Commands::Seed { database } => {
            let (products, sales) = db::seed::seed(&database)?;
            println!(
                "{} {} with {} products and {} sales rows",
                "Created".green().bold(),
                database.display(),
                products,
                sales
            );
        }

        Commands::Query { database, query } => {
            let rows = db::execute(&database, &query)?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
            println!("{} {} rows", "Fetched".green().bold(), rows.len());
        }

        Commands::Schema { database } => {
            println!("{}", db::schema_text(&database)?);
        }
    }

    Ok(())
}

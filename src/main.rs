//! Cadastro CLI - person registry server and bulk-loading tools

use cadastro::config::{self, CadastroConfig};
use cadastro::{PersonDraft, PersonStore, SchemaVariant};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "cadastro")]
#[command(version = "0.1.0")]
#[command(about = "Person registry - CRUD API and deduplicated batch import")]
#[command(long_about = r#"
Cadastro manages a person registry over SQLite, enabling:
  • An HTTP API for registration CRUD
  • Atomic, duplicate-skipping batch import
  • Minimal or extended (visit/transport scheduling) field sets

Example usage:
  cadastro serve --port 3000 --database cadastro.db
  cadastro import --file people.json
  cadastro stats
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Directory served as the static frontend
        #[arg(long)]
        public_dir: Option<PathBuf>,

        /// Field-set variant (minimal or extended)
        #[arg(short, long)]
        schema: Option<String>,
    },

    /// Bulk-load people from a JSON array file
    Import {
        /// JSON file holding an array of person records
        #[arg(short, long)]
        file: PathBuf,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Field-set variant (minimal or extended)
        #[arg(short, long)]
        schema: Option<String>,
    },

    /// Show registry statistics
    Stats {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Field-set variant (minimal or extended)
        #[arg(short, long)]
        schema: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let mut config = config::load_config(cli.config.as_deref())?.unwrap_or_default();
    config::apply_env(&mut config);

    match cli.command {
        Commands::Serve {
            port,
            database,
            public_dir,
            schema,
        } => {
            let database = resolve_database(database, &config);
            let variant = resolve_variant(schema.as_deref(), &config)?;
            let port = port.or(config.port).unwrap_or(3000);
            let public_dir = public_dir
                .or_else(|| config.public_dir.as_ref().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("public"));

            config::ensure_db_dir(&database)?;
            tracing::info!("Opening {} registry at {:?}", variant, database);
            let store = PersonStore::open(&database, variant)?;

            cadastro::server::start_server(port, store, public_dir).await?;
        }

        Commands::Import {
            file,
            database,
            schema,
        } => {
            let database = resolve_database(database, &config);
            let variant = resolve_variant(schema.as_deref(), &config)?;
            config::ensure_db_dir(&database)?;

            tracing::info!("Importing {} into {:?}", file.display(), database);
            let contents = std::fs::read_to_string(&file)?;
            let candidates: Vec<PersonDraft> = serde_json::from_str(&contents)?;

            let mut store = PersonStore::open(&database, variant)?;
            let imported = store.import_batch(&candidates)?;

            println!(
                "✅ Imported {} of {} candidates ({} duplicates skipped)",
                imported,
                candidates.len(),
                candidates.len() - imported
            );
        }

        Commands::Stats { database, schema } => {
            let database = resolve_database(database, &config);
            let variant = resolve_variant(schema.as_deref(), &config)?;
            let store = PersonStore::open(&database, variant)?;

            println!("📊 Cadastro Statistics ({:?})", database);
            println!("------------------------------------");
            println!("  Schema variant: {}", store.variant());
            println!("  People: {}", store.count()?);
        }
    }

    Ok(())
}

fn resolve_database(flag: Option<PathBuf>, config: &CadastroConfig) -> PathBuf {
    flag.or_else(|| config.database.as_ref().map(PathBuf::from))
        .unwrap_or_else(config::default_database_path)
}

fn resolve_variant(flag: Option<&str>, config: &CadastroConfig) -> anyhow::Result<SchemaVariant> {
    match flag.or(config.schema.as_deref()) {
        Some(s) => Ok(s.parse()?),
        None => Ok(SchemaVariant::default()),
    }
}

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use docschema::cli::CliError;
use docschema::cli::commands::{
    Connection, GenerateArgs, ShowFormat, handle_collections, handle_generate, handle_show,
    load_config,
};

#[derive(Parser, Debug)]
#[command(name = "docschema")]
#[command(about = "Infer schemas and relationships from document-store collections")]
#[command(version)]
struct Cli {
    /// MongoDB connection string
    #[arg(long, env = "MONGO_URI", global = true, hide_env_values = true)]
    mongo_uri: Option<String>,

    /// Database name
    #[arg(long, env = "DB_NAME", global = true)]
    db_name: Option<String>,

    /// Schema artifact location
    #[arg(
        long,
        env = "SCHEMA_FILE",
        global = true,
        default_value = "./data/schemas/schemas.json"
    )]
    schema_file: PathBuf,

    /// Inference settings (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze collections and write the schema artifact
    Generate(GenerateArgs),

    /// Print the schema artifact
    Show {
        /// Only this collection
        collection: Option<String>,

        #[arg(short, long, value_enum, default_value_t = ShowFormat::Summary)]
        format: ShowFormat,
    },

    /// List the database's collections
    Collections,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let connection = Connection {
        mongo_uri: cli.mongo_uri.clone(),
        db_name: cli.db_name.clone(),
    };

    let result = match &cli.command {
        Commands::Generate(args) => load_config(cli.config.as_deref())
            .and_then(|config| handle_generate(&connection, &cli.schema_file, config, args)),
        Commands::Show { collection, format } => {
            handle_show(&cli.schema_file, collection.as_deref(), *format)
        }
        Commands::Collections => handle_collections(&connection),
    };

    if let Err(e) = result {
        report(&e);
        std::process::exit(1);
    }
    Ok(())
}

fn report(error: &CliError) {
    eprintln!("Error: {}", error);
    if let Some(hint) = error.user_message() {
        eprintln!("hint: {}", hint);
    }
}

//! sqlts: TypeScript types from a database schema
//!
//! # Usage
//!
//! ```bash
//! # Every table of the schema
//! sqlts infer --connection postgres://localhost/db
//!
//! # One table, camelCased keys
//! sqlts infer account --to-camel-case
//!
//! # Export a reference table keyed by `name`
//! sqlts export requests name
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlts::config::GenConfigBuilder;
use sqlts::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Infer TypeScript type definitions from a database schema", long_about = None)]
#[command(after_help = "EXAMPLES:
    sqlts infer                                  # Whole schema from $DATABASE_URL
    sqlts infer account --use-quotes             # One table
    sqlts infer --ignore-table migrations -o db.ts
    sqlts export requests name                   # Literal rows keyed by name")]
struct Cli {
    /// Database connection URL (?currentSchema=<name> selects the schema)
    #[arg(long, env = "DATABASE_URL", global = true)]
    connection: Option<String>,

    /// Read the schema from a JSON or TOML file instead of a database
    #[arg(long, global = true)]
    schema_file: Option<PathBuf>,

    /// Configuration file (defaults to ./sqlts.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// camelCase record keys
    #[arg(long, env = "CAMEL_CASE", global = true)]
    to_camel_case: bool,

    /// Render column names as `"name"` literals
    #[arg(long, env = "USE_QUOTES", global = true)]
    use_quotes: bool,

    /// Leave `null` out of JSONPrimitive
    #[arg(long, global = true)]
    no_nullable_json: bool,

    /// Tables to skip
    #[arg(long, value_delimiter = ',', global = true)]
    ignore_table: Vec<String>,

    /// Columns to skip (`table.column`; bare names for export)
    #[arg(long, value_delimiter = ',', global = true)]
    ignore_column: Vec<String>,

    /// Format the output with the prettier CLI
    #[arg(long, global = true)]
    prettier: bool,

    /// Write to a file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer types for one table, or the whole schema
    Infer {
        /// Table to infer (all tables when omitted)
        table: Option<String>,
    },
    /// Export a table's rows as a literal map
    Export {
        /// Table to export
        table: String,
        /// Primary key column
        primary_key: Option<String>,
        /// Rows as a JSON array (with --schema-file)
        #[arg(long)]
        rows_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(code) => {
            if let Err(e) = write_output(&cli, &code) {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "sqlts=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Defaults, then the config file, then flags.
fn build_config(cli: &Cli) -> Result<GenConfig> {
    let base = match &cli.config {
        Some(path) => GenConfig::load(path)?,
        None => GenConfig::discover()?,
    };

    let mut builder = GenConfigBuilder::from_config(base);
    if cli.to_camel_case {
        builder = builder.camel_case(true);
    }
    if cli.use_quotes {
        builder = builder.quotes(true);
    }
    if cli.no_nullable_json {
        builder = builder.nullable_json(false);
    }
    for table in &cli.ignore_table {
        builder = builder.ignore_table(table);
    }
    for column in &cli.ignore_column {
        builder = builder.ignore_column(column);
    }
    if let Commands::Export {
        primary_key: Some(pk),
        ..
    } = &cli.command
    {
        builder = builder.primary_key(pk);
    }

    Ok(builder.build())
}

async fn run(cli: &Cli) -> Result<String> {
    let config = build_config(cli)?;
    let formatter: Box<dyn Formatter> = if cli.prettier {
        Box::new(PrettierFormatter::default())
    } else {
        Box::new(CanonicalFormatter)
    };

    if let Some(path) = &cli.schema_file {
        let mut provider = MemoryProvider::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?;
        if let Commands::Export {
            table,
            rows_file: Some(rows),
            ..
        } = &cli.command
        {
            provider = provider.load_rows(table.as_str(), rows)?;
        }
        return generate(&provider, &cli.command, &config, formatter.as_ref()).await;
    }

    let Some(url) = &cli.connection else {
        anyhow::bail!("No database. Use --connection, set DATABASE_URL, or pass --schema-file");
    };
    if cli.verbose {
        eprintln!("{} {}", "Connecting to:".dimmed(), url);
    }

    let provider = PgProvider::connect(url, &config).await?;
    generate(&provider, &cli.command, &config, formatter.as_ref()).await
}

async fn generate<P: SchemaProvider>(
    provider: &P,
    command: &Commands,
    config: &GenConfig,
    formatter: &dyn Formatter,
) -> Result<String> {
    let code = match command {
        Commands::Infer { table: Some(table) } => {
            generate_table(provider, table, config, formatter)
                .await
                .with_context(|| format!("inferring table '{}'", table))?
        }
        Commands::Infer { table: None } => generate_schema(provider, config, formatter)
            .await
            .with_context(|| format!("inferring schema '{}'", provider.schema_name()))?,
        Commands::Export { table, .. } => generate_table_data(provider, table, config, formatter)
            .await
            .with_context(|| format!("exporting table '{}'", table))?,
    };
    Ok(code)
}

fn write_output(cli: &Cli, code: &str) -> Result<()> {
    match &cli.output {
        Some(path) => {
            std::fs::write(path, code)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} Wrote types to {}", "✓".green(), path.display().to_string().cyan());
        }
        None => print!("{}", code),
    }
    Ok(())
}

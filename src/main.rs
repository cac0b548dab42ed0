use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use fluxc::config::Config;
use fluxc::db::{self, DatabaseConnection, TagFilter};
use fluxc::error::Result;
use fluxc::library::Library;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "fluxc")]
#[command(about = "A CLI client for running InfluxQL against InfluxDB", long_about = None)]
#[command(after_help = "Examples:
  fluxc test
  fluxc lib
  fluxc lib 2 --profile reader
  fluxc run --profile reader 'select value from telegraf;'")]
struct Cli {
    /// Path to the connection config file (default: ~/.fluxc.conf)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Profile from the config file to connect with
    #[arg(long, global = true, value_name = "NAME", default_value = "admin")]
    profile: String,

    /// Path to the statement library file (default: fluxc/library.yml in the user data directory)
    #[arg(long, global = true, value_name = "PATH")]
    library: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run write, read and clean-up statements against a test measurement
    Test,
    /// Show the statement library, or run one of its entries
    Lib {
        /// Id of the library statement to execute; omitted prints the library
        id: Option<usize>,
    },
    /// Run an InfluxQL statement
    Run {
        /// The InfluxQL statement, as one or more tokens
        #[arg(required = true)]
        influxql: Vec<String>,
    },
    /// Generate shell completions
    #[command(alias = "gen-completions")]
    Completions {
        /// Shell type for completions
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let library_path = cli.library.clone().unwrap_or_else(Library::default_path);

    let outcome = match &cli.command {
        Commands::Test => run_self_test(&config_path).await,
        Commands::Lib { id } => {
            run_library_mode(&config_path, &library_path, &cli.profile, *id).await
        }
        Commands::Run { influxql } => run_adhoc(&config_path, &cli.profile, influxql).await,
        Commands::Completions { shell } => {
            generate_completions(*shell);
            Ok(())
        }
    };

    if let Err(err) = outcome {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Write, read back and drop the sample measurement as an operational smoke
/// test of the writer, reader and admin profiles.
async fn run_self_test(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;

    // Write phase
    let writer = config.profile("writer")?;
    let connection = DatabaseConnection::connect(&config.connection, writer);
    const INSERT_ROUNDS: usize = 3;
    for round in 0..INSERT_ROUNDS {
        connection.insert_sample_rows().await?;
        // Gap between rounds keeps the sample timestamps apart
        if round != INSERT_ROUNDS - 1 {
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }

    // Read phase
    let reader = config.profile("reader")?;
    let connection = DatabaseConnection::connect(&config.connection, reader);
    let select = format!("SELECT * FROM {}", db::SAMPLE_MEASUREMENT);

    let all_rows = connection.run_query(&select).await?;
    all_rows.print(&TagFilter::new(), Some("All sample rows"));

    let sample_rows = connection.run_query(&select).await?;
    let first_host_only = TagFilter::from([("host".to_string(), "first_host".to_string())]);
    sample_rows.print(&first_host_only, Some("Sample rows tagged host=first_host"));

    // Clean up; on failure the sample rows simply remain
    let admin = config.profile("admin")?;
    let connection = DatabaseConnection::connect(&config.connection, admin);
    connection
        .run_query(&format!("DROP MEASUREMENT {}", db::SAMPLE_MEASUREMENT))
        .await?;

    Ok(())
}

/// Print the library, or execute one entry with its description as caption.
async fn run_library_mode(
    config_path: &Path,
    library_path: &Path,
    profile_name: &str,
    id: Option<usize>,
) -> Result<()> {
    let library = Library::load(library_path)?;

    let Some(id) = id else {
        print!("{}", library.render());
        return Ok(());
    };

    let entry = library.entry(id)?;
    let config = Config::load(config_path)?;
    let profile = config.profile(profile_name)?;
    let connection = DatabaseConnection::connect(&config.connection, profile);

    let result = connection.run_query(&entry.cmd).await?;
    result.print(&TagFilter::new(), Some(&entry.description));
    Ok(())
}

/// Execute the statement given on the command line and print its rows.
async fn run_adhoc(config_path: &Path, profile_name: &str, tokens: &[String]) -> Result<()> {
    let config = Config::load(config_path)?;
    let profile = config.profile(profile_name)?;
    let connection = DatabaseConnection::connect(&config.connection, profile);

    let statement = db::join_statement(tokens);
    let result = connection.run_query(&statement).await?;
    result.print(&TagFilter::new(), None);
    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

//! sedump CLI library
//!
//! Command-line front end for loading Stack Exchange dumps into Postgres:
//!
//! - **Import**: extract archives and load every site (`sedump import`)
//! - **Queries**: build derived views and run analytical queries (`sedump queries`)
//! - **All**: import, then run the queries (`sedump all`)

pub mod commands;
pub mod error;
pub mod progress;
pub mod queries;

pub use error::{CliError, Result};
pub use queries::QueryRunner;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub const DEFAULT_SCRIPTS_DIR: &str = "./scripts";
pub const DEFAULT_RESULTS_DIR: &str = "./results";

/// sedump - Stack Exchange dump loader
#[derive(Parser, Debug)]
#[command(name = "sedump")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Show a progress spinner while loading
    #[arg(long, global = true)]
    pub progress: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract and load every configured site dump
    Import(RunArgs),

    /// Create derived views and run the analytical queries
    #[command(alias = "analysis")]
    Queries(RunArgs),

    /// Import, then run the queries
    All(RunArgs),
}

/// Options shared by all commands
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Directory holding `<site>.7z` archives and extracted sites [env: DATA_DIR]
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Site to import; repeat for several [env: SEDUMP_SOURCES]
    #[arg(long = "source", value_name = "SITE")]
    pub sources: Vec<String>,

    /// Use already extracted directories
    #[arg(long)]
    pub skip_extract: bool,

    /// Directory with SQL scripts and q*.sql queries
    #[arg(long, default_value = DEFAULT_SCRIPTS_DIR)]
    pub scripts_dir: PathBuf,

    /// Directory for query plans and results
    #[arg(long, default_value = DEFAULT_RESULTS_DIR)]
    pub results_dir: PathBuf,
}

/// Locate the scripts directory, falling back to the parent directory
pub fn resolve_scripts_dir(requested: &Path) -> Result<PathBuf> {
    if requested.is_dir() {
        return Ok(requested.to_path_buf());
    }

    if let Some(name) = requested.file_name() {
        let fallback = Path::new("..").join(name);
        if fallback.is_dir() {
            return Ok(fallback);
        }
    }

    Err(CliError::ScriptsDirNotFound(requested.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_import_options() {
        let cli = Cli::try_parse_from([
            "sedump",
            "--progress",
            "import",
            "--data-dir",
            "/dumps",
            "--source",
            "a.stackexchange.com",
            "--source",
            "b.stackexchange.com",
            "--skip-extract",
        ])
        .expect("parse");

        assert!(cli.progress);
        let Commands::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert_eq!(args.data_dir, Some(PathBuf::from("/dumps")));
        assert_eq!(args.sources, vec!["a.stackexchange.com", "b.stackexchange.com"]);
        assert!(args.skip_extract);
        assert_eq!(args.scripts_dir, PathBuf::from(DEFAULT_SCRIPTS_DIR));
    }

    #[test]
    fn test_analysis_is_an_alias() {
        let cli = Cli::try_parse_from(["sedump", "analysis", "--results-dir", "out"]).expect("parse");
        let Commands::Queries(args) = cli.command else {
            panic!("expected queries");
        };
        assert_eq!(args.results_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_resolve_scripts_dir() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        assert_eq!(resolve_scripts_dir(dir.path()).expect("resolve"), dir.path());

        let missing = dir.path().join("no-such-scripts-dir-xyz");
        assert!(matches!(
            resolve_scripts_dir(&missing),
            Err(CliError::ScriptsDirNotFound(_))
        ));
    }
}

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use msai::catalog::TypeFilter;
use msai::collection::CollectionOptions;
use msai::parallel::ParallelConfig;

mod cache;
mod catalog;
mod config;
mod load;
mod metadata;
mod verify;


pub use config::Config;

/// msAI - sample collections of mass spectrometry runs with fast-reload caching
#[derive(Parser)]
#[command(name = "msai")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// File types accepted on the command line
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FileTypeArg {
    /// Raw and cached runs
    All,
    /// Raw mzML runs only
    Raw,
    /// Cached .msAIr runs only
    Cached,
}

impl From<FileTypeArg> for TypeFilter {
    fn from(arg: FileTypeArg) -> Self {
        match arg {
            FileTypeArg::All => TypeFilter::All,
            FileTypeArg::Raw => TypeFilter::Raw,
            FileTypeArg::Cached => TypeFilter::Cached,
        }
    }
}

/// Directory scan flags shared by several subcommands
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Directory holding the run files
    #[arg(value_name = "DIR")]
    pub directory: PathBuf,

    /// File types to collect (defaults to the config file, then all)
    #[arg(short = 't', long = "type", value_enum)]
    pub file_type: Option<FileTypeArg>,

    /// Do not search subdirectories
    #[arg(long)]
    pub no_recursive: bool,
}

impl ScanArgs {
    /// Type filter after applying config defaults
    pub fn type_filter(&self, config: &Config) -> TypeFilter {
        self.file_type
            .map(TypeFilter::from)
            .or(config.catalog.file_type)
            .unwrap_or_default()
    }

    /// Recursion flag after applying config defaults
    pub fn recursive(&self, config: &Config) -> bool {
        !self.no_recursive && config.catalog.recursive.unwrap_or(true)
    }
}

/// Metadata join and worker flags shared by collection subcommands
#[derive(Args, Debug, Clone)]
pub struct CollectionArgs {
    /// Metadata files to join (.csv, .tsv, .sdrf or .msAIm), in order
    #[arg(short, long = "metadata", value_name = "FILE")]
    pub metadata: Vec<PathBuf>,

    /// Keep only samples present in every metadata file
    #[arg(long)]
    pub inner: bool,

    /// Keep every sample, even when the config file asks for an inner join
    #[arg(long, conflicts_with = "inner")]
    pub no_inner: bool,

    /// Number of workers for bulk operations
    #[arg(short = 'j', long, value_name = "N", conflicts_with = "sequential")]
    pub workers: Option<usize>,

    /// Run bulk operations on the calling thread
    #[arg(long)]
    pub sequential: bool,
}

impl CollectionArgs {
    /// Collection options after applying config defaults
    pub fn options(&self, config: &Config) -> CollectionOptions {
        let parallel = if self.sequential {
            ParallelConfig::sequential()
        } else if let Some(workers) = self.workers {
            ParallelConfig::with_workers(workers)
        } else {
            config.parallel
        };

        CollectionOptions {
            inner_join: !self.no_inner
                && (self.inner || config.collection.inner_join.unwrap_or(false)),
            parallel,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the run files found under a directory
    Catalog {
        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Parse raw runs and write cached runs plus a metadata snapshot
    Cache {
        #[command(flatten)]
        scan: ScanArgs,

        #[command(flatten)]
        collection: CollectionArgs,

        /// Directory for .msAIr and .msAIm files
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Base name of the metadata snapshot
        #[arg(short, long, default_value = "samples")]
        name: String,
    },

    /// Build a collection, initialize every run and summarize it
    Load {
        #[command(flatten)]
        scan: ScanArgs,

        #[command(flatten)]
        collection: CollectionArgs,
    },

    /// Check cached runs against the hashes recorded in a metadata snapshot
    Verify {
        /// Metadata snapshot (.msAIm)
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// Expected hash of the snapshot itself
        #[arg(long, value_name = "SHA256")]
        hash: Option<String>,
    },

    /// Import a metadata file and describe its columns
    Metadata {
        /// Metadata file (.csv, .tsv, .sdrf or .msAIm)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Index by this column instead of choosing one automatically
        #[arg(long, value_name = "COLUMN")]
        index: Option<String>,

        /// Keep the positional index
        #[arg(long, conflicts_with = "index")]
        no_auto_index: bool,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    fn config_path(&self) -> Option<&Path> {
        self.config.as_deref()
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config_path())?;
    let json = cli.json;

    match cli.command {
        Commands::Catalog { scan } => catalog::run(&scan, &config, json),
        Commands::Cache {
            scan,
            collection,
            output,
            name,
        } => cache::run(&scan, &collection, &config, &output, &name, json),
        Commands::Load { scan, collection } => load::run(&scan, &collection, &config, json),
        Commands::Verify { snapshot, hash } => verify::run(&snapshot, hash.as_deref(), json),
        Commands::Metadata {
            file,
            index,
            no_auto_index,
        } => metadata::run(&file, index.as_deref(), !no_auto_index, json),
    }
}

/// Status word styled for terminal output
pub(crate) fn status(ok: bool, text: &str) -> String {
    #[cfg(feature = "colorized_output")]
    {
        use console::style;
        if ok {
            style(text).green().bold().to_string()
        } else {
            style(text).red().bold().to_string()
        }
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        let _ = ok;
        text.to_string()
    }
}

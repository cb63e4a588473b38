//! # msai
//!
//! Command-line front end for building sample collections of mass
//! spectrometry runs and their fast-reload caches.
//!
//! ## Usage
//!
//! ```bash
//! # List run files
//! msai catalog runs/
//!
//! # Parse raw runs, join metadata, write cached runs and a snapshot
//! msai cache runs/ -m samples.csv -o cache/ -n study
//!
//! # Reload the cached collection
//! msai load cache/ -t cached -m cache/study.msAIm
//!
//! # Check cached runs against the snapshot's hashes
//! msai verify cache/study.msAIm
//!
//! # Inspect a metadata file
//! msai metadata samples.csv
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::{dispatch, init_logging, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity());
    dispatch(cli)
}

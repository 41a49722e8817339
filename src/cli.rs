//! Command-line argument parsing. The CLI itself is a thin wrapper over
//! [`crate::DsValidator`]; see spec §6 ("Metadata convention surface") and §1
//! (CLI surface is an out-of-scope collaborator, not respecified beyond its
//! shape).

use std::path::PathBuf;

use clap::Parser;

/// Validate a directory tree, zip archive, or HDF5 file against a dirschema
/// document.
#[derive(Debug, Parser)]
#[command(name = "dirschema", version, about)]
pub struct Cli {
    /// Path to the schema document (JSON or YAML).
    pub schema: PathBuf,

    /// Path to the directory, zip archive, or HDF5 file to validate.
    pub target: PathBuf,

    /// Prefix required before a metadata file's own path segment.
    #[arg(long = "meta-path-prefix", default_value = "")]
    pub meta_path_prefix: String,

    /// Suffix required on the metadata file's parent path segment.
    #[arg(long = "meta-path-suffix", default_value = "")]
    pub meta_path_suffix: String,

    /// Prefix on the metadata file's own name.
    #[arg(long = "meta-file-prefix", default_value = "")]
    pub meta_file_prefix: String,

    /// Suffix on the metadata file's own name.
    #[arg(long = "meta-file-suffix", default_value = "_meta.json")]
    pub meta_file_suffix: String,

    /// Base directory `local://` validator references resolve against.
    /// Defaults to the schema file's own directory.
    #[arg(long = "local-basedir")]
    pub local_basedir: Option<PathBuf>,

    /// Prefix prepended to bare relative validator references.
    #[arg(long = "relative-prefix", default_value = "")]
    pub relative_prefix: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Translate `-v` repeats into a `log`/`env_logger` filter string,
    /// mirroring the `{0: ERROR, 1: WARNING, 2: INFO, 3: DEBUG}` mapping of
    /// the verbosity levels this CLI is modeled on.
    pub fn log_level_filter(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}

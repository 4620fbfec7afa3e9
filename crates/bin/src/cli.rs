//! CLI argument definitions for the opwire binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// Inspect wire documents and fold wire operations
#[derive(Parser, Debug)]
#[command(name = "opwire")]
#[command(about = "opwire: decode, re-encode and fold object wire data")]
#[command(version)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human", env = "OPWIRE_FORMAT")]
    pub format: OutputFormat,

    /// Log filter directive, in place of RUST_LOG
    #[arg(long, global = true, env = "OPWIRE_LOG")]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a wire document and re-encode it canonically
    Decode(DecodeArgs),
    /// Fold a JSON array of wire operations into one operation
    Fold(FoldArgs),
    /// List the registered operation tags
    Tags,
}

/// Arguments for the decode command
#[derive(clap::Args, Debug)]
pub struct DecodeArgs {
    /// Wire JSON file to read; standard input when omitted
    pub file: Option<PathBuf>,

    /// Field name the document was read from (`ACL` decodes an access list)
    #[arg(short, long)]
    pub key: Option<String>,

    /// Embed clean fetched entities in full instead of writing pointers
    #[arg(long)]
    pub embed: bool,
}

/// Arguments for the fold command
#[derive(clap::Args, Debug)]
pub struct FoldArgs {
    /// File holding a JSON array of wire operations; standard input when omitted
    pub file: Option<PathBuf>,

    /// Wire JSON value to estimate the folded operation against
    #[arg(long)]
    pub base: Option<String>,

    /// Field name the operations apply to
    #[arg(short, long, default_value = "value")]
    pub key: String,
}

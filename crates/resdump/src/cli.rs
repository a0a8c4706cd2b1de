use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "resdump", version, about = "Inspect a stack of game resource files")]
pub struct Cli {
    /// TOML file listing sources and cache settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Byte budget for cached data (overrides the config file)
    #[arg(long, value_name = "BYTES")]
    pub budget: Option<usize>,

    /// Source to open; repeat for more, lowest priority first (replaces the config file's list)
    #[arg(short, long = "source", value_name = "PATH")]
    pub sources: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print every resource with its id, state, path, size and file
    Dump,
    /// List the resource paths below a directory such as /TEXTURES
    List { directory: String },
    /// Show where a resource path resolves and what it overrides
    Info { path: String },
    /// Write the data of a resource to a file
    Extract {
        path: String,
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,
    },
    /// Print the MD5 sum of every opened file
    Hashes,
    /// List the maps and the file each one comes from
    Maps,
}

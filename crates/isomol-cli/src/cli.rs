use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "isomol - isosurface extraction and bond topology for molecular density data.",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract isosurface meshes from a volumetric density file into an OBJ.
    Mesh(MeshArgs),
    /// Perceive bonds in a structure file and print the bonded pair list.
    Bonds(BondsArgs),
    /// Print the header of a volumetric density file.
    Info(InfoArgs),
}

/// Arguments for the `mesh` subcommand.
#[derive(Args, Debug)]
pub struct MeshArgs {
    /// Path to the input volumetric density file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output OBJ file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Isolevel to extract; repeat for one surface per level.
    #[arg(short = 'l', long = "isolevel", value_name = "FLOAT")]
    pub isolevels: Vec<f64>,

    /// Data channel index for files carrying several channels.
    #[arg(short, long, value_name = "INDEX")]
    pub channel: Option<usize>,

    /// TOML configuration file with mesh defaults; flags override it.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `bonds` subcommand.
#[derive(Args, Debug)]
pub struct BondsArgs {
    /// Path to the input structure file (XYZ).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,
}

/// Arguments for the `info` subcommand.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Path to the input volumetric density file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,
}

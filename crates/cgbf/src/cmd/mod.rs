use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use cgbf_stream::StreamConfig;
use clap::{Args, Subcommand};

use crate::exit::{io_error, CliResult};
use crate::output::OutputFormat;

pub mod dump;
pub mod stats;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a stream and print every window.
    Dump(DumpArgs),
    /// Decode a stream and print totals.
    Stats(StatsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Dump(args) => dump::run(args, format),
        Command::Stats(args) => stats::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Stream file to read, or `-` for stdin.
    pub input: PathBuf,
    /// Reject windows whose payload exceeds this many bytes.
    #[arg(long, value_name = "BYTES", env = "CGBF_MAX_WINDOW_SIZE")]
    pub max_window_size: Option<usize>,
}

impl InputArgs {
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            max_window_size: self.max_window_size,
        }
    }

    pub fn open(&self) -> CliResult<Box<dyn Read>> {
        open_input(&self.input)
    }
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Exit after printing N windows.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn open_input(path: &Path) -> CliResult<Box<dyn Read>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(std::io::stdin().lock()));
    }
    let file = File::open(path)
        .map_err(|err| io_error(&format!("cannot open {}", path.display()), err))?;
    Ok(Box::new(BufReader::new(file)))
}

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod kinds;
pub mod replay;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a scenario file through a simulated host page.
    Replay(ReplayArgs),
    /// Decode one wire message.
    Decode(DecodeArgs),
    /// List the recognized message kinds.
    Kinds(KindsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Replay(args) => replay::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Kinds(args) => kinds::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Scenario file (JSON).
    pub scenario: PathBuf,
    /// Maximum parent hops when resolving a sender.
    #[arg(long, default_value = "64")]
    pub max_depth: usize,
    /// Maximum accepted message length in bytes.
    #[arg(long, default_value = "65536")]
    pub max_message_len: usize,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Wire string, e.g. 'amp-{"type":"send-positions","sentinel":"s1"}'.
    pub wire: String,
}

#[derive(Args, Debug, Default)]
pub struct KindsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

mod config;
mod logging;
mod runner;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::runner::CheckOptions;

#[derive(Parser)]
#[command(
    name = "literate",
    version,
    about = "Extract code samples from documents and check them"
)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify every sample in the given documents
    Check(CheckArgs),

    /// Print the samples extracted from a document
    Extract(ExtractArgs),
}

#[derive(clap::Args)]
struct CheckArgs {
    /// AsciiDoc or Markdown documents to verify
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Directory of full sources that replace abbreviated samples
    #[arg(short, long)]
    replacements: Option<PathBuf>,

    /// Only verify samples whose id starts with this prefix
    #[arg(short, long)]
    filter: Option<String>,

    /// Also write the detail log to stderr
    #[arg(long)]
    alsologtostderr: bool,

    /// Configuration file (defaults to ./literate.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Flag displayed lines longer than this
    #[arg(long)]
    print_width: Option<usize>,
}

#[derive(clap::Args)]
struct ExtractArgs {
    /// Document to read
    file: PathBuf,

    /// Print samples after replacements and prefixes are applied
    #[arg(long)]
    composed: bool,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check(args) => Config::load(args.config.as_deref()).and_then(|config| {
            let options = CheckOptions {
                files: args.files,
                replacements: args.replacements,
                filter: args.filter,
                print_width: args.print_width,
                alsologtostderr: args.alsologtostderr,
                no_color: cli.no_color,
            };
            runner::run_check(options, &config)
        }),
        Command::Extract(args) => runner::run_extract(&args.file, args.composed, cli.no_color),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(error) => {
            eprintln!("error: {:#}", error);
            process::exit(1);
        }
    }
}

mod caption;
mod converter;
mod error;
mod parser;
mod serialiser;
mod xml;

use crate::converter::{Converter, LogReporter};

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser as ClapParser;
use log::{info, LevelFilter};

fn main() {
    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Convert EBU-TT (TTML v1.0) subtitles to SRT")]
struct Cli {
    #[arg(
        value_name = "FILE",
        required = true,
        help = "The TTML files to convert."
    )]
    inputs: Vec<PathBuf>,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to write to. Only valid with a single input. If not supplied, the input path with an .srt extension is used."
    )]
    output: Option<PathBuf>,
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Log more detail. May be repeated. RUST_LOG overrides this."
    )]
    verbose: u8,
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if cli.output.is_some() && cli.inputs.len() > 1 {
        return Err(anyhow!("--output can only be used with a single input file."));
    }

    let mut converter = Converter::new(LogReporter);
    let mut failed = 0;
    for input in &cli.inputs {
        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| input.with_extension("srt"));

        if converter.parse(input) && converter.to_srt(&output) {
            info!(
                "Wrote {} captions to {}",
                converter.captions().len(),
                output.display()
            );
        } else {
            failed += 1;
        }
        converter.cleanup();
    }

    if failed > 0 {
        return Err(anyhow!(
            "{} of {} files could not be converted.",
            failed,
            cli.inputs.len()
        ));
    }
    Ok(())
}

//! Deferred Log CLI Application
//!
//! Command-line front end for the dlog-decoder library. It adds:
//! - Dictionary and capture file selection (flags or dlog.toml)
//! - Feeding a capture file or stdin through the frame decoder
//! - Text output with an aligned location column, or JSON lines

use anyhow::{Context, Result};
use clap::Parser;
use dlog_decoder::{DecoderConfig, Dictionary, FrameDecoder};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

mod config;
mod output;

use config::{AppConfig, OutputFormat};
use output::FrameWriter;

/// Deferred Log Decoder - Rebuild device log lines from binary frames
#[derive(Parser, Debug)]
#[command(name = "dlog")]
#[command(about = "Decode binary deferred-logging frames using a message dictionary", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the message dictionary (JSON)
    #[arg(short, long, value_name = "FILE")]
    dict: Option<PathBuf>,

    /// Capture file to decode ("-" or omitted reads stdin)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Path to configuration file (dlog.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print one JSON object per frame
    #[arg(long)]
    json: bool,

    /// Hide the file:line column
    #[arg(long)]
    no_location: bool,

    /// Stop after this many frames
    #[arg(long, value_name = "COUNT")]
    max_frames: Option<usize>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all diagnostics except errors
    #[arg(short, long)]
    quiet: bool,
}

/// Settings after merging the config file with command-line flags
#[derive(Debug)]
struct Settings {
    dictionary: PathBuf,
    input: Option<PathBuf>,
    decoder: DecoderConfig,
    format: OutputFormat,
    show_location: bool,
    max_frames: Option<usize>,
}

impl Settings {
    fn resolve(args: Args, config: AppConfig) -> Result<Self> {
        let dictionary = args
            .dict
            .or(config.dictionary.path)
            .context("No dictionary given: use --dict <FILE> or [dictionary] path in the config file")?;

        let input = args
            .input
            .or(config.input.path)
            .filter(|path| path != Path::new("-"));

        let format = if args.json { OutputFormat::Json } else { config.output.format };

        Ok(Self {
            dictionary,
            input,
            decoder: config.decoder,
            format,
            show_location: config.output.show_location && !args.no_location,
            max_frames: args.max_frames,
        })
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::debug!("dlog v{} (decoder library v{})", env!("CARGO_PKG_VERSION"), dlog_decoder::VERSION);

    let config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    let settings = Settings::resolve(args, config)?;
    run(&settings)
}

fn run(settings: &Settings) -> Result<()> {
    let dictionary = Dictionary::from_path(&settings.dictionary)
        .with_context(|| format!("Failed to load dictionary {:?}", settings.dictionary))?;

    let source: Box<dyn Read> = match &settings.input {
        Some(path) => {
            log::info!("Decoding capture file: {:?}", path);
            Box::new(File::open(path).with_context(|| format!("Failed to open {:?}", path))?)
        }
        None => {
            log::info!("Decoding from stdin");
            Box::new(io::stdin().lock())
        }
    };

    let location_width = settings.show_location.then(|| dictionary.max_location_len());
    let mut writer = FrameWriter::new(io::stdout().lock(), settings.format, location_width);
    let mut decoder = FrameDecoder::with_config(&dictionary, settings.decoder)?;

    let mut emitted = 0usize;
    for frame in decoder.frames(source) {
        let frame = frame.context("Failed to read input")?;
        writer.write(&frame)?;

        emitted += 1;
        if settings.max_frames.is_some_and(|max| emitted >= max) {
            log::info!("Reached --max-frames limit ({})", emitted);
            break;
        }
    }
    writer.flush()?;

    let stats = decoder.stats();
    log::info!(
        "Decoded {} frames ({} unknown ids, {} truncated) from {} bytes; {} resyncs, {} bytes discarded",
        stats.frames_decoded,
        stats.unknown_ids,
        stats.truncated_messages,
        stats.bytes_processed,
        stats.resyncs,
        stats.bytes_discarded
    );

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("dlog").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = AppConfig::default();
        config.dictionary.path = Some(PathBuf::from("from_config.json"));
        config.input.path = Some(PathBuf::from("capture.bin"));
        config.output.format = OutputFormat::Text;

        let settings = Settings::resolve(
            args(&["--dict", "from_flag.json", "--json", "--no-location", "--max-frames", "3"]),
            config,
        )
        .unwrap();

        assert_eq!(settings.dictionary, PathBuf::from("from_flag.json"));
        assert_eq!(settings.input, Some(PathBuf::from("capture.bin")));
        assert_eq!(settings.format, OutputFormat::Json);
        assert!(!settings.show_location);
        assert_eq!(settings.max_frames, Some(3));
    }

    #[test]
    fn test_dash_means_stdin() {
        let settings = Settings::resolve(args(&["-d", "d.json", "-i", "-"]), AppConfig::default()).unwrap();
        assert!(settings.input.is_none());
        assert!(settings.show_location);
    }

    #[test]
    fn test_dictionary_is_required() {
        assert!(Settings::resolve(args(&[]), AppConfig::default()).is_err());
    }
}

use crate::args::{ArgError, Inputs};
use cfg_if::cfg_if;
use clap::{CommandFactory, Parser};
use splits_core::{Estimator, SplitEstimate};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::{fmt, io};
use tracing::metadata::LevelFilter;
use tracing_chrome::ChromeLayerBuilder;
use tracing_subscriber::fmt::time;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

mod args;

/// Computes the number of parts a set of files should be split into to get
/// homogeneous, block sized parts after deflate compression
#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
#[command(
    override_usage = "number-splits [OPTIONS] <NUMBER_OF_FILES> <TOTAL_SIZE_BYTES> <BLOCK_SIZE_BYTES>"
)]
struct Cli {
    /// Number of files
    #[arg(allow_negative_numbers = true)]
    number_of_files: Option<String>,

    /// Total uncompressed size of the files, in bytes
    #[arg(allow_negative_numbers = true)]
    total_size_bytes: Option<String>,

    /// Target size of each part, in bytes
    #[arg(allow_negative_numbers = true)]
    block_size_bytes: Option<String>,

    /// Anything after the block size is ignored
    #[arg(hide = true)]
    ignored: Vec<String>,

    /// Output chrome tracing format to a file
    ///
    /// The passed file can be passed to chrome at chrome://tracing
    #[arg(long)]
    chrome_tracing: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "verbose")]
    quiet: u8,
}

impl Cli {
    fn level_filter(&self) -> LevelFilter {
        let verbosity = i16::from(self.verbose) - i16::from(self.quiet);
        match verbosity {
            ..=-1 => LevelFilter::OFF,
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            3.. => LevelFilter::TRACE,
        }
    }
}

fn chrome_tracing_file(path: Option<&Path>) -> Option<impl io::Write> {
    let path = path?;

    let file = match File::create(path) {
        Ok(file) => file,
        Err(e) => {
            // Tracing isn't set up yet, log the old-fashioned way
            eprintln!("Unable to open chrome layer: {e}");
            return None;
        }
    };

    let writer = {
        cfg_if! {
            if #[cfg(feature = "zlib")] {
                flate2::write::GzEncoder::new(file, flate2::Compression::default())
            } else {
                file
            }
        }
    };
    Some(BufWriter::new(writer))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut _chrome_guard = None;
    let chrome_file = chrome_tracing_file(cli.chrome_tracing.as_deref());
    let chrome_layer: Option<_> = chrome_file.map(|f| {
        let (layer, guard) = ChromeLayerBuilder::new()
            .writer(f)
            .include_args(true)
            .build();
        _chrome_guard = Some(guard);
        layer
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_timer(time::uptime())
        .with_writer(io::stderr)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(cli.level_filter().into())
                .from_env_lossy(),
        );

    tracing_subscriber::registry()
        .with(chrome_layer)
        .with(fmt_layer)
        .init();

    let inputs = match Inputs::parse(
        cli.number_of_files.as_deref(),
        cli.total_size_bytes.as_deref(),
        cli.block_size_bytes.as_deref(),
    ) {
        Ok(inputs) => inputs,
        Err(ArgError::Usage) => {
            println!("{}", Cli::command().render_usage());
            return ExitCode::from(2);
        }
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if !cli.ignored.is_empty() {
        tracing::debug!(ignored = ?cli.ignored, "ignoring extra arguments");
    }

    let estimate = Estimator::default().estimate(
        inputs.number_of_files,
        inputs.total_size_bytes,
        inputs.block_size,
    );
    log_estimate(&estimate);
    println!("{}", estimate.parts);

    ExitCode::SUCCESS
}

fn log_estimate(estimate: &SplitEstimate) {
    tracing::info!(
        "{} files, {} uncompressed, ~{} deflated",
        estimate.number_of_files,
        format_bytes(estimate.total_size_bytes),
        format_bytes(estimate.total_size_deflate.round() as i64),
    );
    if estimate.split {
        tracing::info!(
            "{:.2} blocks of {}, splitting into {} parts",
            estimate.block_fraction(),
            format_bytes(estimate.block_size.get() as i64),
            estimate.parts,
        );
    } else {
        tracing::info!(
            "fits in a block of {}, not splitting",
            format_bytes(estimate.block_size.get() as i64),
        );
    }
}

fn format_bytes(byte_size: i64) -> impl fmt::Display {
    humansize::ISizeFormatter::new(byte_size, humansize::BINARY)
}

#[test]
fn command_check() {
    Cli::command().debug_assert()
}

#[test]
fn verbosity_levels() {
    let level = |args: &[&str]| {
        let args = std::iter::once("number-splits").chain(args.iter().copied());
        Cli::try_parse_from(args).unwrap().level_filter()
    };
    assert_eq!(level(&[]), LevelFilter::WARN);
    assert_eq!(level(&["-q"]), LevelFilter::OFF);
    assert_eq!(level(&["-v"]), LevelFilter::INFO);
    assert_eq!(level(&["-vv"]), LevelFilter::DEBUG);
    assert_eq!(level(&["-vvvv"]), LevelFilter::TRACE);
}

#[test]
fn positional_arguments_are_optional() {
    let cli = Cli::try_parse_from(["number-splits", "1", "2"]).unwrap();
    assert_eq!(cli.number_of_files.as_deref(), Some("1"));
    assert_eq!(cli.block_size_bytes, None);
    assert_eq!(
        Inputs::parse(
            cli.number_of_files.as_deref(),
            cli.total_size_bytes.as_deref(),
            cli.block_size_bytes.as_deref(),
        ),
        Err(ArgError::Usage)
    );
}

#[test]
fn negative_positionals_are_values() {
    let cli = Cli::try_parse_from(["number-splits", "-1", "-1000", "1000"]).unwrap();
    assert_eq!(cli.number_of_files.as_deref(), Some("-1"));
    assert_eq!(cli.total_size_bytes.as_deref(), Some("-1000"));
    assert_eq!(cli.verbose, 0);

    let cli = Cli::try_parse_from(["number-splits", "-v", "2", "-1000", "1000"]).unwrap();
    assert_eq!(cli.verbose, 1);
    assert_eq!(cli.total_size_bytes.as_deref(), Some("-1000"));
}

#[test]
fn trailing_arguments_are_ignored() {
    let cli = Cli::try_parse_from(["number-splits", "2", "1000", "1000", "extra", "7"]).unwrap();
    assert_eq!(cli.block_size_bytes.as_deref(), Some("1000"));
    assert_eq!(cli.ignored, ["extra", "7"]);
}

#[test]
fn ratios_are_not_configurable() {
    for flag in ["--deflate-ratio", "--tolerance-ratio"] {
        assert!(Cli::try_parse_from(["number-splits", flag, "1.0", "2", "2500", "1000"]).is_err());
    }
}

#[test]
fn chrome_tracing_is_opt_in() {
    let cli = Cli::try_parse_from(["number-splits", "2", "2500", "1000"]).unwrap();
    assert_eq!(cli.chrome_tracing, None);
    assert!(chrome_tracing_file(cli.chrome_tracing.as_deref()).is_none());
}

//! # charsniff CLI
//!
//! Command-line front end for encoding detection and transcoding. All logic
//! lives in the library; this binary reads input, calls it and prints reports.

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use serde::Serialize;
#[cfg(feature = "cli")]
use tracing::{debug, info};
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
use charsniff::report::{self, Format};
#[cfg(feature = "cli")]
use charsniff::{DetectorConfig, Encoding, EncodingDetector, TranscodePolicy, Transcoder};

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features disabled. Enable with --features cli");
    std::process::exit(1);
}

/// charsniff: detect character encodings and transcode to UTF-8
#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "charsniff")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Detect the encoding of an input file
    Detect(DetectArgs),

    /// Decode a file to UTF-8
    Transcode(TranscodeArgs),

    /// Encode UTF-8 text into another encoding
    Encode(EncodeArgs),

    /// List all supported encodings
    List,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct DetectArgs {
    /// Input file (stdin if not specified)
    input: Option<PathBuf>,

    /// Show every ranked candidate
    #[arg(long)]
    all: bool,

    /// Maximum bytes to analyse (0 = whole input)
    #[arg(long, default_value = "8192")]
    sample_size: usize,

    /// Confidence below which the result is reported as unreliable
    #[arg(long, default_value = "0.5")]
    min_confidence: f64,

    /// Comma-separated encodings to consider (defaults to the standard set)
    #[arg(long, value_delimiter = ',')]
    encodings: Vec<Encoding>,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct TranscodeArgs {
    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Source encoding, or `auto` to detect it
    #[arg(short = 'f', long = "from", default_value = "auto")]
    from: String,

    /// How malformed input is handled (fail, replace, skip, best-effort)
    #[arg(long, default_value = "replace")]
    policy: TranscodePolicy,

    /// Replacement character for the replace policy
    #[arg(long, default_value_t = char::REPLACEMENT_CHARACTER)]
    replacement: char,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct EncodeArgs {
    /// Input UTF-8 file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target encoding
    #[arg(short = 't', long = "to")]
    to: Encoding,

    /// Prefix the output with the target's byte order mark
    #[arg(long)]
    bom: bool,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[cfg(feature = "cli")]
impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Format::Text,
            OutputFormat::Json => Format::Json,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct EncodingInfo {
    name: &'static str,
    ascii_compatible: bool,
    unicode: bool,
    bom: Option<&'static [u8]>,
    detected_by_default: bool,
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Detect(ref args) => detect_command(args, &cli)?,
        Commands::Transcode(ref args) => transcode_command(args, &cli)?,
        Commands::Encode(ref args) => encode_command(args)?,
        Commands::List => list_command(&cli)?,
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: bool) {
    let default = if verbose { "charsniff=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "reading input file");
            fs::read(path).with_context(|| format!("Failed to read input file: {}", path.display()))
        }
        None => {
            debug!("reading from stdin");
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

#[cfg(feature = "cli")]
fn write_output(path: Option<&Path>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, data)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            info!(path = %path.display(), bytes = data.len(), "wrote output");
            Ok(())
        }
        None => io::stdout()
            .write_all(data)
            .context("Failed to write to stdout"),
    }
}

#[cfg(feature = "cli")]
fn detect_command(args: &DetectArgs, cli: &Cli) -> Result<()> {
    let data = read_input(args.input.as_deref())?;

    let mut config = DetectorConfig::new()
        .max_sample_size(args.sample_size)
        .min_confidence(args.min_confidence);
    if !args.encodings.is_empty() {
        config = config.encodings(args.encodings.iter().copied());
    }

    let result = EncodingDetector::with_config(config).detect(&data);
    println!(
        "{}",
        report::render_detection(&result, cli.format.into(), args.all)?
    );

    Ok(())
}

#[cfg(feature = "cli")]
fn transcode_command(args: &TranscodeArgs, cli: &Cli) -> Result<()> {
    let data = read_input(args.input.as_deref())?;

    let result = if args.from.eq_ignore_ascii_case("auto") {
        let decoded = EncodingDetector::new().decode_with(&data, args.policy, args.replacement);
        if !decoded.detection.is_reliable() {
            eprintln!(
                "warning: detection is unreliable, decoding as {}",
                decoded.result.encoding
            );
        }
        info!(
            encoding = decoded.result.encoding.name(),
            "auto-detected source encoding"
        );
        decoded.result
    } else {
        let encoding: Encoding = args
            .from
            .parse()
            .with_context(|| format!("Invalid source encoding: {}", args.from))?;
        Transcoder::new(encoding)
            .policy(args.policy)
            .replacement(args.replacement)
            .transcode(&data)
    };

    if !result.valid && args.policy == TranscodePolicy::Fail {
        eprintln!(
            "{}",
            report::render_transcode_summary(&result, cli.format.into())?
        );
        anyhow::bail!(
            "Input is not valid {} (first invalid unit at byte {})",
            result.encoding,
            result.first_invalid.unwrap_or(0)
        );
    }

    write_output(args.output.as_deref(), result.text.as_bytes())?;

    if cli.verbose || matches!(cli.format, OutputFormat::Json) {
        eprintln!(
            "{}",
            report::render_transcode_summary(&result, cli.format.into())?
        );
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn encode_command(args: &EncodeArgs) -> Result<()> {
    let data = read_input(args.input.as_deref())?;
    let text = String::from_utf8(data).context("Input is not valid UTF-8")?;

    let bytes = charsniff::encode(&text, args.to, args.bom)
        .with_context(|| format!("Failed to encode input as {}", args.to))?;
    write_output(args.output.as_deref(), &bytes)
}

#[cfg(feature = "cli")]
fn list_command(cli: &Cli) -> Result<()> {
    let encodings: Vec<EncodingInfo> = Encoding::ALL
        .iter()
        .map(|&encoding| EncodingInfo {
            name: encoding.name(),
            ascii_compatible: encoding.is_ascii_compatible(),
            unicode: encoding.is_unicode(),
            bom: encoding.bom(),
            detected_by_default: Encoding::DEFAULT_DETECTION.contains(&encoding),
        })
        .collect();

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&encodings)?);
        }
        OutputFormat::Text => {
            println!("Supported Encodings ({} total):", encodings.len());
            println!();
            for info in &encodings {
                let kind = if info.unicode { "[unicode]" } else { "[legacy]" };
                let default = if info.detected_by_default {
                    "detected by default"
                } else {
                    ""
                };
                println!("{:15} {:10} {}", info.name, kind, default);
                if cli.verbose {
                    if let Some(bom) = info.bom {
                        println!("                BOM: {:02X?}", bom);
                    }
                }
            }
        }
    }

    Ok(())
}

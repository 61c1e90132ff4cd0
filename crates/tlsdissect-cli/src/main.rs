use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tlsdissect_core::{decode_handshake_with, CertificateFormat, DecodeOptions};

mod output;
mod records;

use output::OutputFormat;
use records::{split_records, HandshakeFrame, HandshakeReassembler, ProcessResult};

#[derive(Parser)]
#[command(name = "tlsdissect")]
#[command(about = "Decode TLS handshake messages from captured record bytes")]
struct Cli {
    /// File holding raw TLS records ("-" reads stdin). Ignored with --hex.
    input: Option<PathBuf>,

    /// Decode this hex string instead of reading a file
    #[arg(long)]
    hex: Option<String>,

    /// Input is a single handshake message without record headers
    #[arg(short, long, default_value_t = false)]
    bare: bool,

    /// Output format: "text" (human-readable) or "json" (NDJSON, one object per line)
    #[arg(short, long, default_value = "text")]
    output: String,

    /// Print verbose output (suite and extension lists, raw JA3 strings)
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Decode Certificate messages with the TLCP IBC layout
    #[arg(long, default_value_t = false)]
    ibc: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct RunStats {
    decoded: usize,
    failed: usize,
    skipped_records: usize,
    leftover_bytes: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let format = OutputFormat::parse(&cli.output)?;
    let options = DecodeOptions {
        certificate_format: if cli.ibc {
            CertificateFormat::Ibc
        } else {
            CertificateFormat::X509
        },
    };
    let data = read_input(&cli)?;

    let frames = if cli.bare {
        vec![HandshakeFrame {
            declared_len: data.len(),
            bytes: data,
        }]
    } else {
        let (frames, stats) = frame_records(&data);
        if stats.skipped_records > 0 {
            info!("Skipped {} non-handshake records", stats.skipped_records);
        }
        if stats.leftover_bytes > 0 {
            warn!(
                "{} trailing bytes do not form a complete record",
                stats.leftover_bytes
            );
        }
        frames
    };

    let mut stats = RunStats::default();
    for (index, frame) in frames.iter().enumerate() {
        match decode_handshake_with(&options, frame.declared_len, &frame.bytes) {
            Ok(record) => {
                output::print_record(index, &record, format, cli.verbose)?;
                stats.decoded += 1;
            }
            Err(e) => {
                warn!("message #{}: {} ({:?})", index, e, e.kind());
                stats.failed += 1;
            }
        }
    }

    info!(
        "{} handshake messages decoded, {} failed",
        stats.decoded, stats.failed
    );
    if stats.decoded == 0 && stats.failed > 0 {
        anyhow::bail!("no handshake message could be decoded");
    }
    Ok(())
}

fn read_input(cli: &Cli) -> Result<Vec<u8>> {
    if let Some(text) = &cli.hex {
        let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        return hex::decode(&cleaned).context("Invalid hex input");
    }
    match cli.input.as_deref() {
        Some(path) if path.as_os_str() != "-" => {
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Walk the record stream and collect every handshake message it carries.
fn frame_records(data: &[u8]) -> (Vec<HandshakeFrame>, RunStats) {
    let (records, leftover_bytes) = split_records(data);
    let mut stats = RunStats {
        leftover_bytes,
        ..Default::default()
    };
    let mut reassembler = HandshakeReassembler::new();
    let mut frames = Vec::new();

    for record in &records {
        match reassembler.process(record) {
            ProcessResult::Messages(done) => frames.extend(done),
            ProcessResult::Skipped => stats.skipped_records += 1,
        }
    }
    if let Some(partial) = reassembler.finish() {
        warn!(
            "Input ended inside a handshake message ({} of {} bytes)",
            partial.bytes.len(),
            partial.declared_len
        );
        frames.push(partial);
    }
    (frames, stats)
}

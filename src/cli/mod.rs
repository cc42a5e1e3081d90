//! Command-line argument parsing for the `keymark` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use keymark::Modality;

/// A cross-platform tool for embedding, extracting, and verifying keyed watermarks in PNG files.
#[derive(Parser)]
#[command(name = "keymark")]
#[command(version = "0.1.0")]
#[command(about = "Embed, extract, and verify keyed watermarks in PNG images")]
#[command(after_help = "Examples:
    # Embed an invisible watermark
    keymark embed -i cover.png -o watermarked.png -t \"(c) 2025 Jane Doe\" -s hunter2

    # Embed a steganographic (redundant) watermark at half strength
    keymark embed -i cover.png -o watermarked.png -t \"hi\" -s hunter2 -m steganography --strength 50

    # Extract, letting keymark try every pixel-recoverable modality in turn
    keymark extract -i watermarked.png -s hunter2

    # Extract a specific modality
    keymark extract -i watermarked.png -s hunter2 -m invisible

    # Verify a recovered key hash against a candidate secret
    keymark verify --key-hash 0123456789abcdef -s hunter2")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Embed a watermark into a PNG file
    Embed(EmbedArgs),
    /// Extract a watermark from a PNG file
    Extract(ExtractArgs),
    /// Check whether a recovered key hash matches a candidate secret
    Verify(VerifyArgs),
}

/// The four embedding modalities, as a CLI-facing enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModalityArg {
    Invisible,
    Steganography,
    Frequency,
    Metadata,
}

impl From<ModalityArg> for Modality {
    fn from(arg: ModalityArg) -> Self {
        match arg {
            ModalityArg::Invisible => Modality::Invisible,
            ModalityArg::Steganography => Modality::Steganography,
            ModalityArg::Frequency => Modality::Frequency,
            ModalityArg::Metadata => Modality::Metadata,
        }
    }
}

#[derive(Args)]
pub struct EmbedArgs {
    /// Source PNG file
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Destination PNG file
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// The message to watermark the image with
    #[arg(short, long)]
    pub text: String,

    /// The secret that derives this watermark's keying material
    #[arg(short, long)]
    pub secret: String,

    /// Embedding modality
    #[arg(short, long, value_enum, default_value_t = ModalityArg::Invisible)]
    pub modality: ModalityArg,

    /// Strength in 0..=100 (pixel-selection probability for `invisible`, redundancy factor
    /// input for `steganography`, perturbation scale for `frequency`)
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub strength: u8,

    /// Creation timestamp (ISO-8601). Defaults to the current time if omitted.
    #[arg(long)]
    pub timestamp: Option<String>,

    /// Where to write the `metadata` modality's sidecar record as JSON (ignored for every
    /// other modality; if omitted for `metadata`, the record is printed to stdout instead)
    #[arg(long, value_name = "FILE")]
    pub metadata_output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExtractArgs {
    /// PNG file to extract a watermark from
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// The secret the watermark was embedded with
    #[arg(short, long)]
    pub secret: String,

    /// Embedding modality to extract. If omitted, tries every pixel-recoverable modality in a
    /// fixed order until one succeeds.
    #[arg(short, long, value_enum)]
    pub modality: Option<ModalityArg>,

    /// Strength the watermark was embedded at
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub strength: u8,

    /// Candidate text to check for under the `frequency` modality (required for it, ignored
    /// otherwise)
    #[arg(short, long)]
    pub text: Option<String>,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// The `key_hash` recovered from a watermark record
    #[arg(long)]
    pub key_hash: String,

    /// The candidate secret to check
    #[arg(short, long)]
    pub secret: String,
}

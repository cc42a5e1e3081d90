mod cli;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use keymark::{png_codec, ExtractedRecord, Modality, WatermarkProcessor};
use std::fs;

use crate::cli::{Cli, Command, EmbedArgs, ExtractArgs, VerifyArgs};

fn run_embed(args: EmbedArgs) -> Result<()> {
    let png_data = fs::read(&args.input)
        .with_context(|| format!("Failed to read input file '{}'", args.input.display()))?;
    let (image, info) = png_codec::decode(&png_data).context("Failed to decode input PNG")?;

    let timestamp = args.timestamp.unwrap_or_else(|| Utc::now().to_rfc3339());
    let modality: Modality = args.modality.into();

    let result = WatermarkProcessor::apply(
        &image,
        &args.text,
        args.secret.as_bytes(),
        modality,
        args.strength,
        timestamp,
    )
    .context("Failed to apply watermark")?;

    let encoded = png_codec::encode(&result.image, &info).context("Failed to encode output PNG")?;
    fs::write(&args.output, encoded)
        .with_context(|| format!("Failed to write output file '{}'", args.output.display()))?;

    if let Some(record) = &result.metadata {
        match &args.metadata_output {
            Some(path) => {
                fs::write(path, record.to_canonical_json())
                    .with_context(|| format!("Failed to write metadata sidecar '{}'", path.display()))?;
                println!("Metadata sidecar written to: {}", path.display());
            }
            None => {
                println!("Metadata modality produced a sidecar record but no --metadata-output was given:");
                println!("{}", record.to_canonical_json());
            }
        }
    }

    println!("Digest: {}", result.digest);
    println!("Watermarked image written to: {}", args.output.display());
    Ok(())
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    let png_data = fs::read(&args.input)
        .with_context(|| format!("Failed to read input file '{}'", args.input.display()))?;
    let (image, _) = png_codec::decode(&png_data).context("Failed to decode input PNG")?;

    let secret = args.secret.as_bytes();
    let candidate_text = args.text.as_deref();

    let extracted = match args.modality {
        Some(modality_arg) => {
            WatermarkProcessor::extract(&image, secret, modality_arg.into(), args.strength, candidate_text)
                .context("Failed to extract watermark")?
        }
        None => WatermarkProcessor::extract_auto(&image, secret, args.strength, candidate_text)
            .context("Failed to extract watermark with any pixel-recoverable modality")?,
    };

    match extracted {
        ExtractedRecord::Signature(record) => {
            println!("text:       {}", record.text);
            println!("timestamp:  {}", record.timestamp);
            println!("method:     {}", record.method.as_str());
            println!("key_hash:   {}", record.key_hash);
        }
        ExtractedRecord::DctPresence(presence) => {
            println!("detected:    {}", presence.detected);
            println!("correlation: {:.4}", presence.correlation);
        }
    }
    Ok(())
}

fn run_verify(args: VerifyArgs) -> Result<()> {
    let matches = WatermarkProcessor::verify_key(&args.key_hash, args.secret.as_bytes());
    println!("{}", if matches { "verified" } else { "not verified" });
    if !matches {
        std::process::exit(1);
    }
    Ok(())
}

fn main() -> Result<()> {
    #[cfg(feature = "log")]
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Embed(args) => run_embed(args),
        Command::Extract(args) => run_extract(args),
        Command::Verify(args) => run_verify(args),
    }
}

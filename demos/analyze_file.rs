//! Example: Analyze a single image file
//!
//! Usage:
//!   cargo run --release --example analyze_file -- [--json] <image>

use pixelcheck::{analyze_rgba, AnalysisConfig, ImageFormat, ImageMetadata};
use std::env;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let mut json = false;
    let mut path: Option<String> = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            _ => path = Some(arg),
        }
    }
    let path = path.ok_or("Usage: analyze_file [--json] <image>")?;

    // Decode to RGBA and collect container metadata
    let decoded = image::open(&path)?.to_rgba8();
    let (width, height) = decoded.dimensions();
    let format = Path::new(&path)
        .extension()
        .and_then(|e| e.to_str())
        .map(ImageFormat::from_extension)
        .unwrap_or(ImageFormat::Unknown);
    let byte_size = std::fs::metadata(&path)?.len();
    let meta = ImageMetadata::new(format, byte_size, width, height);

    let result = analyze_rgba(
        width as usize,
        height as usize,
        decoded.into_raw(),
        Some(&meta),
        AnalysisConfig::default(),
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let c = &result.classification;
    println!("Analysis Results: {}", path);
    println!(
        "  Image: {} {} ({}, {:.2} bytes/px, {:?} compression, aspect {:.3})",
        meta.format.as_str(),
        meta.dimensions(),
        meta.human_size(),
        meta.bytes_per_pixel(),
        meta.compression_level(),
        meta.aspect_ratio().unwrap_or(0.0)
    );
    println!("  Label: {} (confidence: {})", c.label, c.confidence);
    println!(
        "  Probabilities: real={:.3} ai-generated={:.3} graphic-design={:.3}",
        c.probabilities.real, c.probabilities.ai_generated, c.probabilities.graphic_design
    );
    if c.was_overridden() {
        let fired: Vec<&str> = c.fired_rules.iter().map(|r| r.as_str()).collect();
        println!("  Scorer said {}, rules fired: {}", c.provisional_label, fired.join(", "));
    }
    println!("  Features:");
    for feature in &result.features {
        println!(
            "    {:<24} {:.2}  {}",
            feature.kind.title(),
            feature.score,
            feature.interpretation
        );
    }
    println!("  Processing time: {:.2} ms", result.metadata.processing_time_ms);

    Ok(())
}

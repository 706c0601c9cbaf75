//! Example: Analyze multiple image files in parallel
//!
//! Usage:
//!   cargo run --release --example analyze_batch -- [--jobs N] [--json] <file1> <file2> ...
//!
//! Notes:
//! - Parallelism is across files (batch-level); per-image extraction runs sequentially.
//! - Default workers: (available CPU threads - 1), keeping one core free for the system.

use pixelcheck::{analyze_rgba, AnalysisConfig, AnalysisResult, ImageFormat, ImageMetadata};
use rayon::prelude::*;
use std::env;
use std::path::Path;
use std::time::Instant;

fn load_image(path: &str) -> Result<(Vec<u8>, ImageMetadata), Box<dyn std::error::Error>> {
    let decoded = image::open(path)?.to_rgba8();
    let (width, height) = decoded.dimensions();
    let format = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(ImageFormat::from_extension)
        .unwrap_or(ImageFormat::Unknown);
    let byte_size = std::fs::metadata(path)?.len();
    Ok((decoded.into_raw(), ImageMetadata::new(format, byte_size, width, height)))
}

fn analyze_path(path: &str, config: &AnalysisConfig) -> Result<AnalysisResult, String> {
    let (data, meta) = load_image(path).map_err(|e| format!("decode failed: {e}"))?;
    analyze_rgba(
        meta.width as usize,
        meta.height as usize,
        data,
        Some(&meta),
        config.clone(),
    )
    .map_err(|e| format!("analysis failed: {e}"))
}

fn default_jobs() -> usize {
    let n = std::thread::available_parallelism().map(|v| v.get()).unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

fn percentile(mut xs: Vec<f32>, p: f32) -> Option<f32> {
    if xs.is_empty() {
        return None;
    }
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let idx = ((xs.len() - 1) as f32 * p.clamp(0.0, 1.0)).round() as usize;
    Some(xs[idx.min(xs.len() - 1)])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut json = false;
    let mut jobs: Option<usize> = None;
    let mut paths: Vec<String> = Vec::new();

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--json" => json = true,
            "--jobs" => {
                let v = args
                    .first()
                    .ok_or("--jobs requires a value")?
                    .parse::<usize>()?;
                args.remove(0);
                jobs = Some(std::cmp::max(1, v));
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: analyze_batch [--jobs N] [--json] <file1> <file2> ...\n\
                     \n\
                     --jobs N   Parallel workers (default: CPU-1)\n\
                     --json     Emit one JSON object per line (JSONL)\n"
                );
                return Ok(());
            }
            _ => paths.push(a),
        }
    }

    if paths.is_empty() {
        eprintln!("ERROR: Provide at least one image path. Use --help for usage.");
        std::process::exit(2);
    }

    let jobs = jobs.unwrap_or_else(default_jobs);
    eprintln!("Batch: {} files, jobs={}", paths.len(), jobs);

    // Files already fan out over the pool
    let config = AnalysisConfig {
        parallel_extraction: false,
        ..AnalysisConfig::default()
    };

    let t0 = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let outs: Vec<(String, Result<AnalysisResult, String>)> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| (path.clone(), analyze_path(path, &config)))
            .collect()
    });

    for (idx, (path, out)) in outs.iter().enumerate() {
        match (out, json) {
            (Ok(res), true) => {
                let line = serde_json::json!({
                    "file": path,
                    "label": res.label(),
                    "confidence": res.confidence(),
                    "probabilities": res.classification.probabilities,
                    "fired_rules": res.classification.fired_rules,
                    "features": res.classification.features,
                    "processing_time_ms": res.metadata.processing_time_ms,
                });
                println!("{}", line);
            }
            (Err(e), true) => {
                println!("{}", serde_json::json!({ "file": path, "error": e }));
            }
            (Ok(res), false) => {
                let c = &res.classification;
                println!(
                    "[{}/{}] {}: {} (conf={}, p={:.3}) time={:.2}ms",
                    idx + 1,
                    outs.len(),
                    path,
                    c.label,
                    c.confidence,
                    c.max_probability,
                    res.metadata.processing_time_ms
                );
            }
            (Err(e), false) => {
                println!("[{}/{}] {}: ERROR: {}", idx + 1, outs.len(), path, e);
            }
        }
    }

    let ok_times: Vec<f32> = outs
        .iter()
        .filter_map(|(_, out)| out.as_ref().ok())
        .map(|res| res.metadata.processing_time_ms)
        .collect();
    let wall_ms = t0.elapsed().as_secs_f64() * 1000.0;

    eprintln!(
        "Done: ok={}/{} wall={:.0}ms",
        ok_times.len(),
        outs.len(),
        wall_ms
    );
    if !ok_times.is_empty() {
        let mean = ok_times.iter().sum::<f32>() / ok_times.len() as f32;
        let p50 = percentile(ok_times.clone(), 0.50).unwrap_or(mean);
        let p90 = percentile(ok_times.clone(), 0.90).unwrap_or(mean);
        let min = ok_times.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = ok_times.iter().cloned().fold(0.0, f32::max);
        eprintln!(
            "processing_time_ms: mean={:.2} p50={:.2} p90={:.2} min={:.2} max={:.2}",
            mean, p50, p90, min, max
        );
    }

    Ok(())
}

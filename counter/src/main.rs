/// Face counter
///
/// Replays a JSON-lines file of frames, one `FrameInput` object per line,
/// through the counting pipeline.
///
/// Usage:
///   counter <frames.jsonl> [settings.json]
use anyhow::Context;
use counter::{CounterConfig, CounterError, CounterPipeline, FrameInput};
use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let frames_path = args
        .get(1)
        .context("usage: counter <frames.jsonl> [settings.json]")?;

    let config = match args.get(2) {
        Some(path) => CounterConfig::from_file(path)?,
        None => CounterConfig::default(),
    };

    log::info!("counter v{}", counter::version());
    let mut pipeline = CounterPipeline::new(config)?;

    let file = File::open(frames_path).with_context(|| format!("opening {}", frames_path))?;
    let start = Instant::now();

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: FrameInput = serde_json::from_str(&line)
            .map_err(|e| CounterError::input(index + 1, e.to_string()))?;

        let summary = pipeline.process(&frame)?;
        for record in &summary.resolver.records {
            log::info!(
                "Session #{} ({}) lasted {:.1}s, {} {}-{}",
                record.session_id,
                record.face_id,
                record.duration_in_seconds,
                record.date,
                record.readable_time_start,
                record.readable_time_end
            );
        }
        for view in summary.sessions.iter().filter(|v| v.is_active) {
            log::debug!("  {} {:.0}%", view.label, view.time_left_percent * 100.0);
        }
    }

    let report = pipeline.finish();
    for record in &report.records {
        log::info!(
            "Session #{} ({}) still open at end of input, recorded after {:.1}s",
            record.session_id,
            record.face_id,
            record.duration_in_seconds
        );
    }
    if report.failed > 0 {
        log::warn!("{} sessions could not be recorded", report.failed);
    }

    let stats = pipeline.stats();
    println!(
        "Processed {} frames ({} faces) in {:.2}s",
        stats.frames,
        stats.faces,
        start.elapsed().as_secs_f32()
    );
    println!(
        "Sessions: {} created, {} recorded, {} dropped, {} still open",
        stats.sessions_created,
        stats.records_written,
        stats.sessions_dropped,
        pipeline.resolver().session_count()
    );

    Ok(())
}

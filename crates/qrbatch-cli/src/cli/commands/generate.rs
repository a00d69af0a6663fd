//! `qrbatch generate` – load an input file and write all batch archives.

use anyhow::{anyhow, Result};
use qrbatch_core::config::QrBatchConfig;
use qrbatch_core::input;
use qrbatch_core::run::{self, RunContext, RunProgress, RunState, RunSummary};
use std::path::Path;

pub async fn run_generate(
    cfg: &QrBatchConfig,
    file: &Path,
    secret: Option<&str>,
    output_dir: &Path,
) -> Result<RunSummary> {
    let secret = cfg.secret_mode.resolve(secret)?;

    // Validation errors quote the offending line; show them verbatim.
    let ids = input::read_identifiers(file)?;
    println!("Loaded {} lines", ids.len());

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<RunProgress>(16);
    let progress_handle = tokio::spawn(async move {
        while let Some(p) = progress_rx.recv().await {
            match (p.state, p.batch) {
                (RunState::Generating, Some(b)) => println!(
                    "Batch {}/{}: generating {} - {}",
                    b.number,
                    p.batch_count,
                    b.start,
                    b.end
                ),
                (RunState::Packaging, Some(b)) => {
                    println!("Batch {}/{}: packaging", b.number, p.batch_count)
                }
                (RunState::Waiting, Some(_)) => println!("Waiting before next batch..."),
                _ => {}
            }
        }
    });

    let ctx = RunContext::from_config(cfg, secret, output_dir.to_path_buf())
        .with_progress(progress_tx);
    let result = run::run_generation(&ctx, &ids).await;
    drop(ctx);
    let _ = progress_handle.await;

    match result {
        Ok(summary) => {
            for path in &summary.archives {
                tracing::debug!("archive {}", path.display());
            }
            println!(
                "Processed {} identifiers in {} batch(es) into {}",
                summary.processed,
                summary.batches,
                output_dir.display()
            );
            Ok(summary)
        }
        // Cause chain is already in the log; keep the user message short.
        Err(err) => Err(anyhow!(err.user_message())),
    }
}

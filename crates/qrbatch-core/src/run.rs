//! Generation run: validate, then encode and package each batch in turn with a
//! fixed pause between batches.
//!
//! Batches never overlap. Encoding and packaging are CPU/disk bound and run on
//! the blocking pool one after the other; the pause is a timer on the async
//! runtime. The first failure ends the run. Archives already written stay on disk.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::archive;
use crate::batch::{self, Batch};
use crate::config::{QrBatchConfig, SecretMode, MAX_IMAGE_SIZE};
use crate::encoder::{self, EncoderSettings, RenderOptions};
use crate::error::{ErrorChain, Precondition, RunError};
use crate::input::Identifier;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Validating,
    Generating,
    Packaging,
    Waiting,
    Done,
    Failed,
}

/// Snapshot sent after every state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunProgress {
    pub state: RunState,
    /// Batch in flight (the last one started, for `Done`/`Failed`).
    pub batch: Option<Batch>,
    pub batch_count: usize,
}

impl fmt::Display for RunProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = format!("{:?}", self.state).to_lowercase();
        match &self.batch {
            Some(b) => write!(
                f,
                "batch {}/{} ({}): {}",
                b.number,
                self.batch_count,
                b.display_range(),
                state
            ),
            None => f.write_str(&state),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub processed: usize,
    pub batches: usize,
    pub archives: Vec<PathBuf>,
}

/// Everything one run needs, owned for its duration.
pub struct RunContext {
    pub settings: EncoderSettings,
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub secret_mode: SecretMode,
    pub output_dir: PathBuf,
    pub progress: Option<mpsc::Sender<RunProgress>>,
    secret: String,
}

impl RunContext {
    pub fn from_config(cfg: &QrBatchConfig, secret: String, output_dir: PathBuf) -> Self {
        Self {
            settings: EncoderSettings {
                base_url: cfg.base_url.clone(),
                render: RenderOptions {
                    size: cfg.image_size,
                    margin: cfg.margin,
                },
            },
            batch_size: cfg.batch_size,
            batch_delay: cfg.batch_delay(),
            secret_mode: cfg.secret_mode,
            output_dir,
            progress: None,
            secret,
        }
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<RunProgress>) -> Self {
        self.progress = Some(tx);
        self
    }
}

/// Tracks the current state and publishes transitions.
struct Tracker<'a> {
    tx: Option<&'a mpsc::Sender<RunProgress>>,
    current: RunProgress,
}

impl<'a> Tracker<'a> {
    fn new(tx: Option<&'a mpsc::Sender<RunProgress>>) -> Self {
        Self {
            tx,
            current: RunProgress {
                state: RunState::Idle,
                batch: None,
                batch_count: 0,
            },
        }
    }

    async fn enter(&mut self, state: RunState) {
        self.current.state = state;
        tracing::debug!("run: {}", self.current);
        if let Some(tx) = self.tx {
            // A dropped receiver only means nobody is watching.
            let _ = tx.send(self.current.clone()).await;
        }
    }

    async fn enter_batch(&mut self, state: RunState, batch: Batch, batch_count: usize) {
        self.current.batch = Some(batch);
        self.current.batch_count = batch_count;
        self.enter(state).await;
    }
}

/// Run the whole pipeline over `identifiers`.
pub async fn run_generation(
    ctx: &RunContext,
    identifiers: &[Identifier],
) -> Result<RunSummary, RunError> {
    let mut tracker = Tracker::new(ctx.progress.as_ref());
    match execute(ctx, identifiers, &mut tracker).await {
        Ok(summary) => {
            tracker.enter(RunState::Done).await;
            tracing::info!(
                processed = summary.processed,
                batches = summary.batches,
                "run completed"
            );
            Ok(summary)
        }
        Err(err) => {
            tracing::error!("run failed: {}", ErrorChain(&err));
            tracker.enter(RunState::Failed).await;
            Err(err)
        }
    }
}

async fn execute(
    ctx: &RunContext,
    identifiers: &[Identifier],
    tracker: &mut Tracker<'_>,
) -> Result<RunSummary, RunError> {
    tracker.enter(RunState::Validating).await;
    if identifiers.is_empty() {
        return Err(RunError::MissingPrecondition(Precondition::NoIdentifiers));
    }
    if ctx.secret_mode == SecretMode::User && ctx.secret.is_empty() {
        return Err(RunError::MissingPrecondition(Precondition::NoSecret));
    }
    if ctx.batch_size == 0 {
        return Err(RunError::InvalidSettings(
            "batch_size must be at least 1".to_string(),
        ));
    }
    let size = ctx.settings.render.size;
    if size == 0 || size > MAX_IMAGE_SIZE {
        return Err(RunError::InvalidSettings(format!(
            "image_size must be between 1 and {MAX_IMAGE_SIZE}, got {size}"
        )));
    }

    let batches = batch::partition(identifiers, ctx.batch_size);
    let batch_count = batches.len();
    let mut archives = Vec::with_capacity(batch_count);

    for batch in batches {
        tracker
            .enter_batch(RunState::Generating, batch, batch_count)
            .await;
        let records = tokio::task::spawn_blocking({
            let ids = batch.slice(identifiers).to_vec();
            let secret = ctx.secret.clone();
            let settings = ctx.settings.clone();
            move || {
                ids.iter()
                    .map(|id| encoder::encode(id, &secret, &settings))
                    .collect::<Result<Vec<_>, _>>()
            }
        })
        .await??;

        tracker.enter(RunState::Packaging).await;
        let path = tokio::task::spawn_blocking({
            let output_dir = ctx.output_dir.clone();
            move || archive::package_batch(records, &batch, &output_dir)
        })
        .await??;
        archives.push(path);

        if batch.number < batch_count {
            tracker.enter(RunState::Waiting).await;
            tokio::time::sleep(ctx.batch_delay).await;
        }
    }

    Ok(RunSummary {
        processed: identifiers.len(),
        batches: batch_count,
        archives,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_display() {
        let p = RunProgress {
            state: RunState::Generating,
            batch: Some(Batch {
                number: 2,
                start: 2001,
                end: 2500,
            }),
            batch_count: 2,
        };
        assert_eq!(p.to_string(), "batch 2/2 (2001 - 2500): generating");
        let idle = RunProgress {
            state: RunState::Validating,
            batch: None,
            batch_count: 0,
        };
        assert_eq!(idle.to_string(), "validating");
    }

    #[test]
    fn context_from_config() {
        let cfg = QrBatchConfig::default();
        let ctx = RunContext::from_config(&cfg, "pw".to_string(), PathBuf::from("/out"));
        assert_eq!(ctx.batch_size, 2000);
        assert_eq!(ctx.batch_delay, Duration::from_secs(10));
        assert_eq!(ctx.settings.render, RenderOptions { size: 400, margin: 2 });
        assert_eq!(ctx.settings.base_url, "https://check.vant.plus");
        assert!(ctx.progress.is_none());
    }
}

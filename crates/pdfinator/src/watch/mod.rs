//! Watching the input directory.
//!
//! Every tick of a [`Ticker`] triggers one pass:
//! 1. Reload the processed-file registry
//! 2. Scan the input directory
//! 3. Hand each file not yet recorded to a [`FileHandler`]
//! 4. Record the file once the handler succeeds
//!
//! A file whose handling fails is logged and not retried for the rest of the
//! session. It stays out of the registry, so the next session tries again.
//! A pass that cannot scan the input directory is logged and the loop waits
//! for the next tick.
//!
//! # Examples
//!
//! ```no_run
//! use pdfinator::config::Config;
//! use pdfinator::watch::{ActionHandler, IntervalTicker, WatchAction, Watcher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let mut handler = ActionHandler::new(WatchAction::ExtractText, &config);
//! let ticker = IntervalTicker::new(config.poll_interval());
//!
//! let summary = Watcher::new(&config)
//!     .run(ticker, &mut handler, tokio::signal::ctrl_c())
//!     .await?;
//! println!("Processed {} file(s)", summary.processed);
//! # Ok(())
//! # }
//! ```

pub mod handler;
pub mod scanner;
pub mod ticker;

pub use handler::{ActionHandler, FileHandler, HandleOutcome, WatchAction};
pub use scanner::{DirectoryScanner, ScannedFile};
pub use ticker::{CountedTicker, IntervalTicker, Ticker};

use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::Result;
use crate::registry::ProcessedSet;

/// Counters of a single pass over the input directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// PDFs found in the input directory.
    pub found: usize,
    /// Files handed to the handler.
    pub attempted: usize,
    /// Files handled and recorded.
    pub processed: usize,
    /// Files the handler left alone.
    pub skipped: usize,
    /// Files whose handling failed.
    pub failed: usize,
    /// Whether a shutdown request cut the pass short.
    pub interrupted: bool,
}

/// Totals of a watch session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchSummary {
    /// Completed passes.
    pub ticks: usize,
    /// Files handled and recorded.
    pub processed: usize,
    /// Files whose handling failed.
    pub failed: usize,
    /// Passes abandoned because the input directory could not be scanned.
    pub failed_passes: usize,
    /// Whether the session ended because of a shutdown request.
    pub interrupted: bool,
}

impl WatchSummary {
    fn add(&mut self, tick: &TickReport) {
        self.ticks += 1;
        self.processed += tick.processed;
        self.failed += tick.failed;
    }
}

/// Polls the input directory and dispatches new files.
#[derive(Debug, Clone)]
pub struct Watcher {
    scanner: DirectoryScanner,
    registry_path: PathBuf,
    // Files not to be offered again in this session
    settled: HashSet<String>,
}

impl Watcher {
    /// Create a watcher over the configured input directory.
    ///
    /// The output directory is never scanned, even when it lives inside the
    /// input directory.
    pub fn new(config: &Config) -> Self {
        Self {
            scanner: DirectoryScanner::new(config.input_dir.clone(), config.recursive)
                .excluding(&config.output_dir)
                .excluding(&config.logs_dir),
            registry_path: config.registry_path.clone(),
            settled: HashSet::new(),
        }
    }

    /// Run one pass over the input directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry or the input directory cannot be
    /// read, or if the handler fails with an unrecoverable error. Any other
    /// handler error only counts the file as failed.
    pub async fn scan_once<H: FileHandler>(&mut self, handler: &mut H) -> Result<TickReport> {
        self.pass(handler, None::<Pin<&mut std::future::Pending<()>>>)
            .await
    }

    /// Run passes until the ticker stops or `shutdown` completes.
    ///
    /// Shutdown is honored between files, never in the middle of one.
    pub async fn run<T, H, S>(
        &mut self,
        mut ticker: T,
        handler: &mut H,
        shutdown: S,
    ) -> Result<WatchSummary>
    where
        T: Ticker,
        H: FileHandler,
        S: Future,
    {
        let mut shutdown = std::pin::pin!(shutdown);
        let mut summary = WatchSummary::default();

        info!(
            "Watching {} for new PDF files",
            self.scanner.input_dir().display()
        );

        loop {
            let next = tokio::select! {
                biased;
                _ = &mut shutdown => None,
                more = ticker.tick() => Some(more),
            };
            match next {
                None => {
                    summary.interrupted = true;
                    break;
                }
                Some(false) => break,
                Some(true) => {}
            }

            let interrupted = match self.pass(handler, Some(shutdown.as_mut())).await {
                Ok(tick) => {
                    summary.add(&tick);
                    tick.interrupted
                }
                Err(e) if e.is_recoverable() => {
                    error!("Watch pass failed, retrying on the next tick: {e}");
                    summary.failed_passes += 1;
                    false
                }
                Err(e) => return Err(e),
            };

            // A completed shutdown future must not be polled again
            if interrupted || is_done(shutdown.as_mut()).await {
                summary.interrupted = true;
                break;
            }
        }

        info!(
            "Watch stopped after {} pass(es): {} processed, {} failed",
            summary.ticks, summary.processed, summary.failed
        );
        Ok(summary)
    }

    async fn pass<H, S>(
        &mut self,
        handler: &mut H,
        mut shutdown: Option<Pin<&mut S>>,
    ) -> Result<TickReport>
    where
        H: FileHandler,
        S: Future + ?Sized,
    {
        let mut registry = ProcessedSet::load(&self.registry_path)?;
        let files = self.scanner.scan()?;

        let mut report = TickReport {
            found: files.len(),
            ..TickReport::default()
        };

        for file in files {
            if registry.contains(&file.id) || self.settled.contains(&file.id) {
                continue;
            }
            if let Some(shutdown) = shutdown.as_mut() {
                if is_done(shutdown.as_mut()).await {
                    debug!("Shutdown requested, leaving {} for later", file.id);
                    report.interrupted = true;
                    break;
                }
            }

            info!("Found new PDF: {}", file.id);
            report.attempted += 1;

            match handler.handle(&file).await {
                Ok(HandleOutcome::Done) => match registry.mark_processed(&file.id) {
                    Ok(()) => {
                        report.processed += 1;
                        info!("Marked {} as processed", file.id);
                    }
                    Err(e) if e.is_recoverable() => {
                        error!("Could not record {}: {}", file.id, e);
                        self.settled.insert(file.id);
                        report.failed += 1;
                    }
                    Err(e) => return Err(e),
                },
                Ok(HandleOutcome::Skipped) => {
                    self.settled.insert(file.id);
                    report.skipped += 1;
                }
                Err(e) if e.is_recoverable() => {
                    error!("Failed to process {}: {}", file.id, e);
                    self.settled.insert(file.id);
                    report.failed += 1;
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            "Pass complete: {} found, {} processed, {} failed",
            report.found, report.processed, report.failed
        );
        Ok(report)
    }
}

/// Poll `shutdown` once without waiting.
async fn is_done<S: Future + ?Sized>(shutdown: Pin<&mut S>) -> bool {
    tokio::select! {
        biased;
        _ = shutdown => true,
        _ = std::future::ready(()) => false,
    }
}

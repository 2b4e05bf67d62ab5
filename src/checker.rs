//! Aggregator: orchestrates the connection pool and tallies results
//!
//! Seeds the work queue, spawns one task per connection slot (profile by
//! profile, in configuration order, up to the concurrency budget), then
//! consumes typed events until every connection has reported its terminal
//! `Disconnected`. Finalization runs exactly once, when the active set
//! empties or the run is interrupted.

use crate::config::ServerProfile;
use crate::connection::{CheckEvent, Connection};
use crate::progress;
use crate::queue::WorkQueue;
use crate::tls::TlsManager;
use crate::types::MessageId;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Knobs for one checking run
#[derive(Debug, Clone)]
pub struct CheckerOptions {
    /// Render the progress bar while connections are active
    pub show_progress: bool,
    /// Suppress stdout chatter (summary, missing notices, progress)
    pub quiet: bool,
    /// Progress refresh interval
    pub refresh_interval: Duration,
    /// React to Ctrl-C by aborting the pool and finalizing with partial counts
    pub watch_signals: bool,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            show_progress: false,
            quiet: false,
            refresh_interval: Duration::from_millis(200),
            watch_signals: true,
        }
    }
}

/// Final tallies of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub total: u64,
    pub checked: u64,
    pub missing: u64,
    /// True when the run was cut short by a termination signal
    pub interrupted: bool,
}

impl CheckReport {
    /// False when connection failures left part of the queue unchecked
    #[must_use]
    pub fn all_checked(&self) -> bool {
        self.checked >= self.total
    }
}

/// Number of connections to open: `min(total articles, Σ configured slots)`
///
/// More connections than articles would only idle.
#[must_use]
pub fn concurrency_budget(profiles: &[ServerProfile], total_articles: usize) -> usize {
    let configured: usize = profiles.iter().map(|p| p.connections as usize).sum();
    configured.min(total_articles)
}

/// Check every article against the configured providers
///
/// `preknown_missing` seeds the missing counter with articles the index
/// itself already declared absent, before any network activity.
pub async fn run_check(
    profiles: &[ServerProfile],
    articles: Vec<MessageId>,
    preknown_missing: u64,
    tls: TlsManager,
    options: &CheckerOptions,
) -> Result<CheckReport> {
    let total = articles.len() as u64;
    let mut checked: u64 = 0;
    let mut missing: u64 = preknown_missing;
    let mut interrupted = false;

    let budget = concurrency_budget(profiles, articles.len());
    if budget == 0 {
        let report = CheckReport {
            total,
            checked,
            missing,
            interrupted,
        };
        finalize(&report, options);
        return Ok(report);
    }

    let queue = Arc::new(WorkQueue::new(articles));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut handles = Vec::with_capacity(budget);
    let mut next_id = 0usize;
    'alloc: for profile in profiles {
        let profile = Arc::new(profile.clone());
        for _ in 0..profile.connections {
            let conn = Connection::new(
                next_id,
                Arc::clone(&profile),
                Arc::clone(&queue),
                tx.clone(),
                tls.clone(),
            );
            handles.push(tokio::spawn(conn.run()));
            next_id += 1;
            if handles.len() == budget {
                break 'alloc;
            }
        }
    }
    // The aggregator only reads events; connections hold the senders
    drop(tx);

    let mut active = handles.len();
    if !options.quiet {
        println!("Using {} connections", active);
    }

    let mut ticker = tokio::time::interval(options.refresh_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let watch_signals = options.watch_signals;
    let shutdown = async move {
        if watch_signals {
            let _ = tokio::signal::ctrl_c().await;
        } else {
            std::future::pending::<()>().await
        }
    };
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(CheckEvent::ArticleChecked) => checked += 1,
                Some(CheckEvent::ArticleMissing { id, server }) => {
                    missing += 1;
                    if !options.quiet {
                        let prefix = if options.show_progress { "\n" } else { "" };
                        println!("{}+ Missing Article: {} (on {})", prefix, id, server);
                    }
                }
                Some(CheckEvent::Disconnected { connection_id }) => {
                    debug!("Connection {} finished ({} still active)", connection_id, active - 1);
                    active -= 1;
                    if active == 0 {
                        break;
                    }
                }
                None => break,
            },
            _ = ticker.tick(), if options.show_progress => {
                progress::draw(checked, total, missing);
            }
            _ = &mut shutdown => {
                warn!("Interrupted, aborting {} active connections", active);
                interrupted = true;
                for handle in &handles {
                    handle.abort();
                }
                break;
            }
        }
    }

    let report = CheckReport {
        total,
        checked,
        missing,
        interrupted,
    };
    finalize(&report, options);
    Ok(report)
}

/// Emit the end-of-run summary; called exactly once per run
fn finalize(report: &CheckReport, options: &CheckerOptions) {
    if options.show_progress && !options.quiet {
        progress::draw(report.checked, report.total, report.missing);
        println!();
    }
    if !report.all_checked() {
        warn!(
            "Only {}/{} articles were checked; connection failures left the rest unverified",
            report.checked, report.total
        );
    }
    if !options.quiet {
        println!(
            "Nb Missing Article(s): {}/{}",
            report.missing, report.total
        );
    }
}

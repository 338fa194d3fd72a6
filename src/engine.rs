// src/engine.rs
// =============================================================================
// Analyzer Execution Engine.
//
// Runs a list of independent analyzers against one ParsedPage:
// 1. Put every analyzer index on a shared queue
// 2. Spawn min(parallelism, analyzers) worker tasks
// 3. Each worker pops an index, runs that analyzer, stores its Fact, repeats
// 4. Return once every worker has drained the queue and exited
//
// Guarantees:
// - exactly one Fact per analyzer, no matter the pool size or finish order
// - a failing or panicking analyzer becomes an error Fact under its own key;
//   its siblings keep running
// - the page is shared read-only (Arc<ParsedPage>); the result slots are the
//   only shared mutable state, each written under a short lock
//
// Sizing: the link analyzer awaits the verification pool from inside one of
// these workers. Workers here are async tasks, so a worker waiting on link
// probes parks without holding a thread, and the verification pool's workers
// are separate tasks. Neither pool's size can starve the other, but a request
// is never faster than its slowest link batch.
// =============================================================================

use crate::analyzers::{Analyzer, Fact};
use crate::page::ParsedPage;
use futures::FutureExt;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

pub struct AnalyzerEngine {
    parallelism: usize,
}

impl AnalyzerEngine {
    /// `parallelism` is the number of dispatch workers per request (min 1).
    pub fn new(parallelism: usize) -> Self {
        Self {
            parallelism: parallelism.max(1),
        }
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    // Runs every analyzer against the page and collects their facts
    //
    // Parameters:
    //   units: the analyzers to run (shared, never mutated)
    //   page: the page they all read from
    //
    // Returns: one Fact per analyzer; the order carries no meaning
    pub async fn execute(&self, units: &[Arc<dyn Analyzer>], page: Arc<ParsedPage>) -> Vec<Fact> {
        if units.is_empty() {
            return Vec::new();
        }

        let units: Arc<[Arc<dyn Analyzer>]> = units.iter().cloned().collect();
        let queue = Arc::new(Mutex::new((0..units.len()).collect::<VecDeque<usize>>()));
        let slots: Arc<Mutex<Vec<Option<Fact>>>> = Arc::new(Mutex::new(vec![None; units.len()]));

        let workers = self.parallelism.min(units.len());
        debug!(analyzers = units.len(), workers, "dispatching analyzers");

        let mut tasks = JoinSet::new();
        for worker in 1..=workers {
            let units = Arc::clone(&units);
            let queue = Arc::clone(&queue);
            let slots = Arc::clone(&slots);
            let page = Arc::clone(&page);

            tasks.spawn(async move {
                loop {
                    // Pop in its own statement so the lock is released
                    // before the analyzer runs
                    let next = queue.lock().pop_front();
                    let Some(index) = next else {
                        break;
                    };
                    let fact = run_isolated(units[index].as_ref(), &page).await;
                    slots.lock()[index] = Some(fact);
                }
                debug!(worker, "dispatch worker finished");
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "dispatch worker failed");
            }
        }

        let slots = std::mem::take(&mut *slots.lock());
        slots
            .into_iter()
            .zip(units.iter())
            .map(|(slot, unit)| {
                slot.unwrap_or_else(|| {
                    warn!(key = unit.key(), "analyzer produced no result");
                    Fact::error(unit.key(), "analyzer did not complete")
                })
            })
            .collect()
    }
}

/// Runs one analyzer, turning errors and panics into an error Fact.
async fn run_isolated(unit: &dyn Analyzer, page: &ParsedPage) -> Fact {
    let key = unit.key();
    let started = Instant::now();
    debug!(key, "analyzer started");

    let fact = match AssertUnwindSafe(unit.analyze(page)).catch_unwind().await {
        Ok(Ok(value)) => Fact::value(key, value),
        Ok(Err(e)) => {
            warn!(key, error = %e, "analyzer failed");
            Fact::error(key, e.to_string())
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(key, panic = %message, "analyzer panicked");
            Fact::error(key, format!("analyzer panicked: {message}"))
        }
    };

    debug!(key, elapsed_ms = started.elapsed().as_millis() as u64, "analyzer completed");
    fact
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why Vec<Option<Fact>> instead of pushing into a Vec?
//    - Slot i belongs to analyzer i, so a missing result is easy to spot and
//      is reported as an error Fact instead of silently shrinking the output
//
// 2. Why JoinSet?
//    - It owns every spawned worker and join_next() lets us wait for all of
//      them, which is the "everything has finished" barrier for this request
//
// 3. parking_lot::Mutex vs tokio::sync::Mutex
//    - The locks here are never held across an .await, so the cheaper
//      synchronous mutex is enough
// -----------------------------------------------------------------------------

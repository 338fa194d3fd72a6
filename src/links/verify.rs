// src/links/verify.rs
// =============================================================================
// Link Verification Worker Pool.
//
// A fixed number of long-lived workers drain one shared job queue. Every job
// is one URL plus a oneshot reply channel. A worker:
//   1. takes the next job off the queue (waits while the queue is empty)
//   2. probes the URL once, with the configured timeout
//   3. measures how long that took
//   4. sends (status code, latency) back on the job's reply channel
//   5. loops
//
// The pool is created once at startup and shared (Arc) by every request, so
// no matter how many analyses run at the same time there are never more than
// `size` probes in flight. Extra jobs simply wait in the queue.
//
// Probe failures are data, not errors:
//   timeout                          -> 504
//   DNS / refused / TLS / anything   -> 0 (unreachable)
// =============================================================================

use async_trait::async_trait;
use futures::future::join_all;
use futures::FutureExt;
use reqwest::Client;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Status recorded when the target could not be reached at all.
pub const STATUS_UNREACHABLE: u16 = 0;
/// Status recorded when the probe hit its timeout.
pub const STATUS_TIMEOUT: u16 = 504;

/// What one probe produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub status_code: u16,
    pub latency_millis: u64,
}

impl ProbeOutcome {
    fn unreachable(latency_millis: u64) -> Self {
        Self {
            status_code: STATUS_UNREACHABLE,
            latency_millis,
        }
    }
}

/// Performs a single liveness check and returns an HTTP status (or sentinel).
///
/// Implementations must not return errors; every failure maps to a status.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str) -> u16;
}

/// Probes URLs with a plain GET through a shared reqwest client.
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> u16 {
        // The body is never read; dropping the response closes it
        match self.client.get(url).send().await {
            Ok(response) => response.status().as_u16(),
            Err(e) if e.is_timeout() => {
                debug!(%url, "probe timed out");
                STATUS_TIMEOUT
            }
            Err(e) => {
                debug!(%url, error = %e, "probe failed");
                STATUS_UNREACHABLE
            }
        }
    }
}

/// One unit of work on the queue.
struct VerificationJob {
    url: String,
    reply: oneshot::Sender<ProbeOutcome>,
}

#[derive(Debug, Default)]
struct PoolCounters {
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    completed: AtomicUsize,
}

/// Snapshot of the pool's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub in_flight: usize,
    pub peak_in_flight: usize,
    pub completed: usize,
}

/// Handle to a submitted job. Resolves once a worker has finished it.
pub struct ProbeTicket {
    url: String,
    reply: oneshot::Receiver<ProbeOutcome>,
}

impl ProbeTicket {
    /// Waits for the job to complete.
    ///
    /// If the job can never run (the pool is gone) the link is reported as
    /// unreachable rather than hanging the caller.
    pub async fn wait(self) -> ProbeOutcome {
        match self.reply.await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(url = %self.url, "verification job dropped without a result");
                ProbeOutcome::unreachable(0)
            }
        }
    }
}

pub struct VerificationPool {
    queue: mpsc::UnboundedSender<VerificationJob>,
    workers: Vec<JoinHandle<()>>,
    counters: Arc<PoolCounters>,
}

impl VerificationPool {
    /// Spawns `size` workers on the current tokio runtime.
    pub fn start(size: usize, prober: Arc<dyn Prober>) -> Self {
        let size = size.max(1);
        let (queue, receiver) = mpsc::unbounded_channel();
        let receiver = Arc::new(Mutex::new(receiver));
        let counters = Arc::new(PoolCounters::default());

        let workers = (1..=size)
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    Arc::clone(&receiver),
                    Arc::clone(&prober),
                    Arc::clone(&counters),
                ))
            })
            .collect();

        info!(workers = size, "link verification pool started");

        Self {
            queue,
            workers,
            counters,
        }
    }

    /// Number of workers (the maximum number of probes in flight).
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            in_flight: self.counters.in_flight.load(Ordering::SeqCst),
            peak_in_flight: self.counters.peak_in_flight.load(Ordering::SeqCst),
            completed: self.counters.completed.load(Ordering::SeqCst),
        }
    }

    /// Queues one URL. Never blocks; backpressure happens in the queue.
    pub fn submit(&self, url: impl Into<String>) -> ProbeTicket {
        let url = url.into();
        let (reply, receiver) = oneshot::channel();
        let job = VerificationJob {
            url: url.clone(),
            reply,
        };
        if self.queue.send(job).is_err() {
            // The job (and its reply sender) is dropped; wait() reports it
            warn!(%url, "verification pool is closed");
        }
        ProbeTicket {
            url,
            reply: receiver,
        }
    }

    /// Submits every URL and waits until all of them have completed.
    ///
    /// Completion order is whatever the network gives us; the returned
    /// outcomes line up with `urls` by index.
    pub async fn verify_all(&self, urls: &[String]) -> Vec<ProbeOutcome> {
        let tickets: Vec<_> = urls.iter().map(|url| self.submit(url.as_str())).collect();
        join_all(tickets.into_iter().map(ProbeTicket::wait)).await
    }

    /// Closes the queue and waits for every worker to exit.
    ///
    /// Jobs already queued still run to completion first.
    pub async fn shutdown(self) {
        let VerificationPool { queue, workers, .. } = self;
        drop(queue);
        for worker in workers {
            if let Err(e) = worker.await {
                warn!(error = %e, "verification worker ended abnormally");
            }
        }
        debug!("link verification pool stopped");
    }
}

async fn run_worker(
    id: usize,
    queue: Arc<Mutex<mpsc::UnboundedReceiver<VerificationJob>>>,
    prober: Arc<dyn Prober>,
    counters: Arc<PoolCounters>,
) {
    debug!(worker = id, "verification worker started");

    loop {
        // Only one idle worker waits on the queue at a time; the lock is
        // released before the probe starts
        let job = {
            let mut receiver = queue.lock().await;
            receiver.recv().await
        };
        let Some(job) = job else {
            break;
        };

        let in_flight = counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        counters.peak_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        let started = Instant::now();
        let status_code = match AssertUnwindSafe(prober.probe(&job.url))
            .catch_unwind()
            .await
        {
            Ok(status) => status,
            Err(_) => {
                warn!(worker = id, url = %job.url, "probe panicked");
                STATUS_UNREACHABLE
            }
        };
        let outcome = ProbeOutcome {
            status_code,
            latency_millis: started.elapsed().as_millis() as u64,
        };

        counters.in_flight.fetch_sub(1, Ordering::SeqCst);
        counters.completed.fetch_add(1, Ordering::SeqCst);

        if job.reply.send(outcome).is_err() {
            debug!(worker = id, url = %job.url, "submitter stopped waiting");
        }
    }

    debug!(worker = id, "verification worker exiting");
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why a oneshot channel per job?
//    - Each job has exactly one result, and a oneshot can only be sent once
//    - The submitter owns the receiving side, so no shared result state
//      exists between workers and callers
//
// 2. Why Arc<Mutex<Receiver>>?
//    - tokio's mpsc has a single receiver; wrapping it lets N workers take
//      turns pulling from the same queue
//    - The lock is held only while waiting for the next job
//
// 3. What does catch_unwind do here?
//    - A panicking prober would otherwise kill its worker for good
//    - Catching it keeps the worker alive and turns the panic into status 0
// -----------------------------------------------------------------------------

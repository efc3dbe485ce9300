//! Expectation registry, round driver and delivery counters.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, warn};

use treewatch_watcher::DirChange;

/// File appended inside the target directory each round.
pub const MARKER_FILE: &str = "marker";

/// Deepest directory a generated round may target.
pub const MAX_DEPTH: usize = 5;

/// How long a round waits for its notification.
pub const MAX_WAIT: Duration = Duration::from_secs(5);

/// How one round settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// The matching notification arrived before the deadline.
    Received,

    /// The deadline expired first.
    Lost,
}

/// Delivery counters, monotonically increasing over the correlator's
/// lifetime. Every settled round moves exactly one of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelatorStats {
    /// Expectations resolved by a matching change.
    pub received: u64,

    /// Expectations that expired unresolved.
    pub lost: u64,
}

/// Correlates injected mutations with the watcher's change stream.
///
/// All state lives here rather than in globals: the pending map keyed
/// by directory, and the two counters. The map entry's removal (under
/// the lock) is the exactly-once decision point between resolution and
/// expiry; whichever side removes the entry owns the outcome and the
/// counter increment.
pub struct ChangeCorrelator {
    pending: Mutex<HashMap<PathBuf, oneshot::Sender<()>>>,
    received: AtomicU64,
    lost: AtomicU64,
    max_depth: usize,
    max_wait: Duration,
}

impl ChangeCorrelator {
    /// Create a correlator with the stock limits.
    pub fn new() -> Self {
        Self::with_limits(MAX_DEPTH, MAX_WAIT)
    }

    /// Create a correlator with explicit depth and wait limits.
    pub fn with_limits(max_depth: usize, max_wait: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            received: AtomicU64::new(0),
            lost: AtomicU64::new(0),
            max_depth,
            max_wait,
        }
    }

    /// Register an expectation for a change in `dir`. At most one entry
    /// exists per directory; re-arming a pending one replaces its slot
    /// and the superseded receiver sees a closed channel.
    pub async fn expect(&self, dir: &Path) -> oneshot::Receiver<()> {
        let (resolve, resolved) = oneshot::channel();
        if self
            .pending
            .lock()
            .await
            .insert(dir.to_path_buf(), resolve)
            .is_some()
        {
            debug!(path = %dir.display(), "superseding pending expectation");
        }
        resolved
    }

    /// Feed one observed change. A matching expectation is resolved and
    /// counted; a change nobody asked about is logged and ignored.
    pub async fn observe(&self, change: &DirChange) {
        match self.pending.lock().await.remove(&change.dir) {
            Some(resolve) => {
                self.received.fetch_add(1, Ordering::Relaxed);
                // A failed send only means the round already saw its
                // deadline elapse; removing the entry decided the
                // outcome regardless.
                let _ = resolve.send(());
                debug!(path = %change.dir.display(), "expected change arrived");
            }
            None => debug!(path = %change.dir.display(), "unexpected change"),
        }
    }

    /// Consume the watcher's channel, feeding every change into
    /// [`Self::observe`]. Runs until the sender side is dropped.
    pub async fn pump(&self, mut changes: mpsc::Receiver<DirChange>) {
        while let Some(change) = changes.recv().await {
            debug!(dir = %change.dir.display(), kind = ?change.kind, "change");
            self.observe(&change).await;
        }
        debug!("change stream ended");
    }

    /// Run one round: pick a random directory under `root`, register an
    /// expectation, append to the marker file there, and wait out the
    /// notification or the deadline. Mutation and wait are joined, not
    /// raced; a failed mutation is logged and the expectation still
    /// waits out its deadline.
    pub async fn run_once(&self, root: &Path) -> RoundOutcome {
        let dir = self.random_dir(root);
        debug!(path = %dir.display(), "round target");
        let resolved = self.expect(&dir).await;

        let marker = dir.join(MARKER_FILE);
        let (mutated, waited) =
            tokio::join!(append_marker(&marker), timeout(self.max_wait, resolved));
        if let Err(err) = mutated {
            warn!(path = %marker.display(), %err, "mutation failed");
        }

        match waited {
            Ok(Ok(())) => RoundOutcome::Received,
            Ok(Err(_closed)) => {
                // The slot was superseded before anything resolved it.
                self.lost.fetch_add(1, Ordering::Relaxed);
                RoundOutcome::Lost
            }
            Err(_elapsed) => {
                if self.pending.lock().await.remove(&dir).is_some() {
                    self.lost.fetch_add(1, Ordering::Relaxed);
                    debug!(path = %dir.display(), "expectation expired");
                    RoundOutcome::Lost
                } else {
                    // Resolution won at the deadline edge; the observer
                    // already counted it.
                    RoundOutcome::Received
                }
            }
        }
    }

    /// Drive rounds strictly sequentially: the next round starts only
    /// once the previous one has settled. `rounds = None` runs until
    /// the owning task is dropped.
    pub async fn run(&self, root: &Path, rounds: Option<u64>) {
        let mut completed: u64 = 0;
        loop {
            let outcome = self.run_once(root).await;
            completed += 1;
            let stats = self.stats();
            debug!(
                ?outcome,
                round = completed,
                received = stats.received,
                lost = stats.lost,
                "round settled"
            );
            if rounds.is_some_and(|limit| completed >= limit) {
                break;
            }
        }
    }

    /// Snapshot of the delivery counters.
    pub fn stats(&self) -> CorrelatorStats {
        CorrelatorStats {
            received: self.received.load(Ordering::Relaxed),
            lost: self.lost.load(Ordering::Relaxed),
        }
    }

    /// Number of outstanding expectations.
    pub async fn pending_len(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Random directory in a binary tree under `root`: a random depth
    /// in `[1, max_depth]`, then one "0"/"1" segment per level. The
    /// drawn depth bounds the path length.
    fn random_dir(&self, root: &Path) -> PathBuf {
        let mut rng = rand::rng();
        let depth = rng.random_range(1..=self.max_depth);
        let mut dir = root.to_path_buf();
        for _ in 0..depth {
            dir.push(if rng.random_bool(0.5) { "1" } else { "0" });
        }
        dir
    }
}

impl Default for ChangeCorrelator {
    fn default() -> Self {
        Self::new()
    }
}

async fn append_marker(path: &Path) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(b".").await?;
    Ok(())
}

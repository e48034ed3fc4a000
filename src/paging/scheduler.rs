//! Eviction scheduler - periodic sweeps that page out large subtrees.
//!
//! A sweep collects the resident nodes `depth` levels below an origin and
//! checks each one against a threshold of `node_threshold * iterations`.
//! An oversized candidate is first swept again from its own position with
//! one iteration less (so a smaller threshold), then evicted if it is still
//! over its own threshold.
//!
//! ```text
//!   sweep(root, iter = 3)          threshold = 3 * T
//!     ├── candidate c (depth D)    size > 3T ?
//!     │     └── sweep(c, iter = 2) threshold = 2 * T
//!     │           └── ...
//!     └── still > 3T ? ──▶ evict(c)
//! ```
//!
//! [`EvictionScheduler`] runs [`sweep`] on a background thread at a fixed
//! interval, under the same lock as every foreground operation.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{error, info};

use crate::common::config::PagingConfig;
use crate::common::{NodeId, Result};
use crate::index::NodeTree;

/// Shape of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepPolicy {
    pub depth: usize,
    pub iterations: usize,
    pub node_threshold: usize,
}

impl From<&PagingConfig> for SweepPolicy {
    fn from(config: &PagingConfig) -> Self {
        Self {
            depth: config.sweep_depth,
            iterations: config.sweep_iterations,
            node_threshold: config.node_threshold,
        }
    }
}

/// What one sweep did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    /// Candidate nodes examined, across all levels.
    pub candidates: usize,
    /// Subtrees written out.
    pub evicted: usize,
    /// Nodes that left memory.
    pub nodes_paged_out: usize,
    pub resident_before: usize,
    pub resident_after: usize,
}

/// Run one eviction sweep over the whole tree.
///
/// # Errors
/// Stops at the first failed eviction. Subtrees evicted before the failure
/// stay paged; the tree is consistent either way.
pub fn sweep(tree: &mut NodeTree, policy: &SweepPolicy) -> Result<SweepReport> {
    let mut report = SweepReport {
        resident_before: tree.resident_nodes(),
        ..SweepReport::default()
    };

    if policy.depth > 0 {
        sweep_from_root(tree, policy, &mut report)?;
    }

    tree.compact();
    tree.serializer.stats().sweeps.fetch_add(1, Ordering::Relaxed);
    report.resident_after = tree.resident_nodes();
    Ok(report)
}

/// Pending work of one sweep.
enum Step {
    /// Examine a candidate found with `iterations` levels left.
    Check { candidate: NodeId, iterations: usize },
    /// Evict `candidate` if its nested sweep left it over `threshold`.
    Settle { candidate: NodeId, threshold: usize },
}

fn sweep_from_root(tree: &mut NodeTree, policy: &SweepPolicy, report: &mut SweepReport) -> Result<()> {
    let mut stack = Vec::new();
    push_candidates(tree, &mut stack, NodeId::ROOT, policy.iterations.max(1), policy);

    while let Some(step) = stack.pop() {
        match step {
            Step::Check { candidate, iterations } => {
                report.candidates += 1;
                let threshold = policy.node_threshold.saturating_mul(iterations);
                if tree.subtree_size(candidate) <= threshold {
                    continue;
                }
                // Settle runs once every nested candidate is done
                stack.push(Step::Settle { candidate, threshold });
                if iterations > 1 {
                    push_candidates(tree, &mut stack, candidate, iterations - 1, policy);
                }
            }
            Step::Settle { candidate, threshold } => {
                if tree.subtree_size(candidate) > threshold {
                    if let Some(nodes) = tree.evict(candidate)? {
                        report.evicted += 1;
                        report.nodes_paged_out += nodes;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Queue the candidates `policy.depth` levels below `origin`, first on top.
fn push_candidates(
    tree: &NodeTree,
    stack: &mut Vec<Step>,
    origin: NodeId,
    iterations: usize,
    policy: &SweepPolicy,
) {
    let candidates = tree.resident_at_depth(origin, policy.depth);
    stack.extend(
        candidates
            .into_iter()
            .rev()
            .filter(|&candidate| candidate != origin)
            .map(|candidate| Step::Check { candidate, iterations }),
    );
}

// ============================================================================
// Background thread
// ============================================================================

/// Stop flag shared with the sweeper thread.
struct Shutdown {
    stopped: Mutex<bool>,
    wake: Condvar,
}

/// Background thread running [`sweep`] every `interval`.
///
/// Dropping the scheduler stops the thread and waits for it. A sweep in
/// progress finishes first; an idle wait is cut short.
pub struct EvictionScheduler {
    shutdown: Arc<Shutdown>,
    handle: Option<JoinHandle<()>>,
}

impl EvictionScheduler {
    /// Spawn the sweeper thread.
    ///
    /// # Errors
    /// Fails if the OS refuses to create the thread.
    pub fn start(
        tree: Arc<Mutex<NodeTree>>,
        interval: Duration,
        policy: SweepPolicy,
    ) -> std::io::Result<Self> {
        let shutdown = Arc::new(Shutdown {
            stopped: Mutex::new(false),
            wake: Condvar::new(),
        });

        let signal = Arc::clone(&shutdown);
        let handle = thread::Builder::new()
            .name("fuzzytrie-sweeper".into())
            .spawn(move || run(&tree, &signal, interval, &policy))?;

        Ok(Self {
            shutdown,
            handle: Some(handle),
        })
    }

    /// Signal the thread and join it. Idempotent.
    pub fn stop(&mut self) {
        *self.shutdown.stopped.lock() = true;
        self.shutdown.wake.notify_all();

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("eviction sweeper thread panicked");
            }
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for EvictionScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(tree: &Mutex<NodeTree>, shutdown: &Shutdown, interval: Duration, policy: &SweepPolicy) {
    loop {
        let deadline = Instant::now() + interval;
        {
            let mut stopped = shutdown.stopped.lock();
            while !*stopped && !shutdown.wake.wait_until(&mut stopped, deadline).timed_out() {}
            if *stopped {
                return;
            }
        }

        let mut tree = tree.lock();
        info!(resident = tree.resident_nodes(), "eviction sweep started");
        match sweep(&mut tree, policy) {
            Ok(report) => info!(
                candidates = report.candidates,
                evicted = report.evicted,
                nodes_paged_out = report.nodes_paged_out,
                resident = report.resident_after,
                "eviction sweep finished"
            ),
            Err(e) => error!(error = %e, "eviction sweep failed"),
        }
    }
}

//! Cancellation sweep over a snapshot of workflow runs.
//!
//! One sweep keeps the most recently created active run per branch and
//! cancels every older active run on the same branch. Completed runs are
//! exempt both ways: they are never cancelled and never shadow a sibling.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::github::{RunRegistry, WorkflowRun};

/// Outcome counters of one sweep.
///
/// A sweep as a whole always succeeds; individual cancel failures are
/// logged, counted here, and never escalated to the webhook caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Cancel requests the upstream accepted
    pub cancelled: usize,
    /// Cancel requests that failed
    pub failed: usize,
}

/// Cancel every superseded run in `runs`.
///
/// Runs are ordered by `created_at` descending (stable, so listing order
/// breaks ties) and scanned once. The first active run seen for a branch
/// is the newest and survives; every later active run on that branch is a
/// duplicate and gets a cancel request.
///
/// Cancels are issued sequentially in scan order, which keeps the set of
/// attempted cancellations deterministic for a given snapshot.
pub async fn cancel_superseded(registry: &dyn RunRegistry, mut runs: Vec<WorkflowRun>) -> SweepStats {
    runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut seen_branches: HashSet<&str> = HashSet::new();
    let mut stats = SweepStats::default();

    for run in &runs {
        if run.is_completed() {
            continue;
        }

        if seen_branches.contains(run.head_branch.as_str()) {
            match registry.cancel_run(run).await {
                Ok(()) => {
                    info!(
                        run_id = run.id,
                        branch = %run.head_branch,
                        created_at = %run.created_at,
                        "run_cancelled"
                    );
                    stats.cancelled += 1;
                }
                Err(e) => {
                    warn!(
                        run_id = run.id,
                        branch = %run.head_branch,
                        error = %e,
                        "run_cancel_failed"
                    );
                    stats.failed += 1;
                }
            }
        } else {
            seen_branches.insert(run.head_branch.as_str());
        }
    }

    info!(
        runs = runs.len(),
        cancelled = stats.cancelled,
        failed = stats.failed,
        "sweep_complete"
    );

    stats
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use crate::github::RegistryError;

    use super::*;

    /// Registry double that records which runs were cancelled.
    struct MockRegistry {
        cancelled_ids: Mutex<Vec<i64>>,
        fail_ids: Vec<i64>,
    }

    impl MockRegistry {
        fn new() -> Self {
            Self {
                cancelled_ids: Mutex::new(Vec::new()),
                fail_ids: Vec::new(),
            }
        }

        fn failing_on(ids: &[i64]) -> Self {
            Self {
                cancelled_ids: Mutex::new(Vec::new()),
                fail_ids: ids.to_vec(),
            }
        }

        fn cancelled(&self) -> Vec<i64> {
            self.cancelled_ids.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RunRegistry for MockRegistry {
        async fn list_runs(&self) -> Result<Vec<WorkflowRun>, RegistryError> {
            Ok(Vec::new())
        }

        async fn cancel_run(&self, run: &WorkflowRun) -> Result<(), RegistryError> {
            if self.fail_ids.contains(&run.id) {
                return Err(RegistryError::BadStatus {
                    status: 500,
                    url: run.cancel_url.clone(),
                    body: "boom".to_string(),
                });
            }
            self.cancelled_ids.lock().unwrap().push(run.id);
            Ok(())
        }
    }

    fn run(id: i64, branch: &str, status: &str, millis: u32) -> WorkflowRun {
        WorkflowRun {
            id,
            created_at: Utc
                .with_ymd_and_hms(2020, 2, 29, 0, 0, 0)
                .unwrap()
                .checked_add_signed(chrono::Duration::milliseconds(millis as i64))
                .unwrap(),
            head_branch: branch.to_string(),
            status: status.to_string(),
            cancel_url: format!("https://api.github.com/repos/org/repo/actions/runs/{id}/cancel"),
        }
    }

    #[tokio::test]
    async fn cancels_the_older_of_two_runs_on_one_branch() {
        let registry = MockRegistry::new();
        let runs = vec![
            run(1, "master", "running", 0),
            run(2, "master", "running", 1),
        ];

        let stats = cancel_superseded(&registry, runs).await;

        assert_eq!(registry.cancelled(), vec![1]);
        assert_eq!(stats, SweepStats { cancelled: 1, failed: 0 });
    }

    #[tokio::test]
    async fn never_cancels_completed_runs() {
        let registry = MockRegistry::new();
        let runs = vec![
            run(1, "master", "completed", 0),
            run(2, "master", "completed", 1),
        ];

        let stats = cancel_superseded(&registry, runs).await;

        assert!(registry.cancelled().is_empty());
        assert_eq!(stats, SweepStats::default());
    }

    #[tokio::test]
    async fn completed_run_does_not_shadow_active_siblings() {
        // The newest run on the branch is completed; the two active runs
        // below it still dedupe against each other only.
        let registry = MockRegistry::new();
        let runs = vec![
            run(1, "master", "running", 0),
            run(2, "master", "running", 1),
            run(3, "master", "completed", 2),
        ];

        let stats = cancel_superseded(&registry, runs).await;

        assert_eq!(registry.cancelled(), vec![1]);
        assert_eq!(stats.cancelled, 1);
    }

    #[tokio::test]
    async fn leaves_distinct_branches_alone() {
        let registry = MockRegistry::new();
        let runs = vec![
            run(1, "master", "running", 0),
            run(2, "feature", "running", 1),
        ];

        let stats = cancel_superseded(&registry, runs).await;

        assert!(registry.cancelled().is_empty());
        assert_eq!(stats, SweepStats::default());
    }

    #[tokio::test]
    async fn keeps_only_the_newest_run_regardless_of_input_order() {
        let registry = MockRegistry::new();
        let runs = vec![
            run(1, "master", "running", 2),
            run(2, "master", "running", 3),
            run(3, "master", "running", 1),
        ];

        let stats = cancel_superseded(&registry, runs).await;

        // Run 2 is newest and survives; the rest go newest-first.
        assert_eq!(registry.cancelled(), vec![1, 3]);
        assert_eq!(stats.cancelled, 2);
    }

    #[tokio::test]
    async fn sweeps_each_branch_independently() {
        let registry = MockRegistry::new();
        let runs = vec![
            run(1, "master", "running", 1),
            run(2, "master", "running", 2),
            run(3, "feature", "running", 4),
            run(4, "feature", "running", 3),
        ];

        let stats = cancel_superseded(&registry, runs).await;

        assert_eq!(registry.cancelled(), vec![4, 1]);
        assert_eq!(stats.cancelled, 2);
    }

    #[tokio::test]
    async fn cancel_failure_does_not_stop_the_sweep() {
        let registry = MockRegistry::failing_on(&[2]);
        let runs = vec![
            run(1, "master", "running", 0),
            run(2, "master", "running", 1),
            run(3, "master", "running", 2),
        ];

        let stats = cancel_superseded(&registry, runs).await;

        assert_eq!(registry.cancelled(), vec![1]);
        assert_eq!(stats, SweepStats { cancelled: 1, failed: 1 });
    }

    #[tokio::test]
    async fn empty_snapshot_is_a_noop() {
        let registry = MockRegistry::new();

        let stats = cancel_superseded(&registry, Vec::new()).await;

        assert!(registry.cancelled().is_empty());
        assert_eq!(stats, SweepStats::default());
    }

    #[tokio::test]
    async fn single_run_is_never_cancelled() {
        let registry = MockRegistry::new();

        let stats = cancel_superseded(&registry, vec![run(1, "master", "queued", 0)]).await;

        assert!(registry.cancelled().is_empty());
        assert_eq!(stats, SweepStats::default());
    }

    #[tokio::test]
    async fn repeated_sweep_cancels_the_same_set() {
        let runs = vec![
            run(1, "master", "running", 0),
            run(2, "master", "running", 1),
        ];

        let first = MockRegistry::new();
        cancel_superseded(&first, runs.clone()).await;

        let second = MockRegistry::new();
        cancel_superseded(&second, runs).await;

        assert_eq!(first.cancelled(), second.cancelled());
    }
}

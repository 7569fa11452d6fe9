//! Position write-back.
//!
//! Every planned node goes through fetch, patch and submit against the
//! remote service, one node at a time. The patch is built from the fresh
//! fetch so the concurrency token is current and no other field of the
//! component is touched. A failing node is recorded and skipped; it never
//! stops the remaining nodes.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use log::{debug, error, info, warn};

use flowtidy_core::{
    geometry::Point,
    identity::ComponentIdentity,
    service::{FlowService, PositionPatch, ServiceError},
};

use crate::{
    config::AppConfig,
    plan::{LayoutPlan, PlannedPosition},
};

/// Tuning knobs of a reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    conflict_retries: u32,
    deadline: Option<Duration>,
    client_id: Option<String>,
}

impl ReconcileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            conflict_retries: config.reconcile().conflict_retries(),
            deadline: config.reconcile().deadline(),
            client_id: config.client().client_id().map(str::to_string),
        }
    }

    /// Number of fresh fetch-patch-submit cycles after a revision conflict.
    pub fn with_conflict_retries(mut self, retries: u32) -> Self {
        self.conflict_retries = retries;
        self
    }

    /// Stop issuing requests once this much time has passed since the run began.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Client id attached to submitted revisions that carry none.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn conflict_retries(&self) -> u32 {
        self.conflict_retries
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }
}

/// Shared cancellation signal.
///
/// Clones observe the same flag. Once raised, the reconciler issues no
/// further requests; updates already submitted stay committed.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Terminal state of one node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutcome {
    /// The update carrying this native position was accepted.
    Submitted(Point),
    /// The current representation could not be fetched.
    FetchFailed(ServiceError),
    /// The update was rejected.
    Failed(ServiceError),
    /// Never attempted because the run was cancelled or ran out of time.
    Cancelled,
}

impl NodeOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, NodeOutcome::Submitted(_))
    }

    /// Returns the service error of a failed node.
    pub fn error(&self) -> Option<&ServiceError> {
        match self {
            NodeOutcome::FetchFailed(err) | NodeOutcome::Failed(err) => Some(err),
            NodeOutcome::Submitted(_) | NodeOutcome::Cancelled => None,
        }
    }
}

/// Outcome of every node of a plan, in plan order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileReport {
    group_id: String,
    outcomes: Vec<(ComponentIdentity, NodeOutcome)>,
}

impl ReconcileReport {
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn outcomes(&self) -> impl Iterator<Item = (&ComponentIdentity, &NodeOutcome)> {
        self.outcomes.iter().map(|(identity, outcome)| (identity, outcome))
    }

    pub fn outcome(&self, identity: &ComponentIdentity) -> Option<&NodeOutcome> {
        self.outcomes
            .iter()
            .find(|(candidate, _)| candidate == identity)
            .map(|(_, outcome)| outcome)
    }

    /// Returns `true` when every node was submitted.
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|(_, outcome)| outcome.is_submitted())
    }

    /// Iterate over the nodes that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&ComponentIdentity, &ServiceError)> {
        self.outcomes
            .iter()
            .filter_map(|(identity, outcome)| outcome.error().map(|err| (identity, err)))
    }

    pub fn submitted(&self) -> usize {
        self.count(NodeOutcome::is_submitted)
    }

    pub fn cancelled(&self) -> usize {
        self.count(|outcome| matches!(outcome, NodeOutcome::Cancelled))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn count(&self, predicate: impl Fn(&NodeOutcome) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| predicate(outcome))
            .count()
    }
}

/// Writes a [`LayoutPlan`] back through a [`FlowService`].
pub struct Reconciler<'s, S: FlowService + ?Sized> {
    service: &'s S,
    options: ReconcileOptions,
}

impl<'s, S: FlowService + ?Sized> Reconciler<'s, S> {
    pub fn new(service: &'s S, options: ReconcileOptions) -> Self {
        Self { service, options }
    }

    /// Reconcile every node of `plan`, recording one outcome per node.
    pub fn reconcile(&self, plan: &LayoutPlan, cancel: &CancelFlag) -> ReconcileReport {
        let started = Instant::now();
        let mut outcomes = Vec::with_capacity(plan.len());
        let mut stopped = false;

        for planned in plan {
            if !stopped && self.should_stop(started, cancel) {
                warn!(
                    group_id = plan.group_id(),
                    remaining = plan.len() - outcomes.len();
                    "Reconciliation stopped before completion"
                );
                stopped = true;
            }

            let outcome = if stopped {
                NodeOutcome::Cancelled
            } else {
                self.reconcile_node(planned, started, cancel)
            };

            if let Some(err) = outcome.error() {
                error!(
                    id = planned.identity().id(),
                    kind = planned.identity().kind().as_str(),
                    err:% = err;
                    "Failed to reposition component"
                );
            }
            outcomes.push((planned.identity().clone(), outcome));
        }

        let report = ReconcileReport {
            group_id: plan.group_id().to_string(),
            outcomes,
        };
        info!(
            group_id = report.group_id(),
            submitted = report.submitted(),
            failed = report.failures().count(),
            cancelled = report.cancelled();
            "Reconciliation finished"
        );
        report
    }

    fn reconcile_node(
        &self,
        planned: &PlannedPosition,
        started: Instant,
        cancel: &CancelFlag,
    ) -> NodeOutcome {
        let identity = planned.identity();
        let position = planned.position();
        let mut conflicts = 0;

        loop {
            let fetched = match self.service.component(identity) {
                Ok(fetched) => fetched,
                Err(err) => return NodeOutcome::FetchFailed(err),
            };

            let patch = PositionPatch::from_fetched(&fetched, position, self.options.client_id());
            debug!(
                id = identity.id(),
                kind = identity.kind().as_str(),
                name = fetched.name().unwrap_or_default(),
                version = patch.revision().version(),
                from:? = fetched.position(),
                to:? = position;
                "Submitting position"
            );

            match self.service.update_component(&patch) {
                Ok(()) => return NodeOutcome::Submitted(position),
                Err(err)
                    if err.is_conflict()
                        && conflicts < self.options.conflict_retries
                        && !self.should_stop(started, cancel) =>
                {
                    conflicts += 1;
                    warn!(
                        id = identity.id(),
                        kind = identity.kind().as_str(),
                        attempt = conflicts;
                        "Revision conflict, retrying with a fresh fetch"
                    );
                }
                Err(err) => return NodeOutcome::Failed(err),
            }
        }
    }

    fn should_stop(&self, started: Instant, cancel: &CancelFlag) -> bool {
        cancel.is_cancelled()
            || self
                .options
                .deadline
                .is_some_and(|deadline| started.elapsed() >= deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();

        assert!(!flag.is_cancelled());
        clone.cancel();
        assert!(flag.is_cancelled());
    }

    #[test]
    fn test_options_from_config() {
        let mut config = AppConfig::default();
        config.reconcile_mut().set_conflict_retries(3);

        let options = ReconcileOptions::from_config(&config);
        assert_eq!(options.conflict_retries(), 3);
        assert_eq!(options.deadline(), None);
    }

    #[test]
    fn test_outcome_errors() {
        let err = ServiceError::Timeout {
            url: "u".to_string(),
        };

        assert_eq!(NodeOutcome::FetchFailed(err.clone()).error(), Some(&err));
        assert_eq!(NodeOutcome::Failed(err.clone()).error(), Some(&err));
        assert_eq!(NodeOutcome::Cancelled.error(), None);
        assert!(NodeOutcome::Submitted(Point::new(0.0, 0.0)).is_submitted());
    }
}

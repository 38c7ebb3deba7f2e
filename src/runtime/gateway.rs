use anyhow::Result;
use serde::Serialize;
use tracing::{Instrument, Span, debug, info_span, trace};
use crate::graph::compile::ProcessGraph;
use crate::runtime::instance::{PENDING_STATES, TaskInstance};
use crate::runtime::reachability::can_reach;
use crate::runtime::store::{InstanceStore, InstanceSnapshot};

/// Outcome of one firing attempt. When `can_fire` is false, `blockers`
/// lists the pending instances that could still deliver a token to the
/// gateway; callers may log or report them for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct FiringDecision {
    pub can_fire: bool,
    pub blockers: Vec<TaskInstance>,
}

/// 网关触发策略接口
///
/// A strategy classifies one candidate instance as a genuine blocker or
/// not. The shared scaffolding around it — the store query, the
/// thread/workflow scope filter, the force flag — lives in
/// [`evaluate_firing`] and is the same for every converging gateway.
pub trait GatewayFiringStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Can `candidate` still deliver a token to the gateway? Called only
    /// for candidates that already passed the scope filter.
    fn blocks(
        &self,
        graph: &ProcessGraph,
        gateway: &TaskInstance,
        candidate: &TaskInstance,
        snapshot: &InstanceSnapshot,
    ) -> bool;
}

/// Decide whether a converging gateway may fire now.
///
/// Queries the store once for a snapshot of the gateway's workflow
/// instance, retains pending instances on the same thread-of-control and
/// workflow that are not activations of the gateway's own node, and asks
/// the strategy to classify each survivor. Read-only over the store.
///
/// `force` bypasses the wait condition (external completion/cancellation
/// paths); the blocker list is computed either way.
pub async fn evaluate_firing(
    strategy: &dyn GatewayFiringStrategy,
    graph: &ProcessGraph,
    store: &dyn InstanceStore,
    gateway: &TaskInstance,
    force: bool,
) -> Result<FiringDecision> {
    let snapshot = store.snapshot(gateway.workflow_id).await?;

    let mut blockers = Vec::new();
    for candidate in snapshot.in_states(&PENDING_STATES) {
        if candidate.thread_id != gateway.thread_id {
            continue;
        }
        if candidate.workflow_id != gateway.workflow_id {
            continue;
        }
        if candidate.node == gateway.node {
            // The gateway never blocks on activations of itself.
            continue;
        }
        if strategy.blocks(graph, gateway, candidate, &snapshot) {
            blockers.push(candidate.clone());
        }
    }

    debug!(
        strategy = strategy.name(),
        gateway = gateway.node,
        blockers = blockers.len(),
        force,
        "firing decision"
    );

    Ok(FiringDecision {
        can_fire: force || blockers.is_empty(),
        blockers,
    })
}

/// Inclusive (OR) join: a candidate blocks the gateway if its node can
/// still reach the gateway's node without re-entering the candidate's
/// own ancestor lineage.
pub struct InclusiveJoinStrategy {
    span: Span,
}

impl InclusiveJoinStrategy {
    pub fn new() -> Self {
        Self::with_span(info_span!("inclusive_join"))
    }

    /// Use a caller-provided span, e.g. one carrying workflow fields.
    pub fn with_span(span: Span) -> Self {
        Self { span }
    }

    /// Full decision for this gateway's current activation attempt.
    pub async fn decide(
        &self,
        graph: &ProcessGraph,
        store: &dyn InstanceStore,
        gateway: &TaskInstance,
        force: bool,
    ) -> Result<FiringDecision> {
        evaluate_firing(self, graph, store, gateway, force)
            .instrument(self.span.clone())
            .await
    }
}

impl GatewayFiringStrategy for InclusiveJoinStrategy {
    fn name(&self) -> &str {
        "inclusive_join"
    }

    fn blocks(
        &self,
        graph: &ProcessGraph,
        gateway: &TaskInstance,
        candidate: &TaskInstance,
        snapshot: &InstanceSnapshot,
    ) -> bool {
        let blocking = can_reach(graph, gateway.node, candidate, snapshot);
        if blocking {
            trace!(candidate = %candidate.id, node = candidate.node, "pending instance can still reach gateway");
        }
        blocking
    }
}

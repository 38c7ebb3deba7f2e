use std::collections::{HashSet, VecDeque};
use tracing::trace;
use crate::graph::compile::{NodeId, ProcessGraph};
use crate::runtime::instance::TaskInstance;
use crate::runtime::store::InstanceSnapshot;

/// Can a token starting at `from`'s definition node still reach `target`
/// by following successor edges?
///
/// The search is not allowed to travel back through `from`'s own
/// execution history: before searching, the instance's ancestor chain is
/// pre-marked as visited. Without that, a loop-back edge would make every
/// node reachable from every other node and every pending sibling would
/// look like a blocker forever.
///
/// The ancestor walk stops before marking `target` itself — a gateway
/// sitting in its own ancestor lineage on a loop must stay reachable. It
/// also stops on a repeated node, so a malformed (cyclic) parent chain
/// cannot hang the walk.
///
/// Bounded by the number of distinct nodes in the graph; terminates on
/// arbitrarily cyclic graphs.
pub fn can_reach(
    graph: &ProcessGraph,
    target: NodeId,
    from: &TaskInstance,
    snapshot: &InstanceSnapshot,
) -> bool {
    let mut visited: HashSet<NodeId> = HashSet::new();

    for ancestor in snapshot.ancestors(from) {
        if ancestor.node == target || !visited.insert(ancestor.node) {
            break;
        }
    }

    let mut queue = VecDeque::new();
    queue.push_back(from.node);
    while let Some(node) = queue.pop_front() {
        if node == target {
            trace!(from = from.node, target, "target reachable");
            return true;
        }
        for &next in graph.outputs(node) {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}

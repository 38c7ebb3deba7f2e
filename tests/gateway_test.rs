use flowgate::graph::builder::GraphBuilder;
use flowgate::graph::compile::ProcessGraph;
use flowgate::runtime::gateway::InclusiveJoinStrategy;
use flowgate::runtime::instance::{TaskInstance, TaskState};
use flowgate::runtime::store::{InMemoryInstanceStore, InstanceStore};
use uuid::Uuid;

/// Start -> {X, Y} -> Gate -> End
fn diamond_graph() -> ProcessGraph {
    GraphBuilder::new("diamond")
        .start("Start")
        .task("X")
        .task("Y")
        .gateway("Gate")
        .end("End")
        .connect("Start", "X")
        .connect("Start", "Y")
        .connect("X", "Gate")
        .connect("Y", "Gate")
        .connect("Gate", "End")
        .compile()
        .expect("Compilation failed")
}

/// X's token has arrived, Y is still waiting: the gateway must wait,
/// and must name the Y instance as the blocker.
#[tokio::test]
async fn test_diamond_waits_for_pending_branch() {
    let graph = diamond_graph();
    let store = InMemoryInstanceStore::new();
    let workflow_id = Uuid::new_v4();

    let root = TaskInstance::root(workflow_id, graph.find("Start").unwrap())
        .with_state(TaskState::Completed);
    let x = root.child(graph.find("X").unwrap()).with_state(TaskState::Completed);
    let y = root.child(graph.find("Y").unwrap()).with_state(TaskState::Waiting);
    let gate = x.child(graph.find("Gate").unwrap()).with_state(TaskState::Waiting);

    for instance in [&root, &x, &y, &gate] {
        store.insert((*instance).clone()).await.expect("insert failed");
    }

    let strategy = InclusiveJoinStrategy::new();
    let decision = strategy.decide(&graph, &store, &gate, false).await.expect("decide failed");

    assert!(!decision.can_fire, "Gateway must wait while Y is pending");
    assert_eq!(decision.blockers.len(), 1);
    assert_eq!(decision.blockers[0].id, y.id);

    // Y 完成后网关即可触发
    store.set_state(workflow_id, y.id, TaskState::Completed).await.expect("set_state failed");
    let decision = strategy.decide(&graph, &store, &gate, false).await.expect("decide failed");
    assert!(decision.can_fire);
    assert!(decision.blockers.is_empty());
}

#[tokio::test]
async fn test_empty_store_fires() {
    let graph = diamond_graph();
    let store = InMemoryInstanceStore::new();

    let gate = TaskInstance::root(Uuid::new_v4(), graph.find("Gate").unwrap());
    let decision = InclusiveJoinStrategy::new()
        .decide(&graph, &store, &gate, false)
        .await
        .expect("decide failed");

    assert!(decision.can_fire);
    assert!(decision.blockers.is_empty());
}

#[tokio::test]
async fn test_force_override_keeps_blocker_list() {
    let graph = diamond_graph();
    let store = InMemoryInstanceStore::new();
    let workflow_id = Uuid::new_v4();

    let root = TaskInstance::root(workflow_id, graph.find("Start").unwrap())
        .with_state(TaskState::Completed);
    let y = root.child(graph.find("Y").unwrap()).with_state(TaskState::Waiting);
    let gate = root.child(graph.find("Gate").unwrap()).with_state(TaskState::Waiting);

    for instance in [&root, &y, &gate] {
        store.insert((*instance).clone()).await.expect("insert failed");
    }

    let decision = InclusiveJoinStrategy::new()
        .decide(&graph, &store, &gate, true)
        .await
        .expect("decide failed");

    // Forced: fires anyway, but the blocker list is the unforced one.
    assert!(decision.can_fire);
    assert_eq!(decision.blockers.len(), 1);
    assert_eq!(decision.blockers[0].id, y.id);
}

#[tokio::test]
async fn test_other_thread_of_control_never_blocks() {
    let graph = diamond_graph();
    let store = InMemoryInstanceStore::new();
    let workflow_id = Uuid::new_v4();

    let root = TaskInstance::root(workflow_id, graph.find("Start").unwrap())
        .with_state(TaskState::Completed);
    // Y is pending but belongs to a different thread-of-control.
    let y = root.child_on_new_thread(graph.find("Y").unwrap()).with_state(TaskState::Waiting);
    let gate = root.child(graph.find("Gate").unwrap()).with_state(TaskState::Waiting);

    for instance in [&root, &y, &gate] {
        store.insert((*instance).clone()).await.expect("insert failed");
    }

    let decision = InclusiveJoinStrategy::new()
        .decide(&graph, &store, &gate, false)
        .await
        .expect("decide failed");

    assert!(decision.can_fire, "Other threads must not block the gateway");
    assert!(decision.blockers.is_empty());
}

#[tokio::test]
async fn test_other_workflow_instance_never_blocks() {
    let graph = diamond_graph();
    let store = InMemoryInstanceStore::new();
    let workflow_id = Uuid::new_v4();

    let root = TaskInstance::root(workflow_id, graph.find("Start").unwrap())
        .with_state(TaskState::Completed);
    let gate = root.child(graph.find("Gate").unwrap()).with_state(TaskState::Waiting);

    // Same node, same thread id, but a different workflow instance.
    let foreign = TaskInstance {
        workflow_id: Uuid::new_v4(),
        ..root.child(graph.find("Y").unwrap()).with_state(TaskState::Waiting)
    };

    for instance in [&root, &gate, &foreign] {
        store.insert((*instance).clone()).await.expect("insert failed");
    }

    let decision = InclusiveJoinStrategy::new()
        .decide(&graph, &store, &gate, false)
        .await
        .expect("decide failed");

    assert!(decision.can_fire, "Other workflow instances must not block the gateway");
    assert!(decision.blockers.is_empty());
}

#[tokio::test]
async fn test_gateway_never_blocks_on_its_own_node() {
    let graph = diamond_graph();
    let store = InMemoryInstanceStore::new();
    let workflow_id = Uuid::new_v4();

    let root = TaskInstance::root(workflow_id, graph.find("Start").unwrap())
        .with_state(TaskState::Completed);
    let gate = root.child(graph.find("Gate").unwrap()).with_state(TaskState::Waiting);
    // A second activation of the same gateway node, also pending.
    let other_activation = root.child(graph.find("Gate").unwrap()).with_state(TaskState::Ready);

    for instance in [&root, &gate, &other_activation] {
        store.insert((*instance).clone()).await.expect("insert failed");
    }

    let decision = InclusiveJoinStrategy::new()
        .decide(&graph, &store, &gate, false)
        .await
        .expect("decide failed");

    assert!(decision.can_fire);
    assert!(decision.blockers.is_empty());
}

#[tokio::test]
async fn test_looped_back_instance_does_not_block() {
    // Start -> A -> B -> A (loop), B -> C (the gateway). The instance at
    // A came through B, so its only route to C re-enters its own lineage.
    let graph = GraphBuilder::new("loop")
        .start("Start")
        .task("A")
        .task("B")
        .gateway("C")
        .connect("Start", "A")
        .connect("A", "B")
        .connect("B", "A")
        .connect("B", "C")
        .compile()
        .expect("Compilation failed");

    let store = InMemoryInstanceStore::new();
    let workflow_id = Uuid::new_v4();

    let b = TaskInstance::root(workflow_id, graph.find("B").unwrap())
        .with_state(TaskState::Completed);
    let a = b.child(graph.find("A").unwrap()).with_state(TaskState::Waiting);
    let gate = b.child(graph.find("C").unwrap()).with_state(TaskState::Waiting);

    for instance in [&b, &a, &gate] {
        store.insert((*instance).clone()).await.expect("insert failed");
    }

    let decision = InclusiveJoinStrategy::new()
        .decide(&graph, &store, &gate, false)
        .await
        .expect("decide failed");

    assert!(decision.can_fire, "Looped-back instance must not block the gateway");
    assert!(decision.blockers.is_empty());
}

#[tokio::test]
async fn test_independent_path_still_blocks() {
    // Same loop, plus A -> D -> C: a genuine unresolved path to the
    // gateway that avoids the ancestor lineage.
    let graph = GraphBuilder::new("loop-with-bypass")
        .start("Start")
        .task("A")
        .task("B")
        .task("D")
        .gateway("C")
        .connect("Start", "A")
        .connect("A", "B")
        .connect("B", "A")
        .connect("B", "C")
        .connect("A", "D")
        .connect("D", "C")
        .compile()
        .expect("Compilation failed");

    let store = InMemoryInstanceStore::new();
    let workflow_id = Uuid::new_v4();

    let b = TaskInstance::root(workflow_id, graph.find("B").unwrap())
        .with_state(TaskState::Completed);
    let a = b.child(graph.find("A").unwrap()).with_state(TaskState::Waiting);
    let gate = b.child(graph.find("C").unwrap()).with_state(TaskState::Waiting);

    for instance in [&b, &a, &gate] {
        store.insert((*instance).clone()).await.expect("insert failed");
    }

    let decision = InclusiveJoinStrategy::new()
        .decide(&graph, &store, &gate, false)
        .await
        .expect("decide failed");

    assert!(!decision.can_fire);
    assert_eq!(decision.blockers.len(), 1);
    assert_eq!(decision.blockers[0].id, a.id);
}

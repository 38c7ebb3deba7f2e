use async_trait::async_trait;
use anyhow::{Result, anyhow};
use dashmap::DashMap;
use std::collections::HashMap;
use uuid::Uuid;
use crate::runtime::instance::{InstanceId, TaskInstance, TaskState};

// --- Interfaces ---

/// 任务实例存储接口
///
/// The store owns all task instances; decision code only reads snapshots
/// and never retains them beyond one call. Callers must serialize
/// mutation against decision calls for a given workflow instance — the
/// snapshot is only consistent under that rule.
#[async_trait]
pub trait InstanceStore: Send + Sync {
    async fn insert(&self, instance: TaskInstance) -> Result<()>;
    async fn set_state(&self, workflow_id: Uuid, id: InstanceId, state: TaskState) -> Result<()>;
    async fn get(&self, workflow_id: Uuid, id: InstanceId) -> Result<Option<TaskInstance>>;
    /// One consistent view of a workflow instance's task tree, including
    /// non-pending instances (the ancestor walk needs completed parents).
    async fn snapshot(&self, workflow_id: Uuid) -> Result<InstanceSnapshot>;

    /// All instances of one workflow currently in any of `states`.
    async fn query_instances(&self, workflow_id: Uuid, states: &[TaskState]) -> Result<Vec<TaskInstance>> {
        let snapshot = self.snapshot(workflow_id).await?;
        Ok(snapshot.in_states(states).cloned().collect())
    }
}

// --- Snapshot ---

/// A point-in-time copy of one workflow's task instances, addressable by
/// instance id so parent chains can be walked without touching the store.
#[derive(Debug, Clone, Default)]
pub struct InstanceSnapshot {
    instances: HashMap<InstanceId, TaskInstance>,
}

impl InstanceSnapshot {
    pub fn new(instances: impl IntoIterator<Item = TaskInstance>) -> Self {
        Self {
            instances: instances.into_iter().map(|i| (i.id, i)).collect(),
        }
    }

    pub fn get(&self, id: InstanceId) -> Option<&TaskInstance> {
        self.instances.get(&id)
    }

    pub fn in_states<'a>(&'a self, states: &'a [TaskState]) -> impl Iterator<Item = &'a TaskInstance> {
        self.instances.values().filter(move |i| states.contains(&i.state))
    }

    /// Walk the parent chain of `instance`, nearest ancestor first. Stops
    /// at the root or at a parent missing from this snapshot. The chain
    /// is expected to be a tree; cycle protection is the consumer's job.
    pub fn ancestors<'a>(&'a self, instance: &TaskInstance) -> Ancestors<'a> {
        Ancestors {
            snapshot: self,
            next: instance.parent,
        }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

pub struct Ancestors<'a> {
    snapshot: &'a InstanceSnapshot,
    next: Option<InstanceId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a TaskInstance;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        let instance = self.snapshot.get(id)?;
        self.next = instance.parent;
        Some(instance)
    }
}

// --- In-Memory Implementation ---

pub struct InMemoryInstanceStore {
    // Map<WorkflowId, Map<InstanceId, TaskInstance>>
    instances: DashMap<Uuid, DashMap<InstanceId, TaskInstance>>,
}

impl InMemoryInstanceStore {
    pub fn new() -> Self {
        Self {
            instances: DashMap::new(),
        }
    }
}

#[async_trait]
impl InstanceStore for InMemoryInstanceStore {
    async fn insert(&self, instance: TaskInstance) -> Result<()> {
        let workflow = self.instances.entry(instance.workflow_id).or_insert_with(DashMap::new);
        workflow.insert(instance.id, instance);
        Ok(())
    }

    async fn set_state(&self, workflow_id: Uuid, id: InstanceId, state: TaskState) -> Result<()> {
        let workflow = self.instances.get(&workflow_id)
            .ok_or_else(|| anyhow!("Workflow not found: {}", workflow_id))?;
        let mut instance = workflow.get_mut(&id)
            .ok_or_else(|| anyhow!("Instance not found: {}", id))?;
        instance.state = state;
        Ok(())
    }

    async fn get(&self, workflow_id: Uuid, id: InstanceId) -> Result<Option<TaskInstance>> {
        if let Some(workflow) = self.instances.get(&workflow_id) {
            Ok(workflow.get(&id).map(|i| i.value().clone()))
        } else {
            Ok(None)
        }
    }

    async fn snapshot(&self, workflow_id: Uuid) -> Result<InstanceSnapshot> {
        if let Some(workflow) = self.instances.get(&workflow_id) {
            Ok(InstanceSnapshot::new(workflow.iter().map(|i| i.value().clone())))
        } else {
            Ok(InstanceSnapshot::default())
        }
    }
}

use serde::{Serialize, Deserialize};
use uuid::Uuid;
use crate::graph::compile::NodeId;

pub type InstanceId = Uuid;

/// 任务实例的生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Future,
    Ready,
    Waiting,
    Completed,
    Cancelled,
}

/// The two states a gateway decision queries: instances that still hold
/// or may still produce a token.
pub const PENDING_STATES: [TaskState; 2] = [TaskState::Ready, TaskState::Waiting];

impl TaskState {
    pub fn is_pending(self) -> bool {
        matches!(self, TaskState::Ready | TaskState::Waiting)
    }
}

/// 任务实例：某个定义节点在一条控制路径上的一次执行
///
/// The parent chain forms a tree rooted at the workflow's start and is
/// walked upward to identify ancestors. It must not be confused with the
/// (possibly cyclic) successor graph of definition nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInstance {
    pub id: InstanceId,
    /// 对应的流程定义节点
    pub node: NodeId,
    /// 父实例，仅用于向上导航，不代表所有权
    pub parent: Option<InstanceId>,
    /// 标识所属的并行控制线
    pub thread_id: Uuid,
    /// 所属的工作流实例 (子流程各有自己的实例)
    pub workflow_id: Uuid,
    pub state: TaskState,
}

impl TaskInstance {
    /// Root instance of a workflow, on a fresh thread-of-control.
    pub fn root(workflow_id: Uuid, node: NodeId) -> Self {
        Self {
            id: Uuid::new_v4(),
            node,
            parent: None,
            thread_id: Uuid::new_v4(),
            workflow_id,
            state: TaskState::Ready,
        }
    }

    /// Spawn a child on an outgoing edge. Inherits the thread-of-control
    /// and workflow scope; starts out Future until a token reaches it.
    pub fn child(&self, node: NodeId) -> Self {
        Self {
            id: Uuid::new_v4(),
            node,
            parent: Some(self.id),
            thread_id: self.thread_id,
            workflow_id: self.workflow_id,
            state: TaskState::Future,
        }
    }

    /// Like [`TaskInstance::child`], but on a fresh thread-of-control
    /// (used by parallel splits).
    pub fn child_on_new_thread(&self, node: NodeId) -> Self {
        Self {
            thread_id: Uuid::new_v4(),
            ..self.child(node)
        }
    }

    pub fn with_state(mut self, state: TaskState) -> Self {
        self.state = state;
        self
    }
}

use crate::graph::{ProcessDefinition, NodeKind};
use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use thiserror::Error;

pub type NodeId = usize;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Duplicate node ID: {0}")]
    DuplicateNode(String),
    #[error("Edge source not found: {0}")]
    UnknownSource(String),
    #[error("Edge target not found: {0}")]
    UnknownTarget(String),
    #[error("Start node not found")]
    MissingStart,
}

/// 编译后的流程图 (不可变，按索引寻址，可序列化)
///
/// The successor graph is fixed for the lifetime of a running workflow
/// instance; only task instances come and go during execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessGraph {
    pub id: String,
    pub name: String,
    nodes: Vec<ProcessNode>,
    start: NodeId,
}

/// 编译后的节点：标签 + 类型 + 后继边
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessNode {
    pub label: String,
    pub kind: NodeKind,
    pub outputs: Vec<NodeId>,
}

pub struct GraphCompiler {
    id_map: HashMap<String, NodeId>,
}

impl GraphCompiler {
    pub fn new() -> Self {
        Self {
            id_map: HashMap::new(),
        }
    }

    pub fn compile(mut self, definition: ProcessDefinition) -> Result<ProcessGraph, CompileError> {
        // 1. Pass 1: Indexing
        for (idx, node) in definition.nodes.iter().enumerate() {
            if self.id_map.insert(node.id.clone(), idx).is_some() {
                return Err(CompileError::DuplicateNode(node.id.clone()));
            }
        }

        // 2. Pass 2: Resolve edges into successor lists
        let mut outputs: Vec<Vec<NodeId>> = vec![Vec::new(); definition.nodes.len()];
        for edge in &definition.edges {
            let source = self.resolve(&edge.source)
                .ok_or_else(|| CompileError::UnknownSource(edge.source.clone()))?;
            let target = self.resolve(&edge.target)
                .ok_or_else(|| CompileError::UnknownTarget(edge.target.clone()))?;
            outputs[source].push(target);
        }

        // 3. Start node
        let start = definition.nodes.iter()
            .position(|n| matches!(n.kind, NodeKind::Start))
            .ok_or(CompileError::MissingStart)?;

        let nodes = definition.nodes.into_iter()
            .zip(outputs)
            .map(|(node, outputs)| ProcessNode {
                label: node.id,
                kind: node.kind,
                outputs,
            })
            .collect();

        Ok(ProcessGraph {
            id: definition.id,
            name: definition.name,
            nodes,
            start,
        })
    }

    fn resolve(&self, id: &str) -> Option<NodeId> {
        self.id_map.get(id).copied()
    }
}

impl ProcessGraph {
    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn node(&self, id: NodeId) -> Option<&ProcessNode> {
        self.nodes.get(id)
    }

    /// Successor edges of a node. Out-of-range ids have no successors.
    pub fn outputs(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.outputs.as_slice()).unwrap_or(&[])
    }

    /// Look a node up by its definition label.
    pub fn find(&self, label: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.label == label)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &ProcessNode)> {
        self.nodes.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

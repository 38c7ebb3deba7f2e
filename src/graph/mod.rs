pub mod builder;
pub mod compile;
pub mod loader;

use serde::{Serialize, Deserialize};

/// 流程定义中的节点类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum NodeKind {
    Start,
    End,
    Task,
    /// 汇聚网关：等待所有仍可到达的入边
    InclusiveGateway,
}

/// 原始流程定义 (对应 YAML 文件)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessDefinition {
    pub id: String,
    pub name: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// 定义中的节点
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: String,
    #[serde(flatten)]
    pub kind: NodeKind,
}

/// 定义中的边 (source -> target)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

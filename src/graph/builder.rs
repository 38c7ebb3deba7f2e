use crate::graph::{ProcessDefinition, Node, Edge, NodeKind};
use crate::graph::compile::{GraphCompiler, ProcessGraph, CompileError};

pub struct GraphBuilder {
    id: String,
    name: String,
    pub nodes: Vec<Node>, // Made public for manual manipulation in tests if needed
    edges: Vec<Edge>,
}

impl GraphBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn start(self, id: &str) -> Self {
        self.node(id, NodeKind::Start)
    }

    pub fn end(self, id: &str) -> Self {
        self.node(id, NodeKind::End)
    }

    pub fn task(self, id: &str) -> Self {
        self.node(id, NodeKind::Task)
    }

    pub fn gateway(self, id: &str) -> Self {
        self.node(id, NodeKind::InclusiveGateway)
    }

    pub fn node(mut self, id: &str, kind: NodeKind) -> Self {
        self.nodes.push(Node {
            id: id.to_string(),
            kind,
        });
        self
    }

    pub fn connect(mut self, source: &str, target: &str) -> Self {
        self.edges.push(Edge {
            source: source.to_string(),
            target: target.to_string(),
        });
        self
    }

    pub fn build(self) -> ProcessDefinition {
        ProcessDefinition {
            id: self.id,
            name: self.name,
            nodes: self.nodes,
            edges: self.edges,
        }
    }

    /// Shortcut: build the definition and compile it in one go.
    pub fn compile(self) -> Result<ProcessGraph, CompileError> {
        GraphCompiler::new().compile(self.build())
    }
}

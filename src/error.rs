use std::fmt;

use crate::graph::{NodeId, ParamId};

/// Failures raised while building or mutating the signal graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// The node was never created or has already been disposed.
    UnknownNode(NodeId),
    /// The node exists but has no such automatable parameter.
    NoSuchParam { node: NodeId, param: ParamId },
    /// The connection would feed a node back into itself.
    Cycle { from: NodeId, to: NodeId },
    /// Only envelopes accept triggers.
    NotTriggerable(NodeId),
    /// The destination belongs to the graph: it cannot be added, disposed or
    /// connected out of.
    Destination,
    /// A primitive was constructed with an unusable parameter value.
    InvalidParameter { name: &'static str, value: f32 },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GraphError::UnknownNode(id) => write!(f, "unknown node {id}"),
            GraphError::NoSuchParam { node, param } => {
                write!(f, "node {node} has no {param:?} parameter")
            }
            GraphError::Cycle { from, to } => {
                write!(f, "connecting {from} -> {to} would create a cycle")
            }
            GraphError::NotTriggerable(id) => write!(f, "node {id} cannot be triggered"),
            GraphError::Destination => {
                write!(f, "the destination node cannot be added, removed or used as a source")
            }
            GraphError::InvalidParameter { name, value } => {
                write!(f, "invalid value {value} for {name}")
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Failures surfaced by the engine and the sound registry.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The platform refused to start or resume audio output.
    Unlock(String),
    /// Building or mutating a sound graph failed.
    Graph(GraphError),
    /// A thread panicked while holding the graph lock.
    Poisoned,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EngineError::Unlock(msg) => write!(f, "audio unlock failed: {msg}"),
            EngineError::Graph(err) => write!(f, "signal graph error: {err}"),
            EngineError::Poisoned => write!(f, "signal graph lock poisoned"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Graph(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GraphError> for EngineError {
    fn from(err: GraphError) -> Self {
        EngineError::Graph(err)
    }
}

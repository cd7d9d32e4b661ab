use thiserror::Error;

/// Errors raised while building or walking a stage graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A stage with this name is already registered.
    #[error("Stage '{0}' is already registered")]
    DuplicateStage(String),

    /// The name collides with the terminal marker.
    #[error("Stage name '{0}' is reserved")]
    ReservedStageName(String),

    /// `set_entry_point` was called twice.
    #[error("Entry point already set to '{existing}', cannot set '{requested}'")]
    EntryPointAlreadySet { existing: String, requested: String },

    /// `compile` was called without an entry point.
    #[error("Graph has no entry point")]
    MissingEntryPoint,

    /// An edge or entry point references a stage that was never added.
    #[error("Unknown stage '{0}'")]
    UnknownStage(String),

    /// A stage already has an outgoing edge.
    #[error("Stage '{0}' already has an outgoing edge")]
    DuplicateEdge(String),

    /// A reachable stage has nowhere to go after it runs.
    #[error("Stage '{0}' has no outgoing edge")]
    MissingOutgoingEdge(String),

    /// The decision function returned a value with no entry in the routing table.
    #[error("Stage '{stage}' produced decision '{decision}' which has no route")]
    UnroutableDecision { stage: String, decision: String },

    /// The run executed more stages than allowed.
    #[error("Step limit of {limit} exceeded")]
    StepLimitExceeded { limit: usize },
}

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

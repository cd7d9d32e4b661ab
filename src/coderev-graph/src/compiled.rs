//! Executable graph.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use tracing::{Instrument, debug, info_span, warn};

use crate::END;
use crate::error::GraphError;
use crate::stage::{GraphState, Stage};

pub(crate) type Router<S> = Box<dyn Fn(&S) -> Result<String, GraphError> + Send + Sync>;

pub(crate) enum Edge<S> {
    Direct(String),
    Conditional { route: Router<S>, targets: Vec<String> },
}

impl<S> Edge<S> {
    pub(crate) fn targets(&self) -> Vec<&str> {
        match self {
            Edge::Direct(target) => vec![target.as_str()],
            Edge::Conditional { targets, .. } => targets.iter().map(String::as_str).collect(),
        }
    }

    fn next(&self, state: &S) -> Result<String, GraphError> {
        match self {
            Edge::Direct(target) => Ok(target.clone()),
            Edge::Conditional { route, .. } => route(state),
        }
    }
}

/// A validated graph, ready to run.
///
/// A compiled graph holds no per-run data, so one instance can serve any
/// number of concurrent [`invoke`](CompiledGraph::invoke) calls.
pub struct CompiledGraph<S: GraphState, E> {
    stages: IndexMap<String, Arc<dyn Stage<S, E>>>,
    entry: String,
    edges: IndexMap<String, Edge<S>>,
    max_steps: usize,
}

impl<S, E> CompiledGraph<S, E>
where
    S: GraphState,
    E: From<GraphError> + Display,
{
    /// Run the graph from the entry point until an edge reaches [`END`].
    ///
    /// Each stage's update is merged before the next edge is evaluated. The
    /// first stage error aborts the run and is returned as-is.
    pub async fn invoke(&self, mut state: S) -> Result<S, E> {
        let run_started = Instant::now();
        let mut current = self.entry.clone();
        let mut steps = 0usize;

        loop {
            if steps >= self.max_steps {
                return Err(GraphError::StepLimitExceeded {
                    limit: self.max_steps,
                }
                .into());
            }
            steps += 1;

            let stage = self
                .stages
                .get(&current)
                .ok_or_else(|| GraphError::UnknownStage(current.clone()))?;

            let started = Instant::now();
            let span = info_span!("stage", name = %current, step = steps);
            let update = match stage.run(&state).instrument(span).await {
                Ok(update) => update,
                Err(err) => {
                    warn!(stage = %current, error = %err, "stage failed");
                    return Err(err);
                }
            };
            state.apply(update);
            debug!(
                stage = %current,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "stage completed"
            );

            let edge = self
                .edges
                .get(&current)
                .ok_or_else(|| GraphError::MissingOutgoingEdge(current.clone()))?;
            let next = edge.next(&state)?;

            if next == END {
                debug!(
                    steps,
                    elapsed_ms = run_started.elapsed().as_millis() as u64,
                    "graph run finished"
                );
                return Ok(state);
            }
            current = next;
        }
    }
}

impl<S: GraphState, E> CompiledGraph<S, E> {
    pub(crate) fn new(
        stages: IndexMap<String, Arc<dyn Stage<S, E>>>,
        entry: String,
        edges: IndexMap<String, Edge<S>>,
        max_steps: usize,
    ) -> Self {
        Self {
            stages,
            entry,
            edges,
            max_steps,
        }
    }

    /// Name of the first stage.
    pub fn entry_point(&self) -> &str {
        &self.entry
    }

    /// Registered stage names in insertion order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.keys().map(String::as_str).collect()
    }

    /// Human-readable edge list (for logging).
    pub fn execution_plan(&self) -> String {
        let mut lines = vec![format!("entry: {}", self.entry)];
        for (from, edge) in &self.edges {
            match edge {
                Edge::Direct(to) => lines.push(format!("{from} -> {to}")),
                Edge::Conditional { targets, .. } => {
                    lines.push(format!("{from} -> {{{}}}", targets.join(" | ")))
                }
            }
        }
        lines.join("\n")
    }
}

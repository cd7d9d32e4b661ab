//! Graph construction and validation.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::warn;

use crate::compiled::{CompiledGraph, Edge, Router};
use crate::error::{GraphError, GraphResult};
use crate::stage::{GraphState, Stage};
use crate::{DEFAULT_MAX_STEPS, END};

/// Mutable graph definition. Call [`compile`](StageGraph::compile) to get a
/// runnable [`CompiledGraph`].
///
/// `E` is the error type stages fail with. It must absorb [`GraphError`] so
/// routing failures and stage failures reach the caller through one type.
pub struct StageGraph<S: GraphState, E> {
    stages: IndexMap<String, Arc<dyn Stage<S, E>>>,
    entry: Option<String>,
    edges: IndexMap<String, Edge<S>>,
    max_steps: usize,
}

impl<S: GraphState, E> Default for StageGraph<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GraphState, E> StageGraph<S, E> {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            stages: IndexMap::new(),
            entry: None,
            edges: IndexMap::new(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Bound the number of stage executions in a single run.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Register a stage under `name`.
    pub fn add_stage(
        &mut self,
        name: impl Into<String>,
        stage: impl Stage<S, E> + 'static,
    ) -> GraphResult<()> {
        let name = name.into();
        if name == END {
            return Err(GraphError::ReservedStageName(name));
        }
        if self.stages.contains_key(&name) {
            return Err(GraphError::DuplicateStage(name));
        }
        self.stages.insert(name, Arc::new(stage));
        Ok(())
    }

    /// Designate the first stage to run.
    pub fn set_entry_point(&mut self, name: impl Into<String>) -> GraphResult<()> {
        let requested = name.into();
        if let Some(existing) = &self.entry {
            return Err(GraphError::EntryPointAlreadySet {
                existing: existing.clone(),
                requested,
            });
        }
        self.entry = Some(requested);
        Ok(())
    }

    /// Unconditional successor. `to` may be [`END`].
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> GraphResult<()> {
        let from = from.into();
        self.ensure_no_edge(&from)?;
        self.edges.insert(from, Edge::Direct(to.into()));
        Ok(())
    }

    /// Route by decision value after `from` runs.
    ///
    /// `decide` is evaluated against the state once `from`'s update has been
    /// merged; its result is looked up in `routes`. A value with no entry
    /// fails the run with [`GraphError::UnroutableDecision`].
    pub fn add_conditional_edge<K, D, I, T>(
        &mut self,
        from: impl Into<String>,
        decide: D,
        routes: I,
    ) -> GraphResult<()>
    where
        K: Eq + Hash + Display + Send + Sync + 'static,
        D: Fn(&S) -> K + Send + Sync + 'static,
        I: IntoIterator<Item = (K, T)>,
        T: Into<String>,
    {
        let from = from.into();
        self.ensure_no_edge(&from)?;

        let table: HashMap<K, String> = routes
            .into_iter()
            .map(|(key, target)| (key, target.into()))
            .collect();
        let mut targets: Vec<String> = table.values().cloned().collect();
        targets.sort();
        targets.dedup();

        let stage = from.clone();
        let route: Router<S> = Box::new(move |state: &S| {
            let decision = decide(state);
            table
                .get(&decision)
                .cloned()
                .ok_or_else(|| GraphError::UnroutableDecision {
                    stage: stage.clone(),
                    decision: decision.to_string(),
                })
        });

        self.edges.insert(from, Edge::Conditional { route, targets });
        Ok(())
    }

    fn ensure_no_edge(&self, from: &str) -> GraphResult<()> {
        if self.edges.contains_key(from) {
            return Err(GraphError::DuplicateEdge(from.to_string()));
        }
        Ok(())
    }

    /// Validate the graph and freeze it.
    ///
    /// Fails when there is no entry point, when an edge mentions a stage that
    /// does not exist, or when a reachable stage has no outgoing edge.
    /// Unreachable stages only produce a warning.
    pub fn compile(self) -> GraphResult<CompiledGraph<S, E>> {
        let entry = self.entry.clone().ok_or(GraphError::MissingEntryPoint)?;
        if !self.stages.contains_key(&entry) {
            return Err(GraphError::UnknownStage(entry));
        }

        for (from, edge) in &self.edges {
            if !self.stages.contains_key(from) {
                return Err(GraphError::UnknownStage(from.clone()));
            }
            for target in edge.targets() {
                if target != END && !self.stages.contains_key(target) {
                    return Err(GraphError::UnknownStage(target.to_string()));
                }
            }
        }

        let reachable = self.reachable_from(&entry);
        for name in self.stages.keys() {
            if !reachable.contains(name.as_str()) {
                warn!(stage = %name, "stage is unreachable from entry point '{}'", entry);
            } else if !self.edges.contains_key(name) {
                return Err(GraphError::MissingOutgoingEdge(name.clone()));
            }
        }

        Ok(CompiledGraph::new(
            self.stages,
            entry,
            self.edges,
            self.max_steps,
        ))
    }

    fn reachable_from<'a>(&'a self, entry: &'a str) -> HashSet<&'a str> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([entry]);

        while let Some(name) = queue.pop_front() {
            if name == END || !seen.insert(name) {
                continue;
            }
            if let Some(edge) = self.edges.get(name) {
                queue.extend(edge.targets());
            }
        }

        seen
    }
}

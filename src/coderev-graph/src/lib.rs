//! Stage graph engine for coderev pipelines.
//!
//! A [`StageGraph`] is a directed graph of named stages with a single entry
//! point. Every stage reads the shared state, does its work (usually one model
//! call) and returns a partial update that the engine merges back into the
//! state. Edges decide which stage runs next; a run ends when an edge points
//! at [`END`].
//!
//! ```text
//!   StageGraph::new()
//!        │ add_stage / set_entry_point / add_edge / add_conditional_edge
//!        ▼
//!   StageGraph::compile() ──► CompiledGraph::invoke(state) ──► final state
//! ```
//!
//! # Example
//!
//! ```rust
//! use coderev_graph::{END, FnStage, GraphError, GraphState, StageGraph};
//!
//! #[derive(Default)]
//! struct Counter {
//!     hits: u32,
//! }
//!
//! impl GraphState for Counter {
//!     type Update = u32;
//!
//!     fn apply(&mut self, update: u32) {
//!         self.hits += update;
//!     }
//! }
//!
//! # tokio_test_block_on(async {
//! let mut graph: StageGraph<Counter, GraphError> = StageGraph::new();
//! graph.add_stage("first", FnStage::new(|_: &Counter| Ok(1)))?;
//! graph.add_stage("second", FnStage::new(|_: &Counter| Ok(2)))?;
//! graph.set_entry_point("first")?;
//! graph.add_edge("first", "second")?;
//! graph.add_edge("second", END)?;
//!
//! let compiled = graph.compile()?;
//! let state = compiled.invoke(Counter::default()).await?;
//! assert_eq!(state.hits, 3);
//! # Ok::<(), GraphError>(())
//! # }).unwrap();
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

mod builder;
mod compiled;
mod error;
mod stage;

pub use builder::StageGraph;
pub use compiled::CompiledGraph;
pub use error::{GraphError, GraphResult};
pub use stage::{FnStage, GraphState, Stage};

/// Terminal marker. An edge pointing here ends the run.
pub const END: &str = "__end__";

/// Default bound on stage executions per run.
pub const DEFAULT_MAX_STEPS: usize = 25;

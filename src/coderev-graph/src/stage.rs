//! Stage and state traits.

use async_trait::async_trait;

/// State threaded through a graph run.
///
/// Stages never mutate the state directly. They return an [`Update`] and the
/// engine merges it with [`apply`], which must only touch the fields the
/// update carries.
///
/// [`Update`]: GraphState::Update
/// [`apply`]: GraphState::apply
pub trait GraphState: Send + Sync {
    /// Partial update produced by a stage. `Default` is the empty update.
    type Update: Default + Send;

    /// Merge a stage's update into the state.
    fn apply(&mut self, update: Self::Update);
}

/// A named unit of work in a graph.
#[async_trait]
pub trait Stage<S: GraphState, E>: Send + Sync {
    /// Run the stage against the current state.
    async fn run(&self, state: &S) -> Result<S::Update, E>;
}

/// Adapter turning a synchronous closure into a [`Stage`].
pub struct FnStage<F> {
    func: F,
}

impl<F> FnStage<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<S, E, F> Stage<S, E> for FnStage<F>
where
    S: GraphState + 'static,
    E: Send + 'static,
    F: Fn(&S) -> Result<S::Update, E> + Send + Sync,
{
    async fn run(&self, state: &S) -> Result<S::Update, E> {
        (self.func)(state)
    }
}

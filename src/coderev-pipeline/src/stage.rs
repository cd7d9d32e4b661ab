//! The one stage shape every pipeline uses: render a template, call the model,
//! write the reply into a single state field.

use std::sync::Arc;

use async_trait::async_trait;
use coderev_graph::{GraphState, Stage};
use coderev_llm::ModelInvoker;
use coderev_prompts::PromptLibrary;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Template variables extracted from a state.
pub type Vars = Vec<(&'static str, String)>;

/// Stage that renders `template` with `inputs(state)`, sends it to the model
/// and maps the reply through `output`.
pub struct PromptStage<S: GraphState> {
    template: &'static str,
    invoker: Arc<dyn ModelInvoker>,
    prompts: Arc<PromptLibrary>,
    inputs: fn(&S) -> Result<Vars>,
    output: fn(String) -> S::Update,
}

impl<S: GraphState> PromptStage<S> {
    pub fn new(
        template: &'static str,
        invoker: Arc<dyn ModelInvoker>,
        prompts: Arc<PromptLibrary>,
        inputs: fn(&S) -> Result<Vars>,
        output: fn(String) -> S::Update,
    ) -> Self {
        Self {
            template,
            invoker,
            prompts,
            inputs,
            output,
        }
    }
}

#[async_trait]
impl<S: GraphState> Stage<S, PipelineError> for PromptStage<S> {
    async fn run(&self, state: &S) -> Result<S::Update> {
        let vars = (self.inputs)(state)?;
        let prompt = {
            let borrowed: Vec<(&str, &str)> =
                vars.iter().map(|(key, value)| (*key, value.as_str())).collect();
            self.prompts.render(self.template, &borrowed)?
        };

        debug!(
            template = self.template,
            prompt_chars = prompt.len(),
            "invoking model"
        );
        let reply = self.invoker.invoke(&prompt).await?;
        debug!(
            template = self.template,
            reply_chars = reply.len(),
            "model replied"
        );

        Ok((self.output)(reply))
    }
}

use crate::error::Error;

/// What the pipeline does after a step has run.
#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    /// Continue to the next step
    Continue,
    /// Skip all remaining steps (successful early exit)
    Skip,
    /// Abort the pipeline with an error
    Abort(Error),
}

/// One phase of a multi-step teardown.
///
/// A step reads the shared context, records its results in it and tells the
/// pipeline how to proceed. Steps that depend on the outcome of an earlier
/// phase express that through `should_execute`.
#[async_trait::async_trait]
pub trait PipelineStep<T>: Send + Sync {
    /// Name used in log output.
    fn name(&self) -> &'static str;

    /// Called before `execute`; returning `false` skips only this step.
    fn should_execute(&self, _context: &T) -> bool {
        true
    }

    async fn execute(&self, context: &mut T) -> StepAction;
}

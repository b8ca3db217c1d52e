use super::pipeline_step::{PipelineStep, StepAction};
use crate::error::Error;

/// Runs a sequence of steps over a shared context.
///
/// Each step can continue, end the pipeline early with success (`Skip`) or
/// abort it with an error. Whatever a step wrote into the context before an
/// abort stays there, so callers can still report partial results.
pub struct Pipeline<T> {
    pub steps: Vec<Box<dyn PipelineStep<T>>>,
}

impl<T> Pipeline<T> {
    pub fn with_steps(steps: Vec<Box<dyn PipelineStep<T>>>) -> Self {
        Self { steps }
    }

    /// Execute all steps in order.
    ///
    /// Returns `Ok(())` when every step ran or one requested `Skip`, and the
    /// step's error when one requested `Abort`.
    pub async fn execute(&self, context: &mut T) -> Result<(), Error> {
        let total = self.steps.len();
        for (index, step) in self.steps.iter().enumerate() {
            let name = step.name();
            if !step.should_execute(context) {
                tracing::info!(step = name, "Not needed, moving on");
                continue;
            }

            tracing::info!(step = name, "Running step {}/{}", index + 1, total);
            let action = step.execute(context).await;
            if let StepAction::Continue = action {
                continue;
            }

            let remaining = total - index - 1;
            return match action {
                StepAction::Abort(error) => {
                    tracing::error!(step = name, remaining, "Aborted: {}", error);
                    Err(error)
                }
                _ => {
                    tracing::info!(step = name, remaining, "Finished early");
                    Ok(())
                }
            };
        }

        Ok(())
    }
}

//! Pipeline execution
//!
//! Runs `a | b | c` stage by stage. Each successful stage's value is turned
//! into text and spliced into the next stage as parameter 0.
//!
//! A failed stage or a scope exit ends the pipeline; later stages never run.

use command_core::Command;
use tracing::debug;

use crate::dispatcher::Dispatcher;
use crate::error::DispatchError;
use crate::outcome::CommandResult;

pub struct PipelineExecutor<'d> {
    dispatcher: &'d Dispatcher,
}

impl<'d> PipelineExecutor<'d> {
    pub fn new(dispatcher: &'d Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Run every stage through the dispatcher; returns the last stage's result
    pub fn execute(&self, command: &Command) -> Result<CommandResult, DispatchError> {
        self.execute_with(command, |_| None)
    }

    /// Like [`execute`](Self::execute), but `intercept` may answer a stage
    /// itself instead of dispatching it.
    pub fn execute_with<F>(
        &self,
        command: &Command,
        mut intercept: F,
    ) -> Result<CommandResult, DispatchError>
    where
        F: FnMut(&Command) -> Option<CommandResult>,
    {
        let mut stage = command.clone();
        let mut position = 1;

        loop {
            let result = match intercept(&stage) {
                Some(result) => result,
                None => self.dispatcher.dispatch(&stage)?,
            };

            if result.is_failed() {
                debug!(stage = position, command = stage.name(), "pipeline stopped by failure");
                return Ok(result);
            }
            if result.transition().is_exit() {
                debug!(stage = position, command = stage.name(), "pipeline stopped by scope exit");
                return Ok(result);
            }

            match stage.create_pipe_target(&result.value_text()) {
                Some(next) => {
                    debug!(from = stage.name(), to = next.name(), "piping stage result");
                    stage = next;
                    position += 1;
                }
                None => return Ok(result),
            }
        }
    }
}

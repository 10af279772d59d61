//! Linear step sequencer with validation-gated forward navigation
//!
//! The sequencer owns the ordered step list and the current index. Every
//! transition notifies a [`ShowHook`] so a renderer can sync what is visible,
//! then fires the step's own show callback.

mod step;


pub use step::{RenderFn, ShowCallback, StepContent, StepDefinition, Validation};

use thiserror::Error;

/// Configuration errors raised by the sequencer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequencerError {
    #[error("a walkthrough needs at least one step")]
    EmptySteps,

    #[error("step index {index} is out of range (walkthrough has {total} steps)")]
    IndexOutOfRange { index: usize, total: usize },
}

/// What the "next" control does on the current step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    Advance,
    Restart,
}

/// Snapshot of a transition passed to the rendering collaborator
#[derive(Debug)]
pub struct StepView<'a> {
    pub index: usize,
    pub total: usize,
    pub step: &'a StepDefinition,
}

impl StepView<'_> {
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_terminal(&self) -> bool {
        self.index + 1 == self.total
    }

    /// The previous control is hidden on the first step
    pub fn show_previous(&self) -> bool {
        !self.is_first()
    }

    pub fn next_action(&self) -> NextAction {
        if self.is_terminal() {
            NextAction::Restart
        } else {
            NextAction::Advance
        }
    }
}

/// Rendering collaborator notified on every transition
pub trait ShowHook {
    fn on_show(&mut self, view: &StepView<'_>);
}

/// Hook that renders nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHook;

impl ShowHook for NoopHook {
    fn on_show(&mut self, _view: &StepView<'_>) {}
}

pub struct StepSequencer<H> {
    steps: Vec<StepDefinition>,
    current: usize,
    hook: H,
}

impl<H: ShowHook> StepSequencer<H> {
    /// Build a sequencer positioned on the first step and show it
    pub fn initialize(steps: Vec<StepDefinition>, hook: H) -> Result<Self, SequencerError> {
        if steps.is_empty() {
            return Err(SequencerError::EmptySteps);
        }

        let mut sequencer = Self {
            steps,
            current: 0,
            hook,
        };
        tracing::debug!(total = sequencer.total_steps(), "Walkthrough initialized");
        sequencer.show(0);
        Ok(sequencer)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn step_definition(&self, index: usize) -> Option<&StepDefinition> {
        self.steps.get(index)
    }

    pub fn current_step(&self) -> &StepDefinition {
        &self.steps[self.current]
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn is_terminal(&self) -> bool {
        self.current + 1 == self.steps.len()
    }

    pub fn next_action(&self) -> NextAction {
        if self.is_terminal() {
            NextAction::Restart
        } else {
            NextAction::Advance
        }
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    pub fn hook_mut(&mut self) -> &mut H {
        &mut self.hook
    }

    /// Jump directly to a step, bypassing validation
    pub fn go_to(&mut self, index: usize) -> Result<(), SequencerError> {
        self.check_index(index)?;
        self.show(index);
        Ok(())
    }

    /// Move forward one step if the current step's validation allows it.
    ///
    /// The predicate is evaluated fresh on every call. Returns false on the
    /// terminal step or when validation rejects.
    pub fn advance(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }

        let index = self.current;
        if let Some(validation) = self.steps[index].validation.as_mut() {
            if !validation() {
                tracing::debug!(step = index, "Validation rejected advance");
                return false;
            }
        }

        self.show(index + 1);
        true
    }

    /// Move back one step. Never gated.
    pub fn retreat(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.show(self.current - 1);
        true
    }

    pub fn restart(&mut self) {
        self.show(0);
    }

    /// Activate the "next" control: advance, or restart on the terminal step
    pub fn next(&mut self) -> bool {
        match self.next_action() {
            NextAction::Advance => self.advance(),
            NextAction::Restart => {
                self.restart();
                true
            }
        }
    }

    /// Set or replace the validation predicate for a step
    pub fn attach_validation(
        &mut self,
        index: usize,
        predicate: impl FnMut() -> bool + 'static,
    ) -> Result<(), SequencerError> {
        self.check_index(index)?;
        self.steps[index].validation = Some(Box::new(predicate));
        tracing::debug!(step = index, "Validation attached");
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), SequencerError> {
        if index >= self.steps.len() {
            return Err(SequencerError::IndexOutOfRange {
                index,
                total: self.steps.len(),
            });
        }
        Ok(())
    }

    fn show(&mut self, index: usize) {
        self.current = index;
        tracing::debug!(step = index, title = %self.steps[index].title, "Showing step");

        let view = StepView {
            index,
            total: self.steps.len(),
            step: &self.steps[index],
        };
        self.hook.on_show(&view);

        if let Some(callback) = self.steps[index].on_show.as_mut() {
            callback();
        }
    }
}

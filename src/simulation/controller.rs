//! The controller interface and the snapshot history shared by the controllers.

use thiserror::Error;

use crate::simulation::snapshot::Snapshot;

/// Errors raised by controllers.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ControllerError {
    /// A method other than `initialize` was called first.
    #[error("Controller not initialized")]
    NotInitialized,
    /// A parameter failed validation.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// `seek_to_step` was given an index past the end of the history.
    #[error("Invalid step: {step} (history has {len} snapshots)")]
    StepOutOfRange {
        /// Requested step.
        step: usize,
        /// Number of stored snapshots.
        len: usize,
    },
    /// The configured number of steps has been taken.
    #[error("Maximum of {max_steps} steps reached")]
    MaxStepsReached {
        /// Configured limit.
        max_steps: usize,
    },
    /// Both the selected move and its fallback failed. Nothing was changed.
    #[error("{primary} and fallback {fallback} both failed: {reason}")]
    MoveFailed {
        /// The move selected for the step.
        primary: String,
        /// The move tried after it.
        fallback: String,
        /// Why the fallback failed.
        reason: String,
    },
}

/// A stepwise simulation that owns its complex and keeps a replayable history.
///
/// The lifecycle is `initialize` → `step`* → `reset` (which re-initializes with the last
/// parameters). Every successful step appends one immutable [`Snapshot`]; a failed step
/// leaves the history and the live complex untouched.
pub trait SimulationController {
    /// Configuration accepted by [`initialize`](Self::initialize).
    type Params;
    /// Move label recorded in snapshots.
    type Move: Copy + Ord;

    /// Builds the seed complex and resets the history to a single snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::InvalidParameter`] if `params` fail validation.
    fn initialize(&mut self, params: Self::Params) -> Result<(), ControllerError>;

    /// Applies one move and returns the new snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::NotInitialized`], [`ControllerError::MaxStepsReached`] or
    /// [`ControllerError::MoveFailed`].
    fn step(&mut self) -> Result<&Snapshot<Self::Move>, ControllerError>;

    /// Re-initializes with the last parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::NotInitialized`] if there are no previous parameters.
    fn reset(&mut self) -> Result<(), ControllerError>;

    /// The snapshot at the cursor: the latest one, or the one selected by
    /// [`seek_to_step`](Self::seek_to_step).
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::NotInitialized`] before the first `initialize`.
    fn state(&self) -> Result<&Snapshot<Self::Move>, ControllerError>;

    /// Every snapshot, oldest first. Empty before the first `initialize`.
    fn history(&self) -> &[Snapshot<Self::Move>];

    /// Moves the cursor to snapshot `step` and returns it. Nothing is recomputed, and a later
    /// `step` still continues from the latest complex.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::StepOutOfRange`] if `step` is not in the history.
    fn seek_to_step(&mut self, step: usize) -> Result<&Snapshot<Self::Move>, ControllerError>;

    /// Step index at the cursor.
    fn current_step(&self) -> usize;

    /// Advisory run flag for collaborators that drive the controller.
    fn is_running(&self) -> bool;

    /// Sets the advisory run flag.
    fn set_running(&mut self, running: bool);
}

/// Snapshot list with a cursor and a run flag.
#[derive(Clone, Debug)]
pub(crate) struct History<M> {
    snapshots: Vec<Snapshot<M>>,
    cursor: usize,
    running: bool,
}

impl<M> Default for History<M> {
    fn default() -> Self {
        Self {
            snapshots: Vec::new(),
            cursor: 0,
            running: false,
        }
    }
}

impl<M> History<M> {
    /// Discards everything and starts over from `initial`.
    pub(crate) fn restart(&mut self, initial: Snapshot<M>) {
        self.snapshots.clear();
        self.snapshots.push(initial);
        self.cursor = 0;
        self.running = false;
    }

    /// Appends a snapshot and moves the cursor to it.
    pub(crate) fn push(&mut self, snapshot: Snapshot<M>) -> &Snapshot<M> {
        self.snapshots.push(snapshot);
        self.cursor = self.snapshots.len() - 1;
        &self.snapshots[self.cursor]
    }

    /// Number of successful steps recorded.
    pub(crate) const fn steps_taken(&self) -> usize {
        self.snapshots.len().saturating_sub(1)
    }

    pub(crate) fn current(&self) -> Result<&Snapshot<M>, ControllerError> {
        self.snapshots
            .get(self.cursor)
            .ok_or(ControllerError::NotInitialized)
    }

    pub(crate) fn as_slice(&self) -> &[Snapshot<M>] {
        &self.snapshots
    }

    pub(crate) fn seek(&mut self, step: usize) -> Result<&Snapshot<M>, ControllerError> {
        let len = self.snapshots.len();
        if len == 0 {
            return Err(ControllerError::NotInitialized);
        }
        let snapshot = self
            .snapshots
            .get(step)
            .ok_or(ControllerError::StepOutOfRange { step, len })?;
        self.cursor = step;
        Ok(snapshot)
    }

    pub(crate) const fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) const fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) const fn set_running(&mut self, running: bool) {
        self.running = running;
    }
}

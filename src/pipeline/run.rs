use std::time::{Duration, Instant};

use tracing::debug;

use crate::{
    error::{Result, StylizerError},
    raster::PixelBuffer,
};

/// Lifecycle of a single render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed)
    }
}

/// Tracks one run through `Idle -> Running -> {Succeeded, Failed}`
#[derive(Debug)]
pub struct RenderRun {
    state: RunState,
    started: Option<Instant>,
    finished: Option<Instant>,
}

impl RenderRun {
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            started: None,
            finished: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn start(&mut self) -> Result<()> {
        self.transition(RunState::Idle, RunState::Running)?;
        self.started = Some(Instant::now());
        Ok(())
    }

    pub fn succeed(&mut self) -> Result<()> {
        self.transition(RunState::Running, RunState::Succeeded)?;
        self.finished = Some(Instant::now());
        Ok(())
    }

    pub fn fail(&mut self) -> Result<()> {
        self.transition(RunState::Running, RunState::Failed)?;
        self.finished = Some(Instant::now());
        Ok(())
    }

    /// Time spent running; still counting while the run is in progress
    pub fn elapsed(&self) -> Duration {
        match (self.started, self.finished) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    fn transition(&mut self, from: RunState, to: RunState) -> Result<()> {
        if self.state != from {
            return Err(StylizerError::generic(format!(
                "render run cannot move from {:?} to {:?}",
                self.state, to
            )));
        }
        debug!("Render run {:?} -> {:?}", from, to);
        self.state = to;
        Ok(())
    }
}

impl Default for RenderRun {
    fn default() -> Self {
        Self::new()
    }
}

/// A layer op that was left out of the artwork
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedOp {
    /// Position of the op (or of its enclosing top-level op) in the pipeline
    pub index: usize,
    pub op: &'static str,
    pub reason: String,
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// Finished image at the canonical size
    pub image: PixelBuffer,
    /// Ops skipped because their parameters were rejected
    pub warnings: Vec<SkippedOp>,
    pub state: RunState,
    pub elapsed: Duration,
    pub style_id: &'static str,
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_lifecycle() {
        let mut run = RenderRun::new();
        assert_eq!(run.state(), RunState::Idle);
        assert_eq!(run.elapsed(), Duration::ZERO);

        run.start().unwrap();
        assert_eq!(run.state(), RunState::Running);
        assert!(!run.state().is_terminal());

        run.succeed().unwrap();
        assert_eq!(run.state(), RunState::Succeeded);
        assert!(run.state().is_terminal());
    }

    #[test]
    fn test_failed_lifecycle() {
        let mut run = RenderRun::new();
        run.start().unwrap();
        run.fail().unwrap();
        assert_eq!(run.state(), RunState::Failed);
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        let mut run = RenderRun::new();
        assert!(run.succeed().is_err());
        assert!(run.fail().is_err());

        run.start().unwrap();
        assert!(run.start().is_err());

        run.succeed().unwrap();
        assert!(run.fail().is_err());
        assert_eq!(run.state(), RunState::Succeeded);
    }
}

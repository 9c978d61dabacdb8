use crate::driver::clock::Clock;
use crate::driver::input::InputSource;
use crate::driver::pacing::{FramePacer, PacingConfig, Poll};
use crate::events::capability::Event;
use crate::foundation::error::StageResult;
use crate::render::surface::Surface;
use crate::stage::Stage;

/// Result of one [`FrameDriver::pump`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No frame was due.
    Idle,
    /// A frame was updated, drawn and presented.
    Rendered,
    /// A quit was requested; the caller should stop pumping.
    Quit,
}

/// Paced Update → Draw → Present loop.
pub struct FrameDriver<C: Clock> {
    clock: C,
    pacing: PacingConfig,
    pacer: Option<FramePacer>,
    frames: u64,
    events: Vec<Event>,
}

impl<C: Clock> FrameDriver<C> {
    /// Driver reading time from `clock`.
    pub fn new(clock: C, pacing: PacingConfig) -> Self {
        Self {
            clock,
            pacing,
            pacer: None,
            frames: 0,
            events: Vec::new(),
        }
    }

    /// Time source.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Pacer state, once the first pump resolved the interval.
    pub fn pacer(&self) -> Option<&FramePacer> {
        self.pacer.as_ref()
    }

    /// Run at most one frame.
    ///
    /// Too early: sleeps (when the remaining wait exceeds the threshold) and returns
    /// [`FrameOutcome::Idle`]. Otherwise polls input, dispatches events, updates, draws and
    /// presents. The target interval is resolved against the surface on the first call.
    pub fn pump<S: Surface, I: InputSource + ?Sized>(
        &mut self,
        stage: &mut Stage<S>,
        input: &mut I,
    ) -> StageResult<FrameOutcome> {
        if stage.quit_requested() {
            return Ok(FrameOutcome::Quit);
        }
        let pacing = self.pacing;
        let pacer = self.pacer.get_or_insert_with(|| {
            let interval = pacing.resolve_interval(stage.surface().refresh_interval());
            tracing::debug!(?interval, "frame interval resolved");
            FramePacer::new(interval, pacing.sleep_threshold_secs)
        });

        let now = self.clock.now();
        let dt = match pacer.poll(now) {
            Poll::Wait { sleep } => {
                if let Some(secs) = sleep {
                    self.clock.sleep(secs);
                }
                return Ok(FrameOutcome::Idle);
            }
            Poll::Due { dt } => dt,
        };
        pacer.commit(now);

        let mut events = std::mem::take(&mut self.events);
        events.clear();
        input.poll(&mut events);
        for event in events.drain(..) {
            stage.dispatch(&event)?;
        }
        self.events = events;
        if stage.quit_requested() {
            return Ok(FrameOutcome::Quit);
        }

        stage.update(now, dt)?;
        stage.draw()?;
        stage.present()?;
        self.frames += 1;

        if stage.quit_requested() {
            Ok(FrameOutcome::Quit)
        } else {
            Ok(FrameOutcome::Rendered)
        }
    }

    /// Start the stage if needed and pump until quit or until `max_frames` frames rendered.
    /// Returns the number of frames rendered by this call.
    #[tracing::instrument(skip_all, fields(max_frames = ?max_frames))]
    pub fn run<S: Surface, I: InputSource + ?Sized>(
        &mut self,
        stage: &mut Stage<S>,
        input: &mut I,
        max_frames: Option<u64>,
    ) -> StageResult<u64> {
        stage.start()?;
        let first = self.frames;
        loop {
            if max_frames.is_some_and(|max| self.frames - first >= max) {
                break;
            }
            if self.pump(stage, input)? == FrameOutcome::Quit {
                break;
            }
        }
        let rendered = self.frames - first;
        tracing::debug!(rendered, "frame loop finished");
        Ok(rendered)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/driver/frame.rs"]
mod tests;

use std::fmt;

use crate::animation::ease::Ease;
use crate::foundation::core::IPoint;
use crate::foundation::error::{StageError, StageResult};
use crate::scene::command::Commands;
use crate::scene::node::NodeId;

/// Handle to a scheduled animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnimationId(pub(crate) u64);

/// Callback invoked once when an animation completes. It may queue further commands,
/// including new animations.
pub type CompletionFn = Box<dyn FnOnce(&mut Commands) + Send>;

/// Property animated between two values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnimatedProperty {
    /// Local offset of a node.
    Position {
        /// Start value, restored on cancel.
        from: IPoint,
        /// End value, applied exactly on completion.
        to: IPoint,
    },
    /// Node opacity.
    Opacity {
        /// Start value, restored on cancel.
        from: u8,
        /// End value, applied exactly on completion.
        to: u8,
    },
}

/// Concrete value written into a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyValue {
    /// Local offset.
    Position(IPoint),
    /// Opacity.
    Opacity(u8),
}

impl AnimatedProperty {
    fn start_value(self) -> PropertyValue {
        match self {
            Self::Position { from, .. } => PropertyValue::Position(from),
            Self::Opacity { from, .. } => PropertyValue::Opacity(from),
        }
    }

    fn end_value(self) -> PropertyValue {
        match self {
            Self::Position { to, .. } => PropertyValue::Position(to),
            Self::Opacity { to, .. } => PropertyValue::Opacity(to),
        }
    }

    /// Interpolated value at eased progress `p`.
    ///
    /// Pixel offsets floor `base + delta * p`; opacity rounds to nearest and clamps to the
    /// byte range.
    pub fn value_at(self, p: f64) -> PropertyValue {
        fn lerp_floor(a: i32, b: i32, p: f64) -> i32 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * p).floor() as i32
        }

        match self {
            Self::Position { from, to } => PropertyValue::Position(IPoint::new(
                lerp_floor(from.x, to.x, p),
                lerp_floor(from.y, to.y, p),
            )),
            Self::Opacity { from, to } => {
                let a = f64::from(from);
                let b = f64::from(to);
                PropertyValue::Opacity((a + (b - a) * p).round().clamp(0.0, 255.0) as u8)
            }
        }
    }
}

/// Anything the scheduler can write animated values into.
pub trait AnimationTarget {
    /// Whether `node` still exists.
    fn is_alive(&self, node: NodeId) -> bool;
    /// Write `value` into `node` and invalidate whatever cached geometry depends on it.
    fn apply(&mut self, node: NodeId, value: PropertyValue);
    /// Record that `id` is in flight on `node`.
    fn register(&mut self, node: NodeId, id: AnimationId);
    /// Forget `id` on `node`.
    fn unregister(&mut self, node: NodeId, id: AnimationId);
}

/// A request to animate one property of one node.
pub struct AnimationRequest {
    pub(crate) target: NodeId,
    pub(crate) property: AnimatedProperty,
    pub(crate) start: f64,
    pub(crate) end: f64,
    pub(crate) ease: Ease,
    pub(crate) on_complete: Option<CompletionFn>,
}

impl fmt::Debug for AnimationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationRequest")
            .field("target", &self.target)
            .field("property", &self.property)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("ease", &self.ease)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl AnimationRequest {
    /// Animate `property` of `target` over `[start, end]` seconds, linearly.
    pub fn new(target: NodeId, property: AnimatedProperty, start: f64, end: f64) -> Self {
        Self {
            target,
            property,
            start,
            end,
            ease: Ease::Linear,
            on_complete: None,
        }
    }

    /// Movement from `from` to `to`.
    pub fn movement(target: NodeId, from: IPoint, to: IPoint, start: f64, end: f64) -> Self {
        Self::new(target, AnimatedProperty::Position { from, to }, start, end)
    }

    /// Fade from `from` to `to`.
    pub fn fade(target: NodeId, from: u8, to: u8, start: f64, end: f64) -> Self {
        Self::new(target, AnimatedProperty::Opacity { from, to }, start, end)
    }

    /// Use `ease` instead of linear progress.
    pub fn eased(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Run `f` once when the animation completes (never on cancel).
    pub fn on_complete(mut self, f: impl FnOnce(&mut Commands) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Target node.
    pub fn target(&self) -> NodeId {
        self.target
    }

    fn validate(&self) -> StageResult<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(StageError::animation("animation times must be finite"));
        }
        if self.end < self.start {
            return Err(StageError::animation(format!(
                "animation end {} precedes start {}",
                self.end, self.start
            )));
        }
        Ok(())
    }
}

/// Lifecycle of an animation record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationState {
    /// In the queue, advanced every tick.
    Active,
    /// Reached its end value; the callback ran.
    Completed,
    /// Rolled back to its start value; the callback never runs.
    Cancelled,
}

struct AnimationRecord {
    id: AnimationId,
    target: NodeId,
    property: AnimatedProperty,
    start: f64,
    end: f64,
    ease: Ease,
    on_complete: Option<CompletionFn>,
    progress: f64,
    state: AnimationState,
}

impl AnimationRecord {
    fn progress_at(&self, now: f64) -> f64 {
        let span = self.end - self.start;
        if span <= 0.0 {
            return if now >= self.start { 1.0 } else { 0.0 };
        }
        ((now - self.start) / span).clamp(0.0, 1.0)
    }
}

/// Queue of in-flight animations, advanced once per frame.
///
/// A tick walks the queue once, then sweeps finished records in a second phase.
/// Completion callbacks only queue [`Commands`], so anything they schedule joins the queue
/// after the sweep.
#[derive(Default)]
pub struct Animator {
    queue: Vec<AnimationRecord>,
    next_id: u64,
    completed: u64,
    cancelled: u64,
}

impl Animator {
    /// Empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active records.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Return `true` when nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Total animations that reached their end value.
    pub fn completed_count(&self) -> u64 {
        self.completed
    }

    /// Total animations that were cancelled or dropped.
    pub fn cancelled_count(&self) -> u64 {
        self.cancelled
    }

    /// State of an animation still in the queue. Finished records are forgotten.
    pub fn state(&self, id: AnimationId) -> Option<AnimationState> {
        self.queue.iter().find(|r| r.id == id).map(|r| r.state)
    }

    /// Progress in `[0, 1]` of an active animation.
    pub fn progress(&self, id: AnimationId) -> Option<f64> {
        self.queue.iter().find(|r| r.id == id).map(|r| r.progress)
    }

    /// Schedule an animation.
    ///
    /// When `end <= now` the end value is applied and the callback runs synchronously; the
    /// queue is left untouched and the returned handle is already finished.
    pub fn schedule<T: AnimationTarget + ?Sized>(
        &mut self,
        target: &mut T,
        now: f64,
        request: AnimationRequest,
        commands: &mut Commands,
    ) -> StageResult<AnimationId> {
        request.validate()?;
        if !target.is_alive(request.target) {
            return Err(StageError::animation(format!(
                "animation target {:?} does not exist",
                request.target
            )));
        }

        let id = AnimationId(self.next_id);
        self.next_id += 1;

        let AnimationRequest {
            target: node,
            property,
            start,
            end,
            ease,
            on_complete,
        } = request;

        if end <= now {
            target.apply(node, property.end_value());
            self.completed += 1;
            if let Some(cb) = on_complete {
                cb(commands);
            }
            return Ok(id);
        }

        target.register(node, id);
        self.queue.push(AnimationRecord {
            id,
            target: node,
            property,
            start,
            end,
            ease,
            on_complete,
            progress: 0.0,
            state: AnimationState::Active,
        });
        Ok(id)
    }

    /// Advance every active animation to `now`.
    pub fn tick<T: AnimationTarget + ?Sized>(
        &mut self,
        target: &mut T,
        now: f64,
        commands: &mut Commands,
    ) {
        let len = self.queue.len();
        let mut finished = 0usize;

        for rec in self.queue.iter_mut().take(len) {
            if rec.state != AnimationState::Active {
                continue;
            }
            if !target.is_alive(rec.target) {
                tracing::warn!(id = rec.id.0, "dropping animation whose target no longer exists");
                rec.state = AnimationState::Cancelled;
                finished += 1;
                continue;
            }

            if now >= rec.end {
                rec.progress = 1.0;
                target.apply(rec.target, rec.property.end_value());
                rec.state = AnimationState::Completed;
                finished += 1;
                if let Some(cb) = rec.on_complete.take() {
                    cb(commands);
                }
            } else {
                let t = rec.progress_at(now);
                rec.progress = t;
                target.apply(rec.target, rec.property.value_at(rec.ease.apply(t)));
            }
        }

        if finished > 0 {
            self.sweep(target);
        }
    }

    /// Cancel an active animation, restoring its start value.
    ///
    /// Returns `false` for handles that already finished or never existed.
    pub fn cancel<T: AnimationTarget + ?Sized>(&mut self, target: &mut T, id: AnimationId) -> bool {
        let Some(rec) = self
            .queue
            .iter_mut()
            .find(|r| r.id == id && r.state == AnimationState::Active)
        else {
            return false;
        };
        if target.is_alive(rec.target) {
            target.apply(rec.target, rec.property.start_value());
        }
        rec.state = AnimationState::Cancelled;
        rec.on_complete = None;
        self.sweep(target);
        true
    }

    /// Cancel every active animation on `node`. Returns how many were cancelled.
    pub fn cancel_all<T: AnimationTarget + ?Sized>(&mut self, target: &mut T, node: NodeId) -> usize {
        let ids: Vec<AnimationId> = self
            .queue
            .iter()
            .filter(|r| r.target == node && r.state == AnimationState::Active)
            .map(|r| r.id)
            .collect();
        ids.into_iter().filter(|id| self.cancel(target, *id)).count()
    }

    fn sweep<T: AnimationTarget + ?Sized>(&mut self, target: &mut T) {
        let mut kept = Vec::with_capacity(self.queue.len());
        for rec in self.queue.drain(..) {
            match rec.state {
                AnimationState::Active => kept.push(rec),
                AnimationState::Completed => {
                    self.completed += 1;
                    if target.is_alive(rec.target) {
                        target.unregister(rec.target, rec.id);
                    }
                }
                AnimationState::Cancelled => {
                    self.cancelled += 1;
                    if target.is_alive(rec.target) {
                        target.unregister(rec.target, rec.id);
                    }
                }
            }
        }
        self.queue = kept;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/scheduler.rs"]
mod tests;

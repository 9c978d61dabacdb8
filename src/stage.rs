use std::collections::VecDeque;

use rayon::prelude::*;

use crate::animation::scheduler::{AnimationId, AnimationRequest, Animator};
use crate::config::StageConfig;
use crate::driver::input::InputSnapshot;
use crate::events::capability::{Capabilities, Event};
use crate::events::handler::{Behavior, HandlerCtx};
use crate::events::router::{route, route_batches};
use crate::foundation::core::{IPoint, IRect, ISize, Point, Rgba8};
use crate::foundation::error::{StageError, StageResult};
use crate::geometry::anchor::AnchorPair;
use crate::geometry::position::SizeSpec;
use crate::render::surface::Surface;
use crate::render::walker::{DrawList, compile_draw_list, execute_draw_list, refresh_layout};
use crate::scene::command::{Command, Commands};
use crate::scene::node::{Lifecycle, Node, NodeId, Paint};
use crate::scene::tree::Scene;
use crate::viewport::Viewport;

type UpdateBatch = Vec<(NodeId, Box<dyn Behavior>, Option<IRect>)>;

/// The context every operation runs against: scene, animator, viewport, input snapshot,
/// drawing surface and the running flag.
///
/// Structural changes made through the stage take effect immediately. Handlers and
/// completion callbacks queue [`Commands`] instead; the stage applies them once the
/// current dispatch or update pass is over.
pub struct Stage<S: Surface> {
    scene: Scene,
    animator: Animator,
    viewport: Viewport,
    input: InputSnapshot,
    surface: S,
    config: StageConfig,
    pool: Option<rayon::ThreadPool>,
    running: bool,
    quit: bool,
    now: f64,
    last_draw: DrawList,
}

impl<S: Surface> Stage<S> {
    /// Stage drawing into `surface`.
    ///
    /// When the surface size differs from `config.default_size` the viewport starts scaled.
    pub fn new(surface: S, config: StageConfig) -> StageResult<Self> {
        config.validate()?;
        let mut viewport = Viewport::new(config.default_size)?;
        let surface_size = surface.size();
        if surface_size != config.default_size {
            viewport.resize(surface_size)?;
        }
        let pool = if config.parallel_update {
            Some(build_thread_pool(config.threads)?)
        } else {
            None
        };

        Ok(Self {
            scene: Scene::new(viewport.size()),
            animator: Animator::new(),
            viewport,
            input: InputSnapshot::default(),
            surface,
            config,
            pool,
            running: false,
            quit: false,
            now: 0.0,
            last_draw: DrawList::default(),
        })
    }

    /// Stage whose design-time size is the surface's current size.
    pub fn with_surface(surface: S) -> StageResult<Self> {
        let config = StageConfig {
            default_size: surface.size(),
            ..StageConfig::default()
        };
        Self::new(surface, config)
    }

    /// Scene tree.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Animation scheduler.
    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    /// Viewport state.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Input snapshot folded from dispatched events.
    pub fn input(&self) -> &InputSnapshot {
        &self.input
    }

    /// Drawing surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Drawing surface, mutably.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Settings the stage was built with.
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Time of the last update, in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Whether [`Stage::start`] has run.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether a quit was requested by a handler or a window-quit event.
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Ask the frame driver to stop after the current frame.
    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    /// Draw list issued by the last [`Stage::draw`].
    pub fn last_draw_list(&self) -> &DrawList {
        &self.last_draw
    }

    /// Root group.
    pub fn root(&self) -> NodeId {
        self.scene.root()
    }

    /// Borrow a live node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.scene.node(id)
    }

    /// First node carrying `name`.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.scene.find(name)
    }

    /// Topmost visible drawable under `p`.
    pub fn hit_test(&self, p: Point) -> Option<NodeId> {
        self.scene.hit_test(p)
    }

    /// Insert a detached node.
    pub fn create(&mut self, node: Node) -> NodeId {
        self.scene.insert(node)
    }

    /// Attach `child` under `parent`. When the parent is active the child subtree is
    /// prepared right away.
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> StageResult<()> {
        self.scene.attach(parent, child)?;
        let parent_active = self
            .scene
            .node(parent)
            .is_some_and(|n| n.lifecycle() == Lifecycle::Active);
        if self.running && parent_active {
            self.prepare(child)?;
        }
        Ok(())
    }

    /// [`create`](Stage::create) followed by [`add`](Stage::add).
    pub fn spawn(&mut self, parent: NodeId, node: Node) -> StageResult<NodeId> {
        let id = self.create(node);
        self.add(parent, id)?;
        Ok(id)
    }

    /// Release `child`'s subtree and unlink it from `parent`.
    ///
    /// Returns `false` when `child` is not a child of `parent`; nothing changes then.
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.scene.is_child(parent, child) {
            return false;
        }
        self.release(child);
        self.scene.detach(parent, child)
    }

    /// Detach if attached, release, cancel animations and free the whole subtree.
    pub fn destroy(&mut self, id: NodeId) -> StageResult<()> {
        if id == self.scene.root() {
            return Err(StageError::ownership("the root group cannot be destroyed"));
        }
        let Some(node) = self.scene.node(id) else {
            return Err(StageError::ownership(format!("unknown node {id:?}")));
        };
        match node.parent() {
            Some(parent) => {
                self.remove(parent, id);
            }
            None => self.release(id),
        }
        for node in self.scene.subtree(id) {
            self.animator.cancel_all(&mut self.scene, node);
        }
        let freed = self.scene.free_subtree(id);
        tracing::debug!(?id, freed, "destroyed subtree");
        Ok(())
    }

    /// Prepare the whole tree and mark the stage running.
    #[tracing::instrument(skip(self))]
    pub fn start(&mut self) -> StageResult<()> {
        if self.running {
            return Ok(());
        }
        self.quit = false;
        self.prepare(self.scene.root())?;
        self.running = true;
        refresh_layout(&mut self.scene, self.viewport.scale());
        tracing::debug!(nodes = self.scene.len(), "stage started");
        Ok(())
    }

    /// Release every resource and mark the stage stopped. The tree stays attached.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.release(self.scene.root());
        self.running = false;
        tracing::debug!("stage stopped");
    }

    /// Move a node's local offset.
    pub fn set_position(&mut self, id: NodeId, position: IPoint) -> StageResult<()> {
        self.scene.set_position(id, position)
    }

    /// Change a node's opacity.
    pub fn set_opacity(&mut self, id: NodeId, opacity: u8) -> StageResult<()> {
        self.scene.set_opacity(id, opacity)
    }

    /// Hide or show a node and its subtree.
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) -> StageResult<()> {
        self.scene.set_hidden(id, hidden)
    }

    /// Opt a node and its subtree in or out of event delivery.
    pub fn set_ignore_events(&mut self, id: NodeId, ignore: bool) -> StageResult<()> {
        self.scene.set_ignore_events(id, ignore)
    }

    /// Change a drawable's origin and bias anchors.
    pub fn set_anchors(
        &mut self,
        id: NodeId,
        origin: AnchorPair,
        bias: AnchorPair,
    ) -> StageResult<()> {
        self.scene.set_anchors(id, origin, bias)
    }

    /// Change how a drawable sizes itself.
    pub fn set_size(&mut self, id: NodeId, spec: SizeSpec) -> StageResult<()> {
        self.scene.set_size_spec(id, spec)
    }

    /// Give a group an explicit extent, or let it inherit its parent's.
    pub fn set_group_size(&mut self, id: NodeId, size: Option<ISize>) -> StageResult<()> {
        self.scene.set_group_size(id, size)
    }

    /// Change a rectangle's fill color.
    pub fn set_color(&mut self, id: NodeId, color: Rgba8) -> StageResult<()> {
        self.scene.set_color(id, color)
    }

    /// Replace a drawable's paint. An active node swaps its texture immediately.
    pub fn set_paint(&mut self, id: NodeId, paint: Paint) -> StageResult<()> {
        let node = self
            .scene
            .node_mut(id)
            .ok_or_else(|| StageError::ownership(format!("unknown node {id:?}")))?;
        let active = node.lifecycle == Lifecycle::Active;
        let d = node
            .drawable_data_mut()
            .ok_or_else(|| StageError::validation("groups have no paint"))?;

        let new_texture = match (&paint, active) {
            (Paint::Sprite { source, .. }, true) => Some(self.surface.load_texture(source)?),
            _ => None,
        };
        if let Some(old) = d.texture.take() {
            self.surface.release_texture(old.id);
        }
        d.texture = new_texture;
        d.paint = paint;
        d.position.invalidate_size();
        Ok(())
    }

    /// Schedule an animation at the current stage time.
    pub fn animate(&mut self, request: AnimationRequest) -> StageResult<AnimationId> {
        let mut follow = Commands::new();
        let id = self
            .animator
            .schedule(&mut self.scene, self.now, request, &mut follow)?;
        self.apply_commands(follow)?;
        Ok(id)
    }

    /// Cancel one animation, restoring its start value.
    pub fn cancel_animation(&mut self, id: AnimationId) -> bool {
        self.animator.cancel(&mut self.scene, id)
    }

    /// Cancel every animation on `node`.
    pub fn cancel_animations(&mut self, node: NodeId) -> usize {
        self.animator.cancel_all(&mut self.scene, node)
    }

    /// Route one platform event.
    ///
    /// A resize event goes through [`Stage::resize`]; a window-quit event requests a quit
    /// after its handlers ran.
    pub fn dispatch(&mut self, event: &Event) -> StageResult<()> {
        if let Event::Resize { size, .. } = event {
            return self.resize(*size);
        }
        self.input.apply(event);
        self.route_event(event)?;
        if matches!(event, Event::WindowQuit) {
            self.quit = true;
        }
        Ok(())
    }

    /// Apply a new output size: recompute the scale once, invalidate dependent geometry,
    /// then notify [`Capabilities::RESIZE`] handlers.
    ///
    /// Empty sizes (a minimized window) are ignored and the previous scale stays in effect.
    #[tracing::instrument(skip(self))]
    pub fn resize(&mut self, size: ISize) -> StageResult<()> {
        if size.is_empty() {
            tracing::debug!(?size, "ignoring empty resize");
            return Ok(());
        }
        let scale = self.viewport.resize(size)?;
        self.surface.resize(size);
        self.scene.set_root_size(size);
        self.scene.invalidate_scale();
        self.route_event(&Event::Resize { size, scale })
    }

    /// Advance to `now`: tick animations, run update handlers, apply their commands and
    /// refresh cached geometry.
    pub fn update(&mut self, now: f64, dt: f64) -> StageResult<()> {
        self.now = now;
        let mut follow = Commands::new();
        self.animator.tick(&mut self.scene, now, &mut follow);
        self.apply_commands(follow)?;

        let queued = if self.pool.is_some() {
            self.run_update_parallel(dt)
        } else {
            self.run_update_serial(dt)
        };
        self.apply_commands(queued)?;

        refresh_layout(&mut self.scene, self.viewport.scale());
        Ok(())
    }

    /// Clear the surface and draw the visible tree.
    pub fn draw(&mut self) -> StageResult<()> {
        self.surface.clear(self.config.clear_color);
        self.surface.set_clip(None);
        let list = compile_draw_list(&mut self.scene, self.viewport.scale());
        execute_draw_list(&list, &mut self.surface);
        self.last_draw = list;
        Ok(())
    }

    /// Publish the frame.
    pub fn present(&mut self) -> StageResult<()> {
        self.surface.present()
    }

    fn prepare(&mut self, id: NodeId) -> StageResult<()> {
        for node_id in self.scene.subtree(id) {
            let Some(node) = self.scene.node_mut(node_id) else {
                continue;
            };
            if node.lifecycle == Lifecycle::Active {
                continue;
            }
            if let Some(d) = node.drawable_data_mut()
                && d.texture.is_none()
                && let Paint::Sprite { source, .. } = &d.paint
            {
                let texture = self.surface.load_texture(source)?;
                d.texture = Some(texture);
                d.position.invalidate_size();
            }
            node.lifecycle = Lifecycle::Active;
            tracing::debug!(id = ?node_id, "prepared");
        }
        Ok(())
    }

    fn release(&mut self, id: NodeId) {
        for node_id in self.scene.subtree(id) {
            let Some(node) = self.scene.node_mut(node_id) else {
                continue;
            };
            if let Some(texture) = node.drawable_data_mut().and_then(|d| d.texture.take()) {
                self.surface.release_texture(texture.id);
            }
            if node.lifecycle == Lifecycle::Active {
                node.lifecycle = Lifecycle::Inactive;
            }
            node.last_rect = None;
        }
    }

    fn route_event(&mut self, event: &Event) -> StageResult<()> {
        let targets = route(&self.scene, event.capability());
        let mut queued = Commands::new();
        for id in targets {
            let Some(mut behavior) = self.scene.take_behavior(id) else {
                continue;
            };
            let bounds = self.scene.node(id).and_then(|n| n.last_rect());
            let mut ctx = HandlerCtx {
                node: id,
                now: self.now,
                bounds,
                viewport: &self.viewport,
                input: &self.input,
                commands: &mut queued,
            };
            behavior.on_event(event, &mut ctx);
            self.scene.restore_behavior(id, behavior);
        }
        self.apply_commands(queued)
    }

    fn run_update_serial(&mut self, dt: f64) -> Commands {
        let targets = route(&self.scene, Capabilities::UPDATE);
        let mut queued = Commands::new();
        for id in targets {
            let Some(mut behavior) = self.scene.take_behavior(id) else {
                continue;
            };
            let bounds = self.scene.node(id).and_then(|n| n.last_rect());
            let mut ctx = HandlerCtx {
                node: id,
                now: self.now,
                bounds,
                viewport: &self.viewport,
                input: &self.input,
                commands: &mut queued,
            };
            behavior.on_update(dt, &mut ctx);
            self.scene.restore_behavior(id, behavior);
        }
        queued
    }

    fn run_update_parallel(&mut self, dt: f64) -> Commands {
        let Some(pool) = self.pool.as_ref() else {
            return Commands::new();
        };
        let mut batches: Vec<UpdateBatch> = route_batches(&self.scene, Capabilities::UPDATE)
            .into_iter()
            .map(|ids| {
                ids.into_iter()
                    .filter_map(|id| {
                        let bounds = self.scene.node(id).and_then(|n| n.last_rect());
                        self.scene.take_behavior(id).map(|b| (id, b, bounds))
                    })
                    .collect()
            })
            .collect();

        let now = self.now;
        let viewport = &self.viewport;
        let input = &self.input;
        let per_batch: Vec<Commands> = pool.install(|| {
            batches
                .par_iter_mut()
                .map(|batch| {
                    let mut queued = Commands::new();
                    for (id, behavior, bounds) in batch.iter_mut() {
                        let mut ctx = HandlerCtx {
                            node: *id,
                            now,
                            bounds: *bounds,
                            viewport,
                            input,
                            commands: &mut queued,
                        };
                        behavior.on_update(dt, &mut ctx);
                    }
                    queued
                })
                .collect()
        });

        for (id, behavior, _) in batches.into_iter().flatten() {
            self.scene.restore_behavior(id, behavior);
        }
        let mut merged = Commands::new();
        for queued in per_batch {
            merged.extend(queued);
        }
        merged
    }

    fn apply_commands(&mut self, mut queued: Commands) -> StageResult<()> {
        let mut pending: VecDeque<Command> = queued.take().into();
        while let Some(cmd) = pending.pop_front() {
            let mut follow = Commands::new();
            match self.apply_command(cmd, &mut follow) {
                Ok(()) => {}
                Err(err @ StageError::Resource(_)) => return Err(err),
                Err(err) => tracing::warn!(error = %err, "skipping queued command"),
            }
            pending.extend(follow.take());
        }
        Ok(())
    }

    fn apply_command(&mut self, cmd: Command, follow: &mut Commands) -> StageResult<()> {
        match cmd {
            Command::Attach { parent, child } => self.add(parent, child),
            Command::Detach { parent, child } => {
                if !self.remove(parent, child) {
                    tracing::debug!(?parent, ?child, "detach of a non-child ignored");
                }
                Ok(())
            }
            Command::Destroy(id) => self.destroy(id),
            Command::SetPosition(id, p) => self.scene.set_position(id, p),
            Command::SetOpacity(id, o) => self.scene.set_opacity(id, o),
            Command::SetHidden(id, h) => self.scene.set_hidden(id, h),
            Command::SetIgnoreEvents(id, i) => self.scene.set_ignore_events(id, i),
            Command::Animate(request) => self
                .animator
                .schedule(&mut self.scene, self.now, request, follow)
                .map(|_| ()),
            Command::Cancel(id) => {
                self.animator.cancel(&mut self.scene, id);
                Ok(())
            }
            Command::CancelAll(node) => {
                self.animator.cancel_all(&mut self.scene, node);
                Ok(())
            }
            Command::Quit => {
                self.quit = true;
                Ok(())
            }
        }
    }
}

fn build_thread_pool(threads: Option<usize>) -> StageResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(StageError::validation("threads must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| StageError::validation(format!("failed to build rayon thread pool: {e}")))
}

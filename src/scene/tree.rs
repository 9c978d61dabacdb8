use crate::animation::scheduler::{AnimationId, AnimationTarget, PropertyValue};
use crate::events::capability::Capabilities;
use crate::events::handler::Behavior;
use crate::foundation::core::{IPoint, ISize, Point, Rgba8};
use crate::foundation::error::{StageError, StageResult};
use crate::geometry::anchor::AnchorPair;
use crate::geometry::position::SizeSpec;
use crate::scene::node::{Lifecycle, Node, NodeId, Paint};

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena that owns every node, plus the root group.
///
/// Nodes are addressed by [`NodeId`]. Freed slots are recycled and their generation bumped,
/// so handles to destroyed nodes stop resolving.
pub struct Scene {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    root: NodeId,
    root_size: ISize,
}

impl Scene {
    /// Scene whose root group spans `root_size`.
    pub fn new(root_size: ISize) -> Self {
        let mut scene = Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            root: NodeId {
                idx: 0,
                generation: 0,
            },
            root_size,
        };
        let mut root = Node::group().named("root");
        root.lifecycle = Lifecycle::Inactive;
        scene.root = scene.insert(root);
        scene
    }

    /// Root group.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Extent of the root group (the viewport size).
    pub fn root_size(&self) -> ISize {
        self.root_size
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    /// A scene always holds its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Borrow a live node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.idx as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.idx as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn live_mut(&mut self, id: NodeId) -> StageResult<&mut Node> {
        self.node_mut(id)
            .ok_or_else(|| StageError::ownership(format!("unknown node {id:?}")))
    }

    /// First live node carrying `name`, in slot order.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.slots.iter().enumerate().find_map(|(idx, slot)| {
            let node = slot.node.as_ref()?;
            (node.name() == Some(name)).then_some(NodeId {
                idx: idx as u32,
                generation: slot.generation,
            })
        })
    }

    /// Insert a detached node and return its handle.
    pub(crate) fn insert(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        if node.lifecycle == Lifecycle::Active {
            node.lifecycle = Lifecycle::Detached;
        }
        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.node = Some(node);
            return NodeId {
                idx,
                generation: slot.generation,
            };
        }
        let idx = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId { idx, generation: 0 }
    }

    /// Whether `child` is directly owned by `parent`.
    pub fn is_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.node(parent)
            .is_some_and(|p| p.children().contains(&child))
            && self.node(child).is_some_and(|c| c.parent == Some(parent))
    }

    /// Whether `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = self.node(node).and_then(|n| n.parent);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    /// `id` and all its descendants, pre-order.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let Some(node) = self.node(cur) else {
                continue;
            };
            out.push(cur);
            stack.extend(node.children().iter().rev().copied());
        }
        out
    }

    /// Capabilities under which `child` is registered in `group`.
    pub fn registry_memberships(&self, group: NodeId, child: NodeId) -> Capabilities {
        self.node(group)
            .and_then(|n| n.group_data())
            .map(|g| g.registry.memberships(child))
            .unwrap_or_else(Capabilities::empty)
    }

    /// Registry of `group` for a single capability flag, in dispatch order.
    ///
    /// Empty for unknown nodes, drawables, and values that are not exactly one flag.
    pub fn registry(&self, group: NodeId, cap: Capabilities) -> &[NodeId] {
        self.node(group)
            .and_then(|n| n.group_data())
            .map(|g| g.registry.members(cap))
            .unwrap_or(&[])
    }

    /// Attach `child` as the last child of `parent`.
    ///
    /// Fails without touching either child list when `child` is already owned, when
    /// `parent` is not a group, or when the attach would create a cycle.
    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) -> StageResult<()> {
        let parent_node = self
            .node(parent)
            .ok_or_else(|| StageError::ownership(format!("unknown parent {parent:?}")))?;
        if !parent_node.is_group() {
            return Err(StageError::validation(format!(
                "cannot attach to {parent:?}: not a group"
            )));
        }
        let child_node = self
            .node(child)
            .ok_or_else(|| StageError::ownership(format!("unknown child {child:?}")))?;
        if child == self.root {
            return Err(StageError::ownership("the root group cannot be attached"));
        }
        if let Some(owner) = child_node.parent {
            return Err(StageError::ownership(format!(
                "{child:?} is already owned by {owner:?}"
            )));
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(StageError::ownership(format!(
                "attaching {child:?} under {parent:?} would create a cycle"
            )));
        }

        let caps = child_node.registry_capabilities();
        if let Some(group) = self.node_mut(parent).and_then(|n| n.group_data_mut()) {
            group.children.push(child);
            group.registry.add(child, caps);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
            node.lifecycle = Lifecycle::Inactive;
        }
        self.invalidate_subtree_origins(child);
        tracing::debug!(?parent, ?child, "attached");
        Ok(())
    }

    /// Unlink `child` from `parent`. Returns `false` when it is not a child of `parent`.
    ///
    /// Resources must already be released; the subtree keeps its nodes.
    pub(crate) fn detach(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.is_child(parent, child) {
            return false;
        }
        if let Some(group) = self.node_mut(parent).and_then(|n| n.group_data_mut()) {
            group.children.retain(|c| *c != child);
            group.registry.remove(child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = None;
            node.lifecycle = Lifecycle::Detached;
            node.last_rect = None;
        }
        tracing::debug!(?parent, ?child, "detached");
        true
    }

    /// Free every slot of a detached subtree. Returns how many nodes were freed.
    pub(crate) fn free_subtree(&mut self, id: NodeId) -> usize {
        let ids = self.subtree(id);
        for node in &ids {
            let slot = &mut self.slots[node.idx as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(node.idx);
        }
        ids.len()
    }

    /// Extent that children of `group` anchor against.
    ///
    /// Unsized groups inherit their parent's extent; the root spans the viewport.
    pub fn group_size(&self, group: NodeId) -> ISize {
        let mut cur = group;
        loop {
            if cur == self.root {
                return self.root_size;
            }
            let Some(node) = self.node(cur) else {
                return ISize::ZERO;
            };
            if let Some(size) = node.group_data().and_then(|g| g.size) {
                return size;
            }
            match node.parent {
                Some(p) => cur = p,
                None => return ISize::ZERO,
            }
        }
    }

    pub(crate) fn set_root_size(&mut self, size: ISize) {
        if self.root_size != size {
            self.root_size = size;
            self.invalidate_subtree_origins(self.root);
        }
    }

    pub(crate) fn invalidate_scale(&mut self) {
        for slot in &mut self.slots {
            if let Some(d) = slot.node.as_mut().and_then(|n| n.drawable_data_mut()) {
                d.position.invalidate_scale();
            }
        }
    }

    pub(crate) fn invalidate_subtree_origins(&mut self, id: NodeId) {
        for node in self.subtree(id) {
            if let Some(d) = self.node_mut(node).and_then(|n| n.drawable_data_mut()) {
                d.position.invalidate_origin();
            }
        }
    }

    pub(crate) fn set_position(&mut self, id: NodeId, position: IPoint) -> StageResult<()> {
        self.live_mut(id)?.set_local(position);
        Ok(())
    }

    pub(crate) fn set_opacity(&mut self, id: NodeId, opacity: u8) -> StageResult<()> {
        self.live_mut(id)?.opacity = opacity;
        Ok(())
    }

    pub(crate) fn set_hidden(&mut self, id: NodeId, hidden: bool) -> StageResult<()> {
        let node = self.live_mut(id)?;
        node.hidden = hidden;
        if hidden {
            node.last_rect = None;
        }
        Ok(())
    }

    pub(crate) fn set_ignore_events(&mut self, id: NodeId, ignore: bool) -> StageResult<()> {
        self.live_mut(id)?.ignore_events = ignore;
        Ok(())
    }

    pub(crate) fn set_anchors(
        &mut self,
        id: NodeId,
        origin: AnchorPair,
        bias: AnchorPair,
    ) -> StageResult<()> {
        let d = self
            .live_mut(id)?
            .drawable_data_mut()
            .ok_or_else(|| StageError::validation("anchors only apply to drawables"))?;
        d.position.set_anchors(origin, bias);
        Ok(())
    }

    pub(crate) fn set_size_spec(&mut self, id: NodeId, spec: SizeSpec) -> StageResult<()> {
        let d = self
            .live_mut(id)?
            .drawable_data_mut()
            .ok_or_else(|| StageError::validation("size specs only apply to drawables"))?;
        d.position.set_size_spec(spec);
        Ok(())
    }

    pub(crate) fn set_group_size(&mut self, id: NodeId, size: Option<ISize>) -> StageResult<()> {
        let g = self
            .live_mut(id)?
            .group_data_mut()
            .ok_or_else(|| StageError::validation("explicit extents only apply to groups"))?;
        if g.size != size {
            g.size = size;
            self.invalidate_subtree_origins(id);
        }
        Ok(())
    }

    pub(crate) fn set_color(&mut self, id: NodeId, color: Rgba8) -> StageResult<()> {
        match self.live_mut(id)?.drawable_data_mut() {
            Some(d) => match &mut d.paint {
                Paint::Rect { color: c } => {
                    *c = color;
                    Ok(())
                }
                Paint::Sprite { .. } => Err(StageError::validation("sprites have no fill color")),
            },
            None => Err(StageError::validation("groups have no fill color")),
        }
    }

    pub(crate) fn take_behavior(&mut self, id: NodeId) -> Option<Box<dyn Behavior>> {
        self.node_mut(id).and_then(|n| n.behavior.take())
    }

    pub(crate) fn restore_behavior(&mut self, id: NodeId, behavior: Box<dyn Behavior>) {
        if let Some(node) = self.node_mut(id) {
            node.behavior = Some(behavior);
        }
    }

    /// Visible drawables in draw order (back to front).
    pub fn draw_order(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(cur) = stack.pop() {
            let Some(node) = self.node(cur) else {
                continue;
            };
            if node.is_hidden() {
                continue;
            }
            if node.is_group() {
                stack.extend(node.children().iter().rev().copied());
            } else {
                out.push(cur);
            }
        }
        out
    }

    /// Topmost visible drawable whose last laid-out rectangle contains `p`.
    pub fn hit_test(&self, p: Point) -> Option<NodeId> {
        self.draw_order().into_iter().rev().find(|id| {
            self.node(*id)
                .and_then(|n| n.last_rect)
                .is_some_and(|r| r.contains(p))
        })
    }
}

impl AnimationTarget for Scene {
    fn is_alive(&self, node: NodeId) -> bool {
        self.contains(node)
    }

    fn apply(&mut self, node: NodeId, value: PropertyValue) {
        let Some(n) = self.node_mut(node) else {
            return;
        };
        match value {
            PropertyValue::Position(p) => n.set_local(p),
            PropertyValue::Opacity(o) => n.opacity = o,
        }
    }

    fn register(&mut self, node: NodeId, id: AnimationId) {
        if let Some(n) = self.node_mut(node) {
            n.animations.push(id);
        }
    }

    fn unregister(&mut self, node: NodeId, id: AnimationId) {
        if let Some(n) = self.node_mut(node) {
            n.animations.retain(|a| *a != id);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/tree.rs"]
mod tests;

use crate::events::capability::Capabilities;
use crate::scene::node::NodeId;
use crate::scene::tree::Scene;

/// Per-group registries, one ordered list per capability.
///
/// Lists only change on attach and detach. Appending keeps attach order; removal closes the
/// gap without reordering the remaining members.
#[derive(Debug, Default)]
pub(crate) struct EventRegistry {
    lists: [Vec<NodeId>; Capabilities::COUNT],
}

impl EventRegistry {
    pub(crate) fn add(&mut self, id: NodeId, caps: Capabilities) {
        for slot in caps.iter().filter_map(Capabilities::slot) {
            self.lists[slot].push(id);
        }
    }

    /// Erase `id` from every list; returns the capabilities it was registered under.
    pub(crate) fn remove(&mut self, id: NodeId) -> Capabilities {
        let mut removed = Capabilities::empty();
        for (slot, list) in self.lists.iter_mut().enumerate() {
            if let Some(pos) = list.iter().position(|m| *m == id) {
                list.remove(pos);
                removed |= Capabilities::from_bits_retain(1 << slot);
            }
        }
        removed
    }

    /// Members for a single capability flag. Empty or combined values match nothing.
    pub(crate) fn members(&self, cap: Capabilities) -> &[NodeId] {
        match cap.slot() {
            Some(slot) => self.lists[slot].as_slice(),
            None => &[],
        }
    }

    pub(crate) fn memberships(&self, id: NodeId) -> Capabilities {
        let mut caps = Capabilities::empty();
        for (slot, list) in self.lists.iter().enumerate() {
            if list.contains(&id) {
                caps |= Capabilities::from_bits_retain(1 << slot);
            }
        }
        caps
    }
}

/// Handlers to invoke for `cap`, in dispatch order.
///
/// The walk starts at the root's registry and descends into member groups. Members with
/// the opt-out flag are skipped together with their subtree. The returned list is a
/// snapshot; handlers run afterwards and cannot disturb it.
pub(crate) fn route(scene: &Scene, cap: Capabilities) -> Vec<NodeId> {
    let mut out = Vec::new();
    let root = scene.root();
    if let Some(node) = scene.node(root) {
        if node.ignores_events() {
            return out;
        }
        if node.behavior.is_some() && node.capabilities().contains(cap) {
            out.push(root);
        }
    }
    collect(scene, root, cap, &mut out);
    out
}

/// Like [`route`], split into one batch per top-level registry member of the root.
///
/// Batches touch disjoint subtrees, so they can run on separate worker threads.
pub(crate) fn route_batches(scene: &Scene, cap: Capabilities) -> Vec<Vec<NodeId>> {
    let root = scene.root();
    let mut batches = Vec::new();
    let Some(root_node) = scene.node(root) else {
        return batches;
    };
    if root_node.ignores_events() {
        return batches;
    }
    if root_node.behavior.is_some() && root_node.capabilities().contains(cap) {
        batches.push(vec![root]);
    }
    let Some(group) = root_node.group_data() else {
        return batches;
    };
    for &member in group.registry.members(cap) {
        let mut batch = Vec::new();
        visit(scene, member, cap, &mut batch);
        if !batch.is_empty() {
            batches.push(batch);
        }
    }
    batches
}

fn collect(scene: &Scene, group: NodeId, cap: Capabilities, out: &mut Vec<NodeId>) {
    let Some(data) = scene.node(group).and_then(|n| n.group_data()) else {
        return;
    };
    for &member in data.registry.members(cap) {
        visit(scene, member, cap, out);
    }
}

fn visit(scene: &Scene, member: NodeId, cap: Capabilities, out: &mut Vec<NodeId>) {
    let Some(node) = scene.node(member) else {
        return;
    };
    if node.ignores_events() {
        return;
    }
    if node.behavior.is_some() && node.capabilities().contains(cap) {
        out.push(member);
    }
    if node.is_group() {
        collect(scene, member, cap, out);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/events/router.rs"]
mod tests;

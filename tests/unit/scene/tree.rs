use super::*;
use crate::events::handler::HandlerCtx;
use crate::foundation::core::{IRect, Rgba8};
use crate::geometry::position::SizeSpec;

struct Ticker;

impl Behavior for Ticker {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE | Capabilities::MOUSE_BUTTON_DOWN
    }

    fn on_update(&mut self, _dt: f64, _ctx: &mut HandlerCtx<'_>) {}
}

fn rect() -> Node {
    Node::rect(SizeSpec::Fixed(ISize::new(10, 10)), Rgba8::WHITE)
}

fn scene() -> Scene {
    Scene::new(ISize::new(200, 100))
}

#[test]
fn new_scene_has_only_the_root() {
    let s = scene();
    assert_eq!(s.len(), 1);
    let root = s.node(s.root()).unwrap();
    assert!(root.is_group());
    assert_eq!(root.name(), Some("root"));
    assert_eq!(s.find("root"), Some(s.root()));
}

#[test]
fn attach_sets_parent_and_lifecycle() {
    let mut s = scene();
    let root = s.root();
    let id = s.insert(rect());
    assert_eq!(s.node(id).unwrap().lifecycle(), Lifecycle::Detached);

    s.attach(root, id).unwrap();
    let node = s.node(id).unwrap();
    assert_eq!(node.parent(), Some(root));
    assert_eq!(node.lifecycle(), Lifecycle::Inactive);
    assert!(s.is_child(root, id));
}

#[test]
fn double_attach_fails_and_leaves_lists_untouched() {
    let mut s = scene();
    let root = s.root();
    let g = s.insert(Node::group());
    let id = s.insert(rect());
    s.attach(root, g).unwrap();
    s.attach(root, id).unwrap();

    let err = s.attach(g, id).unwrap_err();
    assert!(matches!(err, StageError::Ownership(_)));
    assert!(s.node(g).unwrap().children().is_empty());
    assert_eq!(s.node(root).unwrap().children(), &[g, id]);
    assert_eq!(s.node(id).unwrap().parent(), Some(root));
}

#[test]
fn cycles_are_rejected() {
    let mut s = scene();
    let root = s.root();
    let outer = s.insert(Node::group());
    let inner = s.insert(Node::group());
    s.attach(root, outer).unwrap();
    s.attach(outer, inner).unwrap();

    // Detach outer so the cycle check is the one that trips, not the ownership check.
    assert!(s.detach(root, outer));
    assert!(matches!(
        s.attach(inner, outer),
        Err(StageError::Ownership(_))
    ));
    assert!(matches!(
        s.attach(outer, outer),
        Err(StageError::Ownership(_))
    ));
    assert!(matches!(s.attach(outer, root), Err(StageError::Ownership(_))));
}

#[test]
fn drawables_cannot_own_children() {
    let mut s = scene();
    let a = s.insert(rect());
    let b = s.insert(rect());
    assert!(matches!(s.attach(a, b), Err(StageError::Validation(_))));
}

#[test]
fn registry_membership_round_trips() {
    let mut s = scene();
    let root = s.root();
    let id = s.insert(rect().with_behavior(Ticker));
    let g = s.insert(Node::group());

    s.attach(root, id).unwrap();
    s.attach(root, g).unwrap();
    assert_eq!(
        s.registry_memberships(root, id),
        Capabilities::UPDATE | Capabilities::MOUSE_BUTTON_DOWN
    );
    assert_eq!(s.registry_memberships(root, g), Capabilities::all());
    assert_eq!(s.registry(root, Capabilities::UPDATE), &[id, g]);

    assert!(s.detach(root, id));
    assert_eq!(s.registry_memberships(root, id), Capabilities::empty());
    assert_eq!(s.registry(root, Capabilities::UPDATE), &[g]);
    assert_eq!(s.node(id).unwrap().lifecycle(), Lifecycle::Detached);
    assert!(!s.detach(root, id));
}

#[test]
fn freed_handles_go_stale() {
    let mut s = scene();
    let g = s.insert(Node::group());
    let child = s.insert(rect());
    s.attach(g, child).unwrap();

    assert_eq!(s.free_subtree(g), 2);
    assert!(!s.contains(g));
    assert!(!s.contains(child));

    let reused = s.insert(rect());
    assert_eq!(reused.index(), child.index());
    assert!(s.contains(reused));
    assert_ne!(reused, g);
    assert_ne!(reused, child);
}

#[test]
fn subtree_is_pre_order() {
    let mut s = scene();
    let root = s.root();
    let g = s.insert(Node::group());
    let a = s.insert(rect());
    let b = s.insert(rect());
    let c = s.insert(rect());
    s.attach(root, g).unwrap();
    s.attach(g, a).unwrap();
    s.attach(g, b).unwrap();
    s.attach(root, c).unwrap();
    assert_eq!(s.subtree(root), vec![root, g, a, b, c]);
}

#[test]
fn group_size_inherits_until_an_explicit_extent() {
    let mut s = scene();
    let root = s.root();
    let sized = s.insert(Node::group_sized(ISize::new(40, 30)));
    let inner = s.insert(Node::group());
    let free = s.insert(Node::group());
    s.attach(root, sized).unwrap();
    s.attach(sized, inner).unwrap();
    s.attach(root, free).unwrap();

    assert_eq!(s.group_size(root), ISize::new(200, 100));
    assert_eq!(s.group_size(sized), ISize::new(40, 30));
    assert_eq!(s.group_size(inner), ISize::new(40, 30));
    assert_eq!(s.group_size(free), ISize::new(200, 100));

    s.set_root_size(ISize::new(50, 50));
    assert_eq!(s.group_size(free), ISize::new(50, 50));
}

#[test]
fn hit_test_prefers_the_topmost_drawable() {
    let mut s = scene();
    let root = s.root();
    let below = s.insert(rect());
    let above = s.insert(rect());
    s.attach(root, below).unwrap();
    s.attach(root, above).unwrap();
    s.node_mut(below).unwrap().last_rect = Some(IRect::new(0, 0, 10, 10));
    s.node_mut(above).unwrap().last_rect = Some(IRect::new(5, 5, 10, 10));

    assert_eq!(s.hit_test(Point::new(7.0, 7.0)), Some(above));
    assert_eq!(s.hit_test(Point::new(2.0, 2.0)), Some(below));
    assert_eq!(s.hit_test(Point::new(50.0, 50.0)), None);

    s.set_hidden(above, true).unwrap();
    assert_eq!(s.hit_test(Point::new(7.0, 7.0)), Some(below));
}

#[test]
fn animation_target_applies_values() {
    let mut s = scene();
    let id = s.insert(rect());
    s.apply(id, PropertyValue::Position(IPoint::new(3, 4)));
    s.apply(id, PropertyValue::Opacity(9));
    let node = s.node(id).unwrap();
    assert_eq!(node.local_position(), IPoint::new(3, 4));
    assert_eq!(node.opacity(), 9);

    s.register(id, AnimationId(7));
    assert_eq!(s.node(id).unwrap().animations(), &[AnimationId(7)]);
    s.unregister(id, AnimationId(7));
    assert!(s.node(id).unwrap().animations().is_empty());
}

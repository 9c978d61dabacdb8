use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::scene::command::Command;

#[derive(Default)]
struct Props {
    position: IPoint,
    opacity: u8,
    in_flight: Vec<AnimationId>,
    writes: usize,
}

#[derive(Default)]
struct MockTargets {
    nodes: HashMap<NodeId, Props>,
}

impl MockTargets {
    fn with(ids: &[NodeId]) -> Self {
        let mut t = Self::default();
        for id in ids {
            t.nodes.insert(
                *id,
                Props {
                    opacity: 255,
                    ..Props::default()
                },
            );
        }
        t
    }
}

impl AnimationTarget for MockTargets {
    fn is_alive(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn apply(&mut self, node: NodeId, value: PropertyValue) {
        let p = self.nodes.get_mut(&node).unwrap();
        p.writes += 1;
        match value {
            PropertyValue::Position(pos) => p.position = pos,
            PropertyValue::Opacity(o) => p.opacity = o,
        }
    }

    fn register(&mut self, node: NodeId, id: AnimationId) {
        self.nodes.get_mut(&node).unwrap().in_flight.push(id);
    }

    fn unregister(&mut self, node: NodeId, id: AnimationId) {
        self.nodes
            .get_mut(&node)
            .unwrap()
            .in_flight
            .retain(|a| *a != id);
    }
}

fn node(idx: u32) -> NodeId {
    NodeId { idx, generation: 0 }
}

fn counter() -> (Arc<AtomicUsize>, impl FnOnce(&mut Commands) + Send + 'static) {
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    (hits, move |_cmds: &mut Commands| {
        h.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn already_elapsed_animation_completes_synchronously() {
    let n = node(0);
    let mut targets = MockTargets::with(&[n]);
    let mut anim = Animator::new();
    let mut cmds = Commands::new();
    let (hits, cb) = counter();

    let req = AnimationRequest::movement(n, IPoint::ZERO, IPoint::new(40, 50), 0.0, 1.0)
        .on_complete(cb);
    let id = anim.schedule(&mut targets, 2.0, req, &mut cmds).unwrap();

    assert_eq!(anim.len(), 0);
    assert_eq!(anim.state(id), None);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    let p = &targets.nodes[&n];
    assert_eq!(p.position, IPoint::new(40, 50));
    assert_eq!(p.writes, 1);
    assert!(p.in_flight.is_empty());
}

#[test]
fn end_equal_to_now_counts_as_elapsed() {
    let n = node(0);
    let mut targets = MockTargets::with(&[n]);
    let mut anim = Animator::new();
    let mut cmds = Commands::new();

    anim.schedule(&mut targets, 1.0, AnimationRequest::fade(n, 255, 0, 0.0, 1.0), &mut cmds)
        .unwrap();
    assert!(anim.is_empty());
    assert_eq!(targets.nodes[&n].opacity, 0);
}

#[test]
fn tick_interpolates_then_lands_exactly_on_end() {
    let n = node(0);
    let mut targets = MockTargets::with(&[n]);
    let mut anim = Animator::new();
    let mut cmds = Commands::new();
    let (hits, cb) = counter();

    let req = AnimationRequest::movement(n, IPoint::ZERO, IPoint::new(10, -10), 0.0, 0.75)
        .on_complete(cb);
    let id = anim.schedule(&mut targets, 0.0, req, &mut cmds).unwrap();
    assert_eq!(anim.state(id), Some(AnimationState::Active));
    assert_eq!(targets.nodes[&n].in_flight, vec![id]);

    anim.tick(&mut targets, 0.375, &mut cmds);
    assert_eq!(targets.nodes[&n].position, IPoint::new(5, -5));
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    anim.tick(&mut targets, 0.75, &mut cmds);
    assert_eq!(targets.nodes[&n].position, IPoint::new(10, -10));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(anim.is_empty());
    assert!(targets.nodes[&n].in_flight.is_empty());

    anim.tick(&mut targets, 5.0, &mut cmds);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn position_floors_and_opacity_rounds() {
    let pos = AnimatedProperty::Position {
        from: IPoint::new(0, 0),
        to: IPoint::new(-3, 3),
    };
    assert_eq!(pos.value_at(0.5), PropertyValue::Position(IPoint::new(-2, 1)));

    let fade = AnimatedProperty::Opacity { from: 0, to: 255 };
    assert_eq!(fade.value_at(0.5), PropertyValue::Opacity(128));
    assert_eq!(fade.value_at(1.2), PropertyValue::Opacity(255));
    assert_eq!(fade.value_at(-0.2), PropertyValue::Opacity(0));
}

#[test]
fn cancel_restores_start_and_skips_callback() {
    let n = node(0);
    let mut targets = MockTargets::with(&[n]);
    let mut anim = Animator::new();
    let mut cmds = Commands::new();
    let (hits, cb) = counter();

    let id = anim
        .schedule(
            &mut targets,
            0.0,
            AnimationRequest::fade(n, 200, 0, 0.0, 1.0).on_complete(cb),
            &mut cmds,
        )
        .unwrap();
    anim.tick(&mut targets, 0.5, &mut cmds);
    assert_eq!(targets.nodes[&n].opacity, 100);

    assert!(anim.cancel(&mut targets, id));
    assert_eq!(targets.nodes[&n].opacity, 200);
    assert!(anim.is_empty());
    assert!(!anim.cancel(&mut targets, id));

    anim.tick(&mut targets, 2.0, &mut cmds);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(targets.nodes[&n].opacity, 200);
    assert_eq!(anim.cancelled_count(), 1);
}

#[test]
fn completion_callback_can_queue_follow_up() {
    let n = node(0);
    let mut targets = MockTargets::with(&[n]);
    let mut anim = Animator::new();
    let mut cmds = Commands::new();

    let req = AnimationRequest::fade(n, 255, 0, 0.0, 1.0).on_complete(move |c: &mut Commands| {
        c.animate(AnimationRequest::fade(n, 0, 255, 1.0, 2.0));
    });
    anim.schedule(&mut targets, 0.0, req, &mut cmds).unwrap();
    anim.tick(&mut targets, 1.0, &mut cmds);

    assert!(anim.is_empty());
    let queued: Vec<Command> = cmds.drain().collect();
    assert_eq!(queued.len(), 1);
    assert!(matches!(queued[0], Command::Animate(_)));
}

#[test]
fn dead_target_is_rejected_at_schedule_and_dropped_on_tick() {
    let alive = node(0);
    let gone = node(1);
    let mut targets = MockTargets::with(&[alive]);
    let mut anim = Animator::new();
    let mut cmds = Commands::new();

    let err = anim
        .schedule(&mut targets, 0.0, AnimationRequest::fade(gone, 0, 1, 0.0, 1.0), &mut cmds)
        .unwrap_err();
    assert!(err.to_string().contains("animation error"));

    anim.schedule(&mut targets, 0.0, AnimationRequest::fade(alive, 0, 255, 0.0, 1.0), &mut cmds)
        .unwrap();
    targets.nodes.remove(&alive);
    anim.tick(&mut targets, 0.5, &mut cmds);
    assert!(anim.is_empty());
}

#[test]
fn reversed_interval_is_rejected() {
    let n = node(0);
    let mut targets = MockTargets::with(&[n]);
    let mut anim = Animator::new();
    let mut cmds = Commands::new();
    assert!(
        anim.schedule(&mut targets, 0.0, AnimationRequest::fade(n, 0, 1, 2.0, 1.0), &mut cmds)
            .is_err()
    );
}

#[test]
fn delayed_start_holds_start_value() {
    let n = node(0);
    let mut targets = MockTargets::with(&[n]);
    let mut anim = Animator::new();
    let mut cmds = Commands::new();

    let req = AnimationRequest::movement(n, IPoint::new(5, 5), IPoint::new(15, 5), 1.0, 2.0)
        .eased(Ease::InQuad);
    anim.schedule(&mut targets, 0.0, req, &mut cmds).unwrap();
    anim.tick(&mut targets, 0.5, &mut cmds);
    assert_eq!(targets.nodes[&n].position, IPoint::new(5, 5));
    anim.tick(&mut targets, 1.5, &mut cmds);
    // InQuad(0.5) = 0.25 -> 5 + 10 * 0.25
    assert_eq!(targets.nodes[&n].position, IPoint::new(7, 5));
}

#[test]
fn cancel_all_only_touches_one_node() {
    let a = node(0);
    let b = node(1);
    let mut targets = MockTargets::with(&[a, b]);
    let mut anim = Animator::new();
    let mut cmds = Commands::new();

    for n in [a, a, b] {
        anim.schedule(&mut targets, 0.0, AnimationRequest::fade(n, 255, 0, 0.0, 1.0), &mut cmds)
            .unwrap();
    }
    assert_eq!(anim.cancel_all(&mut targets, a), 2);
    assert_eq!(anim.len(), 1);
}

use super::*;
use crate::foundation::core::Point;
use crate::geometry::anchor::{Anchor, AnchorPair};
use crate::geometry::position::SizeSpec;
use crate::render::surface::{Texture, TextureSource};
use crate::scene::node::Node;

const TOP_LEFT: AnchorPair = AnchorPair::new(Anchor::Start, Anchor::Start);
const BIAS_TOP_LEFT: AnchorPair = AnchorPair::new(Anchor::End, Anchor::End);

fn rect(w: i32, h: i32, color: Rgba8) -> Node {
    Node::rect(SizeSpec::Fixed(ISize::new(w, h)), color).anchored(TOP_LEFT, BIAS_TOP_LEFT)
}

fn attach(s: &mut Scene, parent: NodeId, node: Node) -> NodeId {
    let id = s.insert(node);
    s.attach(parent, id).unwrap();
    id
}

#[test]
fn sibling_order_is_draw_order() {
    let mut s = Scene::new(ISize::new(100, 100));
    let root = s.root();
    let a = attach(&mut s, root, rect(10, 10, Rgba8::rgb(255, 0, 0)));
    let b = attach(&mut s, root, rect(10, 10, Rgba8::rgb(0, 255, 0)));
    let c = attach(&mut s, root, rect(10, 10, Rgba8::rgb(0, 0, 255)));

    let list = compile_draw_list(&mut s, 1.0);
    assert_eq!(list.painted_nodes(), vec![a, b, c]);
}

#[test]
fn middle_anchors_center_the_drawable() {
    let mut s = Scene::new(ISize::new(800, 600));
    let root = s.root();
    let id = attach(
        &mut s,
        root,
        Node::rect(SizeSpec::Fixed(ISize::new(100, 40)), Rgba8::WHITE),
    );
    let list = compile_draw_list(&mut s, 1.0);
    assert_eq!(
        list.ops,
        vec![DrawOp::Fill {
            node: id,
            rect: IRect::new(350, 280, 100, 40),
            color: Rgba8::WHITE,
        }]
    );
    assert_eq!(
        s.node(id).unwrap().last_rect(),
        Some(IRect::new(350, 280, 100, 40))
    );
}

#[test]
fn group_offsets_accumulate() {
    let mut s = Scene::new(ISize::new(100, 100));
    let root = s.root();
    let outer = attach(&mut s, root, Node::group().at(10, 5));
    let inner = attach(&mut s, outer, Node::group_sized(ISize::new(20, 20)).at(3, 4));
    let id = attach(&mut s, inner, rect(2, 2, Rgba8::WHITE).at(1, 1));
    let end = attach(
        &mut s,
        inner,
        Node::rect(SizeSpec::Fixed(ISize::new(2, 2)), Rgba8::WHITE).anchored(
            AnchorPair::new(Anchor::End, Anchor::End),
            AnchorPair::new(Anchor::Start, Anchor::Start),
        ),
    );

    compile_draw_list(&mut s, 1.0);
    assert_eq!(s.node(id).unwrap().last_rect(), Some(IRect::new(14, 10, 2, 2)));
    assert_eq!(s.node(end).unwrap().last_rect(), Some(IRect::new(31, 27, 2, 2)));
}

#[test]
fn hidden_subtrees_are_skipped() {
    let mut s = Scene::new(ISize::new(100, 100));
    let root = s.root();
    let g = attach(&mut s, root, Node::group().hidden(true));
    let inside = attach(&mut s, g, rect(5, 5, Rgba8::WHITE));
    let hidden_leaf = attach(&mut s, root, rect(5, 5, Rgba8::WHITE).hidden(true));
    let shown = attach(&mut s, root, rect(5, 5, Rgba8::WHITE));

    let list = compile_draw_list(&mut s, 1.0);
    assert_eq!(list.painted_nodes(), vec![shown]);
    assert_eq!(s.node(inside).unwrap().last_rect(), None);
    assert_eq!(s.node(hidden_leaf).unwrap().last_rect(), None);
}

#[test]
fn hiding_a_group_clears_cached_rects_below_it() {
    let mut s = Scene::new(ISize::new(100, 100));
    let root = s.root();
    let outer = attach(&mut s, root, Node::group());
    let inner = attach(&mut s, outer, Node::group());
    let leaf = attach(&mut s, inner, rect(5, 5, Rgba8::WHITE));

    compile_draw_list(&mut s, 1.0);
    assert_eq!(s.node(leaf).unwrap().last_rect(), Some(IRect::new(0, 0, 5, 5)));

    s.set_hidden(outer, true).unwrap();
    refresh_layout(&mut s, 1.0);
    assert_eq!(s.node(leaf).unwrap().last_rect(), None);
    assert_eq!(s.node(inner).unwrap().last_rect(), None);
    assert_eq!(s.hit_test(Point::new(2.0, 2.0)), None);
}

#[test]
fn opacity_multiplies_down_the_tree() {
    let mut s = Scene::new(ISize::new(100, 100));
    let root = s.root();
    let g = attach(&mut s, root, Node::group().with_opacity(128));
    attach(&mut s, g, rect(5, 5, Rgba8::rgb(255, 0, 0)).with_opacity(128));

    let list = compile_draw_list(&mut s, 1.0);
    let DrawOp::Fill { color, .. } = &list.ops[0] else {
        panic!("expected a fill");
    };
    assert_eq!(color.a, 64);
}

#[test]
fn clipped_groups_restore_the_parent_clip() {
    let mut s = Scene::new(ISize::new(100, 100));
    let root = s.root();
    let g = attach(
        &mut s,
        root,
        Node::group_sized(ISize::new(10, 10)).at(5, 5).clipped(),
    );
    attach(&mut s, g, rect(50, 50, Rgba8::WHITE));

    let list = compile_draw_list(&mut s, 1.0);
    assert_eq!(list.ops.len(), 3);
    assert_eq!(list.ops[0], DrawOp::Clip(Some(IRect::new(5, 5, 10, 10))));
    assert_eq!(list.ops[2], DrawOp::Clip(None));
}

#[test]
fn sprites_without_texture_are_laid_out_but_not_drawn() {
    let mut s = Scene::new(ISize::new(100, 100));
    let root = s.root();
    let source = TextureSource::Solid {
        size: ISize::new(8, 4),
        color: Rgba8::WHITE,
    };
    let id = attach(
        &mut s,
        root,
        Node::sprite(source, SizeSpec::Texture { scale: 2.0 }).anchored(TOP_LEFT, BIAS_TOP_LEFT),
    );
    let list = compile_draw_list(&mut s, 1.0);
    assert!(list.ops.is_empty());
    assert_eq!(s.node(id).unwrap().last_rect(), Some(IRect::new(0, 0, 0, 0)));

    let d = s.node_mut(id).unwrap().drawable_data_mut().unwrap();
    d.texture = Some(Texture {
        id: TextureId(1),
        size: ISize::new(8, 4),
    });
    d.position.invalidate_size();
    let list = compile_draw_list(&mut s, 1.0);
    assert_eq!(
        list.ops,
        vec![DrawOp::Texture {
            node: id,
            texture: TextureId(1),
            src: None,
            dst: IRect::new(0, 0, 16, 8),
            rotation_deg: 0.0,
            flip: Flip::None,
            alpha: 255,
        }]
    );
}

#[test]
fn refresh_layout_emits_nothing_but_caches_rects() {
    let mut s = Scene::new(ISize::new(100, 100));
    let root = s.root();
    let id = attach(&mut s, root, rect(5, 5, Rgba8::WHITE).at(7, 8));
    refresh_layout(&mut s, 1.0);
    assert_eq!(s.node(id).unwrap().last_rect(), Some(IRect::new(7, 8, 5, 5)));
}

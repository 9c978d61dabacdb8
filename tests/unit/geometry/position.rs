use super::*;
use crate::geometry::anchor::Anchor;

const PARENT: ISize = ISize::new(800, 600);

#[test]
fn resolves_centered_rect() {
    let mut p = PositionState::new(IPoint::ZERO, SizeSpec::Fixed(ISize::new(100, 40)));
    assert_eq!(p.resolve(PARENT, 1.0, None), IRect::new(350, 280, 100, 40));
    assert_eq!(p.dirty_bits(), (false, false, false));
}

#[test]
fn move_only_recomputes_draw_position() {
    let mut p = PositionState::new(IPoint::ZERO, SizeSpec::Fixed(ISize::new(100, 40)));
    p.resolve(PARENT, 1.0, None);
    let before = p.recomputes();

    p.set_local(IPoint::new(10, 5));
    assert_eq!(p.dirty_bits(), (false, false, true));
    assert_eq!(p.resolve(PARENT, 1.0, None), IRect::new(360, 285, 100, 40));

    let after = p.recomputes();
    assert_eq!(after.origin, before.origin);
    assert_eq!(after.size, before.size);
    assert_eq!(after.draw, before.draw + 1);
}

#[test]
fn origin_resolution_marks_draw_dirty() {
    let mut p = PositionState::new(IPoint::ZERO, SizeSpec::Fixed(ISize::new(10, 10)));
    p.resolve(PARENT, 1.0, None);

    p.invalidate_origin();
    assert_eq!(p.dirty_bits(), (true, false, false));
    p.resolve_origin(ISize::new(400, 300));
    assert_eq!(p.dirty_bits(), (false, false, true));
    p.resolve_draw_position();
    assert_eq!(p.resolve(ISize::new(400, 300), 1.0, None), IRect::new(195, 145, 10, 10));
}

#[test]
fn size_resolution_marks_draw_dirty() {
    let mut p = PositionState::new(IPoint::ZERO, SizeSpec::Scaled(ISize::new(100, 40)));
    p.resolve(PARENT, 1.0, None);

    p.invalidate_scale();
    assert_eq!(p.dirty_bits(), (false, true, false));
    p.resolve_size(2.0, None);
    assert_eq!(p.dirty_bits(), (false, false, true));
    assert_eq!(p.resolve(PARENT, 2.0, None), IRect::new(300, 260, 200, 80));
}

#[test]
fn fixed_sizes_ignore_scale_changes() {
    let mut p = PositionState::new(IPoint::ZERO, SizeSpec::Fixed(ISize::new(100, 40)));
    p.resolve(PARENT, 1.0, None);
    p.invalidate_scale();
    assert_eq!(p.dirty_bits(), (false, false, false));
}

#[test]
fn texture_size_follows_loaded_texture() {
    let mut p = PositionState::new(IPoint::ZERO, SizeSpec::Texture { scale: 0.5 });
    p.set_anchors(
        AnchorPair::new(Anchor::Start, Anchor::Start),
        AnchorPair::new(Anchor::End, Anchor::End),
    );
    assert_eq!(
        p.resolve(PARENT, 1.0, Some(ISize::new(64, 32))),
        IRect::new(0, 0, 32, 16)
    );
}

use super::*;

#[test]
fn rect_intersection_and_containment() {
    let a = IRect::new(0, 0, 10, 10);
    let b = IRect::new(5, 5, 10, 10);
    assert_eq!(a.intersect(b), IRect::new(5, 5, 5, 5));
    assert!(a.intersect(IRect::new(20, 20, 1, 1)).is_empty());

    assert!(a.contains(Point::new(0.0, 0.0)));
    assert!(a.contains(Point::new(9.5, 9.5)));
    assert!(!a.contains(Point::new(10.0, 5.0)));
}

#[test]
fn size_validation_rejects_empty() {
    assert!(ISize::non_empty(0, 10).is_err());
    assert!(ISize::non_empty(-1, 10).is_err());
    assert_eq!(ISize::non_empty(3, 4).unwrap(), ISize::new(3, 4));
}

#[test]
fn scaled_floor_rounds_down() {
    assert_eq!(ISize::new(100, 40).scaled_floor(1.5), ISize::new(150, 60));
    assert_eq!(ISize::new(33, 33).scaled_floor(0.5), ISize::new(16, 16));
}

#[test]
fn opacity_scales_alpha_only() {
    let c = Rgba8::rgba(200, 100, 50, 255).with_opacity(128);
    assert_eq!((c.r, c.g, c.b), (200, 100, 50));
    assert_eq!(c.a, 128);
    assert_eq!(Rgba8::WHITE.with_opacity(0).a, 0);
}

#[test]
fn premul_matches_straight_for_opaque() {
    assert_eq!(Rgba8::rgb(1, 2, 3).to_premul(), [1, 2, 3, 255]);
    assert_eq!(Rgba8::TRANSPARENT.to_premul(), [0, 0, 0, 0]);
}

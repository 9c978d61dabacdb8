use super::*;

#[test]
fn over_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [200, 100, 50, 255];
    assert_eq!(over(dst, src, 0), dst);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    assert_eq!(over(dst, [0, 0, 0, 0], 255), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [10, 20, 30, 255];
    let src = [200, 100, 50, 255];
    assert_eq!(over(dst, src, 255), src);
}

#[test]
fn over_dst_transparent_returns_scaled_src() {
    let src = [200, 100, 50, 255];
    assert_eq!(over([0, 0, 0, 0], src, 128), [100, 50, 25, 128]);
}

#[test]
fn premultiply_then_unpremultiply_keeps_opaque_and_clears_transparent() {
    let mut px = vec![100, 50, 200, 255, 9, 9, 9, 0, 200, 100, 50, 128];
    premultiply_in_place(&mut px);
    assert_eq!(&px[..8], &[100, 50, 200, 255, 0, 0, 0, 0]);
    assert_eq!(&px[8..], &[100, 50, 25, 128]);

    unpremultiply_in_place(&mut px);
    assert_eq!(&px[..4], &[100, 50, 200, 255]);
    assert_eq!(&px[8..], &[199, 100, 50, 128]);
}

use crate::foundation::core::{Flip, IPoint, IRect, ISize, Rgba8, mul_div255};
use crate::render::surface::{Surface, TextureId};
use crate::scene::node::{NodeId, NodeKind, Paint};
use crate::scene::tree::Scene;

/// One surface call emitted by the draw walker.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Solid rectangle; `color.a` already carries the effective opacity.
    Fill {
        /// Node that produced the op.
        node: NodeId,
        /// Absolute destination rectangle.
        rect: IRect,
        /// Straight-alpha fill color.
        color: Rgba8,
    },
    /// Textured quad.
    Texture {
        /// Node that produced the op.
        node: NodeId,
        /// Loaded texture.
        texture: TextureId,
        /// Source sub-rectangle; whole texture when `None`.
        src: Option<IRect>,
        /// Absolute destination rectangle.
        dst: IRect,
        /// Clockwise rotation in degrees.
        rotation_deg: f64,
        /// Mirroring.
        flip: Flip,
        /// Effective opacity.
        alpha: u8,
    },
    /// Replace the current clip.
    Clip(Option<IRect>),
}

/// Ordered surface calls for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    /// Ops in issue order (back to front).
    pub ops: Vec<DrawOp>,
}

impl DrawList {
    /// Nodes that emit a paint op, in draw order.
    pub fn painted_nodes(&self) -> Vec<NodeId> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Fill { node, .. } | DrawOp::Texture { node, .. } => Some(*node),
                DrawOp::Clip(_) => None,
            })
            .collect()
    }
}

struct Walk<'a> {
    scale: f64,
    ops: Option<&'a mut Vec<DrawOp>>,
}

/// Resolve geometry for every visible drawable and build the frame's draw list.
///
/// Pre-order from the root: a group adds its local offset to the cumulative position and
/// hands its extent to its children; a drawable's rectangle is cumulative + origin + bias +
/// local. Hidden nodes skip their subtree, and every node in it loses its cached
/// rectangle. Each laid-out drawable caches its absolute rectangle for hit testing.
pub fn compile_draw_list(scene: &mut Scene, viewport_scale: f64) -> DrawList {
    let mut ops = Vec::new();
    let mut walk = Walk {
        scale: viewport_scale,
        ops: Some(&mut ops),
    };
    walk_root(scene, &mut walk);
    DrawList { ops }
}

/// Same traversal as [`compile_draw_list`] without emitting ops.
pub(crate) fn refresh_layout(scene: &mut Scene, viewport_scale: f64) {
    let mut walk = Walk {
        scale: viewport_scale,
        ops: None,
    };
    walk_root(scene, &mut walk);
}

/// Issue a compiled draw list against a surface.
pub fn execute_draw_list<S: Surface + ?Sized>(list: &DrawList, surface: &mut S) {
    for op in &list.ops {
        match op {
            DrawOp::Fill { rect, color, .. } => surface.fill_rect(*rect, *color),
            DrawOp::Texture {
                texture,
                src,
                dst,
                rotation_deg,
                flip,
                alpha,
                ..
            } => surface.draw_texture(*texture, *src, *dst, *rotation_deg, *flip, *alpha),
            DrawOp::Clip(clip) => surface.set_clip(*clip),
        }
    }
}

fn walk_root(scene: &mut Scene, walk: &mut Walk<'_>) {
    let root = scene.root();
    let extent = scene.root_size();
    walk_node(scene, walk, root, IPoint::ZERO, extent, 255, None);
}

fn walk_node(
    scene: &mut Scene,
    walk: &mut Walk<'_>,
    id: NodeId,
    offset: IPoint,
    parent_extent: ISize,
    parent_opacity: u8,
    clip: Option<IRect>,
) {
    let Some(node) = scene.node_mut(id) else {
        return;
    };
    if node.hidden {
        for hidden in scene.subtree(id) {
            if let Some(n) = scene.node_mut(hidden) {
                n.last_rect = None;
            }
        }
        return;
    }
    let opacity = mul_div255(parent_opacity, node.opacity);

    match &mut node.kind {
        NodeKind::Group(g) => {
            let cumulative = offset + g.local;
            let extent = g.size.unwrap_or(parent_extent);
            let children = g.children.clone();

            let mut child_clip = clip;
            let clips = g.clip && g.size.is_some();
            if clips {
                let bounds = IRect::from_origin_size(cumulative, extent);
                let narrowed = match clip {
                    Some(c) => c.intersect(bounds),
                    None => bounds,
                };
                child_clip = Some(narrowed);
                walk.emit(DrawOp::Clip(child_clip));
            }

            for child in children {
                walk_node(scene, walk, child, cumulative, extent, opacity, child_clip);
            }

            if clips {
                walk.emit(DrawOp::Clip(clip));
            }
        }
        NodeKind::Drawable(d) => {
            let texture_size = d.texture.map(|t| t.size);
            let rel = d.position.resolve(parent_extent, walk.scale, texture_size);
            let rect = IRect::from_origin_size(rel.origin() + offset, rel.size());
            let op = match &d.paint {
                Paint::Rect { color } => Some(DrawOp::Fill {
                    node: id,
                    rect,
                    color: color.with_opacity(opacity),
                }),
                Paint::Sprite {
                    src_rect,
                    rotation_deg,
                    flip,
                    ..
                } => d.texture.map(|t| DrawOp::Texture {
                    node: id,
                    texture: t.id,
                    src: *src_rect,
                    dst: rect,
                    rotation_deg: *rotation_deg,
                    flip: *flip,
                    alpha: opacity,
                }),
            };
            node.last_rect = Some(rect);
            if let Some(op) = op {
                walk.emit(op);
            }
        }
    }
}

impl Walk<'_> {
    fn emit(&mut self, op: DrawOp) {
        if let Some(ops) = self.ops.as_deref_mut() {
            ops.push(op);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/walker.rs"]
mod tests;

//! JSON description of a scene: stage settings, a node tree under the root and a list of
//! animations addressed by node name.

use std::collections::{BTreeMap, BTreeSet};

use crate::animation::ease::Ease;
use crate::animation::scheduler::{AnimatedProperty, AnimationRequest};
use crate::config::StageConfig;
use crate::foundation::core::{Flip, IPoint, IRect, ISize, Rgba8};
use crate::foundation::error::{StageError, StageResult};
use crate::geometry::anchor::AnchorPair;
use crate::geometry::position::SizeSpec;
use crate::render::surface::{Surface, TextureSource};
use crate::scene::node::{Node, NodeId};
use crate::stage::Stage;

/// A complete scene document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    /// Stage settings.
    pub config: StageConfig,
    /// Children of the root group, in draw order.
    pub nodes: Vec<NodeDesc>,
    /// Animations to schedule once the tree is built.
    pub animations: Vec<AnimationDesc>,
}

/// One node and, for groups, its children.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeDesc {
    /// Name used by animations and returned by [`SceneDescription::build`].
    #[serde(default)]
    pub name: Option<String>,
    /// Local offset.
    #[serde(default)]
    pub position: IPoint,
    /// Opacity.
    #[serde(default = "opaque")]
    pub opacity: u8,
    /// Start hidden.
    #[serde(default)]
    pub hidden: bool,
    /// Opt out of events.
    #[serde(default)]
    pub ignore_events: bool,
    /// Group or drawable payload.
    #[serde(flatten)]
    pub kind: NodeKindDesc,
}

fn opaque() -> u8 {
    255
}

fn unit_texture_scale() -> SizeSpec {
    SizeSpec::Texture { scale: 1.0 }
}

/// Payload of a [`NodeDesc`], tagged by `kind`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKindDesc {
    /// Group node.
    Group {
        /// Explicit extent; inherits the parent's when absent.
        #[serde(default)]
        size: Option<ISize>,
        /// Clip children to the group's bounds.
        #[serde(default)]
        clip: bool,
        /// Children in draw order.
        #[serde(default)]
        children: Vec<NodeDesc>,
    },
    /// Solid rectangle.
    Rect {
        /// Size spec.
        size: SizeSpec,
        /// Fill color.
        #[serde(default)]
        color: Rgba8,
        /// Origin anchors.
        #[serde(default)]
        origin: AnchorPair,
        /// Bias anchors.
        #[serde(default)]
        bias: AnchorPair,
    },
    /// Textured sprite.
    Sprite {
        /// Texture source.
        source: TextureSource,
        /// Size spec; the texture's natural size by default.
        #[serde(default = "unit_texture_scale")]
        size: SizeSpec,
        /// Sub-rectangle of the texture.
        #[serde(default)]
        src_rect: Option<IRect>,
        /// Clockwise rotation in degrees.
        #[serde(default)]
        rotation_deg: f64,
        /// Mirroring.
        #[serde(default)]
        flip: Flip,
        /// Origin anchors.
        #[serde(default)]
        origin: AnchorPair,
        /// Bias anchors.
        #[serde(default)]
        bias: AnchorPair,
    },
}

/// An animation of a named node.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimationDesc {
    /// Target node name.
    pub node: String,
    /// Property and endpoints.
    pub property: AnimatedProperty,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Easing curve.
    #[serde(default)]
    pub ease: Ease,
}

impl SceneDescription {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> StageResult<Self> {
        let desc: Self = serde_json::from_str(s)
            .map_err(|e| StageError::serde(format!("parse scene description: {e}")))?;
        desc.validate()?;
        Ok(desc)
    }

    /// Check the config, name uniqueness, animation targets and time ranges.
    pub fn validate(&self) -> StageResult<()> {
        self.config.validate()?;

        let mut names = BTreeSet::new();
        let mut stack: Vec<&NodeDesc> = self.nodes.iter().collect();
        while let Some(node) = stack.pop() {
            if let Some(name) = &node.name
                && !names.insert(name.as_str())
            {
                return Err(StageError::validation(format!(
                    "node name '{name}' is used more than once"
                )));
            }
            if let NodeKindDesc::Group { children, .. } = &node.kind {
                stack.extend(children.iter());
            }
        }

        for anim in &self.animations {
            if !names.contains(anim.node.as_str()) {
                return Err(StageError::validation(format!(
                    "animation references unknown node '{}'",
                    anim.node
                )));
            }
            if !(anim.start.is_finite() && anim.end.is_finite()) || anim.end < anim.start {
                return Err(StageError::validation(format!(
                    "animation of '{}' has an invalid time range",
                    anim.node
                )));
            }
        }
        Ok(())
    }

    /// Number of nodes described, excluding the root.
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[NodeDesc]) -> usize {
            nodes
                .iter()
                .map(|n| match &n.kind {
                    NodeKindDesc::Group { children, .. } => 1 + count(children),
                    _ => 1,
                })
                .sum()
        }
        count(&self.nodes)
    }

    /// Create the tree under the stage root and schedule the animations.
    ///
    /// Returns the ids of every named node.
    pub fn build<S: Surface>(&self, stage: &mut Stage<S>) -> StageResult<BTreeMap<String, NodeId>> {
        self.validate()?;
        let mut ids = BTreeMap::new();
        let root = stage.root();
        for node in &self.nodes {
            spawn(stage, root, node, &mut ids)?;
        }
        for anim in &self.animations {
            let target = ids.get(&anim.node).copied().ok_or_else(|| {
                StageError::validation(format!("unknown node '{}'", anim.node))
            })?;
            let request = AnimationRequest::new(target, anim.property, anim.start, anim.end)
                .eased(anim.ease);
            stage.animate(request)?;
        }
        Ok(ids)
    }
}

fn spawn<S: Surface>(
    stage: &mut Stage<S>,
    parent: NodeId,
    desc: &NodeDesc,
    ids: &mut BTreeMap<String, NodeId>,
) -> StageResult<()> {
    let node = match &desc.kind {
        NodeKindDesc::Group { size, clip, .. } => {
            let node = match size {
                Some(s) => Node::group_sized(*s),
                None => Node::group(),
            };
            if *clip { node.clipped() } else { node }
        }
        NodeKindDesc::Rect {
            size,
            color,
            origin,
            bias,
        } => Node::rect(*size, *color).anchored(*origin, *bias),
        NodeKindDesc::Sprite {
            source,
            size,
            src_rect,
            rotation_deg,
            flip,
            origin,
            bias,
        } => {
            let node = Node::sprite(source.clone(), *size)
                .anchored(*origin, *bias)
                .rotated(*rotation_deg)
                .flipped(*flip);
            match src_rect {
                Some(r) => node.with_src_rect(*r),
                None => node,
            }
        }
    };
    let mut node = node
        .at(desc.position.x, desc.position.y)
        .with_opacity(desc.opacity)
        .hidden(desc.hidden)
        .ignoring_events(desc.ignore_events);
    if let Some(name) = &desc.name {
        node = node.named(name.clone());
    }

    let id = stage.spawn(parent, node)?;
    if let Some(name) = &desc.name {
        ids.insert(name.clone(), id);
    }
    if let NodeKindDesc::Group { children, .. } = &desc.kind {
        for child in children {
            spawn(stage, id, child, ids)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/description.rs"]
mod tests;

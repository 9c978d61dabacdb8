use super::*;
use crate::render::cpu::CpuSurface;
use crate::scene::node::Lifecycle;

const DOC: &str = r#"{
    "config": { "default_size": { "w": 40, "h": 30 }, "clear_color": { "r": 0, "g": 0, "b": 0, "a": 255 } },
    "nodes": [
        { "kind": "rect", "name": "bg", "size": { "fixed": { "w": 40, "h": 30 } },
          "color": { "r": 10, "g": 20, "b": 30, "a": 255 } },
        { "kind": "group", "name": "panel", "position": { "x": 2, "y": 3 },
          "size": { "w": 10, "h": 10 }, "clip": true,
          "children": [
              { "kind": "sprite", "name": "icon", "opacity": 128,
                "source": { "kind": "solid", "size": { "w": 4, "h": 4 },
                            "color": { "r": 255, "g": 0, "b": 0, "a": 255 } },
                "origin": { "x": "start", "y": "start" }, "bias": { "x": "end", "y": "end" } }
          ] }
    ],
    "animations": [
        { "node": "icon", "property": { "kind": "position", "from": { "x": 0, "y": 0 }, "to": { "x": 6, "y": 0 } },
          "start": 0.0, "end": 1.0, "ease": "in_out_quad" }
    ]
}"#;

#[test]
fn parses_and_counts_nodes() {
    let desc = SceneDescription::from_json_str(DOC).unwrap();
    assert_eq!(desc.config.default_size, ISize::new(40, 30));
    assert_eq!(desc.node_count(), 3);
    assert_eq!(desc.animations[0].ease, Ease::InOutQuad);
    let NodeKindDesc::Sprite { size, .. } = &desc.nodes[1].kind_children()[0].kind else {
        panic!("expected a sprite");
    };
    assert_eq!(*size, SizeSpec::Texture { scale: 1.0 });
}

#[test]
fn build_creates_named_nodes_and_animations() {
    let desc = SceneDescription::from_json_str(DOC).unwrap();
    let surface = CpuSurface::new(desc.config.default_size).unwrap();
    let mut stage = Stage::new(surface, desc.config.clone()).unwrap();
    let ids = desc.build(&mut stage).unwrap();

    assert_eq!(ids.len(), 3);
    let icon = ids["icon"];
    let node = stage.node(icon).unwrap();
    assert_eq!(node.parent(), Some(ids["panel"]));
    assert_eq!(node.opacity(), 128);
    assert_eq!(node.lifecycle(), Lifecycle::Inactive);
    assert_eq!(node.animations().len(), 1);
    assert_eq!(stage.animator().len(), 1);
}

#[test]
fn duplicate_names_are_rejected() {
    let doc = r#"{ "nodes": [
        { "kind": "group", "name": "a" },
        { "kind": "rect", "name": "a", "size": { "fixed": { "w": 1, "h": 1 } } }
    ] }"#;
    assert!(matches!(
        SceneDescription::from_json_str(doc),
        Err(StageError::Validation(_))
    ));
}

#[test]
fn unknown_animation_targets_are_rejected() {
    let doc = r#"{ "animations": [
        { "node": "ghost", "property": { "kind": "opacity", "from": 0, "to": 255 }, "start": 0, "end": 1 }
    ] }"#;
    assert!(matches!(
        SceneDescription::from_json_str(doc),
        Err(StageError::Validation(_))
    ));
}

#[test]
fn malformed_json_is_a_serde_error() {
    assert!(matches!(
        SceneDescription::from_json_str("{ nodes: "),
        Err(StageError::Serde(_))
    ));
}

impl NodeDesc {
    fn kind_children(&self) -> &[NodeDesc] {
        match &self.kind {
            NodeKindDesc::Group { children, .. } => children,
            _ => &[],
        }
    }
}

#![allow(clippy::float_cmp)]

use serde_json::json;
use uuid::Uuid;

use super::*;

fn make_node(id: Uuid, shape: &str, z: i64) -> DiagramNode {
    DiagramNode {
        id,
        shape: shape.to_owned(),
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 60.0,
        rotation: 0.0,
        z_index: z,
        props: json!({}),
    }
}

fn make_connector(id: Uuid, source: Uuid, target: Uuid) -> Connector {
    Connector {
        id,
        source_id: source,
        target_id: target,
        source_anchor: AnchorSide::Auto,
        target_anchor: AnchorSide::Auto,
        props: json!({}),
    }
}

fn uuid(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

// =============================================================
// Store basics
// =============================================================

#[test]
fn insert_and_get_node() {
    let mut doc = DiagramDoc::new();
    let id = uuid(1);
    doc.insert_node(make_node(id, "rectangle", 0));
    assert!(doc.node(&id).is_some());
    assert_eq!(doc.node_count(), 1);
}

#[test]
fn insert_same_id_overwrites() {
    let mut doc = DiagramDoc::new();
    let id = uuid(1);
    doc.insert_node(make_node(id, "rectangle", 0));
    doc.insert_node(make_node(id, "circle", 0));
    assert_eq!(doc.node_count(), 1);
    assert_eq!(doc.node(&id).map(|n| n.shape.as_str()), Some("circle"));
}

#[test]
fn remove_missing_node_is_none() {
    let mut doc = DiagramDoc::new();
    assert!(doc.remove_node(&uuid(9)).is_none());
}

#[test]
fn sorted_nodes_by_z_then_id() {
    let mut doc = DiagramDoc::new();
    doc.insert_node(make_node(uuid(3), "rectangle", 5));
    doc.insert_node(make_node(uuid(1), "rectangle", 5));
    doc.insert_node(make_node(uuid(2), "rectangle", -1));
    let order: Vec<Uuid> = doc.sorted_nodes().iter().map(|n| n.id).collect();
    assert_eq!(order, vec![uuid(2), uuid(1), uuid(3)]);
}

#[test]
fn clear_empties_everything() {
    let mut doc = DiagramDoc::new();
    doc.insert_node(make_node(uuid(1), "rectangle", 0));
    doc.insert_node(make_node(uuid(2), "rectangle", 0));
    doc.insert_connector(make_connector(uuid(10), uuid(1), uuid(2)));
    doc.clear();
    assert!(doc.is_empty());
}

// =============================================================
// Cascade delete
// =============================================================

#[test]
fn remove_node_cascades_attached_connectors() {
    let mut doc = DiagramDoc::new();
    let a = uuid(1);
    let b = uuid(2);
    let c = uuid(3);
    doc.insert_node(make_node(a, "rectangle", 0));
    doc.insert_node(make_node(b, "rectangle", 0));
    doc.insert_node(make_node(c, "rectangle", 0));
    doc.insert_connector(make_connector(uuid(10), a, b));
    doc.insert_connector(make_connector(uuid(11), b, c));
    doc.insert_connector(make_connector(uuid(12), a, c));

    let (_, cascaded) = doc.remove_node(&a).unwrap();
    assert_eq!(cascaded, vec![uuid(10), uuid(12)]);
    assert_eq!(doc.connector_count(), 1);
    assert!(doc.connector(&uuid(11)).is_some());
}

#[test]
fn connectors_touching_covers_both_ends() {
    let mut doc = DiagramDoc::new();
    let a = uuid(1);
    let b = uuid(2);
    doc.insert_node(make_node(a, "rectangle", 0));
    doc.insert_node(make_node(b, "rectangle", 0));
    doc.insert_connector(make_connector(uuid(10), a, b));
    doc.insert_connector(make_connector(uuid(11), b, a));

    assert_eq!(doc.connectors_touching(&a), vec![uuid(10), uuid(11)]);
    assert_eq!(doc.connectors_touching(&uuid(99)), Vec::<Uuid>::new());
}

// =============================================================
// Props merge
// =============================================================

#[test]
fn merge_node_props_inserts_and_deletes() {
    let mut doc = DiagramDoc::new();
    let id = uuid(1);
    let mut node = make_node(id, "rectangle", 0);
    node.props = json!({ "label": "old", "fill": "#FFFFFF" });
    doc.insert_node(node);

    assert!(doc.merge_node_props(&id, &json!({ "label": "new", "fill": null, "extra": 7 })));
    let props = &doc.node(&id).unwrap().props;
    assert_eq!(props.get("label"), Some(&json!("new")));
    assert_eq!(props.get("fill"), None);
    assert_eq!(props.get("extra"), Some(&json!(7)));
}

#[test]
fn merge_rejects_non_object_patch() {
    let mut doc = DiagramDoc::new();
    let id = uuid(1);
    doc.insert_node(make_node(id, "rectangle", 0));
    assert!(!doc.merge_node_props(&id, &json!("nope")));
    assert!(!doc.merge_node_props(&uuid(9), &json!({})));
}

#[test]
fn merge_replaces_malformed_bag() {
    let mut doc = DiagramDoc::new();
    let id = uuid(1);
    let mut node = make_node(id, "rectangle", 0);
    node.props = json!("garbage");
    doc.insert_node(node);

    assert!(doc.merge_node_props(&id, &json!({ "label": "ok" })));
    assert_eq!(doc.node(&id).unwrap().props, json!({ "label": "ok" }));
}

// =============================================================
// Safe reads
// =============================================================

#[test]
fn props_reads_are_total_on_missing_fields() {
    let value = json!({});
    let props = Props::new(&value);
    assert_eq!(props.fill(), None);
    assert_eq!(props.stroke_width(), None);
    assert_eq!(props.has_arrow(), None);
    assert_eq!(props.label(), None);
    assert_eq!(props.progress(), None);
}

#[test]
fn props_reads_are_total_on_wrong_types() {
    let value = json!({ "fill": 12, "strokeWidth": "wide", "hasArrow": "yes" });
    let props = Props::new(&value);
    assert_eq!(props.fill(), None);
    assert_eq!(props.stroke_width(), None);
    assert_eq!(props.has_arrow(), None);
}

#[test]
fn props_reads_are_total_on_non_object_bag() {
    let value = json!([1, 2, 3]);
    let props = Props::new(&value);
    assert_eq!(props.fill(), None);
    assert_eq!(props.str_field("anything"), None);
}

#[test]
fn props_typed_reads() {
    let value = json!({
        "fill": "#FF0000",
        "strokeWidth": 3.5,
        "lineStyle": "dashed",
        "hasArrow": false,
        "start": 2.0,
        "end": 9.0,
        "progress": 40.0,
        "priority": "high",
    });
    let props = Props::new(&value);
    assert_eq!(props.fill(), Some("#FF0000"));
    assert_eq!(props.stroke_width(), Some(3.5));
    assert_eq!(props.line_style(), Some(LineStyle::Dashed));
    assert_eq!(props.has_arrow(), Some(false));
    assert_eq!(props.start(), Some(2.0));
    assert_eq!(props.end(), Some(9.0));
    assert_eq!(props.progress(), Some(40.0));
    assert_eq!(props.priority(), Some("high"));
}

// =============================================================
// Tags and enums
// =============================================================

#[test]
fn line_style_from_tag_is_total() {
    assert_eq!(LineStyle::from_tag("dashed"), LineStyle::Dashed);
    assert_eq!(LineStyle::from_tag("dotted"), LineStyle::Dotted);
    assert_eq!(LineStyle::from_tag("solid"), LineStyle::Solid);
    assert_eq!(LineStyle::from_tag("zigzag"), LineStyle::Solid);
    assert_eq!(LineStyle::from_tag(""), LineStyle::Solid);
}

#[test]
fn line_style_tag_roundtrip() {
    for style in [LineStyle::Solid, LineStyle::Dashed, LineStyle::Dotted] {
        assert_eq!(LineStyle::from_tag(style.tag()), style);
    }
}

#[test]
fn anchor_side_serde_lowercase() {
    assert_eq!(serde_json::to_string(&AnchorSide::Left).unwrap(), "\"left\"");
    let back: AnchorSide = serde_json::from_str("\"auto\"").unwrap();
    assert_eq!(back, AnchorSide::Auto);
}

#[test]
fn node_deserialize_defaults_optional_fields() {
    let json = r#"{"id":"00000000-0000-0000-0000-000000000001","shape":"rectangle","x":1.0,"y":2.0,"width":10.0,"height":5.0}"#;
    let node: DiagramNode = serde_json::from_str(json).unwrap();
    assert_eq!(node.rotation, 0.0);
    assert_eq!(node.z_index, 0);
    assert!(node.props.is_object());
}

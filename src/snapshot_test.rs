#![allow(clippy::float_cmp)]

use serde_json::json;
use uuid::Uuid;

use super::*;
use crate::doc::AnchorSide;

fn uuid(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn make_node(id: Uuid, shape: &str) -> DiagramNode {
    DiagramNode {
        id,
        shape: shape.to_owned(),
        x: 1.0,
        y: 2.0,
        width: 100.0,
        height: 50.0,
        rotation: 0.0,
        z_index: 0,
        props: json!({ "label": "n" }),
    }
}

fn make_connector(id: Uuid, source: Uuid, target: Uuid) -> Connector {
    Connector {
        id,
        source_id: source,
        target_id: target,
        source_anchor: AnchorSide::Auto,
        target_anchor: AnchorSide::Auto,
        props: json!({ "lineStyle": "dashed" }),
    }
}

fn sample_doc() -> DiagramDoc {
    let mut doc = DiagramDoc::new();
    doc.insert_node(make_node(uuid(1), "rectangle"));
    doc.insert_node(make_node(uuid(2), "mystery-shape"));
    doc.insert_connector(make_connector(uuid(10), uuid(1), uuid(2)));
    doc
}

// =============================================================
// Round-trip
// =============================================================

#[test]
fn save_restore_roundtrip_is_lossless() {
    let doc = sample_doc();
    let background = Background::Solid { color: "#FFFFFF".to_owned() };
    let camera = Camera { pan_x: 3.0, pan_y: 4.0, zoom: 1.5 };

    let snapshot = save(&doc, &background, camera);
    let serialized = serde_json::to_string(&snapshot).unwrap();
    let parsed: Snapshot = serde_json::from_str(&serialized).unwrap();
    let (restored, restored_bg, restored_camera) = restore(parsed).unwrap();

    assert_eq!(restored.node_count(), 2);
    assert_eq!(restored.connector_count(), 1);
    assert_eq!(restored.node(&uuid(2)).unwrap().shape, "mystery-shape");
    assert_eq!(
        restored.connector(&uuid(10)).unwrap().props.get("lineStyle"),
        Some(&json!("dashed"))
    );
    assert_eq!(restored_bg, background);
    assert_eq!(restored_camera.zoom, 1.5);
}

#[test]
fn save_output_order_is_normalized() {
    let snapshot = save(&sample_doc(), &Background::default(), Camera::default());
    let ids: Vec<Uuid> = snapshot.nodes.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![uuid(1), uuid(2)]);
}

// =============================================================
// Validation
// =============================================================

#[test]
fn unsupported_version_is_a_typed_error() {
    let mut snapshot = save(&sample_doc(), &Background::default(), Camera::default());
    snapshot.version = 99;
    let err = restore(snapshot).unwrap_err();
    assert!(matches!(err, SnapshotError::UnsupportedVersion(99)));
    assert_eq!(err.error_code(), "E_SNAPSHOT_VERSION");
}

#[test]
fn dangling_connectors_are_dropped_not_fatal() {
    let mut snapshot = save(&sample_doc(), &Background::default(), Camera::default());
    snapshot.connectors.push(make_connector(uuid(11), uuid(1), uuid(404)));

    let (restored, ..) = restore(snapshot).unwrap();
    assert_eq!(restored.connector_count(), 1);
    assert!(restored.connector(&uuid(11)).is_none());
}

#[test]
fn snapshot_missing_optional_sections_deserializes() {
    let minimal = r#"{"version":1,"nodes":[],"connectors":[]}"#;
    let snapshot: Snapshot = serde_json::from_str(minimal).unwrap();
    let (doc, background, camera) = restore(snapshot).unwrap();
    assert!(doc.is_empty());
    assert_eq!(background, Background::Blank);
    assert_eq!(camera.zoom, 1.0);
}

// =============================================================
// Export
// =============================================================

#[test]
fn export_scene_orders_connectors_first() {
    let scene = export_scene(&sample_doc());
    assert_eq!(scene.len(), 3);
    assert!(matches!(scene[0].geometry, crate::shape::Geometry::Path { .. }));
}

#[test]
fn export_scene_skips_nothing_for_a_live_doc() {
    let doc = sample_doc();
    let scene = export_scene(&doc);
    let ids: Vec<Uuid> = scene.iter().map(|o| o.id).collect();
    assert!(ids.contains(&uuid(1)));
    assert!(ids.contains(&uuid(2)));
    assert!(ids.contains(&uuid(10)));
}

#[test]
fn export_objects_serialize_for_the_export_service() {
    let scene = export_scene(&sample_doc());
    let serialized = serde_json::to_string(&scene).unwrap();
    assert!(serialized.contains("\"type\""));
}

//! Persistence and export boundary.
//!
//! A [`Snapshot`] is the plain serde structure save/load collaborators
//! exchange with the engine: the full graph, the background, and the camera.
//! Restoring validates connector endpoints — a connector whose node vanished
//! from the payload is dropped with a warning rather than failing the whole
//! load, so one corrupt edge cannot take the document down with it.
//!
//! Export hands back a read-only draw list; rasterization into PNG/SVG/PDF
//! happens entirely on the other side of this boundary.

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::camera::Camera;
use crate::connector;
use crate::doc::{Connector, DiagramDoc, DiagramNode};
use crate::error::ErrorCode;
use crate::session::Background;
use crate::shape::{self, RenderObject};

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),
}

impl ErrorCode for SnapshotError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedVersion(_) => "E_SNAPSHOT_VERSION",
        }
    }
}

/// Serialized editor state. Round-trips the in-memory graph losslessly,
/// including shape tags and props keys this build does not know about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub nodes: Vec<DiagramNode>,
    pub connectors: Vec<Connector>,
    #[serde(default)]
    pub background: Background,
    #[serde(default)]
    pub camera: Camera,
}

/// Capture the current state. Output order is normalized by id so equal
/// content serializes identically.
#[must_use]
pub fn save(doc: &DiagramDoc, background: &Background, camera: Camera) -> Snapshot {
    Snapshot {
        version: SNAPSHOT_VERSION,
        nodes: doc.nodes_by_id().into_iter().cloned().collect(),
        connectors: doc.connectors_by_id().into_iter().cloned().collect(),
        background: background.clone(),
        camera,
    }
}

/// Rebuild a document from a snapshot.
///
/// # Errors
///
/// Returns [`SnapshotError::UnsupportedVersion`] for a schema version this
/// build does not understand. Dangling connectors are dropped, not fatal.
pub fn restore(snapshot: Snapshot) -> Result<(DiagramDoc, Background, Camera), SnapshotError> {
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(snapshot.version));
    }

    let mut doc = DiagramDoc::new();
    for node in snapshot.nodes {
        doc.insert_node(node);
    }
    for conn in snapshot.connectors {
        if doc.node(&conn.source_id).is_none() || doc.node(&conn.target_id).is_none() {
            warn!(connector_id = %conn.id, "snapshot connector references a missing node; dropping it");
            continue;
        }
        doc.insert_connector(conn);
    }
    Ok((doc, snapshot.background, snapshot.camera))
}

/// Read-only draw list for external rendering: connectors first (beneath),
/// then nodes in `(z_index, id)` order.
#[must_use]
pub fn export_scene(doc: &DiagramDoc) -> Vec<RenderObject> {
    let mut scene: Vec<RenderObject> = doc
        .connectors_by_id()
        .into_iter()
        .filter_map(|conn| connector::render(doc, conn))
        .collect();
    scene.extend(doc.sorted_nodes().into_iter().map(shape::render_node));
    scene
}

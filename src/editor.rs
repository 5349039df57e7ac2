//! Top-level editor facade and event entry points.
//!
//! `Editor` composes the graph document, the camera, and the per-editor
//! session into the single value a host shell drives: DOM events translate
//! into the methods here, and every mutation path funnels through the same
//! render coalescing, selection bridging, and connector rerouting. All graph
//! mutations are synchronous and atomic from the caller's perspective — a
//! call either fully applies before the next repaint or rejects outright.

#[cfg(test)]
#[path = "editor_test.rs"]
mod editor_test;

use serde_json::json;
use tracing::{debug, info};

use crate::bridge::{self, PanelField, PropertyRecord};
use crate::camera::Camera;
use crate::connector::{self, ConnectorError};
use crate::consts::{DEFAULT_NODE_H, DEFAULT_NODE_W};
use crate::describe;
use crate::doc::{ConnectorId, DiagramDoc, DiagramNode, NodeId, ObjectRef};
use crate::session::{Background, GenerationToken, RenderSurface, Session};
use crate::shape::RenderObject;
use crate::snapshot::{self, Snapshot, SnapshotError};
use crate::template::{self, Instantiated};

/// One open diagram editor: graph, camera, and session state.
pub struct Editor {
    pub doc: DiagramDoc,
    pub camera: Camera,
    pub session: Session,
}

impl Editor {
    /// Create an editor with an empty document and an inert session.
    #[must_use]
    pub fn new() -> Self {
        Self { doc: DiagramDoc::new(), camera: Camera::default(), session: Session::new() }
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Bind the host render surface and start accepting events. The current
    /// content becomes the clean baseline for dirty tracking.
    pub fn init(&mut self, surface: Box<dyn RenderSurface>) {
        self.session.init(surface);
        let baseline = crate::session::digest(&self.doc, self.session.background());
        self.session.mark_saved(baseline);
        info!(nodes = self.doc.node_count(), connectors = self.doc.connector_count(), "editor session started");
    }

    /// Release the surface and stop accepting events. In-flight generation
    /// requests are invalidated; their late completions will be ignored.
    pub fn teardown(&mut self) {
        self.session.teardown();
        info!("editor session torn down");
    }

    // ── Node operations ─────────────────────────────────────────

    /// Create a node from a direct user action. Unknown shape tags are kept
    /// verbatim and render with the fallback renderer.
    pub fn add_node(&mut self, shape: &str, x: f64, y: f64, label: &str) -> NodeId {
        let id = uuid::Uuid::new_v4();
        self.doc.insert_node(DiagramNode {
            id,
            shape: shape.to_owned(),
            x,
            y,
            width: DEFAULT_NODE_W,
            height: DEFAULT_NODE_H,
            rotation: 0.0,
            z_index: 0,
            props: json!({ "label": label }),
        });
        self.session.schedule_render();
        id
    }

    /// Delete a node. Attached connectors cascade; if the deleted node or a
    /// cascaded connector was selected, the selection resets and the panel
    /// hides. Returns `false` for an unknown id.
    pub fn delete_node(&mut self, id: &NodeId) -> bool {
        let Some((_, cascaded)) = self.doc.remove_node(id) else {
            return false;
        };
        if let Some(active) = self.session.selection().active() {
            let removed = match active {
                ObjectRef::Node(node_id) => node_id == *id,
                ObjectRef::Connector(conn_id) => cascaded.contains(&conn_id),
            };
            if removed {
                self.session.set_selection(None);
            }
        }
        self.session.schedule_render();
        true
    }

    /// Move a node and reroute everything attached to it. One gesture, one
    /// repaint.
    pub fn move_node(&mut self, id: &NodeId, x: f64, y: f64) -> bool {
        let Some(node) = self.doc.node_mut(id) else {
            return false;
        };
        node.x = x;
        node.y = y;
        connector::on_node_moved(&self.doc, &mut self.session, id);
        self.session.schedule_render();
        true
    }

    /// Resize a node and reroute everything attached to it.
    pub fn resize_node(&mut self, id: &NodeId, width: f64, height: f64) -> bool {
        let Some(node) = self.doc.node_mut(id) else {
            return false;
        };
        node.width = width.max(1.0);
        node.height = height.max(1.0);
        connector::on_node_moved(&self.doc, &mut self.session, id);
        self.session.schedule_render();
        true
    }

    /// Rotate a node around its bounding-box center.
    pub fn rotate_node(&mut self, id: &NodeId, degrees: f64) -> bool {
        let Some(node) = self.doc.node_mut(id) else {
            return false;
        };
        node.rotation = degrees;
        self.session.schedule_render();
        true
    }

    // ── Connector operations ────────────────────────────────────

    /// Connect two nodes.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::InvalidEndpoint`] if either node id is not
    /// live; nothing is created on failure.
    pub fn connect(&mut self, source: NodeId, target: NodeId) -> Result<ConnectorId, ConnectorError> {
        connector::create(&mut self.doc, &mut self.session, source, target, None)
    }

    /// Remove a connector; idempotent.
    pub fn disconnect(&mut self, id: &ConnectorId) {
        connector::remove(&mut self.doc, &mut self.session, id);
        if self.session.selection().active() == Some(ObjectRef::Connector(*id)) {
            self.session.set_selection(None);
        }
    }

    // ── Selection / property panel ──────────────────────────────

    /// Canvas selection event. Ignored unless the session is live (listeners
    /// only exist between `init` and `teardown`).
    pub fn select(&mut self, target: Option<ObjectRef>) -> Option<PropertyRecord> {
        if !self.session.is_live() {
            return None;
        }
        bridge::select(&self.doc, &mut self.session, target)
    }

    /// Re-read the active object's normalized properties.
    #[must_use]
    pub fn selection_properties(&self) -> Option<PropertyRecord> {
        bridge::normalize(&self.doc, &self.session.selection())
    }

    /// Panel field edit, written back onto the active object.
    pub fn edit(&mut self, field: PanelField, value: serde_json::Value) -> bool {
        bridge::apply_edit(&mut self.doc, &mut self.session, field, value)
    }

    // ── Templates and generation ────────────────────────────────

    /// Instantiate a template at the current viewport origin. Unknown ids
    /// instantiate the generic fallback chain.
    pub fn apply_template(&mut self, template_id: &str) -> Instantiated {
        info!(template_id, "instantiating template");
        template::instantiate(&mut self.doc, &mut self.session, template_id, self.camera.viewport_origin())
    }

    /// Start a text-to-diagram generation request. Supersedes any request
    /// still in flight (last-request-wins). Returns `None` when the session
    /// is not live.
    pub fn begin_generation(&mut self) -> Option<GenerationToken> {
        if !self.session.is_live() {
            return None;
        }
        Some(self.session.begin_generation())
    }

    /// Completion point for the generation collaborator. The description is
    /// parsed and instantiated only if `token` is still the current request
    /// and the session has not been torn down; stale completions are
    /// dropped.
    pub fn complete_generation(&mut self, token: GenerationToken, description: &str) -> Option<Instantiated> {
        if !self.session.accept_generation(token) {
            debug!("ignoring stale or post-teardown generation completion");
            return None;
        }
        Some(describe::apply(&mut self.doc, &mut self.session, description, self.camera.viewport_origin()))
    }

    // ── Background / rendering ──────────────────────────────────

    pub fn set_background(&mut self, background: Background) {
        self.session.set_background(background);
    }

    /// Flush the current gesture's coalesced render request to the surface.
    /// Returns whether a repaint was actually requested.
    pub fn flush_render(&mut self) -> bool {
        self.session.flush_render()
    }

    // ── Persistence / export ────────────────────────────────────

    /// Capture a snapshot and mark the current content as the clean
    /// baseline.
    pub fn save(&mut self) -> Snapshot {
        let snapshot = snapshot::save(&self.doc, self.session.background(), self.camera);
        let digest = crate::session::digest(&self.doc, self.session.background());
        self.session.mark_saved(digest);
        snapshot
    }

    /// Replace the current state from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::UnsupportedVersion`] for unknown schema
    /// versions; the current state is left untouched on error.
    pub fn load(&mut self, snapshot: Snapshot) -> Result<(), SnapshotError> {
        let (doc, background, camera) = snapshot::restore(snapshot)?;
        self.doc = doc;
        self.camera = camera;
        self.session.set_selection(None);
        self.session.set_background(background);
        let baseline = crate::session::digest(&self.doc, self.session.background());
        self.session.mark_saved(baseline);
        self.session.schedule_render();
        Ok(())
    }

    /// Read-only draw list for the export collaborator.
    #[must_use]
    pub fn export_scene(&self) -> Vec<RenderObject> {
        snapshot::export_scene(&self.doc)
    }

    /// Whether the content differs from the last saved baseline.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        let current = crate::session::digest(&self.doc, self.session.background());
        self.session.is_dirty(&current)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

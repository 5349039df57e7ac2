//! Document model: diagram nodes, connectors, and the in-memory store.
//!
//! This module defines the core data types that describe what is on the
//! canvas (`DiagramNode`, `Connector`), a typed accessor for the open-ended
//! `props` JSON bag (`Props`), and the runtime store that owns the live graph
//! (`DiagramDoc`).
//!
//! Nodes keep their shape tag as a plain string so that snapshots round-trip
//! tags this build does not know about; renderer resolution is total and
//! falls back to a rectangle (see [`crate::shape`]). The `props` bag
//! tolerates heterogeneous and malformed per-object property sets — every
//! read goes through `Props`, which never fails.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a diagram node.
pub type NodeId = Uuid;

/// Unique identifier for a connector.
pub type ConnectorId = Uuid;

/// Reference to a selectable object on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectRef {
    Node(NodeId),
    Connector(ConnectorId),
}

impl ObjectRef {
    /// Raw id regardless of kind.
    #[must_use]
    pub fn id(self) -> Uuid {
        match self {
            Self::Node(id) | Self::Connector(id) => id,
        }
    }
}

/// Which bounding-box side a connector endpoint attaches to.
///
/// `Auto` endpoints are resolved by the nearest-side heuristic on every
/// reroute; explicit sides are kept as the user set them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorSide {
    #[default]
    Auto,
    Top,
    Right,
    Bottom,
    Left,
}

/// Connector line style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    /// Parse a style tag. Unknown tags resolve to `Solid`, never an error.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "dashed" => Self::Dashed,
            "dotted" => Self::Dotted,
            _ => Self::Solid,
        }
    }

    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
        }
    }
}

/// A diagram node as stored in the document and in snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramNode {
    /// Unique identifier for this node.
    pub id: NodeId,
    /// Shape tag, e.g. `"rectangle"`, `"diamond"`, `"task"`. Stored verbatim;
    /// unknown tags render with the default rectangle renderer.
    pub shape: String,
    /// Left edge of the bounding box in world coordinates.
    pub x: f64,
    /// Top edge of the bounding box in world coordinates.
    pub y: f64,
    /// Width of the bounding box in world coordinates.
    pub width: f64,
    /// Height of the bounding box in world coordinates.
    pub height: f64,
    /// Clockwise rotation in degrees around the bounding-box center.
    #[serde(default)]
    pub rotation: f64,
    /// Stacking order; lower values are drawn beneath higher values.
    #[serde(default)]
    pub z_index: i64,
    /// Open-ended per-node properties: label, description, style overrides,
    /// and schedule domain data (`start`, `end`, `progress`, `priority`).
    #[serde(default = "empty_props")]
    pub props: serde_json::Value,
}

impl DiagramNode {
    /// World-space bounding box.
    #[must_use]
    pub fn bounds(&self) -> crate::camera::Rect {
        crate::camera::Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// A connector between two nodes, with its own style and routing intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connector {
    pub id: ConnectorId,
    /// Node the connector leaves from. Always a live node at insertion time.
    pub source_id: NodeId,
    /// Node the connector arrives at. Always a live node at insertion time.
    pub target_id: NodeId,
    /// Anchor intent at the source end.
    #[serde(default)]
    pub source_anchor: AnchorSide,
    /// Anchor intent at the target end.
    #[serde(default)]
    pub target_anchor: AnchorSide,
    /// Style bag: `stroke`, `strokeWidth`, `lineStyle`, `hasArrow`, `label`.
    #[serde(default = "empty_props")]
    pub props: serde_json::Value,
}

fn empty_props() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Typed access to common props fields from a `props` JSON value.
///
/// Every getter is total: a missing key, a key of the wrong type, or a bag
/// that is not an object all read as `None`. Callers substitute defaults at
/// one place (the property bridge and the style table), not per call site.
pub struct Props<'a> {
    value: &'a serde_json::Value,
}

impl<'a> Props<'a> {
    /// Wrap a reference to a `props` JSON value for typed access.
    #[must_use]
    pub fn new(value: &'a serde_json::Value) -> Self {
        Self { value }
    }

    /// Generic safe read of a string field.
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&'a str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Generic safe read of a numeric field.
    #[must_use]
    pub fn f64_field(&self, key: &str) -> Option<f64> {
        self.value.get(key).and_then(serde_json::Value::as_f64)
    }

    /// Generic safe read of a boolean field.
    #[must_use]
    pub fn bool_field(&self, key: &str) -> Option<bool> {
        self.value.get(key).and_then(serde_json::Value::as_bool)
    }

    /// Fill color as a CSS color string.
    #[must_use]
    pub fn fill(&self) -> Option<&'a str> {
        self.str_field("fill")
    }

    /// Stroke color as a CSS color string.
    #[must_use]
    pub fn stroke(&self) -> Option<&'a str> {
        self.str_field("stroke")
    }

    /// Stroke width in world units.
    #[must_use]
    pub fn stroke_width(&self) -> Option<f64> {
        self.f64_field("strokeWidth")
    }

    /// Label text color.
    #[must_use]
    pub fn text_color(&self) -> Option<&'a str> {
        self.str_field("textColor")
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> Option<&'a str> {
        self.str_field("label")
    }

    /// Longer free-text description.
    #[must_use]
    pub fn description(&self) -> Option<&'a str> {
        self.str_field("description")
    }

    /// Connector line style tag, parsed leniently.
    #[must_use]
    pub fn line_style(&self) -> Option<LineStyle> {
        self.str_field("lineStyle").map(LineStyle::from_tag)
    }

    /// Whether a connector draws an arrowhead at the target end.
    #[must_use]
    pub fn has_arrow(&self) -> Option<bool> {
        self.bool_field("hasArrow")
    }

    /// Schedule start, in whole days from the project origin.
    #[must_use]
    pub fn start(&self) -> Option<f64> {
        self.f64_field("start")
    }

    /// Schedule end, in whole days from the project origin.
    #[must_use]
    pub fn end(&self) -> Option<f64> {
        self.f64_field("end")
    }

    /// Completion percentage for schedule nodes.
    #[must_use]
    pub fn progress(&self) -> Option<f64> {
        self.f64_field("progress")
    }

    /// Priority tag for schedule nodes.
    #[must_use]
    pub fn priority(&self) -> Option<&'a str> {
        self.str_field("priority")
    }
}

/// In-memory store of the diagram graph.
///
/// Invariants: node and connector ids are unique within the store, and every
/// connector's endpoints reference live nodes. The second invariant is
/// enforced at the two insertion gates ([`crate::connector::create`] and
/// [`crate::snapshot::restore`]) and preserved here by cascading node removal
/// onto attached connectors.
#[derive(Debug)]
pub struct DiagramDoc {
    nodes: HashMap<NodeId, DiagramNode>,
    connectors: HashMap<ConnectorId, Connector>,
}

impl DiagramDoc {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: HashMap::new(), connectors: HashMap::new() }
    }

    // ── Nodes ───────────────────────────────────────────────────

    /// Insert or replace a node. An existing node with the same id is
    /// overwritten.
    pub fn insert_node(&mut self, node: DiagramNode) {
        self.nodes.insert(node.id, node);
    }

    /// Return a reference to a node by id.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&DiagramNode> {
        self.nodes.get(id)
    }

    /// Return a mutable reference to a node by id.
    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut DiagramNode> {
        self.nodes.get_mut(id)
    }

    /// Remove a node and every connector attached to it.
    ///
    /// Returns the removed node and the ids of the cascaded connectors, or
    /// `None` if the node did not exist. A connector is never left dangling.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<(DiagramNode, Vec<ConnectorId>)> {
        let node = self.nodes.remove(id)?;
        let mut cascaded: Vec<ConnectorId> = self
            .connectors
            .values()
            .filter(|c| c.source_id == *id || c.target_id == *id)
            .map(|c| c.id)
            .collect();
        cascaded.sort_unstable();
        for connector_id in &cascaded {
            self.connectors.remove(connector_id);
        }
        Some((node, cascaded))
    }

    /// Merge a props patch into a node's bag. `null` values delete keys,
    /// other keys are inserted or replaced. Returns `false` if the node does
    /// not exist or the patch is not an object.
    pub fn merge_node_props(&mut self, id: &NodeId, patch: &serde_json::Value) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => merge_bag(&mut node.props, patch),
            None => false,
        }
    }

    /// All nodes sorted by `(z_index, id)` for draw order.
    #[must_use]
    pub fn sorted_nodes(&self) -> Vec<&DiagramNode> {
        let mut nodes: Vec<&DiagramNode> = self.nodes.values().collect();
        nodes.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        nodes
    }

    /// All nodes sorted by id; stable across runs, used for digests and
    /// snapshot output.
    #[must_use]
    pub fn nodes_by_id(&self) -> Vec<&DiagramNode> {
        let mut nodes: Vec<&DiagramNode> = self.nodes.values().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ── Connectors ──────────────────────────────────────────────

    /// Insert or replace a connector. Callers must have validated both
    /// endpoints against live nodes; see [`crate::connector::create`].
    pub fn insert_connector(&mut self, connector: Connector) {
        self.connectors.insert(connector.id, connector);
    }

    /// Return a reference to a connector by id.
    #[must_use]
    pub fn connector(&self, id: &ConnectorId) -> Option<&Connector> {
        self.connectors.get(id)
    }

    /// Return a mutable reference to a connector by id.
    pub fn connector_mut(&mut self, id: &ConnectorId) -> Option<&mut Connector> {
        self.connectors.get_mut(id)
    }

    /// Remove a connector by id, returning it if it was present.
    pub fn remove_connector(&mut self, id: &ConnectorId) -> Option<Connector> {
        self.connectors.remove(id)
    }

    /// Ids of every connector with an endpoint on the given node, sorted.
    #[must_use]
    pub fn connectors_touching(&self, node_id: &NodeId) -> Vec<ConnectorId> {
        let mut ids: Vec<ConnectorId> = self
            .connectors
            .values()
            .filter(|c| c.source_id == *node_id || c.target_id == *node_id)
            .map(|c| c.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// All connectors sorted by id.
    #[must_use]
    pub fn connectors_by_id(&self) -> Vec<&Connector> {
        let mut connectors: Vec<&Connector> = self.connectors.values().collect();
        connectors.sort_by(|a, b| a.id.cmp(&b.id));
        connectors
    }

    #[must_use]
    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }

    // ── Whole-document ──────────────────────────────────────────

    /// Remove every node and connector.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.connectors.clear();
    }

    /// Returns `true` if the document holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connectors.is_empty()
    }
}

impl Default for DiagramDoc {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge `patch` into `bag` with null-deletes. Returns `false` when the
/// patch is not an object.
pub(crate) fn merge_bag(bag: &mut serde_json::Value, patch: &serde_json::Value) -> bool {
    let Some(incoming) = patch.as_object() else {
        return false;
    };

    if !bag.is_object() {
        *bag = serde_json::Value::Object(serde_json::Map::new());
    }

    if let Some(existing) = bag.as_object_mut() {
        for (k, v) in incoming {
            if v.is_null() {
                existing.remove(k);
            } else {
                existing.insert(k.clone(), v.clone());
            }
        }
    }
    true
}

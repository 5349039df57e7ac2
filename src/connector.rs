//! Connector lifecycle and anchor-side routing.
//!
//! DESIGN
//! ======
//! Connectors are first-class graph edges: both endpoints must resolve to
//! live nodes at creation time, and node removal cascades (the document never
//! renders a dangling connector). Routing recomputes whenever an endpoint
//! node moves: each `Auto` endpoint picks the bounding-box side whose
//! midpoint minimizes the crossing distance, with ties broken in
//! left-to-right, top-to-bottom midpoint order so overlapping or identical
//! geometry still routes deterministically. Explicit (non-auto) anchors are
//! user intent and survive rerouting untouched.
//!
//! Every mutating call schedules one coalesced render request on the session;
//! a gesture that touches many connectors still repaints once.

#[cfg(test)]
#[path = "connector_test.rs"]
mod connector_test;

use serde::Serialize;
use uuid::Uuid;

use crate::camera::{Point, Rect};
use crate::consts::{DEFAULT_COLOR, DEFAULT_STROKE_WIDTH, TEXT_COLOR};
use crate::doc::{AnchorSide, Connector, ConnectorId, DiagramDoc, LineStyle, NodeId};
use crate::error::ErrorCode;
use crate::session::Session;
use crate::shape::{Geometry, RenderObject, StyleDescriptor};

/// Style fields a connector patch may carry; anything else is ignored so
/// patches from newer builds stay forward-compatible.
const STYLE_KEYS: [&str; 5] = ["stroke", "strokeWidth", "lineStyle", "hasArrow", "label"];

#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("connector endpoint does not resolve to a live node: {0}")]
    InvalidEndpoint(Uuid),
}

impl ErrorCode for ConnectorError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidEndpoint(_) => "E_INVALID_ENDPOINT",
        }
    }
}

/// Fully resolved connector style.
///
/// `Default` is the fixed fallback record the property bridge substitutes
/// when a connector's style bag is unreadable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorStyle {
    pub stroke: String,
    pub stroke_width: f64,
    pub line_style: LineStyle,
    pub has_arrow: bool,
    pub label: String,
}

impl Default for ConnectorStyle {
    fn default() -> Self {
        Self {
            stroke: DEFAULT_COLOR.to_owned(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            line_style: LineStyle::Solid,
            has_arrow: true,
            label: String::new(),
        }
    }
}

/// Read a connector's style bag.
///
/// Absent fields take their defaults. Returns `None` when the bag itself is
/// malformed (not an object, or a present field of the wrong JSON type) so
/// the caller can substitute the full fallback record instead.
#[must_use]
pub fn try_style(connector: &Connector) -> Option<ConnectorStyle> {
    let bag = connector.props.as_object()?;
    let mut style = ConnectorStyle::default();

    if let Some(v) = bag.get("stroke") {
        style.stroke = v.as_str()?.to_owned();
    }
    if let Some(v) = bag.get("strokeWidth") {
        style.stroke_width = v.as_f64()?;
    }
    if let Some(v) = bag.get("lineStyle") {
        style.line_style = LineStyle::from_tag(v.as_str()?);
    }
    if let Some(v) = bag.get("hasArrow") {
        style.has_arrow = v.as_bool()?;
    }
    if let Some(v) = bag.get("label") {
        style.label = v.as_str()?.to_owned();
    }
    Some(style)
}

// ── Lifecycle ───────────────────────────────────────────────────

/// Create a connector between two live nodes.
///
/// # Errors
///
/// Returns [`ConnectorError::InvalidEndpoint`] if either id does not resolve
/// to a node in the document. Nothing is created on failure.
pub fn create(
    doc: &mut DiagramDoc,
    session: &mut Session,
    source_id: NodeId,
    target_id: NodeId,
    style: Option<serde_json::Value>,
) -> Result<ConnectorId, ConnectorError> {
    if doc.node(&source_id).is_none() {
        return Err(ConnectorError::InvalidEndpoint(source_id));
    }
    if doc.node(&target_id).is_none() {
        return Err(ConnectorError::InvalidEndpoint(target_id));
    }

    let id = Uuid::new_v4();
    doc.insert_connector(Connector {
        id,
        source_id,
        target_id,
        source_anchor: AnchorSide::Auto,
        target_anchor: AnchorSide::Auto,
        props: style.unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new())),
    });
    session.schedule_render();
    Ok(id)
}

/// Merge a style patch into a connector. Known fields merge (`null`
/// deletes), unknown fields are ignored. Returns `false` if the connector
/// does not exist or the patch is not an object.
pub fn update_style(
    doc: &mut DiagramDoc,
    session: &mut Session,
    id: &ConnectorId,
    patch: &serde_json::Value,
) -> bool {
    let Some(incoming) = patch.as_object() else {
        return false;
    };

    let mut known = serde_json::Map::new();
    for (k, v) in incoming {
        if STYLE_KEYS.contains(&k.as_str()) {
            known.insert(k.clone(), v.clone());
        }
    }

    let Some(connector) = doc.connector_mut(id) else {
        return false;
    };
    crate::doc::merge_bag(&mut connector.props, &serde_json::Value::Object(known));
    session.schedule_render();
    true
}

/// Set the anchor intent for one end of a connector.
pub fn set_anchor(
    doc: &mut DiagramDoc,
    session: &mut Session,
    id: &ConnectorId,
    source: AnchorSide,
    target: AnchorSide,
) -> bool {
    let Some(connector) = doc.connector_mut(id) else {
        return false;
    };
    connector.source_anchor = source;
    connector.target_anchor = target;
    session.schedule_render();
    true
}

/// Remove a connector. Idempotent: removing an id that is already gone is a
/// no-op, not an error, and schedules nothing.
pub fn remove(doc: &mut DiagramDoc, session: &mut Session, id: &ConnectorId) {
    if doc.remove_connector(id).is_some() {
        session.schedule_render();
    }
}

// ── Routing ─────────────────────────────────────────────────────

/// A computed connector route: the resolved side on each endpoint box and
/// the polyline between them.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub source_side: AnchorSide,
    pub target_side: AnchorSide,
    pub points: Vec<Point>,
}

/// Compute the current route for a connector. Returns `None` when either
/// endpoint node is missing (possible only on a document that bypassed the
/// insertion gates, e.g. a hand-edited snapshot mid-restore).
#[must_use]
pub fn route(doc: &DiagramDoc, connector: &Connector) -> Option<Route> {
    let source = doc.node(&connector.source_id)?.bounds();
    let target = doc.node(&connector.target_id)?.bounds();
    Some(pick_route(source, target, connector.source_anchor, connector.target_anchor))
}

/// Recompute a connector's route after an endpoint moved and schedule a
/// repaint. Returns the new route, or `None` for an unknown connector id.
pub fn reroute(doc: &DiagramDoc, session: &mut Session, id: &ConnectorId) -> Option<Route> {
    let connector = doc.connector(id)?;
    let routed = route(doc, connector)?;
    session.schedule_render();
    Some(routed)
}

/// Reroute every connector attached to a node. Called after a node drag or
/// resize; all reroutes coalesce into the gesture's single repaint. Returns
/// the number of connectors rerouted.
pub fn on_node_moved(doc: &DiagramDoc, session: &mut Session, node_id: &NodeId) -> usize {
    let touched = doc.connectors_touching(node_id);
    let mut rerouted = 0;
    for id in &touched {
        if reroute(doc, session, id).is_some() {
            rerouted += 1;
        }
    }
    rerouted
}

const SIDES: [AnchorSide; 4] = [AnchorSide::Left, AnchorSide::Right, AnchorSide::Top, AnchorSide::Bottom];

fn candidates(anchor: AnchorSide) -> Vec<AnchorSide> {
    match anchor {
        AnchorSide::Auto => SIDES.to_vec(),
        side => vec![side],
    }
}

fn side_midpoint(rect: Rect, side: AnchorSide) -> Point {
    let center = rect.center();
    match side {
        AnchorSide::Top => Point::new(center.x, rect.y),
        AnchorSide::Bottom => Point::new(center.x, rect.y + rect.height),
        AnchorSide::Left => Point::new(rect.x, center.y),
        AnchorSide::Right | AnchorSide::Auto => Point::new(rect.x + rect.width, center.y),
    }
}

/// Nearest-side selection with a deterministic tie-break: candidates are
/// ordered by crossing distance, then by source midpoint (x, then y), then
/// by target midpoint (x, then y).
fn pick_route(source: Rect, target: Rect, source_anchor: AnchorSide, target_anchor: AnchorSide) -> Route {
    let mut best: Option<(f64, Point, Point, AnchorSide, AnchorSide)> = None;

    for s_side in candidates(source_anchor) {
        let s_mid = side_midpoint(source, s_side);
        for t_side in candidates(target_anchor) {
            let t_mid = side_midpoint(target, t_side);
            let dist = (t_mid.x - s_mid.x).hypot(t_mid.y - s_mid.y);
            let candidate = (dist, s_mid, t_mid, s_side, t_side);
            let better = match &best {
                None => true,
                Some(current) => {
                    dist.total_cmp(&current.0)
                        .then_with(|| s_mid.x.total_cmp(&current.1.x))
                        .then_with(|| s_mid.y.total_cmp(&current.1.y))
                        .then_with(|| t_mid.x.total_cmp(&current.2.x))
                        .then_with(|| t_mid.y.total_cmp(&current.2.y))
                        .is_lt()
                }
            };
            if better {
                best = Some(candidate);
            }
        }
    }

    // SIDES is non-empty, so best is always populated; the fallback arm keeps
    // the function total without a panic path.
    match best {
        Some((_, s_mid, t_mid, s_side, t_side)) => Route {
            source_side: s_side,
            target_side: t_side,
            points: vec![s_mid, t_mid],
        },
        None => Route {
            source_side: AnchorSide::Left,
            target_side: AnchorSide::Left,
            points: vec![side_midpoint(source, AnchorSide::Left), side_midpoint(target, AnchorSide::Left)],
        },
    }
}

// ── Rendering ───────────────────────────────────────────────────

/// Render a connector into a draw descriptor. Style falls back to the fixed
/// default record when the bag is unreadable; the route is `None` only for
/// dangling endpoints, which the document never produces.
#[must_use]
pub fn render(doc: &DiagramDoc, connector: &Connector) -> Option<RenderObject> {
    let routed = route(doc, connector)?;
    let style = try_style(connector).unwrap_or_default();
    let label = if style.label.is_empty() { None } else { Some(style.label.clone()) };

    Some(RenderObject {
        id: connector.id,
        geometry: Geometry::Path {
            points: routed.points,
            line_style: style.line_style,
            has_arrow: style.has_arrow,
        },
        style: StyleDescriptor {
            fill: style.stroke.clone(),
            stroke: style.stroke,
            stroke_width: style.stroke_width,
            text_color: TEXT_COLOR.to_owned(),
        },
        label,
        sublabel: None,
        icon: None,
        z_index: 0,
    })
}

//! Template table and graph instantiation.
//!
//! Templates are declarative blueprints: an ordered list of node specs in a
//! template-local coordinate space plus edge specs referencing nodes by
//! local index. Instantiation translates the local space onto the viewport
//! origin (never scales or reorders) and mints fresh ids per call, so the
//! same template can be stamped into a diagram any number of times without
//! collision. Lookup is by exact id; unknown ids fall back to a minimal
//! start → process → complete chain so the caller can always render
//! something.

#[cfg(test)]
#[path = "template_test.rs"]
mod template_test;

use serde_json::json;
use tracing::debug;

use crate::camera::Point;
use crate::connector;
use crate::doc::{ConnectorId, DiagramDoc, DiagramNode, NodeId};
use crate::session::Session;

// Layout constants for the built-in templates (world units).
const NODE_W: f64 = 140.0;
const NODE_H: f64 = 70.0;
const COL_SPACING: f64 = 220.0;
const ROW_SPACING: f64 = 130.0;
/// Horizontal world units per schedule day in the timeline template.
const DAY_W: f64 = 10.0;
/// Fixed bounding box for milestone markers.
const MILESTONE_SIZE: f64 = 28.0;

/// One node to create, in template-local coordinates. The label and any
/// style overrides live in the props bag.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub shape: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub props: serde_json::Value,
}

impl NodeSpec {
    /// A default-sized spec at a grid position with just a label.
    #[must_use]
    pub fn new(shape: &str, label: &str, x: f64, y: f64) -> Self {
        Self {
            shape: shape.to_owned(),
            x,
            y,
            width: NODE_W,
            height: NODE_H,
            props: json!({ "label": label }),
        }
    }
}

/// One connector to create, endpoints given as template-local node indices.
#[derive(Debug, Clone)]
pub struct EdgeSpec {
    pub from: usize,
    pub to: usize,
    pub props: serde_json::Value,
}

impl EdgeSpec {
    #[must_use]
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to, props: json!({}) }
    }

    #[must_use]
    pub fn labeled(from: usize, to: usize, label: &str) -> Self {
        Self { from, to, props: json!({ "label": label }) }
    }
}

/// A concrete graph to construct. Templates resolve to one of these, and the
/// description parser produces them directly — both instantiate through the
/// same path.
#[derive(Debug, Clone, Default)]
pub struct GraphBlueprint {
    pub nodes: Vec<NodeSpec>,
    pub edges: Vec<EdgeSpec>,
}

/// A named, versionable template table entry.
#[derive(Debug, Clone)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub blueprint: GraphBlueprint,
}

/// Ids and display metadata of every built-in template, for pickers.
#[must_use]
pub fn catalog() -> Vec<(&'static str, &'static str, &'static str)> {
    BUILTIN_IDS
        .iter()
        .map(|id| {
            let t = find(id);
            (t.id, t.name, t.category)
        })
        .collect()
}

const BUILTIN_IDS: [&str; 5] =
    ["simple-flowchart", "decision-flow", "org-chart", "network-topology", "project-timeline"];

/// Resolve a template id. Unknown ids resolve to the generic fallback chain
/// rather than failing; the result is a pure function of the id.
#[must_use]
pub fn find(id: &str) -> Template {
    match id {
        "simple-flowchart" => simple_flowchart(),
        "decision-flow" => decision_flow(),
        "org-chart" => org_chart(),
        "network-topology" => network_topology(),
        "project-timeline" => project_timeline(),
        _ => fallback_chain(),
    }
}

/// Result of one instantiation: the freshly minted ids, in spec order.
#[derive(Debug, Clone, Default)]
pub struct Instantiated {
    pub node_ids: Vec<NodeId>,
    pub connector_ids: Vec<ConnectorId>,
}

/// Instantiate a template by id at the given world-space origin.
pub fn instantiate(doc: &mut DiagramDoc, session: &mut Session, template_id: &str, origin: Point) -> Instantiated {
    instantiate_blueprint(doc, session, &find(template_id).blueprint, origin)
}

/// Construct a blueprint's graph into the document.
///
/// Node positions translate by `origin`; sizes and relative layout are kept
/// verbatim. Edge specs with out-of-range indices are skipped — the rest of
/// the blueprint still instantiates. All resulting render requests coalesce
/// into the current gesture's single repaint.
pub fn instantiate_blueprint(
    doc: &mut DiagramDoc,
    session: &mut Session,
    blueprint: &GraphBlueprint,
    origin: Point,
) -> Instantiated {
    let mut out = Instantiated::default();

    for spec in &blueprint.nodes {
        let id = uuid::Uuid::new_v4();
        doc.insert_node(DiagramNode {
            id,
            shape: spec.shape.clone(),
            x: origin.x + spec.x,
            y: origin.y + spec.y,
            width: spec.width,
            height: spec.height,
            rotation: 0.0,
            z_index: 0,
            props: spec.props.clone(),
        });
        out.node_ids.push(id);
        session.schedule_render();
    }

    for edge in &blueprint.edges {
        let (Some(source), Some(target)) = (out.node_ids.get(edge.from), out.node_ids.get(edge.to)) else {
            debug!(from = edge.from, to = edge.to, "edge spec index out of range; skipping");
            continue;
        };
        match connector::create(doc, session, *source, *target, Some(edge.props.clone())) {
            Ok(id) => out.connector_ids.push(id),
            Err(err) => {
                // Unreachable for freshly inserted nodes; logged for parity
                // with the external creation path.
                debug!(error = %err, "blueprint edge rejected");
            }
        }
    }

    out
}

// ── Built-in table ──────────────────────────────────────────────

fn grid(col: f64, row: f64) -> (f64, f64) {
    (col * COL_SPACING, row * ROW_SPACING)
}

fn spec_at(shape: &str, label: &str, col: f64, row: f64) -> NodeSpec {
    let (x, y) = grid(col, row);
    NodeSpec::new(shape, label, x, y)
}

/// Minimal generic chain used when a template id does not match.
#[must_use]
pub fn fallback_chain() -> Template {
    Template {
        id: "generic-chain",
        name: "Generic Chain",
        category: "flowchart",
        blueprint: GraphBlueprint {
            nodes: vec![
                spec_at("circle", "Start", 0.0, 0.0),
                spec_at("rectangle", "Process", 1.0, 0.0),
                spec_at("circle", "Complete", 2.0, 0.0),
            ],
            edges: vec![EdgeSpec::new(0, 1), EdgeSpec::new(1, 2)],
        },
    }
}

fn simple_flowchart() -> Template {
    Template {
        id: "simple-flowchart",
        name: "Simple Flowchart",
        category: "flowchart",
        blueprint: GraphBlueprint {
            nodes: vec![
                spec_at("circle", "Start", 1.0, 0.0),
                spec_at("rectangle", "Do the work", 1.0, 1.0),
                spec_at("diamond", "Looks right?", 1.0, 2.0),
                spec_at("rectangle", "Ship it", 0.0, 3.0),
                spec_at("rectangle", "Rework", 2.0, 3.0),
            ],
            edges: vec![
                EdgeSpec::new(0, 1),
                EdgeSpec::new(1, 2),
                EdgeSpec::labeled(2, 3, "yes"),
                EdgeSpec::labeled(2, 4, "no"),
                EdgeSpec::labeled(4, 1, "retry"),
            ],
        },
    }
}

fn decision_flow() -> Template {
    Template {
        id: "decision-flow",
        name: "Decision Flow",
        category: "flowchart",
        blueprint: GraphBlueprint {
            nodes: vec![
                spec_at("circle", "Request", 1.0, 0.0),
                spec_at("diamond", "In budget?", 1.0, 1.0),
                spec_at("diamond", "Urgent?", 0.0, 2.0),
                spec_at("rectangle", "Approve", 0.0, 3.0),
                spec_at("rectangle", "Defer", 1.0, 3.0),
                spec_at("rectangle", "Reject", 2.0, 2.0),
            ],
            edges: vec![
                EdgeSpec::new(0, 1),
                EdgeSpec::labeled(1, 2, "yes"),
                EdgeSpec::labeled(1, 5, "no"),
                EdgeSpec::labeled(2, 3, "yes"),
                EdgeSpec::labeled(2, 4, "no"),
            ],
        },
    }
}

fn org_chart() -> Template {
    Template {
        id: "org-chart",
        name: "Organization Chart",
        category: "organization",
        blueprint: GraphBlueprint {
            nodes: vec![
                spec_at("user", "CEO", 1.0, 0.0),
                spec_at("team", "Engineering", 0.0, 1.0),
                spec_at("team", "Design", 2.0, 1.0),
                spec_at("user", "Engineer", 0.0, 2.0),
                spec_at("user", "Designer", 2.0, 2.0),
            ],
            edges: vec![
                EdgeSpec::new(0, 1),
                EdgeSpec::new(0, 2),
                EdgeSpec::new(1, 3),
                EdgeSpec::new(2, 4),
            ],
        },
    }
}

fn network_topology() -> Template {
    Template {
        id: "network-topology",
        name: "Network Topology",
        category: "infrastructure",
        blueprint: GraphBlueprint {
            nodes: vec![
                spec_at("cloud", "Gateway", 1.0, 0.0),
                spec_at("server", "Web server", 0.0, 1.0),
                spec_at("server", "App server", 2.0, 1.0),
                spec_at("database", "Primary DB", 1.0, 2.0),
            ],
            edges: vec![
                EdgeSpec::new(0, 1),
                EdgeSpec::new(0, 2),
                EdgeSpec::new(1, 3),
                EdgeSpec::new(2, 3),
            ],
        },
    }
}

fn project_timeline() -> Template {
    let task = |label: &str, start: f64, end: f64, progress: f64, row: f64| NodeSpec {
        shape: "task".to_owned(),
        x: start * DAY_W,
        y: row * (NODE_H * 0.7),
        width: (end - start) * DAY_W,
        height: NODE_H * 0.5,
        props: json!({ "label": label, "start": start, "end": end, "progress": progress }),
    };

    Template {
        id: "project-timeline",
        name: "Project Timeline",
        category: "schedule",
        blueprint: GraphBlueprint {
            nodes: vec![
                NodeSpec {
                    shape: "summary".to_owned(),
                    x: 0.0,
                    y: 0.0,
                    width: 40.0 * DAY_W,
                    height: NODE_H * 0.5,
                    props: json!({ "label": "Release 1.0", "start": 0.0, "end": 40.0, "progress": 55.0 }),
                },
                task("Design", 0.0, 10.0, 100.0, 1.0),
                task("Build", 10.0, 30.0, 60.0, 2.0),
                task("Verify", 30.0, 40.0, 10.0, 3.0),
                NodeSpec {
                    shape: "milestone".to_owned(),
                    x: 40.0 * DAY_W,
                    y: 4.0 * (NODE_H * 0.7),
                    width: MILESTONE_SIZE,
                    height: MILESTONE_SIZE,
                    props: json!({ "label": "Ship", "start": 40.0, "end": 40.0 }),
                },
            ],
            edges: vec![
                EdgeSpec::new(1, 2),
                EdgeSpec::new(2, 3),
                EdgeSpec::new(3, 4),
            ],
        },
    }
}

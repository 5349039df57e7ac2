//! Text diagram-description parsing.
//!
//! The generation collaborator answers a prompt with a plain-text graph
//! description; this module turns that text into a [`GraphBlueprint`] and
//! feeds it through the template instantiator's graph-construction path.
//!
//! Grammar, line by line (unknown lines are skipped, `#` starts a comment):
//!
//! ```text
//! node api:server API gateway
//! node db:database
//! api -> db: reads
//! api -- cache
//! ```
//!
//! Endpoint ids that were never declared auto-register as rectangles, so a
//! terse description still yields a complete graph. Parsing is total over
//! arbitrary text; a description with no usable lines falls back to the
//! generic chain at apply time.

#[cfg(test)]
#[path = "describe_test.rs"]
mod describe_test;

use serde_json::json;
use tracing::info;

use crate::camera::Point;
use crate::doc::DiagramDoc;
use crate::session::Session;
use crate::template::{self, EdgeSpec, GraphBlueprint, Instantiated, NodeSpec};

// Grid layout for parsed descriptions (world units).
const GRID_COLS: usize = 4;
const CELL_W: f64 = 220.0;
const CELL_H: f64 = 140.0;

/// Parse a diagram description into a blueprint.
#[must_use]
pub fn parse(input: &str) -> GraphBlueprint {
    let mut blueprint = GraphBlueprint::default();
    let mut ids: Vec<String> = Vec::new();

    for raw in input.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("node ") {
            parse_node_line(rest, &mut blueprint, &mut ids);
            continue;
        }

        if let Some((from, to, label, directed)) = split_edge_line(line) {
            let from_idx = ensure_node(&from, &mut blueprint, &mut ids);
            let to_idx = ensure_node(&to, &mut blueprint, &mut ids);
            let mut props = json!({ "hasArrow": directed });
            if let (Some(bag), Some(label)) = (props.as_object_mut(), label) {
                bag.insert("label".to_owned(), json!(label));
            }
            blueprint.edges.push(EdgeSpec { from: from_idx, to: to_idx, props });
            continue;
        }

        // Unknown line — skip.
    }

    position_on_grid(&mut blueprint);
    blueprint
}

/// Parse a description and construct its graph at the given origin.
///
/// A description with no usable nodes instantiates the generic fallback
/// chain instead, so the completion path can always render something.
pub fn apply(doc: &mut DiagramDoc, session: &mut Session, text: &str, origin: Point) -> Instantiated {
    let parsed = parse(text);
    let blueprint = if parsed.nodes.is_empty() {
        info!("description yielded no nodes; instantiating fallback chain");
        template::fallback_chain().blueprint
    } else {
        info!(nodes = parsed.nodes.len(), edges = parsed.edges.len(), "instantiating described graph");
        parsed
    };
    template::instantiate_blueprint(doc, session, &blueprint, origin)
}

/// `<id>[:<shape-tag>] [label...]` after the `node ` keyword.
fn parse_node_line(rest: &str, blueprint: &mut GraphBlueprint, ids: &mut Vec<String>) {
    let mut parts = rest.splitn(2, char::is_whitespace);
    let Some(head) = parts.next().filter(|h| !h.is_empty()) else {
        return;
    };
    let label_part = parts.next().map(str::trim).unwrap_or("");

    let (id, shape) = match head.split_once(':') {
        Some((id, tag)) if !tag.is_empty() => (id, tag),
        Some((id, _)) => (id, "rectangle"),
        None => (head, "rectangle"),
    };
    if id.is_empty() {
        return;
    }

    let label = if label_part.is_empty() { id } else { label_part };
    let idx = ensure_node(id, blueprint, ids);
    // An explicit declaration wins over an earlier auto-registration.
    blueprint.nodes[idx].shape = shape.to_owned();
    blueprint.nodes[idx].props = json!({ "label": label });
}

/// Split `a -> b[: label]` / `a -- b[: label]` edge lines.
fn split_edge_line(line: &str) -> Option<(String, String, Option<String>, bool)> {
    let (sep, directed) = if line.contains("->") {
        ("->", true)
    } else if line.contains("--") {
        ("--", false)
    } else {
        return None;
    };

    let (left, right) = line.split_once(sep)?;
    // Tolerate longer arrow spellings such as `-->` and `->>`.
    let from = left.trim().trim_end_matches('-').trim_end();
    let right = right.trim_start_matches(['>', '-']).trim_start();
    let (to, label) = match right.split_once(':') {
        Some((to, label)) => (to.trim(), Some(label.trim().to_owned()).filter(|l| !l.is_empty())),
        None => (right.trim(), None),
    };
    if from.is_empty() || to.is_empty() {
        return None;
    }
    Some((from.to_owned(), to.to_owned(), label, directed))
}

/// Index of a node id, auto-registering it as a rectangle if unseen.
fn ensure_node(id: &str, blueprint: &mut GraphBlueprint, ids: &mut Vec<String>) -> usize {
    if let Some(idx) = ids.iter().position(|existing| existing == id) {
        return idx;
    }
    ids.push(id.to_owned());
    blueprint.nodes.push(NodeSpec::new("rectangle", id, 0.0, 0.0));
    blueprint.nodes.len() - 1
}

/// Lay parsed nodes on a deterministic left-to-right grid in declaration
/// order.
fn position_on_grid(blueprint: &mut GraphBlueprint) {
    for (i, node) in blueprint.nodes.iter_mut().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let col = (i % GRID_COLS) as f64;
        #[allow(clippy::cast_precision_loss)]
        let row = (i / GRID_COLS) as f64;
        node.x = col * CELL_W;
        node.y = row * CELL_H;
    }
}

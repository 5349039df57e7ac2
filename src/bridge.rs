//! Selection ↔ property-panel bridge.
//!
//! DESIGN
//! ======
//! Every canvas selection event is normalized into a single
//! [`PropertyRecord`] regardless of whether the selected object is a node or
//! a connector, so the panel renders one form. Reads never fail: node fields
//! go through the safe-read accessor with one centralized default policy
//! (color `#000000`, numeric `0`, booleans per field), and a connector whose
//! style bag is unreadable substitutes the fixed fallback record instead of
//! surfacing an error.
//!
//! ERROR HANDLING
//! ==============
//! A selection that cannot be normalized (an id that no longer resolves, a
//! record read that comes back empty) degrades to "no selection": the
//! selection resets, the panel hides, and the condition is logged. One
//! malformed object can never wedge the editing session or leave the panel
//! half-populated.

#[cfg(test)]
#[path = "bridge_test.rs"]
mod bridge_test;

use serde::Serialize;
use tracing::warn;

use crate::connector;
use crate::consts::DEFAULT_COLOR;
use crate::doc::{DiagramDoc, LineStyle, ObjectRef, Props};
use crate::session::{Selection, SelectionKind, Session};

/// Normalized property view of the active object, shaped for the panel form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyRecord {
    pub kind: SelectionKind,
    /// Node fill, or the connector's line color.
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub text_color: String,
    pub label: String,
    pub description: String,
    pub line_style: LineStyle,
    pub has_arrow: bool,
}

/// A property-panel form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelField {
    Fill,
    Stroke,
    StrokeWidth,
    TextColor,
    Label,
    Description,
    LineStyle,
    HasArrow,
}

impl PanelField {
    /// Props key when the active object is a node.
    #[must_use]
    fn node_key(self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::Stroke => "stroke",
            Self::StrokeWidth => "strokeWidth",
            Self::TextColor => "textColor",
            Self::Label => "label",
            Self::Description => "description",
            Self::LineStyle => "lineStyle",
            Self::HasArrow => "hasArrow",
        }
    }

    /// Props key when the active object is a connector. `None` for fields a
    /// connector does not carry; such edits are ignored, not errors. The
    /// panel's `Fill` field is the connector's line color.
    #[must_use]
    fn connector_key(self) -> Option<&'static str> {
        match self {
            Self::Fill | Self::Stroke => Some("stroke"),
            Self::StrokeWidth => Some("strokeWidth"),
            Self::Label => Some("label"),
            Self::LineStyle => Some("lineStyle"),
            Self::HasArrow => Some("hasArrow"),
            Self::TextColor | Self::Description => None,
        }
    }
}

/// Handle a canvas selection event.
///
/// Resolves the target, updates the session selection (panel visibility is
/// exactly "something is selected"), and returns the normalized record for
/// the panel. A target that cannot be normalized resets the selection to
/// none and returns `None`.
pub fn select(doc: &DiagramDoc, session: &mut Session, target: Option<ObjectRef>) -> Option<PropertyRecord> {
    let Some(object) = target else {
        session.set_selection(None);
        return None;
    };

    let resolves = match object {
        ObjectRef::Node(id) => doc.node(&id).is_some(),
        ObjectRef::Connector(id) => doc.connector(&id).is_some(),
    };
    if !resolves {
        warn!(object_id = %object.id(), "selection references an unknown object; resetting selection");
        session.set_selection(None);
        return None;
    }

    session.set_selection(Some(object));
    match normalize(doc, &session.selection()) {
        Some(record) => Some(record),
        None => {
            // Resolved a moment ago but failed to normalize: treat as
            // selection-state corruption and degrade rather than leaving the
            // panel half-populated.
            warn!(object_id = %object.id(), "selection failed to normalize; resetting selection");
            session.set_selection(None);
            None
        }
    }
}

/// Produce the normalized property record for the current selection, if any.
#[must_use]
pub fn normalize(doc: &DiagramDoc, selection: &Selection) -> Option<PropertyRecord> {
    match selection.active()? {
        ObjectRef::Node(id) => {
            let node = doc.node(&id)?;
            let props = Props::new(&node.props);
            Some(PropertyRecord {
                kind: SelectionKind::Node,
                fill: props.fill().unwrap_or(DEFAULT_COLOR).to_owned(),
                stroke: props.stroke().unwrap_or(DEFAULT_COLOR).to_owned(),
                stroke_width: props.stroke_width().unwrap_or(0.0),
                text_color: props.text_color().unwrap_or(DEFAULT_COLOR).to_owned(),
                label: props.label().unwrap_or("").to_owned(),
                description: props.description().unwrap_or("").to_owned(),
                line_style: props.line_style().unwrap_or_default(),
                has_arrow: props.has_arrow().unwrap_or(false),
            })
        }
        ObjectRef::Connector(id) => {
            let conn = doc.connector(&id)?;
            let style = connector::try_style(conn).unwrap_or_default();
            Some(PropertyRecord {
                kind: SelectionKind::Connector,
                fill: style.stroke.clone(),
                stroke: style.stroke,
                stroke_width: style.stroke_width,
                text_color: DEFAULT_COLOR.to_owned(),
                label: style.label,
                description: String::new(),
                line_style: style.line_style,
                has_arrow: style.has_arrow,
            })
        }
    }
}

/// Write one panel field change back onto the active object and schedule a
/// repaint. Returns `false` when nothing is selected, the object vanished,
/// or the field does not apply to the object kind.
pub fn apply_edit(
    doc: &mut DiagramDoc,
    session: &mut Session,
    field: PanelField,
    value: serde_json::Value,
) -> bool {
    let Some(object) = session.selection().active() else {
        return false;
    };

    match object {
        ObjectRef::Node(id) => {
            let patch = serde_json::json!({ field.node_key(): value });
            if doc.merge_node_props(&id, &patch) {
                session.schedule_render();
                true
            } else {
                false
            }
        }
        ObjectRef::Connector(id) => {
            let Some(key) = field.connector_key() else {
                return false;
            };
            let patch = serde_json::json!({ key: value });
            connector::update_style(doc, session, &id, &patch)
        }
    }
}

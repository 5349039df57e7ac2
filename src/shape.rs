//! Shape-tag resolution, the style table, and node render dispatch.
//!
//! `ShapeKind::from_tag` and `renderer_for` are both total: an unknown or
//! malformed tag resolves to the rectangle renderer rather than failing, so a
//! document carrying tags from a newer build still renders. Style resolution
//! merges per-kind base styles with the node's own overrides; override fields
//! always win.
//!
//! Schedule shapes (task, milestone, summary) route to a specialized renderer
//! that derives a duration label and a fixed progress color band.

#[cfg(test)]
#[path = "shape_test.rs"]
mod shape_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;
use crate::consts::{
    BAND_COMPLETE_COLOR, BAND_HIGH_COLOR, BAND_LOW_COLOR, BAND_MID_COLOR, BAND_STALLED_COLOR,
    PROGRESS_COMPLETE, PROGRESS_HIGH, PROGRESS_LOW, PROGRESS_MID, TEXT_COLOR,
};
use crate::doc::{DiagramNode, LineStyle, Props};

/// The closed set of shape kinds this build renders natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Diamond,
    Server,
    Database,
    Cloud,
    User,
    Team,
    Task,
    Milestone,
    Summary,
}

impl ShapeKind {
    /// Resolve a shape tag. Never fails: unknown or malformed tags resolve to
    /// `Rectangle`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "circle" | "ellipse" => Self::Circle,
            "diamond" | "decision" => Self::Diamond,
            "server" => Self::Server,
            "database" => Self::Database,
            "cloud" => Self::Cloud,
            "user" => Self::User,
            "team" => Self::Team,
            "task" => Self::Task,
            "milestone" => Self::Milestone,
            "summary" => Self::Summary,
            _ => Self::Rectangle,
        }
    }

    /// Canonical tag for this kind.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Diamond => "diamond",
            Self::Server => "server",
            Self::Database => "database",
            Self::Cloud => "cloud",
            Self::User => "user",
            Self::Team => "team",
            Self::Task => "task",
            Self::Milestone => "milestone",
            Self::Summary => "summary",
        }
    }
}

/// Which renderer a shape kind dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    /// Plain geometric shape (rectangle, circle).
    Standard,
    /// Decision diamond.
    Decision,
    /// Schedule bar or milestone with derived duration and progress band.
    Schedule,
    /// Icon-bearing shape (server, database, cloud, user, team).
    Icon,
}

/// Dispatch a shape kind to its renderer. Total; the `Standard` arm is the
/// guaranteed fallback.
#[must_use]
pub fn renderer_for(kind: ShapeKind) -> RendererKind {
    match kind {
        ShapeKind::Diamond => RendererKind::Decision,
        ShapeKind::Task | ShapeKind::Milestone | ShapeKind::Summary => RendererKind::Schedule,
        ShapeKind::Server | ShapeKind::Database | ShapeKind::Cloud | ShapeKind::User | ShapeKind::Team => {
            RendererKind::Icon
        }
        ShapeKind::Rectangle | ShapeKind::Circle => RendererKind::Standard,
    }
}

/// Resolved visual style for one render object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDescriptor {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub text_color: String,
}

/// Base style for a shape kind, before per-node overrides.
#[must_use]
pub fn base_style(kind: ShapeKind) -> StyleDescriptor {
    let (fill, stroke) = match kind {
        ShapeKind::Rectangle => ("#E3F2FD", "#1565C0"),
        ShapeKind::Circle => ("#E8F5E9", "#2E7D32"),
        ShapeKind::Diamond => ("#FFF8E1", "#F9A825"),
        ShapeKind::Server => ("#ECEFF1", "#455A64"),
        ShapeKind::Database => ("#EDE7F6", "#4527A0"),
        ShapeKind::Cloud => ("#E1F5FE", "#0277BD"),
        ShapeKind::User => ("#FCE4EC", "#AD1457"),
        ShapeKind::Team => ("#F3E5F5", "#6A1B9A"),
        ShapeKind::Task => ("#E3F2FD", "#1565C0"),
        ShapeKind::Milestone => ("#FFF3E0", "#EF6C00"),
        ShapeKind::Summary => ("#ECEFF1", "#37474F"),
    };
    StyleDescriptor {
        fill: fill.to_owned(),
        stroke: stroke.to_owned(),
        stroke_width: 2.0,
        text_color: TEXT_COLOR.to_owned(),
    }
}

/// Merge caller overrides over the base style for a kind. Override fields
/// always win; absent or unreadable fields keep the base value.
#[must_use]
pub fn style_for(kind: ShapeKind, overrides: &Props<'_>) -> StyleDescriptor {
    let mut style = base_style(kind);
    if let Some(fill) = overrides.fill() {
        style.fill = fill.to_owned();
    }
    if let Some(stroke) = overrides.stroke() {
        style.stroke = stroke.to_owned();
    }
    if let Some(width) = overrides.stroke_width() {
        style.stroke_width = width;
    }
    if let Some(text_color) = overrides.text_color() {
        style.text_color = text_color.to_owned();
    }
    style
}

// ── Schedule derivations ────────────────────────────────────────

/// Fixed progress color band for schedule shapes. Four thresholds, five
/// bands, no interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBand {
    Complete,
    High,
    Mid,
    Low,
    Stalled,
}

impl ProgressBand {
    /// Band for a completion percentage. Total over all of `f64`: values
    /// outside 0..=100 clamp into the outer bands, NaN reads as stalled.
    #[must_use]
    pub fn for_progress(progress: f64) -> Self {
        if progress >= PROGRESS_COMPLETE {
            Self::Complete
        } else if progress >= PROGRESS_HIGH {
            Self::High
        } else if progress >= PROGRESS_MID {
            Self::Mid
        } else if progress >= PROGRESS_LOW {
            Self::Low
        } else {
            Self::Stalled
        }
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Complete => BAND_COMPLETE_COLOR,
            Self::High => BAND_HIGH_COLOR,
            Self::Mid => BAND_MID_COLOR,
            Self::Low => BAND_LOW_COLOR,
            Self::Stalled => BAND_STALLED_COLOR,
        }
    }
}

/// Derived duration label for schedule shapes, e.g. `"12d"`.
///
/// Requires both `start` and `end`; a reversed range reads as zero days.
#[must_use]
pub fn duration_label(props: &Props<'_>) -> Option<String> {
    let start = props.start()?;
    let end = props.end()?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let days = (end - start).max(0.0).round() as u64;
    Some(format!("{days}d"))
}

// ── Render objects ──────────────────────────────────────────────

/// Geometry primitive for one draw call on the host surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
    Polygon { points: Vec<Point> },
    /// Horizontal progress bar; `fill_ratio` in 0..=1 is the filled share.
    Bar { x: f64, y: f64, width: f64, height: f64, fill_ratio: f64 },
    Path { points: Vec<Point>, line_style: LineStyle, has_arrow: bool },
}

/// A fully resolved draw descriptor for the host surface or the export
/// boundary. The engine never rasterizes; this is the hand-off format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderObject {
    pub id: Uuid,
    pub geometry: Geometry,
    pub style: StyleDescriptor,
    /// Primary label, if any.
    pub label: Option<String>,
    /// Derived secondary label (schedule duration).
    pub sublabel: Option<String>,
    /// Icon glyph name for icon-bearing shapes; the host maps it to assets.
    pub icon: Option<&'static str>,
    pub z_index: i64,
}

/// Render a node through its resolved renderer.
#[must_use]
pub fn render_node(node: &DiagramNode) -> RenderObject {
    let kind = ShapeKind::from_tag(&node.shape);
    let props = Props::new(&node.props);
    let style = style_for(kind, &props);
    let label = props.label().map(str::to_owned);

    match renderer_for(kind) {
        RendererKind::Standard => render_standard(node, kind, style, label),
        RendererKind::Decision => render_decision(node, style, label),
        RendererKind::Schedule => render_schedule(node, kind, &props, style, label),
        RendererKind::Icon => render_icon(node, kind, style, label),
    }
}

fn render_standard(
    node: &DiagramNode,
    kind: ShapeKind,
    style: StyleDescriptor,
    label: Option<String>,
) -> RenderObject {
    let geometry = match kind {
        ShapeKind::Circle => Geometry::Ellipse {
            cx: node.x + node.width / 2.0,
            cy: node.y + node.height / 2.0,
            rx: node.width / 2.0,
            ry: node.height / 2.0,
        },
        _ => Geometry::Rect { x: node.x, y: node.y, width: node.width, height: node.height },
    };
    RenderObject {
        id: node.id,
        geometry,
        style,
        label,
        sublabel: None,
        icon: None,
        z_index: node.z_index,
    }
}

fn render_decision(node: &DiagramNode, style: StyleDescriptor, label: Option<String>) -> RenderObject {
    let center = node.bounds().center();
    let hw = node.width / 2.0;
    let hh = node.height / 2.0;
    RenderObject {
        id: node.id,
        geometry: Geometry::Polygon {
            points: vec![
                Point::new(center.x, center.y - hh),
                Point::new(center.x + hw, center.y),
                Point::new(center.x, center.y + hh),
                Point::new(center.x - hw, center.y),
            ],
        },
        style,
        label,
        sublabel: None,
        icon: None,
        z_index: node.z_index,
    }
}

fn render_icon(
    node: &DiagramNode,
    kind: ShapeKind,
    style: StyleDescriptor,
    label: Option<String>,
) -> RenderObject {
    RenderObject {
        id: node.id,
        geometry: Geometry::Rect { x: node.x, y: node.y, width: node.width, height: node.height },
        style,
        label,
        sublabel: None,
        icon: Some(kind.tag()),
        z_index: node.z_index,
    }
}

fn render_schedule(
    node: &DiagramNode,
    kind: ShapeKind,
    props: &Props<'_>,
    mut style: StyleDescriptor,
    label: Option<String>,
) -> RenderObject {
    let progress = props.progress().unwrap_or(0.0);
    let band = ProgressBand::for_progress(progress);
    let sublabel = duration_label(props);

    let geometry = match kind {
        ShapeKind::Milestone => {
            // Milestones render as a fixed-proportion diamond marker.
            let center = node.bounds().center();
            let half = node.width.min(node.height) / 2.0;
            Geometry::Polygon {
                points: vec![
                    Point::new(center.x, center.y - half),
                    Point::new(center.x + half, center.y),
                    Point::new(center.x, center.y + half),
                    Point::new(center.x - half, center.y),
                ],
            }
        }
        ShapeKind::Summary => {
            // Summary bars are slim and sit at the top of the row.
            Geometry::Bar {
                x: node.x,
                y: node.y,
                width: node.width,
                height: (node.height * 0.4).max(6.0),
                fill_ratio: (progress / 100.0).clamp(0.0, 1.0),
            }
        }
        _ => Geometry::Bar {
            x: node.x,
            y: node.y,
            width: node.width,
            height: node.height,
            fill_ratio: (progress / 100.0).clamp(0.0, 1.0),
        },
    };

    // The progress band drives the fill; explicit style overrides still own
    // stroke, width, and text color.
    style.fill = band.color().to_owned();

    RenderObject {
        id: node.id,
        geometry,
        style,
        label,
        sublabel,
        icon: None,
        z_index: node.z_index,
    }
}

//! Shared defaults for the diagram engine.

// ── Safe-read defaults (property panel substitution policy) ─────

/// Default color substituted for any unreadable color field.
pub const DEFAULT_COLOR: &str = "#000000";

/// Default stroke width for connectors, in world units.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// Body text color shared by the shape style table.
pub const TEXT_COLOR: &str = "#1F1A17";

// ── Node geometry ───────────────────────────────────────────────

/// Default node width in world units when a creation path gives none.
pub const DEFAULT_NODE_W: f64 = 120.0;

/// Default node height in world units when a creation path gives none.
pub const DEFAULT_NODE_H: f64 = 60.0;

// ── Schedule progress bands ─────────────────────────────────────

/// Progress at or above which a schedule node renders as complete.
pub const PROGRESS_COMPLETE: f64 = 100.0;
/// Lower bound of the in-progress-high band.
pub const PROGRESS_HIGH: f64 = 75.0;
/// Lower bound of the mid band.
pub const PROGRESS_MID: f64 = 50.0;
/// Lower bound of the low band.
pub const PROGRESS_LOW: f64 = 25.0;

pub const BAND_COMPLETE_COLOR: &str = "#2E7D32";
pub const BAND_HIGH_COLOR: &str = "#558B2F";
pub const BAND_MID_COLOR: &str = "#F9A825";
pub const BAND_LOW_COLOR: &str = "#EF6C00";
pub const BAND_STALLED_COLOR: &str = "#C62828";

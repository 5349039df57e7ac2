//! Per-editor session state and lifecycle.
//!
//! DESIGN
//! ======
//! One `Session` exists per open editor — there is no process-wide singleton.
//! The session owns the transient UI state (selection, background, panel
//! visibility), the handle to the host's render surface, render-request
//! coalescing, the dirty digest baseline, and the generation token used to
//! drop stale text-to-diagram completions. It owns no node or connector
//! data; the graph lives in [`crate::doc::DiagramDoc`].
//!
//! `init` binds the surface and starts accepting events; `teardown` releases
//! the handle, clears the selection, and invalidates any in-flight
//! generation request. Events that arrive after teardown are ignored.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::doc::{DiagramDoc, ObjectRef};

/// The canvas handle contract. The host implements this over whatever
/// actually paints (a browser canvas, a native view, a test stub); the
/// engine only ever asks it to repaint.
pub trait RenderSurface {
    /// Request one asynchronous repaint of the full scene.
    fn request_render(&self);
}

/// Kind of the actively selected object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    Node,
    Connector,
}

/// Current selection: at most one active object.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selection {
    active: Option<ObjectRef>,
}

impl Selection {
    #[must_use]
    pub fn active(&self) -> Option<ObjectRef> {
        self.active
    }

    #[must_use]
    pub fn kind(&self) -> Option<SelectionKind> {
        self.active.map(|object| match object {
            ObjectRef::Node(_) => SelectionKind::Node,
            ObjectRef::Connector(_) => SelectionKind::Connector,
        })
    }
}

/// Canvas background descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Background {
    #[default]
    Blank,
    Solid {
        color: String,
    },
}

/// Coalesces render requests: any number of mutations within one gesture
/// collapse into a single repaint at flush time.
#[derive(Debug, Default)]
pub struct RenderScheduler {
    pending: bool,
}

impl RenderScheduler {
    /// Mark that the scene changed and needs a repaint.
    pub fn schedule(&mut self) {
        self.pending = true;
    }

    /// Clear and return the pending flag.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Token identifying one text-to-diagram generation request.
///
/// Completions are applied only while their token is still the current one:
/// a newer request or a teardown invalidates everything before it
/// (last-request-wins, no queued backlog).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationToken(u64);

#[derive(Debug, Default)]
struct GenerationState {
    next: u64,
    current: Option<u64>,
}

impl GenerationState {
    fn begin(&mut self) -> GenerationToken {
        self.next += 1;
        self.current = Some(self.next);
        GenerationToken(self.next)
    }

    fn complete(&mut self, token: GenerationToken) -> bool {
        if self.current == Some(token.0) {
            self.current = None;
            true
        } else {
            false
        }
    }

    fn invalidate(&mut self) {
        self.current = None;
    }
}

/// Per-editor session state. Created on editor mount, torn down on unmount.
pub struct Session {
    surface: Option<Box<dyn RenderSurface>>,
    background: Background,
    selection: Selection,
    panel_visible: bool,
    render: RenderScheduler,
    generation: GenerationState,
    baseline_digest: Option<String>,
}

impl Session {
    /// Create an inert session. Nothing renders until [`Session::init`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            surface: None,
            background: Background::default(),
            selection: Selection::default(),
            panel_visible: false,
            render: RenderScheduler::default(),
            generation: GenerationState::default(),
            baseline_digest: None,
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Bind the render surface and start accepting events.
    pub fn init(&mut self, surface: Box<dyn RenderSurface>) {
        self.surface = Some(surface);
    }

    /// Whether a surface is bound and events are being accepted.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.surface.is_some()
    }

    /// Release the surface handle, clear transient UI state, and invalidate
    /// any in-flight generation request.
    pub fn teardown(&mut self) {
        self.surface = None;
        self.selection = Selection::default();
        self.panel_visible = false;
        self.generation.invalidate();
        self.render.take();
    }

    // ── Rendering ───────────────────────────────────────────────

    /// Mark the scene dirty for the current gesture.
    pub fn schedule_render(&mut self) {
        self.render.schedule();
    }

    /// Deliver at most one repaint request to the surface for everything
    /// scheduled since the last flush. Returns whether a repaint was
    /// requested.
    pub fn flush_render(&mut self) -> bool {
        if !self.render.take() {
            return false;
        }
        match &self.surface {
            Some(surface) => {
                surface.request_render();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn has_pending_render(&self) -> bool {
        self.render.is_pending()
    }

    // ── Selection / panel ───────────────────────────────────────

    /// Replace the selection. Panel visibility is re-derived on every call:
    /// it is `true` exactly when something is selected.
    pub fn set_selection(&mut self, active: Option<ObjectRef>) {
        self.selection = Selection { active };
        self.panel_visible = active.is_some();
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    #[must_use]
    pub fn panel_visible(&self) -> bool {
        self.panel_visible
    }

    // ── Background ──────────────────────────────────────────────

    #[must_use]
    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn set_background(&mut self, background: Background) {
        self.background = background;
        self.schedule_render();
    }

    // ── Generation tokens ───────────────────────────────────────

    /// Start a new generation request, superseding any in-flight one.
    pub fn begin_generation(&mut self) -> GenerationToken {
        self.generation.begin()
    }

    /// Consume a completion. Returns `true` only when the token is still the
    /// current request and the session is live; everything else is stale.
    pub fn accept_generation(&mut self, token: GenerationToken) -> bool {
        self.is_live() && self.generation.complete(token)
    }

    // ── Dirty tracking ──────────────────────────────────────────

    /// Record the digest of the last saved (or freshly loaded) state.
    pub fn mark_saved(&mut self, digest: String) {
        self.baseline_digest = Some(digest);
    }

    /// Compare a current digest against the saved baseline.
    #[must_use]
    pub fn is_dirty(&self, current_digest: &str) -> bool {
        self.baseline_digest.as_deref() != Some(current_digest)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Content digest over the graph and background, used for unsaved-change
/// detection. Node and connector order is normalized by id so the digest is
/// a pure function of content.
#[must_use]
pub fn digest(doc: &DiagramDoc, background: &Background) -> String {
    let canonical = serde_json::json!({
        "nodes": doc.nodes_by_id(),
        "connectors": doc.connectors_by_id(),
        "background": background,
    });
    // Serializing plain data types into a Vec cannot fail; the fallback arm
    // keeps this total without a panic path.
    match serde_json::to_vec(&canonical) {
        Ok(bytes) => {
            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            bytes_to_hex(&hasher.finalize())
        }
        Err(_) => String::new(),
    }
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // Writing to a String is infallible.
        if write!(out, "{b:02x}").is_err() {
            break;
        }
    }
    out
}

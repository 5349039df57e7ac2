use std::cell::Cell;
use std::rc::Rc;

use serde_json::json;
use uuid::Uuid;

use super::*;
use crate::doc::DiagramNode;

struct CountingSurface {
    renders: Rc<Cell<usize>>,
}

impl RenderSurface for CountingSurface {
    fn request_render(&self) {
        self.renders.set(self.renders.get() + 1);
    }
}

fn live_session() -> (Session, Rc<Cell<usize>>) {
    let renders = Rc::new(Cell::new(0));
    let mut session = Session::new();
    session.init(Box::new(CountingSurface { renders: Rc::clone(&renders) }));
    (session, renders)
}

fn make_node(id: u128) -> DiagramNode {
    DiagramNode {
        id: Uuid::from_u128(id),
        shape: "rectangle".to_owned(),
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 50.0,
        rotation: 0.0,
        z_index: 0,
        props: json!({}),
    }
}

// =============================================================
// Render coalescing
// =============================================================

#[test]
fn many_schedules_flush_as_one_repaint() {
    let (mut session, renders) = live_session();
    session.schedule_render();
    session.schedule_render();
    session.schedule_render();

    assert!(session.flush_render());
    assert_eq!(renders.get(), 1);
}

#[test]
fn flush_without_pending_is_a_noop() {
    let (mut session, renders) = live_session();
    assert!(!session.flush_render());
    assert_eq!(renders.get(), 0);
}

#[test]
fn flush_clears_pending() {
    let (mut session, renders) = live_session();
    session.schedule_render();
    assert!(session.flush_render());
    assert!(!session.flush_render());
    assert_eq!(renders.get(), 1);
}

#[test]
fn flush_without_surface_drops_the_request() {
    let mut session = Session::new();
    session.schedule_render();
    assert!(!session.flush_render());
}

// =============================================================
// Lifecycle
// =============================================================

#[test]
fn init_makes_the_session_live() {
    let (session, _) = live_session();
    assert!(session.is_live());
    assert!(!Session::new().is_live());
}

#[test]
fn teardown_releases_surface_and_clears_ui_state() {
    let (mut session, renders) = live_session();
    session.set_selection(Some(crate::doc::ObjectRef::Node(Uuid::from_u128(1))));
    session.schedule_render();

    session.teardown();
    assert!(!session.is_live());
    assert!(session.selection().active().is_none());
    assert!(!session.panel_visible());
    // The pending render died with the session.
    assert!(!session.flush_render());
    assert_eq!(renders.get(), 0);
}

// =============================================================
// Selection / panel invariant
// =============================================================

#[test]
fn panel_visible_iff_selection_present() {
    let mut session = Session::new();
    assert!(!session.panel_visible());

    session.set_selection(Some(crate::doc::ObjectRef::Connector(Uuid::from_u128(5))));
    assert!(session.panel_visible());
    assert_eq!(session.selection().kind(), Some(SelectionKind::Connector));

    session.set_selection(None);
    assert!(!session.panel_visible());
    assert_eq!(session.selection().kind(), None);
}

// =============================================================
// Generation tokens
// =============================================================

#[test]
fn completion_applies_only_for_current_token() {
    let (mut session, _) = live_session();
    let token = session.begin_generation();
    assert!(session.accept_generation(token));
    // A completed token cannot apply twice.
    assert!(!session.accept_generation(token));
}

#[test]
fn newer_request_supersedes_older() {
    let (mut session, _) = live_session();
    let first = session.begin_generation();
    let second = session.begin_generation();

    assert!(!session.accept_generation(first));
    assert!(session.accept_generation(second));
}

#[test]
fn teardown_invalidates_in_flight_generation() {
    let (mut session, _) = live_session();
    let token = session.begin_generation();
    session.teardown();
    assert!(!session.accept_generation(token));
}

// =============================================================
// Dirty digest
// =============================================================

#[test]
fn digest_is_stable_across_insertion_order() {
    let background = Background::default();

    let mut first = crate::doc::DiagramDoc::new();
    first.insert_node(make_node(1));
    first.insert_node(make_node(2));

    let mut second = crate::doc::DiagramDoc::new();
    second.insert_node(make_node(2));
    second.insert_node(make_node(1));

    assert_eq!(digest(&first, &background), digest(&second, &background));
}

#[test]
fn digest_tracks_content_and_background() {
    let mut doc = crate::doc::DiagramDoc::new();
    let empty = digest(&doc, &Background::default());

    doc.insert_node(make_node(1));
    let with_node = digest(&doc, &Background::default());
    assert_ne!(empty, with_node);

    let with_background = digest(&doc, &Background::Solid { color: "#FAFAFA".to_owned() });
    assert_ne!(with_node, with_background);
}

#[test]
fn dirty_compares_against_saved_baseline() {
    let mut session = Session::new();
    let doc = crate::doc::DiagramDoc::new();
    let d = digest(&doc, session.background());

    // No baseline yet: everything counts as dirty.
    assert!(session.is_dirty(&d));

    session.mark_saved(d.clone());
    assert!(!session.is_dirty(&d));
    assert!(session.is_dirty("something-else"));
}

#[test]
fn set_background_schedules_a_repaint() {
    let (mut session, renders) = live_session();
    session.set_background(Background::Solid { color: "#EEE".to_owned() });
    assert!(session.flush_render());
    assert_eq!(renders.get(), 1);
    assert_eq!(session.background(), &Background::Solid { color: "#EEE".to_owned() });
}

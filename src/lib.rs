//! Diagram graph engine for a browser-based diagramming board.
//!
//! This crate is the headless core of the board editor: it owns the diagram
//! graph (typed shape nodes and routable connectors), the shape-renderer
//! dispatch, the synchronization between canvas selection and the property
//! panel, template instantiation, and the per-editor session lifecycle. The
//! host shell is responsible only for translating raw DOM input into engine
//! calls and for rasterizing the [`shape::RenderObject`] draw list the engine
//! produces.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`editor`] | Top-level [`editor::Editor`] facade and event entry points |
//! | [`doc`] | In-memory diagram store, node/connector types, props access |
//! | [`shape`] | Shape-tag resolution, style table, render dispatch |
//! | [`connector`] | Connector lifecycle and anchor-side routing |
//! | [`bridge`] | Selection ↔ property-panel normalization and write-back |
//! | [`template`] | Template table and graph instantiation |
//! | [`describe`] | Text diagram-description parsing (generation boundary) |
//! | [`session`] | Per-editor session state, render coalescing, dirty digest |
//! | [`snapshot`] | Persistence and export boundary |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`error`] | Stable error-code contract |
//! | [`consts`] | Shared defaults (colors, sizes, progress bands) |

pub mod bridge;
pub mod camera;
pub mod connector;
pub mod consts;
pub mod describe;
pub mod doc;
pub mod editor;
pub mod error;
pub mod session;
pub mod shape;
pub mod snapshot;
pub mod template;

pub use editor::Editor;
pub use error::ErrorCode;

#![forbid(unsafe_code)]

//! The public façade of the gridcell engine.
//!
//! # Role in gridcell
//! `gcell-system` ties the layout machinery to a concrete render surface.
//! [`GridSystem`] owns the tracked-element registry and drives creation,
//! movement, removal, and bulk re-layout; [`PageManager`] partitions those
//! elements into navigable pages and applies visibility.
//!
//! # Primary responsibilities
//! - **GridSystem**: element lifecycle over an injected [`RenderSurface`],
//!   precision changes, the throttled resize pipeline, and layout-changed
//!   notifications.
//! - **PageManager**: page registry, navigation state machine with bounded
//!   history, and the persisted page snapshot (export/import).
//!
//! # How it fits in the system
//! Widget code talks to these two types only. Everything below them —
//! coordinate parsing, the bounds cache, gc conversion — is reachable
//! through the façade but owned by the lower crates.
//!
//! [`RenderSurface`]: gcell_surface::RenderSurface

pub mod pages;
pub mod system;

pub use pages::{DEFAULT_PAGE_ID, PAGE_SCHEMA_VERSION, Page, PageManager, PageRecord, PageSnapshot, SnapshotError};
pub use system::{ElementKind, ElementOptions, GridError, GridInfo, GridSystem, TrackedElement};

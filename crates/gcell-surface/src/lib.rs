#![forbid(unsafe_code)]

//! The render-surface capability boundary.
//!
//! # Role in gridcell
//! The layout engine never touches a real rendering host. Everything it
//! needs from one — measuring the container, creating visual nodes,
//! positioning them, toggling visibility — is expressed by the
//! [`RenderSurface`] trait and injected into the system crate. The
//! coordinate and cache math stays testable without any rendering host;
//! [`HeadlessSurface`] is the deterministic in-memory implementation the
//! test suites run against.
//!
//! # Primary responsibilities
//! - **RenderSurface**: the capability interface {create, attach, detach,
//!   measure, place, style, content, visibility}.
//! - **SurfaceHandle**: an opaque node identity minted by the surface.
//! - **HeadlessSurface**: an in-memory surface with settable root bounds
//!   and viewport, for tests and harnesses.

pub mod headless;

use std::collections::BTreeMap;

use gcell_core::geometry::{Bounds, PixelRect, Viewport};

pub use headless::HeadlessSurface;

/// A property→value style map.
///
/// Keys are CSS-like property names; values either carry gc units
/// (`"1.5gc"`) for the engine to convert, or pass through untouched.
/// Ordered so style application is deterministic.
pub type StyleMap = BTreeMap<String, String>;

/// Opaque identity of a node created on a render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceHandle(u64);

impl SurfaceHandle {
    /// Create a handle from a raw surface-assigned id.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw surface-assigned id.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// The visual category of a surface node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// A generic positioned box.
    Block,
    /// A text container.
    Text,
    /// An interactive button.
    Button,
    /// An image element.
    Image,
}

/// Capability interface to the rendering host.
///
/// The engine calls these synchronously; implementations must not re-enter
/// the engine. Measurement may fail (a detached or zero-sized host), which
/// is why [`measure`](Self::measure) returns an `Option` — the engine
/// converts that into its own typed error at the operation boundary.
pub trait RenderSurface {
    /// The root node whose bounds define the layout container.
    fn root(&self) -> SurfaceHandle;

    /// The host viewport size, used for breakpoint detection and gc units.
    fn viewport(&self) -> Viewport;

    /// Create a detached node of the given kind.
    fn create(&mut self, kind: SurfaceKind) -> SurfaceHandle;

    /// Attach `child` under `parent`. Re-attaching moves the node.
    fn attach(&mut self, parent: SurfaceHandle, child: SurfaceHandle);

    /// Detach and destroy a node. Returns `false` for unknown handles.
    fn detach(&mut self, handle: SurfaceHandle) -> bool;

    /// Measure a node's current bounds, if the host can resolve them.
    fn measure(&self, handle: SurfaceHandle) -> Option<Bounds>;

    /// Position and size a node.
    fn place(&mut self, handle: SurfaceHandle, rect: PixelRect);

    /// Apply resolved styles (pixel values, not gc units) to a node.
    fn apply_styles(&mut self, handle: SurfaceHandle, styles: &StyleMap);

    /// Replace a node's text content.
    fn set_content(&mut self, handle: SurfaceHandle, content: &str);

    /// Show or hide a node.
    fn set_visible(&mut self, handle: SurfaceHandle, visible: bool);
}

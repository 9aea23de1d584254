#![forbid(unsafe_code)]

//! Deterministic in-memory render surface.
//!
//! [`HeadlessSurface`] implements [`RenderSurface`] with a flat node table:
//! no layout of its own, no clock, no host. Tests set the root bounds and
//! viewport explicitly and assert on what the engine did to each node.
//!
//! # Invariants
//!
//! 1. Handle `0` is the root; it always exists and cannot be detached.
//! 2. Handles are unique for the lifetime of the surface and never reused.
//! 3. `measure` on the root returns the configured container bounds;
//!    on any other node it returns the rect the engine last placed.

use std::cell::Cell;

use gcell_core::geometry::{Bounds, PixelRect, Viewport};
use rustc_hash::FxHashMap;

use crate::{RenderSurface, StyleMap, SurfaceHandle, SurfaceKind};

const ROOT: u64 = 0;

/// One node in the headless tree.
#[derive(Debug, Clone)]
pub struct HeadlessNode {
    pub kind: SurfaceKind,
    pub parent: Option<SurfaceHandle>,
    pub placed: Option<PixelRect>,
    pub styles: StyleMap,
    pub content: String,
    pub visible: bool,
}

impl HeadlessNode {
    fn new(kind: SurfaceKind) -> Self {
        Self {
            kind,
            parent: None,
            placed: None,
            styles: StyleMap::new(),
            content: String::new(),
            visible: true,
        }
    }
}

/// In-memory [`RenderSurface`] for tests and harnesses.
#[derive(Debug)]
pub struct HeadlessSurface {
    nodes: FxHashMap<u64, HeadlessNode>,
    next_handle: u64,
    root_bounds: Bounds,
    viewport: Viewport,
    /// Count of root measurements, for cache assertions. A `Cell` because
    /// `measure` is `&self` on the trait.
    measure_calls: Cell<u64>,
    /// When true, `measure` reports failure for every node.
    fail_measure: bool,
}

impl HeadlessSurface {
    /// Create a surface whose container fills the viewport.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self::with_bounds(viewport, Bounds::from_size(viewport.width, viewport.height))
    }

    /// Create a surface with distinct viewport and container bounds.
    #[must_use]
    pub fn with_bounds(viewport: Viewport, root_bounds: Bounds) -> Self {
        let mut nodes = FxHashMap::default();
        nodes.insert(ROOT, HeadlessNode::new(SurfaceKind::Block));
        Self {
            nodes,
            next_handle: ROOT + 1,
            root_bounds,
            viewport,
            measure_calls: Cell::new(0),
            fail_measure: false,
        }
    }

    /// Replace the container bounds, simulating a host resize.
    pub fn set_root_bounds(&mut self, bounds: Bounds) {
        self.root_bounds = bounds;
    }

    /// Replace the viewport, simulating a host resize.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Make every subsequent `measure` fail, simulating a detached host.
    pub fn set_fail_measure(&mut self, fail: bool) {
        self.fail_measure = fail;
    }

    /// Inspect a node.
    #[must_use]
    pub fn node(&self, handle: SurfaceHandle) -> Option<&HeadlessNode> {
        self.nodes.get(&handle.raw())
    }

    /// Number of nodes, including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether a node is currently visible. Unknown handles count as hidden.
    #[must_use]
    pub fn is_visible(&self, handle: SurfaceHandle) -> bool {
        self.nodes.get(&handle.raw()).is_some_and(|n| n.visible)
    }

    /// How many times the root has been measured.
    #[must_use]
    pub fn measure_calls(&self) -> u64 {
        self.measure_calls.get()
    }
}

impl RenderSurface for HeadlessSurface {
    fn root(&self) -> SurfaceHandle {
        SurfaceHandle::from_raw(ROOT)
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn create(&mut self, kind: SurfaceKind) -> SurfaceHandle {
        let raw = self.next_handle;
        self.next_handle += 1;
        self.nodes.insert(raw, HeadlessNode::new(kind));
        SurfaceHandle::from_raw(raw)
    }

    fn attach(&mut self, parent: SurfaceHandle, child: SurfaceHandle) {
        if let Some(node) = self.nodes.get_mut(&child.raw()) {
            node.parent = Some(parent);
        }
    }

    fn detach(&mut self, handle: SurfaceHandle) -> bool {
        if handle.raw() == ROOT {
            return false;
        }
        self.nodes.remove(&handle.raw()).is_some()
    }

    fn measure(&self, handle: SurfaceHandle) -> Option<Bounds> {
        if self.fail_measure {
            return None;
        }
        if handle.raw() == ROOT {
            self.measure_calls.set(self.measure_calls.get() + 1);
            return Some(self.root_bounds);
        }
        let node = self.nodes.get(&handle.raw())?;
        node.placed.map(|rect| {
            Bounds::new(
                f64::from(rect.left),
                f64::from(rect.top),
                f64::from(rect.width),
                f64::from(rect.height),
            )
        })
    }

    fn place(&mut self, handle: SurfaceHandle, rect: PixelRect) {
        if let Some(node) = self.nodes.get_mut(&handle.raw()) {
            node.placed = Some(rect);
        }
    }

    fn apply_styles(&mut self, handle: SurfaceHandle, styles: &StyleMap) {
        if let Some(node) = self.nodes.get_mut(&handle.raw()) {
            for (key, value) in styles {
                node.styles.insert(key.clone(), value.clone());
            }
        }
    }

    fn set_content(&mut self, handle: SurfaceHandle, content: &str) {
        if let Some(node) = self.nodes.get_mut(&handle.raw()) {
            node.content = content.to_string();
        }
    }

    fn set_visible(&mut self, handle: SurfaceHandle, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&handle.raw()) {
            node.visible = visible;
        }
    }
}

#![forbid(unsafe_code)]

//! The tracked-element registry and re-layout façade.
//!
//! [`GridSystem`] owns every engine-managed visual element: it parses the
//! element's coordinate string, resolves it to a pixel rectangle, creates
//! and positions a surface node, converts gc-tagged styles, and registers
//! the element under its id. Re-layout (after a resize or a precision
//! change) walks the registry and re-resolves every element.
//!
//! # Error policy
//!
//! The `try_*` operations return typed errors. The unprefixed wrappers
//! implement the engine's documented default: log a warning and continue,
//! so a single bad coordinate never takes the widget down or corrupts the
//! other elements. Bulk re-layout isolates failures per element.
//!
//! # Invariants
//!
//! 1. Registry entries and surface nodes stay paired: removing an element
//!    detaches its node, and a failed creation registers nothing.
//! 2. A failed move leaves the element's coordinates and placement
//!    untouched.
//! 3. Auto-generated ids are sequential and never collide with
//!    caller-supplied ids.

use std::fmt;

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};
use web_time::Instant;

use gcell_core::coord::{CoordError, CoordRange, Coordinate, parse_coordinates};
use gcell_core::geometry::{Bounds, PixelRect};
use gcell_core::notify::{Listeners, SubscriptionId};
use gcell_core::throttle::Throttle;
use gcell_layout::calc::{self, CalcError, GridCalculations, LayoutChanged};
use gcell_layout::config::{Breakpoint, ConfigError, GridConfig};
use gcell_layout::fonts::{ConvertContext, StyleConverter};
use gcell_layout::units::GcUnits;
use gcell_surface::{RenderSurface, StyleMap, SurfaceHandle, SurfaceKind};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The engine-facing category of a tracked element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A generic positioned box.
    Block,
    /// Text with centered content and sizing defaults.
    TextBox,
    /// An interactive button.
    Button,
    /// An image; content carries the source reference.
    Image,
}

impl ElementKind {
    const fn surface_kind(self) -> SurfaceKind {
        match self {
            Self::Block => SurfaceKind::Block,
            Self::TextBox => SurfaceKind::Text,
            Self::Button => SurfaceKind::Button,
            Self::Image => SurfaceKind::Image,
        }
    }

    /// Category defaults, merged under caller overrides.
    fn default_styles(self) -> StyleMap {
        let mut styles = StyleMap::new();
        match self {
            Self::Block => {}
            Self::TextBox => {
                styles.insert("padding".into(), "0.25gc".into());
                styles.insert("font-size".into(), "1gc".into());
                styles.insert("text-align".into(), "center".into());
            }
            Self::Button => {
                styles.insert("padding".into(), "0.5gc".into());
                styles.insert("font-size".into(), "1gc".into());
                styles.insert("text-align".into(), "center".into());
                styles.insert("cursor".into(), "pointer".into());
                styles.insert("border-radius".into(), "0.25gc".into());
            }
            Self::Image => {
                styles.insert("object-fit".into(), "contain".into());
                styles.insert("width".into(), "100%".into());
                styles.insert("height".into(), "100%".into());
            }
        }
        styles
    }
}

/// Optional knobs for element creation.
#[derive(Debug, Clone, Default)]
pub struct ElementOptions {
    /// Registry id; auto-generated when absent.
    pub id: Option<String>,
    /// Parent node; the surface root when absent.
    pub parent: Option<SurfaceHandle>,
    /// Text content (or image source).
    pub content: Option<String>,
    /// Styles merged over the kind defaults; gc values are converted.
    pub styles: StyleMap,
}

impl ElementOptions {
    /// Set the registry id (builder pattern).
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the content (builder pattern).
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Add one style entry (builder pattern).
    #[must_use]
    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.insert(property.into(), value.into());
        self
    }

    /// Set the parent node (builder pattern).
    #[must_use]
    pub fn with_parent(mut self, parent: SurfaceHandle) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// An engine-managed visual element.
#[derive(Debug, Clone)]
pub struct TrackedElement {
    pub id: String,
    /// The coordinate string as supplied, re-parsed on re-layout.
    pub coords: String,
    pub range: CoordRange,
    pub handle: SurfaceHandle,
    pub kind: ElementKind,
    /// Raw (gc-tagged) styles, defaults included; re-converted per pass.
    pub styles: StyleMap,
}

/// Snapshot of the engine state for callers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridInfo {
    pub precision: u8,
    pub columns: u16,
    pub rows: u16,
    pub breakpoint: Breakpoint,
    pub bounds: Bounds,
    pub element_count: usize,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from element-level operations.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// Coordinate parsing or bounds validation failed.
    Coord(CoordError),
    /// The container could not be measured.
    Calc(CalcError),
    /// A configuration mutation was rejected.
    Config(ConfigError),
    /// The requested id is already registered.
    DuplicateId { id: String },
    /// No element with the given id is registered.
    UnknownElement { id: String },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coord(e) => write!(f, "{e}"),
            Self::Calc(e) => write!(f, "{e}"),
            Self::Config(e) => write!(f, "{e}"),
            Self::DuplicateId { id } => write!(f, "element id {id:?} already registered"),
            Self::UnknownElement { id } => write!(f, "unknown element id {id:?}"),
        }
    }
}

impl std::error::Error for GridError {}

impl From<CoordError> for GridError {
    fn from(err: CoordError) -> Self {
        Self::Coord(err)
    }
}

impl From<CalcError> for GridError {
    fn from(err: CalcError) -> Self {
        Self::Calc(err)
    }
}

impl From<ConfigError> for GridError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

// ---------------------------------------------------------------------------
// GridSystem
// ---------------------------------------------------------------------------

/// The engine façade over an injected render surface.
pub struct GridSystem<S: RenderSurface> {
    surface: S,
    config: GridConfig,
    calc: GridCalculations,
    converter: StyleConverter,
    units: GcUnits,
    elements: FxHashMap<String, TrackedElement>,
    next_auto_id: u64,
    listeners: Listeners<LayoutChanged>,
    throttle: Throttle,
}

impl<S: RenderSurface> GridSystem<S> {
    /// Create a system over a surface.
    ///
    /// Fails only if the configuration carries an invalid precision, which
    /// [`GridConfig`] itself prevents; constructing from any `GridConfig`
    /// value therefore succeeds.
    pub fn new(surface: S, config: GridConfig) -> Result<Self, ConfigError> {
        let units = GcUnits::new(config.precision(), surface.viewport())?;
        let throttle = Throttle::new(config.resize_throttle());
        Ok(Self {
            surface,
            config,
            calc: GridCalculations::new(),
            converter: StyleConverter::new(),
            units,
            elements: FxHashMap::default(),
            next_auto_id: 1,
            listeners: Listeners::new(),
            throttle,
        })
    }

    /// The injected surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable surface access, for hosts that need to push state in
    /// (resized bounds, viewport) before notifying the engine.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// The gc-unit converter (derived style variables live here).
    pub fn units_mut(&mut self) -> &mut GcUnits {
        &mut self.units
    }

    /// The bounds-cache owner, exposed for the cache toggle.
    pub fn calculations_mut(&mut self) -> &mut GridCalculations {
        &mut self.calc
    }

    fn breakpoint(&self) -> Breakpoint {
        self.config.detect_breakpoint(self.surface.viewport().width)
    }

    fn next_id(&mut self) -> String {
        loop {
            let candidate = format!("element-{}", self.next_auto_id);
            self.next_auto_id += 1;
            if !self.elements.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    // -- creation ----------------------------------------------------------

    /// Create, position, style, and register an element.
    pub fn try_create_element(
        &mut self,
        coords: &str,
        kind: ElementKind,
        options: ElementOptions,
    ) -> Result<SurfaceHandle, GridError> {
        self.try_create_element_at(coords, kind, options, Instant::now())
    }

    /// As [`try_create_element`](Self::try_create_element), at an explicit
    /// instant (deterministic core).
    pub fn try_create_element_at(
        &mut self,
        coords: &str,
        kind: ElementKind,
        options: ElementOptions,
        now: Instant,
    ) -> Result<SurfaceHandle, GridError> {
        let range = parse_coordinates(coords, self.config.dims())?;
        let id = match options.id {
            Some(id) => {
                if self.elements.contains_key(&id) {
                    return Err(GridError::DuplicateId { id });
                }
                id
            }
            None => self.next_id(),
        };

        let rect = self
            .calc
            .coords_to_pixels_at(&range, &self.surface, &self.config, now)?;

        let mut styles = kind.default_styles();
        styles.extend(options.styles);

        let handle = self.surface.create(kind.surface_kind());
        self.apply_placement(handle, rect, &styles);
        if let Some(content) = &options.content {
            self.surface.set_content(handle, content);
        }
        let parent = options.parent.unwrap_or_else(|| self.surface.root());
        self.surface.attach(parent, handle);

        trace!(id = %id, coords, "element created");
        self.elements.insert(
            id.clone(),
            TrackedElement {
                id,
                coords: coords.to_string(),
                range,
                handle,
                kind,
                styles,
            },
        );
        Ok(handle)
    }

    fn apply_placement(&mut self, handle: SurfaceHandle, rect: PixelRect, styles: &StyleMap) {
        let ctx = ConvertContext::new(
            &self.config,
            self.breakpoint(),
            rect.cell_width,
            rect.cell_height,
        );
        let resolved = self.converter.process_styles(styles, &ctx);
        self.surface.place(handle, rect);
        self.surface.apply_styles(handle, &resolved);
    }

    /// Fail-soft creation: logs and returns `None` on any error.
    pub fn create_element(
        &mut self,
        coords: &str,
        kind: ElementKind,
        options: ElementOptions,
    ) -> Option<SurfaceHandle> {
        match self.try_create_element(coords, kind, options) {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(coords, error = %err, "element creation failed");
                None
            }
        }
    }

    /// A text box with centered content and gc sizing defaults.
    pub fn create_text_box(
        &mut self,
        coords: &str,
        text: &str,
        options: ElementOptions,
    ) -> Option<SurfaceHandle> {
        self.create_element(coords, ElementKind::TextBox, options.with_content(text))
    }

    /// A button with padding, cursor, and radius defaults.
    pub fn create_button(
        &mut self,
        coords: &str,
        label: &str,
        options: ElementOptions,
    ) -> Option<SurfaceHandle> {
        self.create_element(coords, ElementKind::Button, options.with_content(label))
    }

    /// An image; `source` lands in the node content.
    pub fn create_image(
        &mut self,
        coords: &str,
        source: &str,
        options: ElementOptions,
    ) -> Option<SurfaceHandle> {
        self.create_element(coords, ElementKind::Image, options.with_content(source))
    }

    // -- mutation ----------------------------------------------------------

    /// Re-position an existing element at new coordinates.
    pub fn try_move_element(&mut self, id: &str, coords: &str) -> Result<(), GridError> {
        if !self.elements.contains_key(id) {
            return Err(GridError::UnknownElement { id: id.to_string() });
        }
        // Parse and resolve before touching the element, so failures leave
        // the prior position intact.
        let range = parse_coordinates(coords, self.config.dims())?;
        let rect = self
            .calc
            .coords_to_pixels_at(&range, &self.surface, &self.config, Instant::now())?;

        let (handle, styles) = match self.elements.get_mut(id) {
            Some(element) => {
                element.coords = coords.to_string();
                element.range = range;
                (element.handle, element.styles.clone())
            }
            None => return Err(GridError::UnknownElement { id: id.to_string() }),
        };
        self.apply_placement(handle, rect, &styles);
        Ok(())
    }

    /// Fail-soft move: `false` on unknown id or invalid coordinates.
    pub fn move_element(&mut self, id: &str, coords: &str) -> bool {
        match self.try_move_element(id, coords) {
            Ok(()) => true,
            Err(err) => {
                warn!(id, coords, error = %err, "element move failed");
                false
            }
        }
    }

    /// Detach and deregister an element. Idempotent: unknown ids return
    /// `false` without error.
    pub fn remove_element(&mut self, id: &str) -> bool {
        match self.elements.remove(id) {
            Some(element) => {
                self.surface.detach(element.handle);
                trace!(id, "element removed");
                true
            }
            None => false,
        }
    }

    // -- re-layout ---------------------------------------------------------

    /// Re-resolve pixel rectangles for every tracked element.
    ///
    /// Per-element failures (a coordinate string no longer valid at the
    /// current precision) are logged and skipped; the pass never aborts.
    /// Returns the number of elements updated.
    pub fn update_all_elements(&mut self) -> usize {
        self.update_all_elements_at(Instant::now())
    }

    /// As [`update_all_elements`](Self::update_all_elements), at an
    /// explicit instant.
    pub fn update_all_elements_at(&mut self, now: Instant) -> usize {
        let bounds = match self.calc.container_bounds_at(&self.surface, &self.config, now) {
            Ok(bounds) => bounds,
            Err(err) => {
                warn!(error = %err, "re-layout skipped: container unmeasurable");
                return 0;
            }
        };
        let dims = self.config.dims();

        let mut ids: Vec<String> = self.elements.keys().cloned().collect();
        ids.sort();

        let mut updated = 0;
        for id in ids {
            let Some(element) = self.elements.get(&id) else {
                continue;
            };
            let range = match parse_coordinates(&element.coords, dims) {
                Ok(range) => range,
                Err(err) => {
                    warn!(id = %id, error = %err, "element skipped during re-layout");
                    continue;
                }
            };
            let rect = calc::range_to_pixels(&range, &bounds, dims);
            let (handle, styles) = match self.elements.get_mut(&id) {
                Some(element) => {
                    element.range = range;
                    (element.handle, element.styles.clone())
                }
                None => continue,
            };
            self.apply_placement(handle, rect, &styles);
            updated += 1;
        }
        debug!(updated, "re-layout pass complete");
        updated
    }

    /// Change precision and re-lay-out everything.
    ///
    /// Out-of-range levels are rejected with no state change; the engine's
    /// documented default at the widget boundary is to log the warning and
    /// carry on, which [`set_precision_soft`](Self::set_precision_soft)
    /// implements.
    pub fn set_precision(&mut self, level: u8) -> Result<(), ConfigError> {
        self.config.set_precision(level)?;
        // Same validation just passed.
        let _ = self.units.set_precision(level);
        self.calc.invalidate();
        self.converter.clear();
        self.update_all_elements();
        self.emit_layout_changed(Instant::now());
        Ok(())
    }

    /// Fail-soft precision change: warns and returns `false` when rejected.
    pub fn set_precision_soft(&mut self, level: u8) -> bool {
        match self.set_precision(level) {
            Ok(()) => true,
            Err(err) => {
                warn!(level, error = %err, "precision change rejected");
                false
            }
        }
    }

    fn emit_layout_changed(&mut self, now: Instant) {
        let bounds = match self.calc.container_bounds_at(&self.surface, &self.config, now) {
            Ok(bounds) => bounds,
            Err(err) => {
                warn!(error = %err, "layout-changed notification skipped");
                return;
            }
        };
        let event = LayoutChanged {
            bounds,
            breakpoint: self.breakpoint(),
        };
        self.listeners.emit(&event);
    }

    // -- resize pipeline ---------------------------------------------------

    /// Record a host resize event; the trailing throttle paces the actual
    /// re-layout.
    pub fn notify_resize(&mut self) {
        self.notify_resize_at(Instant::now());
    }

    /// As [`notify_resize`](Self::notify_resize), at an explicit instant.
    pub fn notify_resize_at(&mut self, now: Instant) {
        self.throttle.record(now);
    }

    /// Drain the resize throttle: if the trailing deadline has passed,
    /// re-measure, refresh caches, broadcast layout-changed, and re-lay-out
    /// every element. Returns `true` when a pass ran.
    pub fn pump(&mut self) -> bool {
        self.pump_at(Instant::now())
    }

    /// As [`pump`](Self::pump), at an explicit instant.
    pub fn pump_at(&mut self, now: Instant) -> bool {
        let Some(coalesced) = self.throttle.fire_due(now) else {
            return false;
        };
        debug!(coalesced, "resize throttle fired");

        self.units.set_viewport(self.surface.viewport());
        self.converter.clear();
        match self.calc.update_container_bounds(&self.surface, now) {
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "resize re-measure failed");
                return true;
            }
        }
        self.emit_layout_changed(now);
        self.update_all_elements_at(now);
        true
    }

    /// Subscribe to layout-changed notifications.
    pub fn subscribe_layout_changed<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&LayoutChanged) + 'static,
    {
        self.listeners.subscribe(callback)
    }

    /// Drop a layout-changed subscription.
    pub fn unsubscribe_layout_changed(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // -- queries -----------------------------------------------------------

    /// Whether a coordinate string parses and fits the current grid.
    #[must_use]
    pub fn is_valid_coordinate(&self, coords: &str) -> bool {
        parse_coordinates(coords, self.config.dims()).is_ok()
    }

    /// Resolve a coordinate string to pixels.
    pub fn coordinates_to_pixels(&mut self, coords: &str) -> Result<PixelRect, GridError> {
        let range = parse_coordinates(coords, self.config.dims())?;
        let rect = self
            .calc
            .coords_to_pixels_at(&range, &self.surface, &self.config, Instant::now())?;
        Ok(rect)
    }

    /// Map a container-relative pixel point to its grid cell.
    ///
    /// Total: clamped into the grid. An unmeasurable container falls back
    /// to the origin cell with a warning.
    pub fn pixels_to_coordinates(&mut self, x: f64, y: f64) -> Coordinate {
        match self
            .calc
            .pixels_to_coords_at(x, y, &self.surface, &self.config, Instant::now())
        {
            Ok(coord) => coord,
            Err(err) => {
                warn!(error = %err, "inverse mapping fell back to origin");
                Coordinate::new(1, 1)
            }
        }
    }

    /// Pick a font size for text that fills one cell row, using the current
    /// cell height and breakpoint. Falls back to the configured minimum
    /// when the container is unmeasurable.
    pub fn optimal_font_size(&mut self, text: &str) -> f64 {
        let (min_px, max_px) = self.config.font_bounds();
        let bounds = match self
            .calc
            .container_bounds_at(&self.surface, &self.config, Instant::now())
        {
            Ok(bounds) => bounds,
            Err(err) => {
                warn!(error = %err, "font sizing fell back to minimum");
                return min_px;
            }
        };
        let cell_height = bounds.height / f64::from(self.config.dims().rows.max(1));
        let scale = self.config.font_scaling(self.breakpoint());
        calc::optimal_font_size(text, cell_height, scale, min_px, max_px)
    }

    /// The derived style-variable catalogue at the current precision and
    /// viewport.
    pub fn style_variables(&mut self) -> StyleMap {
        self.units.style_variables()
    }

    /// Snapshot of the engine state. Mutating the returned value does not
    /// affect the engine.
    pub fn grid_info(&mut self) -> GridInfo {
        let bounds = self
            .calc
            .container_bounds_at(&self.surface, &self.config, Instant::now())
            .unwrap_or_default();
        let dims = self.config.dims();
        GridInfo {
            precision: self.config.precision(),
            columns: dims.columns,
            rows: dims.rows,
            breakpoint: self.breakpoint(),
            bounds,
            element_count: self.elements.len(),
        }
    }

    /// A tracked element by id.
    #[must_use]
    pub fn element(&self, id: &str) -> Option<&TrackedElement> {
        self.elements.get(id)
    }

    /// Whether an element id is registered.
    #[must_use]
    pub fn contains_element(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    /// Registered element ids, sorted.
    #[must_use]
    pub fn element_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.elements.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of tracked elements.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Show or hide a tracked element. `false` for unknown ids.
    pub fn set_element_visible(&mut self, id: &str, visible: bool) -> bool {
        match self.elements.get(id) {
            Some(element) => {
                self.surface.set_visible(element.handle, visible);
                true
            }
            None => false,
        }
    }
}

impl<S: RenderSurface> fmt::Debug for GridSystem<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridSystem")
            .field("precision", &self.config.precision())
            .field("elements", &self.elements.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

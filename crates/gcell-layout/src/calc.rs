#![forbid(unsafe_code)]

//! Coordinate ↔ pixel mapping over a time-boxed container-bounds cache.
//!
//! Measuring the layout container is the one operation the engine cannot do
//! without the host, and hosts make it expensive (forced reflow). The cache
//! keeps the last measurement authoritative for a configured validity
//! window; a resize or an explicit re-measurement refreshes it immediately.
//!
//! # Invariants
//!
//! 1. A cache hit never re-measures; a stale or missing entry always does.
//! 2. After any successful re-measurement the cached bounds are
//!    authoritative again, regardless of how stale the previous entry was.
//! 3. With caching disabled every bounds read re-measures (caller-visible
//!    toggle for hosts that can't tolerate stale reads).
//! 4. Pixel mapping rounds edges and sizes to whole pixels; cell dimensions
//!    stay fractional.
//!
//! # Failure Modes
//!
//! - [`CalcError::Unmeasurable`]: the surface could not resolve the root
//!   bounds (detached host). Callers at the operation boundary convert this
//!   into their fail-soft policy.

use std::fmt;

use tracing::{debug, trace};
use web_time::{Duration, Instant};

use gcell_core::coord::{CoordRange, Coordinate};
use gcell_core::geometry::{Bounds, GridDims, PixelRect};
use gcell_surface::RenderSurface;

use crate::config::{Breakpoint, GridConfig};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A measured container rectangle with its measurement time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerBounds {
    pub bounds: Bounds,
    pub measured_at: Instant,
}

impl ContainerBounds {
    /// Whether the measurement is still within its validity window at `now`.
    #[must_use]
    pub fn is_valid(&self, timeout: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.measured_at) < timeout
    }
}

/// Broadcast payload for a completed re-layout trigger: the freshly
/// measured bounds and the breakpoint they classify into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutChanged {
    pub bounds: Bounds,
    pub breakpoint: Breakpoint,
}

/// Counters for the bounds cache.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundsCacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl BoundsCacheStats {
    /// Hit rate as a fraction (0.0 when no reads happened).
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Errors from bounds-dependent calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcError {
    /// The render surface could not measure the container.
    Unmeasurable,
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unmeasurable => f.write_str("container bounds could not be measured"),
        }
    }
}

impl std::error::Error for CalcError {}

// ---------------------------------------------------------------------------
// Pure mapping
// ---------------------------------------------------------------------------

/// Map a coordinate range onto pixel space.
///
/// `cell_width = bounds.width / columns`, `cell_height = bounds.height /
/// rows`; position comes from the 1-indexed start coordinate, size from the
/// range extents. Edges and sizes round to whole pixels; the centers derive
/// from the rounded values. Positions are container-relative.
#[must_use]
pub fn range_to_pixels(range: &CoordRange, bounds: &Bounds, dims: GridDims) -> PixelRect {
    let cell_width = bounds.width / f64::from(dims.columns.max(1));
    let cell_height = bounds.height / f64::from(dims.rows.max(1));

    let left = (f64::from(range.start.col - 1) * cell_width).round() as i32;
    let top = (f64::from(range.start.row - 1) * cell_height).round() as i32;
    let width = (f64::from(range.width) * cell_width).round() as i32;
    let height = (f64::from(range.height) * cell_height).round() as i32;

    PixelRect::from_rounded(left, top, width, height, cell_width, cell_height)
}

/// Map a container-relative pixel point back to the grid cell containing it.
///
/// Total: the result is clamped into `[1, rows] × [1, columns]`, so any
/// point — including negative or out-of-container ones — maps to a valid
/// coordinate.
#[must_use]
pub fn point_to_coords(x: f64, y: f64, bounds: &Bounds, dims: GridDims) -> Coordinate {
    let columns = dims.columns.max(1);
    let rows = dims.rows.max(1);
    let cell_width = (bounds.width / f64::from(columns)).max(f64::MIN_POSITIVE);
    let cell_height = (bounds.height / f64::from(rows)).max(f64::MIN_POSITIVE);

    let col = ((x / cell_width).floor() as i64 + 1).clamp(1, i64::from(columns)) as u16;
    let row = ((y / cell_height).floor() as i64 + 1).clamp(1, i64::from(rows)) as u16;
    Coordinate::new(row, col)
}

/// Pick a font size for text inside one cell row.
///
/// Base size is 60% of the cell height, scaled by the breakpoint factor and
/// de-escalated for longer text (≤10 chars full size, ≤20 chars 0.85,
/// longer 0.7), then clamped to the configured bounds.
#[must_use]
pub fn optimal_font_size(text: &str, cell_height: f64, scale: f64, min_px: f64, max_px: f64) -> f64 {
    let length_factor = match text.chars().count() {
        0..=10 => 1.0,
        11..=20 => 0.85,
        _ => 0.7,
    };
    (cell_height * 0.6 * scale * length_factor).clamp(min_px, max_px)
}

// ---------------------------------------------------------------------------
// GridCalculations
// ---------------------------------------------------------------------------

/// Bounds-cache owner and mapping front end.
#[derive(Debug, Default)]
pub struct GridCalculations {
    cached: Option<ContainerBounds>,
    cache_enabled: bool,
    hits: u64,
    misses: u64,
}

impl GridCalculations {
    /// Create with caching enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cached: None,
            cache_enabled: true,
            hits: 0,
            misses: 0,
        }
    }

    /// Whether the cached measurement is still valid at `now`.
    #[must_use]
    pub fn is_cache_valid(&self, config: &GridConfig, now: Instant) -> bool {
        self.cache_enabled
            && self
                .cached
                .as_ref()
                .is_some_and(|c| c.is_valid(config.cache_timeout(), now))
    }

    /// Toggle the cache. Disabled, every bounds read re-measures.
    pub fn set_cache_enabled(&mut self, enabled: bool) {
        self.cache_enabled = enabled;
        if !enabled {
            self.cached = None;
        }
    }

    /// Whether caching is enabled.
    #[must_use]
    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    /// Drop the cached measurement so the next read re-measures.
    pub fn invalidate(&mut self) {
        if self.cached.take().is_some() {
            debug!("container bounds cache invalidated");
        }
    }

    /// Cache counters.
    #[must_use]
    pub fn stats(&self) -> BoundsCacheStats {
        BoundsCacheStats {
            hits: self.hits,
            misses: self.misses,
        }
    }

    /// Container bounds, measured through the cache.
    pub fn container_bounds(
        &mut self,
        surface: &dyn RenderSurface,
        config: &GridConfig,
    ) -> Result<Bounds, CalcError> {
        self.container_bounds_at(surface, config, Instant::now())
    }

    /// Container bounds at an explicit instant (deterministic core).
    pub fn container_bounds_at(
        &mut self,
        surface: &dyn RenderSurface,
        config: &GridConfig,
        now: Instant,
    ) -> Result<Bounds, CalcError> {
        if self.is_cache_valid(config, now) {
            self.hits += 1;
            // Checked valid above.
            return Ok(self.cached.as_ref().map(|c| c.bounds).unwrap_or_default());
        }
        self.misses += 1;
        self.remeasure(surface, now)
    }

    /// Force a re-measurement, bypassing the validity window.
    pub fn update_container_bounds(
        &mut self,
        surface: &dyn RenderSurface,
        now: Instant,
    ) -> Result<Bounds, CalcError> {
        self.remeasure(surface, now)
    }

    fn remeasure(&mut self, surface: &dyn RenderSurface, now: Instant) -> Result<Bounds, CalcError> {
        let bounds = surface
            .measure(surface.root())
            .ok_or(CalcError::Unmeasurable)?;
        trace!(
            width = bounds.width,
            height = bounds.height,
            "container re-measured"
        );
        self.cached = Some(ContainerBounds {
            bounds,
            measured_at: now,
        });
        Ok(bounds)
    }

    /// Resolve a coordinate range to pixels using (possibly cached) bounds.
    pub fn coords_to_pixels(
        &mut self,
        range: &CoordRange,
        surface: &dyn RenderSurface,
        config: &GridConfig,
    ) -> Result<PixelRect, CalcError> {
        self.coords_to_pixels_at(range, surface, config, Instant::now())
    }

    /// As [`coords_to_pixels`](Self::coords_to_pixels), at an explicit instant.
    pub fn coords_to_pixels_at(
        &mut self,
        range: &CoordRange,
        surface: &dyn RenderSurface,
        config: &GridConfig,
        now: Instant,
    ) -> Result<PixelRect, CalcError> {
        let bounds = self.container_bounds_at(surface, config, now)?;
        Ok(range_to_pixels(range, &bounds, config.dims()))
    }

    /// Inverse mapping from a container-relative point, clamped to the grid.
    pub fn pixels_to_coords_at(
        &mut self,
        x: f64,
        y: f64,
        surface: &dyn RenderSurface,
        config: &GridConfig,
        now: Instant,
    ) -> Result<Coordinate, CalcError> {
        let bounds = self.container_bounds_at(surface, config, now)?;
        Ok(point_to_coords(x, y, &bounds, config.dims()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

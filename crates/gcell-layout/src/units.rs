#![forbid(unsafe_code)]

//! The standalone gc-unit converter and derived style variables.
//!
//! [`GcUnits`] keeps a simpler grid model than the main calculations path:
//! it is anchored at a fixed reference precision, so 1 gc always equals one
//! cell of the reference grid no matter what precision the engine currently
//! runs at. Global derived style variables (font tiers, spacing tiers, icon
//! and button sizes) are computed from it so presentation code scales with
//! the grid without knowing about precision at all.
//!
//! # Invariants
//!
//! 1. `scale_factor == REFERENCE_PRECISION / precision`, so a gc magnitude
//!    is precision-independent.
//! 2. Conversion results are cached by (value, axis, viewport size); any
//!    precision or viewport change clears the cache.

use rustc_hash::FxHashMap;
use tracing::debug;

use gcell_core::geometry::{Axis, Viewport};
use gcell_surface::StyleMap;

use crate::config::{AspectRatio, ConfigError};

/// The precision whose cells define 1 gc.
pub const REFERENCE_PRECISION: u8 = 10;

/// CSS viewport-relative units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewportUnit {
    Vw,
    Vh,
    Vmin,
    Vmax,
}

/// Cache key for pixel conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GcKey {
    value_bits: u64,
    axis: Axis,
    viewport_w_bits: u64,
    viewport_h_bits: u64,
}

/// Reference-precision gc converter.
#[derive(Debug)]
pub struct GcUnits {
    precision: u8,
    viewport: Viewport,
    aspect: AspectRatio,
    cache: FxHashMap<GcKey, f64>,
    hits: u64,
    misses: u64,
}

impl GcUnits {
    /// Create a converter for the current precision and viewport.
    pub fn new(precision: u8, viewport: Viewport) -> Result<Self, ConfigError> {
        if !(1..=10).contains(&precision) {
            return Err(ConfigError::PrecisionOutOfRange { level: precision });
        }
        Ok(Self {
            precision,
            viewport,
            aspect: AspectRatio::DEFAULT,
            cache: FxHashMap::default(),
            hits: 0,
            misses: 0,
        })
    }

    /// Current precision level.
    #[must_use]
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// `REFERENCE_PRECISION / precision`.
    #[must_use]
    pub fn scale_factor(&self) -> f64 {
        f64::from(REFERENCE_PRECISION) / f64::from(self.precision)
    }

    /// Grid dimension along an axis at the current precision.
    #[must_use]
    pub fn grid_dim(&self, axis: Axis) -> f64 {
        let cells = match axis {
            Axis::Horizontal => self.aspect.width,
            Axis::Vertical => self.aspect.height,
        };
        f64::from(cells) * f64::from(self.precision)
    }

    /// Change precision, clearing the conversion cache.
    pub fn set_precision(&mut self, level: u8) -> Result<(), ConfigError> {
        if !(1..=10).contains(&level) {
            return Err(ConfigError::PrecisionOutOfRange { level });
        }
        if level != self.precision {
            self.precision = level;
            self.cache.clear();
            debug!(level, "gc unit precision changed");
        }
        Ok(())
    }

    /// Change the viewport, clearing the conversion cache.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.cache.clear();
        }
    }

    /// Current viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Convert gc to pixels along an axis.
    ///
    /// `value × scale_factor × (viewport_dim / grid_dim)` — one gc is one
    /// cell of the reference grid projected onto the current viewport.
    pub fn gc_to_pixels(&mut self, value: f64, axis: Axis) -> f64 {
        let key = GcKey {
            value_bits: value.to_bits(),
            axis,
            viewport_w_bits: self.viewport.width.to_bits(),
            viewport_h_bits: self.viewport.height.to_bits(),
        };
        if let Some(&cached) = self.cache.get(&key) {
            self.hits += 1;
            return cached;
        }
        self.misses += 1;
        let pixels =
            value * self.scale_factor() * (self.viewport.along(axis) / self.grid_dim(axis));
        self.cache.insert(key, pixels);
        pixels
    }

    /// Convert gc to a percentage of the viewport dimension on an axis.
    #[must_use]
    pub fn gc_to_percent(&self, value: f64, axis: Axis) -> f64 {
        value * self.scale_factor() * 100.0 / self.grid_dim(axis)
    }

    /// Convert gc to rem (root font size 16px).
    pub fn gc_to_rem(&mut self, value: f64, axis: Axis) -> f64 {
        self.gc_to_pixels(value, axis) / 16.0
    }

    /// Convert gc to em against a context font size.
    ///
    /// A non-positive context falls back to the 16px root size.
    pub fn gc_to_em(&mut self, value: f64, axis: Axis, context_font_px: f64) -> f64 {
        let base = if context_font_px > 0.0 {
            context_font_px
        } else {
            16.0
        };
        self.gc_to_pixels(value, axis) / base
    }

    /// Convert gc to a viewport-relative magnitude (vw/vh/vmin/vmax).
    #[must_use]
    pub fn gc_to_viewport(&self, value: f64, unit: ViewportUnit) -> f64 {
        let axis = match unit {
            ViewportUnit::Vw => Axis::Horizontal,
            ViewportUnit::Vh => Axis::Vertical,
            ViewportUnit::Vmin => self.viewport.min_axis(),
            ViewportUnit::Vmax => self.viewport.max_axis(),
        };
        self.gc_to_percent(value, axis)
    }

    /// Cache counters `(hits, misses, entries)`.
    #[must_use]
    pub fn stats(&self) -> (u64, u64, usize) {
        (self.hits, self.misses, self.cache.len())
    }

    /// The derived style-variable catalogue.
    ///
    /// A fixed set of semantic sizes recomputed from gc values; callers
    /// re-run this whenever precision or the viewport changes (both clear
    /// the cache, so the recomputation is fresh).
    pub fn style_variables(&mut self) -> StyleMap {
        const FONT_TIERS: [(&str, f64); 6] = [
            ("--gc-font-xs", 0.8),
            ("--gc-font-sm", 1.0),
            ("--gc-font-md", 1.25),
            ("--gc-font-lg", 1.5),
            ("--gc-font-xl", 2.0),
            ("--gc-font-xxl", 2.5),
        ];
        const SPACE_TIERS: [(&str, f64); 5] = [
            ("--gc-space-xs", 0.25),
            ("--gc-space-sm", 0.5),
            ("--gc-space-md", 1.0),
            ("--gc-space-lg", 1.5),
            ("--gc-space-xl", 2.0),
        ];
        const ICON_TIERS: [(&str, f64); 3] = [
            ("--gc-icon-sm", 1.0),
            ("--gc-icon-md", 1.5),
            ("--gc-icon-lg", 2.0),
        ];

        let mut vars = StyleMap::new();
        for (name, gc) in FONT_TIERS {
            let px = self.gc_to_pixels(gc, Axis::Vertical);
            vars.insert(name.to_string(), format_px(px));
        }
        for (name, gc) in SPACE_TIERS {
            let px = self.gc_to_pixels(gc, Axis::Horizontal);
            vars.insert(name.to_string(), format_px(px));
        }
        let icon_axis = self.viewport.min_axis();
        for (name, gc) in ICON_TIERS {
            let px = self.gc_to_pixels(gc, icon_axis);
            vars.insert(name.to_string(), format_px(px));
        }
        let pad_x = self.gc_to_pixels(0.75, Axis::Horizontal);
        let pad_y = self.gc_to_pixels(0.4, Axis::Vertical);
        vars.insert("--gc-button-pad-x".to_string(), format_px(pad_x));
        vars.insert("--gc-button-pad-y".to_string(), format_px(pad_y));
        vars
    }
}

fn format_px(value: f64) -> String {
    format!("{}px", value.round() as i64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn units_p5() -> GcUnits {
        GcUnits::new(5, Viewport::new(1600.0, 900.0)).unwrap()
    }

    #[test]
    fn reference_pixel_conversion() {
        // precision 5 → gridColumns = 80; 1 × (10/5) × (1600/80) = 40.
        let mut units = units_p5();
        assert_eq!(units.gc_to_pixels(1.0, Axis::Horizontal), 40.0);
    }

    #[test]
    fn one_gc_is_one_cell_at_reference_precision() {
        let mut units = GcUnits::new(10, Viewport::new(1600.0, 900.0)).unwrap();
        assert_eq!(units.scale_factor(), 1.0);
        // 1600 / 160 columns = 10px per cell.
        assert_eq!(units.gc_to_pixels(1.0, Axis::Horizontal), 10.0);
        // 900 / 90 rows = 10px per cell.
        assert_eq!(units.gc_to_pixels(1.0, Axis::Vertical), 10.0);
    }

    #[test]
    fn coarser_grids_get_proportionally_larger_gc() {
        // px = value × (10/p) × (viewport / (16p)): halving the precision
        // quadruples the pixel size of 1 gc.
        let viewport = Viewport::new(1600.0, 900.0);
        let mut at_10 = GcUnits::new(10, viewport).unwrap();
        let mut at_5 = GcUnits::new(5, viewport).unwrap();
        assert_eq!(at_10.gc_to_pixels(1.0, Axis::Horizontal), 10.0);
        assert_eq!(at_5.gc_to_pixels(1.0, Axis::Horizontal), 40.0);
    }

    #[test]
    fn invalid_precision_rejected() {
        assert!(GcUnits::new(0, Viewport::new(800.0, 600.0)).is_err());
        assert!(GcUnits::new(11, Viewport::new(800.0, 600.0)).is_err());

        let mut units = units_p5();
        let err = units.set_precision(0).unwrap_err();
        assert_eq!(err, ConfigError::PrecisionOutOfRange { level: 0 });
        assert_eq!(units.precision(), 5);
    }

    #[test]
    fn pixel_conversions_cached_until_invalidated() {
        let mut units = units_p5();
        units.gc_to_pixels(1.0, Axis::Horizontal);
        units.gc_to_pixels(1.0, Axis::Horizontal);
        let (hits, misses, entries) = units.stats();
        assert_eq!((hits, misses, entries), (1, 1, 1));

        units.set_precision(4).unwrap();
        units.gc_to_pixels(1.0, Axis::Horizontal);
        let (_, misses, _) = units.stats();
        assert_eq!(misses, 2);
    }

    #[test]
    fn axis_and_value_key_separately() {
        let mut units = units_p5();
        units.gc_to_pixels(1.0, Axis::Horizontal);
        units.gc_to_pixels(1.0, Axis::Vertical);
        units.gc_to_pixels(2.0, Axis::Horizontal);
        let (hits, misses, entries) = units.stats();
        assert_eq!((hits, misses, entries), (0, 3, 3));
    }

    #[test]
    fn viewport_change_clears_cache() {
        let mut units = units_p5();
        units.gc_to_pixels(1.0, Axis::Horizontal);
        units.set_viewport(Viewport::new(800.0, 450.0));
        assert_eq!(units.gc_to_pixels(1.0, Axis::Horizontal), 20.0);
        let (hits, _, _) = units.stats();
        assert_eq!(hits, 0);
    }

    #[test]
    fn unchanged_viewport_keeps_cache() {
        let mut units = units_p5();
        units.gc_to_pixels(1.0, Axis::Horizontal);
        units.set_viewport(Viewport::new(1600.0, 900.0));
        units.gc_to_pixels(1.0, Axis::Horizontal);
        let (hits, _, _) = units.stats();
        assert_eq!(hits, 1);
    }

    #[test]
    fn percent_conversion() {
        let units = units_p5();
        // 1 × 2 × 100 / 80 = 2.5% of the viewport width.
        assert_eq!(units.gc_to_percent(1.0, Axis::Horizontal), 2.5);
        // 1 × 2 × 100 / 45 ≈ 4.444% of the viewport height.
        assert!((units.gc_to_percent(1.0, Axis::Vertical) - 100.0 / 22.5).abs() < 1e-9);
    }

    #[test]
    fn rem_and_em_conversions() {
        let mut units = units_p5();
        assert_eq!(units.gc_to_rem(1.0, Axis::Horizontal), 2.5); // 40px / 16
        assert_eq!(units.gc_to_em(1.0, Axis::Horizontal, 20.0), 2.0); // 40px / 20
        // Non-positive context falls back to the root size.
        assert_eq!(units.gc_to_em(1.0, Axis::Horizontal, 0.0), 2.5);
    }

    #[test]
    fn viewport_units() {
        let units = units_p5();
        assert_eq!(
            units.gc_to_viewport(1.0, ViewportUnit::Vw),
            units.gc_to_percent(1.0, Axis::Horizontal)
        );
        assert_eq!(
            units.gc_to_viewport(1.0, ViewportUnit::Vh),
            units.gc_to_percent(1.0, Axis::Vertical)
        );
        // 1600×900: vmin follows the height axis, vmax the width axis.
        assert_eq!(
            units.gc_to_viewport(1.0, ViewportUnit::Vmin),
            units.gc_to_percent(1.0, Axis::Vertical)
        );
        assert_eq!(
            units.gc_to_viewport(1.0, ViewportUnit::Vmax),
            units.gc_to_percent(1.0, Axis::Horizontal)
        );
    }

    #[test]
    fn style_variables_catalogue() {
        let mut units = GcUnits::new(10, Viewport::new(1600.0, 900.0)).unwrap();
        let vars = units.style_variables();

        // 10px vertical cells at reference precision.
        assert_eq!(vars.get("--gc-font-sm").unwrap(), "10px");
        assert_eq!(vars.get("--gc-font-xl").unwrap(), "20px");
        // 10px horizontal cells.
        assert_eq!(vars.get("--gc-space-md").unwrap(), "10px");
        assert_eq!(vars.get("--gc-space-xs").unwrap(), "3px"); // 2.5 rounds up
        // Icons follow the min axis (vertical here).
        assert_eq!(vars.get("--gc-icon-lg").unwrap(), "20px");
        assert_eq!(vars.get("--gc-button-pad-x").unwrap(), "8px");
        assert_eq!(vars.get("--gc-button-pad-y").unwrap(), "4px");
        assert_eq!(vars.len(), 16);
    }

    #[test]
    fn style_variables_track_precision_and_viewport() {
        let mut units = GcUnits::new(10, Viewport::new(1600.0, 900.0)).unwrap();
        assert_eq!(units.style_variables().get("--gc-font-sm").unwrap(), "10px");

        units.set_precision(5).unwrap();
        // 1 × (10/5) × (900/45) = 40px.
        assert_eq!(units.style_variables().get("--gc-font-sm").unwrap(), "40px");

        units.set_viewport(Viewport::new(800.0, 450.0));
        assert_eq!(units.style_variables().get("--gc-font-sm").unwrap(), "20px");
    }
}

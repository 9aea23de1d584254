#![forbid(unsafe_code)]

//! Grid configuration: precision, breakpoints, and font scaling.
//!
//! [`GridConfig`] holds the tunable knobs of the virtual grid and the
//! dimensions derived from them. Columns and rows are always recomputed
//! together from `aspect × precision`, so they can never go stale
//! independently.
//!
//! # Invariants
//!
//! 1. `columns == aspect.width × precision` and
//!    `rows == aspect.height × precision` after every mutation.
//! 2. `precision` stays within `[1, 10]`; a rejected mutation leaves the
//!    whole configuration untouched.
//! 3. Breakpoint classification uses half-open intervals: a width equal to
//!    a threshold belongs to the bucket that starts there.

use std::fmt;

use serde::{Deserialize, Serialize};
use web_time::Duration;

use gcell_core::geometry::GridDims;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from configuration mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Precision level outside the supported `[1, 10]` range.
    PrecisionOutOfRange { level: u8 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrecisionOutOfRange { level } => {
                write!(f, "precision level {level} outside supported range [1, 10]")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Breakpoints
// ---------------------------------------------------------------------------

/// Named viewport-width bucket driving the font-scale multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Breakpoint {
    Mobile,
    Tablet,
    Desktop,
    Ultrawide,
}

impl Breakpoint {
    /// All breakpoints, smallest first.
    pub const ALL: [Breakpoint; 4] = [
        Breakpoint::Mobile,
        Breakpoint::Tablet,
        Breakpoint::Desktop,
        Breakpoint::Ultrawide,
    ];

    /// Stable lowercase label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Breakpoint::Mobile => "mobile",
            Breakpoint::Tablet => "tablet",
            Breakpoint::Desktop => "desktop",
            Breakpoint::Ultrawide => "ultrawide",
        }
    }

    /// Ordinal index into per-breakpoint tables.
    #[must_use]
    pub const fn ordinal(self) -> usize {
        match self {
            Breakpoint::Mobile => 0,
            Breakpoint::Tablet => 1,
            Breakpoint::Desktop => 2,
            Breakpoint::Ultrawide => 3,
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Breakpoint thresholds: exclusive upper bounds for the first three
/// buckets, in pixels. Everything at or above `desktop` is ultrawide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoints {
    /// Widths below this are mobile.
    pub mobile: f64,
    /// Widths below this (and at least `mobile`) are tablet.
    pub tablet: f64,
    /// Widths below this (and at least `tablet`) are desktop.
    pub desktop: f64,
}

impl Breakpoints {
    /// Default thresholds: 768 / 1024 / 1440.
    pub const DEFAULT: Self = Self {
        mobile: 768.0,
        tablet: 1024.0,
        desktop: 1440.0,
    };

    /// Create thresholds. Callers keep them in ascending order.
    #[must_use]
    pub const fn new(mobile: f64, tablet: f64, desktop: f64) -> Self {
        Self {
            mobile,
            tablet,
            desktop,
        }
    }

    /// Classify a viewport width into its breakpoint.
    ///
    /// Half-open intervals: width 768 is tablet, 1024 is desktop, 1440 is
    /// ultrawide (with default thresholds).
    #[must_use]
    pub fn classify_width(&self, width: f64) -> Breakpoint {
        if width < self.mobile {
            Breakpoint::Mobile
        } else if width < self.tablet {
            Breakpoint::Tablet
        } else if width < self.desktop {
            Breakpoint::Desktop
        } else {
            Breakpoint::Ultrawide
        }
    }

    /// Check whether a width change crosses a breakpoint boundary.
    ///
    /// Returns `Some((old, new))` on a transition, `None` otherwise.
    #[must_use]
    pub fn detect_transition(&self, old_width: f64, new_width: f64) -> Option<(Breakpoint, Breakpoint)> {
        let old_bp = self.classify_width(old_width);
        let new_bp = self.classify_width(new_width);
        if old_bp != new_bp { Some((old_bp, new_bp)) } else { None }
    }
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ---------------------------------------------------------------------------
// Font scaling
// ---------------------------------------------------------------------------

/// Per-breakpoint font-scale multipliers.
///
/// Each slot is optional; an unset breakpoint falls back to 1.0, preserving
/// the lookup-miss behavior of the scaling table this models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontScaling {
    values: [Option<f64>; 4],
}

impl FontScaling {
    /// Default multipliers: mobile 0.8, tablet 0.9, desktop 1.0,
    /// ultrawide 1.1.
    pub const DEFAULT: Self = Self {
        values: [Some(0.8), Some(0.9), Some(1.0), Some(1.1)],
    };

    /// A table with every slot unset (everything scales at 1.0).
    pub const UNSET: Self = Self { values: [None; 4] };

    /// The multiplier for a breakpoint, 1.0 when unset.
    #[must_use]
    pub fn scale_for(&self, bp: Breakpoint) -> f64 {
        self.values[bp.ordinal()].unwrap_or(1.0)
    }

    /// Set the multiplier for a breakpoint (builder pattern).
    #[must_use]
    pub fn at(mut self, bp: Breakpoint, scale: f64) -> Self {
        self.values[bp.ordinal()] = Some(scale);
        self
    }

    /// Set the multiplier for a breakpoint (mutating).
    pub fn set(&mut self, bp: Breakpoint, scale: f64) {
        self.values[bp.ordinal()] = Some(scale);
    }
}

impl Default for FontScaling {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ---------------------------------------------------------------------------
// Aspect ratio
// ---------------------------------------------------------------------------

/// The virtual grid's aspect ratio in cells per precision step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: u16,
    pub height: u16,
}

impl AspectRatio {
    /// The 16:9 grid the engine is built around.
    pub const DEFAULT: Self = Self {
        width: 16,
        height: 9,
    };
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ---------------------------------------------------------------------------
// GridConfig
// ---------------------------------------------------------------------------

/// The engine's tunable configuration plus derived grid dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    precision: u8,
    aspect: AspectRatio,
    breakpoints: Breakpoints,
    font_scaling: FontScaling,
    min_font_px: f64,
    max_font_px: f64,
    cache_timeout: Duration,
    resize_throttle: Duration,
    // Derived; recomputed together on every mutation.
    columns: u16,
    rows: u16,
}

/// A shallow configuration patch for bulk reconfiguration.
///
/// `None` fields keep their current value. A patch with an invalid
/// precision is rejected as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConfigPatch {
    pub precision: Option<u8>,
    pub aspect: Option<AspectRatio>,
    pub breakpoints: Option<Breakpoints>,
    pub font_scaling: Option<FontScaling>,
    pub min_font_px: Option<f64>,
    pub max_font_px: Option<f64>,
    pub cache_timeout: Option<Duration>,
    pub resize_throttle: Option<Duration>,
}

impl GridConfig {
    /// Default precision: the gc-unit reference grid (160×90 cells).
    pub const DEFAULT_PRECISION: u8 = 10;

    /// Create a configuration at the default precision.
    #[must_use]
    pub fn new() -> Self {
        let mut config = Self {
            precision: Self::DEFAULT_PRECISION,
            aspect: AspectRatio::DEFAULT,
            breakpoints: Breakpoints::DEFAULT,
            font_scaling: FontScaling::DEFAULT,
            min_font_px: 8.0,
            max_font_px: 72.0,
            cache_timeout: Duration::from_millis(100),
            resize_throttle: Duration::from_millis(150),
            columns: 0,
            rows: 0,
        };
        config.derive_dims();
        config
    }

    /// Create a configuration at a specific precision.
    pub fn with_precision(level: u8) -> Result<Self, ConfigError> {
        let mut config = Self::new();
        config.set_precision(level)?;
        Ok(config)
    }

    fn derive_dims(&mut self) {
        self.columns = self.aspect.width * u16::from(self.precision);
        self.rows = self.aspect.height * u16::from(self.precision);
    }

    /// Set the precision level (1–10).
    ///
    /// Out-of-range levels are rejected with no state change; the caller
    /// decides whether to surface or log the error (the system façade logs
    /// a warning and continues).
    pub fn set_precision(&mut self, level: u8) -> Result<(), ConfigError> {
        if !(1..=10).contains(&level) {
            return Err(ConfigError::PrecisionOutOfRange { level });
        }
        self.precision = level;
        self.derive_dims();
        Ok(())
    }

    /// Shallow-merge a patch, then re-derive dimensions.
    pub fn update(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(level) = patch.precision
            && !(1..=10).contains(&level)
        {
            return Err(ConfigError::PrecisionOutOfRange { level });
        }
        if let Some(level) = patch.precision {
            self.precision = level;
        }
        if let Some(aspect) = patch.aspect {
            self.aspect = aspect;
        }
        if let Some(breakpoints) = patch.breakpoints {
            self.breakpoints = breakpoints;
        }
        if let Some(font_scaling) = patch.font_scaling {
            self.font_scaling = font_scaling;
        }
        if let Some(min) = patch.min_font_px {
            self.min_font_px = min;
        }
        if let Some(max) = patch.max_font_px {
            self.max_font_px = max;
        }
        if let Some(timeout) = patch.cache_timeout {
            self.cache_timeout = timeout;
        }
        if let Some(throttle) = patch.resize_throttle {
            self.resize_throttle = throttle;
        }
        self.derive_dims();
        Ok(())
    }

    /// Current precision level.
    #[must_use]
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Derived grid dimensions.
    #[must_use]
    pub fn dims(&self) -> GridDims {
        GridDims::new(self.columns, self.rows)
    }

    /// Classify a viewport width into its breakpoint.
    #[must_use]
    pub fn detect_breakpoint(&self, viewport_width: f64) -> Breakpoint {
        self.breakpoints.classify_width(viewport_width)
    }

    /// The font-scale multiplier for a breakpoint.
    #[must_use]
    pub fn font_scaling(&self, bp: Breakpoint) -> f64 {
        self.font_scaling.scale_for(bp)
    }

    /// Breakpoint thresholds.
    #[must_use]
    pub fn breakpoints(&self) -> Breakpoints {
        self.breakpoints
    }

    /// Font size clamp bounds, `(min, max)` in pixels.
    #[must_use]
    pub fn font_bounds(&self) -> (f64, f64) {
        (self.min_font_px, self.max_font_px)
    }

    /// Validity window of the container-bounds cache.
    #[must_use]
    pub fn cache_timeout(&self) -> Duration {
        self.cache_timeout
    }

    /// Trailing interval of the resize throttle.
    #[must_use]
    pub fn resize_throttle(&self) -> Duration {
        self.resize_throttle
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#![forbid(unsafe_code)]

//! Grid configuration, pixel mapping, and unit conversion.
//!
//! # Role in gridcell
//! `gcell-layout` owns the virtual-grid model: the precision-derived grid
//! dimensions and breakpoint classification ([`config`]), the coordinate →
//! pixel mapping with its time-boxed container-bounds cache ([`calc`]), the
//! gc-unit style conversion with per-property directionality ([`fonts`]),
//! and the standalone reference-precision converter behind the derived
//! style-variable catalogue ([`units`]).
//!
//! # How it fits in the system
//! `gcell-system` drives these pieces: it feeds resize and precision
//! changes in, and pushes the resulting pixel rectangles out through the
//! injected render surface. Everything here is synchronous and
//! deterministic; the only clock inputs are the instants callers pass to
//! the `_at` variants.

pub mod calc;
pub mod config;
pub mod fonts;
pub mod units;

pub use calc::{CalcError, ContainerBounds, GridCalculations, LayoutChanged};
pub use config::{AspectRatio, Breakpoint, Breakpoints, ConfigError, ConfigPatch, FontScaling, GridConfig};
pub use fonts::{ConvertContext, PropertyCategory, StyleConverter};
pub use units::{GcUnits, REFERENCE_PRECISION, ViewportUnit};

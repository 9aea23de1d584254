//! Property-based invariant tests for the pixel mapping.
//!
//! These tests verify that coordinate ↔ pixel conversion correctly
//! implements:
//!
//! 1. Mapped rects stay inside the rounded container for in-bounds ranges.
//! 2. `right/bottom/center` are consistent with the rounded edges.
//! 3. The inverse mapping is total: every point clamps to a valid cell.
//! 4. Cell centers round-trip through the inverse mapping.
//! 5. Breakpoint classification is monotonic in width.

use gcell_core::coord::{CoordRange, Coordinate};
use gcell_core::geometry::{Bounds, GridDims};
use gcell_layout::calc::{point_to_coords, range_to_pixels};
use gcell_layout::config::{Breakpoint, Breakpoints};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn dims() -> impl Strategy<Value = GridDims> {
    (1u8..=10).prop_map(|p| GridDims::new(16 * u16::from(p), 9 * u16::from(p)))
}

fn container() -> impl Strategy<Value = Bounds> {
    (64.0f64..4000.0, 36.0f64..2500.0).prop_map(|(w, h)| Bounds::from_size(w, h))
}

fn range_in(dims: GridDims) -> impl Strategy<Value = CoordRange> {
    (1..=dims.rows, 1..=dims.columns).prop_flat_map(move |(r1, c1)| {
        (Just((r1, c1)), r1..=dims.rows, c1..=dims.columns)
            .prop_map(|((r1, c1), r2, c2)| CoordRange::new(Coordinate::new(r1, c1), Coordinate::new(r2, c2)))
    })
}

proptest! {
    #[test]
    fn mapped_rects_stay_inside_container(
        (d, range) in dims().prop_flat_map(|d| (Just(d), range_in(d))),
        bounds in container(),
    ) {
        let rect = range_to_pixels(&range, &bounds, d);
        prop_assert!(rect.left >= 0);
        prop_assert!(rect.top >= 0);
        prop_assert!(rect.width >= 0);
        prop_assert!(rect.height >= 0);
        // Rounding can overshoot by at most half a pixel per edge.
        prop_assert!(f64::from(rect.right) <= bounds.width + 1.0);
        prop_assert!(f64::from(rect.bottom) <= bounds.height + 1.0);
    }

    #[test]
    fn rect_edges_are_consistent(
        (d, range) in dims().prop_flat_map(|d| (Just(d), range_in(d))),
        bounds in container(),
    ) {
        let rect = range_to_pixels(&range, &bounds, d);
        prop_assert_eq!(rect.right, rect.left + rect.width);
        prop_assert_eq!(rect.bottom, rect.top + rect.height);
        prop_assert!(rect.center_x >= rect.left && rect.center_x <= rect.right);
        prop_assert!(rect.center_y >= rect.top && rect.center_y <= rect.bottom);
    }

    #[test]
    fn inverse_mapping_is_total(
        d in dims(),
        bounds in container(),
        x in -5000.0f64..10_000.0,
        y in -5000.0f64..10_000.0,
    ) {
        let coord = point_to_coords(x, y, &bounds, d);
        prop_assert!(coord.is_valid(d));
    }

    #[test]
    fn cell_centers_round_trip(
        (d, rc) in dims().prop_flat_map(|d| (Just(d), (1..=d.rows, 1..=d.columns))),
        bounds in container(),
    ) {
        let (row, col) = rc;
        let cell_width = bounds.width / f64::from(d.columns);
        let cell_height = bounds.height / f64::from(d.rows);
        let center_x = (f64::from(col) - 0.5) * cell_width;
        let center_y = (f64::from(row) - 0.5) * cell_height;

        let coord = point_to_coords(center_x, center_y, &bounds, d);
        prop_assert_eq!(coord, Coordinate::new(row, col));
    }

    #[test]
    fn breakpoint_classification_is_monotonic(a in 0.0f64..5000.0, b in 0.0f64..5000.0) {
        let bps = Breakpoints::DEFAULT;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let lo_bp = bps.classify_width(lo);
        let hi_bp = bps.classify_width(hi);
        prop_assert!(lo_bp.ordinal() <= hi_bp.ordinal());
    }

    #[test]
    fn every_width_classifies(width in -100.0f64..10_000.0) {
        let bp = Breakpoints::DEFAULT.classify_width(width);
        prop_assert!(Breakpoint::ALL.contains(&bp));
    }
}

//! Property-based invariant tests for the coordinate grammar.
//!
//! These tests verify that the parser correctly implements:
//!
//! 1. No panics on arbitrary input strings.
//! 2. Accepted ranges are always ordered, in bounds, and dimensioned by
//!    `end − start + 1`.
//! 3. Display output round-trips through the parser.
//! 4. Whitespace and marker case never change the parse result.
//! 5. Determinism (same input → same result).

use gcell_core::coord::{CoordError, parse_coordinates};
use gcell_core::geometry::GridDims;
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn dims() -> impl Strategy<Value = GridDims> {
    (1u8..=10).prop_map(|p| GridDims::new(16 * u16::from(p), 9 * u16::from(p)))
}

fn coord_in(dims: GridDims) -> impl Strategy<Value = (u16, u16)> {
    (1..=dims.rows, 1..=dims.columns)
}

proptest! {
    #[test]
    fn parser_never_panics(input in ".{0,40}") {
        let _ = parse_coordinates(&input, GridDims::new(128, 72));
    }

    #[test]
    fn parser_never_panics_on_grammar_shaped_input(
        row in 0u32..100_000,
        col in 0u32..100_000,
    ) {
        let _ = parse_coordinates(&format!("R{row}C{col}"), GridDims::new(128, 72));
    }

    #[test]
    fn accepted_singles_are_in_bounds(d in dims(), rc in (1u16..=720, 1u16..=1280)) {
        let (row, col) = rc;
        let input = format!("R{row}C{col}");
        match parse_coordinates(&input, d) {
            Ok(range) => {
                prop_assert!(range.start.is_valid(d));
                prop_assert_eq!(range.start, range.end);
                prop_assert_eq!(range.width, 1);
                prop_assert_eq!(range.height, 1);
            }
            Err(CoordError::Range { .. }) => {
                prop_assert!(row > d.rows || col > d.columns);
            }
            Err(err) => return Err(TestCaseError::fail(format!("unexpected {err:?}"))),
        }
    }

    #[test]
    fn accepted_ranges_are_ordered_and_dimensioned(d in dims().prop_flat_map(|d| {
        (Just(d), coord_in(d), coord_in(d))
    })) {
        let (d, (r1, c1), (r2, c2)) = d;
        let input = format!("R{r1}C{c1}-R{r2}C{c2}");
        match parse_coordinates(&input, d) {
            Ok(range) => {
                prop_assert!(range.start.row <= range.end.row);
                prop_assert!(range.start.col <= range.end.col);
                prop_assert_eq!(range.width, range.end.col - range.start.col + 1);
                prop_assert_eq!(range.height, range.end.row - range.start.row + 1);
                prop_assert!(range.start.is_valid(d));
                prop_assert!(range.end.is_valid(d));
            }
            Err(CoordError::Parse { .. }) => {
                // Only inverted literals are rejected here.
                prop_assert!(r2 < r1 || c2 < c1);
            }
            Err(err) => return Err(TestCaseError::fail(format!("unexpected {err:?}"))),
        }
    }

    #[test]
    fn display_round_trips(d in dims().prop_flat_map(|d| (Just(d), coord_in(d), coord_in(d)))) {
        let (d, (r1, c1), (r2, c2)) = d;
        let input = format!(
            "R{}C{}-R{}C{}",
            r1.min(r2),
            c1.min(c2),
            r1.max(r2),
            c1.max(c2)
        );
        let range = parse_coordinates(&input, d).expect("normalized range must parse");
        let reparsed = parse_coordinates(&range.to_string(), d).expect("display must parse");
        prop_assert_eq!(range, reparsed);
    }

    #[test]
    fn whitespace_and_case_are_ignored(d in dims().prop_flat_map(|d| (Just(d), coord_in(d)))) {
        let (d, (row, col)) = d;
        let plain = parse_coordinates(&format!("R{row}C{col}"), d);
        let spaced = parse_coordinates(&format!("  r{row} \t C{col} "), d);
        prop_assert_eq!(plain, spaced);
    }

    #[test]
    fn parsing_is_deterministic(input in ".{0,24}", d in dims()) {
        prop_assert_eq!(
            parse_coordinates(&input, d),
            parse_coordinates(&input, d)
        );
    }
}

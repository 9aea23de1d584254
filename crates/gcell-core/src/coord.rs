#![forbid(unsafe_code)]

//! The `R<row>C<col>` coordinate grammar.
//!
//! Grid positions are written as `R5C10`; ranges append a second endpoint,
//! `R1C1-R10C20`. The `R`/`C` markers are case-insensitive and whitespace is
//! ignored anywhere in the string. Rows and columns are 1-indexed and bounded
//! by the current grid dimensions.
//!
//! # Invariants
//!
//! 1. A parsed [`CoordRange`] always satisfies `start.row <= end.row` and
//!    `start.col <= end.col`; inverted literals are rejected at parse time.
//! 2. `width = end.col - start.col + 1` and `height = end.row - start.row + 1`;
//!    a single coordinate is the degenerate range with `width == height == 1`.
//! 3. Each endpoint is validated against the grid dimensions independently,
//!    before the range is constructed.
//!
//! # Failure Modes
//!
//! - [`CoordError::Parse`]: the input does not match the grammar.
//! - [`CoordError::Range`]: a row or column lies outside `[1, rows]` /
//!   `[1, columns]` for the dimensions in effect.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{Axis, GridDims};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A 1-indexed grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub row: u16,
    pub col: u16,
}

impl Coordinate {
    /// Create a coordinate. Values are 1-indexed.
    #[inline]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }

    /// Whether the coordinate lies inside the given grid dimensions.
    #[must_use]
    pub const fn is_valid(&self, dims: GridDims) -> bool {
        self.row >= 1 && self.row <= dims.rows && self.col >= 1 && self.col <= dims.columns
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}C{}", self.row, self.col)
    }
}

/// An inclusive rectangular range of grid cells.
///
/// A single coordinate is the degenerate range with `width == height == 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordRange {
    pub start: Coordinate,
    pub end: Coordinate,
    /// Cells spanned horizontally: `end.col - start.col + 1`.
    pub width: u16,
    /// Cells spanned vertically: `end.row - start.row + 1`.
    pub height: u16,
}

impl CoordRange {
    /// Build a range from ordered endpoints.
    ///
    /// Callers must guarantee `start <= end` on both axes; [`parse_coordinates`]
    /// enforces this for parsed input.
    #[must_use]
    pub const fn new(start: Coordinate, end: Coordinate) -> Self {
        Self {
            start,
            end,
            width: end.col - start.col + 1,
            height: end.row - start.row + 1,
        }
    }

    /// The degenerate range covering a single cell.
    #[must_use]
    pub const fn single(coord: Coordinate) -> Self {
        Self::new(coord, coord)
    }

    /// Cells spanned along the given axis.
    #[inline]
    pub const fn span(&self, axis: Axis) -> u16 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }
}

impl fmt::Display for CoordRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from coordinate parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordError {
    /// The input does not match the `R<row>C<col>[-R<row>C<col>]` grammar.
    Parse { input: String },
    /// A row or column is outside the current grid dimensions.
    Range { axis: Axis, value: u32, max: u16 },
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { input } => write!(f, "malformed coordinate string {input:?}"),
            Self::Range { axis, value, max } => {
                let name = match axis {
                    Axis::Horizontal => "column",
                    Axis::Vertical => "row",
                };
                write!(f, "{name} {value} outside grid bounds [1, {max}]")
            }
        }
    }
}

impl std::error::Error for CoordError {}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a coordinate string against the given grid dimensions.
///
/// Whitespace is stripped before matching and the `R`/`C` markers are
/// case-insensitive, so `" r5 c10 "` parses the same as `"R5C10"`.
pub fn parse_coordinates(input: &str, dims: GridDims) -> Result<CoordRange, CoordError> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = compact.as_bytes();

    let parse_fail = || CoordError::Parse {
        input: input.to_string(),
    };

    let mut pos = 0usize;
    let start = parse_endpoint(bytes, &mut pos).ok_or_else(parse_fail)?;
    let end = if pos < bytes.len() {
        if bytes[pos] != b'-' {
            return Err(parse_fail());
        }
        pos += 1;
        let end = parse_endpoint(bytes, &mut pos).ok_or_else(parse_fail)?;
        if pos != bytes.len() {
            return Err(parse_fail());
        }
        Some(end)
    } else {
        None
    };

    let start = validate(start, dims)?;
    let end = match end {
        Some(raw) => {
            let end = validate(raw, dims)?;
            // An inverted range literal is a grammar-level mistake, not a
            // bounds violation.
            if end.row < start.row || end.col < start.col {
                return Err(parse_fail());
            }
            end
        }
        None => start,
    };

    Ok(CoordRange::new(start, end))
}

/// An endpoint as written, before bounds validation. Values stay wide so an
/// out-of-range literal like `R70000C1` reports its actual value.
#[derive(Clone, Copy)]
struct RawEndpoint {
    row: u32,
    col: u32,
}

fn parse_endpoint(bytes: &[u8], pos: &mut usize) -> Option<RawEndpoint> {
    expect_marker(bytes, pos, b'r')?;
    let row = parse_number(bytes, pos)?;
    expect_marker(bytes, pos, b'c')?;
    let col = parse_number(bytes, pos)?;
    Some(RawEndpoint { row, col })
}

fn expect_marker(bytes: &[u8], pos: &mut usize, marker: u8) -> Option<()> {
    if *pos < bytes.len() && bytes[*pos].to_ascii_lowercase() == marker {
        *pos += 1;
        Some(())
    } else {
        None
    }
}

fn parse_number(bytes: &[u8], pos: &mut usize) -> Option<u32> {
    let begin = *pos;
    let mut value: u32 = 0;
    while *pos < bytes.len() && bytes[*pos].is_ascii_digit() {
        value = value
            .saturating_mul(10)
            .saturating_add(u32::from(bytes[*pos] - b'0'));
        *pos += 1;
    }
    if *pos == begin { None } else { Some(value) }
}

fn validate(raw: RawEndpoint, dims: GridDims) -> Result<Coordinate, CoordError> {
    if raw.row < 1 || raw.row > u32::from(dims.rows) {
        return Err(CoordError::Range {
            axis: Axis::Vertical,
            value: raw.row,
            max: dims.rows,
        });
    }
    if raw.col < 1 || raw.col > u32::from(dims.columns) {
        return Err(CoordError::Range {
            axis: Axis::Horizontal,
            value: raw.col,
            max: dims.columns,
        });
    }
    Ok(Coordinate::new(raw.row as u16, raw.col as u16))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#![forbid(unsafe_code)]

//! Core: geometry, coordinate grammar, and scheduling primitives.
//!
//! # Role in gridcell
//! `gcell-core` is the leaf crate. It owns the pixel-space geometry types,
//! the `R<row>C<col>` coordinate grammar, the listener registry used for
//! layout-changed notifications, and the trailing-edge throttle policy that
//! paces resize handling.
//!
//! # How it fits in the system
//! The layout crate (`gcell-layout`) maps parsed coordinates onto measured
//! container bounds; the system crate (`gcell-system`) drives the throttle
//! and fans layout-changed events out through [`notify::Listeners`]. Nothing
//! in this crate touches a render surface or a clock source other than the
//! instants its callers hand it.

pub mod coord;
pub mod geometry;
pub mod notify;
pub mod throttle;

pub use coord::{CoordError, CoordRange, Coordinate, parse_coordinates};
pub use geometry::{Axis, Bounds, GridDims, PixelRect, Viewport};
pub use notify::{Listeners, SubscriptionId};
pub use throttle::Throttle;

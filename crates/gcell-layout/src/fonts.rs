#![forbid(unsafe_code)]

//! Gc-unit style conversion with per-property directionality.
//!
//! Style maps may tag values with the `gc` unit (`"1.5gc"`). This module
//! resolves them into concrete CSS-like magnitudes: pixel sizes for most
//! properties, a unitless ratio for line height. Width-derived properties
//! anchor to the cell width, height-derived ones to the cell height, and
//! typographic ones additionally carry the breakpoint scale factor.
//!
//! Conversions are memoized by a composite key of (value, property
//! category, cell dimensions) so repeated lookups within one layout pass
//! don't recompute. The owning system clears the cache on every
//! layout-changed notification.

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};

use gcell_surface::StyleMap;

use crate::config::{Breakpoint, GridConfig};

// ---------------------------------------------------------------------------
// Property categories
// ---------------------------------------------------------------------------

/// Conversion category of a style property.
///
/// The category decides both the anchoring axis and the formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyCategory {
    /// Pixel size from cell height, breakpoint-scaled and clamped.
    FontSize,
    /// Unitless ratio; gc value maps to a multiple of the line box.
    LineHeight,
    /// Padding/margin/gap: pixel size from cell width, breakpoint-scaled.
    Spacing,
    /// Pixel size from the smaller cell dimension, breakpoint-scaled.
    BorderRadius,
    /// Geometric width: pixel size from cell width, unscaled.
    Width,
    /// Geometric height: pixel size from cell height, unscaled.
    Height,
}

impl PropertyCategory {
    /// Categorize a CSS-like property name, `None` for properties the
    /// converter leaves untouched.
    #[must_use]
    pub fn from_property(name: &str) -> Option<Self> {
        match name {
            "font-size" => Some(Self::FontSize),
            "line-height" => Some(Self::LineHeight),
            "border-radius" => Some(Self::BorderRadius),
            "gap" | "letter-spacing" => Some(Self::Spacing),
            "width" | "min-width" | "max-width" => Some(Self::Width),
            "height" | "min-height" | "max-height" => Some(Self::Height),
            _ if name.starts_with("padding") || name.starts_with("margin") => Some(Self::Spacing),
            _ => None,
        }
    }

    /// Whether the converted value is a unitless ratio rather than pixels.
    #[must_use]
    pub const fn is_ratio(self) -> bool {
        matches!(self, Self::LineHeight)
    }
}

/// Parse a gc-tagged value (`"1.5gc"`, `"2 gc"`, case-insensitive).
///
/// Returns `None` for values without the gc unit or with a non-finite
/// magnitude; those pass through conversion untouched.
#[must_use]
pub fn parse_gc(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let lower = trimmed.to_ascii_lowercase();
    let magnitude = lower.strip_suffix("gc")?.trim_end();
    let parsed: f64 = magnitude.parse().ok()?;
    parsed.is_finite().then_some(parsed)
}

// ---------------------------------------------------------------------------
// Conversion context
// ---------------------------------------------------------------------------

/// Everything a conversion needs from the current layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertContext {
    pub cell_width: f64,
    pub cell_height: f64,
    /// Breakpoint font-scale factor.
    pub scale: f64,
    pub min_font_px: f64,
    pub max_font_px: f64,
}

impl ConvertContext {
    /// Build a context from the configuration and measured cell dimensions.
    #[must_use]
    pub fn new(config: &GridConfig, bp: Breakpoint, cell_width: f64, cell_height: f64) -> Self {
        let (min_font_px, max_font_px) = config.font_bounds();
        Self {
            cell_width,
            cell_height,
            scale: config.font_scaling(bp),
            min_font_px,
            max_font_px,
        }
    }
}

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

/// Cache key: value and cell dimensions by bit pattern, plus the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ConvertKey {
    value_bits: u64,
    category: PropertyCategory,
    cell_bits: u64,
}

impl ConvertKey {
    fn new(value: f64, category: PropertyCategory, ctx: &ConvertContext) -> Self {
        let mut hasher = FxHasher::default();
        ctx.cell_width.to_bits().hash(&mut hasher);
        ctx.cell_height.to_bits().hash(&mut hasher);
        ctx.scale.to_bits().hash(&mut hasher);
        Self {
            value_bits: value.to_bits(),
            category,
            cell_bits: hasher.finish(),
        }
    }
}

/// Counters for the conversion cache.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConvertCacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Memoizing gc → magnitude converter.
#[derive(Debug, Default)]
pub struct StyleConverter {
    cache: FxHashMap<ConvertKey, f64>,
    hits: u64,
    misses: u64,
}

impl StyleConverter {
    /// Create an empty converter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a gc magnitude for a property category.
    ///
    /// Pixel results for everything except [`PropertyCategory::LineHeight`],
    /// which yields a unitless ratio.
    pub fn convert(&mut self, value: f64, category: PropertyCategory, ctx: &ConvertContext) -> f64 {
        let key = ConvertKey::new(value, category, ctx);
        if let Some(&cached) = self.cache.get(&key) {
            self.hits += 1;
            return cached;
        }
        self.misses += 1;
        let converted = Self::compute(value, category, ctx);
        self.cache.insert(key, converted);
        converted
    }

    fn compute(value: f64, category: PropertyCategory, ctx: &ConvertContext) -> f64 {
        match category {
            PropertyCategory::FontSize => (value * ctx.cell_height * 0.6 * ctx.scale)
                .clamp(ctx.min_font_px, ctx.max_font_px),
            PropertyCategory::LineHeight => (value * 1.2).clamp(1.0, 2.5),
            PropertyCategory::Spacing => value * ctx.cell_width * 0.5 * ctx.scale,
            PropertyCategory::BorderRadius => {
                value * ctx.cell_width.min(ctx.cell_height) * 0.25 * ctx.scale
            }
            PropertyCategory::Width => value * ctx.cell_width,
            PropertyCategory::Height => value * ctx.cell_height,
        }
    }

    /// Convert every gc-tagged value in a style map; other values pass
    /// through untouched. Pixel results render as `"<n>px"` (rounded),
    /// ratios as bare numbers.
    pub fn process_styles(&mut self, styles: &StyleMap, ctx: &ConvertContext) -> StyleMap {
        let mut resolved = StyleMap::new();
        for (property, value) in styles {
            let converted = PropertyCategory::from_property(property)
                .zip(parse_gc(value))
                .map(|(category, gc)| {
                    let magnitude = self.convert(gc, category, ctx);
                    if category.is_ratio() {
                        format!("{magnitude:.2}")
                    } else {
                        format!("{}px", magnitude.round() as i64)
                    }
                });
            resolved.insert(property.clone(), converted.unwrap_or_else(|| value.clone()));
        }
        resolved
    }

    /// Convert one property/value pair, parsing the gc tag.
    ///
    /// `None` when the property has no conversion category or the value is
    /// not gc-tagged — such pairs pass through layout untouched.
    pub fn convert_property(
        &mut self,
        property: &str,
        value: &str,
        ctx: &ConvertContext,
    ) -> Option<f64> {
        let category = PropertyCategory::from_property(property)?;
        let gc = parse_gc(value)?;
        Some(self.convert(gc, category, ctx))
    }

    /// Drop all memoized conversions. Called on layout-changed.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Cache counters.
    #[must_use]
    pub fn stats(&self) -> ConvertCacheStats {
        ConvertCacheStats {
            entries: self.cache.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

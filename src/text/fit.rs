//! Font-size fitting and resolution-independent text sizes.

use crate::text::fonts::FontSpec;

/// Horizontal advance of a single line of text.
pub trait TextMeasure {
    /// Width in pixels of `text` set in `font` at `size_px`.
    fn advance_width(&mut self, text: &str, font: &FontSpec, size_px: f64) -> f64;
}

/// Approximate metrics used when no font face can be resolved.
#[derive(Clone, Copy, Debug, Default)]
pub struct FallbackMetrics;

impl FallbackMetrics {
    pub fn em_advance(font: &FontSpec) -> f64 {
        if font.weight >= 600 { 0.6 } else { 0.55 }
    }
}

impl TextMeasure for FallbackMetrics {
    fn advance_width(&mut self, text: &str, font: &FontSpec, size_px: f64) -> f64 {
        text.chars().count() as f64 * size_px * Self::em_advance(font)
    }
}

/// Padding and size bounds for [`fit`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitOptions {
    pub min_size_px: f64,
    pub max_size_px: f64,
    /// Padding per side as a fraction of the box width.
    pub pad_x: f64,
    /// Padding per side as a fraction of the box height.
    pub pad_y: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            min_size_px: 10.0,
            max_size_px: 220.0,
            pad_x: 0.08,
            pad_y: 0.12,
        }
    }
}

impl FitOptions {
    pub fn with_min_size(mut self, px: f64) -> Self {
        self.min_size_px = px;
        self
    }

    pub fn with_max_size(mut self, px: f64) -> Self {
        self.max_size_px = px;
        self
    }
}

/// Largest size, stepping down one pixel at a time, at which `text` fits the padded box.
///
/// Never exceeds `box_height_px`; returns the minimum size when nothing fits.
pub fn fit(
    measure: &mut dyn TextMeasure,
    text: &str,
    font: &FontSpec,
    box_width_px: f64,
    box_height_px: f64,
    opts: &FitOptions,
) -> f64 {
    let cap = |size: f64| {
        if box_height_px.is_finite() && box_height_px > 0.0 {
            size.min(box_height_px)
        } else {
            size
        }
    };
    if !(box_width_px.is_finite() && box_height_px.is_finite()) {
        return cap(opts.min_size_px);
    }

    let target_w = (box_width_px - 2.0 * box_width_px * opts.pad_x).max(10.0);
    let target_h = (box_height_px - 2.0 * box_height_px * opts.pad_y).max(10.0);

    let mut size = target_h.min(opts.max_size_px);
    while size > opts.min_size_px {
        if measure.advance_width(text, font, size) <= target_w {
            return cap(size);
        }
        size -= 1.0;
    }
    cap(opts.min_size_px)
}

/// Pixel size as percent of the region height. `0.0` for an unusable height.
pub fn to_relative(size_px: f64, region_height_px: f64) -> f64 {
    if !(region_height_px.is_finite() && region_height_px > 0.0 && size_px.is_finite()) {
        return 0.0;
    }
    size_px / region_height_px * 100.0
}

/// Inverse of [`to_relative`].
pub fn to_absolute(percent: f64, region_height_px: f64) -> f64 {
    if !(region_height_px.is_finite() && percent.is_finite()) {
        return 0.0;
    }
    percent / 100.0 * region_height_px
}

#[cfg(test)]
#[path = "../../tests/unit/text/fit.rs"]
mod tests;

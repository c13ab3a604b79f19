// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line heights and baseline positions.

use crate::layout::data::LineHeights;
use crate::shape::RunMetrics;
use crate::{FirstLineOffset, ParagraphStyle, TextLayoutMode};

/// Accumulates the typographic metrics of the clusters of a line.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct MetricsAccumulator {
    ascent: f32,
    descent: f32,
    leading: f32,
    cap_height: f32,
    x_height: f32,
    is_empty: bool,
}

impl MetricsAccumulator {
    pub(crate) fn new() -> Self {
        Self {
            is_empty: true,
            ..Default::default()
        }
    }

    pub(crate) fn add(&mut self, metrics: &RunMetrics, baseline_offset: f32) {
        self.ascent = self.ascent.max(metrics.ascent + baseline_offset);
        self.descent = self.descent.max(metrics.descent - baseline_offset);
        self.leading = self.leading.max(metrics.leading);
        self.cap_height = self.cap_height.max(metrics.cap_height);
        self.x_height = self.x_height.max(metrics.x_height);
        self.is_empty = false;
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.is_empty
    }

    /// Computes the line heights for the given paragraph style and layout mode.
    pub(crate) fn heights(&self, style: &ParagraphStyle, mode: TextLayoutMode) -> LineHeights {
        let a = self.ascent;
        let d = self.descent;
        let g = self.leading;
        let multiple = style.line_height_multiple;
        let (above, below, below_minimal) = match mode {
            TextLayoutMode::Default => {
                let m = (a + d) * multiple + (g * multiple).max(style.line_spacing);
                let height = m
                    .max(style.minimum_line_height)
                    .min(style.maximum_line_height);
                let s = (height - (a + d)) / 2.;
                (a + s, d + s, d + s)
            }
            TextLayoutMode::Alternate => {
                let h = ((a + d) * multiple)
                    .max(style.minimum_line_height)
                    .min(style.maximum_line_height);
                let s = style.line_spacing.max(g);
                (h - d, d + s, d + g)
            }
        };
        LineHeights {
            ascent: a,
            descent: d,
            leading: g,
            cap_height: self.cap_height,
            x_height: self.x_height,
            above,
            below,
            below_minimal,
            extra_above: 0.,
            extra_below: 0.,
        }
    }
}

/// Spacing added above the first and below the last line of a paragraph so that a single line
/// satisfies the minimum baseline distance.
pub(crate) fn minimum_baseline_distance_spacing(heights: &LineHeights, distance: f32) -> f32 {
    ((distance - (heights.above + heights.below)) / 2.).max(0.)
}

/// The previous line for baseline positioning.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PreviousLine {
    pub(crate) baseline: f64,
    /// Height below the baseline including spacing.
    pub(crate) below: f32,
    pub(crate) min_baseline_distance: f32,
    pub(crate) paragraph_spacing_after: f32,
}

/// Computes the baseline of a line.
///
/// `heights.extra_above` must already be set for the first line of a paragraph.
pub(crate) fn baseline(
    previous: Option<&PreviousLine>,
    is_first_in_paragraph: bool,
    heights: &LineHeights,
    style: &ParagraphStyle,
) -> f64 {
    let above = f64::from(heights.above + heights.extra_above);
    let Some(previous) = previous else {
        return first_line_baseline(0., heights, style);
    };
    if !is_first_in_paragraph {
        let natural = previous.baseline + f64::from(previous.below) + above;
        return natural.max(previous.baseline + f64::from(style.minimum_baseline_distance));
    }
    let top = previous.baseline
        + f64::from(previous.below)
        + f64::from(previous.paragraph_spacing_after)
        + f64::from(style.paragraph_spacing_before);
    let baseline = first_line_baseline(top, heights, style);
    if style.first_line_offset.keeps_minimum_baseline_distance() {
        let distance = previous
            .min_baseline_distance
            .max(style.minimum_baseline_distance);
        baseline.max(previous.baseline + f64::from(distance))
    } else {
        baseline
    }
}

fn first_line_baseline(top: f64, heights: &LineHeights, style: &ParagraphStyle) -> f64 {
    let above = f64::from(heights.above + heights.extra_above);
    let below = f64::from(heights.below);
    match style.first_line_offset {
        FirstLineOffset::FromDefault(offset) => top + above + f64::from(offset),
        FirstLineOffset::BaselineFromTop(offset) => top + f64::from(offset),
        FirstLineOffset::LineCenterFromTop(offset) => {
            let above = f64::from(heights.above);
            top + f64::from(offset) - (below - above) / 2.
        }
        FirstLineOffset::CapHeightCenterFromTop(offset) => {
            top + f64::from(offset) + f64::from(heights.cap_height) / 2.
        }
        FirstLineOffset::XHeightCenterFromTop(offset) => {
            top + f64::from(offset) + f64::from(heights.x_height) / 2.
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(ascent: f32, descent: f32, leading: f32) -> MetricsAccumulator {
        let mut accumulator = MetricsAccumulator::new();
        accumulator.add(
            &RunMetrics {
                ascent,
                descent,
                leading,
                cap_height: 7.,
                x_height: 5.,
            },
            0.,
        );
        accumulator
    }

    #[test]
    fn default_mode_distributes_spacing() {
        let style = ParagraphStyle {
            line_spacing: 4.,
            ..Default::default()
        }
        .resolved();
        let heights = metrics(10., 2., 1.).heights(&style, TextLayoutMode::Default);
        assert_eq!(heights.above, 12.);
        assert_eq!(heights.below, 4.);
    }

    #[test]
    fn alternate_mode_adds_spacing_below() {
        let style = ParagraphStyle {
            line_spacing: 3.,
            ..Default::default()
        }
        .resolved();
        let heights = metrics(10., 2., 1.).heights(&style, TextLayoutMode::Alternate);
        assert_eq!(heights.above, 10.);
        assert_eq!(heights.below, 5.);
        assert_eq!(heights.below_minimal, 3.);
    }

    #[test]
    fn line_height_is_clamped() {
        let style = ParagraphStyle {
            minimum_line_height: 20.,
            maximum_line_height: 30.,
            ..Default::default()
        }
        .resolved();
        let heights = metrics(10., 2., 0.).heights(&style, TextLayoutMode::Default);
        assert_eq!(heights.above + heights.below, 20.);
        let style = ParagraphStyle {
            line_height_multiple: 4.,
            maximum_line_height: 30.,
            ..Default::default()
        }
        .resolved();
        let heights = metrics(10., 2., 0.).heights(&style, TextLayoutMode::Default);
        assert_eq!(heights.above + heights.below, 30.);
    }

    #[test]
    fn first_line_offsets() {
        let heights = metrics(10., 2., 0.).heights(
            &ParagraphStyle::default().resolved(),
            TextLayoutMode::Default,
        );
        let style = |offset| ParagraphStyle {
            first_line_offset: offset,
            ..Default::default()
        };
        assert_eq!(baseline(None, true, &heights, &style(FirstLineOffset::FromDefault(3.))), 13.);
        assert_eq!(
            baseline(None, true, &heights, &style(FirstLineOffset::BaselineFromTop(8.))),
            8.
        );
        assert_eq!(
            baseline(None, true, &heights, &style(FirstLineOffset::LineCenterFromTop(6.))),
            10.
        );
        assert_eq!(
            baseline(None, true, &heights, &style(FirstLineOffset::CapHeightCenterFromTop(6.))),
            9.5
        );
        assert_eq!(
            baseline(None, true, &heights, &style(FirstLineOffset::XHeightCenterFromTop(6.))),
            8.5
        );
    }
}

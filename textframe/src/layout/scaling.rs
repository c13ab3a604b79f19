// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shrinking text until it fits.

use peniko::kurbo::Size;

use crate::layout::data::LineData;
use crate::layout::hyphenation::Hyphenator;
use crate::layout::layouter::{self, LayoutInput, LayoutOutput};
use crate::BaselineAdjustment;

/// A layout together with the text scale factor it was made for.
pub(crate) struct ScaledLayout {
    pub(crate) output: LayoutOutput,
    pub(crate) scale: f64,
}

/// Lays out the text at the largest scale factor on the step grid for which it fits.
///
/// The candidates are `1 - k * step` down to the minimum scale factor, which is always a
/// candidate itself. Fitting is assumed to be monotonic in the scale. Returns `None` if
/// cancelled.
pub(crate) fn layout_with_scaling(input: &LayoutInput<'_>, size: Size) -> Option<ScaledLayout> {
    let options = input.options;
    let mut hyphenator = Hyphenator::new(options.hyphenation_location_finder.as_ref());
    let mut layout_at = |scale: f64| {
        log::trace!("Trying text scale factor {scale}");
        layouter::layout(
            input,
            &mut hyphenator,
            (size.width / scale) as f32,
            size.height / scale,
        )
    };
    let unscaled = layout_at(1.)?;
    let min_scale = options.min_text_scale_factor;
    if min_scale >= 1. || unscaled.fits() {
        return Some(ScaledLayout {
            output: unscaled,
            scale: 1.,
        });
    }
    let step = options.text_scale_factor_step_size;
    let steps = ((1. - min_scale) / step).ceil().max(1.) as u32;
    let scale_at = |k: u32| {
        if k >= steps {
            min_scale
        } else {
            (1. - f64::from(k) * step).max(min_scale)
        }
    };

    let smallest = layout_at(min_scale)?;
    let mut best = (steps, smallest);
    if best.1.fits() {
        // Find the smallest k that fits.
        let (mut low, mut high) = (1, steps);
        while low < high {
            let mid = low + (high - low) / 2;
            let output = layout_at(scale_at(mid))?;
            if output.fits() {
                best = (mid, output);
                high = mid;
            } else {
                low = mid + 1;
            }
        }
    }
    let (k, mut output) = best;
    let scale = scale_at(k);
    adjust_baselines(&mut output, &unscaled, scale, options.baseline_adjustment);
    log::debug!("Text scaled by {scale}");
    Some(ScaledLayout { output, scale })
}

/// Moves the lines of a scaled layout so that the reference position of the first line matches
/// the unscaled layout.
fn adjust_baselines(
    output: &mut LayoutOutput,
    unscaled: &LayoutOutput,
    scale: f64,
    adjustment: BaselineAdjustment,
) {
    if adjustment == BaselineAdjustment::None {
        return;
    }
    let (Some(reference), Some(scaled)) = (unscaled.lines.first(), output.lines.first()) else {
        return;
    };
    let offset = (reference_y(reference, adjustment) - scale * reference_y(scaled, adjustment))
        / scale;
    for line in &mut output.lines {
        line.baseline += offset;
    }
}

fn reference_y(line: &LineData, adjustment: BaselineAdjustment) -> f64 {
    let heights = &line.heights;
    let offset = match adjustment {
        BaselineAdjustment::None | BaselineAdjustment::AlignFirstBaseline => 0.,
        BaselineAdjustment::AlignFirstLineCenter => (heights.ascent - heights.descent) / 2.,
        BaselineAdjustment::AlignFirstLineCapHeightCenter => heights.cap_height / 2.,
        BaselineAdjustment::AlignFirstLineXHeightCenter => heights.x_height / 2.,
    };
    line.baseline - f64::from(offset)
}

// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Misc helpers.

use core::ops::Range;

/// Replaces NaN and negative values with zero.
pub(crate) fn non_negative(x: f32) -> f32 {
    if x > 0. { x } else { 0. }
}

pub(crate) fn non_negative_f64(x: f64) -> f64 {
    if x > 0. { x } else { 0. }
}

pub(crate) fn clamp_range(range: Range<usize>, len: usize) -> Range<usize> {
    let end = range.end.min(len);
    range.start.min(end)..end
}

pub(crate) fn to_u32(x: usize) -> u32 {
    u32::try_from(x).unwrap_or(u32::MAX)
}

pub(crate) fn u32_range(range: Range<usize>) -> Range<u32> {
    to_u32(range.start)..to_u32(range.end)
}

pub(crate) fn usize_range(range: &Range<u32>) -> Range<usize> {
    range.start as usize..range.end as usize
}

/// The pixel density used to snap geometry to the device pixel grid.
///
/// A display scale is always finite and greater than zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayScale {
    value: f64,
    inverse: f64,
}

impl DisplayScale {
    /// Returns `None` unless `value` is finite and positive.
    pub fn new(value: f64) -> Option<Self> {
        if value > 0. && value.is_finite() {
            let inverse = 1. / value;
            if inverse > 0. && inverse.is_finite() {
                return Some(Self { value, inverse });
            }
        }
        None
    }

    /// A scale of one pixel per point.
    pub const ONE: Self = Self {
        value: 1.,
        inverse: 1.,
    };

    /// The number of pixels per point.
    pub fn value(self) -> f64 {
        self.value
    }

    /// The size of a pixel in points.
    pub fn inverse(self) -> f64 {
        self.inverse
    }

    /// Rounds to the nearest multiple of `1/scale`.
    pub fn round(self, x: f64) -> f64 {
        (x * self.value).round_ties_even() * self.inverse
    }

    /// Rounds down to a multiple of `1/scale`, unless the value lies within a few ulps of the next
    /// multiple, in which case that multiple is returned.
    pub fn floor(self, x: f64) -> f64 {
        let scaled = x * self.value;
        let rounded = scaled.round_ties_even() * self.inverse;
        if (rounded - x).abs() <= x.abs() * MAX_REL_DIFF_FOR_ROUNDING {
            rounded
        } else {
            scaled.floor() * self.inverse
        }
    }

    /// Rounds up to a multiple of `1/scale`, unless the value lies within a few ulps of the
    /// previous multiple, in which case that multiple is returned.
    pub fn ceil(self, x: f64) -> f64 {
        let scaled = x * self.value;
        let rounded = scaled.round_ties_even() * self.inverse;
        if (rounded - x).abs() <= x.abs() * MAX_REL_DIFF_FOR_ROUNDING {
            rounded
        } else {
            scaled.ceil() * self.inverse
        }
    }
}

// Sums like `6/3 + 7/3` must not be ceiled to `14/3` at scale 3.
const MAX_REL_DIFF_FOR_ROUNDING: f64 = 128. * f64::EPSILON;

/// Ceils `x` to the display scale if there is one.
pub(crate) fn ceil_to_scale(x: f64, scale: Option<DisplayScale>) -> f64 {
    match scale {
        Some(scale) => scale.ceil(x),
        None => x,
    }
}

#[cfg(test)]
mod tests {
    use super::DisplayScale;

    #[test]
    fn ceil_is_tolerant_to_representation_error() {
        let scale = DisplayScale::new(3.).unwrap();
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        assert!(close(scale.ceil(6. / 3. + 7. / 3.), 13. / 3.));
        assert!(close(scale.floor(3. / 3. + 4. / 3.), 7. / 3.));
        assert!(close(scale.ceil(0.1), 1. / 3.));
        assert!(close(scale.floor(0.5), 1. / 3.));
        assert!(close(scale.ceil(1.), 1.));
    }

    #[test]
    fn invalid_scales_are_rejected() {
        assert!(DisplayScale::new(0.).is_none());
        assert!(DisplayScale::new(-2.).is_none());
        assert!(DisplayScale::new(f64::NAN).is_none());
        assert!(DisplayScale::new(f64::INFINITY).is_none());
        assert_eq!(DisplayScale::new(2.).map(DisplayScale::inverse), Some(0.5));
    }
}

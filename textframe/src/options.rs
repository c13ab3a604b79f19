// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout options.

use core::fmt;
use core::ops::Range;
use std::sync::Arc;

use crate::StyledString;

/// Selects the line height model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextLayoutMode {
    /// Spacing is distributed evenly above and below each line:
    ///
    /// ```text
    /// m = (a + d)*lineHeightMultiple + max(g*lineHeightMultiple, lineSpacing)
    /// height = min(maximumLineHeight, max(minimumLineHeight, m))
    /// s = (height - (a + d))/2
    /// heightAboveBaseline = a + s
    /// heightBelowBaseline = d + s
    /// ```
    #[default]
    Default,
    /// Spacing is added below each line, in the manner of common desktop text systems:
    ///
    /// ```text
    /// h = min(maximumLineHeight, max((a + d)*lineHeightMultiple, minimumLineHeight))
    /// s = max(lineSpacing, g)
    /// heightAboveBaseline = h - d
    /// heightBelowBaseline = d + s
    /// ```
    ///
    /// The minimal spacing below the last line is the leading `g`.
    Alternate,
}

/// Alignment of paragraphs with natural or justified alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DefaultTextAlignment {
    /// Align to the left edge.
    #[default]
    Left,
    /// Align to the right edge.
    Right,
    /// Left for left-to-right paragraphs, right otherwise.
    Start,
    /// Right for left-to-right paragraphs, left otherwise.
    End,
}

/// Where the truncation token replaces text on the last line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LastLineTruncationMode {
    /// Keep the start of the line, append the token.
    #[default]
    End,
    /// Keep the start and the end of the line, replace the middle.
    Middle,
    /// Keep the end of the line, prepend the token.
    Start,
    /// Drop the remaining lines without a token.
    Clip,
}

/// How scaled text is positioned relative to the unscaled first line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BaselineAdjustment {
    /// Scaled text starts at the top of the frame.
    #[default]
    None,
    /// The first baseline stays where it would be without scaling.
    AlignFirstBaseline,
    /// The center of the first line box stays in place.
    AlignFirstLineCenter,
    /// The cap height center of the first line stays in place.
    AlignFirstLineCapHeightCenter,
    /// The x height center of the first line stays in place.
    AlignFirstLineXHeightCenter,
}

macro_rules! impl_from_raw {
    ($ty:ident { $($value:literal => $variant:ident),* $(,)? }) => {
        impl $ty {
            /// Converts a raw value. Unknown values map to the default variant.
            pub fn from_raw(raw: u8) -> Self {
                match raw {
                    $($value => Self::$variant,)*
                    _ => {
                        log::debug!("unknown {} value {raw}", stringify!($ty));
                        Self::default()
                    }
                }
            }
        }
    };
}

impl_from_raw!(TextLayoutMode { 0 => Default, 1 => Alternate });
impl_from_raw!(DefaultTextAlignment { 0 => Left, 1 => Right, 2 => Start, 3 => End });
impl_from_raw!(LastLineTruncationMode { 0 => End, 1 => Middle, 2 => Start, 3 => Clip });
impl_from_raw!(BaselineAdjustment {
    0 => None,
    1 => AlignFirstBaseline,
    2 => AlignFirstLineCenter,
    3 => AlignFirstLineCapHeightCenter,
    4 => AlignFirstLineXHeightCenter,
});

/// A hyphenation opportunity returned by a [`HyphenationLocationFinder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HyphenationLocation {
    /// The string index before which the line is broken.
    pub index: usize,
    /// The hyphen character to display at the end of the line.
    pub hyphen: char,
    /// Reserved, must be zero.
    pub options: u32,
}

/// Finds the last hyphenation opportunity in a string range.
///
/// Called with the full string and the search range. The returned index must lie strictly inside
/// the range; other results are ignored. The finder may be called again with a shorter range if
/// the returned location does not fit. It must be deterministic and thread-safe.
pub type HyphenationLocationFinder =
    Arc<dyn Fn(&StyledString, Range<usize>) -> Option<HyphenationLocation> + Send + Sync>;

/// Adjusts the range of text removed by truncation.
///
/// Called with the full string, the full range of the truncated text and the proposed excised
/// range. The result is clamped to the full range and must be deterministic.
pub type TruncationRangeAdjuster =
    Arc<dyn Fn(&StyledString, Range<usize>, Range<usize>) -> Range<usize> + Send + Sync>;

/// The default step size of the text scale factor search.
pub const DEFAULT_TEXT_SCALE_FACTOR_STEP_SIZE: f64 = 1. / 128.;

/// Immutable layout options.
///
/// Use [`TextFrameOptionsBuilder`] to create options other than the default.
#[derive(Clone)]
pub struct TextFrameOptions {
    pub(crate) layout_mode: TextLayoutMode,
    pub(crate) default_alignment: DefaultTextAlignment,
    pub(crate) max_line_count: u32,
    pub(crate) last_line_truncation_mode: LastLineTruncationMode,
    pub(crate) truncation_token: Option<Arc<StyledString>>,
    pub(crate) truncation_range_adjuster: Option<TruncationRangeAdjuster>,
    pub(crate) min_text_scale_factor: f64,
    pub(crate) text_scale_factor_step_size: f64,
    pub(crate) baseline_adjustment: BaselineAdjustment,
    pub(crate) hyphenation_location_finder: Option<HyphenationLocationFinder>,
}

impl Default for TextFrameOptions {
    fn default() -> Self {
        Self {
            layout_mode: TextLayoutMode::Default,
            default_alignment: DefaultTextAlignment::Left,
            max_line_count: 0,
            last_line_truncation_mode: LastLineTruncationMode::End,
            truncation_token: None,
            truncation_range_adjuster: None,
            min_text_scale_factor: 1.,
            text_scale_factor_step_size: DEFAULT_TEXT_SCALE_FACTOR_STEP_SIZE,
            baseline_adjustment: BaselineAdjustment::None,
            hyphenation_location_finder: None,
        }
    }
}

impl fmt::Debug for TextFrameOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextFrameOptions")
            .field("layout_mode", &self.layout_mode)
            .field("default_alignment", &self.default_alignment)
            .field("max_line_count", &self.max_line_count)
            .field("last_line_truncation_mode", &self.last_line_truncation_mode)
            .field("truncation_token", &self.truncation_token)
            .field(
                "truncation_range_adjuster",
                &self.truncation_range_adjuster.is_some(),
            )
            .field("min_text_scale_factor", &self.min_text_scale_factor)
            .field(
                "text_scale_factor_step_size",
                &self.text_scale_factor_step_size,
            )
            .field("baseline_adjustment", &self.baseline_adjustment)
            .field(
                "hyphenation_location_finder",
                &self.hyphenation_location_finder.is_some(),
            )
            .finish()
    }
}

impl TextFrameOptions {
    /// Returns a builder for options.
    pub fn builder() -> TextFrameOptionsBuilder {
        TextFrameOptionsBuilder::default()
    }

    /// Returns a builder initialized with these options.
    pub fn to_builder(&self) -> TextFrameOptionsBuilder {
        TextFrameOptionsBuilder {
            options: self.clone(),
        }
    }

    /// The line height model.
    pub fn layout_mode(&self) -> TextLayoutMode {
        self.layout_mode
    }

    /// Alignment of paragraphs with natural alignment.
    pub fn default_alignment(&self) -> DefaultTextAlignment {
        self.default_alignment
    }

    /// The maximum number of lines, zero for no limit.
    pub fn max_line_count(&self) -> u32 {
        self.max_line_count
    }

    /// The truncation mode of the last line.
    pub fn last_line_truncation_mode(&self) -> LastLineTruncationMode {
        self.last_line_truncation_mode
    }

    /// The custom truncation token.
    pub fn truncation_token(&self) -> Option<&Arc<StyledString>> {
        self.truncation_token.as_ref()
    }

    /// The smallest text scale factor the layout may use to fit the text.
    pub fn min_text_scale_factor(&self) -> f64 {
        self.min_text_scale_factor
    }

    /// Scale factors are multiples of this step, except for the minimum.
    pub fn text_scale_factor_step_size(&self) -> f64 {
        self.text_scale_factor_step_size
    }

    /// The baseline adjustment for scaled text.
    pub fn baseline_adjustment(&self) -> BaselineAdjustment {
        self.baseline_adjustment
    }
}

/// Builder for [`TextFrameOptions`]. Invalid values are clamped.
#[derive(Clone, Debug, Default)]
pub struct TextFrameOptionsBuilder {
    options: TextFrameOptions,
}

impl TextFrameOptionsBuilder {
    /// Sets the line height model.
    pub fn layout_mode(mut self, mode: TextLayoutMode) -> Self {
        self.options.layout_mode = mode;
        self
    }

    /// Sets the alignment of paragraphs with natural alignment.
    pub fn default_alignment(mut self, alignment: DefaultTextAlignment) -> Self {
        self.options.default_alignment = alignment;
        self
    }

    /// Sets the maximum number of lines. Zero means no limit.
    pub fn max_line_count(mut self, count: u32) -> Self {
        self.options.max_line_count = count;
        self
    }

    /// Sets the truncation mode of the last line.
    pub fn last_line_truncation_mode(mut self, mode: LastLineTruncationMode) -> Self {
        self.options.last_line_truncation_mode = mode;
        self
    }

    /// Sets the truncation token. An empty token selects the default "…".
    ///
    /// The token is copied.
    pub fn truncation_token(mut self, token: Option<&StyledString>) -> Self {
        self.options.truncation_token = token
            .filter(|token| !token.is_empty())
            .map(|token| Arc::new(token.clone()));
        self
    }

    /// Sets the truncation range adjuster.
    pub fn truncation_range_adjuster(mut self, adjuster: Option<TruncationRangeAdjuster>) -> Self {
        self.options.truncation_range_adjuster = adjuster;
        self
    }

    /// Sets the minimum text scale factor. Values outside `(0, 1]` are replaced by 1.
    pub fn min_text_scale_factor(mut self, factor: f64) -> Self {
        self.options.min_text_scale_factor = if factor > 0. && factor <= 1. {
            factor
        } else {
            log::debug!("invalid minimum text scale factor {factor}, using 1");
            1.
        };
        self
    }

    /// Sets the step size of the scale factor search. Values outside `(0, 1]` select the default.
    pub fn text_scale_factor_step_size(mut self, step: f64) -> Self {
        self.options.text_scale_factor_step_size = if step > 0. && step <= 1. {
            step
        } else {
            log::debug!("invalid text scale factor step size {step}, using the default");
            DEFAULT_TEXT_SCALE_FACTOR_STEP_SIZE
        };
        self
    }

    /// Sets the baseline adjustment for scaled text.
    pub fn baseline_adjustment(mut self, adjustment: BaselineAdjustment) -> Self {
        self.options.baseline_adjustment = adjustment;
        self
    }

    /// Sets the hyphenation location finder, replacing dictionary based hyphenation.
    pub fn hyphenation_location_finder(mut self, finder: Option<HyphenationLocationFinder>) -> Self {
        self.options.hyphenation_location_finder = finder;
        self
    }

    /// Builds the options.
    pub fn build(self) -> TextFrameOptions {
        self.options
    }
}

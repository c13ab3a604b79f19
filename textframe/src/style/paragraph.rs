// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::util::non_negative;
use crate::Direction;

/// Horizontal alignment of the lines of a paragraph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAlignment {
    /// Resolved through the frame's default alignment and the base writing direction.
    #[default]
    Natural,
    /// Align lines to the left edge.
    Left,
    /// Align lines to the right edge.
    Right,
    /// Center lines.
    Center,
    /// Laid out like [`TextAlignment::Natural`].
    Justified,
}

/// Positioning policy for the first baseline of a paragraph.
///
/// Offsets "from top" are measured from the top of the paragraph, which is the bottom of the
/// previous paragraph's last line (including its spacing), or the top of the frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FirstLineOffset {
    /// Offset of the first baseline from its default position. May be negative.
    FromDefault(f32),
    /// Distance of the first baseline from the paragraph top.
    BaselineFromTop(f32),
    /// Distance of the vertical center of the first line box from the paragraph top.
    LineCenterFromTop(f32),
    /// Distance of the center of the first line's capital letters from the paragraph top.
    CapHeightCenterFromTop(f32),
    /// Distance of the center of the first line's lowercase letters from the paragraph top.
    XHeightCenterFromTop(f32),
}

impl Default for FirstLineOffset {
    fn default() -> Self {
        Self::FromDefault(0.)
    }
}

impl FirstLineOffset {
    fn clamped(self) -> Self {
        match self {
            Self::FromDefault(value) => Self::FromDefault(if value.is_finite() { value } else { 0. }),
            Self::BaselineFromTop(value) => Self::BaselineFromTop(non_negative(value)),
            Self::LineCenterFromTop(value) => Self::LineCenterFromTop(non_negative(value)),
            Self::CapHeightCenterFromTop(value) => Self::CapHeightCenterFromTop(non_negative(value)),
            Self::XHeightCenterFromTop(value) => Self::XHeightCenterFromTop(non_negative(value)),
        }
    }

    /// Whether the minimum baseline distance to the previous paragraph applies.
    pub(crate) fn keeps_minimum_baseline_distance(self) -> bool {
        matches!(self, Self::FromDefault(value) if value >= 0.)
    }
}

/// Indents that replace the regular indents for the first lines of a paragraph.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InitialLines {
    /// Number of lines using these indents.
    pub count: u32,
    /// Indent from the leading edge.
    pub head_indent: f32,
    /// Indent from the trailing edge.
    pub tail_indent: f32,
}

/// Paragraph level layout properties.
#[derive(Clone, Debug, PartialEq)]
pub struct ParagraphStyle {
    /// Horizontal alignment.
    pub alignment: TextAlignment,
    /// Base writing direction; detected from the first strong character when `None`.
    pub base_writing_direction: Option<Direction>,
    /// Extra space between lines.
    pub line_spacing: f32,
    /// Multiplier for the natural line height. Zero means one.
    pub line_height_multiple: f32,
    /// Minimum line height.
    pub minimum_line_height: f32,
    /// Maximum line height. Zero means unbounded.
    pub maximum_line_height: f32,
    /// Space above the paragraph, ignored for the first paragraph of a frame.
    pub paragraph_spacing_before: f32,
    /// Space below the paragraph, ignored for the last paragraph of a frame.
    pub paragraph_spacing_after: f32,
    /// Indent of the first line from the leading edge.
    pub first_line_head_indent: f32,
    /// Indent of the other lines from the leading edge.
    pub head_indent: f32,
    /// Indent of all lines from the trailing edge.
    pub tail_indent: f32,
    /// Hyphenation is attempted for a line when its width divided by the available width is less
    /// than this factor. Zero disables hyphenation, one hyphenates whenever possible.
    pub hyphenation_factor: f32,
    /// Positioning of the first baseline.
    pub first_line_offset: FirstLineOffset,
    /// Minimum distance between consecutive baselines.
    pub minimum_baseline_distance: f32,
    /// Indents for the initial lines.
    pub initial_lines: InitialLines,
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self {
            alignment: TextAlignment::Natural,
            base_writing_direction: None,
            line_spacing: 0.,
            line_height_multiple: 0.,
            minimum_line_height: 0.,
            maximum_line_height: 0.,
            paragraph_spacing_before: 0.,
            paragraph_spacing_after: 0.,
            first_line_head_indent: 0.,
            head_indent: 0.,
            tail_indent: 0.,
            hyphenation_factor: 0.,
            first_line_offset: FirstLineOffset::default(),
            minimum_baseline_distance: 0.,
            initial_lines: InitialLines::default(),
        }
    }
}

impl ParagraphStyle {
    /// Returns a copy with every value clamped to its valid range.
    pub fn resolved(&self) -> Self {
        let line_height_multiple = non_negative(self.line_height_multiple);
        let minimum_line_height = non_negative(self.minimum_line_height);
        let maximum_line_height = non_negative(self.maximum_line_height);
        let maximum_line_height = if maximum_line_height == 0. {
            f32::INFINITY
        } else {
            maximum_line_height.max(minimum_line_height)
        };
        Self {
            alignment: self.alignment,
            base_writing_direction: self.base_writing_direction,
            line_spacing: non_negative(self.line_spacing),
            line_height_multiple: if line_height_multiple == 0. {
                1.
            } else {
                line_height_multiple
            },
            minimum_line_height,
            maximum_line_height,
            paragraph_spacing_before: non_negative(self.paragraph_spacing_before),
            paragraph_spacing_after: non_negative(self.paragraph_spacing_after),
            first_line_head_indent: non_negative(self.first_line_head_indent),
            head_indent: non_negative(self.head_indent),
            tail_indent: non_negative(self.tail_indent),
            hyphenation_factor: non_negative(self.hyphenation_factor).min(1.),
            first_line_offset: self.first_line_offset.clamped(),
            minimum_baseline_distance: non_negative(self.minimum_baseline_distance),
            initial_lines: InitialLines {
                count: self.initial_lines.count,
                head_indent: non_negative(self.initial_lines.head_indent),
                tail_indent: non_negative(self.initial_lines.tail_indent),
            },
        }
    }

    /// Head and tail indent of the line with the given index within the paragraph.
    pub(crate) fn indents(&self, line_index_in_paragraph: u32) -> (f32, f32) {
        if line_index_in_paragraph < self.initial_lines.count {
            (self.initial_lines.head_indent, self.initial_lines.tail_indent)
        } else if line_index_in_paragraph == 0 {
            (self.first_line_head_indent, self.tail_indent)
        } else {
            (self.head_indent, self.tail_indent)
        }
    }
}

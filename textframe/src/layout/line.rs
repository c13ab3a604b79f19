// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use peniko::kurbo::{Point, Rect};

use super::data::{LineData, LineFlags};
use super::{Paragraph, TextFrame, TextFrameIndex};
use crate::util::usize_range;
use crate::{Direction, DisplayScale};

/// A line of a [`TextFrame`].
#[derive(Clone, Copy, Debug)]
pub struct Line<'a> {
    pub(crate) frame: &'a TextFrame,
    pub(crate) index: usize,
    pub(crate) data: &'a LineData,
}

impl<'a> Line<'a> {
    pub(crate) fn new(frame: &'a TextFrame, index: usize) -> Self {
        Self {
            frame,
            index,
            data: &frame.layout.lines[index],
        }
    }

    /// The index of the line in the frame.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The index of the paragraph containing the line.
    pub fn paragraph_index(&self) -> usize {
        self.data.paragraph as usize
    }

    /// The paragraph containing the line.
    pub fn paragraph(&self) -> Paragraph<'a> {
        Paragraph::new(self.frame, self.paragraph_index())
    }

    /// Returns `true` for the first line of the frame.
    pub fn is_first_line(&self) -> bool {
        self.index == 0
    }

    /// Returns `true` for the last line of the frame.
    pub fn is_last_line(&self) -> bool {
        self.index + 1 == self.frame.layout.lines.len()
    }

    /// Returns `true` if the line is the first line of its paragraph.
    pub fn is_first_in_paragraph(&self) -> bool {
        self.data.flags.contains(LineFlags::FIRST_IN_PARAGRAPH)
    }

    /// Returns `true` if the line is the last line of its paragraph.
    pub fn is_last_in_paragraph(&self) -> bool {
        self.data.flags.contains(LineFlags::LAST_IN_PARAGRAPH)
    }

    /// Returns `true` if a paragraph terminator follows the line in the original string.
    pub fn is_followed_by_terminator(&self) -> bool {
        self.data.flags.contains(LineFlags::FOLLOWED_BY_TERMINATOR)
    }

    /// The frame index range of the line, excluding trailing whitespace and including an inserted
    /// hyphen.
    pub fn range(&self) -> Range<TextFrameIndex> {
        self.start_index()..self.end_index()
    }

    /// The index of the start of the line.
    pub fn start_index(&self) -> TextFrameIndex {
        TextFrameIndex::new(self.data.truncated.start, false, self.index)
    }

    /// The index after the content of the line, excluding trailing whitespace.
    pub fn end_index(&self) -> TextFrameIndex {
        TextFrameIndex::new(self.data.truncated.end, false, self.index)
    }

    /// The index of the inserted hyphen, if the line has one.
    pub fn hyphen_index(&self) -> Option<TextFrameIndex> {
        self.data.hyphen.map(|_| {
            TextFrameIndex::new(self.data.truncated.end.saturating_sub(1), true, self.index)
        })
    }

    /// The range of the line in the original string, excluding trailing whitespace.
    ///
    /// For a truncated line this includes the excised text.
    pub fn range_in_original_string(&self) -> Range<usize> {
        usize_range(&self.data.original)
    }

    /// The original string range replaced by the truncation token, or removed without a token.
    pub fn excised_range_in_original_string(&self) -> Range<usize> {
        usize_range(&self.data.excised)
    }

    /// The range of the line in the truncated string, excluding trailing whitespace.
    pub fn range_in_truncated_string(&self) -> Range<usize> {
        usize_range(&self.data.truncated)
    }

    /// The length of the trailing whitespace and paragraph terminator in the truncated string.
    pub fn trailing_whitespace_len(&self) -> usize {
        self.data.trailing_whitespace_len as usize
    }

    /// Returns `true` if the line contains a truncation token.
    pub fn has_truncation_token(&self) -> bool {
        self.data.flags.contains(LineFlags::HAS_TOKEN)
    }

    /// Returns `true` if the line ends with an inserted hyphen.
    pub fn has_inserted_hyphen(&self) -> bool {
        self.data.flags.contains(LineFlags::HAS_HYPHEN)
    }

    /// The inserted hyphen.
    pub fn hyphen(&self) -> Option<char> {
        self.data.hyphen
    }

    /// Returns `true` if the line was broken inside a word because no break opportunity fit.
    pub fn is_emergency_break(&self) -> bool {
        self.data.flags.contains(LineFlags::EMERGENCY_BREAK)
    }

    /// The base writing direction of the paragraph.
    pub fn paragraph_direction(&self) -> Direction {
        if self.data.flags.contains(LineFlags::IS_RTL) {
            Direction::RightToLeft
        } else {
            Direction::LeftToRight
        }
    }

    /// The baseline origin in the frame, using the frame's display scale.
    pub fn baseline_origin(&self) -> Point {
        self.baseline_origin_at(Point::ZERO, self.frame.display_scale)
    }

    /// The baseline origin for a frame placed at `frame_origin`.
    ///
    /// The y coordinate is rounded up to `display_scale`.
    pub fn baseline_origin_at(
        &self,
        frame_origin: Point,
        display_scale: Option<DisplayScale>,
    ) -> Point {
        Point::new(
            self.frame.line_x(self.data, frame_origin.x),
            self.frame
                .line_baseline(self.data, frame_origin.y, display_scale),
        )
    }

    /// The width of the content, excluding trailing whitespace.
    pub fn width(&self) -> f64 {
        self.scaled(self.data.width)
    }

    /// The typographic ascent.
    pub fn ascent(&self) -> f64 {
        self.scaled(self.data.heights.ascent)
    }

    /// The typographic descent.
    pub fn descent(&self) -> f64 {
        self.scaled(self.data.heights.descent)
    }

    /// The typographic leading.
    pub fn leading(&self) -> f64 {
        self.scaled(self.data.heights.leading)
    }

    /// The part of the line height above the baseline, including line spacing.
    pub fn height_above_baseline(&self) -> f64 {
        self.scaled(self.data.heights.above)
    }

    /// The part of the line height below the baseline, including line spacing.
    pub fn height_below_baseline(&self) -> f64 {
        self.scaled(self.data.heights.below)
    }

    /// The typographic bounds in the frame, using the frame's display scale.
    pub fn typographic_bounds(&self) -> Rect {
        self.typographic_bounds_at(Point::ZERO, self.frame.display_scale)
    }

    /// The typographic bounds for a frame placed at `frame_origin`.
    ///
    /// The bounds extend half the leading above the ascent and below the descent.
    pub fn typographic_bounds_at(
        &self,
        frame_origin: Point,
        display_scale: Option<DisplayScale>,
    ) -> Rect {
        let origin = self.baseline_origin_at(frame_origin, display_scale);
        let top = origin.y - (self.ascent() + self.leading() / 2.);
        Rect::new(
            origin.x,
            top,
            origin.x + self.width(),
            top + self.ascent() + self.descent() + self.leading(),
        )
    }

    /// The width of the part of the line left of the truncation token or hyphen.
    pub fn left_part_width(&self) -> f64 {
        self.scaled(self.data.left_part_width)
    }

    /// The width of the truncation token.
    pub fn token_width(&self) -> f64 {
        self.scaled(self.data.token_width)
    }

    /// The width of the inserted hyphen.
    pub fn hyphen_width(&self) -> f64 {
        self.scaled(self.data.hyphen_width)
    }

    fn scaled(&self, value: f32) -> f64 {
        self.frame.scale * f64::from(value)
    }
}

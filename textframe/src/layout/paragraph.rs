// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;
use std::sync::Arc;

use super::data::{ParagraphData, ResolvedAlignment};
use super::{Line, TextFrame, TextFrameIndex};
use crate::util::usize_range;
use crate::{Direction, StyledString};

/// A paragraph of a [`TextFrame`].
///
/// When truncation removes text spanning several paragraphs, the first of them carries the token
/// and the following ones have no lines.
#[derive(Clone, Copy, Debug)]
pub struct Paragraph<'a> {
    pub(crate) frame: &'a TextFrame,
    pub(crate) index: usize,
    pub(crate) data: &'a ParagraphData,
}

impl<'a> Paragraph<'a> {
    pub(crate) fn new(frame: &'a TextFrame, index: usize) -> Self {
        Self {
            frame,
            index,
            data: &frame.layout.paragraphs[index],
        }
    }

    /// The index of the paragraph in the frame.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The range in the original string, including the terminator.
    pub fn range_in_original_string(&self) -> Range<usize> {
        usize_range(&self.data.range)
    }

    /// The range in the truncated string, including the terminator.
    pub fn range_in_truncated_string(&self) -> Range<usize> {
        usize_range(&self.data.truncated)
    }

    /// The frame index range of the paragraph, including the terminator.
    pub fn range(&self) -> Range<TextFrameIndex> {
        let frame = self.frame;
        frame.index_for_truncated(self.data.truncated.start as usize)
            ..frame.index_for_truncated(self.data.truncated.end as usize)
    }

    /// The length of the paragraph terminator, zero for the last paragraph of the text.
    pub fn terminator_len(&self) -> usize {
        self.data.terminator_len as usize
    }

    /// The original string range removed by truncation, empty if the paragraph is not truncated.
    pub fn excised_range_in_original_string(&self) -> Range<usize> {
        usize_range(&self.data.excised)
    }

    /// Returns `true` if the excised text continues in the next paragraph.
    pub fn excision_continues_in_next_paragraph(&self) -> bool {
        self.data.excision_continues
    }

    /// Returns `true` if the paragraph starts with text excised together with the end of the
    /// previous paragraph.
    pub fn is_excision_continuation(&self) -> bool {
        self.index > 0
            && self.frame.layout.paragraphs[self.index - 1].excision_continues
            && self.data.excised.start == self.data.range.start
    }

    /// The token replacing the excised text.
    pub fn truncation_token(&self) -> Option<&'a Arc<StyledString>> {
        let layout = &self.frame.layout;
        self.data
            .token
            .map(|token| &layout.tokens[token as usize].string)
    }

    /// The length of the truncation token, zero if there is none.
    pub fn truncation_token_len(&self) -> usize {
        self.data.token_len as usize
    }

    /// The range of the truncation token in the truncated string.
    pub fn truncation_token_range_in_truncated_string(&self) -> Range<usize> {
        usize_range(&self.data.token_range())
    }

    /// The range of line indices.
    pub fn line_range(&self) -> Range<usize> {
        usize_range(&self.data.lines)
    }

    /// Returns an iterator over the lines.
    pub fn lines(&self) -> impl ExactSizeIterator<Item = Line<'a>> + Clone + 'a {
        let frame = self.frame;
        self.line_range().map(move |index| Line::new(frame, index))
    }

    /// The line indices using the initial lines indents.
    pub fn initial_line_range(&self) -> Range<usize> {
        self.data.lines.start as usize..self.data.initial_lines_end as usize
    }

    /// The line indices using the regular indents.
    pub fn non_initial_line_range(&self) -> Range<usize> {
        self.data.initial_lines_end as usize..self.data.lines.end as usize
    }

    /// The head and tail indents of the initial lines.
    pub fn initial_lines_indents(&self) -> (f64, f64) {
        self.scaled_pair(self.data.initial_indents)
    }

    /// The head and tail indents of the lines after the initial lines.
    pub fn indents(&self) -> (f64, f64) {
        self.scaled_pair(self.data.indents)
    }

    /// The horizontal alignment of the lines.
    pub fn alignment(&self) -> ResolvedAlignment {
        self.data.alignment
    }

    /// The base writing direction.
    pub fn base_direction(&self) -> Direction {
        Direction::from_level(self.data.base_level)
    }

    fn scaled_pair(&self, (head, tail): (f32, f32)) -> (f64, f64) {
        let scale = self.frame.scale;
        (scale * f64::from(head), scale * f64::from(tail))
    }
}

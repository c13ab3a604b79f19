// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping between frame indices, the original string and the truncated string.

use core::cmp::Ordering;
use core::hash::{Hash, Hasher};
use core::ops::Range;

use super::data::ParagraphData;
use super::TextFrame;
use crate::util::to_u32;

/// A position in a [`TextFrame`].
///
/// A frame index is an offset in the frame's truncated string, together with a flag for the
/// position of a hyphen inserted by line breaking after that offset, and the index of the line
/// containing the position. Indices compare by offset and hyphen flag only; the hyphen position
/// lies between the last character of its line and the end of that line.
///
/// Indices are only meaningful for the frame that created them.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextFrameIndex {
    index: u32,
    is_hyphen: bool,
    line: u32,
}

impl TextFrameIndex {
    pub(crate) fn new(index: u32, is_hyphen: bool, line: usize) -> Self {
        Self {
            index,
            is_hyphen,
            line: to_u32(line),
        }
    }

    /// The UTF-16 offset in the truncated string.
    pub fn index_in_truncated_string(self) -> usize {
        self.index as usize
    }

    /// Returns `true` if this is the position of a hyphen inserted after
    /// [`index_in_truncated_string`](Self::index_in_truncated_string).
    pub fn is_index_of_inserted_hyphen(self) -> bool {
        self.is_hyphen
    }

    /// The index of the line containing the position.
    pub fn line_index(self) -> usize {
        self.line as usize
    }

    /// The truncated string offset used when the index bounds a range.
    ///
    /// A range ending at a hyphen position includes the character before the hyphen.
    pub(crate) fn range_offset(self) -> u32 {
        self.index + u32::from(self.is_hyphen)
    }
}

impl PartialEq for TextFrameIndex {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.is_hyphen == other.is_hyphen
    }
}

impl Eq for TextFrameIndex {}

impl Hash for TextFrameIndex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.is_hyphen.hash(state);
    }
}

impl PartialOrd for TextFrameIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TextFrameIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.index, self.is_hyphen).cmp(&(other.index, other.is_hyphen))
    }
}

impl TextFrame {
    /// The index of the start of the text.
    pub fn start_index(&self) -> TextFrameIndex {
        TextFrameIndex::new(0, false, 0)
    }

    /// The index of the end of the text.
    pub fn end_index(&self) -> TextFrameIndex {
        TextFrameIndex::new(
            self.layout.truncated_len,
            false,
            self.layout.lines.len().saturating_sub(1),
        )
    }

    /// The full index range of the frame.
    pub fn indices(&self) -> Range<TextFrameIndex> {
        self.start_index()..self.end_index()
    }

    /// The index for an offset in the truncated string, clamped to the string length.
    pub fn index_for_truncated(&self, offset: usize) -> TextFrameIndex {
        let offset = to_u32(offset).min(self.layout.truncated_len);
        TextFrameIndex::new(offset, false, self.line_for_truncated(offset))
    }

    /// The index for an offset in the original string, clamped to the frame's range.
    ///
    /// When the offset falls into text replaced by a truncation token, `index_in_token` selects
    /// the position within the token, clamped to the token length. Otherwise it is ignored.
    pub fn index_for_original(&self, offset: usize, index_in_token: usize) -> TextFrameIndex {
        let offset = self.clamp_original(offset);
        let truncated = match self.token_covering(offset, false) {
            Some(token) => token.start + to_u32(index_in_token).min(token.end - token.start),
            None => self.truncated_for_original(offset),
        };
        self.index_for_truncated(truncated as usize)
    }

    /// The index range for a range of the original string.
    ///
    /// A range overlapping text replaced by a token includes the whole token.
    pub fn range_for_original_range(&self, range: Range<usize>) -> Range<TextFrameIndex> {
        let start = self.clamp_original(range.start);
        let end = self.clamp_original(range.end).max(start);
        let start_offset = match self.token_covering(start, false) {
            Some(token) => token.start,
            None => self.truncated_for_original(start),
        };
        let end_offset = match self.token_covering(end, true) {
            Some(token) => token.end,
            None => self.truncated_for_original(end),
        };
        self.index_for_truncated(start_offset as usize)
            ..self.index_for_truncated(end_offset.max(start_offset) as usize)
    }

    /// The index range for a range of the truncated string.
    pub fn range_for_truncated_range(&self, range: Range<usize>) -> Range<TextFrameIndex> {
        let start = self.index_for_truncated(range.start);
        let end = self.index_for_truncated(range.end.max(range.start));
        start..end
    }

    /// The original string range corresponding to an index range.
    ///
    /// A range covering part of a truncation token maps to the whole excised text.
    ///
    /// # Panics
    ///
    /// Panics if an index lies outside of the truncated string.
    pub fn range_in_original_string_for(&self, range: Range<TextFrameIndex>) -> Range<usize> {
        self.check_index(range.start);
        self.check_index(range.end);
        let start = self.original_for_truncated(range.start.range_offset(), false);
        let end = self.original_for_truncated(range.end.range_offset(), true);
        start as usize..end.max(start) as usize
    }

    /// The original string range at `index`.
    ///
    /// The range is empty unless the index lies in a truncation token, in which case it is the
    /// whole excised text.
    ///
    /// # Panics
    ///
    /// Panics if the index lies outside of the truncated string.
    pub fn range_in_original_string_at(&self, index: TextFrameIndex) -> Range<usize> {
        self.check_index(index);
        let offset = index.range_offset();
        if !index.is_hyphen {
            let p = self.paragraph_for_truncated(offset);
            if let Some(paragraph) = self.layout.paragraphs.get(p) {
                if paragraph.token_range().contains(&offset) {
                    return paragraph.excised.start as usize..self.excision_end(p) as usize;
                }
            }
        }
        let original = self.original_for_truncated(offset, false) as usize;
        original..original
    }

    /// The truncated string range of an index range.
    ///
    /// # Panics
    ///
    /// Panics if an index lies outside of the truncated string.
    pub fn range_in_truncated_string(&self, range: Range<TextFrameIndex>) -> Range<usize> {
        self.check_index(range.start);
        self.check_index(range.end);
        let start = range.start.range_offset() as usize;
        start..(range.end.range_offset() as usize).max(start)
    }

    /// The index range of the last truncation token, or an empty range at the end if the frame
    /// has no token.
    pub fn range_of_last_truncation_token(&self) -> Range<TextFrameIndex> {
        match self
            .layout
            .paragraphs
            .iter()
            .rev()
            .find(|paragraph| paragraph.token_len > 0)
        {
            Some(paragraph) => {
                let range = paragraph.token_range();
                let start = self.index_for_truncated(range.start as usize);
                let end = TextFrameIndex::new(range.end, false, start.line_index());
                start..end
            }
            None => self.end_index()..self.end_index(),
        }
    }

    /// The line containing a truncated string offset.
    pub(crate) fn line_for_truncated(&self, offset: u32) -> usize {
        self.layout
            .lines
            .partition_point(|line| line.truncated.start <= offset)
            .saturating_sub(1)
    }

    fn paragraph_for_truncated(&self, offset: u32) -> usize {
        self.layout
            .paragraphs
            .partition_point(|paragraph| paragraph.truncated.start <= offset)
            .saturating_sub(1)
    }

    fn paragraph_for_original(&self, offset: u32) -> usize {
        self.layout
            .paragraphs
            .partition_point(|paragraph| paragraph.range.start <= offset)
            .saturating_sub(1)
    }

    fn clamp_original(&self, offset: usize) -> u32 {
        let range = &self.layout.range;
        to_u32(offset).clamp(range.start, range.end)
    }

    fn check_index(&self, index: TextFrameIndex) {
        assert!(
            index.range_offset() <= self.layout.truncated_len,
            "index {index:?} lies outside of the truncated string of length {}",
            self.layout.truncated_len
        );
    }

    /// The paragraph whose excision covers the start of paragraph `p`.
    fn excision_owner(&self, p: usize) -> usize {
        let paragraphs = &self.layout.paragraphs;
        let mut owner = p;
        while owner > 0
            && paragraphs[owner - 1].excision_continues
            && paragraphs[owner].excised.start == paragraphs[owner].range.start
        {
            owner -= 1;
        }
        owner
    }

    /// The end of the excision starting in paragraph `owner`.
    fn excision_end(&self, owner: usize) -> u32 {
        let paragraphs = &self.layout.paragraphs;
        let mut last = owner;
        while paragraphs[last].excision_continues && last + 1 < paragraphs.len() {
            last += 1;
        }
        paragraphs[last].excised.end
    }

    /// The truncated string range of the token replacing `offset`, if there is one.
    ///
    /// An offset at the start of the excised text is covered when it starts a range, an offset at
    /// the end is never covered.
    fn token_covering(&self, offset: u32, is_range_end: bool) -> Option<Range<u32>> {
        let paragraphs = &self.layout.paragraphs;
        if paragraphs.is_empty() {
            return None;
        }
        let owner = self.excision_owner(self.paragraph_for_original(offset));
        let paragraph: &ParagraphData = &paragraphs[owner];
        if paragraph.token_len == 0 {
            return None;
        }
        let end = self.excision_end(owner);
        let after_start = if is_range_end {
            offset > paragraph.excised.start
        } else {
            offset >= paragraph.excised.start
        };
        (after_start && offset < end).then(|| paragraph.token_range())
    }

    fn truncated_for_original(&self, offset: u32) -> u32 {
        let paragraphs = &self.layout.paragraphs;
        if paragraphs.is_empty() {
            return 0;
        }
        paragraphs[self.paragraph_for_original(offset)].truncated_offset(offset)
    }

    /// The original string offset of a truncated string offset.
    ///
    /// Offsets inside a token map to the start of the excised text, or to its end if
    /// `is_range_end` is set.
    fn original_for_truncated(&self, offset: u32, is_range_end: bool) -> u32 {
        let paragraphs = &self.layout.paragraphs;
        if paragraphs.is_empty() {
            return self.layout.range.start;
        }
        let offset = offset.min(self.layout.truncated_len);
        let p = self.paragraph_for_truncated(offset);
        let paragraph = &paragraphs[p];
        let relative = offset - paragraph.truncated.start;
        let head = paragraph.excised.start - paragraph.range.start;
        let has_excision = !paragraph.excised.is_empty() || paragraph.token_len > 0;
        if !has_excision || relative < head {
            return (paragraph.range.start + relative).min(paragraph.range.end);
        }
        if relative == head && paragraph.token_len == 0 {
            return if self.excision_owner(p) != p {
                paragraph.excised.end
            } else {
                paragraph.excised.start
            };
        }
        if relative < head + paragraph.token_len {
            return if is_range_end && relative > head {
                self.excision_end(p)
            } else {
                paragraph.excised.start
            };
        }
        (paragraph.excised.end + (relative - head - paragraph.token_len)).min(paragraph.range.end)
    }
}

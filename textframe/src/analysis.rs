// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text analysis: paragraphs, grapheme clusters, line break opportunities and bidi levels.

use core::ops::Range;

use icu_properties::props::{LineBreak, WhiteSpace};
use icu_properties::{CodePointMapData, CodePointSetData};
use icu_segmenter::options::LineBreakOptions;
use icu_segmenter::{GraphemeClusterSegmenter, LineSegmenter};
use unicode_bidi::Level;

pub(crate) type BidiLevel = u8;

/// Writing direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Left-to-right.
    #[default]
    LeftToRight,
    /// Right-to-left.
    RightToLeft,
}

impl Direction {
    pub(crate) fn from_level(level: BidiLevel) -> Self {
        if level & 1 == 0 {
            Self::LeftToRight
        } else {
            Self::RightToLeft
        }
    }

    /// Returns `true` for [`Direction::RightToLeft`].
    pub fn is_rtl(self) -> bool {
        self == Self::RightToLeft
    }
}

pub(crate) const LINE_SEPARATOR: u16 = 0x2028;
pub(crate) const PARAGRAPH_SEPARATOR: u16 = 0x2029;
pub(crate) const NEXT_LINE: u16 = 0x85;
const CR: u16 = 0x0D;
const LF: u16 = 0x0A;

/// A paragraph found by [`split_paragraphs`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ParagraphBounds {
    /// Range including the terminator.
    pub(crate) range: Range<usize>,
    pub(crate) terminator_len: usize,
}

impl ParagraphBounds {
    pub(crate) fn content_end(&self) -> usize {
        self.range.end - self.terminator_len
    }
}

/// Splits `text[range]` into paragraphs at CR, LF, CRLF, NEL and U+2029.
///
/// A terminator belongs to the paragraph it ends. Text after the last terminator forms a
/// paragraph only if it is not empty.
pub(crate) fn split_paragraphs(text: &[u16], range: Range<usize>) -> Vec<ParagraphBounds> {
    let mut paragraphs = Vec::new();
    let mut start = range.start;
    let mut i = range.start;
    while i < range.end {
        let terminator_len = match text[i] {
            CR if i + 1 < range.end && text[i + 1] == LF => 2,
            CR | LF | NEXT_LINE | PARAGRAPH_SEPARATOR => 1,
            _ => 0,
        };
        if terminator_len == 0 {
            i += 1;
            continue;
        }
        i += terminator_len;
        paragraphs.push(ParagraphBounds {
            range: start..i,
            terminator_len,
        });
        start = i;
    }
    if start < range.end {
        paragraphs.push(ParagraphBounds {
            range: start..range.end,
            terminator_len: 0,
        });
    }
    paragraphs
}

/// Kind of a line break opportunity before a code unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BreakKind {
    /// No break is allowed.
    #[default]
    None,
    /// An ordinary break opportunity.
    Normal,
    /// A break after a soft hyphen, which displays a hyphen when taken.
    SoftHyphen,
    /// A forced break after a line separator.
    Mandatory,
}

/// Returns the code point starting at `index`, combining surrogate pairs.
pub(crate) fn code_point_at(text: &[u16], index: usize) -> char {
    char::decode_utf16(text[index..].iter().copied())
        .next()
        .and_then(Result::ok)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Returns the code point ending at `index`.
pub(crate) fn code_point_before(text: &[u16], index: usize) -> char {
    let start = if index >= 2 && is_low_surrogate(text[index - 1]) && is_high_surrogate(text[index - 2])
    {
        index - 2
    } else {
        index.saturating_sub(1)
    };
    code_point_at(text, start)
}

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..0xDC00).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..0xE000).contains(&unit)
}

pub(crate) fn is_whitespace(c: char) -> bool {
    CodePointSetData::new::<WhiteSpace>().contains(c)
}

/// Grapheme cluster boundaries of `text`, including 0 and `text.len()`.
pub(crate) fn grapheme_boundaries(text: &[u16]) -> Vec<usize> {
    if text.is_empty() {
        return vec![0];
    }
    GraphemeClusterSegmenter::new().segment_utf16(text).collect()
}

/// Line break opportunities of a paragraph's content, one entry per code unit plus one.
///
/// Entry `i` describes a break between `text[i - 1]` and `text[i]`. The first and last entries
/// are always [`BreakKind::None`].
pub(crate) fn line_break_opportunities(text: &[u16]) -> Vec<BreakKind> {
    let mut breaks = vec![BreakKind::None; text.len() + 1];
    if text.is_empty() {
        return breaks;
    }
    let line_break = CodePointMapData::<LineBreak>::new();
    let segmenter = LineSegmenter::new_auto(LineBreakOptions::default());
    for position in segmenter.segment_utf16(text) {
        if position == 0 || position >= text.len() {
            continue;
        }
        let c = code_point_before(text, position);
        // The segmenter reports breaks after glue characters that should not be taken.
        let kind = match line_break.get(c) {
            LineBreak::Glue | LineBreak::WordJoiner | LineBreak::ZWJ => continue,
            LineBreak::MandatoryBreak => BreakKind::Mandatory,
            _ if c == '\u{AD}' => BreakKind::SoftHyphen,
            _ => BreakKind::Normal,
        };
        breaks[position] = kind;
    }
    // Line separators always end a line, even when the segmenter disagrees.
    for (i, &unit) in text.iter().enumerate() {
        if unit == LINE_SEPARATOR && i + 1 < text.len() {
            breaks[i + 1] = BreakKind::Mandatory;
        }
    }
    breaks
}

/// Resolved bidi levels of a paragraph's content.
#[derive(Clone, Debug)]
pub(crate) struct BidiResult {
    pub(crate) base_level: BidiLevel,
    /// One level per code unit.
    pub(crate) levels: Vec<BidiLevel>,
}

pub(crate) fn bidi_levels(text: &[u16], direction: Option<Direction>) -> BidiResult {
    let default_level = direction.map(|direction| match direction {
        Direction::LeftToRight => Level::ltr(),
        Direction::RightToLeft => Level::rtl(),
    });
    let all_ltr = text.iter().all(|&unit| unit < 0x0590);
    if all_ltr && direction != Some(Direction::RightToLeft) {
        return BidiResult {
            base_level: 0,
            levels: vec![0; text.len()],
        };
    }
    let info = unicode_bidi::utf16::BidiInfo::new(text, default_level);
    let base_level = info
        .paragraphs
        .first()
        .map(|paragraph| paragraph.level)
        .or(default_level)
        .unwrap_or_else(Level::ltr)
        .number();
    let levels = info.levels.iter().map(|level| level.number()).collect();
    BidiResult { base_level, levels }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(text: &str) -> Vec<u16> {
        text.encode_utf16().collect()
    }

    #[test]
    fn paragraphs_include_their_terminators() {
        let text = utf16("a\r\nb\nc\u{2029}");
        let paragraphs = split_paragraphs(&text, 0..text.len());
        let ranges: Vec<_> = paragraphs.iter().map(|p| (p.range.clone(), p.terminator_len)).collect();
        assert_eq!(ranges, [(0..3, 2), (3..5, 1), (5..7, 1)]);
    }

    #[test]
    fn crlf_cut_by_range_end_is_a_single_terminator() {
        let text = utf16("ab\r\ncd");
        let paragraphs = split_paragraphs(&text, 0..3);
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].range, 0..3);
        assert_eq!(paragraphs[0].terminator_len, 1);
    }

    #[test]
    fn empty_paragraphs() {
        let text = utf16("\n\r\n");
        let paragraphs = split_paragraphs(&text, 0..text.len());
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[1].range, 1..3);
    }

    #[test]
    fn break_opportunities() {
        let text = utf16("Test Te\u{AD}st");
        let breaks = line_break_opportunities(&text);
        assert_eq!(breaks[5], BreakKind::Normal);
        assert_eq!(breaks[8], BreakKind::SoftHyphen);
        assert_eq!(breaks[4], BreakKind::None);
        assert_eq!(breaks[text.len()], BreakKind::None);
    }

    #[test]
    fn no_break_after_word_joiner() {
        let text = utf16("a\u{2060} b");
        let breaks = line_break_opportunities(&text);
        assert!(breaks.iter().filter(|kind| **kind != BreakKind::None).count() <= 1);
        assert_eq!(breaks[2], BreakKind::None);
    }

    #[test]
    fn graphemes_keep_surrogate_pairs_together() {
        let text = utf16("a\u{1F600}b");
        assert_eq!(grapheme_boundaries(&text), [0, 1, 3, 4]);
    }

    #[test]
    fn rtl_levels() {
        let text = utf16("\u{5D0}\u{5D1} ab");
        let bidi = bidi_levels(&text, None);
        assert_eq!(bidi.base_level, 1);
        assert_eq!(bidi.levels[0], 1);
        assert_eq!(bidi.levels[3], 2);
    }
}

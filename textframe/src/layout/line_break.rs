// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy line breaking.

use core::ops::Range;

use crate::analysis::{BreakKind, Direction};
use crate::layout::data::{ClusterData, TextStorage};
use crate::layout::hyphenation::{HYPHEN, Hyphenator};
use crate::layout::prepare::PreparedParagraph;
use crate::shape::Shaper;
use crate::util::to_u32;
use crate::{StyledString, TextAttributes};

/// Widths are compared with this tolerance to absorb rounding of summed advances.
const WIDTH_EPSILON: f32 = 1. / 1024.;

/// A line chosen by [`LineBreaker::break_line`], in cluster indices of the original storage.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BrokenLine {
    /// Clusters up to the end of the content, excluding trailing whitespace.
    pub(crate) content: Range<usize>,
    /// End of the trailing whitespace clusters.
    pub(crate) whitespace_end: usize,
    /// Width of the content, excluding the hyphen.
    pub(crate) width: f32,
    pub(crate) hyphen: Option<char>,
    pub(crate) is_emergency_break: bool,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    index: usize,
    kind: BreakKind,
    /// Width of the content before the candidate, excluding trailing whitespace.
    width: f32,
}

pub(crate) struct LineBreaker<'a, 'b> {
    pub(crate) string: &'a StyledString,
    pub(crate) storage: &'a TextStorage,
    pub(crate) shaper: &'a dyn Shaper,
    pub(crate) hyphenator: &'a mut Hyphenator<'b>,
}

impl LineBreaker<'_, '_> {
    /// Breaks the line of `paragraph` starting at cluster `start` for the available width.
    pub(crate) fn break_line(
        &mut self,
        paragraph: &PreparedParagraph,
        start: usize,
        available_width: f32,
    ) -> BrokenLine {
        let storage = self.storage;
        let clusters = &storage.clusters;
        let end = paragraph.clusters.end as usize;
        let limit = available_width + WIDTH_EPSILON;
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut running = 0.;
        let mut content_width = 0.;
        let mut content_end = start;
        for i in start..end {
            let cluster = &clusters[i];
            if i > start && cluster.break_before != BreakKind::None {
                if cluster.break_before == BreakKind::Mandatory {
                    return BrokenLine {
                        content: start..content_end,
                        whitespace_end: i,
                        width: content_width,
                        hyphen: None,
                        is_emergency_break: false,
                    };
                }
                candidates.push(Candidate {
                    index: i,
                    kind: cluster.break_before,
                    width: content_width,
                });
            }
            running += cluster.advance;
            if cluster.is_whitespace() {
                continue;
            }
            if running > limit {
                return self.break_at_overflow(paragraph, start, i, &candidates, available_width);
            }
            content_width = running;
            content_end = i + 1;
        }
        BrokenLine {
            content: start..content_end,
            whitespace_end: end,
            width: content_width,
            hyphen: None,
            is_emergency_break: false,
        }
    }

    /// Chooses the break for a line whose cluster `overflow` does not fit anymore.
    fn break_at_overflow(
        &mut self,
        paragraph: &PreparedParagraph,
        start: usize,
        overflow: usize,
        candidates: &[Candidate],
        available_width: f32,
    ) -> BrokenLine {
        let limit = available_width + WIDTH_EPSILON;
        let mut chosen = None;
        for candidate in candidates.iter().rev() {
            match candidate.kind {
                BreakKind::SoftHyphen => {
                    let hyphen_width = self.hyphen_width(candidate.index, HYPHEN);
                    if candidate.width + hyphen_width <= limit {
                        return self.line_to(start, candidate.index, Some(HYPHEN), false);
                    }
                }
                _ => {
                    chosen = Some(*candidate);
                    break;
                }
            }
        }
        let line = match chosen {
            Some(candidate) => self.line_to(start, candidate.index, None, false),
            None => match candidates
                .iter()
                .rev()
                .find(|candidate| candidate.kind == BreakKind::SoftHyphen)
            {
                Some(candidate) => self.line_to(start, candidate.index, None, false),
                None => self.line_to(start, overflow.max(start + 1), None, true),
            },
        };
        if line.hyphen.is_none() {
            if let Some(hyphenated) = self.hyphenate(paragraph, start, &line, available_width) {
                return hyphenated;
            }
        }
        line
    }

    fn line_to(
        &self,
        start: usize,
        break_index: usize,
        hyphen: Option<char>,
        is_emergency_break: bool,
    ) -> BrokenLine {
        let clusters = &self.storage.clusters[start..break_index];
        let content_len = clusters
            .iter()
            .rposition(|cluster| !cluster.is_whitespace())
            .map_or(0, |index| index + 1);
        BrokenLine {
            content: start..start + content_len,
            whitespace_end: break_index,
            width: clusters[..content_len]
                .iter()
                .map(|cluster| cluster.advance)
                .sum(),
            hyphen,
            is_emergency_break,
        }
    }

    /// Tries to move the break into the word following `line`.
    fn hyphenate(
        &mut self,
        paragraph: &PreparedParagraph,
        start: usize,
        line: &BrokenLine,
        available_width: f32,
    ) -> Option<BrokenLine> {
        let factor = paragraph.style.hyphenation_factor;
        let end = paragraph.clusters.end as usize;
        if factor <= 0. || available_width <= 0. || line.whitespace_end >= end {
            return None;
        }
        if line.width / available_width >= factor {
            return None;
        }
        let storage = self.storage;
        let clusters = &storage.clusters;
        let word_start = if line.is_emergency_break {
            start
        } else {
            line.whitespace_end
        };
        let mut word_end = (word_start + 1..end)
            .find(|&i| clusters[i].break_before != BreakKind::None)
            .unwrap_or(end);
        while word_end > word_start + 1 && clusters[word_end - 1].is_whitespace() {
            word_end -= 1;
        }
        let text_start = clusters[word_start].text.start as usize;
        let mut range = text_start..clusters[word_end - 1].text.end as usize;
        let locale = storage
            .cluster_style(&clusters[word_start])
            .hyphenation_locale
            .clone();
        while let Some(location) = self
            .hyphenator
            .find(self.string, range.clone(), locale.as_deref())
        {
            // Snap down to a cluster boundary.
            let index = to_u32(location.index);
            let Some(boundary) = (word_start + 1..word_end)
                .rev()
                .find(|&i| clusters[i].text.start <= index)
            else {
                break;
            };
            let boundary_offset = clusters[boundary].text.start as usize;
            if boundary_offset <= range.start {
                break;
            }
            let width: f32 = clusters[start..boundary]
                .iter()
                .map(|cluster| cluster.advance)
                .sum();
            if width + self.hyphen_width(boundary, location.hyphen) <= available_width + WIDTH_EPSILON
            {
                return Some(BrokenLine {
                    content: start..boundary,
                    whitespace_end: boundary,
                    width,
                    hyphen: Some(location.hyphen),
                    is_emergency_break: false,
                });
            }
            range = range.start..boundary_offset;
        }
        None
    }

    /// Width of `hyphen` styled like the cluster before `break_index`.
    fn hyphen_width(&self, break_index: usize, hyphen: char) -> f32 {
        let cluster = &self.storage.clusters[break_index - 1];
        measure_char(
            self.shaper,
            hyphen,
            self.storage.cluster_style(cluster),
            Direction::from_level(cluster.level),
        )
    }
}

/// Advance of a single character shaped with `attributes`.
pub(crate) fn measure_char(
    shaper: &dyn Shaper,
    c: char,
    attributes: &TextAttributes,
    direction: Direction,
) -> f32 {
    let mut buffer = [0_u16; 2];
    let text = c.encode_utf16(&mut buffer);
    shaper
        .shape(text, attributes, direction)
        .glyphs
        .iter()
        .map(|glyph| glyph.advance)
        .sum()
}

/// Width of the clusters in `range`, excluding trailing whitespace.
pub(crate) fn content_width(clusters: &[ClusterData]) -> f32 {
    let content_len = clusters
        .iter()
        .rposition(|cluster| !cluster.is_whitespace())
        .map_or(0, |index| index + 1);
    clusters[..content_len]
        .iter()
        .map(|cluster| cluster.advance)
        .sum()
}

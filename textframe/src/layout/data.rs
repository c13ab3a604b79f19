// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;
use std::sync::Arc;

use crate::analysis::{BidiLevel, BreakKind};
use crate::shape::RunMetrics;
use crate::util::to_u32;
use crate::{StyledString, TextAttributes};

/// Which storage a cluster lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Pool {
    /// Clusters of the original string, shared by every layout pass.
    Original,
    /// Clusters of truncation tokens and inserted hyphens of one layout pass.
    Inserted,
}

/// The text a cluster was shaped from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ClusterSource {
    Original,
    /// A truncation token, identified by its slot in [`LayoutOutput::tokens`].
    Token(u32),
    /// An inserted hyphen.
    Hyphen,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub(crate) struct ClusterFlags: u8 {
        const WHITESPACE = 1 << 0;
        const LINE_SEPARATOR = 1 << 1;
        const ATTACHMENT = 1 << 2;
        /// One glyph spans several grapheme clusters.
        const LIGATURE = 1 << 3;
    }
}

/// The smallest unit of line breaking and hit testing: one or more grapheme clusters with one
/// advance.
#[derive(Clone, Debug)]
pub(crate) struct ClusterData {
    pub(crate) source: ClusterSource,
    /// Range in the source string.
    pub(crate) text: Range<u32>,
    pub(crate) glyphs: Range<u32>,
    pub(crate) run: u32,
    pub(crate) advance: f32,
    pub(crate) level: BidiLevel,
    /// The break opportunity before this cluster.
    pub(crate) break_before: BreakKind,
    pub(crate) flags: ClusterFlags,
    /// Number of grapheme clusters, more than one for ligatures.
    pub(crate) graphemes: u16,
}

impl ClusterData {
    pub(crate) fn is_whitespace(&self) -> bool {
        self.flags.contains(ClusterFlags::WHITESPACE)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct GlyphData {
    pub(crate) id: u32,
    pub(crate) advance: f32,
    pub(crate) x_offset: f32,
    pub(crate) y_offset: f32,
}

/// A run of clusters shaped together.
#[derive(Clone, Debug)]
pub(crate) struct RunData {
    pub(crate) style: u32,
    pub(crate) metrics: RunMetrics,
}

/// Shaped clusters with their glyphs, runs and styles.
#[derive(Clone, Debug, Default)]
pub(crate) struct TextStorage {
    pub(crate) clusters: Vec<ClusterData>,
    pub(crate) glyphs: Vec<GlyphData>,
    pub(crate) runs: Vec<RunData>,
    pub(crate) styles: Vec<Arc<TextAttributes>>,
}

impl TextStorage {
    pub(crate) fn style_index(&mut self, attributes: &Arc<TextAttributes>) -> u32 {
        // Attribute runs are few, a linear scan over pointers beats hashing the attributes.
        if let Some(index) = self
            .styles
            .iter()
            .rposition(|style| Arc::ptr_eq(style, attributes))
        {
            return to_u32(index);
        }
        self.styles.push(attributes.clone());
        to_u32(self.styles.len() - 1)
    }

    pub(crate) fn cluster_style(&self, cluster: &ClusterData) -> &Arc<TextAttributes> {
        &self.styles[self.runs[cluster.run as usize].style as usize]
    }

    pub(crate) fn cluster_metrics(&self, cluster: &ClusterData) -> &RunMetrics {
        &self.runs[cluster.run as usize].metrics
    }
}

/// Horizontal alignment after resolving natural alignment and writing direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResolvedAlignment {
    /// Lines start at the left edge.
    #[default]
    Left,
    /// Lines are centered.
    Center,
    /// Lines end at the right edge.
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ItemKind {
    Text,
    Token,
    Hyphen,
}

/// A visual run of clusters within a line.
#[derive(Clone, Debug)]
pub(crate) struct LineItemData {
    pub(crate) kind: ItemKind,
    pub(crate) pool: Pool,
    /// Clusters in logical order.
    pub(crate) clusters: Range<u32>,
    pub(crate) level: BidiLevel,
    /// Left edge relative to the line origin.
    pub(crate) x: f32,
    pub(crate) advance: f32,
    /// The paragraph owning the text of the item.
    pub(crate) paragraph: u32,
    pub(crate) is_trailing_whitespace: bool,
}

impl LineItemData {
    pub(crate) fn is_rtl(&self) -> bool {
        self.level & 1 != 0
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub(crate) struct LineFlags: u8 {
        const FIRST_IN_PARAGRAPH = 1 << 0;
        const LAST_IN_PARAGRAPH = 1 << 1;
        const FOLLOWED_BY_TERMINATOR = 1 << 2;
        const HAS_TOKEN = 1 << 3;
        const HAS_HYPHEN = 1 << 4;
        const IS_RTL = 1 << 5;
        /// The line was broken inside a word without a hyphen.
        const EMERGENCY_BREAK = 1 << 6;
    }
}

/// Vertical metrics of a line in layout units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct LineHeights {
    pub(crate) ascent: f32,
    pub(crate) descent: f32,
    pub(crate) leading: f32,
    pub(crate) cap_height: f32,
    pub(crate) x_height: f32,
    /// Height above the baseline including line spacing.
    pub(crate) above: f32,
    /// Height below the baseline including line spacing.
    pub(crate) below: f32,
    /// Height below the baseline with the minimal spacing of the layout mode.
    pub(crate) below_minimal: f32,
    /// Spacing added above the first line of a paragraph for the minimum baseline distance.
    pub(crate) extra_above: f32,
    /// Spacing added below the last line of a paragraph for the minimum baseline distance.
    pub(crate) extra_below: f32,
}

#[derive(Clone, Debug)]
pub(crate) struct LineData {
    pub(crate) paragraph: u32,
    /// Content range in the original string, including excised text, excluding trailing
    /// whitespace.
    pub(crate) original: Range<u32>,
    /// End of the line's trailing whitespace in the original string.
    pub(crate) original_end_with_whitespace: u32,
    pub(crate) excised: Range<u32>,
    pub(crate) truncated: Range<u32>,
    pub(crate) trailing_whitespace_len: u32,
    pub(crate) items: Range<u32>,
    pub(crate) origin_x: f64,
    pub(crate) baseline: f64,
    pub(crate) width: f32,
    pub(crate) heights: LineHeights,
    pub(crate) left_part_width: f32,
    pub(crate) token_width: f32,
    pub(crate) hyphen: Option<char>,
    pub(crate) hyphen_width: f32,
    pub(crate) flags: LineFlags,
}

#[derive(Clone, Debug)]
pub(crate) struct ParagraphData {
    /// Range in the original string, including the terminator.
    pub(crate) range: Range<u32>,
    pub(crate) terminator_len: u32,
    pub(crate) truncated: Range<u32>,
    pub(crate) excised: Range<u32>,
    pub(crate) excision_continues: bool,
    pub(crate) token: Option<u32>,
    pub(crate) token_len: u32,
    pub(crate) base_level: BidiLevel,
    pub(crate) alignment: ResolvedAlignment,
    pub(crate) lines: Range<u32>,
    pub(crate) initial_lines_end: u32,
    pub(crate) initial_indents: (f32, f32),
    pub(crate) indents: (f32, f32),
}

impl ParagraphData {
    /// Truncated string offset of an original string offset within this paragraph.
    ///
    /// Offsets inside the excised range map to the end of the token.
    pub(crate) fn truncated_offset(&self, index: u32) -> u32 {
        let index = index.clamp(self.range.start, self.range.end);
        if index <= self.excised.start || (self.excised.is_empty() && self.token_len == 0) {
            return self.truncated.start + (index - self.range.start);
        }
        let head = self.excised.start - self.range.start;
        self.truncated.start + head + self.token_len + index.saturating_sub(self.excised.end)
    }

    /// Truncated string range of the token.
    pub(crate) fn token_range(&self) -> Range<u32> {
        let start = self.truncated.start + (self.excised.start - self.range.start);
        start..start + self.token_len
    }
}

/// A truncation token used in a layout.
#[derive(Clone, Debug)]
pub(crate) struct TokenData {
    pub(crate) string: Arc<StyledString>,
    pub(crate) paragraph: u32,
}

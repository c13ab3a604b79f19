// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text frames.

pub(crate) mod data;
mod draw;
mod geometry;
pub(crate) mod hyphenation;
mod index;
pub(crate) mod layouter;
mod line;
pub(crate) mod line_break;
pub(crate) mod metrics;
mod paragraph;
pub(crate) mod prepare;
mod query;
pub(crate) mod scaling;
pub(crate) mod truncation;
mod with_origin;

use core::ops::Range;
use std::sync::{Arc, OnceLock};

use peniko::kurbo::Size;

use crate::cancel::{self, CancellationFlag};
use crate::shape::Shaper;
use crate::style::TextFlags;
use crate::util::{clamp_range, non_negative_f64, usize_range};
use crate::{
    DisplayScale, StyledString, StyledStringBuilder, TextAttributes, TextFrameOptions,
    TextLayoutMode,
};

use self::data::TextStorage;
use self::layouter::{LayoutFlags, LayoutInput, LayoutOutput};

pub use data::ResolvedAlignment;
pub use draw::{DrawOptions, DrawSink, GlyphPaint, GlyphRun, HighlightStyle, PositionedGlyph};
pub use geometry::{ConsistentAlignment, LayoutInfo};
pub use index::TextFrameIndex;
pub use line::Line;
pub use paragraph::Paragraph;
pub use query::{GraphemeClusterRange, TextLink, TextRect, TextRectArray};
pub use with_origin::TextFrameWithOrigin;

bitflags::bitflags! {
    /// Summary of a text frame.
    ///
    /// The low bits mirror [`TextFlags`] for the laid out text and truncation tokens.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TextFrameFlags: u32 {
        /// Some text has a link.
        const HAS_LINK = 1 << 0;
        /// Some text has a background.
        const HAS_BACKGROUND = 1 << 1;
        /// Some text has a shadow.
        const HAS_SHADOW = 1 << 2;
        /// Some text is underlined.
        const HAS_UNDERLINE = 1 << 3;
        /// Some text is struck through.
        const HAS_STRIKETHROUGH = 1 << 4;
        /// Some text is stroked.
        const HAS_STROKE = 1 << 5;
        /// The text contains attachments.
        const HAS_ATTACHMENT = 1 << 6;
        /// Some text has a baseline offset.
        const HAS_BASELINE_OFFSET = 1 << 7;
        /// Some colors are not gray.
        const MAY_NOT_BE_GRAYSCALE = 1 << 8;
        /// Some attachment uses extended range colors.
        const USES_EXTENDED_COLOR = 1 << 9;
        /// Some text was removed by truncation.
        const IS_TRUNCATED = 1 << 16;
        /// The text was scaled down to fit.
        const IS_SCALED = 1 << 17;
        /// The text was cut off after the last line without a token.
        const IS_CLIPPED = 1 << 18;
        /// Some line ends with an inserted hyphen.
        const HAS_HYPHEN = 1 << 19;
    }
}

impl From<TextFlags> for TextFrameFlags {
    fn from(flags: TextFlags) -> Self {
        Self::from_bits_truncate(u32::from(flags.bits()))
    }
}

/// An immutable layout of a range of a [`StyledString`] for a given size.
///
/// Geometry is reported in the coordinate system of the frame, with the origin at the top left
/// corner and y pointing down. Values are scaled by the [text scale
/// factor](Self::text_scale_factor). Baselines are rounded up to the display scale if there is one.
#[derive(Debug)]
pub struct TextFrame {
    pub(crate) string: Arc<StyledString>,
    pub(crate) size: Size,
    pub(crate) display_scale: Option<DisplayScale>,
    pub(crate) layout_mode: TextLayoutMode,
    pub(crate) scale: f64,
    pub(crate) flags: TextFrameFlags,
    /// Clusters of the original string.
    pub(crate) storage: TextStorage,
    pub(crate) layout: LayoutOutput,
    truncated_string: OnceLock<StyledString>,
}

impl TextFrame {
    /// Lays out `range` of `string` for a frame of the given size.
    ///
    /// Negative or NaN sizes are treated as zero; an infinite width or height means no limit. A
    /// display scale that is not finite and positive is ignored.
    ///
    /// Returns `None` only if `cancel` was set before layout completed.
    pub fn new(
        string: Arc<StyledString>,
        range: Range<usize>,
        size: Size,
        display_scale: Option<f64>,
        options: &TextFrameOptions,
        shaper: &dyn Shaper,
        cancel: Option<&CancellationFlag>,
    ) -> Option<Self> {
        let range = clamp_range(range, string.len());
        let size = Size::new(non_negative_f64(size.width), non_negative_f64(size.height));
        let display_scale = display_scale.and_then(DisplayScale::new);
        let prepared = prepare::prepare(&string, range, shaper, options.default_alignment);
        if cancel::is_cancelled(cancel) {
            return None;
        }
        let input = LayoutInput {
            string: &string,
            prepared: &prepared,
            options,
            shaper,
            cancel,
        };
        let scaled = scaling::layout_with_scaling(&input, size)?;
        let layout = scaled.output;

        let mut flags = TextFrameFlags::from(prepared.flags);
        for token in &layout.tokens {
            for run in token.string.runs() {
                flags |= TextFrameFlags::from(run.attributes.flags());
            }
        }
        flags.set(
            TextFrameFlags::IS_TRUNCATED,
            layout.flags.contains(LayoutFlags::TRUNCATED),
        );
        flags.set(
            TextFrameFlags::IS_CLIPPED,
            layout.flags.contains(LayoutFlags::CLIPPED),
        );
        flags.set(
            TextFrameFlags::HAS_HYPHEN,
            layout.flags.contains(LayoutFlags::HAS_HYPHEN),
        );
        flags.set(TextFrameFlags::IS_SCALED, scaled.scale < 1.);
        log::debug!(
            "Laid out {:?} in {}x{}: {} paragraphs, {} lines, scale {}, {:?}",
            layout.range,
            size.width,
            size.height,
            layout.paragraphs.len(),
            layout.lines.len(),
            scaled.scale,
            flags
        );
        Some(Self {
            string,
            size,
            display_scale,
            layout_mode: options.layout_mode,
            scale: scaled.scale,
            flags,
            storage: prepared.storage,
            layout,
            truncated_string: OnceLock::new(),
        })
    }

    /// The string the frame was created from.
    pub fn original_string(&self) -> &Arc<StyledString> {
        &self.string
    }

    /// The laid out range of the original string.
    ///
    /// This is the range passed to [`new`](Self::new), except when the last line truncation mode
    /// is [`Clip`](crate::LastLineTruncationMode::Clip) and the text did not fit, in which case
    /// the range ends after the last line.
    pub fn range_in_original_string(&self) -> Range<usize> {
        usize_range(&self.layout.range)
    }

    /// Returns `true` if the frame covers the whole original string.
    pub fn range_in_original_string_is_full_string(&self) -> bool {
        self.layout.range.start == 0 && self.layout.range.end as usize == self.string.len()
    }

    /// The size passed to [`new`](Self::new), after clamping.
    pub fn size(&self) -> Size {
        self.size
    }

    /// The display scale passed to [`new`](Self::new), if it was valid.
    pub fn display_scale(&self) -> Option<DisplayScale> {
        self.display_scale
    }

    /// The factor by which the text was scaled down to fit, in `(0, 1]`.
    pub fn text_scale_factor(&self) -> f64 {
        self.scale
    }

    /// The line height model the frame was laid out with.
    pub fn layout_mode(&self) -> TextLayoutMode {
        self.layout_mode
    }

    /// Summary flags.
    pub fn flags(&self) -> TextFrameFlags {
        self.flags
    }

    /// The length of the [truncated string](Self::truncated_string) in UTF-16 code units.
    pub fn truncated_string_len(&self) -> usize {
        self.layout.truncated_len as usize
    }

    /// The laid out text with truncation tokens replacing the excised text.
    ///
    /// Inserted hyphens are not part of the string. The string keeps the original attributes, it
    /// is not scaled. Computed on first use.
    pub fn truncated_string(&self) -> &StyledString {
        self.truncated_string
            .get_or_init(|| self.build_truncated_string())
    }

    /// The attributes of the text at `index`, or of the hyphen if `index` is a hyphen position.
    pub fn attributes_at(&self, index: TextFrameIndex) -> Option<&Arc<TextAttributes>> {
        let offset = index.index_in_truncated_string();
        self.truncated_string()
            .attributes_at(offset.min(self.truncated_string_len().saturating_sub(1)))
    }

    /// The number of paragraphs.
    pub fn paragraph_count(&self) -> usize {
        self.layout.paragraphs.len()
    }

    /// Returns the paragraph at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn paragraph(&self, index: usize) -> Paragraph<'_> {
        assert!(
            index < self.layout.paragraphs.len(),
            "paragraph index {index} out of bounds"
        );
        Paragraph::new(self, index)
    }

    /// Returns an iterator over the paragraphs.
    pub fn paragraphs(&self) -> impl ExactSizeIterator<Item = Paragraph<'_>> + Clone + '_ {
        (0..self.layout.paragraphs.len()).map(move |index| Paragraph::new(self, index))
    }

    /// The number of lines.
    pub fn line_count(&self) -> usize {
        self.layout.lines.len()
    }

    /// Returns the line at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn line(&self, index: usize) -> Line<'_> {
        assert!(
            index < self.layout.lines.len(),
            "line index {index} out of bounds"
        );
        Line::new(self, index)
    }

    /// Returns an iterator over the lines.
    pub fn lines(&self) -> impl ExactSizeIterator<Item = Line<'_>> + Clone + '_ {
        (0..self.layout.lines.len()).map(move |index| Line::new(self, index))
    }

    /// The alignment shared by all paragraphs.
    pub fn consistent_alignment(&self) -> ConsistentAlignment {
        let mut alignments = self
            .layout
            .paragraphs
            .iter()
            .map(|paragraph| paragraph.alignment);
        let Some(first) = alignments.next() else {
            return ConsistentAlignment::Left;
        };
        if alignments.any(|alignment| alignment != first) {
            return ConsistentAlignment::None;
        }
        match first {
            ResolvedAlignment::Left => ConsistentAlignment::Left,
            ResolvedAlignment::Center => ConsistentAlignment::Center,
            ResolvedAlignment::Right => ConsistentAlignment::Right,
        }
    }

    fn build_truncated_string(&self) -> StyledString {
        let mut builder = StyledStringBuilder::new();
        for paragraph in &self.layout.paragraphs {
            self.push_original(&mut builder, paragraph.range.start..paragraph.excised.start);
            if let Some(token) = paragraph.token {
                builder.push_styled(&self.layout.tokens[token as usize].string);
            }
            self.push_original(&mut builder, paragraph.excised.end..paragraph.range.end);
        }
        let string = builder.build();
        debug_assert_eq!(
            string.len(),
            self.layout.truncated_len as usize,
            "truncated string length does not match the layout"
        );
        string
    }

    fn push_original(&self, builder: &mut StyledStringBuilder, range: Range<u32>) {
        let text = self.string.code_units();
        for run in self.string.runs_in(usize_range(&range)) {
            builder.push_utf16(&text[run.range], run.attributes);
        }
    }
}

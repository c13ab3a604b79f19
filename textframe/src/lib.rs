// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Styled text layout into immutable text frames.
//!
//! A [`TextFrame`] is the layout of a range of a [`StyledString`] for a given size. Construction
//! breaks the text into lines, hyphenates words when a paragraph asks for it, truncates the text
//! when it does not fit the line limit or the frame height, and scales the text down when the
//! options allow it. A finished frame is immutable and answers geometric queries: line and
//! paragraph metrics, rectangles for index ranges, hit testing, links and drawing into a
//! [`DrawSink`].
//!
//! Shaping is pluggable through the [`Shaper`] trait. [`SimpleShaper`] is a deterministic shaper
//! with fixed advances, useful for tests and for measuring text without fonts.
//!
//! ```
//! use std::sync::Arc;
//!
//! use textframe::peniko::kurbo::Size;
//! use textframe::{Font, SimpleShaper, StyledString, TextAttributes, TextFrame, TextFrameOptions};
//!
//! let string = Arc::new(StyledString::new(
//!     "Hello world",
//!     TextAttributes::new(Font::new("sans-serif", 10.)),
//! ));
//! let range = 0..string.len();
//! let frame = TextFrame::new(
//!     string,
//!     range,
//!     Size::new(30., f64::INFINITY),
//!     None,
//!     &TextFrameOptions::default(),
//!     &SimpleShaper::new(),
//!     None,
//! )
//! .unwrap();
//! assert_eq!(frame.line_count(), 2);
//! ```

mod analysis;
mod cancel;
mod options;
mod prerender;
mod scope;
mod shape;
mod string;
mod util;

pub mod layout;
pub mod style;

pub use peniko;

pub use analysis::{BreakKind, Direction};
pub use cancel::CancellationFlag;
pub use layout::{
    ConsistentAlignment, DrawOptions, DrawSink, GlyphPaint, GlyphRun, GraphemeClusterRange,
    HighlightStyle, LayoutInfo, Line, Paragraph, PositionedGlyph, ResolvedAlignment, TextFrame,
    TextFrameFlags, TextFrameIndex, TextFrameWithOrigin, TextLink, TextRect, TextRectArray,
};
pub use options::{
    BaselineAdjustment, DEFAULT_TEXT_SCALE_FACTOR_STEP_SIZE, DefaultTextAlignment,
    HyphenationLocation, HyphenationLocationFinder, LastLineTruncationMode, TextFrameOptions,
    TextFrameOptionsBuilder, TextLayoutMode, TruncationRangeAdjuster,
};
pub use prerender::{Prerender, PrerenderInput, Prerendered};
pub use scope::TruncationScope;
pub use shape::{Glyph, RunMetrics, ShapedRun, Shaper, SimpleShaper};
pub use string::{AttributeRun, OBJECT_REPLACEMENT_CHARACTER, StyledString, StyledStringBuilder};
pub use style::{
    AttachmentColorInfo, FirstLineOffset, Font, FontMetrics, InitialLines, ParagraphStyle,
    TextAlignment, TextAttachment, TextAttributes,
};
pub use util::DisplayScale;

#[cfg(test)]
mod tests;

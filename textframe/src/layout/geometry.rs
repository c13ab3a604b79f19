// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame level geometry.

use core::ops::Range;

use peniko::Color;
use peniko::kurbo::{Affine, Point, Rect, Size};

use super::data::LineData;
use super::draw::{DrawSink, GlyphPaint, GlyphRun};
use super::{TextFrame, TextFrameFlags, TextFrameIndex};
use crate::util::ceil_to_scale;
use crate::{DisplayScale, TextAttachment, TextLayoutMode};

/// Alignment shared by all paragraphs of a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConsistentAlignment {
    /// The paragraphs have different alignments.
    None,
    /// All paragraphs are left aligned. Also used for frames without paragraphs.
    #[default]
    Left,
    /// All paragraphs are centered.
    Center,
    /// All paragraphs are right aligned.
    Right,
}

/// A snapshot of the frame level metrics for a frame placed at some origin.
///
/// Only `min_x`, `max_x`, `first_baseline` and `last_baseline` depend on the origin, and only the
/// baselines depend on the display scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutInfo {
    /// The number of lines.
    pub line_count: usize,
    /// Summary flags.
    pub flags: TextFrameFlags,
    /// The line height model.
    pub layout_mode: TextLayoutMode,
    /// The alignment shared by all paragraphs.
    pub consistent_alignment: ConsistentAlignment,
    /// The minimum x of the layout bounds of all lines.
    pub min_x: f64,
    /// The maximum x of the layout bounds of all lines, where a line ends at its origin plus its
    /// width.
    pub max_x: f64,
    /// The y of the first baseline.
    pub first_baseline: f64,
    /// The y of the last baseline.
    pub last_baseline: f64,
    /// The distance from the first baseline to the baseline of a hypothetical next line with the
    /// same metrics in the same paragraph.
    pub first_line_height: f64,
    /// The part of the first line's height above the baseline.
    pub first_line_height_above_baseline: f64,
    /// The distance from the last baseline to the baseline of a hypothetical next line with the
    /// same metrics in the same paragraph.
    pub last_line_height: f64,
    /// The part of the last line's height below the baseline.
    pub last_line_height_below_baseline: f64,
    /// The part of the last line's height below the baseline, without line spacing. This is the
    /// height used for deciding whether a line fits the frame.
    pub last_line_height_below_baseline_without_spacing: f64,
    /// The part of the last line's height below the baseline, with only the minimal spacing of
    /// the layout mode.
    pub last_line_height_below_baseline_with_minimal_spacing: f64,
    /// The size the frame was created with.
    pub size: Size,
    /// The factor by which the text was scaled down.
    pub text_scale_factor: f64,
}

impl LayoutInfo {
    /// The union of the layout bounds of all lines, including line spacing and paragraph indents.
    pub fn layout_bounds(&self) -> Rect {
        Rect::new(
            self.min_x,
            self.first_baseline - self.first_line_height_above_baseline,
            self.max_x,
            self.last_baseline + self.last_line_height_below_baseline,
        )
    }
}

impl TextFrame {
    /// The frame metrics for a frame placed at `frame_origin`, with baselines rounded up to
    /// `display_scale`.
    pub fn layout_info(
        &self,
        frame_origin: Point,
        display_scale: Option<DisplayScale>,
    ) -> LayoutInfo {
        let lines = &self.layout.lines;
        let scaled = |value: f32| self.scale * f64::from(value);
        let (min_x, max_x) = if lines.is_empty() {
            (frame_origin.x, frame_origin.x)
        } else {
            lines.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), line| {
                let x = self.line_x(line, frame_origin.x);
                (min.min(x), max.max(x + scaled(line.width)))
            })
        };
        let baseline = |line: Option<&LineData>| {
            line.map_or(frame_origin.y, |line| {
                self.line_baseline(line, frame_origin.y, display_scale)
            })
        };
        let first = lines.first();
        let last = lines.last();
        let height = |line: Option<&LineData>| {
            line.map_or(0., |line| scaled(line.heights.above + line.heights.below))
        };
        LayoutInfo {
            line_count: lines.len(),
            flags: self.flags,
            layout_mode: self.layout_mode,
            consistent_alignment: self.consistent_alignment(),
            min_x,
            max_x,
            first_baseline: baseline(first),
            last_baseline: baseline(last),
            first_line_height: height(first),
            first_line_height_above_baseline: first.map_or(0., |line| {
                scaled(line.heights.above + line.heights.extra_above)
            }),
            last_line_height: height(last),
            last_line_height_below_baseline: last.map_or(0., |line| {
                scaled(line.heights.below + line.heights.extra_below)
            }),
            last_line_height_below_baseline_without_spacing: last
                .map_or(0., |line| scaled(line.heights.descent)),
            last_line_height_below_baseline_with_minimal_spacing: last.map_or(0., |line| {
                scaled(line.heights.below_minimal + line.heights.extra_below)
            }),
            size: self.size,
            text_scale_factor: self.scale,
        }
    }

    /// The union of the layout bounds of all lines for a frame placed at `frame_origin`.
    ///
    /// The display scale only affects the position of the baselines; the rectangle itself is not
    /// rounded.
    pub fn layout_bounds(&self, frame_origin: Point, display_scale: Option<DisplayScale>) -> Rect {
        self.layout_info(frame_origin, display_scale)
            .layout_bounds()
    }

    /// The y of the first baseline for a frame placed at `frame_origin_y`.
    pub fn first_baseline(&self, frame_origin_y: f64, display_scale: Option<DisplayScale>) -> f64 {
        self.layout.lines.first().map_or(frame_origin_y, |line| {
            self.line_baseline(line, frame_origin_y, display_scale)
        })
    }

    /// The y of the last baseline for a frame placed at `frame_origin_y`.
    pub fn last_baseline(&self, frame_origin_y: f64, display_scale: Option<DisplayScale>) -> f64 {
        self.layout.lines.last().map_or(frame_origin_y, |line| {
            self.line_baseline(line, frame_origin_y, display_scale)
        })
    }

    /// An approximation of the bounds of everything [`draw`](Self::draw) paints for `range`.
    ///
    /// Glyphs are approximated by their advance and the ascent and descent of their run.
    pub fn image_bounds(
        &self,
        range: Option<Range<TextFrameIndex>>,
        frame_origin: Point,
        display_scale: Option<DisplayScale>,
    ) -> Rect {
        let mut sink = BoundsSink { bounds: None };
        self.draw_at(
            &mut sink,
            range,
            frame_origin,
            Affine::IDENTITY,
            display_scale,
            None,
            None,
        );
        sink.bounds
            .unwrap_or_else(|| Rect::from_origin_size(frame_origin, Size::ZERO))
    }

    /// The x of the line origin for a frame placed at `frame_origin_x`.
    pub(crate) fn line_x(&self, line: &LineData, frame_origin_x: f64) -> f64 {
        frame_origin_x + self.scale * line.origin_x
    }

    /// The y of the baseline for a frame placed at `frame_origin_y`.
    pub(crate) fn line_baseline(
        &self,
        line: &LineData,
        frame_origin_y: f64,
        display_scale: Option<DisplayScale>,
    ) -> f64 {
        ceil_to_scale(frame_origin_y + self.scale * line.baseline, display_scale)
    }
}

/// Collects the bounds of everything drawn.
struct BoundsSink {
    bounds: Option<Rect>,
}

impl BoundsSink {
    fn add(&mut self, transform: Affine, rect: Rect) {
        let rect = transform.transform_rect_bbox(rect);
        self.bounds = Some(self.bounds.map_or(rect, |bounds| bounds.union(rect)));
    }
}

impl DrawSink for BoundsSink {
    fn fill_rect(&mut self, transform: Affine, rect: Rect, _color: Color) {
        self.add(transform, rect);
    }

    fn draw_glyphs(&mut self, transform: Affine, run: &GlyphRun<'_>) {
        let outset = match run.paint {
            GlyphPaint::Fill => 0.,
            GlyphPaint::Stroke { width } => f64::from(width) / 2.,
            GlyphPaint::Shadow { blur_radius } => f64::from(blur_radius),
        };
        for glyph in run.glyphs {
            let rect = Rect::new(
                glyph.x,
                glyph.y - run.ascent,
                glyph.x + glyph.advance,
                glyph.y + run.descent,
            );
            self.add(transform, rect.inflate(outset, outset));
        }
    }

    fn draw_attachment(
        &mut self,
        transform: Affine,
        attachment: &TextAttachment,
        origin: Point,
        scale: f64,
    ) {
        let bounds = attachment.image_bounds;
        let rect = Rect::new(
            origin.x + scale * bounds.x0,
            origin.y + scale * bounds.y0,
            origin.x + scale * bounds.x1,
            origin.y + scale * bounds.y1,
        );
        self.add(transform, rect);
    }
}

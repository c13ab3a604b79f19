// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing a frame into a [`DrawSink`].

use core::ops::Range;
use std::sync::Arc;

use peniko::Color;
use peniko::kurbo::{Affine, Point, Rect, Vec2};

use super::data::{ClusterFlags, GlyphData, LineItemData};
use super::query::VisualCluster;
use super::{TextFrame, TextFrameIndex};
use crate::cancel::{self, CancellationFlag};
use crate::shape::RunMetrics;
use crate::style::Decoration;
use crate::{DisplayScale, TextAttachment, TextAttributes};

/// A destination for the primitives of a drawn frame.
///
/// Coordinates passed to the sink are in the frame's coordinate space, y-down. The `transform`
/// maps them to the destination.
pub trait DrawSink {
    /// Fills a rectangle. Used for backgrounds, highlights and decorations.
    fn fill_rect(&mut self, transform: Affine, rect: Rect, color: Color);

    /// Draws a run of glyphs.
    fn draw_glyphs(&mut self, transform: Affine, run: &GlyphRun<'_>);

    /// Draws an attachment whose origin on the baseline is at `origin`, scaled by `scale`.
    fn draw_attachment(
        &mut self,
        transform: Affine,
        attachment: &TextAttachment,
        origin: Point,
        scale: f64,
    );
}

/// A glyph with its position on the baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionedGlyph {
    /// Glyph identifier in the font.
    pub id: u32,
    /// The x of the glyph origin.
    pub x: f64,
    /// The y of the glyph origin.
    pub y: f64,
    /// The horizontal advance.
    pub advance: f64,
}

/// How the glyphs of a [`GlyphRun`] are painted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GlyphPaint {
    /// Fill the glyph outlines.
    Fill,
    /// Stroke the glyph outlines.
    Stroke {
        /// The stroke width.
        width: f32,
    },
    /// Fill the glyph outlines blurred, as a shadow.
    Shadow {
        /// The blur radius.
        blur_radius: f32,
    },
}

/// A run of glyphs with uniform attributes.
#[derive(Clone, Copy, Debug)]
pub struct GlyphRun<'a> {
    /// The attributes of the text.
    pub attributes: &'a TextAttributes,
    /// The font size after scaling.
    pub font_size: f64,
    /// The glyphs in visual order.
    pub glyphs: &'a [PositionedGlyph],
    /// The paint color.
    pub color: Color,
    /// How the glyphs are painted.
    pub paint: GlyphPaint,
    /// The ascent of the run after scaling.
    pub ascent: f64,
    /// The descent of the run after scaling.
    pub descent: f64,
}

/// Overrides for highlighted text.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HighlightStyle {
    /// Background filled behind the highlighted range.
    pub background: Option<Color>,
    /// Color replacing the text color of the highlighted range.
    pub text_color: Option<Color>,
}

/// Options for [`TextFrame::draw`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawOptions {
    /// Round baselines up to the frame's display scale.
    pub pixel_align_baselines: bool,
    /// A range drawn with a highlight style.
    pub highlight: Option<(Range<TextFrameIndex>, HighlightStyle)>,
}

/// Consecutive clusters of one item and run that are drawn together.
struct Piece<'a> {
    attributes: &'a TextAttributes,
    metrics: RunMetrics,
    highlighted: bool,
    is_trailing_whitespace: bool,
    glyphs: Vec<PositionedGlyph>,
    left: f64,
    right: f64,
}

struct AttachmentPiece<'a> {
    attachment: &'a Arc<TextAttachment>,
    origin: Point,
}

impl TextFrame {
    /// Draws the clusters overlapping `range`, or the whole frame, into `sink`.
    ///
    /// The frame origin is mapped by `transform`. Returns `false` if drawing was cancelled.
    pub fn draw(
        &self,
        sink: &mut dyn DrawSink,
        range: Option<Range<TextFrameIndex>>,
        transform: Affine,
        options: &DrawOptions,
        cancel: Option<&CancellationFlag>,
    ) -> bool {
        let display_scale = if options.pixel_align_baselines {
            self.display_scale
        } else {
            None
        };
        self.draw_at(
            sink,
            range,
            Point::ZERO,
            transform,
            display_scale,
            options.highlight.as_ref(),
            cancel,
        )
    }

    /// Draws in passes per line: backgrounds, highlight, shadows, glyphs, attachments and
    /// decorations.
    pub(crate) fn draw_at(
        &self,
        sink: &mut dyn DrawSink,
        range: Option<Range<TextFrameIndex>>,
        frame_origin: Point,
        transform: Affine,
        display_scale: Option<DisplayScale>,
        highlight: Option<&(Range<TextFrameIndex>, HighlightStyle)>,
        cancel: Option<&CancellationFlag>,
    ) -> bool {
        let range = range.unwrap_or_else(|| self.indices());
        let highlight_rects = highlight.and_then(|(range, style)| {
            let color = style.background?;
            Some((self.rects(range.clone(), frame_origin, display_scale), color))
        });
        for (line_index, line) in self.layout.lines.iter().enumerate() {
            if cancel::is_cancelled(cancel) {
                log::debug!("drawing cancelled at line {line_index}");
                return false;
            }
            let line_start = TextFrameIndex::new(line.truncated.start, false, line_index);
            let line_end = TextFrameIndex::new(
                line.truncated.end + line.trailing_whitespace_len,
                false,
                line_index,
            );
            if !(range.start < line_end && line_start < range.end) {
                continue;
            }
            let origin = Point::new(
                self.line_x(line, frame_origin.x),
                self.line_baseline(line, frame_origin.y, display_scale),
            );
            let (pieces, attachments) =
                self.line_pieces(line_index, origin, &range, highlight.map(|h| &h.0));

            for piece in &pieces {
                if let Some(background) = &piece.attributes.background {
                    let outset = f64::from(background.outset) * self.scale;
                    let rect = Rect::new(
                        piece.left,
                        origin.y - self.scale * f64::from(piece.metrics.ascent),
                        piece.right,
                        origin.y + self.scale * f64::from(piece.metrics.descent),
                    );
                    sink.fill_rect(transform, rect.inflate(outset, outset), background.color);
                }
            }
            if let Some((rects, color)) = &highlight_rects {
                for rect in rects.rects().iter().filter(|r| r.line_index == line_index) {
                    sink.fill_rect(transform, rect.rect, *color);
                }
            }
            for piece in &pieces {
                let Some(shadow) = &piece.attributes.shadow else {
                    continue;
                };
                let offset = shadow.offset * self.scale;
                let glyphs = offset_glyphs(&piece.glyphs, offset);
                sink.draw_glyphs(
                    transform,
                    &self.glyph_run(
                        piece,
                        &glyphs,
                        shadow.color,
                        GlyphPaint::Shadow {
                            blur_radius: (f64::from(shadow.blur_radius) * self.scale) as f32,
                        },
                    ),
                );
            }
            for piece in &pieces {
                let color = text_color(piece, highlight);
                match &piece.attributes.stroke {
                    Some(stroke) => {
                        if stroke.fill {
                            sink.draw_glyphs(
                                transform,
                                &self.glyph_run(piece, &piece.glyphs, color, GlyphPaint::Fill),
                            );
                        }
                        let paint = GlyphPaint::Stroke {
                            width: (f64::from(stroke.width) * self.scale) as f32,
                        };
                        let color = stroke.color.unwrap_or(color);
                        sink.draw_glyphs(
                            transform,
                            &self.glyph_run(piece, &piece.glyphs, color, paint),
                        );
                    }
                    None => sink.draw_glyphs(
                        transform,
                        &self.glyph_run(piece, &piece.glyphs, color, GlyphPaint::Fill),
                    ),
                }
            }
            for attachment in &attachments {
                sink.draw_attachment(
                    transform,
                    attachment.attachment,
                    attachment.origin,
                    self.scale,
                );
            }
            for piece in pieces.iter().filter(|piece| !piece.is_trailing_whitespace) {
                let attributes = piece.attributes;
                let color = text_color(piece, highlight);
                if let Some(underline) = &attributes.underline {
                    let offset = -0.1 * attributes.font.size;
                    self.draw_decoration(
                        sink, transform, piece, origin.y, underline, offset, color,
                    );
                }
                if let Some(strikethrough) = &attributes.strikethrough {
                    let offset = attributes.font.x_height() / 2.;
                    self.draw_decoration(
                        sink,
                        transform,
                        piece,
                        origin.y,
                        strikethrough,
                        offset,
                        color,
                    );
                }
            }
        }
        true
    }

    /// Groups the visible clusters of a line into pieces and attachments.
    fn line_pieces<'a>(
        &'a self,
        line_index: usize,
        origin: Point,
        range: &Range<TextFrameIndex>,
        highlight: Option<&Range<TextFrameIndex>>,
    ) -> (Vec<Piece<'a>>, Vec<AttachmentPiece<'a>>) {
        let mut pieces: Vec<Piece<'a>> = Vec::new();
        let mut attachments = Vec::new();
        let mut last: Option<(*const LineItemData, u32, bool)> = None;
        for visual in self.visual_clusters(line_index) {
            if !(visual.span.start < range.end && range.start < visual.span.end) {
                continue;
            }
            let attributes: &'a TextAttributes = visual.storage.cluster_style(visual.cluster);
            let left = origin.x + self.scale * f64::from(visual.x);
            if visual.cluster.flags.contains(ClusterFlags::ATTACHMENT) {
                if let Some(attachment) = &attributes.attachment {
                    attachments.push(AttachmentPiece {
                        attachment,
                        origin: Point::new(
                            left,
                            origin.y - self.scale * f64::from(attributes.baseline_offset),
                        ),
                    });
                }
                last = None;
                continue;
            }
            let highlighted = highlight
                .is_some_and(|h| visual.span.start < h.end && h.start < visual.span.end);
            let key = (
                core::ptr::from_ref(visual.item),
                visual.cluster.run,
                highlighted,
            );
            if last != Some(key) {
                pieces.push(Piece {
                    attributes,
                    metrics: *visual.storage.cluster_metrics(visual.cluster),
                    highlighted,
                    is_trailing_whitespace: visual.item.is_trailing_whitespace,
                    glyphs: Vec::new(),
                    left,
                    right: left,
                });
                last = Some(key);
            }
            if let Some(piece) = pieces.last_mut() {
                self.push_glyphs(piece, &visual, origin);
            }
        }
        (pieces, attachments)
    }

    fn push_glyphs(&self, piece: &mut Piece<'_>, visual: &VisualCluster<'_>, origin: Point) {
        let cluster = visual.cluster;
        let glyphs =
            &visual.storage.glyphs[cluster.glyphs.start as usize..cluster.glyphs.end as usize];
        let baseline_offset = piece.attributes.baseline_offset;
        let mut pen = visual.x;
        let mut push = |glyph: &GlyphData| {
            piece.glyphs.push(PositionedGlyph {
                id: glyph.id,
                x: origin.x + self.scale * f64::from(pen + glyph.x_offset),
                y: origin.y - self.scale * f64::from(glyph.y_offset + baseline_offset),
                advance: self.scale * f64::from(glyph.advance),
            });
            pen += glyph.advance;
        };
        if cluster.level & 1 != 0 {
            glyphs.iter().rev().for_each(&mut push);
        } else {
            glyphs.iter().for_each(&mut push);
        }
        piece.right = origin.x + self.scale * f64::from(visual.x + cluster.advance);
    }

    fn glyph_run<'a>(
        &self,
        piece: &Piece<'a>,
        glyphs: &'a [PositionedGlyph],
        color: Color,
        paint: GlyphPaint,
    ) -> GlyphRun<'a> {
        GlyphRun {
            attributes: piece.attributes,
            font_size: self.scale * f64::from(piece.attributes.font.size),
            glyphs,
            color,
            paint,
            ascent: self.scale * f64::from(piece.metrics.ascent),
            descent: self.scale * f64::from(piece.metrics.descent),
        }
    }

    /// Fills a decoration line centered `offset` above the baseline.
    fn draw_decoration(
        &self,
        sink: &mut dyn DrawSink,
        transform: Affine,
        piece: &Piece<'_>,
        baseline: f64,
        decoration: &Decoration,
        offset: f32,
        text_color: Color,
    ) {
        let attributes = piece.attributes;
        let thickness = if decoration.thickness > 0. {
            decoration.thickness
        } else {
            (attributes.font.size / 14.).max(0.5)
        };
        let y = baseline - self.scale * f64::from(offset + attributes.baseline_offset);
        let half = self.scale * f64::from(thickness) / 2.;
        let color = if piece.highlighted {
            decoration.color.unwrap_or(text_color)
        } else {
            attributes.decoration_color(decoration)
        };
        sink.fill_rect(
            transform,
            Rect::new(piece.left, y - half, piece.right, y + half),
            color,
        );
    }
}

fn text_color(
    piece: &Piece<'_>,
    highlight: Option<&(Range<TextFrameIndex>, HighlightStyle)>,
) -> Color {
    if piece.highlighted {
        if let Some(color) = highlight.and_then(|(_, style)| style.text_color) {
            return color;
        }
    }
    piece.attributes.color
}

fn offset_glyphs(glyphs: &[PositionedGlyph], offset: Vec2) -> Vec<PositionedGlyph> {
    glyphs
        .iter()
        .map(|glyph| PositionedGlyph {
            x: glyph.x + offset.x,
            y: glyph.y + offset.y,
            ..*glyph
        })
        .collect()
}

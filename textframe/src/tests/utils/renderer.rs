// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw sinks for tests: one recording the primitives, one painting boxes into a pixmap.

use peniko::Color;
use peniko::kurbo::{Affine, Point, Rect};
use tiny_skia::{Paint, Pixmap, Transform};

use crate::{DrawSink, GlyphPaint, GlyphRun, PositionedGlyph, TextAttachment};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DrawEvent {
    Rect {
        rect: Rect,
        color: Color,
    },
    Glyphs {
        glyphs: Vec<PositionedGlyph>,
        color: Color,
        paint: GlyphPaint,
    },
    Attachment {
        origin: Point,
        scale: f64,
    },
}

/// Records everything drawn, after applying the transform to rectangles and glyph origins.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub(crate) events: Vec<DrawEvent>,
}

impl RecordingSink {
    pub(crate) fn glyph_runs(
        &self,
    ) -> impl Iterator<Item = (&[PositionedGlyph], Color, GlyphPaint)> {
        self.events.iter().filter_map(|event| match event {
            DrawEvent::Glyphs {
                glyphs,
                color,
                paint,
            } => Some((glyphs.as_slice(), *color, *paint)),
            _ => None,
        })
    }

    pub(crate) fn rects(&self) -> impl Iterator<Item = (Rect, Color)> + '_ {
        self.events.iter().filter_map(|event| match event {
            DrawEvent::Rect { rect, color } => Some((*rect, *color)),
            _ => None,
        })
    }

    /// The ids of all filled glyphs, in drawing order.
    pub(crate) fn filled_glyph_ids(&self) -> Vec<u32> {
        self.glyph_runs()
            .filter(|(_, _, paint)| *paint == GlyphPaint::Fill)
            .flat_map(|(glyphs, _, _)| glyphs.iter().map(|glyph| glyph.id))
            .collect()
    }
}

impl DrawSink for RecordingSink {
    fn fill_rect(&mut self, transform: Affine, rect: Rect, color: Color) {
        self.events.push(DrawEvent::Rect {
            rect: transform.transform_rect_bbox(rect),
            color,
        });
    }

    fn draw_glyphs(&mut self, transform: Affine, run: &GlyphRun<'_>) {
        let glyphs = run
            .glyphs
            .iter()
            .map(|glyph| {
                let origin = transform * Point::new(glyph.x, glyph.y);
                PositionedGlyph {
                    x: origin.x,
                    y: origin.y,
                    ..*glyph
                }
            })
            .collect();
        self.events.push(DrawEvent::Glyphs {
            glyphs,
            color: run.color,
            paint: run.paint,
        });
    }

    fn draw_attachment(
        &mut self,
        transform: Affine,
        _attachment: &TextAttachment,
        origin: Point,
        scale: f64,
    ) {
        self.events.push(DrawEvent::Attachment {
            origin: transform * origin,
            scale,
        });
    }
}

/// Paints rectangles, glyph boxes and attachment bounds into a pixmap.
pub(crate) struct PixmapSink {
    pub(crate) pixmap: Pixmap,
}

impl PixmapSink {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            pixmap: Pixmap::new(width, height).expect("pixmap size must not be zero"),
        }
    }

    /// Returns `true` if the pixel at (`x`, `y`) was painted.
    pub(crate) fn is_painted(&self, x: u32, y: u32) -> bool {
        self.pixmap
            .pixel(x, y)
            .is_some_and(|pixel| pixel.alpha() > 0)
    }

    fn fill(&mut self, transform: Affine, rect: Rect, color: Color) {
        let Some(rect) = tiny_skia::Rect::from_ltrb(
            rect.x0 as f32,
            rect.y0 as f32,
            rect.x1 as f32,
            rect.y1 as f32,
        ) else {
            return;
        };
        let rgba8 = color.to_rgba8();
        let mut paint = Paint::default();
        paint.set_color_rgba8(rgba8.r, rgba8.g, rgba8.b, rgba8.a);
        let [a, b, c, d, e, f] = transform.as_coeffs();
        let transform =
            Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32);
        self.pixmap.fill_rect(rect, &paint, transform, None);
    }
}

impl DrawSink for PixmapSink {
    fn fill_rect(&mut self, transform: Affine, rect: Rect, color: Color) {
        self.fill(transform, rect, color);
    }

    fn draw_glyphs(&mut self, transform: Affine, run: &GlyphRun<'_>) {
        for glyph in run.glyphs {
            let rect = Rect::new(
                glyph.x,
                glyph.y - run.ascent,
                glyph.x + glyph.advance,
                glyph.y + run.descent,
            );
            self.fill(transform, rect, run.color);
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
        self.fill(transform, rect, Color::BLACK);
    }
}

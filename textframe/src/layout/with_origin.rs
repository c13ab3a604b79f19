// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use peniko::kurbo::{Affine, Point, Rect};

use super::{
    DrawOptions, DrawSink, GraphemeClusterRange, LayoutInfo, TextFrame, TextFrameIndex, TextLink,
    TextRectArray,
};
use crate::cancel::CancellationFlag;
use crate::DisplayScale;

/// A [`TextFrame`] placed at an origin, with a display scale for rounding baselines.
///
/// All geometry is reported in the coordinate space the origin lives in.
#[derive(Clone, Copy, Debug)]
pub struct TextFrameWithOrigin<'a> {
    frame: &'a TextFrame,
    origin: Point,
    display_scale: Option<DisplayScale>,
}

impl<'a> TextFrameWithOrigin<'a> {
    /// Places `frame` at `origin`.
    pub fn new(frame: &'a TextFrame, origin: Point, display_scale: Option<DisplayScale>) -> Self {
        Self {
            frame,
            origin,
            display_scale,
        }
    }

    /// The frame.
    pub fn frame(&self) -> &'a TextFrame {
        self.frame
    }

    /// The origin of the frame.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// The display scale used for rounding baselines.
    pub fn display_scale(&self) -> Option<DisplayScale> {
        self.display_scale
    }

    /// See [`TextFrame::layout_info`].
    pub fn layout_info(&self) -> LayoutInfo {
        self.frame.layout_info(self.origin, self.display_scale)
    }

    /// See [`TextFrame::layout_bounds`].
    pub fn layout_bounds(&self) -> Rect {
        self.frame.layout_bounds(self.origin, self.display_scale)
    }

    /// See [`TextFrame::image_bounds`].
    pub fn image_bounds(&self, range: Option<Range<TextFrameIndex>>) -> Rect {
        self.frame
            .image_bounds(range, self.origin, self.display_scale)
    }

    /// The y of the first baseline.
    pub fn first_baseline(&self) -> f64 {
        self.frame
            .first_baseline(self.origin.y, self.display_scale)
    }

    /// The y of the last baseline.
    pub fn last_baseline(&self) -> f64 {
        self.frame
            .last_baseline(self.origin.y, self.display_scale)
    }

    /// The baseline origin of the line at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn line_baseline_origin(&self, index: usize) -> Point {
        self.frame
            .line(index)
            .baseline_origin_at(self.origin, self.display_scale)
    }

    /// See [`TextFrame::rects`].
    pub fn rects(&self, range: Range<TextFrameIndex>) -> TextRectArray {
        self.frame.rects(range, self.origin, self.display_scale)
    }

    /// See [`TextFrame::range_of_grapheme_cluster_closest_to`].
    pub fn range_of_grapheme_cluster_closest_to(
        &self,
        point: Point,
        ignoring_trailing_whitespace: bool,
    ) -> Option<GraphemeClusterRange> {
        self.frame.range_of_grapheme_cluster_closest_to(
            point,
            ignoring_trailing_whitespace,
            self.origin,
            self.display_scale,
        )
    }

    /// See [`TextFrame::links`].
    pub fn links(&self) -> Vec<TextLink> {
        self.frame.links(self.origin, self.display_scale)
    }

    /// Draws the frame at its origin.
    ///
    /// Baselines are rounded to the display scale of this view if `pixel_align_baselines` is set
    /// in `options`.
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
        self.frame.draw_at(
            sink,
            range,
            self.origin,
            transform,
            display_scale,
            options.highlight.as_ref(),
            cancel,
        )
    }
}

impl TextFrame {
    /// Places the frame at `origin`.
    pub fn with_origin(
        &self,
        origin: Point,
        display_scale: Option<DisplayScale>,
    ) -> TextFrameWithOrigin<'_> {
        TextFrameWithOrigin::new(self, origin, display_scale)
    }
}
